//! Field, method, and constructor injection resolution for the class
//! dialect.
//!
//! The three passes share one resolution algorithm for a typed injection
//! point but keep their documented quirks: field resolution silently takes
//! the first candidate when several match, while method and constructor
//! resolution record a null-target edge plus an ambiguity diagnostic.

use std::collections::HashMap;

use beanlens_parse::{simplify_type, ParamDecl, SourceUnit, TypeKind};
use beanlens_types::{Diagnostic, Span};

use crate::model::{Bean, Mechanism, Wiring, WiringMetadata};

pub const WIRE_NO_BEAN: &str = "WIRE_NO_BEAN";
pub const WIRE_UNKNOWN_TYPE: &str = "WIRE_UNKNOWN_TYPE";
pub const WIRE_UNKNOWN_QUALIFIER: &str = "WIRE_UNKNOWN_QUALIFIER";
pub const WIRE_AMBIGUOUS_BEAN: &str = "WIRE_AMBIGUOUS_BEAN";
pub const WIRE_INVALID_TARGET: &str = "WIRE_INVALID_TARGET";

/// Output of the field pass.
#[derive(Clone, Debug, Default)]
pub struct FieldWirings {
    pub wirings: Vec<Wiring>,
    pub invalid_targets: Vec<Diagnostic>,
    pub missing_types: Vec<Diagnostic>,
}

/// Output of the method and constructor passes.
#[derive(Clone, Debug, Default)]
pub struct ParamWirings {
    pub wirings: Vec<Wiring>,
    pub missing_types: Vec<Diagnostic>,
    pub ambiguous: Vec<Diagnostic>,
}

pub(crate) struct ResolveCx<'a> {
    unit: &'a SourceUnit,
    beans: &'a [Bean],
    declared_classes: Vec<&'a str>,
    declared_interfaces: Vec<&'a str>,
}

impl<'a> ResolveCx<'a> {
    pub(crate) fn new(unit: &'a SourceUnit, beans: &'a [Bean]) -> Self {
        ResolveCx {
            unit,
            beans,
            declared_classes: crate::extract::declared_classes(unit),
            declared_interfaces: crate::extract::declared_interfaces(unit),
        }
    }

    fn type_exists(&self, ty: &str) -> bool {
        self.declared_classes.contains(&ty) || self.declared_interfaces.contains(&ty)
    }

    /// The `implements` list of the first class declaration with this name.
    fn implements_of(&self, class_name: &str) -> &'a [String] {
        self.unit
            .types
            .iter()
            .find(|t| t.kind == TypeKind::Class && t.name == class_name)
            .map(|t| t.implements.as_slice())
            .unwrap_or(&[])
    }

    fn bean_named(&self, name: &str) -> Option<&'a Bean> {
        self.beans.iter().find(|b| b.bean_name == name)
    }

    /// Beans assignable to `ty` (class equality or a declared `implements`
    /// entry), in bean declaration order.
    fn candidates(&self, ty: &str) -> Vec<&'a Bean> {
        self.beans
            .iter()
            .filter(|b| {
                b.class_name == ty || self.implements_of(&b.class_name).iter().any(|i| i == ty)
            })
            .collect()
    }
}

enum Resolution {
    /// Unique target, with the qualifier that pinned it (if any).
    Target(String, Option<String>),
    /// Several candidates, declaration order. The caller decides whether to
    /// pick the first (fields) or record a null edge (methods/constructors).
    Ambiguous(Vec<String>),
    /// No candidate; `type_declared` distinguishes a typo'd type from a
    /// declared type with no bean.
    Missing { type_declared: bool },
    /// Qualifier names no known bean.
    UnknownQualifier(String),
    /// Qualified target exists but its class is not assignable to the
    /// declared type. No edge, no diagnostic.
    Skip,
}

fn resolve_injection(cx: &ResolveCx<'_>, declared_ty: &str, qualifier: Option<&str>) -> Resolution {
    let ty = simplify_type(declared_ty);

    if let Some(q) = qualifier {
        if !cx.type_exists(&ty) {
            return Resolution::Missing {
                type_declared: false,
            };
        }
        let Some(target) = cx.bean_named(q) else {
            return Resolution::UnknownQualifier(q.to_string());
        };
        let assignable = target.class_name == ty
            || cx.implements_of(&target.class_name).iter().any(|i| *i == ty);
        return if assignable {
            Resolution::Target(target.bean_name.clone(), Some(q.to_string()))
        } else {
            Resolution::Skip
        };
    }

    let candidates = cx.candidates(&ty);
    match candidates.len() {
        1 => Resolution::Target(candidates[0].bean_name.clone(), None),
        0 => Resolution::Missing {
            type_declared: cx.type_exists(&ty),
        },
        _ => Resolution::Ambiguous(
            candidates
                .into_iter()
                .map(|b| b.bean_name.clone())
                .collect(),
        ),
    }
}

fn qualifier_of(annotations: &[beanlens_parse::Annotation]) -> Option<&str> {
    annotations
        .iter()
        .find(|a| a.simple_name == "Qualifier")
        .and_then(|a| a.arg("value").or_else(|| a.arg("name")))
        .filter(|s| !s.is_empty())
}

fn missing_diagnostic(
    type_declared: bool,
    ty: &str,
    site: &str,
    span: Option<Span>,
) -> Diagnostic {
    if type_declared {
        Diagnostic::warning(
            WIRE_NO_BEAN,
            format!("no bean of type '{ty}' (or implementing it) found for {site}"),
            span,
        )
    } else {
        Diagnostic::warning(
            WIRE_UNKNOWN_TYPE,
            format!("type '{ty}' is not declared as a class or interface ({site})"),
            span,
        )
    }
}

fn unknown_qualifier_diagnostic(qualifier: &str, site: &str, span: Option<Span>) -> Diagnostic {
    Diagnostic::warning(
        WIRE_UNKNOWN_QUALIFIER,
        format!("no matching bean named '{qualifier}' for qualifier on {site}"),
        span,
    )
}

/// Field-based wiring: `@Autowired` instance fields in every public class.
/// Resolution diagnostics are reported even when the enclosing class is not
/// itself a bean; edges are emitted once per source bean registered for the
/// class.
pub fn resolve_field_wirings(unit: &SourceUnit, beans: &[Bean]) -> FieldWirings {
    let cx = ResolveCx::new(unit, beans);
    let mut out = FieldWirings::default();

    for decl in &unit.types {
        if decl.kind != TypeKind::Class || !decl.is_public() {
            continue;
        }
        let source_beans: Vec<&str> = beans
            .iter()
            .filter(|b| b.class_name == decl.name)
            .map(|b| b.bean_name.as_str())
            .collect();

        for field in decl.fields() {
            if field.annotation("Autowired").is_none() {
                continue;
            }
            let site = format!("field '{}.{}'", decl.name, field.name);
            let qualifier = qualifier_of(&field.annotations);
            let span = Some(field.name_span);

            let target = match resolve_injection(&cx, &field.ty, qualifier) {
                Resolution::Target(to, q) => Some((to, q)),
                // Documented quirk: fields silently take the first match.
                Resolution::Ambiguous(candidates) => {
                    candidates.into_iter().next().map(|first| (first, None))
                }
                Resolution::Missing { type_declared } => {
                    out.missing_types.push(missing_diagnostic(
                        type_declared,
                        &simplify_type(&field.ty),
                        &site,
                        span,
                    ));
                    None
                }
                Resolution::UnknownQualifier(q) => {
                    out.missing_types
                        .push(unknown_qualifier_diagnostic(&q, &site, span));
                    None
                }
                Resolution::Skip => None,
            };

            if field.is_static() || field.is_final() {
                out.invalid_targets.push(Diagnostic::warning(
                    WIRE_INVALID_TARGET,
                    format!("{site} is static or final; not a valid injection target"),
                    span,
                ));
                continue;
            }

            if let Some((to, q)) = target {
                for source in &source_beans {
                    out.wirings.push(Wiring {
                        from: (*source).to_string(),
                        to: Some(to.clone()),
                        mechanism: Mechanism::Field,
                        metadata: WiringMetadata {
                            param_or_field_name: Some(field.name.clone()),
                            qualifier_name: q.clone(),
                        },
                    });
                }
            }
        }
    }

    out
}

/// The last bean registered per class name; later declarations shadow
/// earlier ones for method/constructor sources.
fn class_to_bean<'a>(beans: &'a [Bean]) -> HashMap<&'a str, &'a str> {
    let mut map = HashMap::new();
    for bean in beans {
        map.insert(bean.class_name.as_str(), bean.bean_name.as_str());
    }
    map
}

fn resolve_param(
    cx: &ResolveCx<'_>,
    source: &str,
    owner: &str,
    param: &ParamDecl,
    mechanism: Mechanism,
    out: &mut ParamWirings,
) {
    let site = format!("parameter '{}' of {owner}", param.name);
    let qualifier = qualifier_of(&param.annotations);
    let span = Some(param.name_span);
    let ty = simplify_type(&param.ty);

    match resolve_injection(cx, &param.ty, qualifier) {
        Resolution::Target(to, q) => out.wirings.push(Wiring {
            from: source.to_string(),
            to: Some(to),
            mechanism,
            metadata: WiringMetadata {
                param_or_field_name: Some(param.name.clone()),
                qualifier_name: q,
            },
        }),
        Resolution::Ambiguous(candidates) => {
            out.wirings.push(Wiring {
                from: source.to_string(),
                to: None,
                mechanism,
                metadata: WiringMetadata {
                    param_or_field_name: Some(param.name.clone()),
                    qualifier_name: None,
                },
            });
            out.ambiguous.push(Diagnostic::warning(
                WIRE_AMBIGUOUS_BEAN,
                format!(
                    "multiple beans match type '{ty}' for {site}: {}",
                    candidates.join(", ")
                ),
                span,
            ));
        }
        Resolution::Missing { type_declared } => {
            out.missing_types
                .push(missing_diagnostic(type_declared, &ty, &site, span));
        }
        Resolution::UnknownQualifier(q) => {
            out.missing_types
                .push(unknown_qualifier_diagnostic(&q, &site, span));
        }
        Resolution::Skip => {}
    }
}

/// Method-based wiring: only methods explicitly carrying `@Autowired`, in
/// classes that are themselves beans.
pub fn resolve_method_wirings(unit: &SourceUnit, beans: &[Bean]) -> ParamWirings {
    let cx = ResolveCx::new(unit, beans);
    let sources = class_to_bean(beans);
    let mut out = ParamWirings::default();

    for decl in &unit.types {
        if decl.kind != TypeKind::Class || !decl.is_public() {
            continue;
        }
        let Some(&source) = sources.get(decl.name.as_str()) else {
            continue;
        };
        for method in decl.methods() {
            if method.annotation("Autowired").is_none() {
                continue;
            }
            let owner = format!("method '{}.{}'", decl.name, method.name);
            for param in &method.params {
                resolve_param(&cx, source, &owner, param, Mechanism::Method, &mut out);
            }
        }
    }

    out
}

/// Constructor-based wiring: only classes that are beans. A single
/// constructor is implicitly injectable; with several, only the
/// `@Autowired`-marked ones count and unmarked ones are ignored entirely.
pub fn resolve_constructor_wirings(unit: &SourceUnit, beans: &[Bean]) -> ParamWirings {
    let cx = ResolveCx::new(unit, beans);
    let sources = class_to_bean(beans);
    let mut out = ParamWirings::default();

    for decl in &unit.types {
        if decl.kind != TypeKind::Class || !decl.is_public() {
            continue;
        }
        let Some(&source) = sources.get(decl.name.as_str()) else {
            continue;
        };
        let ctors: Vec<_> = decl.constructors().collect();
        let single = ctors.len() == 1;
        for ctor in ctors {
            if !single && ctor.annotation("Autowired").is_none() {
                continue;
            }
            let owner = format!("constructor of '{}'", decl.name);
            for param in &ctor.params {
                resolve_param(&cx, source, &owner, param, Mechanism::Constructor, &mut out);
            }
        }
    }

    out
}
