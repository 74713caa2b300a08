//! The output model: everything one analysis pass hands to the rendering
//! layer, read-only and serializable.

use beanlens_types::Diagnostic;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BeanKind {
    Component,
    Service,
    Repository,
    Controller,
    /// A factory-method bean declared inside a configuration class.
    Bean,
    XmlBean,
}

/// A named node in the dependency graph. `bean_name` is the node identity;
/// beans are rebuilt wholesale on every analysis, so identity across runs is
/// nothing more than string equality.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Bean {
    pub class_name: String,
    pub bean_name: String,
    pub kind: BeanKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mechanism {
    Field,
    Method,
    Constructor,
    ConfigFactory,
    XmlRef,
    XmlConstructor,
    XmlProperty,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WiringMetadata {
    /// Field or parameter at the injection point. XML edges carry none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub param_or_field_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qualifier_name: Option<String>,
}

/// A directed dependency edge. `to = None` records an ambiguous injection
/// that was kept for diagnostic visibility; such edges are excluded from the
/// cycle and layout graphs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Wiring {
    pub from: String,
    pub to: Option<String>,
    pub mechanism: Mechanism,
    pub metadata: WiringMetadata,
}

impl Wiring {
    pub fn resolved(&self) -> Option<(&str, &str)> {
        self.to.as_deref().map(|to| (self.from.as_str(), to))
    }
}

/// All diagnostics of one analysis, by category. Single-slot categories keep
/// the last message written (matching the observed overwrite behavior of the
/// structural checks); list categories append in source-appearance order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bracket_warning: Option<Diagnostic>,
    /// Hard errors: duplicate bean names, duplicate class declarations.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multi_name_warning: Option<Diagnostic>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_class_warnings: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub lex_warnings: Vec<Diagnostic>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub invalid_field_targets: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_field_types: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_method_types: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ambiguous_method_wirings: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_constructor_types: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ambiguous_constructor_wirings: Vec<Diagnostic>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_config_types: Vec<Diagnostic>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub xml_structure_warning: Option<Diagnostic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xml_tag_warning: Option<Diagnostic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xml_closing_warning: Option<Diagnostic>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bean_unclosed_warning: Option<Diagnostic>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub broken_xml_wirings: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Every diagnostic across all categories, singles first within their
    /// declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        let singles = [
            &self.bracket_warning,
            &self.multi_name_warning,
            &self.xml_structure_warning,
            &self.xml_tag_warning,
            &self.xml_closing_warning,
            &self.bean_unclosed_warning,
        ];
        let lists = [
            &self.errors,
            &self.missing_class_warnings,
            &self.lex_warnings,
            &self.invalid_field_targets,
            &self.missing_field_types,
            &self.missing_method_types,
            &self.ambiguous_method_wirings,
            &self.missing_constructor_types,
            &self.ambiguous_constructor_wirings,
            &self.missing_config_types,
            &self.broken_xml_wirings,
        ];
        singles
            .into_iter()
            .filter_map(|slot| slot.as_ref())
            .collect::<Vec<_>>()
            .into_iter()
            .chain(lists.into_iter().flat_map(|list| list.iter()))
    }
}

/// The complete, immutable output of one analysis pass.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    pub beans: Vec<Bean>,
    pub wirings: Vec<Wiring>,
    pub diagnostics: Diagnostics,
    /// Bean-name loops; the first element repeats implicitly at the end.
    pub cycles: Vec<Vec<String>>,
    /// Layout rows, outermost first. A rendering aid, not a dependency order.
    pub levels: Vec<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn kinds_serialize_with_documented_spellings() {
        let json = serde_json::to_value([
            BeanKind::Component,
            BeanKind::Controller,
            BeanKind::Bean,
            BeanKind::XmlBean,
        ])
        .expect("serialize kinds");
        assert_eq!(
            json,
            serde_json::json!(["component", "controller", "bean", "xml-bean"])
        );
    }

    #[test]
    fn mechanisms_serialize_with_documented_spellings() {
        let json = serde_json::to_value([
            Mechanism::Field,
            Mechanism::ConfigFactory,
            Mechanism::XmlRef,
            Mechanism::XmlConstructor,
            Mechanism::XmlProperty,
        ])
        .expect("serialize mechanisms");
        assert_eq!(
            json,
            serde_json::json!([
                "field",
                "config-factory",
                "xml-ref",
                "xml-constructor",
                "xml-property"
            ])
        );
    }

    #[test]
    fn wiring_serializes_camel_case_metadata() {
        let wiring = Wiring {
            from: "a".into(),
            to: Some("b".into()),
            mechanism: Mechanism::Field,
            metadata: WiringMetadata {
                param_or_field_name: Some("dep".into()),
                qualifier_name: None,
            },
        };
        let json = serde_json::to_value(&wiring).expect("serialize wiring");
        assert_eq!(
            json,
            serde_json::json!({
                "from": "a",
                "to": "b",
                "mechanism": "field",
                "metadata": { "paramOrFieldName": "dep" }
            })
        );
    }

    #[test]
    fn empty_diagnostics_iterate_nothing() {
        let diags = Diagnostics::default();
        assert!(diags.is_empty());
        assert_eq!(diags.len(), 0);
    }
}
