//! Bean extraction for the class dialect: stereotype-annotated classes and
//! factory methods inside configuration classes.

use beanlens_parse::{lower_camel_case, simplify_type, SourceUnit, TypeDecl, TypeKind};
use beanlens_types::Diagnostic;

use crate::model::{Bean, BeanKind};

pub const BEAN_MISSING_CLASS: &str = "BEAN_MISSING_CLASS";

const STEREOTYPES: &[(&str, BeanKind)] = &[
    ("Component", BeanKind::Component),
    ("Service", BeanKind::Service),
    ("Repository", BeanKind::Repository),
    ("Controller", BeanKind::Controller),
    // Normalized: a REST controller is a controller to the graph.
    ("RestController", BeanKind::Controller),
];

/// Names of the public classes declared in the unit, in source order.
pub fn declared_classes(unit: &SourceUnit) -> Vec<&str> {
    unit.types
        .iter()
        .filter(|t| t.kind == TypeKind::Class && t.is_public())
        .map(|t| t.name.as_str())
        .collect()
}

/// Names of the public interfaces declared in the unit, in source order.
pub fn declared_interfaces(unit: &SourceUnit) -> Vec<&str> {
    unit.types
        .iter()
        .filter(|t| t.kind == TypeKind::Interface && t.is_public())
        .map(|t| t.name.as_str())
        .collect()
}

fn stereotype_of(decl: &TypeDecl) -> Option<(&beanlens_parse::Annotation, BeanKind)> {
    decl.annotations.iter().find_map(|ann| {
        STEREOTYPES
            .iter()
            .find(|(name, _)| ann.simple_name == *name)
            .map(|&(_, kind)| (ann, kind))
    })
}

/// Extract every bean the class dialect declares, pre-filter: stereotype
/// beans first (source order), then factory-method beans (source order).
/// The ordering matters downstream; "first candidate" resolution follows it.
pub fn extract_beans(unit: &SourceUnit) -> Vec<Bean> {
    let mut beans = Vec::new();

    for decl in &unit.types {
        if decl.kind != TypeKind::Class || !decl.is_public() {
            continue;
        }
        if let Some((ann, kind)) = stereotype_of(decl) {
            let bean_name = ann
                .explicit_name()
                .map(str::to_string)
                .unwrap_or_else(|| lower_camel_case(&decl.name));
            beans.push(Bean {
                class_name: decl.name.clone(),
                bean_name,
                kind,
            });
        }
    }

    for decl in &unit.types {
        if decl.kind != TypeKind::Class
            || !decl.is_public()
            || decl.annotation("Configuration").is_none()
        {
            continue;
        }
        for method in decl.methods() {
            if method.annotation("Bean").is_none() || !method.has_body {
                continue;
            }
            beans.push(Bean {
                class_name: simplify_type(&method.return_ty),
                bean_name: method.name.clone(),
                kind: BeanKind::Bean,
            });
        }
    }

    beans
}

/// Drop factory-method beans whose return type matches no declared class,
/// reporting each drop. Stereotype and XML beans are never filtered here.
pub fn filter_missing_factory_classes(
    beans: Vec<Bean>,
    unit: &SourceUnit,
) -> (Vec<Bean>, Vec<Diagnostic>) {
    let declared = declared_classes(unit);
    let mut kept = Vec::with_capacity(beans.len());
    let mut warnings = Vec::new();

    for bean in beans {
        if bean.kind == BeanKind::Bean && !declared.contains(&bean.class_name.as_str()) {
            let span = factory_method_span(unit, &bean.bean_name);
            warnings.push(Diagnostic::warning(
                BEAN_MISSING_CLASS,
                format!(
                    "factory method '{}' returns type '{}', but no public class with that name is declared",
                    bean.bean_name, bean.class_name
                ),
                span,
            ));
            continue;
        }
        kept.push(bean);
    }

    (kept, warnings)
}

fn factory_method_span(unit: &SourceUnit, method_name: &str) -> Option<beanlens_types::Span> {
    unit.types
        .iter()
        .filter(|t| t.annotation("Configuration").is_some())
        .flat_map(|t| t.methods())
        .find(|m| m.name == method_name)
        .map(|m| m.name_span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use beanlens_parse::scan_source;
    use pretty_assertions::assert_eq;

    #[test]
    fn stereotype_beans_with_default_and_explicit_names() {
        let unit = scan_source(
            r#"
            @Component
            public class PaymentGateway {}

            @Service("billing")
            public class BillingService {}
            "#,
        );
        let beans = extract_beans(&unit);
        assert_eq!(
            beans,
            vec![
                Bean {
                    class_name: "PaymentGateway".into(),
                    bean_name: "paymentGateway".into(),
                    kind: BeanKind::Component,
                },
                Bean {
                    class_name: "BillingService".into(),
                    bean_name: "billing".into(),
                    kind: BeanKind::Service,
                },
            ]
        );
    }

    #[test]
    fn rest_controller_normalizes_to_controller() {
        let unit = scan_source("@RestController public class Api {}");
        let beans = extract_beans(&unit);
        assert_eq!(beans[0].kind, BeanKind::Controller);
    }

    #[test]
    fn non_public_classes_are_not_beans() {
        let unit = scan_source("@Component class Hidden {}");
        assert!(extract_beans(&unit).is_empty());
    }

    #[test]
    fn factory_methods_become_beans_named_after_the_method() {
        let unit = scan_source(
            r#"
            @Configuration
            public class AppConfig {
                @Bean
                public Mailer mailer() { return new Mailer(); }
            }
            public class Mailer {}
            "#,
        );
        let beans = extract_beans(&unit);
        assert_eq!(beans.len(), 1);
        assert_eq!(beans[0].bean_name, "mailer");
        assert_eq!(beans[0].class_name, "Mailer");
        assert_eq!(beans[0].kind, BeanKind::Bean);
    }

    #[test]
    fn factory_bean_with_undeclared_return_type_is_dropped_and_reported() {
        let unit = scan_source(
            r#"
            @Configuration
            public class AppConfig {
                @Bean
                public Ghost ghost() { return null; }
            }
            "#,
        );
        let beans = extract_beans(&unit);
        let (kept, warnings) = filter_missing_factory_classes(beans, &unit);
        assert!(kept.is_empty());
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].code, BEAN_MISSING_CLASS);
        assert!(warnings[0].message.contains("ghost"));
        assert!(warnings[0].message.contains("Ghost"));
        assert!(warnings[0].span.is_some());
    }

    #[test]
    fn bean_annotation_arguments_do_not_override_the_method_name() {
        let unit = scan_source(
            r#"
            @Configuration
            public class AppConfig {
                @Bean(name = "custom")
                public Mailer mailer() { return new Mailer(); }
            }
            public class Mailer {}
            "#,
        );
        let beans = extract_beans(&unit);
        assert_eq!(beans[0].bean_name, "mailer");
    }

    #[test]
    fn unannotated_methods_in_configuration_are_not_beans() {
        let unit = scan_source(
            r#"
            @Configuration
            public class AppConfig {
                public Helper helper() { return new Helper(); }
            }
            public class Helper {}
            "#,
        );
        assert!(extract_beans(&unit).is_empty());
    }
}
