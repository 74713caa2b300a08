//! Config-factory wiring: dependencies between factory methods inside
//! configuration classes.
//!
//! Resolution here is exact class-name match only; the interface matching
//! of the field/method/constructor passes deliberately does not apply.

use std::collections::HashMap;

use beanlens_parse::{simplify_type, SourceUnit, TypeKind};
use beanlens_types::Diagnostic;

use crate::model::{Bean, BeanKind, Mechanism, Wiring, WiringMetadata};

pub const FACTORY_NO_BEAN: &str = "FACTORY_NO_BEAN";

#[derive(Clone, Debug, Default)]
pub struct FactoryWirings {
    pub wirings: Vec<Wiring>,
    pub missing_types: Vec<Diagnostic>,
}

/// Resolve the parameters of every surviving factory-method bean against the
/// finalized bean list. Factory methods dropped by the missing-class filter
/// contribute nothing.
pub fn resolve_factory_wirings(unit: &SourceUnit, beans: &[Bean]) -> FactoryWirings {
    let mut class_to_bean: HashMap<&str, &str> = HashMap::new();
    for bean in beans {
        class_to_bean.insert(bean.class_name.as_str(), bean.bean_name.as_str());
    }

    let factory_names: Vec<&str> = beans
        .iter()
        .filter(|b| b.kind == BeanKind::Bean)
        .map(|b| b.bean_name.as_str())
        .collect();

    let mut out = FactoryWirings::default();

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
            if !factory_names.contains(&method.name.as_str()) {
                continue;
            }
            for param in &method.params {
                let ty = simplify_type(&param.ty);
                match class_to_bean.get(ty.as_str()) {
                    Some(&target) => out.wirings.push(Wiring {
                        from: method.name.clone(),
                        to: Some(target.to_string()),
                        mechanism: Mechanism::ConfigFactory,
                        metadata: WiringMetadata {
                            param_or_field_name: Some(param.name.clone()),
                            qualifier_name: None,
                        },
                    }),
                    None => out.missing_types.push(Diagnostic::warning(
                        FACTORY_NO_BEAN,
                        format!(
                            "no bean of class '{ty}' for parameter '{}' of factory method '{}'",
                            param.name, method.name
                        ),
                        Some(param.name_span),
                    )),
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{extract_beans, filter_missing_factory_classes};
    use beanlens_parse::scan_source;
    use pretty_assertions::assert_eq;

    fn factory_pass(src: &str) -> FactoryWirings {
        let unit = scan_source(src);
        let beans = extract_beans(&unit);
        let (beans, _) = filter_missing_factory_classes(beans, &unit);
        resolve_factory_wirings(&unit, &beans)
    }

    #[test]
    fn factory_param_wires_to_bean_by_exact_class() {
        let out = factory_pass(
            r#"
            @Configuration
            public class AppConfig {
                @Bean
                public DataSource dataSource() { return new DataSource(); }
                @Bean
                public Mailer mailer(DataSource ds) { return new Mailer(ds); }
            }
            public class DataSource {}
            public class Mailer {}
            "#,
        );
        assert_eq!(out.wirings.len(), 1);
        let w = &out.wirings[0];
        assert_eq!(w.from, "mailer");
        assert_eq!(w.to.as_deref(), Some("dataSource"));
        assert_eq!(w.mechanism, Mechanism::ConfigFactory);
        assert_eq!(w.metadata.param_or_field_name.as_deref(), Some("ds"));
    }

    #[test]
    fn interface_matching_does_not_apply() {
        let out = factory_pass(
            r#"
            public interface Sink {}
            @Component
            public class FileSink implements Sink {}
            @Configuration
            public class AppConfig {
                @Bean
                public Writer writer(Sink sink) { return new Writer(); }
            }
            public class Writer {}
            "#,
        );
        assert!(out.wirings.is_empty());
        assert_eq!(out.missing_types.len(), 1);
        assert_eq!(out.missing_types[0].code, FACTORY_NO_BEAN);
    }

    #[test]
    fn dropped_factory_beans_contribute_no_edges() {
        let out = factory_pass(
            r#"
            @Configuration
            public class AppConfig {
                @Bean
                public DataSource dataSource() { return new DataSource(); }
                @Bean
                public Ghost ghost(DataSource ds) { return null; }
            }
            public class DataSource {}
            "#,
        );
        // `ghost` was filtered out (no declared Ghost class), so only its
        // absence is observable: no edge from it, no missing-type noise.
        assert!(out.wirings.is_empty());
        assert!(out.missing_types.is_empty());
    }

    #[test]
    fn factory_params_can_target_stereotype_beans() {
        let out = factory_pass(
            r#"
            @Component
            public class Engine {}
            @Configuration
            public class AppConfig {
                @Bean
                public Car car(Engine engine) { return new Car(engine); }
            }
            public class Car {}
            "#,
        );
        assert_eq!(out.wirings.len(), 1);
        assert_eq!(out.wirings[0].to.as_deref(), Some("engine"));
    }
}
