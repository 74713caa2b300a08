//! XML dialect: structural validation, bean extraction, and ref wiring.
//!
//! The structural validator runs first. Its critical failures (missing or
//! unbalanced root tags, unclosed bean elements) short-circuit the whole XML
//! pipeline to an empty graph: malformed structure must never leak into
//! partially-valid graph data. Everything else degrades to warnings.

use beanlens_parse::xml::{Tag, TagKind};
use beanlens_types::Diagnostic;

use crate::model::{Bean, BeanKind, Mechanism, Wiring, WiringMetadata};

pub const XML_NO_PROLOG: &str = "XML_NO_PROLOG";
pub const XML_INVALID_TAG: &str = "XML_INVALID_TAG";
pub const XML_NO_ROOT: &str = "XML_NO_ROOT";
pub const XML_ROOT_IMBALANCE: &str = "XML_ROOT_IMBALANCE";
pub const XML_NO_ROOT_CLOSE: &str = "XML_NO_ROOT_CLOSE";
pub const XML_INVALID_CLOSE: &str = "XML_INVALID_CLOSE";
pub const XML_UNCLOSED_BEAN: &str = "XML_UNCLOSED_BEAN";
pub const XML_BROKEN_WIRING: &str = "XML_BROKEN_WIRING";

const TAG_WHITELIST: &[&str] = &["beans", "bean", "property", "constructor-arg", "qualifier"];

/// Outcome of the structural checks. Single-slot warnings keep the last
/// check's message when several fire, matching the observed behavior.
#[derive(Clone, Debug, Default)]
pub struct XmlStructureReport {
    pub structure_warning: Option<Diagnostic>,
    pub tag_warning: Option<Diagnostic>,
    pub closing_warning: Option<Diagnostic>,
    pub unclosed_warning: Option<Diagnostic>,
    critical: bool,
}

impl XmlStructureReport {
    /// Critical malformation: extraction and wiring must be skipped.
    pub fn is_critical(&self) -> bool {
        self.critical
    }
}

pub fn validate_structure(text: &str, tags: &[Tag]) -> XmlStructureReport {
    let mut report = XmlStructureReport::default();

    if !text.contains("<?xml") {
        report.structure_warning = Some(Diagnostic::warning(
            XML_NO_PROLOG,
            "document should begin with an <?xml version=\"1.0\" encoding=\"UTF-8\"?> declaration",
            None,
        ));
    }

    let invalid_open: Vec<&str> = tags
        .iter()
        .filter(|t| matches!(t.kind, TagKind::Open | TagKind::SelfClosing))
        .filter(|t| !TAG_WHITELIST.contains(&t.name.as_str()))
        .map(|t| t.name.as_str())
        .collect();
    if !invalid_open.is_empty() {
        report.tag_warning = Some(Diagnostic::warning(
            XML_INVALID_TAG,
            format!(
                "invalid opening tags: {}; only beans, bean, property, constructor-arg and qualifier are allowed",
                invalid_open.join(", ")
            ),
            None,
        ));
    }

    let root_opens = tags
        .iter()
        .filter(|t| t.kind == TagKind::Open && t.name == "beans")
        .count();
    if root_opens == 0 {
        report.tag_warning = Some(Diagnostic::warning(
            XML_NO_ROOT,
            "missing <beans> opening tag; the document needs a <beans> root element",
            None,
        ));
        report.critical = true;
    }

    let root_closes = tags
        .iter()
        .filter(|t| t.kind == TagKind::Close && t.name == "beans")
        .count();
    if root_closes == 0 {
        report.closing_warning = Some(Diagnostic::warning(
            XML_NO_ROOT_CLOSE,
            "missing </beans> closing tag; the <beans> root element is never closed",
            None,
        ));
        report.critical = true;
    }

    let invalid_close: Vec<&str> = tags
        .iter()
        .filter(|t| t.kind == TagKind::Close)
        .filter(|t| !TAG_WHITELIST.contains(&t.name.as_str()))
        .map(|t| t.name.as_str())
        .collect();
    if !invalid_close.is_empty() {
        report.closing_warning = Some(Diagnostic::warning(
            XML_INVALID_CLOSE,
            format!("invalid closing tags: {}", invalid_close.join(", ")),
            None,
        ));
    }

    if root_opens > 0 && root_closes > 0 && root_opens != root_closes {
        report.tag_warning = Some(Diagnostic::warning(
            XML_ROOT_IMBALANCE,
            format!("unbalanced <beans> tags: {root_opens} opening vs {root_closes} closing"),
            None,
        ));
        report.critical = true;
    }

    // Stack check: every opened bean element must be self-closing or have a
    // matching </bean>. Unmatched ones are reported by id, or a positional
    // placeholder when the id is absent.
    let mut stack: Vec<String> = Vec::new();
    for tag in tags {
        if tag.name != "bean" {
            continue;
        }
        match tag.kind {
            TagKind::Open => {
                let label = tag
                    .attr("id")
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("bean_{}", tag.line));
                stack.push(label);
            }
            TagKind::Close => {
                stack.pop();
            }
            _ => {}
        }
    }
    if !stack.is_empty() {
        report.unclosed_warning = Some(Diagnostic::warning(
            XML_UNCLOSED_BEAN,
            format!(
                "bean elements without a matching </bean> or />: {}",
                stack.join(", ")
            ),
            None,
        ));
        report.critical = true;
    }

    report
}

/// Identity attribute of a bean tag: `id`, falling back to `name`.
fn bean_identity(tag: &Tag) -> Option<&str> {
    tag.attr("id").or_else(|| tag.attr("name"))
}

/// Every `<bean>` tag with an identity and a class attribute becomes a bean;
/// the class keeps only its trailing simple name.
pub fn extract_xml_beans(tags: &[Tag]) -> Vec<Bean> {
    tags.iter()
        .filter(|t| t.name == "bean" && matches!(t.kind, TagKind::Open | TagKind::SelfClosing))
        .filter_map(|tag| {
            let identity = bean_identity(tag)?;
            let class = tag.attr("class")?;
            let simple = class.rsplit('.').next().unwrap_or(class);
            Some(Bean {
                class_name: simple.to_string(),
                bean_name: identity.to_string(),
                kind: BeanKind::XmlBean,
            })
        })
        .collect()
}

#[derive(Clone, Debug, Default)]
pub struct XmlWirings {
    pub wirings: Vec<Wiring>,
    pub broken: Vec<Diagnostic>,
}

/// Resolve every `ref` attribute to an edge from the nearest textually
/// preceding bean declaration. References to unknown bean ids are kept as
/// broken-wiring diagnostics and excluded from the edge set.
pub fn resolve_xml_wirings(tags: &[Tag], beans: &[Bean]) -> XmlWirings {
    let mut out = XmlWirings::default();
    let mut enclosing: Option<String> = None;

    let is_bean_name = |name: &str| beans.iter().any(|b| b.bean_name == name);

    for tag in tags {
        if matches!(tag.kind, TagKind::Open | TagKind::SelfClosing) {
            let mechanism = match tag.name.as_str() {
                "property" => Mechanism::XmlProperty,
                "constructor-arg" => Mechanism::XmlConstructor,
                _ => Mechanism::XmlRef,
            };

            // A ref on a bean tag itself resolves against the *previous*
            // bean declaration, so refs are handled before the identity
            // tracking below moves on.
            for target in tag.attr_values("ref") {
                let Some(source) = enclosing.as_deref().filter(|s| is_bean_name(s)) else {
                    continue;
                };
                if is_bean_name(target) {
                    let param_or_field_name = if mechanism == Mechanism::XmlRef {
                        None
                    } else {
                        tag.attr("name").map(str::to_string)
                    };
                    out.wirings.push(Wiring {
                        from: source.to_string(),
                        to: Some(target.to_string()),
                        mechanism,
                        metadata: WiringMetadata {
                            param_or_field_name,
                            qualifier_name: None,
                        },
                    });
                } else {
                    out.broken.push(Diagnostic::warning(
                        XML_BROKEN_WIRING,
                        format!("XML wiring from '{source}' points at a missing bean: '{target}'"),
                        Some(tag.span),
                    ));
                }
            }

            if tag.name == "bean" {
                if let Some(identity) = bean_identity(tag) {
                    enclosing = Some(identity.to_string());
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use beanlens_parse::xml::scan_tags as scan_xml;
    use pretty_assertions::assert_eq;

    const WELL_FORMED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<beans xmlns="http://www.springframework.org/schema/beans">
    <bean id="userRepo" class="com.acme.UserRepo"/>
    <bean id="userService" class="com.acme.UserService">
        <property name="repo" ref="userRepo"/>
    </bean>
</beans>
"#;

    #[test]
    fn well_formed_document_passes_all_checks() {
        let tags = scan_xml(WELL_FORMED);
        let report = validate_structure(WELL_FORMED, &tags);
        assert!(!report.is_critical());
        assert!(report.structure_warning.is_none());
        assert!(report.tag_warning.is_none());
        assert!(report.closing_warning.is_none());
        assert!(report.unclosed_warning.is_none());
    }

    #[test]
    fn beans_are_extracted_with_simple_class_names() {
        let beans = extract_xml_beans(&scan_xml(WELL_FORMED));
        assert_eq!(beans.len(), 2);
        assert_eq!(beans[0].bean_name, "userRepo");
        assert_eq!(beans[0].class_name, "UserRepo");
        assert_eq!(beans[0].kind, BeanKind::XmlBean);
    }

    #[test]
    fn name_attribute_is_the_identity_fallback() {
        let tags = scan_xml(r#"<beans><bean name="legacy" class="com.acme.Legacy"/></beans>"#);
        let beans = extract_xml_beans(&tags);
        assert_eq!(beans.len(), 1);
        assert_eq!(beans[0].bean_name, "legacy");
    }

    #[test]
    fn bean_tags_without_class_or_identity_are_ignored() {
        let tags = scan_xml(r#"<beans><bean id="x"/><bean class="com.acme.Y"/></beans>"#);
        assert!(extract_xml_beans(&tags).is_empty());
    }

    #[test]
    fn property_ref_wires_from_the_enclosing_bean() {
        let tags = scan_xml(WELL_FORMED);
        let beans = extract_xml_beans(&tags);
        let out = resolve_xml_wirings(&tags, &beans);
        assert_eq!(out.wirings.len(), 1);
        let w = &out.wirings[0];
        assert_eq!(w.from, "userService");
        assert_eq!(w.to.as_deref(), Some("userRepo"));
        assert_eq!(w.mechanism, Mechanism::XmlProperty);
        assert_eq!(w.metadata.param_or_field_name.as_deref(), Some("repo"));
        assert!(out.broken.is_empty());
    }

    #[test]
    fn constructor_arg_ref_gets_its_own_mechanism() {
        let text = r#"<?xml version="1.0"?>
<beans>
    <bean id="engine" class="Engine"/>
    <bean id="car" class="Car">
        <constructor-arg ref="engine"/>
    </bean>
</beans>"#;
        let tags = scan_xml(text);
        let beans = extract_xml_beans(&tags);
        let out = resolve_xml_wirings(&tags, &beans);
        assert_eq!(out.wirings.len(), 1);
        assert_eq!(out.wirings[0].mechanism, Mechanism::XmlConstructor);
    }

    #[test]
    fn broken_ref_is_reported_and_excluded() {
        let text = r#"<?xml version="1.0"?>
<beans>
    <bean id="car" class="Car">
        <property name="engine" ref="missingEngine"/>
    </bean>
</beans>"#;
        let tags = scan_xml(text);
        let beans = extract_xml_beans(&tags);
        let out = resolve_xml_wirings(&tags, &beans);
        assert!(out.wirings.is_empty());
        assert_eq!(out.broken.len(), 1);
        assert_eq!(out.broken[0].code, XML_BROKEN_WIRING);
        assert!(out.broken[0].message.contains("missingEngine"));
    }

    #[test]
    fn missing_prolog_is_a_soft_warning() {
        let text = "<beans>\n<bean id=\"a\" class=\"A\"/>\n</beans>";
        let tags = scan_xml(text);
        let report = validate_structure(text, &tags);
        assert!(!report.is_critical());
        let warning = report.structure_warning.expect("prolog warning");
        assert_eq!(warning.code, XML_NO_PROLOG);
    }

    #[test]
    fn missing_root_close_is_critical() {
        let text = "<?xml version=\"1.0\"?>\n<beans>\n<bean id=\"a\" class=\"A\"/>\n";
        let tags = scan_xml(text);
        let report = validate_structure(text, &tags);
        assert!(report.is_critical());
        assert_eq!(
            report.closing_warning.expect("closing warning").code,
            XML_NO_ROOT_CLOSE
        );
    }

    #[test]
    fn unknown_tags_warn_without_being_critical() {
        let text = "<?xml version=\"1.0\"?>\n<beans>\n<beaasdns id=\"x\"/>\n</beans>";
        let tags = scan_xml(text);
        let report = validate_structure(text, &tags);
        assert!(!report.is_critical());
        let warning = report.tag_warning.expect("tag warning");
        assert_eq!(warning.code, XML_INVALID_TAG);
        assert!(warning.message.contains("beaasdns"));
    }

    #[test]
    fn unclosed_bean_is_reported_by_id_and_critical() {
        let text = "<?xml version=\"1.0\"?>\n<beans>\n<bean id=\"left\" class=\"L\">\n</beans>";
        let tags = scan_xml(text);
        let report = validate_structure(text, &tags);
        assert!(report.is_critical());
        let warning = report.unclosed_warning.expect("unclosed warning");
        assert_eq!(warning.code, XML_UNCLOSED_BEAN);
        assert!(warning.message.contains("left"));
    }

    #[test]
    fn unclosed_bean_without_id_uses_positional_placeholder() {
        let text = "<?xml version=\"1.0\"?>\n<beans>\n<bean class=\"L\">\n</beans>";
        let tags = scan_xml(text);
        let report = validate_structure(text, &tags);
        let warning = report.unclosed_warning.expect("unclosed warning");
        assert!(warning.message.contains("bean_3"));
    }

    #[test]
    fn root_imbalance_is_critical() {
        let text = "<?xml version=\"1.0\"?>\n<beans>\n<beans>\n</beans>";
        let tags = scan_xml(text);
        let report = validate_structure(text, &tags);
        assert!(report.is_critical());
        assert_eq!(
            report.tag_warning.expect("tag warning").code,
            XML_ROOT_IMBALANCE
        );
    }
}
