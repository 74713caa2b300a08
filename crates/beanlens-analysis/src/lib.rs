//! Bean-graph analysis for Beanlens.
//!
//! One entry point, [`analyze`], turns a source blob (annotated-class
//! dialect or XML configuration dialect) into the model the rendering
//! layer consumes:
//! - bean discovery (stereotype classes, `@Configuration`/`@Bean` factory
//!   methods, `<bean>` elements)
//! - wiring resolution across field, method, constructor, config-factory
//!   and XML ref mechanisms
//! - structural and semantic validation diagnostics
//! - dependency cycles
//! - layered level assignment for hierarchical layout
//!
//! Every pass is a pure function of the source text: stateless across
//! invocations, total over arbitrary input, and deterministic down to
//! diagnostic ordering.

mod autowire;
mod classify;
mod cycles;
mod extract;
mod factory;
mod layout;
mod model;
mod validate;
mod xml;

use tracing::debug;

pub use autowire::{
    resolve_constructor_wirings, resolve_field_wirings, resolve_method_wirings, FieldWirings,
    ParamWirings, WIRE_AMBIGUOUS_BEAN, WIRE_INVALID_TARGET, WIRE_NO_BEAN, WIRE_UNKNOWN_QUALIFIER,
    WIRE_UNKNOWN_TYPE,
};
pub use classify::{classify_source, SourceDialect};
pub use cycles::detect_cycles;
pub use extract::{
    declared_classes, declared_interfaces, extract_beans, filter_missing_factory_classes,
    BEAN_MISSING_CLASS,
};
pub use factory::{resolve_factory_wirings, FactoryWirings, FACTORY_NO_BEAN};
pub use layout::bean_levels;
pub use model::{Analysis, Bean, BeanKind, Diagnostics, Mechanism, Wiring, WiringMetadata};
pub use validate::{
    validate_java, SemanticReport, BEAN_DUPLICATE_CLASS, BEAN_DUPLICATE_NAME, BEAN_MULTI_NAME,
    SRC_BRACE_IMBALANCE, SRC_LEX,
};
pub use xml::{
    extract_xml_beans, resolve_xml_wirings, validate_structure, XmlStructureReport, XmlWirings,
    XML_BROKEN_WIRING, XML_INVALID_CLOSE, XML_INVALID_TAG, XML_NO_PROLOG, XML_NO_ROOT,
    XML_NO_ROOT_CLOSE, XML_ROOT_IMBALANCE, XML_UNCLOSED_BEAN,
};

pub use beanlens_types::{Diagnostic, Severity, Span};

/// Options that influence one analysis pass.
///
/// The defaults match the documented behavior; the switches exist for
/// consumers that want the raw, unnormalized variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzeOptions {
    /// Normalize and deduplicate cycles recorded under different rotations
    /// by the multi-root DFS. Off, every recorded loop is kept as-is.
    pub dedupe_cycles: bool,
}

impl Default for AnalyzeOptions {
    fn default() -> Self {
        Self {
            dedupe_cycles: true,
        }
    }
}

/// Analyze a source blob with default options.
pub fn analyze(source: &str) -> Analysis {
    analyze_with_options(source, AnalyzeOptions::default())
}

/// Analyze a source blob.
pub fn analyze_with_options(source: &str, options: AnalyzeOptions) -> Analysis {
    let dialect = classify_source(source);
    debug!(?dialect, len = source.len(), "classified source");

    let analysis = match dialect {
        SourceDialect::Xml => analyze_xml(source, options),
        SourceDialect::Java => analyze_java(source, options),
    };

    debug!(
        beans = analysis.beans.len(),
        wirings = analysis.wirings.len(),
        diagnostics = analysis.diagnostics.len(),
        cycles = analysis.cycles.len(),
        "analysis complete"
    );
    analysis
}

fn analyze_xml(source: &str, options: AnalyzeOptions) -> Analysis {
    let tags = beanlens_parse::xml::scan_tags(source);
    let report = validate_structure(source, &tags);

    let mut diagnostics = Diagnostics::default();
    let critical = report.is_critical();
    diagnostics.xml_structure_warning = report.structure_warning;
    diagnostics.xml_tag_warning = report.tag_warning;
    diagnostics.xml_closing_warning = report.closing_warning;
    diagnostics.bean_unclosed_warning = report.unclosed_warning;

    if critical {
        // Fail-safe: structurally broken XML never becomes a partial graph.
        debug!("critical XML structure failure; skipping extraction");
        return Analysis {
            beans: Vec::new(),
            wirings: Vec::new(),
            diagnostics,
            cycles: Vec::new(),
            levels: Vec::new(),
        };
    }

    let beans = extract_xml_beans(&tags);
    let resolved = resolve_xml_wirings(&tags, &beans);
    diagnostics.broken_xml_wirings = resolved.broken;

    let cycles = detect_cycles(&beans, &resolved.wirings, options.dedupe_cycles);
    let levels = bean_levels(&beans, &resolved.wirings);

    Analysis {
        beans,
        wirings: resolved.wirings,
        diagnostics,
        cycles,
        levels,
    }
}

fn analyze_java(source: &str, options: AnalyzeOptions) -> Analysis {
    let (tokens, lex_errors) = beanlens_parse::lex_with_errors(source);
    let unit = beanlens_parse::scan_unit(&tokens);

    let extracted = extract_beans(&unit);
    let (beans, missing_class_warnings) = filter_missing_factory_classes(extracted, &unit);

    let fields = resolve_field_wirings(&unit, &beans);
    let methods = resolve_method_wirings(&unit, &beans);
    let constructors = resolve_constructor_wirings(&unit, &beans);
    let factories = resolve_factory_wirings(&unit, &beans);
    let semantic = validate_java(&tokens, &lex_errors, &unit, &beans);

    let mut wirings = fields.wirings;
    wirings.extend(methods.wirings);
    wirings.extend(constructors.wirings);
    wirings.extend(factories.wirings);

    let diagnostics = Diagnostics {
        bracket_warning: semantic.bracket_warning,
        errors: semantic.errors,
        multi_name_warning: semantic.multi_name_warning,
        missing_class_warnings,
        lex_warnings: semantic.lex_warnings,
        invalid_field_targets: fields.invalid_targets,
        missing_field_types: fields.missing_types,
        missing_method_types: methods.missing_types,
        ambiguous_method_wirings: methods.ambiguous,
        missing_constructor_types: constructors.missing_types,
        ambiguous_constructor_wirings: constructors.ambiguous,
        missing_config_types: factories.missing_types,
        ..Diagnostics::default()
    };

    let cycles = detect_cycles(&beans, &wirings, options.dedupe_cycles);
    let levels = bean_levels(&beans, &wirings);

    Analysis {
        beans,
        wirings,
        diagnostics,
        cycles,
        levels,
    }
}
