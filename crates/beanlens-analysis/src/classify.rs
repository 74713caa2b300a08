//! Dialect sniffing.

/// Which dialect a source blob is written in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceDialect {
    /// Annotated-class dialect (the Java subset).
    Java,
    /// XML configuration dialect.
    Xml,
}

/// Cheap structural sniff. A blob is XML when it starts with an XML prolog
/// or mentions the dialect's element markers anywhere; everything else is
/// treated as the class dialect. Misclassification is caught downstream by
/// the validators, never here.
pub fn classify_source(source: &str) -> SourceDialect {
    if source.trim_start().starts_with("<?xml")
        || source.contains("<beans")
        || source.contains("<bean")
    {
        SourceDialect::Xml
    } else {
        SourceDialect::Java
    }
}
