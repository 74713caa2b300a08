//! Semantic validation for the class dialect. Each check is independent and
//! never stops the analysis.

use beanlens_parse::{LexError, SourceUnit, Token, TokenKind};
use beanlens_types::{Diagnostic, Span};

use crate::model::Bean;

pub const BEAN_DUPLICATE_NAME: &str = "BEAN_DUPLICATE_NAME";
pub const BEAN_DUPLICATE_CLASS: &str = "BEAN_DUPLICATE_CLASS";
pub const BEAN_MULTI_NAME: &str = "BEAN_MULTI_NAME";
pub const SRC_BRACE_IMBALANCE: &str = "SRC_BRACE_IMBALANCE";
pub const SRC_LEX: &str = "SRC_LEX";

#[derive(Clone, Debug, Default)]
pub struct SemanticReport {
    pub bracket_warning: Option<Diagnostic>,
    pub errors: Vec<Diagnostic>,
    pub multi_name_warning: Option<Diagnostic>,
    pub lex_warnings: Vec<Diagnostic>,
}

/// Count occurrences per name, keeping first-appearance order so the
/// diagnostics come out in source order.
fn ordered_counts<'a>(names: impl Iterator<Item = &'a str>) -> Vec<(&'a str, usize)> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for name in names {
        match counts.iter_mut().find(|(n, _)| *n == name) {
            Some((_, count)) => *count += 1,
            None => counts.push((name, 1)),
        }
    }
    counts
}

pub fn validate_java(
    tokens: &[Token],
    lex_errors: &[LexError],
    unit: &SourceUnit,
    beans: &[Bean],
) -> SemanticReport {
    let mut report = SemanticReport::default();

    let open = tokens.iter().filter(|t| t.kind == TokenKind::LBrace).count();
    let close = tokens.iter().filter(|t| t.kind == TokenKind::RBrace).count();
    if open != close {
        report.bracket_warning = Some(Diagnostic::warning(
            SRC_BRACE_IMBALANCE,
            format!("opening brace count ({open}) does not match closing brace count ({close})"),
            None,
        ));
    }

    for err in lex_errors {
        let offset = match err {
            LexError::UnterminatedString(offset) => *offset,
            LexError::UnterminatedBlockComment(offset) => *offset,
        };
        report.lex_warnings.push(Diagnostic::warning(
            SRC_LEX,
            err.to_string(),
            Some(Span::new(offset, offset + 1)),
        ));
    }

    let declared = crate::extract::declared_classes(unit);
    for (name, count) in ordered_counts(declared.into_iter()) {
        if count > 1 {
            report.errors.push(Diagnostic::error(
                BEAN_DUPLICATE_CLASS,
                format!("{count} public classes named '{name}'; duplicate type declarations are invalid"),
                None,
            ));
        }
    }

    for (name, count) in ordered_counts(beans.iter().map(|b| b.bean_name.as_str())) {
        if count > 1 {
            report.errors.push(Diagnostic::error(
                BEAN_DUPLICATE_NAME,
                format!("{count} beans share the name '{name}'"),
                None,
            ));
        }
    }

    // One class registered under several distinct bean names. Single slot;
    // with several offending classes the last one (in first-appearance
    // order) wins.
    let mut class_names: Vec<(&str, Vec<&str>)> = Vec::new();
    for bean in beans {
        match class_names
            .iter_mut()
            .find(|(class, _)| *class == bean.class_name)
        {
            Some((_, names)) => {
                if !names.contains(&bean.bean_name.as_str()) {
                    names.push(&bean.bean_name);
                }
            }
            None => class_names.push((&bean.class_name, vec![&bean.bean_name])),
        }
    }
    for (class, names) in &class_names {
        if names.len() > 1 {
            report.multi_name_warning = Some(Diagnostic::warning(
                BEAN_MULTI_NAME,
                format!(
                    "class '{class}' is registered as more than one bean: {}",
                    names.join(", ")
                ),
                None,
            ));
        }
    }

    report
}
