//! Tokenizing and scanning primitives for the Beanlens analysis pipeline.
//!
//! Two dialects are covered, each with a deliberately small surface:
//! - [`lexer`] + [`java`]: a hand-written lexer and a tolerant
//!   recursive-descent scanner for the annotated-class dialect. Only the
//!   fixed grammar subset the analysis needs is recognized (annotated type
//!   declarations, `implements` lists, fields, methods, constructors).
//! - [`xml`]: a best-effort tag scanner for the XML configuration dialect
//!   that keeps working on structurally broken input.
//!
//! Both layers are total: arbitrary input produces a (possibly empty)
//! result, never a panic.

pub mod java;
pub mod lexer;
pub mod xml;

pub use java::{
    matching_delimiter, scan_source, scan_unit, Annotation, ConstructorDecl, FieldDecl,
    MemberDecl, MethodDecl, ParamDecl, SourceUnit, TypeDecl, TypeKind,
};
pub use lexer::{lex, lex_with_errors, LexError, Lexer, Token, TokenKind};

/// Simplify a type-like string down to its unqualified base type: strips
/// whitespace, generic arguments, array suffixes, and package qualifiers.
pub fn simplify_type(raw: &str) -> String {
    let compact: String = raw.split_whitespace().collect();
    if compact.is_empty() {
        return String::new();
    }

    let mut no_generics = String::with_capacity(compact.len());
    let mut depth = 0u32;
    for ch in compact.chars() {
        match ch {
            '<' => depth += 1,
            '>' => depth = depth.saturating_sub(1),
            _ if depth == 0 => no_generics.push(ch),
            _ => {}
        }
    }

    let no_array = no_generics.trim_end_matches("[]");
    no_array.rsplit('.').next().unwrap_or(no_array).to_string()
}

/// Lower-camel-case a type name: `UserService` -> `userService`.
pub fn lower_camel_case(name: &str) -> String {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let mut out = String::new();
    out.extend(first.to_lowercase());
    out.push_str(chars.as_str());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn simplifies_types() {
        assert_eq!(simplify_type("Foo"), "Foo");
        assert_eq!(simplify_type("com.acme.Foo"), "Foo");
        assert_eq!(simplify_type("List<Foo>"), "List");
        assert_eq!(simplify_type("java.util.Map<String, Foo>[]"), "Map");
        assert_eq!(simplify_type("  Foo  "), "Foo");
        assert_eq!(simplify_type(""), "");
    }

    #[test]
    fn lower_camel_cases_names() {
        assert_eq!(lower_camel_case("UserService"), "userService");
        assert_eq!(lower_camel_case("X"), "x");
        assert_eq!(lower_camel_case(""), "");
    }
}
