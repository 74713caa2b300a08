//! Tolerant tag scanner for the XML configuration dialect.
//!
//! Deliberately not a conforming XML parser: the structural validator has to
//! classify broken input (unclosed elements, stray tags, missing prologs)
//! that a real parser rejects up front. The scanner never fails; it reports
//! whatever tag-shaped things it can find, in source order, with their line
//! numbers.

use beanlens_types::Span;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TagKind {
    /// `<?xml ... ?>` (or any `<? ... ?>` processing instruction).
    Prolog,
    /// `<name ...>`
    Open,
    /// `<name ... />`
    SelfClosing,
    /// `</name>`
    Close,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    pub kind: TagKind,
    pub name: String,
    /// Attributes in source order. Values keep escapes as written.
    pub attrs: Vec<(String, String)>,
    pub span: Span,
    /// 1-based line of the `<`.
    pub line: usize,
}

impl Tag {
    /// First value of the named attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// All values of the named attribute, in source order.
    pub fn attr_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        self.attrs
            .iter()
            .filter(move |(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Scan `text` for tags. Total over arbitrary input; anything that does not
/// look like a tag is skipped.
pub fn scan_tags(text: &str) -> Vec<Tag> {
    let bytes = text.as_bytes();
    let mut tags = Vec::new();
    let mut line = 1usize;
    let mut i = 0usize;

    while i < bytes.len() {
        let b = bytes[i];
        if b == b'\n' {
            line += 1;
            i += 1;
            continue;
        }
        if b != b'<' {
            i += 1;
            continue;
        }

        let start = i;
        let start_line = line;

        // Processing instruction / prolog.
        if text[i..].starts_with("<?") {
            let end = match text[i + 2..].find("?>") {
                Some(rel) => i + 2 + rel + 2,
                None => text.len(),
            };
            line += text[i..end].bytes().filter(|&b| b == b'\n').count();
            tags.push(Tag {
                kind: TagKind::Prolog,
                name: scan_name(&text[i + 2..end]),
                attrs: Vec::new(),
                span: Span::new(start, end),
                line: start_line,
            });
            i = end;
            continue;
        }

        // Comments are opaque.
        if text[i..].starts_with("<!--") {
            let end = match text[i + 4..].find("-->") {
                Some(rel) => i + 4 + rel + 3,
                None => text.len(),
            };
            line += text[i..end].bytes().filter(|&b| b == b'\n').count();
            i = end;
            continue;
        }

        let is_close = text[i..].starts_with("</");
        let name_start = if is_close { i + 2 } else { i + 1 };
        let name = scan_name(&text[name_start..]);
        if name.is_empty() {
            i += 1;
            continue;
        }

        // Find the tag end, respecting quoted attribute values.
        let mut j = name_start + name.len();
        let mut quote: Option<u8> = None;
        let mut end = text.len();
        while j < bytes.len() {
            let c = bytes[j];
            match quote {
                Some(q) => {
                    if c == q {
                        quote = None;
                    }
                }
                None => match c {
                    b'"' | b'\'' => quote = Some(c),
                    b'>' => {
                        end = j + 1;
                        break;
                    }
                    b'<' => {
                        // Unterminated tag; treat everything up to here as
                        // the tag and rescan from the new `<`.
                        end = j;
                        break;
                    }
                    _ => {}
                },
            }
            j += 1;
        }

        let inner = &text[name_start + name.len()..end.min(text.len())];
        let inner = inner.trim_end_matches('>');
        let self_closing = !is_close && inner.trim_end().ends_with('/');
        let kind = if is_close {
            TagKind::Close
        } else if self_closing {
            TagKind::SelfClosing
        } else {
            TagKind::Open
        };
        let attrs = if is_close {
            Vec::new()
        } else {
            scan_attrs(inner.trim_end_matches('/'))
        };

        line += text[start..end].bytes().filter(|&b| b == b'\n').count();
        tags.push(Tag {
            kind,
            name,
            attrs,
            span: Span::new(start, end),
            line: start_line,
        });
        i = end.max(start + 1);
    }

    tags
}

fn scan_name(text: &str) -> String {
    text.chars()
        .take_while(|&c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':' || c == '.')
        .collect()
}

/// `name = "value"` pairs, with either quote style and loose whitespace.
/// Attributes without a quoted value are skipped.
fn scan_attrs(text: &str) -> Vec<(String, String)> {
    let bytes = text.as_bytes();
    let mut attrs = Vec::new();
    let mut i = 0usize;

    while i < bytes.len() {
        if !(bytes[i] as char).is_ascii_alphabetic() {
            i += 1;
            continue;
        }

        let name_start = i;
        while i < bytes.len() {
            let c = bytes[i] as char;
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == ':' || c == '.' {
                i += 1;
            } else {
                break;
            }
        }
        let name = &text[name_start..i];

        while i < bytes.len() && (bytes[i] as char).is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] != b'=' {
            continue;
        }
        i += 1;
        while i < bytes.len() && (bytes[i] as char).is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() || (bytes[i] != b'"' && bytes[i] != b'\'') {
            continue;
        }
        let q = bytes[i];
        i += 1;
        let value_start = i;
        while i < bytes.len() && bytes[i] != q {
            i += 1;
        }
        let value = &text[value_start..i.min(text.len())];
        if i < bytes.len() {
            i += 1;
        }

        attrs.push((name.to_string(), value.to_string()));
    }

    attrs
}
