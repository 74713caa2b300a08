//! Scanner for the annotated-class dialect.
//!
//! This is intentionally *not* a Java parser. It recognizes the fixed subset
//! the analysis needs: type declarations with their annotations and
//! `implements` lists, and class members (fields, methods, constructors)
//! with their annotations and parameters. Everything else is skipped
//! tolerantly; the scanner is total over arbitrary token streams.

use std::collections::HashMap;

use beanlens_types::Span;

use crate::lexer::{Token, TokenKind};

/// Index of the delimiter token matching the opener at `open`, counting
/// nested pairs of the same kind. Returns `None` when the stream ends before
/// the pair balances. This is the one balanced-delimiter scan every body
/// extraction in the pipeline goes through.
pub fn matching_delimiter(tokens: &[Token], open: usize) -> Option<usize> {
    let close_kind = match tokens.get(open)?.kind {
        TokenKind::LBrace => TokenKind::RBrace,
        TokenKind::LParen => TokenKind::RParen,
        TokenKind::LBracket => TokenKind::RBracket,
        TokenKind::Lt => TokenKind::Gt,
        _ => return None,
    };
    let open_kind = tokens[open].kind;

    let mut depth = 0usize;
    for (idx, tok) in tokens.iter().enumerate().skip(open) {
        if tok.kind == open_kind {
            depth += 1;
        } else if tok.kind == close_kind {
            depth -= 1;
            if depth == 0 {
                return Some(idx);
            }
        }
    }
    None
}

/// A scanned annotation, e.g. `@Service("userService")`.
///
/// String and char literal arguments have their quotes stripped; other
/// argument expressions are kept as raw text. A single positional argument
/// is stored under the key `value`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Annotation {
    pub simple_name: String,
    pub args: HashMap<String, String>,
    pub span: Span,
}

impl Annotation {
    pub fn arg(&self, key: &str) -> Option<&str> {
        self.args.get(key).map(String::as_str)
    }

    /// The `value`-or-`name` argument, the spelling stereotype markers use
    /// for an explicit bean name.
    pub fn explicit_name(&self) -> Option<&str> {
        self.arg("value")
            .or_else(|| self.arg("name"))
            .filter(|s| !s.is_empty())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Interface,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDecl {
    pub kind: TypeKind,
    pub name: String,
    pub name_span: Span,
    pub modifiers: Vec<String>,
    pub annotations: Vec<Annotation>,
    pub extends: Option<String>,
    /// Declared `implements` list, simplified to bare type names.
    pub implements: Vec<String>,
    pub members: Vec<MemberDecl>,
}

impl TypeDecl {
    pub fn is_public(&self) -> bool {
        self.modifiers.iter().any(|m| m == "public")
    }

    pub fn annotation(&self, simple_name: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.simple_name == simple_name)
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDecl> {
        self.members.iter().filter_map(|m| match m {
            MemberDecl::Field(f) => Some(f),
            _ => None,
        })
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodDecl> {
        self.members.iter().filter_map(|m| match m {
            MemberDecl::Method(m) => Some(m),
            _ => None,
        })
    }

    pub fn constructors(&self) -> impl Iterator<Item = &ConstructorDecl> {
        self.members.iter().filter_map(|m| match m {
            MemberDecl::Constructor(c) => Some(c),
            _ => None,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemberDecl {
    Field(FieldDecl),
    Method(MethodDecl),
    Constructor(ConstructorDecl),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldDecl {
    pub annotations: Vec<Annotation>,
    pub modifiers: Vec<String>,
    pub ty: String,
    pub name: String,
    pub name_span: Span,
}

impl FieldDecl {
    pub fn is_static(&self) -> bool {
        self.modifiers.iter().any(|m| m == "static")
    }

    pub fn is_final(&self) -> bool {
        self.modifiers.iter().any(|m| m == "final")
    }

    pub fn annotation(&self, simple_name: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.simple_name == simple_name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodDecl {
    pub annotations: Vec<Annotation>,
    pub modifiers: Vec<String>,
    pub return_ty: String,
    pub name: String,
    pub name_span: Span,
    pub params: Vec<ParamDecl>,
    pub has_body: bool,
}

impl MethodDecl {
    pub fn annotation(&self, simple_name: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.simple_name == simple_name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConstructorDecl {
    pub annotations: Vec<Annotation>,
    pub modifiers: Vec<String>,
    pub params: Vec<ParamDecl>,
}

impl ConstructorDecl {
    pub fn annotation(&self, simple_name: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.simple_name == simple_name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamDecl {
    pub annotations: Vec<Annotation>,
    pub ty: String,
    pub name: String,
    pub name_span: Span,
}

impl ParamDecl {
    pub fn annotation(&self, simple_name: &str) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.simple_name == simple_name)
    }
}

/// The scanned compilation unit: just its type declarations, in source order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceUnit {
    pub types: Vec<TypeDecl>,
}

impl SourceUnit {
    pub fn type_named(&self, name: &str) -> Option<&TypeDecl> {
        self.types.iter().find(|t| t.name == name)
    }
}

/// Scan a token stream into a [`SourceUnit`].
pub fn scan_unit(tokens: &[Token]) -> SourceUnit {
    let mut parser = Parser::new(tokens);
    let mut types = Vec::new();
    while !parser.is_eof() {
        if let Some(decl) = parser.parse_type_decl() {
            types.push(decl);
        } else {
            parser.bump();
        }
    }
    SourceUnit { types }
}

/// Convenience: lex + scan in one step.
pub fn scan_source(text: &str) -> SourceUnit {
    scan_unit(&crate::lexer::lex(text))
}

const MODIFIERS: &[&str] = &[
    "public",
    "protected",
    "private",
    "static",
    "final",
    "abstract",
    "synchronized",
    "native",
    "transient",
    "volatile",
    "strictfp",
    "default",
];

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Parser { tokens, pos: 0 }
    }

    fn is_eof(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn peek_n(&self, n: usize) -> Option<&'a Token> {
        self.tokens.get(self.pos + n)
    }

    fn at_kind(&self, kind: TokenKind) -> bool {
        self.peek().is_some_and(|tok| tok.kind == kind)
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        self.peek().is_some_and(|tok| tok.is_ident(keyword))
    }

    fn bump(&mut self) -> Option<&'a Token> {
        let tok = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(tok)
    }

    /// Skip a balanced delimiter pair starting at the current token, or a
    /// single token when the pair never closes.
    fn skip_balanced(&mut self) {
        match matching_delimiter(self.tokens, self.pos) {
            Some(close) => self.pos = close + 1,
            None => self.pos = self.tokens.len(),
        }
    }

    /// Annotations and modifiers, interleaved in any order.
    fn parse_prelude(&mut self) -> (Vec<Annotation>, Vec<String>) {
        let mut annotations = Vec::new();
        let mut modifiers = Vec::new();
        loop {
            if self.at_kind(TokenKind::At)
                && self.peek_n(1).is_some_and(|t| t.kind == TokenKind::Ident)
            {
                if let Some(ann) = self.parse_annotation() {
                    annotations.push(ann);
                    continue;
                }
            }
            match self.peek() {
                Some(tok)
                    if tok.kind == TokenKind::Ident
                        && MODIFIERS.contains(&tok.text.as_str()) =>
                {
                    modifiers.push(tok.text.clone());
                    self.bump();
                }
                _ => break,
            }
        }
        (annotations, modifiers)
    }

    fn parse_annotation(&mut self) -> Option<Annotation> {
        let at = self.bump()?;
        let start = at.range.start;

        let first = self.bump()?;
        let mut simple_name = first.text.clone();
        let mut end = first.range.end;
        while self.at_kind(TokenKind::Dot)
            && self.peek_n(1).is_some_and(|t| t.kind == TokenKind::Ident)
        {
            self.bump();
            let part = self.bump()?;
            simple_name = part.text.clone();
            end = part.range.end;
        }

        let mut args = HashMap::new();
        if self.at_kind(TokenKind::LParen) {
            let open = self.pos;
            match matching_delimiter(self.tokens, open) {
                Some(close) => {
                    parse_annotation_args(&self.tokens[open + 1..close], &mut args);
                    end = self.tokens[close].range.end;
                    self.pos = close + 1;
                }
                None => {
                    // Unbalanced parens; best-effort: consume the rest.
                    parse_annotation_args(&self.tokens[open + 1..], &mut args);
                    end = self.tokens.last().map(|t| t.range.end).unwrap_or(end);
                    self.pos = self.tokens.len();
                }
            }
        }

        Some(Annotation {
            simple_name,
            args,
            span: Span::new(start, end),
        })
    }

    /// A type reference: qualified name plus generic arguments and array
    /// suffixes, captured as raw text.
    fn parse_type_ref(&mut self) -> Option<String> {
        if !self.at_kind(TokenKind::Ident) {
            return None;
        }
        let mut out = self.bump()?.text.clone();

        while self.at_kind(TokenKind::Dot)
            && self.peek_n(1).is_some_and(|t| t.kind == TokenKind::Ident)
        {
            self.bump();
            out.push('.');
            out.push_str(&self.bump()?.text);
        }

        if self.at_kind(TokenKind::Lt) {
            let open = self.pos;
            let close = matching_delimiter(self.tokens, open);
            let close = close.unwrap_or(self.tokens.len().saturating_sub(1));
            for tok in &self.tokens[open..=close.min(self.tokens.len() - 1)] {
                out.push_str(&tok.text);
            }
            self.pos = close + 1;
        }

        while self.at_kind(TokenKind::LBracket)
            && self.peek_n(1).is_some_and(|t| t.kind == TokenKind::RBracket)
        {
            self.bump();
            self.bump();
            out.push_str("[]");
        }

        Some(out)
    }

    fn parse_type_decl(&mut self) -> Option<TypeDecl> {
        let start_pos = self.pos;
        let (annotations, modifiers) = self.parse_prelude();

        let kind = if self.at_keyword("class") {
            TypeKind::Class
        } else if self.at_keyword("interface") {
            TypeKind::Interface
        } else {
            self.pos = start_pos;
            return None;
        };
        self.bump();

        let name_tok = match self.peek() {
            Some(tok) if tok.kind == TokenKind::Ident => self.bump()?,
            _ => {
                self.pos = start_pos;
                return None;
            }
        };
        let name = name_tok.text.clone();
        let name_span = name_tok.range;

        if self.at_kind(TokenKind::Lt) {
            self.skip_balanced();
        }

        let mut extends = None;
        if self.at_keyword("extends") {
            self.bump();
            extends = self.parse_type_ref().map(|t| crate::simplify_type(&t));
            // Interfaces may extend a list; the extras are irrelevant here.
            while self.at_kind(TokenKind::Comma) {
                self.bump();
                self.parse_type_ref();
            }
        }

        let mut implements = Vec::new();
        if self.at_keyword("implements") {
            self.bump();
            if let Some(ty) = self.parse_type_ref() {
                implements.push(crate::simplify_type(&ty));
            }
            while self.at_kind(TokenKind::Comma) {
                self.bump();
                if let Some(ty) = self.parse_type_ref() {
                    implements.push(crate::simplify_type(&ty));
                }
            }
        }

        let mut members = Vec::new();
        if self.at_kind(TokenKind::LBrace) {
            let open = self.pos;
            let close = matching_delimiter(self.tokens, open);
            let body_end = close.unwrap_or(self.tokens.len());
            if kind == TypeKind::Class {
                members = parse_members(&self.tokens[open + 1..body_end], &name);
            }
            self.pos = match close {
                Some(close) => close + 1,
                None => self.tokens.len(),
            };
        }

        Some(TypeDecl {
            kind,
            name,
            name_span,
            modifiers,
            annotations,
            extends,
            implements,
            members,
        })
    }
}

fn parse_members(tokens: &[Token], class_name: &str) -> Vec<MemberDecl> {
    let mut p = Parser::new(tokens);
    let mut members = Vec::new();

    while !p.is_eof() {
        let start_pos = p.pos;
        let (annotations, modifiers) = p.parse_prelude();

        // Nested types are opaque to the analysis; skip them wholesale.
        if p.at_keyword("class")
            || p.at_keyword("interface")
            || p.at_keyword("enum")
            || p.at_keyword("record")
        {
            p.bump();
            if p.at_kind(TokenKind::Ident) {
                p.bump();
            }
            while !p.is_eof() && !p.at_kind(TokenKind::LBrace) && !p.at_kind(TokenKind::Semi) {
                p.bump();
            }
            if p.at_kind(TokenKind::LBrace) {
                p.skip_balanced();
            }
            continue;
        }

        // Constructor: the class's own name followed by a parameter list.
        if p.at_keyword(class_name) && p.peek_n(1).is_some_and(|t| t.kind == TokenKind::LParen) {
            p.bump();
            let params = parse_params(&mut p);
            skip_method_tail(&mut p);
            members.push(MemberDecl::Constructor(ConstructorDecl {
                annotations,
                modifiers,
                params,
            }));
            continue;
        }

        if p.at_kind(TokenKind::Ident) {
            if let Some(ty) = p.parse_type_ref() {
                if p.at_kind(TokenKind::Ident) {
                    let Some(name_tok) = p.bump() else {
                        continue;
                    };
                    if p.at_kind(TokenKind::LParen) {
                        let params = parse_params(&mut p);
                        let has_body = skip_method_tail(&mut p);
                        members.push(MemberDecl::Method(MethodDecl {
                            annotations,
                            modifiers,
                            return_ty: ty,
                            name: name_tok.text.clone(),
                            name_span: name_tok.range,
                            params,
                            has_body,
                        }));
                    } else {
                        parse_field_declarators(
                            &mut p,
                            &mut members,
                            annotations,
                            modifiers,
                            ty,
                            name_tok,
                        );
                    }
                    continue;
                }
            }
            // Type not followed by a name (generic methods, stray tokens):
            // tokens were consumed, so the loop still progresses.
            continue;
        }

        // Initializer blocks and anything else we do not model.
        if p.at_kind(TokenKind::LBrace) {
            p.skip_balanced();
            continue;
        }
        if p.pos == start_pos {
            p.bump();
        }
    }

    members
}

/// One or more field declarators sharing a type: `Foo a;`, `Foo a, b = x;`.
fn parse_field_declarators(
    p: &mut Parser<'_>,
    members: &mut Vec<MemberDecl>,
    annotations: Vec<Annotation>,
    modifiers: Vec<String>,
    ty: String,
    first_name: &Token,
) {
    members.push(MemberDecl::Field(FieldDecl {
        annotations: annotations.clone(),
        modifiers: modifiers.clone(),
        ty: ty.clone(),
        name: first_name.text.clone(),
        name_span: first_name.range,
    }));

    loop {
        if p.at_kind(TokenKind::Eq) {
            skip_initializer(p);
        }
        if p.at_kind(TokenKind::Comma) {
            p.bump();
            if p.at_kind(TokenKind::Ident) {
                let Some(name_tok) = p.bump() else {
                    break;
                };
                members.push(MemberDecl::Field(FieldDecl {
                    annotations: annotations.clone(),
                    modifiers: modifiers.clone(),
                    ty: ty.clone(),
                    name: name_tok.text.clone(),
                    name_span: name_tok.range,
                }));
                continue;
            }
        }
        break;
    }
    if p.at_kind(TokenKind::Semi) {
        p.bump();
    }
}

/// Skip a field initializer expression, stopping before the `,` or `;` that
/// ends the declarator (at delimiter depth zero).
fn skip_initializer(p: &mut Parser<'_>) {
    p.bump(); // the `=`
    let mut depth = 0i32;
    while let Some(tok) = p.peek() {
        match tok.kind {
            TokenKind::LParen | TokenKind::LBrace | TokenKind::LBracket => depth += 1,
            TokenKind::RParen | TokenKind::RBrace | TokenKind::RBracket => depth -= 1,
            TokenKind::Semi | TokenKind::Comma if depth <= 0 => return,
            _ => {}
        }
        p.bump();
    }
}

/// Parameter list of a method or constructor; the parser must be at `(`.
fn parse_params(p: &mut Parser<'_>) -> Vec<ParamDecl> {
    let open = p.pos;
    let close = match matching_delimiter(p.tokens, open) {
        Some(close) => close,
        None => {
            p.pos = p.tokens.len();
            return Vec::new();
        }
    };

    let inner = &p.tokens[open + 1..close];
    p.pos = close + 1;

    split_top_level_commas(inner)
        .into_iter()
        .filter_map(parse_param)
        .collect()
}

fn parse_param(tokens: &[Token]) -> Option<ParamDecl> {
    let mut p = Parser::new(tokens);
    let (annotations, _modifiers) = p.parse_prelude();
    let ty = p.parse_type_ref()?;
    // Varargs: `Foo... names`.
    while p.at_kind(TokenKind::Dot) {
        p.bump();
    }
    let name_tok = match p.peek() {
        Some(tok) if tok.kind == TokenKind::Ident => p.bump()?,
        _ => return None,
    };
    Some(ParamDecl {
        annotations,
        ty,
        name: name_tok.text.clone(),
        name_span: name_tok.range,
    })
}

/// Skip a method/constructor tail after the parameter list: `throws` clause
/// plus either a braced body or a terminating semicolon. Returns whether a
/// body was present.
fn skip_method_tail(p: &mut Parser<'_>) -> bool {
    while !p.is_eof() && !p.at_kind(TokenKind::LBrace) && !p.at_kind(TokenKind::Semi) {
        p.bump();
    }
    if p.at_kind(TokenKind::LBrace) {
        p.skip_balanced();
        true
    } else {
        if p.at_kind(TokenKind::Semi) {
            p.bump();
        }
        false
    }
}

fn split_top_level_commas(tokens: &[Token]) -> Vec<&[Token]> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut last = 0usize;
    for (idx, tok) in tokens.iter().enumerate() {
        match tok.kind {
            TokenKind::LParen | TokenKind::LBrace | TokenKind::LBracket | TokenKind::Lt => {
                depth += 1
            }
            TokenKind::RParen | TokenKind::RBrace | TokenKind::RBracket | TokenKind::Gt => {
                depth -= 1
            }
            TokenKind::Comma if depth <= 0 => {
                out.push(&tokens[last..idx]);
                last = idx + 1;
            }
            _ => {}
        }
    }
    out.push(&tokens[last..]);
    out.retain(|seg| !seg.is_empty());
    out
}

fn parse_annotation_args(tokens: &[Token], out: &mut HashMap<String, String>) {
    for seg in split_top_level_commas(tokens) {
        match seg {
            [key, eq, rest @ ..]
                if key.kind == TokenKind::Ident && eq.kind == TokenKind::Eq && !rest.is_empty() =>
            {
                out.insert(key.text.clone(), literal_text(rest));
            }
            _ => {
                out.insert("value".to_string(), literal_text(seg));
            }
        }
    }
}

fn literal_text(tokens: &[Token]) -> String {
    if let [tok] = tokens {
        if tok.kind == TokenKind::StringLiteral {
            return tok.string_value().to_string();
        }
    }
    tokens.iter().map(|t| t.text.as_str()).collect()
}
