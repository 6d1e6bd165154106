//! Sanity checks on the expressions captured from a template. Expressions
//! are spliced into generated code verbatim, so anything that would break
//! that code is reported here instead of surfacing as a failed render.
//! Listener bodies stay raw source and only get the lexical checks; every
//! other expression must also parse in the render expression language.

use crate::diagnostics::Diagnostics;
use crate::runtime::program::{parse_expression, parse_pattern};
use crate::template_ast::{Ast, ElementNode, Node, SourceRange, TextToken};
use crate::template_parse::attrs::is_directive_attr;

/// Keywords that can never appear as a bare identifier in an expression.
const PROHIBITED_KEYWORDS: &[&str] = &[
    "do", "if", "for", "let", "try", "var", "case", "else", "with", "break", "catch", "const",
    "throw", "while", "export", "import", "return", "switch", "default", "extends", "finally",
    "continue", "debugger",
];

const UNARY_OPERATORS: &[&str] = &["delete", "typeof", "void"];

pub fn detect_errors(ast: &Ast, diag: &mut Diagnostics) {
    if let Some(root) = &ast.root {
        check_element(root, diag);
    }
}

fn check_element(el: &ElementNode, diag: &mut Diagnostics) {
    if el.pre {
        return;
    }
    for (name, value) in &el.attrs_map {
        let Some(value) = value.as_deref().filter(|v| !v.is_empty()) else {
            continue;
        };
        if !is_directive_attr(name) {
            continue;
        }
        let raw = format!("{name}=\"{value}\"");
        if name == "v-for" {
            check_for(el, &raw, diag);
        } else if name == "v-slot" || name.starts_with("v-slot:") || name.starts_with('#') {
            continue;
        } else if name.starts_with('@') || name.starts_with("v-on:") {
            check_event(value, &raw, el.range, diag);
        } else {
            check_expression(value, &raw, el.range, diag);
        }
    }
    for child in &el.children {
        match child {
            Node::Element(child) => check_element(child, diag),
            Node::Text(text) => {
                for token in &text.tokens {
                    if let TextToken::Binding(exp) = token {
                        check_expression(exp, &text.text, text.range, diag);
                    }
                }
            }
            Node::Comment(_) => {}
        }
    }
    for branch in &el.if_branches {
        check_element(&branch.block, diag);
    }
}

fn check_for(el: &ElementNode, raw: &str, diag: &mut Diagnostics) {
    let Some(for_loop) = &el.for_loop else {
        return;
    };
    check_expression(&for_loop.source, raw, el.range, diag);
    check_identifier(Some(for_loop.alias.as_str()), "alias", raw, el.range, diag);
    check_identifier(for_loop.iterator1.as_deref(), "iterator", raw, el.range, diag);
    check_identifier(for_loop.iterator2.as_deref(), "iterator", raw, el.range, diag);
}

fn check_identifier(ident: Option<&str>, kind: &str, raw: &str, range: SourceRange, diag: &mut Diagnostics) {
    let Some(ident) = ident else {
        return;
    };
    if parse_pattern(ident).is_err() {
        diag.error(
            format!("invalid v-for {kind} \"{ident}\" in expression: {}", raw.trim()),
            Some(range),
        );
    }
}

fn check_event(exp: &str, raw: &str, range: SourceRange, diag: &mut Diagnostics) {
    let stripped = strip_strings(exp);
    if let Some(op) = find_unary_call(&stripped) {
        diag.error(
            format!(
                "avoid using JavaScript unary operator as property name: \"{op}\" in expression {}",
                raw.trim()
            ),
            Some(range),
        );
    }
    check_syntax(exp, raw, range, diag);
}

fn check_expression(exp: &str, raw: &str, range: SourceRange, diag: &mut Diagnostics) {
    if check_syntax(exp, raw, range, diag) && parse_expression(exp).is_err() {
        diag.error(
            format!(
                "invalid expression: unsupported syntax in\n\n    {exp}\n\n  Raw expression: {}\n",
                raw.trim()
            ),
            Some(range),
        );
    }
}

/// Keyword and bracket checks. Returns false once an error is reported.
fn check_syntax(exp: &str, raw: &str, range: SourceRange, diag: &mut Diagnostics) -> bool {
    let stripped = strip_strings(exp);
    if let Some(keyword) = find_keyword(&stripped) {
        diag.error(
            format!(
                "avoid using JavaScript keyword as property name: \"{keyword}\"\n  Raw expression: {}",
                raw.trim()
            ),
            Some(range),
        );
        return false;
    }
    if let Err(reason) = check_balance(exp) {
        diag.error(
            format!(
                "invalid expression: {reason} in\n\n    {exp}\n\n  Raw expression: {}\n",
                raw.trim()
            ),
            Some(range),
        );
        return false;
    }
    true
}

/// Identifier-like words of `src`, each with the character preceding it.
fn words(src: &str) -> impl Iterator<Item = (Option<char>, &str, &str)> {
    let mut rest = src;
    let mut prev: Option<char> = None;
    std::iter::from_fn(move || {
        loop {
            let c = rest.chars().next()?;
            if c.is_ascii_alphabetic() || c == '_' || c == '$' {
                let end = rest
                    .find(|ch: char| !(ch.is_ascii_alphanumeric() || ch == '_' || ch == '$'))
                    .unwrap_or(rest.len());
                let word = &rest[..end];
                let before = prev;
                rest = &rest[end..];
                prev = word.chars().last();
                return Some((before, word, rest));
            }
            if !c.is_whitespace() {
                prev = Some(c);
            }
            rest = &rest[c.len_utf8()..];
        }
    })
}

/// A prohibited keyword used as an identifier. Keywords after `.` are
/// property accesses and keys followed by `:` are object keys.
fn find_keyword(src: &str) -> Option<&str> {
    words(src)
        .find(|(before, word, after)| {
            PROHIBITED_KEYWORDS.contains(word)
                && *before != Some('.')
                && !after.trim_start().starts_with(':')
        })
        .map(|(_, word, _)| word)
}

/// `delete(x)`, `typeof(x)` or `void(x)` used as if it were a method.
fn find_unary_call(src: &str) -> Option<&str> {
    words(src)
        .find(|(before, word, after)| {
            UNARY_OPERATORS.contains(word) && *before != Some('$') && after.trim_start().starts_with('(')
        })
        .map(|(_, word, _)| word)
}

/// Removes string and template literals so their contents never look like
/// code.
fn strip_strings(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut chars = src.chars();
    while let Some(c) = chars.next() {
        if matches!(c, '\'' | '"' | '`') {
            let mut escaped = false;
            for inner in chars.by_ref() {
                if escaped {
                    escaped = false;
                } else if inner == '\\' {
                    escaped = true;
                } else if inner == c {
                    break;
                }
            }
            out.push(' ');
        } else {
            out.push(c);
        }
    }
    out
}

fn check_balance(src: &str) -> Result<(), String> {
    let mut stack: Vec<char> = Vec::new();
    let mut chars = src.chars();
    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' | '`' => {
                let mut escaped = false;
                let mut closed = false;
                for inner in chars.by_ref() {
                    if escaped {
                        escaped = false;
                    } else if inner == '\\' {
                        escaped = true;
                    } else if inner == c {
                        closed = true;
                        break;
                    } else if inner == '\n' && c != '`' {
                        break;
                    }
                }
                if !closed {
                    return Err(if c == '`' {
                        "Unterminated template literal".into()
                    } else {
                        "Invalid or unexpected token".into()
                    });
                }
            }
            '(' => stack.push(')'),
            '[' => stack.push(']'),
            '{' => stack.push('}'),
            ')' | ']' | '}' => {
                if stack.pop() != Some(c) {
                    return Err(format!("Unexpected token '{c}'"));
                }
            }
            _ => {}
        }
    }
    if stack.is_empty() {
        Ok(())
    } else {
        Err("Unexpected end of input".into())
    }
}
