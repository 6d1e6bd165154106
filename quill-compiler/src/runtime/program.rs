use std::sync::Arc;

use pest::Parser;
use pest::iterators::Pair;
use quill_dom::Value;

#[derive(pest_derive::Parser)]
#[grammar = "runtime/render.pest"]
struct RenderParser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
    Plus,
    TypeOf,
    Void,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    Coalesce,
    And,
    StrictEq,
    StrictNe,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropKey {
    Static(String),
    Computed(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    Ident(String),
    Object(Vec<(String, Pattern)>),
    Array(Vec<Option<Pattern>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    pub params: Vec<Pattern>,
    pub body: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(Value),
    This,
    Ident(String),
    Member(Box<Expr>, String),
    Index(Box<Expr>, Box<Expr>),
    Call(Box<Expr>, Vec<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Conditional(Box<Expr>, Box<Expr>, Box<Expr>),
    Array(Vec<Expr>),
    Object(Vec<(PropKey, Expr)>),
    /// Listener map; each handler is kept as source text.
    Handlers(Vec<(PropKey, String)>),
    Function(Arc<Lambda>),
}

/// Parses `with(this){return <expr>}`.
pub fn parse_program(source: &str) -> Result<Expr, String> {
    let mut pairs = RenderParser::parse(Rule::program, source).map_err(|e| e.to_string())?;
    let program = pairs.next().ok_or_else(|| "empty program".to_string())?;
    let expr = program
        .into_inner()
        .find(|p| p.as_rule() == Rule::expr)
        .ok_or_else(|| "program has no return expression".to_string())?;
    Ok(build_expr(expr))
}

/// Parses a bare template expression such as `a.b + 1`.
pub fn parse_expression(source: &str) -> Result<Expr, String> {
    let mut pairs = RenderParser::parse(Rule::expression, source).map_err(|e| e.to_string())?;
    let root = pairs.next().ok_or_else(|| "empty expression".to_string())?;
    let expr = root
        .into_inner()
        .find(|p| p.as_rule() == Rule::expr)
        .ok_or_else(|| "empty expression".to_string())?;
    Ok(build_expr(expr))
}

/// Parses a binding target: an identifier or a destructuring pattern.
pub fn parse_pattern(source: &str) -> Result<Pattern, String> {
    let mut pairs = RenderParser::parse(Rule::binding, source).map_err(|e| e.to_string())?;
    let root = pairs.next().ok_or_else(|| "empty pattern".to_string())?;
    let param = root
        .into_inner()
        .find(|p| p.as_rule() == Rule::param)
        .ok_or_else(|| "empty pattern".to_string())?;
    Ok(build_pattern(param))
}

fn build_expr(pair: Pair<Rule>) -> Expr {
    match pair.as_rule() {
        Rule::expr => match pair.into_inner().next() {
            Some(inner) => build_expr(inner),
            None => Expr::Literal(Value::Undefined),
        },
        Rule::ternary => {
            let mut inner = pair.into_inner();
            let test = inner.next().map(build_expr).unwrap_or(Expr::Literal(Value::Undefined));
            match (inner.next(), inner.next()) {
                (Some(yes), Some(no)) => Expr::Conditional(
                    Box::new(test),
                    Box::new(build_expr(yes)),
                    Box::new(build_expr(no)),
                ),
                _ => test,
            }
        }
        Rule::logic_or
        | Rule::logic_and
        | Rule::equality
        | Rule::comparison
        | Rule::additive
        | Rule::multiplicative => build_binary_chain(pair),
        Rule::unary => {
            let mut ops = Vec::new();
            let mut operand = Expr::Literal(Value::Undefined);
            for p in pair.into_inner() {
                if p.as_rule() == Rule::op_unary {
                    ops.push(unary_op(p.as_str()));
                } else {
                    operand = build_expr(p);
                }
            }
            ops.into_iter()
                .rev()
                .fold(operand, |acc, op| Expr::Unary(op, Box::new(acc)))
        }
        Rule::postfix => {
            let mut inner = pair.into_inner();
            let mut expr = inner.next().map(build_expr).unwrap_or(Expr::Literal(Value::Undefined));
            for p in inner {
                expr = match p.as_rule() {
                    Rule::member => Expr::Member(Box::new(expr), inner_str(p)),
                    Rule::index => {
                        let key = p.into_inner().next().map(build_expr).unwrap_or(Expr::Literal(Value::Undefined));
                        Expr::Index(Box::new(expr), Box::new(key))
                    }
                    Rule::call => Expr::Call(Box::new(expr), p.into_inner().map(build_expr).collect()),
                    _ => expr,
                };
            }
            expr
        }
        Rule::paren => match pair.into_inner().next() {
            Some(inner) => build_expr(inner),
            None => Expr::Literal(Value::Undefined),
        },
        Rule::function => {
            let mut params = Vec::new();
            let mut body = Expr::Literal(Value::Undefined);
            for p in pair.into_inner() {
                match p.as_rule() {
                    Rule::params => params = p.into_inner().map(build_pattern).collect(),
                    Rule::expr => body = build_expr(p),
                    _ => {}
                }
            }
            Expr::Function(Arc::new(Lambda { params, body }))
        }
        Rule::object => {
            let mut props = Vec::new();
            for p in pair.into_inner() {
                match p.as_rule() {
                    Rule::handler_property => {
                        let mut inner = p.into_inner();
                        let key = inner.next().map(|k| k.as_str().to_string()).unwrap_or_default();
                        let handlers = inner.next().map(build_handlers).unwrap_or_default();
                        props.push((PropKey::Static(key), Expr::Handlers(handlers)));
                    }
                    Rule::plain_property => {
                        let mut inner = p.into_inner();
                        if let (Some(k), Some(v)) = (inner.next(), inner.next()) {
                            props.push((build_key(k), build_expr(v)));
                        }
                    }
                    _ => {}
                }
            }
            Expr::Object(props)
        }
        Rule::array => Expr::Array(pair.into_inner().map(build_expr).collect()),
        Rule::string => Expr::Literal(Value::String(unescape(&inner_str(pair)))),
        Rule::number => Expr::Literal(Value::Number(pair.as_str().parse().unwrap_or(f64::NAN))),
        Rule::literal => match pair.as_str() {
            "true" => Expr::Literal(Value::Bool(true)),
            "false" => Expr::Literal(Value::Bool(false)),
            "null" => Expr::Literal(Value::Null),
            "this" => Expr::This,
            _ => Expr::Literal(Value::Undefined),
        },
        Rule::ident => Expr::Ident(pair.as_str().to_string()),
        _ => Expr::Literal(Value::Undefined),
    }
}

/// Left-associative `a op b op c`.
fn build_binary_chain(pair: Pair<Rule>) -> Expr {
    let mut inner = pair.into_inner();
    let mut lhs = inner.next().map(build_expr).unwrap_or(Expr::Literal(Value::Undefined));
    while let (Some(op), Some(rhs)) = (inner.next(), inner.next()) {
        lhs = Expr::Binary(binary_op(op.as_str()), Box::new(lhs), Box::new(build_expr(rhs)));
    }
    lhs
}

fn build_key(pair: Pair<Rule>) -> PropKey {
    match pair.as_rule() {
        Rule::computed_key => PropKey::Computed(
            pair.into_inner()
                .next()
                .map(build_expr)
                .unwrap_or(Expr::Literal(Value::Undefined)),
        ),
        Rule::string => PropKey::Static(unescape(&inner_str(pair))),
        _ => PropKey::Static(pair.as_str().to_string()),
    }
}

fn build_handlers(pair: Pair<Rule>) -> Vec<(PropKey, String)> {
    pair.into_inner()
        .filter_map(|entry| {
            let mut inner = entry.into_inner();
            let key = build_key(inner.next()?);
            let src = inner.next()?.as_str().trim().to_string();
            Some((key, src))
        })
        .collect()
}

fn build_pattern(pair: Pair<Rule>) -> Pattern {
    let inner = match pair.as_rule() {
        Rule::param => match pair.into_inner().next() {
            Some(p) => p,
            None => return Pattern::Ident(String::new()),
        },
        _ => pair,
    };
    match inner.as_rule() {
        Rule::object_pattern => Pattern::Object(
            inner
                .into_inner()
                .map(|prop| {
                    let mut parts = prop.into_inner();
                    let name = parts.next().map(|n| n.as_str().to_string()).unwrap_or_default();
                    let target = parts
                        .next()
                        .map(build_pattern)
                        .unwrap_or_else(|| Pattern::Ident(name.clone()));
                    (name, target)
                })
                .collect(),
        ),
        Rule::array_pattern => Pattern::Array(
            inner
                .into_inner()
                .map(|slot| slot.into_inner().next().map(build_pattern))
                .collect(),
        ),
        _ => Pattern::Ident(inner.as_str().to_string()),
    }
}

fn inner_str(pair: Pair<Rule>) -> String {
    pair.into_inner()
        .next()
        .map(|p| p.as_str().to_string())
        .unwrap_or_default()
}

fn unary_op(s: &str) -> UnaryOp {
    match s {
        "!" => UnaryOp::Not,
        "-" => UnaryOp::Neg,
        "+" => UnaryOp::Plus,
        "void" => UnaryOp::Void,
        _ => UnaryOp::TypeOf,
    }
}

fn binary_op(s: &str) -> BinaryOp {
    match s {
        "||" => BinaryOp::Or,
        "??" => BinaryOp::Coalesce,
        "&&" => BinaryOp::And,
        "===" => BinaryOp::StrictEq,
        "!==" => BinaryOp::StrictNe,
        "==" => BinaryOp::Eq,
        "!=" => BinaryOp::Ne,
        "<" => BinaryOp::Lt,
        "<=" => BinaryOp::Le,
        ">" => BinaryOp::Gt,
        ">=" => BinaryOp::Ge,
        "+" => BinaryOp::Add,
        "-" => BinaryOp::Sub,
        "*" => BinaryOp::Mul,
        "/" => BinaryOp::Div,
        _ => BinaryOp::Rem,
    }
}

/// Resolves JS string escapes.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('0') => out.push('\0'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(ch) => out.push(ch),
                    None => {
                        out.push_str("\\u");
                        out.push_str(&hex);
                    }
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
