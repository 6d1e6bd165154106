use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use quill_dom::value::format_number;
use quill_dom::{Props, VDirective, VNode, Value};

use super::RenderFn;
use super::program::{BinaryOp, Expr, Lambda, Pattern, PropKey, UnaryOp};
use crate::error::RuntimeError;

/// Result of evaluating generated code. Plain data stays a [`Value`]; the
/// other variants only exist while a render is running.
#[derive(Debug, Clone)]
pub(crate) enum Val {
    Data(Value),
    Node(VNode),
    List(Vec<Val>),
    Map(Vec<(String, Val)>),
    Handlers(Vec<(String, String)>),
    Lambda(Closure),
}

#[derive(Clone)]
pub(crate) struct Closure {
    lambda: Arc<Lambda>,
    scope: Scope,
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "function({} params)", self.lambda.params.len())
    }
}

type Scope = Option<Rc<Frame>>;

struct Frame {
    vars: Vec<(String, Val)>,
    parent: Scope,
}

const UNDEFINED: Val = Val::Data(Value::Undefined);

impl Val {
    fn truthy(&self) -> bool {
        match self {
            Val::Data(v) => v.is_truthy(),
            _ => true,
        }
    }

    fn into_value(self) -> Value {
        match self {
            Val::Data(v) => v,
            Val::List(items) => Value::Array(items.into_iter().map(Val::into_value).collect()),
            Val::Map(entries) => Value::Object(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, v.into_value()))
                    .collect(),
            ),
            Val::Node(_) | Val::Handlers(_) | Val::Lambda(_) => Value::Undefined,
        }
    }

    fn type_of(&self) -> &'static str {
        match self {
            Val::Data(Value::Undefined) => "undefined",
            Val::Data(Value::Bool(_)) => "boolean",
            Val::Data(Value::Number(_)) => "number",
            Val::Data(Value::String(_)) => "string",
            Val::Lambda(_) => "function",
            _ => "object",
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Val::Data(v) => v.type_name(),
            Val::Node(_) => "node",
            Val::List(_) => "array",
            Val::Map(_) | Val::Handlers(_) => "object",
            Val::Lambda(_) => "function",
        }
    }
}

/// JS caps `toFixed` at this many digits.
const MAX_FRACTION_DIGITS: f64 = 100.0;

/// A rendered static fragment: one node, or the nodes of a hoisted list or
/// `<template>`.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Fragment {
    Node(VNode),
    Nodes(Vec<VNode>),
}

impl Fragment {
    fn into_val(self) -> Val {
        match self {
            Fragment::Node(node) => Val::Node(node),
            Fragment::Nodes(nodes) => Val::List(nodes.into_iter().map(Val::Node).collect()),
        }
    }
}

/// Walks a program against one component instance.
pub(crate) struct Evaluator<'r> {
    pub data: &'r Value,
    pub statics: &'r [RenderFn],
    pub static_cache: &'r mut Vec<Option<Fragment>>,
    pub slots: &'r BTreeMap<String, Vec<VNode>>,
}

impl Evaluator<'_> {
    pub fn render(&mut self, program: &Expr) -> Result<VNode, RuntimeError> {
        match self.eval(program, &None)? {
            Val::Node(node) => Ok(node),
            Val::Data(v) if v.is_nullish() => Ok(VNode::Comment(String::new())),
            Val::List(mut items) if items.len() == 1 => match items.pop() {
                Some(Val::Node(node)) => Ok(node),
                _ => Err(RuntimeError::NotANode { found: "array" }),
            },
            other => Err(RuntimeError::NotANode {
                found: other.describe(),
            }),
        }
    }

    fn eval(&mut self, expr: &Expr, scope: &Scope) -> Result<Val, RuntimeError> {
        Ok(match expr {
            Expr::Literal(v) => Val::Data(v.clone()),
            Expr::This => Val::Data(self.data.clone()),
            Expr::Ident(name) => self.lookup(name, scope),
            Expr::Member(obj, name) => {
                let target = self.eval(obj, scope)?;
                member(target, name)?
            }
            Expr::Index(obj, key) => {
                let target = self.eval(obj, scope)?;
                let key = property_name(self.eval(key, scope)?);
                member(target, &key)?
            }
            Expr::Call(callee, args) => self.call(callee, args, scope)?,
            Expr::Unary(op, operand) => {
                let v = self.eval(operand, scope)?;
                match op {
                    UnaryOp::Not => Val::Data(Value::Bool(!v.truthy())),
                    UnaryOp::Neg => Val::Data(Value::Number(-v.into_value().to_number())),
                    UnaryOp::Plus => Val::Data(Value::Number(v.into_value().to_number())),
                    UnaryOp::TypeOf => Val::Data(Value::String(v.type_of().into())),
                    UnaryOp::Void => UNDEFINED,
                }
            }
            Expr::Binary(op, lhs, rhs) => {
                let l = self.eval(lhs, scope)?;
                match op {
                    BinaryOp::And if !l.truthy() => l,
                    BinaryOp::Or if l.truthy() => l,
                    BinaryOp::Coalesce if !matches!(&l, Val::Data(v) if v.is_nullish()) => l,
                    BinaryOp::And | BinaryOp::Or | BinaryOp::Coalesce => self.eval(rhs, scope)?,
                    _ => {
                        let r = self.eval(rhs, scope)?;
                        Val::Data(binary(*op, l.into_value(), r.into_value()))
                    }
                }
            }
            Expr::Conditional(test, yes, no) => {
                if self.eval(test, scope)?.truthy() {
                    self.eval(yes, scope)?
                } else {
                    self.eval(no, scope)?
                }
            }
            Expr::Array(items) => Val::List(
                items
                    .iter()
                    .map(|e| self.eval(e, scope))
                    .collect::<Result<_, _>>()?,
            ),
            Expr::Object(props) => {
                let mut entries = Vec::with_capacity(props.len());
                for (key, value) in props {
                    let key = self.key(key, scope)?;
                    let value = self.eval(value, scope)?;
                    set_entry(&mut entries, key, value);
                }
                Val::Map(entries)
            }
            Expr::Handlers(handlers) => {
                let mut entries = Vec::with_capacity(handlers.len());
                for (key, src) in handlers {
                    entries.push((self.key(key, scope)?, src.clone()));
                }
                Val::Handlers(entries)
            }
            Expr::Function(lambda) => Val::Lambda(Closure {
                lambda: Arc::clone(lambda),
                scope: scope.clone(),
            }),
        })
    }

    fn key(&mut self, key: &PropKey, scope: &Scope) -> Result<String, RuntimeError> {
        Ok(match key {
            PropKey::Static(s) => s.clone(),
            PropKey::Computed(e) => property_name(self.eval(e, scope)?),
        })
    }

    fn lookup(&self, name: &str, scope: &Scope) -> Val {
        if let Some(v) = lookup_scope(name, scope) {
            return v;
        }
        Val::Data(self.data.get(name).cloned().unwrap_or_default())
    }

    fn call(&mut self, callee: &Expr, args: &[Expr], scope: &Scope) -> Result<Val, RuntimeError> {
        let mut values = Vec::with_capacity(args.len());
        for a in args {
            values.push(self.eval(a, scope)?);
        }
        match callee {
            Expr::Ident(name) if lookup_scope(name, scope).is_none() && name.starts_with('_') => {
                self.helper(name, values)
            }
            Expr::Ident(name) if lookup_scope(name, scope).is_none() && self.data.get(name).is_none() => {
                global(name, values)
            }
            Expr::Member(obj, method) => {
                let target = self.eval(obj, scope)?;
                match member(target.clone(), method)? {
                    Val::Lambda(f) => self.apply(&f, values),
                    _ => call_method(target, method, values),
                }
            }
            other => match self.eval(other, scope)? {
                Val::Lambda(f) => self.apply(&f, values),
                _ => Err(RuntimeError::NotCallable {
                    name: describe_callee(other),
                }),
            },
        }
    }

    fn apply(&mut self, f: &Closure, args: Vec<Val>) -> Result<Val, RuntimeError> {
        let mut vars = Vec::new();
        let mut args = args.into_iter();
        for pattern in &f.lambda.params {
            bind(pattern, args.next().unwrap_or(UNDEFINED), &mut vars);
        }
        let scope = Some(Rc::new(Frame {
            vars,
            parent: f.scope.clone(),
        }));
        self.eval(&f.lambda.body, &scope)
    }

    fn helper(&mut self, name: &str, args: Vec<Val>) -> Result<Val, RuntimeError> {
        match name {
            "_c" => create_element(args),
            "_v" => Ok(Val::Node(VNode::Text(display(args.into_iter().next())))),
            "_s" => Ok(Val::Data(Value::String(display(args.into_iter().next())))),
            "_e" => Ok(Val::Node(VNode::Comment(display(args.into_iter().next())))),
            "_m" => self.render_static(args),
            "_o" => {
                let mut args = args.into_iter();
                let node = args.next().unwrap_or(UNDEFINED);
                let id = display(args.next());
                let key = display(args.next());
                let key = if key.is_empty() {
                    format!("__once__{id}")
                } else {
                    format!("__once__{id}_{key}")
                };
                Ok(mark_static(node, &key))
            }
            "_l" => self.render_list(args),
            "_t" => self.render_slot(args),
            "_b" => bind_object_props(args),
            _ => Err(RuntimeError::NotCallable { name: name.into() }),
        }
    }

    fn render_static(&mut self, args: Vec<Val>) -> Result<Val, RuntimeError> {
        let mut args = args.into_iter();
        let index = match args.next() {
            Some(Val::Data(Value::Number(n))) if n >= 0.0 => n as usize,
            _ => {
                return Err(RuntimeError::IllegalArguments {
                    helper: "_m",
                    expected: "a fragment index",
                });
            }
        };
        let in_for = args.next().is_some_and(|v| v.truthy());
        if !in_for {
            if let Some(Some(cached)) = self.static_cache.get(index) {
                log::trace!("static fragment {index} served from cache");
                return Ok(cached.clone().into_val());
            }
        }
        let statics = self.statics;
        let program = &statics
            .get(index)
            .ok_or(RuntimeError::FragmentNotFound { index })?
            .program;
        let tree = self.eval(program, &None)?;
        // a looped or multi-root fragment yields its nodes as a list
        let fragment = match mark_static(tree, &format!("__static__{index}")) {
            Val::Node(node) => Fragment::Node(node),
            Val::Data(v) if v.is_nullish() => Fragment::Node(VNode::Comment(String::new())),
            list @ Val::List(_) => {
                let mut nodes = Vec::new();
                flatten_children(list, &mut nodes);
                Fragment::Nodes(nodes)
            }
            other => {
                return Err(RuntimeError::NotANode {
                    found: other.describe(),
                });
            }
        };
        if !in_for {
            if self.static_cache.len() <= index {
                self.static_cache.resize(index + 1, None);
            }
            self.static_cache[index] = Some(fragment.clone());
        }
        Ok(fragment.into_val())
    }

    fn render_list(&mut self, args: Vec<Val>) -> Result<Val, RuntimeError> {
        let mut args = args.into_iter();
        let source = args.next().unwrap_or(UNDEFINED);
        let Some(Val::Lambda(f)) = args.next() else {
            return Err(RuntimeError::IllegalArguments {
                helper: "_l",
                expected: "a render function as second argument",
            });
        };
        let rows: Vec<Vec<Val>> = match source {
            Val::List(items) => items
                .into_iter()
                .enumerate()
                .map(|(i, v)| vec![v, Val::Data(i.into())])
                .collect(),
            Val::Map(entries) => entries
                .into_iter()
                .enumerate()
                .map(|(i, (k, v))| vec![v, Val::Data(k.into()), Val::Data(i.into())])
                .collect(),
            Val::Data(Value::Array(items)) => items
                .into_iter()
                .enumerate()
                .map(|(i, v)| vec![Val::Data(v), Val::Data(i.into())])
                .collect(),
            Val::Data(Value::Object(map)) => map
                .into_iter()
                .enumerate()
                .map(|(i, (k, v))| vec![Val::Data(v), Val::Data(k.into()), Val::Data(i.into())])
                .collect(),
            Val::Data(Value::Number(n)) => (0..n.max(0.0) as usize)
                .map(|i| vec![Val::Data((i + 1).into()), Val::Data(i.into())])
                .collect(),
            Val::Data(Value::String(s)) => s
                .chars()
                .enumerate()
                .map(|(i, c)| vec![Val::Data(c.to_string().into()), Val::Data(i.into())])
                .collect(),
            _ => Vec::new(),
        };
        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(self.apply(&f, row)?);
        }
        Ok(Val::List(out))
    }

    fn render_slot(&mut self, args: Vec<Val>) -> Result<Val, RuntimeError> {
        let mut args = args.into_iter();
        let name = display(args.next());
        if let Some(nodes) = self.slots.get(&name) {
            return Ok(Val::List(nodes.iter().cloned().map(Val::Node).collect()));
        }
        match args.next() {
            Some(Val::Lambda(fallback)) => self.apply(&fallback, Vec::new()),
            _ => Ok(UNDEFINED),
        }
    }
}

fn lookup_scope(name: &str, scope: &Scope) -> Option<Val> {
    let mut frame = scope.as_ref();
    while let Some(f) = frame {
        if let Some((_, v)) = f.vars.iter().rev().find(|(n, _)| n == name) {
            return Some(v.clone());
        }
        frame = f.parent.as_ref();
    }
    None
}

fn bind(pattern: &Pattern, value: Val, vars: &mut Vec<(String, Val)>) {
    match pattern {
        Pattern::Ident(name) => vars.push((name.clone(), value)),
        Pattern::Object(props) => {
            for (name, target) in props {
                let v = member(value.clone(), name).unwrap_or(UNDEFINED);
                bind(target, v, vars);
            }
        }
        Pattern::Array(slots) => {
            for (i, slot) in slots.iter().enumerate() {
                if let Some(target) = slot {
                    let v = member(value.clone(), &i.to_string()).unwrap_or(UNDEFINED);
                    bind(target, v, vars);
                }
            }
        }
    }
}

fn describe_callee(expr: &Expr) -> String {
    match expr {
        Expr::Ident(name) => name.clone(),
        Expr::Member(_, name) => name.clone(),
        _ => "expression".into(),
    }
}

fn property_name(v: Val) -> String {
    match v.into_value() {
        Value::Number(n) => format_number(n),
        other => other.to_string(),
    }
}

fn display(v: Option<Val>) -> String {
    v.map(|v| v.into_value().to_display_string()).unwrap_or_default()
}

fn member(target: Val, name: &str) -> Result<Val, RuntimeError> {
    Ok(match target {
        Val::Data(Value::Undefined) => {
            return Err(RuntimeError::NullAccess {
                property: name.into(),
                target: "undefined",
            });
        }
        Val::Data(Value::Null) => {
            return Err(RuntimeError::NullAccess {
                property: name.into(),
                target: "null",
            });
        }
        Val::Data(Value::String(s)) if name == "length" => Val::Data(s.chars().count().into()),
        Val::Data(Value::Array(items)) if name == "length" => Val::Data(items.len().into()),
        Val::Data(v) => Val::Data(v.get(name).cloned().unwrap_or_default()),
        Val::List(items) if name == "length" => Val::Data(items.len().into()),
        Val::List(mut items) => match name.parse::<usize>() {
            Ok(i) if i < items.len() => items.swap_remove(i),
            _ => UNDEFINED,
        },
        Val::Map(entries) => entries
            .into_iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
            .unwrap_or(UNDEFINED),
        Val::Node(_) | Val::Handlers(_) | Val::Lambda(_) => UNDEFINED,
    })
}

fn set_entry(entries: &mut Vec<(String, Val)>, key: String, value: Val) {
    match entries.iter_mut().find(|(k, _)| *k == key) {
        Some(slot) => slot.1 = value,
        None => entries.push((key, value)),
    }
}

fn arg_string(args: &[Value], i: usize) -> String {
    args.get(i).map(|v| v.to_string()).unwrap_or_default()
}

fn call_method(target: Val, method: &str, args: Vec<Val>) -> Result<Val, RuntimeError> {
    let args: Vec<Value> = args.into_iter().map(Val::into_value).collect();
    let value = target.into_value();
    let result = match (&value, method) {
        (_, "toString") => Value::String(value.to_string()),
        (Value::String(s), "toUpperCase") => Value::String(s.to_uppercase()),
        (Value::String(s), "toLowerCase") => Value::String(s.to_lowercase()),
        (Value::String(s), "trim") => Value::String(s.trim().to_string()),
        (Value::String(s), "includes") => Value::Bool(s.contains(&arg_string(&args, 0))),
        (Value::String(s), "startsWith") => Value::Bool(s.starts_with(&arg_string(&args, 0))),
        (Value::String(s), "endsWith") => Value::Bool(s.ends_with(&arg_string(&args, 0))),
        (Value::String(s), "indexOf") => {
            let needle = arg_string(&args, 0);
            match s.find(&needle) {
                Some(byte) => Value::Number(s[..byte].chars().count() as f64),
                None => Value::Number(-1.0),
            }
        }
        (Value::String(s), "split") => {
            let sep = arg_string(&args, 0);
            let parts: Vec<Value> = if sep.is_empty() {
                s.chars().map(|c| Value::String(c.to_string())).collect()
            } else {
                s.split(sep.as_str()).map(Value::from).collect()
            };
            Value::Array(parts)
        }
        (Value::Array(items), "join") => {
            let sep = match args.first() {
                None | Some(Value::Undefined) => ",".to_string(),
                Some(v) => v.to_string(),
            };
            let parts: Vec<String> = items.iter().map(Value::to_display_string).collect();
            Value::String(parts.join(&sep))
        }
        (Value::Array(items), "includes") => {
            Value::Bool(args.first().is_some_and(|needle| items.iter().any(|i| strict_eq(i, needle))))
        }
        (Value::Array(items), "indexOf") => {
            let pos = args
                .first()
                .and_then(|needle| items.iter().position(|i| strict_eq(i, needle)));
            Value::Number(pos.map(|p| p as f64).unwrap_or(-1.0))
        }
        (Value::Array(items), "slice") => {
            let len = items.len() as f64;
            let clamp = |v: Option<&Value>, default: f64| {
                let n = v.filter(|v| !v.is_nullish()).map(Value::to_number).unwrap_or(default);
                let n = if n < 0.0 { (len + n).max(0.0) } else { n.min(len) };
                n as usize
            };
            let start = clamp(args.first(), 0.0);
            let end = clamp(args.get(1), len);
            Value::Array(items.get(start..end.max(start)).unwrap_or_default().to_vec())
        }
        (Value::Number(n), "toFixed") => {
            let digits = args.first().map(Value::to_number).unwrap_or(0.0);
            let digits = if digits.is_nan() { 0.0 } else { digits.trunc() };
            if !(0.0..=MAX_FRACTION_DIGITS).contains(&digits) {
                return Err(RuntimeError::IllegalArguments {
                    helper: "toFixed",
                    expected: "a digit count between 0 and 100",
                });
            }
            let digits = digits as usize;
            Value::String(format!("{n:.digits$}"))
        }
        _ => {
            return Err(RuntimeError::UnknownMethod {
                method: method.into(),
                value_type: value.type_name(),
            });
        }
    };
    Ok(Val::Data(result))
}

fn global(name: &str, args: Vec<Val>) -> Result<Val, RuntimeError> {
    let first = args.into_iter().next().map(Val::into_value).unwrap_or_default();
    Ok(Val::Data(match name {
        "String" => Value::String(first.to_string()),
        "Number" => Value::Number(first.to_number()),
        "Boolean" => Value::Bool(first.is_truthy()),
        _ => return Err(RuntimeError::NotCallable { name: name.into() }),
    }))
}

fn strict_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y,
        _ => a == b,
    }
}

fn loose_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (x, y) if x.is_nullish() || y.is_nullish() => x.is_nullish() && y.is_nullish(),
        (Value::Number(_), Value::String(_) | Value::Bool(_))
        | (Value::String(_) | Value::Bool(_), Value::Number(_))
        | (Value::Bool(_), Value::String(_))
        | (Value::String(_), Value::Bool(_)) => a.to_number() == b.to_number(),
        _ => strict_eq(a, b),
    }
}

fn compare(op: BinaryOp, a: &Value, b: &Value) -> bool {
    if let (Value::String(x), Value::String(y)) = (a, b) {
        return match op {
            BinaryOp::Lt => x < y,
            BinaryOp::Le => x <= y,
            BinaryOp::Gt => x > y,
            _ => x >= y,
        };
    }
    let (x, y) = (a.to_number(), b.to_number());
    match op {
        BinaryOp::Lt => x < y,
        BinaryOp::Le => x <= y,
        BinaryOp::Gt => x > y,
        _ => x >= y,
    }
}

fn binary(op: BinaryOp, a: Value, b: Value) -> Value {
    match op {
        BinaryOp::Add => {
            let stringy = |v: &Value| matches!(v, Value::String(_) | Value::Array(_) | Value::Object(_));
            if stringy(&a) || stringy(&b) {
                Value::String(format!("{a}{b}"))
            } else {
                Value::Number(a.to_number() + b.to_number())
            }
        }
        BinaryOp::Sub => Value::Number(a.to_number() - b.to_number()),
        BinaryOp::Mul => Value::Number(a.to_number() * b.to_number()),
        BinaryOp::Div => Value::Number(a.to_number() / b.to_number()),
        BinaryOp::Rem => Value::Number(a.to_number() % b.to_number()),
        BinaryOp::StrictEq => Value::Bool(strict_eq(&a, &b)),
        BinaryOp::StrictNe => Value::Bool(!strict_eq(&a, &b)),
        BinaryOp::Eq => Value::Bool(loose_eq(&a, &b)),
        BinaryOp::Ne => Value::Bool(!loose_eq(&a, &b)),
        BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => Value::Bool(compare(op, &a, &b)),
        // short-circuit operators are handled by the evaluator
        BinaryOp::And | BinaryOp::Or | BinaryOp::Coalesce => Value::Undefined,
    }
}

fn mark_static(node: Val, key: &str) -> Val {
    match node {
        Val::Node(VNode::Element {
            tag,
            mut props,
            children,
        }) => {
            props.is_static = true;
            props.key = Some(key.to_string());
            Val::Node(VNode::Element { tag, props, children })
        }
        Val::List(items) => Val::List(
            items
                .into_iter()
                .enumerate()
                .map(|(i, n)| mark_static(n, &format!("{key}_{i}")))
                .collect(),
        ),
        other => other,
    }
}

fn flatten_children(val: Val, out: &mut Vec<VNode>) {
    match val {
        Val::Node(n) => out.push(n),
        Val::List(items) => items.into_iter().for_each(|i| flatten_children(i, out)),
        Val::Data(Value::Array(items)) => items
            .into_iter()
            .for_each(|i| flatten_children(Val::Data(i), out)),
        Val::Data(v @ (Value::String(_) | Value::Number(_))) => out.push(VNode::Text(v.to_display_string())),
        _ => {}
    }
}

fn create_element(args: Vec<Val>) -> Result<Val, RuntimeError> {
    let mut args = args.into_iter();
    let tag = match args.next() {
        Some(Val::Data(Value::String(tag))) if !tag.is_empty() => tag,
        Some(Val::Data(v)) if v.is_nullish() => return Ok(Val::Node(VNode::Comment(String::new()))),
        _ => {
            return Err(RuntimeError::IllegalArguments {
                helper: "_c",
                expected: "a tag name",
            });
        }
    };
    let (data, children) = match args.next() {
        Some(Val::Map(entries)) => (entries, args.next()),
        other => (Vec::new(), other),
    };
    let mut kids = Vec::new();
    if let Some(children) = children {
        flatten_children(children, &mut kids);
    }
    Ok(Val::Node(VNode::Element {
        tag,
        props: build_props(data),
        children: kids,
    }))
}

fn render_class(v: &Value) -> String {
    match v {
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .map(render_class)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        Value::Object(map) => map
            .iter()
            .filter(|(_, on)| on.is_truthy())
            .map(|(k, _)| k.as_str())
            .collect::<Vec<_>>()
            .join(" "),
        _ => String::new(),
    }
}

fn put_style(out: &mut Vec<(String, String)>, name: &str, value: String) {
    match out.iter_mut().find(|(k, _)| k == name) {
        Some(slot) => slot.1 = value,
        None => out.push((name.to_string(), value)),
    }
}

fn style_entries(v: &Value, out: &mut Vec<(String, String)>) {
    match v {
        Value::Object(map) => {
            for (k, val) in map {
                if !val.is_nullish() {
                    put_style(out, k, val.to_display_string());
                }
            }
        }
        Value::String(css) => {
            for (k, val) in crate::platform::modules::parse_style_text(css) {
                put_style(out, &k, val);
            }
        }
        Value::Array(items) => {
            for item in items {
                style_entries(item, out);
            }
        }
        _ => {}
    }
}

fn build_props(data: Vec<(String, Val)>) -> Props {
    let mut props = Props::new();
    let mut classes = Vec::new();
    let mut styles = Vec::new();
    for (key, val) in data {
        match key.as_str() {
            "attrs" | "domProps" => {
                let target = if key == "attrs" {
                    &mut props.attrs
                } else {
                    &mut props.dom_props
                };
                if let Value::Object(map) = val.into_value() {
                    for (name, v) in map {
                        if !v.is_nullish() && v != Value::Bool(false) {
                            target.insert(name, v.to_display_string());
                        }
                    }
                }
            }
            "staticClass" | "class" => classes.push(render_class(&val.into_value())),
            "staticStyle" | "style" => style_entries(&val.into_value(), &mut styles),
            "on" | "nativeOn" => {
                if let Val::Handlers(handlers) = val {
                    let target = if key == "on" {
                        &mut props.on
                    } else {
                        &mut props.native_on
                    };
                    target.extend(handlers);
                }
            }
            "directives" => {
                if let Val::List(items) = val {
                    props.directives = items.into_iter().map(build_directive).collect();
                }
            }
            "key" => props.key = Some(val.into_value().to_display_string()),
            "ref" => props.ref_name = Some(val.into_value().to_display_string()),
            "slot" => props.slot = Some(val.into_value().to_display_string()),
            _ => {}
        }
    }
    let class = classes
        .into_iter()
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if !class.is_empty() {
        props.attrs.insert("class".into(), class);
    }
    if !styles.is_empty() {
        let css: Vec<String> = styles.into_iter().map(|(k, v)| format!("{k}:{v}")).collect();
        props.attrs.insert("style".into(), css.join(";"));
    }
    props
}

fn build_directive(val: Val) -> VDirective {
    let mut dir = VDirective::default();
    let Val::Map(entries) = val else {
        return dir;
    };
    for (key, v) in entries {
        let v = v.into_value();
        match key.as_str() {
            "name" => dir.name = v.to_display_string(),
            "rawName" => dir.raw_name = v.to_display_string(),
            "value" => dir.value = v,
            "expression" => dir.expression = Some(v.to_display_string()),
            "arg" => dir.arg = Some(v.to_display_string()),
            "modifiers" => {
                if let Value::Object(map) = v {
                    dir.modifiers = map.into_keys().collect();
                }
            }
            _ => {}
        }
    }
    dir
}

/// `_b(data, tag, obj, asProp)`: spreads `v-bind="obj"` into the data object
/// without overriding explicit bindings.
fn bind_object_props(args: Vec<Val>) -> Result<Val, RuntimeError> {
    let mut args = args.into_iter();
    let Some(Val::Map(mut data)) = args.next() else {
        return Err(RuntimeError::IllegalArguments {
            helper: "_b",
            expected: "a data object",
        });
    };
    let _tag = args.next();
    let obj = args.next().map(Val::into_value).unwrap_or_default();
    let as_prop = args.next().is_some_and(|v| v.truthy());

    let Value::Object(map) = obj else {
        return Ok(Val::Map(data));
    };
    let bucket = if as_prop { "domProps" } else { "attrs" };
    for (key, value) in map {
        if matches!(key.as_str(), "class" | "style" | "key" | "ref" | "slot") {
            if !data.iter().any(|(k, _)| *k == key) {
                data.push((key, Val::Data(value)));
            }
            continue;
        }
        let pos = match data.iter().position(|(k, _)| k == bucket) {
            Some(p) => p,
            None => {
                data.push((bucket.to_string(), Val::Map(Vec::new())));
                data.len() - 1
            }
        };
        if let Val::Map(entries) = &mut data[pos].1 {
            if !entries.iter().any(|(k, _)| *k == key) {
                entries.push((key, Val::Data(value)));
            }
        }
    }
    Ok(Val::Map(data))
}
