//! AST + annotations → render source.
//!
//! The output is a small expression language executed by [`crate::runtime`]:
//! `with(this){return _c('div',{...},[...])}`. Template expressions are
//! spliced in verbatim.

use crate::diagnostics::Diagnostics;
use crate::optimizer::Annotations;
use crate::options::{DirectiveData, ResolvedOptions};
use crate::template_ast::{Ast, ElementNode, EventBinding, Node, TemplateAttr};
use crate::template_parse::attrs::camelize;

/// Render source plus the hoisted static fragments, referenced as `_m(i)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodegenResult {
    pub render: String,
    pub static_render_fns: Vec<String>,
}

/// Which structural steps have already been emitted for the element being
/// generated. Each step re-enters `gen_element` with its flag set.
#[derive(Debug, Clone, Copy, Default)]
struct Visited {
    static_root: bool,
    once: bool,
    for_: bool,
    if_: bool,
}

struct CodegenState<'a> {
    ann: &'a Annotations,
    options: &'a ResolvedOptions<'a>,
    diag: &'a mut Diagnostics,
    static_render_fns: Vec<String>,
    once_id: usize,
    /// `key` of every enclosing `v-for`, innermost last.
    for_keys: Vec<Option<String>>,
}

pub fn generate(
    ast: &Ast,
    ann: &Annotations,
    options: &ResolvedOptions,
    diag: &mut Diagnostics,
) -> CodegenResult {
    let mut state = CodegenState {
        ann,
        options,
        diag,
        static_render_fns: Vec::new(),
        once_id: 0,
        for_keys: Vec::new(),
    };
    let code = match &ast.root {
        Some(root) if root.tag == "script" => "null".to_string(),
        Some(root) => state.gen_element(root, Visited::default()),
        None => "_c(\"div\")".to_string(),
    };
    log::debug!(
        "generated render with {} static fragments",
        state.static_render_fns.len()
    );
    CodegenResult {
        render: format!("with(this){{return {code}}}"),
        static_render_fns: state.static_render_fns,
    }
}

impl CodegenState<'_> {
    fn gen_element(&mut self, el: &ElementNode, v: Visited) -> String {
        let flags = self.ann.get(el.id);
        if flags.static_root && !v.static_root {
            self.gen_static(el, v)
        } else if el.once && !v.once {
            self.gen_once(el, v)
        } else if el.for_loop.is_some() && !v.for_ {
            self.gen_for(el, v)
        } else if el.if_exp.is_some() && !v.if_ {
            self.gen_if(el, v)
        } else if el.tag == "template" && el.slot_target.is_none() && !el.pre {
            self.gen_children(el).unwrap_or_else(|| "undefined".to_string())
        } else if el.tag == "slot" {
            self.gen_slot(el)
        } else if let Some(component) = &el.component {
            let data = self.gen_data(el);
            match self.gen_children(el) {
                Some(children) => format!("_c({component},{data},{children})"),
                None => format!("_c({component},{data})"),
            }
        } else {
            let data = Some(self.gen_data(el)).filter(|d| d != "{}");
            let children = self.gen_children(el);
            let mut code = format!("_c('{}'", el.tag);
            if let Some(d) = data {
                code.push(',');
                code.push_str(&d);
            }
            if let Some(c) = children {
                code.push(',');
                code.push_str(&c);
            }
            code.push(')');
            code
        }
    }

    /// Hoists `el` into its own fragment function.
    fn gen_static(&mut self, el: &ElementNode, mut v: Visited) -> String {
        v.static_root = true;
        let code = self.gen_element(el, v);
        self.static_render_fns
            .push(format!("with(this){{return {code}}}"));
        let index = self.static_render_fns.len() - 1;
        log::trace!("hoisted <{}> as fragment {index}", el.tag);
        if self.ann.is_static_in_for(el.id) {
            format!("_m({index},true)")
        } else {
            format!("_m({index})")
        }
    }

    fn gen_once(&mut self, el: &ElementNode, mut v: Visited) -> String {
        v.once = true;
        if el.if_exp.is_some() && !v.if_ {
            return self.gen_if(el, v);
        }
        if !self.ann.is_static_in_for(el.id) {
            return self.gen_static(el, v);
        }
        match self.for_keys.last().cloned().flatten() {
            Some(key) => {
                let code = self.gen_element(el, v);
                let id = self.once_id;
                self.once_id += 1;
                format!("_o({code},{id},{key})")
            }
            None => {
                self.diag.error(
                    "v-once can only be used inside v-for that is keyed.",
                    Some(el.range),
                );
                self.gen_element(el, v)
            }
        }
    }

    fn gen_for(&mut self, el: &ElementNode, mut v: Visited) -> String {
        let Some(f) = &el.for_loop else {
            return self.gen_element(el, v);
        };
        if self.maybe_component(el) && el.tag != "slot" && el.tag != "template" && el.key.is_none() {
            self.diag.tip(
                format!(
                    "<{} v-for=\"{} in {}\">: component lists rendered with v-for should have explicit keys.",
                    el.tag, f.alias, f.source
                ),
                Some(el.range),
            );
        }
        v.for_ = true;
        self.for_keys.push(el.key.clone());
        let body = self.gen_element(el, v);
        self.for_keys.pop();

        let mut params = f.alias.clone();
        for it in [&f.iterator1, &f.iterator2].into_iter().flatten() {
            params.push(',');
            params.push_str(it);
        }
        format!("_l(({}),function({params}){{return {body}}})", f.source)
    }

    fn gen_if(&mut self, el: &ElementNode, mut v: Visited) -> String {
        v.if_ = true;
        let first = self.gen_ternary_block(el, v);
        let exp = el.if_exp.as_deref().unwrap_or("true");
        let mut code = format!("({exp})?{first}:");

        for branch in &el.if_branches {
            let block = self.gen_ternary_block(&branch.block, Visited::default());
            match &branch.exp {
                Some(exp) => code.push_str(&format!("({exp})?{block}:")),
                // v-else ends the chain
                None => {
                    code.push_str(&block);
                    return code;
                }
            }
        }
        code.push_str("_e()");
        code
    }

    fn gen_ternary_block(&mut self, el: &ElementNode, v: Visited) -> String {
        if el.once {
            self.gen_once(el, v)
        } else {
            self.gen_element(el, v)
        }
    }

    fn gen_children(&mut self, el: &ElementNode) -> Option<String> {
        match el.children.as_slice() {
            [] => None,
            [Node::Element(only)] if only.for_loop.is_some() && only.tag != "template" && only.tag != "slot" => {
                Some(self.gen_element(only, Visited::default()))
            }
            children => {
                let items: Vec<String> = children.iter().map(|c| self.gen_node(c)).collect();
                Some(format!("[{}]", items.join(",")))
            }
        }
    }

    fn gen_node(&mut self, node: &Node) -> String {
        match node {
            Node::Element(el) => self.gen_element(el, Visited::default()),
            Node::Text(t) => match &t.expression {
                Some(exp) => format!("_v({exp})"),
                None => format!("_v({})", string_lit(&t.text)),
            },
            Node::Comment(c) => format!("_e({})", string_lit(&c.text)),
        }
    }

    fn gen_slot(&mut self, el: &ElementNode) -> String {
        let name = el.slot_name.as_deref().unwrap_or("\"default\"");
        let mut code = format!("_t({name}");
        let children = self.gen_children(el);
        let props: Vec<TemplateAttr> = el
            .attrs
            .iter()
            .map(|a| TemplateAttr {
                name: if a.dynamic_name { a.name.clone() } else { camelize(&a.name) },
                ..a.clone()
            })
            .collect();
        match &children {
            Some(c) => code.push_str(&format!(",function(){{return {c}}}")),
            None if !props.is_empty() || el.bind_object.is_some() => code.push_str(",null"),
            None => {}
        }
        if !props.is_empty() {
            code.push(',');
            code.push_str(&gen_props(&props));
        } else if el.bind_object.is_some() {
            code.push_str(",null");
        }
        if let Some(bind) = &el.bind_object {
            code.push_str(&format!(",{bind}"));
        }
        code.push(')');
        code
    }

    fn gen_data(&mut self, el: &ElementNode) -> String {
        let mut data = String::from("{");

        let (directives, directive_props) = self.gen_directives(el);
        if let Some(dirs) = directives {
            data.push_str(&dirs);
            data.push(',');
        }
        if let Some(key) = &el.key {
            data.push_str(&format!("key:{key},"));
        }
        if let Some(r) = &el.ref_name {
            let value = if r.dynamic { r.value.clone() } else { string_lit(&r.value) };
            data.push_str(&format!("ref:{value},"));
            if !self.for_keys.is_empty() {
                data.push_str("refInFor:true,");
            }
        }
        if el.pre {
            data.push_str("pre:true,");
        }
        if el.component.is_some() {
            data.push_str(&format!("tag:{},", string_lit(&el.tag)));
        }
        for module in self.options.modules() {
            data.push_str(&module.gen_data(el));
        }
        if !el.attrs.is_empty() {
            data.push_str(&format!("attrs:{},", gen_props(&el.attrs)));
        }
        if !el.props.is_empty() || !directive_props.is_empty() {
            let mut entries: Vec<String> = el.props.iter().map(prop_entry).collect();
            entries.extend(
                directive_props
                    .iter()
                    .map(|(name, value)| format!("{}:{value}", string_lit(name))),
            );
            data.push_str(&format!("domProps:{{{}}},", entries.join(",")));
        }
        if !el.events.is_empty() {
            data.push_str(&format!("on:{},", gen_handlers(&el.events)));
        }
        if !el.native_events.is_empty() {
            data.push_str(&format!("nativeOn:{},", gen_handlers(&el.native_events)));
        }
        if let Some(target) = &el.slot_target {
            data.push_str(&format!("slot:{target},"));
        }

        if data.ends_with(',') {
            data.pop();
        }
        data.push('}');

        if let Some(obj) = &el.bind_object {
            data = format!("_b({data},'{}',({obj}),false)", el.tag);
        }
        data
    }

    /// Runs compile-time directive handlers; the ones that still need the
    /// runtime are listed in the data object.
    fn gen_directives(&mut self, el: &ElementNode) -> (Option<String>, Vec<(String, String)>) {
        let mut extra = DirectiveData::default();
        let mut entries = Vec::new();
        for dir in &el.directives {
            let needs_runtime = match self.options.directive(&dir.name) {
                Some(handler) => handler.apply(dir, &mut extra, self.diag),
                None => true,
            };
            if !needs_runtime {
                continue;
            }
            let mut entry = format!(
                "{{name:{},rawName:{}",
                string_lit(&dir.name),
                string_lit(&dir.raw_name)
            );
            if !dir.value.is_empty() {
                entry.push_str(&format!(
                    ",value:({}),expression:{}",
                    dir.value,
                    string_lit(&dir.value)
                ));
            }
            if let Some(arg) = &dir.arg {
                let arg = if dir.dynamic_arg { arg.clone() } else { string_lit(arg) };
                entry.push_str(&format!(",arg:{arg}"));
            }
            if !dir.modifiers.is_empty() {
                let mods: Vec<String> = dir
                    .modifiers
                    .iter()
                    .map(|m| format!("{}:true", string_lit(m)))
                    .collect();
                entry.push_str(&format!(",modifiers:{{{}}}", mods.join(",")));
            }
            entry.push('}');
            entries.push(entry);
        }
        let directives = (!entries.is_empty()).then(|| format!("directives:[{}]", entries.join(",")));
        (directives, extra.dom_props)
    }

    fn maybe_component(&self, el: &ElementNode) -> bool {
        el.component.is_some() || !(self.options.platform().is_reserved_tag)(&el.tag)
    }
}

fn prop_entry(attr: &TemplateAttr) -> String {
    let key = if attr.dynamic_name {
        format!("[{}]", attr.name)
    } else {
        string_lit(&attr.name)
    };
    let value = if attr.dynamic {
        attr.value.clone()
    } else {
        string_lit(&attr.value)
    };
    format!("{key}:{value}")
}

fn gen_props(attrs: &[TemplateAttr]) -> String {
    let entries: Vec<String> = attrs.iter().map(prop_entry).collect();
    format!("{{{}}}", entries.join(","))
}

/// `{"click":handler,"!scroll":[h1,h2]}`; repeated names become arrays.
fn gen_handlers(events: &[EventBinding]) -> String {
    let mut groups: Vec<(&EventBinding, Vec<String>)> = Vec::new();
    for ev in events {
        let code = gen_handler(ev);
        match groups
            .iter_mut()
            .find(|(first, _)| first.name == ev.name && first.dynamic_name == ev.dynamic_name)
        {
            Some((_, handlers)) => handlers.push(code),
            None => groups.push((ev, vec![code])),
        }
    }
    let entries: Vec<String> = groups
        .into_iter()
        .map(|(ev, handlers)| {
            let key = if ev.dynamic_name {
                format!("[{}]", ev.name)
            } else {
                string_lit(&ev.name)
            };
            let value = if handlers.len() == 1 {
                handlers.concat()
            } else {
                format!("[{}]", handlers.join(","))
            };
            format!("{key}:{value}")
        })
        .collect();
    format!("{{{}}}", entries.join(","))
}

fn gen_guard(condition: &str) -> String {
    format!("if({condition})return null;")
}

fn modifier_code(modifier: &str) -> Option<String> {
    Some(match modifier {
        "stop" => "$event.stopPropagation();".to_string(),
        "prevent" => "$event.preventDefault();".to_string(),
        "self" => gen_guard("$event.target !== $event.currentTarget"),
        "ctrl" => gen_guard("!$event.ctrlKey"),
        "shift" => gen_guard("!$event.shiftKey"),
        "alt" => gen_guard("!$event.altKey"),
        "meta" => gen_guard("!$event.metaKey"),
        "left" => gen_guard("'button' in $event && $event.button !== 0"),
        "middle" => gen_guard("'button' in $event && $event.button !== 1"),
        "right" => gen_guard("'button' in $event && $event.button !== 2"),
        _ => return None,
    })
}

fn key_code(key: &str) -> Option<&'static str> {
    Some(match key {
        "esc" => "27",
        "tab" => "9",
        "enter" => "13",
        "space" => "32",
        "up" => "38",
        "left" => "37",
        "right" => "39",
        "down" => "40",
        "delete" => "[8,46]",
        _ => return None,
    })
}

fn key_name(key: &str) -> Option<&'static str> {
    Some(match key {
        "esc" => r#"["Esc","Escape"]"#,
        "tab" => r#""Tab""#,
        "enter" => r#""Enter""#,
        "space" => r#"[" ","Spacebar"]"#,
        "up" => r#"["Up","ArrowUp"]"#,
        "left" => r#"["Left","ArrowLeft"]"#,
        "right" => r#"["Right","ArrowRight"]"#,
        "down" => r#"["Down","ArrowDown"]"#,
        "delete" => r#"["Backspace","Delete","Del"]"#,
        _ => return None,
    })
}

fn gen_key_filter(keys: &[&str]) -> String {
    let checks: Vec<String> = keys
        .iter()
        .map(|key| match key.parse::<u32>() {
            Ok(n) => format!("$event.keyCode!=={n}"),
            Err(_) => format!(
                "_k($event.keyCode,{},{},$event.key,{})",
                string_lit(key),
                key_code(key).unwrap_or("undefined"),
                key_name(key).unwrap_or("undefined")
            ),
        })
        .collect();
    format!(
        "if(!$event.type.indexOf('key')&&{})return null;",
        checks.join("&&")
    )
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// `a`, `a.b`, `a['b']`, `a[0]`, `a[b]`
fn is_simple_path(s: &str) -> bool {
    let mut chars = s.chars().peekable();
    match chars.next() {
        Some(c) if is_ident_start(c) => {}
        _ => return false,
    }
    while let Some(&c) = chars.peek() {
        if is_ident_char(c) {
            chars.next();
            continue;
        }
        match c {
            '.' => {
                chars.next();
                match chars.next() {
                    Some(c) if is_ident_start(c) => {}
                    _ => return false,
                }
            }
            '[' => {
                chars.next();
                let inner: String = chars.by_ref().take_while(|&c| c != ']').collect();
                let ok = (inner.starts_with('\'') && inner.ends_with('\'') && inner.len() >= 2)
                    || (inner.starts_with('"') && inner.ends_with('"') && inner.len() >= 2)
                    || (!inner.is_empty() && inner.chars().all(|c| c.is_ascii_digit()))
                    || (inner.chars().next().is_some_and(is_ident_start) && inner.chars().all(is_ident_char));
                if !ok {
                    return false;
                }
            }
            _ => return false,
        }
    }
    true
}

fn is_function_expression(s: &str) -> bool {
    if let Some(rest) = s.strip_prefix("function") {
        let rest = rest.trim_start();
        let rest = rest.trim_start_matches(is_ident_char).trim_start();
        return rest.starts_with('(');
    }
    // arrow functions: `x => ...`, `(a, b) => ...`
    let head = match s.find("=>") {
        Some(i) => s[..i].trim(),
        None => return false,
    };
    (head.starts_with('(') && head.ends_with(')') && !head[1..head.len() - 1].contains(')'))
        || (!head.is_empty() && head.chars().all(is_ident_char))
}

/// `doThing(a, b)` with an optional trailing `;`
fn is_function_invocation(s: &str) -> bool {
    let s = s.trim_end_matches(';');
    match (s.rfind('('), s.ends_with(')')) {
        (Some(open), true) => is_simple_path(&s[..open]) && !s[open + 1..s.len() - 1].contains(')'),
        _ => false,
    }
}

fn gen_handler(ev: &EventBinding) -> String {
    let value = ev.value.trim();
    if value.is_empty() {
        return "function(){}".to_string();
    }
    let method_path = is_simple_path(value);
    let function_expression = is_function_expression(value);
    let invocation = is_function_invocation(value);

    if ev.modifiers.is_empty() {
        if method_path || function_expression {
            return value.to_string();
        }
        let ret = if invocation { "return " } else { "" };
        return format!("function($event){{{ret}{value}}}");
    }

    let mut code = String::new();
    let mut keys: Vec<&str> = Vec::new();
    for m in &ev.modifiers {
        if let Some(guard) = modifier_code(m) {
            code.push_str(&guard);
            if key_code(m).is_some() {
                keys.push(m);
            }
        } else if m == "exact" {
            let unset: Vec<String> = ["ctrl", "shift", "alt", "meta"]
                .iter()
                .filter(|k| !ev.has_modifier(k))
                .map(|k| format!("$event.{k}Key"))
                .collect();
            if !unset.is_empty() {
                code.push_str(&gen_guard(&unset.join("||")));
            }
        } else {
            keys.push(m);
        }
    }
    if !keys.is_empty() {
        // key filters run before the other guards
        code = gen_key_filter(&keys) + &code;
    }
    let body = if method_path {
        format!("return {value}.apply(null, arguments)")
    } else if function_expression {
        format!("return ({value}).apply(null, arguments)")
    } else if invocation {
        format!("return {value}")
    } else {
        value.to_string()
    };
    format!("function($event){{{code}{body}}}")
}

/// JSON-style double-quoted literal; U+2028/U+2029 are escaped as well so
/// the result is a valid string in the generated source.
pub(crate) fn string_lit(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\u{2028}' => out.push_str("\\u2028"),
            '\u{2029}' => out.push_str("\\u2029"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[cfg(test)]
#[path = "codegen_unit_tests.rs"]
mod codegen_unit_tests;
