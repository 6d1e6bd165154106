//! Template → AST. A single left-to-right scan feeds an element stack; it
//! never aborts, every problem becomes a diagnostic and parsing goes on.

pub mod attrs;
pub mod entities;
pub mod html;
pub mod text;

use std::collections::HashSet;

use crate::diagnostics::Diagnostics;
use crate::options::{ResolvedOptions, Whitespace};
use crate::template_ast::{
    Ast, CommentNode, ElementNode, EventBinding, IfBranch, Node, NodeId, RawAttr, SourceRange,
    TemplateAttr, TextNode,
};
use crate::template_codegen::string_lit;

use attrs::{camelize, dynamic_arg, is_directive_attr, parse_for, split_modifiers};
use html::{ScannedAttr, Scanner, Token};

/// Parses a (trimmed) template. Ranges are byte offsets into `template`.
pub fn parse_template_to_ast(template: &str, options: &ResolvedOptions, diag: &mut Diagnostics) -> Ast {
    let mut parser = TemplateParser {
        src: template,
        options,
        diag,
        stack: Vec::new(),
        root: None,
        next_id: 0,
        in_v_pre: false,
        v_pre_root: None,
        in_pre: false,
    };
    for token in Scanner::new(template) {
        parser.token(token);
    }
    parser.close_until(None, SourceRange::new(template.len(), template.len()));
    log::debug!("parsed template into {} nodes", parser.next_id);
    Ast {
        root: parser.root,
        node_count: parser.next_id,
    }
}

struct TemplateParser<'a> {
    src: &'a str,
    options: &'a ResolvedOptions<'a>,
    diag: &'a mut Diagnostics,
    stack: Vec<ElementNode>,
    root: Option<ElementNode>,
    next_id: u32,
    in_v_pre: bool,
    v_pre_root: Option<NodeId>,
    in_pre: bool,
}

impl<'a> TemplateParser<'a> {
    fn alloc_id(&mut self) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        id
    }

    fn token(&mut self, token: Token<'_>) {
        match token {
            Token::StartTag {
                name,
                attrs,
                self_closing,
                range,
            } => self.start_tag(name, attrs, self_closing, range),
            Token::EndTag { name, range } => self.end_tag(name, range),
            Token::Text { text, range } => self.text(text, range),
            Token::Comment { text, range } => self.comment(text, range),
            Token::Malformed { text, range } => {
                self.diag
                    .error(format!("Malformed tag at end of template: \"{text}\""), Some(range));
                self.text(text, range);
            }
        }
    }

    fn start_tag(&mut self, name: &str, scanned: Vec<ScannedAttr<'_>>, self_closing: bool, range: SourceRange) {
        let platform = *self.options.platform();

        if let Some(last) = self.stack.last() {
            if last.tag == "p" && (platform.is_non_phrasing_tag)(name) {
                self.end_tag("p", SourceRange::new(range.start, range.start));
            }
        }
        if let Some(last) = self.stack.last() {
            if (platform.can_be_left_open_tag)(name) && last.tag == name {
                self.end_tag(name, SourceRange::new(range.start, range.start));
            }
        }

        let unary = (platform.is_unary_tag)(name) || self_closing;
        let mut seen = HashSet::new();
        let mut raw_attrs = Vec::with_capacity(scanned.len());
        for a in scanned {
            if !seen.insert(a.name) {
                self.diag
                    .error(format!("duplicate attribute: {}", a.name), Some(a.range));
                continue;
            }
            let keep_newlines = name == "a" && a.name == "href";
            raw_attrs.push(RawAttr {
                name: a.name.to_string(),
                value: a.value.map(|v| entities::decode_attr(v, keep_newlines)),
                range: a.range,
            });
        }

        let id = self.alloc_id();
        let mut el = ElementNode::new(id, name, raw_attrs, range);
        el.ns = self
            .stack
            .last()
            .and_then(|p| p.ns.clone())
            .or_else(|| (platform.get_tag_namespace)(name).map(str::to_string));

        if is_forbidden_tag(&el) {
            el.forbidden = true;
            self.diag.error(
                format!(
                    "Templates should only be responsible for mapping the state to the UI. \
                     Avoid placing tags with side-effects in your templates, such as <{name}>, \
                     as they will not be parsed."
                ),
                Some(range),
            );
        }

        if !self.in_v_pre && el.take_attr("v-pre").is_some() {
            self.in_v_pre = true;
            self.v_pre_root = Some(id);
        }
        if (platform.is_pre_tag)(name) {
            self.in_pre = true;
        }
        if self.in_v_pre {
            el.pre = true;
            process_raw_attrs(&mut el);
        } else {
            self.process_for(&mut el);
            self.process_if(&mut el);
            el.once = el.take_attr("v-once").is_some();
        }

        if self.stack.is_empty() && self.root.is_none() {
            self.check_root_constraints(&el);
        }

        if unary {
            self.close_element(el);
        } else {
            self.stack.push(el);
        }
    }

    fn end_tag(&mut self, name: &str, range: SourceRange) {
        let found = self
            .stack
            .iter()
            .rposition(|el| el.tag.eq_ignore_ascii_case(name));
        if found.is_some() {
            self.close_until(Some(name), range);
            return;
        }
        if name.eq_ignore_ascii_case("br") {
            let id = self.alloc_id();
            self.close_element(ElementNode::new(id, "br", Vec::new(), range));
        } else if name.eq_ignore_ascii_case("p") {
            self.start_tag("p", Vec::new(), false, range);
            self.close_until(Some("p"), range);
        } else {
            self.diag.error(
                format!("stray end tag </{name}> has no matching start tag."),
                Some(range),
            );
        }
    }

    /// Closes elements down to the nearest one named `name`, or all of them
    /// when `name` is `None` (end of input). Every element closed implicitly
    /// is reported.
    fn close_until(&mut self, name: Option<&str>, range: SourceRange) {
        let pos = match name {
            Some(n) => match self.stack.iter().rposition(|el| el.tag.eq_ignore_ascii_case(n)) {
                Some(p) => p,
                None => return,
            },
            None => 0,
        };
        while self.stack.len() > pos {
            let Some(mut el) = self.stack.pop() else {
                break;
            };
            let explicit = name.is_some() && self.stack.len() == pos;
            if explicit {
                el.range.end = range.end;
            } else {
                self.diag.error(
                    format!("tag <{}> has no matching end tag.", el.tag),
                    Some(el.range),
                );
            }
            self.close_element(el);
        }
    }

    fn close_element(&mut self, mut el: ElementNode) {
        if !self.in_pre {
            while matches!(el.children.last(), Some(Node::Text(t)) if t.text == " ") {
                el.children.pop();
            }
        }
        if !self.in_v_pre {
            self.process_element(&mut el);
        }

        let leaves_v_pre = self.v_pre_root == Some(el.id);
        let leaves_pre = (self.options.platform().is_pre_tag)(&el.tag);

        if let Some(parent) = self.stack.last_mut() {
            if el.forbidden {
                // dropped
            } else if el.else_if_exp.is_some() || el.is_else {
                attach_if_branch(parent, el, self.diag);
            } else {
                parent.children.push(Node::Element(el));
            }
        } else {
            match self.root.as_mut() {
                None => self.root = Some(el),
                Some(root) if root.if_exp.is_some() && (el.else_if_exp.is_some() || el.is_else) => {
                    check_root_constraints(&el, self.diag);
                    let exp = el.else_if_exp.take();
                    root.if_branches.push(IfBranch { exp, block: el });
                }
                Some(_) => self.diag.error(
                    "Component template should contain exactly one root element. \
                     If you are using v-if on multiple elements, use v-else-if to chain them instead.",
                    Some(el.range),
                ),
            }
        }

        if leaves_v_pre {
            self.in_v_pre = false;
            self.v_pre_root = None;
        }
        if leaves_pre {
            self.in_pre = false;
        }
    }

    fn text(&mut self, raw: &str, range: SourceRange) {
        let id = self.alloc_id();
        let options = self.options;
        let in_pre = self.in_pre;
        let in_v_pre = self.in_v_pre;

        let Some(parent) = self.stack.last_mut() else {
            if raw == self.src {
                self.diag.error(
                    "Component template requires a root element, rather than just text.",
                    Some(range),
                );
            } else if !raw.trim().is_empty() {
                self.diag.error(
                    format!("text \"{}\" outside root element will be ignored.", raw.trim()),
                    Some(range),
                );
            }
            return;
        };

        let mut content = if in_pre || !raw.trim().is_empty() {
            if is_text_tag(&parent.tag) {
                raw.to_string()
            } else {
                entities::decode_html(raw)
            }
        } else if parent.children.is_empty() {
            String::new()
        } else if options.whitespace() == Whitespace::Condense {
            if raw.contains(['\n', '\r']) {
                String::new()
            } else {
                " ".to_string()
            }
        } else {
            " ".to_string()
        };
        if !in_pre && options.whitespace() == Whitespace::Condense {
            content = condense(&content);
        }
        if content.is_empty() {
            return;
        }

        let delimiters = options.delimiters();
        if !in_v_pre {
            if let Some(offset) = text::find_unterminated(raw, delimiters) {
                self.diag.error(
                    format!(
                        "unterminated interpolation: missing closing \"{}\"",
                        delimiters.close
                    ),
                    Some(SourceRange::new(range.start + offset, range.end)),
                );
            }
        }

        if !in_v_pre && content != " " {
            if let Some(parsed) = text::parse_text(&content, delimiters) {
                parent.children.push(Node::Text(TextNode {
                    id,
                    text: content,
                    expression: Some(parsed.expression),
                    tokens: parsed.tokens,
                    range,
                }));
                return;
            }
        }
        let duplicate_space = content == " "
            && matches!(parent.children.last(), Some(Node::Text(t)) if t.text == " ");
        if !duplicate_space {
            parent.children.push(Node::Text(TextNode {
                id,
                text: content,
                expression: None,
                tokens: Vec::new(),
                range,
            }));
        }
    }

    fn comment(&mut self, text: &str, range: SourceRange) {
        if !self.options.comments() || self.stack.is_empty() {
            return;
        }
        let id = self.alloc_id();
        if let Some(parent) = self.stack.last_mut() {
            parent.children.push(Node::Comment(CommentNode {
                id,
                text: text.to_string(),
                range,
            }));
        }
    }

    fn check_root_constraints(&mut self, el: &ElementNode) {
        check_root_constraints(el, self.diag);
    }

    fn process_for(&mut self, el: &mut ElementNode) {
        let Some(attr) = el.take_attr("v-for") else {
            return;
        };
        let exp = attr.value.unwrap_or_default();
        match parse_for(&exp) {
            Some(f) => el.for_loop = Some(f),
            None => self
                .diag
                .error(format!("Invalid v-for expression: {exp}"), Some(attr.range)),
        }
    }

    fn process_if(&mut self, el: &mut ElementNode) {
        if let Some(attr) = el.take_attr("v-if") {
            let exp = attr.value.unwrap_or_default();
            if !exp.trim().is_empty() {
                if el.for_loop.is_some() {
                    self.diag.tip(
                        "v-for has higher priority than v-if on the same element; \
                         move v-if to a wrapper element or filter the list instead.",
                        Some(attr.range),
                    );
                }
                el.if_exp = Some(exp);
            }
        } else if el.take_attr("v-else").is_some() {
            el.is_else = true;
        } else if let Some(attr) = el.take_attr("v-else-if") {
            el.else_if_exp = Some(attr.value.unwrap_or_default());
        }
    }

    /// Runs when the element closes: key, ref, slots, component, module
    /// transforms, then the remaining attributes.
    fn process_element(&mut self, el: &mut ElementNode) {
        if let Some((key, range)) = take_binding_or_attr(el, "key") {
            if el.tag == "template" {
                self.diag.error(
                    "<template> cannot be keyed. Place the key on real elements instead.",
                    Some(range),
                );
            } else {
                el.key = Some(key);
            }
        }
        if let Some(attr) = el.take_binding("ref") {
            el.ref_name = Some(TemplateAttr::bound("ref", attr.value.unwrap_or_default(), attr.range));
        } else if let Some(attr) = el.take_attr("ref") {
            el.ref_name = Some(TemplateAttr::literal("ref", attr.value.unwrap_or_default(), attr.range));
        }

        self.process_slot_target(el);
        if el.tag == "slot" {
            el.slot_name = take_binding_or_attr(el, "name").map(|(v, _)| v);
            if el.key.is_some() {
                self.diag.error(
                    "`key` does not work on <slot> because slots are abstract outlets \
                     and can possibly expand into multiple elements. \
                     Use the key on a wrapping element instead.",
                    Some(el.range),
                );
            }
        }
        if let Some((component, _)) = take_binding_or_attr(el, "is") {
            el.component = Some(component);
        }

        let options = self.options;
        for module in options.modules() {
            module.transform_node(el, options.delimiters(), self.diag);
        }
        self.process_attrs(el);
    }

    fn process_slot_target(&mut self, el: &mut ElementNode) {
        if let Some((target, _)) = take_binding_or_attr(el, "slot") {
            el.slot_target = Some(target);
            return;
        }
        let Some(pos) = el
            .raw_attrs
            .iter()
            .position(|a| a.name == "v-slot" || a.name.starts_with("v-slot:") || a.name.starts_with('#'))
        else {
            return;
        };
        let attr = el.raw_attrs.remove(pos);
        let (name, _) = split_modifiers(&attr.name);
        let arg = name
            .strip_prefix('#')
            .or_else(|| name.strip_prefix("v-slot:"))
            .unwrap_or("default");
        let (arg, dynamic) = dynamic_arg(arg);
        el.slot_target = Some(if dynamic { arg.to_string() } else { string_lit(arg) });
        if attr.value.as_deref().is_some_and(|v| !v.trim().is_empty()) {
            self.diag.error(
                format!(
                    "{}=\"{}\": scoped slot bindings are not supported; \
                     pass data through props instead.",
                    attr.name,
                    attr.value.unwrap_or_default()
                ),
                Some(attr.range),
            );
        }
    }

    fn process_attrs(&mut self, el: &mut ElementNode) {
        let options = self.options;
        let delimiters = options.delimiters();
        let must_use_prop = options.platform().must_use_prop;
        for attr in std::mem::take(&mut el.raw_attrs) {
            let value = attr.value.clone().unwrap_or_default();
            if !is_directive_attr(&attr.name) {
                if text::has_interpolation(&value, delimiters) {
                    self.diag.error(
                        format!(
                            "{}=\"{}\": Interpolation inside attributes has been removed. \
                             Use v-bind or the colon shorthand instead. For example, instead of \
                             <div id=\"{{{{ val }}}}\">, use <div :id=\"val\">.",
                            attr.name, value
                        ),
                        Some(attr.range),
                    );
                }
                el.attrs.push(TemplateAttr::literal(&attr.name, value, attr.range));
                continue;
            }

            let (name, modifiers) = split_modifiers(&attr.name);
            let has = |m: &str| modifiers.iter().any(|x| x == m);

            if let Some(arg) = name.strip_prefix(':').or_else(|| name.strip_prefix("v-bind:")) {
                let (arg, dynamic) = dynamic_arg(arg);
                if value.trim().is_empty() {
                    self.diag.error(
                        format!("The value for a v-bind expression cannot be empty. Found in \"v-bind:{arg}\""),
                        Some(attr.range),
                    );
                }
                let mut prop_name = arg.to_string();
                let as_prop = has("prop");
                if !dynamic {
                    if as_prop || has("camel") {
                        prop_name = camelize(&prop_name);
                    }
                    if has("sync") {
                        el.events.push(EventBinding {
                            name: format!("update:{}", camelize(arg)),
                            value: format!("{value}=$event"),
                            modifiers: Vec::new(),
                            dynamic_name: false,
                            range: attr.range,
                        });
                    }
                }
                let type_attr = el.attr_value("type");
                let use_prop = as_prop
                    || (!dynamic && el.component.is_none() && must_use_prop(&el.tag, type_attr, &prop_name));
                let mut bound = TemplateAttr::bound(prop_name, value, attr.range);
                bound.dynamic_name = dynamic;
                if use_prop {
                    el.props.push(bound);
                } else {
                    el.attrs.push(bound);
                }
            } else if let Some(arg) = name.strip_prefix('@').or_else(|| name.strip_prefix("v-on:")) {
                let (arg, dynamic) = dynamic_arg(arg);
                self.add_handler(el, arg, value, modifiers, dynamic, attr.range);
            } else if let Some(rest) = name.strip_prefix("v-") {
                let (dir_name, arg) = match rest.split_once(':') {
                    Some((n, a)) => (n, Some(a)),
                    None => (rest, None),
                };
                if dir_name == "bind" && arg.is_none() {
                    el.bind_object = Some(value);
                    continue;
                }
                let (arg, dynamic_arg) = match arg.map(dynamic_arg) {
                    Some((a, d)) => (Some(a.to_string()), d),
                    None => (None, false),
                };
                el.directives.push(crate::template_ast::DirectiveBinding {
                    name: dir_name.to_string(),
                    raw_name: attr.name.clone(),
                    arg,
                    dynamic_arg,
                    modifiers,
                    value,
                    range: attr.range,
                });
            } else {
                self.diag.error(
                    format!("{} is only allowed on components or <template>.", attr.name),
                    Some(attr.range),
                );
            }
        }
    }

    fn add_handler(
        &mut self,
        el: &mut ElementNode,
        name: &str,
        value: String,
        mut modifiers: Vec<String>,
        dynamic_name: bool,
        range: SourceRange,
    ) {
        let has = |mods: &[String], m: &str| mods.iter().any(|x| x == m);
        if has(&modifiers, "prevent") && has(&modifiers, "passive") {
            self.diag.tip(
                "passive and prevent can't be used together. \
                 Passive handler can't prevent default event.",
                Some(range),
            );
        }

        let mut name = name.to_string();
        if !dynamic_name {
            if name == "click" && has(&modifiers, "right") {
                name = "contextmenu".into();
                modifiers.retain(|m| m != "right");
            } else if name == "click" && has(&modifiers, "middle") {
                name = "mouseup".into();
            }
            // `!` capture, `~` once, `&` passive
            for (m, prefix) in [("capture", '!'), ("once", '~'), ("passive", '&')] {
                if has(&modifiers, m) {
                    modifiers.retain(|x| x != m);
                    name.insert(0, prefix);
                }
            }
        }

        let native = has(&modifiers, "native");
        modifiers.retain(|m| m != "native");
        let binding = EventBinding {
            name,
            value,
            modifiers,
            dynamic_name,
            range,
        };
        if native {
            el.native_events.push(binding);
        } else {
            el.events.push(binding);
        }
    }
}

/// Reads `:name` (expression) or `name` (string literal).
fn take_binding_or_attr(el: &mut ElementNode, name: &str) -> Option<(String, SourceRange)> {
    if let Some(attr) = el.take_binding(name) {
        return Some((attr.value.unwrap_or_default(), attr.range));
    }
    el.take_attr(name)
        .map(|attr| (string_lit(&attr.value.unwrap_or_default()), attr.range))
}

fn process_raw_attrs(el: &mut ElementNode) {
    for attr in std::mem::take(&mut el.raw_attrs) {
        el.attrs.push(TemplateAttr::literal(
            attr.name,
            attr.value.unwrap_or_default(),
            attr.range,
        ));
    }
}

fn check_root_constraints(el: &ElementNode, diag: &mut Diagnostics) {
    if el.tag == "slot" || el.tag == "template" {
        diag.error(
            format!(
                "Cannot use <{}> as component root element because it may contain multiple nodes.",
                el.tag
            ),
            Some(el.range),
        );
    }
    if el.for_loop.is_some() {
        diag.error(
            "Cannot use v-for on stateful component root element because it renders multiple elements.",
            Some(el.range),
        );
    }
}

/// Folds a `v-else-if` / `v-else` element into the preceding `v-if`
/// sibling. Anything between the two is dropped.
fn attach_if_branch(parent: &mut ElementNode, mut el: ElementNode, diag: &mut Diagnostics) {
    loop {
        match parent.children.last() {
            Some(Node::Element(_)) | None => break,
            Some(Node::Text(t)) => {
                if !t.text.trim().is_empty() {
                    diag.error(
                        format!(
                            "text \"{}\" between v-if and v-else(-if) will be ignored.",
                            t.text.trim()
                        ),
                        Some(t.range),
                    );
                }
                parent.children.pop();
            }
            Some(Node::Comment(_)) => {
                parent.children.pop();
            }
        }
    }
    match parent.children.last_mut() {
        Some(Node::Element(prev)) if prev.if_exp.is_some() => {
            let exp = el.else_if_exp.take();
            prev.if_branches.push(IfBranch { exp, block: el });
        }
        _ => {
            let directive = match &el.else_if_exp {
                Some(exp) => format!("else-if=\"{exp}\""),
                None => "else".to_string(),
            };
            diag.error(
                format!(
                    "v-{directive} used on element <{}> without corresponding v-if.",
                    el.tag
                ),
                Some(el.range),
            );
        }
    }
}

fn is_forbidden_tag(el: &ElementNode) -> bool {
    el.tag == "style"
        || (el.tag == "script"
            && el
                .attr_value("type")
                .is_none_or(|t| t == "text/javascript"))
}

fn is_text_tag(tag: &str) -> bool {
    tag == "script" || tag == "style"
}

fn condense(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_ws = false;
    for c in s.chars() {
        if matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0c') {
            if !in_ws {
                out.push(' ');
            }
            in_ws = true;
        } else {
            out.push(c);
            in_ws = false;
        }
    }
    out
}
