use std::collections::BTreeMap;

/// Stable identity of a node, assigned in creation order by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

/// Byte offsets into the (trimmed) template text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceRange {
    pub start: usize,
    pub end: usize,
}

impl SourceRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

/// Attribute exactly as written in the source: `name="value"`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawAttr {
    pub name: String,
    pub value: Option<String>,
    pub range: SourceRange,
}

/// Processed attribute or DOM prop. Static values hold literal text, dynamic
/// values hold the raw expression.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateAttr {
    pub name: String,
    pub value: String,
    pub dynamic: bool,
    /// `:[expr]="..."`: `name` holds an expression, not a literal name.
    pub dynamic_name: bool,
    pub range: SourceRange,
}

impl TemplateAttr {
    pub fn literal(name: impl Into<String>, value: impl Into<String>, range: SourceRange) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            dynamic: false,
            dynamic_name: false,
            range,
        }
    }

    pub fn bound(name: impl Into<String>, expr: impl Into<String>, range: SourceRange) -> Self {
        Self {
            name: name.into(),
            value: expr.into(),
            dynamic: true,
            dynamic_name: false,
            range,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventBinding {
    pub name: String,
    pub value: String,
    pub modifiers: Vec<String>,
    pub dynamic_name: bool,
    pub range: SourceRange,
}

impl EventBinding {
    pub fn has_modifier(&self, m: &str) -> bool {
        self.modifiers.iter().any(|x| x == m)
    }
}

/// A `v-xxx` directive that is not handled structurally by the parser.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveBinding {
    pub name: String,
    pub raw_name: String,
    pub arg: Option<String>,
    pub dynamic_arg: bool,
    pub modifiers: Vec<String>,
    pub value: String,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForLoop {
    pub source: String,
    pub alias: String,
    pub iterator1: Option<String>,
    pub iterator2: Option<String>,
}

/// A `v-else-if` / `v-else` branch folded into the element carrying `v-if`.
#[derive(Debug, Clone, PartialEq)]
pub struct IfBranch {
    pub exp: Option<String>,
    pub block: ElementNode,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElementNode {
    pub id: NodeId,
    pub tag: String,
    /// Source attributes not yet claimed by a processing step.
    pub raw_attrs: Vec<RawAttr>,
    /// Every source attribute by name, including the claimed ones.
    pub attrs_map: BTreeMap<String, Option<String>>,
    pub attrs: Vec<TemplateAttr>,
    pub props: Vec<TemplateAttr>,
    pub events: Vec<EventBinding>,
    pub native_events: Vec<EventBinding>,
    pub directives: Vec<DirectiveBinding>,
    pub children: Vec<Node>,
    pub ns: Option<String>,
    pub key: Option<String>,
    pub ref_name: Option<TemplateAttr>,
    pub if_exp: Option<String>,
    pub else_if_exp: Option<String>,
    pub is_else: bool,
    pub if_branches: Vec<IfBranch>,
    pub for_loop: Option<ForLoop>,
    pub once: bool,
    /// Inside (or carrying) `v-pre`: compiled verbatim.
    pub pre: bool,
    /// Expression from `is` / `:is`.
    pub component: Option<String>,
    /// Name expression of a `<slot>` outlet.
    pub slot_name: Option<String>,
    /// Slot this element is distributed into inside a parent component.
    pub slot_target: Option<String>,
    /// Object passed with `v-bind="obj"`.
    pub bind_object: Option<String>,
    /// Properties owned by compiler modules (e.g. `staticClass`), keyed by
    /// data-object field name and holding generated code.
    pub ext: BTreeMap<String, String>,
    pub forbidden: bool,
    pub range: SourceRange,
}

impl ElementNode {
    pub fn new(id: NodeId, tag: impl Into<String>, raw_attrs: Vec<RawAttr>, range: SourceRange) -> Self {
        let attrs_map = raw_attrs
            .iter()
            .map(|a| (a.name.clone(), a.value.clone()))
            .collect();
        Self {
            id,
            tag: tag.into(),
            raw_attrs,
            attrs_map,
            attrs: Vec::new(),
            props: Vec::new(),
            events: Vec::new(),
            native_events: Vec::new(),
            directives: Vec::new(),
            children: Vec::new(),
            ns: None,
            key: None,
            ref_name: None,
            if_exp: None,
            else_if_exp: None,
            is_else: false,
            if_branches: Vec::new(),
            for_loop: None,
            once: false,
            pre: false,
            component: None,
            slot_name: None,
            slot_target: None,
            bind_object: None,
            ext: BTreeMap::new(),
            forbidden: false,
            range,
        }
    }

    /// Removes and returns the first unclaimed attribute named `name`.
    pub fn take_attr(&mut self, name: &str) -> Option<RawAttr> {
        let pos = self.raw_attrs.iter().position(|a| a.name == name)?;
        Some(self.raw_attrs.remove(pos))
    }

    /// Removes `:name` / `v-bind:name` and returns its expression.
    pub fn take_binding(&mut self, name: &str) -> Option<RawAttr> {
        let short = format!(":{name}");
        let long = format!("v-bind:{name}");
        let pos = self
            .raw_attrs
            .iter()
            .position(|a| a.name == short || a.name == long)?;
        Some(self.raw_attrs.remove(pos))
    }

    pub fn attr_value(&self, name: &str) -> Option<&str> {
        self.attrs_map.get(name).and_then(|v| v.as_deref())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs_map.contains_key(name)
    }

    /// True when any attribute, prop, listener or directive depends on data.
    pub fn has_bindings(&self) -> bool {
        self.attrs.iter().any(|a| a.dynamic || a.dynamic_name)
            || !self.props.is_empty()
            || !self.events.is_empty()
            || !self.native_events.is_empty()
            || !self.directives.is_empty()
            || self.bind_object.is_some()
    }

    pub fn element_children(&self) -> impl Iterator<Item = &ElementNode> {
        self.children.iter().filter_map(|c| match c {
            Node::Element(el) => Some(el),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TextToken {
    Literal(String),
    Binding(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextNode {
    pub id: NodeId,
    pub text: String,
    /// Present when the text contains interpolations: `"Hello "+_s(name)`.
    pub expression: Option<String>,
    pub tokens: Vec<TextToken>,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CommentNode {
    pub id: NodeId,
    pub text: String,
    pub range: SourceRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(ElementNode),
    Text(TextNode),
    Comment(CommentNode),
}

impl Node {
    pub fn id(&self) -> NodeId {
        match self {
            Node::Element(el) => el.id,
            Node::Text(t) => t.id,
            Node::Comment(c) => c.id,
        }
    }

    pub fn range(&self) -> SourceRange {
        match self {
            Node::Element(el) => el.range,
            Node::Text(t) => t.range,
            Node::Comment(c) => c.range,
        }
    }

    pub fn as_element(&self) -> Option<&ElementNode> {
        match self {
            Node::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match self {
            Node::Text(t) => Some(t),
            _ => None,
        }
    }
}

/// Parsed template. `root` is `None` only for an empty template.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ast {
    pub root: Option<ElementNode>,
    pub node_count: u32,
}
