pub mod value;

pub use value::Value;

use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub enum VNode {
    Element {
        tag: String,
        props: Props,
        children: Vec<VNode>,
    },
    Text(String),
    /// Placeholder for a branch that rendered nothing, or a kept template comment.
    Comment(String),
}

/// A runtime directive left on an element after compilation (e.g. `v-show`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VDirective {
    pub name: String,
    pub raw_name: String,
    pub value: Value,
    pub expression: Option<String>,
    pub arg: Option<String>,
    pub modifiers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Props {
    pub attrs: BTreeMap<String, String>,
    pub dom_props: BTreeMap<String, String>,
    /// Event name (with capture/once/passive prefixes) to handler source.
    pub on: BTreeMap<String, String>,
    /// Listeners bound with `.native` on a component.
    pub native_on: BTreeMap<String, String>,
    pub directives: Vec<VDirective>,
    pub key: Option<String>,
    pub ref_name: Option<String>,
    /// Named slot of the parent component this node is distributed into.
    pub slot: Option<String>,
    /// Set on nodes produced by a static fragment or a `v-once` subtree.
    pub is_static: bool,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn set(mut self, k: impl Into<String>, v: impl Into<String>) -> Self {
        self.attrs.insert(k.into(), v.into());
        self
    }
    pub fn dom_prop(mut self, k: impl Into<String>, v: impl Into<String>) -> Self {
        self.dom_props.insert(k.into(), v.into());
        self
    }
    pub fn on(mut self, event: impl Into<String>, handler: impl Into<String>) -> Self {
        self.on.insert(event.into(), handler.into());
        self
    }
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }
}

// Allow concise props creation
impl From<()> for Props {
    fn from(_: ()) -> Self {
        Props::default()
    }
}
impl From<Vec<(&str, &str)>> for Props {
    fn from(v: Vec<(&str, &str)>) -> Self {
        let mut p = Props::new();
        for (k, v) in v {
            p.attrs.insert(k.to_string(), v.to_string());
        }
        p
    }
}

impl VNode {
    pub fn tag(&self) -> Option<&str> {
        match self {
            VNode::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn children(&self) -> &[VNode] {
        match self {
            VNode::Element { children, .. } => children,
            _ => &[],
        }
    }

    pub fn props(&self) -> Option<&Props> {
        match self {
            VNode::Element { props, .. } => Some(props),
            _ => None,
        }
    }

    /// Concatenated text of this node and its descendants, comments excluded.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(self, &mut out);
        out
    }
}

fn collect_text(node: &VNode, out: &mut String) {
    match node {
        VNode::Text(t) => out.push_str(t),
        VNode::Comment(_) => {}
        VNode::Element { children, .. } => {
            for c in children {
                collect_text(c, out);
            }
        }
    }
}

pub fn h(tag: impl Into<String>, props: impl Into<Props>, children: Vec<VNode>) -> VNode {
    VNode::Element {
        tag: tag.into(),
        props: props.into(),
        children,
    }
}
pub fn text(t: impl Into<String>) -> VNode {
    VNode::Text(t.into())
}
pub fn comment(t: impl Into<String>) -> VNode {
    VNode::Comment(t.into())
}
