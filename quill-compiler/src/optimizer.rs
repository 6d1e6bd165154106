//! Static analysis. Finds subtrees that never depend on data so the code
//! generator can hoist them into fragments rendered once. The AST is never
//! modified; results live in an [`Annotations`] side table.

use std::collections::BTreeSet;

use crate::options::ResolvedOptions;
use crate::template_ast::{Ast, ElementNode, Node, NodeId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeFlags {
    pub is_static: bool,
    pub static_in_for: bool,
    pub static_root: bool,
}

/// Per-node flags indexed by [`NodeId`]. Unknown ids read as all-false, so
/// an empty table means "nothing is static".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Annotations {
    flags: Vec<NodeFlags>,
}

impl Annotations {
    pub fn get(&self, id: NodeId) -> NodeFlags {
        self.flags.get(id.0 as usize).copied().unwrap_or_default()
    }

    pub fn is_static(&self, id: NodeId) -> bool {
        self.get(id).is_static
    }

    pub fn is_static_root(&self, id: NodeId) -> bool {
        self.get(id).static_root
    }

    pub fn is_static_in_for(&self, id: NodeId) -> bool {
        self.get(id).static_in_for
    }

    pub fn static_root_count(&self) -> usize {
        self.flags.iter().filter(|f| f.static_root).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, NodeFlags)> + '_ {
        self.flags
            .iter()
            .enumerate()
            .map(|(i, f)| (NodeId(i as u32), *f))
    }

    fn entry(&mut self, id: NodeId) -> &mut NodeFlags {
        let i = id.0 as usize;
        if i >= self.flags.len() {
            self.flags.resize(i + 1, NodeFlags::default());
        }
        &mut self.flags[i]
    }
}

struct Context<'o> {
    static_keys: BTreeSet<&'o str>,
    is_reserved_tag: fn(&str) -> bool,
}

/// Computes static flags for every node of `ast`. Pure: the same AST and
/// options always give the same table.
pub fn optimize(ast: &Ast, options: &ResolvedOptions) -> Annotations {
    let mut ann = Annotations {
        flags: vec![NodeFlags::default(); ast.node_count as usize],
    };
    let Some(root) = &ast.root else {
        return ann;
    };
    let ctx = Context {
        static_keys: options.static_keys(),
        is_reserved_tag: options.platform().is_reserved_tag,
    };
    mark_static(root, false, &ctx, &mut ann);
    mark_static_roots(root, false, &mut ann);
    log::debug!("optimizer found {} static roots", ann.static_root_count());
    ann
}

fn mark_static(el: &ElementNode, in_template_for: bool, ctx: &Context<'_>, ann: &mut Annotations) -> bool {
    let mut is_static = is_static_element(el, in_template_for, ctx);

    let child_in_template_for = el.tag == "template" && (el.for_loop.is_some() || in_template_for);
    for child in &el.children {
        let child_static = match child {
            Node::Element(c) => mark_static(c, child_in_template_for, ctx, ann),
            Node::Text(t) => {
                let s = t.expression.is_none();
                ann.entry(t.id).is_static = s;
                s
            }
            Node::Comment(c) => {
                ann.entry(c.id).is_static = true;
                true
            }
        };
        if !child_static && !el.pre {
            is_static = false;
        }
    }
    for branch in &el.if_branches {
        if !mark_static(&branch.block, in_template_for, ctx, ann) {
            is_static = false;
        }
    }

    ann.entry(el.id).is_static = is_static;
    is_static
}

fn is_static_element(el: &ElementNode, in_template_for: bool, ctx: &Context<'_>) -> bool {
    if el.pre {
        return true;
    }
    !el.has_bindings()
        && el.if_exp.is_none()
        && el.for_loop.is_none()
        && !el.once
        && el.key.is_none()
        && el.ref_name.is_none()
        && el.component.is_none()
        && el.slot_name.is_none()
        && el.slot_target.is_none()
        && el.tag != "slot"
        && el.tag != "template"
        && el.tag != "component"
        && (ctx.is_reserved_tag)(&el.tag)
        && !in_template_for
        && el.ext.keys().all(|k| ctx.static_keys.contains(k.as_str()))
}

fn mark_static_roots(el: &ElementNode, in_for: bool, ann: &mut Annotations) {
    let flags = ann.get(el.id);
    if flags.is_static || el.once {
        ann.entry(el.id).static_in_for = in_for;
    }
    // text leaves are never hoisted on their own, only with their element
    if flags.is_static && !el.children.is_empty() {
        ann.entry(el.id).static_root = true;
        return;
    }
    ann.entry(el.id).static_root = false;

    let child_in_for = in_for || el.for_loop.is_some();
    for child in el.element_children() {
        mark_static_roots(child, child_in_for, ann);
    }
    for branch in &el.if_branches {
        mark_static_roots(&branch.block, in_for, ann);
    }
}
