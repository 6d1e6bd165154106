use proptest::prelude::*;
use quill_compiler::diagnostics::Diagnostics;
use quill_compiler::template_ast::{Ast, ElementNode};
use quill_compiler::{Annotations, BaseOptions, ResolvedOptions, create_compiler, optimize, parse_template_to_ast};

fn analyze(src: &str) -> (Ast, Annotations) {
    let base = BaseOptions::web();
    let options = ResolvedOptions::new(&base, None);
    let mut diag = Diagnostics::new();
    let ast = parse_template_to_ast(src, &options, &mut diag);
    let ann = optimize(&ast, &options);
    (ast, ann)
}

fn tag() -> impl Strategy<Value = &'static str> {
    prop_oneof![Just("div"), Just("span"), Just("section"), Just("my-comp"), Just("template")]
}

fn attr() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        4 => Just(""),
        1 => Just(r#" class="c""#),
        1 => Just(r#" :title="t""#),
        1 => Just(r#" v-if="x""#),
        1 => Just(" v-once"),
        1 => Just(" v-pre"),
        1 => Just(r#" v-for="i in items" :key="i""#),
        1 => Just(r#" @click="go""#),
    ]
}

fn node() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        Just("a".to_string()),
        Just("{{ b }}".to_string()),
        Just("<br>".to_string()),
        Just("<i>z</i>".to_string()),
    ];
    leaf.prop_recursive(4, 48, 4, |inner| {
        (tag(), attr(), prop::collection::vec(inner, 0..4))
            .prop_map(|(tag, attr, children)| format!("<{tag}{attr}>{}</{tag}>", children.concat()))
    })
}

fn template() -> impl Strategy<Value = String> {
    prop::collection::vec(node(), 0..4).prop_map(|children| format!("<div>{}</div>", children.concat()))
}

fn elements<'a>(el: &'a ElementNode, out: &mut Vec<&'a ElementNode>) {
    out.push(el);
    for child in el.element_children() {
        elements(child, out);
    }
    for branch in &el.if_branches {
        elements(&branch.block, out);
    }
}

fn all_elements(ast: &Ast) -> Vec<&ElementNode> {
    let mut out = Vec::new();
    if let Some(root) = &ast.root {
        elements(root, &mut out);
    }
    out
}

fn has_static_root_below(el: &ElementNode, ann: &Annotations) -> bool {
    el.element_children()
        .any(|c| ann.is_static_root(c.id) || has_static_root_below(c, ann))
}

proptest! {
    #[test]
    fn optimize_is_idempotent(src in template()) {
        let base = BaseOptions::web();
        let options = ResolvedOptions::new(&base, None);
        let mut diag = Diagnostics::new();
        let ast = parse_template_to_ast(&src, &options, &mut diag);
        prop_assert_eq!(optimize(&ast, &options), optimize(&ast, &options));
    }

    #[test]
    fn static_elements_have_static_children(src in template()) {
        let (ast, ann) = analyze(&src);
        for el in all_elements(&ast) {
            if ann.is_static(el.id) && !el.pre {
                prop_assert!(!el.has_bindings());
                prop_assert!(el.if_exp.is_none() && el.for_loop.is_none() && !el.once);
                for child in &el.children {
                    prop_assert!(ann.is_static(child.id()), "{} has a dynamic child", el.tag);
                }
            }
        }
    }

    #[test]
    fn static_roots_are_minimal(src in template()) {
        let (ast, ann) = analyze(&src);
        for el in all_elements(&ast) {
            if ann.is_static_root(el.id) {
                prop_assert!(ann.is_static(el.id));
                prop_assert!(!el.children.is_empty());
                prop_assert!(!has_static_root_below(el, &ann));
            }
        }
    }

    #[test]
    fn compile_is_deterministic(src in template()) {
        let compiler = create_compiler(BaseOptions::web());
        let a = compiler.compile(&src, None);
        let b = compiler.compile(&src, None);
        prop_assert_eq!(&a.render, &b.render);
        prop_assert_eq!(&a.static_render_fns, &b.static_render_fns);
        prop_assert_eq!(&a.errors, &b.errors);
        prop_assert!(a.static_render_fns.len() >= a.annotations.static_root_count());
    }
}

#[test]
fn text_nodes_follow_their_expression() {
    let (ast, ann) = analyze("<div>a{{ b }}<span>c</span></div>");
    let root = ast.root.unwrap();
    assert!(!ann.is_static(root.children[0].id()));
    assert!(ann.is_static(root.children[1].id()));
    assert!(!ann.is_static(root.id));
}

#[test]
fn components_and_slots_are_dynamic() {
    let (ast, ann) = analyze("<div><my-comp><b>x</b></my-comp><slot></slot></div>");
    let root = ast.root.unwrap();
    let comp = root.element_children().next().unwrap();
    assert!(!ann.is_static(comp.id));
    let b = comp.element_children().next().unwrap();
    assert!(ann.is_static_root(b.id));
    assert!(!ann.is_static(root.id));
}

#[test]
fn v_pre_subtree_is_static() {
    let (ast, ann) = analyze(r#"<div><p v-pre :a="b">{{ c }}</p></div>"#);
    let root = ast.root.unwrap();
    assert!(ann.is_static_root(root.id));
}

#[test]
fn template_loop_content_is_not_static() {
    let (ast, ann) = analyze(r#"<div><template v-for="i in items"><b>x</b></template></div>"#);
    let root = ast.root.unwrap();
    let tpl = root.element_children().next().unwrap();
    let b = tpl.element_children().next().unwrap();
    assert!(!ann.is_static(b.id));
}
