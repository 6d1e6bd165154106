use std::sync::Arc;

use quill_compiler::{BaseOptions, CompiledFunctions, CompilerOptions, RenderInstance, RuntimeError, create_compiler};
use quill_dom::{Props, VNode, Value, h, text};

fn functions(src: &str) -> Arc<CompiledFunctions> {
    let fns = create_compiler(BaseOptions::web())
        .compile_to_functions(src, None)
        .expect("generated code parses");
    assert!(fns.errors.is_empty(), "{:?}", fns.errors);
    fns
}

fn render(src: &str, data: Value) -> VNode {
    RenderInstance::new(functions(src), data).render().expect("renders")
}

#[test]
fn interpolation_renders_text() {
    let node = render("<div>{{ msg }}</div>", Value::object([("msg", Value::from("hi"))]));
    assert_eq!(node, h("div", (), vec![text("hi")]));
}

#[test]
fn static_template_renders_through_fragment() {
    let fns = functions("<div>static</div>");
    assert_eq!(fns.render.source(), "with(this){return _m(0)}");
    assert_eq!(fns.static_render_fns.len(), 1);
    let node = RenderInstance::new(fns, Value::Undefined).render().unwrap();
    assert_eq!(node.tag(), Some("div"));
    assert_eq!(node.text_content(), "static");
    assert!(node.props().unwrap().is_static);
}

#[test]
fn empty_template_renders_div() {
    let node = render("", Value::Undefined);
    assert_eq!(node, h("div", (), vec![]));
}

#[test]
fn conditional_chain_follows_data() {
    let fns = functions(r#"<div><p v-if="n > 1">many</p><p v-else-if="n === 1">one</p><p v-else>none</p></div>"#);
    let mut inst = RenderInstance::new(fns, Value::object([("n", Value::from(3))]));
    assert_eq!(inst.render().unwrap().text_content(), "many");
    inst.set_data(Value::object([("n", Value::from(1))]));
    assert_eq!(inst.render().unwrap().text_content(), "one");
    inst.set_data(Value::object([("n", Value::from(0))]));
    assert_eq!(inst.render().unwrap().text_content(), "none");
}

#[test]
fn missing_branch_renders_comment() {
    let node = render(r#"<div><p v-if="show">x</p></div>"#, Value::object([("show", Value::from(false))]));
    assert!(matches!(node.children(), [VNode::Comment(_)]));
}

#[test]
fn list_renders_keyed_items() {
    let rows = Value::from(vec![
        Value::object([("id", Value::from(1)), ("name", Value::from("a"))]),
        Value::object([("id", Value::from(2)), ("name", Value::from("b"))]),
    ]);
    let node = render(
        r#"<ul><li v-for="(row, i) in rows" :key="row.id">{{ i }}-{{ row.name }}</li></ul>"#,
        Value::object([("rows", rows)]),
    );
    let items: Vec<(Option<String>, String)> = node
        .children()
        .iter()
        .map(|c| (c.props().and_then(|p| p.key.clone()), c.text_content()))
        .collect();
    assert_eq!(
        items,
        vec![(Some("1".into()), "0-a".into()), (Some("2".into()), "1-b".into())]
    );
}

#[test]
fn static_content_inside_loop_is_rendered_per_item() {
    let node = render(
        r#"<ul><li v-for="x in xs"><b>tag</b>{{ x }}</li></ul>"#,
        Value::object([("xs", Value::from(vec!["a", "b"]))]),
    );
    assert_eq!(node.text_content(), "tagatagb");
}

#[test]
fn once_content_is_frozen_after_first_render() {
    let fns = functions(r#"<div><span v-once>{{ n }}</span>{{ n }}</div>"#);
    let mut inst = RenderInstance::new(fns, Value::object([("n", Value::from(1))]));
    assert_eq!(inst.render().unwrap().text_content(), "11");
    inst.set_data(Value::object([("n", Value::from(2))]));
    assert_eq!(inst.render().unwrap().text_content(), "12");
}

#[test]
fn attributes_classes_and_styles() {
    let node = render(
        r#"<a class="link" :class="{ active: on }" style="color: red" :href="url" :title="none">go</a>"#,
        Value::object([
            ("on", Value::from(true)),
            ("url", Value::from("/x")),
            ("none", Value::Null),
        ]),
    );
    let expected = Props::new()
        .set("class", "link active")
        .set("style", "color:red")
        .set("href", "/x");
    assert_eq!(node.props().unwrap().attrs, expected.attrs);
}

#[test]
fn listeners_keep_their_source() {
    let node = render(r#"<button @click="count++">+</button>"#, Value::Undefined);
    let on = &node.props().unwrap().on;
    assert_eq!(on.get("click").map(String::as_str), Some("function($event){count++}"));
}

#[test]
fn slot_outlet_uses_content_or_fallback() {
    let fns = functions(r#"<div><slot>fallback</slot></div>"#);
    let filled = RenderInstance::new(Arc::clone(&fns), Value::Undefined)
        .with_slot("default", vec![text("given")])
        .render()
        .unwrap();
    assert_eq!(filled.text_content(), "given");
    let empty = RenderInstance::new(fns, Value::Undefined).render().unwrap();
    assert_eq!(empty.text_content(), "fallback");
}

#[test]
fn v_text_and_v_html_become_dom_props() {
    let node = render(
        r#"<div><span v-text="a"></span><span v-html="b"></span></div>"#,
        Value::object([("a", Value::from("x")), ("b", Value::from("<i>y</i>"))]),
    );
    let props: Vec<_> = node.children().iter().map(|c| c.props().unwrap().dom_props.clone()).collect();
    assert_eq!(props[0].get("textContent").map(String::as_str), Some("x"));
    assert_eq!(props[1].get("innerHTML").map(String::as_str), Some("<i>y</i>"));
}

#[test]
fn whitespace_condense_collapses_text() {
    let options = CompilerOptions::new().whitespace(quill_compiler::Whitespace::Condense);
    let fns = create_compiler(BaseOptions::web())
        .compile_to_functions("<p>\n  a   b\n  <b>c</b>\n</p>", Some(&options))
        .unwrap();
    let node = RenderInstance::new(fns, Value::Undefined).render().unwrap();
    assert_eq!(node.text_content(), " a b c");
}

#[test]
fn runtime_failures_are_errors() {
    let fns = functions("<div>{{ a.b.c }}</div>");
    let err = RenderInstance::new(fns, Value::object([("a", Value::object([("b", Value::Null)]))]))
        .render()
        .unwrap_err();
    assert_eq!(err.to_string(), "cannot read property `c` of null.");
}

#[test]
fn once_list_renders_every_item_and_stays_frozen() {
    let fns = functions(r#"<ul><li v-for="i in items" :key="i" v-once>{{ i }}</li></ul>"#);
    assert_eq!(fns.render.source(), "with(this){return _c('ul',_m(0))}");
    let mut inst = RenderInstance::new(fns, Value::object([("items", Value::from(vec![1, 2, 3]))]));
    let node = inst.render().unwrap();
    let keys: Vec<_> = node
        .children()
        .iter()
        .map(|c| c.props().and_then(|p| p.key.clone()))
        .collect();
    assert_eq!(
        keys,
        vec![
            Some("__static__0_0".to_string()),
            Some("__static__0_1".to_string()),
            Some("__static__0_2".to_string()),
        ]
    );
    assert_eq!(node.text_content(), "123");

    inst.set_data(Value::object([("items", Value::from(vec![9]))]));
    assert_eq!(inst.render().unwrap().text_content(), "123");
}

#[test]
fn to_fixed_rejects_out_of_range_digits() {
    let data = Value::object([("n", Value::from(1.5))]);
    let node = render("<p>{{ n.toFixed(2) }}</p>", data.clone());
    assert_eq!(node.text_content(), "1.50");

    let err = RenderInstance::new(functions("<p>{{ n.toFixed(70000) }}</p>"), data.clone())
        .render()
        .unwrap_err();
    assert!(matches!(err, RuntimeError::IllegalArguments { helper: "toFixed", .. }));
    assert!(
        RenderInstance::new(functions("<p>{{ n.toFixed(-1) }}</p>"), data)
            .render()
            .is_err()
    );
}
