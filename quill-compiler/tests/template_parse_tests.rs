use quill_compiler::diagnostics::Diagnostics;
use quill_compiler::template_ast::{Ast, Node, TextToken};
use quill_compiler::{BaseOptions, CompilerOptions, Delimiters, ResolvedOptions, Whitespace, parse_template_to_ast};

fn parse_with(src: &str, overlay: Option<&CompilerOptions>) -> (Ast, Diagnostics) {
    let base = BaseOptions::web();
    let options = ResolvedOptions::new(&base, overlay);
    let mut diag = Diagnostics::new();
    let ast = parse_template_to_ast(src, &options, &mut diag);
    (ast, diag)
}

fn parse(src: &str) -> (Ast, Diagnostics) {
    parse_with(src, None)
}

fn error_messages(diag: &Diagnostics) -> Vec<String> {
    diag.errors().map(|d| d.message.clone()).collect()
}

#[test]
fn parse_element_with_text() {
    let (ast, diag) = parse("<div>hi</div>");
    assert!(diag.is_empty());
    let root = ast.root.expect("root");
    assert_eq!(root.tag, "div");
    assert_eq!(root.children.len(), 1);
    let text = root.children[0].as_text().expect("text");
    assert_eq!(text.text, "hi");
    assert!(text.expression.is_none());
}

#[test]
fn parse_text_and_interpolation() {
    let (ast, _) = parse("<p>Hello {{ name }}!</p>");
    let root = ast.root.unwrap();
    let text = root.children[0].as_text().unwrap();
    assert_eq!(text.expression.as_deref(), Some(r#""Hello "+_s(name)+"!""#));
    assert_eq!(
        text.tokens,
        vec![
            TextToken::Literal("Hello ".into()),
            TextToken::Binding("name".into()),
            TextToken::Literal("!".into()),
        ]
    );
}

#[test]
fn parse_attrs_static_bind_event_directive() {
    let (ast, diag) = parse(r#"<input class="x" :value="count" @input.once="onInput" v-focus:arg.lazy="y" key="k">"#);
    assert!(diag.is_empty(), "{:?}", error_messages(&diag));
    let el = ast.root.unwrap();
    assert_eq!(el.ext.get("staticClass").map(String::as_str), Some(r#""x""#));
    assert_eq!(el.props.len(), 1);
    assert_eq!(el.props[0].name, "value");
    assert!(el.props[0].dynamic);
    assert_eq!(el.events[0].name, "~input");
    assert_eq!(el.events[0].value, "onInput");
    let dir = &el.directives[0];
    assert_eq!(dir.name, "focus");
    assert_eq!(dir.arg.as_deref(), Some("arg"));
    assert_eq!(dir.modifiers, vec!["lazy".to_string()]);
    assert_eq!(dir.value, "y");
    assert_eq!(el.key.as_deref(), Some(r#""k""#));
}

#[test]
fn bind_modifiers_and_dynamic_names() {
    let (ast, _) = parse(r#"<my-comp :foo-bar.camel="a" :baz.sync="b" :[name]="c" @click.right="menu"></my-comp>"#);
    let el = ast.root.unwrap();
    let names: Vec<_> = el.attrs.iter().map(|a| (a.name.as_str(), a.dynamic_name)).collect();
    assert_eq!(names, vec![("fooBar", false), ("baz", false), ("name", true)]);
    let events: Vec<_> = el.events.iter().map(|e| (e.name.as_str(), e.value.as_str())).collect();
    assert_eq!(events, vec![("update:baz", "b=$event"), ("contextmenu", "menu")]);
}

#[test]
fn native_listeners_are_separate() {
    let (ast, _) = parse(r#"<my-comp @click.native="go" @change="set"></my-comp>"#);
    let el = ast.root.unwrap();
    assert_eq!(el.native_events.len(), 1);
    assert_eq!(el.native_events[0].name, "click");
    assert_eq!(el.events.len(), 1);
}

#[test]
fn recovers_from_missing_end_tag() {
    let (ast, diag) = parse("<div><span></div>");
    let root = ast.root.unwrap();
    assert_eq!(root.element_children().next().map(|e| e.tag.as_str()), Some("span"));
    assert_eq!(error_messages(&diag), vec!["tag <span> has no matching end tag.".to_string()]);
}

#[test]
fn unclosed_elements_at_end_of_input() {
    let (ast, diag) = parse("<div><p>text");
    assert_eq!(ast.root.unwrap().tag, "div");
    assert_eq!(diag.errors().count(), 2);
}

#[test]
fn stray_end_tag_is_reported() {
    let (ast, diag) = parse("<div></span></div>");
    assert!(ast.root.is_some());
    assert_eq!(
        error_messages(&diag),
        vec!["stray end tag </span> has no matching start tag.".to_string()]
    );
}

#[test]
fn br_and_p_end_tag_recovery() {
    let (ast, diag) = parse("<div></br></p></div>");
    assert!(diag.is_empty());
    let tags: Vec<_> = ast.root.unwrap().element_children().map(|e| e.tag.clone()).collect();
    assert_eq!(tags, vec!["br", "p"]);
}

#[test]
fn duplicate_attribute_keeps_first() {
    let (ast, diag) = parse(r#"<div id="a" id="b"></div>"#);
    assert_eq!(error_messages(&diag), vec!["duplicate attribute: id".to_string()]);
    let root = ast.root.unwrap();
    assert_eq!(root.attrs.len(), 1);
    assert_eq!(root.attrs[0].value, "a");
}

#[test]
fn interpolation_in_static_attribute_is_an_error() {
    let (ast, diag) = parse(r#"<div id="{{ a }}"></div>"#);
    assert!(error_messages(&diag)[0].contains("Interpolation inside attributes has been removed"));
    let root = ast.root.unwrap();
    assert!(!root.attrs[0].dynamic);
}

#[test]
fn class_and_style_interpolation_follows_delimiters() {
    let options = CompilerOptions::new().delimiters(Delimiters::new("${", "}"));
    let (_, diag) = parse_with(r#"<div class="${ a }" style="color: ${ c }"></div>"#, Some(&options));
    let messages = error_messages(&diag);
    assert_eq!(messages.len(), 2);
    assert!(messages[0].starts_with("class=\"${ a }\": Interpolation inside attributes"));
    assert!(messages[1].starts_with("style=\"color: ${ c }\": Interpolation inside attributes"));

    let (_, diag) = parse_with(r#"<div class="{{ a }}" style="color: red"></div>"#, Some(&options));
    assert!(diag.is_empty());
}

#[test]
fn root_rules() {
    let (_, diag) = parse("<div></div><p></p>");
    assert!(error_messages(&diag)[0].starts_with("Component template should contain exactly one root element."));

    let (ast, diag) = parse("hello");
    assert!(ast.root.is_none());
    assert_eq!(
        error_messages(&diag),
        vec!["Component template requires a root element, rather than just text.".to_string()]
    );

    let (_, diag) = parse("<template><div></div></template>");
    assert!(error_messages(&diag)[0].starts_with("Cannot use <template> as component root element"));

    let (_, diag) = parse(r#"<li v-for="i in items"></li>"#);
    assert!(error_messages(&diag)[0].starts_with("Cannot use v-for on stateful component root element"));
}

#[test]
fn text_outside_root_is_dropped() {
    let (ast, diag) = parse("<div></div> trailing");
    assert!(ast.root.unwrap().children.is_empty());
    assert_eq!(
        error_messages(&diag),
        vec!["text \"trailing\" outside root element will be ignored.".to_string()]
    );
}

#[test]
fn whitespace_preserve_and_condense() {
    let src = "<div>\n  <span>a</span>\n  <span>b</span>\n</div>";
    let (ast, _) = parse(src);
    assert_eq!(ast.root.unwrap().children.len(), 3);

    let condense = CompilerOptions::new().whitespace(Whitespace::Condense);
    let (ast, _) = parse_with(src, Some(&condense));
    let root = ast.root.unwrap();
    assert_eq!(root.children.len(), 2);
    assert!(root.children.iter().all(|c| matches!(c, Node::Element(_))));

    let (ast, _) = parse_with("<p>a   b\n c</p>", Some(&condense));
    assert_eq!(ast.root.unwrap().children[0].as_text().unwrap().text, "a b c");
}

#[test]
fn pre_content_is_verbatim() {
    let (ast, _) = parse("<pre>  a   b  </pre>");
    assert_eq!(ast.root.unwrap().children[0].as_text().unwrap().text, "  a   b  ");
}

#[test]
fn v_pre_block() {
    let (ast, diag) = parse(r#"<div v-pre><span :a="b">{{ c }}</span></div>"#);
    assert!(diag.is_empty());
    let root = ast.root.unwrap();
    assert!(root.pre);
    let span = root.element_children().next().unwrap();
    assert!(span.pre);
    assert_eq!(span.attrs[0].name, ":a");
    assert!(!span.attrs[0].dynamic);
    let text = span.children[0].as_text().unwrap();
    assert_eq!(text.text, "{{ c }}");
    assert!(text.expression.is_none());
}

#[test]
fn entities_are_decoded() {
    let (ast, _) = parse(r#"<div title="a &amp; b">&lt;x&gt; &nbsp;</div>"#);
    let root = ast.root.unwrap();
    assert_eq!(root.attrs[0].value, "a & b");
    assert_eq!(root.children[0].as_text().unwrap().text, "<x> \u{a0}");
}

#[test]
fn unterminated_interpolation_keeps_raw_text() {
    let (ast, diag) = parse("<div>{{ a</div>");
    assert_eq!(
        error_messages(&diag),
        vec![r#"unterminated interpolation: missing closing "}}""#.to_string()]
    );
    let range = diag.errors().next().unwrap().range.unwrap();
    assert_eq!(range.start, 5);
    let text = ast.root.unwrap().children[0].as_text().unwrap().clone();
    assert_eq!(text.text, "{{ a");
    assert!(text.expression.is_none());
}

#[test]
fn custom_delimiters() {
    let options = CompilerOptions::new().delimiters(Delimiters::new("${", "}"));
    let (ast, _) = parse_with("<div>${ a } {{ b }}</div>", Some(&options));
    let text = ast.root.unwrap().children[0].as_text().unwrap().clone();
    assert_eq!(text.expression.as_deref(), Some(r#"_s(a)+" {{ b }}""#));
}

#[test]
fn svg_children_inherit_namespace() {
    let (ast, _) = parse("<svg><g><circle/></g></svg>");
    let svg = ast.root.unwrap();
    let g = svg.element_children().next().unwrap();
    let circle = g.element_children().next().unwrap();
    assert_eq!(circle.ns.as_deref(), Some("svg"));
}

#[test]
fn comments_only_with_option() {
    let (ast, _) = parse("<div><!-- note --></div>");
    assert!(ast.root.unwrap().children.is_empty());
    let options = CompilerOptions::new().comments(true);
    let (ast, _) = parse_with("<div><!-- note --></div>", Some(&options));
    assert!(matches!(&ast.root.unwrap().children[0], Node::Comment(c) if c.text == " note "));
}

#[test]
fn slot_targets_and_outlets() {
    let (ast, diag) = parse(r#"<my-layout><template #header><h1>t</h1></template><p slot="footer">f</p><slot name="x"></slot></my-layout>"#);
    assert!(diag.is_empty(), "{:?}", error_messages(&diag));
    let root = ast.root.unwrap();
    let children: Vec<_> = root.element_children().collect();
    assert_eq!(children[0].slot_target.as_deref(), Some(r#""header""#));
    assert_eq!(children[1].slot_target.as_deref(), Some(r#""footer""#));
    assert_eq!(children[2].slot_name.as_deref(), Some(r#""x""#));
}

#[test]
fn scoped_slot_values_are_rejected() {
    let (_, diag) = parse(r#"<my-list><template #item="{ row }">x</template></my-list>"#);
    assert!(error_messages(&diag)[0].contains("scoped slot bindings are not supported"));
}

#[test]
fn forbidden_tags_are_dropped() {
    let (ast, diag) = parse("<div><style>a{}</style><script>x()</script></div>");
    assert!(ast.root.unwrap().children.is_empty());
    assert_eq!(diag.errors().count(), 2);
}

#[test]
fn node_ids_are_unique() {
    let (ast, _) = parse("<div><p>a</p><p>{{ b }}</p></div>");
    let root = ast.root.unwrap();
    let mut ids = vec![root.id];
    for child in root.element_children() {
        ids.push(child.id);
        ids.extend(child.children.iter().map(Node::id));
    }
    let mut sorted = ids.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(sorted.len(), ids.len());
    assert!(ids.iter().all(|id| id.0 < ast.node_count));
}
