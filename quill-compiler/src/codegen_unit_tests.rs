use super::*;
use crate::template_ast::SourceRange;

fn event(name: &str, value: &str, modifiers: &[&str]) -> EventBinding {
    EventBinding {
        name: name.into(),
        value: value.into(),
        modifiers: modifiers.iter().map(|m| m.to_string()).collect(),
        dynamic_name: false,
        range: SourceRange::default(),
    }
}

#[test]
fn string_lit_escapes() {
    assert_eq!(string_lit("a\"b\\c\n"), r#""a\"b\\c\n""#);
    assert_eq!(string_lit("x\u{2028}y"), "\"x\\u2028y\"");
    assert_eq!(string_lit("\u{1}"), r#""\u0001""#);
}

#[test]
fn simple_paths() {
    assert!(is_simple_path("save"));
    assert!(is_simple_path("form.submit"));
    assert!(is_simple_path("handlers['click']"));
    assert!(is_simple_path("list[0]"));
    assert!(!is_simple_path("count++"));
    assert!(!is_simple_path("a.b()"));
}

#[test]
fn handler_without_modifiers() {
    assert_eq!(gen_handler(&event("click", "save", &[])), "save");
    assert_eq!(
        gen_handler(&event("click", "save(item)", &[])),
        "function($event){return save(item)}"
    );
    assert_eq!(
        gen_handler(&event("click", "count++", &[])),
        "function($event){count++}"
    );
    assert_eq!(
        gen_handler(&event("click", "function(e){go(e)}", &[])),
        "function(e){go(e)}"
    );
    assert_eq!(gen_handler(&event("click", "  ", &[])), "function(){}");
}

#[test]
fn handler_with_modifiers() {
    assert_eq!(
        gen_handler(&event("submit", "save", &["prevent"])),
        "function($event){$event.preventDefault();return save.apply(null, arguments)}"
    );
    assert_eq!(
        gen_handler(&event("keyup", "go", &["enter"])),
        "function($event){if(!$event.type.indexOf('key')&&_k($event.keyCode,\"enter\",13,$event.key,\"Enter\"))return null;return go.apply(null, arguments)}"
    );
    let exact = gen_handler(&event("click", "go()", &["ctrl", "exact"]));
    assert!(exact.contains("if(!$event.ctrlKey)return null;"));
    assert!(exact.contains("if($event.shiftKey||$event.altKey||$event.metaKey)return null;"));
}

#[test]
fn numeric_key_filter() {
    assert_eq!(
        gen_key_filter(&["65"]),
        "if(!$event.type.indexOf('key')&&$event.keyCode!==65)return null;"
    );
}

#[test]
fn repeated_events_become_arrays() {
    let out = gen_handlers(&[event("click", "a", &[]), event("click", "b", &[]), event("!scroll", "c", &[])]);
    assert_eq!(out, r#"{"click":[a,b],"!scroll":c}"#);
}

#[test]
fn props_with_dynamic_names() {
    let mut dynamic = TemplateAttr::bound("key", "val", SourceRange::default());
    dynamic.dynamic_name = true;
    let attrs = vec![TemplateAttr::literal("id", "app", SourceRange::default()), dynamic];
    assert_eq!(gen_props(&attrs), r#"{"id":"app",[key]:val}"#);
}
