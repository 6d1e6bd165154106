use quill_compiler::{BaseOptions, CompiledResult, create_compiler};

fn compile(src: &str) -> CompiledResult {
    create_compiler(BaseOptions::web()).compile(src, None)
}

#[test]
fn once_outside_loop_is_hoisted() {
    let out = compile(r#"<div><span v-once>{{ a }}</span>{{ b }}</div>"#);
    assert_eq!(out.render, "with(this){return _c('div',[_m(0),_v(_s(b))])}");
    assert_eq!(out.static_render_fns, vec!["with(this){return _c('span',[_v(_s(a))])}"]);
}

#[test]
fn once_in_keyed_loop_uses_marker() {
    let out = compile(r#"<ul><li v-for="x in xs" :key="x.id"><span v-once>{{ x.n }}</span></li></ul>"#);
    assert!(out.errors.is_empty(), "{:?}", out.errors);
    assert_eq!(
        out.render,
        "with(this){return _c('ul',_l((xs),function(x){return _c('li',{key:x.id},[_o(_c('span',[_v(_s(x.n))]),0,x.id)])}))}"
    );
}

#[test]
fn once_ids_are_sequential() {
    let out = compile(r#"<ul><li v-for="x in xs" :key="x"><b v-once>{{ x }}</b><i v-once>{{ x }}</i></li></ul>"#);
    assert!(out.render.contains("_o(_c('b',[_v(_s(x))]),0,x)"));
    assert!(out.render.contains("_o(_c('i',[_v(_s(x))]),1,x)"));
}

#[test]
fn once_in_unkeyed_loop_is_an_error() {
    let out = compile(r#"<ul><li v-for="x in xs"><span v-once>{{ x }}</span></li></ul>"#);
    let messages: Vec<_> = out.errors.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, vec!["v-once can only be used inside v-for that is keyed."]);
    assert!(out.render.contains("_c('span',[_v(_s(x))])"));
    assert!(!out.render.contains("_o("));
}

#[test]
fn once_with_v_if() {
    let out = compile(r#"<div><p v-if="a" v-once>{{ x }}</p><p v-else v-once>{{ y }}</p></div>"#);
    assert_eq!(out.render, "with(this){return _c('div',[(a)?_m(0):_m(1)])}");
    assert_eq!(
        out.static_render_fns,
        vec![
            "with(this){return _c('p',[_v(_s(x))])}",
            "with(this){return _c('p',[_v(_s(y))])}",
        ]
    );
}
