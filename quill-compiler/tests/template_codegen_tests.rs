use quill_compiler::{BaseOptions, CompiledResult, CompilerOptions, create_compiler};

fn compile(src: &str) -> CompiledResult {
    create_compiler(BaseOptions::web()).compile(src, None)
}

fn compile_unoptimized(src: &str) -> CompiledResult {
    let options = CompilerOptions::new().optimize(false);
    create_compiler(BaseOptions::web()).compile(src, Some(&options))
}

fn render_of(src: &str) -> String {
    let out = compile(src);
    assert!(out.errors.is_empty(), "unexpected errors: {:?}", out.errors);
    out.render
}

#[test]
fn codegen_attrs_and_interpolation() {
    assert_eq!(
        render_of(r#"<div id="app" :title="t">{{ msg }}</div>"#),
        r#"with(this){return _c('div',{attrs:{"id":"app","title":t}},[_v(_s(msg))])}"#
    );
}

#[test]
fn codegen_empty_template() {
    assert_eq!(render_of(""), r#"with(this){return _c("div")}"#);
    assert_eq!(render_of("  \n "), r#"with(this){return _c("div")}"#);
}

#[test]
fn codegen_hoists_static_root() {
    let out = compile("<div>static</div>");
    assert_eq!(out.render, "with(this){return _m(0)}");
    assert_eq!(out.static_render_fns, vec![r#"with(this){return _c('div',[_v("static")])}"#]);
}

#[test]
fn codegen_hoists_nested_static_subtree() {
    let out = compile("<div><p><b>x</b></p>{{ a }}</div>");
    assert_eq!(out.render, "with(this){return _c('div',[_m(0),_v(_s(a))])}");
    assert_eq!(out.static_render_fns, vec![r#"with(this){return _c('p',[_c('b',[_v("x")])])}"#]);
}

#[test]
fn codegen_without_optimizer_inlines_everything() {
    let out = compile_unoptimized("<div>static</div>");
    assert_eq!(out.render, r#"with(this){return _c('div',[_v("static")])}"#);
    assert!(out.static_render_fns.is_empty());
}

#[test]
fn codegen_class_and_style() {
    assert_eq!(
        render_of(r#"<div class="a  b" :class="{on: x}" style="color: red" :style="s"></div>"#),
        r#"with(this){return _c('div',{staticClass:"a b",class:{on: x},staticStyle:{"color":"red"},style:(s)})}"#
    );
}

#[test]
fn codegen_data_object_order() {
    assert_eq!(
        render_of(r#"<div v-show="v" :key="k" ref="r" :id="i" @click="go"></div>"#),
        r#"with(this){return _c('div',{directives:[{name:"show",rawName:"v-show",value:(v),expression:"v"}],key:k,ref:"r",attrs:{"id":i},on:{"click":go}})}"#
    );
}

#[test]
fn codegen_compile_time_directives() {
    assert_eq!(
        render_of(r#"<span v-text="msg"></span>"#),
        r#"with(this){return _c('span',{domProps:{"textContent":_s(msg)}})}"#
    );
    assert_eq!(
        render_of(r#"<div v-html="raw" v-cloak></div>"#),
        r#"with(this){return _c('div',{domProps:{"innerHTML":_s(raw)}})}"#
    );
}

#[test]
fn codegen_custom_directive_handler_can_add_props() {
    use quill_compiler::diagnostics::Diagnostics;
    use quill_compiler::options::DirectiveData;
    use quill_compiler::template_ast::DirectiveBinding;

    let focus = |dir: &DirectiveBinding, data: &mut DirectiveData, _: &mut Diagnostics| {
        data.dom_props.push(("autofocus".into(), dir.value.clone()));
        true
    };
    let options = CompilerOptions::new().directive("focus", focus);
    let out = create_compiler(BaseOptions::web()).compile(r#"<input v-focus="on">"#, Some(&options));
    assert_eq!(
        out.render,
        r#"with(this){return _c('input',{directives:[{name:"focus",rawName:"v-focus",value:(on),expression:"on"}],domProps:{"autofocus":on}})}"#
    );
}

#[test]
fn codegen_dom_props_for_form_values() {
    assert_eq!(
        render_of(r#"<input :value="v" :checked="c" :placeholder="p">"#),
        r#"with(this){return _c('input',{attrs:{"placeholder":p},domProps:{"value":v,"checked":c}})}"#
    );
}

#[test]
fn codegen_event_handlers() {
    assert_eq!(
        render_of(r#"<button @click="count++" @keyup.enter="submit">+</button>"#),
        r#"with(this){return _c('button',{on:{"click":function($event){count++},"keyup":function($event){if(!$event.type.indexOf('key')&&_k($event.keyCode,"enter",13,$event.key,"Enter"))return null;return submit.apply(null, arguments)}}},[_v("+")])}"#
    );
}

#[test]
fn codegen_native_listeners() {
    assert_eq!(
        render_of(r#"<my-button @click.native="go"></my-button>"#),
        r#"with(this){return _c('my-button',{nativeOn:{"click":go}})}"#
    );
}

#[test]
fn codegen_dynamic_argument_names() {
    assert_eq!(
        render_of(r#"<div :[attr]="v" @[ev]="h"></div>"#),
        r#"with(this){return _c('div',{attrs:{[attr]:v},on:{[ev]:h}})}"#
    );
}

#[test]
fn codegen_bind_object() {
    assert_eq!(
        render_of(r#"<div v-bind="attrs" id="a"></div>"#),
        r#"with(this){return _c('div',_b({attrs:{"id":"a"}},'div',(attrs),false))}"#
    );
}

#[test]
fn codegen_slot_outlets() {
    assert_eq!(
        render_of("<div><slot>fallback</slot></div>"),
        r#"with(this){return _c('div',[_t("default",function(){return [_v("fallback")]})])}"#
    );
    assert_eq!(
        render_of(r#"<div><slot name="x" :item-id="b"></slot></div>"#),
        r#"with(this){return _c('div',[_t("x",null,{"itemId":b})])}"#
    );
}

#[test]
fn codegen_slot_target() {
    assert_eq!(
        render_of(r#"<my-card><p slot="footer">{{ f }}</p></my-card>"#),
        r#"with(this){return _c('my-card',[_c('p',{slot:"footer"},[_v(_s(f))])])}"#
    );
}

#[test]
fn codegen_dynamic_component() {
    assert_eq!(
        render_of(r#"<component :is="view" :p="x"></component>"#),
        r#"with(this){return _c(view,{tag:"component",attrs:{"p":x}})}"#
    );
}

#[test]
fn codegen_template_children() {
    assert_eq!(
        render_of(r#"<div><template v-if="ok"><b>{{ a }}</b><i>{{ b }}</i></template></div>"#),
        r#"with(this){return _c('div',[(ok)?[_c('b',[_v(_s(a))]),_c('i',[_v(_s(b))])]:_e()])}"#
    );
}

#[test]
fn codegen_v_pre_block() {
    let out = compile(r#"<div v-pre><span :a="b">{{ c }}</span></div>"#);
    assert_eq!(out.render, "with(this){return _m(0)}");
    assert_eq!(
        out.static_render_fns,
        vec![r#"with(this){return _c('div',{pre:true},[_c('span',{pre:true,attrs:{":a":"b"}},[_v("{{ c }}")])])}"#]
    );
}

#[test]
fn codegen_comments() {
    let options = CompilerOptions::new().comments(true).optimize(false);
    let out = create_compiler(BaseOptions::web()).compile("<div><!-- c --></div>", Some(&options));
    assert_eq!(out.render, r#"with(this){return _c('div',[_e(" c ")])}"#);
}

#[test]
fn codegen_escapes_text() {
    assert_eq!(
        render_of("<p v-if=\"x\">say \"hi\"\u{2028}</p>"),
        "with(this){return (x)?_c('p',[_v(\"say \\\"hi\\\"\\u2028\")]):_e()}"
    );
}
