use std::fs;
use std::path::{Path, PathBuf};

use quill_compiler::CompilerOptions;

fn scratch(name: &str) -> PathBuf {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../target/quill-cli-tests")
        .join(format!("{}-{name}", std::process::id()));
    fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

fn write_template(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("App.html");
    fs::write(&path, body).expect("write template");
    path
}

#[test]
fn cli_compile_emits_render_module() {
    let dir = scratch("render");
    let input = write_template(&dir, "<div><p>static</p>{{ msg }}</div>\n");
    let out_dir = dir.join("out");

    let written = quill_cli::compile_cmd(&input, Some(&out_dir), quill_cli::EmitMode::Render, &CompilerOptions::new())
        .expect("compile");
    assert_eq!(written, vec![out_dir.join("App.render.js")]);

    let content = fs::read_to_string(&written[0]).expect("read render output");
    assert!(content.contains("with(this){return _c('div',[_m(0),_v(_s(msg))])}"));
    assert!(content.contains(r#"function () { with(this){return _c('p',[_v("static")])} },"#));
}

#[test]
fn cli_compile_emits_ast_outline() {
    let dir = scratch("ast");
    let input = write_template(&dir, r#"<ul><li v-for="x in xs"><b>s</b>{{ x }}</li></ul>"#);
    let out_dir = dir.join("out");

    let written = quill_cli::compile_cmd(&input, Some(&out_dir), quill_cli::EmitMode::All, &CompilerOptions::new())
        .expect("compile");
    assert_eq!(written.len(), 2);

    let outline = fs::read_to_string(out_dir.join("App.ast.txt")).expect("read outline");
    assert!(outline.starts_with("<ul>\n  <li> for=x in xs\n"));
    assert!(outline.contains("    <b> [static root] [in for]\n"));
    assert!(outline.contains("    expr \"{{ x }}\"\n"));
}

#[test]
fn cli_render_prints_html() {
    let dir = scratch("html");
    let input = write_template(&dir, r#"<p :title="t"><span v-for="n in count">{{ n }}</span><i v-if="ok">!</i></p>"#);
    let data = vec!["t=hi".to_string(), "count=3".to_string(), "ok=false".to_string()];

    let html = quill_cli::render_cmd(&input, &data, &CompilerOptions::new()).expect("render");
    assert_eq!(html, r#"<p title="hi"><span>1</span><span>2</span><span>3</span><!----></p>"#);
}

#[test]
fn cli_missing_input_is_an_error() {
    let dir = scratch("missing");
    let err = quill_cli::compile_cmd(
        &dir.join("nope.html"),
        None,
        quill_cli::EmitMode::Render,
        &CompilerOptions::new(),
    )
    .unwrap_err();
    assert!(err.to_string().starts_with("failed to read"));
}
