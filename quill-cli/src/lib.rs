use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use quill_compiler::template_ast::{ElementNode, Node};
use quill_compiler::{Annotations, BaseOptions, CompiledResult, CompilerOptions, RenderInstance, create_compiler};
use quill_dom::{VNode, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum EmitMode {
    /// `render` and `staticRenderFns` as a JS module
    Render,
    /// An outline of the AST with its static flags
    Ast,
    All,
}

/// Compile a template file and write the requested outputs to `out_dir`.
/// Returns the written paths.
pub fn compile_cmd(
    input: &Path,
    out_dir: Option<&Path>,
    emit: EmitMode,
    options: &CompilerOptions,
) -> Result<Vec<PathBuf>> {
    let src = fs::read_to_string(input).with_context(|| format!("failed to read {}", input.display()))?;
    let name = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("template");

    let compiler = create_compiler(BaseOptions::web());
    let result = compiler.compile(&src, Some(options));
    report(input, &result);

    let out_dir = out_dir
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("target/quill-gen"));
    fs::create_dir_all(&out_dir).with_context(|| format!("failed to create {}", out_dir.display()))?;

    let mut written = Vec::new();
    if matches!(emit, EmitMode::Render | EmitMode::All) {
        let path = out_dir.join(format!("{name}.render.js"));
        fs::write(&path, render_module(&result)).with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }
    if matches!(emit, EmitMode::Ast | EmitMode::All) {
        let path = out_dir.join(format!("{name}.ast.txt"));
        let text = match &result.ast.root {
            Some(root) => outline(root, &result.annotations),
            None => String::from("(empty)\n"),
        };
        fs::write(&path, text).with_context(|| format!("failed to write {}", path.display()))?;
        written.push(path);
    }
    for path in &written {
        println!("Generated: {}", path.display());
    }
    Ok(written)
}

/// Compile a template file, render it against `data` and return the HTML.
pub fn render_cmd(input: &Path, data: &[String], options: &CompilerOptions) -> Result<String> {
    let src = fs::read_to_string(input).with_context(|| format!("failed to read {}", input.display()))?;
    let compiler = create_compiler(BaseOptions::web());
    let functions = compiler
        .compile_to_functions(&src, Some(options))
        .with_context(|| format!("failed to compile {}", input.display()))?;
    for e in &functions.errors {
        eprintln!("error: {}", e.message);
    }

    let data = parse_data(data)?;
    let vnode = RenderInstance::new(functions, data)
        .render()
        .with_context(|| format!("failed to render {}", input.display()))?;
    Ok(to_html(&vnode))
}

fn report(input: &Path, result: &CompiledResult) {
    for e in &result.errors {
        match e.range {
            Some(r) => eprintln!("error: {} ({}:{})", e.message, input.display(), r.start),
            None => eprintln!("error: {}", e.message),
        }
    }
    for t in &result.tips {
        eprintln!("tip: {}", t.message);
    }
    log::info!(
        "{}: {} static fragment(s), {} error(s)",
        input.display(),
        result.static_render_fns.len(),
        result.errors.len()
    );
}

pub fn render_module(result: &CompiledResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "export function render() {{\n  {}\n}}", result.render);
    out.push_str("export const staticRenderFns = [");
    for code in &result.static_render_fns {
        let _ = write!(out, "\n  function () {{ {code} }},");
    }
    if !result.static_render_fns.is_empty() {
        out.push('\n');
    }
    out.push_str("];\n");
    out
}

/// One line per element: tag, directives that shape the tree, and the
/// optimizer's flags.
pub fn outline(root: &ElementNode, ann: &Annotations) -> String {
    let mut out = String::new();
    outline_element(root, ann, 0, &mut out);
    out
}

fn outline_element(el: &ElementNode, ann: &Annotations, depth: usize, out: &mut String) {
    let flags = ann.get(el.id);
    let _ = write!(out, "{}<{}>", "  ".repeat(depth), el.tag);
    if let Some(exp) = &el.if_exp {
        let _ = write!(out, " if={exp}");
    }
    if let Some(f) = &el.for_loop {
        let _ = write!(out, " for={} in {}", f.alias, f.source);
    }
    if el.once {
        out.push_str(" once");
    }
    if flags.static_root {
        out.push_str(" [static root]");
    } else if flags.is_static {
        out.push_str(" [static]");
    }
    if flags.static_in_for {
        out.push_str(" [in for]");
    }
    out.push('\n');

    for child in &el.children {
        match child {
            Node::Element(c) => outline_element(c, ann, depth + 1, out),
            Node::Text(t) => {
                let kind = if t.expression.is_some() { "expr" } else { "text" };
                let _ = writeln!(out, "{}{kind} {:?}", "  ".repeat(depth + 1), t.text);
            }
            Node::Comment(c) => {
                let _ = writeln!(out, "{}comment {:?}", "  ".repeat(depth + 1), c.text);
            }
        }
    }
    for branch in &el.if_branches {
        let label = branch.exp.as_deref().map_or_else(|| "else".to_string(), |e| format!("else-if={e}"));
        let _ = writeln!(out, "{}{label}:", "  ".repeat(depth));
        outline_element(&branch.block, ann, depth + 1, out);
    }
}

/// `key=value` pairs into a data object. Values that look like booleans,
/// `null` or numbers are typed; `a,b,c` becomes a list.
pub fn parse_data(pairs: &[String]) -> Result<Value> {
    let mut entries = Vec::new();
    for pair in pairs {
        let Some((key, raw)) = pair.split_once('=') else {
            bail!("expected key=value, got `{pair}`");
        };
        let key = key.trim();
        if key.is_empty() {
            bail!("empty key in `{pair}`");
        }
        let value = if raw.contains(',') {
            Value::Array(raw.split(',').map(scalar).collect())
        } else {
            scalar(raw)
        };
        entries.push((key.to_string(), value));
    }
    Ok(Value::object(entries))
}

fn scalar(raw: &str) -> Value {
    match raw.trim() {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        s => s.parse::<f64>().map(Value::Number).unwrap_or_else(|_| Value::from(s)),
    }
}

const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source", "track", "wbr",
];

/// Serializes a rendered tree. `textContent` and `innerHTML` DOM props
/// replace the children; listeners and directives have no markup.
pub fn to_html(node: &VNode) -> String {
    let mut out = String::new();
    write_html(node, &mut out);
    out
}

fn write_html(node: &VNode, out: &mut String) {
    match node {
        VNode::Text(t) => out.push_str(&escape(t, false)),
        VNode::Comment(c) => {
            let _ = write!(out, "<!--{c}-->");
        }
        VNode::Element { tag, props, children } => {
            let _ = write!(out, "<{tag}");
            for (k, v) in &props.attrs {
                let _ = write!(out, " {k}=\"{}\"", escape(v, true));
            }
            out.push('>');
            if VOID_TAGS.contains(&tag.as_str()) {
                return;
            }
            if let Some(html) = props.dom_props.get("innerHTML") {
                out.push_str(html);
            } else if let Some(text) = props.dom_props.get("textContent") {
                out.push_str(&escape(text, false));
            } else {
                for c in children {
                    write_html(c, out);
                }
            }
            let _ = write!(out, "</{tag}>");
        }
    }
}

fn escape(s: &str, attr: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attr => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}
