use crate::diagnostics::Diagnostics;
use crate::options::{Delimiters, Module};
use crate::template_ast::ElementNode;
use crate::template_codegen::string_lit;
use crate::template_parse::text::has_interpolation;

fn interpolation_warning(name: &str, value: &str) -> String {
    format!(
        "{name}=\"{value}\": Interpolation inside attributes has been removed. \
         Use v-bind or the colon shorthand instead. For example, instead of \
         <div {name}=\"{{{{ val }}}}\">, use <div :{name}=\"val\">."
    )
}

/// `class` / `:class` → `staticClass` / `class` data fields.
pub struct ClassModule;

impl Module for ClassModule {
    fn name(&self) -> &str {
        "class"
    }

    fn static_keys(&self) -> &[&'static str] {
        &["staticClass"]
    }

    fn transform_node(&self, el: &mut ElementNode, delimiters: &Delimiters, diag: &mut Diagnostics) {
        if let Some(attr) = el.take_attr("class") {
            let value = attr.value.unwrap_or_default();
            if has_interpolation(&value, delimiters) {
                diag.error(interpolation_warning("class", &value), Some(attr.range));
            }
            let normalized = value.split_whitespace().collect::<Vec<_>>().join(" ");
            el.ext.insert("staticClass".into(), string_lit(&normalized));
        }
        if let Some(binding) = el.take_binding("class") {
            el.ext.insert("class".into(), binding.value.unwrap_or_default());
        }
    }

    fn gen_data(&self, el: &ElementNode) -> String {
        let mut data = String::new();
        if let Some(s) = el.ext.get("staticClass") {
            data.push_str(&format!("staticClass:{s},"));
        }
        if let Some(c) = el.ext.get("class") {
            data.push_str(&format!("class:{c},"));
        }
        data
    }
}

/// `style` / `:style` → `staticStyle` / `style` data fields.
pub struct StyleModule;

impl Module for StyleModule {
    fn name(&self) -> &str {
        "style"
    }

    fn static_keys(&self) -> &[&'static str] {
        &["staticStyle"]
    }

    fn transform_node(&self, el: &mut ElementNode, delimiters: &Delimiters, diag: &mut Diagnostics) {
        if let Some(attr) = el.take_attr("style") {
            let value = attr.value.unwrap_or_default();
            if has_interpolation(&value, delimiters) {
                diag.error(interpolation_warning("style", &value), Some(attr.range));
            }
            let entries: Vec<String> = parse_style_text(&value)
                .into_iter()
                .map(|(k, v)| format!("{}:{}", string_lit(&k), string_lit(&v)))
                .collect();
            el.ext.insert("staticStyle".into(), format!("{{{}}}", entries.join(",")));
        }
        if let Some(binding) = el.take_binding("style") {
            el.ext.insert("style".into(), format!("({})", binding.value.unwrap_or_default()));
        }
    }

    fn gen_data(&self, el: &ElementNode) -> String {
        let mut data = String::new();
        if let Some(s) = el.ext.get("staticStyle") {
            data.push_str(&format!("staticStyle:{s},"));
        }
        if let Some(s) = el.ext.get("style") {
            data.push_str(&format!("style:{s},"));
        }
        data
    }
}

/// Splits `color: red; background: url(a;b)` into declarations. Semicolons
/// inside parentheses do not end a declaration.
pub fn parse_style_text(css: &str) -> Vec<(String, String)> {
    let mut out = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    let bytes = css.as_bytes();
    let mut push = |decl: &str| {
        if let Some((k, v)) = decl.split_once(':') {
            let (k, v) = (k.trim(), v.trim());
            if !k.is_empty() {
                out.push((k.to_string(), v.to_string()));
            }
        }
    };
    for (i, b) in bytes.iter().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => depth -= 1,
            b';' if depth <= 0 => {
                push(&css[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    push(&css[start..]);
    out
}
