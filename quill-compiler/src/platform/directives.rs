use crate::diagnostics::Diagnostics;
use crate::options::DirectiveData;
use crate::template_ast::DirectiveBinding;

/// `v-text="msg"` → `domProps: { textContent: _s(msg) }`
pub fn text(dir: &DirectiveBinding, data: &mut DirectiveData, _diag: &mut Diagnostics) -> bool {
    if !dir.value.is_empty() {
        data.dom_props
            .push(("textContent".into(), format!("_s({})", dir.value)));
    }
    false
}

/// `v-html="raw"` → `domProps: { innerHTML: _s(raw) }`
pub fn html(dir: &DirectiveBinding, data: &mut DirectiveData, _diag: &mut Diagnostics) -> bool {
    if !dir.value.is_empty() {
        data.dom_props
            .push(("innerHTML".into(), format!("_s({})", dir.value)));
    }
    false
}

/// `v-cloak` only matters before compilation; it never reaches the runtime.
pub fn cloak(_dir: &DirectiveBinding, _data: &mut DirectiveData, _diag: &mut Diagnostics) -> bool {
    false
}
