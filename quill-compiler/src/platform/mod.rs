//! Web platform defaults: tag predicates, the class/style modules and the
//! compile-time `v-text` / `v-html` / `v-cloak` directives.

pub mod directives;
pub mod modules;
pub mod tags;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::options::{BaseOptions, DirectiveRef, ModuleRef, Platform};

pub fn web_platform() -> Platform {
    Platform {
        is_reserved_tag: tags::is_reserved_tag,
        is_unary_tag: tags::is_unary_tag,
        can_be_left_open_tag: tags::can_be_left_open_tag,
        is_non_phrasing_tag: tags::is_non_phrasing_tag,
        is_pre_tag: tags::is_pre_tag,
        must_use_prop: tags::must_use_prop,
        get_tag_namespace: tags::get_tag_namespace,
    }
}

pub fn web_modules() -> Vec<ModuleRef> {
    let class: ModuleRef = Arc::new(modules::ClassModule);
    let style: ModuleRef = Arc::new(modules::StyleModule);
    vec![class, style]
}

pub fn web_directives() -> BTreeMap<String, DirectiveRef> {
    let mut map: BTreeMap<String, DirectiveRef> = BTreeMap::new();
    map.insert("cloak".into(), Arc::new(directives::cloak));
    map.insert("text".into(), Arc::new(directives::text));
    map.insert("html".into(), Arc::new(directives::html));
    map
}

impl BaseOptions {
    /// Base options for HTML templates.
    pub fn web() -> Self {
        Self {
            platform: web_platform(),
            modules: web_modules(),
            directives: web_directives(),
            ..Self::default()
        }
    }
}
