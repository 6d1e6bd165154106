//! Compiler options: an immutable platform base shared by every compilation,
//! and a per-call overlay that shadows it without mutating it.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use crate::diagnostics::Diagnostics;
use crate::template_ast::{DirectiveBinding, ElementNode};

/// A compile-time extension that may claim attributes from elements and
/// contribute fields to the generated data object.
pub trait Module: Send + Sync {
    fn name(&self) -> &str;

    /// `ElementNode::ext` keys that do not make an element dynamic.
    fn static_keys(&self) -> &[&'static str] {
        &[]
    }

    /// Runs once per element before generic attribute processing.
    /// `delimiters` are the ones the template is parsed with.
    fn transform_node(&self, _el: &mut ElementNode, _delimiters: &Delimiters, _diag: &mut Diagnostics) {}

    /// Data-object fields for `el`, each terminated by a comma.
    fn gen_data(&self, _el: &ElementNode) -> String {
        String::new()
    }
}

/// Extra data a directive handler may attach to its element.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DirectiveData {
    /// DOM prop name to generated expression.
    pub dom_props: Vec<(String, String)>,
}

/// Compile-time handling of a directive. Returns whether the directive must
/// still be applied at runtime.
pub trait DirectiveHandler: Send + Sync {
    fn apply(&self, dir: &DirectiveBinding, data: &mut DirectiveData, diag: &mut Diagnostics) -> bool;
}

impl<F> DirectiveHandler for F
where
    F: Fn(&DirectiveBinding, &mut DirectiveData, &mut Diagnostics) -> bool + Send + Sync,
{
    fn apply(&self, dir: &DirectiveBinding, data: &mut DirectiveData, diag: &mut Diagnostics) -> bool {
        self(dir, data, diag)
    }
}

/// Platform predicates injected into the parser and optimizer.
#[derive(Clone, Copy)]
pub struct Platform {
    pub is_reserved_tag: fn(&str) -> bool,
    pub is_unary_tag: fn(&str) -> bool,
    pub can_be_left_open_tag: fn(&str) -> bool,
    pub is_non_phrasing_tag: fn(&str) -> bool,
    pub is_pre_tag: fn(&str) -> bool,
    /// `(tag, type attribute, attribute name)`
    pub must_use_prop: fn(&str, Option<&str>, &str) -> bool,
    pub get_tag_namespace: fn(&str) -> Option<&'static str>,
}

impl fmt::Debug for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Platform").finish_non_exhaustive()
    }
}

fn never(_: &str) -> bool {
    false
}
fn always(_: &str) -> bool {
    true
}
fn never_prop(_: &str, _: Option<&str>, _: &str) -> bool {
    false
}
fn no_namespace(_: &str) -> Option<&'static str> {
    None
}

impl Default for Platform {
    /// Platform-neutral: every tag is reserved, nothing is void.
    fn default() -> Self {
        Self {
            is_reserved_tag: always,
            is_unary_tag: never,
            can_be_left_open_tag: never,
            is_non_phrasing_tag: never,
            is_pre_tag: never,
            must_use_prop: never_prop,
            get_tag_namespace: no_namespace,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Whitespace {
    #[default]
    Preserve,
    Condense,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Delimiters {
    pub open: String,
    pub close: String,
}

impl Delimiters {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self::new("{{", "}}")
    }
}

pub type ModuleRef = Arc<dyn Module>;
pub type DirectiveRef = Arc<dyn DirectiveHandler>;

/// Shared base configuration. Never mutated once a compiler owns it.
#[derive(Clone)]
pub struct BaseOptions {
    pub platform: Platform,
    pub modules: Vec<ModuleRef>,
    pub directives: BTreeMap<String, DirectiveRef>,
    pub whitespace: Whitespace,
    pub comments: bool,
    pub delimiters: Delimiters,
    pub optimize: bool,
    pub output_source_range: bool,
}

impl Default for BaseOptions {
    fn default() -> Self {
        Self {
            platform: Platform::default(),
            modules: Vec::new(),
            directives: BTreeMap::new(),
            whitespace: Whitespace::default(),
            comments: false,
            delimiters: Delimiters::default(),
            optimize: true,
            output_source_range: false,
        }
    }
}

impl fmt::Debug for BaseOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BaseOptions")
            .field("modules", &self.modules.iter().map(|m| m.name()).collect::<Vec<_>>())
            .field("directives", &self.directives.keys().collect::<Vec<_>>())
            .field("whitespace", &self.whitespace)
            .field("comments", &self.comments)
            .field("delimiters", &self.delimiters)
            .field("optimize", &self.optimize)
            .field("output_source_range", &self.output_source_range)
            .finish()
    }
}

/// Per-call options. Unset fields fall through to the base.
#[derive(Clone, Default)]
pub struct CompilerOptions {
    /// Appended after the base modules.
    pub modules: Vec<ModuleRef>,
    /// Shadow base handlers of the same name.
    pub directives: BTreeMap<String, DirectiveRef>,
    pub whitespace: Option<Whitespace>,
    pub comments: Option<bool>,
    pub delimiters: Option<Delimiters>,
    pub optimize: Option<bool>,
    pub output_source_range: Option<bool>,
}

impl CompilerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn module(mut self, module: impl Module + 'static) -> Self {
        self.modules.push(Arc::new(module));
        self
    }

    pub fn directive(mut self, name: impl Into<String>, handler: impl DirectiveHandler + 'static) -> Self {
        self.directives.insert(name.into(), Arc::new(handler));
        self
    }

    pub fn whitespace(mut self, ws: Whitespace) -> Self {
        self.whitespace = Some(ws);
        self
    }

    pub fn comments(mut self, on: bool) -> Self {
        self.comments = Some(on);
        self
    }

    pub fn delimiters(mut self, d: Delimiters) -> Self {
        self.delimiters = Some(d);
        self
    }

    pub fn optimize(mut self, on: bool) -> Self {
        self.optimize = Some(on);
        self
    }

    pub fn output_source_range(mut self, on: bool) -> Self {
        self.output_source_range = Some(on);
        self
    }
}

/// Read-only view of `base` shadowed by `overlay`, built once per call.
pub struct ResolvedOptions<'a> {
    base: &'a BaseOptions,
    overlay: Option<&'a CompilerOptions>,
    modules: Vec<ModuleRef>,
}

impl<'a> ResolvedOptions<'a> {
    pub fn new(base: &'a BaseOptions, overlay: Option<&'a CompilerOptions>) -> Self {
        let mut modules = base.modules.clone();
        if let Some(o) = overlay {
            modules.extend(o.modules.iter().cloned());
        }
        Self {
            base,
            overlay,
            modules,
        }
    }

    pub fn platform(&self) -> &Platform {
        &self.base.platform
    }

    pub fn modules(&self) -> &[ModuleRef] {
        &self.modules
    }

    pub fn directive(&self, name: &str) -> Option<&dyn DirectiveHandler> {
        self.overlay
            .and_then(|o| o.directives.get(name))
            .or_else(|| self.base.directives.get(name))
            .map(|d| d.as_ref())
    }

    pub fn directive_names(&self) -> BTreeSet<&str> {
        let mut names: BTreeSet<&str> = self.base.directives.keys().map(String::as_str).collect();
        if let Some(o) = self.overlay {
            names.extend(o.directives.keys().map(String::as_str));
        }
        names
    }

    pub fn static_keys(&self) -> BTreeSet<&str> {
        self.modules
            .iter()
            .flat_map(|m| m.static_keys().iter().copied())
            .collect()
    }

    pub fn whitespace(&self) -> Whitespace {
        self.overlay
            .and_then(|o| o.whitespace)
            .unwrap_or(self.base.whitespace)
    }

    pub fn comments(&self) -> bool {
        self.overlay.and_then(|o| o.comments).unwrap_or(self.base.comments)
    }

    pub fn delimiters(&self) -> &Delimiters {
        self.overlay
            .and_then(|o| o.delimiters.as_ref())
            .unwrap_or(&self.base.delimiters)
    }

    pub fn optimize(&self) -> bool {
        self.overlay.and_then(|o| o.optimize).unwrap_or(self.base.optimize)
    }

    pub fn output_source_range(&self) -> bool {
        self.overlay
            .and_then(|o| o.output_source_range)
            .unwrap_or(self.base.output_source_range)
    }
}
