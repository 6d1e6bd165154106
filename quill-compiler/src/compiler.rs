//! The driver: resolves options, runs parse → optimize → generate → detect,
//! and optionally turns the generated source into callable functions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::detect::detect_errors;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::CreateFunctionError;
use crate::optimizer::{Annotations, optimize};
use crate::options::{BaseOptions, CompilerOptions, Delimiters, ResolvedOptions, Whitespace};
use crate::runtime::CompiledFunctions;
use crate::template_ast::Ast;
use crate::template_codegen::generate;
use crate::template_parse::parse_template_to_ast;

/// Everything one `compile` call produced. Owned by the caller.
#[derive(Debug, Clone)]
pub struct CompiledResult {
    pub ast: Ast,
    pub annotations: Annotations,
    pub render: String,
    pub static_render_fns: Vec<String>,
    pub errors: Vec<Diagnostic>,
    pub tips: Vec<Diagnostic>,
}

/// Upper bound on cached templates; the cache is dropped wholesale when hit.
const CACHE_LIMIT: usize = 256;

/// Every resolved option that changes the generated code, plus the template.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    delimiters: Delimiters,
    whitespace: Whitespace,
    comments: bool,
    optimize: bool,
    output_source_range: bool,
    template: String,
}

impl CacheKey {
    fn new(resolved: &ResolvedOptions<'_>, template: &str) -> Self {
        Self {
            delimiters: resolved.delimiters().clone(),
            whitespace: resolved.whitespace(),
            comments: resolved.comments(),
            optimize: resolved.optimize(),
            output_source_range: resolved.output_source_range(),
            template: template.to_string(),
        }
    }
}

/// A compiler bound to one set of base options. Safe to share between
/// threads; every call works on its own state.
#[derive(Debug)]
pub struct Compiler {
    base: Arc<BaseOptions>,
    cache: Mutex<HashMap<CacheKey, Arc<CompiledFunctions>>>,
}

pub fn create_compiler(base: BaseOptions) -> Compiler {
    Compiler::new(Arc::new(base))
}

impl Compiler {
    pub fn new(base: Arc<BaseOptions>) -> Self {
        Self {
            base,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn base(&self) -> &BaseOptions {
        &self.base
    }

    pub fn compile(&self, template: &str, options: Option<&CompilerOptions>) -> CompiledResult {
        let resolved = ResolvedOptions::new(&self.base, options);
        let leading = template.len() - template.trim_start().len();
        let trimmed = template.trim();
        let mut diag = Diagnostics::new();

        let ast = parse_template_to_ast(trimmed, &resolved, &mut diag);
        let annotations = if resolved.optimize() {
            optimize(&ast, &resolved)
        } else {
            Annotations::default()
        };
        let code = generate(&ast, &annotations, &resolved, &mut diag);
        detect_errors(&ast, &mut diag);

        let (errors, tips) = diag.finish(resolved.output_source_range().then_some(leading));
        log::debug!(
            "compiled template: {} errors, {} tips, {} static fragments",
            errors.len(),
            tips.len(),
            code.static_render_fns.len()
        );
        CompiledResult {
            ast,
            annotations,
            render: code.render,
            static_render_fns: code.static_render_fns,
            errors,
            tips,
        }
    }

    /// Compiles and parses the generated source. Results are cached per
    /// resolved options and template text, unless the call brings its own
    /// modules or directives; diagnostics are logged, not returned as errors.
    pub fn compile_to_functions(
        &self,
        template: &str,
        options: Option<&CompilerOptions>,
    ) -> Result<Arc<CompiledFunctions>, CreateFunctionError> {
        let key = options
            .is_none_or(|o| o.modules.is_empty() && o.directives.is_empty())
            .then(|| CacheKey::new(&ResolvedOptions::new(&self.base, options), template));
        if let Some(key) = &key {
            if let Some(hit) = self.lock_cache().get(key) {
                log::trace!("render functions served from cache");
                return Ok(Arc::clone(hit));
            }
        }

        let compiled = self.compile(template, options);
        for e in &compiled.errors {
            log::warn!("error compiling template:\n\n{template}\n\n- {}", e.message);
        }
        for t in &compiled.tips {
            log::debug!("template tip: {}", t.message);
        }
        let functions = Arc::new(CompiledFunctions::from_code(
            &compiled.render,
            &compiled.static_render_fns,
            compiled.errors,
            compiled.tips,
        )?);
        if let Some(key) = key {
            let mut cache = self.lock_cache();
            if cache.len() >= CACHE_LIMIT {
                log::debug!("render function cache full ({CACHE_LIMIT}), clearing");
                cache.clear();
            }
            cache.insert(key, Arc::clone(&functions));
        }
        Ok(functions)
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<CacheKey, Arc<CompiledFunctions>>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
