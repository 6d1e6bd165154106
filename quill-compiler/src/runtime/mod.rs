//! Turns generated render source into something callable, and calls it.

mod eval;
pub mod program;

use std::collections::BTreeMap;
use std::sync::Arc;

use quill_dom::{VNode, Value};

use crate::diagnostics::Diagnostic;
use crate::error::{CreateFunctionError, RuntimeError};
use program::Expr;

/// A parsed render program. Immutable, so it can be shared across threads.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFn {
    source: String,
    program: Expr,
}

impl RenderFn {
    pub fn compile(source: &str) -> Result<Self, CreateFunctionError> {
        let program = program::parse_program(source).map_err(|message| CreateFunctionError::Syntax {
            message,
            code: source.to_string(),
        })?;
        Ok(Self {
            source: source.to_string(),
            program,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Render and static render functions of one template, with the
/// diagnostics produced while compiling it.
#[derive(Debug, Clone)]
pub struct CompiledFunctions {
    pub render: RenderFn,
    pub static_render_fns: Vec<RenderFn>,
    pub errors: Vec<Diagnostic>,
    pub tips: Vec<Diagnostic>,
}

impl CompiledFunctions {
    pub fn from_code(
        render: &str,
        static_render_fns: &[String],
        errors: Vec<Diagnostic>,
        tips: Vec<Diagnostic>,
    ) -> Result<Self, CreateFunctionError> {
        let render = RenderFn::compile(render)?;
        let static_render_fns = static_render_fns
            .iter()
            .enumerate()
            .map(|(index, code)| {
                RenderFn::compile(code).map_err(|e| match e {
                    CreateFunctionError::Syntax { message, code } => {
                        CreateFunctionError::StaticSyntax { index, message, code }
                    }
                    other => other,
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(Self {
            render,
            static_render_fns,
            errors,
            tips,
        })
    }
}

/// Compiled functions bound to component data. Static fragments rendered
/// outside of loops are cached for the lifetime of the instance.
#[derive(Debug)]
pub struct RenderInstance {
    functions: Arc<CompiledFunctions>,
    data: Value,
    slots: BTreeMap<String, Vec<VNode>>,
    static_cache: Vec<Option<eval::Fragment>>,
}

impl RenderInstance {
    pub fn new(functions: Arc<CompiledFunctions>, data: Value) -> Self {
        Self {
            functions,
            data,
            slots: BTreeMap::new(),
            static_cache: Vec::new(),
        }
    }

    /// Content distributed into the `<slot name="...">` outlet.
    pub fn with_slot(mut self, name: impl Into<String>, nodes: Vec<VNode>) -> Self {
        self.slots.insert(name.into(), nodes);
        self
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    pub fn set_data(&mut self, data: Value) {
        self.data = data;
    }

    pub fn render(&mut self) -> Result<VNode, RuntimeError> {
        let functions = Arc::clone(&self.functions);
        let mut evaluator = eval::Evaluator {
            data: &self.data,
            statics: &functions.static_render_fns,
            static_cache: &mut self.static_cache,
            slots: &self.slots,
        };
        evaluator.render(&functions.render.program)
    }
}
