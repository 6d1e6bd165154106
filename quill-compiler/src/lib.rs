pub mod compiler;
pub mod detect;
pub mod diagnostics;
pub mod error;
pub mod optimizer;
pub mod options;
pub mod platform;
pub mod runtime;
pub mod template_ast;
pub mod template_codegen;
pub mod template_parse;

pub use compiler::{CompiledResult, Compiler, create_compiler};
pub use diagnostics::Diagnostic;
pub use error::{CreateFunctionError, RuntimeError};
pub use optimizer::{Annotations, NodeFlags, optimize};
pub use options::{BaseOptions, CompilerOptions, Delimiters, Module, ResolvedOptions, Whitespace};
pub use runtime::{CompiledFunctions, RenderFn, RenderInstance};
pub use template_codegen::{CodegenResult, generate};
pub use template_parse::parse_template_to_ast;
