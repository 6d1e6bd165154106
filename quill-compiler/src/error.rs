/// Fatal failure turning generated source into a [`crate::runtime::RenderFn`].
/// Distinct from template diagnostics: it means the compiler produced (or was
/// handed) source the runtime cannot execute.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CreateFunctionError {
    #[error("failed to compile render function: {message}\n\n{code}")]
    Syntax { message: String, code: String },

    #[error("failed to compile static render function {index}: {message}\n\n{code}")]
    StaticSyntax {
        index: usize,
        message: String,
        code: String,
    },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    #[error("`{name}` is not a function.")]
    NotCallable { name: String },

    #[error("method `{method}` is not supported on `{value_type}` data.")]
    UnknownMethod {
        method: String,
        value_type: &'static str,
    },

    #[error("cannot read property `{property}` of {target}.")]
    NullAccess {
        property: String,
        target: &'static str,
    },

    #[error("`{helper}` expects {expected}.")]
    IllegalArguments {
        helper: &'static str,
        expected: &'static str,
    },

    #[error("static fragment `{index}` not found.")]
    FragmentNotFound { index: usize },

    #[error("render produced `{found}` instead of a single node.")]
    NotANode { found: &'static str },
}
