use thiserror::Error;

/// Script-level conditions. None of these abort execution: they are pushed
/// into the runtime's diagnostic sink and evaluation carries on with an
/// `undefined` result wherever a value was expected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error("undefined variable `{0}`")]
    UndefinedVariable(String),

    #[error("undefined function `{0}`")]
    UndefinedFunction(String),

    /// Carries the offending expression text (or a short description of the
    /// runtime fault) so the host can show it next to the editor.
    #[error("could not evaluate `{0}`")]
    ExpressionFailed(String),

    #[error("cannot index into a {0} value")]
    NotIndexable(&'static str),

    #[error("list index must be a non-negative number, got `{0}`")]
    BadIndex(String),

    #[error("call depth exceeded {0} — is `{1}` recursing without a base case?")]
    CallDepthExceeded(usize, String),

    #[error("no `run()` function defined — nothing to animate")]
    MissingEntryPoint,
}
