use super::eval::EvalError;

/// Errors raised while resolving constants and expanding loops.
#[derive(Clone, Debug, PartialEq)]
pub enum PreprocessorError {
    UnmatchedLoopMarker,
    UndefinedConstant(String),
    InvalidPlaceholder(String),
    NotASequence(String),
    InvalidExpression(EvalError),
}

impl std::fmt::Display for PreprocessorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PreprocessorError::UnmatchedLoopMarker => {
                f.write_str("Loop marker has no matching closing marker")
            }
            PreprocessorError::UndefinedConstant(name) => {
                f.write_fmt(format_args!("Constant {} is not defined", name))
            }
            PreprocessorError::InvalidPlaceholder(text) => f.write_fmt(format_args!(
                "Loop placeholder must be an identifier, found: {}",
                text
            )),
            PreprocessorError::NotASequence(value) => f.write_fmt(format_args!(
                "Loop expression must produce a sequence, found: {}",
                value
            )),
            PreprocessorError::InvalidExpression(e) => {
                f.write_fmt(format_args!("Invalid expression: {}", e))
            }
        }
    }
}

impl std::error::Error for PreprocessorError {}

impl From<EvalError> for PreprocessorError {
    fn from(e: EvalError) -> Self {
        PreprocessorError::InvalidExpression(e)
    }
}
