use crate::compiler::{lexer::LexerError, semantics::SemanticError};

/// Errors raised while rewriting a line of dialect source.
#[derive(Clone, Debug, PartialEq)]
pub enum TransformError {
    Semantic(SemanticError),
    MissingWidth(String),
    MissingType(String),
    InvalidEdge(String),
    UnknownMacro(String),
    MacroArity(String, usize, usize),
    Malformed(String),
    Unterminated(String),
    Lexer(LexerError),
}

impl std::fmt::Display for TransformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use TransformError::*;
        match self {
            Semantic(e) => f.write_fmt(format_args!("{}", e)),
            MissingWidth(text) => f.write_fmt(format_args!(
                "Expected a non-zero width after # in: {}",
                text
            )),
            MissingType(text) => f.write_fmt(format_args!("Expected a type after # in: {}", text)),
            InvalidEdge(text) => f.write_fmt(format_args!(
                "Invalid edge in {}, expected posedge or negedge",
                text
            )),
            UnknownMacro(name) => f.write_fmt(format_args!("Unknown macro %!{}", name)),
            MacroArity(name, expected, found) => f.write_fmt(format_args!(
                "%!{} expected {} arguments but got {}",
                name, expected, found
            )),
            Malformed(reason) => f.write_fmt(format_args!("Malformed input: {}", reason)),
            Unterminated(what) => f.write_fmt(format_args!("Unterminated {} at end of input", what)),
            Lexer(e) => f.write_fmt(format_args!("{}", e)),
        }
    }
}

impl std::error::Error for TransformError {}

impl From<SemanticError> for TransformError {
    fn from(e: SemanticError) -> Self {
        TransformError::Semantic(e)
    }
}

impl From<LexerError> for TransformError {
    fn from(e: LexerError) -> Self {
        TransformError::Lexer(e)
    }
}
