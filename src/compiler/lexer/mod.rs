mod error;
mod tests;

pub mod lexer;
pub mod tokens;

pub use error::LexerError;
pub use lexer::Lexer;
pub use tokens::{Lex, Span, Token};

pub type LexerResult<T> = std::result::Result<T, LexerError>;

/// Tokenize a single line of dialect text.
pub fn tokenize(line: &str) -> LexerResult<Vec<Token>> {
    Lexer::new(line).tokenize()
}
