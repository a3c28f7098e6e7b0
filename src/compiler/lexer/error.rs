/// Errors which can be encountered while tokenizing a line
#[derive(Clone, Debug, PartialEq)]
pub enum LexerError {
    UnterminatedString,
}

impl std::fmt::Display for LexerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use LexerError::*;
        let msg = match self {
            UnterminatedString => "Unterminated string literal",
        };

        f.write_str(msg)
    }
}
