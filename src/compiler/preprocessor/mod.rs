/*!
The preprocessor runs over the whole source before any line is transformed.

It works in two phases:
1. Constants: definition lines (`%%NAME = text` and `%=NAME = expr`) are
   recorded in the [`SymbolTable`](crate::compiler::semantics::SymbolTable) and
   removed, and every reference (`%%NAME`, `%=NAME`, optionally closed by `%`) is
   replaced with the stored value.
2. Loops: the lines between a pair of `%-=` markers are repeated once for each
   value of the sequence given on the closing marker.
*/
mod error;
mod tests;

pub mod eval;
pub mod preprocessor;
pub mod value;

pub use error::PreprocessorError;
pub use eval::{evaluate, EvalError};
pub use preprocessor::Preprocessor;
pub use value::Value;

use super::CompilerError;

pub type PreprocessorResult<T> = std::result::Result<T, CompilerError<PreprocessorError>>;
