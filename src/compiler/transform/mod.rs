/*!
Rewrites the preprocessed dialect into Verilog, line by line.

Each line is split into code and a trailing comment, and the code is passed
through the rewrite rules in a fixed order: `match`, `par`, module headers and
ports, bit literals, braces, concatenations, assignments and declarations,
width annotations, `on` triggers, and escape macros.  Statements which need
it are then closed with `;`.
*/
mod assign;
mod context;
mod error;
mod rules;

pub mod transformer;

pub use context::{ContextStack, Frame};
pub use error::TransformError;
pub use transformer::Transformer;

use super::CompilerError;

pub type TransformResult<T> = std::result::Result<T, CompilerError<TransformError>>;
