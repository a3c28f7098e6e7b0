/**
 * The compiler lowers the brevlog hardware dialect into Verilog.
 *
 * Compilation runs in two stages over a single [`SymbolTable`](semantics::SymbolTable):
 *
 * 1. The preprocessor works on the whole source.  It records and substitutes
 * constants and expands loops, producing plain dialect text.
 * 2. The transformer rewrites that text one line at a time.  It tracks which
 * blocks are open, registers modules, ports and signals as they are declared,
 * and checks that every assignment targets a signal of the right kind.
 *
 * Errors from either stage carry the line they were found on and stop the
 * compilation.  A [`Session`] owns the state for one compilation.
 */
#[macro_use]
mod error;

pub mod lexer;
pub mod preprocessor;
pub mod semantics;
pub mod transform;

mod session;
mod tests;

pub use error::{CompileError, CompilerError};
pub use session::Session;

/// Compile a complete dialect source into Verilog.
pub fn compile(source: &str) -> Result<String, CompileError> {
    Session::new().compile(source)
}
