/*!
Tracks every name declared in a compilation unit.

The [`SymbolTable`] records global constants and the modules which have been
defined, along with the ports, wires, registers and parameters of each module.
The line transformer consults it to classify identifiers and registers new
declarations as it encounters them.

[`infer_direction`] decides whether a port is an input or an output by looking
ahead through the text of the module that declares it.
*/
mod direction;
mod error;
mod tests;

pub mod symbol_table;

pub use direction::infer_direction;
pub use error::SemanticError;
pub use symbol_table::{Classification, Direction, Module, Parameter, Port, Signal, SymbolTable};

pub type SemanticResult<T> = std::result::Result<T, SemanticError>;
