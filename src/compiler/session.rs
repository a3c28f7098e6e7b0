use log::{debug, info};

use super::{
    preprocessor::{Preprocessor, PreprocessorResult},
    semantics::SymbolTable,
    transform::Transformer,
    CompileError,
};

/// Owns the symbol table for one compilation and runs the stages over it.
///
/// A session should only be used for one source.  Constants and modules from
/// an earlier source would still be visible to a later one.
#[derive(Debug, Default)]
pub struct Session {
    symbols: SymbolTable,
}

impl Session {
    pub fn new() -> Session {
        Session {
            symbols: SymbolTable::new(),
        }
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    /// Expand the constants and loops in `source`.
    pub fn preprocess(&mut self, source: &str) -> PreprocessorResult<String> {
        let expanded = Preprocessor::new(&mut self.symbols).process(source)?;
        debug!(
            "Preprocessed {} lines into {} lines",
            source.lines().count(),
            expanded.lines().count()
        );
        Ok(expanded)
    }

    /// Create a transformer for preprocessed source.  Its lines must then be
    /// passed to the transformer in order.
    pub fn transformer(&mut self, expanded: &str) -> Transformer {
        Transformer::new(&mut self.symbols, expanded)
    }

    /// Run every stage over `source` and return the Verilog.
    pub fn compile(&mut self, source: &str) -> Result<String, CompileError> {
        let expanded = self.preprocess(source)?;
        let verilog = self.transformer(&expanded).transform()?;
        info!("Compiled {} modules", self.symbols.modules().len());
        Ok(verilog)
    }
}
