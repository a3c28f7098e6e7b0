use super::preprocessor::PreprocessorError;
use super::transform::TransformError;

/// Represents all errors that are generated from within the Compiler
/// module and its submodules.
///
/// This type captures common metadata which is necessarily present for
/// all errors which are caused by input source code.  E.g. the line #
/// that the error occurs on. This also handles formatting all error messages
/// with the universal metadata along with the inner metadata.
///
/// The inner error allows metadata which is specific to a submodule within
/// the compiler. E.g., the errors themselves are submodule specific and
/// are stored in the `inner` field.
#[derive(Clone, Debug, PartialEq)]
pub struct CompilerError<IE> {
    line: u32,
    inner: IE,
}

impl<IE> CompilerError<IE> {
    pub fn new(line: u32, inner: IE) -> Self {
        CompilerError { line, inner }
    }

    pub fn inner(&self) -> &IE {
        &self.inner
    }

    pub fn into_inner(self) -> IE {
        self.inner
    }

    pub fn line(&self) -> u32 {
        self.line
    }
}

impl<IE> std::fmt::Display for CompilerError<IE>
where
    IE: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("L{}: {}", self.line, self.inner))
    }
}

impl<IE> std::error::Error for CompilerError<IE> where IE: std::fmt::Debug + std::fmt::Display {}

/// Any error that can stop a compilation, tagged with the stage that raised it.
#[derive(Clone, Debug, PartialEq)]
pub enum CompileError {
    Preprocessor(CompilerError<PreprocessorError>),
    Transform(CompilerError<TransformError>),
}

impl CompileError {
    pub fn line(&self) -> u32 {
        match self {
            CompileError::Preprocessor(e) => e.line(),
            CompileError::Transform(e) => e.line(),
        }
    }
}

impl std::fmt::Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::Preprocessor(e) => f.write_fmt(format_args!("Preprocessor: {}", e)),
            CompileError::Transform(e) => f.write_fmt(format_args!("Transform: {}", e)),
        }
    }
}

impl std::error::Error for CompileError {}

impl From<CompilerError<PreprocessorError>> for CompileError {
    fn from(e: CompilerError<PreprocessorError>) -> Self {
        CompileError::Preprocessor(e)
    }
}

impl From<CompilerError<TransformError>> for CompileError {
    fn from(e: CompilerError<TransformError>) -> Self {
        CompileError::Transform(e)
    }
}

/// Create a [`CompilerError`] wrapped in `Err` for the given line
macro_rules! err {
    ($line:expr, $inner:expr) => {
        Err(crate::compiler::CompilerError::new($line, $inner))
    };
}
