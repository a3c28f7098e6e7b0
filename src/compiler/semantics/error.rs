use super::Classification;

/// Errors raised while declaring or resolving names.
#[derive(Clone, Debug, PartialEq)]
pub enum SemanticError {
    NameCollision(String),
    UndefinedName(String),
    WrongKind(String, Classification),
    OutsideModule(String),
}

impl std::fmt::Display for SemanticError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SemanticError::NameCollision(name) => {
                f.write_fmt(format_args!("{} is already declared", name))
            }
            SemanticError::UndefinedName(name) => {
                f.write_fmt(format_args!("{} is not defined", name))
            }
            SemanticError::WrongKind(name, class) => f.write_fmt(format_args!(
                "{} must be a wire to be continuously assigned, but it is a {}",
                name, class
            )),
            SemanticError::OutsideModule(name) => f.write_fmt(format_args!(
                "{} is declared outside of a module definition",
                name
            )),
        }
    }
}

impl std::error::Error for SemanticError {}
