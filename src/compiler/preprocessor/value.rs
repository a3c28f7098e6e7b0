/// The result of evaluating a constant or loop expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Str(String),
    Seq(Vec<Value>),
}

impl Value {
    /// The form a value takes when it is substituted into source text.  Strings
    /// are inserted raw, without their quotes.
    pub fn to_text(&self) -> String {
        match self {
            Value::Str(s) => s.clone(),
            _ => format!("{}", self),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "integer",
            Value::Str(_) => "string",
            Value::Seq(_) => "sequence",
        }
    }
}

/// Formats a value as an expression which evaluates back to the same value,
/// this is the form that evaluated constants are stored in.
impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Int(i) => f.write_fmt(format_args!("{}", i)),
            Value::Str(s) => f.write_fmt(format_args!("{:?}", s)),
            Value::Seq(items) => {
                f.write_str("[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    f.write_fmt(format_args!("{}", item))?;
                }
                f.write_str("]")
            }
        }
    }
}
