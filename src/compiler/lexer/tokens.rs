/// A half-open range of byte offsets into the line a token was read from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Span {
    low: usize,
    high: usize,
}

impl Span {
    pub fn new(low: usize, high: usize) -> Span {
        Span { low, high }
    }

    pub fn low(&self) -> usize {
        self.low
    }

    pub fn high(&self) -> usize {
        self.high
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("[{}, {})", self.low, self.high))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Lex {
    Identifier(String),
    Integer(String),
    /// The bits of an unsized binary literal: `'0101`
    BitLiteral(String),
    StringLiteral(String),
    /// An escape macro invocation: `%!name`
    Macro(String),
    Hash,
    Tick,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    LConcat,
    RConcat,
    LArrow,
    RArrow,
    Eq,
    ContinuousAssign,
    OutputAssign,
    Colon,
    Semicolon,
    Comma,
    At,
    Question,
    Operator(&'static str),
    Other(char),
}

impl Lex {
    pub fn get_str(&self) -> Option<&str> {
        match self {
            Lex::Identifier(s) | Lex::Integer(s) => Some(s),
            _ => None,
        }
    }
}

impl std::fmt::Display for Lex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use Lex::*;
        match self {
            Identifier(id) => f.write_str(&format!("identifier {}", id)),
            Integer(i) => f.write_str(&format!("integer {}", i)),
            BitLiteral(bits) => f.write_str(&format!("bit literal '{}", bits)),
            StringLiteral(s) => f.write_str(&format!("literal \"{}\"", s)),
            Macro(name) => f.write_str(&format!("macro %!{}", name)),
            Hash => f.write_str("#"),
            Tick => f.write_str("'"),
            LParen => f.write_str("("),
            RParen => f.write_str(")"),
            LBrace => f.write_str("{"),
            RBrace => f.write_str("}"),
            LBracket => f.write_str("["),
            RBracket => f.write_str("]"),
            LConcat => f.write_str("<|"),
            RConcat => f.write_str("|>"),
            LArrow => f.write_str("<-"),
            RArrow => f.write_str("->"),
            Eq => f.write_str("="),
            ContinuousAssign => f.write_str(":="),
            OutputAssign => f.write_str("::="),
            Colon => f.write_str(":"),
            Semicolon => f.write_str(";"),
            Comma => f.write_str(","),
            At => f.write_str("@"),
            Question => f.write_str("?"),
            Operator(op) => f.write_str(op),
            Other(c) => f.write_fmt(format_args!("{}", c)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The value of the token
    pub sym: Lex,

    pub span: Span,
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_fmt(format_args!("S{}: {}", self.span, self.sym))
    }
}

impl Token {
    pub fn new(s: Lex, span: Span) -> Token {
        Token { sym: s, span }
    }

    pub fn span(&self) -> Span {
        self.span
    }
}
