/*!
Evaluates the expressions found on the right hand side of evaluated
constant definitions and on the closing marker of a loop region.

The grammar, from lowest to highest precedence:

``` text
expr     := range
range    := shift (('..' | '..=') shift)?
shift    := additive (('<<' | '>>') additive)*
additive := term (('+' | '-') term)*
term     := unary (('*' | '/' | '%') unary)*
unary    := '-' unary | power
power    := atom ('**' unary)?
atom     := INTEGER | STRING | IDENT | IDENT '(' args ')' | '(' expr ')' | '[' args ']'
```

Identifiers name constants.  The stored text of the constant is evaluated in
turn; text which does not form a valid expression is used as a string.
*/
use std::convert::TryFrom;

use log::trace;

use crate::compiler::semantics::SymbolTable;

use super::value::Value;

/// How deeply constants may refer to other constants.
const MAX_DEPTH: usize = 16;

/// The most elements a single range is allowed to produce.
const MAX_RANGE_LEN: i64 = 1 << 20;

#[derive(Clone, Debug, PartialEq)]
pub enum EvalError {
    UnexpectedChar(char),
    UnexpectedEnd,
    TrailingInput(String),
    InvalidInteger(String),
    UndefinedConstant(String),
    TypeMismatch(&'static str, &'static str, &'static str),
    UnknownFunction(String),
    WrongArgCount(&'static str, usize),
    DivisionByZero,
    Overflow,
    InvalidRange,
    RecursionLimit,
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use EvalError::*;
        match self {
            UnexpectedChar(c) => f.write_fmt(format_args!("Unexpected character {}", c)),
            UnexpectedEnd => f.write_str("Unexpected end of expression"),
            TrailingInput(rest) => f.write_fmt(format_args!("Unexpected input after expression: {}", rest)),
            InvalidInteger(text) => f.write_fmt(format_args!("Invalid integer {}", text)),
            UndefinedConstant(name) => f.write_fmt(format_args!("{} is not a defined constant", name)),
            TypeMismatch(op, l, r) => {
                f.write_fmt(format_args!("{} cannot be applied to {} and {}", op, l, r))
            }
            UnknownFunction(name) => f.write_fmt(format_args!("Unknown function {}", name)),
            WrongArgCount(name, found) => f.write_fmt(format_args!(
                "Wrong number of arguments to {}: found {}",
                name, found
            )),
            DivisionByZero => f.write_str("Division by zero"),
            Overflow => f.write_str("Integer overflow"),
            InvalidRange => f.write_str("Invalid range"),
            RecursionLimit => f.write_str("Constants are nested too deeply"),
        }
    }
}

pub type EvalResult<T> = std::result::Result<T, EvalError>;

/// Evaluate `text` using the constants currently defined in `symbols`.
pub fn evaluate(text: &str, symbols: &SymbolTable) -> EvalResult<Value> {
    evaluate_at_depth(text, symbols, 0)
}

fn evaluate_at_depth(text: &str, symbols: &SymbolTable, depth: usize) -> EvalResult<Value> {
    if depth > MAX_DEPTH {
        return Err(EvalError::RecursionLimit);
    }

    let mut parser = ExprParser {
        chars: text.chars().collect(),
        index: 0,
        symbols,
        depth,
    };
    let value = parser.expr()?;
    parser.consume_whitespace();
    if parser.index < parser.chars.len() {
        let rest: String = parser.chars[parser.index..].iter().collect();
        return Err(EvalError::TrailingInput(rest));
    }

    trace!("{} => {}", text, value);
    Ok(value)
}

struct ExprParser<'a> {
    chars: Vec<char>,
    index: usize,
    symbols: &'a SymbolTable,
    depth: usize,
}

impl<'a> ExprParser<'a> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.index).copied()
    }

    fn consume_whitespace(&mut self) {
        while self.peek().map_or(false, |c| c.is_whitespace()) {
            self.index += 1;
        }
    }

    fn peek_word(&mut self, word: &str) -> bool {
        self.consume_whitespace();
        let mut idx = self.index;
        for w in word.chars() {
            if self.chars.get(idx) != Some(&w) {
                return false;
            }
            idx += 1;
        }
        true
    }

    fn next_if_word(&mut self, word: &str) -> bool {
        if self.peek_word(word) {
            self.index += word.chars().count();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, c: char) -> EvalResult<()> {
        self.consume_whitespace();
        match self.peek() {
            Some(p) if p == c => {
                self.index += 1;
                Ok(())
            }
            Some(p) => Err(EvalError::UnexpectedChar(p)),
            None => Err(EvalError::UnexpectedEnd),
        }
    }

    fn expr(&mut self) -> EvalResult<Value> {
        self.range()
    }

    fn range(&mut self) -> EvalResult<Value> {
        let low = self.shift()?;
        let inclusive = if self.next_if_word("..=") {
            true
        } else if self.next_if_word("..") {
            false
        } else {
            return Ok(low);
        };

        let high = self.shift()?;
        match (low, high) {
            (Value::Int(l), Value::Int(h)) => {
                let h = if inclusive {
                    h.checked_add(1).ok_or(EvalError::Overflow)?
                } else {
                    h
                };
                make_range(l, h, 1)
            }
            (l, h) => Err(EvalError::TypeMismatch("..", l.type_name(), h.type_name())),
        }
    }

    fn shift(&mut self) -> EvalResult<Value> {
        let mut value = self.additive()?;
        loop {
            let op = if self.next_if_word("<<") {
                "<<"
            } else if self.next_if_word(">>") {
                ">>"
            } else {
                return Ok(value);
            };
            let rhs = self.additive()?;
            let (l, r) = integers(op, value, rhs)?;
            let amount = u32::try_from(r).map_err(|_| EvalError::Overflow)?;
            value = Value::Int(if op == "<<" {
                l.checked_shl(amount).ok_or(EvalError::Overflow)?
            } else {
                l.checked_shr(amount).ok_or(EvalError::Overflow)?
            });
        }
    }

    fn additive(&mut self) -> EvalResult<Value> {
        let mut value = self.term()?;
        loop {
            if self.next_if_word("+") {
                let rhs = self.term()?;
                value = add(value, rhs)?;
            } else if self.peek_word("-") && !self.peek_word("->") {
                self.index += 1;
                let rhs = self.term()?;
                let (l, r) = integers("-", value, rhs)?;
                value = Value::Int(l.checked_sub(r).ok_or(EvalError::Overflow)?);
            } else {
                return Ok(value);
            }
        }
    }

    fn term(&mut self) -> EvalResult<Value> {
        let mut value = self.unary()?;
        loop {
            let op = if self.peek_word("**") {
                return Ok(value);
            } else if self.next_if_word("*") {
                "*"
            } else if self.next_if_word("/") {
                "/"
            } else if self.next_if_word("%") {
                "%"
            } else {
                return Ok(value);
            };

            let rhs = self.unary()?;
            let (l, r) = integers(op, value, rhs)?;
            value = Value::Int(match op {
                "*" => l.checked_mul(r).ok_or(EvalError::Overflow)?,
                "/" => floor_div(l, r)?,
                _ => floor_mod(l, r)?,
            });
        }
    }

    fn unary(&mut self) -> EvalResult<Value> {
        if self.next_if_word("-") {
            match self.unary()? {
                Value::Int(i) => Ok(Value::Int(i.checked_neg().ok_or(EvalError::Overflow)?)),
                v => Err(EvalError::TypeMismatch("-", v.type_name(), v.type_name())),
            }
        } else {
            self.power()
        }
    }

    fn power(&mut self) -> EvalResult<Value> {
        let base = self.atom()?;
        if !self.next_if_word("**") {
            return Ok(base);
        }

        let exp = self.unary()?;
        let (b, e) = integers("**", base, exp)?;
        let e = u32::try_from(e).map_err(|_| EvalError::Overflow)?;
        Ok(Value::Int(b.checked_pow(e).ok_or(EvalError::Overflow)?))
    }

    fn atom(&mut self) -> EvalResult<Value> {
        self.consume_whitespace();
        match self.peek() {
            None => Err(EvalError::UnexpectedEnd),
            Some(c) if c.is_ascii_digit() => self.integer(),
            Some('"') => self.string(),
            Some('(') => {
                self.index += 1;
                let value = self.expr()?;
                self.expect(')')?;
                Ok(value)
            }
            Some('[') => {
                self.index += 1;
                let items = self.args(']')?;
                Ok(Value::Seq(items))
            }
            Some(c) if c.is_ascii_alphabetic() || c == '_' => {
                let name = self.identifier();
                if self.next_if_word("(") {
                    let args = self.args(')')?;
                    call(&name, args)
                } else {
                    self.constant(&name)
                }
            }
            Some(c) => Err(EvalError::UnexpectedChar(c)),
        }
    }

    /// Parses a comma separated list of expressions up to and including `close`.
    fn args(&mut self, close: char) -> EvalResult<Vec<Value>> {
        let mut items = vec![];
        if self.next_if_word(&close.to_string()) {
            return Ok(items);
        }

        loop {
            items.push(self.expr()?);
            if self.next_if_word(",") {
                continue;
            }
            self.expect(close)?;
            return Ok(items);
        }
    }

    fn identifier(&mut self) -> String {
        let start = self.index;
        while self
            .peek()
            .map_or(false, |c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.index += 1;
        }
        self.chars[start..self.index].iter().collect()
    }

    fn integer(&mut self) -> EvalResult<Value> {
        let start = self.index;
        while self
            .peek()
            .map_or(false, |c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.index += 1;
        }
        let text: String = self.chars[start..self.index].iter().collect();
        let digits = text.replace('_', "");

        let parsed = if let Some(hex) = digits.strip_prefix("0x") {
            i64::from_str_radix(hex, 16)
        } else if let Some(bin) = digits.strip_prefix("0b") {
            i64::from_str_radix(bin, 2)
        } else {
            digits.parse::<i64>()
        };

        parsed
            .map(Value::Int)
            .map_err(|_| EvalError::InvalidInteger(text))
    }

    fn string(&mut self) -> EvalResult<Value> {
        // Skip the opening quote
        self.index += 1;
        let mut s = String::new();
        loop {
            match self.peek() {
                None => return Err(EvalError::UnexpectedEnd),
                Some('"') => {
                    self.index += 1;
                    return Ok(Value::Str(s));
                }
                Some('\\') => {
                    self.index += 1;
                    match self.peek() {
                        Some('n') => s.push('\n'),
                        Some('t') => s.push('\t'),
                        Some(c) => s.push(c),
                        None => return Err(EvalError::UnexpectedEnd),
                    }
                    self.index += 1;
                }
                Some(c) => {
                    s.push(c);
                    self.index += 1;
                }
            }
        }
    }

    fn constant(&mut self, name: &str) -> EvalResult<Value> {
        let text = self
            .symbols
            .constant(name)
            .ok_or_else(|| EvalError::UndefinedConstant(name.into()))?;

        match evaluate_at_depth(text, self.symbols, self.depth + 1) {
            Ok(value) => Ok(value),
            Err(_) => Ok(Value::Str(text.into())),
        }
    }
}

fn integers(op: &'static str, l: Value, r: Value) -> EvalResult<(i64, i64)> {
    match (l, r) {
        (Value::Int(l), Value::Int(r)) => Ok((l, r)),
        (l, r) => Err(EvalError::TypeMismatch(op, l.type_name(), r.type_name())),
    }
}

fn add(l: Value, r: Value) -> EvalResult<Value> {
    match (l, r) {
        (Value::Int(l), Value::Int(r)) => Ok(Value::Int(l.checked_add(r).ok_or(EvalError::Overflow)?)),
        (Value::Str(l), Value::Str(r)) => Ok(Value::Str(l + &r)),
        (Value::Seq(mut l), Value::Seq(r)) => {
            l.extend(r);
            Ok(Value::Seq(l))
        }
        (l, r) => Err(EvalError::TypeMismatch("+", l.type_name(), r.type_name())),
    }
}

fn floor_div(l: i64, r: i64) -> EvalResult<i64> {
    if r == 0 {
        return Err(EvalError::DivisionByZero);
    }
    let q = l.checked_div(r).ok_or(EvalError::Overflow)?;
    if l % r != 0 && ((l < 0) != (r < 0)) {
        Ok(q - 1)
    } else {
        Ok(q)
    }
}

fn floor_mod(l: i64, r: i64) -> EvalResult<i64> {
    if r == 0 {
        return Err(EvalError::DivisionByZero);
    }
    let m = l.checked_rem(r).ok_or(EvalError::Overflow)?;
    if m != 0 && ((m < 0) != (r < 0)) {
        Ok(m + r)
    } else {
        Ok(m)
    }
}

fn make_range(start: i64, stop: i64, step: i64) -> EvalResult<Value> {
    if step == 0 {
        return Err(EvalError::InvalidRange);
    }

    let span = if step > 0 {
        stop.saturating_sub(start)
    } else {
        start.saturating_sub(stop)
    };
    if span / step.saturating_abs() > MAX_RANGE_LEN {
        return Err(EvalError::InvalidRange);
    }

    let mut items = vec![];
    let mut i = start;
    while (step > 0 && i < stop) || (step < 0 && i > stop) {
        items.push(Value::Int(i));
        i = match i.checked_add(step) {
            Some(next) => next,
            None => break,
        };
    }
    Ok(Value::Seq(items))
}

fn call(name: &str, args: Vec<Value>) -> EvalResult<Value> {
    match name {
        "range" => {
            let bounds = args
                .into_iter()
                .map(|a| match a {
                    Value::Int(i) => Ok(i),
                    v => Err(EvalError::TypeMismatch("range", v.type_name(), "integer")),
                })
                .collect::<EvalResult<Vec<i64>>>()?;
            match bounds.as_slice() {
                [stop] => make_range(0, *stop, 1),
                [start, stop] => make_range(*start, *stop, 1),
                [start, stop, step] => make_range(*start, *stop, *step),
                _ => Err(EvalError::WrongArgCount("range", bounds.len())),
            }
        }
        "len" => match args.as_slice() {
            [Value::Seq(items)] => Ok(Value::Int(items.len() as i64)),
            [Value::Str(s)] => Ok(Value::Int(s.chars().count() as i64)),
            [v] => Err(EvalError::TypeMismatch("len", v.type_name(), v.type_name())),
            _ => Err(EvalError::WrongArgCount("len", args.len())),
        },
        _ => Err(EvalError::UnknownFunction(name.into())),
    }
}
