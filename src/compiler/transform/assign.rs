use log::trace;

use crate::compiler::{
    lexer::{tokenize, Lex, Token},
    semantics::{Classification, SemanticError, SymbolTable},
};

use super::{
    rules::{close_group, parse_width},
    TransformError,
};

type RuleResult<T> = std::result::Result<T, TransformError>;

/// Tokens after which a statement starts
const OPEN_KEYWORDS: &[&str] = &["begin", "else"];

/// Rewrites the assignments on a line of code and checks that their targets
/// have been declared.  Declarations register their names with `symbols`.
///
/// Each statement separated by a top level `;` is rewritten on its own.
pub fn rewrite_assignment(code: &str, symbols: &mut SymbolTable) -> RuleResult<String> {
    let tokens = tokenize(code)?;
    let depths = depths(&tokens);

    let mut out = String::with_capacity(code.len());
    let mut start = 0;
    for (token, depth) in tokens.iter().zip(depths.iter()) {
        if *depth == 0 && token.sym == Lex::Semicolon {
            out.push_str(&rewrite_statement(&code[start..token.span.low()], symbols)?);
            out.push(';');
            start = token.span.high();
        }
    }
    out.push_str(&rewrite_statement(&code[start..], symbols)?);
    Ok(out)
}

/// Only operators outside of any brackets are considered.  They are tried in
/// this order: `<-`, `->`, declarations, `=`, `:=`, `::=`.
fn rewrite_statement(code: &str, symbols: &mut SymbolTable) -> RuleResult<String> {
    let tokens = tokenize(code)?;
    let depths = depths(&tokens);
    let find = |lex: Lex| {
        tokens
            .iter()
            .zip(depths.iter())
            .position(|(t, d)| *d == 0 && t.sym == lex)
    };

    if let Some(op) = find(Lex::LArrow) {
        let (prefix, target, expr) = split_forward(code, &tokens, op, "<-")?;
        check_targets(&tokens, &target, symbols, |_, _| Ok(()))?;
        return Ok(format!("{}{} <= {}", prefix, target.text, expr));
    }

    if let Some(op) = find(Lex::RArrow) {
        return rewrite_reversed(code, &tokens, &depths, op, symbols);
    }

    if is_declaration(&tokens) {
        declare(code, &tokens, &depths, symbols)?;
        return Ok(code.into());
    }

    if let Some(op) = find(Lex::Eq) {
        if let Some(target) = target_left(code, &tokens, op) {
            check_targets(&tokens, &target, symbols, |_, _| Ok(()))?;
        }
        return Ok(code.into());
    }

    let continuous = find(Lex::ContinuousAssign)
        .map(|op| (op, ":="))
        .or_else(|| find(Lex::OutputAssign).map(|op| (op, "::=")));
    if let Some((op, symbol)) = continuous {
        let (prefix, target, expr) = split_forward(code, &tokens, op, symbol)?;
        check_targets(&tokens, &target, symbols, |name, class| match class {
            Classification::Wire(_) => Ok(()),
            class => Err(SemanticError::WrongKind(name.into(), class)),
        })?;
        return Ok(format!("{}assign {} = {}", prefix, target.text, expr));
    }

    Ok(code.into())
}

/// The bracket depth that each token sits at.
fn depths(tokens: &[Token]) -> Vec<i32> {
    let mut depth = 0;
    tokens
        .iter()
        .map(|t| match t.sym {
            Lex::LParen | Lex::LBracket | Lex::LBrace => {
                depth += 1;
                depth - 1
            }
            Lex::RParen | Lex::RBracket | Lex::RBrace => {
                depth -= 1;
                depth
            }
            _ => depth,
        })
        .collect()
}

/// The target of an assignment: a run of tokens and the text they cover.
struct Target {
    first: usize,
    last: usize,
    text: String,
}

/// Finds the signal, bit select or concatenation which ends just before the
/// operator at `op`.
fn target_left(code: &str, tokens: &[Token], op: usize) -> Option<Target> {
    let last = op.checked_sub(1)?;
    let first = match tokens[last].sym {
        Lex::Identifier(_) => last,
        Lex::RBracket => {
            let open = open_group(tokens, last)?;
            match tokens.get(open.checked_sub(1)?)?.sym {
                Lex::Identifier(_) => open - 1,
                _ => return None,
            }
        }
        Lex::RBrace => open_group(tokens, last)?,
        _ => return None,
    };

    Some(Target {
        first,
        last,
        text: code[tokens[first].span.low()..tokens[last].span.high()].into(),
    })
}

/// Finds the signal, bit select or concatenation which makes up every token
/// after the operator at `op`.
fn target_right(code: &str, tokens: &[Token], op: usize) -> Option<Target> {
    let first = op + 1;
    let last = match tokens.get(first)?.sym {
        Lex::Identifier(_) => match tokens.get(first + 1).map(|t| &t.sym) {
            Some(Lex::LBracket) => close_group(tokens, first + 1)?.0,
            _ => first,
        },
        Lex::LBrace => close_group(tokens, first)?.0,
        _ => return None,
    };

    if last + 1 != tokens.len() {
        return None;
    }

    Some(Target {
        first,
        last,
        text: code[tokens[first].span.low()..tokens[last].span.high()].into(),
    })
}

/// Walks backwards from the closing token at `close` to the token which opens
/// its group.
fn open_group(tokens: &[Token], close: usize) -> Option<usize> {
    let mut depth = 0;
    for idx in (0..=close).rev() {
        match tokens[idx].sym {
            Lex::RParen | Lex::RBracket | Lex::RBrace => depth += 1,
            Lex::LParen | Lex::LBracket | Lex::LBrace => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => (),
        }
    }
    None
}

/// Splits `prefix target op expr`.
fn split_forward(
    code: &str,
    tokens: &[Token],
    op: usize,
    symbol: &str,
) -> RuleResult<(String, Target, String)> {
    let target = target_left(code, tokens, op).ok_or_else(|| {
        TransformError::Malformed(format!("{} must be preceded by a signal", symbol))
    })?;
    let expr = code[tokens[op].span.high()..].trim();
    if expr.is_empty() {
        return Err(TransformError::Malformed(format!(
            "{} must be followed by a value",
            symbol
        )));
    }

    let prefix = code[..tokens[target.first].span.low()].to_string();
    Ok((prefix, target, expr.into()))
}

/// `expr -> name` becomes `name <= expr`.  Anything in front of the
/// statement, such as a case label or `begin`, stays in front.
fn rewrite_reversed(
    code: &str,
    tokens: &[Token],
    depths: &[i32],
    op: usize,
    symbols: &SymbolTable,
) -> RuleResult<String> {
    let target = target_right(code, tokens, op)
        .ok_or_else(|| TransformError::Malformed("-> must be followed by a signal".into()))?;
    check_targets(tokens, &target, symbols, |_, _| Ok(()))?;

    let ternary = tokens[..op].iter().any(|t| t.sym == Lex::Question);
    let starts_statement = |t: &Token| match &t.sym {
        Lex::Colon => !ternary,
        Lex::Identifier(kw) => OPEN_KEYWORDS.contains(&kw.as_str()),
        _ => false,
    };
    let opener = (0..op)
        .rev()
        .find(|idx| depths[*idx] == 0 && starts_statement(&tokens[*idx]));

    let (prefix, start) = match opener {
        Some(idx) => (
            format!("{} ", code[..tokens[idx].span.high()].trim_end()),
            tokens[idx].span.high(),
        ),
        None => {
            let indent = code.len() - code.trim_start().len();
            (code[..indent].to_string(), indent)
        }
    };

    let expr = code[start..tokens[op].span.low()].trim();
    if expr.is_empty() {
        return Err(TransformError::Malformed(
            "-> must be preceded by a value".into(),
        ));
    }

    Ok(format!("{}{} <= {}", prefix, target.text, expr))
}

/// Checks every signal named by `target`.  Each must be declared, and its
/// classification must then pass `kind`.  Names used to index into a signal
/// are not targets.
fn check_targets<F>(
    tokens: &[Token],
    target: &Target,
    symbols: &SymbolTable,
    kind: F,
) -> RuleResult<()>
where
    F: Fn(&str, Classification) -> Result<(), SemanticError>,
{
    let mut brackets = 0;
    for token in &tokens[target.first..=target.last] {
        match &token.sym {
            Lex::LBracket => brackets += 1,
            Lex::RBracket => brackets -= 1,
            Lex::Identifier(name) if brackets == 0 => {
                let class = symbols.classify(name);
                if !class.is_defined() {
                    return Err(SemanticError::UndefinedName(name.clone()).into());
                }
                kind(name, class)?;
            }
            _ => (),
        }
    }
    Ok(())
}

fn is_declaration(tokens: &[Token]) -> bool {
    match tokens.first().map(|t| &t.sym) {
        Some(Lex::Identifier(kw)) => kw == "reg" || kw == "wire" || kw == "parameter",
        _ => false,
    }
}

/// Registers the names declared by `reg#W`, `wire#W` or `parameter#T` lines.
fn declare(
    code: &str,
    tokens: &[Token],
    depths: &[i32],
    symbols: &mut SymbolTable,
) -> RuleResult<()> {
    let keyword = tokens[0].sym.get_str().unwrap_or_default();
    let is_parameter = keyword == "parameter";
    let missing = || {
        if is_parameter {
            TransformError::MissingType(code.into())
        } else {
            TransformError::MissingWidth(code.into())
        }
    };

    if tokens.get(1).map(|t| &t.sym) != Some(&Lex::Hash) {
        return Err(missing());
    }

    let annotation = match tokens.get(2).map(|t| &t.sym) {
        Some(Lex::Integer(digits)) => {
            parse_width(digits).ok_or_else(|| TransformError::MissingWidth(code.into()))?
        }
        Some(Lex::Identifier(_)) if is_parameter => 0,
        _ => return Err(missing()),
    };
    let ty = match &tokens[2].sym {
        Lex::Identifier(ty) => ty.clone(),
        _ => format!("[{}:0]", annotation - 1),
    };

    // The names run up to an initialiser, if there is one
    let end = (3..tokens.len())
        .find(|idx| depths[*idx] == 0 && tokens[*idx].sym == Lex::Eq)
        .unwrap_or_else(|| tokens.len());
    let initialised = end < tokens.len();

    let mut names = vec![];
    let mut expect_name = true;
    for idx in 3..end {
        match (&tokens[idx].sym, depths[idx]) {
            (Lex::Identifier(name), 0) if expect_name => {
                names.push(name.as_str());
                expect_name = false;
            }
            (Lex::Comma, 0) if !expect_name => expect_name = true,
            (_, 0) if expect_name => {
                return Err(TransformError::Malformed(format!(
                    "expected a name in declaration: {}",
                    code
                )))
            }
            _ => (),
        }
    }

    if names.is_empty() || expect_name {
        return Err(TransformError::Malformed(format!(
            "expected a name in declaration: {}",
            code
        )));
    }

    if initialised && names.len() > 1 {
        return Err(TransformError::Malformed(
            "only a single name may be declared with an initial value".into(),
        ));
    }

    for name in names {
        trace!("{} declares {}", keyword, name);
        match keyword {
            "reg" => symbols.declare_register(name, annotation)?,
            "wire" => symbols.declare_wire(name, annotation)?,
            _ => symbols.declare_parameter(name, &ty)?,
        }
    }

    Ok(())
}
