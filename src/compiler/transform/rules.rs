/*!
The rewrite rules which only need the text of the line they are applied to.
Each takes the code part of a line and returns the rewritten code.
*/
use crate::compiler::lexer::{
    lexer::{is_identifier_char, starts_with_keyword},
    tokenize, Lex, Span, Token,
};

use super::TransformError;

type RuleResult<T> = std::result::Result<T, TransformError>;

/// Keywords which make up a whole line and never take a terminator
const BLOCK_KEYWORDS: &[&str] = &[
    "else",
    "begin",
    "end",
    "endcase",
    "endmodule",
    "generate",
    "endgenerate",
];

/// Directives, comments and comment continuation lines
const UNTERMINATED_PREFIXES: &[&str] = &["`", "//", "/*", "*"];

/// A line ending in one of these continues on the next line
const CONTINUATION_CHARS: &[char] = &[
    '{', '}', '(', '[', ',', ':', '\\', '+', '-', '*', '/', '&', '|', '^', '?', '=',
];

/// Splits `line` at the start of a trailing `//` or `/*` comment which is not
/// inside a string literal.
pub fn split_comment(line: &str) -> (&str, &str) {
    let mut in_string = false;
    let mut escaped = false;
    for (idx, c) in line.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '/' if line[idx + 1..].starts_with('/') || line[idx + 1..].starts_with('*') => {
                return (&line[..idx], &line[idx..])
            }
            _ => (),
        }
    }

    (line, "")
}

/// A comment which opens a block comment without closing it.
pub fn opens_block_comment(comment: &str) -> bool {
    comment.starts_with("/*") && !comment[2..].contains("*/")
}

/// Decides if the trimmed code of a line is a statement that must be closed
/// with `;`.
pub fn needs_terminator(code: &str, in_header: bool) -> bool {
    if in_header || code.is_empty() || code.contains(';') {
        return false;
    }

    if starts_with_keyword(code, "module") || starts_with_keyword(code, "match") {
        return false;
    }

    if starts_with_keyword(code, "on") && split_on(code).map_or(false, |(_, body)| body.is_empty()) {
        return false;
    }

    if BLOCK_KEYWORDS.contains(&code) || UNTERMINATED_PREFIXES.iter().any(|p| code.starts_with(p)) {
        return false;
    }

    !code.ends_with(CONTINUATION_CHARS)
}

/// Splits an `on` line into its trigger and whatever follows the trigger.
/// The trigger is either the text inside the parentheses or a bare delay.
pub fn split_on(code: &str) -> Option<(&str, &str)> {
    let rest = code["on".len()..].trim_start();
    if rest.starts_with('(') {
        let close = matching_paren(rest)?;
        Some((rest[1..close].trim(), rest[close + 1..].trim()))
    } else {
        let end = rest
            .find(|c: char| c.is_whitespace() || c == '{')
            .unwrap_or_else(|| rest.len());
        if end == 0 {
            None
        } else {
            Some((&rest[..end], rest[end..].trim()))
        }
    }
}

/// Byte offset of the `)` which closes the `(` that `text` starts with.
pub fn matching_paren(text: &str) -> Option<usize> {
    let mut depth = 0;
    for (idx, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
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

/// Applies a set of non-overlapping replacements to `text`.
pub fn splice(text: &str, mut edits: Vec<(Span, String)>) -> String {
    edits.sort_by_key(|(span, _)| span.low());

    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for (span, replacement) in edits {
        out.push_str(&text[last..span.low()]);
        out.push_str(&replacement);
        last = span.high();
    }
    out.push_str(&text[last..]);
    out
}

/// Pads `replacement` with a single space on each side where the text next to
/// `span` is not already whitespace.
pub fn pad(text: &str, span: Span, replacement: &str) -> String {
    let before = text[..span.low()].chars().next_back();
    let after = text[span.high()..].chars().next();

    let mut padded = String::new();
    if before.map_or(false, |c| !c.is_whitespace()) {
        padded.push(' ');
    }
    padded.push_str(replacement);
    if after.map_or(false, |c| !c.is_whitespace()) {
        padded.push(' ');
    }
    padded
}

/// `'0101` becomes `4'b0101`
pub fn annotate_bit_literals(code: &str) -> RuleResult<String> {
    let edits = tokenize(code)?
        .into_iter()
        .filter_map(|t| match t.sym {
            Lex::BitLiteral(bits) => Some((t.span, format!("{}'b{}", bits.len(), bits))),
            _ => None,
        })
        .collect();
    Ok(splice(code, edits))
}

/// `#8` becomes `[7:0]` and `#integer` becomes `integer`.
pub fn annotate_widths(code: &str) -> RuleResult<String> {
    let tokens = tokenize(code)?;
    let mut edits = vec![];

    for (idx, token) in tokens.iter().enumerate() {
        if token.sym != Lex::Hash {
            continue;
        }

        let next = tokens.get(idx + 1);
        let annotation = match next.map(|t| &t.sym) {
            Some(Lex::Integer(digits)) => match parse_width(digits) {
                Some(width) => format!("[{}:0]", width - 1),
                None => {
                    return Err(TransformError::MissingWidth(
                        code[token.span.low()..].trim().into(),
                    ))
                }
            },
            Some(Lex::Identifier(ty)) => ty.clone(),
            _ => {
                return Err(TransformError::MissingType(
                    code[token.span.low()..].trim().into(),
                ))
            }
        };

        // `next` is always present here, the match above returns otherwise
        let high = next.map_or(token.span.high(), |t| t.span.high());
        let span = Span::new(token.span.low(), high);
        edits.push((span, pad(code, span, &annotation)));
    }

    Ok(splice(code, edits))
}

/// Parses a width written after `#`.  Zero is not a width.
pub fn parse_width(digits: &str) -> Option<u32> {
    match digits.replace('_', "").parse::<u32>() {
        Ok(width) if width > 0 => Some(width),
        _ => None,
    }
}

/// `<|a, b|>` becomes `{a, b}`, but only when both ends are on the line.
pub fn map_concatenations(code: &str) -> RuleResult<String> {
    let tokens = tokenize(code)?;
    let opens = tokens.iter().any(|t| t.sym == Lex::LConcat);
    let closes = tokens.iter().any(|t| t.sym == Lex::RConcat);
    if !(opens && closes) {
        return Ok(code.into());
    }

    let edits = tokens
        .into_iter()
        .filter_map(|t| match t.sym {
            Lex::LConcat => Some((t.span, "{".to_string())),
            Lex::RConcat => Some((t.span, "}".to_string())),
            _ => None,
        })
        .collect();
    Ok(splice(code, edits))
}

/// Expands every `%!name(args)` escape macro on the line.
pub fn expand_macros(code: &str) -> RuleResult<String> {
    let tokens = tokenize(code)?;
    let mut edits = vec![];

    let mut idx = 0;
    while idx < tokens.len() {
        let name = match &tokens[idx].sym {
            Lex::Macro(name) => name,
            _ => {
                idx += 1;
                continue;
            }
        };

        if tokens.get(idx + 1).map(|t| &t.sym) != Some(&Lex::LParen) {
            return Err(TransformError::Malformed(format!(
                "%!{} must be followed by an argument list",
                name
            )));
        }

        let (close, commas) = close_group(&tokens, idx + 1).ok_or_else(|| {
            TransformError::Malformed(format!("argument list of %!{} is not closed", name))
        })?;
        let args = code[tokens[idx + 1].span.high()..tokens[close].span.low()].trim();
        let count = if args.is_empty() { 0 } else { commas + 1 };

        let span = Span::new(tokens[idx].span.low(), tokens[close].span.high());
        edits.push((span, expand_macro(name, args, count)?));
        idx = close + 1;
    }

    Ok(splice(code, edits))
}

fn expand_macro(name: &str, args: &str, count: usize) -> RuleResult<String> {
    match name {
        "sleep" if count == 1 => Ok(format!("#{}", args)),
        "sleep" => Err(TransformError::MacroArity(name.into(), 1, count)),
        "finish" if count == 0 => Ok("$finish".into()),
        "finish" => Err(TransformError::MacroArity(name.into(), 0, count)),
        "display" if count > 0 => Ok(format!("$display({})", args)),
        "display" => Err(TransformError::MacroArity(name.into(), 1, count)),
        _ => Err(TransformError::UnknownMacro(name.into())),
    }
}

/// Finds the token which closes the group opened at `open`, along with the
/// number of commas directly inside that group.
pub fn close_group(tokens: &[Token], open: usize) -> Option<(usize, usize)> {
    let mut depth = 0;
    let mut commas = 0;
    for (idx, token) in tokens.iter().enumerate().skip(open) {
        match token.sym {
            Lex::LParen | Lex::LBracket | Lex::LBrace => depth += 1,
            Lex::RParen | Lex::RBracket | Lex::RBrace => {
                depth -= 1;
                if depth == 0 {
                    return Some((idx, commas));
                }
            }
            Lex::Comma if depth == 1 => commas += 1,
            _ => (),
        }
    }
    None
}

/// The length of the identifier that starts `text`, or 0.
pub fn identifier_len(text: &str) -> usize {
    let mut chars = text.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_alphabetic() || c == '_' => chars
            .find(|(_, c)| !is_identifier_char(*c))
            .map_or(text.len(), |(idx, _)| idx),
        _ => 0,
    }
}

/// True if all of `text` is one identifier.
pub fn is_identifier(text: &str) -> bool {
    !text.is_empty() && identifier_len(text) == text.len()
}
