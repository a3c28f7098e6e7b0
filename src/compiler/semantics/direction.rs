use log::trace;

use crate::compiler::lexer::lexer::{is_identifier_char, starts_with_keyword};

use super::Direction;

/// Infer whether the port `name` is an input or an output of the module whose
/// header begins at byte offset `module_start` of `source`.
///
/// A port is an output when, somewhere in the text of its module, it is the
/// target of an output assignment: `name ::= ...` or `name[..] ::= ...`.  The
/// text of a module runs from its header to the next line which begins with
/// the `module` keyword.
pub fn infer_direction(name: &str, source: &str, module_start: usize) -> Direction {
    let start = module_start.min(source.len());
    let window = &source[start..module_end(source, start)];

    let mut from = 0;
    while let Some(idx) = window[from..].find(name) {
        let low = from + idx;
        let high = low + name.len();
        if is_driven_at(window, low, high) {
            trace!("{} is driven at offset {}", name, start + low);
            return Direction::Output;
        }
        from = high;
    }

    Direction::Input
}

/// Byte offset of the first line after the header line at `start` that opens
/// another module, or the end of `source`.
fn module_end(source: &str, start: usize) -> usize {
    let mut offset = match source[start..].find('\n') {
        Some(nl) => start + nl + 1,
        None => return source.len(),
    };

    for line in source[offset..].split_inclusive('\n') {
        if starts_with_keyword(line.trim_start(), "module") {
            return offset;
        }
        offset += line.len();
    }

    source.len()
}

/// Checks that the occurrence of a name at `low..high` is a whole word which
/// is followed by an optional bit select and then `::=`.
fn is_driven_at(text: &str, low: usize, high: usize) -> bool {
    let before = text[..low].chars().next_back();
    if before.map_or(false, |c| !c.is_whitespace()) {
        return false;
    }

    let mut rest = &text[high..];
    if rest.chars().next().map_or(false, is_identifier_char) {
        return false;
    }

    rest = rest.trim_start();
    if rest.starts_with('[') {
        match rest.find(']') {
            Some(close) => rest = rest[close + 1..].trim_start(),
            None => return false,
        }
    }

    rest.starts_with("::=")
}
