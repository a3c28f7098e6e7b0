use log::debug;

use crate::compiler::{
    lexer::lexer::{is_identifier_char, is_identifier_start},
    semantics::SymbolTable,
    CompilerError,
};

use super::{eval::evaluate, value::Value, PreprocessorError, PreprocessorResult};

const LITERAL_MARKER: &str = "%%";
const EVALUATED_MARKER: &str = "%=";
const LOOP_MARKER: &str = "%-=";

/// Expands constants and loops in a source file.  Constants are stored in the
/// borrowed [`SymbolTable`] so that later stages can see which names they use.
pub struct Preprocessor<'s> {
    symbols: &'s mut SymbolTable,
}

impl<'s> Preprocessor<'s> {
    pub fn new(symbols: &'s mut SymbolTable) -> Preprocessor<'s> {
        Preprocessor { symbols }
    }

    /// Run both phases over `source` and return the expanded text.
    pub fn process(&mut self, source: &str) -> PreprocessorResult<String> {
        let lines = self.resolve_constants(source)?;
        let lines = self.expand_loops(&lines)?;
        Ok(lines.join("\n").trim().into())
    }

    /// Records and removes every constant definition and substitutes every
    /// constant reference.  Lines which only become blank because of this are
    /// dropped, lines which were blank to begin with are kept.
    pub fn resolve_constants(&mut self, source: &str) -> PreprocessorResult<Vec<String>> {
        let mut lines = vec![];

        for (idx, line) in source.lines().enumerate() {
            let line_no = idx as u32 + 1;
            if line.trim().is_empty() {
                lines.push(line.into());
                continue;
            }

            if let Some((marker, name, rhs)) = parse_definition(line.trim()) {
                self.define(marker, name, rhs)
                    .map_err(|e| CompilerError::new(line_no, e))?;
                continue;
            }

            let substituted = self
                .substitute(line)
                .map_err(|e| CompilerError::new(line_no, e))?;
            if !substituted.trim().is_empty() {
                lines.push(substituted);
            }
        }

        Ok(lines)
    }

    fn define(&mut self, marker: &str, name: &str, rhs: &str) -> Result<(), PreprocessorError> {
        let rhs = self.substitute(rhs)?;
        let rhs = rhs.trim();

        if marker == LITERAL_MARKER {
            self.symbols.define_constant(name, rhs);
        } else {
            let value = evaluate(rhs, self.symbols)?;
            self.symbols.define_constant(name, &value.to_text());
        }

        Ok(())
    }

    /// Replace each constant reference in `line`, from left to right.  The text
    /// that is substituted in is not scanned again.
    fn substitute(&self, line: &str) -> Result<String, PreprocessorError> {
        let mut out = String::with_capacity(line.len());
        let mut rest = line;

        while let Some(idx) = rest.find('%') {
            let candidate = &rest[idx..];
            if candidate.starts_with(LITERAL_MARKER) || candidate.starts_with(EVALUATED_MARKER) {
                let len = identifier_len(&candidate[2..]);
                if len > 0 {
                    let name = &candidate[2..2 + len];
                    let value = self
                        .symbols
                        .constant(name)
                        .ok_or_else(|| PreprocessorError::UndefinedConstant(name.into()))?;

                    out.push_str(&rest[..idx]);
                    out.push_str(value);

                    let mut consumed = 2 + len;
                    if candidate[consumed..].starts_with('%') {
                        consumed += 1;
                    }
                    rest = &candidate[consumed..];
                    continue;
                }
            }

            // A loop placeholder `%name%` is left for the loop phase, so its
            // closing `%` never starts a reference
            let len = identifier_len(&candidate[1..]);
            if len > 0 && candidate[1 + len..].starts_with('%') {
                out.push_str(&rest[..idx + len + 2]);
                rest = &rest[idx + len + 2..];
                continue;
            }

            out.push_str(&rest[..=idx]);
            rest = &rest[idx + 1..];
        }

        out.push_str(rest);
        Ok(out)
    }

    /// Replace every pair of loop markers, and the lines between them, with
    /// one copy of those lines per value of the closing marker's sequence.
    pub fn expand_loops(&mut self, lines: &[String]) -> PreprocessorResult<Vec<String>> {
        let markers: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, l)| l.trim_start().starts_with(LOOP_MARKER))
            .map(|(idx, _)| idx)
            .collect();

        if markers.len() % 2 != 0 {
            let last = markers[markers.len() - 1];
            return err!(last as u32 + 1, PreprocessorError::UnmatchedLoopMarker);
        }

        let mut expanded = vec![];
        let mut next = 0;
        for pair in markers.chunks(2) {
            let (open, close) = (pair[0], pair[1]);
            expanded.extend(lines[next..open].iter().cloned());

            let placeholder = marker_argument(&lines[open]);
            if placeholder.is_empty() || identifier_len(placeholder) != placeholder.len() {
                return err!(
                    open as u32 + 1,
                    PreprocessorError::InvalidPlaceholder(placeholder.into())
                );
            }

            let values = match evaluate(marker_argument(&lines[close]), self.symbols) {
                Ok(Value::Seq(values)) => values,
                Ok(other) => {
                    return err!(
                        close as u32 + 1,
                        PreprocessorError::NotASequence(other.to_string())
                    )
                }
                Err(e) => return err!(close as u32 + 1, PreprocessorError::from(e)),
            };

            debug!(
                "Expanding loop over {} at lines {}-{} with {} values",
                placeholder,
                open + 1,
                close + 1,
                values.len()
            );

            let pattern = format!("%{}%", placeholder);
            let body = &lines[open + 1..close];
            for value in &values {
                let text = value.to_text();
                expanded.extend(body.iter().map(|l| l.replace(&pattern, &text)));
            }

            next = close + 1;
        }
        expanded.extend(lines[next..].iter().cloned());

        Ok(expanded)
    }
}

/// Splits a definition line into its marker, name and right hand side.  A
/// definition is a marker, an identifier, optional spaces and a single `=`.
fn parse_definition(line: &str) -> Option<(&str, &str, &str)> {
    let marker = if line.starts_with(LITERAL_MARKER) {
        LITERAL_MARKER
    } else if line.starts_with(EVALUATED_MARKER) {
        EVALUATED_MARKER
    } else {
        return None;
    };

    let rest = &line[marker.len()..];
    let len = identifier_len(rest);
    if len == 0 {
        return None;
    }

    let name = &rest[..len];
    let rest = rest[len..].trim_start_matches(|c| c == ' ' || c == '\t');
    if !rest.starts_with('=') || rest.starts_with("==") {
        return None;
    }

    Some((marker, name, &rest[1..]))
}

fn marker_argument(line: &str) -> &str {
    line.trim()[LOOP_MARKER.len()..].trim()
}

/// The length, in bytes, of the identifier at the start of `text`.
fn identifier_len(text: &str) -> usize {
    match text.chars().next() {
        Some(c) if is_identifier_start(c) => text
            .char_indices()
            .find(|(_, c)| !is_identifier_char(*c))
            .map_or(text.len(), |(idx, _)| idx),
        _ => 0,
    }
}
