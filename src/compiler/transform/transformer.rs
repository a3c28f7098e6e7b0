use log::{debug, trace};

use crate::compiler::{
    lexer::{lexer::starts_with_keyword, tokenize, Lex, Span},
    semantics::{infer_direction, Direction, SemanticError, SymbolTable},
    CompilerError,
};

use super::{
    assign::rewrite_assignment,
    context::{ContextStack, Frame},
    rules::{
        annotate_bit_literals, annotate_widths, expand_macros, identifier_len, is_identifier,
        map_concatenations, matching_paren, needs_terminator, opens_block_comment, pad,
        parse_width, splice, split_comment, split_on,
    },
    TransformError, TransformResult,
};

/// A line holding only this toggles raw passthrough
const PASSTHROUGH: &str = "%-%";

type RuleResult<T> = std::result::Result<T, TransformError>;

/**
 Rewrites preprocessed dialect source into Verilog one line at a time.

 The transformer is given the whole preprocessed source up front, because
 the direction of a port depends on how it is used later in its module, and
 because a port list needs to know if the next line closes it.  Lines must
 then be passed to [`Transformer::transform_line`] in order, and
 [`Transformer::finish`] called after the last line.

 Declarations are registered in the borrowed [`SymbolTable`] as they are
 reached, so a name can only be used on lines after the one declaring it.
*/
pub struct Transformer<'s> {
    symbols: &'s mut SymbolTable,
    source: String,
    line_starts: Vec<usize>,

    /// Index of the next line to transform
    line: usize,
    context: ContextStack,
    in_header: bool,
    in_comment: bool,
    in_passthrough: bool,

    /// Byte offset of the active module's header line
    module_start: usize,
}

impl<'s> Transformer<'s> {
    pub fn new(symbols: &'s mut SymbolTable, source: &str) -> Transformer<'s> {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(idx, _)| idx + 1))
            .collect();

        Transformer {
            symbols,
            source: source.into(),
            line_starts,
            line: 0,
            context: ContextStack::new(),
            in_header: false,
            in_comment: false,
            in_passthrough: false,
            module_start: 0,
        }
    }

    /// Transform every line of the source this transformer was created with.
    pub fn transform(&mut self) -> TransformResult<String> {
        let source = self.source.clone();
        let mut lines = vec![];
        for line in source.lines() {
            lines.push(self.transform_line(line)?);
        }
        self.finish()?;

        let mut out = lines.join("\n");
        if !out.is_empty() {
            out.push('\n');
        }
        Ok(out)
    }

    /// Transform the next line of the source.
    pub fn transform_line(&mut self, line: &str) -> TransformResult<String> {
        let idx = self.line;
        self.line += 1;

        let out = self
            .rewrite_line(line, idx)
            .map_err(|e| CompilerError::new(idx as u32 + 1, e))?;
        trace!("L{}: {}", idx + 1, out);
        Ok(out)
    }

    /// Checks that nothing is left open once every line has been transformed.
    pub fn finish(&self) -> TransformResult<()> {
        let unterminated = if self.in_header {
            Some("module header".to_string())
        } else if self.in_comment {
            Some("block comment".into())
        } else if self.in_passthrough {
            Some("passthrough region".into())
        } else if let Some(frame) = self.context.innermost() {
            Some(format!("{} block", frame))
        } else {
            self.context
                .armed()
                .map(|frame| format!("{} header with no body", frame))
        };

        match unterminated {
            Some(what) => err!(self.line as u32, TransformError::Unterminated(what)),
            None => Ok(()),
        }
    }

    /// The number of brace delimited blocks which are currently open.
    pub fn depth(&self) -> usize {
        self.context.depth()
    }

    fn rewrite_line(&mut self, line: &str, idx: usize) -> RuleResult<String> {
        if self.in_comment {
            let close = match line.find("*/") {
                Some(close) => close + 2,
                None => return Ok(line.into()),
            };
            self.in_comment = false;

            // Code after the end of the comment is rewritten as usual
            let (comment, rest) = line.split_at(close);
            return Ok(format!("{}{}", comment, self.rewrite_text(rest, idx)?));
        }

        if line.trim() == PASSTHROUGH {
            self.in_passthrough = !self.in_passthrough;
            debug!("Passthrough {}", if self.in_passthrough { "on" } else { "off" });
            return Ok(String::new());
        }

        if self.in_passthrough {
            return Ok(line.into());
        }

        self.rewrite_text(line, idx)
    }

    /// Rewrites the code of a line that is outside of any comment or
    /// passthrough region, keeping its indentation and trailing comment.
    fn rewrite_text(&mut self, line: &str, idx: usize) -> RuleResult<String> {
        let (code, comment) = split_comment(line);
        let body = code.trim();
        let out = if body.is_empty() {
            line.into()
        } else {
            let indent = &code[..code.len() - code.trim_start().len()];
            let gap = &code[indent.len() + body.len()..];
            format!(
                "{}{}{}{}",
                indent,
                self.rewrite_code(body, idx)?,
                gap,
                comment
            )
        };

        if opens_block_comment(comment) {
            self.in_comment = true;
        }

        Ok(out)
    }

    /// Runs the rewrite rules over the code part of a line, with the
    /// surrounding whitespace and any trailing comment already removed.
    fn rewrite_code(&mut self, body: &str, idx: usize) -> RuleResult<String> {
        let terminate = needs_terminator(body, self.in_header);

        let mut code = if starts_with_keyword(body, "match") {
            self.rewrite_match(body)?
        } else if starts_with_keyword(body, "par") {
            format!("parameter{}", &body["par".len()..])
        } else if starts_with_keyword(body, "module") {
            self.rewrite_module_header(body, idx)?
        } else if self.in_header {
            self.rewrite_header_line(body, idx)?
        } else {
            body.into()
        };

        let is_on = starts_with_keyword(&code, "on");
        if is_on {
            self.arm_on(&code)?;
        }

        code = annotate_bit_literals(&code)?;
        code = self.map_braces(&code)?;
        code = map_concatenations(&code)?;
        code = rewrite_assignment(&code, self.symbols)?;
        code = annotate_widths(&code)?;
        if is_on {
            code = self.rewrite_on(&code)?;
        }
        code = expand_macros(&code)?;

        if terminate {
            code.push(';');
        }
        Ok(code)
    }

    /// `match x {` becomes `case (x)` and arms a match frame.
    fn rewrite_match(&mut self, code: &str) -> RuleResult<String> {
        if !self.context.in_module() {
            return Err(TransformError::Malformed(
                "match must be inside of a module".into(),
            ));
        }

        let rest = code["match".len()..].trim();
        let (subject, brace) = match rest.strip_suffix('{') {
            Some(subject) => (subject.trim(), " {"),
            None => (rest, ""),
        };
        if subject.is_empty() {
            return Err(TransformError::Malformed("match has no subject".into()));
        }

        self.context.arm(Frame::Match);
        let wrapped = subject.starts_with('(') && matching_paren(subject) == Some(subject.len() - 1);
        Ok(if wrapped {
            format!("case {}{}", subject, brace)
        } else {
            format!("case ({}){}", subject, brace)
        })
    }

    /// Registers the module named on a header line and rewrites any ports
    /// that are on the same line.
    fn rewrite_module_header(&mut self, code: &str, idx: usize) -> RuleResult<String> {
        if self.in_header || self.context.in_module() || self.context.armed() == Some(Frame::Module)
        {
            return Err(TransformError::Malformed("modules cannot be nested".into()));
        }

        let rest = code["module".len()..].trim_start();
        let len = identifier_len(rest);
        if len == 0 {
            return Err(TransformError::Malformed("module has no name".into()));
        }

        self.symbols.declare_module(&rest[..len])?;
        self.module_start = self
            .line_starts
            .get(idx)
            .copied()
            .unwrap_or_else(|| self.source.len());
        self.context.arm(Frame::Module);

        let after = rest[len..].trim_start();
        if !after.starts_with('(') {
            return Ok(code.into());
        }

        let open = code.len() - after.len();
        let list = &code[open + 1..];
        match list.find(')') {
            Some(close) => {
                let ports = self.rewrite_ports(&list[..close], true, idx)?;
                Ok(format!("{}({}{}", &code[..open], ports, &list[close..]))
            }
            None => {
                self.in_header = true;
                let ports = self.rewrite_ports(list, false, idx)?;
                Ok(format!("{}({}", &code[..open], ports))
            }
        }
    }

    /// A line inside of a port list which spans several lines.
    fn rewrite_header_line(&mut self, code: &str, idx: usize) -> RuleResult<String> {
        match code.find(')') {
            Some(close) => {
                self.in_header = false;
                let ports = self.rewrite_ports(&code[..close], true, idx)?;
                Ok(format!("{}{}", ports, &code[close..]))
            }
            None => self.rewrite_ports(code, false, idx),
        }
    }

    /// Rewrites the comma separated ports in `list`.  The trailing comma is
    /// removed from the last port of the module.
    fn rewrite_ports(&mut self, list: &str, closes_here: bool, idx: usize) -> RuleResult<String> {
        let trailing_comma = list.trim_end().ends_with(',');
        let mut ports = vec![];
        for item in list.split(',').map(str::trim).filter(|i| !i.is_empty()) {
            ports.push(self.rewrite_port(item)?);
        }

        let mut out = ports.join(", ");
        let last = closes_here || self.next_line_closes_list(idx);
        if trailing_comma && !last {
            out.push(',');
        }
        Ok(out)
    }

    fn rewrite_port(&mut self, item: &str) -> RuleResult<String> {
        let explicit = match &item[..identifier_len(item)] {
            "input" => Some(Direction::Input),
            "output" => Some(Direction::Output),
            "inout" => Some(Direction::Inout),
            _ => None,
        };

        if let Some(direction) = explicit {
            let (name, width) = explicit_port(item)?;
            self.symbols.declare_port(&name, width, direction)?;
            return Ok(item.into());
        }

        let (width, ranged, name) = match item.strip_prefix('#') {
            Some(rest) => {
                let digits = rest
                    .find(|c: char| !c.is_ascii_digit())
                    .unwrap_or_else(|| rest.len());
                let width = parse_width(&rest[..digits])
                    .ok_or_else(|| TransformError::MissingWidth(item.into()))?;
                (width, true, rest[digits..].trim())
            }
            None => (1, false, item),
        };

        if !is_identifier(name) {
            return Err(TransformError::Malformed(format!("invalid port: {}", item)));
        }

        let direction = infer_direction(name, &self.source, self.module_start);
        self.symbols.declare_port(name, width, direction)?;

        let range = if ranged {
            format!("[{}:0] ", width - 1)
        } else {
            String::new()
        };
        Ok(format!("{} wire {}{}", direction, range, name))
    }

    /// True if the next line of the source with any code on it starts with `)`.
    fn next_line_closes_list(&self, idx: usize) -> bool {
        let rest = self
            .line_starts
            .get(idx + 1)
            .map_or("", |start| &self.source[*start..]);
        rest.lines()
            .find(|l| !split_comment(l).0.trim().is_empty())
            .map_or(false, |l| l.trim_start().starts_with(')'))
    }

    /// Replaces each `{` and `}` with the tokens for the frame it opens or
    /// closes.
    fn map_braces(&mut self, code: &str) -> RuleResult<String> {
        let mut edits = vec![];
        for token in tokenize(code)? {
            match token.sym {
                Lex::LBrace => {
                    let span = token.span;
                    // Module and match braces take the whitespace before them
                    let with_space = Span::new(code[..span.low()].trim_end().len(), span.high());
                    let edit = match self.context.push() {
                        Frame::Module => (with_space, ";".into()),
                        Frame::Match => (with_space, String::new()),
                        Frame::Clocked | Frame::Plain => (span, pad(code, span, "begin")),
                    };
                    edits.push(edit);
                }
                Lex::RBrace => {
                    let frame = self.context.pop().ok_or_else(|| {
                        TransformError::Malformed("} does not close any block".into())
                    })?;
                    edits.push(close_brace(code, token.span, frame));
                }
                _ => (),
            }
        }
        Ok(splice(code, edits))
    }

    /// An `on` line arms a clocked frame when its block opens on this line or
    /// the next.
    fn arm_on(&mut self, code: &str) -> RuleResult<()> {
        if !self.context.in_module() {
            return Err(TransformError::Malformed(
                "on must be inside of a module".into(),
            ));
        }

        let (_, rest) = split_on(code)
            .ok_or_else(|| TransformError::Malformed("on has no trigger".into()))?;
        if rest.is_empty() || rest.starts_with('{') {
            self.context.arm(Frame::Clocked);
        }
        Ok(())
    }

    /// `on (clk@posedge)` becomes `always @(posedge clk)` and `on 10` becomes
    /// `always #10`.
    fn rewrite_on(&self, code: &str) -> RuleResult<String> {
        let (trigger, rest) = split_on(code)
            .ok_or_else(|| TransformError::Malformed("on has no trigger".into()))?;
        let always = self.sensitivity(trigger)?;
        Ok(if rest.is_empty() {
            always
        } else {
            format!("{} {}", always, rest)
        })
    }

    fn sensitivity(&self, trigger: &str) -> RuleResult<String> {
        if !trigger.is_empty() && trigger.chars().all(|c| c.is_ascii_digit()) {
            return Ok(format!("always #{}", trigger));
        }

        let mut events = vec![];
        for item in trigger.split(',').map(str::trim) {
            if item == "*" {
                events.push("*".to_string());
                continue;
            }

            let (signal, edge) = match item.find('@') {
                Some(at) => (item[..at].trim(), Some(item[at + 1..].trim())),
                None => (item, None),
            };

            let base = &signal[..identifier_len(signal)];
            if base.is_empty() {
                return Err(TransformError::Malformed(format!(
                    "invalid signal in trigger: {}",
                    item
                )));
            }
            if !self.symbols.classify(base).is_defined() {
                return Err(SemanticError::UndefinedName(base.into()).into());
            }

            events.push(match edge {
                None => signal.into(),
                Some("posedge") => format!("posedge {}", signal),
                Some("negedge") => format!("negedge {}", signal),
                Some(_) => return Err(TransformError::InvalidEdge(item.into())),
            });
        }

        Ok(format!("always @({})", events.join(" or ")))
    }
}

/// The edit closing `frame` at the `}` in `span`.  A statement in front of the
/// `}` on the same line is terminated before the close token.
fn close_brace(code: &str, span: Span, frame: Frame) -> (Span, String) {
    let before = code[..span.low()].trim_end();
    let opens_block = before.rsplit(char::is_whitespace).next() == Some("begin");
    if before.is_empty() || opens_block || before.ends_with(&[';', '{', '}'][..]) {
        return (span, pad(code, span, frame.close_token()));
    }

    let mut close = format!("; {}", frame.close_token());
    if code[span.high()..]
        .chars()
        .next()
        .map_or(false, |c| !c.is_whitespace())
    {
        close.push(' ');
    }
    (Span::new(before.len(), span.high()), close)
}

/// Finds the name and width of a port that was written with its direction.
/// The width comes from a `#N` annotation or a `[H:L]` range.
fn explicit_port(item: &str) -> RuleResult<(String, u32)> {
    let tokens = tokenize(item)?;
    let mut width = 1;

    for (idx, token) in tokens.iter().enumerate() {
        match token.sym {
            Lex::Hash => {
                width = match tokens.get(idx + 1).and_then(|t| t.sym.get_str()) {
                    Some(digits) => parse_width(digits)
                        .ok_or_else(|| TransformError::MissingWidth(item.into()))?,
                    None => return Err(TransformError::MissingWidth(item.into())),
                };
            }
            Lex::LBracket => {
                let bound = |offset: usize| {
                    tokens
                        .get(idx + offset)
                        .and_then(|t| match &t.sym {
                            Lex::Integer(i) => i.parse::<u32>().ok(),
                            _ => None,
                        })
                };
                if let (Some(high), Some(low)) = (bound(1), bound(3)) {
                    width = high.max(low) - high.min(low) + 1;
                }
            }
            _ => (),
        }
    }

    let name = tokens
        .iter()
        .rev()
        .find_map(|t| match &t.sym {
            Lex::Identifier(name) => Some(name.clone()),
            _ => None,
        })
        .ok_or_else(|| TransformError::Malformed(format!("port has no name: {}", item)))?;

    Ok((name, width))
}
