use log::trace;

use super::{
    tokens::{Lex, Span, Token},
    LexerError, LexerResult,
};

/// Dialect operators, longest first so that the greedy match picks `::=`
/// over `:=`.
const DIALECT_OPERATORS: &[&str] = &["::=", ":=", "<-", "->", "<|", "|>"];

/// Target language operators which carry no meaning for the rewrite rules.
const SYMBOLS: &[&str] = &[
    "===", "!==", "<<<", ">>>", "==", "!=", "<=", ">=", "<<", ">>", "&&", "||", "**", "~&", "~|",
    "~^", "^~", "+", "-", "*", "/", "%", "&", "|", "^", "~", "!", "<", ">", ".", "`", "\\",
];

fn dialect_operator(word: &str) -> Lex {
    match word {
        "::=" => Lex::OutputAssign,
        ":=" => Lex::ContinuousAssign,
        "<-" => Lex::LArrow,
        "->" => Lex::RArrow,
        "<|" => Lex::LConcat,
        _ => Lex::RConcat,
    }
}

struct LexerBranch<'a, 'l> {
    lexer: &'a mut Lexer<'l>,
    index: usize,
}

impl<'a, 'l> LexerBranch<'a, 'l> {
    fn from(l: &'a mut Lexer<'l>) -> LexerBranch<'a, 'l> {
        LexerBranch {
            index: l.index,
            lexer: l,
        }
    }

    /// Merges this branch back into it's source Lexer.  Merging as the affect
    /// of accepting the current branch as correct and updating the source lexer
    /// to the match the cursor state of the branch.
    fn merge(mut self) -> Option<(&'l str, Span)> {
        let cut = self.cut();
        if cut.is_some() {
            self.lexer.index = self.index;
        }
        cut
    }

    /// Cuts a string from the current branch from the last
    /// branch or cut point up to where the cursor currently is.
    /// This will NOT update the source.  That must be done with `merge`.
    fn cut(&self) -> Option<(&'l str, Span)> {
        let start = self.lexer.index;
        let stop = self.index;
        if start == stop {
            None
        } else {
            let text: &'l str = self.lexer.text;
            let low = self.lexer.offset(start);
            let high = self.lexer.offset(stop);
            Some((&text[low..high], Span::new(low, high)))
        }
    }

    /// Advances the cursor one character and returns the character that was
    /// pointed to by the cursor before the advance.  Returns None if the cursor
    /// was already at the end of the stream.
    fn next(&mut self) -> Option<char> {
        let c = self.peek();
        if c.is_some() {
            self.index += 1;
        }
        c
    }

    /// Advances the cursor one character, if the next character matches the given
    /// test character.
    fn next_if(&mut self, t: char) -> bool {
        if self.peek_if(t) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    /// Advances the cursor while the next character satisfies `test`.  Returns
    /// the number of characters consumed.
    fn next_while<F: Fn(char) -> bool>(&mut self, test: F) -> usize {
        let start = self.index;
        while self.peek().map_or(false, |c| test(c)) {
            self.index += 1;
        }
        self.index - start
    }

    /// Will advance the cursor if the stream after the cursor starts with the
    /// given test string.  If the remaining stream does not start with the
    /// test string then the cursor is not advanced.
    fn next_if_word(&mut self, t: &str) -> bool {
        if self.peek_ifn(t) {
            self.index += t.chars().count();
            true
        } else {
            false
        }
    }

    /// Returns the character pointed at by the cursor which is the next
    /// character in the stream.
    fn peek(&self) -> Option<char> {
        self.lexer.chars.get(self.index).map(|(_, c)| *c)
    }

    fn peek_if(&self, t: char) -> bool {
        self.peek() == Some(t)
    }

    /// Checks if the character stream from the current cursor starts with
    /// the given test string, without advancing the cursor.
    fn peek_ifn(&self, t: &str) -> bool {
        let low = self.lexer.offset(self.index);
        self.lexer.text[low..].starts_with(t)
    }
}

/// Converts a single line of dialect text into a vector of [`Token`]s whose
/// spans are byte offsets into that line.
pub struct Lexer<'l> {
    text: &'l str,
    chars: Vec<(usize, char)>,
    index: usize,
}

impl<'l> Lexer<'l> {
    pub fn new(text: &'l str) -> Lexer<'l> {
        Lexer {
            text,
            chars: text.char_indices().collect(),
            index: 0,
        }
    }

    fn offset(&self, index: usize) -> usize {
        self.chars
            .get(index)
            .map(|(offset, _)| *offset)
            .unwrap_or_else(|| self.text.len())
    }

    /// Converts the line to a vector of tokens.
    pub fn tokenize(&mut self) -> LexerResult<Vec<Token>> {
        let mut tokens = vec![];

        loop {
            self.consume_whitespace();
            if self.index >= self.chars.len() {
                break;
            }

            let token = self.next_token()?;
            trace!("{}", token);
            tokens.push(token);
        }

        Ok(tokens)
    }

    /// Attempt to parse the token which immediately follows from where the lexer
    /// cursor is currently pointing.  Every character is accepted by at least
    /// `consume_other`, so this always advances.
    fn next_token(&mut self) -> LexerResult<Token> {
        if let Some(t) = self.consume_string_literal()? {
            return Ok(t);
        }

        let token = self
            .consume_macro()
            .or_else(|| self.consume_bit_literal())
            .or_else(|| self.consume_integer())
            .or_else(|| self.consume_identifier())
            .or_else(|| self.consume_operator())
            .unwrap_or_else(|| self.consume_other());
        Ok(token)
    }

    fn consume_whitespace(&mut self) {
        while self.index < self.chars.len() && self.chars[self.index].1.is_whitespace() {
            self.index += 1;
        }
    }

    fn consume_string_literal(&mut self) -> LexerResult<Option<Token>> {
        let mut branch = LexerBranch::from(self);
        if !branch.next_if('"') {
            return Ok(None);
        }

        let mut closed = false;
        while let Some(c) = branch.next() {
            if c == '"' {
                closed = true;
                break;
            }

            // Skip whatever is escaped, the target language shares the escape codes
            if c == '\\' {
                branch.next();
            }
        }

        if !closed {
            return Err(LexerError::UnterminatedString);
        }

        let (s, span) = branch.merge().ok_or(LexerError::UnterminatedString)?;
        let value = s[1..s.len() - 1].to_string();
        Ok(Some(Token::new(Lex::StringLiteral(value), span)))
    }

    fn consume_macro(&mut self) -> Option<Token> {
        let mut branch = LexerBranch::from(self);
        if !branch.next_if_word("%!") {
            return None;
        }

        if !branch.peek().map_or(false, is_identifier_start) {
            return None;
        }
        branch.next_while(is_identifier_char);

        let (s, span) = branch.merge()?;
        Some(Token::new(Lex::Macro(s[2..].into()), span))
    }

    /// A bit literal is an apostrophe followed by a run of `0` and `1`.  An
    /// apostrophe that directly follows an alphanumeric character is the base
    /// separator of an already sized literal (`4'b1010`) and is left alone.
    fn consume_bit_literal(&mut self) -> Option<Token> {
        let sized = self.index > 0 && is_identifier_char(self.chars[self.index - 1].1);
        let mut branch = LexerBranch::from(self);
        if !branch.next_if('\'') {
            return None;
        }

        if sized || branch.next_while(|c| c == '0' || c == '1') == 0 {
            let (_, span) = branch.merge()?;
            return Some(Token::new(Lex::Tick, span));
        }

        let (s, span) = branch.merge()?;
        Some(Token::new(Lex::BitLiteral(s[1..].into()), span))
    }

    fn consume_integer(&mut self) -> Option<Token> {
        let mut branch = LexerBranch::from(self);
        if branch.next_while(|c| c.is_ascii_digit()) == 0 {
            return None;
        }
        branch.next_while(|c| c.is_ascii_digit() || c == '_');

        let (s, span) = branch.merge()?;
        Some(Token::new(Lex::Integer(s.into()), span))
    }

    fn consume_identifier(&mut self) -> Option<Token> {
        let mut branch = LexerBranch::from(self);
        if !branch.peek().map_or(false, is_identifier_start) {
            return None;
        }
        branch.next_while(is_identifier_char);

        let (s, span) = branch.merge()?;
        Some(Token::new(Lex::Identifier(s.into()), span))
    }

    fn consume_operator(&mut self) -> Option<Token> {
        let mut branch = LexerBranch::from(self);
        for word in DIALECT_OPERATORS {
            if branch.next_if_word(word) {
                let (_, span) = branch.merge()?;
                return Some(Token::new(dialect_operator(word), span));
            }
        }

        let single = match branch.peek()? {
            '(' => Some(Lex::LParen),
            ')' => Some(Lex::RParen),
            '#' => Some(Lex::Hash),
            '{' => Some(Lex::LBrace),
            '}' => Some(Lex::RBrace),
            '[' => Some(Lex::LBracket),
            ']' => Some(Lex::RBracket),
            ':' => Some(Lex::Colon),
            ';' => Some(Lex::Semicolon),
            ',' => Some(Lex::Comma),
            '@' => Some(Lex::At),
            '?' => Some(Lex::Question),
            _ => None,
        };

        // `=` is only the blocking assignment when it is not the start of `==`
        // or `===`, which are matched from `SYMBOLS`.
        let single = single.or_else(|| {
            if branch.peek_if('=') && !branch.peek_ifn("==") {
                Some(Lex::Eq)
            } else {
                None
            }
        });

        if let Some(lex) = single {
            branch.next();
            let (_, span) = branch.merge()?;
            return Some(Token::new(lex, span));
        }

        for word in SYMBOLS {
            if branch.next_if_word(word) {
                let (_, span) = branch.merge()?;
                return Some(Token::new(Lex::Operator(*word), span));
            }
        }

        None
    }

    fn consume_other(&mut self) -> Token {
        let (offset, c) = self.chars[self.index];
        self.index += 1;
        Token::new(Lex::Other(c), Span::new(offset, offset + c.len_utf8()))
    }
}

pub fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

pub fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

/// Checks that `text` begins with `keyword` as a whole word.
pub fn starts_with_keyword(text: &str, keyword: &str) -> bool {
    text.starts_with(keyword)
        && !text[keyword.len()..]
            .chars()
            .next()
            .map_or(false, is_identifier_char)
}
