#[cfg(test)]
mod tests {
    use crate::compiler::lexer::{
        tokenize,
        tokens::{Lex, Span},
        LexerError,
    };
    use Lex::*;

    fn lex(text: &str) -> Vec<Lex> {
        tokenize(text)
            .expect("Expected valid tokens")
            .into_iter()
            .map(|t| t.sym)
            .collect()
    }

    #[test]
    fn test_identifier() {
        for text in ["x", "count", "x_5", "$display"].iter() {
            let tokens = lex(text);
            assert_eq!(tokens, vec![Identifier((*text).into())]);
        }
    }

    #[test]
    fn test_integer() {
        assert_eq!(lex("42"), vec![Integer("42".into())]);
        assert_eq!(lex("1_000"), vec![Integer("1_000".into())]);
    }

    #[test]
    fn test_dialect_operators() {
        let cases = vec![
            ("::=", OutputAssign),
            (":=", ContinuousAssign),
            ("<-", LArrow),
            ("->", RArrow),
            ("<|", LConcat),
            ("|>", RConcat),
            ("=", Eq),
            (":", Colon),
            ("#", Hash),
            ("@", At),
        ];
        for (text, expected) in cases {
            assert_eq!(lex(text), vec![expected], "{}", text);
        }
    }

    #[test]
    fn test_comparisons_are_not_assignments() {
        for text in ["==", "===", "<=", ">=", "!="].iter() {
            let tokens = lex(text);
            assert_eq!(tokens.len(), 1, "{}", text);
            assert!(matches!(tokens[0], Operator(_)), "{}", text);
        }
    }

    #[test]
    fn test_assignment_line() {
        let tokens = lex("count <- count + 1;");
        assert_eq!(
            tokens,
            vec![
                Identifier("count".into()),
                LArrow,
                Identifier("count".into()),
                Operator("+"),
                Integer("1".into()),
                Semicolon
            ]
        );
    }

    #[test]
    fn test_bit_literal() {
        assert_eq!(lex("'0101"), vec![BitLiteral("0101".into())]);
        assert_eq!(
            lex("x == '1"),
            vec![
                Identifier("x".into()),
                Operator("=="),
                BitLiteral("1".into())
            ]
        );
    }

    #[test]
    fn test_sized_literal_is_not_bit_literal() {
        assert_eq!(
            lex("4'b1010"),
            vec![Integer("4".into()), Tick, Identifier("b1010".into())]
        );
        assert_eq!(
            lex("4'1010"),
            vec![Integer("4".into()), Tick, Integer("1010".into())]
        );
    }

    #[test]
    fn test_macro() {
        assert_eq!(
            lex("%!sleep(10)"),
            vec![
                Macro("sleep".into()),
                LParen,
                Integer("10".into()),
                RParen
            ]
        );
    }

    #[test]
    fn test_string_literal() {
        assert_eq!(
            lex("\"a {b} \\\" c\""),
            vec![StringLiteral("a {b} \\\" c".into())]
        );
    }

    #[test]
    fn test_unterminated_string() {
        assert_eq!(tokenize("\"abc"), Err(LexerError::UnterminatedString));
    }

    #[test]
    fn test_spans_are_byte_offsets() {
        let tokens = tokenize("  reg#8 x").unwrap();
        let spans: Vec<Span> = tokens.iter().map(|t| t.span).collect();
        assert_eq!(
            spans,
            vec![
                Span::new(2, 5),
                Span::new(5, 6),
                Span::new(6, 7),
                Span::new(8, 9)
            ]
        );
    }

    #[test]
    fn test_unknown_characters_are_kept() {
        let tokens = tokenize("a ¬ b").unwrap();
        assert_eq!(tokens[1].sym, Other('¬'));
        assert_eq!(tokens[1].span, Span::new(2, 4));
    }
}
