#[cfg(test)]
mod tests {
    use crate::compiler::{
        preprocessor::{evaluate, EvalError, Preprocessor, PreprocessorError, Value},
        semantics::SymbolTable,
    };

    fn process(source: &str) -> Result<String, PreprocessorError> {
        let mut symbols = SymbolTable::new();
        Preprocessor::new(&mut symbols)
            .process(source)
            .map_err(|e| e.into_inner())
    }

    #[test]
    fn test_evaluate_integers() {
        let symbols = SymbolTable::new();
        let cases = vec![
            ("1 + 2 * 3", 7),
            ("(1 + 2) * 3", 9),
            ("2 ** 3 ** 2", 512),
            ("-2 ** 2", -4),
            ("7 / 2", 3),
            ("-7 / 2", -4),
            ("-7 % 3", 2),
            ("1 << 4", 16),
            ("0x1F + 0b11", 34),
            ("1_000 - 1", 999),
            ("len([1, 2, 3])", 3),
            ("len(\"abcd\")", 4),
        ];

        for (text, expected) in cases {
            assert_eq!(evaluate(text, &symbols), Ok(Value::Int(expected)), "{}", text);
        }
    }

    #[test]
    fn test_evaluate_sequences() {
        let symbols = SymbolTable::new();
        let seq = |items: &[i64]| Value::Seq(items.iter().map(|i| Value::Int(*i)).collect());
        let cases = vec![
            ("range(3)", seq(&[0, 1, 2])),
            ("range(2, 5)", seq(&[2, 3, 4])),
            ("range(6, 0, -2)", seq(&[6, 4, 2])),
            ("0..3", seq(&[0, 1, 2])),
            ("1..=3", seq(&[1, 2, 3])),
            ("[0, 1] + [2]", seq(&[0, 1, 2])),
            ("[]", seq(&[])),
        ];

        for (text, expected) in cases {
            assert_eq!(evaluate(text, &symbols), Ok(expected), "{}", text);
        }
    }

    #[test]
    fn test_evaluate_errors() {
        let symbols = SymbolTable::new();
        let cases = vec![
            ("1 / 0", EvalError::DivisionByZero),
            ("9223372036854775807 + 1", EvalError::Overflow),
            ("1 +", EvalError::UnexpectedEnd),
            ("1 2", EvalError::TrailingInput("2".into())),
            ("N + 1", EvalError::UndefinedConstant("N".into())),
            ("\"a\" - 1", EvalError::TypeMismatch("-", "string", "integer")),
            ("foo(1)", EvalError::UnknownFunction("foo".into())),
            ("range()", EvalError::WrongArgCount("range", 0)),
            ("range(0, 4, 0)", EvalError::InvalidRange),
            ("@", EvalError::UnexpectedChar('@')),
        ];

        for (text, expected) in cases {
            assert_eq!(evaluate(text, &symbols), Err(expected), "{}", text);
        }
    }

    #[test]
    fn test_evaluate_constants() {
        let mut symbols = SymbolTable::new();
        symbols.define_constant("W", "8");
        symbols.define_constant("NAME", "counter");
        symbols.define_constant("BITS", "[1, 2]");

        assert_eq!(evaluate("W * 2", &symbols), Ok(Value::Int(16)));
        assert_eq!(
            evaluate("NAME + \"_r\"", &symbols),
            Ok(Value::Str("counter_r".into()))
        );
        assert_eq!(evaluate("len(BITS)", &symbols), Ok(Value::Int(2)));
    }

    #[test]
    fn test_self_referencing_constant_terminates() {
        let mut symbols = SymbolTable::new();
        symbols.define_constant("A", "A");
        assert_eq!(evaluate("A", &symbols), Ok(Value::Str("A".into())));
    }

    #[test]
    fn test_literal_constant() {
        let source = "%%W = 8\nreg#%%W% count = 0";
        assert_eq!(process(source), Ok("reg#8 count = 0".into()));
    }

    #[test]
    fn test_reference_forms() {
        let source = "%%W = 8\n%=H = %%W / 2\na %%W b %=H c %%W%d";
        assert_eq!(process(source), Ok("a 8 b 4 c 8d".into()));
    }

    #[test]
    fn test_evaluated_constant() {
        let mut symbols = SymbolTable::new();
        let out = Preprocessor::new(&mut symbols)
            .process("%%W = 8\n%=MAX = (1 << %%W) - 1\n%=IDX = range(2)\nx")
            .unwrap();
        assert_eq!(out, "x");
        assert_eq!(symbols.constant("W"), Some("8"));
        assert_eq!(symbols.constant("MAX"), Some("255"));
        assert_eq!(symbols.constant("IDX"), Some("[0, 1]"));
    }

    #[test]
    fn test_literal_is_not_evaluated() {
        let mut symbols = SymbolTable::new();
        Preprocessor::new(&mut symbols)
            .process("%%SUM = 1 + 2")
            .unwrap();
        assert_eq!(symbols.constant("SUM"), Some("1 + 2"));
    }

    #[test]
    fn test_comparison_is_not_a_definition() {
        let source = "%%W = 8\nx = %%W == 8";
        assert_eq!(process(source), Ok("x = 8 == 8".into()));
    }

    #[test]
    fn test_redefinition_only_affects_later_lines() {
        let source = "%%W = 8\na %%W\n%%W = 16\nb %%W";
        assert_eq!(process(source), Ok("a 8\nb 16".into()));
    }

    #[test]
    fn test_substitution_is_not_rescanned() {
        // `B` is never defined, so a second scan would fail
        let source = "%=A = \"%%\" + \"B\"\nv %%A";
        assert_eq!(process(source), Ok("v %%B".into()));
    }

    #[test]
    fn test_undefined_constant() {
        let mut symbols = SymbolTable::new();
        let e = Preprocessor::new(&mut symbols)
            .process("\nx = %%MISSING")
            .unwrap_err();
        assert_eq!(e.line(), 2);
        assert_eq!(
            e.into_inner(),
            PreprocessorError::UndefinedConstant("MISSING".into())
        );
    }

    #[test]
    fn test_invalid_expression() {
        assert!(matches!(
            process("%=X = 1 +"),
            Err(PreprocessorError::InvalidExpression(EvalError::UnexpectedEnd))
        ));
    }

    #[test]
    fn test_blank_lines() {
        let source = "a\n\n%%W = 1\nb\n%%E = \n%%E\nc";
        assert_eq!(process(source), Ok("a\n\nb\nc".into()));
    }

    #[test]
    fn test_loop_expansion() {
        let source = "%-=i\nwire%i%;\n%-=[0, 1, 2]";
        assert_eq!(process(source), Ok("wire0;\nwire1;\nwire2;".into()));
    }

    #[test]
    fn test_loop_copies_body_per_value() {
        let source = "top\n%-=n\na%n% := b%n%\nc <- %n%\n%-=range(2)\nbottom";
        assert_eq!(
            process(source),
            Ok("top\na0 := b0\nc <- 0\na1 := b1\nc <- 1\nbottom".into())
        );
    }

    #[test]
    fn test_placeholder_before_equals() {
        let source = "%%W = 4\n%-=i\nw%i%=a%i%%%W\n%-=range(2)";
        assert_eq!(process(source), Ok("w0=a04\nw1=a14".into()));
    }

    #[test]
    fn test_loop_over_constant() {
        let source = "%%N = 3\n  %-=k\n  x%k%\n  %-=range(%%N%)";
        assert_eq!(process(source), Ok("x0\n  x1\n  x2".into()));
    }

    #[test]
    fn test_sequential_loops() {
        let source = "%-=i\na%i%\n%-=range(2)\n%-=j\nb%j%\n%-=[\"x\", \"y\"]";
        assert_eq!(process(source), Ok("a0\na1\nbx\nby".into()));
    }

    #[test]
    fn test_empty_sequence_removes_body() {
        let source = "a\n%-=i\nx%i%\n%-=range(0)\nb";
        assert_eq!(process(source), Ok("a\nb".into()));
    }

    #[test]
    fn test_loop_errors() {
        let cases = vec![
            ("%-=i\nx%i%", PreprocessorError::UnmatchedLoopMarker),
            (
                "%-=1i\nx\n%-=range(2)",
                PreprocessorError::InvalidPlaceholder("1i".into()),
            ),
            (
                "%-=i\nx\n%-=4",
                PreprocessorError::NotASequence("4".into()),
            ),
            (
                "%-=i\nx\n%-=range(",
                PreprocessorError::InvalidExpression(EvalError::UnexpectedEnd),
            ),
        ];

        for (source, expected) in cases {
            assert_eq!(process(source), Err(expected), "{}", source);
        }
    }

    #[test]
    fn test_loop_error_line() {
        let mut symbols = SymbolTable::new();
        let e = Preprocessor::new(&mut symbols)
            .process("a\n%-=i\nb\n%-=5")
            .unwrap_err();
        assert_eq!(e.line(), 4);
    }
}
