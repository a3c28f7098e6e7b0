#[cfg(test)]
mod tests {
    use crate::compiler::semantics::{
        infer_direction, Classification, Direction, SemanticError, SymbolTable,
    };

    fn table_with_module() -> SymbolTable {
        let mut table = SymbolTable::new();
        table.define_constant("W", "8");
        table.declare_module("counter").unwrap();
        table.declare_port("clk", 1, Direction::Input).unwrap();
        table.declare_wire("carry", 1).unwrap();
        table.declare_register("count", 8).unwrap();
        table.declare_parameter("MAX", "integer").unwrap();
        table
    }

    #[test]
    fn test_classify() {
        let table = table_with_module();
        let cases = vec![
            ("W", Classification::Constant),
            ("counter", Classification::Module),
            ("clk", Classification::Wire(1)),
            ("carry", Classification::Wire(1)),
            ("count", Classification::Register(8)),
            ("MAX", Classification::Parameter("integer".into())),
            ("nothing", Classification::Undefined),
        ];

        for (name, expected) in cases {
            assert_eq!(table.classify(name), expected, "{}", name);
        }
    }

    #[test]
    fn test_constant_shadows_local_declaration() {
        let mut table = SymbolTable::new();
        table.declare_module("m").unwrap();
        table.declare_register("x", 4).unwrap();
        table.define_constant("x", "1");
        assert_eq!(table.classify("x"), Classification::Constant);
    }

    #[test]
    fn test_redefine_constant() {
        let mut table = SymbolTable::new();
        table.define_constant("W", "8");
        table.define_constant("W", "16");
        assert_eq!(table.constant("W"), Some("16"));
    }

    #[test]
    fn test_collision_in_module() {
        let kinds: Vec<fn(&mut SymbolTable, &str) -> Result<(), SemanticError>> = vec![
            |t, n| t.declare_port(n, 1, Direction::Input),
            |t, n| t.declare_wire(n, 1),
            |t, n| t.declare_register(n, 1),
            |t, n| t.declare_parameter(n, "integer"),
        ];

        for first in &kinds {
            for second in &kinds {
                let mut table = SymbolTable::new();
                table.declare_module("m").unwrap();
                first(&mut table, "x").unwrap();
                assert_eq!(
                    second(&mut table, "x"),
                    Err(SemanticError::NameCollision("x".into()))
                );
            }
        }
    }

    #[test]
    fn test_collision_with_globals() {
        let mut table = table_with_module();
        assert_eq!(
            table.declare_wire("W", 1),
            Err(SemanticError::NameCollision("W".into()))
        );
        assert_eq!(
            table.declare_register("counter", 1),
            Err(SemanticError::NameCollision("counter".into()))
        );
        assert_eq!(
            table.declare_module("counter").map(|m| m.name().to_string()),
            Err(SemanticError::NameCollision("counter".into()))
        );
        assert_eq!(
            table.declare_module("W").map(|m| m.name().to_string()),
            Err(SemanticError::NameCollision("W".into()))
        );
    }

    #[test]
    fn test_declare_outside_module() {
        let mut table = SymbolTable::new();
        assert_eq!(
            table.declare_wire("x", 1),
            Err(SemanticError::OutsideModule("x".into()))
        );
        assert_eq!(table.classify("x"), Classification::Undefined);
    }

    #[test]
    fn test_new_module_becomes_active() {
        let mut table = table_with_module();
        table.declare_module("other").unwrap();
        assert_eq!(table.active_module().map(|m| m.name()), Some("other"));
        assert_eq!(table.classify("count"), Classification::Undefined);

        // The same local name may be reused in a different module
        table.declare_wire("count", 2).unwrap();
        assert_eq!(table.classify("count"), Classification::Wire(2));
        assert_eq!(table.modules().len(), 2);
        assert_eq!(table.modules()[0].registers()[0].name, "count");
    }

    #[test]
    fn test_declaration_order_is_preserved() {
        let mut table = SymbolTable::new();
        table.declare_module("m").unwrap();
        for name in ["z", "a", "m2", "b"].iter() {
            table.declare_port(name, 1, Direction::Input).unwrap();
        }
        let names: Vec<_> = table.modules()[0]
            .ports()
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["z", "a", "m2", "b"]);
    }

    #[test]
    fn test_infer_direction() {
        let source = "module blink(clk, led, data,\n) {\n  led ::= clk\n  data[3] ::= clk\n}\n";
        let cases = vec![
            ("clk", Direction::Input),
            ("led", Direction::Output),
            ("data", Direction::Output),
        ];
        for (name, expected) in cases {
            assert_eq!(infer_direction(name, source, 0), expected, "{}", name);
        }
    }

    #[test]
    fn test_infer_direction_requires_whole_word() {
        let source = "module m(led) {\n  my_led ::= 1\n  led2 ::= 1\n  led := 1\n}\n";
        assert_eq!(infer_direction("led", source, 0), Direction::Input);
    }

    #[test]
    fn test_infer_direction_is_limited_to_module() {
        let source = "\
module a(led) {
  x := led
}
module b(led) {
  led ::= 1
}
module c(led) {
  y := led
}";
        let b = source.find("module b").unwrap();
        let c = source.find("module c").unwrap();
        assert_eq!(infer_direction("led", source, 0), Direction::Input);
        assert_eq!(infer_direction("led", source, b), Direction::Output);
        assert_eq!(infer_direction("led", source, c), Direction::Input);
    }
}
