#[cfg(test)]
mod tests {
    use crate::compiler::{
        compile,
        preprocessor::PreprocessorError,
        semantics::{Classification, Direction, SemanticError},
        transform::TransformError,
        CompileError, Session,
    };

    const BLINKY: &str = include_str!("../../demos/blinky.brv");

    #[test]
    fn test_blinky() {
        let expected = "\
// Rotates a single lit LED across a bank of LEDs

module blinky(
  input wire clk,
  output wire [3:0] leds
);
  reg [7:0] ticks = 0;
  reg [1:0] phase = 0;
  reg [3:0] pattern;

  always @(posedge clk) begin
    ticks <= ticks + 1;
    if (ticks == 8) begin
      ticks <= 0;
      phase <= phase + 1;
    end
  end

  always @(*) begin
    case (phase)
      2'b00: pattern = 4'b0001;
      2'b01: pattern = 4'b0010;
      2'b10: pattern = 4'b0100;
      default: pattern = 4'b1000;
    endcase
  end

  wire [0:0] bit0 = pattern[0];
  wire [0:0] bit1 = pattern[1];
  wire [0:0] bit2 = pattern[2];
  wire [0:0] bit3 = pattern[3];

  assign leds = pattern;
endmodule
";
        assert_eq!(compile(BLINKY), Ok(expected.into()));
    }

    #[test]
    fn test_blinky_symbols() {
        let mut session = Session::new();
        session.compile(BLINKY).expect("Expected blinky to compile");

        let symbols = session.symbols();
        assert_eq!(symbols.constant("WIDTH"), Some("4"));
        assert_eq!(symbols.constant("DIVIDE"), Some("8"));

        let module = symbols.get_module("blinky").unwrap();
        let ports: Vec<_> = module
            .ports()
            .iter()
            .map(|p| (p.name.as_str(), p.width, p.direction))
            .collect();
        assert_eq!(
            ports,
            vec![("clk", 1, Direction::Input), ("leds", 4, Direction::Output)]
        );

        let registers: Vec<_> = module.registers().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(registers, vec!["ticks", "phase", "pattern"]);

        let wires: Vec<_> = module.wires().iter().map(|w| w.name.as_str()).collect();
        assert_eq!(wires, vec!["bit0", "bit1", "bit2", "bit3"]);
        assert_eq!(symbols.classify("pattern"), Classification::Register(4));
    }

    #[test]
    fn test_stages_separately() {
        let source = "\
%%W = 2
module m(a) {
%-=i
  reg#%%W r%i%
%-=range(2)
}";
        let mut session = Session::new();
        let expanded = session.preprocess(source).unwrap();
        assert_eq!(expanded, "module m(a) {\n  reg#2 r0\n  reg#2 r1\n}");

        let mut transformer = session.transformer(&expanded);
        let mut lines = vec![];
        for line in expanded.lines() {
            lines.push(transformer.transform_line(line).unwrap());
        }
        transformer.finish().unwrap();
        assert_eq!(
            lines,
            vec![
                "module m(input wire a);",
                "  reg [1:0] r0;",
                "  reg [1:0] r1;",
                "endmodule"
            ]
        );
        assert_eq!(session.symbols().classify("r1"), Classification::Register(2));
    }

    #[test]
    fn test_scenarios() {
        for (source, expected) in vec![
            (
                "%%W = 8\nmodule m {\nreg#%%W% count = 0\n}",
                "module m;\nreg [7:0] count = 0;\nendmodule\n",
            ),
            (
                "module m {\nreg#4 count\ncount + 1 -> count\n}",
                "module m;\nreg [3:0] count;\ncount <= count + 1;\nendmodule\n",
            ),
            (
                "module m {\n%-=i\nwire%i%\n%-=[0, 1, 2]\n}",
                "module m;\nwire0;\nwire1;\nwire2;\nendmodule\n",
            ),
            (
                "module m(led) {\nreg#1 toggle\nled ::= toggle\n}",
                "module m(output wire led);\nreg [0:0] toggle;\nassign led = toggle;\nendmodule\n",
            ),
            (
                "module m(clk) {\nreg#8 count\non (clk@posedge) { count <- count + 1 }\n}",
                "module m(input wire clk);\nreg [7:0] count;\nalways @(posedge clk) begin count <= count + 1; end\nendmodule\n",
            ),
        ] {
            assert_eq!(compile(source), Ok(expected.into()), "{}", source);
        }
    }

    #[test]
    fn test_errors_carry_stage_and_line() {
        let err = compile("module m {\n%%MISSING\n}").unwrap_err();
        assert_eq!(err.line(), 2);
        match err {
            CompileError::Preprocessor(e) => assert_eq!(
                e.into_inner(),
                PreprocessorError::UndefinedConstant("MISSING".into())
            ),
            e => panic!("Expected a preprocessor error, got {}", e),
        }

        let err = compile("module m {\nreg#1 led\n\nled := 1\n}").unwrap_err();
        assert_eq!(err.line(), 4);
        match err {
            CompileError::Transform(e) => assert_eq!(
                e.into_inner(),
                TransformError::Semantic(SemanticError::WrongKind(
                    "led".into(),
                    Classification::Register(1)
                ))
            ),
            e => panic!("Expected a transform error, got {}", e),
        }
    }

    #[test]
    fn test_error_display() {
        let err = compile("module m {\nx <- 1\n}").unwrap_err();
        assert_eq!(format!("{}", err), "Transform: L2: x is not defined");
    }
}
