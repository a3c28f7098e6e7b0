#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::compiler::Session;
    use crate::project::manifest::{Format, Manifest};

    fn manifest_of(source: &str) -> Manifest {
        let mut session = Session::new();
        session.compile(source).expect("Expected a valid program");
        Manifest::extract(session.symbols())
    }

    #[test]
    fn test_extract() {
        let manifest = manifest_of("%%W = 4\nmodule m(clk, #%%W q) {\nreg#%%W r\nq ::= r\n}");

        assert_eq!(manifest.constants().get("W").map(|v| v.as_str()), Some("4"));
        assert_eq!(manifest.modules().len(), 1);

        let module = &manifest.modules()[0];
        assert_eq!(module.name(), "m");
        assert_eq!(module.ports().len(), 2);
        assert_eq!(module.get_register("r").unwrap().width, 4);
    }

    #[test]
    fn test_yaml_read_back() {
        let manifest = manifest_of("%=N = 2 + 3\nmodule a(x) {\nwire#2 w\npar#integer p = 1\n}");

        let mut buf = vec![];
        manifest.write(&mut buf, Format::Yaml).unwrap();
        let read = Manifest::read(buf.as_slice()).unwrap();

        assert_eq!(read, manifest);
        assert_eq!(read.modules()[0].get_parameter("p").unwrap().ty, "integer");
    }

    #[test]
    fn test_json() {
        let manifest = manifest_of("module a(x) {\n}");

        let mut buf = vec![];
        manifest.write(&mut buf, Format::Json).unwrap();
        let json: serde_json::Value = serde_json::from_slice(&buf).unwrap();

        assert_eq!(json["modules"][0]["name"], "a");
        assert_eq!(json["modules"][0]["io"][0]["direction"], "Input");
    }

    #[test]
    fn test_format_from_path() {
        for (path, format) in vec![
            ("out/symbols.json", Format::Json),
            ("symbols.yaml", Format::Yaml),
            ("symbols", Format::Yaml),
        ] {
            assert_eq!(Format::from_path(Path::new(path)), format);
        }
    }
}
