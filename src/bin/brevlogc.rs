extern crate log;
extern crate simplelog;

use std::fs::File;
use std::path::Path;
use std::time::Instant;

use log::info;

use brevlog::compiler::Session;
use brevlog::project::manifest::{Format, Manifest};
use brevlog::*;

fn main() -> Result<(), i32> {
    let config = configure_cli().get_matches();

    if let Some(level) = get_log_level(&config) {
        if let Err(e) = configure_logging(level) {
            eprintln!("Failed to configure logger: {}", e);
        }
    }

    let stop_stage = match get_stage(&config) {
        Ok(stage) => stage,
        Err(msg) => {
            print_errs(&[msg]);
            return Err(ERR_IO);
        }
    };

    let src_path = match get_input_path(&config) {
        Some(path) => path,
        None => {
            print_errs(&["Expected an input source file to compile"]);
            return Err(ERR_IO);
        }
    };
    let output = match get_output_path(&config) {
        Some(path) => path,
        None => {
            print_errs(&["Could not determine where to write the output"]);
            return Err(ERR_IO);
        }
    };

    let source = match std::fs::read_to_string(src_path) {
        Ok(source) => source,
        Err(e) => {
            print_errs(&[format!("Could not read {}: {}", src_path.display(), e)]);
            return Err(ERR_IO);
        }
    };

    let mut session = Session::new();

    let preprocess_time = Instant::now();
    let expanded = match session.preprocess(&source) {
        Ok(expanded) => expanded,
        Err(e) => {
            print_errs(&[e]);
            return Err(ERR_PREPROCESSOR);
        }
    };
    info!("Preprocessor: {}", preprocess_time.elapsed().as_secs_f32());

    let text = if stop_stage == Some(Stage::Preprocess) {
        expanded
    } else {
        let transform_time = Instant::now();
        let verilog = match session.transformer(&expanded).transform() {
            Ok(verilog) => verilog,
            Err(e) => {
                print_errs(&[e]);
                return Err(ERR_TRANSFORM);
            }
        };
        info!("Transform: {}", transform_time.elapsed().as_secs_f32());
        verilog
    };

    if let Err(e) = std::fs::write(&output, text) {
        print_errs(&[format!("Could not write {}: {}", output.display(), e)]);
        return Err(ERR_IO);
    }

    if let Some(path) = get_symbols_path(&config) {
        if let Err(e) = write_symbols(&session, path) {
            print_errs(&[format!("Failed to write symbols file: {}", e)]);
            return Err(ERR_SYMBOLS_WRITE);
        }
    }

    Ok(())
}

fn write_symbols(session: &Session, path: &Path) -> Result<(), String> {
    let manifest = Manifest::extract(session.symbols());
    File::create(path)
        .map_err(|e| format!("{}", e))
        .and_then(|f| {
            manifest
                .write(f, Format::from_path(path))
                .map_err(|e| format!("{}", e))
        })
}
