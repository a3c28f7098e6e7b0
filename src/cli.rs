use std::path::{Path, PathBuf};

use clap::{App, Arg, ArgMatches};
use simplelog::{Config, LevelFilter, SimpleLogger};

// Exit Codes for different types of errors
pub const ERR_IO: i32 = 1;
pub const ERR_PREPROCESSOR: i32 = 2;
pub const ERR_TRANSFORM: i32 = 3;
pub const ERR_SYMBOLS_WRITE: i32 = 4;

/// Extension given to the output when no output file is named
pub const VERILOG_FILE_EXT: &str = "v";

/// The stage after which the compiler stops and writes its output.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Stage {
    Preprocess,
    Transform,
}

pub fn print_errs<E: std::fmt::Display>(errs: &[E]) {
    for e in errs {
        eprintln!("{}", e);
    }
}

pub fn configure_cli() -> clap::App<'static, 'static> {
    let app = App::new("Brevlog Compiler")
        .version("0.1.0")
        .author("Erich Ess")
        .about("Compiles brevlog hardware descriptions into Verilog")
        .arg(
            Arg::with_name("input")
                .short("i")
                .long("input")
                .takes_value(true)
                .required(true)
                .help("Source code file to compile"),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .required(false)
                .help("Name the file that the Verilog will be written to.  Defaults to the input file with a .v extension"),
        )
        .arg(
            Arg::with_name("stage")
                .long("stage")
                .possible_values(&["preprocess", "transform"])
                .takes_value(true)
                .help("Stop after the given stage.  When set to preprocess, the expanded source is written instead of Verilog")
        )
        .arg(
            Arg::with_name("symbols")
                .long("symbols")
                .takes_value(true)
                .help("Write every constant and module declared by the source to this file.  The file is JSON if it ends in .json and YAML otherwise")
        )
        .arg(
            Arg::with_name("log-level")
                .long("log-level")
                .possible_values(&["off", "error", "warn", "info", "debug", "trace"])
                .takes_value(true)
                .help("Write log messages at this level and above to the console")
        );
    app
}

pub fn get_input_path<'a>(args: &'a ArgMatches) -> Option<&'a Path> {
    args.value_of("input").map(Path::new)
}

/// The output file, or the input file with its extension replaced.
pub fn get_output_path(args: &ArgMatches) -> Option<PathBuf> {
    match args.value_of("output") {
        Some(output) => Some(PathBuf::from(output)),
        None => get_input_path(args).map(|input| input.with_extension(VERILOG_FILE_EXT)),
    }
}

pub fn get_stage(args: &ArgMatches) -> Result<Option<Stage>, String> {
    match args.value_of("stage") {
        None => Ok(None),
        Some("preprocess") => Ok(Some(Stage::Preprocess)),
        Some("transform") => Ok(Some(Stage::Transform)),
        Some(stage) => Err(format!("Unknown stage: {}", stage)),
    }
}

pub fn get_symbols_path<'a>(args: &'a ArgMatches) -> Option<&'a Path> {
    args.value_of("symbols").map(Path::new)
}

pub fn get_log_level(args: &ArgMatches) -> Option<LevelFilter> {
    match args.value_of("log-level")? {
        "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

/// Send log records at `level` and above to the console.
pub fn configure_logging(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    SimpleLogger::init(level, Config::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matches(args: &[&str]) -> ArgMatches<'static> {
        configure_cli()
            .get_matches_from_safe(args.iter().copied())
            .expect("Expected valid arguments")
    }

    #[test]
    fn test_defaults() {
        let args = matches(&["brevlogc", "-i", "demos/blinky.brv"]);
        assert_eq!(
            get_output_path(&args),
            Some(PathBuf::from("demos/blinky.v"))
        );
        assert_eq!(get_stage(&args), Ok(None));
        assert_eq!(get_symbols_path(&args), None);
        assert_eq!(get_log_level(&args), None);
    }

    #[test]
    fn test_options() {
        let args = matches(&[
            "brevlogc",
            "--input",
            "a.brv",
            "-o",
            "out/a.sv",
            "--stage",
            "preprocess",
            "--symbols",
            "a.json",
            "--log-level",
            "debug",
        ]);
        assert_eq!(get_output_path(&args), Some(PathBuf::from("out/a.sv")));
        assert_eq!(get_stage(&args), Ok(Some(Stage::Preprocess)));
        assert_eq!(get_symbols_path(&args), Some(Path::new("a.json")));
        assert_eq!(get_log_level(&args), Some(LevelFilter::Debug));
    }

    #[test]
    fn test_rejects_unknown_values() {
        for args in vec![
            vec!["brevlogc"],
            vec!["brevlogc", "-i", "a.brv", "--stage", "parse"],
            vec!["brevlogc", "-i", "a.brv", "--log-level", "loud"],
        ] {
            assert!(configure_cli().get_matches_from_safe(args).is_err());
        }
    }
}
