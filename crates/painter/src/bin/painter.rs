//! # Painter
//!
//! Runs a drawing script and writes the final window image as PNG.
//!
//! ## Usage
//!
//! ```bash
//! painter --output out.png script.txt
//! echo "green\nfigure 0.5 0.5\nupdate" | painter --lenient
//! ```

use std::fs::File;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use painter_core::{PainterConfig, PainterResult};
use painter::{logging, session, ParseMode, PngSurface};

struct Options {
    config: Option<PathBuf>,
    output: PathBuf,
    mode: ParseMode,
    script: Option<PathBuf>,
}

enum Parsed {
    Run(Options),
    Help,
}

fn print_usage() {
    println!("Usage: painter [OPTIONS] [SCRIPT]");
    println!();
    println!("Reads commands from SCRIPT (or stdin), one per line:");
    println!("  white | green | reset | update");
    println!("  bgrect X1 Y1 X2 Y2 | figure X Y | move X Y");
    println!();
    println!("Options:");
    println!("  -c, --config <FILE>    TOML configuration file");
    println!("  -o, --output <FILE>    PNG to write (default: painter.png)");
    println!("  -l, --lenient          Skip bad lines instead of failing");
    println!("  -h, --help             Show this help");
}

fn parse_args(args: &[String]) -> Result<Parsed, String> {
    let mut options = Options {
        config: None,
        output: PathBuf::from("painter.png"),
        mode: ParseMode::Strict,
        script: None,
    };

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                i += 1;
                let value = args.get(i).ok_or("--config needs a file")?;
                options.config = Some(PathBuf::from(value));
            }
            "--output" | "-o" => {
                i += 1;
                let value = args.get(i).ok_or("--output needs a file")?;
                options.output = PathBuf::from(value);
            }
            "--lenient" | "-l" => options.mode = ParseMode::Lenient,
            "--help" | "-h" => return Ok(Parsed::Help),
            flag if flag.starts_with('-') && flag != "-" => {
                return Err(format!("unknown option {flag}"));
            }
            path => {
                if options.script.is_some() {
                    return Err("only one script may be given".to_string());
                }
                if path != "-" {
                    options.script = Some(PathBuf::from(path));
                }
            }
        }
        i += 1;
    }
    Ok(Parsed::Run(options))
}

fn execute(options: &Options) -> PainterResult<()> {
    let config = match &options.config {
        Some(path) => PainterConfig::from_file(path)?,
        None => PainterConfig::default(),
    };
    logging::init(&config.log_level);

    let script: Box<dyn Read> = match &options.script {
        Some(path) => Box::new(File::open(path)?),
        None => Box::new(io::stdin().lock()),
    };
    let ops = session::parse_script(&config, script, options.mode)?;

    let report = session::run(&config, ops, PngSurface::new(&options.output))?;
    tracing::info!(
        applied = report.loop_stats.applied,
        failed = report.loop_stats.failed,
        refreshes = report.loop_stats.refreshes,
        present_failed = report.loop_stats.present_failed,
        dropped_frames = report.dropped_frames,
        "session finished"
    );
    report.surface.write()?;
    Ok(())
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let options = match parse_args(&args) {
        Ok(Parsed::Run(options)) => options,
        Ok(Parsed::Help) => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("painter: {message}");
            print_usage();
            return ExitCode::from(2);
        }
    };

    match execute(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("painter: {e}");
            ExitCode::FAILURE
        }
    }
}
