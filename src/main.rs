//! vb2arduino - BASIC to Arduino C++ transpiler
//!
//! This is the command-line interface for the transpiler.

use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;

use vb2arduino::config::{ConfigError, TranspileOptions};
use vb2arduino::diagnostics::{VbLineMap, parse_compiler_output};
use vb2arduino::lexer::{lex, logical_lines};
use vb2arduino::lint;

/// vb2arduino - translate VB-style BASIC into an Arduino sketch
#[derive(Parser, Debug)]
#[command(name = "vb2arduino")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input BASIC source file
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Output file (default: input name with .cpp extension)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Transpiler options (TOML)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Only print the tokens of each logical line (for debugging)
    #[arg(long)]
    tokens: bool,

    /// Run the linter instead of translating
    #[arg(long)]
    lint: bool,

    /// Map toolchain errors saved in this file back to BASIC lines
    #[arg(long, value_name = "STDERR_FILE")]
    map_errors: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("error reading '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("error writing '{}': {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn read(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(&args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<ExitCode, CliError> {
    let source = read(&args.input)?;
    log::debug!("read {} ({} bytes)", args.input.display(), source.len());

    if args.tokens {
        print_tokens(&source);
        return Ok(ExitCode::SUCCESS);
    }

    if args.lint {
        let path = args.input.display().to_string();
        let diagnostics = lint::run(&source, &path);
        for diagnostic in &diagnostics {
            println!("{}", diagnostic);
        }
        log::info!("{} lint finding(s)", diagnostics.len());
        return Ok(ExitCode::SUCCESS);
    }

    let options = match &args.config {
        Some(path) => TranspileOptions::load(path)?,
        None => TranspileOptions::default(),
    };
    let generated = vb2arduino::transpile_with(&source, &options);
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.input.with_extension("cpp"));

    if let Some(stderr_path) = &args.map_errors {
        let stderr = read(stderr_path)?;
        let main_file = output
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| output.display().to_string());
        let map = VbLineMap::from_generated(&generated);
        let diagnostics = parse_compiler_output(&stderr, &main_file, &generated);
        for diagnostic in &diagnostics {
            println!("{}", diagnostic.to_source(&map));
        }
        return Ok(if diagnostics.is_empty() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    fs::write(&output, &generated).map_err(|source| CliError::Write {
        path: output.clone(),
        source,
    })?;
    log::info!("wrote {}", output.display());
    Ok(ExitCode::SUCCESS)
}

/// Prints the token stream of each logical line.
fn print_tokens(source: &str) {
    for line in logical_lines(source) {
        println!("{:4}: {}", line.number, line.text);
        for token in lex(&line.text) {
            println!(
                "      {:3}..{:<3} {:20} {:?}",
                token.span.start,
                token.span.end,
                format!("{:?}", token.kind),
                token.text
            );
        }
    }
}
