use std::{fs, path::PathBuf, process::ExitCode};

use clap::{Parser, Subcommand};

use loxwalk::{printer, tokenize, Interpreter, LoxError, Repl};

#[derive(Parser)]
#[command(author, version, about = "Tree-walking interpreter for Lox scripts")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the token listing of a script
    Tokenize { file: PathBuf },
    /// Parse a single expression and print its syntax tree
    Parse { file: PathBuf },
    /// Evaluate a single expression and print its value
    Evaluate { file: PathBuf },
    /// Run a script
    Run { file: PathBuf },
    /// Start an interactive session
    Repl,
}

type Action = fn(&str) -> Result<(), LoxError>;

fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();
    let (path, action) = match args.command.unwrap_or(Command::Repl) {
        Command::Tokenize { file } => (file, tokenize_source as Action),
        Command::Parse { file } => (file, parse_source as Action),
        Command::Evaluate { file } => (file, evaluate_source as Action),
        Command::Run { file } => (file, run_source as Action),
        Command::Repl => return finish(Repl::new().run()),
    };
    let source = match fs::read_to_string(&path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Error reading file: {err}");
            return ExitCode::FAILURE;
        }
    };
    tracing::debug!(path = %path.display(), bytes = source.len(), "loaded script");
    finish(action(&source))
}

fn finish(result: Result<(), LoxError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}

/// Logs go to stderr and only when `RUST_LOG` is set.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn tokenize_source(source: &str) -> Result<(), LoxError> {
    let (tokens, errors) = tokenize(source);
    for token in &tokens {
        println!("{token}");
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(LoxError::Compile(errors))
    }
}

fn parse_source(source: &str) -> Result<(), LoxError> {
    let expr = loxwalk::parse_expression(source)?;
    println!("{}", printer::render_expr(&expr));
    Ok(())
}

fn evaluate_source(source: &str) -> Result<(), LoxError> {
    let value = Interpreter::new().evaluate_source(source)?;
    println!("{value}");
    Ok(())
}

fn run_source(source: &str) -> Result<(), LoxError> {
    Interpreter::new().run_source(source)
}
