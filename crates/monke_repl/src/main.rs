use std::{
    cell::RefCell,
    fs,
    path::{Path, PathBuf},
    process,
    rc::Rc,
};

use clap::Parser as _;

use monke_interpreter::{evaluate, Environment};
use monke_parser::{lexer::Lexer, parser::Parser};

mod repl;

/// monke runs Monkey scripts, or starts an interactive session when no script is given.
#[derive(clap::Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Script to run instead of starting the REPL.
    file: Option<PathBuf>,
}

/// Enable with `RUST_LOG=monke_parser=debug` or `RUST_LOG=monke_interpreter=trace`.
fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Only initialize if RUST_LOG is set
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

/// Run a whole script in a fresh environment.
///
/// `Ok` holds the rendering of the final value, if there is one; `Err` holds
/// the parse errors or the runtime error that stopped the script.
fn run_source(source: &str) -> Result<Option<String>, String> {
    let mut parser = Parser::new(Lexer::new(source));
    let program = parser
        .parse_program()
        .map_err(|errors| repl::format_parse_errors(&errors))?;

    tracing::debug!(statements = program.statements.len(), "running script");

    match evaluate(&program, Rc::new(RefCell::new(Environment::new()))) {
        Some(result) if result.is_error() => Err(result.to_string()),
        Some(result) => Ok(Some(result.to_string())),
        None => Ok(None),
    }
}

fn run_file(path: &Path) -> i32 {
    let source = match fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Failed to read '{}': {}", path.display(), err);
            return 1;
        }
    };

    match run_source(&source) {
        Ok(Some(output)) => {
            println!("{}", output);
            0
        }
        Ok(None) => 0,
        Err(message) => {
            eprintln!("{}", message);
            1
        }
    }
}

fn main() {
    let args = Args::parse();
    init_tracing();

    match args.file {
        Some(path) => process::exit(run_file(&path)),
        None => repl::repl(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::run_source;

    #[test]
    fn script_results() {
        let tests = vec![
            ("", Ok(None)),
            ("let x = 2; x * 21", Ok(Some("42"))),
            // Plain rendering, unlike the REPL
            ("\"hello\" + \" world\"", Ok(Some("hello world"))),
            ("[\"a\", 1]", Ok(Some("[\"a\", 1]"))),
            ("puts; 1 / 0; 2", Err("Error: division by zero")),
            (
                "let x 1;",
                Err("Parser errors:\n\texpected next token to be `=`, got `1` instead (at 6:7)"),
            ),
        ];

        for (input, expected) in tests {
            let result = run_source(input);
            assert_eq!(
                result.as_ref().map(|out| out.as_deref()).map_err(String::as_str),
                expected,
                "input: {}",
                input
            );
        }
    }
}
