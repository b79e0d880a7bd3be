use std::cell::RefCell;
use std::rc::Rc;

use rustyline::error::ReadlineError;
use rustyline::Editor;

use monke_interpreter::{evaluate, Environment};
use monke_parser::{
    lexer::Lexer,
    parser::{ParseError, Parser},
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Parse errors as both the REPL and file mode print them, one per tab-indented line.
pub fn format_parse_errors(errors: &[ParseError]) -> String {
    let mut out = String::from("Parser errors:");
    for error in errors {
        out.push_str("\n\t");
        out.push_str(&error.to_string());
    }
    out
}

/// Run one line against the session's environment, returning what to print.
fn eval_line(line: &str, env: &Rc<RefCell<Environment>>) -> Option<String> {
    let mut parser = Parser::new(Lexer::new(line));

    match parser.parse_program() {
        // Strings come back quoted so they read like the code that made them
        Ok(prog) => evaluate(&prog, Rc::clone(env)).map(|result| result.to_code_string()),
        Err(errors) => Some(format_parse_errors(&errors)),
    }
}

pub fn repl() {
    println!("monke v{}", VERSION);

    // Bindings survive from one line to the next
    let env = Rc::new(RefCell::new(Environment::new()));

    // `()` can be used when no completer is required
    let mut rl = Editor::<()>::new();
    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                let input = line.trim();
                if input == "exit" || input == "quit" {
                    break;
                }
                if input.is_empty() {
                    continue;
                }

                rl.add_history_entry(line.as_str());

                if let Some(output) = eval_line(&line, &env) {
                    println!("{}", output);
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Error: {:?}", err);
                break;
            }
        }
    }
}
