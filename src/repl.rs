use rustyline::{error::ReadlineError, DefaultEditor};

use crate::{
    diagnostics::{LoxError, Result},
    runtime::Interpreter,
};

/// Interactive session. Bindings persist between lines; a line without a
/// trailing `;` or `}` is evaluated as an expression and its value printed.
pub struct Repl {
    interpreter: Interpreter,
}

impl Default for Repl {
    fn default() -> Self {
        Self::new()
    }
}

impl Repl {
    pub fn new() -> Self {
        Self {
            interpreter: Interpreter::new(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        let mut editor = DefaultEditor::new().map_err(readline_error)?;
        loop {
            match editor.readline("> ") {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed == ":quit" || trimmed == ":exit" {
                        break;
                    }
                    if trimmed.is_empty() {
                        continue;
                    }
                    editor.add_history_entry(trimmed).ok();
                    self.eval_line(trimmed);
                }
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
                Err(err) => return Err(readline_error(err)),
            }
        }
        Ok(())
    }

    fn eval_line(&mut self, line: &str) {
        let outcome = if is_statement(line) {
            self.interpreter.run_source(line)
        } else {
            self.interpreter
                .evaluate_source(line)
                .map(|value| println!("{value}"))
        };
        if let Err(err) = outcome {
            eprintln!("{err}");
        }
    }
}

/// Whether a REPL line runs as statements rather than being evaluated.
pub fn is_statement(line: &str) -> bool {
    line.ends_with(';') || line.ends_with('}')
}

fn readline_error(err: ReadlineError) -> LoxError {
    LoxError::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        err.to_string(),
    ))
}
