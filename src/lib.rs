//! Scanner, parser and tree-walking evaluator for a small dynamically typed
//! scripting language with closures.

pub mod ast;
pub mod diagnostics;
pub mod environment;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod repl;
pub mod runtime;
pub mod stdlib;
pub mod token;
pub mod value;

pub use diagnostics::{Diagnostic, DiagnosticKind, LoxError};
pub use lexer::tokenize;
pub use parser::{parse_expression, parse_program};
pub use repl::Repl;
pub use runtime::{Flow, Interpreter};
pub use token::{Token, TokenKind};
pub use value::Value;
