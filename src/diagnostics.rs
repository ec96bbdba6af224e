use std::fmt;

use thiserror::Error;

use crate::token::{Token, TokenKind};

/// Classification of a diagnostic event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticKind {
    Lexer,
    Parser,
    Runtime,
}

/// A single error report tied to a source line.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub line: usize,
    /// Rendered position hint for syntax errors, e.g. `at 'x'` or `at end`.
    pub location: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, line: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            location: None,
            message: message.into(),
        }
    }

    pub fn lexer(line: usize, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Lexer, line, message)
    }

    /// Syntax error reported at `token`.
    pub fn parser(token: &Token, message: impl Into<String>) -> Self {
        let location = if token.kind == TokenKind::Eof {
            "at end".to_string()
        } else {
            format!("at '{}'", token.lexeme)
        };
        Self::new(DiagnosticKind::Parser, token.line, message).with_location(location)
    }

    pub fn runtime(line: usize, message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::Runtime, line, message)
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DiagnosticKind::Runtime => write!(f, "{}\n[line {}]", self.message, self.line),
            DiagnosticKind::Lexer | DiagnosticKind::Parser => {
                write!(f, "[line {}] Error", self.line)?;
                if let Some(location) = &self.location {
                    write!(f, " {location}")?;
                }
                write!(f, ": {}", self.message)
            }
        }
    }
}

impl std::error::Error for Diagnostic {}

/// Exit status for lexical and syntax errors.
pub const EXIT_COMPILE_ERROR: u8 = 65;
/// Exit status for runtime errors.
pub const EXIT_RUNTIME_ERROR: u8 = 70;

/// Unified error type for the interpreter pipeline.
#[derive(Debug, Error)]
pub enum LoxError {
    /// Every lexical and syntax error found in one pass over the source.
    #[error("{}", render_all(.0))]
    Compile(Vec<Diagnostic>),
    /// The first runtime error; evaluation stops there.
    #[error("{0}")]
    Runtime(Diagnostic),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoxError {
    /// Process exit code the driver should use for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            LoxError::Compile(_) => EXIT_COMPILE_ERROR,
            LoxError::Runtime(_) => EXIT_RUNTIME_ERROR,
            LoxError::Io(_) => 1,
        }
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            LoxError::Compile(diagnostics) => diagnostics,
            LoxError::Runtime(diagnostic) => std::slice::from_ref(diagnostic),
            LoxError::Io(_) => &[],
        }
    }
}

impl From<Diagnostic> for LoxError {
    fn from(diagnostic: Diagnostic) -> Self {
        match diagnostic.kind {
            DiagnosticKind::Runtime => LoxError::Runtime(diagnostic),
            DiagnosticKind::Lexer | DiagnosticKind::Parser => LoxError::Compile(vec![diagnostic]),
        }
    }
}

fn render_all(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

pub type Result<T> = std::result::Result<T, LoxError>;
