// ABOUTME: Error types for the lexing, parsing, and evaluation pipeline

use crate::lexer::Span;
use crate::value::Value;
use thiserror::Error;

fn at(span: &Option<Span>) -> String {
    match span {
        Some(span) => format!(" at {span}"),
        None => String::new(),
    }
}

/// Errors produced while scanning source text into tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("Unterminated string literal starting at {span}")]
    UnterminatedString { span: Span },

    #[error("Unterminated block comment starting at {span}")]
    UnterminatedComment { span: Span },

    #[error("Malformed number '{lexeme}' at {span}")]
    MalformedNumber { lexeme: String, span: Span },

    #[error("Unexpected character '{ch}' at {span}")]
    UnexpectedChar { ch: char, span: Span },
}

/// Error produced by the parser, citing the offending token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at {span}")]
pub struct ParseError {
    pub message: String,
    pub span: Span,
}

impl ParseError {
    pub fn new(message: impl Into<String>, span: Span) -> Self {
        ParseError {
            message: message.into(),
            span,
        }
    }
}

/// Runtime faults. `Thrown` is special: it carries a user `throw` value and
/// is the only variant a `try`/`catch` can intercept. Everything else is
/// fatal to the interpretation.
#[derive(Debug, Clone, Error)]
pub enum RuntimeError {
    #[error("Undefined variable '{name}'{}", at(.span))]
    Name { name: String, span: Option<Span> },

    #[error("{message}{}", at(.span))]
    Type { message: String, span: Option<Span> },

    #[error("{message}{}", at(.span))]
    Arity { message: String, span: Option<Span> },

    #[error("{message}{}", at(.span))]
    Index { message: String, span: Option<Span> },

    #[error("{message}{}", at(.span))]
    Arithmetic { message: String, span: Option<Span> },

    #[error("{message}{}", at(.span))]
    Io { message: String, span: Option<Span> },

    #[error("Uncaught exception: {value} at {span}")]
    Thrown { value: Value, span: Span },
}

impl RuntimeError {
    pub fn name_error(name: impl Into<String>, span: Option<Span>) -> Self {
        RuntimeError::Name {
            name: name.into(),
            span,
        }
    }

    pub fn type_error(message: impl Into<String>, span: Option<Span>) -> Self {
        RuntimeError::Type {
            message: message.into(),
            span,
        }
    }

    pub fn arity_error(message: impl Into<String>, span: Option<Span>) -> Self {
        RuntimeError::Arity {
            message: message.into(),
            span,
        }
    }

    pub fn index_error(message: impl Into<String>, span: Option<Span>) -> Self {
        RuntimeError::Index {
            message: message.into(),
            span,
        }
    }

    pub fn arithmetic_error(message: impl Into<String>, span: Option<Span>) -> Self {
        RuntimeError::Arithmetic {
            message: message.into(),
            span,
        }
    }

    pub fn io_error(message: impl Into<String>, span: Option<Span>) -> Self {
        RuntimeError::Io {
            message: message.into(),
            span,
        }
    }
}

/// Embedder-facing error: everything the pipeline can surface.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}
