// ABOUTME: Structured error types for the scanner/reader and evaluator

use thiserror::Error;

// ===== Arity constant strings (eliminates allocations in error paths) =====
pub const ARITY_ONE: &str = "1";
pub const ARITY_TWO: &str = "2";
pub const ARITY_THREE: &str = "3";
pub const ARITY_ONE_OR_TWO: &str = "1-2";
pub const ARITY_TWO_OR_THREE: &str = "2-3";
pub const ARITY_AT_LEAST_ONE: &str = "at least 1";
pub const ARITY_AT_LEAST_TWO: &str = "at least 2";

/// Raised by the scanner/reader (spec.md section 7). Carries enough context
/// for the driver to render a `^`-indicator diagnostic the way
/// `Parser.ParseError.generateVerboseErrorString()` does in the original.
#[derive(Error, Debug, Clone)]
#[error("{}", render_parse_error(.file.as_deref(), *.line, *.column, .source_line, .message))]
pub struct ParseError {
    pub file: Option<String>,
    pub line: usize,
    pub column: usize,
    pub source_line: String,
    pub message: String,
}

fn render_parse_error(
    file: Option<&str>,
    line: usize,
    column: usize,
    source_line: &str,
    message: &str,
) -> String {
    let location = match file {
        Some(name) => format!("{} line {} col {}", name, line, column),
        None => format!("line {} col {}", line, column),
    };
    let caret = " ".repeat(column.saturating_sub(1)) + "^";
    format!("{}: {}\n{}\n{}", location, message, source_line, caret)
}

impl ParseError {
    pub fn new(
        file: Option<String>,
        line: usize,
        column: usize,
        source_line: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ParseError {
            file,
            line,
            column,
            source_line: source_line.into(),
            message: message.into(),
        }
    }
}

/// Structural evaluator failures: malformed combinations, a non-callable
/// head, an unbound `set!`/`undef!` target, an unknown expression kind.
#[derive(Error, Debug, Clone)]
#[error("{0}")]
pub struct RuntimeError(pub String);

impl RuntimeError {
    pub fn new(message: impl Into<String>) -> Self {
        RuntimeError(message.into())
    }
}

/// Primitive-invocation failure, carrying the primitive's name and usage
/// string (spec.md section 7), rendered the way
/// `LypsRuntimeFuncError.__str__` renders in the original interpreter.
#[derive(Error, Debug, Clone)]
#[error("ERROR '{name}': {message}\nUSAGE: {usage}")]
pub struct RuntimeFuncError {
    pub name: String,
    pub usage: String,
    pub message: String,
}

impl RuntimeFuncError {
    pub fn new(name: &str, usage: &str, message: impl Into<String>) -> Self {
        RuntimeFuncError {
            name: name.to_string(),
            usage: usage.to_string(),
            message: message.into(),
        }
    }

    pub fn arity(name: &str, usage: &str, expected: &str, actual: usize) -> Self {
        RuntimeFuncError::new(
            name,
            usage,
            format!("expected {} argument(s), got {}", expected, actual),
        )
    }

    pub fn type_mismatch(name: &str, usage: &str, expected: &str, got: &Value) -> Self {
        RuntimeFuncError::new(
            name,
            usage,
            format!("expected {}, got {} ({})", expected, got.type_name(), got),
        )
    }
}

/// The crate's public error type — everything that can surface out of
/// `Interpreter::eval` to the driver.
#[derive(Error, Debug, Clone)]
pub enum LypsError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    RuntimeFunc(#[from] RuntimeFuncError),
}

pub type LypsResult<T> = Result<T, LypsError>;

use crate::value::Value;
