//! Source formatting service.
//!
//! The compiler hands the assembled module to a [`Formatter`] when `prettier` is
//! enabled. [`OxcFormatter`] reparses the module as TSX and reprints it, which
//! normalizes whitespace and rejects anything that is not valid source.

use oxc_allocator::Allocator;
use oxc_codegen::Codegen;
use oxc_parser::Parser;
use thiserror::Error;

use crate::expression::source_type;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("formatter rejected generated source: {message}")]
pub struct FormatError {
    pub message: String,
}

impl FormatError {
    pub fn new(message: impl Into<String>) -> Self {
        FormatError {
            message: message.into(),
        }
    }
}

pub trait Formatter {
    fn format(&self, source: &str) -> Result<String, FormatError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OxcFormatter;

impl Formatter for OxcFormatter {
    fn format(&self, source: &str) -> Result<String, FormatError> {
        let allocator = Allocator::default();
        let ret = Parser::new(&allocator, source, source_type()).parse();
        if ret.panicked || !ret.errors.is_empty() {
            let message = ret
                .errors
                .iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            return Err(FormatError::new(if message.is_empty() {
                "parser aborted".to_string()
            } else {
                message
            }));
        }
        Ok(Codegen::new().build(&ret.program).code)
    }
}
