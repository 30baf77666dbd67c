use std::fmt;
use std::ops::Range;

use codespan_reporting::diagnostic::{Diagnostic, Label};

use crate::parser::input::Line;

/// A parse failure, located at a 1-based line of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// `None` when the location is unknown (displayed as `-1`).
    pub line: Option<usize>,
    pub message: String,
    /// Byte range of the offending line, for diagnostics rendering.
    pub span: Option<Range<usize>>,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        ParseError {
            line: None,
            message: message.into(),
            span: None,
        }
    }

    pub fn at(line: usize, message: impl Into<String>) -> Self {
        ParseError {
            line: Some(line),
            message: message.into(),
            span: None,
        }
    }

    /// An error about a line that was read from the input.
    pub fn at_line(line: &Line, message: impl Into<String>) -> Self {
        ParseError {
            line: Some(line.number),
            message: message.into(),
            span: Some(line.span.clone()),
        }
    }

    pub fn with_span(mut self, span: Range<usize>) -> Self {
        self.span = Some(span);
        self
    }

    /// Convert to a codespan-reporting Diagnostic for display.
    pub fn to_diagnostic(&self, file_id: usize) -> Diagnostic<usize> {
        let diagnostic = Diagnostic::error().with_message(&self.message);
        match &self.span {
            Some(span) => diagnostic.with_labels(vec![Label::primary(file_id, span.clone())]),
            None => diagnostic,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "[line {}] {}", line, self.message),
            None => write!(f, "[line -1] {}", self.message),
        }
    }
}

impl std::error::Error for ParseError {}
