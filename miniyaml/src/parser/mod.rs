pub mod error;
pub mod input;
pub mod line;
mod structural;

pub use error::ParseError;

use thiserror::Error;

use crate::block::Block;

/// Tunables for [`Parser`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    /// Deepest nesting of indented scopes accepted before failing with a
    /// "nesting too deep" error. The document's top level is depth 0.
    pub max_depth: usize,
}

impl ParserOptions {
    pub const DEFAULT_MAX_DEPTH: usize = 128;

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for ParserOptions {
    fn default() -> Self {
        ParserOptions {
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

/// A failed parse: the first error, plus whatever had been built so far.
///
/// The partial tree is only meant for diagnostics.
#[derive(Debug, Clone, Error)]
#[error("{error}")]
pub struct ParseFailure {
    pub error: ParseError,
    pub partial: Block,
}

impl ParseFailure {
    pub fn into_error(self) -> ParseError {
        self.error
    }
}

/// Parser entry point. Holds no per-document state and can be reused.
#[derive(Debug, Clone, Default)]
pub struct Parser {
    options: ParserOptions,
}

impl Parser {
    pub fn new() -> Self {
        Parser::default()
    }

    pub fn with_options(options: ParserOptions) -> Self {
        Parser { options }
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Parse one `---` ... `...` document from raw bytes.
    pub fn parse(&self, data: &[u8]) -> Result<Block, ParseFailure> {
        structural::parse_document(data, &self.options)
    }

    pub fn parse_str(&self, source: &str) -> Result<Block, ParseFailure> {
        self.parse(source.as_bytes())
    }
}
