//! A parser for a deliberately small subset of YAML.
//!
//! Documents must be explicit (`---` ... `...`) and may only contain
//! `key: value` mappings, `- item` sequences, `|` multi-line literals and
//! comments. Values are kept as untyped strings; callers read them back
//! through the [`Block`] accessors.
//!
//! ```
//! let root = miniyaml::parse(b"---\nname: intro\ndpi: 320\n...\n").unwrap();
//! assert_eq!(root.get_key_string("name").unwrap(), "intro");
//! assert_eq!(root.get_key_int("dpi", 0).unwrap(), 320);
//! ```

pub mod block;
pub mod parser;

pub use block::{Block, BlockError, BlockKind};
pub use parser::{ParseError, ParseFailure, Parser, ParserOptions};

/// Parse `data` with the default [`ParserOptions`].
pub fn parse(data: &[u8]) -> Result<Block, ParseFailure> {
    Parser::new().parse(data)
}
