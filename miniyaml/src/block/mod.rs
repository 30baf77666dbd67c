mod render;

use std::fmt;
use std::num::{ParseFloatError, ParseIntError};

use indexmap::IndexMap;
use thiserror::Error;

/// A node of a parsed document.
///
/// A block starts out `Empty` and is given its shape by the first mutation:
/// [`set_literal`](Block::set_literal), [`set_key`](Block::set_key) or
/// [`append`](Block::append). Once it is a literal, mapping or sequence it
/// can never become one of the other two.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Block {
    /// No value assigned (an explicitly empty key or sequence item).
    #[default]
    Empty,
    Literal(String),
    /// Keys in insertion order. Rendering sorts them.
    Mapping(IndexMap<String, Block>),
    Sequence(Vec<Block>),
}

/// The variant of a [`Block`], without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Empty,
    Literal,
    Mapping,
    Sequence,
}

impl BlockKind {
    pub fn name(self) -> &'static str {
        match self {
            BlockKind::Empty => "empty",
            BlockKind::Literal => "literal",
            BlockKind::Mapping => "mapping",
            BlockKind::Sequence => "sequence",
        }
    }
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Misuse of a block: a variant change, or a typed read that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlockError {
    #[error("Block of type '{from}' can't be converted to type '{to}'")]
    TypeConflict { from: BlockKind, to: BlockKind },

    #[error("Key '{key}' is of type '{kind}', not literal")]
    KeyNotLiteral { key: String, kind: BlockKind },

    #[error("Block of type '{found}' was read as type '{expected}'")]
    WrongKind { expected: BlockKind, found: BlockKind },

    #[error("'{text}' is not a valid float: {source}")]
    InvalidFloat {
        text: String,
        #[source]
        source: ParseFloatError,
    },

    #[error("'{text}' is not a valid integer: {source}")]
    InvalidInt {
        text: String,
        #[source]
        source: ParseIntError,
    },
}

impl Block {
    pub fn new() -> Self {
        Block::Empty
    }

    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Empty => BlockKind::Empty,
            Block::Literal(_) => BlockKind::Literal,
            Block::Mapping(_) => BlockKind::Mapping,
            Block::Sequence(_) => BlockKind::Sequence,
        }
    }

    /// "empty", "literal", "mapping" or "sequence".
    pub fn type_name(&self) -> &'static str {
        self.kind().name()
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Block::Empty)
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Block::Literal(_))
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, Block::Mapping(_))
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, Block::Sequence(_))
    }

    // --- Mutation

    /// Make this block a literal. Overwrites a previous literal value.
    pub fn set_literal(&mut self, text: impl Into<String>) -> Result<(), BlockError> {
        match self {
            Block::Mapping(_) | Block::Sequence(_) => Err(self.conflict(BlockKind::Literal)),
            Block::Empty | Block::Literal(_) => {
                *self = Block::Literal(text.into());
                Ok(())
            }
        }
    }

    /// Insert `child` under `key`, turning an empty block into a mapping.
    ///
    /// A duplicate key replaces the previous child but keeps its position.
    /// Returns the inserted child so the caller can keep filling it.
    pub fn set_key(
        &mut self,
        key: impl Into<String>,
        child: Block,
    ) -> Result<&mut Block, BlockError> {
        if self.is_empty() {
            *self = Block::Mapping(IndexMap::new());
        }
        let conflict = self.conflict(BlockKind::Mapping);
        match self {
            Block::Mapping(map) => {
                let (index, _) = map.insert_full(key.into(), child);
                Ok(&mut map[index])
            }
            _ => Err(conflict),
        }
    }

    /// Append `child`, turning an empty block into a sequence.
    /// Returns the appended child.
    pub fn append(&mut self, child: Block) -> Result<&mut Block, BlockError> {
        if self.is_empty() {
            *self = Block::Sequence(Vec::new());
        }
        let conflict = self.conflict(BlockKind::Sequence);
        match self {
            Block::Sequence(items) => {
                let index = items.len();
                items.push(child);
                Ok(&mut items[index])
            }
            _ => Err(conflict),
        }
    }

    fn conflict(&self, to: BlockKind) -> BlockError {
        BlockError::TypeConflict {
            from: self.kind(),
            to,
        }
    }

    fn wrong_kind(&self, expected: BlockKind) -> BlockError {
        BlockError::WrongKind {
            expected,
            found: self.kind(),
        }
    }

    // --- Literal access

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Block::Literal(text) => Some(text.as_str()),
            _ => None,
        }
    }

    fn literal(&self) -> Result<&str, BlockError> {
        self.as_str().ok_or_else(|| self.wrong_kind(BlockKind::Literal))
    }

    /// Parse the literal as a 64-bit float.
    pub fn as_f64(&self) -> Result<f64, BlockError> {
        let text = self.literal()?;
        text.parse().map_err(|source| BlockError::InvalidFloat {
            text: text.to_string(),
            source,
        })
    }

    /// Parse the literal as a base-10 signed 64-bit integer.
    pub fn as_i64(&self) -> Result<i64, BlockError> {
        let text = self.literal()?;
        text.parse().map_err(|source| BlockError::InvalidInt {
            text: text.to_string(),
            source,
        })
    }

    // --- Mapping access

    pub fn mapping(&self) -> Option<&IndexMap<String, Block>> {
        match self {
            Block::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// The child under `key`, if this is a mapping that has it.
    pub fn key(&self, key: &str) -> Option<&Block> {
        self.mapping().and_then(|map| map.get(key))
    }

    /// Mapping keys in insertion order. Empty for any other variant.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.mapping()
            .into_iter()
            .flat_map(|map| map.keys().map(String::as_str))
    }

    /// Keyed lookup for the convenience readers. An empty block is treated
    /// as a mapping with no keys.
    fn lookup(&self, key: &str) -> Result<Option<&Block>, BlockError> {
        match self {
            Block::Mapping(map) => Ok(map.get(key)),
            Block::Empty => Ok(None),
            _ => Err(self.wrong_kind(BlockKind::Mapping)),
        }
    }

    /// The literal under `key`, or `""` when the key is absent.
    pub fn get_key_string(&self, key: &str) -> Result<&str, BlockError> {
        match self.lookup(key)? {
            None => Ok(""),
            Some(Block::Literal(text)) => Ok(text.as_str()),
            Some(other) => Err(BlockError::KeyNotLiteral {
                key: key.to_string(),
                kind: other.kind(),
            }),
        }
    }

    /// The float under `key`, or `default` when the key is absent.
    pub fn get_key_float(&self, key: &str, default: f64) -> Result<f64, BlockError> {
        match self.lookup(key)? {
            None => Ok(default),
            Some(value) => value.as_f64(),
        }
    }

    /// The integer under `key`, or `default` when the key is absent.
    pub fn get_key_int(&self, key: &str, default: i64) -> Result<i64, BlockError> {
        match self.lookup(key)? {
            None => Ok(default),
            Some(value) => value.as_i64(),
        }
    }

    // --- Sequence access

    pub fn sequence(&self) -> Option<&[Block]> {
        match self {
            Block::Sequence(items) => Some(items.as_slice()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn literal() -> Block {
        Block::Literal("x".into())
    }

    fn mapping() -> Block {
        let mut block = Block::new();
        block.set_key("k", Block::new()).unwrap();
        block
    }

    fn sequence() -> Block {
        let mut block = Block::new();
        block.append(Block::new()).unwrap();
        block
    }

    #[rstest]
    #[case::literal_to_mapping(literal(), BlockKind::Mapping)]
    #[case::literal_to_sequence(literal(), BlockKind::Sequence)]
    #[case::mapping_to_literal(mapping(), BlockKind::Literal)]
    #[case::mapping_to_sequence(mapping(), BlockKind::Sequence)]
    #[case::sequence_to_literal(sequence(), BlockKind::Literal)]
    #[case::sequence_to_mapping(sequence(), BlockKind::Mapping)]
    fn variant_is_fixed_once_set(#[case] mut block: Block, #[case] to: BlockKind) {
        let before = block.clone();
        let from = block.kind();

        let err = match to {
            BlockKind::Literal => block.set_literal("y").unwrap_err(),
            BlockKind::Mapping => block.set_key("other", Block::new()).unwrap_err(),
            BlockKind::Sequence => block.append(Block::new()).unwrap_err(),
            BlockKind::Empty => unreachable!(),
        };

        assert_eq!(err, BlockError::TypeConflict { from, to });
        assert_eq!(block, before);
    }

    #[test]
    fn type_conflict_message() {
        let err = literal().append(Block::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Block of type 'literal' can't be converted to type 'sequence'"
        );
    }

    #[test]
    fn set_literal_overwrites_literal() {
        let mut block = Block::new();
        block.set_literal("a").unwrap();
        block.set_literal("b").unwrap();
        assert_eq!(block.as_str(), Some("b"));
    }

    #[test]
    fn set_key_returns_child_for_filling() {
        let mut root = Block::new();
        root.set_key("a", Block::new()).unwrap().set_literal("1").unwrap();
        assert_eq!(root.get_key_string("a").unwrap(), "1");
    }

    #[test]
    fn duplicate_key_replaces_value_in_place() {
        let mut root = Block::new();
        root.set_key("a", Block::Literal("1".into())).unwrap();
        root.set_key("b", Block::Literal("2".into())).unwrap();
        root.set_key("a", Block::Literal("3".into())).unwrap();

        assert_eq!(root.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(root.get_key_string("a").unwrap(), "3");
    }

    #[test]
    fn numeric_readers() {
        assert_eq!(Block::Literal("1.0".into()).as_f64().unwrap(), 1.0);
        assert_eq!(Block::Literal("-42".into()).as_i64().unwrap(), -42);
        assert!(matches!(
            Block::Literal("4.5".into()).as_i64(),
            Err(BlockError::InvalidInt { .. })
        ));
        assert!(matches!(
            Block::Literal("abc".into()).as_f64(),
            Err(BlockError::InvalidFloat { .. })
        ));
        assert_eq!(
            sequence().as_i64().unwrap_err(),
            BlockError::WrongKind {
                expected: BlockKind::Literal,
                found: BlockKind::Sequence,
            }
        );
    }

    #[test]
    fn keyed_readers_use_defaults_for_missing_keys() {
        let mut root = Block::new();
        root.set_key("dpi", Block::Literal("320".into())).unwrap();
        root.set_key("scale", Block::Literal("1.5".into())).unwrap();

        assert_eq!(root.get_key_int("dpi", 0).unwrap(), 320);
        assert_eq!(root.get_key_int("missing", 321).unwrap(), 321);
        assert_eq!(root.get_key_float("scale", 0.0).unwrap(), 1.5);
        assert_eq!(root.get_key_float("missing", 2.5).unwrap(), 2.5);
        assert_eq!(root.get_key_string("missing").unwrap(), "");
        assert_eq!(Block::new().get_key_string("anything").unwrap(), "");
    }

    #[test]
    fn keyed_string_reader_rejects_containers() {
        let mut root = Block::new();
        root.set_key("items", sequence()).unwrap();

        let err = root.get_key_string("items").unwrap_err();
        assert_eq!(err.to_string(), "Key 'items' is of type 'sequence', not literal");
    }

    #[test]
    fn keyed_readers_propagate_parse_failures() {
        let mut root = Block::new();
        root.set_key("dpi", Block::Literal("high".into())).unwrap();
        assert!(root.get_key_int("dpi", 0).is_err());
        assert!(root.get_key_float("dpi", 0.0).is_err());
    }

    #[test]
    fn kind_names() {
        assert_eq!(Block::new().type_name(), "empty");
        assert_eq!(literal().type_name(), "literal");
        assert_eq!(mapping().type_name(), "mapping");
        assert_eq!(sequence().type_name(), "sequence");
    }
}
