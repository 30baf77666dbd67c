use std::fmt;

use super::Block;

const EMPTY_SENTINEL: &str = "<empty container>";

impl Block {
    /// Deterministic one-line rendering, mainly for tests and debugging.
    ///
    /// Literals are quoted as `'text'` (not escaped), mappings render as
    /// `{k=v, ...}` with keys sorted ascending, sequences as `[v, ...]` in
    /// order.
    pub fn to_debug_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Block::Empty => f.write_str(EMPTY_SENTINEL),
            Block::Literal(text) => write!(f, "'{}'", text),
            Block::Mapping(map) => {
                let mut entries: Vec<_> = map.iter().collect();
                entries.sort_by(|a, b| a.0.cmp(b.0));

                write!(f, "{{")?;
                for (i, (key, value)) in entries.into_iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}={}", key, value)?;
                }
                write!(f, "}}")
            }
            Block::Sequence(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}
