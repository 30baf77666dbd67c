use std::sync::LazyLock;

use regex::Regex;

// Groups: 1=indent 2=sequence dash 3=map key 4=trailing value.
static SEQ_OR_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*)(?:(-)|([^\s:]+)\s*:)\s*(.*)$").expect("invalid item regex")
});

// `- key: value`, a sequence item that opens a mapping.
static SEQ_AND_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\s*)(-)\s*([^\s:]+)\s*:\s*(.*)$").expect("invalid combo item regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Marker {
    /// `- value`
    Sequence,
    /// `key: value`
    Key(String),
    /// `- key: value`
    SequenceKey(String),
}

/// A line recognised as a sequence item or mapping entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Indentation width in characters.
    pub indent: usize,
    /// Indentation length in bytes.
    indent_len: usize,
    pub marker: Marker,
    /// Trailing value, trimmed. Empty when the line has none.
    pub value: String,
}

impl Item {
    /// Rewrite a `- key: value` line into `  key: value` one column deeper,
    /// so it parses as the first entry of the new sequence item.
    pub fn unnest_key(&self, text: &str) -> String {
        format!("{} {}", &text[..self.indent_len], &text[self.indent_len + 1..])
    }
}

/// Classify `text`, trying the combo form first.
pub fn classify(text: &str) -> Option<Item> {
    if let Some(caps) = SEQ_AND_KEY.captures(text) {
        let indent = &caps[1];
        return Some(Item {
            indent: indent.chars().count(),
            indent_len: indent.len(),
            marker: Marker::SequenceKey(caps[3].to_string()),
            value: caps[4].trim().to_string(),
        });
    }

    let caps = SEQ_OR_KEY.captures(text)?;
    let indent = &caps[1];
    let marker = match (caps.get(2), caps.get(3)) {
        (Some(_), _) => Marker::Sequence,
        (None, Some(key)) => Marker::Key(key.as_str().to_string()),
        (None, None) => return None,
    };
    Some(Item {
        indent: indent.chars().count(),
        indent_len: indent.len(),
        marker,
        value: caps[4].trim().to_string(),
    })
}

/// Whether `text` looks like an item at `indent` or shallower. Ends a
/// folded literal.
pub fn is_item_within(text: &str, indent: usize) -> bool {
    SEQ_OR_KEY
        .captures(text)
        .is_some_and(|caps| caps[1].chars().count() <= indent)
}

/// Width of the leading whitespace, or `None` for an all-whitespace line.
pub fn indent_width(text: &str) -> Option<usize> {
    let rest = text.trim_start();
    if rest.is_empty() {
        return None;
    }
    Some(text[..text.len() - rest.len()].chars().count())
}
