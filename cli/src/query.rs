use miniyaml::Block;

/// Walk a dotted path: mapping keys by name, sequence items by index.
/// An empty path selects `root`.
pub fn lookup<'a>(root: &'a Block, path: &str) -> Option<&'a Block> {
    if path.is_empty() {
        return Some(root);
    }
    path.split('.').try_fold(root, |node, segment| match node {
        Block::Mapping(_) => node.key(segment),
        Block::Sequence(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        Block::Literal(_) | Block::Empty => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Block {
        miniyaml::parse(b"---\nitems:\n  - name: intro\n    dpi: 320\n  - plain\nformat: 1.0\n...\n")
            .unwrap()
    }

    #[test]
    fn walks_keys_and_indexes() {
        let root = sample();
        assert_eq!(lookup(&root, "format").and_then(Block::as_str), Some("1.0"));
        assert_eq!(lookup(&root, "items.0.name").and_then(Block::as_str), Some("intro"));
        assert_eq!(lookup(&root, "items.1").and_then(Block::as_str), Some("plain"));
        assert_eq!(lookup(&root, ""), Some(&root));
    }

    #[test]
    fn missing_segments() {
        let root = sample();
        assert!(lookup(&root, "nope").is_none());
        assert!(lookup(&root, "items.9").is_none());
        assert!(lookup(&root, "items.first").is_none());
        assert!(lookup(&root, "format.deeper").is_none());
    }
}
