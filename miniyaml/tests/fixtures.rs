use miniyaml::{Block, ParseFailure};
use pretty_assertions::assert_eq;

fn parse_fixture(name: &str) -> Result<Block, ParseFailure> {
    let path = format!("{}/tests/fixtures/{name}.yaml", env!("CARGO_MANIFEST_DIR"));
    let data = std::fs::read(&path).unwrap_or_else(|e| panic!("cannot read {path}: {e}"));
    miniyaml::parse(&data)
}

fn render_fixture(name: &str) -> String {
    match parse_fixture(name) {
        Ok(block) => block.to_debug_string(),
        Err(failure) => panic!("{name}: unexpected parse error: {failure}"),
    }
}

#[test]
fn fixture_no_start_marker() {
    let failure = parse_fixture("no_start_marker").unwrap_err();
    assert_eq!(
        failure.error.to_string(),
        "[line 3] Document marker not found (aka c-directives-end). \
         Tip: start your document with '---'."
    );
    assert!(failure.partial.is_empty());
}

#[test]
fn fixture_empty_document() {
    let root = parse_fixture("empty_document").unwrap();
    assert!(root.is_empty());
}

#[test]
fn fixture_mapping() {
    assert_eq!(
        render_fixture("mapping"),
        "{key1='value 1', \
         key3='value3', \
         key4='  This is a multi-line\n  string literal.\n    The identation is preserved as-is.\n', \
         key5='Matching indentation indicates the end of the string literal.', \
         key_2='value    2'}"
    );
}

#[test]
fn fixture_sequence() {
    assert_eq!(
        render_fixture("sequence"),
        "['The first string.', \
         'The second       value.', \
         'The third line.', \
         '  This is a multi-line\n  string literal.\n    The identation is preserved as-is.\n', \
         'Matching indentation indicates the end of the string literal.', \
         '2 following are a sequence of mappings (aka list of maps)', \
         {key1a='value 1a', key1b='value 1b'}, \
         {key2a='value 2a', key2b='value 2b'}, \
         'This value is a literal.']"
    );
}

#[test]
fn fixture_nested_mapping() {
    assert_eq!(
        render_fixture("nested_mapping"),
        "{key1='value 1', \
         key2={key2a='value 2a', key2b='value 2b'}, \
         key3='value 3', \
         key4={key4a={key4a1='value 4a1'}, key4b={key4b1='value 4b1', key4b2='value 4b2'}}, \
         key5='value 5'}"
    );
}

#[test]
fn fixture_sequence_of_mappings() {
    assert_eq!(
        render_fixture("sequence_of_mappings"),
        "{key1='value 1', \
         key2=['value 2a', 'value 2b'], \
         key3='value 3', \
         key4=[{key4a={key4a1='value 4a1'}}, \
         {key4b={key4b1='value 4b1', key4b2='value 4b2'}}, \
         {key4c={key4c1='value 4c1', key4c2='value 4c2'}}], \
         key5='value 5'}"
    );
}

#[test]
fn fixture_app_config() {
    assert_eq!(
        render_fixture("app_config"),
        "{description='A key/value set used to configure an app of mine. It contains a multi-line script.', \
         format='1.0', \
         items=[\
         {dpi='320', \
         landscape='      resize width 100%\n      move image 50% 40% to screen 85% 5%\n', \
         link='http://www.example.com/test1', \
         name='intro', \
         portrait='      resize height 75%\n      move image 50% 0% to screen 10% 5%\n', \
         text={1='All inner space is    preserved. Rest is trimmed.', 3='Interested?'}}, \
         {dpi='160', \
         link='http://www.example.com/test2', \
         name='family', \
         text={1='All your', 2='Bases', 3='make', 4='your time', 5='belong to us.'}}, \
         {landscape='        text-color #AAAAAA\n        text 1 at  4%   68% size 12%\n', \
         name='sleep'}, \
         {name='work', \
         portrait='        font Serif\n        text-color #AAAAAA\n'}]}"
    );
}

#[test]
fn fixture_app_config_accessors() {
    let root = parse_fixture("app_config").unwrap();

    assert_eq!(root.key("format").unwrap().as_f64().unwrap(), 1.0);

    let items = root.key("items").and_then(Block::sequence).unwrap();
    assert_eq!(items.len(), 4);

    let intro = &items[0];
    assert_eq!(intro.get_key_string("name").unwrap(), "intro");
    assert_eq!(intro.key("name").and_then(Block::as_str), Some("intro"));
    assert_eq!(intro.get_key_int("dpi", 0).unwrap(), 320);
    assert_eq!(intro.key("dpi").unwrap().as_i64().unwrap(), 320);
    assert_eq!(intro.get_key_int("not a key", 321).unwrap(), 321);
    assert_eq!(
        intro.keys().collect::<Vec<_>>(),
        vec!["name", "link", "dpi", "text", "landscape", "portrait"]
    );
    assert!(intro.get_key_string("text").is_err());
}
