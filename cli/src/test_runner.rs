use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::debug;
use serde::Deserialize;

use miniyaml::{Block, ParseFailure, Parser, ParserOptions};

const FRONT_MATTER_FENCE: &str = "+++";
const TEST_SUFFIX: &str = ".test.yaml";

#[derive(Debug, Default, Deserialize)]
pub struct TestConfig {
    /// Human-readable test description.
    #[serde(default)]
    pub description: Option<String>,

    /// Expected debug rendering of the parsed tree (exact match).
    #[serde(default)]
    pub expect_render: Option<String>,

    /// Expected parse error: its display string must contain this substring.
    #[serde(default)]
    pub expect_error: Option<String>,

    /// If set, the parse error must be reported on this 1-based line.
    #[serde(default)]
    pub expect_error_line: Option<usize>,

    /// Overrides the parser's maximum nesting depth.
    #[serde(default)]
    pub max_depth: Option<usize>,
}

/// Split a `.test.yaml` file into its TOML config and the document under test.
///
/// The config sits between two `+++` lines at the top of the file.
fn parse_test_file(content: &str) -> Result<(TestConfig, &str), String> {
    let content = content.trim_start_matches('\u{feff}');

    let after_open = content
        .strip_prefix(FRONT_MATTER_FENCE)
        .ok_or("missing opening +++ front matter fence")?;
    let after_open = after_open
        .strip_prefix('\n')
        .or_else(|| after_open.strip_prefix("\r\n"))
        .ok_or("opening +++ fence must be on its own line")?;

    let (toml_str, rest) = if let Some(rest) = after_open.strip_prefix(FRONT_MATTER_FENCE) {
        ("", rest)
    } else {
        let close = after_open
            .find("\n+++")
            .ok_or("missing closing +++ front matter fence")?;
        (&after_open[..close], &after_open[close + 4..])
    };
    let document = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);

    let config: TestConfig =
        toml::from_str(toml_str.trim_end_matches('\r')).map_err(|e| format!("TOML parse error: {}", e))?;

    Ok((config, document))
}

pub enum TestOutcome {
    Pass,
    Fail(String),
}

pub struct TestResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: TestOutcome,
}

impl TestResult {
    fn label(&self) -> &str {
        self.description.as_deref().unwrap_or_else(|| {
            self.path
                .file_name()
                .and_then(|s| s.to_str())
                .map(|s| s.trim_end_matches(TEST_SUFFIX))
                .unwrap_or("?")
        })
    }
}

fn run_single_test(path: &Path) -> TestResult {
    let result = |description: Option<String>, outcome| TestResult {
        path: path.to_path_buf(),
        description,
        outcome,
    };

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => return result(None, TestOutcome::Fail(format!("cannot read file: {}", e))),
    };

    let (config, document) = match parse_test_file(&content) {
        Ok(pair) => pair,
        Err(e) => return result(None, TestOutcome::Fail(format!("front matter error: {}", e))),
    };

    let mut options = ParserOptions::default();
    if let Some(max_depth) = config.max_depth {
        options = options.with_max_depth(max_depth);
    }
    let parsed = Parser::with_options(options).parse_str(document);

    let outcome = match check_expectations(&config, parsed) {
        None => TestOutcome::Pass,
        Some(reason) => TestOutcome::Fail(reason),
    };
    result(config.description, outcome)
}

/// Returns `Some(reason)` when the parse result does not match `config`.
fn check_expectations(config: &TestConfig, parsed: Result<Block, ParseFailure>) -> Option<String> {
    match (&config.expect_error, parsed) {
        (Some(expected), Err(failure)) => {
            let actual = failure.error.to_string();
            if !actual.contains(expected.as_str()) {
                return Some(format!(
                    "expected error containing \"{}\", got: {}",
                    expected, actual
                ));
            }
            match config.expect_error_line {
                Some(line) if failure.error.line != Some(line) => Some(format!(
                    "expected error on line {}, got: {}",
                    line, actual
                )),
                _ => None,
            }
        }
        (Some(expected), Ok(block)) => Some(format!(
            "expected error containing \"{}\", but parsing succeeded with {}",
            expected, block
        )),
        (None, Err(failure)) => Some(format!("unexpected parse error: {}", failure.error)),
        (None, Ok(block)) => {
            let expected = config.expect_render.as_deref()?;
            let actual = block.to_debug_string();
            if actual == expected {
                None
            } else {
                Some(format!(
                    "render mismatch\n  expected: {:?}\n  actual:   {:?}",
                    expected, actual
                ))
            }
        }
    }
}

/// Discover `.test.yaml` files grouped by category (subfolder relative to root).
/// Files directly in `root` get category "". A single file is its own
/// uncategorized group.
fn discover_categorized(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    if root.is_file() {
        categories.insert(String::new(), vec![root.to_path_buf()]);
        return categories;
    }
    collect_tests(root, root, &mut categories);
    for files in categories.values_mut() {
        files.sort();
    }
    categories
}

fn collect_tests(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_tests(&path, root, out);
            continue;
        }
        let is_test = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(TEST_SUFFIX));
        if is_test {
            let category = path
                .parent()
                .and_then(|p| p.strip_prefix(root).ok())
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();
            out.entry(category).or_default().push(path);
        }
    }
}

fn category_label(category: &str) -> &str {
    if category.is_empty() { "(root)" } else { category }
}

/// List available categories for the given test path.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }

    let categories = discover_categorized(path);
    if categories.is_empty() {
        eprintln!("no {} files found in {}", TEST_SUFFIX, path.display());
        return;
    }

    eprintln!("available categories:");
    for (cat, files) in &categories {
        eprintln!("  {} ({} tests)", category_label(cat), files.len());
    }
}

struct Style {
    no_color: bool,
}

impl Style {
    fn paint(&self, code: &str, s: &str) -> String {
        if self.no_color {
            s.to_string()
        } else {
            format!("\x1b[{}m{}\x1b[0m", code, s)
        }
    }

    fn pass(&self) -> String {
        self.paint("32", "PASS")
    }

    fn fail(&self) -> String {
        self.paint("31", "FAIL")
    }

    fn bold(&self, s: &str) -> String {
        self.paint("1", s)
    }
}

/// Keep the categories matching `requested` (exact name or a parent folder).
fn filter_categories<'a>(
    all: &'a BTreeMap<String, Vec<PathBuf>>,
    requested: &[String],
) -> BTreeMap<&'a str, &'a Vec<PathBuf>> {
    if requested.is_empty() {
        return all.iter().map(|(k, v)| (k.as_str(), v)).collect();
    }

    let mut filtered = BTreeMap::new();
    for req in requested {
        let req = req.trim_matches('/');
        let prefix = format!("{}/", req);
        let before = filtered.len();
        for (cat, files) in all {
            if cat == req || cat.starts_with(&prefix) {
                filtered.insert(cat.as_str(), files);
            }
        }
        if filtered.len() == before {
            let available: Vec<&str> = all.keys().map(|k| category_label(k)).collect();
            eprintln!(
                "warning: category '{}' not found (available: {})",
                req,
                available.join(", ")
            );
        }
    }
    filtered
}

/// Run all `.test.yaml` files under `path` (or a single file).
/// If `categories` is non-empty, only run tests in those categories.
/// Returns exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let style = Style { no_color };

    let all_categories = discover_categorized(path);
    if all_categories.is_empty() {
        eprintln!("no {} files found in {}", TEST_SUFFIX, path.display());
        return 1;
    }

    let run_categories = filter_categories(&all_categories, categories);
    if run_categories.is_empty() {
        eprintln!("no matching categories found");
        return 1;
    }

    let mut passed = 0usize;
    let mut failures: Vec<TestResult> = Vec::new();

    for (cat, files) in &run_categories {
        eprintln!();
        eprintln!("{}", style.bold(category_label(cat)));

        for file in *files {
            debug!("running {}", file.display());
            let result = run_single_test(file);
            match &result.outcome {
                TestOutcome::Pass => {
                    passed += 1;
                    eprintln!("  {}  {}", style.pass(), result.label());
                }
                TestOutcome::Fail(_) => {
                    eprintln!("  {}  {}", style.fail(), result.label());
                    failures.push(result);
                }
            }
        }
    }

    if !failures.is_empty() {
        eprintln!();
        eprintln!("failures:");
        for f in &failures {
            eprintln!();
            eprintln!("  --- {} ---", f.path.display());
            if let TestOutcome::Fail(reason) = &f.outcome {
                for line in reason.lines() {
                    eprintln!("  {}", line);
                }
            }
        }
    }

    eprintln!();
    let failed = failures.len();
    if failed == 0 {
        eprintln!("test result: {}. {} passed, 0 failed", style.paint("32", "ok"), passed);
        0
    } else {
        eprintln!(
            "test result: {}. {} passed, {} failed (of {})",
            style.paint("31", "FAILED"),
            passed,
            failed,
            passed + failed
        );
        1
    }
}
