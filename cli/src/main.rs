mod query;
mod test_runner;

use std::path::Path;
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use log::debug;

use miniyaml::{ParseError, ParserOptions};

const SUBCOMMANDS: &[&str] = &["parse", "test", "help"];
const VALUE_OPTIONS: &[&str] = &["--get", "--max-depth", "-c", "--category"];

#[derive(Parser)]
#[command(name = "miniyaml", version, about = "Mini YAML document parser")]
struct Cli {
    /// Disable colored error output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log parser activity to stderr (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a document and print its tree
    Parse(ParseArgs),

    /// Run .test.yaml fixture files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct ParseArgs {
    /// Document to parse
    file: String,

    /// Parse only, don't print (exit 0 if valid)
    #[arg(long)]
    check: bool,

    /// Dump the parsed tree structure
    #[arg(long)]
    tree: bool,

    /// Print the value at a dotted path, e.g. `items.0.name`
    #[arg(long, value_name = "PATH")]
    get: Option<String>,

    /// Maximum nesting depth
    #[arg(long, default_value_t = ParserOptions::DEFAULT_MAX_DEPTH)]
    max_depth: usize,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.yaml file or directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    // `miniyaml file.yaml` is shorthand for `miniyaml parse file.yaml`.
    let mut args: Vec<String> = std::env::args().collect();
    if let Some(pos) = first_positional(&args) {
        if !SUBCOMMANDS.contains(&args[pos].as_str()) {
            args.insert(1, "parse".to_string());
        }
    }

    let cli = Cli::parse_from(&args);
    init_logging(cli.verbose);

    match cli.command {
        Command::Parse(parse_args) => do_parse(parse_args, cli.no_color),
        Command::Test(test_args) => {
            let path = Path::new(&test_args.path);
            if test_args.list_categories {
                test_runner::list_categories(path);
                return;
            }
            let exit_code = test_runner::run_tests(path, cli.no_color, &test_args.category);
            process::exit(exit_code);
        }
    }
}

/// Index of the first argument that is neither an option nor an option's value.
fn first_positional(args: &[String]) -> Option<usize> {
    let mut i = 1;
    while i < args.len() {
        let arg = args[i].as_str();
        if !arg.starts_with('-') {
            return Some(i);
        }
        i += if VALUE_OPTIONS.contains(&arg) { 2 } else { 1 };
    }
    None
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}

fn do_parse(args: ParseArgs, no_color: bool) {
    let data = match std::fs::read(&args.file) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", args.file, e);
            process::exit(1);
        }
    };
    debug!("read {} bytes from {}", data.len(), args.file);

    let options = ParserOptions::default().with_max_depth(args.max_depth);
    let parser = miniyaml::Parser::with_options(options);
    let root = match parser.parse(&data) {
        Ok(root) => root,
        Err(failure) => {
            let error = failure.into_error();
            emit_parse_error(&args.file, &data, &error, no_color);
            process::exit(1);
        }
    };

    if args.check {
        eprintln!("ok: {} parsed successfully", args.file);
        return;
    }

    if args.tree {
        println!("{:#?}", root);
        return;
    }

    let target = match &args.get {
        Some(path) => match query::lookup(&root, path) {
            Some(block) => block,
            None => {
                eprintln!("error: no value at '{}' in {}", path, args.file);
                process::exit(1);
            }
        },
        None => &root,
    };

    match target.as_str() {
        Some(text) if text.ends_with('\n') => print!("{}", text),
        Some(text) => println!("{}", text),
        None => println!("{}", target),
    }
}

fn emit_parse_error(name: &str, data: &[u8], error: &ParseError, no_color: bool) {
    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    let mut files = SimpleFiles::new();
    let file_id = files.add(name.to_string(), String::from_utf8_lossy(data).into_owned());

    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();
    let diagnostic = error.to_diagnostic(file_id);
    if term::emit_to_write_style(&mut writer.lock(), &config, &files, &diagnostic).is_err() {
        eprintln!("error: {}", error);
    }
}
