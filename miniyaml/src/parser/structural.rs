use log::{debug, trace};

use crate::block::{Block, BlockError};
use crate::parser::error::ParseError;
use crate::parser::input::LineCursor;
use crate::parser::line::{self, Marker};
use crate::parser::{ParseFailure, ParserOptions};

const START_MARKER: &str = "---";
const END_MARKER: &str = "...";
const LITERAL_MARKER: &str = "|";

const START_MARKER_MISSING: &str =
    "Document marker not found (aka c-directives-end). Tip: start your document with '---'.";
const END_MARKER_MISSING: &str = "Document end marker not found (aka c-document-end). \
     Tip: end your document with '...' or check indentation levels.";

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse one explicit document out of `data`.
///
/// Anything before the `---` line or after the `...` line is ignored.
pub(crate) fn parse_document(data: &[u8], options: &ParserOptions) -> Result<Block, ParseFailure> {
    let mut state = ParseState::new(data, options);

    if !state.seek_start_marker() {
        return Err(ParseFailure {
            error: state.error_at_eof(START_MARKER_MISSING),
            partial: Block::new(),
        });
    }

    let mut root = Block::new();
    match state.parse_body(&mut root) {
        Ok(()) => Ok(root),
        Err(error) => {
            debug!("parse failed: {}", error);
            Err(ParseFailure {
                error,
                partial: root,
            })
        }
    }
}

// ---------------------------------------------------------------------------
// Parse state
// ---------------------------------------------------------------------------

struct ParseState<'a> {
    input: LineCursor<'a>,
    options: &'a ParserOptions,
}

impl<'a> ParseState<'a> {
    fn new(data: &'a [u8], options: &'a ParserOptions) -> Self {
        ParseState {
            input: LineCursor::new(data),
            options,
        }
    }

    fn seek_start_marker(&mut self) -> bool {
        while let Some(line) = self.input.read_logical_line() {
            if line.text == START_MARKER {
                debug!("start marker at line {}", line.number);
                return true;
            }
        }
        false
    }

    /// Everything between the markers, then the end marker itself.
    fn parse_body(&mut self, root: &mut Block) -> Result<(), ParseError> {
        let Some(first) = self.input.peek_logical_line() else {
            return Err(self.error_at_eof(END_MARKER_MISSING));
        };
        let indent = line::indent_width(&first.text).unwrap_or(0);

        self.parse_scope(root, indent, 0)?;

        match self.input.read_logical_line() {
            Some(line) if line.text == END_MARKER => {
                debug!("end marker at line {}", line.number);
                Ok(())
            }
            Some(line) => Err(ParseError::at_line(&line, END_MARKER_MISSING)),
            None => Err(self.error_at_eof(END_MARKER_MISSING)),
        }
    }

    /// Fill `container` with the items at exactly `indent`.
    ///
    /// Returns when a shallower line or the end marker is found; that line is
    /// left pushed back for the caller.
    fn parse_scope(
        &mut self,
        container: &mut Block,
        indent: usize,
        depth: usize,
    ) -> Result<(), ParseError> {
        trace!("enter scope indent={} depth={}", indent, depth);

        loop {
            let Some(line) = self.input.read_logical_line() else {
                return Err(self.error_at_eof(END_MARKER_MISSING));
            };
            if line.text == END_MARKER {
                self.input.push_back(line);
                break;
            }

            let Some(item) = line::classify(&line.text) else {
                return Err(ParseError::at_line(
                    &line,
                    format!("'key:' or '- sequence' expected, found: {}", line.text),
                ));
            };

            if item.indent > indent {
                return Err(ParseError::at_line(
                    &line,
                    format!(
                        "Mismatched map indentation, expected {} but was {}",
                        indent, item.indent
                    ),
                ));
            }
            if item.indent < indent {
                self.input.push_back(line);
                break;
            }

            let block_error = |e: BlockError| ParseError::at_line(&line, e.to_string());
            let child = match &item.marker {
                Marker::Key(key) => container.set_key(key.as_str(), Block::new()),
                Marker::Sequence | Marker::SequenceKey(_) => container.append(Block::new()),
            }
            .map_err(block_error)?;

            match &item.marker {
                Marker::SequenceKey(_) => {
                    // The key is parsed on the next pass, one column deeper,
                    // as the first entry of the item just appended.
                    let rewritten = line.with_text(item.unnest_key(&line.text));
                    self.input.push_back(rewritten);
                }
                Marker::Key(_) | Marker::Sequence if item.value == LITERAL_MARKER => {
                    let text = self.fold_literal(indent);
                    child.set_literal(text).map_err(block_error)?;
                }
                Marker::Key(_) | Marker::Sequence if !item.value.is_empty() => {
                    child.set_literal(item.value.as_str()).map_err(block_error)?;
                }
                Marker::Key(_) | Marker::Sequence => {}
            }

            if child.is_empty() {
                self.parse_nested(child, indent, depth)?;
            }
        }

        trace!("leave scope indent={} depth={}", indent, depth);
        Ok(())
    }

    /// Parse the deeper-indented lines following an empty item into `child`.
    /// Without any, the child stays empty.
    fn parse_nested(
        &mut self,
        child: &mut Block,
        indent: usize,
        depth: usize,
    ) -> Result<(), ParseError> {
        let Some(next) = self.input.peek_logical_line() else {
            return Ok(());
        };
        let Some(nested) = line::indent_width(&next.text) else {
            return Ok(());
        };
        if nested <= indent {
            return Ok(());
        }
        if depth + 1 > self.options.max_depth {
            return Err(ParseError::at_line(
                &next,
                format!(
                    "Nesting too deep: exceeded maximum depth of {}",
                    self.options.max_depth
                ),
            ));
        }
        self.parse_scope(child, nested, depth + 1)
    }

    /// Collect raw lines for a `|` literal until the end marker or an item at
    /// `indent` or shallower, which is pushed back.
    fn fold_literal(&mut self, indent: usize) -> String {
        let mut text = String::new();
        let mut count = 0usize;

        while let Some(line) = self.input.read_raw_line() {
            if line.text == END_MARKER || line::is_item_within(&line.text, indent) {
                self.input.push_back(line);
                break;
            }
            text.push_str(&line.text);
            text.push('\n');
            count += 1;
        }

        trace!("folded {} literal lines", count);
        text
    }

    fn error_at_eof(&self, message: &str) -> ParseError {
        ParseError::at(self.input.eof_line(), message).with_span(self.input.eof_span())
    }
}
