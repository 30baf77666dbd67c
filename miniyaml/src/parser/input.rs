use std::ops::Range;

/// One line of input, without its terminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    /// 1-based line number.
    pub number: usize,
    /// Byte range of `text` in the input.
    pub span: Range<usize>,
}

impl Line {
    /// Blank or comment-only (`^\s*(#.*)?$`).
    pub fn is_blank(&self) -> bool {
        let rest = self.text.trim_start();
        rest.is_empty() || rest.starts_with('#')
    }

    /// Same location, different text.
    pub fn with_text(&self, text: String) -> Line {
        Line {
            text,
            number: self.number,
            span: self.span.clone(),
        }
    }
}

/// Line reader over a byte buffer with a single line of pushback.
///
/// Lines end at `\n`; a `\r` directly before it is dropped. A final
/// fragment with no `\n` is still returned as a line. Bytes are decoded
/// lossily as UTF-8.
pub struct LineCursor<'a> {
    src: &'a [u8],
    pos: usize,
    pushed_back: Option<Line>,
    line_count: usize,
}

impl<'a> LineCursor<'a> {
    pub fn new(src: &'a [u8]) -> Self {
        LineCursor {
            src,
            pos: 0,
            pushed_back: None,
            line_count: 0,
        }
    }

    /// Number of lines consumed from the buffer so far.
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    /// The line number reported for errors found at end of input: the line
    /// just past the last one consumed.
    pub fn eof_line(&self) -> usize {
        self.line_count() + 1
    }

    pub fn eof_span(&self) -> Range<usize> {
        self.src.len()..self.src.len()
    }

    /// Next line that is neither blank nor a comment.
    pub fn read_logical_line(&mut self) -> Option<Line> {
        if let Some(line) = self.pushed_back.take() {
            if !line.is_blank() {
                return Some(line);
            }
        }
        while let Some(line) = self.next_from_buffer() {
            if !line.is_blank() {
                return Some(line);
            }
        }
        None
    }

    /// Next line, blank and comment lines included.
    pub fn read_raw_line(&mut self) -> Option<Line> {
        self.pushed_back.take().or_else(|| self.next_from_buffer())
    }

    /// Next logical line, left in place for the following read.
    pub fn peek_logical_line(&mut self) -> Option<Line> {
        let line = self.read_logical_line()?;
        self.push_back(line.clone());
        Some(line)
    }

    /// Make `line` the result of the next read.
    ///
    /// # Panics
    ///
    /// If a line is already pushed back. The parser never needs more than one
    /// line of lookahead, so a second pushback is a parser bug.
    pub fn push_back(&mut self, line: Line) {
        if let Some(held) = &self.pushed_back {
            panic!(
                "internal error: can only push back one line (holding line {}, got line {})",
                held.number, line.number
            );
        }
        self.pushed_back = Some(line);
    }

    fn next_from_buffer(&mut self) -> Option<Line> {
        if self.pos >= self.src.len() {
            return None;
        }
        let start = self.pos;
        let rest = &self.src[start..];
        let (content, consumed) = match rest.iter().position(|&b| b == b'\n') {
            Some(nl) => {
                let end = if nl > 0 && rest[nl - 1] == b'\r' { nl - 1 } else { nl };
                (&rest[..end], nl + 1)
            }
            None => (rest, rest.len()),
        };
        self.pos += consumed;
        self.line_count += 1;

        Some(Line {
            text: String::from_utf8_lossy(content).into_owned(),
            number: self.line_count,
            span: start..start + content.len(),
        })
    }
}
