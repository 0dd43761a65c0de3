//! Parse errors with line/column positions
//!
//! The matcher reports a byte offset and the rules it expected there. This
//! module turns that into a 1-based line/column, the text of the offending
//! line, and a rendered message with a caret under the failure point.

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("{0}")]
    Syntax(SyntaxError),

    #[error("Lockfile is empty")]
    EmptyInput,

    #[error("Invalid UTF-8 at line {line}, column {column}")]
    InvalidUtf8 { line: usize, column: usize },
}

impl ParseError {
    /// Line and column of the failure, when there is one.
    pub fn position(&self) -> Option<(usize, usize)> {
        match self {
            ParseError::Syntax(err) => Some((err.line, err.column)),
            ParseError::InvalidUtf8 { line, column } => Some((*line, *column)),
            ParseError::EmptyInput => None,
        }
    }

    pub(crate) fn invalid_utf8(bytes: &[u8], err: std::str::Utf8Error) -> Self {
        let valid = std::str::from_utf8(&bytes[..err.valid_up_to()]).unwrap_or("");
        let location = Location::find(valid, valid.len());
        ParseError::InvalidUtf8 {
            line: location.line,
            column: location.column,
        }
    }
}

/// The grammar did not match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    /// 1-based line number.
    pub line: usize,
    /// 1-based column, counted in characters.
    pub column: usize,
    /// Byte offset into the input.
    pub offset: usize,
    /// Human-readable description of what was expected.
    pub expected: String,
    /// The full text of the offending line, without its terminator.
    pub context: String,
}

impl SyntaxError {
    pub fn new(input: &str, offset: usize, expected: &[&str]) -> Self {
        let location = Location::find(input, offset);
        Self {
            line: location.line,
            column: location.column,
            offset,
            expected: describe_expected(expected),
            context: location.text.to_string(),
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, column {}: expected {}",
            self.line, self.column, self.expected
        )?;
        if !self.context.is_empty() {
            let caret = " ".repeat(self.column.saturating_sub(1));
            write!(f, "\n  {}\n  {}^", self.context, caret)?;
        }
        Ok(())
    }
}

impl std::error::Error for SyntaxError {}

/// Join labels as "a, b or c".
fn describe_expected(labels: &[&str]) -> String {
    match labels {
        [] => "valid lockfile syntax".to_string(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} or {}", init.join(", "), last),
    }
}

/// Where an offset falls in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Location<'a> {
    line: usize,
    column: usize,
    text: &'a str,
}

impl<'a> Location<'a> {
    /// Scan once up to `offset`, treating `\r\n`, `\n` and `\r` as line
    /// terminators. Offsets past the end or inside a character are clamped.
    fn find(input: &'a str, offset: usize) -> Self {
        let mut offset = offset.min(input.len());
        while !input.is_char_boundary(offset) {
            offset -= 1;
        }

        let bytes = input.as_bytes();
        let mut line = 1;
        let mut line_start = 0;
        let mut i = 0;
        while i < offset {
            match bytes[i] {
                b'\n' => {
                    line += 1;
                    line_start = i + 1;
                }
                b'\r' => {
                    if bytes.get(i + 1) == Some(&b'\n') {
                        // The failure may point at the '\n' of a CRLF pair.
                        if i + 1 == offset {
                            break;
                        }
                        i += 1;
                    }
                    line += 1;
                    line_start = i + 1;
                }
                _ => {}
            }
            i += 1;
        }

        let rest = &input[line_start..];
        let line_len = rest.find(['\r', '\n']).unwrap_or(rest.len());
        let column = input[line_start..offset].chars().count() + 1;

        Self {
            line,
            column,
            text: &rest[..line_len],
        }
    }
}
