//! Line and token helpers shared by the ASCII decoders.

use std::path::Path;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A line of a text mesh file together with its 1-based position in the file.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Line<'a> {
    pub number: usize,
    pub text: &'a str,
}

impl<'a> Line<'a> {
    pub fn tokens(&self) -> std::str::SplitWhitespace<'a> {
        self.text.split_whitespace()
    }

    pub fn first_token(&self) -> Option<&'a str> {
        self.tokens().next()
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Parses the whitespace-delimited field at `index`.
    pub fn field<T: FromStr>(&self, index: usize, what: &str) -> Result<T> {
        let token = self.tokens().nth(index).ok_or_else(|| {
            Error::malformed(self.number, format!("missing {what} (field {})", index + 1))
        })?;
        parse_token(token, self.number, what)
    }

    /// Parses every field on the line.
    pub fn values<T: FromStr>(&self, what: &str) -> Result<Vec<T>> {
        self.tokens()
            .map(|t| parse_token(t, self.number, what))
            .collect()
    }
}

pub(crate) fn parse_token<T: FromStr>(token: &str, line: usize, what: &str) -> Result<T> {
    token
        .parse()
        .map_err(|_| Error::malformed(line, format!("expected {what}, found {token:?}")))
}

/// Reads a whole file as text. A file that is not valid UTF-8 is treated as a binary coded
/// variant of `format`.
pub(crate) fn read_text(path: &Path, format: &'static str) -> Result<String> {
    let bytes = std::fs::read(path)?;
    String::from_utf8(bytes).map_err(|_| Error::BinaryUnsupported { format })
}

/// Every line of `text`, blank lines included.
pub(crate) fn all_lines(text: &str) -> Vec<Line<'_>> {
    text.lines()
        .enumerate()
        .map(|(i, text)| Line { number: i + 1, text })
        .collect()
}

/// The lines of `text` that contain something other than whitespace.
pub(crate) fn non_empty_lines(text: &str) -> Vec<Line<'_>> {
    all_lines(text).into_iter().filter(|l| !l.is_blank()).collect()
}

/// Index of the first line whose leading token is `keyword`.
pub(crate) fn find_keyword(lines: &[Line<'_>], keyword: &str) -> Option<usize> {
    lines.iter().position(|l| l.first_token() == Some(keyword))
}
