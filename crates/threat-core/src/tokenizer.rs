//! Fixed-width splitting of delimited feed lines.
//!
//! Both feeds are comma-delimited with a fixed field count. The tokenizer never
//! fails: it reports blank input, a field-count mismatch, or the trimmed fields,
//! and leaves the skip/continue decision to the caller.

/// Delimiter used by every feed.
pub const FIELD_DELIMITER: char = ',';

/// Outcome of tokenizing one raw line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tokens<'a> {
    /// Nothing to parse once whitespace is trimmed.
    Blank,
    /// Exactly the expected number of trimmed fields.
    Fields(Vec<&'a str>),
    /// Wrong number of fields (a shape error).
    Mismatch { expected: usize, found: usize },
}

impl<'a> Tokens<'a> {
    /// The fields, if the line had the expected shape.
    pub fn into_fields(self) -> Option<Vec<&'a str>> {
        match self {
            Tokens::Fields(fields) => Some(fields),
            _ => None,
        }
    }
}

/// Splits lines into a fixed number of trimmed fields.
#[derive(Debug, Clone, Copy)]
pub struct LineTokenizer {
    delimiter: char,
    expected: usize,
}

impl LineTokenizer {
    /// Tokenizer for comma-delimited lines with `expected` fields.
    pub const fn new(expected: usize) -> Self {
        Self {
            delimiter: FIELD_DELIMITER,
            expected,
        }
    }

    /// Tokenizer with a custom delimiter.
    pub const fn with_delimiter(delimiter: char, expected: usize) -> Self {
        Self {
            delimiter,
            expected,
        }
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    pub fn tokenize<'a>(&self, line: &'a str) -> Tokens<'a> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Tokens::Blank;
        }

        let fields: Vec<&str> = trimmed.split(self.delimiter).map(str::trim).collect();
        if fields.len() != self.expected {
            return Tokens::Mismatch {
                expected: self.expected,
                found: fields.len(),
            };
        }

        Tokens::Fields(fields)
    }

    /// `true` iff the line splits into exactly the expected number of fields.
    pub fn has_expected_shape(&self, line: &str) -> bool {
        line.trim().split(self.delimiter).count() == self.expected
    }
}
