//! Stops awaiting enrichment and the serialised tag lists they carry.
//!
//! A [`PointsTable`] keeps every input column verbatim so enriched output
//! can reproduce the original attributes in their original order. Only the
//! `tags` column is interpreted, and only lazily: [`parse_tag_list`] runs
//! per stop so a malformed row can be reported without rejecting the table.
//! Rows whose width differs from the header's are kept too; [`Stop::width_mismatch`]
//! lets the caller skip them one by one.

use std::iter::Peekable;
use std::str::CharIndices;

use thiserror::Error;

/// Header of the column holding each stop's serialised tag list.
pub const TAGS_COLUMN: &str = "tags";

/// Errors returned by [`PointsTable::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PointsTableError {
    /// The header row lacks a `tags` column.
    #[error("points table has no '{TAGS_COLUMN}' column")]
    MissingTagsColumn,
}

/// Tabular stop data with pass-through attributes.
///
/// # Examples
/// ```
/// use moca_core::PointsTable;
///
/// # fn main() -> Result<(), moca_core::PointsTableError> {
/// let table = PointsTable::new(
///     vec!["id".into(), "tags".into()],
///     vec![vec!["1".into(), "['bakery']".into()]],
/// )?;
/// let stop = table.stops().next().expect("one stop");
/// assert_eq!(stop.raw_tags, "['bakery']");
/// assert_eq!(stop.attributes, ["1", "['bakery']"]);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointsTable {
    columns: Vec<String>,
    tags_column: usize,
    rows: Vec<Vec<String>>,
}

impl PointsTable {
    /// Validate the header.
    ///
    /// Rows are accepted whatever their width; ragged rows surface later
    /// through [`Stop::width_mismatch`].
    ///
    /// # Errors
    /// Returns [`PointsTableError::MissingTagsColumn`] when no `tags` column
    /// exists.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, PointsTableError> {
        let tags_column = columns
            .iter()
            .position(|column| column == TAGS_COLUMN)
            .ok_or(PointsTableError::MissingTagsColumn)?;
        Ok(Self {
            columns,
            tags_column,
            rows,
        })
    }

    /// Column headers in input order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Iterate over stops in input order.
    pub fn stops(&self) -> impl Iterator<Item = Stop<'_>> + '_ {
        self.rows.iter().enumerate().map(|(position, values)| Stop {
            position,
            attributes: values,
            raw_tags: values.get(self.tags_column).map_or("", String::as_str),
            expected_width: self.columns.len(),
        })
    }

    /// Number of stops.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Report whether the table has no stops.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A borrowed view of one stop in a [`PointsTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stop<'a> {
    /// Zero-based position in the input.
    pub position: usize,
    /// Every input field, in column order.
    pub attributes: &'a [String],
    /// Unparsed `tags` field.
    pub raw_tags: &'a str,
    /// Number of columns in the table header.
    pub expected_width: usize,
}

impl Stop<'_> {
    /// Return `Some((expected, found))` when the row's field count differs
    /// from the header's.
    #[must_use]
    pub const fn width_mismatch(&self) -> Option<(usize, usize)> {
        let found = self.attributes.len();
        if found == self.expected_width {
            None
        } else {
            Some((self.expected_width, found))
        }
    }

    /// Parse this stop's tag list.
    ///
    /// # Errors
    /// Returns [`TagListError`] when the field is not a list of strings.
    pub fn tags(&self) -> Result<Vec<String>, TagListError> {
        parse_tag_list(self.raw_tags)
    }
}

/// Errors returned by [`parse_tag_list`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagListError {
    /// The field is blank.
    #[error("tag list is empty text")]
    Blank,
    /// The field does not open with `[`.
    #[error("tag list must be enclosed in square brackets")]
    NotAList,
    /// A string literal was never closed.
    #[error("unterminated string literal starting at byte {position}")]
    Unterminated {
        /// Byte offset of the opening quote.
        position: usize,
    },
    /// A character other than the expected token was found.
    #[error("unexpected '{found}' at byte {position}")]
    Unexpected {
        /// Offending character.
        found: char,
        /// Byte offset of the character.
        position: usize,
    },
    /// The list closed but more text followed.
    #[error("unexpected text after the closing bracket at byte {position}")]
    TrailingInput {
        /// Byte offset of the first trailing character.
        position: usize,
    },
    /// An escape sequence could not be decoded.
    #[error("invalid escape sequence at byte {position}")]
    InvalidEscape {
        /// Byte offset of the backslash.
        position: usize,
    },
}

/// Parse a serialised list of tag strings.
///
/// Both JSON (`["a", "b"]`) and single-quoted literal (`['a', "b"]`) notation are
/// accepted, since upstream data sources emit either.
///
/// # Errors
/// Returns [`TagListError`] when the text is not a flat list of strings.
///
/// # Examples
/// ```
/// use moca_core::parse_tag_list;
///
/// assert_eq!(parse_tag_list(r#"["bakery", "school"]"#).ok(), Some(vec!["bakery".to_owned(), "school".to_owned()]));
/// assert_eq!(parse_tag_list("['bakery', \"kid's park\"]").ok(), Some(vec!["bakery".to_owned(), "kid's park".to_owned()]));
/// assert_eq!(parse_tag_list("[]").ok(), Some(Vec::new()));
/// assert!(parse_tag_list("bakery").is_err());
/// ```
pub fn parse_tag_list(raw: &str) -> Result<Vec<String>, TagListError> {
    if let Ok(tags) = serde_json::from_str::<Vec<String>>(raw) {
        return Ok(tags);
    }
    LiteralParser::new(raw).parse()
}

/// Recursive-descent reader for a single-quoted list literal of strings.
struct LiteralParser<'a> {
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> LiteralParser<'a> {
    fn new(raw: &'a str) -> Self {
        Self {
            chars: raw.char_indices().peekable(),
        }
    }

    fn parse(mut self) -> Result<Vec<String>, TagListError> {
        self.skip_whitespace();
        match self.chars.next() {
            None => return Err(TagListError::Blank),
            Some((_, '[')) => {}
            Some(_) => return Err(TagListError::NotAList),
        }

        let mut tags = Vec::new();
        loop {
            self.skip_whitespace();
            match self.chars.next() {
                Some((_, ']')) => break,
                Some((position, quote @ ('\'' | '"'))) => {
                    tags.push(self.string(position, quote)?);
                }
                Some((position, found)) => {
                    return Err(TagListError::Unexpected { found, position });
                }
                None => return Err(TagListError::NotAList),
            }

            self.skip_whitespace();
            match self.chars.next() {
                Some((_, ',')) => {}
                Some((_, ']')) => break,
                Some((position, found)) => {
                    return Err(TagListError::Unexpected { found, position });
                }
                None => return Err(TagListError::NotAList),
            }
        }

        self.skip_whitespace();
        if let Some((position, _)) = self.chars.next() {
            return Err(TagListError::TrailingInput { position });
        }
        Ok(tags)
    }

    fn skip_whitespace(&mut self) {
        while self.chars.next_if(|(_, c)| c.is_whitespace()).is_some() {}
    }

    fn string(&mut self, start: usize, quote: char) -> Result<String, TagListError> {
        let mut text = String::new();
        loop {
            match self.chars.next() {
                None => return Err(TagListError::Unterminated { position: start }),
                Some((_, c)) if c == quote => return Ok(text),
                Some((position, '\\')) => self.escape(position, &mut text)?,
                Some((_, c)) => text.push(c),
            }
        }
    }

    fn escape(&mut self, position: usize, text: &mut String) -> Result<(), TagListError> {
        let Some((_, code)) = self.chars.next() else {
            return Err(TagListError::InvalidEscape { position });
        };
        match code {
            '\\' | '\'' | '"' => text.push(code),
            'n' => text.push('\n'),
            't' => text.push('\t'),
            'r' => text.push('\r'),
            '0' => text.push('\0'),
            'x' => text.push(self.code_point(position, 2)?),
            'u' => text.push(self.code_point(position, 4)?),
            'U' => text.push(self.code_point(position, 8)?),
            other => {
                // Unknown escapes are kept literally.
                text.push('\\');
                text.push(other);
            }
        }
        Ok(())
    }

    fn code_point(&mut self, position: usize, digits: usize) -> Result<char, TagListError> {
        let mut value = 0_u32;
        for _ in 0..digits {
            let digit = self
                .chars
                .next()
                .and_then(|(_, c)| c.to_digit(16))
                .ok_or(TagListError::InvalidEscape { position })?;
            value = value
                .checked_mul(16)
                .and_then(|shifted| shifted.checked_add(digit))
                .ok_or(TagListError::InvalidEscape { position })?;
        }
        char::from_u32(value).ok_or(TagListError::InvalidEscape { position })
    }
}
