//! Temporal expression text as submitted to a grammar engine.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Cannot normalize an empty temporal expression.")]
pub struct BlankTextError;

/// A non-blank temporal expression with whitespace runs collapsed.
///
/// `"some   time   today"` and `"some time today"` produce the same
/// [`TemporalText::collapsed`] value. The caller's original text is kept for
/// error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemporalText {
    original: String,
    collapsed: String,
}

impl TemporalText {
    pub fn new(raw: impl Into<String>) -> Result<Self, BlankTextError> {
        let original = raw.into();
        let collapsed = collapse_whitespace(&original);
        if collapsed.is_empty() {
            return Err(BlankTextError);
        }
        Ok(Self {
            original,
            collapsed,
        })
    }

    /// Text exactly as the caller supplied it.
    #[must_use]
    pub fn original(&self) -> &str {
        &self.original
    }

    /// Trimmed text with every whitespace run replaced by one space.
    #[must_use]
    pub fn collapsed(&self) -> &str {
        &self.collapsed
    }
}

impl fmt::Display for TemporalText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.collapsed)
    }
}

#[must_use]
pub fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
