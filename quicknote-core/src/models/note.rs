//! Note content validation

use super::ValidationError;

/// Maximum length for note content, in characters
const MAX_CONTENT_CHARS: usize = 10_000;

/// Validated note content
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteContent(String);

impl NoteContent {
    /// Create new note content.
    ///
    /// # Rules
    /// - Must contain something other than whitespace
    /// - Max 10 000 characters
    ///
    /// The text is kept as written (not trimmed).
    ///
    /// # Example
    /// ```
    /// use quicknote_core::NoteContent;
    ///
    /// assert!(NoteContent::new("buy milk").is_ok());
    /// assert!(NoteContent::new("   ").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.trim().is_empty() {
            return Err(ValidationError::Required { field: "content" });
        }

        if s.chars().count() > MAX_CONTENT_CHARS {
            return Err(ValidationError::TooLong {
                field: "content",
                max: MAX_CONTENT_CHARS,
            });
        }

        Ok(Self(s.to_owned()))
    }

    /// Get the content as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for NoteContent {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
