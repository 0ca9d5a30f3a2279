//! Validated identifiers shared across the health record crates.
//!
//! [`RecordKey`] is the one key type used for both document keys and collection names.

/// Errors returned when validating a [`RecordKey`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TextError {
    /// The input was empty or contained only whitespace
    #[error("Key cannot be empty")]
    Empty,

    /// The input is longer than the store accepts for a key
    #[error("Key exceeds maximum length of {max} bytes")]
    TooLong { max: usize },

    /// The input contains a character or sequence that cannot appear in a key
    #[error("Key contains a reserved character or name: {0}")]
    Reserved(String),
}

/// An identifier that is safe to use as a document key.
///
/// Hosted document databases address documents by a path of the form
/// `collection/key`, so a key may not contain `/`, may not be `.` or `..`, and is
/// limited to 1500 bytes. Surrounding whitespace is trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey(String);

impl RecordKey {
    /// Maximum encoded length of a key in bytes.
    pub const MAX_LEN: usize = 1500;

    /// Validates `input` as a document key.
    ///
    /// # Errors
    ///
    /// - [`TextError::Empty`] if the trimmed input is empty
    /// - [`TextError::TooLong`] if it exceeds [`RecordKey::MAX_LEN`] bytes
    /// - [`TextError::Reserved`] if it contains `/` or is `.` / `..`
    pub fn parse(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        if trimmed.len() > Self::MAX_LEN {
            return Err(TextError::TooLong { max: Self::MAX_LEN });
        }
        if trimmed == "." || trimmed == ".." {
            return Err(TextError::Reserved(trimmed.to_owned()));
        }
        if trimmed.contains('/') {
            return Err(TextError::Reserved("/".into()));
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_key_trims_and_rejects_blank_input() {
        assert_eq!(RecordKey::parse("  P1 ").unwrap().as_str(), "P1");
        assert_eq!(RecordKey::parse("   "), Err(TextError::Empty));
        assert_eq!(RecordKey::parse(""), Err(TextError::Empty));
    }

    #[test]
    fn record_key_accepts_typical_ids() {
        for id in ["P1", "patient-0042", "MRN 12345", "a.b"] {
            let key = RecordKey::parse(id).expect("should be a valid key");
            assert_eq!(key.as_str(), id);
        }
    }

    #[test]
    fn record_key_rejects_slash_and_dot_names() {
        assert!(matches!(
            RecordKey::parse("a/b"),
            Err(TextError::Reserved(_))
        ));
        assert!(matches!(RecordKey::parse("."), Err(TextError::Reserved(_))));
        assert!(matches!(RecordKey::parse(".."), Err(TextError::Reserved(_))));
    }

    #[test]
    fn record_key_rejects_oversized_input() {
        let long = "x".repeat(RecordKey::MAX_LEN + 1);
        assert_eq!(
            RecordKey::parse(long),
            Err(TextError::TooLong {
                max: RecordKey::MAX_LEN
            })
        );
    }
}
