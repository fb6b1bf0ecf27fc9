use crate::base62::ShortCodeBase62;
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::hash::{Hash, Hasher};

/// A validated short code identifier for a shortened URL.
///
/// Short codes must be 1-50 characters long and contain only
/// alphanumeric characters, hyphens, or underscores. Two codes are equal
/// when their text is equal, regardless of how they were produced.
#[derive(Clone, Debug)]
pub enum ShortCode {
    /// A system-generated short code (the base62 form of a sequence id).
    Generated(ShortCodeBase62),
    /// A user-provided custom short code.
    Custom(String),
}

const MIN_LENGTH: usize = 1;
/// Longest accepted short code, in bytes.
pub const MAX_LENGTH: usize = 50;

/// Path segments claimed by the HTTP routes; a custom alias may not use them.
///
/// Matching is case-insensitive.
pub const RESERVED_ALIASES: &[&str] = &["docs", "openapi.json", "redoc", "shorten", "health", "stats"];

impl ShortCode {
    /// Creates a `ShortCode` from a value that can be converted into [`ShortCodeBase62`].
    ///
    /// This accepts a [`ShortCodeBase62`] directly, or a `u64` which will be
    /// encoded as base62.
    ///
    /// # Examples
    ///
    /// ```
    /// use burrow_core::ShortCode;
    ///
    /// let code = ShortCode::generated(1_u64);
    /// assert_eq!(code.as_str(), "b");
    /// ```
    pub fn generated(code: impl Into<ShortCodeBase62>) -> Self {
        Self::Generated(code.into())
    }

    /// Creates a new `ShortCode` after validating the input.
    ///
    /// Valid codes are 1-50 characters and contain only `[a-zA-Z0-9_-]`.
    /// Use this for codes arriving from the outside world, e.g. a request path.
    pub fn new(code: impl Into<String>) -> Result<Self> {
        let code = code.into();
        Self::validate(&code)?;
        Ok(Self::Custom(code))
    }

    /// Creates a custom alias chosen by a caller.
    ///
    /// On top of the checks done by [`ShortCode::new`], the alias must not
    /// collide with a [reserved](RESERVED_ALIASES) path segment.
    pub fn alias(code: impl Into<String>) -> Result<Self> {
        let code = code.into();
        Self::validate(&code)?;
        if Self::is_reserved(&code) {
            return Err(CoreError::ReservedShortCode(code));
        }
        Ok(Self::Custom(code))
    }

    /// Creates a `ShortCode` without validation.
    ///
    /// Use this only for codes produced by trusted internal sources
    /// (e.g. rows read back from the record store).
    pub fn new_unchecked(code: impl Into<String>) -> Self {
        Self::Custom(code.into())
    }

    /// Returns `true` if `code` matches a reserved path segment.
    pub fn is_reserved(code: &str) -> bool {
        RESERVED_ALIASES
            .iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(code))
    }

    /// Generates the full shortened URL based on the provided base URL.
    pub fn to_url(&self, base_url: &str) -> String {
        format!("{}/{}", base_url.trim_end_matches('/'), self)
    }

    /// Returns the short code as a string slice.
    pub fn as_str(&self) -> &str {
        match self {
            ShortCode::Generated(code) => code.as_str(),
            ShortCode::Custom(s) => s.as_str(),
        }
    }

    fn validate(code: &str) -> Result<()> {
        if code.len() < MIN_LENGTH || code.len() > MAX_LENGTH {
            return Err(CoreError::InvalidShortCode(format!(
                "length must be between {} and {}, got {}",
                MIN_LENGTH,
                MAX_LENGTH,
                code.len()
            )));
        }

        if !code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(CoreError::InvalidShortCode(format!(
                "must contain only alphanumeric characters, hyphens, or underscores: '{}'",
                code
            )));
        }

        Ok(())
    }
}

impl PartialEq for ShortCode {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for ShortCode {}

impl Hash for ShortCode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl Display for ShortCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ShortCode {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ShortCode {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_codes() {
        assert!(ShortCode::new("a").is_ok());
        assert!(ShortCode::new("Abc-123_xyz").is_ok());
        assert!(ShortCode::new("a".repeat(50)).is_ok());
    }

    #[test]
    fn empty_is_rejected() {
        assert!(matches!(
            ShortCode::new(""),
            Err(CoreError::InvalidShortCode(_))
        ));
    }

    #[test]
    fn too_long() {
        assert!(ShortCode::new("a".repeat(51)).is_err());
    }

    #[test]
    fn invalid_characters() {
        assert!(ShortCode::new("abc def").is_err());
        assert!(ShortCode::new("abc/def").is_err());
        assert!(ShortCode::new("abc!def").is_err());
        assert!(ShortCode::new("openapi.json").is_err());
    }

    #[test]
    fn reserved_aliases_are_rejected_case_insensitively() {
        for reserved in ["docs", "DOCS", "Redoc", "shorten", "health", "stats"] {
            assert_eq!(
                ShortCode::alias(reserved),
                Err(CoreError::ReservedShortCode(reserved.to_string()))
            );
        }
        // reserved words are still valid lookup keys
        assert!(ShortCode::new("docs").is_ok());
    }

    #[test]
    fn alias_accepts_regular_codes() {
        let code = ShortCode::alias("promo").unwrap();
        assert_eq!(code.as_str(), "promo");
        assert!(matches!(code, ShortCode::Custom(_)));
    }

    #[test]
    fn generated_and_custom_with_same_text_are_equal() {
        let generated = ShortCode::generated(1_u64);
        let custom = ShortCode::new("b").unwrap();
        assert_eq!(generated, custom);
    }

    #[test]
    fn display_generated() {
        let code = ShortCode::generated(62_u64);
        assert_eq!(code.to_string(), "ba");
    }

    #[test]
    fn to_url_custom() {
        let code = ShortCode::new("abc123").unwrap();
        assert_eq!(code.to_url("https://bur.row"), "https://bur.row/abc123");
        assert_eq!(code.to_url("https://bur.row/"), "https://bur.row/abc123");
    }
}
