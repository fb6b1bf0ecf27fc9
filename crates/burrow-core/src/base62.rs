use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt::Display;

/// Digits in order of value: `a` is zero, `9` is sixty-one.
pub const ALPHABET: &[u8; 62] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

const BASE: u64 = 62;

// 62^11 > u64::MAX
const MAX_DIGITS: usize = 11;

/// Encodes `value` as a base62 string, most significant digit first.
///
/// Zero encodes to `"a"`; no other value carries leading zero digits.
pub fn encode(value: u64) -> SmolStr {
    let mut buf = [ALPHABET[0]; MAX_DIGITS];
    let mut pos = MAX_DIGITS;
    let mut remaining = value;

    loop {
        pos -= 1;
        buf[pos] = ALPHABET[(remaining % BASE) as usize];
        remaining /= BASE;
        if remaining == 0 {
            break;
        }
    }

    buf[pos..].iter().map(|&b| b as char).collect()
}

/// Decodes a base62 string produced by [`encode`].
///
/// Fails on an empty string, on any character outside [`ALPHABET`], and when
/// the value does not fit in a `u64`.
pub fn decode(code: &str) -> Result<u64> {
    if code.is_empty() {
        return Err(CoreError::InvalidBase62("code is empty".to_string()));
    }

    code.chars().try_fold(0_u64, |acc, c| {
        let digit = digit_of(c).ok_or_else(|| {
            CoreError::InvalidBase62(format!("character '{c}' is not in the alphabet: '{code}'"))
        })?;
        acc.checked_mul(BASE)
            .and_then(|shifted| shifted.checked_add(digit))
            .ok_or_else(|| CoreError::InvalidBase62(format!("value overflows u64: '{code}'")))
    })
}

fn digit_of(c: char) -> Option<u64> {
    match c {
        'a'..='z' => Some(c as u64 - 'a' as u64),
        'A'..='Z' => Some(c as u64 - 'A' as u64 + 26),
        '0'..='9' => Some(c as u64 - '0' as u64 + 52),
        _ => None,
    }
}

/// A short code encoded as base62 string.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ShortCodeBase62(SmolStr);

impl ShortCodeBase62 {
    /// Creates a new `ShortCodeBase62` by encoding the given integer.
    ///
    /// # Examples
    ///
    /// ```
    /// use burrow_core::base62::ShortCodeBase62;
    ///
    /// assert_eq!(ShortCodeBase62::new(62).as_str(), "ba");
    /// ```
    pub fn new(value: u64) -> Self {
        Self(encode(value))
    }

    /// Parses an already-encoded code, rejecting anything [`decode`] rejects.
    pub fn parse(code: &str) -> Result<Self> {
        decode(code)?;
        Ok(Self(SmolStr::new(code)))
    }

    /// Returns the integer this code encodes.
    pub fn value(&self) -> u64 {
        // Construction guarantees the string decodes.
        decode(&self.0).unwrap_or_default()
    }

    /// Returns the short code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for ShortCodeBase62 {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl std::fmt::Debug for ShortCodeBase62 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ShortCodeBase62").field(&self.0).finish()
    }
}

impl Display for ShortCodeBase62 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for ShortCodeBase62 {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ShortCodeBase62 {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = SmolStr::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
