use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A byte list written as space-separated hex pairs, e.g. `"48 8B 12"`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexBytes(pub Vec<u8>);

impl FromStr for HexBytes {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bytes = parse_pattern(s)?
            .into_iter()
            .map(|b| {
                b.ok_or_else(|| {
                    Error::InvalidSignature(format!("Wildcard not allowed in '{}'", s))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self(bytes))
    }
}

impl TryFrom<String> for HexBytes {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<HexBytes> for String {
    fn from(value: HexBytes) -> Self {
        value.to_string()
    }
}

impl fmt::Display for HexBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_hex(&self.0))
    }
}

/// Byte signature: `prefix`, then `wildcard_count` unchecked bytes, then `suffix`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    prefix: Vec<u8>,
    wildcard_count: usize,
    suffix: Vec<u8>,
}

impl Signature {
    pub fn new(prefix: Vec<u8>, wildcard_count: usize, suffix: Vec<u8>) -> Result<Self> {
        if prefix.is_empty() {
            return Err(Error::InvalidSignature("Signature prefix is empty".to_string()));
        }
        if suffix.is_empty() {
            return Err(Error::InvalidSignature("Signature suffix is empty".to_string()));
        }
        Ok(Self {
            prefix,
            wildcard_count,
            suffix,
        })
    }

    /// Build a signature from a pattern like `"48 8B 12 ?? ?? 85 C0"`.
    ///
    /// The wildcards must form one contiguous run between the prefix and suffix.
    pub fn from_pattern(pattern: &str) -> Result<Self> {
        let tokens = parse_pattern(pattern)?;

        let prefix_len = tokens.iter().take_while(|b| b.is_some()).count();
        let wildcard_count = tokens[prefix_len..]
            .iter()
            .take_while(|b| b.is_none())
            .count();
        let suffix_start = prefix_len + wildcard_count;

        if wildcard_count == 0 {
            return Err(Error::InvalidSignature(format!(
                "Pattern '{}' has no wildcard run separating prefix and suffix",
                pattern
            )));
        }
        if tokens[suffix_start..].iter().any(|b| b.is_none()) {
            return Err(Error::InvalidSignature(format!(
                "Pattern '{}' has more than one wildcard run",
                pattern
            )));
        }

        let fixed = |range: &[Option<u8>]| range.iter().flatten().copied().collect::<Vec<_>>();
        Self::new(
            fixed(&tokens[..prefix_len]),
            wildcard_count,
            fixed(&tokens[suffix_start..]),
        )
    }

    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    pub fn wildcard_count(&self) -> usize {
        self.wildcard_count
    }

    pub fn suffix(&self) -> &[u8] {
        &self.suffix
    }

    /// Offset of the suffix relative to the start of a match.
    pub fn suffix_offset(&self) -> usize {
        self.prefix.len() + self.wildcard_count
    }

    /// Total number of bytes covered by a match.
    pub fn len(&self) -> usize {
        self.suffix_offset() + self.suffix.len()
    }

    /// Never true: both prefix and suffix are non-empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn pattern(&self) -> Vec<Option<u8>> {
        self.prefix
            .iter()
            .copied()
            .map(Some)
            .chain(std::iter::repeat_n(None, self.wildcard_count))
            .chain(self.suffix.iter().copied().map(Some))
            .collect()
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_pattern(&self.pattern()))
    }
}

/// Bytes written over the matched suffix. Same length as the signature suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementSuffix(Vec<u8>);

impl ReplacementSuffix {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Check that this replacement can stand in for `signature`'s suffix.
    pub fn validate_for(&self, signature: &Signature) -> Result<()> {
        if self.0.len() != signature.suffix().len() {
            return Err(Error::ReplacementLength {
                expected: signature.suffix().len(),
                actual: self.0.len(),
            });
        }
        Ok(())
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<HexBytes> for ReplacementSuffix {
    fn from(value: HexBytes) -> Self {
        Self(value.0)
    }
}

pub fn parse_pattern(pattern: &str) -> Result<Vec<Option<u8>>> {
    let mut bytes = Vec::new();
    for token in pattern.split_whitespace() {
        if token == "??" || token == "?" {
            bytes.push(None);
            continue;
        }

        let value = u8::from_str_radix(token, 16).map_err(|e| {
            Error::InvalidSignature(format!("Invalid signature token '{}': {}", token, e))
        })?;
        bytes.push(Some(value));
    }

    if bytes.is_empty() {
        return Err(Error::InvalidSignature("Signature pattern is empty".to_string()));
    }

    Ok(bytes)
}

pub fn format_pattern(bytes: &[Option<u8>]) -> String {
    bytes
        .iter()
        .map(|b| match b {
            Some(value) => format!("{:02X}", value),
            None => "??".to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Uppercase hex pairs separated by single spaces.
pub fn format_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
