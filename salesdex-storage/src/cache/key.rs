//! Query-aware cache keys.
//!
//! A key is an operation name plus its parameters in canonical order, so two
//! requests that differ only in parameter order, percent-encoding, or empty
//! parameters land on the same entry.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Canonical cache key: operation plus sorted, decoded, non-empty parameters.
///
/// Fields are private so every key goes through the normalizing constructors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey {
    operation: String,
    params: Vec<(String, String)>,
}

impl CacheKey {
    /// Key for an operation without parameters.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            params: Vec::new(),
        }
    }

    /// Add a parameter. Names and values are trimmed; pairs with an empty
    /// name or value are ignored.
    pub fn with_param(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let name = name.as_ref().trim();
        let value = value.as_ref().trim();
        if name.is_empty() || value.is_empty() {
            return self;
        }
        let pair = (name.to_string(), value.to_string());
        let at = self.params.partition_point(|existing| *existing <= pair);
        self.params.insert(at, pair);
        self
    }

    /// Build a key from a raw `a=1&b=2` query string.
    ///
    /// `+` decodes to a space and `%XX` escapes are decoded. A pair whose
    /// escapes are not valid UTF-8 is kept verbatim.
    pub fn from_query(operation: impl Into<String>, raw_query: &str) -> Self {
        raw_query
            .trim_start_matches('?')
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
            .fold(Self::new(operation), |key, (name, value)| {
                key.with_param(decode_component(name), decode_component(value))
            })
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// First value of a parameter in canonical order.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    /// Stable textual form: `operation?a=1&b=2` with re-encoded components.
    pub fn canonical(&self) -> String {
        let mut out = self.operation.clone();
        for (position, (name, value)) in self.params.iter().enumerate() {
            out.push(if position == 0 { '?' } else { '&' });
            out.push_str(&urlencoding::encode(name));
            out.push('=');
            out.push_str(&urlencoding::encode(value));
        }
        out
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

fn decode_component(raw: &str) -> Cow<'_, str> {
    if !raw.contains(&['+', '%'][..]) {
        return Cow::Borrowed(raw);
    }
    let spaced = raw.replace('+', " ");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => Cow::Owned(decoded.into_owned()),
        Err(_) => Cow::Owned(spaced),
    }
}
