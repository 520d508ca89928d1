//! Frames identify a call-path position (function, file, line, ...).
//!
//! A frame is an immutable attribute record. Only the attributes named in its
//! identity key take part in equality, hashing and ordering, so two frames read
//! from different profiles compare equal whenever they describe the same position.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A single frame attribute value
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FrameValue {
    Int(i64),
    Str(String),
}

impl FrameValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FrameValue::Str(s) => Some(s),
            FrameValue::Int(_) => None,
        }
    }
}

impl fmt::Display for FrameValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameValue::Int(i) => write!(f, "{}", i),
            FrameValue::Str(s) => write!(f, "{}", s),
        }
    }
}

impl From<&str> for FrameValue {
    fn from(value: &str) -> Self {
        FrameValue::Str(value.to_string())
    }
}

impl From<String> for FrameValue {
    fn from(value: String) -> Self {
        FrameValue::Str(value)
    }
}

impl From<i64> for FrameValue {
    fn from(value: i64) -> Self {
        FrameValue::Int(value)
    }
}

/// Immutable identity record for a call-path position
///
/// **Public** - matching key for copy, union and squash
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Frame {
    attrs: BTreeMap<String, FrameValue>,
    key: Vec<String>,
}

impl Frame {
    /// Create a frame whose identity key is every attribute (sorted by name)
    pub fn new(attrs: BTreeMap<String, FrameValue>) -> Self {
        let key = attrs.keys().cloned().collect();
        Self { attrs, key }
    }

    /// Create a frame with an explicit identity key
    ///
    /// Key names missing from `attrs` compare as absent values.
    pub fn with_key(attrs: BTreeMap<String, FrameValue>, key: Vec<String>) -> Self {
        Self { attrs, key }
    }

    /// Build a frame from `(name, value)` pairs, keyed on all of them
    ///
    /// # Example
    /// ```ignore
    /// let frame = Frame::from_pairs([("name", "main"), ("type", "function")]);
    /// ```
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<FrameValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        let attrs = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::new(attrs)
    }

    pub fn attrs(&self) -> &BTreeMap<String, FrameValue> {
        &self.attrs
    }

    pub fn key(&self) -> &[String] {
        &self.key
    }

    pub fn get(&self, attr: &str) -> Option<&FrameValue> {
        self.attrs.get(attr)
    }

    /// Shorthand for the `name` attribute when it is a string
    pub fn name(&self) -> Option<&str> {
        self.get("name").and_then(FrameValue::as_str)
    }

    fn identity(&self) -> impl Iterator<Item = (&str, Option<&FrameValue>)> + '_ {
        self.key
            .iter()
            .map(move |k| (k.as_str(), self.attrs.get(k)))
    }
}

impl PartialEq for Frame {
    fn eq(&self, other: &Self) -> bool {
        self.identity().eq(other.identity())
    }
}

impl Eq for Frame {}

impl Hash for Frame {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for (k, v) in self.identity() {
            k.hash(state);
            v.hash(state);
        }
    }
}

impl PartialOrd for Frame {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frame {
    fn cmp(&self, other: &Self) -> Ordering {
        self.identity().cmp(other.identity())
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.attrs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match v {
                FrameValue::Str(s) => write!(f, "'{}': '{}'", k, s)?,
                FrameValue::Int(n) => write!(f, "'{}': {}", k, n)?,
            }
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_equality_uses_identity_key_only() {
        let mut a = BTreeMap::new();
        a.insert("name".to_string(), FrameValue::from("solve"));
        a.insert("line".to_string(), FrameValue::from(10i64));
        let mut b = a.clone();
        b.insert("line".to_string(), FrameValue::from(42i64));

        let fa = Frame::with_key(a, vec!["name".to_string()]);
        let fb = Frame::with_key(b, vec!["name".to_string()]);
        assert_eq!(fa, fb);

        let mut set = HashSet::new();
        set.insert(fa);
        assert!(set.contains(&fb));
    }

    #[test]
    fn test_full_key_distinguishes_attributes() {
        let a = Frame::from_pairs([("name", "a"), ("type", "None")]);
        let b = Frame::from_pairs([("name", "a"), ("type", "function")]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_ordering_is_by_key_values() {
        let a = Frame::from_pairs([("name", "a")]);
        let b = Frame::from_pairs([("name", "b")]);
        let mut frames = vec![b.clone(), a.clone()];
        frames.sort();
        assert_eq!(frames, vec![a, b]);
    }

    #[test]
    fn test_display() {
        let frame = Frame::from_pairs([("a", 1i64), ("b", 2i64)]);
        assert_eq!(frame.to_string(), "{'a': 1, 'b': 2}");
    }
}
