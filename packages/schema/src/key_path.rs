//! # Key Paths
//!
//! Addressing inside a prop's JSON value.
//!
//! A [`KeyPath`] names one position inside an arbitrarily nested value and
//! renders in the flattened form `[0].children` / `header.extra`. A
//! [`KeyPathPattern`] is a registry-declared pattern over such paths,
//! telling the resolver where a node reference is embedded.
//!
//! Pattern syntax (relative to the prop value):
//!
//! ```text
//! ""                 the value itself
//! "[].children"      children field of every array item
//! "[2].children"     children field of the third item only
//! "header.*"         every field of the header object
//! ```
//!
//! Patterns written by older editors are regular expressions
//! (`\[\d+\]\.children`). Those are detected and compiled with `regex`,
//! then tested unanchored against the flattened path string.

use crate::error::{SchemaError, SchemaResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// One step into a JSON value
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

/// Location of a value inside a prop value
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeyPath(Vec<PathSegment>);

impl KeyPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn child_key(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.to_string()));
        Self(segments)
    }

    pub fn child_index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    /// Borrow the value at this path
    pub fn get<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        self.0.iter().try_fold(value, |current, segment| match segment {
            PathSegment::Key(key) => current.as_object()?.get(key),
            PathSegment::Index(index) => current.as_array()?.get(*index),
        })
    }

    /// Mutably borrow the value at this path
    pub fn get_mut<'a>(&self, value: &'a mut Value) -> Option<&'a mut Value> {
        self.0.iter().try_fold(value, |current, segment| match segment {
            PathSegment::Key(key) => current.as_object_mut()?.get_mut(key),
            PathSegment::Index(index) => current.as_array_mut()?.get_mut(*index),
        })
    }
}

impl fmt::Display for KeyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) if i == 0 => write!(f, "{}", key)?,
                PathSegment::Key(key) => write!(f, ".{}", key)?,
                PathSegment::Index(index) => write!(f, "[{}]", index)?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PatternSegment {
    Key(String),
    AnyKey,
    Index(usize),
    AnyIndex,
}

#[derive(Debug, Clone)]
enum Matcher {
    Structural(Vec<PatternSegment>),
    Regex(Regex),
}

/// Persisted shape of a pattern (`templateKeyPathsReg` entries)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPattern {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub path: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Compiled embedded-reference pattern
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawPattern", into = "RawPattern")]
pub struct KeyPathPattern {
    raw: RawPattern,
    matcher: Matcher,
}

impl KeyPathPattern {
    pub fn parse(path: &str) -> SchemaResult<Self> {
        Self::try_from(RawPattern {
            kind: None,
            path: path.to_string(),
            extra: BTreeMap::new(),
        })
    }

    pub fn source(&self) -> &str {
        &self.raw.path
    }

    pub fn is_legacy_regex(&self) -> bool {
        matches!(self.matcher, Matcher::Regex(_))
    }

    /// Test a concrete path against this pattern
    pub fn matches(&self, path: &KeyPath) -> bool {
        match &self.matcher {
            Matcher::Regex(regex) => regex.is_match(&path.to_string()),
            Matcher::Structural(pattern) => {
                pattern.len() == path.segments().len()
                    && pattern
                        .iter()
                        .zip(path.segments())
                        .all(|(expected, actual)| match (expected, actual) {
                            (PatternSegment::AnyKey, PathSegment::Key(_)) => true,
                            (PatternSegment::Key(a), PathSegment::Key(b)) => a == b,
                            (PatternSegment::AnyIndex, PathSegment::Index(_)) => true,
                            (PatternSegment::Index(a), PathSegment::Index(b)) => a == b,
                            _ => false,
                        })
            }
        }
    }
}

impl PartialEq for KeyPathPattern {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl TryFrom<RawPattern> for KeyPathPattern {
    type Error = SchemaError;

    fn try_from(raw: RawPattern) -> Result<Self, Self::Error> {
        let matcher = if looks_like_regex(&raw.path) {
            let regex = Regex::new(&raw.path).map_err(|e| SchemaError::InvalidPattern {
                pattern: raw.path.clone(),
                reason: e.to_string(),
            })?;
            Matcher::Regex(regex)
        } else {
            Matcher::Structural(parse_structural(&raw.path)?)
        };

        Ok(Self { raw, matcher })
    }
}

impl From<KeyPathPattern> for RawPattern {
    fn from(pattern: KeyPathPattern) -> Self {
        pattern.raw
    }
}

fn looks_like_regex(path: &str) -> bool {
    path.contains(['\\', '^', '$', '(', '+', '?', '|'])
}

fn parse_structural(path: &str) -> SchemaResult<Vec<PatternSegment>> {
    let invalid = |reason: &str| SchemaError::InvalidPattern {
        pattern: path.to_string(),
        reason: reason.to_string(),
    };

    let mut segments = Vec::new();
    let mut chars = path.chars().peekable();
    let mut key = String::new();

    let flush = |key: &mut String, segments: &mut Vec<PatternSegment>| {
        if !key.is_empty() {
            let segment = if key == "*" {
                PatternSegment::AnyKey
            } else {
                PatternSegment::Key(std::mem::take(key))
            };
            key.clear();
            segments.push(segment);
        }
    };

    while let Some(c) = chars.next() {
        match c {
            '.' => {
                if key.is_empty() && segments.is_empty() {
                    return Err(invalid("leading '.'"));
                }
                flush(&mut key, &mut segments);
            }
            '[' => {
                flush(&mut key, &mut segments);
                let mut inner = String::new();
                loop {
                    match chars.next() {
                        Some(']') => break,
                        Some(c) => inner.push(c),
                        None => return Err(invalid("unterminated '['")),
                    }
                }
                let segment = match inner.trim() {
                    "" | "*" => PatternSegment::AnyIndex,
                    digits => PatternSegment::Index(
                        digits.parse().map_err(|_| invalid("index must be a number"))?,
                    ),
                };
                segments.push(segment);
            }
            ']' => return Err(invalid("unexpected ']'")),
            c => key.push(c),
        }
    }
    flush(&mut key, &mut segments);

    Ok(segments)
}
