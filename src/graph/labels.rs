//! Edge label vocabulary.
//!
//! Labels are open strings: [`EdgeLabel`] validates shape and provides the
//! well-known constants, while abbreviations and reciprocals live in lookup
//! tables so callers can reason about custom labels the same way.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;

use crate::error::GraphError;

const MAX_LABEL_LEN: usize = 64;

/// A validated relationship label such as `relates-to` or `implements`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EdgeLabel(Cow<'static, str>);

impl EdgeLabel {
    pub const RELATES_TO: EdgeLabel = EdgeLabel(Cow::Borrowed("relates-to"));
    pub const IMPLEMENTS: EdgeLabel = EdgeLabel(Cow::Borrowed("implements"));
    pub const IMPLEMENTED_BY: EdgeLabel = EdgeLabel(Cow::Borrowed("implemented-by"));
    pub const DEPENDS_ON: EdgeLabel = EdgeLabel(Cow::Borrowed("depends-on"));
    pub const SUPERSEDES: EdgeLabel = EdgeLabel(Cow::Borrowed("supersedes"));
    pub const DERIVED_FROM: EdgeLabel = EdgeLabel(Cow::Borrowed("derived-from"));
    pub const CONTRADICTS: EdgeLabel = EdgeLabel(Cow::Borrowed("contradicts"));
    /// Label used for edges the engine creates from embedding similarity.
    pub const AUTO_LINKED: EdgeLabel = EdgeLabel(Cow::Borrowed("auto-linked-by-similarity"));

    /// Validate and wrap a caller-supplied label.
    pub fn new(label: impl Into<String>) -> Result<Self, GraphError> {
        let label = label.into();
        let reason = if label.is_empty() {
            Some("must not be empty")
        } else if label.chars().count() > MAX_LABEL_LEN {
            Some("longer than 64 characters")
        } else if !label
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            Some("only letters, digits, '-' and '_' are allowed")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(GraphError::InvalidLabel { label, reason }),
            None => Ok(Self(Cow::Owned(label))),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compact form for diagrams. Unknown labels fall back to their first three characters.
    pub fn abbreviation(&self) -> String {
        match lookup(ABBREVIATIONS, self.as_str()) {
            Some(short) => short.to_string(),
            None => self.as_str().chars().take(3).collect(),
        }
    }

    /// The inverse relationship, if the label is in the reciprocal table.
    ///
    /// Symmetric labels map to themselves.
    pub fn reciprocal(&self) -> Option<EdgeLabel> {
        if SYMMETRIC.contains(&self.as_str()) {
            return Some(self.clone());
        }
        RECIPROCALS.iter().find_map(|&(a, b)| {
            if a == self.as_str() {
                Some(EdgeLabel(Cow::Borrowed(b)))
            } else if b == self.as_str() {
                Some(EdgeLabel(Cow::Borrowed(a)))
            } else {
                None
            }
        })
    }
}

impl Default for EdgeLabel {
    fn default() -> Self {
        Self::RELATES_TO
    }
}

impl std::fmt::Display for EdgeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EdgeLabel {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for EdgeLabel {
    type Error = GraphError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EdgeLabel> for String {
    fn from(label: EdgeLabel) -> Self {
        label.0.into_owned()
    }
}

impl PartialEq<str> for EdgeLabel {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for EdgeLabel {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

fn lookup(table: &'static [(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Diagram abbreviations for well-known labels.
pub static ABBREVIATIONS: &[(&str, &str)] = &[
    ("relates-to", "rel"),
    ("implements", "impl"),
    ("implemented-by", "impl-by"),
    ("depends-on", "dep"),
    ("depended-on-by", "dep-by"),
    ("supersedes", "sup"),
    ("superseded-by", "sup-by"),
    ("derived-from", "der"),
    ("derives", "drv"),
    ("parent-of", "par"),
    ("child-of", "chi"),
    ("references", "ref"),
    ("referenced-by", "ref-by"),
    ("contradicts", "con"),
    ("documents", "doc"),
    ("auto-linked-by-similarity", "sim"),
];

/// Inverse label pairs, read in both directions.
pub static RECIPROCALS: &[(&str, &str)] = &[
    ("implements", "implemented-by"),
    ("depends-on", "depended-on-by"),
    ("supersedes", "superseded-by"),
    ("parent-of", "child-of"),
    ("derived-from", "derives"),
    ("references", "referenced-by"),
];

/// Labels that are their own inverse.
pub static SYMMETRIC: &[&str] = &["relates-to", "contradicts", "auto-linked-by-similarity"];
