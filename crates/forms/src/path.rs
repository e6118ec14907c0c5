//! Field paths locating a value inside a record.
//!
//! A path is a sequence of segments. Keys address struct fields, indices
//! address list elements:
//!
//! ```text
//! name            -> [Key("name")]
//! items[2].title  -> [Key("items"), Index(2), Key("title")]
//! ```
//!
//! Parsing also accepts the dotted index form (`items.2.title`) so paths
//! registered by field name can be used as-is.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    Key(String),
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("empty field path")]
    Empty,

    #[error("empty segment in field path {0:?}")]
    EmptySegment(String),

    #[error("unterminated index in field path {0:?}")]
    UnterminatedIndex(String),

    #[error("invalid index {index:?} in field path {path:?}")]
    InvalidIndex { path: String, index: String },
}

/// Dotted / indexed identifier of a value within a record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath(Vec<Segment>);

impl FieldPath {
    /// Single-key path (`name`).
    pub fn key(key: impl Into<String>) -> Self {
        Self(vec![Segment::Key(key.into())])
    }

    /// Path to a field of a list element (`items[index].field`).
    pub fn item(list: impl Into<String>, index: usize, field: impl Into<String>) -> Self {
        Self::key(list).index(index).field(field)
    }

    /// Append a key segment.
    pub fn field(mut self, key: impl Into<String>) -> Self {
        self.0.push(Segment::Key(key.into()));
        self
    }

    /// Append an index segment.
    pub fn index(mut self, index: usize) -> Self {
        self.0.push(Segment::Index(index));
        self
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    /// Parse `name`, `items[2].title` or `items.2.title`.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.is_empty() {
            return Err(PathError::Empty);
        }

        let mut segments = Vec::new();
        for part in raw.split('.') {
            if part.is_empty() {
                return Err(PathError::EmptySegment(raw.to_string()));
            }
            // A bare numeric part is the dotted index form.
            if part.bytes().all(|b| b.is_ascii_digit()) {
                segments.push(Segment::Index(parse_index(raw, part)?));
                continue;
            }

            let (key, mut rest) = match part.find('[') {
                Some(pos) => part.split_at(pos),
                None => (part, ""),
            };
            if key.is_empty() {
                return Err(PathError::EmptySegment(raw.to_string()));
            }
            segments.push(Segment::Key(key.to_string()));

            while !rest.is_empty() {
                let Some(inner) = rest.strip_prefix('[') else {
                    return Err(PathError::UnterminatedIndex(raw.to_string()));
                };
                let Some(close) = inner.find(']') else {
                    return Err(PathError::UnterminatedIndex(raw.to_string()));
                };
                segments.push(Segment::Index(parse_index(raw, &inner[..close])?));
                rest = &inner[close + 1..];
            }
        }

        Ok(Self(segments))
    }

    /// Index of the list element this path points into, if the path starts
    /// with `list[index]`.
    pub fn list_index(&self, list: &str) -> Option<usize> {
        match self.0.as_slice() {
            [Segment::Key(key), Segment::Index(index), ..] if key == list => Some(*index),
            _ => None,
        }
    }

    /// Same path, pointing at another element of the same list.
    pub fn with_list_index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        if let Some(Segment::Index(slot)) = segments.get_mut(1) {
            *slot = index;
        }
        Self(segments)
    }
}

fn parse_index(raw: &str, index: &str) -> Result<usize, PathError> {
    index.parse::<usize>().map_err(|_| PathError::InvalidIndex {
        path: raw.to_string(),
        index: index.to_string(),
    })
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (pos, segment) in self.0.iter().enumerate() {
            match segment {
                Segment::Key(key) if pos == 0 => write!(f, "{key}")?,
                Segment::Key(key) => write!(f, ".{key}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for FieldPath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scalar_and_indexed_paths() {
        assert_eq!(FieldPath::parse("name").unwrap(), FieldPath::key("name"));
        assert_eq!(
            FieldPath::parse("items[2].title").unwrap(),
            FieldPath::item("items", 2, "title")
        );
    }

    #[test]
    fn dotted_index_form_is_equivalent() {
        assert_eq!(
            FieldPath::parse("items.2.title").unwrap(),
            FieldPath::parse("items[2].title").unwrap()
        );
    }

    #[test]
    fn display_uses_bracket_indices() {
        assert_eq!(FieldPath::item("items", 0, "title").to_string(), "items[0].title");
        assert_eq!(FieldPath::key("lastname").to_string(), "lastname");
    }

    #[test]
    fn rejects_malformed_paths() {
        assert_eq!(FieldPath::parse(""), Err(PathError::Empty));
        assert!(matches!(
            FieldPath::parse("items..title"),
            Err(PathError::EmptySegment(_))
        ));
        assert!(matches!(
            FieldPath::parse("items[2.title"),
            Err(PathError::UnterminatedIndex(_))
        ));
        assert!(matches!(
            FieldPath::parse("items[x].title"),
            Err(PathError::InvalidIndex { .. })
        ));
    }

    #[test]
    fn list_index_only_matches_the_named_list() {
        let path = FieldPath::item("items", 4, "title");
        assert_eq!(path.list_index("items"), Some(4));
        assert_eq!(path.list_index("other"), None);
        assert_eq!(FieldPath::key("items").list_index("items"), None);
        assert_eq!(path.with_list_index(3), FieldPath::item("items", 3, "title"));
    }

    #[test]
    fn serializes_as_display_string() {
        let path = FieldPath::item("items", 1, "title");
        let json = serde_json::to_string(&path).unwrap();
        assert_eq!(json, "\"items[1].title\"");
        let back: FieldPath = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);
    }
}
