//! Validation outcomes and container misuse errors.
//!
//! `ErrorMap` is what the validator produces and what the form state keeps
//! between events; `FormError` covers calls with paths or indices the draft
//! does not have.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::path::FieldPath;

/// A single violated rule: where, and what to tell the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{path}: {message}")]
pub struct FieldValidationError {
    pub path: FieldPath,
    pub message: String,
}

/// Errors from misusing the form container API (as opposed to invalid input).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("unknown field: {0}")]
    UnknownField(FieldPath),

    #[error("item index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Mapping from field path to a user-facing validation message.
///
/// Ordered by path so logs and snapshots are stable. Holds at most one message
/// per path; the first one inserted wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorMap(BTreeMap<FieldPath, String>);

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for `path` unless one is already present.
    /// Returns `true` if the message was stored.
    pub fn insert(&mut self, path: FieldPath, message: impl Into<String>) -> bool {
        match self.0.entry(path) {
            std::collections::btree_map::Entry::Vacant(slot) => {
                slot.insert(message.into());
                true
            }
            std::collections::btree_map::Entry::Occupied(_) => false,
        }
    }

    /// Replace (or clear, with `None`) the message for a single path.
    pub fn set(&mut self, path: FieldPath, message: Option<String>) {
        match message {
            Some(message) => {
                self.0.insert(path, message);
            }
            None => {
                self.0.remove(&path);
            }
        }
    }

    pub fn get(&self, path: &FieldPath) -> Option<&str> {
        self.0.get(path).map(String::as_str)
    }

    pub fn remove(&mut self, path: &FieldPath) -> Option<String> {
        self.0.remove(path)
    }

    pub fn contains(&self, path: &FieldPath) -> bool {
        self.0.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn paths(&self) -> impl Iterator<Item = &FieldPath> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldPath, &str)> {
        self.0.iter().map(|(path, message)| (path, message.as_str()))
    }

    /// Errors belonging to one element of `list`.
    pub fn for_list_item<'a>(
        &'a self,
        list: &'a str,
        index: usize,
    ) -> impl Iterator<Item = (&'a FieldPath, &'a str)> + 'a {
        self.iter()
            .filter(move |(path, _)| path.list_index(list) == Some(index))
    }

    /// Renumber after `list[index]` was removed: errors of the removed element
    /// are dropped, errors of later elements move down by one.
    pub fn shift_after_removal(&mut self, list: &str, index: usize) {
        let old = std::mem::take(&mut self.0);
        for (path, message) in old {
            match path.list_index(list) {
                Some(i) if i == index => {}
                Some(i) if i > index => {
                    self.0.insert(path.with_list_index(i - 1), message);
                }
                _ => {
                    self.0.insert(path, message);
                }
            }
        }
    }

    pub fn into_errors(self) -> Vec<FieldValidationError> {
        self.0
            .into_iter()
            .map(|(path, message)| FieldValidationError { path, message })
            .collect()
    }
}

impl fmt::Display for ErrorMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.len() {
            0 => return write!(f, "no validation errors"),
            1 => write!(f, "1 validation error")?,
            n => write!(f, "{n} validation errors")?,
        }
        for (path, message) in &self.0 {
            write!(f, "; {path}: {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ErrorMap {}

impl FromIterator<FieldValidationError> for ErrorMap {
    fn from_iter<T: IntoIterator<Item = FieldValidationError>>(iter: T) -> Self {
        let mut map = Self::new();
        for error in iter {
            map.insert(error.path, error.message);
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_message_per_path_wins() {
        let mut errors = ErrorMap::new();
        assert!(errors.insert(FieldPath::key("name"), "Wrong name"));
        assert!(!errors.insert(FieldPath::key("name"), "other"));
        assert_eq!(errors.get(&FieldPath::key("name")), Some("Wrong name"));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn shift_after_removal_renumbers_later_items() {
        let mut errors = ErrorMap::new();
        errors.insert(FieldPath::key("age"), "too short");
        errors.insert(FieldPath::item("items", 0, "title"), "zero");
        errors.insert(FieldPath::item("items", 1, "title"), "one");
        errors.insert(FieldPath::item("items", 2, "title"), "two");

        errors.shift_after_removal("items", 1);

        let entries: Vec<(String, &str)> = errors
            .iter()
            .map(|(path, message)| (path.to_string(), message))
            .collect();
        assert_eq!(
            entries,
            vec![
                ("age".to_string(), "too short"),
                ("items[0].title".to_string(), "zero"),
                ("items[1].title".to_string(), "two"),
            ]
        );
    }

    #[test]
    fn for_list_item_selects_one_row() {
        let mut errors = ErrorMap::new();
        errors.insert(FieldPath::key("name"), "Wrong name");
        errors.insert(FieldPath::item("items", 0, "title"), "zero");
        errors.insert(FieldPath::item("items", 1, "title"), "one");

        let row: Vec<(String, &str)> = errors
            .for_list_item("items", 1)
            .map(|(path, message)| (path.to_string(), message))
            .collect();
        assert_eq!(row, vec![("items[1].title".to_string(), "one")]);
        assert_eq!(errors.for_list_item("items", 2).count(), 0);
    }

    #[test]
    fn into_errors_keeps_path_order() {
        let mut errors = ErrorMap::new();
        errors.insert(FieldPath::key("name"), "Wrong name");
        errors.insert(FieldPath::key("age"), "too short");

        let list = errors.clone().into_errors();
        assert_eq!(
            list.iter().map(ToString::to_string).collect::<Vec<_>>(),
            vec!["age: too short".to_string(), "name: Wrong name".to_string()]
        );
        assert_eq!(list.into_iter().collect::<ErrorMap>(), errors);
    }

    #[test]
    fn serializes_as_flat_object() {
        let mut errors = ErrorMap::new();
        errors.insert(FieldPath::key("name"), "Wrong name");
        errors.insert(FieldPath::item("items", 0, "title"), "short");
        let json = serde_json::to_string(&errors).unwrap();
        assert_eq!(json, r#"{"items[0].title":"short","name":"Wrong name"}"#);
    }

    #[test]
    fn display_lists_every_error() {
        let errors: ErrorMap = [FieldValidationError {
            path: FieldPath::key("lastname"),
            message: "Wrong last name".into(),
        }]
        .into_iter()
        .collect();
        assert_eq!(errors.to_string(), "1 validation error; lastname: Wrong last name");
    }
}
