//! The user record edited by the form.
//!
//! All values are kept as text, exactly as typed. `age` in particular is not
//! parsed into a number; its rule constrains the character count.

use serde::{Deserialize, Serialize};

use crate::path::{FieldPath, Segment};

/// Name of the repeated sub-record list inside `UserRecord`.
pub const ITEMS: &str = "items";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub title: String,
}

impl Item {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

/// Draft user record. `Default` is the blank form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub name: String,
    pub lastname: String,
    pub age: String,
    #[serde(default)]
    pub items: Vec<Item>,
}

impl UserRecord {
    /// Scalar field keys in display order.
    pub const SCALAR_FIELDS: [&'static str; 3] = ["name", "lastname", "age"];

    /// Resolve a path to the text it addresses.
    pub fn value(&self, path: &FieldPath) -> Option<&str> {
        match path.segments() {
            [Segment::Key(key)] => match key.as_str() {
                "name" => Some(&self.name),
                "lastname" => Some(&self.lastname),
                "age" => Some(&self.age),
                _ => None,
            },
            [Segment::Key(list), Segment::Index(index), Segment::Key(field)]
                if list == ITEMS && field == "title" =>
            {
                self.items.get(*index).map(|item| item.title.as_str())
            }
            _ => None,
        }
    }

    /// Mutable counterpart of [`UserRecord::value`].
    pub fn value_mut(&mut self, path: &FieldPath) -> Option<&mut String> {
        match path.segments() {
            [Segment::Key(key)] => match key.as_str() {
                "name" => Some(&mut self.name),
                "lastname" => Some(&mut self.lastname),
                "age" => Some(&mut self.age),
                _ => None,
            },
            [Segment::Key(list), Segment::Index(index), Segment::Key(field)]
                if list == ITEMS && field == "title" =>
            {
                self.items.get_mut(*index).map(|item| &mut item.title)
            }
            _ => None,
        }
    }

    /// Length of a named list, `None` if the record has no such list.
    pub fn list_len(&self, list: &str) -> Option<usize> {
        (list == ITEMS).then_some(self.items.len())
    }

    /// Every addressable text path, scalars first, then item titles in order.
    pub fn paths(&self) -> Vec<FieldPath> {
        Self::SCALAR_FIELDS
            .iter()
            .map(|key| FieldPath::key(*key))
            .chain((0..self.items.len()).map(|i| FieldPath::item(ITEMS, i, "title")))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> UserRecord {
        UserRecord {
            name: "Ada".into(),
            lastname: "Lovelace".into(),
            age: "1815-12-10".into(),
            items: vec![Item::new("engine"), Item::new("notes")],
        }
    }

    #[test]
    fn resolves_scalar_and_item_paths() {
        let record = sample();
        assert_eq!(record.value(&FieldPath::key("lastname")), Some("Lovelace"));
        assert_eq!(
            record.value(&FieldPath::item(ITEMS, 1, "title")),
            Some("notes")
        );
        assert_eq!(record.value(&FieldPath::item(ITEMS, 2, "title")), None);
        assert_eq!(record.value(&FieldPath::key("email")), None);
    }

    #[test]
    fn value_mut_edits_in_place() {
        let mut record = sample();
        *record
            .value_mut(&FieldPath::item(ITEMS, 0, "title"))
            .unwrap() = "analytical engine".into();
        assert_eq!(record.items[0].title, "analytical engine");
    }

    #[test]
    fn paths_list_scalars_then_items() {
        let rendered: Vec<String> = sample().paths().iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            ["name", "lastname", "age", "items[0].title", "items[1].title"]
        );
    }

    #[test]
    fn missing_items_deserialize_as_empty() {
        let record: UserRecord =
            serde_json::from_str(r#"{"name":"A","lastname":"B","age":"1234567890"}"#).unwrap();
        assert!(record.items.is_empty());
        assert_eq!(record.list_len(ITEMS), Some(0));
        assert_eq!(record.list_len("other"), None);
    }
}
