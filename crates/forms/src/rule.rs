//! Declarative validation rules.
//!
//! A rule binds a target (a scalar field, or a field of every list element)
//! to a constraint and an optional custom message. Rules are plain data; the
//! `Schema` evaluates them in order against a whole record.

use crate::errors::ErrorMap;
use crate::path::FieldPath;
use crate::record::UserRecord;

/// Message reported when a rule's target does not exist on the record.
pub const REQUIRED_MESSAGE: &str = "Required";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// At least one character.
    NonEmpty,
    /// At least `n` characters (not bytes).
    MinLength(usize),
}

impl Constraint {
    pub fn check(&self, value: &str) -> bool {
        value.chars().count() >= self.min_len()
    }

    fn min_len(&self) -> usize {
        match self {
            Constraint::NonEmpty => 1,
            Constraint::MinLength(n) => *n,
        }
    }

    /// Message used when the rule carries no custom one.
    pub fn default_message(&self) -> String {
        format!(
            "String must contain at least {} character(s)",
            self.min_len()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A scalar field of the record.
    Field(String),
    /// `field` of every element of `list`.
    Each { list: String, field: String },
}

impl Target {
    /// Concrete paths this target covers on `record`.
    pub fn paths(&self, record: &UserRecord) -> Vec<FieldPath> {
        match self {
            Target::Field(key) => vec![FieldPath::key(key.as_str())],
            Target::Each { list, field } => (0..record.list_len(list).unwrap_or(0))
                .map(|i| FieldPath::item(list.as_str(), i, field.as_str()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub target: Target,
    pub constraint: Constraint,
    pub message: Option<String>,
}

impl Rule {
    pub fn field(key: impl Into<String>, constraint: Constraint) -> Self {
        Self {
            target: Target::Field(key.into()),
            constraint,
            message: None,
        }
    }

    pub fn each(list: impl Into<String>, field: impl Into<String>, constraint: Constraint) -> Self {
        Self {
            target: Target::Each {
                list: list.into(),
                field: field.into(),
            },
            constraint,
            message: None,
        }
    }

    /// Custom message shown instead of the constraint's default.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Evaluate against `record`, recording every violation in `errors`.
    pub fn evaluate(&self, record: &UserRecord, errors: &mut ErrorMap) {
        for path in self.target.paths(record) {
            match record.value(&path) {
                Some(value) if self.constraint.check(value) => {}
                Some(_) => {
                    let message = self
                        .message
                        .clone()
                        .unwrap_or_else(|| self.constraint.default_message());
                    errors.insert(path, message);
                }
                None => {
                    errors.insert(path, REQUIRED_MESSAGE);
                }
            }
        }
    }
}
