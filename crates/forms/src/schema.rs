//! Ordered rule set validating a whole `UserRecord`.
//!
//! Validation is exhaustive: every rule runs on every call, so all violated
//! fields are reported together. For a path violated by more than one rule,
//! the earliest rule's message is kept.
//!
//! ```
//! use forms::{FieldPath, Item, Schema, UserRecord};
//!
//! let record = UserRecord {
//!     name: String::new(),
//!     lastname: "B".into(),
//!     age: "1234567890".into(),
//!     items: vec![],
//! };
//! let errors = Schema::user_record().validate(&record).unwrap_err();
//! assert_eq!(errors.len(), 1);
//! assert_eq!(errors.get(&FieldPath::key("name")), Some("Wrong name"));
//! ```

use crate::errors::ErrorMap;
use crate::path::FieldPath;
use crate::record::{ITEMS, UserRecord};
use crate::rule::{Constraint, Rule};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    rules: Vec<Rule>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule (evaluated after all earlier ones).
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Rules for the user form:
    /// - `name`, `lastname`: non-empty, with custom messages
    /// - `age`: at least 10 characters (text length, not a numeric range)
    /// - `items[*].title`: at least 3 characters
    pub fn user_record() -> Self {
        Self::new()
            .rule(Rule::field("name", Constraint::NonEmpty).message("Wrong name"))
            .rule(Rule::field("lastname", Constraint::NonEmpty).message("Wrong last name"))
            .rule(Rule::field("age", Constraint::MinLength(10)))
            .rule(Rule::each(ITEMS, "title", Constraint::MinLength(3)))
    }

    /// Collect every violation without short-circuiting.
    pub fn errors(&self, record: &UserRecord) -> ErrorMap {
        let mut errors = ErrorMap::new();
        for rule in &self.rules {
            rule.evaluate(record, &mut errors);
        }
        errors
    }

    /// Validate a candidate record. On success the record is returned
    /// unchanged.
    pub fn validate(&self, record: &UserRecord) -> Result<UserRecord, ErrorMap> {
        let errors = self.errors(record);
        if errors.is_empty() {
            Ok(record.clone())
        } else {
            Err(errors)
        }
    }

    /// Message for a single path under a full-record evaluation.
    pub fn validate_field(&self, record: &UserRecord, path: &FieldPath) -> Option<String> {
        self.errors(record).remove(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Item;
    use crate::rule::Target;
    use pretty_assertions::assert_eq;

    fn valid() -> UserRecord {
        UserRecord {
            name: "A".into(),
            lastname: "B".into(),
            age: "1234567890".into(),
            items: vec![Item::new("okay")],
        }
    }

    #[test]
    fn user_record_schema_has_one_rule_per_field() {
        let schema = Schema::user_record();
        let targets: Vec<&Target> = schema
            .rules()
            .iter()
            .map(|rule| &rule.target)
            .collect();
        assert_eq!(
            targets,
            vec![
                &Target::Field("name".into()),
                &Target::Field("lastname".into()),
                &Target::Field("age".into()),
                &Target::Each {
                    list: "items".into(),
                    field: "title".into(),
                },
            ]
        );
    }

    #[test]
    fn valid_record_is_returned_unchanged() {
        assert_eq!(Schema::user_record().validate(&valid()), Ok(valid()));
    }

    #[test]
    fn short_age_fails_with_default_message_only() {
        let record = UserRecord {
            age: "123".into(),
            ..valid()
        };
        let errors = Schema::user_record().validate(&record).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.get(&FieldPath::key("age")),
            Some("String must contain at least 10 character(s)")
        );
    }

    #[test]
    fn two_character_title_fails_alongside_age() {
        let record = UserRecord {
            age: "123".into(),
            items: vec![Item::new("ok")],
            ..valid()
        };
        let errors = Schema::user_record().validate(&record).unwrap_err();
        let paths: Vec<String> = errors.paths().map(ToString::to_string).collect();
        assert_eq!(paths, vec!["age".to_string(), "items[0].title".to_string()]);
    }

    #[test]
    fn blank_record_reports_every_scalar() {
        let errors = Schema::user_record()
            .validate(&UserRecord::default())
            .unwrap_err();
        assert_eq!(errors.get(&FieldPath::key("name")), Some("Wrong name"));
        assert_eq!(errors.get(&FieldPath::key("lastname")), Some("Wrong last name"));
        assert!(errors.contains(&FieldPath::key("age")));
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn earlier_rule_message_wins_on_shared_path() {
        let schema = Schema::new()
            .rule(Rule::field("name", Constraint::MinLength(5)).message("first"))
            .rule(Rule::field("name", Constraint::MinLength(8)).message("second"));
        let record = UserRecord {
            name: "abc".into(),
            ..UserRecord::default()
        };
        assert_eq!(
            schema.validate_field(&record, &FieldPath::key("name")),
            Some("first".to_string())
        );
    }

    #[test]
    fn validate_field_ignores_other_paths() {
        let record = UserRecord {
            name: String::new(),
            ..valid()
        };
        let schema = Schema::user_record();
        assert_eq!(schema.validate_field(&record, &FieldPath::key("lastname")), None);
        assert_eq!(
            schema.validate_field(&record, &FieldPath::key("name")),
            Some("Wrong name".to_string())
        );
    }
}
