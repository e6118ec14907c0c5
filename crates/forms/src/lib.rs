//! Form state and schema validation for user records.
//!
//! The crate is split the same way the form is used:
//! - `path`   : addressing values inside a record (`items[2].title`)
//! - `record` : the `UserRecord` draft and its `Item`s
//! - `rule` / `schema` : declarative rules evaluated against a whole record
//! - `errors` : `ErrorMap`, `FieldValidationError` and API errors
//! - `state`  : the mutable `FormState` container with touched tracking,
//!              list operations, submission and change subscriptions
//!
//! Typical usage:
//! ```
//! use forms::{FieldPath, FormState, Item, Schema};
//!
//! let mut form = FormState::new(Schema::user_record());
//! let name = FieldPath::key("name");
//! form.set_value(&name, "Ada").unwrap();
//! form.blur(&name).unwrap();
//! form.append_item(Item::default());
//!
//! let mut submitted = None;
//! form.submit(|record| submitted = Some(record.clone()));
//! assert!(submitted.is_none());
//! assert_eq!(form.errors().get(&name), None);
//! ```

pub mod errors;
pub mod path;
pub mod record;
pub mod rule;
pub mod schema;
pub mod state;

pub use errors::{ErrorMap, FieldValidationError, FormError};
pub use path::{FieldPath, PathError, Segment};
pub use record::{Item, UserRecord};
pub use rule::{Constraint, Rule, Target};
pub use schema::Schema;
pub use state::{
    FieldBinding, FieldStatus, FormEvent, FormState, SubmitStatus, SubscriptionId, ValidationMode,
};
