//! Form runtime state: the draft record, touched flags, the current error
//! mapping and change subscriptions.
//!
//! All mutation goes through `FormState` methods. After each mutation the
//! registered listeners are called with a `FormEvent` and a shared reference
//! to the state, which is how a presentation layer learns it must re-render.
//!
//! Validation timing follows `ValidationMode`. With the default `OnTouched`
//! a field is validated the first time it is blurred and, from then on, on
//! every change. Every mode validates the whole draft on submit, and once a
//! submit has been attempted, every change revalidates the changed field.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::{debug, info, warn};

use crate::errors::{ErrorMap, FormError};
use crate::path::FieldPath;
use crate::record::{ITEMS, Item, UserRecord};
use crate::schema::Schema;

/// When field-level validation runs (submit always validates everything).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum ValidationMode {
    OnSubmit,
    OnBlur,
    OnChange,
    #[default]
    OnTouched,
    All,
}

impl ValidationMode {
    fn validates_on_blur(self, first_touch: bool) -> bool {
        match self {
            ValidationMode::OnBlur | ValidationMode::All => true,
            ValidationMode::OnTouched => first_touch,
            ValidationMode::OnSubmit | ValidationMode::OnChange => false,
        }
    }

    fn validates_on_change(self, touched: bool) -> bool {
        match self {
            ValidationMode::OnChange | ValidationMode::All => true,
            ValidationMode::OnTouched => touched,
            ValidationMode::OnSubmit | ValidationMode::OnBlur => false,
        }
    }
}

/// Presentation state of a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum FieldStatus {
    Untouched,
    Valid,
    Invalid,
}

/// Presentation state of the form as a whole.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
pub enum SubmitStatus {
    #[default]
    NotSubmitted,
    Valid,
    Invalid,
}

/// What changed, delivered to subscribers after the change was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    Changed(FieldPath),
    Blurred(FieldPath),
    ItemAppended(usize),
    ItemRemoved(usize),
    ErrorsChanged,
    Submitted(SubmitStatus),
    Reset,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&FormEvent, &FormState) + Send>;

/// Everything a renderer needs to draw one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldBinding<'a> {
    pub path: FieldPath,
    pub value: &'a str,
    pub touched: bool,
    pub dirty: bool,
    pub error: Option<&'a str>,
}

impl FieldBinding<'_> {
    /// Drives the accessibility-invalid marker.
    pub fn is_invalid(&self) -> bool {
        self.error.is_some()
    }

    pub fn status(&self) -> FieldStatus {
        match (self.touched, self.error) {
            (_, Some(_)) => FieldStatus::Invalid,
            (true, None) => FieldStatus::Valid,
            (false, None) => FieldStatus::Untouched,
        }
    }
}

pub struct FormState {
    schema: Schema,
    mode: ValidationMode,
    defaults: UserRecord,
    draft: UserRecord,
    touched: BTreeSet<FieldPath>,
    errors: ErrorMap,
    submit_status: SubmitStatus,
    submit_count: usize,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl std::fmt::Debug for FormState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormState")
            .field("mode", &self.mode)
            .field("draft", &self.draft)
            .field("touched", &self.touched)
            .field("errors", &self.errors)
            .field("submit_status", &self.submit_status)
            .field("submit_count", &self.submit_count)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl FormState {
    /// Blank form validated by `schema` in `OnTouched` mode.
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            mode: ValidationMode::default(),
            defaults: UserRecord::default(),
            draft: UserRecord::default(),
            touched: BTreeSet::new(),
            errors: ErrorMap::new(),
            submit_status: SubmitStatus::NotSubmitted,
            submit_count: 0,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    /// Start from (and reset back to) `defaults` instead of a blank record.
    pub fn with_defaults(mut self, defaults: UserRecord) -> Self {
        self.draft = defaults.clone();
        self.defaults = defaults;
        self
    }

    // --- Queries -------------------------------------------------------------------------------

    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn draft(&self) -> &UserRecord {
        &self.draft
    }

    pub fn items(&self) -> &[Item] {
        &self.draft.items
    }

    pub fn value(&self, path: &FieldPath) -> Option<&str> {
        self.draft.value(path)
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn error(&self, path: &FieldPath) -> Option<&str> {
        self.errors.get(path)
    }

    pub fn is_touched(&self, path: &FieldPath) -> bool {
        self.touched.contains(path)
    }

    /// True if the value differs from the defaults (fields without a default,
    /// such as appended items, count as dirty).
    pub fn is_dirty(&self, path: &FieldPath) -> bool {
        self.draft.value(path) != self.defaults.value(path)
    }

    pub fn is_dirty_form(&self) -> bool {
        self.draft != self.defaults
    }

    pub fn field_status(&self, path: &FieldPath) -> FieldStatus {
        match (self.is_touched(path), self.errors.contains(path)) {
            (_, true) => FieldStatus::Invalid,
            (true, false) => FieldStatus::Valid,
            (false, false) => FieldStatus::Untouched,
        }
    }

    pub fn submit_status(&self) -> SubmitStatus {
        self.submit_status
    }

    pub fn submit_count(&self) -> usize {
        self.submit_count
    }

    /// Binding descriptor for one input, `None` for paths the record lacks.
    pub fn binding(&self, path: &FieldPath) -> Option<FieldBinding<'_>> {
        let value = self.draft.value(path)?;
        Some(FieldBinding {
            path: path.clone(),
            value,
            touched: self.is_touched(path),
            dirty: self.is_dirty(path),
            error: self.errors.get(path),
        })
    }

    // --- Subscriptions -------------------------------------------------------------------------

    /// Register a listener called after every mutation.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(&FormEvent, &FormState) + Send + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, event: FormEvent) {
        // Listeners only see `&FormState`, so none can be added mid-dispatch.
        let mut listeners = std::mem::take(&mut self.listeners);
        for (_, listener) in listeners.iter_mut() {
            listener(&event, &*self);
        }
        self.listeners = listeners;
    }

    // --- Mutation ------------------------------------------------------------------------------

    /// Input change handler: store `value` at `path`, revalidating the field
    /// if the mode asks for it.
    pub fn set_value(&mut self, path: &FieldPath, value: impl Into<String>) -> Result<(), FormError> {
        let slot = self
            .draft
            .value_mut(path)
            .ok_or_else(|| FormError::UnknownField(path.clone()))?;
        *slot = value.into();

        let revalidate =
            self.submit_count > 0 || self.mode.validates_on_change(self.is_touched(path));
        if revalidate {
            self.revalidate_field(path);
        }
        self.notify(FormEvent::Changed(path.clone()));
        Ok(())
    }

    /// Blur handler: mark `path` touched, validating it on the
    /// untouched -> touched transition (or on every blur in `OnBlur`/`All`).
    pub fn blur(&mut self, path: &FieldPath) -> Result<(), FormError> {
        if self.draft.value(path).is_none() {
            return Err(FormError::UnknownField(path.clone()));
        }
        let first_touch = self.touched.insert(path.clone());
        if self.mode.validates_on_blur(first_touch) {
            self.revalidate_field(path);
        }
        self.notify(FormEvent::Blurred(path.clone()));
        Ok(())
    }

    /// Explicitly revalidate one field regardless of mode.
    /// Returns `true` if the field is valid.
    pub fn trigger(&mut self, path: &FieldPath) -> Result<bool, FormError> {
        if self.draft.value(path).is_none() {
            return Err(FormError::UnknownField(path.clone()));
        }
        self.revalidate_field(path);
        Ok(!self.errors.contains(path))
    }

    /// Append `item` to the end of `items`. Returns its index.
    pub fn append_item(&mut self, item: Item) -> usize {
        self.draft.items.push(item);
        let index = self.draft.items.len() - 1;
        debug!(index, "item appended");
        self.notify(FormEvent::ItemAppended(index));
        index
    }

    /// Remove the item at `index`; later items (and their touched flags and
    /// errors) shift down by one.
    pub fn remove_item(&mut self, index: usize) -> Result<Item, FormError> {
        let len = self.draft.items.len();
        if index >= len {
            return Err(FormError::IndexOutOfRange { index, len });
        }
        let removed = self.draft.items.remove(index);

        let touched = std::mem::take(&mut self.touched);
        self.touched = touched
            .into_iter()
            .filter_map(|path| match path.list_index(ITEMS) {
                Some(i) if i == index => None,
                Some(i) if i > index => Some(path.with_list_index(i - 1)),
                _ => Some(path),
            })
            .collect();

        let before = self.errors.clone();
        self.errors.shift_after_removal(ITEMS, index);
        debug!(index, "item removed");
        self.notify(FormEvent::ItemRemoved(index));
        if before != self.errors {
            self.errors_changed();
        }
        Ok(removed)
    }

    /// Validate the whole draft. If valid, `on_valid` receives the validated
    /// record; otherwise the error mapping is replaced and `on_valid` is not
    /// called. The draft is kept either way.
    pub fn submit<F>(&mut self, on_valid: F) -> SubmitStatus
    where
        F: FnOnce(&UserRecord),
    {
        self.submit_count += 1;
        let status = match self.schema.validate(&self.draft) {
            Ok(record) => {
                self.replace_errors(ErrorMap::new());
                match serde_json::to_string(&record) {
                    Ok(json) => info!(record = %json, "form submitted"),
                    Err(err) => warn!(%err, "form submitted; record not serializable"),
                }
                on_valid(&record);
                SubmitStatus::Valid
            }
            Err(errors) => {
                debug!(count = errors.len(), "submit rejected");
                self.replace_errors(errors);
                SubmitStatus::Invalid
            }
        };
        self.submit_status = status;
        self.notify(FormEvent::Submitted(status));
        status
    }

    /// Back to the defaults with no touched fields, errors or submit history.
    pub fn reset(&mut self) {
        self.draft = self.defaults.clone();
        self.touched.clear();
        self.submit_status = SubmitStatus::NotSubmitted;
        self.submit_count = 0;
        self.replace_errors(ErrorMap::new());
        self.notify(FormEvent::Reset);
    }

    fn revalidate_field(&mut self, path: &FieldPath) {
        let message = self.schema.validate_field(&self.draft, path);
        if self.errors.get(path) != message.as_deref() {
            self.errors.set(path.clone(), message);
            self.errors_changed();
        }
    }

    fn replace_errors(&mut self, errors: ErrorMap) {
        if self.errors != errors {
            self.errors = errors;
            self.errors_changed();
        }
    }

    fn errors_changed(&mut self) {
        match serde_json::to_string(&self.errors) {
            Ok(json) => info!(errors = %json, "form errors changed"),
            Err(err) => warn!(%err, "form errors changed; map not serializable"),
        }
        self.notify(FormEvent::ErrorsChanged);
    }
}
