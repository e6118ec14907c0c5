//! The user record form (interaction and state; drawing lives in `render.rs`).
//!
//! Focus moves through a ring of targets: the three scalar inputs, one title
//! input per item, the "Add Item" button and the "Submit" button. The ring is
//! rebuilt from the form state on every query, so it follows appends and
//! removals without bookkeeping.
//!
//! Leaving a text input blurs it, which is what marks a field touched and,
//! in the default mode, first shows its error. Every keystroke on a text
//! input is forwarded to `FormState::set_value`.
//!
//! Re-rendering is driven by the form itself: `register_action_handler`
//! subscribes to the `FormState` and turns every form event into an
//! `Action::Render`.

mod render;

pub use render::{FormRenderMetrics, render_user_form};

use color_eyre::Result;
use crossterm::event::{Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers};
use forms::{FieldPath, FormState, Item, Schema, SubmitStatus, ValidationMode, record::ITEMS};
use ratatui::layout::{Constraint, Rect};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, trace, warn};
use tui_input::{Input, backend::crossterm::EventHandler};

use crate::{
    action::Action,
    components::Component,
    tui::{EventResponse, Frame},
};

/// A stop in the focus ring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Focus {
    Field(FieldPath),
    AddItem,
    Submit,
}

pub struct UserForm {
    title: String,
    form: FormState,
    focused: usize,
    input: Input,
    last_submission: Option<String>,
    scroll: u16,
}

impl UserForm {
    pub fn new(title: impl Into<String>, mode: ValidationMode) -> Self {
        let mut this = Self {
            title: title.into(),
            form: FormState::new(Schema::user_record()).with_mode(mode),
            focused: 0,
            input: Input::default(),
            last_submission: None,
            scroll: 0,
        };
        this.sync_input();
        this
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    /// Pretty JSON of the last validated submission.
    pub fn last_submission(&self) -> Option<&str> {
        self.last_submission.as_deref()
    }

    pub fn focus_targets(&self) -> Vec<Focus> {
        self.form
            .draft()
            .paths()
            .into_iter()
            .map(Focus::Field)
            .chain([Focus::AddItem, Focus::Submit])
            .collect()
    }

    pub fn focused(&self) -> Focus {
        let mut targets = self.focus_targets();
        let index = self.focused.min(targets.len() - 1);
        targets.swap_remove(index)
    }

    fn focused_path(&self) -> Option<FieldPath> {
        match self.focused() {
            Focus::Field(path) => Some(path),
            Focus::AddItem | Focus::Submit => None,
        }
    }

    /// Index of the item whose row has focus.
    pub fn focused_item(&self) -> Option<usize> {
        self.focused_path().and_then(|path| path.list_index(ITEMS))
    }

    // --- Accessors used by the renderer --------------------------------------------------------

    pub(super) fn title(&self) -> &str {
        &self.title
    }

    pub(super) fn input(&self) -> &Input {
        &self.input
    }

    pub(super) fn scroll(&self) -> u16 {
        self.scroll
    }

    pub(super) fn set_scroll(&mut self, scroll: u16) {
        self.scroll = scroll;
    }

    // --- Focus ---------------------------------------------------------------------------------

    fn blur_current(&mut self) -> Result<()> {
        if let Some(path) = self.focused_path() {
            self.form.blur(&path)?;
        }
        Ok(())
    }

    fn focus_index(&mut self, index: usize) {
        self.focused = index.min(self.focus_targets().len() - 1);
        self.sync_input();
    }

    pub fn focus_next(&mut self) -> Result<()> {
        self.blur_current()?;
        let len = self.focus_targets().len();
        self.focus_index((self.focused + 1) % len);
        Ok(())
    }

    pub fn focus_prev(&mut self) -> Result<()> {
        self.blur_current()?;
        let len = self.focus_targets().len();
        let prev = if self.focused == 0 {
            len - 1
        } else {
            self.focused - 1
        };
        self.focus_index(prev);
        Ok(())
    }

    fn focus_path(&mut self, path: &FieldPath) {
        if let Some(index) = self
            .focus_targets()
            .iter()
            .position(|target| *target == Focus::Field(path.clone()))
        {
            self.focus_index(index);
        }
    }

    /// Load the focused field's value into the line editor.
    fn sync_input(&mut self) {
        let value = self
            .focused_path()
            .and_then(|path| self.form.value(&path).map(str::to_string))
            .unwrap_or_default();
        self.input = Input::new(value);
    }

    // --- Form operations -----------------------------------------------------------------------

    fn edit(&mut self, path: &FieldPath, key: KeyEvent) -> Result<()> {
        if self.input.handle_event(&CrosstermEvent::Key(key)).is_some() {
            self.form.set_value(path, self.input.value())?;
        }
        Ok(())
    }

    /// Append a blank item and focus its title, blurring the field left behind.
    pub fn add_item(&mut self) -> Result<()> {
        self.blur_current()?;
        let index = self.form.append_item(Item::default());
        self.focus_path(&FieldPath::item(ITEMS, index, "title"));
        Ok(())
    }

    pub fn remove_item(&mut self, index: usize) -> Result<()> {
        let removed = self.form.remove_item(index)?;
        debug!(index, title = %removed.title, "removed item");
        self.focus_index(self.focused);
        Ok(())
    }

    /// Validate and, if valid, keep the record for inspection. On failure
    /// focus moves to the first invalid field.
    pub fn submit(&mut self) -> Result<SubmitStatus> {
        let mut accepted = None;
        let status = self.form.submit(|record| {
            accepted = Some(serde_json::to_string_pretty(record));
        });

        match accepted {
            Some(Ok(json)) => self.last_submission = Some(json),
            Some(Err(err)) => warn!(%err, "validated record could not be rendered"),
            None => {}
        }

        if status == SubmitStatus::Invalid {
            let first_invalid = self
                .focus_targets()
                .into_iter()
                .find_map(|target| match target {
                    Focus::Field(path) if self.form.errors().contains(&path) => Some(path),
                    _ => None,
                });
            if let Some(path) = first_invalid {
                if self.focused_path().as_ref() != Some(&path) {
                    self.blur_current()?;
                    self.focus_path(&path);
                }
            }
        }
        Ok(status)
    }

    pub fn reset(&mut self) {
        self.form.reset();
        self.last_submission = None;
        self.scroll = 0;
        self.focus_index(0);
    }
}

impl Component for UserForm {
    fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
        self.form.subscribe(move |event, _| {
            trace!(?event, "form event");
            // the receiver is gone once the app loop has shut down
            let _ = tx.send(Action::Render);
        });
        Ok(())
    }

    fn height_constraint(&self) -> Constraint {
        Constraint::Fill(1)
    }

    fn handle_key_events(&mut self, key: KeyEvent) -> Result<Option<EventResponse<Action>>> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let action = match key.code {
            KeyCode::Tab | KeyCode::Down => Action::FocusNext,
            KeyCode::BackTab | KeyCode::Up => Action::FocusPrev,
            KeyCode::Char('s') if ctrl => Action::Submit,
            KeyCode::Char('r') if ctrl => Action::Reset,
            KeyCode::Char('n') if ctrl => Action::AddItem,
            KeyCode::Char('d') if ctrl => match self.focused_item() {
                Some(index) => Action::RemoveItem(index),
                None => return Ok(None),
            },
            KeyCode::Esc => return Ok(None),
            KeyCode::Char(_) if ctrl => return Ok(None),
            KeyCode::Enter => match self.focused() {
                Focus::Field(_) => Action::FocusNext,
                Focus::AddItem => Action::AddItem,
                Focus::Submit => Action::Submit,
            },
            _ => match self.focused() {
                Focus::Field(path) => {
                    self.edit(&path, key)?;
                    Action::Update
                }
                Focus::AddItem | Focus::Submit => return Ok(None),
            },
        };
        Ok(Some(EventResponse::Stop(action)))
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::FocusNext => self.focus_next()?,
            Action::FocusPrev => self.focus_prev()?,
            Action::AddItem => self.add_item()?,
            Action::RemoveItem(index) => self.remove_item(index)?,
            Action::Submit => {
                self.submit()?;
            }
            Action::Reset => self.reset(),
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, f: &mut Frame<'_>, area: Rect) -> Result<()> {
        render_user_form(self, f, area)?;
        Ok(())
    }
}
