use serde::{Deserialize, Serialize};
use strum::Display;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Display, Deserialize)]
pub enum Action {
    Tick,
    Render,
    Resize(u16, u16),
    Suspend,
    Resume,
    Quit,
    Error(String),
    /// Something changed that the next frame should show.
    Update,
    FocusNext,
    FocusPrev,
    AddItem,
    /// Remove the item at this index.
    RemoveItem(usize),
    Submit,
    Reset,
}
