//! Orchestration of drafts, the review list and the active view.
//!
//! Controllers hold state and talk to a [`Backend`](crate::backend::Backend);
//! they know nothing about how that state is presented.

use std::fmt;

mod edit;
pub use edit::{DraftState, EditController, SaveOutcome, SaveRejected, SaveTicket};

mod list;
pub use list::ListController;

mod keymap;
pub use keymap::{Action, KeyChord, KeyOutcome, Keymap, ParseChordError};

mod app;
pub use app::{App, EditView, ListView, View};

/// A banner shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Something went as planned.
    Success(String),
    /// Something failed.
    Error(String),
}

impl Message {
    /// The text of the banner.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Success(text) | Self::Error(text) => text,
        }
    }

    /// Whether this is an error banner.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}
