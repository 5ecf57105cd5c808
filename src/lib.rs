//! Systematic-review extraction client
//!
//! Reviews are edited locally as immutable trees, validated field by field and
//! persisted to a REST backend.

pub mod domain;
pub use domain::{
    Config, EffectSize, Exposure, Moderator, Outcome, Review, ReviewErrors, ReviewSummary,
    Validation,
};

/// The REST backend the client persists reviews to.
pub mod backend;
pub use backend::{Backend, BackendError, HttpBackend};

/// Draft, list and view-state orchestration.
pub mod controller;
pub use controller::{App, EditController, ListController, Message};
