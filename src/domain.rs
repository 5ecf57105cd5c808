//! Domain models for review extraction.
//!
//! This module contains the review tree, the field validation rules, the
//! effect-size reconciliation and the form operations used to edit a draft.

/// The review tree and its child records.
pub mod review;
pub use review::{
    EffectSize, Exposure, Field, Moderator, Outcome, Record, Review, ReviewSummary,
};

/// Field rules and review validation.
pub mod validation;
pub use validation::{ErrorKind, ReviewErrors, Validation, validate_review};

/// Cross-product reconciliation of effect sizes.
pub mod effect_size;
pub use effect_size::{EffectSizeKey, reconcile, upsert_effect_size};

/// Whole-subtree edit operations.
pub mod form;
pub use form::{Edit, FormError};

/// Static text shown to the operator.
pub mod labels;

mod config;
pub use config::{AfterSave, Config, ConfigError};
