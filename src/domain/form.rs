//! Edits of a review draft.
//!
//! Every edit takes the current review by reference and returns a new one;
//! the sub-tree being edited is replaced as a whole.

use std::fmt;

use crate::domain::{
    effect_size::upsert_effect_size,
    review::{EffectSize, Exposure, Moderator, Outcome, Record, Review, ReviewField},
};

/// A repeatable sub-form of the review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    /// The exposures collection.
    Exposures,
    /// The outcomes collection.
    Outcomes,
    /// The moderators collection.
    Moderators,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Exposures => "exposures",
            Self::Outcomes => "outcomes",
            Self::Moderators => "moderators",
        })
    }
}

/// Errors raised when an edit cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    /// The edit addresses an element that does not exist.
    #[error("no element {index} in {section}")]
    OutOfRange {
        /// The collection addressed.
        section: Section,
        /// The requested position.
        index: usize,
    },

    /// The baseline "Overall" moderator cannot be removed or renamed.
    #[error("the Overall moderator cannot be removed or renamed")]
    BaselineModerator,
}

/// One change to a review draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Replace a scalar field of the review.
    Field(ReviewField, String),
    /// Set the inclusion criteria confirmation.
    Confirm(bool),
    /// Replace the AMSTAR 2 answers.
    Amstar(Vec<String>),
    /// Append a blank exposure.
    AddExposure,
    /// Replace the exposure at a position.
    UpdateExposure(usize, Exposure),
    /// Remove the exposure at a position.
    RemoveExposure(usize),
    /// Append a blank outcome.
    AddOutcome,
    /// Replace the outcome at a position.
    UpdateOutcome(usize, Outcome),
    /// Remove the outcome at a position.
    RemoveOutcome(usize),
    /// Append a blank moderator.
    AddModerator,
    /// Replace the moderator at a position.
    UpdateModerator(usize, Moderator),
    /// Remove the moderator at a position.
    RemoveModerator(usize),
    /// Store an effect size, replacing the one with the same triple.
    SaveEffectSize(EffectSize),
}

impl Edit {
    /// Applies the edit, returning the edited copy of the review.
    ///
    /// # Errors
    ///
    /// Returns an error if the edit addresses a missing element or would
    /// remove or rename the baseline moderator. The review is left as it was.
    pub fn apply(self, review: &Review) -> Result<Review, FormError> {
        let mut next = review.clone();
        match self {
            Self::Field(field, value) => *next.value_mut(field) = value,
            Self::Confirm(confirmed) => next.are_you_sure = confirmed,
            Self::Amstar(answers) => next.amstar_2 = answers,
            Self::AddExposure => next.exposures.push(Exposure::blank()),
            Self::UpdateExposure(index, exposure) => {
                replace(&mut next.exposures, Section::Exposures, index, exposure)?;
            }
            Self::RemoveExposure(index) => {
                remove(&mut next.exposures, Section::Exposures, index)?;
            }
            Self::AddOutcome => next.outcomes.push(Outcome::blank()),
            Self::UpdateOutcome(index, outcome) => {
                replace(&mut next.outcomes, Section::Outcomes, index, outcome)?;
            }
            Self::RemoveOutcome(index) => {
                remove(&mut next.outcomes, Section::Outcomes, index)?;
            }
            Self::AddModerator => next.moderators.push(Moderator::blank()),
            Self::UpdateModerator(index, moderator) => {
                if index == 0
                    && review.moderators.first().is_some_and(Moderator::is_overall)
                    && !moderator.is_overall()
                {
                    return Err(FormError::BaselineModerator);
                }
                replace(&mut next.moderators, Section::Moderators, index, moderator)?;
            }
            Self::RemoveModerator(index) => {
                if index == 0 && next.moderators.first().is_some_and(Moderator::is_overall) {
                    return Err(FormError::BaselineModerator);
                }
                remove(&mut next.moderators, Section::Moderators, index)?;
            }
            Self::SaveEffectSize(effect_size) => {
                next.effect_sizes = upsert_effect_size(review, effect_size);
            }
        }
        Ok(next)
    }
}

fn replace<T>(items: &mut [T], section: Section, index: usize, item: T) -> Result<(), FormError> {
    let slot = items
        .get_mut(index)
        .ok_or(FormError::OutOfRange { section, index })?;
    *slot = item;
    Ok(())
}

fn remove<T>(items: &mut Vec<T>, section: Section, index: usize) -> Result<(), FormError> {
    if index >= items.len() {
        return Err(FormError::OutOfRange { section, index });
    }
    items.remove(index);
    Ok(())
}
