//! The review draft and its save cycle.

use tracing::instrument;

use crate::{
    backend::{Backend, BackendError},
    controller::Message,
    domain::{
        Edit, FormError, Review, ReviewErrors, Validation, labels, validate_review,
    },
};

/// Where a draft stands relative to its last save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftState {
    /// Unchanged since it was opened or last saved.
    Clean,
    /// Edited; the last save attempt, if any, passed validation.
    DirtyValid,
    /// Edited; the last save attempt failed validation with these errors.
    DirtyInvalid(ReviewErrors),
}

/// Why a save could not be started.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SaveRejected {
    /// Another save of this draft has not finished yet.
    #[error("a save is already in progress")]
    InFlight,
    /// The draft failed validation.
    #[error("the review has {} invalid field(s)", .0.len())]
    Invalid(ReviewErrors),
    /// No draft is being edited.
    #[error("no review is being edited")]
    NoDraft,
}

/// A save in progress, handed out by [`EditController::begin_save`].
///
/// The ticket carries the snapshot being sent, so the draft can keep changing
/// while the request is in flight. It cannot be cloned; each ticket finishes
/// exactly one save.
///
/// ```compile_fail
/// fn finish_twice(ticket: extraction::controller::SaveTicket) {
///     let _copy = ticket.clone();
/// }
/// ```
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a save ticket must be passed back to finish_save"]
pub struct SaveTicket {
    generation: u64,
    revision: u64,
    review: Review,
}

impl SaveTicket {
    /// The review to send.
    pub const fn review(&self) -> &Review {
        &self.review
    }

    /// The generation of the editor that issued the ticket.
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// The result of a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The backend accepted the review.
    Saved,
    /// The backend rejected the review or could not be reached.
    Failed,
    /// The draft failed validation; nothing was sent.
    Invalid,
    /// A save was already in flight; nothing was sent.
    InFlight,
    /// The response belongs to an editor that is no longer active.
    Stale,
}

/// Owns one review draft.
#[derive(Debug, Clone)]
pub struct EditController {
    draft: Review,
    state: DraftState,
    message: Option<Message>,
    saving: bool,
    generation: u64,
    revision: u64,
}

impl EditController {
    /// Starts editing `review`.
    #[must_use]
    pub fn new(review: Review) -> Self {
        Self::with_generation(review, 0)
    }

    /// Starts editing `review` as the editor of the given generation.
    #[must_use]
    pub const fn with_generation(review: Review, generation: u64) -> Self {
        Self {
            draft: review,
            state: DraftState::Clean,
            message: None,
            saving: false,
            generation,
            revision: 0,
        }
    }

    /// Sets the banner shown with the draft.
    #[must_use]
    pub fn with_message(mut self, message: Message) -> Self {
        self.message = Some(message);
        self
    }

    /// The current draft.
    #[must_use]
    pub const fn draft(&self) -> &Review {
        &self.draft
    }

    /// Where the draft stands.
    #[must_use]
    pub const fn state(&self) -> &DraftState {
        &self.state
    }

    /// The errors of the last failed validation, if the draft is in that
    /// state.
    #[must_use]
    pub const fn errors(&self) -> Option<&ReviewErrors> {
        match &self.state {
            DraftState::DirtyInvalid(errors) => Some(errors),
            DraftState::Clean | DraftState::DirtyValid => None,
        }
    }

    /// The banner to show, if any.
    #[must_use]
    pub const fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    /// Whether a save is in flight.
    #[must_use]
    pub const fn is_saving(&self) -> bool {
        self.saving
    }

    /// The generation this editor belongs to.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Replaces the draft wholesale.
    ///
    /// The draft is not validated. Errors from the last save attempt are kept
    /// for display until the next one.
    pub fn update(&mut self, review: Review) {
        self.draft = review;
        self.revision += 1;
        if self.state == DraftState::Clean {
            self.state = DraftState::DirtyValid;
        }
    }

    /// Applies one edit to the draft.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving the draft as it was, if the edit cannot be
    /// applied.
    pub fn apply(&mut self, edit: Edit) -> Result<(), FormError> {
        let review = edit.apply(&self.draft)?;
        self.update(review);
        Ok(())
    }

    /// Writes `na` into every empty text field of the draft.
    pub fn fill_blanks(&mut self) {
        let review = self.draft.fill_blanks();
        self.update(review);
    }

    /// Validates the draft and, if it passes, marks a save as in flight.
    ///
    /// # Errors
    ///
    /// Returns [`SaveRejected::InFlight`] while another save is in flight and
    /// [`SaveRejected::Invalid`] when the draft fails validation. In neither
    /// case should anything be sent to the backend.
    pub fn begin_save(&mut self) -> Result<SaveTicket, SaveRejected> {
        if self.saving {
            tracing::debug!(review = %self.draft.id, "save already in flight");
            return Err(SaveRejected::InFlight);
        }
        match validate_review(&self.draft) {
            Validation::Invalid(errors) => {
                self.state = DraftState::DirtyInvalid(errors.clone());
                self.message = Some(Message::Error(labels::MESSAGE_VALIDATION_ERROR.to_string()));
                Err(SaveRejected::Invalid(errors))
            }
            Validation::Valid => {
                if matches!(self.state, DraftState::DirtyInvalid(_)) {
                    self.state = DraftState::DirtyValid;
                }
                self.saving = true;
                Ok(SaveTicket {
                    generation: self.generation,
                    revision: self.revision,
                    review: self.draft.clone(),
                })
            }
        }
    }

    /// Records the backend's answer to a save started with
    /// [`EditController::begin_save`].
    ///
    /// Tickets issued by another generation are ignored.
    pub fn finish_save(
        &mut self,
        ticket: SaveTicket,
        result: Result<(), BackendError>,
    ) -> SaveOutcome {
        if ticket.generation != self.generation {
            tracing::debug!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale save response"
            );
            return SaveOutcome::Stale;
        }
        self.saving = false;
        match result {
            Ok(()) => {
                self.message = Some(Message::Success(labels::MESSAGE_REVIEW_SAVED.to_string()));
                // edits made while the request was in flight are still unsaved
                self.state = if ticket.revision == self.revision {
                    DraftState::Clean
                } else {
                    DraftState::DirtyValid
                };
                tracing::info!(review = %ticket.review.id, "review saved");
                SaveOutcome::Saved
            }
            Err(e) => {
                tracing::warn!(review = %ticket.review.id, error = %e, "failed to save review");
                self.message = Some(Message::Error(labels::MESSAGE_REVIEW_ERROR.to_string()));
                self.state = DraftState::DirtyValid;
                SaveOutcome::Failed
            }
        }
    }

    /// Validates the draft and, if it passes, sends it to the backend.
    #[instrument(skip_all, fields(review = %self.draft.id))]
    pub async fn save<B: Backend>(&mut self, backend: &B) -> SaveOutcome {
        let ticket = match self.begin_save() {
            Ok(ticket) => ticket,
            Err(rejected) => return rejected.into(),
        };
        let result = backend.save_review(ticket.review()).await;
        self.finish_save(ticket, result)
    }
}

impl From<SaveRejected> for SaveOutcome {
    fn from(rejected: SaveRejected) -> Self {
        match rejected {
            SaveRejected::InFlight => Self::InFlight,
            SaveRejected::Invalid(_) => Self::Invalid,
            SaveRejected::NoDraft => Self::Stale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        controller::testing::{Call, RecordingBackend, inapplicable_review},
        domain::{ErrorKind, review::ReviewField},
    };

    #[tokio::test]
    async fn blank_review_is_not_sent() {
        let backend = RecordingBackend::default();
        let mut editor = EditController::new(Review::blank());

        let outcome = editor.save(&backend).await;

        assert_eq!(outcome, SaveOutcome::Invalid);
        let errors = editor.errors().unwrap();
        assert!(errors.fields.len() >= 20);
        assert!(errors.fields.values().all(|&kind| kind == ErrorKind::Empty));
        assert_eq!(
            editor.message(),
            Some(&Message::Error(labels::MESSAGE_VALIDATION_ERROR.to_string()))
        );
        assert!(backend.calls().is_empty());
        assert!(!editor.is_saving());
    }

    #[tokio::test]
    async fn valid_review_is_saved_once() {
        let backend = RecordingBackend::default();
        let mut editor = EditController::new(Review::blank_with_id("r1"));
        editor.update(inapplicable_review("r1"));

        let outcome = editor.save(&backend).await;

        assert_eq!(outcome, SaveOutcome::Saved);
        assert_eq!(backend.calls(), vec![Call::Save("r1".to_string())]);
        assert_eq!(backend.stored("r1"), Some(inapplicable_review("r1")));
        assert_eq!(editor.state(), &DraftState::Clean);
        assert_eq!(
            editor.message(),
            Some(&Message::Success(labels::MESSAGE_REVIEW_SAVED.to_string()))
        );
    }

    #[tokio::test]
    async fn rejected_save_keeps_the_draft() {
        let backend = RecordingBackend::failing(500);
        let mut editor = EditController::new(Review::blank_with_id("r1"));
        editor.update(inapplicable_review("r1"));

        let outcome = editor.save(&backend).await;

        assert_eq!(outcome, SaveOutcome::Failed);
        assert_eq!(editor.draft(), &inapplicable_review("r1"));
        assert_eq!(editor.state(), &DraftState::DirtyValid);
        assert_eq!(
            editor.message(),
            Some(&Message::Error(labels::MESSAGE_REVIEW_ERROR.to_string()))
        );
        assert!(!editor.is_saving());

        // the draft stays editable
        editor
            .apply(Edit::Field(ReviewField::FirstAuthor, "Smith".to_string()))
            .unwrap();
        assert_eq!(editor.draft().first_author, "Smith");
    }

    #[test]
    fn update_marks_clean_draft_dirty() {
        let mut editor = EditController::new(Review::blank_with_id("r1"));
        assert_eq!(editor.state(), &DraftState::Clean);

        editor.update(Review::blank_with_id("r1"));

        assert_eq!(editor.state(), &DraftState::DirtyValid);
    }

    #[test]
    fn update_keeps_validation_errors() {
        let mut editor = EditController::new(Review::blank_with_id("r1"));
        assert!(editor.begin_save().is_err());

        editor
            .apply(Edit::Field(ReviewField::FirstAuthor, "Smith".to_string()))
            .unwrap();

        assert!(matches!(editor.state(), DraftState::DirtyInvalid(_)));
    }

    #[test]
    fn second_save_while_in_flight_is_rejected() {
        let mut editor = EditController::new(inapplicable_review("r1"));

        let ticket = editor.begin_save().unwrap();
        assert!(editor.is_saving());
        assert_eq!(editor.begin_save(), Err(SaveRejected::InFlight));

        assert_eq!(editor.finish_save(ticket, Ok(())), SaveOutcome::Saved);
        assert!(!editor.is_saving());
        assert!(editor.begin_save().is_ok());
    }

    #[test]
    fn finished_ticket_releases_the_guard_once() {
        let mut editor = EditController::new(inapplicable_review("r1"));
        let first = editor.begin_save().unwrap();
        assert_eq!(editor.finish_save(first, Ok(())), SaveOutcome::Saved);

        let second = editor.begin_save().unwrap();
        assert!(editor.is_saving());
        assert_eq!(editor.begin_save(), Err(SaveRejected::InFlight));
        assert_eq!(
            editor.finish_save(second, Err(BackendError::Status {
                status: 503,
                message: String::new(),
            })),
            SaveOutcome::Failed
        );
        assert!(!editor.is_saving());
    }

    #[test]
    fn edits_during_save_stay_dirty() {
        let mut editor = EditController::new(inapplicable_review("r1"));
        let ticket = editor.begin_save().unwrap();

        editor
            .apply(Edit::Field(ReviewField::FirstAuthor, "Smith".to_string()))
            .unwrap();
        let outcome = editor.finish_save(ticket, Ok(()));

        assert_eq!(outcome, SaveOutcome::Saved);
        assert_eq!(editor.state(), &DraftState::DirtyValid);
        assert_eq!(editor.draft().first_author, "Smith");
    }

    #[test]
    fn tickets_from_another_generation_are_ignored() {
        let mut old = EditController::with_generation(inapplicable_review("r1"), 1);
        let ticket = old.begin_save().unwrap();
        let mut current = EditController::with_generation(inapplicable_review("r1"), 2);

        let outcome = current.finish_save(ticket, Ok(()));

        assert_eq!(outcome, SaveOutcome::Stale);
        assert_eq!(current.message(), None);
        assert_eq!(current.state(), &DraftState::Clean);
    }

    #[test]
    fn fill_blanks_makes_blank_review_valid() {
        let mut editor = EditController::new(Review::blank_with_id("r1"));

        editor.fill_blanks();

        assert_eq!(editor.draft().extractor_name, "na");
        assert!(editor.begin_save().is_ok());
    }
}
