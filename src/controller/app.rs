//! The list/edit view switch.

use tracing::instrument;

use crate::{
    backend::{Backend, BackendError},
    controller::{
        Action, EditController, KeyChord, KeyOutcome, Keymap, ListController, Message,
        SaveOutcome, SaveRejected, SaveTicket,
    },
    domain::{AfterSave, Review, labels},
};

/// The review list with its shortcuts.
#[derive(Debug, Clone)]
pub struct ListView {
    keymap: Keymap,
}

/// The review editor with its shortcuts.
#[derive(Debug, Clone)]
pub struct EditView {
    editor: EditController,
    keymap: Keymap,
}

impl EditView {
    /// The draft's controller.
    #[must_use]
    pub const fn editor(&self) -> &EditController {
        &self.editor
    }
}

/// The active view.
#[derive(Debug, Clone)]
pub enum View {
    /// Browsing the review list.
    List(ListView),
    /// Editing one review.
    Edit(EditView),
}

impl View {
    fn list() -> Self {
        Self::List(ListView {
            keymap: Keymap::list_view(),
        })
    }

    fn edit(editor: EditController) -> Self {
        Self::Edit(EditView {
            editor,
            keymap: Keymap::edit_view(),
        })
    }

    /// The shortcuts of the view.
    #[must_use]
    pub const fn keymap(&self) -> &Keymap {
        match self {
            Self::List(view) => &view.keymap,
            Self::Edit(view) => &view.keymap,
        }
    }
}

/// The application shell.
///
/// Entering the editor bumps a generation counter; save responses issued by
/// an earlier editor are dropped.
#[derive(Debug)]
pub struct App<B> {
    backend: B,
    after_save: AfterSave,
    list: ListController,
    view: View,
    generation: u64,
}

impl<B: Backend> App<B> {
    /// Starts in the list view.
    pub fn new(backend: B, after_save: AfterSave) -> Self {
        Self {
            backend,
            after_save,
            list: ListController::new(),
            view: View::list(),
            generation: 0,
        }
    }

    /// The backend.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// The active view.
    pub const fn view(&self) -> &View {
        &self.view
    }

    /// The review list.
    pub const fn list(&self) -> &ListController {
        &self.list
    }

    /// The editor, when the edit view is active.
    pub const fn editor(&self) -> Option<&EditController> {
        match &self.view {
            View::Edit(view) => Some(&view.editor),
            View::List(_) => None,
        }
    }

    /// The editor, when the edit view is active.
    pub const fn editor_mut(&mut self) -> Option<&mut EditController> {
        match &mut self.view {
            View::Edit(view) => Some(&mut view.editor),
            View::List(_) => None,
        }
    }

    /// The current generation.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Fetches the review list if it is stale.
    pub async fn load_list(&mut self) {
        self.list.load(&self.backend).await;
    }

    /// Fetches the review list again.
    pub async fn refresh_list(&mut self) {
        self.list.refresh(&self.backend).await;
    }

    fn enter_edit(&mut self, review: Review, message: Option<Message>) {
        self.generation += 1;
        let mut editor = EditController::with_generation(review, self.generation);
        if let Some(message) = message {
            editor = editor.with_message(message);
        }
        tracing::debug!(generation = self.generation, review = %editor.draft().id, "entering editor");
        self.view = View::edit(editor);
    }

    /// Opens the editor on a blank review.
    pub fn add(&mut self) {
        self.enter_edit(Review::blank(), None);
    }

    /// Fetches a review and opens the editor on it.
    ///
    /// # Errors
    ///
    /// Returns an error, staying in the current view, if the review cannot be
    /// fetched.
    #[instrument(skip(self))]
    pub async fn view_existing(&mut self, id: &str) -> Result<(), BackendError> {
        match self.backend.fetch_review(id).await {
            Ok(review) => {
                self.enter_edit(review, None);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to fetch review");
                self.list
                    .notify(Message::Error(labels::MESSAGE_REVIEW_ERROR.to_string()));
                Err(e)
            }
        }
    }

    /// Returns to the list, discarding the draft.
    pub fn back_to_list(&mut self) {
        self.generation += 1;
        self.list.invalidate();
        self.view = View::list();
    }

    /// Starts saving the draft.
    ///
    /// # Errors
    ///
    /// Returns [`SaveRejected::NoDraft`] in the list view, otherwise whatever
    /// [`EditController::begin_save`] rejects the draft with.
    pub fn begin_save(&mut self) -> Result<SaveTicket, SaveRejected> {
        self.editor_mut()
            .ok_or(SaveRejected::NoDraft)?
            .begin_save()
    }

    /// Records the backend's answer to a save.
    ///
    /// Answers to tickets from an editor that is no longer active are
    /// dropped. A successful save moves on according to the configured
    /// [`AfterSave`].
    pub fn complete_save(
        &mut self,
        ticket: SaveTicket,
        result: Result<(), BackendError>,
    ) -> SaveOutcome {
        if ticket.generation() != self.generation {
            tracing::debug!(
                ticket = ticket.generation(),
                current = self.generation,
                "discarding stale save response"
            );
            return SaveOutcome::Stale;
        }
        let Some(editor) = self.editor_mut() else {
            return SaveOutcome::Stale;
        };
        let outcome = editor.finish_save(ticket, result);
        if outcome == SaveOutcome::Saved {
            let saved = Message::Success(labels::MESSAGE_REVIEW_SAVED.to_string());
            match self.after_save {
                AfterSave::Blank => self.enter_edit(Review::blank(), Some(saved)),
                AfterSave::List => {
                    self.back_to_list();
                    self.list.notify(saved);
                }
            }
        }
        outcome
    }

    /// Validates and saves the draft.
    pub async fn save(&mut self) -> SaveOutcome {
        let ticket = match self.begin_save() {
            Ok(ticket) => ticket,
            Err(rejected) => return rejected.into(),
        };
        let result = self.backend.save_review(ticket.review()).await;
        self.complete_save(ticket, result)
    }

    /// Fills the draft's blank fields. Does nothing in the list view.
    pub fn fill_blanks(&mut self) {
        if let Some(editor) = self.editor_mut() {
            editor.fill_blanks();
        }
    }

    /// Runs the shortcut bound to `chord` in the active view, if any.
    pub async fn handle_key(&mut self, chord: KeyChord) -> KeyOutcome {
        let outcome = self.view.keymap().resolve(chord);
        if let KeyOutcome::Handled(action) = outcome {
            tracing::debug!(%chord, ?action, "shortcut");
            match action {
                Action::Add => self.add(),
                Action::Save => {
                    self.save().await;
                }
                Action::FillBlanks => self.fill_blanks(),
            }
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        controller::{
            DraftState,
            testing::{Call, RecordingBackend, inapplicable_review},
        },
        domain::Edit,
    };

    fn app(backend: RecordingBackend) -> App<RecordingBackend> {
        App::new(backend, AfterSave::Blank)
    }

    #[test]
    fn starts_in_list_view() {
        let app = app(RecordingBackend::default());
        assert!(matches!(app.view(), View::List(_)));
        assert!(app.editor().is_none());
    }

    #[test]
    fn add_opens_blank_draft_without_network() {
        let mut app = app(RecordingBackend::default());

        app.add();

        let editor = app.editor().unwrap();
        assert_eq!(editor.state(), &DraftState::Clean);
        assert!(editor.draft().moderators[0].is_overall());
        assert!(app.backend().calls().is_empty());
    }

    #[tokio::test]
    async fn view_existing_fetches_then_edits() {
        let mut app = app(RecordingBackend::default().with_review(inapplicable_review("r1")));

        app.view_existing("r1").await.unwrap();

        assert_eq!(app.editor().unwrap().draft(), &inapplicable_review("r1"));
        assert_eq!(app.backend().calls(), vec![Call::Fetch("r1".to_string())]);
    }

    #[tokio::test]
    async fn failed_fetch_stays_on_list() {
        let mut app = app(RecordingBackend::default());

        assert!(app.view_existing("missing").await.is_err());

        assert!(matches!(app.view(), View::List(_)));
        assert!(app.list().message().is_some_and(Message::is_error));
    }

    #[tokio::test]
    async fn back_to_list_discards_draft() {
        let mut app = app(RecordingBackend::default());
        app.add();
        app.editor_mut()
            .unwrap()
            .apply(Edit::AddExposure)
            .unwrap();

        app.back_to_list();
        app.load_list().await;

        assert!(app.editor().is_none());
        assert_eq!(app.backend().calls(), vec![Call::List]);
    }

    #[tokio::test]
    async fn successful_save_starts_a_fresh_draft() {
        let mut app = app(RecordingBackend::default());
        app.add();
        app.editor_mut().unwrap().update(inapplicable_review("r1"));

        assert_eq!(app.save().await, SaveOutcome::Saved);

        let editor = app.editor().unwrap();
        assert_ne!(editor.draft().id, "r1");
        assert_eq!(editor.state(), &DraftState::Clean);
        assert_eq!(
            editor.message(),
            Some(&Message::Success(labels::MESSAGE_REVIEW_SAVED.to_string()))
        );
        assert_eq!(app.backend().saves(), 1);
    }

    #[tokio::test]
    async fn successful_save_can_return_to_list() {
        let mut app = App::new(RecordingBackend::default(), AfterSave::List);
        app.add();
        app.editor_mut().unwrap().update(inapplicable_review("r1"));

        assert_eq!(app.save().await, SaveOutcome::Saved);

        assert!(matches!(app.view(), View::List(_)));
        assert!(app.list().message().is_some_and(|m| !m.is_error()));
    }

    #[tokio::test]
    async fn invalid_draft_is_not_sent() {
        let mut app = app(RecordingBackend::default());
        app.add();

        assert_eq!(app.save().await, SaveOutcome::Invalid);

        assert!(app.backend().calls().is_empty());
        assert!(app.editor().unwrap().errors().is_some());
    }

    #[test]
    fn save_response_after_leaving_editor_is_dropped() {
        let mut app = app(RecordingBackend::default());
        app.add();
        app.editor_mut().unwrap().update(inapplicable_review("r1"));
        let ticket = app.begin_save().unwrap();

        app.back_to_list();
        app.add();
        let outcome = app.complete_save(ticket, Ok(()));

        assert_eq!(outcome, SaveOutcome::Stale);
        let editor = app.editor().unwrap();
        assert_eq!(editor.message(), None);
        assert!(!editor.is_saving());
    }

    #[test]
    fn begin_save_needs_a_draft() {
        let mut app = app(RecordingBackend::default());
        assert_eq!(app.begin_save(), Err(SaveRejected::NoDraft));
    }

    #[tokio::test]
    async fn shortcuts_follow_the_active_view() {
        let mut app = app(RecordingBackend::default());
        let save = KeyChord::plain('s').ctrl();
        let fill = KeyChord::plain('a').ctrl().shift();

        assert_eq!(app.handle_key(save).await, KeyOutcome::Ignored);
        assert_eq!(
            app.handle_key(KeyChord::plain('n')).await,
            KeyOutcome::Handled(Action::Add)
        );
        assert!(app.editor().is_some());

        assert_eq!(app.handle_key(KeyChord::plain('n')).await, KeyOutcome::Ignored);
        assert_eq!(
            app.handle_key(fill).await,
            KeyOutcome::Handled(Action::FillBlanks)
        );
        assert_eq!(app.editor().unwrap().draft().first_author, "na");

        assert_eq!(app.handle_key(save).await, KeyOutcome::Handled(Action::Save));
        assert_eq!(app.backend().saves(), 1);
    }
}
