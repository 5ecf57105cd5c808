//! The interactive list/edit shell.
//!
//! Each prompt accepts either a shortcut of the active view (`n`, `ctrl+s`,
//! `ctrl+shift+a`) or a command word.

use anyhow::Context;
use clap::Parser;
use dialoguer::{Input, theme::ColorfulTheme};
use extraction::{
    App, Backend,
    controller::{Action, KeyChord, KeyOutcome, SaveOutcome, View},
    domain::{form::Section, labels},
};
use tracing::instrument;

use super::{
    Settings, form, list, show,
    terminal::{self, Colorize},
};

/// Command arguments for `extract browse`.
#[derive(Debug, Default, Parser)]
#[command(about = "Browse and edit reviews interactively")]
pub struct Browse {}

/// The view the shell opens with.
#[derive(Debug)]
pub enum Start {
    List,
    Add,
    Existing(String),
}

impl Browse {
    #[instrument(skip(settings))]
    pub async fn run(self, settings: &Settings, start: Start) -> anyhow::Result<()> {
        let mut shell = Shell {
            app: App::new(settings.backend()?, settings.config.after_save),
            theme: ColorfulTheme::default(),
        };

        match start {
            Start::List => {}
            Start::Add => shell.app.add(),
            Start::Existing(id) => shell
                .app
                .view_existing(&id)
                .await
                .with_context(|| format!("failed to fetch review {id}"))?,
        }
        shell.run().await
    }
}

enum Flow {
    Continue,
    Quit,
}

struct Shell<B> {
    app: App<B>,
    theme: ColorfulTheme,
}

impl<B: Backend> Shell<B> {
    async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            if matches!(self.app.view(), View::List(_)) {
                self.app.load_list().await;
            }
            self.render();

            let line = Input::<String>::with_theme(&self.theme)
                .with_prompt(self.prompt())
                .allow_empty(true)
                .interact_text()?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Ok(chord) = line.parse::<KeyChord>() {
                if self.shortcut(chord).await.suppresses_default() {
                    continue;
                }
            }
            if let Flow::Quit = self.command(line).await? {
                return Ok(());
            }
        }
    }

    const fn prompt(&self) -> &'static str {
        match self.app.view() {
            View::List(_) => "reviews",
            View::Edit(_) => "edit",
        }
    }

    async fn shortcut(&mut self, chord: KeyChord) -> KeyOutcome {
        let outcome = self.app.view().keymap().resolve(chord);
        if outcome == KeyOutcome::Handled(Action::Save) {
            self.save().await;
            return outcome;
        }
        self.app.handle_key(chord).await
    }

    async fn save(&mut self) -> SaveOutcome {
        let spinner = terminal::spinner("Saving review");
        let outcome = self.app.save().await;
        spinner.finish_and_clear();
        if outcome == SaveOutcome::InFlight {
            println!("{}", "A save is already in progress.".warning());
        }
        outcome
    }

    async fn command(&mut self, line: &str) -> anyhow::Result<Flow> {
        let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
        let editing = matches!(self.app.view(), View::Edit(_));
        match (editing, word) {
            (_, "q" | "quit") => return Ok(Flow::Quit),
            (_, "?" | "help") => self.help(),
            (false, "r" | "refresh") => self.app.refresh_list().await,
            (false, "open" | "o") => self.open(rest).await,
            (false, number) if number.parse::<usize>().is_ok() => self.open(number).await,
            (true, "save") => {
                self.save().await;
            }
            (true, "fill") => self.app.fill_blanks(),
            (true, "back" | "b") => self.app.back_to_list(),
            (true, "show") => {
                if let Some(editor) = self.app.editor() {
                    show::render_review(editor.draft(), editor.errors());
                }
            }
            (true, "errors") => match self.app.editor().and_then(|e| e.errors()) {
                Some(errors) => super::validate::print_errors(errors),
                None => println!("{}", "No validation errors.".success()),
            },
            (true, "details" | "d") => {
                if let Some(editor) = self.app.editor_mut() {
                    form::edit_details(&self.theme, editor)?;
                }
            }
            (true, "exposures" | "e") => self.edit_section(Section::Exposures)?,
            (true, "outcomes" | "o") => self.edit_section(Section::Outcomes)?,
            (true, "moderators" | "m") => self.edit_section(Section::Moderators)?,
            (true, "effects" | "es") => {
                if let Some(editor) = self.app.editor_mut() {
                    form::edit_effect_sizes(&self.theme, editor)?;
                }
            }
            (_, other) => println!(
                "{}",
                format!("Unknown command '{other}', type 'help' for a list.").warning()
            ),
        }
        Ok(Flow::Continue)
    }

    fn edit_section(&mut self, section: Section) -> anyhow::Result<()> {
        if let Some(editor) = self.app.editor_mut() {
            form::edit_section(&self.theme, editor, section)?;
        }
        Ok(())
    }

    async fn open(&mut self, position: &str) {
        let id = position
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|index| self.app.list().select(index))
            .map(ToString::to_string);
        match id {
            // a failed fetch is reported through the list banner
            Some(id) => {
                let _ = self.app.view_existing(&id).await;
            }
            None => println!("{}", format!("No review at '{position}'.").warning()),
        }
    }

    fn render(&self) {
        match self.app.view() {
            View::List(_) => {
                terminal::heading(labels::HEADING_LIST_VIEW);
                if let Some(message) = self.app.list().message() {
                    terminal::banner(message);
                }
                list::render_table(self.app.list().reviews(), true);
            }
            View::Edit(view) => {
                let editor = view.editor();
                let draft = editor.draft();
                terminal::heading(&format!("{} ({})", labels::HEADING_REVIEW_DETAILS, draft.id));
                if let Some(message) = editor.message() {
                    terminal::banner(message);
                }
                let errors = editor.errors().map_or(0, extraction::ReviewErrors::len);
                println!(
                    "  {} {} · {} {} · {} {} · {} stored effect size(s){}",
                    draft.exposures.len(),
                    labels::HEADING_EXPOSURES.to_lowercase(),
                    draft.outcomes.len(),
                    labels::HEADING_OUTCOMES.to_lowercase(),
                    draft.moderators.len(),
                    labels::HEADING_MODERATORS.to_lowercase(),
                    draft.effect_sizes.len(),
                    if errors > 0 {
                        format!(" · {}", format!("{errors} invalid field(s)").error())
                    } else {
                        String::new()
                    }
                );
            }
        }
        println!("{}", self.hints().dim());
    }

    fn hints(&self) -> String {
        let keymap = self.app.view().keymap();
        let mut hints: Vec<String> = keymap
            .bindings()
            .map(|(chord, action)| format!("{chord}: {}", action_label(action)))
            .collect();
        hints.push(match self.app.view() {
            View::List(_) => "<number>: open, r: refresh, q: quit".to_string(),
            View::Edit(_) => format!(
                "details, exposures, outcomes, moderators, effects, show, errors, back: {}, quit",
                labels::BUTTON_LIST_REVIEWS
            ),
        });
        hints.join(" | ")
    }

    fn help(&self) {
        terminal::heading("Help");
        println!("{}", self.hints());
        if let View::Edit(_) = self.app.view() {
            println!("  Leaving the editor discards unsaved changes.");
        }
    }
}

const fn action_label(action: Action) -> &'static str {
    match action {
        Action::Add => labels::BUTTON_ADD_REVIEW,
        Action::Save => labels::BUTTON_SAVE,
        Action::FillBlanks => "Fill blanks with na",
    }
}
