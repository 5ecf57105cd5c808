//! Interactive editors for the parts of a review draft.
//!
//! Each editor prompts for new values and hands them to the draft's
//! controller as whole-record edits.

use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};
use extraction::{
    EditController,
    domain::{
        Edit,
        effect_size::reconcile,
        form::Section,
        labels,
        review::{Field, Record, ReviewField},
        validation::FieldErrors,
    },
};

use super::terminal::{self, Colorize};

/// Prompts for every field of a record, starting from its current values.
///
/// Fields with an error show the error's guidance next to their label.
pub fn prompt_record<R: Record + Clone>(
    theme: &ColorfulTheme,
    record: &R,
    errors: Option<&FieldErrors<R::Field>>,
) -> dialoguer::Result<R> {
    let mut edited = record.clone();
    for &field in R::Field::ALL {
        let prompt = match errors.and_then(|errors| errors.get(&field)) {
            Some(kind) => format!("{} {}", field.label(), format!("[{}]", kind.message()).error()),
            None => field.label().to_string(),
        };
        let value = Input::<String>::with_theme(theme)
            .with_prompt(prompt)
            .with_initial_text(record.value(field))
            .allow_empty(true)
            .interact_text()?;
        *edited.value_mut(field) = value;
    }
    Ok(edited)
}

/// Edits the review's own fields.
pub fn edit_details(theme: &ColorfulTheme, editor: &mut EditController) -> anyhow::Result<()> {
    terminal::heading(labels::HEADING_REVIEW_DETAILS);
    let errors = editor.errors().map(|errors| errors.fields.clone());
    let edited = prompt_record(theme, editor.draft(), errors.as_ref())?;

    for &field in ReviewField::ALL {
        let value = edited.value(field);
        if value != editor.draft().value(field) {
            editor.apply(Edit::Field(field, value.to_string()))?;
        }
    }

    let confirmed = Confirm::with_theme(theme)
        .with_prompt(labels::LABEL_REVIEW_ARE_YOU_SURE)
        .default(editor.draft().are_you_sure)
        .interact()?;
    if confirmed != editor.draft().are_you_sure {
        editor.apply(Edit::Confirm(confirmed))?;
    }

    let answers = Input::<String>::with_theme(theme)
        .with_prompt(format!("{} (comma separated)", labels::LABEL_REVIEW_AMSTAR_2))
        .with_initial_text(editor.draft().amstar_2.join(", "))
        .allow_empty(true)
        .interact_text()?;
    let answers: Vec<String> = answers
        .split(',')
        .map(str::trim)
        .filter(|answer| !answer.is_empty())
        .map(ToString::to_string)
        .collect();
    if answers != editor.draft().amstar_2 {
        editor.apply(Edit::Amstar(answers))?;
    }
    Ok(())
}

/// Texts of one repeatable section.
struct SectionLabels {
    heading: &'static str,
    item: &'static str,
    add: &'static str,
    remove: &'static str,
}

const fn section_labels(section: Section) -> SectionLabels {
    match section {
        Section::Exposures => SectionLabels {
            heading: labels::HEADING_EXPOSURES,
            item: labels::HEADING_EXPOSURE,
            add: labels::BUTTON_EXPOSURE_ADD,
            remove: labels::TITLE_EXPOSURE_REMOVE,
        },
        Section::Outcomes => SectionLabels {
            heading: labels::HEADING_OUTCOMES,
            item: labels::HEADING_OUTCOME,
            add: labels::BUTTON_OUTCOME_ADD,
            remove: labels::TITLE_OUTCOME_REMOVE,
        },
        Section::Moderators => SectionLabels {
            heading: labels::HEADING_MODERATORS,
            item: labels::HEADING_MODERATOR,
            add: labels::BUTTON_MODERATOR_ADD,
            remove: labels::TITLE_MODERATOR_REMOVE,
        },
    }
}

/// One-line description of each element of a section.
fn section_items(editor: &EditController, section: Section) -> Vec<String> {
    let draft = editor.draft();
    let errors = editor.errors();
    let describe = |index: usize, title: &str, invalid: bool| {
        let title = if title.is_empty() { "(blank)" } else { title };
        let marker = if invalid { " ✖".error() } else { String::new() };
        format!("{} {}: {title}{marker}", section_labels(section).item, index + 1)
    };
    match section {
        Section::Exposures => draft
            .exposures
            .iter()
            .enumerate()
            .map(|(i, e)| {
                describe(i, &e.content_specifics, errors.and_then(|x| x.exposure(i)).is_some())
            })
            .collect(),
        Section::Outcomes => draft
            .outcomes
            .iter()
            .enumerate()
            .map(|(i, o)| {
                describe(i, &o.specific_variable, errors.and_then(|x| x.outcome(i)).is_some())
            })
            .collect(),
        Section::Moderators => draft
            .moderators
            .iter()
            .enumerate()
            .map(|(i, m)| describe(i, &m.level, errors.and_then(|x| x.moderator(i)).is_some()))
            .collect(),
    }
}

/// Lets the operator add, edit and remove the elements of a section.
pub fn edit_section(
    theme: &ColorfulTheme,
    editor: &mut EditController,
    section: Section,
) -> anyhow::Result<()> {
    let texts = section_labels(section);
    loop {
        terminal::heading(texts.heading);
        let mut items = section_items(editor, section);
        let count = items.len();
        items.push(texts.add.to_string());
        items.push("Done".to_string());

        let Some(choice) = Select::with_theme(theme)
            .items(&items)
            .default(0)
            .interact_opt()?
        else {
            return Ok(());
        };

        if choice == count {
            let add = match section {
                Section::Exposures => Edit::AddExposure,
                Section::Outcomes => Edit::AddOutcome,
                Section::Moderators => Edit::AddModerator,
            };
            editor.apply(add)?;
            edit_element(theme, editor, section, count)?;
        } else if choice < count {
            let actions = ["Edit", texts.remove, "Cancel"];
            let action = Select::with_theme(theme)
                .with_prompt(&items[choice])
                .items(&actions[..])
                .default(0)
                .interact_opt()?;
            match action {
                Some(0) => edit_element(theme, editor, section, choice)?,
                Some(1) => {
                    let remove = match section {
                        Section::Exposures => Edit::RemoveExposure(choice),
                        Section::Outcomes => Edit::RemoveOutcome(choice),
                        Section::Moderators => Edit::RemoveModerator(choice),
                    };
                    if let Err(e) = editor.apply(remove) {
                        println!("{}", e.to_string().warning());
                    }
                }
                _ => {}
            }
        } else {
            return Ok(());
        }
    }
}

fn edit_element(
    theme: &ColorfulTheme,
    editor: &mut EditController,
    section: Section,
    index: usize,
) -> anyhow::Result<()> {
    let draft = editor.draft();
    let errors = editor.errors();
    let edit = match section {
        Section::Exposures => Edit::UpdateExposure(
            index,
            prompt_record(
                theme,
                &draft.exposures[index],
                errors.and_then(|e| e.exposure(index)),
            )?,
        ),
        Section::Outcomes => Edit::UpdateOutcome(
            index,
            prompt_record(
                theme,
                &draft.outcomes[index],
                errors.and_then(|e| e.outcome(index)),
            )?,
        ),
        Section::Moderators => Edit::UpdateModerator(
            index,
            prompt_record(
                theme,
                &draft.moderators[index],
                errors.and_then(|e| e.moderator(index)),
            )?,
        ),
    };
    if let Err(e) = editor.apply(edit) {
        println!("{}", e.to_string().warning());
    }
    Ok(())
}

/// Lets the operator pick an exposure × outcome × moderator triple and enter
/// its effect size.
pub fn edit_effect_sizes(theme: &ColorfulTheme, editor: &mut EditController) -> anyhow::Result<()> {
    loop {
        terminal::heading(labels::SUBHEADING_QUANTITATIVE_STRENGTH);
        let (items, chosen) = {
            let reconciliation = reconcile(editor.draft());
            let items: Vec<String> = reconciliation
                .entries()
                .iter()
                .map(|entry| {
                    let marker = if entry.is_placeholder() {
                        " (not entered)".dim()
                    } else if entry.errors().is_empty() {
                        String::new()
                    } else {
                        " ✖".error()
                    };
                    format!("{}{marker}", entry.label)
                })
                .collect();
            if items.is_empty() {
                println!(
                    "{}",
                    "Add at least one exposure, outcome and moderator first.".dim()
                );
                return Ok(());
            }
            let entries: Vec<_> = reconciliation
                .entries()
                .iter()
                .map(|entry| (entry.to_effect_size(), entry.errors()))
                .collect();
            (items, entries)
        };

        let mut menu = items;
        menu.push("Done".to_string());
        let Some(choice) = Select::with_theme(theme)
            .items(&menu)
            .default(0)
            .interact_opt()?
        else {
            return Ok(());
        };
        let Some((effect_size, errors)) = chosen.get(choice) else {
            return Ok(());
        };

        let edited = prompt_record(theme, effect_size, Some(errors))?;
        editor.apply(Edit::SaveEffectSize(edited))?;
    }
}
