use anyhow::Context;
use clap::{Parser, ValueEnum};
use extraction::{
    Backend, Review, ReviewErrors,
    domain::{
        effect_size::{self, CollisionSource},
        labels,
        review::{Field, Record},
        validation::{ErrorKind, FieldErrors, validate_record},
        validate_review,
    },
};
use tracing::instrument;

use super::terminal::{self, Colorize};

/// Command arguments for `extract show`.
#[derive(Debug, Parser)]
#[command(about = "Show a stored review")]
pub struct Show {
    /// Id of the review.
    id: String,

    /// Output format (default: text).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

/// Supported output formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Show {
    #[instrument(skip(settings))]
    pub async fn run(self, settings: &super::Settings) -> anyhow::Result<()> {
        let review = settings
            .backend()?
            .fetch_review(&self.id)
            .await
            .with_context(|| format!("failed to fetch review {}", self.id))?;

        match self.output {
            OutputFormat::Text => {
                let validation = validate_review(&review);
                render_review(&review, validation.errors());
            }
            OutputFormat::Json => {
                serde_json::to_writer_pretty(std::io::stdout(), &review)
                    .context("failed to render json output")?;
                println!();
            }
        }
        Ok(())
    }
}

/// Prints every field of a review, marking the invalid ones.
pub fn render_review(review: &Review, errors: Option<&ReviewErrors>) {
    terminal::heading(&format!("{} ({})", labels::HEADING_REVIEW_DETAILS, review.id));
    let fields = errors.map(|errors| &errors.fields);
    render_record(review, fields);
    println!(
        "  {}: {}",
        labels::LABEL_REVIEW_ARE_YOU_SURE,
        if review.are_you_sure { "yes" } else { "no" }
    );
    if !review.amstar_2.is_empty() {
        println!("  {}: {}", labels::LABEL_REVIEW_AMSTAR_2, review.amstar_2.join(", "));
    }

    render_collection(
        labels::HEADING_EXPOSURES,
        labels::HEADING_EXPOSURE,
        &review.exposures,
        |index| errors.and_then(|errors| errors.exposure(index)),
    );
    render_collection(
        labels::HEADING_OUTCOMES,
        labels::HEADING_OUTCOME,
        &review.outcomes,
        |index| errors.and_then(|errors| errors.outcome(index)),
    );
    render_collection(
        labels::HEADING_MODERATORS,
        labels::HEADING_MODERATOR,
        &review.moderators,
        |index| errors.and_then(|errors| errors.moderator(index)),
    );
    render_effect_sizes(review);
}

fn render_collection<'a, R: Record>(
    heading: &str,
    item: &str,
    records: &[R],
    errors: impl Fn(usize) -> Option<&'a FieldErrors<R::Field>>,
) where
    R::Field: 'a,
{
    terminal::heading(heading);
    if records.is_empty() {
        println!("  {}", "none".dim());
    }
    for (index, record) in records.iter().enumerate() {
        println!("  {}", format!("{item} {}", index + 1).info());
        render_record(record, errors(index));
    }
}

fn render_effect_sizes(review: &Review) {
    terminal::heading(labels::SUBHEADING_QUANTITATIVE_STRENGTH);
    let reconciliation = effect_size::reconcile(review);
    if reconciliation.entries().is_empty() {
        println!("  {}", "none".dim());
    }
    for entry in reconciliation.entries() {
        let marker = if entry.is_placeholder() {
            " (not entered)".dim()
        } else {
            String::new()
        };
        println!("  {}{marker}", entry.label.info());
        if !entry.is_placeholder() {
            let effect_size = entry.to_effect_size();
            render_record(&effect_size, validate_record(&effect_size).as_ref());
        }
    }
    for collision in reconciliation.collisions() {
        let reason = match collision.source {
            CollisionSource::Stored => "stored more than once",
            CollisionSource::Siblings => "produced by records sharing an id",
        };
        println!(
            "  {}",
            format!(
                "warning: effect size {} is {reason} ({} times)",
                collision.key, collision.occurrences
            )
            .warning()
        );
    }
}

/// Prints the fields of one record, one per line.
pub fn render_record<R: Record>(record: &R, errors: Option<&FieldErrors<R::Field>>) {
    for &field in R::Field::ALL {
        let value = record.value(field);
        let error = errors.and_then(|errors| errors.get(&field)).copied();
        println!("    {}: {}{}", field.label().dim(), value, marker(error));
    }
}

fn marker(error: Option<ErrorKind>) -> String {
    error.map_or_else(String::new, |kind| {
        format!("  {}", format!("✖ {}", kind.message()).error())
    })
}
