use anyhow::Context;
use clap::{Parser, ValueEnum};
use extraction::{ListController, ReviewSummary, domain::labels};
use tracing::instrument;

use super::{Settings, terminal};

/// Command arguments for `extract list`.
#[derive(Debug, Parser)]
#[command(about = "List stored reviews")]
pub struct List {
    /// Output format (default: table).
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

/// Supported output formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl List {
    #[instrument(skip(settings))]
    pub async fn run(self, settings: &Settings) -> anyhow::Result<()> {
        let backend = settings.backend()?;
        let mut list = ListController::new();
        list.load(&backend).await;

        if let Some(message) = list.message() {
            terminal::banner(message);
            anyhow::bail!("could not reach {}", backend.base_url());
        }

        match self.output {
            OutputFormat::Table => render_table(list.reviews(), false),
            OutputFormat::Json => {
                serde_json::to_writer_pretty(std::io::stdout(), list.reviews())
                    .context("failed to render json output")?;
                println!();
            }
        }
        Ok(())
    }
}

/// Column of the review table.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Column {
    Extractor,
    Date,
    Author,
    Year,
}

impl Column {
    const fn header(self) -> &'static str {
        match self {
            Self::Extractor => labels::TABLE_HEADING_EXTRACTOR_NAME,
            Self::Date => labels::TABLE_HEADING_EXTRACTION_DATE,
            Self::Author => labels::TABLE_HEADING_FIRST_AUTHOR,
            Self::Year => labels::TABLE_HEADING_YEAR_OF_PUBLICATION,
        }
    }

    fn value(self, review: &ReviewSummary) -> &str {
        match self {
            Self::Extractor => &review.extractor_name,
            Self::Date => &review.extraction_date,
            Self::Author => &review.first_author,
            Self::Year => &review.year_of_publication,
        }
    }
}

/// Prints the summaries as an aligned table.
///
/// Narrow terminals only get the author and year columns. With `numbered`,
/// each row starts with its 1-based position.
pub fn render_table(reviews: &[ReviewSummary], numbered: bool) {
    use terminal::Colorize;

    if reviews.is_empty() {
        println!("{}", "No reviews yet.".dim());
        return;
    }

    let columns: &[Column] = if terminal::is_narrow() {
        &[Column::Author, Column::Year]
    } else {
        &[Column::Extractor, Column::Date, Column::Author, Column::Year]
    };

    let mut headers: Vec<String> = Vec::new();
    if numbered {
        headers.push("#".to_string());
    }
    headers.extend(columns.iter().map(|column| column.header().to_string()));

    let data: Vec<Vec<String>> = reviews
        .iter()
        .enumerate()
        .map(|(index, review)| {
            let mut row = Vec::with_capacity(headers.len());
            if numbered {
                row.push((index + 1).to_string());
            }
            row.extend(columns.iter().map(|column| column.value(review).to_string()));
            row
        })
        .collect();

    // Determine column widths for alignment.
    let widths = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            data.iter()
                .map(|row| row[idx].chars().count())
                .max()
                .unwrap_or(0)
                .max(header.len())
        })
        .collect::<Vec<_>>();

    for (header, width) in headers.iter().zip(&widths) {
        print!("{header:<width$}  ");
    }
    println!();
    for width in &widths {
        print!("{:-<width$}  ", "");
    }
    println!();

    for row in data {
        for (value, width) in row.iter().zip(&widths) {
            print!("{value:<width$}  ");
        }
        println!();
    }
}
