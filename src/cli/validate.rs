use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use extraction::{
    ReviewErrors, Validation,
    domain::{effect_size::reconcile, labels, validate_review},
};
use tracing::instrument;

use super::terminal::Colorize;

#[derive(Debug, Parser)]
#[command(about = "Validate a review stored as JSON")]
pub struct Validate {
    /// Path to the review JSON file
    file: PathBuf,

    /// Output format
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    output: OutputFormat,

    /// Suppress all output except errors
    #[arg(long, short)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Table,
    Json,
}

impl Validate {
    #[instrument]
    pub fn run(self) -> anyhow::Result<()> {
        let review = super::read_review(&self.file)?;
        let validation = validate_review(&review);

        let collisions = reconcile(&review).collisions().len();
        if collisions > 0 && !self.quiet {
            println!(
                "{}",
                format!("{collisions} effect size key(s) are not unique").warning()
            );
        }

        match (&validation, self.output) {
            (Validation::Valid, OutputFormat::Table) => {
                if !self.quiet {
                    println!("{}", format!("{} is valid", self.file.display()).success());
                }
            }
            (Validation::Invalid(errors), OutputFormat::Table) => print_errors(errors),
            (Validation::Valid, OutputFormat::Json) => println!("[]"),
            (Validation::Invalid(errors), OutputFormat::Json) => {
                serde_json::to_writer_pretty(std::io::stdout(), &errors.entries())
                    .context("failed to render json output")?;
                println!();
            }
        }

        if !validation.is_valid() {
            // Exit with code 2 to indicate invalid fields (for scripts)
            std::process::exit(2);
        }
        Ok(())
    }
}

/// Prints one line per failing field, under the validation banner.
pub fn print_errors(errors: &ReviewErrors) {
    println!("{}", labels::MESSAGE_VALIDATION_ERROR.error());
    for entry in errors.entries() {
        println!(
            "  {} {} {}",
            entry.path.warning(),
            format!("({})", entry.label).dim(),
            entry.kind.message()
        );
    }
}
