use std::path::{Path, PathBuf};

mod browse;
mod form;
mod list;
mod show;
mod terminal;
mod validate;

use anyhow::Context;
use browse::{Browse, Start};
use clap::ArgAction;
use extraction::{
    Backend, HttpBackend, Review,
    backend::ReportKind,
    domain::{Validation, validate_review},
};
use list::List;
use show::Show;
use tracing::instrument;
use validate::Validate;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The path to the configuration file
    #[arg(short, long, default_value = "extraction.toml", global = true)]
    config: PathBuf,

    /// Override the backend URL from the configuration file
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let mut config = extraction::Config::load_or_default(&self.config)
            .with_context(|| format!("failed to load {}", self.config.display()))?;
        if let Some(url) = &self.base_url {
            config.set_base_url(url)?;
        }
        let settings = Settings {
            config,
            path: self.config,
        };

        self.command
            .unwrap_or_else(|| Command::Browse(Browse::default()))
            .run(&settings)
            .await
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false)
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

/// The loaded configuration and where it came from.
#[derive(Debug)]
pub struct Settings {
    config: extraction::Config,
    path: PathBuf,
}

impl Settings {
    fn backend(&self) -> anyhow::Result<HttpBackend> {
        HttpBackend::new(&self.config).context("failed to create HTTP client")
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Browse and edit reviews interactively (default)
    Browse(Browse),

    /// List stored reviews
    List(List),

    /// Show a stored review with its effect sizes and validation state
    Show(Show),

    /// Start a new review
    Add,

    /// Edit a stored review
    Edit {
        /// Id of the review
        id: String,
    },

    /// Validate a review stored as JSON
    ///
    /// Exits with status 2 when the review has invalid fields.
    Validate(Validate),

    /// Write "na" into every empty field of a review stored as JSON
    FillBlanks(FillBlanks),

    /// Validate a review stored as JSON and create it on the backend
    Import(Import),

    /// Download a report
    Report(Report),

    /// Show or modify configuration settings
    Config(Config),
}

impl Command {
    async fn run(self, settings: &Settings) -> anyhow::Result<()> {
        match self {
            Self::Browse(command) => command.run(settings, Start::List).await?,
            Self::List(command) => command.run(settings).await?,
            Self::Show(command) => command.run(settings).await?,
            Self::Add => Browse::default().run(settings, Start::Add).await?,
            Self::Edit { id } => Browse::default().run(settings, Start::Existing(id)).await?,
            Self::Validate(command) => command.run()?,
            Self::FillBlanks(command) => command.run()?,
            Self::Import(command) => command.run(settings).await?,
            Self::Report(command) => command.run(settings).await?,
            Self::Config(command) => command.run(settings)?,
        }
        Ok(())
    }
}

/// Reads a review from a JSON file.
fn read_review(path: &Path) -> anyhow::Result<Review> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("{} is not a review", path.display()))
}

#[derive(Debug, clap::Parser)]
pub struct FillBlanks {
    /// Path to the review JSON file
    file: PathBuf,

    /// Rewrite the file instead of printing the result
    #[arg(long, short)]
    in_place: bool,
}

impl FillBlanks {
    #[instrument]
    fn run(self) -> anyhow::Result<()> {
        use terminal::Colorize;

        let review = read_review(&self.file)?.fill_blanks();
        let json = serde_json::to_string_pretty(&review).context("failed to render review")?;

        if self.in_place {
            std::fs::write(&self.file, json + "\n")
                .with_context(|| format!("failed to write {}", self.file.display()))?;
            println!("{}", format!("Filled blanks in {}", self.file.display()).success());
        } else {
            println!("{json}");
        }
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Import {
    /// Path to the review JSON file
    file: PathBuf,
}

impl Import {
    #[instrument(skip(settings))]
    async fn run(self, settings: &Settings) -> anyhow::Result<()> {
        use terminal::Colorize;

        let review = read_review(&self.file)?;
        if let Validation::Invalid(errors) = validate_review(&review) {
            validate::print_errors(&errors);
            anyhow::bail!("{} has {} invalid field(s)", self.file.display(), errors.len());
        }

        settings
            .backend()?
            .create_review(&review)
            .await
            .with_context(|| format!("failed to create review {}", review.id))?;

        println!("{}", format!("Created review {}", review.id).success());
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Report {
    /// Which report to download (reviews, effect-sizes)
    kind: ReportKind,

    /// Directory to write the report into
    #[arg(long, short, default_value = ".")]
    out: PathBuf,
}

impl Report {
    #[instrument(skip(settings))]
    async fn run(self, settings: &Settings) -> anyhow::Result<()> {
        use terminal::Colorize;

        let backend = settings.backend()?;
        let spinner = terminal::spinner(&format!("Downloading {}", backend.report_url(self.kind)));
        let result = backend.download_report(self.kind, &self.out).await;
        spinner.finish_and_clear();

        let path = result.with_context(|| format!("failed to download the {} report", self.kind))?;
        println!("{}", format!("Saved {}", path.display()).success());
        Ok(())
    }
}

#[derive(Debug, clap::Parser)]
pub struct Config {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Debug, clap::Parser)]
enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key to set (base_url, timeout_secs, after_save)
        key: String,

        /// Value to set
        value: String,
    },
}

impl Config {
    #[instrument(skip(settings))]
    fn run(self, settings: &Settings) -> anyhow::Result<()> {
        use terminal::Colorize;

        match self.command {
            ConfigCommand::Show => {
                println!("Configuration ({}):", settings.path.display().to_string().dim());
                for key in extraction::Config::KEYS {
                    if let Some(value) = settings.config.get(key) {
                        println!("  {key}: {value}");
                    }
                }
            }
            ConfigCommand::Set { key, value } => {
                // the file is edited as stored, without command-line overrides
                let mut config = extraction::Config::load_or_default(&settings.path)?;
                config.set(&key, &value)?;
                config
                    .save(&settings.path)
                    .with_context(|| format!("failed to save {}", settings.path.display()))?;
                println!("{}", format!("{key} = {value}").success());
            }
        }
        Ok(())
    }
}
