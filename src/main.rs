//! Thyrorisk: command-line intake scoring and report viewer.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use thyrorisk::adapters::memory::InMemoryRepository;
use thyrorisk::adapters::sanitize::SanitizingMakeWriter;
use thyrorisk::adapters::sqlite::SqliteRepository;
use thyrorisk::adapters::StorageError;
use thyrorisk::application::{intake, report, AssessmentService};
use thyrorisk::config::{Config, LogMode, StorageLocation};
use thyrorisk::ports::AssessmentRepository;

#[derive(Parser, Debug)]
#[command(name = "thyrorisk", version, about = "Score thyroid risk from intake records and manage stored assessments.")]
struct Cli {
    /// Database path (overrides THYRORISK_DB_PATH; `:memory:` for no persistence).
    #[arg(long, global = true)]
    db: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score an intake record and store the assessment.
    Evaluate {
        /// Intake record JSON file.
        input: PathBuf,
        /// Print the result without storing it.
        #[arg(long)]
        no_save: bool,
        #[arg(long)]
        json: bool,
    },
    /// Check lab values against reference ranges only.
    Labs {
        /// Lab results JSON file (bare object or full record).
        input: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// List stored assessments, newest first.
    List {
        #[arg(long, default_value_t = 0)]
        offset: usize,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Show one stored assessment.
    Show {
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Delete one stored assessment.
    Delete { id: String },
    /// Delete every stored assessment.
    Clear,
}

fn init_logging(config: &Config) -> Result<WorkerGuard> {
    let (writer, guard) = match config.log_mode {
        LogMode::File => {
            if let Some(parent) = config.log_file.parent() {
                // Best-effort: a missing directory surfaces on open below.
                let _ = std::fs::create_dir_all(parent);
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&config.log_file)
                .with_context(|| format!("Cannot open log file {:?}", config.log_file))?;
            tracing_appender::non_blocking(file)
        }
        LogMode::Stdout => tracing_appender::non_blocking(std::io::stdout()),
        LogMode::Stderr => tracing_appender::non_blocking(std::io::stderr()),
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(SanitizingMakeWriter::new(writer, config.sanitize_max_bytes)),
        )
        .init();

    Ok(guard)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run<R>(service: &AssessmentService<R>, command: Command) -> Result<()>
where
    R: AssessmentRepository,
    R::Error: Into<StorageError>,
{
    match command {
        Command::Evaluate {
            input,
            no_save,
            json,
        } => {
            let record = intake::read_record(&input)
                .with_context(|| format!("Cannot read intake record {input:?}"))?;
            if no_save {
                let prediction = service.preview(&record)?;
                if json {
                    print_json(&prediction)?;
                } else {
                    print!("{}", report::render_prediction(&prediction, &record.lab_results));
                }
            } else {
                let assessment = service.submit(record)?;
                if json {
                    print_json(&assessment)?;
                } else {
                    print!("{}", report::render_report(&assessment));
                }
            }
        }
        Command::Labs { input, json } => {
            let labs = intake::read_lab_results(&input)
                .with_context(|| format!("Cannot read lab results {input:?}"))?;
            let analysis = service.analyze_labs(&labs);
            if json {
                print_json(&analysis)?;
            } else {
                print!("{}", report::render_lab_analysis(&analysis, &labs));
            }
        }
        Command::List { offset, limit } => {
            let page = service.list_page(offset, limit)?;
            if page.items.is_empty() {
                println!("No stored assessments");
            }
            for assessment in &page.items {
                println!("{}", report::summary_line(assessment));
            }
            if !page.items.is_empty() {
                println!(
                    "Showing {}-{} of {}",
                    page.offset + 1,
                    page.offset + page.items.len(),
                    page.total_count
                );
            }
            if let Some(next) = page.next_offset() {
                println!("Next page: --offset {next} --limit {limit}");
            }
        }
        Command::Show { id, json } => {
            let assessment = service.get(&id)?;
            if json {
                print_json(&assessment)?;
            } else {
                print!("{}", report::render_report(&assessment));
            }
        }
        Command::Delete { id } => {
            service.delete(&id)?;
            println!("Deleted {id}");
        }
        Command::Clear => {
            let removed = service.clear_all()?;
            println!("Cleared {removed} assessment(s)");
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(db) = &cli.db {
        config = config.with_storage(StorageLocation::parse(db));
    }

    let _guard = init_logging(&config)?;
    tracing::debug!("Configuration: {:?}", config);

    match &config.storage {
        StorageLocation::Memory => {
            let service = AssessmentService::new(Arc::new(InMemoryRepository::new()));
            run(&service, cli.command)
        }
        StorageLocation::File(path) => {
            let repository = SqliteRepository::new(path)
                .with_context(|| format!("Cannot open database {path:?}"))?;
            let service = AssessmentService::new(Arc::new(repository));
            run(&service, cli.command)
        }
    }
}
