#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

mod command;
mod loader;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use command::{
    CommandStrategy, DeadlinesInput, DeadlinesStrategy, DuplicatesInput, DuplicatesStrategy,
    FilterInput, FilterStrategy, InitStrategy, MatchInput, MatchStrategy, ReportInput,
    ReportStrategy,
};

#[derive(Parser)]
#[command(name = "casereg")]
#[command(about = "Case registry filtering, deadlines and cross-referencing", long_about = None)]
#[command(version)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration
    Init,
    /// Filter the registry and print the matching records
    Filter {
        /// Registry snapshot (JSON array of objects); defaults to the last one opened
        file: Option<PathBuf>,

        /// Condition as `field:operator[:operand]`, repeatable
        #[arg(short = 'w', long = "where")]
        conditions: Vec<String>,

        /// Keep only records whose facet column equals this value
        #[arg(short, long)]
        facet: Option<String>,

        /// Case-insensitive text searched in every column
        #[arg(short, long)]
        search: Option<String>,

        /// Hide deleted records
        #[arg(long)]
        hide_deleted: bool,

        /// Write the filtered records to this JSON file
        #[arg(short, long)]
        export: Option<PathBuf>,
    },
    /// List measure terms and case openings that need attention
    Deadlines {
        file: Option<PathBuf>,

        /// Evaluate as of this day (dd.mm.yyyy) instead of today
        #[arg(short, long)]
        today: Option<String>,
    },
    /// List records sharing a person name
    Duplicates { file: Option<PathBuf> },
    /// Cross-reference the registry against an external document
    Match {
        file: Option<PathBuf>,

        /// Plain-text document to search
        #[arg(short, long)]
        text: PathBuf,

        /// Tab-separated table extracted from the same document
        #[arg(long)]
        table: Option<PathBuf>,

        /// Require the date of birth within this many bytes of a name hit
        #[arg(long)]
        dob_window: Option<usize>,
    },
    /// Every highlight of the registry in one table
    Report {
        file: Option<PathBuf>,

        #[arg(short, long)]
        today: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Init => InitStrategy.execute(()),
        Commands::Filter {
            file,
            conditions,
            facet,
            search,
            hide_deleted,
            export,
        } => FilterStrategy.execute(FilterInput {
            file,
            conditions,
            facet,
            search,
            hide_deleted,
            export,
        }),
        Commands::Deadlines { file, today } => {
            DeadlinesStrategy.execute(DeadlinesInput { file, today })
        }
        Commands::Duplicates { file } => DuplicatesStrategy.execute(DuplicatesInput { file }),
        Commands::Match {
            file,
            text,
            table,
            dob_window,
        } => MatchStrategy.execute(MatchInput {
            file,
            text,
            table,
            dob_window,
        }),
        Commands::Report { file, today } => ReportStrategy.execute(ReportInput { file, today }),
    }
}
