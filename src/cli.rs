use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "lenderfinder")]
#[command(about = "Extracts and validates lender organization names from SEC EDGAR filings")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Create default configuration file at ./config/lenderfinder.toml
    #[arg(long, global = true)]
    pub init: bool,

    /// Input CSV with a 'filename' column of filing paths (shorthand for
    /// the 'extract' subcommand)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Rows per batch (overrides config)
    #[arg(long, value_name = "ROWS")]
    pub chunk_size: Option<usize>,

    /// Concurrent filing downloads within a batch (overrides config)
    #[arg(short = 'j', long, value_name = "JOBS")]
    pub parallel_jobs: Option<usize>,

    /// Directory for augmented batch output files (overrides config)
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Directory for unmatched-name lists (overrides config)
    #[arg(long)]
    pub unmatched_dir: Option<PathBuf>,

    /// Verbose logging (use -v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract and validate lender names for every filing in the input
    Extract {
        /// Input CSV with a 'filename' column of filing paths
        input: PathBuf,
    },
    /// Remove duplicate names within validated cells of produced batch files
    Dedupe {
        /// Directory of extracted_lenders_*.csv files (defaults to the
        /// configured output directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}
