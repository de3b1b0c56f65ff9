//! Batch orchestration
//!
//! Partitions the input dataset into consecutive fixed-size batches and,
//! for each batch:
//! - clears the shared unmatched-name set
//! - computes the distinct filing paths referenced by the batch's rows
//! - fans one `RowProcessor::process` call per distinct filing out over a
//!   semaphore-bounded worker pool
//! - joins each filing's outcome back onto every row referencing it, in
//!   input row order
//! - writes the augmented batch and the sorted unmatched-name list
//!
//! Batches never run concurrently with each other; only filings within a
//! batch do. Rows sharing a filing receive identical derived values
//! regardless of task completion order.

use anyhow::{Context, Result};
use csv::StringRecord;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::processor::{FilingOutcome, RowProcessor};
use crate::validator::UnmatchedNames;

/// Columns appended to every output row.
pub const DERIVED_COLUMNS: [&str; 4] = [
    "lender_name_raw",
    "lender_name_validated",
    "manual_review",
    "manual_review_reason",
];

#[derive(Error, Debug)]
pub enum InputError {
    #[error("failed to read input file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse input file {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("input file has no 'filename' column")]
    MissingFilenameColumn,

    #[error("input file contains no rows")]
    Empty,
}

/// Parsed input dataset. All columns pass through untouched; only the
/// `filename` column drives processing.
#[derive(Debug)]
pub struct BatchInput {
    headers: StringRecord,
    rows: Vec<StringRecord>,
    filename_idx: usize,
}

impl BatchInput {
    /// Read the input dataset from a CSV file with headers.
    pub fn from_csv_path(path: &Path) -> Result<Self, InputError> {
        let content = std::fs::read_to_string(path).map_err(|source| InputError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_csv_str(&content).map_err(|e| match e {
            InputError::Csv { source, .. } => InputError::Csv {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse the input dataset from CSV content.
    pub fn from_csv_str(content: &str) -> Result<Self, InputError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader
            .headers()
            .map_err(|source| InputError::Csv {
                path: PathBuf::new(),
                source,
            })?
            .clone();

        let filename_idx = headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case("filename"))
            .ok_or(InputError::MissingFilenameColumn)?;

        let mut rows = Vec::new();
        for record in reader.records() {
            rows.push(record.map_err(|source| InputError::Csv {
                path: PathBuf::new(),
                source,
            })?);
        }

        if rows.is_empty() {
            return Err(InputError::Empty);
        }

        Ok(Self {
            headers,
            rows,
            filename_idx,
        })
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    pub fn rows(&self) -> &[StringRecord] {
        &self.rows
    }

    /// Filing path of a row, if present and non-empty.
    pub fn filename<'a>(&self, row: &'a StringRecord) -> Option<&'a str> {
        row.get(self.filename_idx)
            .map(str::trim)
            .filter(|f| !f.is_empty())
    }
}

/// Knobs for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Rows per batch
    pub chunk_size: usize,
    /// Concurrent filing workers within a batch
    pub parallel_jobs: usize,
    /// Directory for augmented batch files
    pub output_dir: PathBuf,
    /// Directory for unmatched-name lists
    pub unmatched_dir: PathBuf,
}

/// Files produced for one batch.
#[derive(Debug, Clone)]
pub struct BatchArtifacts {
    pub batch_num: usize,
    pub output_path: PathBuf,
    pub unmatched_path: PathBuf,
    pub row_count: usize,
}

pub struct BatchOrchestrator {
    processor: Arc<RowProcessor>,
    unmatched: UnmatchedNames,
    options: BatchOptions,
}

impl BatchOrchestrator {
    /// `unmatched` must be the same handle the processor's validator records
    /// into; the orchestrator clears and exports it at batch boundaries.
    pub fn new(
        processor: Arc<RowProcessor>,
        unmatched: UnmatchedNames,
        options: BatchOptions,
    ) -> Self {
        Self {
            processor,
            unmatched,
            options,
        }
    }

    /// Process the whole dataset, batch by batch.
    pub async fn run(&self, input: &BatchInput) -> Result<Vec<BatchArtifacts>> {
        std::fs::create_dir_all(&self.options.output_dir).with_context(|| {
            format!(
                "failed to create output directory {}",
                self.options.output_dir.display()
            )
        })?;
        std::fs::create_dir_all(&self.options.unmatched_dir).with_context(|| {
            format!(
                "failed to create unmatched directory {}",
                self.options.unmatched_dir.display()
            )
        })?;

        let num_batches = input.rows().len().div_ceil(self.options.chunk_size);
        let progress = ProgressBar::new(num_batches as u64);
        progress.set_style(
            ProgressStyle::with_template("{spinner} [{bar:40}] batch {pos}/{len} {msg}")
                .expect("valid progress template")
                .progress_chars("=> "),
        );

        let mut artifacts = Vec::with_capacity(num_batches);
        for (batch_idx, chunk) in input.rows().chunks(self.options.chunk_size).enumerate() {
            let batch_num = batch_idx + 1;
            progress.set_message(format!("{} rows", chunk.len()));

            self.unmatched.clear();
            let outcomes = self.process_distinct_filings(input, chunk).await;
            let artifact = self.write_batch(input, chunk, &outcomes, batch_num)?;

            info!(
                "Batch {}/{} done: {} rows, {} distinct filings, {} unmatched names",
                batch_num,
                num_batches,
                chunk.len(),
                outcomes.len(),
                self.unmatched.len()
            );
            artifacts.push(artifact);
            progress.inc(1);
        }
        progress.finish_with_message("done");

        Ok(artifacts)
    }

    /// Fan one processor call per distinct filing out over the worker pool
    /// and wait for all of them.
    async fn process_distinct_filings(
        &self,
        input: &BatchInput,
        chunk: &[StringRecord],
    ) -> HashMap<String, FilingOutcome> {
        let mut distinct: Vec<String> = Vec::new();
        for row in chunk {
            if let Some(filename) = input.filename(row) {
                if !distinct.iter().any(|f| f == filename) {
                    distinct.push(filename.to_string());
                }
            }
        }

        let semaphore = Arc::new(Semaphore::new(self.options.parallel_jobs));
        let mut tasks: JoinSet<(String, FilingOutcome)> = JoinSet::new();
        for filing in distinct {
            let semaphore = semaphore.clone();
            let processor = self.processor.clone();
            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("semaphore never closed");
                let outcome = processor.process(&filing).await;
                (filing, outcome)
            });
        }

        let mut outcomes = HashMap::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((filing, outcome)) => {
                    outcomes.insert(filing, outcome);
                }
                Err(e) => warn!("filing worker failed to join: {}", e),
            }
        }
        outcomes
    }

    /// Write the augmented batch CSV and the unmatched-name list.
    fn write_batch(
        &self,
        input: &BatchInput,
        chunk: &[StringRecord],
        outcomes: &HashMap<String, FilingOutcome>,
        batch_num: usize,
    ) -> Result<BatchArtifacts> {
        let output_path = self
            .options
            .output_dir
            .join(format!("extracted_lenders_{}.csv", batch_num));
        let mut writer = csv::Writer::from_path(&output_path)
            .with_context(|| format!("failed to create {}", output_path.display()))?;

        let mut header: Vec<&str> = input.headers().iter().collect();
        header.extend(DERIVED_COLUMNS);
        writer.write_record(&header)?;

        for row in chunk {
            let outcome = input.filename(row).and_then(|f| outcomes.get(f));
            let derived = derived_fields(outcome);
            let mut record: Vec<&str> = row.iter().collect();
            record.extend(derived.iter().map(String::as_str));
            writer.write_record(&record)?;
        }
        writer.flush()?;

        let unmatched_path = self
            .options
            .unmatched_dir
            .join(format!("unmatched_lender_names_{}.csv", batch_num));
        let mut writer = csv::Writer::from_path(&unmatched_path)
            .with_context(|| format!("failed to create {}", unmatched_path.display()))?;
        writer.write_record(["unmatched_lender_name"])?;
        for name in self.unmatched.export() {
            writer.write_record([name.as_str()])?;
        }
        writer.flush()?;

        Ok(BatchArtifacts {
            batch_num,
            output_path,
            unmatched_path,
            row_count: chunk.len(),
        })
    }
}

/// Derived column values for one row. Rows without a processed filing pass
/// through with empty values and no review flag.
fn derived_fields(outcome: Option<&FilingOutcome>) -> [String; 4] {
    match outcome {
        Some(outcome) => {
            let raw = outcome
                .raw
                .iter()
                .map(|c| c.name.clone())
                .collect::<Vec<_>>()
                .join("; ");
            let validated = outcome.validated.join("; ");
            let manual_review = outcome.validated.is_empty();
            let reason = if manual_review {
                outcome.review_reason.clone()
            } else {
                String::new()
            };
            [raw, validated, manual_review.to_string(), reason]
        }
        None => [
            String::new(),
            String::new(),
            false.to_string(),
            String::new(),
        ],
    }
}
