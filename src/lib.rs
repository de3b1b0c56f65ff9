pub mod batch;
pub mod cli;
pub mod config;
pub mod dedupe;
pub mod extractor;
pub mod filing_cache;
pub mod ner;
pub mod normalizer;
pub mod processor;
pub mod registry;
pub mod snippet;
pub mod validator;

pub use batch::{BatchInput, BatchOptions, BatchOrchestrator};
pub use processor::{FilingOutcome, RowProcessor};
pub use registry::LenderRegistry;
pub use validator::{UnmatchedNames, Validator};
