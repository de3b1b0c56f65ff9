//! Post-processing dedup for validated lender cells
//!
//! The extraction pipeline keeps duplicate canonical names on purpose (one
//! per occurrence). This pass rewrites previously produced batch files,
//! collapsing repeated entries within each `lender_name_validated` cell
//! while preserving first-seen order. Other columns are untouched.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

const VALIDATED_COLUMN: &str = "lender_name_validated";

/// Remove duplicate semicolon-separated entries from a cell, keeping
/// first-seen order.
pub fn dedupe_cell(cell: &str) -> String {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for item in cell.split(';') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        if seen.insert(item.to_string()) {
            unique.push(item);
        }
    }
    unique.join("; ")
}

/// Rewrite one batch output file with its validated column deduplicated.
pub fn dedupe_validated_file(path: &Path) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let mut reader = csv::Reader::from_reader(content.as_bytes());
    let headers = reader.headers()?.clone();
    let column = headers
        .iter()
        .position(|h| h == VALIDATED_COLUMN)
        .with_context(|| format!("{} has no {} column", path.display(), VALIDATED_COLUMN))?;

    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("failed to rewrite {}", path.display()))?;
    writer.write_record(&headers)?;
    for record in reader.records() {
        let record = record?;
        let mut fields: Vec<String> = record.iter().map(str::to_string).collect();
        if let Some(cell) = fields.get_mut(column) {
            *cell = dedupe_cell(cell);
        }
        writer.write_record(&fields)?;
    }
    writer.flush()?;
    Ok(())
}

/// Sweep a directory of `extracted_lenders_*.csv` files, deduplicating each
/// in place. Returns the number of files processed.
pub fn dedupe_output_dir(dir: &Path) -> Result<usize> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with("extracted_lenders_") && n.ends_with(".csv"))
        })
        .collect();
    paths.sort();

    for path in &paths {
        dedupe_validated_file(path)?;
        info!("Deduplicated: {}", path.display());
    }
    Ok(paths.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_dedupe_cell_keeps_first_seen_order() {
        assert_eq!(
            dedupe_cell("Wells Fargo; Comerica; Wells Fargo; Wells Fargo"),
            "Wells Fargo; Comerica"
        );
    }

    #[test]
    fn test_dedupe_cell_trims_and_drops_empty_items() {
        assert_eq!(dedupe_cell("  Wells Fargo ;; Wells Fargo ; "), "Wells Fargo");
        assert_eq!(dedupe_cell(""), "");
        assert_eq!(dedupe_cell(" ; ; "), "");
    }

    #[test]
    fn test_dedupe_cell_is_case_sensitive() {
        // Canonical names are registry-controlled, so case variants are
        // distinct entries by construction
        assert_eq!(
            dedupe_cell("Wells Fargo; wells fargo"),
            "Wells Fargo; wells fargo"
        );
    }

    #[test]
    fn test_dedupe_file_rewrites_only_validated_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extracted_lenders_1.csv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "filename,lender_name_raw,lender_name_validated").unwrap();
        writeln!(file, "a.htm,Wells Fargo Bank; Wells Fargo Bank,Wells Fargo; Wells Fargo").unwrap();
        drop(file);

        dedupe_validated_file(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "filename,lender_name_raw,lender_name_validated"
        );
        let row = lines.next().unwrap();
        assert!(row.contains("Wells Fargo Bank; Wells Fargo Bank"));
        assert!(row.ends_with("Wells Fargo"));
        assert!(!row.ends_with("Wells Fargo; Wells Fargo"));
    }

    #[test]
    fn test_dedupe_dir_only_touches_batch_outputs() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["extracted_lenders_1.csv", "extracted_lenders_2.csv", "notes.csv"] {
            let mut file = std::fs::File::create(dir.path().join(name)).unwrap();
            writeln!(file, "lender_name_validated").unwrap();
            writeln!(file, "A; A").unwrap();
        }

        let processed = dedupe_output_dir(dir.path()).unwrap();
        assert_eq!(processed, 2);

        let untouched = std::fs::read_to_string(dir.path().join("notes.csv")).unwrap();
        assert!(untouched.contains("A; A"));
    }
}
