use std::{fs, path::Path};

use anyhow::Context;
use log::debug;

/// Read a line-delimited file of records, blank lines being skipped.
pub fn load(path: &Path) -> anyhow::Result<Vec<String>> {
    let content = fs::read_to_string(path).with_context(|| format!("Failed to read records from {}", path.display()))?;

    let records = parse(&content);
    if records.is_empty() {
        return Err(txtree::Error::EmptyInput).with_context(|| format!("No record found in {}", path.display()));
    }

    debug!("Loaded {} records from {}", records.len(), path.display());

    Ok(records)
}

pub fn parse(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
