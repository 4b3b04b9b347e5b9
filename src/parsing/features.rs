//! Reader for per-sample feature tables written by `derive`.
//!
//! Only the `blID` and `count` columns are used; other columns may be absent.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::parsing::ParseError;

/// Region identifier to read count
pub type FeatureCounts = HashMap<String, f64>;

/// Read `blID -> count` from a feature table file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or the errors of
/// [`read_feature_counts`].
pub fn read_feature_counts_file(path: &Path) -> Result<FeatureCounts, ParseError> {
    let file = std::fs::File::open(path)?;
    read_feature_counts(file)
}

/// Read `blID -> count` from CSV
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if the `blID` or `count` column is
/// missing or a count is not numeric, or `ParseError::Csv` on malformed CSV.
pub fn read_feature_counts<R: Read>(reader: R) -> Result<FeatureCounts, ParseError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| ParseError::InvalidFormat(format!("Missing '{name}' column")))
    };
    let id_col = column("blID")?;
    let count_col = column("count")?;

    let mut counts = FeatureCounts::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let (Some(id), Some(count)) = (record.get(id_col), record.get(count_col)) else {
            return Err(ParseError::InvalidFormat(format!(
                "Row {} is missing blID or count",
                i + 2
            )));
        };
        let count: f64 = count.trim().parse().map_err(|_| {
            ParseError::InvalidFormat(format!("Invalid count on row {}: '{count}'", i + 2))
        })?;
        counts.insert(id.trim().to_string(), count);
    }

    Ok(counts)
}
