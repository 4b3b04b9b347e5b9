//! Reader for per-read coordinate tables (BED3+), reduced to summits.
//!
//! Each record `key\tstart\tend[\t...]` contributes one summit, the midpoint of
//! `[start, end)`. What `key` names depends on how reads were mapped:
//!
//! - restricted index: the blocklist region the read mapped to
//! - whole-genome index: the chromosome, `chr`-prefixed if the index is not

use std::collections::HashSet;
use std::io::BufRead;
use std::path::Path;

use tracing::debug;

use crate::core::summits::{summit, KeyDomain, SummitIndex};
use crate::parsing::{is_skippable, open_text, parse_u64_field, ParseError};

/// Summits read from a coordinate table
#[derive(Debug, Clone)]
pub struct SummitReport {
    pub index: SummitIndex,

    /// Records read
    pub records: usize,

    /// Records whose key is outside the key domain
    pub skipped: usize,
}

/// Normalize a coordinate-table key for its domain
#[must_use]
pub fn normalize_key(raw: &str, domain: KeyDomain) -> String {
    match domain {
        KeyDomain::Region => raw.to_string(),
        KeyDomain::Chromosome if raw.starts_with("chr") => raw.to_string(),
        KeyDomain::Chromosome => format!("chr{raw}"),
    }
}

/// Read summits from a coordinate table file (plain or gzipped)
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or the errors of
/// [`read_summits`].
pub fn read_summits_file(
    path: &Path,
    domain: KeyDomain,
    keys: &HashSet<String>,
) -> Result<SummitReport, ParseError> {
    let report = read_summits(open_text(path)?, domain, keys)?;
    debug!(
        path = %path.display(),
        records = report.records,
        skipped = report.skipped,
        keys = report.index.key_count(),
        "Read summits"
    );
    Ok(report)
}

/// Read summits from coordinate-table lines.
///
/// Records whose normalized key is not in `keys` are skipped and counted.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` for lines with fewer than 3 fields or
/// non-integer coordinates.
pub fn read_summits<R: BufRead>(
    reader: R,
    domain: KeyDomain,
    keys: &HashSet<String>,
) -> Result<SummitReport, ParseError> {
    let mut index = SummitIndex::new(domain);
    let mut records = 0;
    let mut skipped = 0;

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end();
        if is_skippable(line) {
            continue;
        }

        let line_num = i + 1;
        let mut fields = line.split('\t');
        let (Some(raw_key), Some(start), Some(end)) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(ParseError::InvalidFormat(format!(
                "Line {line_num} has fewer than 3 fields"
            )));
        };

        let start = parse_u64_field(start, "start", line_num)?;
        let end = parse_u64_field(end, "end", line_num)?;
        records += 1;

        let key = normalize_key(raw_key, domain);
        if keys.contains(&key) {
            index.push(&key, summit(start, end));
        } else {
            skipped += 1;
        }
    }

    Ok(SummitReport {
        index,
        records,
        skipped,
    })
}
