//! Parser for blocklist region files.
//!
//! Format: `chrom\tstart\tend\tID`, one region per line, no header.
//! The region type is encoded in the identifier: `BLLM_12` is a low-mappability
//! region, `BLHSR_7` a high-signal region. `BL_LM_12` is accepted as well.

use std::io::BufRead;
use std::path::Path;

use tracing::debug;

use crate::core::region::{Blocklist, BlocklistRegion};
use crate::core::types::RegionType;
use crate::parsing::{is_skippable, open_text, parse_u64_field, ParseError};
use crate::utils::validation::exceeds_region_limit;

/// Parse a blocklist file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or the errors of
/// [`parse_blocklist_reader`].
pub fn parse_blocklist_file(path: &Path) -> Result<Blocklist, ParseError> {
    let blocklist = parse_blocklist_reader(open_text(path)?)?;
    debug!(
        path = %path.display(),
        regions = blocklist.len(),
        chromosomes = blocklist.groups().len(),
        "Loaded blocklist"
    );
    Ok(blocklist)
}

/// Parse blocklist text
///
/// # Errors
///
/// See [`parse_blocklist_reader`].
pub fn parse_blocklist_text(text: &str) -> Result<Blocklist, ParseError> {
    parse_blocklist_reader(text.as_bytes())
}

/// Parse blocklist lines from a reader.
///
/// Ordinals are 1-based and count data lines only.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` for lines with fewer than 4 fields, bad
/// coordinates or `start > end`, `ParseError::UnknownRegionType` for an
/// unrecognized type prefix, or `ParseError::TooManyRegions` if the limit is exceeded.
pub fn parse_blocklist_reader<R: BufRead>(reader: R) -> Result<Blocklist, ParseError> {
    let mut blocklist = Blocklist::new();
    let mut ordinal = 0;

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim_end();
        if is_skippable(line) {
            continue;
        }

        let line_num = i + 1;
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 4 {
            return Err(ParseError::InvalidFormat(format!(
                "Line {line_num} has fewer than 4 fields"
            )));
        }

        let start = parse_u64_field(fields[1], "start", line_num)?;
        let end = parse_u64_field(fields[2], "end", line_num)?;
        if start > end {
            return Err(ParseError::InvalidFormat(format!(
                "Start {start} is after end {end} on line {line_num}"
            )));
        }

        let id = fields[3].trim();
        let region_type = region_type_of(id)?;

        if exceeds_region_limit(ordinal) {
            return Err(ParseError::TooManyRegions(ordinal));
        }

        ordinal += 1;
        blocklist.push(BlocklistRegion::new(
            ordinal,
            fields[0].trim(),
            start,
            end,
            region_type,
            id,
        ));
    }

    if blocklist.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No regions found in blocklist".to_string(),
        ));
    }

    Ok(blocklist)
}

/// Region type encoded in an identifier such as `BLLM_12` or `BL_HSR_3`
///
/// # Errors
///
/// Returns `ParseError::UnknownRegionType` if the type token is not in the vocabulary.
pub fn region_type_of(id: &str) -> Result<RegionType, ParseError> {
    let mut tokens = id.split('_');
    let head = tokens.next().unwrap_or_default();
    // Two-letter family prefix, then the type
    let mut token = head.get(2..).unwrap_or_default();
    if token.is_empty() {
        token = tokens.next().unwrap_or_default();
    }

    RegionType::from_token(token).ok_or_else(|| ParseError::UnknownRegionType {
        token: token.to_string(),
        id: id.to_string(),
    })
}
