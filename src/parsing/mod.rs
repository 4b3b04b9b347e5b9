//! Parsers for the flat files the pipeline reads.
//!
//! This module provides parsers for:
//!
//! - **Blocklist BED files**: four-column region lists (`chrom  start  end  ID`)
//! - **Chromosome size tables**: `chrom  size`, defining relevant chromosomes and their order
//! - **Read coordinate tables**: BED3+ records of mapped reads, reduced to summits
//! - **BAM files**: converted to read coordinate tables using noodles
//! - **Bowtie2 statistics reports**: alignment summary printed by `bowtie2` on stderr
//! - **Feature tables**: per-sample CSVs written by `derive`, read back by `score`
//!
//! ## Example
//!
//! ```rust,no_run
//! use seqbl_qscorer::parsing::blocklist::parse_blocklist_file;
//! use seqbl_qscorer::parsing::chrom_sizes::parse_chrom_sizes_file;
//! use std::path::Path;
//!
//! let chroms = parse_chrom_sizes_file(Path::new("resources/chromosome_sizes/hg38.tsv")).unwrap();
//! let blocklist = parse_blocklist_file(Path::new("resources/blocklists/hg38.bed"))
//!     .unwrap()
//!     .restrict_to(&chroms.names());
//! ```

pub mod bam;
pub mod blocklist;
pub mod bowtie_stats;
pub mod chrom_sizes;
pub mod coords;
pub mod features;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use thiserror::Error;

use crate::utils::validation::{is_gzipped, MAX_REGIONS};

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Unknown blocklist region type '{token}' in region '{id}' (expected LM or HSR)")]
    UnknownRegionType { token: String, id: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("noodles error: {0}")]
    Noodles(String),

    #[error("Too many regions: {0} exceeds maximum allowed ({MAX_REGIONS})")]
    TooManyRegions(usize),
}

/// Open a text file for line reading, decompressing `.gz`/`.bgz` transparently
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be opened.
pub fn open_text(path: &Path) -> Result<Box<dyn BufRead>, ParseError> {
    let file = File::open(path)?;
    if is_gzipped(path) {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// True for lines that carry no record: blank, `#` comments, and BED `track`/`browser` headers
pub(crate) fn is_skippable(line: &str) -> bool {
    line.is_empty()
        || line.starts_with('#')
        || line.starts_with("track")
        || line.starts_with("browser")
}

/// Parse an unsigned integer field, reporting the 1-based line on failure
pub(crate) fn parse_u64_field(value: &str, what: &str, line_num: usize) -> Result<u64, ParseError> {
    value.trim().parse().map_err(|_| {
        ParseError::InvalidFormat(format!("Invalid {what} on line {line_num}: '{value}'"))
    })
}
