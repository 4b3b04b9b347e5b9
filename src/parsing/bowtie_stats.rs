//! Parser for the alignment summary `bowtie2` writes to stderr.
//!
//! Only the single-end layout is understood:
//!
//! ```text
//! 10000 reads; of these:
//!   10000 (100.00%) were unpaired; of these:
//!     596 (5.96%) aligned 0 times
//!     7284 (72.84%) aligned exactly 1 time
//!     2120 (21.20%) aligned >1 times
//! 94.04% overall alignment rate
//! ```

use std::path::Path;

use serde::Serialize;

use crate::parsing::ParseError;

/// Read counts from a Bowtie2 summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MappingStats {
    pub total: u64,
    pub unpaired: u64,
    pub aligned_zero: u64,
    pub aligned_once: u64,
    pub aligned_multi: u64,
}

impl MappingStats {
    /// Reads aligned at least once
    pub fn aligned(&self) -> u64 {
        self.aligned_once + self.aligned_multi
    }

    /// Percentage of `count` relative to all reads
    #[allow(clippy::cast_precision_loss)]
    pub fn percent(&self, count: u64) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            count as f64 / self.total as f64 * 100.0
        }
    }

    /// Overall alignment rate in percent
    pub fn overall_rate(&self) -> f64 {
        self.percent(self.aligned())
    }
}

/// Parse a Bowtie2 summary file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or the errors of
/// [`parse_bowtie_stats_text`].
pub fn parse_bowtie_stats_file(path: &Path) -> Result<MappingStats, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_bowtie_stats_text(&content)
}

/// Parse Bowtie2 summary text
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if the text is not a single-end summary.
pub fn parse_bowtie_stats_text(text: &str) -> Result<MappingStats, ParseError> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    if lines.len() != 6 || !lines[5].ends_with("overall alignment rate") {
        return Err(ParseError::InvalidFormat(format!(
            "Expected a 6-line single-end Bowtie2 summary, found {} lines",
            lines.len()
        )));
    }

    let leading = |i: usize| -> Result<u64, ParseError> {
        lines[i]
            .split_whitespace()
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| {
                ParseError::InvalidFormat(format!(
                    "Expected a read count at the start of line {}: '{}'",
                    i + 1,
                    lines[i]
                ))
            })
    };

    Ok(MappingStats {
        total: leading(0)?,
        unpaired: leading(1)?,
        aligned_zero: leading(2)?,
        aligned_once: leading(3)?,
        aligned_multi: leading(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "10000 reads; of these:
  10000 (100.00%) were unpaired; of these:
    596 (5.96%) aligned 0 times
    7284 (72.84%) aligned exactly 1 time
    2120 (21.20%) aligned >1 times
94.04% overall alignment rate
";

    #[test]
    fn test_parse_single_end_report() {
        let stats = parse_bowtie_stats_text(REPORT).unwrap();
        assert_eq!(stats.total, 10_000);
        assert_eq!(stats.aligned_zero, 596);
        assert_eq!(stats.aligned(), 9404);
        assert!((stats.overall_rate() - 94.04).abs() < 1e-9);
    }

    #[test]
    fn test_paired_report_is_rejected() {
        let paired = "1000 reads; of these:\n  1000 (100.00%) were paired; of these:\n    10 (1.00%) aligned concordantly 0 times\n";
        assert!(parse_bowtie_stats_text(paired).is_err());
    }

    #[test]
    fn test_zero_reads() {
        let stats = MappingStats {
            total: 0,
            unpaired: 0,
            aligned_zero: 0,
            aligned_once: 0,
            aligned_multi: 0,
        };
        assert!(stats.overall_rate().abs() < f64::EPSILON);
    }
}
