//! Parser for chromosome size tables (`chrom\tsize`).
//!
//! Sizes are not used for counting; the table defines which chromosomes are
//! relevant and in which order they are visited.

use std::io::BufRead;
use std::path::Path;

use crate::parsing::{is_skippable, open_text, parse_u64_field, ParseError};

/// Chromosomes excluded from feature derivation
pub const SEX_CHROMOSOMES: [&str; 2] = ["chrX", "chrY"];

/// Ordered chromosome table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChromSizes {
    entries: Vec<(String, u64)>,
}

impl ChromSizes {
    pub fn new(entries: Vec<(String, u64)>) -> Self {
        Self { entries }
    }

    /// Drop `chrX` and `chrY`
    #[must_use]
    pub fn without_sex_chromosomes(self) -> Self {
        Self {
            entries: self
                .entries
                .into_iter()
                .filter(|(name, _)| !SEX_CHROMOSOMES.contains(&name.as_str()))
                .collect(),
        }
    }

    /// Chromosome names in table order
    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse a chromosome size table from a file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or the errors of
/// [`parse_chrom_sizes_reader`].
pub fn parse_chrom_sizes_file(path: &Path) -> Result<ChromSizes, ParseError> {
    parse_chrom_sizes_reader(open_text(path)?)
}

/// Parse a chromosome size table from text
///
/// # Errors
///
/// See [`parse_chrom_sizes_reader`].
pub fn parse_chrom_sizes_text(text: &str) -> Result<ChromSizes, ParseError> {
    parse_chrom_sizes_reader(text.as_bytes())
}

/// Parse `chrom\tsize` lines
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if a line has fewer than 2 fields, an
/// invalid size, or no chromosomes are found.
pub fn parse_chrom_sizes_reader<R: BufRead>(reader: R) -> Result<ChromSizes, ParseError> {
    let mut entries = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if is_skippable(line) {
            continue;
        }

        let line_num = i + 1;
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 2 {
            return Err(ParseError::InvalidFormat(format!(
                "Line {line_num} has fewer than 2 fields"
            )));
        }

        let size = parse_u64_field(fields[1], "size", line_num)?;
        entries.push((fields[0].trim().to_string(), size));
    }

    if entries.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No chromosomes found in size table".to_string(),
        ));
    }

    Ok(ChromSizes::new(entries))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_drop_sex_chromosomes() {
        let text = "chr1\t248956422\nchr2\t242193529\nchrX\t156040895\nchrY\t57227415\nchrM\t16569\n";
        let sizes = parse_chrom_sizes_text(text).unwrap();
        assert_eq!(sizes.len(), 5);

        let sizes = sizes.without_sex_chromosomes();
        assert_eq!(sizes.names(), vec!["chr1", "chr2", "chrM"]);
        assert_eq!(sizes.len(), 3);
    }

    #[test]
    fn test_parse_invalid_size() {
        assert!(parse_chrom_sizes_text("chr1\tbig\n").is_err());
        assert!(parse_chrom_sizes_text("chr1\n").is_err());
        assert!(parse_chrom_sizes_text("\n").is_err());
    }
}
