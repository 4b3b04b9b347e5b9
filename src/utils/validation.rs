//! Centralized validation and helper functions.

use std::path::Path;

/// Maximum number of blocklist regions allowed in a single file
pub const MAX_REGIONS: usize = 1_000_000;

/// Whether adding another region to `count` existing ones would exceed [`MAX_REGIONS`].
#[must_use]
pub const fn exceeds_region_limit(count: usize) -> bool {
    count >= MAX_REGIONS
}

/// Derive a sample name from a FASTQ path.
///
/// Strips the directory, then a `.gz` suffix, then a `.fastq` or `.fq` suffix.
///
/// # Examples
///
/// ```
/// use seqbl_qscorer::utils::validation::sample_name_from_fastq;
/// use std::path::Path;
///
/// assert_eq!(sample_name_from_fastq(Path::new("/data/ENCFF001.fastq.gz")), "ENCFF001");
/// assert_eq!(sample_name_from_fastq(Path::new("reads.fq")), "reads");
/// assert_eq!(sample_name_from_fastq(Path::new("reads.txt")), "reads.txt");
/// ```
#[must_use]
pub fn sample_name_from_fastq(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let name = file_name.strip_suffix(".gz").unwrap_or(&file_name);
    let name = name
        .strip_suffix(".fastq")
        .or_else(|| name.strip_suffix(".fq"))
        .unwrap_or(name);
    name.to_string()
}

/// Sample ID of a feature file: the file name up to the first `.`
///
/// ```
/// use seqbl_qscorer::utils::validation::sample_id_from_file_name;
///
/// assert_eq!(sample_id_from_file_name("ENCFF001.csv"), "ENCFF001");
/// assert_eq!(sample_id_from_file_name("a.b.c"), "a");
/// assert_eq!(sample_id_from_file_name("plain"), "plain");
/// ```
#[must_use]
pub fn sample_id_from_file_name(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
#[must_use]
pub fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// True if the output path should be written tab-separated (`.tsv` or `.txt`)
#[must_use]
pub fn is_tab_separated(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .as_deref(),
        Some("tsv" | "txt")
    )
}
