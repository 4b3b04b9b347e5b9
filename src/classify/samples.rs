//! Samples to be scored: one feature table per file in an input directory.

use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::parsing::features::read_feature_counts_file;
use crate::parsing::ParseError;
use crate::utils::validation::sample_id_from_file_name;

#[derive(Error, Debug)]
pub enum ScoreError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid feature file {path}: {source}")]
    FeatureFile {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Feature vectors of the samples to score, aligned to the model's features
#[derive(Debug, Clone, PartialEq)]
pub struct SampleMatrix {
    pub feature_names: Vec<String>,
    pub sample_ids: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

impl SampleMatrix {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Write as TSV: `sample_id` followed by one column per feature
    ///
    /// # Errors
    ///
    /// Returns a CSV error if writing fails.
    pub fn write_tsv<W: Write>(&self, writer: W) -> csv::Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_writer(writer);

        let mut header = vec!["sample_id".to_string()];
        header.extend(self.feature_names.iter().cloned());
        wtr.write_record(&header)?;

        for (id, row) in self.sample_ids.iter().zip(&self.rows) {
            let mut record = vec![id.clone()];
            record.extend(row.iter().map(f64::to_string));
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Feature files directly inside `indir`, sorted by file name
///
/// # Errors
///
/// Returns `ScoreError::InvalidInput` if `indir` is not a directory.
pub fn list_feature_files(indir: &Path) -> Result<Vec<PathBuf>, ScoreError> {
    if !indir.is_dir() {
        return Err(ScoreError::InvalidInput(format!(
            "\"{}\" is not a directory",
            indir.display()
        )));
    }

    let mut files = Vec::new();
    for entry in std::fs::read_dir(indir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Load the samples stored in `files`, optionally only `only_sample`.
///
/// Region counts missing from a sample's table are zero.
///
/// # Errors
///
/// Returns `ScoreError::InvalidInput` if `files` is empty or does not contain
/// `only_sample`; `ScoreError::FeatureFile` if a table cannot be parsed.
pub fn load_samples(
    files: &[PathBuf],
    feature_names: &[String],
    only_sample: Option<&str>,
) -> Result<SampleMatrix, ScoreError> {
    let mut sample_ids = Vec::new();
    let mut rows = Vec::new();

    for path in files {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let sample_id = sample_id_from_file_name(&file_name).to_string();
        if only_sample.is_some_and(|only| only != sample_id) {
            continue;
        }

        let counts = read_feature_counts_file(path).map_err(|source| ScoreError::FeatureFile {
            path: path.clone(),
            source,
        })?;
        debug!(sample = %sample_id, regions = counts.len(), "Loaded sample features");

        rows.push(
            feature_names
                .iter()
                .map(|name| counts.get(name).copied().unwrap_or(0.0))
                .collect(),
        );
        sample_ids.push(sample_id);
    }

    if rows.is_empty() {
        return Err(ScoreError::InvalidInput(match only_sample {
            Some(id) => format!("sample '{id}' not found among {} feature files", files.len()),
            None => "no feature files found".to_string(),
        }));
    }

    Ok(SampleMatrix {
        feature_names: feature_names.to_vec(),
        sample_ids,
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Vec<String> {
        vec!["BLLM_1".to_string(), "BLHSR_2".to_string()]
    }

    #[test]
    fn test_not_a_directory() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let err = list_feature_files(file.path()).unwrap_err();
        assert!(matches!(err, ScoreError::InvalidInput(_)));
    }

    #[test]
    fn test_missing_counts_default_to_zero() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("S2.csv"), "blID,count\nBLHSR_2,4\n").unwrap();
        std::fs::write(dir.path().join("S1.csv"), "blID,count\nBLLM_1,3\nBLXX_9,8\n").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();

        let files = list_feature_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);
        let matrix = load_samples(&files, &names(), None).unwrap();
        assert_eq!(matrix.sample_ids, vec!["S1", "S2"]);
        assert_eq!(matrix.rows, vec![vec![3.0, 0.0], vec![0.0, 4.0]]);
    }

    #[test]
    fn test_single_sample_selection() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("S1.csv"), "blID,count\nBLLM_1,3\n").unwrap();
        std::fs::write(dir.path().join("S2.csv"), "blID,count\nBLLM_1,5\n").unwrap();

        let files = list_feature_files(dir.path()).unwrap();
        let matrix = load_samples(&files, &names(), Some("S2")).unwrap();
        assert_eq!(matrix.sample_ids, vec!["S2"]);

        let err = load_samples(&files, &names(), Some("S9")).unwrap_err();
        assert!(matches!(err, ScoreError::InvalidInput(_)));
    }

    #[test]
    fn test_empty_directory() {
        let dir = tempfile::tempdir().unwrap();
        let files = list_feature_files(dir.path()).unwrap();
        assert!(files.is_empty());
        let err = load_samples(&files, &names(), None).unwrap_err();
        assert!(matches!(err, ScoreError::InvalidInput(_)));
    }

    #[test]
    fn test_write_tsv() {
        let matrix = SampleMatrix {
            feature_names: names(),
            sample_ids: vec!["S1".to_string()],
            rows: vec![vec![3.0, 0.5]],
        };
        let mut out = Vec::new();
        matrix.write_tsv(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "sample_id\tBLLM_1\tBLHSR_2\nS1\t3\t0.5\n"
        );
    }
}
