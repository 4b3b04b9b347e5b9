//! Reference training data.
//!
//! Two bundled tables are joined on `accession`:
//!
//! - `meta.csv`: one row per reference sample with `accession`, `assembly`,
//!   `assay`, `runtype` and the quality label `status`
//! - `<bl|wg>Map_<assembly>.csv`: `accession` plus one column per blocklist
//!   region holding that sample's read count
//!
//! Metadata rows are filtered to the requested assembly, assay and run type
//! before the inner join; the join keeps metadata row order.

use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;

use tracing::{debug, warn};

use crate::classify::ClassifierError;
use crate::core::types::{Assay, Assembly, RunType};

/// Columns that are never features
pub const METADATA_COLUMNS: [&str; 7] = [
    "old_accession",
    "accession",
    "assay",
    "runtype",
    "status",
    "assembly",
    "bl_fraqs",
];

/// Which reference samples to train on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceFilter {
    pub assembly: Assembly,
    pub assay: Assay,
    pub runtype: RunType,
}

impl ReferenceFilter {
    fn matches(&self, assembly: &str, assay: &str, runtype: &str) -> bool {
        assembly == self.assembly.as_str()
            && assay == self.assay.as_str()
            && runtype == self.runtype.as_str()
    }
}

/// Ordered pair of quality labels; the greater one is the low-quality class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualityLabels {
    pub good: String,
    pub low: String,
}

impl QualityLabels {
    /// Sort the distinct labels numerically if all are numbers, lexically otherwise
    ///
    /// # Errors
    ///
    /// Returns `ClassifierError::LabelCount` unless exactly two distinct labels occur.
    pub fn from_labels<'a>(labels: impl IntoIterator<Item = &'a str>) -> Result<Self, ClassifierError> {
        let mut distinct: Vec<String> = labels
            .into_iter()
            .collect::<HashSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();

        let numeric: Option<Vec<f64>> = distinct.iter().map(|l| l.parse::<f64>().ok()).collect();
        if let Some(values) = numeric {
            let mut paired: Vec<(f64, String)> = values.into_iter().zip(distinct).collect();
            paired.sort_by(|a, b| a.0.total_cmp(&b.0));
            distinct = paired.into_iter().map(|(_, l)| l).collect();
        } else {
            distinct.sort();
        }

        match <[String; 2]>::try_from(distinct) {
            Ok([good, low]) => Ok(Self { good, low }),
            Err(found) => Err(ClassifierError::LabelCount(found)),
        }
    }

    pub fn is_low(&self, label: &str) -> bool {
        label == self.low
    }
}

/// Joined reference data ready for training
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Feature (blocklist region) names, in table column order
    pub feature_names: Vec<String>,
    pub accessions: Vec<String>,
    /// One row per sample, aligned with `feature_names`
    pub rows: Vec<Vec<f64>>,
    pub labels: Vec<String>,
    pub classes: QualityLabels,
}

impl Dataset {
    /// Labels as `true` for low quality
    pub fn targets(&self) -> Vec<bool> {
        self.labels.iter().map(|l| self.classes.is_low(l)).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

struct MetaRow {
    accession: String,
    status: String,
}

/// Load and join the reference tables from disk
///
/// # Errors
///
/// Returns `ClassifierError::Io`/`Csv` on read failures, or the errors of
/// [`load_reference`].
pub fn load_reference_files(
    meta_path: &Path,
    features_path: &Path,
    filter: &ReferenceFilter,
) -> Result<Dataset, ClassifierError> {
    let meta = std::fs::File::open(meta_path)?;
    let features = std::fs::File::open(features_path)?;
    let dataset = load_reference(meta, features, filter)?;
    debug!(
        meta = %meta_path.display(),
        features = %features_path.display(),
        samples = dataset.len(),
        feature_columns = dataset.feature_names.len(),
        "Loaded reference dataset"
    );
    Ok(dataset)
}

/// Load and join the reference tables
///
/// # Errors
///
/// Returns `ClassifierError::MissingColumn` if a required column is absent,
/// `ClassifierError::InvalidValue` for a non-numeric feature cell,
/// `ClassifierError::NoTrainingSamples` if the join is empty, or
/// `ClassifierError::LabelCount` if the labels are not binary.
pub fn load_reference<M: Read, F: Read>(
    meta: M,
    features: F,
    filter: &ReferenceFilter,
) -> Result<Dataset, ClassifierError> {
    let meta_rows = read_meta(meta, filter)?;
    let (feature_names, by_accession) = read_feature_table(features)?;

    let mut accessions = Vec::new();
    let mut rows = Vec::new();
    let mut labels = Vec::new();
    for meta_row in meta_rows {
        if let Some(values) = by_accession.get(&meta_row.accession) {
            rows.push(values.clone());
            labels.push(meta_row.status);
            accessions.push(meta_row.accession);
        }
    }

    if rows.is_empty() {
        return Err(ClassifierError::NoTrainingSamples {
            assembly: filter.assembly.to_string(),
            assay: filter.assay.to_string(),
            runtype: filter.runtype.to_string(),
        });
    }

    let classes = QualityLabels::from_labels(labels.iter().map(String::as_str))?;

    Ok(Dataset {
        feature_names,
        accessions,
        rows,
        labels,
        classes,
    })
}

fn column_index(
    headers: &csv::StringRecord,
    table: &str,
    column: &str,
) -> Result<usize, ClassifierError> {
    headers
        .iter()
        .position(|h| h.trim() == column)
        .ok_or_else(|| ClassifierError::MissingColumn {
            table: table.to_string(),
            column: column.to_string(),
        })
}

fn read_meta<R: Read>(reader: R, filter: &ReferenceFilter) -> Result<Vec<MetaRow>, ClassifierError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();
    let accession = column_index(&headers, "meta", "accession")?;
    let assembly = column_index(&headers, "meta", "assembly")?;
    let assay = column_index(&headers, "meta", "assay")?;
    let runtype = column_index(&headers, "meta", "runtype")?;
    let status = column_index(&headers, "meta", "status")?;

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record?;
        let field = |i: usize| record.get(i).unwrap_or_default().trim();
        if filter.matches(field(assembly), field(assay), field(runtype)) {
            rows.push(MetaRow {
                accession: field(accession).to_string(),
                status: field(status).to_string(),
            });
        }
    }
    Ok(rows)
}

type FeatureRows = HashMap<String, Vec<f64>>;

fn read_feature_table<R: Read>(reader: R) -> Result<(Vec<String>, FeatureRows), ClassifierError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();
    let accession = column_index(&headers, "features", "accession")?;

    let feature_columns: Vec<(usize, String)> = headers
        .iter()
        .enumerate()
        .filter(|(_, name)| !METADATA_COLUMNS.contains(&name.trim()))
        .map(|(i, name)| (i, name.trim().to_string()))
        .collect();

    let mut by_accession = FeatureRows::new();
    for record in rdr.records() {
        let record = record?;
        let id = record.get(accession).unwrap_or_default().trim().to_string();

        let mut values = Vec::with_capacity(feature_columns.len());
        for (i, name) in &feature_columns {
            let cell = record.get(*i).unwrap_or_default().trim();
            let value = if cell.is_empty() {
                0.0
            } else {
                cell.parse::<f64>().map_err(|_| {
                    ClassifierError::InvalidValue(format!(
                        "accession {id}, column {name}: '{cell}'"
                    ))
                })?
            };
            values.push(value);
        }

        if by_accession.contains_key(&id) {
            warn!(accession = %id, "Duplicate accession in reference features, keeping first");
            continue;
        }
        by_accession.insert(id, values);
    }

    let names = feature_columns.into_iter().map(|(_, name)| name).collect();
    Ok((names, by_accession))
}

#[cfg(test)]
mod tests {
    use super::*;

    const META: &str = "\
accession,old_accession,assembly,assay,runtype,status
ENC1,old1,hg38,ChIP-seq,se,0
ENC2,old2,hg38,ChIP-seq,se,1
ENC3,old3,hg38,ChIP-seq,pe,1
ENC4,old4,mm10,ChIP-seq,se,0
ENC5,old5,hg38,ChIP-seq,se,0
";

    const FEATURES: &str = "\
accession,BLLM_1,BLHSR_2,bl_fraqs
ENC5,1,2,0.1
ENC2,30,40,0.5
ENC1,3,,0.2
ENC3,7,8,0.3
";

    fn filter() -> ReferenceFilter {
        ReferenceFilter {
            assembly: Assembly::Hg38,
            assay: Assay::ChipSeq,
            runtype: RunType::Se,
        }
    }

    #[test]
    fn test_join_filters_and_keeps_meta_order() {
        let ds = load_reference(META.as_bytes(), FEATURES.as_bytes(), &filter()).unwrap();

        assert_eq!(ds.feature_names, vec!["BLLM_1", "BLHSR_2"]);
        assert_eq!(ds.accessions, vec!["ENC1", "ENC2", "ENC5"]);
        assert_eq!(ds.rows[0], vec![3.0, 0.0]);
        assert_eq!(ds.rows[1], vec![30.0, 40.0]);
        assert_eq!(ds.targets(), vec![false, true, false]);
    }

    #[test]
    fn test_empty_join() {
        let filter = ReferenceFilter {
            assay: Assay::RnaSeq,
            ..filter()
        };
        let err = load_reference(META.as_bytes(), FEATURES.as_bytes(), &filter).unwrap_err();
        assert!(matches!(err, ClassifierError::NoTrainingSamples { .. }));
    }

    #[test]
    fn test_missing_status_column() {
        let meta = "accession,assembly,assay,runtype\nENC1,hg38,ChIP-seq,se\n";
        let err = load_reference(meta.as_bytes(), FEATURES.as_bytes(), &filter()).unwrap_err();
        assert!(matches!(err, ClassifierError::MissingColumn { ref column, .. } if column == "status"));
    }

    #[test]
    fn test_non_numeric_feature() {
        let features = "accession,BLLM_1\nENC1,lots\n";
        let err = load_reference(META.as_bytes(), features.as_bytes(), &filter()).unwrap_err();
        assert!(matches!(err, ClassifierError::InvalidValue(_)));
    }

    #[test]
    fn test_label_ordering() {
        let labels = QualityLabels::from_labels(["1", "0", "1"]).unwrap();
        assert_eq!(labels.low, "1");

        let labels = QualityLabels::from_labels(["10", "9"]).unwrap();
        assert_eq!(labels.low, "10");

        let labels = QualityLabels::from_labels(["released", "revoked"]).unwrap();
        assert_eq!(labels.low, "revoked");

        assert!(QualityLabels::from_labels(["0"]).is_err());
        assert!(QualityLabels::from_labels(["0", "1", "2"]).is_err());
    }
}
