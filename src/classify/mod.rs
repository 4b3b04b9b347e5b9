//! Random-forest quality classifier.
//!
//! - [`dataset`]: loads and joins the bundled reference tables into a training set
//! - [`tree`]: CART decision trees with Gini impurity
//! - [`forest`]: bootstrap-aggregated trees with per-split feature subsampling
//!
//! The forest is retrained on every invocation. With a fixed seed the fitted
//! model, and therefore every predicted probability, is reproducible.
//!
//! ## Example
//!
//! ```rust
//! use seqbl_qscorer::classify::forest::{ForestParams, RandomForest};
//!
//! let x = vec![vec![0.0], vec![1.0], vec![10.0], vec![11.0]];
//! let y = vec![false, false, true, true];
//! let forest = RandomForest::fit(&x, &y, &ForestParams::default()).unwrap();
//! assert!(forest.predict_proba(&[10.5]).unwrap() > 0.5);
//! ```

pub mod dataset;
pub mod forest;
pub mod samples;
pub mod tree;

use thiserror::Error;

/// Seed used for every model fit
pub const SEED: u64 = 482_020;

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Reference table '{table}' is missing column '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("Invalid value in reference table: {0}")]
    InvalidValue(String),

    #[error("No training samples for assembly {assembly}, assay {assay}, run type {runtype}")]
    NoTrainingSamples {
        assembly: String,
        assay: String,
        runtype: String,
    },

    #[error("Expected exactly 2 quality labels, found {0:?}")]
    LabelCount(Vec<String>),

    #[error("Training data is empty")]
    EmptyTrainingSet,

    #[error("Sample has {found} features, model expects {expected}")]
    FeatureCount { expected: usize, found: usize },
}
