//! Command-line interface for seqbl.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **derive**: Map a FASTQ file and count reads in blocklist regions
//! - **score**: Predict the low-quality probability of derived feature tables
//!
//! ## Usage
//!
//! ```text
//! # Derive blocklist features using the bundled restricted index
//! seqbl derive -i sample.fastq.gz -a hg38 -o features_BL/
//!
//! # Derive from a whole-genome mapping
//! seqbl derive -i sample.fastq.gz -a hg38 -x /idx/hg38/genome -c 8
//!
//! # Score every sample in a directory
//! seqbl score -i features_BL/ --assembly hg38 --assay ChIP-seq -r se --prob-out probs.tsv
//!
//! # JSON output for scripting
//! seqbl --format json score -i features_BL/ --assembly hg38 --assay generic -r pe
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::resources::RESOURCES_ENV;

pub mod derive;
pub mod score;

#[derive(Parser)]
#[command(name = "seqbl")]
#[command(version)]
#[command(about = "Blocklist-based quality scoring of NGS samples")]
#[command(
    long_about = "seqbl assesses the quality of NGS samples from their reads in blocklist regions.\n\nIt works in two steps:\n- derive: map reads and count them in every blocklist region\n- score: train a random forest on reference samples and predict the probability that each sample is of low quality"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only report warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Directory holding blocklists, chromosome tables, the restricted index and reference data
    #[arg(long, global = true, env = RESOURCES_ENV)]
    pub resources: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Map reads and count them in blocklist regions
    Derive(derive::DeriveArgs),

    /// Score samples by their blocklist features
    Score(score::ScoreArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Tsv,
}
