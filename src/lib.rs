//! # seqbl-qscorer
//!
//! Quality assessment of NGS samples from their reads in blocklist regions.
//!
//! Reads that fall into blocklisted regions of the genome (low-mappability and
//! high-signal regions) carry a strong signal about sample quality. This crate
//! counts them per region and uses the counts as features for a random-forest
//! classifier trained on reference samples of known quality.
//!
//! ## Pipeline
//!
//! 1. **derive**: map reads with `bowtie2`, convert the BAM to a coordinate
//!    table, reduce each read to its summit and count summits per blocklist
//!    region into a feature table
//! 2. **score**: join the bundled reference tables, train the forest and
//!    predict the low-quality probability of each sample
//!
//! ## Example
//!
//! ```rust
//! use seqbl_qscorer::counting::count_regions;
//! use seqbl_qscorer::parsing::blocklist::parse_blocklist_text;
//! use seqbl_qscorer::SummitIndex;
//!
//! let blocklist = parse_blocklist_text("chr1\t100\t200\tBLLM_1\n").unwrap();
//!
//! let mut summits = SummitIndex::by_chromosome();
//! summits.extend("chr1", [100, 150, 199, 200]);
//!
//! let table = count_regions(&summits, &blocklist).unwrap();
//! assert_eq!(table.count_for("BLLM_1"), Some(2));
//! ```
//!
//! ## Modules
//!
//! - [`align`]: Driving `bowtie2` and `samtools`
//! - [`classify`]: Reference dataset, decision trees and the random forest
//! - [`core`]: Core data types for regions, summits and feature tables
//! - [`counting`]: Counting summits per blocklist region
//! - [`parsing`]: Parsers for blocklists, chromosome tables, BAM and feature files
//! - [`resources`]: Layout of the bundled resources directory
//! - [`cli`]: Command-line interface implementation

pub mod align;
pub mod classify;
pub mod cli;
pub mod core;
pub mod counting;
pub mod parsing;
pub mod resources;
pub mod utils;

// Re-export commonly used types for convenience
pub use classify::forest::RandomForest;
pub use core::features::{FeatureRow, FeatureTable};
pub use core::region::{Blocklist, BlocklistRegion};
pub use core::summits::{KeyDomain, SummitIndex};
pub use core::types::*;
pub use counting::count_regions;
pub use resources::ResourceLayout;
