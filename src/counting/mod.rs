//! Counting read summits inside blocklist regions.
//!
//! Two counting rules exist, selected by the key domain of the summit index:
//!
//! - **Whole-genome**: a summit counts for a region when `start < summit < end`.
//! - **Restricted index**: reads were mapped to the region sequences themselves,
//!   so a region's count is the number of reads assigned to its identifier.

pub mod counter;

pub use counter::{count_regions, CountError};
