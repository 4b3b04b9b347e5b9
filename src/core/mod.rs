//! Core data types for blocklist feature derivation.
//!
//! - [`BlocklistRegion`]: a blocklisted interval with its ordinal, type and identifier
//! - [`Blocklist`]: regions grouped per chromosome, in chromosome order
//! - [`SummitIndex`]: read summits keyed by chromosome or by region identifier
//! - [`FeatureTable`]: per-region read counts for one sample
//! - [`Assembly`], [`Assay`], [`RunType`], [`MappingMode`], [`RegionType`]: vocabulary types
//!
//! ## Key domains
//!
//! | Mapping mode | Summit key | Summit value |
//! |--------------|------------|--------------|
//! | whole-genome | chromosome (`chr1`) | genomic midpoint |
//! | blocklist    | region ID (`BLLM_12`) | midpoint within the region sequence |
//!
//! A [`SummitIndex`] never mixes the two; its [`KeyDomain`] selects how regions are counted.
//!
//! [`BlocklistRegion`]: region::BlocklistRegion
//! [`Blocklist`]: region::Blocklist
//! [`SummitIndex`]: summits::SummitIndex
//! [`KeyDomain`]: summits::KeyDomain
//! [`FeatureTable`]: features::FeatureTable
//! [`Assembly`]: types::Assembly
//! [`Assay`]: types::Assay
//! [`RunType`]: types::RunType
//! [`MappingMode`]: types::MappingMode
//! [`RegionType`]: types::RegionType

pub mod features;
pub mod region;
pub mod summits;
pub mod types;
