use thiserror::Error;
use tracing::debug;

use crate::core::features::{FeatureRow, FeatureTable};
use crate::core::region::Blocklist;
use crate::core::summits::{KeyDomain, SummitIndex};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CountError {
    #[error(
        "Blocklist region {region_id} is on {region_chrom} but stored under chromosome {key}"
    )]
    ChromosomeMismatch {
        key: String,
        region_chrom: String,
        region_id: String,
    },
}

/// Count summits per blocklist region.
///
/// The counting rule follows the key domain of `summits`:
///
/// - [`KeyDomain::Region`]: each region whose identifier is a key gets a row
///   with the number of summits recorded under it. Unobserved regions are omitted.
/// - [`KeyDomain::Chromosome`]: each region on a chromosome present in both
///   mappings gets the number of summits strictly inside `(start, end)`.
///   Only nonzero counts produce a row.
///
/// Rows are emitted in blocklist chromosome order, then region order.
///
/// # Errors
///
/// Returns `CountError::ChromosomeMismatch` if, in chromosome mode, a region is
/// stored under a chromosome key other than its own.
pub fn count_regions(
    summits: &SummitIndex,
    blocklist: &Blocklist,
) -> Result<FeatureTable, CountError> {
    match summits.domain() {
        KeyDomain::Region => Ok(count_bucketed(summits, blocklist)),
        KeyDomain::Chromosome => count_by_coordinate(summits, blocklist),
    }
}

fn count_bucketed(summits: &SummitIndex, blocklist: &Blocklist) -> FeatureTable {
    let mut table = FeatureTable::new();
    for region in blocklist.iter() {
        if let Some(bucket) = summits.get(&region.id) {
            table.push(FeatureRow::from_region(region, bucket.len() as u64));
        }
    }
    debug!(rows = table.len(), "Counted pre-bucketed summits");
    table
}

fn count_by_coordinate(
    summits: &SummitIndex,
    blocklist: &Blocklist,
) -> Result<FeatureTable, CountError> {
    let mut table = FeatureTable::new();

    for group in blocklist.groups() {
        let Some(positions) = summits.get(&group.chrom) else {
            continue;
        };

        for region in &group.regions {
            if region.chrom != group.chrom {
                return Err(CountError::ChromosomeMismatch {
                    key: group.chrom.clone(),
                    region_chrom: region.chrom.clone(),
                    region_id: region.id.clone(),
                });
            }

            let count = positions
                .iter()
                .filter(|&&pos| region.contains_strict(pos))
                .count() as u64;

            if count != 0 {
                table.push(FeatureRow::from_region(region, count));
            }
        }

        debug!(chrom = %group.chrom, summits = positions.len(), "Counted chromosome");
    }

    Ok(table)
}
