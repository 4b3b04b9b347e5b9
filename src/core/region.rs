use std::collections::HashSet;

use crate::core::types::RegionType;

/// A single blocklisted genomic interval
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlocklistRegion {
    /// 1-based ordinal by line order in the blocklist file
    pub ordinal: usize,

    /// Chromosome the region lies on
    pub chrom: String,

    /// Start offset (0-based)
    pub start: u64,

    /// End offset
    pub end: u64,

    /// Region class derived from the identifier prefix
    pub region_type: RegionType,

    /// Region identifier, e.g. `BLLM_42`
    pub id: String,
}

impl BlocklistRegion {
    pub fn new(
        ordinal: usize,
        chrom: impl Into<String>,
        start: u64,
        end: u64,
        region_type: RegionType,
        id: impl Into<String>,
    ) -> Self {
        Self {
            ordinal,
            chrom: chrom.into(),
            start,
            end,
            region_type,
            id: id.into(),
        }
    }

    /// True if `pos` lies strictly inside the region; boundaries never count
    #[must_use]
    pub fn contains_strict(&self, pos: u64) -> bool {
        pos > self.start && pos < self.end
    }
}

/// The regions stored under one chromosome key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChromosomeRegions {
    pub chrom: String,
    pub regions: Vec<BlocklistRegion>,
}

/// Blocklist regions grouped per chromosome, in chromosome order
///
/// Chromosome order is first appearance in the blocklist file until
/// [`Blocklist::restrict_to`] reorders it to a chromosome table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blocklist {
    groups: Vec<ChromosomeRegions>,
}

impl Blocklist {
    /// Create an empty blocklist
    pub fn new() -> Self {
        Self { groups: Vec::new() }
    }

    /// Build from pre-grouped regions without regrouping.
    ///
    /// Regions are stored under the given keys as-is; counting verifies that
    /// each region's chromosome matches its key.
    pub fn from_groups(groups: Vec<ChromosomeRegions>) -> Self {
        Self { groups }
    }

    /// Append a region under its own chromosome
    pub fn push(&mut self, region: BlocklistRegion) {
        if let Some(group) = self.groups.iter_mut().find(|g| g.chrom == region.chrom) {
            group.regions.push(region);
        } else {
            self.groups.push(ChromosomeRegions {
                chrom: region.chrom.clone(),
                regions: vec![region],
            });
        }
    }

    /// Keep only chromosomes named in `chromosomes`, ordered as they appear there
    #[must_use]
    pub fn restrict_to(mut self, chromosomes: &[String]) -> Self {
        let mut ordered = Vec::with_capacity(self.groups.len());
        for chrom in chromosomes {
            if let Some(pos) = self.groups.iter().position(|g| &g.chrom == chrom) {
                ordered.push(self.groups.swap_remove(pos));
            }
        }
        Self { groups: ordered }
    }

    /// Chromosome groups in iteration order
    pub fn groups(&self) -> &[ChromosomeRegions] {
        &self.groups
    }

    /// All regions in iteration order
    pub fn iter(&self) -> impl Iterator<Item = &BlocklistRegion> {
        self.groups.iter().flat_map(|g| g.regions.iter())
    }

    /// All region identifiers
    pub fn region_ids(&self) -> HashSet<String> {
        self.iter().map(|r| r.id.clone()).collect()
    }

    /// Total number of regions
    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.regions.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(ordinal: usize, chrom: &str, start: u64, end: u64) -> BlocklistRegion {
        BlocklistRegion::new(
            ordinal,
            chrom,
            start,
            end,
            RegionType::LowMappability,
            format!("BLLM_{ordinal}"),
        )
    }

    #[test]
    fn test_contains_strict_excludes_boundaries() {
        let r = region(1, "chr1", 100, 200);
        assert!(!r.contains_strict(100));
        assert!(r.contains_strict(101));
        assert!(r.contains_strict(199));
        assert!(!r.contains_strict(200));
    }

    #[test]
    fn test_push_groups_by_chromosome() {
        let mut bl = Blocklist::new();
        bl.push(region(1, "chr2", 0, 10));
        bl.push(region(2, "chr1", 0, 10));
        bl.push(region(3, "chr2", 20, 30));

        assert_eq!(bl.len(), 3);
        assert_eq!(bl.groups()[0].chrom, "chr2");
        assert_eq!(bl.groups().len(), 2);
        assert_eq!(bl.groups()[0].regions.len(), 2);
        assert_eq!(bl.groups()[1].chrom, "chr1");
    }

    #[test]
    fn test_restrict_to_reorders_and_drops() {
        let mut bl = Blocklist::new();
        bl.push(region(1, "chrX", 0, 10));
        bl.push(region(2, "chr2", 0, 10));
        bl.push(region(3, "chr1", 0, 10));

        let order = vec!["chr1".to_string(), "chr2".to_string()];
        let bl = bl.restrict_to(&order);
        let chroms: Vec<&str> = bl.groups().iter().map(|g| g.chrom.as_str()).collect();
        assert_eq!(chroms, vec!["chr1", "chr2"]);
        assert_eq!(bl.len(), 2);
    }
}
