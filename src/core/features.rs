use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::region::BlocklistRegion;

/// One row of a per-sample feature table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRow {
    #[serde(rename = "binID")]
    pub bin_id: usize,
    #[serde(rename = "chr")]
    pub chrom: String,
    pub start: u64,
    pub end: u64,
    pub count: u64,
    #[serde(rename = "blID")]
    pub region_id: String,
    #[serde(rename = "blType")]
    pub region_type: u8,
}

impl FeatureRow {
    pub fn from_region(region: &BlocklistRegion, count: u64) -> Self {
        Self {
            bin_id: region.ordinal,
            chrom: region.chrom.clone(),
            start: region.start,
            end: region.end,
            count,
            region_id: region.id.clone(),
            region_type: region.region_type.code(),
        }
    }
}

/// Region counts for one sample, in row-creation order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureTable {
    pub rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn push(&mut self, row: FeatureRow) {
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of all counts
    pub fn total_count(&self) -> u64 {
        self.rows.iter().map(|r| r.count).sum()
    }

    /// Count recorded for a region identifier
    pub fn count_for(&self, region_id: &str) -> Option<u64> {
        self.rows
            .iter()
            .find(|r| r.region_id == region_id)
            .map(|r| r.count)
    }

    /// Write as CSV with header `binID,chr,start,end,count,blID,blType`.
    ///
    /// An empty table still gets its header line.
    ///
    /// # Errors
    ///
    /// Returns a CSV error if serialization or the underlying write fails.
    pub fn write_csv<W: Write>(&self, writer: W) -> csv::Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        wtr.write_record(["binID", "chr", "start", "end", "count", "blID", "blType"])?;
        for row in &self.rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }

    /// Write the table to `path`
    ///
    /// # Errors
    ///
    /// Returns a CSV error if the file cannot be created or written.
    pub fn write_csv_file(&self, path: &Path) -> csv::Result<()> {
        let file = std::fs::File::create(path)?;
        self.write_csv(std::io::BufWriter::new(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::RegionType;

    #[test]
    fn test_write_csv_layout() {
        let region = BlocklistRegion::new(3, "chr1", 100, 200, RegionType::HighSignal, "BLHSR_3");
        let mut table = FeatureTable::new();
        table.push(FeatureRow::from_region(&region, 7));

        let mut out = Vec::new();
        table.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "binID,chr,start,end,count,blID,blType\n3,chr1,100,200,7,BLHSR_3,2\n"
        );
    }

    #[test]
    fn test_empty_table_keeps_header() {
        let mut out = Vec::new();
        FeatureTable::new().write_csv(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "binID,chr,start,end,count,blID,blType\n"
        );
    }

    #[test]
    fn test_count_lookup() {
        let region = BlocklistRegion::new(1, "chr1", 0, 10, RegionType::LowMappability, "BLLM_1");
        let mut table = FeatureTable::new();
        table.push(FeatureRow::from_region(&region, 4));
        assert_eq!(table.count_for("BLLM_1"), Some(4));
        assert_eq!(table.count_for("BLLM_2"), None);
        assert_eq!(table.total_count(), 4);
    }
}
