//! Location of the bundled blocklists, chromosome tables, index and reference data.
//!
//! ```text
//! <root>/blocklists/<assembly>.bed
//! <root>/chromosome_sizes/<assembly>.tsv
//! <root>/idxBowtie2/BL/<assembly>.*.bt2
//! <root>/data/meta.csv
//! <root>/data/<bl|wg>Map_<assembly>.csv
//! ```

use std::path::{Path, PathBuf};

use crate::core::types::{Assembly, MappingMode};

/// Environment variable naming the resources directory
pub const RESOURCES_ENV: &str = "SEQBL_RESOURCES";

/// Directory name searched for when no root is given
pub const DEFAULT_DIR: &str = "resources";

/// Paths into a resources directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLayout {
    root: PathBuf,
}

impl ResourceLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Use `explicit` if given, else `resources/` next to the executable if it
    /// exists, else `./resources`.
    pub fn resolve(explicit: Option<&Path>) -> Self {
        if let Some(root) = explicit {
            return Self::new(root);
        }

        let beside_exe = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(|dir| dir.join(DEFAULT_DIR)))
            .filter(|dir| dir.is_dir());

        Self::new(beside_exe.unwrap_or_else(|| PathBuf::from(DEFAULT_DIR)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn blocklist(&self, assembly: Assembly) -> PathBuf {
        self.root.join("blocklists").join(format!("{assembly}.bed"))
    }

    pub fn chrom_sizes(&self, assembly: Assembly) -> PathBuf {
        self.root
            .join("chromosome_sizes")
            .join(format!("{assembly}.tsv"))
    }

    /// Prefix of the blocklist-restricted Bowtie2 index (minus `.X.bt2`)
    pub fn restricted_index(&self, assembly: Assembly) -> PathBuf {
        self.root
            .join("idxBowtie2")
            .join("BL")
            .join(assembly.as_str())
    }

    pub fn meta_table(&self) -> PathBuf {
        self.root.join("data").join("meta.csv")
    }

    pub fn reference_features(&self, mapping: MappingMode, assembly: Assembly) -> PathBuf {
        self.root
            .join("data")
            .join(format!("{}Map_{assembly}.csv", mapping.table_prefix()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_paths() {
        let layout = ResourceLayout::new("/opt/seqbl");
        assert_eq!(
            layout.blocklist(Assembly::Hg38),
            PathBuf::from("/opt/seqbl/blocklists/hg38.bed")
        );
        assert_eq!(
            layout.chrom_sizes(Assembly::Mm10),
            PathBuf::from("/opt/seqbl/chromosome_sizes/mm10.tsv")
        );
        assert_eq!(
            layout.restricted_index(Assembly::Mm10),
            PathBuf::from("/opt/seqbl/idxBowtie2/BL/mm10")
        );
        assert_eq!(
            layout.reference_features(MappingMode::Blocklist, Assembly::Hg38),
            PathBuf::from("/opt/seqbl/data/blMap_hg38.csv")
        );
        assert_eq!(
            layout.reference_features(MappingMode::WholeGenome, Assembly::Mm10),
            PathBuf::from("/opt/seqbl/data/wgMap_mm10.csv")
        );
    }

    #[test]
    fn test_explicit_root_wins() {
        let layout = ResourceLayout::resolve(Some(Path::new("/tmp/res")));
        assert_eq!(layout.root(), Path::new("/tmp/res"));
    }
}
