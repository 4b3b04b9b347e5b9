use serde::{Deserialize, Serialize};

/// Genome assembly; selects the bundled blocklist, chromosome table and index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Assembly {
    Hg38,
    Mm10,
}

impl Assembly {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hg38 => "hg38",
            Self::Mm10 => "mm10",
        }
    }
}

impl std::fmt::Display for Assembly {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sequencing assay the reference model is restricted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
pub enum Assay {
    #[value(name = "generic")]
    #[serde(rename = "generic")]
    Generic,
    #[value(name = "ChIP-seq")]
    #[serde(rename = "ChIP-seq")]
    ChipSeq,
    #[value(name = "DNase-seq")]
    #[serde(rename = "DNase-seq")]
    DnaseSeq,
    #[value(name = "RNA-seq")]
    #[serde(rename = "RNA-seq")]
    RnaSeq,
}

impl Assay {
    /// Name as it appears in the `assay` column of the metadata table
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::ChipSeq => "ChIP-seq",
            Self::DnaseSeq => "DNase-seq",
            Self::RnaSeq => "RNA-seq",
        }
    }
}

impl std::fmt::Display for Assay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Single-end or paired-end sequencing run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RunType {
    Se,
    Pe,
}

impl RunType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Se => "se",
            Self::Pe => "pe",
        }
    }
}

impl std::fmt::Display for RunType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How reads were mapped before features were derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MappingMode {
    /// Against the blocklist-restricted index; reads are pre-bucketed by region ID
    #[value(name = "bl", alias = "BL")]
    Blocklist,
    /// Against a whole-genome index; reads carry chromosome coordinates
    #[value(name = "wg", alias = "WG")]
    WholeGenome,
}

impl MappingMode {
    /// Prefix of the bundled reference feature table for this mode
    #[must_use]
    pub fn table_prefix(self) -> &'static str {
        match self {
            Self::Blocklist => "bl",
            Self::WholeGenome => "wg",
        }
    }
}

/// Blocklist region class, encoded in the region identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegionType {
    /// `LM`: low mappability
    LowMappability,
    /// `HSR`: high signal region
    HighSignal,
}

impl RegionType {
    /// Map the type token of a region identifier, e.g. `LM` in `BLLM_12`
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "LM" => Some(Self::LowMappability),
            "HSR" => Some(Self::HighSignal),
            _ => None,
        }
    }

    /// Numeric code written to the `blType` column
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::LowMappability => 1,
            Self::HighSignal => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_type_codes() {
        assert_eq!(RegionType::from_token("LM").map(RegionType::code), Some(1));
        assert_eq!(RegionType::from_token("HSR").map(RegionType::code), Some(2));
        assert_eq!(RegionType::from_token("XX"), None);
        assert_eq!(RegionType::from_token("lm"), None);
    }

    #[test]
    fn test_assay_names_match_metadata() {
        assert_eq!(Assay::ChipSeq.as_str(), "ChIP-seq");
        assert_eq!(Assay::Generic.to_string(), "generic");
        assert_eq!(MappingMode::WholeGenome.table_prefix(), "wg");
    }
}
