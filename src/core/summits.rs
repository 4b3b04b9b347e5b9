use std::collections::HashMap;

use crate::core::types::MappingMode;

/// What the keys of a [`SummitIndex`] name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDomain {
    /// Keys are chromosome names; summits are genomic coordinates
    Chromosome,
    /// Keys are blocklist-region identifiers; summits are already bucketed
    Region,
}

impl From<MappingMode> for KeyDomain {
    fn from(mode: MappingMode) -> Self {
        match mode {
            MappingMode::Blocklist => Self::Region,
            MappingMode::WholeGenome => Self::Chromosome,
        }
    }
}

/// Read summits grouped under keys of a single domain
///
/// A key exists only once a summit has been recorded under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummitIndex {
    domain: KeyDomain,
    summits: HashMap<String, Vec<u64>>,
}

impl SummitIndex {
    pub fn new(domain: KeyDomain) -> Self {
        Self {
            domain,
            summits: HashMap::new(),
        }
    }

    /// Index keyed by chromosome name
    pub fn by_chromosome() -> Self {
        Self::new(KeyDomain::Chromosome)
    }

    /// Index keyed by blocklist-region identifier
    pub fn by_region() -> Self {
        Self::new(KeyDomain::Region)
    }

    pub fn domain(&self) -> KeyDomain {
        self.domain
    }

    /// Record one summit under `key`
    pub fn push(&mut self, key: &str, summit: u64) {
        if let Some(list) = self.summits.get_mut(key) {
            list.push(summit);
        } else {
            self.summits.insert(key.to_string(), vec![summit]);
        }
    }

    /// Record several summits under `key`
    pub fn extend(&mut self, key: &str, summits: impl IntoIterator<Item = u64>) {
        let list = self.summits.entry(key.to_string()).or_default();
        list.extend(summits);
    }

    /// Summits recorded under `key`, if any were
    pub fn get(&self, key: &str) -> Option<&[u64]> {
        self.summits.get(key).map(Vec::as_slice)
    }

    /// Number of distinct keys
    pub fn key_count(&self) -> usize {
        self.summits.len()
    }

    /// Total summits across all keys
    pub fn summit_count(&self) -> usize {
        self.summits.values().map(Vec::len).sum()
    }
}

/// Representative position of a read: midpoint of `[start, end)`, rounded down
#[must_use]
pub fn summit(start: u64, end: u64) -> u64 {
    start + (end.saturating_sub(start)) / 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summit_rounds_down() {
        assert_eq!(summit(100, 200), 150);
        assert_eq!(summit(100, 201), 150);
        assert_eq!(summit(0, 1), 0);
        assert_eq!(summit(7, 7), 7);
    }

    #[test]
    fn test_push_creates_key_on_first_summit() {
        let mut index = SummitIndex::by_region();
        assert!(index.get("BLLM_1").is_none());
        index.push("BLLM_1", 5);
        index.push("BLLM_1", 6);
        index.extend("BLHSR_2", [1, 2, 3]);

        assert_eq!(index.domain(), KeyDomain::Region);
        assert_eq!(index.get("BLLM_1"), Some(&[5, 6][..]));
        assert_eq!(index.key_count(), 2);
        assert_eq!(index.summit_count(), 5);
    }

    #[test]
    fn test_domain_from_mapping_mode() {
        assert_eq!(KeyDomain::from(MappingMode::Blocklist), KeyDomain::Region);
        assert_eq!(
            KeyDomain::from(MappingMode::WholeGenome),
            KeyDomain::Chromosome
        );
    }
}
