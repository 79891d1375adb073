use serde::{Deserialize, Serialize};

/// Running totals for one cache
#[derive(Debug, Default, Copy, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// Totals for the whole hierarchy. Can be serialised as the JSON output format
#[derive(Debug, Default, Copy, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct HierarchyStats {
    pub l1i: CacheStats,
    pub l1d: CacheStats,
    pub l2: CacheStats,
}

/// What happened during a single access. Only used for reporting, it carries no state between
/// accesses. A MODIFY produces two of these, one per phase
///
/// `set_l1`/`set_l2` are only meaningful when that level was consulted, which is always the case
/// for L1 and is the case for L2 whenever `l2_hit || l2_miss`
#[derive(Debug, Default, Copy, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct AccessResult {
    pub l1_hit: bool,
    pub l1_miss: bool,
    pub l1_evict: bool,
    pub l2_hit: bool,
    pub l2_miss: bool,
    pub l2_evict: bool,
    pub placed_in_l1: bool,
    pub placed_in_l2: bool,
    pub set_l1: usize,
    pub set_l2: usize,
    pub wrote_to_ram: bool,
}

impl CacheStats {
    pub fn accesses(&self) -> u64 {
        self.hits + self.misses
    }
}

impl AccessResult {
    pub fn consulted_l2(&self) -> bool {
        self.l2_hit || self.l2_miss
    }
}
