mod config_tests;

use crate::config::{CacheGeometry, HierarchyConfig};
use crate::simulator::Simulator;

pub const RAM_SIZE: usize = 4096;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A RAM image where every byte differs from its neighbours
pub fn patterned_ram(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251) as u8).collect()
}

/// L1: 2 sets, 2 ways, 16 byte blocks. L2: 4 sets, 2 ways, 16 byte blocks
pub fn small_config() -> HierarchyConfig {
    HierarchyConfig::new(CacheGeometry::new(1, 2, 4), CacheGeometry::new(2, 2, 4))
}

pub fn small_simulator() -> Simulator<Vec<u8>> {
    init_logging();
    Simulator::new(&small_config(), patterned_ram(RAM_SIZE)).unwrap()
}

/// Deterministic pseudo random numbers, so replays can be repeated exactly
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    pub fn below(&mut self, bound: u64) -> u64 {
        self.next() % bound
    }
}
