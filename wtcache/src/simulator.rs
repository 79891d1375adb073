use std::io::BufRead;
use std::time::{Duration, Instant};
use log::{info, warn};
use crate::cache::Cache;
use crate::config::{ConfigError, HierarchyConfig};
use crate::memory::BackingStore;
use crate::resolver::Resolution;
use crate::stats::{AccessResult, CacheStats, HierarchyStats};
use crate::trace::{OpKind, TraceOp, TraceReader};

/// Which of the two L1 caches an access goes through
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum L1Kind {
    Data,
    Instruction,
}

/// The result of replaying one trace record
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Outcome {
    Access(AccessResult),
    /// A MODIFY is a load followed by a store, each reported separately
    Modify { load: AccessResult, store: AccessResult },
}

/// Replays memory operations against a split L1 (data and instruction) in front of a shared L2
/// and a backing store, collecting statistics
///
/// Both levels are write-through. L1 is no-write-allocate: a store which misses L1 never
/// allocates a line there, while L2 is always updated, allocating on a miss. Loads always fill
/// L1 on a miss, and fill L2 only when L2 also misses
///
/// It supports calling simulate multiple times, and will update the time taken to simulate and the
/// results accordingly
pub struct Simulator<M: BackingStore> {
    l1d: Cache,
    l1i: Cache,
    l2: Cache,
    memory: M,
    stats: HierarchyStats,
    simulation_time: Duration,
}

/// One route through the hierarchy, an L1 and the shared L2 and memory behind it, along with the
/// counters an access along it updates. The other L1 is only written to, never looked up
struct AccessPath<'a, M: BackingStore> {
    l1: &'a mut Cache,
    l1_stats: &'a mut CacheStats,
    sibling: &'a mut Cache,
    l2: &'a mut Cache,
    l2_stats: &'a mut CacheStats,
    memory: &'a mut M,
}

impl<M: BackingStore> Simulator<M> {
    /// Creates a simulator with empty caches in front of `memory`
    ///
    /// The configuration is validated first; on failure no cache is built
    pub fn new(config: &HierarchyConfig, memory: M) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            l1d: Cache::new("L1D", config.l1),
            l1i: Cache::new("L1I", config.l1),
            l2: Cache::new("L2", config.l2),
            memory,
            stats: HierarchyStats::default(),
            simulation_time: Duration::new(0, 0),
        })
    }

    fn path(&mut self, kind: L1Kind) -> AccessPath<'_, M> {
        let (l1, l1_stats, sibling) = match kind {
            L1Kind::Data => (&mut self.l1d, &mut self.stats.l1d, &mut self.l1i),
            L1Kind::Instruction => (&mut self.l1i, &mut self.stats.l1i, &mut self.l1d),
        };
        AccessPath {
            l1,
            l1_stats,
            sibling,
            l2: &mut self.l2,
            l2_stats: &mut self.stats.l2,
            memory: &mut self.memory,
        }
    }

    /// Reads the block at `address` through the data cache
    pub fn load(&mut self, address: u32) -> AccessResult {
        self.path(L1Kind::Data).load(address)
    }

    /// Fetches the block at `address` through the instruction cache
    pub fn fetch_instruction(&mut self, address: u32) -> AccessResult {
        self.path(L1Kind::Instruction).load(address)
    }

    /// Writes `data` at `address` through the data cache, and through to memory
    pub fn store(&mut self, address: u32, data: &[u8]) -> AccessResult {
        self.path(L1Kind::Data).store(address, data)
    }

    /// A load immediately followed by a store to the same address. The load leaves the block in L1,
    /// so the store phase always hits L1
    pub fn modify(&mut self, address: u32, data: &[u8]) -> (AccessResult, AccessResult) {
        let mut path = self.path(L1Kind::Data);
        let load = path.load(address);
        let store = path.store(address, data);
        (load, store)
    }

    /// Replays a single decoded record
    pub fn execute(&mut self, op: &TraceOp) -> Outcome {
        match op.kind {
            OpKind::Load => Outcome::Access(self.load(op.address)),
            OpKind::Instruction => Outcome::Access(self.fetch_instruction(op.address)),
            OpKind::Store => Outcome::Access(self.store(op.address, &op.data)),
            OpKind::Modify => {
                let (load, store) = self.modify(op.address, &op.data);
                Outcome::Modify { load, store }
            }
        }
    }

    /// Replays every record of a trace in order, calling `observer` after each one
    ///
    /// Lines which can't be decoded are skipped with a warning, and the replay carries on. Records
    /// are processed strictly one at a time, each running to completion
    ///
    /// # Arguments
    ///
    /// * `reader`: The trace text
    /// * `observer`: Receives each record with its outcome, e.g. for per-operation logging
    ///
    /// returns: the accumulated statistics, including any earlier replays
    pub fn simulate<R, F>(&mut self, reader: R, mut observer: F) -> &HierarchyStats
    where
        R: BufRead,
        F: FnMut(&TraceOp, &Outcome),
    {
        let start = Instant::now();
        let mut replayed = 0u64;
        for record in TraceReader::new(reader) {
            match record {
                Ok(op) => {
                    let outcome = self.execute(&op);
                    observer(&op, &outcome);
                    replayed += 1;
                }
                Err(e) => warn!("skipping {e}"),
            }
        }
        let end = Instant::now();
        self.simulation_time += end - start;
        info!("replayed {replayed} operations in {:?}", end - start);
        &self.stats
    }

    pub fn stats(&self) -> &HierarchyStats {
        &self.stats
    }

    pub fn l1d(&self) -> &Cache {
        &self.l1d
    }

    pub fn l1i(&self) -> &Cache {
        &self.l1i
    }

    pub fn l2(&self) -> &Cache {
        &self.l2
    }

    /// The caches in reporting order: L1I, L1D, L2
    pub fn caches(&self) -> [&Cache; 3] {
        [&self.l1i, &self.l1d, &self.l2]
    }

    pub fn memory(&self) -> &M {
        &self.memory
    }

    /// Releases the caches, handing back the backing store
    pub fn into_memory(self) -> M {
        self.memory
    }

    /// Gets the wall-clock execution time for replaying traces
    pub fn get_execution_time(&self) -> &Duration {
        &self.simulation_time
    }

    /// Gets the number of never filled lines for each cache, in reporting order
    pub fn invalid_line_counts(&self) -> [(&'static str, usize); 3] {
        self.caches().map(|cache| (cache.name(), cache.invalid_line_count()))
    }
}

impl<M: BackingStore> AccessPath<'_, M> {
    fn load(&mut self, address: u32) -> AccessResult {
        let mut result = AccessResult::default();
        let l1_lookup = self.l1.lookup(address);
        result.set_l1 = l1_lookup.address.set;
        let l1_victim = match l1_lookup.resolution {
            Resolution::Hit(_) => {
                self.l1_stats.hits += 1;
                result.l1_hit = true;
                return result;
            }
            Resolution::Miss { victim } => victim,
        };
        self.l1_stats.misses += 1;
        result.l1_miss = true;

        let l2_lookup = self.l2.lookup(address);
        result.set_l2 = l2_lookup.address.set;
        match l2_lookup.resolution {
            Resolution::Hit(_) => {
                self.l2_stats.hits += 1;
                result.l2_hit = true;
            }
            Resolution::Miss { victim } => {
                self.l2_stats.misses += 1;
                result.l2_miss = true;
                if self.l2.fill(&l2_lookup, victim, &*self.memory, address) {
                    self.l2_stats.evictions += 1;
                    result.l2_evict = true;
                }
                result.placed_in_l2 = true;
            }
        }

        // L1 is filled on every L1 miss, wherever the block came from
        if self.l1.fill(&l1_lookup, l1_victim, &*self.memory, address) {
            self.l1_stats.evictions += 1;
            result.l1_evict = true;
        }
        result.placed_in_l1 = true;
        result
    }

    fn store(&mut self, address: u32, data: &[u8]) -> AccessResult {
        let mut result = AccessResult::default();
        let l1_lookup = self.l1.lookup(address);
        result.set_l1 = l1_lookup.address.set;
        if l1_lookup.resolution.is_hit() {
            self.l1_stats.hits += 1;
            result.l1_hit = true;
        } else {
            // No write allocate
            self.l1_stats.misses += 1;
            result.l1_miss = true;
        }

        let l2_lookup = self.l2.lookup(address);
        result.set_l2 = l2_lookup.address.set;
        match l2_lookup.resolution {
            Resolution::Hit(_) => {
                self.l2_stats.hits += 1;
                result.l2_hit = true;
            }
            Resolution::Miss { victim } => {
                self.l2_stats.misses += 1;
                result.l2_miss = true;
                if self.l2.fill(&l2_lookup, victim, &*self.memory, address) {
                    self.l2_stats.evictions += 1;
                    result.l2_evict = true;
                }
                result.placed_in_l2 = true;
            }
        }

        // Every resident copy of the written bytes is updated, including the blocks after the
        // containing one and anything the other L1 holds, so no valid line goes stale
        self.l1.write_resident(address, data);
        self.l2.write_resident(address, data);
        self.sibling.write_resident(address, data);

        self.memory.write_through(address, data, self.l1.block_size());
        result.wrote_to_ram = true;
        result
    }
}
