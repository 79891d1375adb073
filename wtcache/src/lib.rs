//! # WtCache
//!
//! WtCache replays recorded memory traces against a two level cache hierarchy: split L1 data and
//! instruction caches in front of a shared L2, backed by a byte addressable RAM image
//!
//! Caches hold real block contents. Both levels are write-through with FIFO replacement, and L1
//! is no-write-allocate, so after a replay the RAM image and every valid cache line agree on the
//! bytes they cover
//!
//! Replay is deterministic: the same trace against the same initial image always gives the same
//! statistics, cache contents and final image

/// Splits addresses into tag, set and block offset for a given geometry
pub mod address;

/// Contains the set associative cache, which stores block data for each line
pub mod cache;

/// Contains the cache geometries and their validation, deserialisable from JSON
pub mod config;

/// Helpers for opening trace files and RAM images
pub mod io;

/// The backing store trait, with block reads and partial write-through
pub mod memory;

/// Formatting for the per-operation log, the run summary and cache dumps
pub mod report;

/// Tag lookup and FIFO victim selection within a set
pub mod resolver;

/// Contains the simulator which drives accesses through the hierarchy
pub mod simulator;

/// Hit, miss and eviction counters, and per-access results
pub mod stats;

/// Decoding of trace records
pub mod trace;

// Generated from the build.rs, private
mod hex {
    include!(concat!(env!("OUT_DIR"), "/hex.rs"));
}
#[cfg(test)]
mod test;
