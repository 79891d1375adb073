use std::fmt;
use crate::cache::Cache;
use crate::simulator::Outcome;
use crate::stats::{AccessResult, CacheStats, HierarchyStats};
use crate::trace::{OpKind, TraceOp};

/// The log entry for one replayed record:
///
/// ```text
/// L 10, 1
///   L1D miss, L2 miss
///   Place in L1D
/// ```
///
/// MODIFY reports the lookups of its load phase and the action of its store phase
pub struct OperationReport<'a> {
    pub op: &'a TraceOp,
    pub outcome: &'a Outcome,
}

/// The three run-end summary lines, in L1I, L1D, L2 order
pub struct Summary<'a>(pub &'a HierarchyStats);

/// A full dump of a cache's lines, including block contents
pub struct CacheDump<'a>(pub &'a Cache);

impl fmt::Display for OperationReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let l1_name = match self.op.kind {
            OpKind::Instruction => "L1I",
            _ => "L1D",
        };
        let (lookups, action) = match self.outcome {
            Outcome::Access(result) if self.op.kind.writes() => (result, store_action(result)),
            Outcome::Access(result) => (result, placement(result, l1_name)),
            Outcome::Modify { load, store } => (load, store_action(store)),
        };
        write!(f, "{}", self.op)?;
        if lookups.l1_hit || lookups.l1_miss {
            let verdict = if lookups.l1_hit { "hit" } else { "miss" };
            write!(f, "\n  {l1_name} {verdict}")?;
            if lookups.consulted_l2() {
                write!(f, ", L2 {}", if lookups.l2_hit { "hit" } else { "miss" })?;
            }
        }
        if let Some(action) = action {
            write!(f, "\n  {action}")?;
        }
        Ok(())
    }
}

fn placement(result: &AccessResult, l1_name: &str) -> Option<String> {
    if result.placed_in_l1 {
        Some(format!("Place in {l1_name}"))
    } else if result.placed_in_l2 {
        Some("Place in L2".to_string())
    } else {
        None
    }
}

fn store_action(result: &AccessResult) -> Option<String> {
    let action = if result.l1_hit && result.l2_hit && result.wrote_to_ram {
        "Store in L1D, L2, RAM"
    } else if result.l2_hit && result.wrote_to_ram {
        "Store in L2, RAM"
    } else if result.wrote_to_ram {
        "Store in RAM"
    } else {
        return None;
    };
    Some(action.to_string())
}

fn write_stats(f: &mut fmt::Formatter<'_>, name: &str, stats: &CacheStats) -> fmt::Result {
    write!(f, "{name}-hits:{} {name}-misses:{} {name}-evictions:{}", stats.hits, stats.misses, stats.evictions)
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_stats(f, "L1I", &self.0.l1i)?;
        writeln!(f)?;
        write_stats(f, "L1D", &self.0.l1d)?;
        writeln!(f)?;
        write_stats(f, "L2", &self.0.l2)
    }
}

impl fmt::Display for CacheDump<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cache = self.0;
        for (set, lines) in cache.sets().enumerate() {
            writeln!(f, "Set {set}:")?;
            for (way, line) in lines.iter().enumerate() {
                if !line.valid {
                    writeln!(f, "  Line {way}: Valid=0, Tag=-")?;
                    continue;
                }
                write!(f, "  Line {way}: Valid=1, Tag={:#x}, Time={}, Data=", line.tag, line.fifo_sequence)?;
                for byte in cache.block(set, way) {
                    write!(f, "{byte:02x}")?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}
