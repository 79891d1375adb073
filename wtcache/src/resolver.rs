/// Metadata for a single cache line. The block bytes live in the owning cache's arena
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct LineMetadata {
    pub valid: bool,
    pub tag: u32,
    /// Value of the cache's fill counter when this line was last filled
    pub fifo_sequence: u64,
}

/// The outcome of looking up a tag within a set. Indices are ways within the set
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Resolution {
    Hit(usize),
    Miss { victim: usize },
}

impl Resolution {
    pub fn is_hit(&self) -> bool {
        matches!(self, Resolution::Hit(_))
    }
}

/// Looks up `tag` within the lines of one set, choosing a FIFO victim on a miss
///
/// Lines are scanned in way order. The first invalid line ends the scan and becomes the victim,
/// so a lower sequence valid line before it is never considered. Only when every line is valid
/// does the victim become the line with the smallest fill sequence. Hits don't update anything,
/// a line is evicted in the order it was filled regardless of how often it is read
///
/// Lines are filled into the first invalid way and never invalidated, so invalid lines always
/// trail the valid ones and a hit can't hide behind an invalid line
///
/// # Examples
///
/// ```
/// use wtcache::resolver::{resolve, LineMetadata, Resolution};
/// let set = [
///     LineMetadata { valid: true, tag: 7, fifo_sequence: 3 },
///     LineMetadata { valid: true, tag: 9, fifo_sequence: 1 },
/// ];
/// assert_eq!(resolve(&set, 7), Resolution::Hit(0));
/// assert_eq!(resolve(&set, 5), Resolution::Miss { victim: 1 });
/// ```
pub fn resolve(set: &[LineMetadata], tag: u32) -> Resolution {
    let mut oldest = 0;
    let mut oldest_sequence = u64::MAX;
    for (way, line) in set.iter().enumerate() {
        if !line.valid {
            return Resolution::Miss { victim: way };
        }
        if line.tag == tag {
            return Resolution::Hit(way);
        }
        if line.fifo_sequence < oldest_sequence {
            oldest_sequence = line.fifo_sequence;
            oldest = way;
        }
    }
    Resolution::Miss { victim: oldest }
}
