use log::{debug, trace};
use crate::address::{AddressDecoder, DecodedAddress};
use crate::config::CacheGeometry;
use crate::memory::BackingStore;
use crate::resolver::{resolve, LineMetadata, Resolution};

/// A set associative cache holding real block data, with FIFO replacement
///
/// Lines are stored flat, set by set, so the lines of set `n` are the `E` entries starting at
/// `n * E`. Block bytes live in a single arena laid out in the same order, each line owning the
/// `B` bytes at its index. Nothing is allocated after construction
///
/// The fill counter is shared by every set in the cache, so fill sequences are unique across the
/// whole cache and never reused
#[derive(Debug)]
pub struct Cache {
    name: &'static str,
    geometry: CacheGeometry,
    decoder: AddressDecoder,
    lines: Vec<LineMetadata>,
    blocks: Vec<u8>,
    fill_counter: u64,
}

/// Result of looking an address up in a cache
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Lookup {
    pub address: DecodedAddress,
    pub resolution: Resolution,
}

impl Cache {
    /// Creates an empty cache, every line invalid. The geometry must already be validated
    pub fn new(name: &'static str, geometry: CacheGeometry) -> Self {
        let line_count = geometry.line_count();
        Self {
            name,
            geometry,
            decoder: AddressDecoder::new(&geometry),
            lines: vec![LineMetadata::default(); line_count],
            blocks: vec![0; line_count * geometry.block_size()],
            fill_counter: 0,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn geometry(&self) -> &CacheGeometry {
        &self.geometry
    }

    pub fn block_size(&self) -> usize {
        self.geometry.block_size()
    }

    pub fn decode(&self, address: u32) -> DecodedAddress {
        self.decoder.decode(address)
    }

    /// Decodes the address and resolves it within its set. Doesn't modify the cache
    pub fn lookup(&self, address: u32) -> Lookup {
        let decoded = self.decoder.decode(address);
        let resolution = resolve(self.set(decoded.set), decoded.tag);
        trace!("{} lookup {address:#x}: set {} tag {:#x} -> {resolution:?}", self.name, decoded.set, decoded.tag);
        Lookup {
            address: decoded,
            resolution,
        }
    }

    /// The lines of a set, in way order
    pub fn set(&self, set: usize) -> &[LineMetadata] {
        let associativity = self.geometry.associativity as usize;
        let set_inclusive_lower_bound = set * associativity;
        &self.lines[set_inclusive_lower_bound..set_inclusive_lower_bound + associativity]
    }

    pub fn line(&self, set: usize, way: usize) -> &LineMetadata {
        &self.lines[self.line_index(set, way)]
    }

    pub fn block(&self, set: usize, way: usize) -> &[u8] {
        let start = self.line_index(set, way) * self.block_size();
        &self.blocks[start..start + self.block_size()]
    }

    fn block_mut(&mut self, set: usize, way: usize) -> &mut [u8] {
        let block_size = self.block_size();
        let start = self.line_index(set, way) * block_size;
        &mut self.blocks[start..start + block_size]
    }

    fn line_index(&self, set: usize, way: usize) -> usize {
        debug_assert!(way < self.geometry.associativity as usize);
        set * self.geometry.associativity as usize + way
    }

    /// Fills a line with the block containing `address` read from `memory`, stamping it with the
    /// next fill sequence
    ///
    /// Returns true if a valid line was evicted to make room
    pub fn fill<M: BackingStore + ?Sized>(&mut self, lookup: &Lookup, way: usize, memory: &M, address: u32) -> bool {
        let DecodedAddress { set, tag, .. } = lookup.address;
        let index = self.line_index(set, way);
        let previous = self.lines[index];
        let sequence = self.fill_counter;
        self.fill_counter += 1;
        self.lines[index] = LineMetadata {
            valid: true,
            tag,
            fifo_sequence: sequence,
        };
        memory.read_block(address, self.block_mut(set, way));
        if previous.valid {
            debug!("{} evicted tag {:#x} (filled at {}) from set {set} way {way}", self.name, previous.tag, previous.fifo_sequence);
        }
        debug!("{} filled set {set} way {way} with tag {tag:#x} at {sequence}", self.name);
        previous.valid
    }

    /// Overwrites bytes of a line's block starting at `offset`
    ///
    /// Bytes which would run past the end of the block are not part of this line, so they are
    /// dropped. Returns the number of bytes written
    pub fn write_bytes(&mut self, set: usize, way: usize, offset: usize, data: &[u8]) -> usize {
        let block = self.block_mut(set, way);
        let len = data.len().min(block.len() - offset);
        block[offset..offset + len].copy_from_slice(&data[..len]);
        len
    }

    /// Copies `data` into every valid line holding part of `address..address + data.len()`, which
    /// may span several blocks. Nothing is allocated and replacement state is untouched
    ///
    /// Returns the number of lines updated
    pub fn write_resident(&mut self, address: u32, data: &[u8]) -> usize {
        let mut updated = 0;
        let mut written = 0;
        while written < data.len() {
            // Bytes past the top of the address space don't exist
            let Some(current) = u32::try_from(written).ok().and_then(|w| address.checked_add(w)) else {
                break;
            };
            let decoded = self.decoder.decode(current);
            let len = (self.block_size() - decoded.offset).min(data.len() - written);
            if let Resolution::Hit(way) = resolve(self.set(decoded.set), decoded.tag) {
                self.write_bytes(decoded.set, way, decoded.offset, &data[written..written + len]);
                trace!("{} updated {len} resident bytes at {current:#x}", self.name);
                updated += 1;
            }
            written += len;
        }
        updated
    }

    /// Number of lines which have never been filled. Useful for analysing cache performance or
    /// debugging
    pub fn invalid_line_count(&self) -> usize {
        self.lines.iter().filter(|line| !line.valid).count()
    }

    /// Iterates over every set in index order
    pub fn sets(&self) -> impl Iterator<Item = &[LineMetadata]> {
        self.lines.chunks(self.geometry.associativity as usize)
    }

    /// The next fill sequence which will be handed out
    pub fn fill_counter(&self) -> u64 {
        self.fill_counter
    }
}
