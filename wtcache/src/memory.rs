use log::warn;
use memmap2::MmapMut;

/// Main memory behind the cache hierarchy: a flat, byte addressable image
///
/// Implementors only expose their bytes, block alignment and partial writes are provided. The
/// image is assumed to cover every address a trace touches. Bytes past its end read as zero and
/// writes to them are dropped, with a warning, rather than panicking
pub trait BackingStore {
    fn bytes(&self) -> &[u8];

    fn bytes_mut(&mut self) -> &mut [u8];

    /// Fills `block` with the block containing `address`. The block size is `block.len()`, which
    /// must be a power of two
    fn read_block(&self, address: u32, block: &mut [u8]) {
        debug_assert!(block.len().is_power_of_two());
        let block_start = address as usize & !(block.len() - 1);
        copy_out(self.bytes(), block_start, block);
    }

    /// Writes `data` at `address` without disturbing any other byte of the containing block
    ///
    /// The containing block (of `block_size` bytes) is read, the written range replaced, and the
    /// whole block written back. A write running past the end of the block extends the span to
    /// cover it, so the image always holds `data` at `address` afterwards
    fn write_through(&mut self, address: u32, data: &[u8], block_size: usize) {
        debug_assert!(block_size.is_power_of_two());
        let block_start = address as usize & !(block_size - 1);
        let offset = address as usize - block_start;
        let span = block_size.max(offset + data.len());
        let mut block = vec![0u8; span];
        copy_out(self.bytes(), block_start, &mut block);
        block[offset..offset + data.len()].copy_from_slice(data);
        copy_in(self.bytes_mut(), block_start, &block);
    }
}

fn copy_out(image: &[u8], start: usize, out: &mut [u8]) {
    let available = image.len().saturating_sub(start).min(out.len());
    if available < out.len() {
        warn!("read of {} bytes at {start:#x} runs past the end of memory ({:#x} bytes)", out.len(), image.len());
        out[available..].fill(0);
    }
    if available > 0 {
        out[..available].copy_from_slice(&image[start..start + available]);
    }
}

fn copy_in(image: &mut [u8], start: usize, data: &[u8]) {
    let available = image.len().saturating_sub(start).min(data.len());
    if available < data.len() {
        warn!("write of {} bytes at {start:#x} runs past the end of memory ({:#x} bytes)", data.len(), image.len());
    }
    if available > 0 {
        image[start..start + available].copy_from_slice(&data[..available]);
    }
}

/// An in memory image, used for tests and benchmarks
impl BackingStore for Vec<u8> {
    fn bytes(&self) -> &[u8] {
        self
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        self
    }
}

/// A memory mapped RAM image. Writes land in the file once the map is flushed or dropped
impl BackingStore for MmapMut {
    fn bytes(&self) -> &[u8] {
        self
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        self
    }
}
