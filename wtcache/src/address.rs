use crate::config::CacheGeometry;

/// An address split for one particular cache geometry
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DecodedAddress {
    pub tag: u32,
    pub set: usize,
    pub offset: usize,
}

/// Splits addresses into tag, set index and block offset. Each cache owns its own decoder, as
/// L1 and L2 geometries usually differ
///
/// The masks are computed once up front, as decoding happens at least once per access per level
#[derive(Debug, Copy, Clone)]
pub struct AddressDecoder {
    set_selection_bit_mask: u32,
    block_offset_bit_mask: u32,
    block_bits: u32,
    tag_shift: u32,
}

impl AddressDecoder {
    /// Geometry must already be validated, so that `set_bits + block_bits < 32`
    pub fn new(geometry: &CacheGeometry) -> Self {
        Self {
            set_selection_bit_mask: (1 << geometry.set_bits) - 1,
            block_offset_bit_mask: (1 << geometry.block_bits) - 1,
            block_bits: geometry.block_bits,
            tag_shift: geometry.set_bits + geometry.block_bits,
        }
    }

    /// # Examples
    ///
    /// ```
    /// use wtcache::address::AddressDecoder;
    /// use wtcache::config::CacheGeometry;
    /// let decoder = AddressDecoder::new(&CacheGeometry::new(2, 1, 4));
    /// let decoded = decoder.decode(0x1234);
    /// assert_eq!(decoded.tag, 0x48);
    /// assert_eq!(decoded.set, 0x3);
    /// assert_eq!(decoded.offset, 0x4);
    /// ```
    #[inline(always)]
    pub fn decode(&self, address: u32) -> DecodedAddress {
        DecodedAddress {
            tag: address >> self.tag_shift,
            set: ((address >> self.block_bits) & self.set_selection_bit_mask) as usize,
            offset: (address & self.block_offset_bit_mask) as usize,
        }
    }

    /// The first address of the block containing `address`
    pub fn block_start(&self, address: u32) -> u32 {
        address & !self.block_offset_bit_mask
    }
}
