use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Width of a trace address in bits
pub const ADDRESS_BITS: u32 = u32::BITS;

/// Largest supported block offset width, giving 64 KiB blocks
pub const MAX_BLOCK_BITS: u32 = 16;

/// The geometry of a single cache: set index bits, lines per set, and block offset bits
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct CacheGeometry {
    #[serde(alias = "s")]
    pub set_bits: u32,
    #[serde(alias = "E")]
    pub associativity: u32,
    #[serde(alias = "b")]
    pub block_bits: u32,
}

/// A two level configuration. The L1 geometry is shared by the data and instruction caches
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct HierarchyConfig {
    pub l1: CacheGeometry,
    pub l2: CacheGeometry,
}

/// A partially specified configuration, e.g. from a JSON file which is then overridden by command
/// line flags. Turned into a [HierarchyConfig] by [PartialHierarchyConfig::resolve]
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PartialHierarchyConfig {
    #[serde(default)]
    pub l1: PartialGeometry,
    #[serde(default)]
    pub l2: PartialGeometry,
}

#[derive(Debug, Default, Copy, Clone, Deserialize)]
pub struct PartialGeometry {
    #[serde(alias = "s")]
    pub set_bits: Option<u32>,
    #[serde(alias = "E")]
    pub associativity: Option<u32>,
    #[serde(alias = "b")]
    pub block_bits: Option<u32>,
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    #[error("missing cache parameter {name}")]
    MissingParameter { name: &'static str },
    #[error("{cache} must have at least one line per set")]
    ZeroAssociativity { cache: &'static str },
    #[error("{cache} uses {bits} set and block bits, addresses only have {}", ADDRESS_BITS)]
    AddressBitsExceeded { cache: &'static str, bits: u32 },
    #[error("{cache} block offset of {block_bits} bits is larger than the maximum of {}", MAX_BLOCK_BITS)]
    BlockTooLarge { cache: &'static str, block_bits: u32 },
}

impl CacheGeometry {
    pub fn new(set_bits: u32, associativity: u32, block_bits: u32) -> Self {
        Self {
            set_bits,
            associativity,
            block_bits,
        }
    }

    /// S = 2^s
    pub fn num_sets(&self) -> usize {
        1 << self.set_bits
    }

    /// B = 2^b
    pub fn block_size(&self) -> usize {
        1 << self.block_bits
    }

    pub fn line_count(&self) -> usize {
        self.num_sets() * self.associativity as usize
    }

    /// Checks the geometry can be built and addressed, `cache` names it in the error
    pub fn validate(&self, cache: &'static str) -> Result<(), ConfigError> {
        if self.associativity == 0 {
            return Err(ConfigError::ZeroAssociativity { cache });
        }
        if self.block_bits > MAX_BLOCK_BITS {
            return Err(ConfigError::BlockTooLarge { cache, block_bits: self.block_bits });
        }
        let bits = self.set_bits.saturating_add(self.block_bits);
        if bits >= ADDRESS_BITS {
            return Err(ConfigError::AddressBitsExceeded { cache, bits });
        }
        Ok(())
    }
}

impl HierarchyConfig {
    pub fn new(l1: CacheGeometry, l2: CacheGeometry) -> Self {
        Self { l1, l2 }
    }

    /// Validates both levels. L1 is checked first, so it is reported first when both are wrong
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.l1.validate("L1")?;
        self.l2.validate("L2")
    }
}

impl PartialGeometry {
    /// Fields set in `other` replace the ones in `self`
    pub fn overridden_by(self, other: PartialGeometry) -> Self {
        Self {
            set_bits: other.set_bits.or(self.set_bits),
            associativity: other.associativity.or(self.associativity),
            block_bits: other.block_bits.or(self.block_bits),
        }
    }

    fn resolve(self, names: [&'static str; 3]) -> Result<CacheGeometry, ConfigError> {
        let [s, e, b] = names;
        Ok(CacheGeometry {
            set_bits: self.set_bits.ok_or(ConfigError::MissingParameter { name: s })?,
            associativity: self.associativity.ok_or(ConfigError::MissingParameter { name: e })?,
            block_bits: self.block_bits.ok_or(ConfigError::MissingParameter { name: b })?,
        })
    }
}

impl PartialHierarchyConfig {
    pub fn overridden_by(self, other: PartialHierarchyConfig) -> Self {
        Self {
            l1: self.l1.overridden_by(other.l1),
            l2: self.l2.overridden_by(other.l2),
        }
    }

    /// Fills in every parameter and validates the result. Nothing is constructed on failure
    pub fn resolve(self) -> Result<HierarchyConfig, ConfigError> {
        let config = HierarchyConfig {
            l1: self.l1.resolve(["L1s", "L1E", "L1b"])?,
            l2: self.l2.resolve(["L2s", "L2E", "L2b"])?,
        };
        config.validate()?;
        Ok(config)
    }
}
