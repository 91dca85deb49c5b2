//! Tree shape: height, branching factor and leaf block size.

use crate::error::ConfigError;

/// Height used by [`TreeConfig::default`].
pub const DEFAULT_HEIGHT: usize = 3;

/// Branching factor used by [`TreeConfig::default`].
pub const DEFAULT_BRANCHING: usize = 2;

/// Leaf block size in bytes used by [`TreeConfig::default`].
pub const DEFAULT_BLOCK_SIZE: usize = 32;

/// Immutable shape of one tree instance.
///
/// A tree of height `H` runs `H - 1` reducer levels and holds at most
/// `B^(H-1)` leaf blocks, where `B` is the branching factor.
///
/// ```
/// use merkletree::TreeConfig;
///
/// let config = TreeConfig::default().with_height(4).with_branching(3);
/// assert_eq!(config.capacity_leaves(), 27);
/// assert_eq!(config.capacity_bytes(), 27 * 32);
///
/// let sized = TreeConfig::for_input_len(1_000, 2, 32);
/// assert_eq!(sized.height(), 6); // 32 leaves
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TreeConfig {
    height: usize,
    branching: usize,
    block_size: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        TreeConfig {
            height: DEFAULT_HEIGHT,
            branching: DEFAULT_BRANCHING,
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }
}

impl TreeConfig {
    pub const fn new(height: usize, branching: usize, block_size: usize) -> Self {
        TreeConfig {
            height,
            branching,
            block_size,
        }
    }

    /// Smallest config with the given branching factor and block size able to
    /// hold `len` bytes. Empty input still gets one leaf's worth of height.
    pub fn for_input_len(len: u64, branching: usize, block_size: usize) -> Self {
        let leaves = len.div_ceil(block_size.max(1) as u64).max(1);
        TreeConfig {
            height: Self::height_for_leaves(branching, leaves),
            branching,
            block_size,
        }
    }

    /// Smallest height whose capacity `branching^(height-1)` covers `leaves`.
    pub fn height_for_leaves(branching: usize, leaves: u64) -> usize {
        let branching = branching.max(2) as u64;
        let mut height = 1;
        let mut capacity: u64 = 1;
        while capacity < leaves {
            capacity = capacity.saturating_mul(branching);
            height += 1;
        }
        height
    }

    pub fn with_height(mut self, height: usize) -> Self {
        self.height = height;
        self
    }

    pub fn with_branching(mut self, branching: usize) -> Self {
        self.branching = branching;
        self
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn branching(&self) -> usize {
        self.branching
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of reducer workers the pipeline runs.
    pub fn levels(&self) -> usize {
        self.height.saturating_sub(1)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.height < 1 {
            return Err(ConfigError::InvalidHeight(self.height));
        }
        if self.branching < 2 {
            return Err(ConfigError::InvalidBranching(self.branching));
        }
        if self.block_size == 0 {
            return Err(ConfigError::InvalidBlockSize);
        }
        Ok(())
    }

    /// Maximum number of leaf blocks, saturating at `u64::MAX`.
    pub fn capacity_leaves(&self) -> u64 {
        u32::try_from(self.levels())
            .ok()
            .and_then(|exp| (self.branching as u64).checked_pow(exp))
            .unwrap_or(u64::MAX)
    }

    /// Maximum number of input bytes, saturating at `u64::MAX`.
    pub fn capacity_bytes(&self) -> u64 {
        self.capacity_leaves()
            .saturating_mul(self.block_size as u64)
    }
}
