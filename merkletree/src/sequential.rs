//! Single-threaded reduction over an in-memory slice.
//!
//! Produces the same root as [`MerkleTree`](crate::MerkleTree) for the same
//! config and primitive, without spawning any threads or storing tree nodes.
//! Useful for small inputs and for cross-checking the pipeline.

use crate::config::TreeConfig;
use crate::error::{Result, TreeError};
use crate::hash::Primitive;
use crate::level::Level;

/// Compute the root digest of `data` for `config`.
///
/// ```
/// # #[cfg(feature = "sha2")]
/// # {
/// use merkletree::{MerkleTree, TreeConfig, hash::Sha256, sequential};
///
/// let config = TreeConfig::new(4, 2, 8);
/// let data = b"the quick brown fox jumps over the lazy dog";
///
/// let mut tree = MerkleTree::<Sha256>::with_config(config)?;
/// tree.write(data)?;
///
/// assert_eq!(sequential::root::<Sha256>(data, &config)?, tree.sum(&[])?);
/// # }
/// # Ok::<(), merkletree::TreeError>(())
/// ```
pub fn root<P: Primitive>(data: &[u8], config: &TreeConfig) -> Result<Vec<u8>> {
    config.validate()?;

    let capacity = config.capacity_bytes();
    if data.len() as u64 > capacity {
        return Err(TreeError::CapacityExceeded {
            attempted: data.len() as u64,
            capacity,
        });
    }

    let mut levels: Vec<Level<P>> = (0..config.levels())
        .map(|index| Level::new(index, config.branching()))
        .collect();
    let mut root = None;

    // --- Leaf hashing ---
    for chunk in data.chunks(config.block_size()) {
        carry(&mut levels, 0, P::digest(chunk)?, &mut root)?;
    }

    // --- Fold remaining groups, bottom up ---
    for depth in 0..levels.len() {
        if let Some(parent) = levels[depth].flush() {
            carry(&mut levels, depth + 1, parent, &mut root)?;
        }
    }

    Ok(root.unwrap_or_else(|| P::default().sum(&[])))
}

/// Pushes `digest` into level `depth`, carrying completed groups upward.
fn carry<P: Primitive>(
    levels: &mut [Level<P>],
    mut depth: usize,
    mut digest: Vec<u8>,
    root: &mut Option<Vec<u8>>,
) -> Result<()> {
    loop {
        if depth == levels.len() {
            if root.is_some() {
                return Err(TreeError::UnexpectedToken("data"));
            }
            *root = Some(digest);
            return Ok(());
        }

        match levels[depth].push(&digest)? {
            Some(parent) => {
                digest = parent;
                depth += 1;
            }
            None => return Ok(()),
        }
    }
}
