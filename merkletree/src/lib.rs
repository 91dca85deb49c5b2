//! Pipelined k-ary Merkle tree digest.
//!
//! Computes one root digest over an arbitrarily long byte stream without
//! materializing the tree. Input is cut into fixed-size leaf blocks; each
//! internal tree level runs on its own thread and combines `branching` child
//! digests into a parent, passing it up over a rendezvous channel. Memory is
//! bounded by the tree height, not the input length.
//!
//! ```text
//!   write ──► [segmenter] ──ch0──► level 0 ──ch1──► … ──► level H-2 ──root──► sum
//! ```
//!
//! The root is a pure function of the bytes, the [`TreeConfig`] and the
//! [`Primitive`](hash::Primitive): how the input is split across `write`
//! calls never matters.
//!
//! ```rust
//! # #[cfg(feature = "sha2")]
//! # {
//! use merkletree::{MerkleTree, TreeConfig, hash::Sha256};
//!
//! let config = TreeConfig::new(3, 2, 4);
//!
//! let mut bulk = MerkleTree::<Sha256>::with_config(config)?;
//! bulk.write(b"aaaabbbbcccc")?;
//!
//! let mut bytewise = MerkleTree::<Sha256>::with_config(config)?;
//! for byte in b"aaaabbbbcccc" {
//!     bytewise.write(&[*byte])?;
//! }
//!
//! assert_eq!(bulk.sum(&[])?, bytewise.sum(&[])?);
//! # }
//! # Ok::<(), merkletree::TreeError>(())
//! ```

pub mod config;
pub mod error;
pub mod hash;
pub mod sequential;

mod level;
mod pipeline;
mod segment;
mod token;
mod tree;

#[cfg(test)]
mod testing;

pub use config::TreeConfig;
pub use error::{ConfigError, PrimitiveError, Result, TreeError};
pub use hash::Primitive;
pub use tree::MerkleTree;
