use std::fmt;
use std::io;
use std::mem;

use tracing::debug;

use crate::config::TreeConfig;
use crate::error::{Result, TreeError};
use crate::hash::Primitive;
use crate::pipeline::Pipeline;
use crate::segment::Segmenter;
use crate::token::Token;

enum State {
    Running(Pipeline),
    Closed,
}

/// Incremental Merkle digest computed by a pipeline of per-level workers.
///
/// Bytes go in through [`write`](Self::write) (or [`io::Write`]), are cut into
/// `block_size` leaves, and every leaf digest travels up `height - 1` reducer
/// threads that combine `branching` children into one parent. Memory stays
/// bounded by the height of the tree regardless of input length.
///
/// [`sum`](Self::sum) finalizes: it rolls up every pending group and returns
/// the root. Calling `sum` again returns the same root; writing after `sum`
/// fails with [`TreeError::Finalized`] until the tree is [`reset`](Self::reset).
///
/// # Examples
///
/// ```
/// # #[cfg(feature = "sha2")]
/// # {
/// use merkletree::{MerkleTree, TreeConfig, hash::Sha256};
///
/// let config = TreeConfig::for_input_len(1_000, 4, 64);
/// let mut tree = MerkleTree::<Sha256>::with_config(config)?;
///
/// for chunk in vec![7u8; 1_000].chunks(100) {
///     tree.write(chunk)?;
/// }
/// let root = tree.sum(&[])?;
/// assert_eq!(root.len(), tree.size());
///
/// tree.reset()?;
/// tree.write(&[7u8; 1_000])?;
/// assert_eq!(tree.sum(&[])?, root);
/// tree.close()?;
/// # }
/// # Ok::<(), merkletree::TreeError>(())
/// ```
pub struct MerkleTree<P: Primitive> {
    config: TreeConfig,
    state: State,
    segmenter: Segmenter<P>,
    written: u64,
    root: Option<Vec<u8>>,
}

impl<P: Primitive> MerkleTree<P> {
    /// Starts a tree with [`TreeConfig::default`].
    pub fn new() -> Result<Self> {
        Self::with_config(TreeConfig::default())
    }

    /// Validates `config` and spawns its workers.
    pub fn with_config(config: TreeConfig) -> Result<Self> {
        config.validate()?;
        let pipeline = Pipeline::start::<P>(&config)?;
        Ok(MerkleTree {
            config,
            state: State::Running(pipeline),
            segmenter: Segmenter::new(config.block_size()),
            written: 0,
            root: None,
        })
    }

    /// Feeds `data` into the tree, returning the number of bytes accepted.
    ///
    /// Leaves are hashed and sent one at a time, blocking only while the
    /// first level is busy. A failure on the block that completes the
    /// leftover cache leaves the tree untouched; a failure on any later block
    /// closes it.
    pub fn write(&mut self, data: &[u8]) -> Result<usize> {
        if self.is_closed() {
            return Err(TreeError::Closed);
        }
        if self.root.is_some() {
            return Err(TreeError::Finalized);
        }
        if data.is_empty() {
            return Ok(0);
        }

        let capacity = self.config.capacity_bytes();
        let attempted = self.written.saturating_add(data.len() as u64);
        if attempted > capacity {
            return Err(TreeError::CapacityExceeded {
                attempted,
                capacity,
            });
        }

        let leaves = self.segmenter.split(data)?;
        self.written = attempted;
        for leaf in leaves {
            match leaf {
                Ok(leaf) => self.send(Token::Data(leaf))?,
                Err(e) => return Err(self.fail(e.into())),
            }
        }
        Ok(data.len())
    }

    /// Returns `prefix` followed by the root digest of everything written.
    ///
    /// The first call emits the leftover bytes as a final short leaf and
    /// flushes every level; later calls return the cached root.
    pub fn sum(&mut self, prefix: &[u8]) -> Result<Vec<u8>> {
        if self.is_closed() {
            return Err(TreeError::Closed);
        }

        let root = match self.root.clone() {
            Some(root) => root,
            None => {
                let root = self.finalize()?;
                self.root = Some(root.clone());
                root
            }
        };

        let mut out = Vec::with_capacity(prefix.len() + root.len());
        out.extend_from_slice(prefix);
        out.extend_from_slice(&root);
        Ok(out)
    }

    fn finalize(&mut self) -> Result<Vec<u8>> {
        if let Some(leaf) = self.segmenter.drain()? {
            self.send(Token::Data(leaf))?;
        }

        let flushed = match &self.state {
            State::Running(pipeline) => pipeline.flush(),
            State::Closed => return Err(TreeError::Closed),
        };
        match flushed {
            Ok(Some(root)) => Ok(root),
            Ok(None) => Ok(P::default().sum(&[])),
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Shuts the workers down. Further writes and sums fail with
    /// [`TreeError::Closed`].
    pub fn close(&mut self) -> Result<()> {
        match mem::replace(&mut self.state, State::Closed) {
            State::Running(pipeline) => {
                self.segmenter.clear();
                debug!(written = self.written, "closing tree");
                pipeline.close()
            }
            State::Closed => Err(TreeError::Closed),
        }
    }

    /// Discards all history and starts a fresh pipeline with the same config.
    pub fn reset(&mut self) -> Result<()> {
        if !self.is_closed() {
            self.close()?;
        }
        self.state = State::Running(Pipeline::start::<P>(&self.config)?);
        self.segmenter.clear();
        self.written = 0;
        self.root = None;
        Ok(())
    }

    /// Digest length in bytes.
    pub fn size(&self) -> usize {
        P::default().size()
    }

    /// Leaf block size. Any write size is correct; multiples of this are
    /// cheapest.
    pub fn block_size(&self) -> usize {
        self.config.block_size()
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Bytes accepted since construction or the last reset.
    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.state, State::Closed)
    }

    fn send(&mut self, token: Token) -> Result<()> {
        let sent = match &self.state {
            State::Running(pipeline) => pipeline.send(token),
            State::Closed => return Err(TreeError::Closed),
        };
        sent.map_err(|e| self.fail(e))
    }

    /// A broken pipeline closes the tree; the worker's own error, if it left
    /// one, is more useful than the disconnect that revealed it.
    fn fail(&mut self, err: TreeError) -> TreeError {
        self.segmenter.clear();
        match mem::replace(&mut self.state, State::Closed) {
            State::Running(pipeline) => pipeline.abort().err().unwrap_or(err),
            State::Closed => err,
        }
    }
}

impl<P: Primitive> io::Write for MerkleTree<P> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        MerkleTree::write(self, buf).map_err(io::Error::from)
    }

    // Tree flushing is `sum`; there is nothing buffered for io to push.
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<P: Primitive> Drop for MerkleTree<P> {
    fn drop(&mut self) {
        if let State::Running(pipeline) = mem::replace(&mut self.state, State::Closed) {
            if let Err(e) = pipeline.close() {
                debug!(error = %e, "close on drop failed");
            }
        }
    }
}

impl<P: Primitive> fmt::Debug for MerkleTree<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MerkleTree")
            .field("config", &self.config)
            .field("closed", &self.is_closed())
            .field("written", &self.written)
            .field("cached", &self.segmenter.cached())
            .field("finalized", &self.root.is_some())
            .finish()
    }
}
