//! Splits the incoming byte stream into fixed-size leaf blocks.

use std::marker::PhantomData;
use std::slice::ChunksExact;

use crate::error::PrimitiveError;
use crate::hash::Primitive;

/// Leftover-byte cache plus leaf hashing.
///
/// Grouping follows the cumulative byte position, so the leaves produced do
/// not depend on how the stream was cut into calls.
#[derive(Debug)]
pub(crate) struct Segmenter<P> {
    cache: Vec<u8>,
    block_size: usize,
    _primitive: PhantomData<fn() -> P>,
}

impl<P: Primitive> Segmenter<P> {
    pub(crate) fn new(block_size: usize) -> Self {
        Segmenter {
            cache: Vec::with_capacity(block_size),
            block_size,
            _primitive: PhantomData,
        }
    }

    /// Takes `data` in and returns its complete leaf blocks, hashed lazily.
    ///
    /// Only the block that straddles the cache is hashed here, before the
    /// cache is touched, so an error from this call leaves the cache exactly
    /// as it was. Once `Ok` is returned the cache already holds the new
    /// remainder; the leaves are hashed one by one as the iterator is pulled.
    pub(crate) fn split<'a>(
        &mut self,
        data: &'a [u8],
    ) -> Result<Leaves<'a, P>, PrimitiveError> {
        let cached = self.cache.len();
        if cached + data.len() < self.block_size {
            self.cache.extend_from_slice(data);
            return Ok(Leaves::new(None, &[], self.block_size));
        }

        let (first, data) = if cached > 0 {
            let (head, tail) = data.split_at(self.block_size - cached);
            let mut hasher = P::default();
            hasher.write(&self.cache)?;
            hasher.write(head)?;
            (Some(hasher.sum(&[])), tail)
        } else {
            (None, data)
        };

        let full = data.len() - data.len() % self.block_size;
        self.cache.clear();
        self.cache.extend_from_slice(&data[full..]);
        debug_assert!(self.cache.len() < self.block_size);

        Ok(Leaves::new(first, &data[..full], self.block_size))
    }

    /// Hashes whatever is cached as a final short leaf.
    pub(crate) fn drain(&mut self) -> Result<Option<Vec<u8>>, PrimitiveError> {
        if self.cache.is_empty() {
            return Ok(None);
        }
        let leaf = P::digest(&self.cache)?;
        self.cache.clear();
        Ok(Some(leaf))
    }

    pub(crate) fn clear(&mut self) {
        self.cache.clear();
    }

    pub(crate) fn cached(&self) -> usize {
        self.cache.len()
    }
}

/// Leaf digests of one `write`, computed on demand.
pub(crate) struct Leaves<'a, P> {
    first: Option<Vec<u8>>,
    blocks: ChunksExact<'a, u8>,
    _primitive: PhantomData<fn() -> P>,
}

impl<'a, P: Primitive> Leaves<'a, P> {
    fn new(first: Option<Vec<u8>>, blocks: &'a [u8], block_size: usize) -> Self {
        Leaves {
            first,
            blocks: blocks.chunks_exact(block_size),
            _primitive: PhantomData,
        }
    }
}

impl<P: Primitive> Iterator for Leaves<'_, P> {
    type Item = Result<Vec<u8>, PrimitiveError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(first) = self.first.take() {
            return Some(Ok(first));
        }
        self.blocks.next().map(P::digest)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.blocks.len() + usize::from(self.first.is_some());
        (len, Some(len))
    }
}
