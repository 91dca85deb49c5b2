use crate::error::PrimitiveError;
use crate::hash::Primitive;

/// Identity "hash": the digest is every byte written, which makes tree shape
/// visible in assertions.
#[derive(Debug, Clone, Default)]
pub(crate) struct Concat(Vec<u8>);

impl Primitive for Concat {
    fn write(&mut self, data: &[u8]) -> Result<(), PrimitiveError> {
        if data.contains(&b'!') {
            return Err(PrimitiveError::new("refusing '!'"));
        }
        self.0.extend_from_slice(data);
        Ok(())
    }

    fn sum(&self, prefix: &[u8]) -> Vec<u8> {
        [prefix, self.0.as_slice()].concat()
    }

    fn reset(&mut self) {
        self.0.clear();
    }

    // variable
    fn size(&self) -> usize {
        0
    }

    fn block_size(&self) -> usize {
        1
    }
}

/// Wraps each group in brackets so nesting shows up in the digest.
#[derive(Debug, Clone, Default)]
pub(crate) struct Bracket(Vec<u8>);

impl Primitive for Bracket {
    fn write(&mut self, data: &[u8]) -> Result<(), PrimitiveError> {
        self.0.extend_from_slice(data);
        Ok(())
    }

    fn sum(&self, prefix: &[u8]) -> Vec<u8> {
        [prefix, b"(".as_slice(), self.0.as_slice(), b")".as_slice()].concat()
    }

    fn reset(&mut self) {
        self.0.clear();
    }

    fn size(&self) -> usize {
        0
    }

    fn block_size(&self) -> usize {
        1
    }
}
