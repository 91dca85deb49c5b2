//! Hash primitives the tree is built from.
//!
//! A tree never shares a primitive between levels: every leaf and every
//! reduction group gets its own instance, created through [`Default`].

use crate::error::PrimitiveError;

/// A resettable cryptographic hash.
///
/// Implementations must be deterministic: the same bytes written after a
/// [`reset`](Primitive::reset) (or into a fresh [`Default`] instance) must
/// always produce the same digest.
pub trait Primitive: Default + Send + 'static {
    /// Absorbs `data` into the running state.
    fn write(&mut self, data: &[u8]) -> Result<(), PrimitiveError>;

    /// Returns `prefix` followed by the digest of everything written so far.
    /// Does not change the running state.
    fn sum(&self, prefix: &[u8]) -> Vec<u8>;

    /// Clears the running state.
    fn reset(&mut self);

    /// Digest length in bytes.
    fn size(&self) -> usize;

    /// Internal block size of the hash function in bytes.
    fn block_size(&self) -> usize;

    /// One-shot digest of `data` using a fresh instance.
    fn digest(data: &[u8]) -> Result<Vec<u8>, PrimitiveError> {
        let mut hasher = Self::default();
        hasher.write(data)?;
        Ok(hasher.sum(&[]))
    }
}

fn with_prefix(prefix: &[u8], digest: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(prefix.len() + digest.len());
    out.extend_from_slice(prefix);
    out.extend_from_slice(digest);
    out
}

macro_rules! sha2_primitive {
    ($name:ident, $inner:ty, $block:expr, $doc:literal) => {
        #[doc = $doc]
        #[cfg(feature = "sha2")]
        #[derive(Clone, Default)]
        pub struct $name($inner);

        #[cfg(feature = "sha2")]
        impl Primitive for $name {
            #[inline]
            fn write(&mut self, data: &[u8]) -> Result<(), PrimitiveError> {
                sha2::Digest::update(&mut self.0, data);
                Ok(())
            }

            fn sum(&self, prefix: &[u8]) -> Vec<u8> {
                with_prefix(prefix, &sha2::Digest::finalize(self.0.clone()))
            }

            fn reset(&mut self) {
                sha2::Digest::reset(&mut self.0);
            }

            fn size(&self) -> usize {
                <$inner as sha2::Digest>::output_size()
            }

            fn block_size(&self) -> usize {
                $block
            }
        }

        #[cfg(feature = "sha2")]
        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(stringify!($name))
            }
        }
    };
}

sha2_primitive!(Sha256, sha2::Sha256, 64, "SHA-256 (32-byte digests).");
sha2_primitive!(Sha512, sha2::Sha512, 128, "SHA-512 (64-byte digests).");

/// BLAKE3 in its default hashing mode (32-byte digests).
#[cfg(feature = "blake3")]
#[derive(Clone, Default)]
pub struct Blake3(blake3::Hasher);

#[cfg(feature = "blake3")]
impl Primitive for Blake3 {
    #[inline]
    fn write(&mut self, data: &[u8]) -> Result<(), PrimitiveError> {
        self.0.update(data);
        Ok(())
    }

    fn sum(&self, prefix: &[u8]) -> Vec<u8> {
        with_prefix(prefix, self.0.finalize().as_bytes())
    }

    fn reset(&mut self) {
        self.0.reset();
    }

    fn size(&self) -> usize {
        blake3::OUT_LEN
    }

    fn block_size(&self) -> usize {
        blake3::BLOCK_LEN
    }
}

#[cfg(feature = "blake3")]
impl std::fmt::Debug for Blake3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Blake3")
    }
}
