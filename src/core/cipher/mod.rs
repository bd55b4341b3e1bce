use anyhow::Result;
use generic_array::{typenum::Unsigned, ArrayLength, GenericArray};

pub(crate) mod aes;

/// Keyed block cipher, as the engine consumes it.
///
/// The engine asks for exactly two things: a fixed block width and in-place
/// encryption of one block under the already-bound key. `with_key` is the
/// factory half of the capability; it is the only place a key is ever seen.
pub trait BlockCipher: Sized {
    /// Width of a single cipher block in bytes, fixed for the cipher's lifetime.
    type BlockSize: ArrayLength<u8>;

    /// Bind `key` to a fresh cipher instance.
    ///
    /// Fails with [`Error::KeyRejected`](crate::Error::KeyRejected) when the
    /// key length does not fit the cipher family.
    fn with_key(key: &[u8]) -> Result<Self>;

    /// Encrypt one block in place under the bound key.
    fn encrypt_block(&self, block: &mut GenericArray<u8, Self::BlockSize>);

    /// Block width in bytes.
    fn block_size() -> usize {
        Self::BlockSize::USIZE
    }
}
