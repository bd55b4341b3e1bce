//! CMAC engine (RFC 4493, NIST SP 800-38B) over a pluggable block cipher.

use core::fmt;

use anyhow::Result;
use generic_array::{typenum::Unsigned, GenericArray};
use subtle::ConstantTimeEq;

use super::cipher::BlockCipher;

/// Block-sized buffer of the underlying cipher.
pub type Block<C> = GenericArray<u8, <C as BlockCipher>::BlockSize>;

/// Authentication tag; always one cipher block wide.
pub type Tag<C> = Block<C>;

fn xor(s: &mut [u8], x: &[u8]) {
    for (si, xi) in s.iter_mut().zip(x.iter()) {
        *si ^= *xi;
    }
}

/// Left shift of the whole block by one bit, big-endian, with the derivation
/// constant `0x87` folded into the low byte when the shifted-out bit was set.
/// The fold is masked, never branched on.
///
/// `0x87` is the SP 800-38B constant for 128-bit blocks; other block widths
/// would need a different constant and are not supported by this derivation.
fn double<C: BlockCipher>(block: &Block<C>) -> Block<C> {
    let mut out = Block::<C>::default();
    let mut carry = 0;
    for (oi, bi) in out.iter_mut().zip(block.iter()).rev() {
        *oi = (*bi << 1) | carry;
        carry = *bi >> 7;
    }
    let last = out.len() - 1;
    out[last] ^= 0x87 & carry.wrapping_neg();
    out
}

/// Subkey derivation: `K1 = double(E_K(0^b))`, `K2 = double(K1)`.
///
/// `K1` finalizes messages ending on a block boundary, `K2` the padded rest.
pub(crate) fn derive_subkeys<C: BlockCipher>(cipher: &C) -> (Block<C>, Block<C>) {
    let mut l = Block::<C>::default();
    cipher.encrypt_block(&mut l);
    let k1 = double::<C>(&l);
    let k2 = double::<C>(&k1);
    (k1, k2)
}

/// Streaming CMAC engine over a block cipher `C`.
///
/// Message bytes fold into a block-sized chaining value. A completed block is
/// committed to the chain only once a later byte proves it is not the last
/// one; the last block takes a subkey (and padding, if short) before its
/// encryption, so processing always lags one potential block behind the
/// input. [`finalize`](Self::finalize) is therefore repeatable and
/// [`update`](Self::update) may continue a stream past it.
#[derive(Clone)]
pub struct Cmac<C: BlockCipher> {
    /// Cipher with the secret key already bound.
    cipher: C,

    /// Finalization subkey for complete last blocks.
    k1: Block<C>,

    /// Finalization subkey for padded last blocks.
    k2: Block<C>,

    /// Chaining value over all committed blocks.
    state: Block<C>,

    /// Unencrypted tail of the stream; zero at and beyond `pending_len`.
    pending: Block<C>,

    /// Message bytes currently buffered in `pending`.
    /// At most one full block, and a full block only until more input arrives.
    pending_len: usize,
}

impl<C: BlockCipher> Cmac<C> {
    /// Bind `key` through the cipher factory and derive the subkeys.
    pub fn new(key: &[u8]) -> Result<Self> {
        Ok(Self::from_cipher(C::with_key(key)?))
    }

    /// Wrap a cipher that already has its key installed.
    pub fn from_cipher(cipher: C) -> Self {
        let (k1, k2) = derive_subkeys(&cipher);
        Self {
            cipher,
            k1,
            k2,
            state: Block::<C>::default(),
            pending: Block::<C>::default(),
            pending_len: 0,
        }
    }

    /// Width of the tag in bytes, equal to the cipher block size.
    pub fn tag_size(&self) -> usize {
        C::BlockSize::USIZE
    }

    /// Feed message bytes into the engine.
    ///
    /// Any split of the same byte sequence over any number of calls yields
    /// the same tag. Returns the number of bytes consumed, which is always
    /// the full input length.
    pub fn update(&mut self, data: impl AsRef<[u8]>) -> usize {
        let mut m = data.as_ref();
        let consumed = m.len();
        let bs = C::BlockSize::USIZE;

        if self.pending_len + m.len() > bs {
            // More input follows the buffered block, so it cannot be the
            // last one: complete it, commit it to the chain.
            let take = bs - self.pending_len;
            self.pending[self.pending_len..].copy_from_slice(&m[..take]);
            m = &m[take..];
            xor(&mut self.state, &self.pending);
            self.cipher.encrypt_block(&mut self.state);
            self.pending = Block::<C>::default();
            self.pending_len = 0;

            // Commit whole blocks, keeping the trailing one (full or not)
            // out of the chain.
            while m.len() > bs {
                let (block, rest) = m.split_at(bs);
                xor(&mut self.state, block);
                self.cipher.encrypt_block(&mut self.state);
                m = rest;
            }
        }

        self.pending[self.pending_len..self.pending_len + m.len()].copy_from_slice(m);
        self.pending_len += m.len();
        consumed
    }

    /// Tag over all bytes consumed since the last reset.
    ///
    /// Leaves the engine untouched: calling it twice returns the same tag,
    /// and the stream may be extended with further `update` calls.
    pub fn finalize(&self) -> Tag<C> {
        let mut tag = self.state.clone();
        xor(&mut tag, &self.pending);
        if self.pending_len == C::BlockSize::USIZE {
            xor(&mut tag, &self.k1);
        } else {
            // 10^i padding right behind the data; the rest of `pending` is
            // already zero.
            xor(&mut tag, &self.k2);
            tag[self.pending_len] ^= 0x80;
        }
        self.cipher.encrypt_block(&mut tag);
        tag
    }

    /// Finalize and compare against an expected tag in constant time.
    pub fn verify(&self, tag: impl AsRef<[u8]>) -> bool {
        constant_time_equal(self.finalize(), tag)
    }

    /// Forget the current message. Subkeys and the bound cipher survive, so
    /// the engine authenticates the next message as if freshly constructed.
    pub fn reset(&mut self) {
        self.state = Block::<C>::default();
        self.pending = Block::<C>::default();
        self.pending_len = 0;
    }
}

impl<C: BlockCipher> fmt::Debug for Cmac<C> {
    // Subkeys are key material and stay out of the rendering.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}|{}]",
            hex::encode(&self.pending[..self.pending_len]),
            hex::encode(self.state.as_ref()),
        )
    }
}

/// Compare two byte strings without leaking where they first differ.
///
/// Content comparison never short-circuits; only the lengths, which are not
/// secret, are compared directly.
pub fn constant_time_equal(a: impl AsRef<[u8]>, b: impl AsRef<[u8]>) -> bool {
    let (a, b) = (a.as_ref(), b.as_ref());
    a.len() == b.len() && bool::from(a.ct_eq(b))
}

/// Tag `data` under `key` in one call.
pub fn mac<C>(key: &[u8], data: impl AsRef<[u8]>) -> Result<Tag<C>>
where
    C: BlockCipher,
{
    let mut cmac = Cmac::<C>::new(key)?;
    cmac.update(data);
    Ok(cmac.finalize())
}

/// Verify `tag` over `data` under `key` in one call.
pub fn verify<C>(key: &[u8], data: impl AsRef<[u8]>, tag: impl AsRef<[u8]>) -> Result<bool>
where
    C: BlockCipher,
{
    let mut cmac = Cmac::<C>::new(key)?;
    cmac.update(data);
    Ok(cmac.verify(tag))
}
