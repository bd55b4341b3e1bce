use aes::{Aes128Enc, Aes192Enc, Aes256Enc};
use anyhow::Result;
use cipher::{BlockEncrypt, KeyInit};
use generic_array::{typenum::U16, GenericArray};

use super::BlockCipher;
use crate::error::Error::KeyRejected;

/// AES-128 encrypt-only core adapted to the [`BlockCipher`] capability.
#[derive(Clone)]
pub struct Aes128(Aes128Enc);

impl BlockCipher for Aes128 {
    type BlockSize = U16;

    fn with_key(key: &[u8]) -> Result<Self> {
        let aes = Aes128Enc::new_from_slice(key).map_err(|_| KeyRejected(16, key.len()).wrap())?;
        Ok(Self(aes))
    }

    fn encrypt_block(&self, block: &mut GenericArray<u8, U16>) {
        self.0.encrypt_block(block);
    }
}

/// AES-192 encrypt-only core adapted to the [`BlockCipher`] capability.
#[derive(Clone)]
pub struct Aes192(Aes192Enc);

impl BlockCipher for Aes192 {
    type BlockSize = U16;

    fn with_key(key: &[u8]) -> Result<Self> {
        let aes = Aes192Enc::new_from_slice(key).map_err(|_| KeyRejected(24, key.len()).wrap())?;
        Ok(Self(aes))
    }

    fn encrypt_block(&self, block: &mut GenericArray<u8, U16>) {
        self.0.encrypt_block(block);
    }
}

/// AES-256 encrypt-only core adapted to the [`BlockCipher`] capability.
#[derive(Clone)]
pub struct Aes256(Aes256Enc);

impl BlockCipher for Aes256 {
    type BlockSize = U16;

    fn with_key(key: &[u8]) -> Result<Self> {
        let aes = Aes256Enc::new_from_slice(key).map_err(|_| KeyRejected(32, key.len()).wrap())?;
        Ok(Self(aes))
    }

    fn encrypt_block(&self, block: &mut GenericArray<u8, U16>) {
        self.0.encrypt_block(block);
    }
}
