#![no_std]

// Test vectors and chunking sweeps need Vec and the vec! macro
#[cfg(test)]
#[macro_use]
extern crate std;

mod error;
pub use error::Error;

mod core;

pub use crate::core::{
    cipher::{
        aes::{Aes128, Aes192, Aes256},
        BlockCipher,
    },
    cmac::{constant_time_equal, mac, verify, Block, Cmac, Tag},
};
