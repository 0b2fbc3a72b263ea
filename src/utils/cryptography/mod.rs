//! Cryptographic utilities: typed-data hashing and signature recovery.

pub mod ecdsa;
pub mod eip712;
pub mod message_hash_utils;
