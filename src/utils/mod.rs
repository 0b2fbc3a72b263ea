//! Common utilities.

pub mod clock;
pub mod cryptography;
pub mod nonces;
pub mod signer;
