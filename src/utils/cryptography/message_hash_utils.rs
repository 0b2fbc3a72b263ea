//! Signature message hash utilities for producing digests to be consumed by
//! ECDSA recovery or signing.
//!
//! Provides the final step of [EIP-712] message hashing: combining a domain
//! separator and a struct hash into the digest that is actually signed.
//!
//! [EIP-712]: https://eips.ethereum.org/EIPS/eip-712

use alloy_primitives::{keccak256, B256};

/// Prefix for ERC-191 version with `0x01`.
pub const TYPED_DATA_PREFIX: [u8; 2] = [0x19, 0x01];

/// Returns the keccak256 digest of an EIP-712 typed data (ERC-191 version
/// `0x01`).
///
/// The digest is calculated from a `domain_separator` and a `struct_hash`, by
/// prefixing them with [`TYPED_DATA_PREFIX`] and hashing the result. It
/// corresponds to the hash signed by the [eth_signTypedData] JSON-RPC method
/// as part of EIP-712.
///
/// [eth_signTypedData]: https://eips.ethereum.org/EIPS/eip-712
#[must_use]
pub fn to_typed_data_hash(domain_separator: &B256, struct_hash: &B256) -> B256 {
    let mut preimage = [0u8; 66];
    preimage[..2].copy_from_slice(&TYPED_DATA_PREFIX);
    preimage[2..34].copy_from_slice(domain_separator.as_slice());
    preimage[34..].copy_from_slice(struct_hash.as_slice());
    keccak256(preimage)
}
