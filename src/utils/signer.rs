//! Off-chain signing capabilities.
//!
//! A [`Signer`] produces recoverable `(v, r, s)` signatures over 32-byte
//! digests. Key management stays behind the trait: [`LocalSigner`] holds a
//! plain in-memory key, and other backends (hardware, remote) can implement
//! the same capability without the verification side caring.

use alloy_primitives::{Address, B256, U256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;

use crate::{
    token::erc20::extensions::permit::permit_struct_hash,
    utils::cryptography::eip712::Eip712,
};

/// An error that can occur while producing a signature.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The signing backend failed to sign the digest.
    #[error("signing failed: {0}")]
    SigningFailed(String),
    /// A cryptographic key is invalid or malformed.
    #[error("invalid key: {0}")]
    InvalidKey(String),
}

/// Capability to sign 32-byte digests on behalf of one address.
pub trait Signer {
    /// The address corresponding to the signing key.
    fn address(&self) -> Address;

    /// Signs `digest`, returning the `(v, r, s)` components with `v` as a
    /// non-EIP-155 recovery id (27 or 28).
    ///
    /// # Errors
    ///
    /// * [`Error::SigningFailed`] - If the backend cannot produce a
    ///   signature.
    fn sign_digest(&self, digest: B256) -> Result<(u8, B256, B256), Error>;
}

/// [`Signer`] backed by an in-memory secp256k1 private key.
#[derive(Clone, Debug)]
pub struct LocalSigner {
    inner: PrivateKeySigner,
}

impl LocalSigner {
    /// Wraps an existing [`PrivateKeySigner`].
    #[must_use]
    pub fn new(inner: PrivateKeySigner) -> Self {
        Self { inner }
    }

    /// Creates a signer from raw private-key bytes.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidKey`] - If the bytes are not a valid secp256k1
    ///   scalar.
    pub fn from_bytes(key: &B256) -> Result<Self, Error> {
        let inner = PrivateKeySigner::from_bytes(key)
            .map_err(|e| Error::InvalidKey(e.to_string()))?;
        Ok(Self { inner })
    }
}

impl Signer for LocalSigner {
    fn address(&self) -> Address {
        self.inner.address()
    }

    fn sign_digest(&self, digest: B256) -> Result<(u8, B256, B256), Error> {
        let signature = self
            .inner
            .sign_hash_sync(&digest)
            .map_err(|e| Error::SigningFailed(e.to_string()))?;
        Ok((
            to_non_eip155_v(signature.v()),
            signature.r().into(),
            signature.s().into(),
        ))
    }
}

/// Converts a parity bit into a [non-EIP-155 recovery id].
///
/// [non-EIP-155 recovery id]: https://eips.ethereum.org/EIPS/eip-155
fn to_non_eip155_v(y_parity: bool) -> u8 {
    u8::from(y_parity) + 27
}

/// Signs an [EIP-2612] `Permit` message for the given `domain`.
///
/// This is the off-chain half of the permit flow: the resulting `(v, r, s)`
/// triple can be submitted by anyone to
/// [`crate::token::erc20::extensions::permit::Erc20Permit::permit`].
///
/// # Errors
///
/// * [`Error::SigningFailed`] - If the backend cannot produce a signature.
///
/// [EIP-2612]: https://eips.ethereum.org/EIPS/eip-2612
#[allow(clippy::too_many_arguments)]
pub fn sign_permit(
    signer: &impl Signer,
    domain: &Eip712,
    owner: Address,
    spender: Address,
    value: U256,
    nonce: U256,
    deadline: U256,
) -> Result<(u8, B256, B256), Error> {
    let struct_hash =
        permit_struct_hash(owner, spender, value, nonce, deadline);
    signer.sign_digest(domain.hash_typed_data_v4(struct_hash))
}
