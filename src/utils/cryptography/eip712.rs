//! [EIP-712](https://eips.ethereum.org/EIPS/eip-712) is a standard for hashing
//! and signing typed structured data.
//!
//! This module implements the EIP-712 domain separator and the final step of
//! the encoding to obtain the message digest that is then signed via ECDSA
//! ([`Eip712::hash_typed_data_v4`]). Protocols implement the type-specific
//! struct hashing themselves, combining ABI encoding with `keccak256`.
//!
//! The domain separator binds every signature to one specific deployment
//! (name, version, chain id, verifying contract): differing any single
//! parameter changes the separator and invalidates signatures produced for
//! other deployments. It is computed once at construction and cached; the
//! domain is immutable for the lifetime of the value.
//!
//! NOTE: This module implements the version of the encoding known as "v4", as
//! implemented by the JSON RPC method [`eth_signTypedDataV4`] in `MetaMask`.
//!
//! [`eth_signTypedDataV4`]: https://docs.metamask.io/guide/signing-data.html

use alloy_primitives::{keccak256, Address, B256, U256};
use alloy_sol_types::{sol, SolType};

use crate::utils::cryptography::message_hash_utils::to_typed_data_hash;

/// keccak256("EIP712Domain(string name,string version,uint256 chainId,address
/// verifyingContract)")
pub const TYPE_HASH: B256 = B256::new(
    keccak_const::Keccak256::new()
        .update(
            b"EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)",
        )
        .finalize(),
);

/// Domain version shared by every deployment.
pub const VERSION: &str = "1";

/// keccak256 of [`VERSION`].
const HASHED_VERSION: B256 = B256::new(
    keccak_const::Keccak256::new().update(VERSION.as_bytes()).finalize(),
);

/// Tuple for the domain separator.
type DomainSeparatorTuple = sol! {
    tuple(bytes32, bytes32, bytes32, uint256, address)
};

/// An immutable EIP-712 domain with a cached separator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Eip712 {
    name: String,
    chain_id: U256,
    verifying_contract: Address,
    cached_domain_separator: B256,
}

impl Eip712 {
    /// Creates the domain for one deployment and caches its separator.
    ///
    /// # Arguments
    ///
    /// * `name` - User-readable name of the signing domain, usually the
    ///   token name.
    /// * `chain_id` - Identifier of the network the deployment lives on.
    /// * `verifying_contract` - Address of the deployment that consumes the
    ///   signatures.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        chain_id: u64,
        verifying_contract: Address,
    ) -> Self {
        let name = name.into();
        let chain_id = U256::from(chain_id);
        let cached_domain_separator =
            build_domain_separator(&name, chain_id, verifying_contract);
        Self { name, chain_id, verifying_contract, cached_domain_separator }
    }

    /// The `name` parameter of the domain.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The `version` parameter of the domain.
    #[must_use]
    pub fn version(&self) -> &'static str {
        VERSION
    }

    /// The `chainId` parameter of the domain.
    #[must_use]
    pub fn chain_id(&self) -> U256 {
        self.chain_id
    }

    /// The `verifyingContract` parameter of the domain.
    #[must_use]
    pub fn verifying_contract(&self) -> Address {
        self.verifying_contract
    }

    /// Returns the domain separator, computed at construction.
    #[must_use]
    pub fn domain_separator(&self) -> B256 {
        self.cached_domain_separator
    }

    /// Given an already [hashed struct], returns the hash of the fully
    /// encoded EIP-712 message for this domain.
    ///
    /// [hashed struct]: https://eips.ethereum.org/EIPS/eip-712#definition-of-hashstruct
    ///
    /// This digest can be used together with
    /// [`crate::utils::cryptography::ecdsa::recover`] to obtain the signer of
    /// a message.
    #[must_use]
    pub fn hash_typed_data_v4(&self, struct_hash: B256) -> B256 {
        to_typed_data_hash(&self.cached_domain_separator, &struct_hash)
    }
}

/// `keccak256(abi.encode(TYPE_HASH, keccak256(name), keccak256(version),
/// chain_id, verifying_contract))`.
fn build_domain_separator(
    name: &str,
    chain_id: U256,
    verifying_contract: Address,
) -> B256 {
    let encoded = DomainSeparatorTuple::abi_encode(&(
        TYPE_HASH,
        keccak256(name.as_bytes()),
        HASHED_VERSION,
        chain_id,
        verifying_contract,
    ));
    keccak256(encoded)
}
