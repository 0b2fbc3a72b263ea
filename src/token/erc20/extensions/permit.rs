//! Permit extension.
//!
//! Extension of the ERC-20 standard allowing approvals to be made via
//! signatures, as defined in [EIP-2612].
//!
//! Adds the [`Erc20Permit::permit`] method, which can be used to change an
//! account's ERC-20 allowance (see [`crate::token::erc20::IErc20::allowance`])
//! by presenting a message signed by the account. By not relying on
//! [`crate::token::erc20::IErc20::approve`], the token holder account doesn't
//! need to submit the authorization themselves: any third party can install
//! the allowance on their behalf.
//!
//! [EIP-2612]: https://eips.ethereum.org/EIPS/eip-2612

use alloy_primitives::{keccak256, Address, B256, U256};
use alloy_sol_types::{sol, SolType};
use tracing::{debug, warn};

use crate::{
    token::erc20::{self, Erc20},
    utils::{
        clock::{Clock, SystemClock},
        cryptography::{ecdsa, eip712::Eip712},
        nonces::{self, Nonces},
    },
};

/// keccak256("Permit(address owner,address spender,uint256 value,uint256
/// nonce,uint256 deadline)")
///
/// This string is fixed by EIP-2612; changing a single byte of it would make
/// every externally produced signature fail to verify.
pub const PERMIT_TYPEHASH: B256 = B256::new(
    keccak_const::Keccak256::new()
        .update(
            b"Permit(address owner,address spender,uint256 value,uint256 nonce,uint256 deadline)",
        )
        .finalize(),
);

type StructHashTuple = sol! {
    tuple(bytes32, address, address, uint256, uint256, uint256)
};

/// A Permit error.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Indicates that the permit deadline has expired.
    #[error("permit expired: deadline {deadline}")]
    ExpiredSignature {
        /// The expired deadline.
        deadline: U256,
    },
    /// Indicates a well-formed signature that authorizes a different party
    /// than the stated owner.
    #[error("invalid permit signer {signer}, expected {owner}")]
    InvalidSigner {
        /// The recovered signer.
        signer: Address,
        /// The stated owner.
        owner: Address,
    },
    /// Indicates a malformed or non-canonical signature.
    #[error(transparent)]
    InvalidSignature(#[from] ecdsa::Error),
    /// Indicates a stale or concurrently consumed nonce.
    #[error(transparent)]
    InvalidAccountNonce(#[from] nonces::Error),
    /// An error propagated from the token ledger.
    #[error(transparent)]
    Erc20(#[from] erc20::Error),
}

/// Computes the [EIP-712 struct hash] of one `Permit` message.
///
/// [EIP-712 struct hash]: https://eips.ethereum.org/EIPS/eip-712#definition-of-hashstruct
#[must_use]
pub fn permit_struct_hash(
    owner: Address,
    spender: Address,
    value: U256,
    nonce: U256,
    deadline: U256,
) -> B256 {
    keccak256(StructHashTuple::abi_encode(&(
        PERMIT_TYPEHASH,
        owner,
        spender,
        value,
        nonce,
        deadline,
    )))
}

/// State of a Permit extension: the signing domain, per-owner nonces, and the
/// time source used for deadline checks.
#[derive(Debug)]
pub struct Erc20Permit<C: Clock = SystemClock> {
    eip712: Eip712,
    nonces: Nonces,
    clock: C,
}

impl Erc20Permit<SystemClock> {
    /// Creates the extension for one deployment, checking deadlines against
    /// the host's system time.
    ///
    /// # Arguments
    ///
    /// * `name` - Token name; also the `name` field of the EIP-712 domain.
    /// * `chain_id` - Identifier of the network the deployment lives on.
    /// * `verifying_contract` - Address of the deployment consuming the
    ///   signatures.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        chain_id: u64,
        verifying_contract: Address,
    ) -> Self {
        Self::with_clock(name, chain_id, verifying_contract, SystemClock)
    }
}

impl<C: Clock> Erc20Permit<C> {
    /// Same as [`Erc20Permit::new`], with an explicit time source.
    #[must_use]
    pub fn with_clock(
        name: impl Into<String>,
        chain_id: u64,
        verifying_contract: Address,
        clock: C,
    ) -> Self {
        Self {
            eip712: Eip712::new(name, chain_id, verifying_contract),
            nonces: Nonces::default(),
            clock,
        }
    }

    /// Returns the current nonce for `owner`.
    #[must_use]
    pub fn nonces(&self, owner: Address) -> U256 {
        self.nonces.nonces(owner)
    }

    /// Returns the name of the token.
    #[must_use]
    pub fn name(&self) -> &str {
        self.eip712.name()
    }

    /// Returns the domain separator used in the encoding of the signature
    /// for [`Self::permit`], as defined by EIP-712. Known as
    /// `DOMAIN_SEPARATOR` in the wire interface; external tooling reads it to
    /// construct signatures.
    #[must_use]
    pub fn domain_separator(&self) -> B256 {
        self.eip712.domain_separator()
    }

    /// Returns the full signing domain.
    #[must_use]
    pub fn eip712(&self) -> &Eip712 {
        &self.eip712
    }

    /// Sets `value` as the allowance of `spender` over `owner`'s tokens,
    /// given `owner`'s signed approval.
    ///
    /// # Arguments
    ///
    /// * `owner` - Account that owns the tokens.
    /// * `spender` - Account that will spend the tokens.
    /// * `value` - The number of tokens `spender` is permitted to transfer.
    /// * `deadline` - Unix timestamp up to which (inclusive) the permit is
    ///   valid.
    /// * `v` - `v` value from the `owner`'s signature.
    /// * `r` - `r` value from the `owner`'s signature.
    /// * `s` - `s` value from the `owner`'s signature.
    /// * `erc20` - Write access to the token ledger holding the allowances.
    ///
    /// # Errors
    ///
    /// * [`Error::ExpiredSignature`] - If the `deadline` is in the past.
    /// * [`Error::InvalidSignature`] - If the signature components are
    ///   malformed or non-canonical.
    /// * [`Error::InvalidSigner`] - If the recovered signer is not `owner`.
    /// * [`Error::InvalidAccountNonce`] - If the owner's nonce was consumed
    ///   between digest computation and consumption.
    /// * [`Error::Erc20`] - If `spender` is the zero address.
    ///
    /// # Requirements
    ///
    /// * `deadline` must be a timestamp not in the past.
    /// * `v`, `r` and `s` must be a valid secp256k1 signature from `owner`
    ///   over the EIP-712-formatted message fields.
    /// * the signature must use `owner`'s current nonce.
    ///
    /// On any failure no state is changed: the nonce is only consumed and the
    /// allowance only written once every check has passed.
    #[allow(clippy::too_many_arguments)]
    pub fn permit(
        &mut self,
        owner: Address,
        spender: Address,
        value: U256,
        deadline: U256,
        v: u8,
        r: B256,
        s: B256,
        erc20: &mut Erc20,
    ) -> Result<(), Error> {
        if U256::from(self.clock.now()) > deadline {
            return Err(Error::ExpiredSignature { deadline });
        }

        // Validated up front so that `_approve` cannot fail after the nonce
        // has been consumed.
        if spender.is_zero() {
            return Err(erc20::Error::InvalidSpender {
                spender: Address::ZERO,
            }
            .into());
        }

        let nonce = self.nonces.nonces(owner);
        let struct_hash =
            permit_struct_hash(owner, spender, value, nonce, deadline);
        let hash = self.eip712.hash_typed_data_v4(struct_hash);

        let signer = ecdsa::recover(hash, v, r, s)?;
        if signer != owner {
            warn!(%signer, %owner, "permit signed by a different party");
            return Err(Error::InvalidSigner { signer, owner });
        }

        self.nonces.use_checked_nonce(owner, nonce)?;

        erc20._approve(owner, spender, value)?;
        debug!(%owner, %spender, %value, "permit consumed");
        Ok(())
    }
}
