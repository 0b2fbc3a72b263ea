//! Implementation of nonce tracking for addresses.
//!
//! Nonces will only increment.

use std::collections::HashMap;

use alloy_primitives::{Address, U256};

/// A [`Nonces`] error.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The nonce used for an `account` is not the expected current nonce.
    #[error("invalid nonce for account {account}: current nonce is {current_nonce}")]
    InvalidAccountNonce {
        /// Account whose nonce was checked.
        account: Address,
        /// The account's actual current nonce.
        current_nonce: U256,
    },
}

/// Per-account strictly increasing counters.
///
/// Each successful consumption advances the owner's nonce by exactly one,
/// permanently invalidating anything signed over an older value.
#[derive(Debug, Default)]
pub struct Nonces {
    /// Mapping from address to its nonce. Absent entries read as zero.
    nonces: HashMap<Address, U256>,
}

impl Nonces {
    /// Returns the unused nonce for the given `owner`.
    #[must_use]
    pub fn nonces(&self, owner: Address) -> U256 {
        self.nonces.get(&owner).copied().unwrap_or_default()
    }

    /// Consumes a nonce for the given `owner`: returns the current value and
    /// increments the stored nonce.
    ///
    /// # Panics
    ///
    /// * If the nonce for the given `owner` exceeds [`U256::MAX`].
    pub fn use_nonce(&mut self, owner: Address) -> U256 {
        let nonce = self.nonces(owner);
        let next = nonce
            .checked_add(U256::ONE)
            .expect("nonce should not exceed `U256::MAX`");
        self.nonces.insert(owner, next);
        nonce
    }

    /// Same as [`Self::use_nonce`] but checking that `nonce` is the next
    /// valid one for the `owner`.
    ///
    /// A mismatch leaves the stored nonce untouched, so a failed caller can
    /// observe the still-current value.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidAccountNonce`] - If `nonce` is not the next valid
    ///   nonce for the `owner`.
    ///
    /// # Panics
    ///
    /// * If the nonce for the given `owner` exceeds [`U256::MAX`].
    pub fn use_checked_nonce(
        &mut self,
        owner: Address,
        nonce: U256,
    ) -> Result<(), Error> {
        let current_nonce = self.nonces(owner);

        if nonce != current_nonce {
            return Err(Error::InvalidAccountNonce {
                account: owner,
                current_nonce,
            });
        }

        self.use_nonce(owner);
        Ok(())
    }
}
