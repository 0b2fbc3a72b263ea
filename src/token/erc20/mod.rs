//! Implementation of the ERC-20 token standard over an explicit in-memory
//! store.
//!
//! We have followed general `OpenZeppelin` Contracts guidelines: functions
//! return errors instead of `false` on failure. There is no ambient
//! transaction context here, so the acting party of [`IErc20::transfer`],
//! [`IErc20::approve`] and [`IErc20::transfer_from`] is an explicit
//! argument.

use std::collections::HashMap;

use alloy_primitives::{Address, U256};
use tracing::debug;

pub mod extensions;

/// An [`Erc20`] error defined as described in [ERC-6093].
///
/// [ERC-6093]: https://eips.ethereum.org/EIPS/eip-6093
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Indicates an error related to the current `balance` of `sender`. Used
    /// in transfers.
    #[error("insufficient balance for {sender}: balance {balance}, needed {needed}")]
    InsufficientBalance {
        /// Address whose tokens are being transferred.
        sender: Address,
        /// Current balance of the interacting account.
        balance: U256,
        /// Minimum amount required to perform the transfer.
        needed: U256,
    },
    /// Indicates a failure with the token `sender`. Used in transfers.
    #[error("invalid sender {sender}")]
    InvalidSender {
        /// Address whose tokens are being transferred.
        sender: Address,
    },
    /// Indicates a failure with the token `receiver`. Used in transfers.
    #[error("invalid receiver {receiver}")]
    InvalidReceiver {
        /// Address to which the tokens are being transferred.
        receiver: Address,
    },
    /// Indicates a failure with the `spender`'s `allowance`. Used in
    /// transfers.
    #[error("insufficient allowance for {spender}: allowance {allowance}, needed {needed}")]
    InsufficientAllowance {
        /// Address allowed to operate on tokens without owning them.
        spender: Address,
        /// Amount of tokens the `spender` is allowed to operate with.
        allowance: U256,
        /// Minimum amount required to perform the transfer.
        needed: U256,
    },
    /// Indicates a failure with the `spender` to be approved. Used in
    /// approvals.
    #[error("invalid spender {spender}")]
    InvalidSpender {
        /// Address allowed to operate on tokens without owning them.
        spender: Address,
    },
    /// Indicates a failure with the `approver` of a token to be approved.
    /// Used in approvals.
    #[error("invalid approver {approver}")]
    InvalidApprover {
        /// Address initiating the approval operation.
        approver: Address,
    },
}

/// State of an [`Erc20`] token.
#[derive(Debug, Default)]
pub struct Erc20 {
    /// Maps users to balances.
    balances: HashMap<Address, U256>,
    /// Maps users to a mapping of each spender's allowance.
    allowances: HashMap<Address, HashMap<Address, U256>>,
    /// The total supply of the token.
    total_supply: U256,
}

/// Required interface of an [`Erc20`] compliant token.
pub trait IErc20 {
    /// The error type associated to this ERC-20 trait implementation.
    type Error;

    /// Returns the number of tokens in existence.
    fn total_supply(&self) -> U256;

    /// Returns the number of tokens owned by `account`.
    fn balance_of(&self, account: Address) -> U256;

    /// Moves a `value` amount of tokens from `from` to `to`.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidSender`] - If `from` is `Address::ZERO`.
    /// * [`Error::InvalidReceiver`] - If `to` is `Address::ZERO`.
    /// * [`Error::InsufficientBalance`] - If `from` holds fewer than `value`
    ///   tokens.
    fn transfer(
        &mut self,
        from: Address,
        to: Address,
        value: U256,
    ) -> Result<bool, Self::Error>;

    /// Returns the remaining number of tokens that `spender` will be allowed
    /// to spend on behalf of `owner` through [`IErc20::transfer_from`]. This
    /// is zero by default.
    ///
    /// This value changes when [`IErc20::approve`] or
    /// [`IErc20::transfer_from`] are called.
    fn allowance(&self, owner: Address, spender: Address) -> U256;

    /// Sets a `value` number of tokens as the allowance of `spender` over
    /// `owner`'s tokens. The previous allowance is overwritten, not
    /// accumulated.
    ///
    /// WARNING: Beware that changing an allowance with this method brings the
    /// risk that someone may use both the old and the new allowance by
    /// unfortunate ordering of operations. One possible solution to mitigate
    /// this race condition is to first reduce the `spender`'s allowance to 0
    /// and set the desired value afterwards:
    /// <https://github.com/ethereum/EIPs/issues/20#issuecomment-263524729>
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidSpender`] - If `spender` is `Address::ZERO`.
    fn approve(
        &mut self,
        owner: Address,
        spender: Address,
        value: U256,
    ) -> Result<bool, Self::Error>;

    /// Moves a `value` number of tokens from `from` to `to` using the
    /// allowance mechanism. `value` is then deducted from `spender`'s
    /// allowance.
    ///
    /// NOTE: If `value` is the maximum `U256::MAX`, the allowance is not
    /// updated on `transfer_from`. This is semantically equivalent to an
    /// infinite approval.
    ///
    /// # Errors
    ///
    /// * [`Error::InsufficientAllowance`] - If `spender` lacks allowance.
    /// * [`Error::InvalidSender`] - If `from` is `Address::ZERO`.
    /// * [`Error::InvalidReceiver`] - If `to` is `Address::ZERO`.
    /// * [`Error::InsufficientBalance`] - If `from` holds fewer than `value`
    ///   tokens.
    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        value: U256,
    ) -> Result<bool, Self::Error>;
}

impl IErc20 for Erc20 {
    type Error = Error;

    fn total_supply(&self) -> U256 {
        self.total_supply
    }

    fn balance_of(&self, account: Address) -> U256 {
        self.balances.get(&account).copied().unwrap_or_default()
    }

    fn transfer(
        &mut self,
        from: Address,
        to: Address,
        value: U256,
    ) -> Result<bool, Self::Error> {
        self._transfer(from, to, value)?;
        Ok(true)
    }

    fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances
            .get(&owner)
            .and_then(|spenders| spenders.get(&spender))
            .copied()
            .unwrap_or_default()
    }

    fn approve(
        &mut self,
        owner: Address,
        spender: Address,
        value: U256,
    ) -> Result<bool, Self::Error> {
        self._approve(owner, spender, value)
    }

    fn transfer_from(
        &mut self,
        spender: Address,
        from: Address,
        to: Address,
        value: U256,
    ) -> Result<bool, Self::Error> {
        self._spend_allowance(from, spender, value)?;
        self._transfer(from, to, value)?;
        Ok(true)
    }
}

impl Erc20 {
    /// Sets a `value` number of tokens as the allowance of `spender` over
    /// `owner`'s tokens.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidApprover`] - If `owner` is `Address::ZERO`.
    /// * [`Error::InvalidSpender`] - If `spender` is `Address::ZERO`.
    pub(crate) fn _approve(
        &mut self,
        owner: Address,
        spender: Address,
        value: U256,
    ) -> Result<bool, Error> {
        if owner.is_zero() {
            return Err(Error::InvalidApprover { approver: Address::ZERO });
        }

        if spender.is_zero() {
            return Err(Error::InvalidSpender { spender: Address::ZERO });
        }

        self.allowances.entry(owner).or_default().insert(spender, value);
        debug!(%owner, %spender, %value, "approval");
        Ok(true)
    }

    /// Internal implementation of transferring tokens between two accounts.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidSender`] - If `from` is `Address::ZERO`.
    /// * [`Error::InvalidReceiver`] - If `to` is `Address::ZERO`.
    /// * [`Error::InsufficientBalance`] - If `from` holds fewer than `value`
    ///   tokens.
    fn _transfer(
        &mut self,
        from: Address,
        to: Address,
        value: U256,
    ) -> Result<(), Error> {
        if from.is_zero() {
            return Err(Error::InvalidSender { sender: Address::ZERO });
        }
        if to.is_zero() {
            return Err(Error::InvalidReceiver { receiver: Address::ZERO });
        }

        self._update(from, to, value)
    }

    /// Creates a `value` amount of tokens and assigns them to `account`, by
    /// transferring it from `Address::ZERO`.
    ///
    /// Relies on the [`Self::_update`] mechanism.
    ///
    /// # Panics
    ///
    /// * If `total_supply` exceeds `U256::MAX`.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidReceiver`] - If `account` is `Address::ZERO`.
    pub fn _mint(&mut self, account: Address, value: U256) -> Result<(), Error> {
        if account.is_zero() {
            return Err(Error::InvalidReceiver { receiver: Address::ZERO });
        }
        self._update(Address::ZERO, account, value)
    }

    /// Destroys a `value` amount of tokens from `account`, lowering the total
    /// supply.
    ///
    /// Relies on the [`Self::_update`] mechanism.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidSender`] - If `account` is `Address::ZERO`.
    /// * [`Error::InsufficientBalance`] - If `account` holds fewer than
    ///   `value` tokens.
    pub fn _burn(&mut self, account: Address, value: U256) -> Result<(), Error> {
        if account.is_zero() {
            return Err(Error::InvalidSender { sender: Address::ZERO });
        }
        self._update(account, Address::ZERO, value)
    }

    /// Transfers a `value` amount of tokens from `from` to `to`, or
    /// alternatively mints (or burns) if `from` (or `to`) is the zero
    /// address.
    ///
    /// All customizations to transfers, mints, and burns should be done by
    /// using this function.
    ///
    /// # Panics
    ///
    /// * If `total_supply` exceeds `U256::MAX`. It may happen during `mint`
    ///   operation.
    ///
    /// # Errors
    ///
    /// * [`Error::InsufficientBalance`] - If `from` holds fewer than `value`
    ///   tokens.
    fn _update(
        &mut self,
        from: Address,
        to: Address,
        value: U256,
    ) -> Result<(), Error> {
        if from.is_zero() {
            // Mint operation. Overflow check required: the rest of the code
            // assumes that `total_supply` never overflows.
            self.total_supply = self
                .total_supply
                .checked_add(value)
                .expect("should not exceed `U256::MAX` for `total_supply`");
        } else {
            let from_balance = self.balance_of(from);
            if from_balance < value {
                return Err(Error::InsufficientBalance {
                    sender: from,
                    balance: from_balance,
                    needed: value,
                });
            }
            // Overflow not possible:
            // `value` <= `from_balance` <= `total_supply`.
            self.balances.insert(from, from_balance - value);
        }

        if to.is_zero() {
            // Overflow not possible:
            // `value` <= `total_supply` or
            // `value` <= `from_balance` <= `total_supply`.
            self.total_supply -= value;
        } else {
            let balance_to = self.balance_of(to);
            // Overflow not possible:
            // `balance_to` + `value` is at most `total_supply`,
            // which fits into a `U256`.
            self.balances.insert(to, balance_to + value);
        }

        debug!(%from, %to, %value, "transfer");
        Ok(())
    }

    /// Updates `owner`'s allowance for `spender` based on spent `value`.
    ///
    /// Does not update the allowance value in the case of infinite allowance.
    ///
    /// # Errors
    ///
    /// * [`Error::InsufficientAllowance`] - If not enough allowance is
    ///   available.
    pub(crate) fn _spend_allowance(
        &mut self,
        owner: Address,
        spender: Address,
        value: U256,
    ) -> Result<(), Error> {
        let current_allowance = self.allowance(owner, spender);
        if current_allowance != U256::MAX {
            if current_allowance < value {
                return Err(Error::InsufficientAllowance {
                    spender,
                    allowance: current_allowance,
                    needed: value,
                });
            }
            self.allowances
                .entry(owner)
                .or_default()
                .insert(spender, current_allowance - value);
        }
        Ok(())
    }
}
