//! Optional Metadata of the ERC-20 standard.

/// Number of decimals used by default on implementors of [`Erc20Metadata`].
pub const DEFAULT_DECIMALS: u8 = 18;

/// Display metadata of an ERC-20 token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Erc20Metadata {
    name: String,
    symbol: String,
}

impl Erc20Metadata {
    /// Creates the metadata for one token.
    #[must_use]
    pub fn new(name: impl Into<String>, symbol: impl Into<String>) -> Self {
        Self { name: name.into(), symbol: symbol.into() }
    }

    /// Returns the name of the token.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the symbol of the token, usually a shorter version of the
    /// name.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Returns the number of decimals used to get a user-friendly
    /// representation of values of this token.
    ///
    /// For example, if `decimals` equals `2`, a balance of `505` tokens
    /// should be displayed to a user as `5.05` (`505 / 10 ** 2`).
    ///
    /// NOTE: This information is only used for *display* purposes: in no way
    /// it affects any of the arithmetic of the ledger, including
    /// [`crate::token::erc20::IErc20::balance_of`] and
    /// [`crate::token::erc20::IErc20::transfer`].
    #[must_use]
    pub fn decimals(&self) -> u8 {
        DEFAULT_DECIMALS
    }
}
