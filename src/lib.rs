/*!
# permit-token

An ERC-20 token ledger extended with [EIP-2612] signature-based allowances
("permit"), over explicit in-memory state.

A token holder signs a structured [EIP-712] `Permit` message off-line; any
third party can later submit that signature to install a spending allowance
on the holder's behalf. The signature is bound to one deployment through a
domain separator, to one use through a per-owner nonce, and to a validity
window through a deadline.

```rust
use alloy_primitives::{address, uint, U256};
use permit_token::{
    token::erc20::{extensions::Erc20Permit, Erc20, IErc20},
    utils::signer::{sign_permit, LocalSigner, Signer},
};

let mut erc20 = Erc20::default();
let mut permit = Erc20Permit::new(
    "Permit Coin",
    42161,
    address!("000000000000000000000000000000000000dEaD"),
);

let key = alloy_primitives::b256!(
    "0000000000000000000000000000000000000000000000000000000000000a11"
);
let owner = LocalSigner::from_bytes(&key)?;
let spender = address!("A11CEacF9aa32246d767FCCD72e02d6bCbcC375d");
let value = uint!(1_000_000_000_000_000_000_U256);
let deadline = U256::MAX;

let (v, r, s) = sign_permit(
    &owner,
    permit.eip712(),
    owner.address(),
    spender,
    value,
    permit.nonces(owner.address()),
    deadline,
)?;

permit.permit(owner.address(), spender, value, deadline, v, r, s, &mut erc20)?;
assert_eq!(value, erc20.allowance(owner.address(), spender));
# Ok::<(), Box<dyn std::error::Error>>(())
```

[EIP-2612]: https://eips.ethereum.org/EIPS/eip-2612
[EIP-712]: https://eips.ethereum.org/EIPS/eip-712
*/

#![allow(clippy::module_name_repetitions)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod token;
pub mod utils;
