//! Integration tests for the ERC-20 permit flow.

use alloy_primitives::{address, b256, uint, Address, B256, U256};
use permit_token::{
    token::erc20::{
        extensions::{permit, Erc20Permit},
        Erc20, IErc20,
    },
    utils::{
        clock::Clock,
        signer::{sign_permit, LocalSigner, Signer},
    },
};

const TOKEN_NAME: &str = "Permit Coin";
const CHAIN_ID: u64 = 42161;
const CONTRACT_ADDRESS: Address =
    address!("000000000000000000000000000000000000dEaD");

// Tuesday, 1 January 2030 00:00:00
const NOW: u64 = 1_893_456_000;

const ONE_TOKEN: U256 = uint!(1_000_000_000_000_000_000_U256);

#[derive(Clone, Copy)]
struct FrozenClock(u64);

impl Clock for FrozenClock {
    fn now(&self) -> u64 {
        self.0
    }
}

struct Fixture {
    erc20: Erc20,
    permit: Erc20Permit<FrozenClock>,
    owner: LocalSigner,
    spender: LocalSigner,
}

fn deploy() -> Fixture {
    let owner = LocalSigner::from_bytes(&b256!(
        "0000000000000000000000000000000000000000000000000000000000000a11"
    ))
    .expect("key is a valid scalar");
    let spender = LocalSigner::from_bytes(&b256!(
        "0000000000000000000000000000000000000000000000000000000000000b0b"
    ))
    .expect("key is a valid scalar");

    let mut erc20 = Erc20::default();
    erc20._mint(owner.address(), ONE_TOKEN).expect("should mint");

    Fixture {
        erc20,
        permit: Erc20Permit::with_clock(
            TOKEN_NAME,
            CHAIN_ID,
            CONTRACT_ADDRESS,
            FrozenClock(NOW),
        ),
        owner,
        spender,
    }
}

fn sign(
    fixture: &Fixture,
    value: U256,
    nonce: U256,
    deadline: U256,
) -> (u8, B256, B256) {
    sign_permit(
        &fixture.owner,
        fixture.permit.eip712(),
        fixture.owner.address(),
        fixture.spender.address(),
        value,
        nonce,
        deadline,
    )
    .expect("should sign")
}

#[test]
fn exposes_read_accessors() {
    let fixture = deploy();
    let owner = fixture.owner.address();

    assert_eq!(TOKEN_NAME, fixture.permit.name());
    assert_eq!(U256::ZERO, fixture.permit.nonces(owner));
    assert_ne!(B256::ZERO, fixture.permit.domain_separator());
    assert_eq!(ONE_TOKEN, fixture.erc20.balance_of(owner));
}

#[test]
fn permit_then_transfer_from_moves_the_full_balance() {
    // The end-to-end scenario: the owner holds 1 token (10^18 base units)
    // and signs a permit over their full balance with the current nonce and
    // an hour of validity; the spender submits it and then pulls the funds.
    let mut fixture = deploy();
    let owner = fixture.owner.address();
    let spender = fixture.spender.address();
    let deadline = U256::from(NOW + 3600);

    assert_eq!(U256::ZERO, fixture.erc20.allowance(owner, spender));

    let (v, r, s) = sign(&fixture, ONE_TOKEN, U256::ZERO, deadline);
    fixture
        .permit
        .permit(owner, spender, ONE_TOKEN, deadline, v, r, s, &mut fixture.erc20)
        .expect("should permit");

    assert_eq!(ONE_TOKEN, fixture.erc20.allowance(owner, spender));
    assert_eq!(U256::ONE, fixture.permit.nonces(owner));

    fixture
        .erc20
        .transfer_from(spender, owner, spender, ONE_TOKEN)
        .expect("should transfer");

    assert_eq!(ONE_TOKEN, fixture.erc20.balance_of(spender));
    assert_eq!(U256::ZERO, fixture.erc20.balance_of(owner));
    assert_eq!(U256::ZERO, fixture.erc20.allowance(owner, spender));
}

#[test]
fn permit_overwrites_a_previous_allowance() {
    let mut fixture = deploy();
    let owner = fixture.owner.address();
    let spender = fixture.spender.address();
    let deadline = U256::from(NOW + 3600);

    fixture
        .erc20
        .approve(owner, spender, uint!(7_U256))
        .expect("should approve");

    let (v, r, s) = sign(&fixture, uint!(2_U256), U256::ZERO, deadline);
    fixture
        .permit
        .permit(
            owner,
            spender,
            uint!(2_U256),
            deadline,
            v,
            r,
            s,
            &mut fixture.erc20,
        )
        .expect("should permit");

    // Set, not added.
    assert_eq!(uint!(2_U256), fixture.erc20.allowance(owner, spender));
}

#[test]
fn error_when_expired_deadline_for_permit() {
    let mut fixture = deploy();
    let owner = fixture.owner.address();
    let spender = fixture.spender.address();
    let expired = U256::from(NOW - 1);

    let (v, r, s) = sign(&fixture, ONE_TOKEN, U256::ZERO, expired);
    let err = fixture
        .permit
        .permit(owner, spender, ONE_TOKEN, expired, v, r, s, &mut fixture.erc20)
        .expect_err("should return `ExpiredSignature`");

    assert_eq!(permit::Error::ExpiredSignature { deadline: expired }, err);
    assert_eq!(U256::ZERO, fixture.erc20.allowance(owner, spender));
}

#[test]
fn permit_succeeds_at_the_deadline() {
    let mut fixture = deploy();
    let owner = fixture.owner.address();
    let spender = fixture.spender.address();
    let deadline = U256::from(NOW);

    let (v, r, s) = sign(&fixture, ONE_TOKEN, U256::ZERO, deadline);
    fixture
        .permit
        .permit(owner, spender, ONE_TOKEN, deadline, v, r, s, &mut fixture.erc20)
        .expect("deadline is an inclusive bound");
}

#[test]
fn error_when_permit_signed_by_someone_else() {
    let mut fixture = deploy();
    let owner = fixture.owner.address();
    let spender = fixture.spender.address();
    let deadline = U256::from(NOW + 3600);

    // Well-formed signature, but produced by the spender's key.
    let (v, r, s) = sign_permit(
        &fixture.spender,
        fixture.permit.eip712(),
        owner,
        spender,
        ONE_TOKEN,
        U256::ZERO,
        deadline,
    )
    .expect("should sign");

    let err = fixture
        .permit
        .permit(owner, spender, ONE_TOKEN, deadline, v, r, s, &mut fixture.erc20)
        .expect_err("should return `InvalidSigner`");

    assert_eq!(
        permit::Error::InvalidSigner { signer: spender, owner },
        err
    );
    assert_eq!(U256::ZERO, fixture.erc20.allowance(owner, spender));
    assert_eq!(U256::ZERO, fixture.permit.nonces(owner));
}

#[test]
fn error_when_successful_permit_is_replayed() {
    let mut fixture = deploy();
    let owner = fixture.owner.address();
    let spender = fixture.spender.address();
    let deadline = U256::from(NOW + 3600);

    let (v, r, s) = sign(&fixture, ONE_TOKEN, U256::ZERO, deadline);
    fixture
        .permit
        .permit(owner, spender, ONE_TOKEN, deadline, v, r, s, &mut fixture.erc20)
        .expect("should permit");

    let err = fixture
        .permit
        .permit(owner, spender, ONE_TOKEN, deadline, v, r, s, &mut fixture.erc20)
        .expect_err("should reject the replay");

    // The nonce advanced, so the resubmitted signature no longer authorizes
    // the owner.
    assert!(matches!(
        err,
        permit::Error::InvalidSigner { .. }
            | permit::Error::InvalidSignature(_)
    ));
    assert_eq!(U256::ONE, fixture.permit.nonces(owner));
    assert_eq!(ONE_TOKEN, fixture.erc20.allowance(owner, spender));
}

#[test]
fn error_when_signature_is_from_another_chain() {
    let mut fixture = deploy();
    let owner = fixture.owner.address();
    let spender = fixture.spender.address();
    let deadline = U256::from(NOW + 3600);

    // Identical message signed for a different chain id.
    let foreign = Erc20Permit::with_clock(
        TOKEN_NAME,
        CHAIN_ID + 1,
        CONTRACT_ADDRESS,
        FrozenClock(NOW),
    );
    let (v, r, s) = sign_permit(
        &fixture.owner,
        foreign.eip712(),
        owner,
        spender,
        ONE_TOKEN,
        U256::ZERO,
        deadline,
    )
    .expect("should sign");

    let result = fixture.permit.permit(
        owner,
        spender,
        ONE_TOKEN,
        deadline,
        v,
        r,
        s,
        &mut fixture.erc20,
    );

    assert!(matches!(
        result,
        Err(permit::Error::InvalidSigner { .. }
            | permit::Error::InvalidSignature(_))
    ));
    assert_eq!(U256::ZERO, fixture.erc20.allowance(owner, spender));
}

#[test]
fn error_when_transfer_from_exceeds_the_permitted_value() {
    let mut fixture = deploy();
    let owner = fixture.owner.address();
    let spender = fixture.spender.address();
    let deadline = U256::from(NOW + 3600);
    let half = ONE_TOKEN / uint!(2_U256);

    let (v, r, s) = sign(&fixture, half, U256::ZERO, deadline);
    fixture
        .permit
        .permit(owner, spender, half, deadline, v, r, s, &mut fixture.erc20)
        .expect("should permit");

    let err = fixture
        .erc20
        .transfer_from(spender, owner, spender, ONE_TOKEN)
        .expect_err("should return `InsufficientAllowance`");
    assert!(matches!(
        err,
        permit_token::token::erc20::Error::InsufficientAllowance { .. }
    ));
}

#[test]
fn consecutive_permits_consume_consecutive_nonces() {
    let mut fixture = deploy();
    let owner = fixture.owner.address();
    let spender = fixture.spender.address();
    let deadline = U256::from(NOW + 3600);

    for (i, value) in [uint!(1_U256), uint!(2_U256), uint!(3_U256)]
        .into_iter()
        .enumerate()
    {
        let nonce = U256::from(i);
        assert_eq!(nonce, fixture.permit.nonces(owner));

        let (v, r, s) = sign(&fixture, value, nonce, deadline);
        fixture
            .permit
            .permit(owner, spender, value, deadline, v, r, s, &mut fixture.erc20)
            .expect("should permit");

        assert_eq!(value, fixture.erc20.allowance(owner, spender));
    }

    assert_eq!(U256::from(3), fixture.permit.nonces(owner));
}
