#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, BytesN, Env};

// ── Event payloads ──────────────────────────────────────────────────────────

/// Fired when a user registers fresh encrypted input for a contract.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InputRegisteredEvent {
    pub contract: Address,
    pub user: Address,
    pub proof: BytesN<32>,
    pub handle_count: u32,
    pub timestamp: u64,
}

/// Fired when a contract consumes an input proof.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InputSpentEvent {
    pub contract: Address,
    pub user: Address,
    pub proof: BytesN<32>,
    pub timestamp: u64,
}

/// Fired when a handle becomes decryptable by anyone.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HandlePublishedEvent {
    pub contract: Address,
    pub handle: BytesN<32>,
    pub timestamp: u64,
}

/// Fired for every served decryption batch. Values are never included.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecryptionServedEvent {
    pub contract: Address,
    pub requester: Address,
    pub handle_count: u32,
    pub timestamp: u64,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_input_registered(
    env: &Env,
    contract: Address,
    user: Address,
    proof: BytesN<32>,
    handle_count: u32,
) {
    env.events().publish(
        (symbol_short!("INPUT"), user.clone()),
        InputRegisteredEvent {
            contract,
            user,
            proof,
            handle_count,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_input_spent(env: &Env, contract: Address, user: Address, proof: BytesN<32>) {
    env.events().publish(
        (symbol_short!("SPENT"), user.clone()),
        InputSpentEvent {
            contract,
            user,
            proof,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_handle_published(env: &Env, contract: Address, handle: BytesN<32>) {
    env.events().publish(
        (symbol_short!("PUBLIC"),),
        HandlePublishedEvent {
            contract,
            handle,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_decryption_served(
    env: &Env,
    contract: Address,
    requester: Address,
    handle_count: u32,
) {
    env.events().publish(
        (symbol_short!("DECRYPT"), requester.clone()),
        DecryptionServedEvent {
            contract,
            requester,
            handle_count,
            timestamp: env.ledger().timestamp(),
        },
    );
}
