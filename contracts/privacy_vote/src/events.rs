#![allow(deprecated)] // events().publish migration tracked separately

use soroban_sdk::{symbol_short, Address, Env};

use crate::topic::{TopicId, Visibility};

// ── Event payloads ──────────────────────────────────────────────────────────

/// Fired once when the hub is bound to its coprocessor.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub executor: Address,
    pub timestamp: u64,
}

/// Fired when a new topic is registered.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TopicCreatedEvent {
    pub topic_id: TopicId,
    pub owner: Address,
    pub option_count: u32,
    pub open_at: u64,
    pub close_at: u64,
    pub timestamp: u64,
}

/// Fired when an encrypted ballot is folded into the aggregate.
///
/// Carries who voted, never what they chose.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BallotAcceptedEvent {
    pub topic_id: TopicId,
    pub voter: Address,
    pub timestamp: u64,
}

/// Fired when the owner releases the aggregate for decryption.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResultsPublishedEvent {
    pub topic_id: TopicId,
    pub visibility: Visibility,
    pub timestamp: u64,
}

// ── Publishers ──────────────────────────────────────────────────────────────

pub fn publish_initialized(env: &Env, executor: Address) {
    env.events().publish(
        (symbol_short!("INIT"),),
        InitializedEvent {
            executor,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_topic_created(
    env: &Env,
    topic_id: TopicId,
    owner: Address,
    option_count: u32,
    open_at: u64,
    close_at: u64,
) {
    env.events().publish(
        (symbol_short!("TOPIC"), topic_id),
        TopicCreatedEvent {
            topic_id,
            owner,
            option_count,
            open_at,
            close_at,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_ballot_accepted(env: &Env, topic_id: TopicId, voter: Address) {
    env.events().publish(
        (symbol_short!("BALLOT"), topic_id),
        BallotAcceptedEvent {
            topic_id,
            voter,
            timestamp: env.ledger().timestamp(),
        },
    );
}

pub fn publish_results_published(env: &Env, topic_id: TopicId, visibility: Visibility) {
    env.events().publish(
        (symbol_short!("PUBLISH"), topic_id),
        ResultsPublishedEvent {
            topic_id,
            visibility,
            timestamp: env.ledger().timestamp(),
        },
    );
}
