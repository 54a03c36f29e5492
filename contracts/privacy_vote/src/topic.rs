use soroban_sdk::{contracterror, contracttype, Address, String, Vec};

pub type TopicId = u64;

pub const MIN_OPTIONS: u32 = 2;
pub const MAX_OPTIONS: u32 = 10;

// ── Status codes returned by `get_topic_status` ─────────────────────────────

pub const STATUS_NOT_STARTED: u32 = 0;
pub const STATUS_OPEN: u32 = 1;
pub const STATUS_CLOSED: u32 = 2;
pub const STATUS_PUBLISHED: u32 = 3;

// ── Storage keys ────────────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Executor,
    TopicCount,
    Topic(TopicId),
    Aggregate(TopicId),
    Voted(TopicId, Address),
}

// ── Topic ───────────────────────────────────────────────────────────────────

/// Who may decrypt the aggregate once results are published.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum Visibility {
    /// Only the topic owner.
    Private = 0,
    /// Anyone.
    Public = 1,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Topic {
    pub name: String,
    pub details: String,
    pub options: Vec<String>,
    pub open_at: u64,
    pub close_at: u64,
    pub published: bool,
    pub owner: Address,
    pub visibility: Visibility,
}

impl Topic {
    /// Phase of the topic at ledger time `now`.
    pub fn status_code(&self, now: u64) -> u32 {
        if now < self.open_at {
            STATUS_NOT_STARTED
        } else if now < self.close_at {
            STATUS_OPEN
        } else if self.published {
            STATUS_PUBLISHED
        } else {
            STATUS_CLOSED
        }
    }
}

// ── Errors ──────────────────────────────────────────────────────────────────

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum VoteError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    Unauthorized = 3,
    TopicNotFound = 4,
    InvalidName = 5,
    InvalidOptions = 6,
    InvalidWindow = 7,
    TopicNotOpen = 8,
    BallotLengthMismatch = 9,
    AlreadyVoted = 10,
    InvalidInputProof = 11,
    TopicNotClosed = 12,
    AlreadyPublished = 13,
}
