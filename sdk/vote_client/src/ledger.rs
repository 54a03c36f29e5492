//! The ledger surface the protocol core consumes.

use std::fmt;

use thiserror::Error;

use crate::topic::{Topic, TopicDraft, TopicId};

/// Opaque reference to a ciphertext held by the ledger's coprocessor.
///
/// Handles carry no meaning beyond their position in a sequence.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CipherHandle([u8; 32]);

impl CipherHandle {
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub const fn to_bytes(self) -> [u8; 32] {
        self.0
    }
}

impl fmt::Display for CipherHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("0x")?;
        for byte in self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for CipherHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CipherHandle({self})")
    }
}

/// Confirmation of a state-changing ledger call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionReceipt {
    /// Ledger sequence the call was applied in.
    pub sequence: u32,
    /// Ledger close time of that sequence.
    pub timestamp: u64,
}

/// Why the ledger refused a call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RevertReason {
    /// The voter already has a ballot on record for the topic.
    DuplicateSubmission,
    TopicNotFound,
    /// The ledger's clock places the call outside the topic's window.
    OutsideWindow,
    /// Ballot shape does not match the topic.
    MalformedBallot,
    /// Input proof unknown, spent, or bound to another contract or account.
    InvalidProof,
    Unauthorized,
    /// Topic parameters refused by the ledger.
    InvalidTopic,
    /// Any other contract error, by code.
    Code(u32),
    /// The call trapped without a contract error.
    Aborted(String),
}

impl fmt::Display for RevertReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateSubmission => f.write_str("ballot already submitted"),
            Self::TopicNotFound => f.write_str("topic not found"),
            Self::OutsideWindow => f.write_str("outside the voting window"),
            Self::MalformedBallot => f.write_str("malformed ballot"),
            Self::InvalidProof => f.write_str("input proof rejected"),
            Self::Unauthorized => f.write_str("caller not authorized"),
            Self::InvalidTopic => f.write_str("topic parameters rejected"),
            Self::Code(code) => write!(f, "contract error #{code}"),
            Self::Aborted(detail) => write!(f, "aborted: {detail}"),
        }
    }
}

/// Failure reported by a [`Ledger`] or [`CryptoService`](crate::CryptoService)
/// implementation. [`classify`](crate::error::classify) maps it onto the
/// protocol error taxonomy.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("provider unreachable: {0}")]
    Unreachable(String),
    /// No answer in time. The effect of a write may or may not have landed.
    #[error("no response before the deadline")]
    TimedOut,
    #[error("call reverted: {0}")]
    Reverted(RevertReason),
    #[error("access denied: {0}")]
    AccessDenied(String),
    #[error("unusable response: {0}")]
    BadResponse(String),
}

/// Statically typed view of the voting ledger.
///
/// Every method is one round trip. Implementations must not retry
/// state-changing calls on their own.
pub trait Ledger {
    type Address: Clone + fmt::Debug + PartialEq;

    /// The ledger's authoritative clock, in seconds.
    fn ledger_time(&self) -> Result<u64, TransportError>;

    fn get_topic(&self, topic_id: TopicId) -> Result<Topic<Self::Address>, TransportError>;

    /// Raw phase code; see [`TopicStatus::agrees_with_code`](crate::TopicStatus::agrees_with_code).
    fn get_topic_status(&self, topic_id: TopicId) -> Result<u32, TransportError>;

    fn get_topic_count(&self) -> Result<u64, TransportError>;

    /// Aggregate handles in option order.
    fn get_encrypted_aggregate(&self, topic_id: TopicId)
        -> Result<Vec<CipherHandle>, TransportError>;

    fn submit_cipher_one_hot(
        &self,
        voter: &Self::Address,
        topic_id: TopicId,
        handles: &[CipherHandle],
        proof: &[u8],
    ) -> Result<TransactionReceipt, TransportError>;

    fn create_topic(
        &self,
        owner: &Self::Address,
        draft: &TopicDraft,
    ) -> Result<(TopicId, TransactionReceipt), TransportError>;

    /// Whether the ledger holds a ballot from `voter` for the topic.
    fn has_voted(&self, topic_id: TopicId, voter: &Self::Address) -> Result<bool, TransportError>;
}
