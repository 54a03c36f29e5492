//! Client-side protocol for encrypted one-hot voting.
//!
//! The crate drives a voting ledger and an FHE encryption/decryption service
//! through the [`Ledger`] and [`CryptoService`] traits. It never holds
//! durable state: topic phases are recomputed from the ledger clock for each
//! operation, ballots are encrypted fresh for every attempt, and aggregates
//! are only ever read.
//!
//! Write path: [`AddressBook`] → [`lifecycle::status`] → [`BallotEncoder`] →
//! [`SubmissionCoordinator`].
//! Read path: [`lifecycle::status`] → [`AggregateDecryptionCoordinator`].

pub mod address;
pub mod admin;
pub mod crypto;
pub mod decryption;
pub mod encoder;
pub mod error;
pub mod ledger;
pub mod lifecycle;
pub mod submission;
pub mod topic;

#[cfg(test)]
mod testing;

pub use address::{AddressBook, ConfigError, ContractEndpoint, NetworkId};
pub use admin::{TopicAdmin, TopicCreated, TopicSummary};
pub use crypto::{BallotBinding, CryptoService, EncryptedBallotMaterial, SigningContext};
pub use decryption::{AggregateDecryptionCoordinator, ClearTally, EncryptedAggregate, OptionTally};
pub use encoder::{encode_one_hot, BallotEncoder, OneHotVector};
pub use error::{classify, ErrorKind, VoteError};
pub use ledger::{CipherHandle, Ledger, RevertReason, TransactionReceipt, TransportError};
pub use lifecycle::{observe, status, TopicSnapshot, TopicStatus};
pub use submission::{OperationState, SubmissionCoordinator};
pub use topic::{Topic, TopicDraft, TopicId, Visibility, MAX_OPTIONS, MIN_OPTIONS};
