//! Protocol error taxonomy shared by both coordinators.

use thiserror::Error;

use crate::ledger::{RevertReason, TransportError};
use crate::lifecycle::TopicStatus;
use crate::topic::TopicId;

/// Coarse error kind, stable enough to branch on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Bad input. Raised before anything leaves the process.
    Validation,
    /// Operation attempted in the wrong lifecycle phase, or while another
    /// operation on the same topic is still pending.
    State,
    /// Decryption refused by access control.
    Authorization,
    /// The aggregate does not exist yet.
    NotReady,
    /// Provider unreachable.
    Network,
    /// Ledger call reverted, timed out or was otherwise rejected.
    Transaction,
}

#[derive(Debug, Error)]
pub enum VoteError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("cannot {operation} topic {topic_id} while it is {status}")]
    WrongPhase {
        topic_id: TopicId,
        operation: &'static str,
        status: TopicStatus,
    },

    #[error("a {operation} for topic {topic_id} is already in flight")]
    InFlight {
        topic_id: TopicId,
        operation: &'static str,
    },

    #[error("not authorized: {0}")]
    Authorization(String),

    #[error("aggregate for topic {0} is not available yet")]
    NotReady(TopicId),

    #[error("network failure")]
    Network(#[source] TransportError),

    #[error("transaction failed")]
    Transaction(#[source] TransportError),
}

impl VoteError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            VoteError::Validation(_) => ErrorKind::Validation,
            VoteError::WrongPhase { .. } | VoteError::InFlight { .. } => ErrorKind::State,
            VoteError::Authorization(_) => ErrorKind::Authorization,
            VoteError::NotReady(_) => ErrorKind::NotReady,
            VoteError::Network(_) => ErrorKind::Network,
            VoteError::Transaction(_) => ErrorKind::Transaction,
        }
    }

    /// The ledger rejected a second ballot from the same voter.
    pub fn is_duplicate_submission(&self) -> bool {
        matches!(
            self,
            VoteError::Transaction(TransportError::Reverted(RevertReason::DuplicateSubmission))
        )
    }

    /// A write whose effect may or may not have been applied. Re-query the
    /// ledger before trying again.
    pub fn is_unknown_outcome(&self) -> bool {
        matches!(self, VoteError::Transaction(TransportError::TimedOut))
    }
}

/// Map a collaborator failure onto the protocol taxonomy.
///
/// Only [`ErrorKind::Network`], [`ErrorKind::Authorization`] and
/// [`ErrorKind::Transaction`] can originate outside the process.
pub fn classify(err: &TransportError) -> ErrorKind {
    match err {
        TransportError::Unreachable(_) => ErrorKind::Network,
        TransportError::AccessDenied(_) => ErrorKind::Authorization,
        TransportError::TimedOut | TransportError::Reverted(_) | TransportError::BadResponse(_) => {
            ErrorKind::Transaction
        }
    }
}

impl From<TransportError> for VoteError {
    fn from(err: TransportError) -> Self {
        match classify(&err) {
            ErrorKind::Network => VoteError::Network(err),
            ErrorKind::Authorization => VoteError::Authorization(err.to_string()),
            _ => VoteError::Transaction(err),
        }
    }
}
