//! Topic phase derivation.
//!
//! The phase is never stored. It is recomputed from the topic's window, its
//! `published` flag and the ledger clock every time an operation needs it.

use std::fmt;

use tracing::{debug, warn};

use crate::error::VoteError;
use crate::ledger::Ledger;
use crate::topic::{Topic, TopicId};

pub const CODE_NOT_STARTED: u32 = 0;
pub const CODE_OPEN: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TopicStatus {
    NotStarted,
    Open,
    Closed,
    Published,
}

impl TopicStatus {
    pub fn accepts_ballots(self) -> bool {
        self == TopicStatus::Open
    }

    /// Voting is over, whether or not results have been released.
    pub fn is_final(self) -> bool {
        matches!(self, TopicStatus::Closed | TopicStatus::Published)
    }

    /// Whether the ledger's raw phase code is consistent with this status.
    /// Codes from 2 upward all mean "voting over"; the ledger's split between
    /// closed and published is not relied on.
    pub fn agrees_with_code(self, code: u32) -> bool {
        match self {
            TopicStatus::NotStarted => code == CODE_NOT_STARTED,
            TopicStatus::Open => code == CODE_OPEN,
            TopicStatus::Closed | TopicStatus::Published => code > CODE_OPEN,
        }
    }
}

impl fmt::Display for TopicStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TopicStatus::NotStarted => "not started",
            TopicStatus::Open => "open",
            TopicStatus::Closed => "closed",
            TopicStatus::Published => "published",
        })
    }
}

/// Phase of `topic` at ledger time `now`. The window is half-open:
/// `open_at` is the first open second, `close_at` the first closed one.
pub fn status<A>(topic: &Topic<A>, now: u64) -> TopicStatus {
    if now < topic.open_at {
        TopicStatus::NotStarted
    } else if now < topic.close_at {
        TopicStatus::Open
    } else if topic.published {
        TopicStatus::Published
    } else {
        TopicStatus::Closed
    }
}

/// A topic together with the phase derived for it. Valid for the operation
/// that took it and no longer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopicSnapshot<A> {
    pub topic: Topic<A>,
    pub status: TopicStatus,
    pub now: u64,
}

/// Read the topic and the ledger clock, derive the phase, and cross-check it
/// against the ledger's own status code. A disagreement is logged; the local
/// derivation wins.
pub fn observe<L: Ledger>(ledger: &L, topic_id: TopicId) -> Result<TopicSnapshot<L::Address>, VoteError> {
    let topic = ledger.get_topic(topic_id)?;
    let now = ledger.ledger_time()?;
    let status = status(&topic, now);

    let code = ledger.get_topic_status(topic_id)?;
    if status.agrees_with_code(code) {
        debug!(topic_id, %status, code, "topic status observed");
    } else {
        warn!(topic_id, %status, code, now, "ledger status code disagrees with derived status");
    }

    Ok(TopicSnapshot { topic, status, now })
}
