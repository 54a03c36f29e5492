//! Topic creation and listing.

use tracing::info;

use crate::crypto::SigningContext;
use crate::error::VoteError;
use crate::ledger::{Ledger, TransactionReceipt};
use crate::lifecycle::{status, TopicStatus};
use crate::topic::{Topic, TopicDraft, TopicId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopicCreated {
    pub topic_id: TopicId,
    pub receipt: TransactionReceipt,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopicSummary<A> {
    pub topic: Topic<A>,
    pub status: TopicStatus,
}

pub struct TopicAdmin<'a, L: Ledger> {
    ledger: &'a L,
}

impl<'a, L: Ledger> TopicAdmin<'a, L> {
    pub fn new(ledger: &'a L) -> Self {
        Self { ledger }
    }

    /// Validate `draft` locally, then register it on the ledger under `owner`.
    pub fn create_topic(
        &self,
        draft: &TopicDraft,
        owner: &L::Address,
        ctx: &SigningContext<L::Address>,
    ) -> Result<TopicCreated, VoteError> {
        let draft = draft.validate()?;
        if ctx.signer != *owner {
            return Err(VoteError::Validation(
                "topics must be signed by their owner".into(),
            ));
        }

        let (topic_id, receipt) = self.ledger.create_topic(owner, &draft)?;
        info!(
            topic_id,
            options = draft.options.len(),
            open_at = draft.open_at,
            close_at = draft.close_at,
            "topic created"
        );
        Ok(TopicCreated { topic_id, receipt })
    }

    /// Every topic on the ledger, newest first, with its phase at the
    /// current ledger time.
    pub fn list_topics(&self) -> Result<Vec<TopicSummary<L::Address>>, VoteError> {
        let now = self.ledger.ledger_time()?;
        let count = self.ledger.get_topic_count()?;

        (1..=count)
            .rev()
            .map(|id| -> Result<TopicSummary<L::Address>, VoteError> {
                let topic = self.ledger.get_topic(id)?;
                let status = status(&topic, now);
                Ok(TopicSummary { topic, status })
            })
            .collect()
    }
}
