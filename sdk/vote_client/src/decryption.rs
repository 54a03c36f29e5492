//! Aggregate retrieval and threshold decryption.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use tracing::{debug, info};

use crate::address::NetworkId;
use crate::crypto::{CryptoService, SigningContext};
use crate::error::VoteError;
use crate::ledger::{CipherHandle, Ledger, TransportError};
use crate::lifecycle::{observe, TopicStatus};
use crate::topic::{Topic, TopicId};

/// Per-option encrypted running sum, in option order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncryptedAggregate {
    pub topic_id: TopicId,
    pub handles: Vec<CipherHandle>,
}

/// Decrypted aggregate, keyed by handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClearTally {
    pub topic_id: TopicId,
    pub values: HashMap<CipherHandle, u64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OptionTally {
    pub label: String,
    pub votes: u64,
}

impl ClearTally {
    /// Pair each option label with the value of the handle at the same
    /// position in `aggregate`.
    pub fn label<A>(
        &self,
        topic: &Topic<A>,
        aggregate: &EncryptedAggregate,
    ) -> Result<Vec<OptionTally>, VoteError> {
        if topic.id != self.topic_id || aggregate.topic_id != self.topic_id {
            return Err(VoteError::Validation(format!(
                "tally for topic {} cannot label topic {}",
                self.topic_id, topic.id
            )));
        }
        if aggregate.handles.len() != topic.option_count() {
            return Err(VoteError::Validation(format!(
                "{} handles for {} options",
                aggregate.handles.len(),
                topic.option_count()
            )));
        }

        topic
            .options
            .iter()
            .zip(&aggregate.handles)
            .map(|(label, handle)| -> Result<OptionTally, VoteError> {
                let votes = self.values.get(handle).copied().ok_or_else(|| {
                    VoteError::Validation(format!("no decrypted value for {handle}"))
                })?;
                Ok(OptionTally {
                    label: label.clone(),
                    votes,
                })
            })
            .collect()
    }
}

/// Releases the per-topic in-flight marker when the request finishes.
struct PendingDecryption<'s> {
    pending: &'s RefCell<HashSet<TopicId>>,
    topic_id: TopicId,
}

impl Drop for PendingDecryption<'_> {
    fn drop(&mut self) {
        self.pending.borrow_mut().remove(&self.topic_id);
    }
}

pub struct AggregateDecryptionCoordinator<'a, L, C>
where
    L: Ledger,
    C: CryptoService<Address = L::Address>,
{
    ledger: &'a L,
    crypto: &'a C,
    network: NetworkId,
    contract: L::Address,
    pending: RefCell<HashSet<TopicId>>,
}

impl<'a, L, C> AggregateDecryptionCoordinator<'a, L, C>
where
    L: Ledger,
    C: CryptoService<Address = L::Address>,
{
    pub fn new(ledger: &'a L, crypto: &'a C, network: NetworkId, contract: L::Address) -> Self {
        Self {
            ledger,
            crypto,
            network,
            contract,
            pending: RefCell::new(HashSet::new()),
        }
    }

    /// Aggregate handles of a topic whose voting is over. Read only.
    pub fn fetch_aggregate(&self, topic: &Topic<L::Address>) -> Result<EncryptedAggregate, VoteError> {
        let snapshot = observe(self.ledger, topic.id)?;
        if !snapshot.status.is_final() {
            return Err(VoteError::NotReady(topic.id));
        }

        let handles = self.ledger.get_encrypted_aggregate(topic.id)?;
        if handles.is_empty() {
            return Err(VoteError::NotReady(topic.id));
        }
        if handles.len() != snapshot.topic.option_count() {
            return Err(VoteError::Transaction(TransportError::BadResponse(format!(
                "aggregate has {} handles for {} options",
                handles.len(),
                snapshot.topic.option_count()
            ))));
        }

        debug!(topic_id = topic.id, handles = handles.len(), "aggregate fetched");
        Ok(EncryptedAggregate {
            topic_id: topic.id,
            handles,
        })
    }

    /// Decrypt every handle of `aggregate` in one oracle request.
    ///
    /// Only one request per topic may be pending at a time. The oracle must
    /// answer for every handle; a partial answer is an error, never a tally
    /// with gaps.
    pub fn decrypt(
        &self,
        aggregate: &EncryptedAggregate,
        requester: &L::Address,
        ctx: &SigningContext<L::Address>,
    ) -> Result<ClearTally, VoteError> {
        let topic_id = aggregate.topic_id;
        if aggregate.handles.is_empty() {
            return Err(VoteError::NotReady(topic_id));
        }
        let _pending = self.begin(topic_id)?;

        let snapshot = observe(self.ledger, topic_id)?;
        match snapshot.status {
            TopicStatus::NotStarted | TopicStatus::Open => {
                return Err(VoteError::NotReady(topic_id))
            }
            TopicStatus::Closed => {
                return Err(VoteError::Authorization(format!(
                    "results of topic {topic_id} are not published yet"
                )))
            }
            TopicStatus::Published => {}
        }

        let mut values = self.crypto.decrypt_aggregate(
            &self.contract,
            &aggregate.handles,
            requester,
            &self.network,
            ctx,
        )?;
        if let Some(missing) = aggregate.handles.iter().find(|h| !values.contains_key(*h)) {
            return Err(VoteError::Transaction(TransportError::BadResponse(format!(
                "oracle returned no value for {missing}"
            ))));
        }
        values.retain(|handle, _| aggregate.handles.contains(handle));

        info!(topic_id, handles = values.len(), "aggregate decrypted");
        Ok(ClearTally { topic_id, values })
    }

    /// Fetch, decrypt and label the results of `topic`.
    pub fn results(
        &self,
        topic: &Topic<L::Address>,
        requester: &L::Address,
        ctx: &SigningContext<L::Address>,
    ) -> Result<Vec<OptionTally>, VoteError> {
        let aggregate = self.fetch_aggregate(topic)?;
        self.decrypt(&aggregate, requester, ctx)?
            .label(topic, &aggregate)
    }

    fn begin(&self, topic_id: TopicId) -> Result<PendingDecryption<'_>, VoteError> {
        if !self.pending.borrow_mut().insert(topic_id) {
            return Err(VoteError::InFlight {
                topic_id,
                operation: "decryption",
            });
        }
        Ok(PendingDecryption {
            pending: &self.pending,
            topic_id,
        })
    }
}
