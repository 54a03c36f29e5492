//! `Ledger` over a `PrivacyVoteHub` registered in a Soroban test environment.

use std::cell::Cell;

use soroban_sdk::{Address, Env, String as SorobanString, Vec as SorobanVec};
use tracing::trace;

use privacy_vote::PrivacyVoteHubClient;
use vote_client::{
    CipherHandle, Ledger, Topic, TopicDraft, TopicId, TransactionReceipt, TransportError,
};

use crate::convert::{
    from_handles, host_revert, hub_revert, proof_bytes, settle, to_handles, topic_from_hub,
    visibility_to_hub,
};

/// Faults the adapter can inject in front of the hub.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LedgerFault {
    /// Every call fails before reaching the hub.
    Offline,
    /// The next ballot is applied, then reported as timed out.
    TimeOutAfterNextBallot,
}

pub struct SorobanLedger {
    env: Env,
    hub: PrivacyVoteHubClient<'static>,
    fault: Cell<Option<LedgerFault>>,
    calls: Cell<usize>,
    writes: Cell<usize>,
}

impl SorobanLedger {
    pub fn new(env: &Env, hub: &Address) -> Self {
        Self {
            env: env.clone(),
            hub: PrivacyVoteHubClient::new(env, hub),
            fault: Cell::new(None),
            calls: Cell::new(0),
            writes: Cell::new(0),
        }
    }

    pub fn inject(&self, fault: Option<LedgerFault>) {
        self.fault.set(fault);
    }

    /// Round trips made so far, including ones refused by an injected fault.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    /// State-changing calls made so far.
    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    fn call(&self, method: &'static str) -> Result<(), TransportError> {
        self.calls.set(self.calls.get() + 1);
        trace!(method, "ledger call");
        if self.fault.get() == Some(LedgerFault::Offline) {
            return Err(TransportError::Unreachable("sandbox ledger is offline".into()));
        }
        Ok(())
    }

    fn write(&self, method: &'static str) -> Result<(), TransportError> {
        self.writes.set(self.writes.get() + 1);
        self.call(method)
    }

    fn receipt(&self) -> TransactionReceipt {
        TransactionReceipt {
            sequence: self.env.ledger().sequence(),
            timestamp: self.env.ledger().timestamp(),
        }
    }
}

impl Ledger for SorobanLedger {
    type Address = Address;

    fn ledger_time(&self) -> Result<u64, TransportError> {
        self.call("ledger_time")?;
        Ok(self.env.ledger().timestamp())
    }

    fn get_topic(&self, topic_id: TopicId) -> Result<Topic<Address>, TransportError> {
        self.call("get_topic")?;
        let topic = settle(self.hub.try_get_topic(&topic_id), hub_revert)?;
        Ok(topic_from_hub(topic_id, topic))
    }

    fn get_topic_status(&self, topic_id: TopicId) -> Result<u32, TransportError> {
        self.call("get_topic_status")?;
        settle(self.hub.try_get_topic_status(&topic_id), hub_revert)
    }

    fn get_topic_count(&self) -> Result<u64, TransportError> {
        self.call("get_topic_count")?;
        settle(self.hub.try_get_topic_count(), host_revert)
    }

    fn get_encrypted_aggregate(&self, topic_id: TopicId) -> Result<Vec<CipherHandle>, TransportError> {
        self.call("get_encrypted_aggregate")?;
        let handles = settle(self.hub.try_get_encrypted_aggregate(&topic_id), hub_revert)?;
        Ok(to_handles(&handles))
    }

    fn submit_cipher_one_hot(
        &self,
        voter: &Address,
        topic_id: TopicId,
        handles: &[CipherHandle],
        proof: &[u8],
    ) -> Result<TransactionReceipt, TransportError> {
        self.write("submit_cipher_one_hot")?;
        let proof = proof_bytes(&self.env, proof)?;
        let handles = from_handles(&self.env, handles);

        settle(
            self.hub
                .try_submit_cipher_one_hot(voter, &topic_id, &handles, &proof),
            hub_revert,
        )?;

        if self.fault.get() == Some(LedgerFault::TimeOutAfterNextBallot) {
            self.fault.set(None);
            return Err(TransportError::TimedOut);
        }
        Ok(self.receipt())
    }

    fn create_topic(
        &self,
        owner: &Address,
        draft: &TopicDraft,
    ) -> Result<(TopicId, TransactionReceipt), TransportError> {
        self.write("create_topic")?;
        let mut options = SorobanVec::new(&self.env);
        for label in &draft.options {
            options.push_back(SorobanString::from_str(&self.env, label));
        }

        let topic_id = settle(
            self.hub.try_create_topic(
                owner,
                &SorobanString::from_str(&self.env, &draft.name),
                &SorobanString::from_str(&self.env, &draft.details),
                &options,
                &draft.open_at,
                &draft.close_at,
                &visibility_to_hub(draft.visibility),
            ),
            hub_revert,
        )?;
        Ok((topic_id, self.receipt()))
    }

    fn has_voted(&self, topic_id: TopicId, voter: &Address) -> Result<bool, TransportError> {
        self.call("has_voted")?;
        settle(self.hub.try_has_voted(&topic_id, voter), host_revert)
    }
}
