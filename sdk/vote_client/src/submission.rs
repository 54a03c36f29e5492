//! Exactly-once ballot submission.

use std::cell::RefCell;
use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::crypto::{BallotBinding, CryptoService, SigningContext};
use crate::encoder::{encode_one_hot, BallotEncoder, OneHotVector};
use crate::error::{ErrorKind, VoteError};
use crate::ledger::{Ledger, TransactionReceipt};
use crate::lifecycle;
use crate::topic::{Topic, TopicId};

/// Progress of the latest submission for a topic in this session.
///
/// `Failed` is sticky until the next `submit`, which moves straight to
/// `Encrypting` with fresh encryption material. A submission that unwinds
/// before settling leaves `Failed(Transaction)`, since its ballot may or may
/// not have landed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OperationState {
    #[default]
    Idle,
    Encrypting,
    Submitting,
    Confirmed,
    Failed(ErrorKind),
}

impl OperationState {
    pub fn is_in_flight(self) -> bool {
        matches!(self, OperationState::Encrypting | OperationState::Submitting)
    }
}

/// Holds a topic in flight. Dropped without [`settle`](Self::settle), it
/// records the attempt as failed with an unknown outcome.
struct InFlightSubmission<'s> {
    states: &'s RefCell<HashMap<TopicId, OperationState>>,
    topic_id: TopicId,
    settled: bool,
}

impl InFlightSubmission<'_> {
    fn advance(&self, state: OperationState) {
        self.states.borrow_mut().insert(self.topic_id, state);
    }

    fn settle(mut self, state: OperationState) {
        self.advance(state);
        self.settled = true;
    }
}

impl Drop for InFlightSubmission<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.advance(OperationState::Failed(ErrorKind::Transaction));
        }
    }
}

pub struct SubmissionCoordinator<'a, L, C>
where
    L: Ledger,
    C: CryptoService<Address = L::Address>,
{
    ledger: &'a L,
    encoder: BallotEncoder<'a, C>,
    contract: L::Address,
    states: RefCell<HashMap<TopicId, OperationState>>,
}

impl<'a, L, C> SubmissionCoordinator<'a, L, C>
where
    L: Ledger,
    C: CryptoService<Address = L::Address>,
{
    /// `contract` is the hub address resolved for the encoder's network.
    pub fn new(ledger: &'a L, encoder: BallotEncoder<'a, C>, contract: L::Address) -> Self {
        Self {
            ledger,
            encoder,
            contract,
            states: RefCell::new(HashMap::new()),
        }
    }

    pub fn state(&self, topic_id: TopicId) -> OperationState {
        self.states
            .borrow()
            .get(&topic_id)
            .copied()
            .unwrap_or_default()
    }

    /// Encrypt a vote for option `selected` and submit it in one ledger call.
    ///
    /// Validation and phase errors are raised before anything state-changing
    /// leaves the process. No failure is retried. A
    /// [`VoteError::is_unknown_outcome`] failure must be followed by
    /// [`Self::has_recorded_ballot`] before submitting again.
    pub fn submit(
        &self,
        topic: &Topic<L::Address>,
        selected: usize,
        voter: &L::Address,
        ctx: &SigningContext<L::Address>,
    ) -> Result<TransactionReceipt, VoteError> {
        let topic_id = topic.id;
        if self.state(topic_id).is_in_flight() {
            return Err(VoteError::InFlight {
                topic_id,
                operation: "submission",
            });
        }

        let ballot = encode_one_hot(topic.option_count(), selected)?;

        let now = self.ledger.ledger_time()?;
        let status = lifecycle::status(topic, now);
        if !status.accepts_ballots() {
            return Err(VoteError::WrongPhase {
                topic_id,
                operation: "submit to",
                status,
            });
        }

        let flight = self.begin(topic_id);
        let outcome = self.encrypt_and_submit(&flight, &ballot, voter, ctx);
        match &outcome {
            Ok(receipt) => {
                info!(topic_id, sequence = receipt.sequence, "ballot accepted");
                flight.settle(OperationState::Confirmed);
            }
            Err(err) => {
                warn!(topic_id, kind = ?err.kind(), error = %err, "ballot submission failed");
                flight.settle(OperationState::Failed(err.kind()));
            }
        }
        outcome
    }

    /// Ask the ledger whether `voter` has a ballot on record for the topic,
    /// settling the local state if it does.
    pub fn has_recorded_ballot(
        &self,
        topic_id: TopicId,
        voter: &L::Address,
    ) -> Result<bool, VoteError> {
        let recorded = self.ledger.has_voted(topic_id, voter)?;
        if recorded {
            self.set_state(topic_id, OperationState::Confirmed);
        }
        Ok(recorded)
    }

    fn begin(&self, topic_id: TopicId) -> InFlightSubmission<'_> {
        let flight = InFlightSubmission {
            states: &self.states,
            topic_id,
            settled: false,
        };
        flight.advance(OperationState::Encrypting);
        flight
    }

    fn encrypt_and_submit(
        &self,
        flight: &InFlightSubmission<'_>,
        ballot: &OneHotVector,
        voter: &L::Address,
        ctx: &SigningContext<L::Address>,
    ) -> Result<TransactionReceipt, VoteError> {
        let topic_id = flight.topic_id;
        let binding = BallotBinding {
            contract: self.contract.clone(),
            voter: voter.clone(),
        };
        let material = self.encoder.encrypt(&binding, ballot, ctx)?;

        flight.advance(OperationState::Submitting);
        debug!(topic_id, handles = material.handles.len(), "submitting ballot");
        let receipt = self.ledger.submit_cipher_one_hot(
            voter,
            topic_id,
            &material.handles,
            &material.proof,
        )?;
        Ok(receipt)
    }

    fn set_state(&self, topic_id: TopicId, state: OperationState) {
        self.states.borrow_mut().insert(topic_id, state);
    }
}
