//! In-memory ledger and crypto service for unit tests.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use crate::address::NetworkId;
use crate::crypto::{BallotBinding, CryptoService, EncryptedBallotMaterial, SigningContext};
use crate::encoder::OneHotVector;
use crate::ledger::{CipherHandle, Ledger, RevertReason, TransactionReceipt, TransportError};
use crate::lifecycle::{status, TopicStatus};
use crate::topic::{Topic, TopicDraft, TopicId, Visibility};

pub type Addr = &'static str;

pub const HUB: Addr = "hub";
pub const OWNER: Addr = "owner";

fn handle(tag: u8, n: u64) -> CipherHandle {
    let mut bytes = [0u8; 32];
    bytes[0] = tag;
    bytes[24..].copy_from_slice(&n.to_be_bytes());
    CipherHandle::from_bytes(bytes)
}

/// Handle of option `index` in the aggregate of `topic_id`.
pub fn aggregate_handle(topic_id: TopicId, index: usize) -> CipherHandle {
    handle(0xaa, topic_id * 100 + index as u64)
}

// ── Crypto ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CryptoFault {
    WrongBinding,
    ShortHandles,
    RepeatProof,
    Unreachable,
    DenyDecrypt,
    OmitHandle,
    Panic,
}

#[derive(Default)]
pub struct FakeCrypto {
    fault: Option<CryptoFault>,
    counter: Cell<u64>,
    encrypt_calls: Cell<usize>,
    decrypt_calls: Cell<usize>,
    clear: RefCell<HashMap<CipherHandle, u64>>,
}

impl FakeCrypto {
    pub fn with_fault(fault: CryptoFault) -> Self {
        Self {
            fault: Some(fault),
            ..Self::default()
        }
    }

    pub fn set_clear(&self, handle: CipherHandle, value: u64) {
        self.clear.borrow_mut().insert(handle, value);
    }

    pub fn encrypt_calls(&self) -> usize {
        self.encrypt_calls.get()
    }

    pub fn decrypt_calls(&self) -> usize {
        self.decrypt_calls.get()
    }

    fn next(&self) -> u64 {
        let n = self.counter.get() + 1;
        self.counter.set(n);
        n
    }
}

impl CryptoService for FakeCrypto {
    type Address = Addr;

    fn encrypt_one_hot(
        &self,
        binding: &BallotBinding<Addr>,
        plaintext: &OneHotVector,
        _network: &NetworkId,
        _ctx: &SigningContext<Addr>,
    ) -> Result<EncryptedBallotMaterial<Addr>, TransportError> {
        self.encrypt_calls.set(self.encrypt_calls.get() + 1);
        match self.fault {
            Some(CryptoFault::Unreachable) => {
                return Err(TransportError::Unreachable("relayer offline".into()))
            }
            Some(CryptoFault::Panic) => panic!("relayer crashed mid-encryption"),
            _ => {}
        }

        let mut handles = Vec::new();
        for &value in plaintext.as_slice() {
            let h = handle(0xbb, self.next());
            self.set_clear(h, u64::from(value));
            handles.push(h);
        }
        if self.fault == Some(CryptoFault::ShortHandles) {
            handles.pop();
        }

        let proof = if self.fault == Some(CryptoFault::RepeatProof) {
            vec![7; 32]
        } else {
            self.next().to_be_bytes().to_vec()
        };

        let mut binding = binding.clone();
        if self.fault == Some(CryptoFault::WrongBinding) {
            binding.voter = "mallory";
        }

        Ok(EncryptedBallotMaterial {
            binding,
            handles,
            proof,
        })
    }

    fn decrypt_aggregate(
        &self,
        _contract: &Addr,
        handles: &[CipherHandle],
        _requester: &Addr,
        _network: &NetworkId,
        _ctx: &SigningContext<Addr>,
    ) -> Result<HashMap<CipherHandle, u64>, TransportError> {
        self.decrypt_calls.set(self.decrypt_calls.get() + 1);
        match self.fault {
            Some(CryptoFault::Unreachable) => {
                return Err(TransportError::Unreachable("oracle offline".into()))
            }
            Some(CryptoFault::DenyDecrypt) => {
                return Err(TransportError::AccessDenied("requester not allowed".into()))
            }
            _ => {}
        }

        let clear = self.clear.borrow();
        let mut out: HashMap<CipherHandle, u64> = handles
            .iter()
            .filter_map(|h| clear.get(h).map(|v| (*h, *v)))
            .collect();
        if self.fault == Some(CryptoFault::OmitHandle) {
            if let Some(last) = handles.last() {
                out.remove(last);
            }
        }
        Ok(out)
    }
}

// ── Ledger ──────────────────────────────────────────────────────────────────

pub enum SubmitFault {
    Reject(TransportError),
    /// The ballot is recorded but the caller never hears back.
    LandThenTimeOut,
}

#[derive(Default)]
pub struct FakeLedger {
    now: Cell<u64>,
    topics: RefCell<Vec<Topic<Addr>>>,
    voted: RefCell<HashSet<(TopicId, Addr)>>,
    status_code: Cell<Option<u32>>,
    submit_fault: RefCell<Option<SubmitFault>>,
    calls: Cell<usize>,
    writes: Cell<usize>,
}

impl FakeLedger {
    pub fn at(now: u64) -> Self {
        let ledger = Self::default();
        ledger.now.set(now);
        ledger
    }

    pub fn set_time(&self, now: u64) {
        self.now.set(now);
    }

    pub fn add_topic(&self, options: &[&str], open_at: u64, close_at: u64, visibility: Visibility) -> TopicId {
        let mut topics = self.topics.borrow_mut();
        let id = topics.len() as TopicId + 1;
        topics.push(Topic {
            id,
            name: format!("topic {id}"),
            details: String::new(),
            options: options.iter().map(|o| o.to_string()).collect(),
            open_at,
            close_at,
            published: false,
            owner: OWNER,
            visibility,
        });
        id
    }

    pub fn publish(&self, topic_id: TopicId) {
        self.topics.borrow_mut()[topic_id as usize - 1].published = true;
    }

    pub fn topic(&self, topic_id: TopicId) -> Topic<Addr> {
        self.topics.borrow()[topic_id as usize - 1].clone()
    }

    /// Force the raw status code the ledger reports.
    pub fn report_status_code(&self, code: u32) {
        self.status_code.set(Some(code));
    }

    pub fn fail_next_submit(&self, fault: SubmitFault) {
        *self.submit_fault.borrow_mut() = Some(fault);
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    pub fn writes(&self) -> usize {
        self.writes.get()
    }

    fn call(&self) {
        self.calls.set(self.calls.get() + 1);
    }

    fn find(&self, topic_id: TopicId) -> Result<Topic<Addr>, TransportError> {
        self.topics
            .borrow()
            .iter()
            .find(|t| t.id == topic_id)
            .cloned()
            .ok_or(TransportError::Reverted(RevertReason::TopicNotFound))
    }

    fn receipt(&self) -> TransactionReceipt {
        TransactionReceipt {
            sequence: self.writes.get() as u32,
            timestamp: self.now.get(),
        }
    }
}

impl Ledger for FakeLedger {
    type Address = Addr;

    fn ledger_time(&self) -> Result<u64, TransportError> {
        self.call();
        Ok(self.now.get())
    }

    fn get_topic(&self, topic_id: TopicId) -> Result<Topic<Addr>, TransportError> {
        self.call();
        self.find(topic_id)
    }

    fn get_topic_status(&self, topic_id: TopicId) -> Result<u32, TransportError> {
        self.call();
        let topic = self.find(topic_id)?;
        if let Some(code) = self.status_code.get() {
            return Ok(code);
        }
        Ok(match status(&topic, self.now.get()) {
            TopicStatus::NotStarted => 0,
            TopicStatus::Open => 1,
            TopicStatus::Closed => 2,
            TopicStatus::Published => 3,
        })
    }

    fn get_topic_count(&self) -> Result<u64, TransportError> {
        self.call();
        Ok(self.topics.borrow().len() as u64)
    }

    fn get_encrypted_aggregate(&self, topic_id: TopicId) -> Result<Vec<CipherHandle>, TransportError> {
        self.call();
        let topic = self.find(topic_id)?;
        Ok((0..topic.option_count())
            .map(|i| aggregate_handle(topic_id, i))
            .collect())
    }

    fn submit_cipher_one_hot(
        &self,
        voter: &Addr,
        topic_id: TopicId,
        handles: &[CipherHandle],
        proof: &[u8],
    ) -> Result<TransactionReceipt, TransportError> {
        self.call();
        self.writes.set(self.writes.get() + 1);

        let fault = self.submit_fault.borrow_mut().take();
        if let Some(SubmitFault::Reject(err)) = fault {
            return Err(err);
        }

        let topic = self.find(topic_id)?;
        if !status(&topic, self.now.get()).accepts_ballots() {
            return Err(TransportError::Reverted(RevertReason::OutsideWindow));
        }
        if handles.len() != topic.option_count() || proof.is_empty() {
            return Err(TransportError::Reverted(RevertReason::MalformedBallot));
        }
        if !self.voted.borrow_mut().insert((topic_id, *voter)) {
            return Err(TransportError::Reverted(RevertReason::DuplicateSubmission));
        }

        if let Some(SubmitFault::LandThenTimeOut) = fault {
            return Err(TransportError::TimedOut);
        }
        Ok(self.receipt())
    }

    fn create_topic(
        &self,
        owner: &Addr,
        draft: &TopicDraft,
    ) -> Result<(TopicId, TransactionReceipt), TransportError> {
        self.call();
        self.writes.set(self.writes.get() + 1);
        let options: Vec<&str> = draft.options.iter().map(String::as_str).collect();
        let id = self.add_topic(&options, draft.open_at, draft.close_at, draft.visibility);
        {
            let mut topics = self.topics.borrow_mut();
            let topic = &mut topics[id as usize - 1];
            topic.name = draft.name.clone();
            topic.details = draft.details.clone();
            topic.owner = *owner;
        }
        Ok((id, self.receipt()))
    }

    fn has_voted(&self, topic_id: TopicId, voter: &Addr) -> Result<bool, TransportError> {
        self.call();
        Ok(self.voted.borrow().contains(&(topic_id, *voter)))
    }
}
