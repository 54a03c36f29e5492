#![allow(dead_code)]

use std::sync::Once;

use soroban_sdk::Address;
use tracing_subscriber::EnvFilter;
use vote_client::{
    AggregateDecryptionCoordinator, BallotEncoder, SigningContext, SubmissionCoordinator,
    TopicAdmin, TopicDraft, TopicId, Visibility,
};
use vote_sandbox::{MockRelayer, Sandbox, SorobanLedger, STANDALONE};

pub const T0: u64 = 1_700_000_000;
pub const WINDOW: u64 = 3_600;

static TRACING: Once = Once::new();

/// Route `tracing` output through the test harness; filter with `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub struct TestContext {
    pub sandbox: Sandbox,
    pub ledger: SorobanLedger,
    pub relayer: MockRelayer,
    pub hub: Address,
    pub owner: Address,
}

/// Sandbox at `T0` with the hub resolved through the address book.
pub fn setup() -> TestContext {
    init_tracing();
    let sandbox = Sandbox::start(T0);
    let ledger = sandbox.ledger();
    let relayer = sandbox.relayer();
    let hub = sandbox
        .address_book()
        .resolve(&STANDALONE.into())
        .map(|endpoint| endpoint.address.clone())
        .unwrap();
    let owner = sandbox.account();
    TestContext {
        sandbox,
        ledger,
        relayer,
        hub,
        owner,
    }
}

impl TestContext {
    /// Topic open from `T0` for `WINDOW` seconds.
    pub fn create_topic(&self, options: &[&str], visibility: Visibility) -> TopicId {
        let draft = TopicDraft::new("Poll", options.iter().copied(), T0, T0 + WINDOW)
            .with_visibility(visibility);
        TopicAdmin::new(&self.ledger)
            .create_topic(&draft, &self.owner, &SigningContext::new(self.owner.clone()))
            .unwrap()
            .topic_id
    }

    pub fn submitter(&self) -> SubmissionCoordinator<'_, SorobanLedger, MockRelayer> {
        SubmissionCoordinator::new(
            &self.ledger,
            BallotEncoder::new(&self.relayer, STANDALONE.into()),
            self.hub.clone(),
        )
    }

    pub fn decryptor(&self) -> AggregateDecryptionCoordinator<'_, SorobanLedger, MockRelayer> {
        AggregateDecryptionCoordinator::new(
            &self.ledger,
            &self.relayer,
            STANDALONE.into(),
            self.hub.clone(),
        )
    }

    /// Move past the window and publish as the owner.
    pub fn close_and_publish(&self, topic_id: TopicId) {
        self.sandbox.set_time(T0 + WINDOW);
        self.sandbox.publish_results(&self.owner, topic_id).unwrap();
    }
}
