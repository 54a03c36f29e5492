//! Sandbox wiring for `vote_client`.
//!
//! Registers the `FheExecutor` and `PrivacyVoteHub` contracts in a Soroban
//! test environment and exposes them through the client's [`Ledger`] and
//! [`CryptoService`] traits.
//!
//! [`Ledger`]: vote_client::Ledger
//! [`CryptoService`]: vote_client::CryptoService

pub mod convert;
pub mod ledger;
pub mod relayer;

use fhe_executor::FheExecutor;
use privacy_vote::{PrivacyVoteHub, PrivacyVoteHubClient};
use soroban_sdk::testutils::{Address as _, Ledger as _};
use soroban_sdk::{Address, Env};
use tracing::info;
use vote_client::{AddressBook, ContractEndpoint, NetworkId, TopicId, TransportError};

pub use ledger::{LedgerFault, SorobanLedger};
pub use relayer::MockRelayer;

use convert::{hub_revert, settle};

pub const STANDALONE: &str = "standalone";

pub struct Sandbox {
    env: Env,
    hub: PrivacyVoteHubClient<'static>,
    executor: Address,
}

impl Sandbox {
    /// Fresh environment at ledger time `now`, with every signature mocked.
    pub fn start(now: u64) -> Self {
        let env = Env::default();
        env.mock_all_auths();
        env.ledger().set_timestamp(now);

        let executor = env.register(FheExecutor, ());
        let hub = PrivacyVoteHubClient::new(&env, &env.register(PrivacyVoteHub, ()));
        hub.initialize(&executor);
        info!(hub = ?hub.address, executor = ?executor, "sandbox started");

        Self { env, hub, executor }
    }

    pub fn ledger(&self) -> SorobanLedger {
        SorobanLedger::new(&self.env, &self.hub.address)
    }

    pub fn relayer(&self) -> MockRelayer {
        MockRelayer::new(&self.env, &self.executor, STANDALONE.into())
    }

    /// Address book with the hub registered under [`STANDALONE`].
    pub fn address_book(&self) -> AddressBook<Address> {
        let mut book = AddressBook::new();
        book.insert(
            NetworkId::new(STANDALONE),
            ContractEndpoint {
                address: self.hub.address.clone(),
                chain_name: Some("soroban-sandbox".into()),
            },
        );
        book
    }

    pub fn account(&self) -> Address {
        Address::generate(&self.env)
    }

    pub fn now(&self) -> u64 {
        self.env.ledger().timestamp()
    }

    pub fn set_time(&self, now: u64) {
        self.env.ledger().set_timestamp(now);
    }

    /// Release a closed topic's aggregate, as its owner.
    pub fn publish_results(&self, owner: &Address, topic_id: TopicId) -> Result<(), TransportError> {
        settle(self.hub.try_publish_results(owner, &topic_id), hub_revert)
    }
}
