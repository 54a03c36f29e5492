#![no_std]
//! PrivacyVote hub contract.
//!
//! Keeps a registry of voting topics and, for each topic, an encrypted
//! per-option running sum. Voters submit one-hot ballots as ciphertext
//! handles; the hub folds them into the aggregate through the FHE executor
//! without ever seeing a plaintext. After the voting window closes the topic
//! owner publishes the results, which grants decryption rights on the
//! aggregate handles according to the topic's visibility.

pub mod events;
pub mod topic;

use fhe_executor::FheExecutorClient;
use soroban_sdk::{contract, contractimpl, Address, BytesN, Env, String, Vec};

pub use topic::{
    DataKey, Topic, TopicId, Visibility, VoteError, MAX_OPTIONS, MIN_OPTIONS, STATUS_CLOSED,
    STATUS_NOT_STARTED, STATUS_OPEN, STATUS_PUBLISHED,
};

const TTL_THRESHOLD: u32 = 5_184_000;
const TTL_EXTEND_TO: u32 = 10_368_000;

#[contract]
pub struct PrivacyVoteHub;

#[contractimpl]
impl PrivacyVoteHub {
    // ── Initialisation ──────────────────────────────────────────────────────

    /// Bind the hub to the FHE executor that holds its ciphertexts.
    pub fn initialize(env: Env, executor: Address) -> Result<(), VoteError> {
        if env.storage().instance().has(&DataKey::Executor) {
            return Err(VoteError::AlreadyInitialized);
        }
        env.storage().instance().set(&DataKey::Executor, &executor);
        env.storage().instance().set(&DataKey::TopicCount, &0u64);
        Self::extend_instance_ttl(&env);

        events::publish_initialized(&env, executor);
        Ok(())
    }

    // ── Topics ──────────────────────────────────────────────────────────────

    /// Register a new topic and return its id. Ids start at 1.
    ///
    /// * `options`   – between [`MIN_OPTIONS`] and [`MAX_OPTIONS`] non-empty labels.
    /// * `open_at`   – first ledger second at which ballots are accepted.
    /// * `close_at`  – first ledger second at which ballots are refused.
    pub fn create_topic(
        env: Env,
        owner: Address,
        name: String,
        details: String,
        options: Vec<String>,
        open_at: u64,
        close_at: u64,
        visibility: Visibility,
    ) -> Result<TopicId, VoteError> {
        owner.require_auth();
        let executor = Self::executor(&env)?;

        if name.len() == 0 {
            return Err(VoteError::InvalidName);
        }
        if options.len() < MIN_OPTIONS || options.len() > MAX_OPTIONS {
            return Err(VoteError::InvalidOptions);
        }
        if options.iter().any(|label| label.len() == 0) {
            return Err(VoteError::InvalidOptions);
        }
        if open_at >= close_at {
            return Err(VoteError::InvalidWindow);
        }

        let count: u64 = env
            .storage()
            .instance()
            .get(&DataKey::TopicCount)
            .unwrap_or(0);
        let topic_id = count + 1;

        // Every option starts from an encrypted zero owned by the hub.
        let hub = env.current_contract_address();
        let executor = FheExecutorClient::new(&env, &executor);
        let mut aggregate: Vec<BytesN<32>> = Vec::new(&env);
        for _ in 0..options.len() {
            aggregate.push_back(executor.trivial_encrypt(&hub, &0u64));
        }

        let option_count = options.len();
        let topic = Topic {
            name,
            details,
            options,
            open_at,
            close_at,
            published: false,
            owner: owner.clone(),
            visibility,
        };
        Self::store(&env, &DataKey::Topic(topic_id), &topic);
        Self::store(&env, &DataKey::Aggregate(topic_id), &aggregate);
        env.storage().instance().set(&DataKey::TopicCount, &topic_id);
        Self::extend_instance_ttl(&env);

        events::publish_topic_created(&env, topic_id, owner, option_count, open_at, close_at);
        Ok(topic_id)
    }

    pub fn get_topic(env: Env, topic_id: TopicId) -> Result<Topic, VoteError> {
        Self::load_topic(&env, topic_id)
    }

    pub fn get_topic_count(env: Env) -> u64 {
        env.storage()
            .instance()
            .get(&DataKey::TopicCount)
            .unwrap_or(0)
    }

    /// Phase code at the current ledger time: 0 not started, 1 open,
    /// 2 closed, 3 published.
    pub fn get_topic_status(env: Env, topic_id: TopicId) -> Result<u32, VoteError> {
        let topic = Self::load_topic(&env, topic_id)?;
        Ok(topic.status_code(env.ledger().timestamp()))
    }

    /// Aggregate handles in option order.
    pub fn get_encrypted_aggregate(
        env: Env,
        topic_id: TopicId,
    ) -> Result<Vec<BytesN<32>>, VoteError> {
        Self::load_topic(&env, topic_id)?;
        Self::load_aggregate(&env, topic_id)
    }

    // ── Voting ──────────────────────────────────────────────────────────────

    /// Accept one encrypted one-hot ballot from `voter`.
    ///
    /// The ballot must carry one handle per option, in option order, and an
    /// input proof bound to this contract and `voter` that attests exactly
    /// one option is selected. Each voter is counted
    /// at most once per topic.
    pub fn submit_cipher_one_hot(
        env: Env,
        voter: Address,
        topic_id: TopicId,
        handles: Vec<BytesN<32>>,
        proof: BytesN<32>,
    ) -> Result<(), VoteError> {
        voter.require_auth();

        let topic = Self::load_topic(&env, topic_id)?;
        if topic.status_code(env.ledger().timestamp()) != STATUS_OPEN {
            return Err(VoteError::TopicNotOpen);
        }
        if handles.len() != topic.options.len() {
            return Err(VoteError::BallotLengthMismatch);
        }

        let voted_key = DataKey::Voted(topic_id, voter.clone());
        if env.storage().persistent().has(&voted_key) {
            return Err(VoteError::AlreadyVoted);
        }

        let hub = env.current_contract_address();
        let executor = FheExecutorClient::new(&env, &Self::executor(&env)?);
        match executor.try_verify_one_hot(&hub, &voter, &handles, &proof) {
            Ok(Ok(())) => {}
            // Unknown, foreign, already spent, or not one-hot.
            _ => return Err(VoteError::InvalidInputProof),
        }

        let aggregate = Self::load_aggregate(&env, topic_id)?;
        let mut next: Vec<BytesN<32>> = Vec::new(&env);
        for i in 0..aggregate.len() {
            let (Some(sum), Some(ballot)) = (aggregate.get(i), handles.get(i)) else {
                return Err(VoteError::BallotLengthMismatch);
            };
            next.push_back(executor.add(&hub, &sum, &ballot));
        }

        Self::store(&env, &DataKey::Aggregate(topic_id), &next);
        Self::store(&env, &voted_key, &true);

        events::publish_ballot_accepted(&env, topic_id, voter);
        Ok(())
    }

    pub fn has_voted(env: Env, topic_id: TopicId, voter: Address) -> bool {
        env.storage()
            .persistent()
            .has(&DataKey::Voted(topic_id, voter))
    }

    // ── Publication ─────────────────────────────────────────────────────────

    /// Release the aggregate of a closed topic for decryption. Owner only,
    /// once.
    pub fn publish_results(env: Env, caller: Address, topic_id: TopicId) -> Result<(), VoteError> {
        caller.require_auth();

        let mut topic = Self::load_topic(&env, topic_id)?;
        if caller != topic.owner {
            return Err(VoteError::Unauthorized);
        }
        if topic.published {
            return Err(VoteError::AlreadyPublished);
        }
        if env.ledger().timestamp() < topic.close_at {
            return Err(VoteError::TopicNotClosed);
        }

        let hub = env.current_contract_address();
        let executor = FheExecutorClient::new(&env, &Self::executor(&env)?);
        for handle in Self::load_aggregate(&env, topic_id)?.iter() {
            match topic.visibility {
                Visibility::Public => executor.make_public(&hub, &handle),
                Visibility::Private => executor.allow(&hub, &handle, &topic.owner),
            }
        }

        topic.published = true;
        Self::store(&env, &DataKey::Topic(topic_id), &topic);

        events::publish_results_published(&env, topic_id, topic.visibility);
        Ok(())
    }

    // ── Internal helpers ────────────────────────────────────────────────────

    fn executor(env: &Env) -> Result<Address, VoteError> {
        env.storage()
            .instance()
            .get(&DataKey::Executor)
            .ok_or(VoteError::NotInitialized)
    }

    fn load_topic(env: &Env, topic_id: TopicId) -> Result<Topic, VoteError> {
        env.storage()
            .persistent()
            .get(&DataKey::Topic(topic_id))
            .ok_or(VoteError::TopicNotFound)
    }

    fn load_aggregate(env: &Env, topic_id: TopicId) -> Result<Vec<BytesN<32>>, VoteError> {
        env.storage()
            .persistent()
            .get(&DataKey::Aggregate(topic_id))
            .ok_or(VoteError::TopicNotFound)
    }

    fn store<V>(env: &Env, key: &DataKey, value: &V)
    where
        V: soroban_sdk::IntoVal<Env, soroban_sdk::Val>,
    {
        env.storage().persistent().set(key, value);
        env.storage()
            .persistent()
            .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
    }

    fn extend_instance_ttl(env: &Env) {
        env.storage()
            .instance()
            .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
    }
}
