#![no_main]

use arbitrary::Arbitrary;
use fhe_executor::{FheExecutor, FheExecutorClient};
use libfuzzer_sys::fuzz_target;
use privacy_vote::{PrivacyVoteHub, PrivacyVoteHubClient, Visibility};
use soroban_sdk::{
    testutils::{Address as _, Ledger as _},
    Address, Env, String, Vec,
};

const START: u64 = 1_000_000;

#[derive(Arbitrary, Debug)]
pub enum FuzzAction {
    CreateTopic { options: u8, delay: u16, window: u16, private: bool },
    Vote { voter: u8, topic: u8, choice: u8, width: u8 },
    Replay { voter: u8, topic: u8 },
    Advance { seconds: u16 },
    Publish { caller: u8, topic: u8 },
}

fuzz_target!(|actions: std::vec::Vec<FuzzAction>| {
    let env = Env::default();
    env.mock_all_auths();
    env.ledger().set_timestamp(START);

    let executor_id = env.register(FheExecutor, ());
    let executor = FheExecutorClient::new(&env, &executor_id);
    let hub = PrivacyVoteHubClient::new(&env, &env.register(PrivacyVoteHub, ()));
    hub.initialize(&executor_id);

    let owner = Address::generate(&env);
    let mut users = vec![owner.clone()];
    for _ in 0..5 {
        users.push(Address::generate(&env));
    }

    // accepted ballots per topic, indexed by id - 1
    let mut accepted: std::vec::Vec<u64> = vec![];
    let mut last_input = None;

    for action in actions.into_iter().take(64) {
        match action {
            FuzzAction::CreateTopic { options, delay, window, private } => {
                let mut labels = Vec::new(&env);
                for i in 0..(options % 12) {
                    let label = if i == 0 { "yes" } else { "no" };
                    labels.push_back(String::from_str(&env, label));
                }
                let open_at = env.ledger().timestamp() + u64::from(delay);
                let visibility = if private { Visibility::Private } else { Visibility::Public };
                let created = hub.try_create_topic(
                    &owner,
                    &String::from_str(&env, "fuzz"),
                    &String::from_str(&env, ""),
                    &labels,
                    &open_at,
                    &(open_at + u64::from(window)),
                    &visibility,
                );
                if let Ok(Ok(id)) = created {
                    assert_eq!(id, accepted.len() as u64 + 1);
                    accepted.push(0);
                }
            }
            FuzzAction::Vote { voter, topic, choice, width } => {
                let voter = &users[voter as usize % users.len()];
                let id = u64::from(topic % 4) + 1;
                let len = u32::from(width % 12).max(1);
                let mut values = Vec::new(&env);
                for i in 0..len {
                    values.push_back(u64::from(i == u32::from(choice) % len));
                }
                let Ok(Ok(input)) = executor.try_encrypt_input(&hub.address, voter, &values) else {
                    continue;
                };
                let before = hub.has_voted(&id, voter);
                let result = hub.try_submit_cipher_one_hot(voter, &id, &input.handles, &input.proof);
                if result.is_ok() {
                    assert!(!before);
                    accepted[id as usize - 1] += 1;
                }
                last_input = Some((voter.clone(), input));
            }
            FuzzAction::Replay { voter, topic } => {
                // spent or foreign material must never be accepted twice
                if let Some((original, input)) = &last_input {
                    let voter = &users[voter as usize % users.len()];
                    let id = u64::from(topic % 4) + 1;
                    let result = hub.try_submit_cipher_one_hot(voter, &id, &input.handles, &input.proof);
                    assert!(result.is_err() || voter == original);
                    if result.is_ok() {
                        accepted[id as usize - 1] += 1;
                    }
                }
            }
            FuzzAction::Advance { seconds } => {
                env.ledger().set_timestamp(env.ledger().timestamp() + u64::from(seconds));
            }
            FuzzAction::Publish { caller, topic } => {
                let caller = &users[caller as usize % users.len()];
                let _ = hub.try_publish_results(caller, &(u64::from(topic % 4) + 1));
            }
        }
    }

    // every published aggregate sums to the number of accepted ballots
    for (index, count) in accepted.iter().enumerate() {
        let id = index as u64 + 1;
        if !hub.get_topic(&id).published {
            continue;
        }
        let aggregate = hub.get_encrypted_aggregate(&id);
        let values = executor.decrypt(&hub.address, &aggregate, &owner);
        let total: u64 = values.iter().sum();
        assert_eq!(total, *count);
    }
});
