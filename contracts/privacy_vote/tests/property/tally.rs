//! Whatever the ballots, the published aggregate decrypts to the per-option
//! count of accepted ballots, in option order.

use proptest::prelude::*;
use soroban_sdk::testutils::{Address as _, Ledger as _};
use soroban_sdk::{Address, Env, String, Vec};

use fhe_executor::{FheExecutor, FheExecutorClient};
use privacy_vote::{PrivacyVoteHub, PrivacyVoteHubClient, Visibility};

const OPEN_AT: u64 = 10_000;
const CLOSE_AT: u64 = 20_000;

fn ballots() -> impl Strategy<Value = (u32, std::vec::Vec<u32>)> {
    (2u32..=10).prop_flat_map(|options| {
        (
            Just(options),
            proptest::collection::vec(0..options, 0..8),
        )
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_aggregate_counts_each_accepted_ballot((option_count, choices) in ballots()) {
        let env = Env::default();
        env.mock_all_auths();
        env.ledger().set_timestamp(OPEN_AT);
        let executor_id = env.register(FheExecutor, ());
        let executor = FheExecutorClient::new(&env, &executor_id);
        let hub = PrivacyVoteHubClient::new(&env, &env.register(PrivacyVoteHub, ()));
        hub.initialize(&executor_id);

        let owner = Address::generate(&env);
        let mut options = Vec::new(&env);
        for i in 0..option_count {
            let label = format!("option-{i}");
            options.push_back(String::from_str(&env, &label));
        }
        let id = hub.create_topic(
            &owner,
            &String::from_str(&env, "Poll"),
            &String::from_str(&env, ""),
            &options,
            &OPEN_AT,
            &CLOSE_AT,
            &Visibility::Public,
        );

        let mut expected = vec![0u64; option_count as usize];
        for choice in &choices {
            let voter = Address::generate(&env);
            let mut values = Vec::new(&env);
            for i in 0..option_count {
                values.push_back(u64::from(i == *choice));
            }
            let input = executor.encrypt_input(&hub.address, &voter, &values);
            hub.submit_cipher_one_hot(&voter, &id, &input.handles, &input.proof);
            expected[*choice as usize] += 1;
        }

        env.ledger().set_timestamp(CLOSE_AT);
        hub.publish_results(&owner, &id);

        let aggregate = hub.get_encrypted_aggregate(&id);
        prop_assert_eq!(aggregate.len(), option_count);
        let values = executor.decrypt(&hub.address, &aggregate, &owner);
        let actual: std::vec::Vec<u64> = values.iter().collect();
        prop_assert_eq!(actual, expected);
    }
}
