//! The status code reported by the hub is a pure function of the ledger
//! clock and the publication flag.

use proptest::prelude::*;
use soroban_sdk::testutils::{Address as _, Ledger as _};
use soroban_sdk::{Address, Env, String, Vec};

use fhe_executor::FheExecutor;
use privacy_vote::{
    PrivacyVoteHub, PrivacyVoteHubClient, Visibility, STATUS_CLOSED, STATUS_NOT_STARTED,
    STATUS_OPEN,
};

proptest! {
    #[test]
    fn prop_status_code_partitions_time(
        open_at in 1_000u64..1_000_000,
        length in 1u64..100_000,
        now in 0u64..1_200_000,
    ) {
        let env = Env::default();
        env.mock_all_auths();
        let executor = env.register(FheExecutor, ());
        let hub = PrivacyVoteHubClient::new(&env, &env.register(PrivacyVoteHub, ()));
        hub.initialize(&executor);

        let mut options = Vec::new(&env);
        options.push_back(String::from_str(&env, "yes"));
        options.push_back(String::from_str(&env, "no"));
        let close_at = open_at + length;
        let id = hub.create_topic(
            &Address::generate(&env),
            &String::from_str(&env, "Proposal"),
            &String::from_str(&env, ""),
            &options,
            &open_at,
            &close_at,
            &Visibility::Public,
        );

        env.ledger().set_timestamp(now);
        let code = hub.get_topic_status(&id);
        let expected = if now < open_at {
            STATUS_NOT_STARTED
        } else if now < close_at {
            STATUS_OPEN
        } else {
            STATUS_CLOSED
        };
        prop_assert_eq!(code, expected);
        // Asking twice does not change the answer.
        prop_assert_eq!(hub.get_topic_status(&id), code);
    }
}
