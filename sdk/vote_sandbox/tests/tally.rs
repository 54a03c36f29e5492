#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Whatever the ballots, the client reads back one vote per accepted ballot,
//! labeled by option position.
mod common;

use proptest::prelude::*;
use vote_client::{Ledger, SigningContext, Visibility};

fn ballots() -> impl Strategy<Value = (usize, Vec<usize>)> {
    (2usize..=10).prop_flat_map(|options| {
        (Just(options), proptest::collection::vec(0..options, 0..6))
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(12))]

    #[test]
    fn prop_labeled_tally_counts_each_ballot((option_count, choices) in ballots()) {
        let ctx = common::setup();
        let labels: Vec<String> = (0..option_count).map(|i| format!("option {i}")).collect();
        let label_refs: Vec<&str> = labels.iter().map(String::as_str).collect();
        let id = ctx.create_topic(&label_refs, Visibility::Public);
        let topic = ctx.ledger.get_topic(id).unwrap();
        let submitter = ctx.submitter();

        let mut expected = vec![0u64; option_count];
        for &choice in &choices {
            let voter = ctx.sandbox.account();
            submitter
                .submit(&topic, choice, &voter, &SigningContext::new(voter.clone()))
                .unwrap();
            expected[choice] += 1;
        }

        ctx.close_and_publish(id);
        let topic = ctx.ledger.get_topic(id).unwrap();
        let results = ctx
            .decryptor()
            .results(&topic, &ctx.owner, &SigningContext::new(ctx.owner.clone()))
            .unwrap();

        let actual: Vec<(String, u64)> = results.into_iter().map(|t| (t.label, t.votes)).collect();
        let wanted: Vec<(String, u64)> = labels.into_iter().zip(expected).collect();
        prop_assert_eq!(actual, wanted);
    }
}
