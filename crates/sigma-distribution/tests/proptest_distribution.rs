use std::collections::BTreeSet;

use proptest::prelude::*;

use sigma_distribution::planner::{effective_batch_size, plan_batches};
use sigma_distribution::validator::validate;
use sigma_distribution::{Distribution, EngineSettings, ResolvedRecipient, UtxoPool};
use sigma_primitives::{Address, AddressType, BoxId, DisplayAmount, Network, TokenId};
use sigma_transaction::params::{MAX_RECIPIENTS_PER_TX, MIN_BOX_VALUE};
use sigma_transaction::{TokenMetadata, UtxoEntry};

const TOKEN: TokenId = TokenId::new([0x31; 32]);

fn address(i: usize) -> Address {
    let mut key = [0x02u8; 33];
    key[31] = (i / 256) as u8;
    key[32] = (i % 256) as u8;
    Address::from_parts(Network::Mainnet, AddressType::P2pk, &key).unwrap()
}

fn resolved(count: usize) -> Vec<ResolvedRecipient> {
    (0..count)
        .map(|index| ResolvedRecipient {
            index,
            address: address(index),
            amount: DisplayAmount::from_smallest_units(index as u64 + 1, 0),
            units: index as u64 + 1,
            note: None,
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn batches_partition_recipients_in_order(
        count in 0usize..400,
        requested in proptest::option::of(1usize..300),
    ) {
        let recipients = resolved(count);
        let size = effective_batch_size(requested, MAX_RECIPIENTS_PER_TX);
        let batches = plan_batches(&recipients, size);

        prop_assert!(size <= MAX_RECIPIENTS_PER_TX);
        prop_assert_eq!(batches.len(), count.div_ceil(size));
        for (i, batch) in batches.iter().enumerate() {
            prop_assert_eq!(batch.index, i);
            prop_assert!(!batch.is_empty());
            prop_assert!(batch.len() <= size);
        }
        let rejoined: Vec<ResolvedRecipient> =
            batches.into_iter().flat_map(|b| b.recipients).collect();
        prop_assert_eq!(rejoined, recipients);
    }

    #[test]
    fn planned_batches_conserve_value_and_never_share_inputs(
        amounts in prop::collection::vec(1u64..500, 1..40),
        batch_size in 1usize..12,
        boxes in prop::collection::vec((0u64..2_000, 1u64..200), 1..12),
        erg_boxes in prop::collection::vec(MIN_BOX_VALUE..50 * MIN_BOX_VALUE, 0..6),
    ) {
        let mut distribution = Distribution::new(TOKEN).with_batch_size(batch_size);
        for (i, amount) in amounts.iter().enumerate() {
            distribution.add_recipient(address(i).as_str(), amount.to_string());
        }

        let mut entries = Vec::new();
        for (i, (tokens, erg)) in boxes.iter().enumerate() {
            let mut entry = UtxoEntry::new(BoxId::new([i as u8 + 1; 32]), erg * MIN_BOX_VALUE);
            if *tokens > 0 {
                entry = entry.with_token(TOKEN, *tokens);
            }
            entries.push(entry);
        }
        for (i, value) in erg_boxes.iter().enumerate() {
            entries.push(UtxoEntry::new(BoxId::new([i as u8 + 100; 32]), *value));
        }
        let pool = UtxoPool::new(entries);
        let before = pool.clone();

        let settings = EngineSettings::new(address(9_999));
        let report = validate(&distribution, &TokenMetadata::unknown(TOKEN), &pool, &settings, Vec::new())
            .unwrap();

        prop_assert_eq!(pool, before);
        prop_assert_eq!(report.batches.len(), amounts.len().div_ceil(batch_size));

        let mut spent = BTreeSet::new();
        for plan in report.plans() {
            prop_assert!(plan.verify_conservation().is_ok());
            prop_assert_eq!(
                plan.input_tokens(&TOKEN),
                plan.distributed_tokens(&TOKEN) + plan.change_tokens(&TOKEN)
            );
            if let Some(change) = plan.change_output() {
                prop_assert!(change.value >= MIN_BOX_VALUE);
            }
            for id in plan.input_ids() {
                prop_assert!(spent.insert(id), "box {} spent twice", id);
            }
        }
        for batch in &report.batches {
            if let Some(plan) = &batch.plan {
                let paid: Vec<u64> = plan.payment_outputs().map(|o| o.token_amount(&TOKEN)).collect();
                let expected: Vec<u64> = batch.recipients.iter().map(|&i| amounts[i]).collect();
                prop_assert_eq!(paid, expected);
            }
        }
    }
}
