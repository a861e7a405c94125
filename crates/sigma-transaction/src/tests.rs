//! Tests for the sigma-transaction crate: plan building, change handling,
//! shortfall reporting and the conservation check.

use sigma_primitives::{Address, AddressType, BoxId, Network, TokenId};

use crate::builder::{Payment, PlanBuilder};
use crate::error::{Asset, TransactionError};
use crate::params::{MIN_BOX_VALUE, MIN_FEE};
use crate::plan::TransactionPlan;
use crate::token::TokenMetadata;
use crate::utxo::UtxoEntry;

fn token() -> TokenId {
    TokenId::new([0x11; 32])
}

fn other_token() -> TokenId {
    TokenId::new([0x22; 32])
}

fn address(seed: u8) -> Address {
    let mut key = vec![0x02; 33];
    key[32] = seed;
    Address::from_parts(Network::Mainnet, AddressType::P2pk, &key).unwrap()
}

fn sender() -> Address {
    address(0xff)
}

fn payment(index: usize, amount: u64) -> Payment {
    Payment {
        recipient_index: index,
        address: address(index as u8),
        amount,
    }
}

fn builder_with(payments: &[Payment], inputs: &[UtxoEntry]) -> PlanBuilder {
    let mut builder = PlanBuilder::new(token(), sender());
    for p in payments {
        builder.add_payment(p.clone());
    }
    for input in inputs {
        builder.add_input(input.clone());
    }
    builder
}

// -----------------------------------------------------------------------
// Outputs and change
// -----------------------------------------------------------------------

#[test]
fn test_one_output_per_payment_in_order() {
    let inputs = [UtxoEntry::new(BoxId::new([1; 32]), 10 * MIN_BOX_VALUE).with_token(token(), 1_000)];
    let payments = [payment(0, 100), payment(1, 200), payment(2, 300)];
    let plan = builder_with(&payments, &inputs).build().unwrap();

    let paid: Vec<_> = plan.payment_outputs().collect();
    assert_eq!(paid.len(), 3);
    for (output, p) in paid.iter().zip(&payments) {
        assert_eq!(output.address, p.address);
        assert_eq!(output.value, MIN_BOX_VALUE);
        assert_eq!(output.token_amount(&token()), p.amount);
        assert_eq!(output.recipient_index, Some(p.recipient_index));
        assert_eq!(output.assets.len(), 1);
    }
    assert_eq!(plan.recipient_indices(), vec![0, 1, 2]);
}

#[test]
fn test_change_returns_leftover_erg_and_tokens() {
    let inputs = [UtxoEntry::new(BoxId::new([1; 32]), 10 * MIN_BOX_VALUE).with_token(token(), 1_000)];
    let plan = builder_with(&[payment(0, 400)], &inputs).build().unwrap();

    let change = plan.change_output().expect("change output");
    assert!(change.change);
    assert_eq!(change.address, sender());
    assert_eq!(change.value, 10 * MIN_BOX_VALUE - MIN_BOX_VALUE - MIN_FEE);
    assert_eq!(change.token_amount(&token()), 600);
    assert_eq!(plan.fee(), MIN_FEE);
    assert_eq!(plan.outputs().last(), Some(change));
}

#[test]
fn test_no_change_output_when_inputs_are_exact() {
    let inputs = [UtxoEntry::new(BoxId::new([1; 32]), 2 * MIN_BOX_VALUE + MIN_FEE).with_token(token(), 30)];
    let plan = builder_with(&[payment(0, 10), payment(1, 20)], &inputs).build().unwrap();

    assert!(plan.change_output().is_none());
    assert_eq!(plan.outputs().len(), 2);
    assert_eq!(plan.change_value(), 0);
    assert_eq!(plan.change_tokens(&token()), 0);
}

#[test]
fn test_other_tokens_are_returned_as_change() {
    let inputs = [UtxoEntry::new(BoxId::new([1; 32]), 5 * MIN_BOX_VALUE)
        .with_token(token(), 50)
        .with_token(other_token(), 7)];
    let plan = builder_with(&[payment(0, 50)], &inputs).build().unwrap();

    let change = plan.change_output().unwrap();
    assert_eq!(change.token_amount(&other_token()), 7);
    assert_eq!(change.token_amount(&token()), 0);
    assert!(!change.assets.contains_key(&token()));
}

#[test]
fn test_custom_fee_and_box_value() {
    let inputs = [UtxoEntry::new(BoxId::new([1; 32]), 100_000_000).with_token(token(), 5)];
    let mut builder = PlanBuilder::new(token(), sender())
        .with_fee(2_000_000)
        .with_min_box_value(1_500_000);
    builder.add_payment(payment(0, 5));
    builder.add_input(inputs[0].clone());
    assert_eq!(builder.required_erg(), Some(3_500_000));

    let plan = builder.build().unwrap();
    assert_eq!(plan.fee(), 2_000_000);
    assert_eq!(plan.payment_outputs().next().unwrap().value, 1_500_000);
    assert_eq!(plan.change_value(), 100_000_000 - 3_500_000);
}

// -----------------------------------------------------------------------
// Failures
// -----------------------------------------------------------------------

#[test]
fn test_insufficient_erg() {
    let inputs = [UtxoEntry::new(BoxId::new([1; 32]), MIN_BOX_VALUE).with_token(token(), 100)];
    let err = builder_with(&[payment(0, 10), payment(1, 10)], &inputs).build().unwrap_err();
    assert_eq!(
        err,
        TransactionError::InsufficientFunds {
            asset: Asset::Erg,
            required: 2 * MIN_BOX_VALUE + MIN_FEE,
            available: MIN_BOX_VALUE,
        }
    );
    assert_eq!(err.shortfall(), Some((&Asset::Erg, MIN_BOX_VALUE + MIN_FEE)));
}

#[test]
fn test_insufficient_tokens_names_shortfall() {
    let inputs = [UtxoEntry::new(BoxId::new([1; 32]), 10 * MIN_BOX_VALUE).with_token(token(), 25)];
    let err = builder_with(&[payment(0, 20), payment(1, 20)], &inputs).build().unwrap_err();
    assert_eq!(err.shortfall(), Some((&Asset::Token(token()), 15)));
    assert!(err.to_string().contains("short by 15"));
}

#[test]
fn test_dust_change_is_rejected() {
    let value = MIN_BOX_VALUE + MIN_FEE + 10;
    let inputs = [UtxoEntry::new(BoxId::new([1; 32]), value).with_token(token(), 10)];
    let err = builder_with(&[payment(0, 10)], &inputs).build().unwrap_err();
    assert_eq!(
        err,
        TransactionError::DustChange { change: 10, min_box_value: MIN_BOX_VALUE }
    );
}

#[test]
fn test_token_change_without_erg_is_rejected() {
    let inputs = [UtxoEntry::new(BoxId::new([1; 32]), MIN_BOX_VALUE + MIN_FEE).with_token(token(), 11)];
    let err = builder_with(&[payment(0, 10)], &inputs).build().unwrap_err();
    assert!(matches!(err, TransactionError::DustChange { change: 0, .. }));
}

#[test]
fn test_structural_errors() {
    let inputs = [UtxoEntry::new(BoxId::new([1; 32]), 10 * MIN_BOX_VALUE).with_token(token(), 10)];
    assert!(matches!(
        builder_with(&[], &inputs).build(),
        Err(TransactionError::InvalidPlan(_))
    ));
    assert!(matches!(
        builder_with(&[payment(0, 1)], &[]).build(),
        Err(TransactionError::InvalidPlan(_))
    ));
    assert!(matches!(
        builder_with(&[payment(0, 0)], &inputs).build(),
        Err(TransactionError::InvalidPlan(_))
    ));
    assert!(matches!(
        builder_with(&[payment(0, 1)], &inputs).with_fee(0).build(),
        Err(TransactionError::InvalidPlan(_))
    ));
}

// -----------------------------------------------------------------------
// Conservation
// -----------------------------------------------------------------------

#[test]
fn test_built_plan_conserves_value() {
    let inputs = [
        UtxoEntry::new(BoxId::new([1; 32]), 3 * MIN_BOX_VALUE).with_token(token(), 60),
        UtxoEntry::new(BoxId::new([2; 32]), 7 * MIN_BOX_VALUE).with_token(other_token(), 3),
    ];
    let plan = builder_with(&[payment(0, 10), payment(1, 20)], &inputs).build().unwrap();

    assert!(plan.verify_conservation().is_ok());
    assert_eq!(plan.input_value(), plan.output_value() + plan.fee());
    assert_eq!(
        plan.input_tokens(&token()),
        plan.distributed_tokens(&token()) + plan.change_tokens(&token())
    );
    assert_eq!(plan.input_ids(), vec![BoxId::new([1; 32]), BoxId::new([2; 32])]);
}

#[test]
fn test_conservation_check_detects_tampering() {
    let input = UtxoEntry::new(BoxId::new([1; 32]), 5 * MIN_BOX_VALUE).with_token(token(), 10);
    let plan = builder_with(&[payment(0, 10)], &[input.clone()]).build().unwrap();

    let mut outputs = plan.outputs().to_vec();
    outputs[0].assets.insert(token(), 11);
    let forged = TransactionPlan::new(vec![input.clone()], outputs, plan.fee());
    assert!(matches!(
        forged.verify_conservation(),
        Err(TransactionError::ConservationViolated(_))
    ));

    let leaky = TransactionPlan::new(vec![input], plan.outputs().to_vec(), plan.fee() + 1);
    assert!(matches!(
        leaky.verify_conservation(),
        Err(TransactionError::ConservationViolated(_))
    ));
}

// -----------------------------------------------------------------------
// Rendering
// -----------------------------------------------------------------------

#[test]
fn test_unsigned_json_shape() {
    let inputs = [UtxoEntry::new(BoxId::new([1; 32]), 10 * MIN_BOX_VALUE).with_token(token(), 100)];
    let plan = builder_with(&[payment(0, 40)], &inputs).build().unwrap();
    let json = plan.to_unsigned_json();

    assert_eq!(json["fee"], MIN_FEE);
    assert_eq!(json["inputs"][0]["boxId"], "01".repeat(32));
    assert_eq!(json["outputs"].as_array().unwrap().len(), 2);
    assert_eq!(json["outputs"][0]["address"], address(0).as_str());
    assert_eq!(json["outputs"][0]["assets"][0]["tokenId"], token().to_hex());
    assert_eq!(json["outputs"][0]["assets"][0]["amount"], 40);
    assert_eq!(json["outputs"][1]["assets"][0]["amount"], 60);
}

#[test]
fn test_token_metadata_fallback_and_format() {
    let meta = TokenMetadata::unknown(token());
    assert_eq!(meta.decimals, 0);
    assert_eq!(meta.format_amount(42), "42");

    let meta = TokenMetadata { decimals: 2, ..meta };
    assert_eq!(meta.format_amount(1050), "10.5");
}

#[test]
fn test_plan_serde_roundtrip() {
    let inputs = [UtxoEntry::new(BoxId::new([1; 32]), 10 * MIN_BOX_VALUE).with_token(token(), 100)];
    let plan = builder_with(&[payment(3, 40)], &inputs).build().unwrap();
    let json = serde_json::to_string(&plan).unwrap();
    let back: TransactionPlan = serde_json::from_str(&json).unwrap();
    assert_eq!(back, plan);
}

#[test]
fn test_deserialize_rejects_unbalanced_plan() {
    let inputs = [UtxoEntry::new(BoxId::new([1; 32]), 10 * MIN_BOX_VALUE).with_token(token(), 100)];
    let plan = builder_with(&[payment(3, 40)], &inputs).build().unwrap();

    let mut value = serde_json::to_value(&plan).unwrap();
    value["fee"] = serde_json::json!(plan.fee() + 1);
    let err = serde_json::from_value::<TransactionPlan>(value).unwrap_err();
    assert!(err.to_string().contains("nanoERG"), "{err}");
}
