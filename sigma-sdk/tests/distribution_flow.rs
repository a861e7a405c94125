//! End-to-end: configuration document to submitted transactions against a
//! mocked node REST API.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sigma_sdk::distribution::{
    DistributionConfig, DistributionEngine, EngineSettings, RunStatus, Signer, SigningError,
};
use sigma_sdk::node::{NodeClient, NodeConfig};
use sigma_sdk::primitives::{Address, AddressType, Network};
use sigma_sdk::transaction::{SignedTransaction, TransactionPlan};

const TOKEN_HEX: &str = "4f5b6c7d8e9fa0b1c2d3e4f5061728394a5b6c7d8e9fa0b1c2d3e4f506172839";

struct JsonSigner;

impl Signer for JsonSigner {
    async fn sign(&self, plan: &TransactionPlan) -> Result<SignedTransaction, SigningError> {
        Ok(SignedTransaction::new(plan.to_unsigned_json()))
    }
}

fn address(seed: u8) -> Address {
    Address::from_parts(Network::Mainnet, AddressType::P2pk, &[seed; 33]).unwrap()
}

async fn mock_node(sender: &Address) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(format!("/blockchain/token/byId/{TOKEN_HEX}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": TOKEN_HEX,
            "name": "Sigma",
            "decimals": 2,
            "emissionAmount": 1_000_000,
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/blockchain/box/unspent/byAddress/{}", sender.as_str())))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "boxId": "01".repeat(32),
                "value": 500_000_000u64,
                "assets": [{ "tokenId": TOKEN_HEX, "amount": 10_000 }],
            },
            {
                "boxId": "02".repeat(32),
                "value": 500_000_000u64,
                "assets": [{ "tokenId": TOKEN_HEX, "amount": 10_000 }],
            },
        ])))
        .mount(&server)
        .await;

    server
}

#[tokio::test]
async fn test_config_to_submitted_transactions() {
    let sender = address(0x03);
    let server = mock_node(&sender).await;

    Mock::given(method("POST"))
        .and(path("/transactions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!("a1b2c3")))
        .expect(2)
        .mount(&server)
        .await;

    let document = json!({
        "distribution": { "token_id": TOKEN_HEX, "batch_size": 2 },
        "recipients": [
            { "address": address(0x02).as_str(), "amount": 12.5 },
            { "address": address(0x04).as_str(), "amount": "3" },
            { "address": address(0x05).as_str(), "amount": 0.01, "note": "smallest unit" },
        ],
    });
    let distribution = DistributionConfig::from_json_str(&document.to_string())
        .unwrap()
        .into_distribution()
        .unwrap();

    let client = NodeClient::new(NodeConfig {
        base_url: server.uri(),
        ..Default::default()
    })
    .unwrap();
    let engine = DistributionEngine::new(
        client,
        JsonSigner,
        EngineSettings::new(sender).with_inter_batch_delay(Duration::from_millis(10)),
    );

    let dry = engine.validate(&distribution).await.unwrap();
    assert!(dry.valid, "issues: {:?}", dry.issues);
    assert_eq!(dry.batch_count, 2);
    assert_eq!(dry.total_units, 1_250 + 300 + 1);
    assert_eq!(dry.total_amount.to_string(), "15.51");

    let report = engine.execute(&distribution).await.unwrap();
    assert_eq!(report.status(), RunStatus::Completed);
    assert_eq!(report.transaction_ids(), vec!["a1b2c3", "a1b2c3"]);

    let first = report.results[0].plan.as_ref().unwrap();
    let amounts: Vec<u64> = first
        .payment_outputs()
        .map(|o| o.token_amount(&report.token.id))
        .collect();
    assert_eq!(amounts, vec![1_250, 300]);
    assert_eq!(first.change_tokens(&report.token.id), 10_000 - 1_550);
}

#[tokio::test]
async fn test_rejected_batch_is_reported_not_fatal() {
    let sender = address(0x03);
    let server = mock_node(&sender).await;

    Mock::given(method("POST"))
        .and(path("/transactions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": 400,
            "reason": "bad.request",
            "detail": "Malformed transaction",
        })))
        .mount(&server)
        .await;

    let mut distribution = sigma_sdk::distribution::Distribution::new(TOKEN_HEX.parse().unwrap());
    distribution.add_recipient(address(0x02).as_str(), "1");

    let client = NodeClient::new(NodeConfig {
        base_url: server.uri(),
        ..Default::default()
    })
    .unwrap();
    let engine = DistributionEngine::new(client, JsonSigner, EngineSettings::new(sender));

    let report = engine.execute(&distribution).await.unwrap();
    assert_eq!(report.status(), RunStatus::Failed);
    assert_eq!(report.unpaid_recipients(), vec![0]);
    let err = report.into_result().unwrap_err();
    assert!(err.to_string().contains("all 1 batch(es) failed"));
}
