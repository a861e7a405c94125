#![deny(missing_docs)]

//! # sigma-node
//!
//! HTTP client for the Ergo node REST API, and the [`NodeApi`] trait the
//! distribution engine consumes. Anything that can answer the five calls of
//! [`NodeApi`] can stand in for a node, which is how tests run the engine
//! without a network.
//!
//! # Example
//!
//! ```no_run
//! use sigma_node::{NodeClient, NodeConfig};
//!
//! let client = NodeClient::new(NodeConfig {
//!     base_url: "http://127.0.0.1:9053".to_string(),
//!     api_key: Some("hello".to_string()),
//!     ..Default::default()
//! })
//! .unwrap();
//! ```

pub mod client;
pub mod confirm;
pub mod error;
pub mod types;


pub use client::{NodeApi, NodeClient};
pub use confirm::wait_for_confirmation;
pub use error::NodeError;
pub use types::{NodeConfig, NodeInfo, TransactionStatus};
