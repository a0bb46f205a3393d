//! Amazon Pay API v2 client with RSA-PSS request signing.
//!
//! Every outbound call is turned into a deterministic canonical string,
//! hashed, signed with RSA-PSS (MGF1-SHA256, 32 byte salt) and carried in
//! the `authorization` header. Transient failures are retried with bounded
//! exponential backoff (1s, 2s, 4s; 4 attempts total).
//!
//! ## Overview
//!
//! The crate is built around a few small pieces:
//!
//! - **[`Config`] / [`Session`]**: caller-supplied credentials resolved once
//!   into an immutable session context (region, environment, base URL)
//! - **[`request`]**: canonical query, header and request-string construction
//! - **[`Signer`]**: RSA-PSS signing and authorization-header assembly
//! - **[`Client`]**: the retry-governed executor plus one method per
//!   business operation
//! - **[`HttpSend`]**: the transport seam, defaulting to `reqwest`
//!
//! ## Example
//!
//! ```no_run
//! use amzn_pay::{Client, Config};
//! use http::HeaderMap;
//! use serde_json::json;
//!
//! # async fn example() -> amzn_pay::Result<()> {
//! let client = Client::new(&Config {
//!     region: Some("eu".to_string()),
//!     public_key_id: Some("SANDBOX-XXXXXXXXXXXXXXXXXXXXXXXX".to_string()),
//!     private_key: Some(std::fs::read_to_string("private.pem").unwrap()),
//!     sandbox: true,
//! })?;
//!
//! let resp = client
//!     .create_checkout_session(
//!         &json!({
//!             "webCheckoutDetails": {
//!                 "checkoutReviewReturnUrl": "https://example.com/review"
//!             },
//!             "storeId": "amzn1.application-oa2-client.xxx"
//!         }),
//!         &HeaderMap::new(),
//!     )
//!     .await?;
//!
//! // Non-2xx responses are returned for inspection, never raised.
//! println!("status: {}", resp.status());
//! # Ok(())
//! # }
//! ```

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod constants;
pub mod hash;
pub mod request;
pub mod time;

mod error;
pub use error::{Error, ErrorKind, Result};

mod config;
pub use config::{Config, Environment, Region, Session};

mod signer;
pub use signer::Signer;

mod http;
pub use crate::http::{HttpSend, ReqwestHttpSend};

mod client;
pub use client::Client;

mod dispute;
pub use dispute::{
    DisputeFilingReason, DisputeReasonCode, DisputeResolution, DisputeState, EvidenceType,
};
