//! `reqwest` transport adapter for esgate.
//!
//! Implements [`esgate_core::Transport`] over HTTP so a
//! [`esgate_core::VerifyingProxy`] can talk to a real cluster:
//!
//! - one request per call, with the configured timeout
//! - `user-agent` and `x-elastic-client-meta` on every request
//! - 401/403 mapped to `Unauthorized`/`Forbidden`, other failures to `Status`
//!
//! # Quick Start
//!
//! ```no_run
//! use esgate_core::{DelegationCall, Method, ProductGate};
//! use esgate_http::HttpTransport;
//!
//! # async fn example() -> anyhow::Result<()> {
//! // Reads ELASTICSEARCH_URL and ESGATE_TIMEOUT
//! let client = HttpTransport::from_env()?.into_client();
//!
//! let response = client
//!     .forward(DelegationCall::perform_request(Method::Get, "/_cluster/health"))
//!     .await?;
//! println!("cluster status: {}", response.body["status"]);
//! # Ok(())
//! # }
//! ```

mod helpers;
pub mod transport;

pub use transport::{Client, HttpTransport, ESGATE_USER_AGENT};
