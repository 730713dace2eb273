//! Product verification and call delegation for search engine transports.
//!
//! This crate provides the transport-agnostic half of esgate:
//!
//! - [`Transport`] port with [`Request`], [`Response`] and [`DelegationCall`]
//! - [`VersionSpec`], a totally ordered parse of reported server versions
//! - [`ProductVerifier`] and its versioned rule table [`RULES`]
//! - [`VerifyingProxy`], which verifies once and then forwards every call
//! - Client identification for the `x-elastic-client-meta` header
//!
//! # Quick Start
//!
//! ```no_run
//! use esgate_core::{DelegationCall, Method, ProductGate, Transport, VerifyingProxy};
//!
//! # async fn example<T: Transport>(transport: T) -> Result<(), esgate_core::ClientError> {
//! let client = VerifyingProxy::new(transport);
//!
//! // The first call probes `GET /`; later calls go straight through.
//! let _health = client
//!     .forward(DelegationCall::perform_request(Method::Get, "/_cluster/health"))
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Verification
//!
//! | Reported version | Required evidence |
//! |------------------|-------------------|
//! | missing, `< 6.0.0`, `6.0.0` | none accepted |
//! | `6.0.0 < v < 7.0.0` | `version.tagline` |
//! | `7.0.0 <= v < 7.14.0-SNAPSHOT` | tagline and `version.build_flavor: default` |
//! | `7.x-SNAPSHOT`, `>= 7.14.0-SNAPSHOT` | `x-elastic-product: Elasticsearch` header |
//!
//! A probe refused with 401/403 is trusted with a one-time warning.

pub mod call;
pub mod config;
pub mod error;
pub mod meta;
pub mod proxy;
pub mod transport;
pub mod verifier;
pub mod version;

// Re-export main types
pub use call::{DelegationCall, PERFORM_REQUEST};
pub use config::{
    ClientConfig, BOOTSTRAP_PATH, DEFAULT_BUILD_FLAVOR, NOT_TRUSTED_PRODUCT_MESSAGE, PRODUCT_HEADER,
    PRODUCT_NAME, SECURITY_PRIVILEGES_VALIDATION_WARNING, YOU_KNOW_FOR_SEARCH,
};
pub use error::{ClientError, ClientResult, TransportError, TransportResult};
pub use meta::{client_meta_header_value, client_meta_version, service_version, CLIENT_META_HEADER};
pub use proxy::{ProductGate, VerificationState, VerifyingProxy};
pub use transport::{Headers, Method, Request, Response, StatusClass, Transport};
pub use verifier::{
    Bound, Evidence, ProbeResponse, ProductVerifier, VerificationRule, VersionMatch,
    VersionRecord, RULES,
};
pub use version::{Segment, VersionParseError, VersionSpec};
