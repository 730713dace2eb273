//! The verifying facade.
//!
//! [`VerifyingProxy`] wraps a [`Transport`] and gates every forwarded call on
//! a one-time product check. The check issues `GET /`, hands the response to
//! [`ProductVerifier`] and caches positive outcomes only: a rejected server
//! leaves the proxy unverified and the next call probes again.
//!
//! State is read with a single atomic load on the fast path. The probe and
//! the state write run under an async mutex, so concurrent first calls are
//! serialized, the state only moves forward, and the privilege warning is
//! logged at most once per proxy.

use std::sync::atomic::{AtomicU8, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::call::DelegationCall;
use crate::config::{BOOTSTRAP_PATH, SECURITY_PRIVILEGES_VALIDATION_WARNING};
use crate::error::{ClientResult, TransportError};
use crate::transport::{Request, StatusClass, Transport};
use crate::verifier::{ProbeResponse, ProductVerifier};

/// Cached outcome of the product check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum VerificationState {
    Unverified = 0,
    VerifiedTrusted = 1,
    /// The probe was refused for lack of privileges; trust is assumed.
    VerifiedWithPrivilegeWarning = 2,
}

impl VerificationState {
    pub fn is_verified(self) -> bool {
        !matches!(self, Self::Unverified)
    }

    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::VerifiedTrusted,
            2 => Self::VerifiedWithPrivilegeWarning,
            _ => Self::Unverified,
        }
    }
}

/// Verify once, then forward.
#[async_trait]
pub trait ProductGate: Send + Sync {
    type Output: Send;

    /// Run the product check unless a positive outcome is already cached.
    async fn verify(&self) -> ClientResult<VerificationState>;

    /// Verify, then pass `call` to the transport unchanged.
    async fn forward(&self, call: DelegationCall) -> ClientResult<Self::Output>;
}

/// Facade that verifies the server before trusting any call.
#[derive(Debug)]
pub struct VerifyingProxy<T> {
    transport: T,
    verifier: ProductVerifier,
    state: AtomicU8,
    verify_lock: Mutex<()>,
}

impl<T: Transport> VerifyingProxy<T> {
    pub fn new(transport: T) -> Self {
        Self::with_verifier(transport, ProductVerifier::new())
    }

    pub fn with_verifier(transport: T, verifier: ProductVerifier) -> Self {
        Self {
            transport,
            verifier,
            state: AtomicU8::new(VerificationState::Unverified as u8),
            verify_lock: Mutex::new(()),
        }
    }

    pub fn state(&self) -> VerificationState {
        VerificationState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// The wrapped transport. Calls made on it directly are not gated.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Forward a raw request through the gate.
    pub async fn perform_request(&self, request: Request) -> ClientResult<T::Output> {
        self.forward(DelegationCall::from(request)).await
    }

    async fn probe(&self) -> ClientResult<VerificationState> {
        debug!(path = BOOTSTRAP_PATH, "issuing bootstrap probe");

        let response = match self
            .transport
            .perform_request(Request::get(BOOTSTRAP_PATH))
            .await
        {
            Ok(response) => response,
            Err(e) if e.is_privilege_denied() => {
                debug!(error = %e, "bootstrap probe refused");
                return Ok(VerificationState::VerifiedWithPrivilegeWarning);
            }
            Err(e) => return Err(e.into()),
        };

        match response.status_class() {
            StatusClass::Success => {}
            StatusClass::Unauthorized | StatusClass::Forbidden => {
                debug!(status = response.status, "bootstrap probe refused");
                return Ok(VerificationState::VerifiedWithPrivilegeWarning);
            }
            StatusClass::OtherError => {
                return Err(TransportError::Status {
                    status: response.status,
                    message: response.body.to_string(),
                }
                .into());
            }
        }

        self.verifier.verify(&ProbeResponse::from(&response))?;
        Ok(VerificationState::VerifiedTrusted)
    }
}

#[async_trait]
impl<T: Transport> ProductGate for VerifyingProxy<T> {
    type Output = T::Output;

    async fn verify(&self) -> ClientResult<VerificationState> {
        let state = self.state();
        if state.is_verified() {
            return Ok(state);
        }

        let _guard = self.verify_lock.lock().await;

        // Another caller may have verified while we waited for the lock.
        let state = self.state();
        if state.is_verified() {
            return Ok(state);
        }

        let next = self.probe().await?;
        self.state.store(next as u8, Ordering::Release);

        if next == VerificationState::VerifiedWithPrivilegeWarning {
            warn!("{}", SECURITY_PRIVILEGES_VALIDATION_WARNING);
        }

        Ok(next)
    }

    async fn forward(&self, call: DelegationCall) -> ClientResult<T::Output> {
        self.verify().await?;
        debug!(operation = %call.operation, "forwarding call");
        Ok(self.transport.invoke(call).await?)
    }
}
