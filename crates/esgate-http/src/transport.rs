//! HTTP layer: request building and status mapping.
//!
//! This is the only place that interprets status codes. Retries, node
//! pools and sniffing are left to whatever sits in front of the cluster.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use tracing::debug;

use esgate_core::{
    client_meta_header_value, ClientConfig, DelegationCall, Headers, Method, Request, Response,
    Transport, TransportError, TransportResult, VerifyingProxy, CLIENT_META_HEADER,
};

use crate::helpers::{error_reason, join_url, network_error, parse_body};

/// User agent sent with every request.
pub const ESGATE_USER_AGENT: &str = concat!("esgate/", env!("CARGO_PKG_VERSION"));

/// A verifying client over HTTP.
pub type Client = VerifyingProxy<HttpTransport>;

/// [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    config: ClientConfig,
}

impl HttpTransport {
    pub fn new(config: ClientConfig) -> TransportResult<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(ESGATE_USER_AGENT));
        let meta = HeaderValue::from_str(&client_meta_header_value()).map_err(|e| {
            TransportError::Network {
                message: format!("invalid client meta header: {}", e),
            }
        })?;
        default_headers.insert(HeaderName::from_static(CLIENT_META_HEADER), meta);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(default_headers)
            .build()
            .map_err(|e| network_error("failed to create HTTP client", e))?;

        let base_url = config.url.trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            config,
        })
    }

    pub fn from_env() -> TransportResult<Self> {
        Self::new(ClientConfig::from_env())
    }

    /// Wrap this transport in a [`VerifyingProxy`].
    pub fn into_client(self) -> Client {
        VerifyingProxy::new(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn send(&self, request: Request) -> TransportResult<Response> {
        let url = join_url(&self.base_url, &request.path);
        debug!(method = %request.method, url = %url, "sending request");

        let mut builder = self.client.request(reqwest_method(request.method), &url);
        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }
        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| network_error("request failed", e))?;

        let status = response.status().as_u16();
        let headers: Headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v)))
            .collect();
        let text = response
            .text()
            .await
            .map_err(|e| network_error("failed to read response body", e))?;

        debug!(status, url = %url, "received response");

        match status {
            200..=299 => Ok(Response::new(status, headers, parse_body(&text))),

            401 => Err(TransportError::Unauthorized {
                message: error_reason(&text, "invalid or missing credentials"),
            }),

            403 => Err(TransportError::Forbidden {
                message: error_reason(&text, "insufficient privileges"),
            }),

            _ => Err(TransportError::Status {
                status,
                message: error_reason(&text, "no reason provided"),
            }),
        }
    }
}

fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Head => reqwest::Method::HEAD,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}

#[async_trait]
impl Transport for HttpTransport {
    type Output = Response;

    async fn perform_request(&self, request: Request) -> TransportResult<Response> {
        self.send(request).await
    }

    /// Supports `perform_request`; other operations are rejected.
    async fn invoke(&self, call: DelegationCall) -> TransportResult<Response> {
        let request = Request::try_from(&call)?;
        self.send(request).await
    }
}
