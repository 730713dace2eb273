//! The transport port and the request/response values that cross it.
//!
//! Nothing in this module performs I/O. Adapters (e.g. `esgate-http`)
//! implement [`Transport`]; the facade only ever talks to the trait.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::call::DelegationCall;
use crate::error::TransportResult;

/// HTTP method of a [`Request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "HEAD" => Ok(Self::Head),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            _ => Err(format!("unknown HTTP method: {}", s)),
        }
    }
}

/// Header mapping with case-insensitive keys.
///
/// Keys are stored lowercased; inserting a key that differs only in case
/// replaces the previous value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>")]
pub struct Headers(BTreeMap<String, String>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.0
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    pub fn with(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// Look up a header value, ignoring the case of `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over `(lowercased name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<BTreeMap<String, String>> for Headers {
    fn from(map: BTreeMap<String, String>) -> Self {
        map.into_iter().collect()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (k, v) in iter {
            headers.insert(k, v);
        }
        headers
    }
}

/// A single request against the cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub method: Method,

    /// Path relative to the base URL, starting with `/`.
    pub path: String,

    /// Query string parameters.
    #[serde(default)]
    pub params: BTreeMap<String, String>,

    /// JSON body, if any.
    #[serde(default)]
    pub body: Option<Value>,

    /// Per-request headers.
    #[serde(default)]
    pub headers: Headers,
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: BTreeMap::new(),
            body: None,
            headers: Headers::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }
}

/// Coarse classification of a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Success,
    Unauthorized,
    Forbidden,
    OtherError,
}

impl StatusClass {
    pub fn of(status: u16) -> Self {
        match status {
            200..=299 => Self::Success,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            _ => Self::OtherError,
        }
    }
}

/// A response returned by a [`Transport`].
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: u16,
    pub headers: Headers,
    pub body: Value,
}

impl Response {
    pub fn new(status: u16, headers: Headers, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn status_class(&self) -> StatusClass {
        StatusClass::of(self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Look up a nested body field by dotted path, e.g. `version.number`.
    pub fn dig(&self, path: &str) -> Option<&Value> {
        path.split('.')
            .try_fold(&self.body, |node, key| node.as_object()?.get(key))
    }

    /// Like [`Response::dig`], but only for string values.
    pub fn dig_str(&self, path: &str) -> Option<&str> {
        self.dig(path).and_then(Value::as_str)
    }
}

/// The collaborator that actually talks to the cluster.
///
/// `perform_request` is used for the bootstrap probe. `invoke` is the generic
/// "run a named operation" capability the facade forwards calls through.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Whatever a forwarded operation produces.
    type Output: Send;

    async fn perform_request(&self, request: Request) -> TransportResult<Response>;

    async fn invoke(&self, call: DelegationCall) -> TransportResult<Self::Output>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_headers_case_insensitive() {
        let headers = Headers::new().with("X-Elastic-Product", "Elasticsearch");

        assert_eq!(headers.get("x-elastic-product"), Some("Elasticsearch"));
        assert_eq!(headers.get("X-ELASTIC-PRODUCT"), Some("Elasticsearch"));
        assert_eq!(headers.get("x-elastic-products"), None);
    }

    #[test]
    fn test_headers_keys_unique_across_case() {
        let mut headers = Headers::new();
        headers.insert("Content-Type", "text/plain");
        headers.insert("content-type", "application/json");

        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("Content-Type"), Some("application/json"));
    }

    #[test]
    fn test_headers_deserialize_normalizes_keys() {
        let headers: Headers = serde_json::from_value(json!({"X-Opaque-Id": "abc"})).unwrap();
        assert_eq!(headers.get("x-opaque-id"), Some("abc"));
    }

    #[test]
    fn test_status_class() {
        assert_eq!(StatusClass::of(200), StatusClass::Success);
        assert_eq!(StatusClass::of(204), StatusClass::Success);
        assert_eq!(StatusClass::of(401), StatusClass::Unauthorized);
        assert_eq!(StatusClass::of(403), StatusClass::Forbidden);
        assert_eq!(StatusClass::of(404), StatusClass::OtherError);
        assert_eq!(StatusClass::of(500), StatusClass::OtherError);
    }

    #[test]
    fn test_dig_nested_fields() {
        let response = Response::new(
            200,
            Headers::new(),
            json!({"version": {"number": "7.10.0", "build_flavor": "default"}}),
        );

        assert_eq!(response.dig_str("version.number"), Some("7.10.0"));
        assert_eq!(response.dig_str("version.build_flavor"), Some("default"));
        assert_eq!(response.dig_str("version.tagline"), None);
        assert_eq!(response.dig("version.number.major"), None);
        assert!(response.dig("version").is_some_and(Value::is_object));
    }

    #[test]
    fn test_dig_non_object_body() {
        let response = Response::new(200, Headers::new(), json!("plain text"));
        assert_eq!(response.dig("version.number"), None);
    }

    #[test]
    fn test_method_round_trip_through_str() {
        assert_eq!("get".parse::<Method>(), Ok(Method::Get));
        assert_eq!(Method::Delete.to_string(), "DELETE");
        assert!("PATCH".parse::<Method>().is_err());
    }
}
