//! Calls forwarded through the facade.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::TransportError;
use crate::transport::{Headers, Method, Request};

/// Operation name of the transport's raw request entry point.
pub const PERFORM_REQUEST: &str = "perform_request";

/// A named operation plus its arguments, forwarded unchanged to the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DelegationCall {
    pub operation: String,

    /// Positional arguments.
    #[serde(default)]
    pub args: Vec<Value>,

    /// Keyword arguments.
    #[serde(default)]
    pub kwargs: Map<String, Value>,
}

impl DelegationCall {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            args: Vec::new(),
            kwargs: Map::new(),
        }
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.args.push(value.into());
        self
    }

    /// Set a keyword argument.
    pub fn kwarg(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.kwargs.insert(key.into(), value.into());
        self
    }

    /// A `perform_request(method, path)` call.
    pub fn perform_request(method: Method, path: impl Into<String>) -> Self {
        Self::new(PERFORM_REQUEST)
            .arg(method.as_str())
            .arg(Value::String(path.into()))
    }

    pub fn with_params(self, params: BTreeMap<String, String>) -> Self {
        let params: Map<String, Value> = params
            .into_iter()
            .map(|(k, v)| (k, Value::String(v)))
            .collect();
        self.kwarg("params", params)
    }

    pub fn with_body(self, body: Value) -> Self {
        self.kwarg("body", body)
    }

    pub fn with_headers(self, headers: &Headers) -> Self {
        let headers: Map<String, Value> = headers
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect();
        self.kwarg("headers", headers)
    }

    pub fn is_perform_request(&self) -> bool {
        self.operation == PERFORM_REQUEST
    }

    fn invalid(&self, message: impl Into<String>) -> TransportError {
        TransportError::InvalidCall {
            operation: self.operation.clone(),
            message: message.into(),
        }
    }

    /// Argument given either at `position` or as keyword `name`, not both.
    fn optional(&self, position: usize, name: &str) -> Result<Option<&Value>, TransportError> {
        match (self.args.get(position), self.kwargs.get(name)) {
            (Some(_), Some(_)) => Err(self.invalid(format!("`{}` given twice", name))),
            (Some(v), None) | (None, Some(v)) if !v.is_null() => Ok(Some(v)),
            _ => Ok(None),
        }
    }

    fn required_str(&self, position: usize, name: &str) -> Result<&str, TransportError> {
        self.optional(position, name)?
            .ok_or_else(|| self.invalid(format!("missing `{}`", name)))?
            .as_str()
            .ok_or_else(|| self.invalid(format!("`{}` must be a string", name)))
    }
}

impl From<Request> for DelegationCall {
    fn from(request: Request) -> Self {
        let mut call = Self::perform_request(request.method, request.path);
        if !request.params.is_empty() {
            call = call.with_params(request.params);
        }
        if let Some(body) = request.body {
            call = call.with_body(body);
        }
        if !request.headers.is_empty() {
            call = call.with_headers(&request.headers);
        }
        call
    }
}

impl TryFrom<&DelegationCall> for Request {
    type Error = TransportError;

    /// Decode `perform_request(method, path, params?, body?, headers?)`.
    fn try_from(call: &DelegationCall) -> Result<Self, Self::Error> {
        if !call.is_perform_request() {
            return Err(TransportError::UnsupportedOperation {
                operation: call.operation.clone(),
            });
        }
        if call.args.len() > 5 {
            return Err(call.invalid("too many positional arguments"));
        }

        let method = call
            .required_str(0, "method")?
            .parse::<Method>()
            .map_err(|e| call.invalid(e))?;
        let path = call.required_str(1, "path")?;
        if !path.starts_with('/') {
            return Err(call.invalid("`path` must start with '/'"));
        }

        let mut request = Request::new(method, path);

        if let Some(params) = call.optional(2, "params")? {
            let params = params
                .as_object()
                .ok_or_else(|| call.invalid("`params` must be an object"))?;
            request.params = params
                .iter()
                .map(|(k, v)| {
                    let v = match v {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (k.clone(), v)
                })
                .collect();
        }

        request.body = call.optional(3, "body")?.cloned();

        if let Some(headers) = call.optional(4, "headers")? {
            request.headers = serde_json::from_value(headers.clone())
                .map_err(|e| call.invalid(format!("`headers` must map names to strings: {}", e)))?;
        }

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_perform_request_decodes_to_request() {
        let call = DelegationCall::perform_request(Method::Post, "/logs/_search")
            .with_params(BTreeMap::from([("size".to_string(), "10".to_string())]))
            .with_body(json!({"query": {"match_all": {}}}))
            .with_headers(&Headers::new().with("X-Opaque-Id", "req-1"));

        let request = Request::try_from(&call).unwrap();

        assert_eq!(request.method, Method::Post);
        assert_eq!(request.path, "/logs/_search");
        assert_eq!(request.params.get("size").map(String::as_str), Some("10"));
        assert_eq!(request.body, Some(json!({"query": {"match_all": {}}})));
        assert_eq!(request.headers.get("x-opaque-id"), Some("req-1"));
    }

    #[test]
    fn test_request_survives_delegation() {
        let mut request = Request::new(Method::Put, "/logs/_doc/1");
        request.params.insert("refresh".to_string(), "true".to_string());
        request.body = Some(json!({"message": "hello"}));
        request.headers.insert("Content-Type", "application/json");

        let call = DelegationCall::from(request.clone());
        assert!(call.is_perform_request());
        assert_eq!(Request::try_from(&call).unwrap(), request);
    }

    #[test]
    fn test_positional_arguments() {
        let call = DelegationCall::new(PERFORM_REQUEST)
            .arg("get")
            .arg("/_cluster/health")
            .arg(json!({"wait_for_status": "green", "timeout": 30}));

        let request = Request::try_from(&call).unwrap();

        assert_eq!(request.method, Method::Get);
        assert_eq!(
            request.params.get("wait_for_status").map(String::as_str),
            Some("green")
        );
        assert_eq!(request.params.get("timeout").map(String::as_str), Some("30"));
        assert_eq!(request.body, None);
    }

    #[test]
    fn test_null_body_is_absent() {
        let call = DelegationCall::perform_request(Method::Get, "/").with_body(Value::Null);
        assert_eq!(Request::try_from(&call).unwrap().body, None);
    }

    #[test]
    fn test_argument_given_twice_is_rejected() {
        let call = DelegationCall::perform_request(Method::Get, "/")
            .arg(json!({}))
            .kwarg("params", json!({}));

        let err = Request::try_from(&call).unwrap_err();
        assert!(matches!(err, TransportError::InvalidCall { .. }));
        assert!(err.to_string().contains("given twice"));
    }

    #[test]
    fn test_missing_path_is_rejected() {
        let call = DelegationCall::new(PERFORM_REQUEST).arg("GET");
        assert!(matches!(
            Request::try_from(&call),
            Err(TransportError::InvalidCall { .. })
        ));
    }

    #[test]
    fn test_bad_method_is_rejected() {
        let call = DelegationCall::new(PERFORM_REQUEST).arg("FETCH").arg("/");
        assert!(matches!(
            Request::try_from(&call),
            Err(TransportError::InvalidCall { .. })
        ));
    }

    #[test]
    fn test_other_operations_are_unsupported() {
        let call = DelegationCall::new("reload_connections");
        assert_eq!(
            Request::try_from(&call),
            Err(TransportError::UnsupportedOperation {
                operation: "reload_connections".to_string()
            })
        );
    }
}
