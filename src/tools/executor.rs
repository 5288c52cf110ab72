//! Request execution - one HTTP round trip per tool invocation.
//!
//! `GET` tools carry their call parameters as a query string; every other
//! verb sends them as a JSON body. Calls are never retried; a timeout is a
//! network error like any other.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use super::auth::{build_auth_headers, merge_headers};
use super::definition::ToolDefinition;
use crate::types::{Error, HttpConfig, Result};

/// Undecoded response of a tool call.
///
/// The body is kept as text so callers decide whether a non-success status
/// is still worth decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decode the body as JSON.
    pub fn json(&self) -> Result<Value> {
        serde_json::from_str(&self.body)
            .map_err(|e| Error::decode(format!("response body is not valid JSON: {}", e)))
    }

    /// Short body excerpt for error messages.
    pub fn excerpt(&self, max_chars: usize) -> String {
        let trimmed = self.body.trim();
        if trimmed.chars().count() <= max_chars {
            return trimmed.to_string();
        }
        let cut: String = trimmed.chars().take(max_chars).collect();
        format!("{}…", cut)
    }
}

/// Stateless HTTP executor shared by capabilities and the prober.
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    client: reqwest::Client,
    invoke_timeout: Duration,
    probe_timeout: Duration,
}

impl RequestExecutor {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::internal(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            invoke_timeout: config.invoke_timeout,
            probe_timeout: config.probe_timeout,
        })
    }

    pub fn invoke_timeout(&self) -> Duration {
        self.invoke_timeout
    }

    pub fn probe_timeout(&self) -> Duration {
        self.probe_timeout
    }

    /// Issue the tool's request with caller-supplied parameters.
    pub async fn execute(
        &self,
        tool: &ToolDefinition,
        params: &Map<String, Value>,
    ) -> Result<RawResponse> {
        let method = tool.http_method()?;
        let headers = resolve_headers(tool)?;

        let mut request = self
            .client
            .request(method.clone(), tool.endpoint.as_str())
            .headers(headers)
            .timeout(self.invoke_timeout);

        request = if tool.sends_query() {
            request.query(&query_pairs(params))
        } else {
            request.json(params)
        };

        tracing::debug!(
            tool_id = %tool.id,
            method = %method,
            endpoint = %tool.endpoint,
            param_count = params.len(),
            "Dispatching tool request"
        );

        let started = Instant::now();
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        tracing::info!(
            tool_id = %tool.id,
            status,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Tool request completed"
        );

        Ok(RawResponse { status, body })
    }

    /// Lightweight reachability/auth check. Returns the HTTP status.
    ///
    /// `GET` probes carry no body; other verbs send an empty JSON object.
    pub async fn probe(&self, tool: &ToolDefinition) -> Result<u16> {
        let method = tool.http_method()?;
        let headers = resolve_headers(tool)?;

        let mut request = self
            .client
            .request(method, tool.endpoint.as_str())
            .headers(headers)
            .timeout(self.probe_timeout);

        if !tool.sends_query() {
            request = request.json(&Map::new());
        }

        let response = request.send().await?;
        Ok(response.status().as_u16())
    }
}

/// Static headers overlaid with auth-derived headers, as a `HeaderMap`.
fn resolve_headers(tool: &ToolDefinition) -> Result<HeaderMap> {
    let merged = merge_headers(&tool.headers, build_auth_headers(&tool.authentication));
    to_header_map(&merged)
}

fn to_header_map(headers: &BTreeMap<String, String>) -> Result<HeaderMap> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|_| Error::validation(format!("Invalid header name: {}", key)))?;
        let val = HeaderValue::from_str(value)
            .map_err(|_| Error::validation(format!("Invalid value for header {}", key)))?;
        map.insert(name, val);
    }
    Ok(map)
}

/// Flatten call parameters into query pairs.
///
/// Nulls are dropped, arrays become repeated keys, nested objects are sent
/// as compact JSON text.
fn query_pairs(params: &Map<String, Value>) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(params.len());
    for (key, value) in params {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items.iter().filter(|v| !v.is_null()) {
                    pairs.push((key.clone(), scalar_text(item)));
                }
            }
            other => pairs.push((key.clone(), scalar_text(other))),
        }
    }
    pairs
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
