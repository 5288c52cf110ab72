//! Connectivity prober - self-test of a declared tool.
//!
//! A probe issues one lightweight request with the tool's full credentials,
//! classifies the outcome, and always writes it back to the store, failures
//! included. Only a store write failure escapes; everything the remote side
//! does is captured in the [`ProbeResult`].

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use super::definition::{TestStatus, ToolDefinition};
use super::executor::RequestExecutor;
use crate::store::ToolStore;
use crate::types::{Error, Result, ToolId};

/// Probe message for a healthy endpoint.
pub const PROBE_OK_MESSAGE: &str = "Conexão bem-sucedida! API respondeu corretamente.";

/// Outcome of a single probe, as persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    pub tool_id: ToolId,
    pub success: bool,
    pub status: TestStatus,
    pub message: String,
    /// HTTP status, when the endpoint answered at all.
    pub status_code: Option<u16>,
    pub tested_at: DateTime<Utc>,
}

/// Probes tools and records the results.
#[derive(Debug, Clone)]
pub struct ConnectivityProber {
    store: ToolStore,
    executor: Arc<RequestExecutor>,
}

impl ConnectivityProber {
    pub fn new(store: ToolStore, executor: Arc<RequestExecutor>) -> Self {
        Self { store, executor }
    }

    /// Probe a stored tool by id. Inactive tools are probed too.
    pub async fn probe(&self, id: &ToolId) -> Result<ProbeResult> {
        let tool = self.store.get(id)?;
        self.probe_tool(&tool).await
    }

    /// Probe an already-loaded tool and persist the outcome.
    pub async fn probe_tool(&self, tool: &ToolDefinition) -> Result<ProbeResult> {
        let outcome = self.executor.probe(tool).await;
        let result = classify(&tool.id, outcome, Utc::now());

        self.store
            .record_test_result(&tool.id, result.status, &result.message, result.tested_at)?;

        if result.success {
            tracing::info!(tool_id = %tool.id, "Probe succeeded");
        } else {
            tracing::warn!(
                tool_id = %tool.id,
                status_code = ?result.status_code,
                message = %result.message,
                "Probe failed"
            );
        }
        Ok(result)
    }
}

/// Map a probe outcome to a persisted result. Success is strictly HTTP 200.
fn classify(id: &ToolId, outcome: Result<u16>, tested_at: DateTime<Utc>) -> ProbeResult {
    let (success, message, status_code) = match outcome {
        Ok(200) => (true, PROBE_OK_MESSAGE.to_string(), Some(200)),
        Ok(code) => (false, format!("API retornou status {}", code), Some(code)),
        Err(err) if err.is_remote() => (false, format!("Erro de conexão: {}", err), None),
        Err(err) => (false, configuration_message(&err), None),
    };

    ProbeResult {
        tool_id: id.clone(),
        success,
        status: if success {
            TestStatus::Success
        } else {
            TestStatus::Error
        },
        message,
        status_code,
        tested_at,
    }
}

fn configuration_message(err: &Error) -> String {
    format!("Configuração inválida: {}", err)
}
