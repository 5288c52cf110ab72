//! Capability export - active tools as named, described, invocable units.
//!
//! A [`Capability`] binds one tool record to the shared executor and mapper.
//! Invocation always yields text: either the mapper's rendering or a
//! formatted error line. Nothing raised by the remote side reaches the
//! caller as an error value.

use serde_json::{json, Map, Value};
use std::sync::Arc;

use super::definition::{ParamType, ToolDefinition};
use super::executor::RequestExecutor;
use super::mapping::{value_type_name, ResponseMapper};
use crate::types::{Error, Result, ToolId};

/// Characters of a failing response body quoted in the error line.
const ERROR_EXCERPT_CHARS: usize = 200;

// =============================================================================
// Capability
// =============================================================================

/// One exported tool.
#[derive(Debug, Clone)]
pub struct Capability {
    name: String,
    description: String,
    tool: Arc<ToolDefinition>,
    executor: Arc<RequestExecutor>,
    mapper: ResponseMapper,
}

impl Capability {
    /// Bind a tool to the executor and mapper. Does not check `is_active`.
    pub fn bind(
        tool: Arc<ToolDefinition>,
        executor: Arc<RequestExecutor>,
        mapper: ResponseMapper,
    ) -> Self {
        Self {
            name: tool.id.capability_name(),
            description: describe(&tool),
            tool,
            executor,
            mapper,
        }
    }

    /// `tool_<id>`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn tool_id(&self) -> &ToolId {
        &self.tool.id
    }

    pub fn tool(&self) -> &ToolDefinition {
        &self.tool
    }

    /// JSON Schema object describing the documented parameters.
    ///
    /// Advisory only: invocation accepts any keyword mapping.
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for param in &self.tool.parameters {
            let mut prop = json!({ "description": param.description });
            match param.param_type {
                ParamType::Other => {}
                ParamType::Array => {
                    prop["type"] = json!("array");
                    prop["items"] = json!({});
                }
                other => prop["type"] = json!(other.display_name()),
            }
            properties.insert(param.name.clone(), prop);
            if param.required {
                required.push(Value::String(param.name.clone()));
            }
        }
        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }

    /// Call the tool with keyword parameters.
    pub async fn invoke(&self, params: Map<String, Value>) -> String {
        invoke_tool(&self.tool, &self.executor, self.mapper, &params).await
    }

    /// Call the tool with a JSON value. `null` means no parameters; any
    /// other non-object is reported as an error line.
    pub async fn invoke_value(&self, params: Value) -> String {
        match params {
            Value::Object(map) => self.invoke(map).await,
            Value::Null => self.invoke(Map::new()).await,
            other => render_error(
                &self.tool.name,
                &Error::validation(format!(
                    "parameters must be a JSON object, got {}",
                    value_type_name(&other)
                )),
            ),
        }
    }
}

/// Compose the description surfaced to capability consumers.
///
/// `<description>\n\nParâmetros disponíveis:\n- <name> (<type>, obrigatório|opcional): <text>`
///
/// The header is present even when no parameters are declared.
pub fn describe(tool: &ToolDefinition) -> String {
    let lines: Vec<String> = tool
        .parameters
        .iter()
        .map(|p| {
            let requirement = if p.required { "obrigatório" } else { "opcional" };
            format!(
                "- {} ({}, {}): {}",
                p.name,
                p.param_type.display_name(),
                requirement,
                p.description
            )
        })
        .collect();

    format!(
        "{}\n\nParâmetros disponíveis:\n{}",
        tool.description,
        lines.join("\n")
    )
}

/// Export the active tools, preserving their order.
pub fn export(
    tools: impl IntoIterator<Item = ToolDefinition>,
    executor: Arc<RequestExecutor>,
    mapper: ResponseMapper,
) -> Vec<Capability> {
    tools
        .into_iter()
        .filter(|tool| tool.is_active)
        .map(|tool| Capability::bind(Arc::new(tool), executor.clone(), mapper))
        .collect()
}

// =============================================================================
// Invocation
// =============================================================================

/// Execute, decode, and render one call. Every failure becomes text.
pub async fn invoke_tool(
    tool: &ToolDefinition,
    executor: &RequestExecutor,
    mapper: ResponseMapper,
    params: &Map<String, Value>,
) -> String {
    match call(tool, executor, mapper, params).await {
        Ok(text) => text,
        Err(err) => {
            tracing::warn!(tool_id = %tool.id, error = %err, "Tool invocation failed");
            render_error(&tool.name, &err)
        }
    }
}

async fn call(
    tool: &ToolDefinition,
    executor: &RequestExecutor,
    mapper: ResponseMapper,
    params: &Map<String, Value>,
) -> Result<String> {
    let raw = executor.execute(tool, params).await?;
    if !raw.is_success() {
        return Err(Error::http_status(raw.status, raw.excerpt(ERROR_EXCERPT_CHARS)));
    }
    let body = raw.json()?;
    Ok(mapper.render(tool, &body))
}

/// Error line returned to the capability caller.
pub fn render_error(tool_name: &str, err: &Error) -> String {
    match err {
        Error::Network(_) | Error::HttpStatus { .. } => {
            format!("❌ Erro na requisição para {}: {}", tool_name, err)
        }
        Error::Decode(_) => format!("❌ Erro ao decodificar resposta JSON de {}", tool_name),
        Error::NotFound(_) => render_not_found(tool_name),
        _ => format!("❌ Erro inesperado ao executar {}: {}", tool_name, err),
    }
}

/// Result line for an id that resolves to no tool.
pub fn render_not_found(id: &str) -> String {
    format!("❌ Ferramenta não encontrada: {}", id)
}

// =============================================================================
// Tests
// =============================================================================
