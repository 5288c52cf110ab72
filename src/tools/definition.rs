//! Tool definitions - the declarative model operators author.
//!
//! A [`ToolDefinition`] describes one external HTTP integration: where it
//! lives, how to authenticate, which parameters it documents, and how to
//! flatten its response. The persisted JSON keys (`type`, `apiKey`,
//! `headerName`, `dataPath`) match what administrative surfaces write.

use chrono::{DateTime, Utc};
use reqwest::Method;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::types::{Error, Result, ToolId};

// =============================================================================
// Tool kind
// =============================================================================

/// Informational classification. Does not alter execution semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    Api,
    Database,
    Webhook,
}

impl ToolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::Api => "api",
            ToolKind::Database => "database",
            ToolKind::Webhook => "webhook",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "api" => Some(ToolKind::Api),
            "database" => Some(ToolKind::Database),
            "webhook" => Some(ToolKind::Webhook),
            _ => None,
        }
    }
}

// =============================================================================
// Authentication
// =============================================================================

/// Authentication scheme, tagged by `type`.
///
/// Secrets are stored in plaintext; missing secrets are allowed and simply
/// produce no header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Authentication {
    #[default]
    None,
    Bearer {
        #[serde(default)]
        token: String,
    },
    ApiKey {
        #[serde(rename = "apiKey", default)]
        key: String,
        #[serde(
            rename = "headerName",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        header_name: Option<String>,
    },
    Basic {
        #[serde(default)]
        username: String,
        #[serde(default)]
        password: String,
    },
}

impl Authentication {
    pub fn scheme_name(&self) -> &'static str {
        match self {
            Authentication::None => "none",
            Authentication::Bearer { .. } => "bearer",
            Authentication::ApiKey { .. } => "api_key",
            Authentication::Basic { .. } => "basic",
        }
    }
}

// =============================================================================
// Parameters
// =============================================================================

/// Declared parameter type. Documentation only; never enforced at call time.
///
/// Types this crate does not know decode as `Other` instead of failing the
/// whole record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Boolean,
    Array,
    #[serde(other)]
    Other,
}

impl ParamType {
    pub fn display_name(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::Array => "array",
            ParamType::Other => "any",
        }
    }
}

/// A single documented parameter of a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ParamDef {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: String,
}

impl ParamDef {
    pub fn new(name: &str, param_type: ParamType, required: bool, description: &str) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            required,
            description: description.to_string(),
        }
    }
}

// =============================================================================
// Response mapping
// =============================================================================

/// Target type of a mapped field. Coercion is best-effort.
///
/// `Array` and unknown types pass the source value through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    String,
    Number,
    Boolean,
    Array,
    #[serde(other)]
    Other,
}

/// One `source -> target` rename with a coercion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct FieldMapping {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(rename = "type", default)]
    pub field_type: FieldType,
}

impl FieldMapping {
    pub fn new(source: &str, target: &str, field_type: FieldType) -> Self {
        Self {
            source: source.to_string(),
            target: Some(target.to_string()),
            field_type,
        }
    }

    /// Output key. Falls back to `source` when no target is declared.
    pub fn target_name(&self) -> &str {
        match self.target.as_deref() {
            Some(target) if !target.is_empty() => target,
            _ => &self.source,
        }
    }
}

/// Declarative extraction of a sub-structure of the response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub struct ResponseMapping {
    /// Dot-delimited path, possibly empty.
    #[serde(rename = "dataPath", alias = "data_path", default)]
    pub data_path: String,
    #[serde(default)]
    pub fields: Vec<FieldMapping>,
}

// =============================================================================
// Test status
// =============================================================================

/// Outcome of the last connectivity probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Success,
    Error,
    /// Written by administrative surfaces while a test is in flight.
    Pending,
}

impl TestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Success => "success",
            TestStatus::Error => "error",
            TestStatus::Pending => "pending",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(TestStatus::Success),
            "error" => Some(TestStatus::Error),
            "pending" => Some(TestStatus::Pending),
            _ => None,
        }
    }
}

// =============================================================================
// Tool definition
// =============================================================================

/// HTTP verbs a tool may declare.
const SUPPORTED_METHODS: &[&str] = &["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD"];

fn default_method() -> String {
    "GET".to_string()
}

fn default_active() -> bool {
    true
}

/// Complete tool record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ToolDefinition {
    pub id: ToolId,
    pub name: String,
    /// Surfaced verbatim to capability consumers.
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ToolKind,
    /// Absolute URL.
    pub endpoint: String,
    #[serde(default = "default_method")]
    pub method: String,
    #[serde(default)]
    pub authentication: Authentication,
    /// Static headers. Auth-derived headers override these.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub parameters: Vec<ParamDef>,
    #[serde(default)]
    pub response_mapping: ResponseMapping,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub last_tested: Option<DateTime<Utc>>,
    #[serde(default)]
    pub test_status: Option<TestStatus>,
    #[serde(default)]
    pub test_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ToolDefinition {
    /// A fresh, active `GET` tool with no auth, headers, parameters, or mapping.
    pub fn new(
        id: impl Into<ToolId>,
        name: &str,
        description: &str,
        kind: ToolKind,
        endpoint: &str,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.to_string(),
            description: description.to_string(),
            kind,
            endpoint: endpoint.to_string(),
            method: default_method(),
            authentication: Authentication::None,
            headers: BTreeMap::new(),
            parameters: Vec::new(),
            response_mapping: ResponseMapping::default(),
            is_active: true,
            last_tested: None,
            test_status: None,
            test_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Parse the declared verb, case-insensitively.
    pub fn http_method(&self) -> Result<Method> {
        let upper = self.method.trim().to_ascii_uppercase();
        if !SUPPORTED_METHODS.contains(&upper.as_str()) {
            return Err(Error::validation(format!(
                "Unsupported HTTP method '{}' for tool {}",
                self.method, self.id
            )));
        }
        Method::from_bytes(upper.as_bytes())
            .map_err(|e| Error::validation(format!("Invalid HTTP method: {}", e)))
    }

    /// Whether call parameters travel as a query string rather than a body.
    pub fn sends_query(&self) -> bool {
        self.method.trim().eq_ignore_ascii_case("GET")
    }

    /// JSON Schema of the persisted record, for administrative validation.
    pub fn json_schema() -> Value {
        let schema = schemars::schema_for!(ToolDefinition);
        serde_json::to_value(schema).unwrap_or(Value::Null)
    }
}

// =============================================================================
// Tests
// =============================================================================
