//! Strongly-typed identifiers.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque, immutable identifier of a tool record.
///
/// Seed tools use readable slugs (`afya_dispensas_api`); administrator-created
/// tools get a UUID v4 via [`ToolId::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ToolId(String);

impl ToolId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn from_string(s: String) -> Result<Self, &'static str> {
        if s.trim().is_empty() {
            return Err("ToolId cannot be empty");
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Capability name exported to agent runtimes: `tool_<id>`.
    pub fn capability_name(&self) -> String {
        format!("tool_{}", self.0)
    }
}

impl Default for ToolId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ToolId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for ToolId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
