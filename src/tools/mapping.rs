//! Response mapping - declarative extraction, renaming, and coercion.
//!
//! Tool configurations are operator-authored and may be stale, so every
//! function here is total over arbitrary JSON: a wrong or absent data path
//! yields an empty result, a failed coercion keeps the original value, and a
//! node that cannot be field-mapped at all degrades to a raw JSON dump. The
//! rendered output is plain text meant to be fed to a model as-is.

use serde_json::{Map, Number, Value};
use std::fmt::Write;
use thiserror::Error;

use super::definition::{FieldMapping, FieldType, ResponseMapping, ToolDefinition};

/// Default list truncation limit.
pub const DEFAULT_MAX_ITEMS: usize = 10;

/// One flattened record, in field-declaration order.
pub type MappedRecord = Vec<(String, Value)>;

/// Result of a successful mapping pass.
#[derive(Debug, Clone, PartialEq)]
pub enum MappedResult {
    /// The data path resolved to a sequence (already truncated).
    List(Vec<MappedRecord>),
    /// The data path resolved to a mapping, or missed entirely.
    Single(MappedRecord),
}

/// Shape mismatch that field mapping cannot recover from.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("cannot map fields of a {found} at data path '{path}'")]
    NotMappable { path: String, found: &'static str },

    #[error("list element {index} is a {found}, expected an object")]
    ElementNotMappable { index: usize, found: &'static str },
}

/// Stateless mapper; only carries the truncation limit.
#[derive(Debug, Clone, Copy)]
pub struct ResponseMapper {
    max_items: usize,
}

impl Default for ResponseMapper {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ITEMS)
    }
}

impl ResponseMapper {
    pub fn new(max_items: usize) -> Self {
        Self { max_items }
    }

    pub fn max_items(&self) -> usize {
        self.max_items
    }

    /// Navigate to the data path and apply the field map.
    pub fn map(
        &self,
        mapping: &ResponseMapping,
        raw: &Value,
    ) -> Result<MappedResult, MappingError> {
        let node = match resolve_path(raw, &mapping.data_path) {
            Some(node) => node,
            None => {
                tracing::debug!(data_path = %mapping.data_path, "Data path missed, mapping empty result");
                return Ok(MappedResult::Single(Vec::new()));
            }
        };

        match node {
            Value::Array(items) => items
                .iter()
                .take(self.max_items)
                .enumerate()
                .map(|(index, item)| match item {
                    Value::Object(obj) => Ok(map_fields(obj, &mapping.fields)),
                    other => Err(MappingError::ElementNotMappable {
                        index,
                        found: value_type_name(other),
                    }),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(MappedResult::List),
            Value::Object(obj) => Ok(MappedResult::Single(map_fields(obj, &mapping.fields))),
            other => Err(MappingError::NotMappable {
                path: mapping.data_path.clone(),
                found: value_type_name(other),
            }),
        }
    }

    /// Map and render as text. Never fails: unmappable shapes fall back to a
    /// pretty-printed dump of the raw body behind a warning line.
    pub fn render(&self, tool: &ToolDefinition, raw: &Value) -> String {
        match self.map(&tool.response_mapping, raw) {
            Ok(result) => render_result(&tool.name, &result),
            Err(err) => {
                tracing::warn!(tool_id = %tool.id, error = %err, "Response mapping degraded to raw output");
                render_fallback(&tool.name, &err, raw)
            }
        }
    }
}

// =============================================================================
// Traversal
// =============================================================================

/// Walk a dot-delimited path. Empty segments are skipped.
///
/// Returns `None` when a segment is absent or the current node is not a
/// mapping, which callers treat as an empty mapping.
pub fn resolve_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = value;
    for segment in path.split('.').filter(|s| !s.is_empty()) {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

// =============================================================================
// Field mapping
// =============================================================================

/// Apply the field map to one element. Absent sources are omitted, not
/// defaulted. A repeated target keeps its first position and the last value.
pub fn map_fields(element: &Map<String, Value>, fields: &[FieldMapping]) -> MappedRecord {
    let mut record: MappedRecord = Vec::with_capacity(fields.len());
    for field in fields {
        let Some(value) = element.get(&field.source) else {
            continue;
        };
        let coerced = coerce(value, field.field_type);
        let target = field.target_name();
        match record.iter_mut().find(|(key, _)| key == target) {
            Some(slot) => slot.1 = coerced,
            None => record.push((target.to_string(), coerced)),
        }
    }
    record
}

/// Best-effort coercion. Anything that cannot be converted is returned
/// unchanged.
pub fn coerce(value: &Value, field_type: FieldType) -> Value {
    match field_type {
        FieldType::Number => match value {
            Value::String(s) => parse_number(s).unwrap_or_else(|| value.clone()),
            _ => value.clone(),
        },
        FieldType::Boolean => Value::Bool(is_truthy(value)),
        FieldType::String => match value {
            Value::String(_) => value.clone(),
            other => Value::String(other.to_string()),
        },
        FieldType::Array | FieldType::Other => value.clone(),
    }
}

/// Integer when there is no decimal point, float otherwise. Integers past
/// the `u64` range degrade to the nearest float.
fn parse_number(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.contains('.') {
        return parse_float(trimmed);
    }
    if let Ok(int) = trimmed.parse::<i64>() {
        return Some(Value::Number(int.into()));
    }
    if let Ok(uint) = trimmed.parse::<u64>() {
        return Some(Value::Number(uint.into()));
    }
    let digits = trimmed.strip_prefix(&['-', '+'][..]).unwrap_or(trimmed);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        return parse_float(trimmed);
    }
    None
}

fn parse_float(text: &str) -> Option<Value> {
    let parsed: f64 = text.parse().ok()?;
    Number::from_f64(parsed).map(Value::Number)
}

/// Truthiness: null, false, zero, and empty strings/collections are false.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

pub(crate) fn value_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Rendering
// =============================================================================

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Count-prefixed list rendering or single-record rendering.
pub fn render_result(tool_name: &str, result: &MappedResult) -> String {
    let mut out = String::new();
    match result {
        MappedResult::List(records) => {
            let _ = write!(
                out,
                "✅ {} - {} resultados encontrados:\n\n",
                tool_name,
                records.len()
            );
            for (i, record) in records.iter().enumerate() {
                let _ = writeln!(out, "📋 Resultado {}:", i + 1);
                for (key, value) in record {
                    let _ = writeln!(out, "   • {}: {}", key, display_value(value));
                }
                out.push('\n');
            }
        }
        MappedResult::Single(record) => {
            let _ = write!(out, "✅ {} - Resultado:\n\n", tool_name);
            for (key, value) in record {
                let _ = writeln!(out, "• {}: {}", key, display_value(value));
            }
        }
    }
    out
}

/// Warning line followed by the pretty-printed raw body.
pub fn render_fallback(tool_name: &str, err: &MappingError, raw: &Value) -> String {
    let pretty = serde_json::to_string_pretty(raw).unwrap_or_else(|_| raw.to_string());
    format!(
        "⚠️ Dados recebidos de {}, mas erro na formatação: {}\n\nDados brutos: {}",
        tool_name, err, pretty
    )
}

// =============================================================================
// Tests
// =============================================================================
