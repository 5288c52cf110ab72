//! Tool record store - SQLite persistence for tool definitions.
//!
//! The store is an explicitly constructed handle: open it at startup, clone it
//! into whichever component needs it, close it on shutdown. Clones share one
//! connection behind a mutex, which also serializes writes.
//!
//! Rows may be written by administrative surfaces this crate does not own, so
//! reads are tolerant: a malformed JSON column degrades to its default with a
//! warning instead of failing the listing.

pub mod schema;
pub mod seed;

use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::tools::{TestStatus, ToolDefinition, ToolKind};
use crate::types::{Error, Result, ToolId};
use schema::{CREATE_TOOLS_TABLE, INSERT_IF_ABSENT, TOOL_COLUMNS, UPSERT};

/// Handle to the tool record store.
#[derive(Debug, Clone)]
pub struct ToolStore {
    conn: Arc<Mutex<Connection>>,
    path: Option<PathBuf>,
}

impl ToolStore {
    /// Open (or create) the store at `path` and seed the built-in tools.
    ///
    /// The parent directory is created if absent.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        tracing::info!(path = %path.display(), "Opened tool store");
        Self::init(conn, Some(path.to_path_buf()))
    }

    /// Volatile store, seeded like an on-disk one.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init(conn, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        conn.execute_batch(CREATE_TOOLS_TABLE)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
            path,
        };
        store.seed_defaults()?;
        Ok(store)
    }

    /// Backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| Error::internal(format!("tool store lock poisoned: {}", e)))
    }

    /// Insert the built-in tools that are not present yet. Returns how many
    /// were inserted.
    pub fn seed_defaults(&self) -> Result<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut inserted = 0;
        for tool in seed::default_tools() {
            inserted += tx.execute(
                INSERT_IF_ABSENT,
                params![
                    tool.id.as_str(),
                    tool.name,
                    tool.description,
                    tool.kind.as_str(),
                    tool.endpoint,
                    tool.method,
                    serde_json::to_string(&tool.authentication)?,
                    serde_json::to_string(&tool.headers)?,
                    serde_json::to_string(&tool.parameters)?,
                    serde_json::to_string(&tool.response_mapping)?,
                    tool.is_active,
                    tool.created_at.to_rfc3339(),
                    tool.updated_at.to_rfc3339(),
                ],
            )?;
        }
        tx.commit()?;

        if inserted > 0 {
            tracing::info!(inserted, "Seeded default tools");
        }
        Ok(inserted)
    }

    /// All tools in creation order.
    pub fn list_all(&self) -> Result<Vec<ToolDefinition>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM tools ORDER BY created_at, rowid",
            TOOL_COLUMNS
        ))?;
        let tools = stmt
            .query_map([], row_to_tool)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tools)
    }

    /// Active tools in creation order.
    pub fn list_active(&self) -> Result<Vec<ToolDefinition>> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|tool| tool.is_active)
            .collect())
    }

    pub fn get(&self, id: &ToolId) -> Result<ToolDefinition> {
        let conn = self.lock()?;
        conn.query_row(
            &format!("SELECT {} FROM tools WHERE id = ?1", TOOL_COLUMNS),
            [id.as_str()],
            row_to_tool,
        )
        .optional()?
        .ok_or_else(|| Error::not_found(format!("Unknown tool: {}", id)))
    }

    /// Persist the outcome of a connectivity probe.
    pub fn record_test_result(
        &self,
        id: &ToolId,
        status: TestStatus,
        message: &str,
        tested_at: DateTime<Utc>,
    ) -> Result<()> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE tools SET test_status = ?1, test_message = ?2, last_tested = ?3 WHERE id = ?4",
            params![status.as_str(), message, tested_at.to_rfc3339(), id.as_str()],
        )?;
        if changed == 0 {
            return Err(Error::not_found(format!("Unknown tool: {}", id)));
        }
        Ok(())
    }

    /// Administrative insert-or-update. Keeps `created_at` and probe fields of
    /// an existing record, bumps `updated_at`.
    pub fn save(&self, tool: &ToolDefinition) -> Result<ToolDefinition> {
        if tool.id.as_str().trim().is_empty() {
            return Err(Error::validation("Tool id cannot be empty"));
        }
        if tool.name.trim().is_empty() {
            return Err(Error::validation("Tool name cannot be empty"));
        }
        if tool.endpoint.trim().is_empty() {
            return Err(Error::validation("Tool endpoint cannot be empty"));
        }
        tool.http_method()?;

        let now = Utc::now();
        {
            let conn = self.lock()?;
            conn.execute(
                UPSERT,
                params![
                    tool.id.as_str(),
                    tool.name,
                    tool.description,
                    tool.kind.as_str(),
                    tool.endpoint,
                    tool.method.trim().to_ascii_uppercase(),
                    serde_json::to_string(&tool.authentication)?,
                    serde_json::to_string(&tool.headers)?,
                    serde_json::to_string(&tool.parameters)?,
                    serde_json::to_string(&tool.response_mapping)?,
                    tool.is_active,
                    tool.created_at.to_rfc3339(),
                    now.to_rfc3339(),
                ],
            )?;
        }
        tracing::info!(tool_id = %tool.id, "Saved tool definition");
        self.get(&tool.id)
    }

    /// Administrative activation toggle.
    pub fn set_active(&self, id: &ToolId, active: bool) -> Result<()> {
        let conn = self.lock()?;
        let changed = conn.execute(
            "UPDATE tools SET is_active = ?1, updated_at = ?2 WHERE id = ?3",
            params![active, Utc::now().to_rfc3339(), id.as_str()],
        )?;
        if changed == 0 {
            return Err(Error::not_found(format!("Unknown tool: {}", id)));
        }
        tracing::info!(tool_id = %id, active, "Changed tool activation");
        Ok(())
    }

    /// Close the connection if this is the last handle. Other clones keep it
    /// open until they are dropped.
    pub fn close(self) -> Result<()> {
        match Arc::try_unwrap(self.conn) {
            Ok(mutex) => {
                let conn = mutex
                    .into_inner()
                    .map_err(|e| Error::internal(format!("tool store lock poisoned: {}", e)))?;
                conn.close().map_err(|(_, e)| Error::Storage(e))
            }
            Err(_) => Ok(()),
        }
    }
}

// =============================================================================
// Row decoding
// =============================================================================

fn row_to_tool(row: &Row<'_>) -> rusqlite::Result<ToolDefinition> {
    let id: String = row.get("id")?;
    let kind: String = row.get("type")?;
    let method: Option<String> = row.get("method")?;
    let last_tested: Option<String> = row.get("last_tested")?;
    let test_status: Option<String> = row.get("test_status")?;
    let created_at: String = row.get("created_at")?;
    let updated_at: String = row.get("updated_at")?;

    let tool = ToolDefinition {
        kind: ToolKind::parse(&kind).unwrap_or_else(|| {
            tracing::warn!(tool_id = %id, kind = %kind, "Unknown tool type, treating as api");
            ToolKind::Api
        }),
        method: method
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| "GET".to_string()),
        authentication: json_column(&id, "authentication", row.get("authentication")?),
        headers: json_column(&id, "headers", row.get("headers")?),
        parameters: json_column(&id, "parameters", row.get("parameters")?),
        response_mapping: json_column(&id, "response_mapping", row.get("response_mapping")?),
        is_active: row.get("is_active")?,
        last_tested: last_tested.as_deref().and_then(parse_timestamp),
        test_status: test_status.as_deref().and_then(TestStatus::parse),
        test_message: row.get("test_message")?,
        created_at: parse_timestamp(&created_at).unwrap_or_else(Utc::now),
        updated_at: parse_timestamp(&updated_at).unwrap_or_else(Utc::now),
        name: row.get("name")?,
        description: row.get("description")?,
        endpoint: row.get("endpoint")?,
        id: ToolId::from(id.as_str()),
    };
    Ok(tool)
}

/// Decode a JSON column, falling back to the default on absence, an empty
/// object, or malformed content.
fn json_column<T: DeserializeOwned + Default>(id: &str, column: &str, raw: Option<String>) -> T {
    let Some(text) = raw.filter(|t| !t.trim().is_empty()) else {
        return T::default();
    };
    let value: Value = match serde_json::from_str(&text) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(tool_id = %id, column, error = %e, "Malformed JSON column, using default");
            return T::default();
        }
    };
    if value.as_object().is_some_and(|obj| obj.is_empty()) {
        if let Ok(decoded) = serde_json::from_value(value.clone()) {
            return decoded;
        }
        return T::default();
    }
    serde_json::from_value(value).unwrap_or_else(|e| {
        tracing::warn!(tool_id = %id, column, error = %e, "Unexpected JSON column shape, using default");
        T::default()
    })
}

/// RFC 3339, or a naive ISO-8601 timestamp taken as UTC.
fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

// =============================================================================
// Tests
// =============================================================================
