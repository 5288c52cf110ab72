//! SQLite schema for tool records.
//!
//! JSON-valued columns hold the serialized authentication, headers,
//! parameters, and response mapping. Timestamps are RFC 3339 text.

pub const CREATE_TOOLS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS tools (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL,
    type TEXT NOT NULL,
    endpoint TEXT NOT NULL,
    method TEXT DEFAULT 'GET',
    authentication TEXT DEFAULT '{}',
    headers TEXT DEFAULT '{}',
    parameters TEXT DEFAULT '[]',
    response_mapping TEXT DEFAULT '{}',
    is_active INTEGER NOT NULL DEFAULT 1,
    last_tested TEXT,
    test_status TEXT,
    test_message TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
"#;

pub const TOOL_COLUMNS: &str = "id, name, description, type, endpoint, method, authentication, \
     headers, parameters, response_mapping, is_active, last_tested, test_status, test_message, \
     created_at, updated_at";

pub const INSERT_IF_ABSENT: &str = "INSERT OR IGNORE INTO tools \
     (id, name, description, type, endpoint, method, authentication, headers, parameters, \
      response_mapping, is_active, created_at, updated_at) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)";

pub const UPSERT: &str = "INSERT INTO tools \
     (id, name, description, type, endpoint, method, authentication, headers, parameters, \
      response_mapping, is_active, created_at, updated_at) \
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13) \
     ON CONFLICT(id) DO UPDATE SET \
        name = excluded.name, \
        description = excluded.description, \
        type = excluded.type, \
        endpoint = excluded.endpoint, \
        method = excluded.method, \
        authentication = excluded.authentication, \
        headers = excluded.headers, \
        parameters = excluded.parameters, \
        response_mapping = excluded.response_mapping, \
        is_active = excluded.is_active, \
        updated_at = excluded.updated_at";
