use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::session::state::{Dialect, Language, Session, SqlMode};

/// Name of the JSON key carrying the schema text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaField {
    #[default]
    Schema,
    SchemaDdl,
}

impl SchemaField {
    pub fn key(&self) -> &'static str {
        match self {
            SchemaField::Schema => "schema",
            SchemaField::SchemaDdl => "schema_ddl",
        }
    }
}

// Snapshot of the session taken when generation starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub language: Language,
    pub database: Dialect,
    pub sql_mode: Option<SqlMode>,
    pub schema: String,
    pub criteria: String,
}

impl GenerationRequest {
    pub fn snapshot(session: &Session) -> Self {
        Self {
            language: session.language,
            database: session.database,
            sql_mode: session.sql_mode,
            schema: session.schema.clone(),
            criteria: session.criteria.clone(),
        }
    }

    /// Wire body. `sqlMode` is only present when the session carries a mode.
    pub fn to_body(&self, schema_field: SchemaField) -> Value {
        let mut body = Map::new();
        body.insert("language".into(), Value::from(self.language.as_str()));
        body.insert("database".into(), Value::from(self.database.as_str()));
        if let Some(mode) = self.sql_mode {
            body.insert("sqlMode".into(), Value::from(mode.as_str()));
        }
        body.insert(schema_field.key().into(), Value::from(self.schema.as_str()));
        body.insert("criteria".into(), Value::from(self.criteria.as_str()));
        Value::Object(body)
    }
}

// Successful response body
#[derive(Debug, Deserialize)]
pub struct SqlResponse {
    #[serde(default)]
    pub sql: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlResult {
    pub sql: String,
}

impl From<SqlResponse> for SqlResult {
    fn from(response: SqlResponse) -> Self {
        Self {
            sql: response.sql.unwrap_or_default(),
        }
    }
}

/// Most specific message in an error body: the JSON `detail` field, else the
/// raw text. `None` when the body carries nothing usable.
pub fn server_message(body: &str) -> Option<String> {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        match map.get("detail") {
            Some(Value::String(detail)) if !detail.trim().is_empty() => {
                return Some(detail.clone());
            }
            Some(Value::String(_)) | Some(Value::Null) | None => {}
            Some(other) => return Some(other.to_string()),
        }
    }

    if body.trim().is_empty() {
        None
    } else {
        Some(body.to_string())
    }
}
