use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Display language. Only selects the string table; it is echoed into the
/// request body unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ja,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Mysql,
    Postgresql,
    Sqlserver,
    Sqlite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlMode {
    #[default]
    Read,
    Write,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {}", self.kind, self.value)
    }
}

impl std::error::Error for ParseEnumError {}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ja => "ja",
        }
    }
}

impl Dialect {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Mysql => "mysql",
            Dialect::Postgresql => "postgresql",
            Dialect::Sqlserver => "sqlserver",
            Dialect::Sqlite => "sqlite",
        }
    }
}

impl SqlMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SqlMode::Read => "read",
            SqlMode::Write => "write",
        }
    }
}

impl FromStr for Language {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "ja" => Ok(Language::Ja),
            other => Err(ParseEnumError {
                kind: "language",
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for Dialect {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" => Ok(Dialect::Mysql),
            "postgresql" => Ok(Dialect::Postgresql),
            "sqlserver" => Ok(Dialect::Sqlserver),
            "sqlite" => Ok(Dialect::Sqlite),
            other => Err(ParseEnumError {
                kind: "database",
                value: other.to_string(),
            }),
        }
    }
}

impl FromStr for SqlMode {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "read" => Ok(SqlMode::Read),
            "write" => Ok(SqlMode::Write),
            other => Err(ParseEnumError {
                kind: "sql mode",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for SqlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the session is in the request lifecycle.
///
/// `Loading` is the only in-flight state. Every other state accepts a new
/// generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Success,
    ServerError,
    NetworkError,
    Aborted,
}

impl Status {
    pub fn is_loading(&self) -> bool {
        matches!(self, Status::Loading)
    }
}

/// A single user edit to one session field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldEdit {
    Language(Language),
    Database(Dialect),
    SqlMode(SqlMode),
    Schema(String),
    Criteria(String),
}

/// All mutable state for one generation session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub language: Language,
    pub database: Dialect,
    /// `None` in configurations that do not distinguish read and write.
    pub sql_mode: Option<SqlMode>,
    pub schema: String,
    pub criteria: String,
    pub output: String,
    pub status: Status,
}

impl Session {
    pub fn new(language: Language, database: Dialect, sql_mode: Option<SqlMode>) -> Self {
        Self {
            language,
            database,
            sql_mode,
            schema: String::new(),
            criteria: String::new(),
            output: String::new(),
            status: Status::Idle,
        }
    }

    pub fn has_clearable_content(&self) -> bool {
        !(self.schema.is_empty() && self.criteria.is_empty() && self.output.is_empty())
    }

    pub fn has_required_fields(&self) -> bool {
        !self.schema.trim().is_empty() && !self.criteria.trim().is_empty()
    }

    pub fn requires_confirmation(&self) -> bool {
        self.sql_mode == Some(SqlMode::Write)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new(Language::default(), Dialect::default(), Some(SqlMode::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_enumerations_case_insensitively() {
        assert_eq!("JA".parse::<Language>(), Ok(Language::Ja));
        assert_eq!(" postgresql ".parse::<Dialect>(), Ok(Dialect::Postgresql));
        assert_eq!("Write".parse::<SqlMode>(), Ok(SqlMode::Write));
        assert!("oracle".parse::<Dialect>().is_err());
    }

    #[test]
    fn required_fields_ignore_whitespace() {
        let mut session = Session::default();
        session.schema = "  \n\t".into();
        session.criteria = "list users".into();
        assert!(!session.has_required_fields());

        session.schema = "CREATE TABLE users (id INT);".into();
        assert!(session.has_required_fields());
    }

    #[test]
    fn only_write_mode_requires_confirmation() {
        let mut session = Session::default();
        assert!(!session.requires_confirmation());
        session.sql_mode = Some(SqlMode::Write);
        assert!(session.requires_confirmation());
        session.sql_mode = None;
        assert!(!session.requires_confirmation());
    }
}
