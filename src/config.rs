use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::generator::models::SchemaField;
use crate::session::state::{Dialect, Language, SqlMode};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GeneratorConfig {
    pub endpoint_url: String,
    pub credential_header: String,
    pub schema_field: SchemaField,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SessionConfig {
    pub language: Language,
    pub database: Dialect,
    /// When false the session carries no read/write mode and never asks for
    /// confirmation.
    pub sql_modes: bool,
    pub default_sql_mode: SqlMode,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AccessConfig {
    pub query_param: String,
    pub env_var: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    pub format: LogFormat,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    pub generator: GeneratorConfig,
    pub session: SessionConfig,
    pub access: AccessConfig,
    pub logging: LoggingConfig,
}

#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Launch URL; its query string carries the access key
    #[arg(long, value_name = "URL")]
    pub launch_url: Option<String>,

    /// Access key, used when the launch URL does not carry one
    #[arg(short, long)]
    pub key: Option<String>,

    /// SQL generation endpoint
    #[arg(short, long)]
    pub endpoint: Option<String>,

    /// Initial display language (en, ja)
    #[arg(short, long)]
    pub language: Option<Language>,

    /// Initial database dialect (mysql, postgresql, sqlserver, sqlite)
    #[arg(short, long)]
    pub database: Option<Dialect>,
}

impl AppConfig {
    pub fn new(args: &CliArgs) -> Result<Self, ConfigError> {
        // Start with default configuration
        let mut config_builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);

        // Add configuration from file if specified
        if let Some(config_path) = &args.config {
            config_builder = config_builder.add_source(File::from(config_path.as_path()));
        } else {
            // Check for config in default locations
            let default_locations = vec![
                "config.toml",
                "config/config.toml",
                "/etc/ai-sql-generator/config.toml",
            ];

            for location in default_locations {
                if Path::new(location).exists() {
                    config_builder =
                        config_builder.add_source(File::new(location, config::FileFormat::Toml));
                    break;
                }
            }
        }

        config_builder = config_builder.add_source(Environment::with_prefix("SQLGEN").separator("__"));

        // Build the config
        let mut config: AppConfig = config_builder.build()?.try_deserialize()?;

        // Override with command line args if provided
        if let Some(endpoint) = &args.endpoint {
            config.generator.endpoint_url = endpoint.clone();
        }
        if let Some(language) = args.language {
            config.session.language = language;
        }
        if let Some(database) = args.database {
            config.session.database = database;
        }

        Ok(config)
    }

    pub fn initial_sql_mode(&self) -> Option<SqlMode> {
        self.session
            .sql_modes
            .then_some(self.session.default_sql_mode)
    }
}

// Default implementation
impl Default for AppConfig {
    fn default() -> Self {
        Self {
            generator: GeneratorConfig::default(),
            session: SessionConfig {
                language: Language::En,
                database: Dialect::Mysql,
                sql_modes: true,
                default_sql_mode: SqlMode::Read,
            },
            access: AccessConfig::default(),
            logging: LoggingConfig {
                format: LogFormat::Text,
            },
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint_url: "http://127.0.0.1:8000/generate-sql".to_string(),
            credential_header: "x-api-key".to_string(),
            schema_field: SchemaField::Schema,
            timeout_secs: 60,
        }
    }
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            query_param: "key".to_string(),
            env_var: "SQLGEN_ACCESS_KEY".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn write_temp_config(contents: &str) -> PathBuf {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = std::env::temp_dir().join(format!("sqlgen_config_test_{suffix}.toml"));
        std::fs::write(&path, contents).expect("write config");
        path
    }

    #[test]
    fn file_values_override_defaults() {
        let path = write_temp_config(
            r#"
[generator]
endpoint_url = "https://sql.example.test/generate-sql"
schema_field = "schema_ddl"

[session]
language = "ja"
sql_modes = false
"#,
        );
        let args = CliArgs {
            config: Some(path.clone()),
            ..CliArgs::default()
        };

        let config = AppConfig::new(&args).expect("config");
        assert_eq!(config.generator.endpoint_url, "https://sql.example.test/generate-sql");
        assert_eq!(config.generator.schema_field, SchemaField::SchemaDdl);
        assert_eq!(config.generator.credential_header, "x-api-key");
        assert_eq!(config.session.language, Language::Ja);
        assert_eq!(config.initial_sql_mode(), None);

        std::fs::remove_file(path).expect("cleanup");
    }

    #[test]
    fn command_line_overrides_file() {
        let path = write_temp_config(
            r#"
[session]
database = "sqlite"
"#,
        );
        let args = CliArgs {
            config: Some(path.clone()),
            endpoint: Some("http://localhost:9000/generate-sql".into()),
            database: Some(Dialect::Postgresql),
            ..CliArgs::default()
        };

        let config = AppConfig::new(&args).expect("config");
        assert_eq!(config.generator.endpoint_url, "http://localhost:9000/generate-sql");
        assert_eq!(config.session.database, Dialect::Postgresql);
        assert_eq!(config.initial_sql_mode(), Some(SqlMode::Read));

        std::fs::remove_file(path).expect("cleanup");
    }
}
