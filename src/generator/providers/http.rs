use crate::access::AccessCredential;
use crate::config::GeneratorConfig;
use crate::generator::models::{GenerationRequest, SchemaField, SqlResponse, SqlResult};
use crate::generator::{GeneratorError, RemoteGenerator};
use async_trait::async_trait;
use reqwest::header::HeaderName;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Talks to the SQL generation service over HTTP.
pub struct HttpGenerator {
    client: reqwest::Client,
    endpoint_url: reqwest::Url,
    credential_header: HeaderName,
    schema_field: SchemaField,
}

impl HttpGenerator {
    pub fn new(config: &GeneratorConfig) -> Result<Self, GeneratorError> {
        let endpoint_url = reqwest::Url::parse(&config.endpoint_url).map_err(|e| {
            GeneratorError::ConfigError(format!("invalid endpoint {}: {}", config.endpoint_url, e))
        })?;

        let credential_header = HeaderName::from_bytes(config.credential_header.as_bytes())
            .map_err(|e| {
                GeneratorError::ConfigError(format!(
                    "invalid credential header {}: {}",
                    config.credential_header, e
                ))
            })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GeneratorError::ConnectionError(e.to_string()))?;

        Ok(Self {
            client,
            endpoint_url,
            credential_header,
            schema_field: config.schema_field,
        })
    }

    async fn send(
        &self,
        request: &GenerationRequest,
        credential: &AccessCredential,
    ) -> Result<SqlResult, GeneratorError> {
        let body = request.to_body(self.schema_field);

        info!(
            "Requesting SQL generation from {} (database: {}, mode: {:?})",
            self.endpoint_url, request.database, request.sql_mode
        );

        let response = self
            .client
            .post(self.endpoint_url.clone())
            .header(self.credential_header.clone(), credential.expose())
            .json(&body)
            .send()
            .await
            .map_err(|e| GeneratorError::ConnectionError(e.to_string()))?;

        let status = response.status();
        let response_text = response
            .text()
            .await
            .map_err(|e| GeneratorError::ConnectionError(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            warn!("SQL service responded with status code: {}", status);
            debug!("Error body: {}", response_text);
            return Err(GeneratorError::Server {
                status: status.as_u16(),
                body: response_text,
            });
        }

        let parsed = serde_json::from_str::<SqlResponse>(&response_text).map_err(|e| {
            GeneratorError::DecodeError(format!("Failed to parse SQL service response: {}", e))
        })?;

        debug!("SQL service returned {} bytes of SQL", parsed.sql.as_deref().map_or(0, str::len));
        Ok(parsed.into())
    }
}

#[async_trait]
impl RemoteGenerator for HttpGenerator {
    async fn submit(
        &self,
        request: &GenerationRequest,
        credential: &AccessCredential,
        cancel: CancellationToken,
    ) -> Result<SqlResult, GeneratorError> {
        // Losing the race drops the in-flight reqwest future, closing the connection.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("SQL generation request cancelled");
                Err(GeneratorError::Cancelled)
            }
            result = self.send(request, credential) => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::test_credential;
    use crate::session::state::{Dialect, Language, SqlMode};
    use axum::{
        Json, Router,
        http::{HeaderMap, StatusCode},
        response::IntoResponse,
        routing::post,
    };
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex, Once};
    use tokio::net::TcpListener;

    #[derive(Default)]
    struct Captured {
        api_key: Option<String>,
        body: Option<Value>,
    }

    static LOCAL_NO_PROXY: Once = Once::new();

    async fn spawn_server(app: Router) -> String {
        LOCAL_NO_PROXY.call_once(|| {
            // SAFETY: test-only, and every writer stores the same value.
            unsafe { std::env::set_var("NO_PROXY", "127.0.0.1,localhost") };
        });
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        format!("http://{addr}/generate-sql")
    }

    fn generator(endpoint_url: String, schema_field: SchemaField) -> HttpGenerator {
        HttpGenerator::new(&GeneratorConfig {
            endpoint_url,
            credential_header: "x-api-key".into(),
            schema_field,
            timeout_secs: 5,
        })
        .expect("generator")
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            language: Language::En,
            database: Dialect::Postgresql,
            sql_mode: Some(SqlMode::Read),
            schema: "CREATE TABLE users (id INT, name TEXT);".into(),
            criteria: "all user names".into(),
        }
    }

    fn responding(status: StatusCode, body: &'static str) -> Router {
        Router::new().route("/generate-sql", post(move || async move { (status, body) }))
    }

    #[tokio::test]
    async fn posts_snapshot_with_credential_header() {
        let captured = Arc::new(Mutex::new(Captured::default()));
        let sink = captured.clone();
        let app = Router::new().route(
            "/generate-sql",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let sink = sink.clone();
                async move {
                    let mut captured = sink.lock().expect("lock");
                    captured.api_key = headers
                        .get("x-api-key")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    captured.body = Some(body);
                    Json(json!({ "sql": "SELECT name FROM users;" }))
                }
            }),
        );
        let url = spawn_server(app).await;

        let result = generator(url, SchemaField::SchemaDdl)
            .submit(&request(), &test_credential("k-123"), CancellationToken::new())
            .await
            .expect("sql");

        assert_eq!(result.sql, "SELECT name FROM users;");
        let captured = captured.lock().expect("lock");
        assert_eq!(captured.api_key.as_deref(), Some("k-123"));
        let body = captured.body.as_ref().expect("body");
        assert_eq!(body["schema_ddl"], "CREATE TABLE users (id INT, name TEXT);");
        assert_eq!(body["sqlMode"], "read");
        assert_eq!(body["database"], "postgresql");
    }

    #[tokio::test]
    async fn non_success_status_carries_raw_body() {
        let url = spawn_server(responding(StatusCode::NOT_FOUND, r#"{"detail":"schema invalid"}"#)).await;

        let err = generator(url, SchemaField::Schema)
            .submit(&request(), &test_credential("k"), CancellationToken::new())
            .await
            .expect_err("server error");

        match err {
            GeneratorError::Server { status, body } => {
                assert_eq!(status, 404);
                assert_eq!(body, r#"{"detail":"schema invalid"}"#);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn success_without_json_is_a_decode_error() {
        let url = spawn_server(responding(StatusCode::OK, "<html>")).await;

        let err = generator(url, SchemaField::Schema)
            .submit(&request(), &test_credential("k"), CancellationToken::new())
            .await
            .expect_err("decode error");
        assert!(matches!(err, GeneratorError::DecodeError(_)));
    }

    #[tokio::test]
    async fn unreachable_service_is_a_connection_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let err = generator(format!("http://{addr}/generate-sql"), SchemaField::Schema)
            .submit(&request(), &test_credential("k"), CancellationToken::new())
            .await
            .expect_err("connection error");
        assert!(matches!(err, GeneratorError::ConnectionError(_)));
    }

    #[tokio::test]
    async fn cancellation_aborts_pending_request() {
        let app = Router::new().route(
            "/generate-sql",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Json(json!({ "sql": "SELECT 1" })).into_response()
            }),
        );
        let url = spawn_server(app).await;
        let generator = generator(url, SchemaField::Schema);
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let err = tokio::time::timeout(
            Duration::from_secs(5),
            generator.submit(&request(), &test_credential("k"), cancel),
        )
        .await
        .expect("cancel should resolve promptly")
        .expect_err("cancelled");
        assert!(matches!(err, GeneratorError::Cancelled));
    }

    #[test]
    fn rejects_invalid_configuration() {
        let mut config = GeneratorConfig::default();
        config.credential_header = "bad header".into();
        assert!(matches!(
            HttpGenerator::new(&config),
            Err(GeneratorError::ConfigError(_))
        ));

        let mut config = GeneratorConfig::default();
        config.endpoint_url = "::not-a-url".into();
        assert!(matches!(
            HttpGenerator::new(&config),
            Err(GeneratorError::ConfigError(_))
        ));
    }
}
