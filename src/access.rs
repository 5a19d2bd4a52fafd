//! Launch-time access gate.
//!
//! The credential is read once from the launch context. Nothing outside this
//! module can create an [`AccessCredential`], so the generation controller is
//! unreachable when the gate resolves to nothing.

use std::fmt;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::AccessConfig;

/// Opaque credential forwarded to the generation service on every request.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessCredential(String);

impl AccessCredential {
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessCredential(***)")
    }
}

/// Everything the hosting environment hands us at launch.
#[derive(Debug, Clone, Default)]
pub struct LaunchContext {
    pub launch_url: Option<Url>,
    pub query_param: String,
    pub explicit_key: Option<String>,
    pub env_value: Option<String>,
}

impl LaunchContext {
    pub fn capture(
        launch_url: Option<&str>,
        explicit_key: Option<String>,
        access: &AccessConfig,
    ) -> Result<Self, url::ParseError> {
        let launch_url = launch_url.map(Url::parse).transpose()?;
        let env_value = std::env::var(&access.env_var).ok();

        Ok(Self {
            launch_url,
            query_param: access.query_param.clone(),
            explicit_key,
            env_value,
        })
    }

    fn query_value(&self) -> Option<String> {
        let url = self.launch_url.as_ref()?;
        url.query_pairs()
            .find(|(name, _)| name == self.query_param.as_str())
            .map(|(_, value)| value.into_owned())
    }
}

pub struct AccessGate;

impl AccessGate {
    /// Resolves the credential. Launch URL query parameter wins over an
    /// explicit key, which wins over the environment. Blank values are absent.
    pub fn resolve(context: &LaunchContext) -> Option<AccessCredential> {
        let candidates = [
            ("launch url", context.query_value()),
            ("argument", context.explicit_key.clone()),
            ("environment", context.env_value.clone()),
        ];

        for (source, value) in candidates {
            match value {
                Some(token) if !token.trim().is_empty() => {
                    info!("Access credential resolved from {}", source);
                    return Some(AccessCredential(token.trim().to_string()));
                }
                Some(_) => debug!("Ignoring blank credential from {}", source),
                None => {}
            }
        }

        warn!("No access credential found in launch context");
        None
    }
}

#[cfg(test)]
pub(crate) fn test_credential(token: &str) -> AccessCredential {
    AccessCredential(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(url: Option<&str>, key: Option<&str>, env: Option<&str>) -> LaunchContext {
        LaunchContext {
            launch_url: url.map(|u| Url::parse(u).expect("url")),
            query_param: "key".to_string(),
            explicit_key: key.map(str::to_string),
            env_value: env.map(str::to_string),
        }
    }

    #[test]
    fn absent_everywhere_resolves_to_none() {
        assert!(AccessGate::resolve(&context(None, None, None)).is_none());
        assert!(
            AccessGate::resolve(&context(Some("https://app.local/?lang=en"), None, None)).is_none()
        );
    }

    #[test]
    fn query_parameter_takes_precedence() {
        let credential = AccessGate::resolve(&context(
            Some("https://app.local/?lang=ja&key=from-url"),
            Some("from-arg"),
            Some("from-env"),
        ))
        .expect("credential");
        assert_eq!(credential.expose(), "from-url");
    }

    #[test]
    fn falls_back_to_argument_then_environment() {
        let credential =
            AccessGate::resolve(&context(None, Some("from-arg"), Some("from-env"))).expect("arg");
        assert_eq!(credential.expose(), "from-arg");

        let credential = AccessGate::resolve(&context(None, Some("   "), Some("from-env")))
            .expect("env");
        assert_eq!(credential.expose(), "from-env");
    }

    #[test]
    fn debug_output_is_redacted() {
        let credential = test_credential("super-secret");
        assert!(!format!("{:?}", credential).contains("super-secret"));
    }

    #[test]
    fn capture_rejects_malformed_launch_url() {
        let access = AccessConfig::default();
        assert!(LaunchContext::capture(Some("not a url"), None, &access).is_err());
    }
}
