//! Provider configuration.
//!
//! ```hcl
//! provider "k8s" {
//!   kubeconfig              = "~/.kube/config"
//!   context                 = "staging"
//!   request_timeout_seconds = 30
//! }
//! ```
//!
//! Without `kubeconfig` the client configuration is inferred the usual way:
//! `KUBECONFIG`, then `~/.kube/config`, then the in-cluster service account.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::client::{DisconnectedReader, KubeObjectReader, ObjectReader};
use crate::error::ProviderError;
use crate::schema::{Attribute, Diagnostic, Schema};

/// Settings from the provider configuration block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderConfig {
    /// Path to a kubeconfig file.
    pub kubeconfig: Option<String>,
    /// Kubeconfig context to use instead of the current one.
    pub context: Option<String>,
    /// HTTP read timeout for API requests.
    pub request_timeout_seconds: Option<i64>,
    /// Skip building a client; only manifest data sources work.
    pub offline: Option<bool>,
}

impl ProviderConfig {
    /// Schema of the provider configuration block.
    pub fn schema() -> Schema {
        Schema::v0()
            .with_description("Access to the Kubernetes cluster holding the custom resources.")
            .with_attribute(
                "kubeconfig",
                Attribute::optional_string()
                    .with_description("Path to the kubeconfig file. Inferred when unset."),
            )
            .with_attribute(
                "context",
                Attribute::optional_string()
                    .with_description("Kubeconfig context to use instead of the current context."),
            )
            .with_attribute(
                "request_timeout_seconds",
                Attribute::optional_int64()
                    .with_description("Timeout for a single API request, in seconds."),
            )
            .with_attribute(
                "offline",
                Attribute::optional_bool().with_description(
                    "Do not connect to a cluster. Only manifest data sources can be read.",
                ),
            )
    }

    /// Parse the configuration JSON. `null` yields the defaults.
    pub fn from_value(value: Value) -> Result<Self, ProviderError> {
        if value.is_null() {
            return Ok(Self::default());
        }
        serde_json::from_value(value)
            .map_err(|e| ProviderError::Configuration(format!("invalid provider configuration: {}", e)))
    }

    /// Semantic checks beyond the schema.
    pub fn validate(&self) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        if let Some(secs) = self.request_timeout_seconds {
            if secs <= 0 {
                diagnostics.push(
                    Diagnostic::error("Invalid request timeout")
                        .with_detail(format!("request_timeout_seconds must be positive, got {}", secs))
                        .with_attribute("request_timeout_seconds"),
                );
            }
        }

        if self.is_offline() && (self.kubeconfig.is_some() || self.context.is_some()) {
            diagnostics.push(
                Diagnostic::warning("Cluster settings ignored")
                    .with_detail("kubeconfig and context have no effect when offline = true")
                    .with_attribute("offline"),
            );
        }

        diagnostics
    }

    /// Whether the provider should run without a cluster.
    pub fn is_offline(&self) -> bool {
        self.offline.unwrap_or(false)
    }

    /// Request timeout, when configured.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_seconds
            .filter(|secs| *secs > 0)
            .map(|secs| Duration::from_secs(secs as u64))
    }

    /// Build a Kubernetes client from these settings.
    pub async fn connect(&self) -> Result<Client, ProviderError> {
        let options = KubeConfigOptions {
            context: self.context.clone(),
            ..Default::default()
        };

        let mut config = match &self.kubeconfig {
            Some(path) => {
                let path = expand_home(path);
                debug!(path = %path.display(), "Loading kubeconfig");
                let kubeconfig = Kubeconfig::read_from(&path).map_err(|e| {
                    ProviderError::Configuration(format!(
                        "failed to read kubeconfig {}: {}",
                        path.display(),
                        e
                    ))
                })?;
                Config::from_custom_kubeconfig(kubeconfig, &options)
                    .await
                    .map_err(|e| {
                        ProviderError::Configuration(format!("failed to load kubeconfig: {}", e))
                    })?
            },
            None if self.context.is_some() => Config::from_kubeconfig(&options)
                .await
                .map_err(|e| {
                    ProviderError::Configuration(format!("failed to load kubeconfig: {}", e))
                })?,
            None => Config::infer().await.map_err(|e| {
                ProviderError::Configuration(format!("failed to infer cluster config: {}", e))
            })?,
        };

        if let Some(timeout) = self.request_timeout() {
            config.read_timeout = Some(timeout);
        }

        info!(cluster_url = %config.cluster_url, "Connecting to cluster");
        Client::try_from(config)
            .map_err(|e| ProviderError::Configuration(format!("failed to create client: {}", e)))
    }

    /// The reader object data sources should use.
    pub async fn reader(&self) -> Result<Arc<dyn ObjectReader>, ProviderError> {
        if self.is_offline() {
            info!("Provider configured offline");
            return Ok(Arc::new(DisconnectedReader::offline()));
        }
        let client = self.connect().await?;
        Ok(Arc::new(KubeObjectReader::new(client)))
    }
}

fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(rest),
            None => PathBuf::from(path),
        },
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crd::ObjectRef;
    use serde_json::json;

    #[test]
    fn test_schema_attributes() {
        let schema = ProviderConfig::schema();
        for name in ["kubeconfig", "context", "request_timeout_seconds", "offline"] {
            assert!(schema.block.attributes[name].flags.optional, "{name}");
        }
    }

    #[test]
    fn test_from_value() {
        assert_eq!(
            ProviderConfig::from_value(Value::Null).unwrap(),
            ProviderConfig::default()
        );

        let config = ProviderConfig::from_value(json!({
            "kubeconfig": "/tmp/kc",
            "request_timeout_seconds": 10,
            "offline": null
        }))
        .unwrap();
        assert_eq!(config.kubeconfig.as_deref(), Some("/tmp/kc"));
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(10)));
        assert!(!config.is_offline());

        let err = ProviderConfig::from_value(json!({"kube_config": "x"})).unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
    }

    #[test]
    fn test_validate_timeout() {
        let config = ProviderConfig {
            request_timeout_seconds: Some(0),
            ..Default::default()
        };
        let diagnostics = config.validate();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].attribute.as_deref(),
            Some("request_timeout_seconds")
        );
        assert_eq!(config.request_timeout(), None);
    }

    #[test]
    fn test_validate_offline_warning() {
        let config = ProviderConfig {
            offline: Some(true),
            context: Some("prod".to_string()),
            ..Default::default()
        };
        let diagnostics = config.validate();
        assert_eq!(diagnostics.len(), 1);
        assert!(!diagnostics[0].is_error());
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/etc/kc"), PathBuf::from("/etc/kc"));
        if let Some(home) = std::env::var_os("HOME") {
            assert_eq!(expand_home("~/.kube/config"), PathBuf::from(home).join(".kube/config"));
        }
    }

    #[tokio::test]
    async fn test_offline_reader() {
        let config = ProviderConfig {
            offline: Some(true),
            ..Default::default()
        };
        let reader = config.reader().await.unwrap();
        let target = ObjectRef {
            group: "external-secrets.io".to_string(),
            version: "v1beta1".to_string(),
            kind: "ExternalSecret".to_string(),
            plural: "externalsecrets".to_string(),
            namespace: Some("default".to_string()),
            name: "db".to_string(),
        };
        let err = reader.get(&target).await.unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_missing_kubeconfig_file() {
        let config = ProviderConfig {
            kubeconfig: Some("/nonexistent/k8s-crd-provider/kubeconfig".to_string()),
            ..Default::default()
        };
        let err = match config.connect().await {
            Ok(_) => panic!("connect should fail without a kubeconfig"),
            Err(err) => err,
        };
        assert!(matches!(err, ProviderError::Configuration(_)));
        assert!(err.to_string().contains("failed to read kubeconfig"));
    }
}
