//! The provider: configuration, cluster access and data source dispatch.

use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::client::{DisconnectedReader, ObjectReader};
use crate::config::ProviderConfig;
use crate::crds;
use crate::datasource::DataSourceRegistry;
use crate::error::ProviderError;
use crate::schema::{Diagnostic, ProviderSchema};
use crate::server::ProviderService;
use crate::validation;

/// Serves the External Secrets catalogue.
pub struct CrdProvider {
    registry: DataSourceRegistry,
    schema: ProviderSchema,
    reader: RwLock<Arc<dyn ObjectReader>>,
}

impl CrdProvider {
    /// A provider that must be configured before object reads succeed.
    pub fn new() -> Result<Self, ProviderError> {
        Self::with_reader(Arc::new(DisconnectedReader::unconfigured()))
    }

    /// A provider reading objects through `reader` until `Configure` replaces it.
    pub fn with_reader(reader: Arc<dyn ObjectReader>) -> Result<Self, ProviderError> {
        Ok(Self::from_registry(crds::registry()?, reader))
    }

    /// A provider serving an arbitrary set of data sources.
    pub fn from_registry(registry: DataSourceRegistry, reader: Arc<dyn ObjectReader>) -> Self {
        let schema = registry.schemas().into_iter().fold(
            ProviderSchema::new().with_provider_config(ProviderConfig::schema()),
            |schema, (name, source)| schema.with_data_source(name, source),
        );
        Self {
            registry,
            schema,
            reader: RwLock::new(reader),
        }
    }

    /// The registered data sources.
    pub fn registry(&self) -> &DataSourceRegistry {
        &self.registry
    }
}

#[async_trait::async_trait]
impl ProviderService for CrdProvider {
    fn schema(&self) -> ProviderSchema {
        self.schema.clone()
    }

    async fn validate_provider_config(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let mut diagnostics = validation::validate(&self.schema.provider, &config);
        if diagnostics.iter().any(Diagnostic::is_error) {
            return Ok(diagnostics);
        }
        diagnostics.extend(ProviderConfig::from_value(config)?.validate());
        Ok(diagnostics)
    }

    async fn configure(&self, config: Value) -> Result<Vec<Diagnostic>, ProviderError> {
        let diagnostics = self.validate_provider_config(config.clone()).await?;
        if diagnostics.iter().any(Diagnostic::is_error) {
            return Ok(diagnostics);
        }

        let config = ProviderConfig::from_value(config)?;
        let reader = config.reader().await?;
        *self.reader.write().await = reader;

        info!(offline = config.is_offline(), "Provider configured");
        Ok(diagnostics)
    }

    async fn stop(&self) -> Result<(), ProviderError> {
        debug!("Provider stopping");
        *self.reader.write().await = Arc::new(DisconnectedReader::new("provider stopped"));
        Ok(())
    }

    async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        Ok(self.registry.get(data_source_type)?.validate(&config))
    }

    async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        let source = self.registry.get(data_source_type)?;
        let reader = self.reader.read().await.clone();
        source.read(reader.as_ref(), config).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeCluster;
    use serde_json::json;

    #[test]
    fn test_schema_covers_catalogue() {
        let provider = CrdProvider::new().unwrap();
        let schema = provider.schema();
        assert_eq!(schema.data_sources.len(), provider.registry().len());
        assert!(schema.provider.block.attributes.contains_key("kubeconfig"));
    }

    #[tokio::test]
    async fn test_validate_provider_config() {
        let provider = CrdProvider::new().unwrap();

        let ok = provider
            .validate_provider_config(json!({"context": "dev"}))
            .await
            .unwrap();
        assert!(ok.is_empty());

        let bad = provider
            .validate_provider_config(json!({"request_timeout_seconds": -5}))
            .await
            .unwrap();
        assert_eq!(bad.len(), 1);
        assert!(bad[0].is_error());

        let unknown = provider
            .validate_provider_config(json!({"cluster": "x"}))
            .await
            .unwrap();
        assert!(unknown[0].summary.starts_with("Unsupported attribute"));
    }

    #[tokio::test]
    async fn test_unconfigured_object_read_fails() {
        let provider = CrdProvider::new().unwrap();
        let err = provider
            .read_data_source(
                "k8s_external_secrets_io_secret_store_v1beta1",
                json!({"metadata": {"name": "vault", "namespace": "apps"}}),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_configure_offline_replaces_reader() {
        let cluster = FakeCluster::new().with_object(json!({
            "apiVersion": "generators.external-secrets.io/v1alpha1",
            "kind": "Fake",
            "metadata": {"name": "static", "namespace": "apps"},
            "spec": {"data": {"k": "v"}}
        }));
        let provider = CrdProvider::with_reader(cluster.into_reader()).unwrap();
        let config = json!({"metadata": {"name": "static", "namespace": "apps"}});
        let name = "k8s_generators_external_secrets_io_fake_v1alpha1";

        let state = provider.read_data_source(name, config.clone()).await.unwrap();
        assert_eq!(state["spec"]["data"]["k"], "v");

        let diagnostics = provider.configure(json!({"offline": true})).await.unwrap();
        assert!(diagnostics.is_empty());
        assert!(provider.read_data_source(name, config).await.is_err());
    }

    #[tokio::test]
    async fn test_unknown_data_source() {
        let provider = CrdProvider::new().unwrap();
        let err = provider
            .validate_data_source_config("k8s_nope_v1", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnknownDataSource(_)));
    }
}
