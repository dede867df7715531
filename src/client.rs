//! Cluster access for object data sources.
//!
//! Reads go through the [`ObjectReader`] trait so the provider can be driven
//! by a live cluster ([`KubeObjectReader`]), by nothing at all
//! ([`DisconnectedReader`]) or by an in-memory fake in tests.

use async_trait::async_trait;
use kube::api::{Api, DynamicObject};
use kube::discovery::ApiResource;
use kube::Client;
use serde_json::Value;
use tracing::debug;

use crate::crd::ObjectRef;
use crate::error::ProviderError;

/// Fetches single objects by group/version/resource and name.
#[async_trait]
pub trait ObjectReader: Send + Sync {
    /// GET one object, returning its full JSON (`apiVersion`, `kind`,
    /// `metadata`, `spec`, ...).
    async fn get(&self, target: &ObjectRef) -> Result<Value, ProviderError>;
}

/// Reader backed by the Kubernetes dynamic API.
#[derive(Clone)]
pub struct KubeObjectReader {
    client: Client,
}

impl KubeObjectReader {
    /// Wrap a configured client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    fn api_for(&self, target: &ObjectRef) -> Api<DynamicObject> {
        let ar = ApiResource {
            group: target.group.clone(),
            version: target.version.clone(),
            api_version: target.api_version(),
            kind: target.kind.clone(),
            plural: target.plural.clone(),
        };
        match &target.namespace {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, &ar),
            None => Api::all_with(self.client.clone(), &ar),
        }
    }
}

#[async_trait]
impl ObjectReader for KubeObjectReader {
    async fn get(&self, target: &ObjectRef) -> Result<Value, ProviderError> {
        debug!(object = %target, "GET");
        let object = self
            .api_for(target)
            .get(&target.name)
            .await
            .map_err(|e| ProviderError::from_kube(e, &target.to_string()))?;
        Ok(serde_json::to_value(&object)?)
    }
}

/// Reader used before `Configure` succeeds or when the provider runs offline.
#[derive(Debug, Clone)]
pub struct DisconnectedReader {
    reason: String,
}

impl DisconnectedReader {
    /// A reader that fails every read with the given reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    /// The provider has not been configured yet.
    pub fn unconfigured() -> Self {
        Self::new("provider has not been configured")
    }

    /// The provider was configured with `offline = true`.
    pub fn offline() -> Self {
        Self::new("provider is configured offline; only manifest data sources are available")
    }
}

#[async_trait]
impl ObjectReader for DisconnectedReader {
    async fn get(&self, target: &ObjectRef) -> Result<Value, ProviderError> {
        Err(ProviderError::Configuration(format!(
            "cannot read {}: {}",
            target, self.reason
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target() -> ObjectRef {
        ObjectRef {
            group: "external-secrets.io".to_string(),
            version: "v1beta1".to_string(),
            kind: "SecretStore".to_string(),
            plural: "secretstores".to_string(),
            namespace: Some("default".to_string()),
            name: "vault".to_string(),
        }
    }

    #[tokio::test]
    async fn test_disconnected_reader_fails_with_configuration_error() {
        let err = DisconnectedReader::offline().get(&target()).await.unwrap_err();
        assert!(matches!(err, ProviderError::Configuration(_)));
        assert!(err.to_string().contains("secretstores.external-secrets.io/v1beta1 default/vault"));
        assert!(err.to_string().contains("offline"));
    }

    #[tokio::test]
    async fn test_unconfigured_reader() {
        let err = DisconnectedReader::unconfigured()
            .get(&target())
            .await
            .unwrap_err();
        assert_eq!(err.summary(), "Provider configuration error");
    }
}
