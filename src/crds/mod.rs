//! The custom resource catalogue.

pub mod external_secrets;
pub mod generators;

use crate::datasource::DataSourceRegistry;
use crate::error::ProviderError;

/// Register the object and manifest data sources of every supported kind.
pub fn register_all(registry: &mut DataSourceRegistry) -> Result<(), ProviderError> {
    use external_secrets::{
        ClusterExternalSecret, ClusterSecretStore, ExternalSecret, PushSecret, SecretStore,
    };
    use generators::{EcrAuthorizationToken, Fake, GcrAccessToken, Password};

    registry
        .register::<ExternalSecret>()?
        .register::<ClusterExternalSecret>()?
        .register::<SecretStore>()?
        .register::<ClusterSecretStore>()?
        .register::<PushSecret>()?
        .register::<Password>()?
        .register::<Fake>()?
        .register::<EcrAuthorizationToken>()?
        .register::<GcrAccessToken>()?;
    Ok(())
}

/// A registry holding the whole catalogue.
pub fn registry() -> Result<DataSourceRegistry, ProviderError> {
    let mut registry = DataSourceRegistry::new();
    register_all(&mut registry)?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_compiles() {
        let registry = registry().unwrap();
        assert_eq!(registry.len(), 18);
        assert!(registry
            .get("k8s_external_secrets_io_push_secret_v1alpha1_manifest")
            .is_ok());
        assert!(registry
            .get("k8s_generators_external_secrets_io_gcr_access_token_v1alpha1")
            .is_ok());
    }

    #[test]
    fn test_cluster_kinds_have_no_namespace() {
        let registry = registry().unwrap();
        let source = registry
            .get("k8s_external_secrets_io_cluster_secret_store_v1beta1")
            .unwrap();
        let metadata = &source.schema().block.blocks["metadata"].block;
        assert!(!metadata.attributes.contains_key("namespace"));
    }
}
