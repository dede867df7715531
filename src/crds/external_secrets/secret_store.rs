//! `SecretStore` and `ClusterSecretStore` (external-secrets.io/v1beta1).
//!
//! Both kinds share one spec; the cluster variant may additionally restrict
//! which namespaces can use it through `conditions`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::common::LabelSelector;
use super::providers::SecretStoreProvider;
use super::GROUP;
use crate::crd::{CrdKind, Scope};
use crate::schema::Diagnostic;

/// Marker for the `SecretStore` kind.
pub struct SecretStore;

impl CrdKind for SecretStore {
    const GROUP: &'static str = GROUP;
    const VERSION: &'static str = "v1beta1";
    const KIND: &'static str = "SecretStore";
    const PLURAL: &'static str = "secretstores";
    const SCOPE: Scope = Scope::Namespaced;
    type Spec = SecretStoreSpec;

    fn description() -> &'static str {
        "SecretStore configures access to an external secret provider within a namespace."
    }

    fn validate_spec(spec: &Self::Spec) -> Vec<Diagnostic> {
        spec.validate()
    }
}

/// Marker for the `ClusterSecretStore` kind.
pub struct ClusterSecretStore;

impl CrdKind for ClusterSecretStore {
    const GROUP: &'static str = GROUP;
    const VERSION: &'static str = "v1beta1";
    const KIND: &'static str = "ClusterSecretStore";
    const PLURAL: &'static str = "clustersecretstores";
    const SCOPE: Scope = Scope::Cluster;
    type Spec = SecretStoreSpec;

    fn description() -> &'static str {
        "ClusterSecretStore configures access to an external secret provider for the whole cluster."
    }

    fn validate_spec(spec: &Self::Spec) -> Vec<Diagnostic> {
        spec.validate()
    }
}

/// Desired state of a SecretStore or ClusterSecretStore.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretStoreSpec {
    /// Only controllers started with this class reconcile the store.
    pub controller: Option<String>,
    /// The backing secret provider. Exactly one must be configured.
    pub provider: SecretStoreProvider,
    /// Retries of provider calls.
    pub retry_settings: Option<SecretStoreRetrySettings>,
    /// Seconds between store validations.
    pub refresh_interval: Option<i64>,
    /// Namespaces allowed to use a ClusterSecretStore.
    pub conditions: Option<Vec<ClusterSecretStoreCondition>>,
}

impl SecretStoreSpec {
    fn validate(&self) -> Vec<Diagnostic> {
        self.provider.validate("spec.provider")
    }
}

/// Retry behaviour of provider calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretStoreRetrySettings {
    /// Retry limit.
    pub max_retries: Option<i64>,
    /// Delay between retries, e.g. `10s`.
    pub retry_interval: Option<String>,
}

/// Namespaces that may reference a ClusterSecretStore.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSecretStoreCondition {
    /// Namespaces matching this selector.
    pub namespace_selector: Option<LabelSelector>,
    /// Namespaces selected by name.
    pub namespaces: Option<Vec<String>>,
    /// Regular expressions matched against namespace names.
    pub namespace_regexes: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{BlockMode, ObjectShape};
    use serde_json::json;

    #[test]
    fn test_kinds_share_spec() {
        assert_eq!(SecretStore::PLURAL, "secretstores");
        assert_eq!(
            ClusterSecretStore::manifest_data_source_name(),
            "k8s_external_secrets_io_cluster_secret_store_v1beta1_manifest"
        );
    }

    #[test]
    fn test_decode_vault_store() {
        let spec: SecretStoreSpec = serde_json::from_value(json!({
            "provider": {
                "vault": {
                    "server": "https://vault.example.com:8200",
                    "path": "secret",
                    "version": "v2",
                    "auth": {
                        "kubernetes": {
                            "mountPath": "kubernetes",
                            "role": "eso",
                            "serviceAccountRef": {"name": "eso"}
                        }
                    }
                }
            }
        }))
        .unwrap();
        assert!(SecretStore::validate_spec(&spec).is_empty());
        let vault = spec.provider.vault.unwrap();
        assert_eq!(vault.auth.kubernetes.unwrap().role, "eso");
    }

    #[test]
    fn test_provider_block_is_required() {
        let block = ObjectShape::of::<SecretStoreSpec>()
            .unwrap()
            .to_block(BlockMode::Manifest);
        assert_eq!(block.blocks["provider"].min_items, 1);
        assert_eq!(block.blocks["conditions"].min_items, 0);
        assert!(block.blocks["provider"].block.blocks.contains_key("azurekv"));
    }

    #[test]
    fn test_empty_provider_is_an_error() {
        let diagnostics = ClusterSecretStore::validate_spec(&SecretStoreSpec::default());
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics[0].is_error());
    }
}
