//! `ExternalSecret` (external-secrets.io/v1beta1).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::common::{FindQuery, KeyRewrite, RemoteRef, SecretStoreRef, SecretTemplate, StoreSourceRef};
use super::GROUP;
use crate::crd::{at_most_one_of, attr_path, CrdKind, Scope};
use crate::schema::Diagnostic;

/// Marker for the `ExternalSecret` kind.
pub struct ExternalSecret;

impl CrdKind for ExternalSecret {
    const GROUP: &'static str = GROUP;
    const VERSION: &'static str = "v1beta1";
    const KIND: &'static str = "ExternalSecret";
    const PLURAL: &'static str = "externalsecrets";
    const SCOPE: Scope = Scope::Namespaced;
    type Spec = ExternalSecretSpec;

    fn description() -> &'static str {
        "ExternalSecret syncs values from a secret store into a Kubernetes Secret."
    }

    fn validate_spec(spec: &Self::Spec) -> Vec<Diagnostic> {
        spec.validate("spec")
    }
}

/// Desired state of an ExternalSecret.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExternalSecretSpec {
    /// Store to fetch values from. Entries with a `sourceRef` may override it.
    pub secret_store_ref: Option<SecretStoreRef>,
    /// Secret to create. Defaults to one named after the ExternalSecret.
    pub target: Option<ExternalSecretTarget>,
    /// How often values are re-fetched, e.g. `1h`. `0` disables refresh.
    pub refresh_interval: Option<String>,
    /// Individual keys to fetch.
    pub data: Option<Vec<ExternalSecretData>>,
    /// Fetch whole secrets or searches and merge their keys.
    pub data_from: Option<Vec<ExternalSecretDataFrom>>,
}

impl ExternalSecretSpec {
    /// One-of checks, with attribute paths rooted at `path`.
    pub fn validate(&self, path: &str) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();

        for (i, entry) in self.data.iter().flatten().enumerate() {
            if let Some(source) = &entry.source_ref {
                let at = format!("{}.{}.source_ref", attr_path(path, "data"), i);
                diagnostics.extend(source.validate(&at));
            }
        }

        for (i, entry) in self.data_from.iter().flatten().enumerate() {
            let at = format!("{}.{}", attr_path(path, "data_from"), i);
            diagnostics.extend(at_most_one_of(
                &at,
                &[
                    ("extract", entry.extract.is_some()),
                    ("find", entry.find.is_some()),
                ],
            ));
            if let Some(source) = &entry.source_ref {
                diagnostics.extend(source.validate(&attr_path(&at, "source_ref")));
            }
        }

        if let Some(template) = self.target.as_ref().and_then(|t| t.template.as_ref()) {
            diagnostics.extend(template.validate(&attr_path(path, "target.template")));
        }

        diagnostics
    }
}

/// The Kubernetes Secret that is created.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExternalSecretTarget {
    /// Secret name. Defaults to the ExternalSecret name.
    pub name: Option<String>,
    /// `Owner`, `Orphan`, `Merge` or `None`.
    pub creation_policy: Option<String>,
    /// `Delete`, `Merge` or `Retain`.
    pub deletion_policy: Option<String>,
    /// Shape of the created Secret.
    pub template: Option<SecretTemplate>,
    /// Create an immutable Secret.
    pub immutable: Option<bool>,
}

/// One key of the target Secret.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExternalSecretData {
    /// Key in the target Secret.
    pub secret_key: String,
    /// Key in the provider.
    pub remote_ref: RemoteRef,
    /// Overrides the store for this entry.
    pub source_ref: Option<StoreSourceRef>,
}

/// A bulk source of keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExternalSecretDataFrom {
    /// Extract every property of one structured secret.
    pub extract: Option<RemoteRef>,
    /// Fetch every secret matching a query.
    pub find: Option<FindQuery>,
    /// Rewrites applied to the fetched keys, in order.
    pub rewrite: Option<Vec<KeyRewrite>>,
    /// Overrides the store for this entry.
    pub source_ref: Option<StoreSourceRef>,
}
