//! `PushSecret` (external-secrets.io/v1alpha1).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::common::{GeneratorRef, LabelSelector, SecretTemplate};
use super::GROUP;
use crate::crd::{at_most_one_of, exactly_one_of, CrdKind, Scope};
use crate::schema::Diagnostic;

/// Marker for the `PushSecret` kind.
pub struct PushSecret;

impl CrdKind for PushSecret {
    const GROUP: &'static str = GROUP;
    const VERSION: &'static str = "v1alpha1";
    const KIND: &'static str = "PushSecret";
    const PLURAL: &'static str = "pushsecrets";
    const SCOPE: Scope = Scope::Namespaced;
    type Spec = PushSecretSpec;

    fn description() -> &'static str {
        "PushSecret writes a Kubernetes Secret to one or more secret stores."
    }

    fn validate_spec(spec: &Self::Spec) -> Vec<Diagnostic> {
        let mut diagnostics: Vec<Diagnostic> = exactly_one_of(
            "spec.selector",
            &[
                ("secret", spec.selector.secret.is_some()),
                ("generator_ref", spec.selector.generator_ref.is_some()),
            ],
        )
        .into_iter()
        .collect();

        for (i, store) in spec.secret_store_refs.iter().enumerate() {
            diagnostics.extend(at_most_one_of(
                &format!("spec.secret_store_refs.{}", i),
                &[
                    ("name", store.name.is_some()),
                    ("label_selector", store.label_selector.is_some()),
                ],
            ));
        }

        if let Some(template) = &spec.template {
            diagnostics.extend(template.validate("spec.template"));
        }
        diagnostics
    }
}

/// Desired state of a PushSecret.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PushSecretSpec {
    /// How often the secret is pushed again.
    pub refresh_interval: Option<String>,
    /// Stores to push to.
    pub secret_store_refs: Vec<PushSecretStoreRef>,
    /// `Replace` or `IfNotExists`.
    pub update_policy: Option<String>,
    /// `Delete` or `None`.
    pub deletion_policy: Option<String>,
    /// The source of the pushed values.
    pub selector: PushSecretSelector,
    /// Which keys to push, and where.
    pub data: Option<Vec<PushSecretData>>,
    /// Template applied before pushing.
    pub template: Option<SecretTemplate>,
}

/// A store to push to, by name or by label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PushSecretStoreRef {
    /// Store name.
    pub name: Option<String>,
    /// Select stores by label instead of name.
    pub label_selector: Option<LabelSelector>,
    /// `SecretStore` (default) or `ClusterSecretStore`.
    pub kind: Option<String>,
}

/// Source of the pushed values. Exactly one of `secret` and `generatorRef`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PushSecretSelector {
    /// Secret to push.
    pub secret: Option<PushSecretSecret>,
    /// Push generated values instead.
    pub generator_ref: Option<GeneratorRef>,
}

/// Secret whose keys are pushed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PushSecretSecret {
    /// Name of the Secret in the PushSecret's namespace.
    pub name: String,
}

/// One push rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PushSecretData {
    /// Which key to push, and where to.
    #[serde(rename = "match")]
    pub matcher: PushSecretMatch,
    /// Provider-specific metadata, passed through as-is.
    pub metadata: Option<Value>,
    /// `None` or `ReverseUnicode`.
    pub conversion_strategy: Option<String>,
}

/// Source key and its destination.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PushSecretMatch {
    /// Key of the source Secret. The whole Secret is pushed when unset.
    pub secret_key: Option<String>,
    /// Where the value is written.
    pub remote_ref: PushSecretRemoteRef,
}

/// Destination in the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PushSecretRemoteRef {
    /// Key in the provider.
    pub remote_key: String,
    /// Property within the remote value.
    pub property: Option<String>,
}
