//! Types shared by several `external-secrets.io` kinds.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::crd::{at_most_one_of, attr_path};
use crate::schema::Diagnostic;

/// Reference to a key of a Kubernetes Secret.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretKeySelector {
    /// Name of the Secret.
    pub name: Option<String>,
    /// Namespace of the Secret. Ignored for namespaced stores.
    pub namespace: Option<String>,
    /// Key within the Secret's data.
    pub key: Option<String>,
}

/// Reference to a ServiceAccount.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccountSelector {
    /// Name of the ServiceAccount.
    pub name: String,
    /// Namespace of the ServiceAccount. Ignored for namespaced stores.
    pub namespace: Option<String>,
    /// Audiences requested for the projected token.
    pub audiences: Option<Vec<String>>,
}

/// Label selector over Kubernetes objects.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    /// Labels that must all match.
    pub match_labels: Option<BTreeMap<String, String>>,
    /// Set-based requirements that must all match.
    pub match_expressions: Option<Vec<LabelSelectorRequirement>>,
}

/// One `matchExpressions` entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelectorRequirement {
    /// Label key.
    pub key: String,
    /// `In`, `NotIn`, `Exists` or `DoesNotExist`.
    pub operator: String,
    /// Values for `In` and `NotIn`.
    pub values: Option<Vec<String>>,
}

/// Reference to a SecretStore or ClusterSecretStore.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretStoreRef {
    /// Name of the store.
    pub name: String,
    /// `SecretStore` (default) or `ClusterSecretStore`.
    pub kind: Option<String>,
}

/// Reference to a generator resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GeneratorRef {
    /// Defaults to `generators.external-secrets.io/v1alpha1`.
    pub api_version: Option<String>,
    /// Generator kind, e.g. `Password`.
    pub kind: String,
    /// Name of the generator object.
    pub name: String,
}

/// Where a single data entry is fetched from, overriding the secret store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoreSourceRef {
    /// Fetch from this store instead.
    pub store_ref: Option<SecretStoreRef>,
    /// Generate the value instead of fetching it.
    pub generator_ref: Option<GeneratorRef>,
}

impl StoreSourceRef {
    /// `storeRef` and `generatorRef` are mutually exclusive.
    pub fn validate(&self, path: &str) -> Option<Diagnostic> {
        at_most_one_of(
            path,
            &[
                ("store_ref", self.store_ref.is_some()),
                ("generator_ref", self.generator_ref.is_some()),
            ],
        )
    }
}

/// A key in the provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemoteRef {
    /// Key to read from the provider.
    pub key: String,
    /// `None` or `Fetch`.
    pub metadata_policy: Option<String>,
    /// Property within the value, for structured secrets.
    pub property: Option<String>,
    /// Provider-specific version of the value.
    pub version: Option<String>,
    /// `Default` or `Unicode`.
    pub conversion_strategy: Option<String>,
    /// `Auto`, `Base64`, `Base64URL` or `None`.
    pub decoding_strategy: Option<String>,
}

/// Search for provider keys by name or tags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FindQuery {
    /// Key path prefix.
    pub path: Option<String>,
    /// Match key names.
    pub name: Option<FindName>,
    /// Match provider tags.
    pub tags: Option<BTreeMap<String, String>>,
    /// `Default` or `Unicode`.
    pub conversion_strategy: Option<String>,
    /// `Auto`, `Base64`, `Base64URL` or `None`.
    pub decoding_strategy: Option<String>,
}

/// Key name matcher.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FindName {
    /// Regular expression over key names.
    pub regexp: Option<String>,
}

/// Rewrite applied to the keys of a `dataFrom` entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KeyRewrite {
    /// Regular expression rewrite.
    pub regexp: Option<RegexpRewrite>,
    /// Template rewrite.
    pub transform: Option<TransformRewrite>,
}

/// Rewrites keys with a regular expression.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegexpRewrite {
    /// Regular expression to match.
    pub source: String,
    /// Replacement, may use capture groups.
    pub target: String,
}

/// Rewrites keys with a template.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransformRewrite {
    /// Go template applied to each key.
    pub template: String,
}

/// Template for the generated Kubernetes Secret.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretTemplate {
    /// Secret type, e.g. `kubernetes.io/dockerconfigjson`.
    #[serde(rename = "type")]
    pub secret_type: Option<String>,
    /// `v1` or `v2`.
    pub engine_version: Option<String>,
    /// Metadata of the generated Secret.
    pub metadata: Option<TemplateMetadata>,
    /// `Replace` or `Merge`.
    pub merge_policy: Option<String>,
    /// Templated values by secret key.
    pub data: Option<BTreeMap<String, String>>,
    /// Template text taken from ConfigMaps, Secrets or literals.
    pub template_from: Option<Vec<TemplateFrom>>,
}

/// Labels and annotations of the generated Secret.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TemplateMetadata {
    /// Annotations.
    pub annotations: Option<BTreeMap<String, String>>,
    /// Labels.
    pub labels: Option<BTreeMap<String, String>>,
}

/// A source of template text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TemplateFrom {
    /// Template text from a ConfigMap.
    pub config_map: Option<TemplateRef>,
    /// Template text from a Secret.
    pub secret: Option<TemplateRef>,
    /// `Data`, `Annotations` or `Labels`.
    pub target: Option<String>,
    /// Inline template text.
    pub literal: Option<String>,
}

impl TemplateFrom {
    fn validate(&self, path: &str) -> Option<Diagnostic> {
        at_most_one_of(
            path,
            &[
                ("config_map", self.config_map.is_some()),
                ("secret", self.secret.is_some()),
                ("literal", self.literal.is_some()),
            ],
        )
    }
}

/// ConfigMap or Secret holding template text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRef {
    /// Object name.
    pub name: String,
    /// Keys used as templates.
    pub items: Vec<TemplateRefItem>,
}

/// A key of a template ConfigMap or Secret.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRefItem {
    /// Key in the object.
    pub key: String,
    /// `Values` or `KeysAndValues`.
    pub template_as: Option<String>,
}

impl SecretTemplate {
    /// One-of checks for each `templateFrom` entry.
    pub fn validate(&self, path: &str) -> Vec<Diagnostic> {
        self.template_from
            .iter()
            .flatten()
            .enumerate()
            .filter_map(|(i, from)| {
                from.validate(&format!("{}.{}", attr_path(path, "template_from"), i))
            })
            .collect()
    }
}

/// Certificate authority taken from a Secret or ConfigMap.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaProvider {
    /// `Secret` or `ConfigMap`.
    #[serde(rename = "type")]
    pub provider_type: String,
    /// Object name.
    pub name: String,
    /// Key holding the PEM bundle.
    pub key: Option<String>,
    /// Object namespace. Only used by cluster-scoped stores.
    pub namespace: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_ref_exclusive() {
        let both = StoreSourceRef {
            store_ref: Some(SecretStoreRef {
                name: "vault".to_string(),
                kind: None,
            }),
            generator_ref: Some(GeneratorRef {
                api_version: None,
                kind: "Password".to_string(),
                name: "pw".to_string(),
            }),
        };
        let diag = both.validate("spec.data.0.source_ref").unwrap();
        assert_eq!(diag.attribute.as_deref(), Some("spec.data.0.source_ref"));
        assert!(StoreSourceRef::default().validate("x").is_none());
    }

    #[test]
    fn test_template_from_exclusive() {
        let template = SecretTemplate {
            template_from: Some(vec![
                TemplateFrom {
                    literal: Some("{{ .x }}".to_string()),
                    ..Default::default()
                },
                TemplateFrom {
                    literal: Some("{{ .y }}".to_string()),
                    secret: Some(TemplateRef::default()),
                    ..Default::default()
                },
            ]),
            ..Default::default()
        };
        let diagnostics = template.validate("spec.target.template");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].attribute.as_deref(),
            Some("spec.target.template.template_from.1")
        );
    }

    #[test]
    fn test_template_type_rename() {
        let template: SecretTemplate =
            serde_json::from_value(serde_json::json!({"type": "Opaque", "engineVersion": "v2"}))
                .unwrap();
        assert_eq!(template.secret_type.as_deref(), Some("Opaque"));
        assert_eq!(template.engine_version.as_deref(), Some("v2"));
    }
}
