//! `ClusterExternalSecret` (external-secrets.io/v1beta1).

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::common::LabelSelector;
use super::external_secret::ExternalSecretSpec;
use super::GROUP;
use crate::crd::{CrdKind, Scope};
use crate::schema::Diagnostic;

/// Marker for the `ClusterExternalSecret` kind.
pub struct ClusterExternalSecret;

impl CrdKind for ClusterExternalSecret {
    const GROUP: &'static str = GROUP;
    const VERSION: &'static str = "v1beta1";
    const KIND: &'static str = "ClusterExternalSecret";
    const PLURAL: &'static str = "clusterexternalsecrets";
    const SCOPE: Scope = Scope::Cluster;
    type Spec = ClusterExternalSecretSpec;

    fn description() -> &'static str {
        "ClusterExternalSecret stamps an ExternalSecret into every matching namespace."
    }

    fn validate_spec(spec: &Self::Spec) -> Vec<Diagnostic> {
        let mut diagnostics = spec
            .external_secret_spec
            .validate("spec.external_secret_spec");

        let selects_any = spec.namespace_selector.is_some()
            || spec.namespaces.as_ref().is_some_and(|ns| !ns.is_empty())
            || spec.namespace_selectors.as_ref().is_some_and(|s| !s.is_empty());
        if !selects_any {
            diagnostics.push(
                Diagnostic::warning("No namespaces selected")
                    .with_detail(
                        "Set one of 'namespace_selector', 'namespace_selectors' or 'namespaces'; \
                         otherwise no ExternalSecret is created",
                    )
                    .with_attribute("spec"),
            );
        }
        diagnostics
    }
}

/// Desired state of a ClusterExternalSecret.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClusterExternalSecretSpec {
    /// Spec of the ExternalSecret created in each namespace.
    pub external_secret_spec: ExternalSecretSpec,
    /// Name of the created ExternalSecrets. Defaults to this object's name.
    pub external_secret_name: Option<String>,
    /// Metadata of the created ExternalSecrets.
    pub external_secret_metadata: Option<ExternalSecretMetadata>,
    /// Deprecated in favour of `namespaceSelectors`.
    pub namespace_selector: Option<LabelSelector>,
    /// Namespaces matching any of these selectors.
    pub namespace_selectors: Option<Vec<LabelSelector>>,
    /// Namespaces selected by name.
    pub namespaces: Option<Vec<String>>,
    /// How often namespaces are re-evaluated.
    pub refresh_time: Option<String>,
}

/// Labels and annotations put on every created ExternalSecret.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExternalSecretMetadata {
    /// Annotations.
    pub annotations: Option<BTreeMap<String, String>>,
    /// Labels.
    pub labels: Option<BTreeMap<String, String>>,
}
