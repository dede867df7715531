//! `GCRAccessToken` generator.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{GROUP, VERSION};
use crate::crd::{at_most_one_of, CrdKind, Scope};
use crate::crds::external_secrets::providers::GcpsmAuth;
use crate::schema::Diagnostic;

/// Marker for the `GCRAccessToken` kind.
pub struct GcrAccessToken;

impl CrdKind for GcrAccessToken {
    const GROUP: &'static str = GROUP;
    const VERSION: &'static str = VERSION;
    const KIND: &'static str = "GCRAccessToken";
    const PLURAL: &'static str = "gcraccesstokens";
    const SCOPE: Scope = Scope::Namespaced;
    type Spec = GcrAccessTokenSpec;

    fn description() -> &'static str {
        "GCRAccessToken generates a short-lived Google Container Registry access token."
    }

    fn validate_spec(spec: &Self::Spec) -> Vec<Diagnostic> {
        at_most_one_of(
            "spec.auth",
            &[
                ("secret_ref", spec.auth.secret_ref.is_some()),
                ("workload_identity", spec.auth.workload_identity.is_some()),
            ],
        )
        .into_iter()
        .collect()
    }
}

/// Parameters of the GCR token request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GcrAccessTokenSpec {
    /// Exactly one of `secretRef` and `workloadIdentity`.
    pub auth: GcpsmAuth,
    /// Project that owns the registry.
    #[serde(rename = "projectID")]
    pub project_id: String,
}
