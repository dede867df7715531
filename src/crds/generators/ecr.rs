//! `ECRAuthorizationToken` generator.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{GROUP, VERSION};
use crate::crd::{CrdKind, Scope};
use crate::crds::external_secrets::providers::AwsAuth;
use crate::schema::Diagnostic;

/// Marker for the `ECRAuthorizationToken` kind.
pub struct EcrAuthorizationToken;

impl CrdKind for EcrAuthorizationToken {
    const GROUP: &'static str = GROUP;
    const VERSION: &'static str = VERSION;
    const KIND: &'static str = "ECRAuthorizationToken";
    const PLURAL: &'static str = "ecrauthorizationtokens";
    const SCOPE: Scope = Scope::Namespaced;
    type Spec = EcrAuthorizationTokenSpec;

    fn description() -> &'static str {
        "ECRAuthorizationToken generates a short-lived Amazon ECR registry credential."
    }

    fn validate_spec(spec: &Self::Spec) -> Vec<Diagnostic> {
        spec.auth
            .as_ref()
            .and_then(|auth| auth.validate("spec.auth"))
            .into_iter()
            .collect()
    }
}

/// Parameters of the ECR token request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct EcrAuthorizationTokenSpec {
    /// Region of the registry.
    pub region: String,
    /// Credentials. The controller's own are used when unset.
    pub auth: Option<AwsAuth>,
    /// IAM role to assume.
    pub role: Option<String>,
    /// `private` or `public`.
    pub scope: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(
            EcrAuthorizationToken::object_data_source_name(),
            "k8s_generators_external_secrets_io_ecr_authorization_token_v1alpha1"
        );
        assert_eq!(EcrAuthorizationToken::gvr().group, "generators.external-secrets.io");
    }
}
