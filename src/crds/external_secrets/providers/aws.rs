//! AWS Secrets Manager and Parameter Store.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::crd::{at_most_one_of, attr_path};
use crate::crds::external_secrets::common::{SecretKeySelector, ServiceAccountSelector};
use crate::schema::Diagnostic;

/// AWS Secrets Manager or Parameter Store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AwsProvider {
    /// `SecretsManager` or `ParameterStore`.
    pub service: String,
    /// Credentials. The controller's own credentials are used when unset.
    pub auth: Option<AwsAuth>,
    /// IAM role to assume.
    pub role: Option<String>,
    /// AWS region, e.g. `eu-west-1`.
    pub region: String,
    /// Roles assumed in order before `role`.
    pub additional_roles: Option<Vec<String>>,
    /// External ID used when assuming `role`.
    #[serde(rename = "externalID")]
    pub external_id: Option<String>,
    /// Tags attached to the role session.
    pub session_tags: Option<Vec<AwsSessionTag>>,
    /// Secrets Manager specific settings.
    pub secrets_manager: Option<AwsSecretsManager>,
    /// Session tag keys passed on to chained roles.
    pub transitive_tag_keys: Option<Vec<String>>,
    /// Prefix added to every remote key.
    pub prefix: Option<String>,
}

impl AwsProvider {
    pub(super) fn validate(&self, path: &str) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        if let Some(auth) = &self.auth {
            diagnostics.extend(auth.validate(&attr_path(path, "auth")));
        }
        if let Some(sm) = &self.secrets_manager {
            if sm.force_delete_without_recovery == Some(true) && sm.recovery_window_in_days.is_some() {
                diagnostics.push(
                    Diagnostic::error(format!(
                        "Conflicting configuration arguments in '{}'",
                        attr_path(path, "secrets_manager")
                    ))
                    .with_detail(
                        "recovery_window_in_days cannot be set when force_delete_without_recovery is true",
                    )
                    .with_attribute(attr_path(path, "secrets_manager")),
                );
            }
        }
        diagnostics
    }
}

/// AWS credentials.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AwsAuth {
    /// Static access keys from a Secret.
    pub secret_ref: Option<AwsAuthSecretRef>,
    /// IRSA through a ServiceAccount token.
    pub jwt: Option<AwsJwtAuth>,
}

impl AwsAuth {
    /// `secretRef` and `jwt` are mutually exclusive.
    pub fn validate(&self, path: &str) -> Option<Diagnostic> {
        at_most_one_of(
            path,
            &[
                ("secret_ref", self.secret_ref.is_some()),
                ("jwt", self.jwt.is_some()),
            ],
        )
    }
}

/// Static AWS access keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AwsAuthSecretRef {
    /// Access key id.
    #[serde(rename = "accessKeyIDSecretRef")]
    pub access_key_id_secret_ref: Option<SecretKeySelector>,
    /// Secret access key.
    pub secret_access_key_secret_ref: Option<SecretKeySelector>,
    /// Session token for temporary credentials.
    pub session_token_secret_ref: Option<SecretKeySelector>,
}

/// Authentication with a ServiceAccount token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AwsJwtAuth {
    /// ServiceAccount whose token is exchanged.
    pub service_account_ref: Option<ServiceAccountSelector>,
}

/// Tag attached to the assumed role session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AwsSessionTag {
    /// Tag key.
    pub key: String,
    /// Tag value.
    pub value: String,
}

/// Secrets Manager specific settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AwsSecretsManager {
    /// Delete secrets immediately instead of scheduling deletion.
    pub force_delete_without_recovery: Option<bool>,
    /// 7 to 30 days.
    pub recovery_window_in_days: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::ObjectShape;
    use serde_json::json;

    #[test]
    fn test_acronym_fields() {
        let provider: AwsProvider = serde_json::from_value(json!({
            "service": "SecretsManager",
            "region": "eu-west-1",
            "externalID": "ext",
            "auth": {"secretRef": {"accessKeyIDSecretRef": {"name": "aws", "key": "id"}}}
        }))
        .unwrap();
        assert_eq!(provider.external_id.as_deref(), Some("ext"));

        let shape = ObjectShape::of::<AwsProvider>().unwrap();
        assert!(shape.field("external_id").is_some());
        let auth = shape.field("auth").unwrap().shape.as_object().unwrap();
        let secret_ref = auth.field("secret_ref").unwrap().shape.as_object().unwrap();
        let field = secret_ref.field("access_key_id_secret_ref").unwrap();
        assert_eq!(field.json_name, "accessKeyIDSecretRef");
    }

    #[test]
    fn test_force_delete_conflict() {
        let provider = AwsProvider {
            secrets_manager: Some(AwsSecretsManager {
                force_delete_without_recovery: Some(true),
                recovery_window_in_days: Some(7),
            }),
            ..Default::default()
        };
        let diagnostics = provider.validate("spec.provider.aws");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].attribute.as_deref(),
            Some("spec.provider.aws.secrets_manager")
        );
    }
}
