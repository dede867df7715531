//! HashiCorp Vault.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::crd::at_most_one_of;
use crate::crds::external_secrets::common::{CaProvider, SecretKeySelector, ServiceAccountSelector};
use crate::schema::Diagnostic;

use super::aws::{AwsAuthSecretRef, AwsJwtAuth};

/// HashiCorp Vault KV engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VaultProvider {
    /// How to authenticate against Vault.
    pub auth: VaultAuth,
    /// Vault address, e.g. `https://vault.example.com:8200`.
    pub server: String,
    /// Mount path of the KV engine.
    pub path: Option<String>,
    /// KV engine version, `v1` or `v2`.
    pub version: Option<String>,
    /// Vault Enterprise namespace.
    pub namespace: Option<String>,
    /// PEM bundle used to verify the server certificate.
    pub ca_bundle: Option<String>,
    /// CA bundle taken from a Secret or ConfigMap.
    pub ca_provider: Option<CaProvider>,
    /// Mutual TLS settings.
    pub tls: Option<VaultTls>,
    /// Send `X-Vault-Index` so reads see earlier writes.
    pub read_your_writes: Option<bool>,
    /// Forward reads to the leader when a standby is behind.
    pub forward_inconsistent: Option<bool>,
    /// Extra HTTP headers sent with every request.
    pub headers: Option<BTreeMap<String, String>>,
}

/// Vault authentication methods. At most one may be configured.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VaultAuth {
    /// Static token.
    pub token_secret_ref: Option<SecretKeySelector>,
    /// AppRole login.
    pub app_role: Option<VaultAppRole>,
    /// Kubernetes login.
    pub kubernetes: Option<VaultKubernetesAuth>,
    /// LDAP login.
    pub ldap: Option<VaultLdapAuth>,
    /// JWT/OIDC login.
    pub jwt: Option<VaultJwtAuth>,
    /// TLS certificate login.
    pub cert: Option<VaultCertAuth>,
    /// AWS IAM login.
    pub iam: Option<VaultIamAuth>,
    /// Username and password login.
    pub user_pass: Option<VaultUserPassAuth>,
}

impl VaultAuth {
    /// At most one login method may be set.
    pub fn validate(&self, path: &str) -> Option<Diagnostic> {
        at_most_one_of(
            path,
            &[
                ("token_secret_ref", self.token_secret_ref.is_some()),
                ("app_role", self.app_role.is_some()),
                ("kubernetes", self.kubernetes.is_some()),
                ("ldap", self.ldap.is_some()),
                ("jwt", self.jwt.is_some()),
                ("cert", self.cert.is_some()),
                ("iam", self.iam.is_some()),
                ("user_pass", self.user_pass.is_some()),
            ],
        )
    }
}

/// AppRole authentication.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VaultAppRole {
    /// Mount path, usually `approle`.
    pub path: String,
    /// RoleID of the AppRole.
    pub role_id: Option<String>,
    /// RoleID read from a Secret instead of `roleId`.
    pub role_ref: Option<SecretKeySelector>,
    /// SecretID of the AppRole.
    pub secret_ref: SecretKeySelector,
}

/// Kubernetes authentication.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VaultKubernetesAuth {
    /// Mount path, usually `kubernetes`.
    pub mount_path: String,
    /// ServiceAccount whose token is used to log in.
    pub service_account_ref: Option<ServiceAccountSelector>,
    /// Token read from a Secret instead.
    pub secret_ref: Option<SecretKeySelector>,
    /// Vault role to log in as.
    pub role: String,
}

/// LDAP authentication.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VaultLdapAuth {
    /// Mount path, usually `ldap`.
    pub path: String,
    /// LDAP user.
    pub username: String,
    /// LDAP password.
    pub secret_ref: Option<SecretKeySelector>,
}

/// JWT/OIDC authentication.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VaultJwtAuth {
    /// Mount path, usually `jwt`.
    pub path: String,
    /// Vault role to log in as.
    pub role: Option<String>,
    /// JWT read from a Secret.
    pub secret_ref: Option<SecretKeySelector>,
    /// JWT requested from the TokenRequest API.
    pub kubernetes_service_account_token: Option<VaultKubernetesServiceAccountToken>,
}

/// ServiceAccount token requested for JWT authentication.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VaultKubernetesServiceAccountToken {
    /// ServiceAccount whose token is requested.
    pub service_account_ref: ServiceAccountSelector,
    /// Token audiences.
    pub audiences: Option<Vec<String>>,
    /// Token lifetime.
    pub expiration_seconds: Option<i64>,
}

/// TLS certificate authentication.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VaultCertAuth {
    /// Client certificate.
    pub client_cert: Option<SecretKeySelector>,
    /// Private key of the client certificate.
    pub secret_ref: Option<SecretKeySelector>,
}

/// AWS IAM authentication.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VaultIamAuth {
    /// Mount path, usually `aws`.
    pub path: Option<String>,
    /// AWS region of the STS endpoint.
    pub region: Option<String>,
    /// AWS role to assume before logging in.
    pub role: Option<String>,
    /// Vault role to log in as.
    pub vault_role: String,
    /// External ID used when assuming `role`.
    #[serde(rename = "externalID")]
    pub external_id: Option<String>,
    /// Value of the `X-Vault-AWS-IAM-Server-ID` header.
    #[serde(rename = "vaultAwsIamServerID")]
    pub vault_aws_iam_server_id: Option<String>,
    /// Static AWS credentials.
    pub secret_ref: Option<AwsAuthSecretRef>,
    /// AWS credentials from a ServiceAccount token.
    pub jwt: Option<AwsJwtAuth>,
}

/// Username and password authentication.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VaultUserPassAuth {
    /// Mount path, usually `userpass`.
    pub path: String,
    /// Vault user.
    pub username: String,
    /// Password.
    pub secret_ref: Option<SecretKeySelector>,
}

/// Client certificate for mutual TLS.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VaultTls {
    /// Client certificate.
    pub cert_secret_ref: Option<SecretKeySelector>,
    /// Client private key.
    pub key_secret_ref: Option<SecretKeySelector>,
}
