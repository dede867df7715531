//! Azure Key Vault.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::crds::external_secrets::common::{SecretKeySelector, ServiceAccountSelector};

/// Azure Key Vault.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AzureKvProvider {
    /// `ServicePrincipal`, `ManagedIdentity` or `WorkloadIdentity`.
    pub auth_type: Option<String>,
    /// e.g. `https://my-vault.vault.azure.net`.
    pub vault_url: String,
    /// Azure tenant id.
    pub tenant_id: Option<String>,
    /// `PublicCloud`, `USGovernmentCloud`, `ChinaCloud` or `GermanCloud`.
    pub environment_type: Option<String>,
    /// Service principal credentials.
    pub auth_secret_ref: Option<AzureKvAuth>,
    /// ServiceAccount for workload identity.
    pub service_account_ref: Option<ServiceAccountSelector>,
    /// Client id of a user-assigned managed identity.
    pub identity_id: Option<String>,
}

/// Service principal credentials.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AzureKvAuth {
    /// Client id.
    pub client_id: Option<SecretKeySelector>,
    /// Client secret.
    pub client_secret: Option<SecretKeySelector>,
    /// PEM certificate, used instead of `clientSecret`.
    pub client_certificate: Option<SecretKeySelector>,
}
