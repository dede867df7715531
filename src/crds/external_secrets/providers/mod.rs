//! Secret store provider configurations.
//!
//! A store configures exactly one provider.

mod aws;
mod azure;
mod gcp;
mod kubernetes;
mod others;
mod vault;
mod webhook;

pub use aws::{AwsAuth, AwsAuthSecretRef, AwsJwtAuth, AwsProvider, AwsSecretsManager, AwsSessionTag};
pub use azure::{AzureKvAuth, AzureKvProvider};
pub use gcp::{GcpSecretRef, GcpWorkloadIdentity, GcpsmAuth, GcpsmProvider};
pub use kubernetes::{KubernetesAuth, KubernetesCertAuth, KubernetesProvider, KubernetesServer, KubernetesTokenAuth};
pub use others::{
    FakeProvider, FakeProviderData, GitlabAuth, GitlabProvider, GitlabSecretRef, OnePasswordAuth,
    OnePasswordAuthSecretRef, OnePasswordProvider,
};
pub use vault::{
    VaultAppRole, VaultAuth, VaultCertAuth, VaultIamAuth, VaultJwtAuth, VaultKubernetesAuth,
    VaultKubernetesServiceAccountToken, VaultLdapAuth, VaultProvider, VaultTls, VaultUserPassAuth,
};
pub use webhook::{WebhookAuth, WebhookNtlmAuth, WebhookProvider, WebhookResult, WebhookSecret};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::crd::{at_most_one_of, attr_path, exactly_one_of};
use crate::schema::Diagnostic;

/// The provider block of a SecretStore.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretStoreProvider {
    /// AWS Secrets Manager or Parameter Store.
    pub aws: Option<AwsProvider>,
    /// Azure Key Vault.
    pub azurekv: Option<AzureKvProvider>,
    /// Google Cloud Secret Manager.
    pub gcpsm: Option<GcpsmProvider>,
    /// HashiCorp Vault.
    pub vault: Option<VaultProvider>,
    /// Secrets of another Kubernetes cluster or namespace.
    pub kubernetes: Option<KubernetesProvider>,
    /// Generic HTTP endpoint.
    pub webhook: Option<WebhookProvider>,
    /// Static values, for testing.
    pub fake: Option<FakeProvider>,
    /// 1Password Connect.
    pub onepassword: Option<OnePasswordProvider>,
    /// GitLab project and group variables.
    pub gitlab: Option<GitlabProvider>,
}

impl SecretStoreProvider {
    /// Exactly one provider must be configured; provider-specific checks
    /// run on whichever ones are.
    pub fn validate(&self, path: &str) -> Vec<Diagnostic> {
        let mut diagnostics: Vec<Diagnostic> = exactly_one_of(
            path,
            &[
                ("aws", self.aws.is_some()),
                ("azurekv", self.azurekv.is_some()),
                ("gcpsm", self.gcpsm.is_some()),
                ("vault", self.vault.is_some()),
                ("kubernetes", self.kubernetes.is_some()),
                ("webhook", self.webhook.is_some()),
                ("fake", self.fake.is_some()),
                ("onepassword", self.onepassword.is_some()),
                ("gitlab", self.gitlab.is_some()),
            ],
        )
        .into_iter()
        .collect();

        if let Some(aws) = &self.aws {
            diagnostics.extend(aws.validate(&attr_path(path, "aws")));
        }
        if let Some(vault) = &self.vault {
            diagnostics.extend(vault.auth.validate(&attr_path(path, "vault.auth")));
        }
        if let Some(kubernetes) = &self.kubernetes {
            diagnostics.extend(at_most_one_of(
                &attr_path(path, "kubernetes.auth"),
                &[
                    ("cert", kubernetes.auth.cert.is_some()),
                    ("token", kubernetes.auth.token.is_some()),
                    ("service_account", kubernetes.auth.service_account.is_some()),
                ],
            ));
        }
        diagnostics
    }
}
