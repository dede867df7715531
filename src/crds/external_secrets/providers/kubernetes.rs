//! Secrets of a (possibly remote) Kubernetes cluster.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::crds::external_secrets::common::{CaProvider, SecretKeySelector, ServiceAccountSelector};

/// Secrets of a Kubernetes cluster.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesProvider {
    /// API server to talk to. Defaults to the local cluster.
    pub server: Option<KubernetesServer>,
    /// Exactly one authentication method.
    pub auth: KubernetesAuth,
    /// Namespace to read Secrets from.
    pub remote_namespace: Option<String>,
}

/// API server connection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesServer {
    /// API server URL.
    pub url: Option<String>,
    /// PEM bundle used to verify the API server.
    pub ca_bundle: Option<String>,
    /// CA bundle taken from a Secret or ConfigMap.
    pub ca_provider: Option<CaProvider>,
}

/// Authentication against the API server. Exactly one method.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesAuth {
    /// Client certificate.
    pub cert: Option<KubernetesCertAuth>,
    /// Bearer token.
    pub token: Option<KubernetesTokenAuth>,
    /// Use a token of this ServiceAccount.
    pub service_account: Option<ServiceAccountSelector>,
}

/// Client certificate authentication.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesCertAuth {
    /// Client certificate.
    pub client_cert: Option<SecretKeySelector>,
    /// Client private key.
    pub client_key: Option<SecretKeySelector>,
}

/// Bearer token authentication.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct KubernetesTokenAuth {
    /// Token.
    pub bearer_token: Option<SecretKeySelector>,
}
