//! Generic HTTP webhook.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::crds::external_secrets::common::{CaProvider, SecretKeySelector};

/// Generic HTTP webhook.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookProvider {
    /// HTTP method, `GET` by default.
    pub method: Option<String>,
    /// URL template, may reference `remoteRef` fields.
    pub url: String,
    /// Header templates.
    pub headers: Option<BTreeMap<String, String>>,
    /// Credentials.
    pub auth: Option<WebhookAuth>,
    /// Request body template.
    pub body: Option<String>,
    /// Request timeout, e.g. `5s`.
    pub timeout: Option<String>,
    /// How to extract the value from the response.
    pub result: WebhookResult,
    /// Secrets available to the templates.
    pub secrets: Option<Vec<WebhookSecret>>,
    /// PEM bundle used to verify the server.
    pub ca_bundle: Option<String>,
    /// CA bundle taken from a Secret or ConfigMap.
    pub ca_provider: Option<CaProvider>,
}

/// Webhook authentication.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookAuth {
    /// NTLM authentication.
    pub ntlm: Option<WebhookNtlmAuth>,
}

/// NTLM credentials.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookNtlmAuth {
    /// Username.
    pub username_secret: SecretKeySelector,
    /// Password.
    pub password_secret: SecretKeySelector,
}

/// Response handling.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResult {
    /// JSONPath into the response. The whole body is used when unset.
    pub json_path: Option<String>,
}

/// A Secret exposed to the webhook templates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct WebhookSecret {
    /// Name used in templates.
    pub name: String,
    /// Secret exposed under `name`.
    pub secret_ref: SecretKeySelector,
}
