//! Google Cloud Secret Manager.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::crds::external_secrets::common::{SecretKeySelector, ServiceAccountSelector};

/// Google Cloud Secret Manager.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GcpsmProvider {
    /// Credentials. Falls back to the controller's default credentials.
    pub auth: Option<GcpsmAuth>,
    /// Project holding the secrets.
    #[serde(rename = "projectID")]
    pub project_id: Option<String>,
    /// Location for regional secrets.
    pub location: Option<String>,
}

/// GCP credentials, shared with the GCRAccessToken generator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GcpsmAuth {
    /// Service account key.
    pub secret_ref: Option<GcpSecretRef>,
    /// GKE workload identity.
    pub workload_identity: Option<GcpWorkloadIdentity>,
}

/// Service account key stored in a Secret.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GcpSecretRef {
    /// Service account key JSON.
    pub secret_access_key_secret_ref: Option<SecretKeySelector>,
}

/// GKE workload identity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GcpWorkloadIdentity {
    /// ServiceAccount bound to a Google service account.
    pub service_account_ref: ServiceAccountSelector,
    /// Location of the cluster.
    pub cluster_location: Option<String>,
    /// Name of the cluster.
    pub cluster_name: Option<String>,
    /// Project of the cluster, when it differs from the secrets.
    #[serde(rename = "clusterProjectID")]
    pub cluster_project_id: Option<String>,
}
