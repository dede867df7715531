//! Fake, 1Password and GitLab stores.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::crds::external_secrets::common::SecretKeySelector;

/// Static key/value pairs served from the store spec.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FakeProvider {
    /// Entries served by the store.
    pub data: Vec<FakeProviderData>,
}

/// One static entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FakeProviderData {
    /// Key.
    pub key: String,
    /// Plain value.
    pub value: Option<String>,
    /// Structured value, served as JSON.
    pub value_map: Option<BTreeMap<String, String>>,
    /// Version of the entry.
    pub version: Option<String>,
}

/// 1Password Connect server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OnePasswordProvider {
    /// URL of the Connect server.
    pub connect_host: String,
    /// Vault names to search, with their search order.
    pub vaults: BTreeMap<String, i64>,
    /// Credentials.
    pub auth: OnePasswordAuth,
}

/// Connect server credentials.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OnePasswordAuth {
    /// Credentials.
    pub secret_ref: OnePasswordAuthSecretRef,
}

/// Where the Connect token is stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct OnePasswordAuthSecretRef {
    /// Connect access token.
    pub connect_token_secret_ref: SecretKeySelector,
}

/// GitLab CI/CD variables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GitlabProvider {
    /// GitLab instance URL. Defaults to gitlab.com.
    pub url: Option<String>,
    /// Credentials.
    pub auth: GitlabAuth,
    /// Project to read variables from.
    #[serde(rename = "projectID")]
    pub project_id: Option<String>,
    /// Also read variables of the parent groups.
    pub inherit_from_groups: Option<bool>,
    /// Groups to read variables from.
    #[serde(rename = "groupIDs")]
    pub group_ids: Option<Vec<String>>,
    /// Environment scope of the variables.
    pub environment: Option<String>,
}

/// GitLab credentials.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GitlabAuth {
    /// Credentials.
    #[serde(rename = "SecretRef")]
    pub secret_ref: GitlabSecretRef,
}

/// Where the access token is stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GitlabSecretRef {
    /// Personal or project access token.
    pub access_token: SecretKeySelector,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{ObjectShape, Shape};
    use serde_json::json;

    #[test]
    fn test_gitlab_capitalised_key() {
        let shape = Shape::of::<GitlabProvider>().unwrap();
        let api = json!({
            "auth": {"SecretRef": {"accessToken": {"name": "gl", "key": "token"}}},
            "groupIDs": ["12"]
        });
        let state = shape.to_state(&api);
        assert_eq!(state["auth"]["secret_ref"]["access_token"]["name"], "gl");
        assert_eq!(state["group_ids"][0], "12");
        assert_eq!(shape.from_state(&state), api);
    }

    #[test]
    fn test_onepassword_vaults_is_a_map() {
        let shape = ObjectShape::of::<OnePasswordProvider>().unwrap();
        assert_eq!(
            shape.field("vaults").unwrap().shape,
            Shape::Map(Box::new(Shape::Int))
        );
    }
}
