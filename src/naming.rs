//! Attribute and data source naming.
//!
//! Kubernetes field names are camelCase; provider attributes are snake_case.
//! Acronym runs collapse into one word (`accessKeyID` becomes
//! `access_key_id`, `ECRAuthorizationToken` becomes
//! `ecr_authorization_token`, `groupIDs` becomes `group_ids`). Digits stay
//! attached to the word before them.

/// Convert a camelCase / PascalCase identifier to snake_case.
///
/// `-`, `.` and spaces are treated as word separators.
pub fn to_snake_case(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if matches!(c, '-' | '.' | ' ' | '_') {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            continue;
        }

        if c.is_ascii_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next = chars.get(i + 1).copied();
            let after_next = chars.get(i + 2).copied();
            // "IDs", "URLs": a lone trailing 's' pluralises the acronym
            let plural_acronym = next == Some('s')
                && after_next.map_or(true, |c| !c.is_ascii_lowercase());
            let starts_word = prev.is_ascii_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_ascii_uppercase()
                    && next.is_some_and(|n| n.is_ascii_lowercase())
                    && !plural_acronym);
            if starts_word && !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
        }

        out.push(c.to_ascii_lowercase());
    }

    while out.ends_with('_') {
        out.pop();
    }
    out
}

/// Name of the data source that reads live objects of a kind.
///
/// `k8s_<group>_<kind>_<version>` with the group's `.` and `-` folded to `_`.
pub fn object_data_source_name(group: &str, kind: &str, version: &str) -> String {
    let group = group.replace(['.', '-'], "_");
    if group.is_empty() {
        format!("k8s_{}_{}", to_snake_case(kind), version)
    } else {
        format!("k8s_{}_{}_{}", group, to_snake_case(kind), version)
    }
}

/// Name of the data source that renders manifests of a kind.
pub fn manifest_data_source_name(group: &str, kind: &str, version: &str) -> String {
    format!("{}_manifest", object_data_source_name(group, kind, version))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_camel_case() {
        assert_eq!(to_snake_case("secretStoreRef"), "secret_store_ref");
        assert_eq!(to_snake_case("refreshInterval"), "refresh_interval");
        assert_eq!(to_snake_case("kind"), "kind");
    }

    #[test]
    fn test_acronyms_collapse() {
        assert_eq!(to_snake_case("accessKeyID"), "access_key_id");
        assert_eq!(to_snake_case("secretAccessKeySecretRef"), "secret_access_key_secret_ref");
        assert_eq!(to_snake_case("ECRAuthorizationToken"), "ecr_authorization_token");
        assert_eq!(to_snake_case("GCRAccessToken"), "gcr_access_token");
        assert_eq!(to_snake_case("vaultURL"), "vault_url");
        assert_eq!(to_snake_case("caBundle"), "ca_bundle");
        assert_eq!(to_snake_case("groupIDs"), "group_ids");
        assert_eq!(to_snake_case("vaultAwsIamServerID"), "vault_aws_iam_server_id");
    }

    #[test]
    fn test_pascal_case() {
        assert_eq!(to_snake_case("ExternalSecret"), "external_secret");
        assert_eq!(to_snake_case("ClusterSecretStore"), "cluster_secret_store");
    }

    #[test]
    fn test_digits_stay_attached() {
        assert_eq!(to_snake_case("base64"), "base64");
        assert_eq!(to_snake_case("v1beta1"), "v1beta1");
        assert_eq!(to_snake_case("k8sAuth"), "k8s_auth");
    }

    #[test]
    fn test_separators() {
        assert_eq!(to_snake_case("external-secrets.io"), "external_secrets_io");
        assert_eq!(to_snake_case("already_snake"), "already_snake");
        assert_eq!(to_snake_case("trailing-"), "trailing");
    }

    #[test]
    fn test_data_source_names() {
        assert_eq!(
            object_data_source_name("external-secrets.io", "ExternalSecret", "v1beta1"),
            "k8s_external_secrets_io_external_secret_v1beta1"
        );
        assert_eq!(
            manifest_data_source_name(
                "generators.external-secrets.io",
                "ECRAuthorizationToken",
                "v1alpha1"
            ),
            "k8s_generators_external_secrets_io_ecr_authorization_token_v1alpha1_manifest"
        );
        assert_eq!(object_data_source_name("", "Pod", "v1"), "k8s_pod_v1");
    }
}
