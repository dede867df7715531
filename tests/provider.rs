//! End-to-end tests driving `CrdProvider` through `ProviderTester`.

use k8s_crd_provider::testing::{
    assert_error_at, assert_has_errors, assert_no_errors, assert_warning_contains, FakeCluster,
    ProviderTester, TestError,
};
use k8s_crd_provider::{CrdProvider, ProviderError};
use serde_json::{json, Value};
use tokio_test::{assert_err, assert_ok};

const EXTERNAL_SECRET: &str = "k8s_external_secrets_io_external_secret_v1beta1";
const EXTERNAL_SECRET_MANIFEST: &str = "k8s_external_secrets_io_external_secret_v1beta1_manifest";
const CLUSTER_STORE: &str = "k8s_external_secrets_io_cluster_secret_store_v1beta1";
const CLUSTER_STORE_MANIFEST: &str = "k8s_external_secrets_io_cluster_secret_store_v1beta1_manifest";
const CLUSTER_EXTERNAL_SECRET_MANIFEST: &str =
    "k8s_external_secrets_io_cluster_external_secret_v1beta1_manifest";
const PASSWORD_MANIFEST: &str = "k8s_generators_external_secrets_io_password_v1alpha1_manifest";

fn db_external_secret() -> Value {
    json!({
        "apiVersion": "external-secrets.io/v1beta1",
        "kind": "ExternalSecret",
        "metadata": {
            "name": "db",
            "namespace": "apps",
            "labels": {"app.kubernetes.io/name": "db"},
            "uid": "0b6f1c9e"
        },
        "spec": {
            "secretStoreRef": {"name": "vault", "kind": "ClusterSecretStore"},
            "refreshInterval": "1h",
            "target": {"name": "db-creds", "creationPolicy": "Owner"},
            "data": [{
                "secretKey": "password",
                "remoteRef": {"key": "db/prod", "property": "password"}
            }]
        },
        "status": {"refreshTime": "2024-01-01T00:00:00Z"}
    })
}

fn tester_with(cluster: &FakeCluster) -> ProviderTester<CrdProvider> {
    ProviderTester::new(assert_ok!(CrdProvider::with_reader(cluster.clone().into_reader())))
}

#[tokio::test]
async fn metadata_lists_object_and_manifest_sources() {
    let tester = ProviderTester::new(assert_ok!(CrdProvider::new()));
    let types = tester.data_source_types();

    assert_eq!(types.len(), 18);
    for name in [
        EXTERNAL_SECRET,
        EXTERNAL_SECRET_MANIFEST,
        CLUSTER_STORE,
        "k8s_external_secrets_io_push_secret_v1alpha1",
        "k8s_generators_external_secrets_io_ecr_authorization_token_v1alpha1_manifest",
    ] {
        assert!(types.iter().any(|t| t == name), "missing {name}");
    }
}

#[tokio::test]
async fn reads_external_secret_into_state() {
    let cluster = FakeCluster::new().with_object(db_external_secret());
    let tester = tester_with(&cluster);

    let state = assert_ok!(
        tester
            .validate_and_read(
                EXTERNAL_SECRET,
                json!({"metadata": {"name": "db", "namespace": "apps"}}),
            )
            .await
    );

    assert_eq!(state["id"], "apps/db");
    assert_eq!(state["api_version"], "external-secrets.io/v1beta1");
    assert_eq!(state["kind"], "ExternalSecret");
    assert_eq!(state["metadata"]["labels"]["app.kubernetes.io/name"], "db");
    assert_eq!(state["metadata"]["annotations"], Value::Null);

    let spec = &state["spec"];
    assert_eq!(spec["secret_store_ref"]["kind"], "ClusterSecretStore");
    assert_eq!(spec["target"]["creation_policy"], "Owner");
    assert_eq!(spec["target"]["deletion_policy"], Value::Null);
    assert_eq!(spec["data"][0]["remote_ref"]["property"], "password");
    assert_eq!(spec["data_from"], Value::Null);

    let requests = cluster.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].plural, "externalsecrets");
    assert_eq!(requests[0].namespace.as_deref(), Some("apps"));
}

#[tokio::test]
async fn reads_cluster_scoped_store() {
    let cluster = FakeCluster::new().with_object(json!({
        "apiVersion": "external-secrets.io/v1beta1",
        "kind": "ClusterSecretStore",
        "metadata": {"name": "aws"},
        "spec": {
            "provider": {
                "aws": {
                    "service": "SecretsManager",
                    "region": "eu-west-1",
                    "auth": {"jwt": {"serviceAccountRef": {"name": "eso", "namespace": "eso"}}}
                }
            }
        }
    }));
    let tester = tester_with(&cluster);

    let state = assert_ok!(
        tester
            .read_data_source(CLUSTER_STORE, json!({"metadata": {"name": "aws"}}))
            .await
    );
    assert_eq!(state["id"], "aws");
    let aws = &state["spec"]["provider"]["aws"];
    assert_eq!(aws["region"], "eu-west-1");
    assert_eq!(aws["auth"]["jwt"]["service_account_ref"]["name"], "eso");
    assert_eq!(aws["auth"]["secret_ref"], Value::Null);
    assert_eq!(cluster.requests()[0].namespace, None);
}

#[tokio::test]
async fn missing_object_is_not_found() {
    let tester = tester_with(&FakeCluster::new());

    let err = assert_err!(
        tester
            .read_data_source(
                EXTERNAL_SECRET,
                json!({"metadata": {"name": "gone", "namespace": "apps"}}),
            )
            .await
    );
    assert!(matches!(err, ProviderError::NotFound(_)));
    assert_eq!(err.summary(), "Unable to find resource");
    assert!(err.to_string().contains("externalsecrets \"gone\" not found"));
}

#[tokio::test]
async fn unreachable_cluster_is_unavailable() {
    let cluster = FakeCluster::new().with_object(db_external_secret());
    cluster.set_unreachable(true);
    let tester = tester_with(&cluster);

    let err = assert_err!(
        tester
            .read_data_source(
                EXTERNAL_SECRET,
                json!({"metadata": {"name": "db", "namespace": "apps"}}),
            )
            .await
    );
    assert!(matches!(err, ProviderError::Unavailable(_)));
}

#[tokio::test]
async fn malformed_object_fails_to_decode() {
    let cluster = FakeCluster::new().with_object(json!({
        "apiVersion": "external-secrets.io/v1beta1",
        "kind": "ExternalSecret",
        "metadata": {"name": "broken", "namespace": "apps"},
        "spec": {"data": [{"secretKey": 42}]}
    }));
    let tester = tester_with(&cluster);

    let err = assert_err!(
        tester
            .read_data_source(
                EXTERNAL_SECRET,
                json!({"metadata": {"name": "broken", "namespace": "apps"}}),
            )
            .await
    );
    assert_eq!(err.summary(), "Unable to unmarshal resource");
}

#[tokio::test]
async fn reads_object_without_spec() {
    let cluster = FakeCluster::new().with_object(json!({
        "apiVersion": "generators.external-secrets.io/v1alpha1",
        "kind": "Fake",
        "metadata": {"name": "empty", "namespace": "apps"}
    }));
    let tester = tester_with(&cluster);

    let state = assert_ok!(
        tester
            .read_data_source(
                "k8s_generators_external_secrets_io_fake_v1alpha1",
                json!({"metadata": {"name": "empty", "namespace": "apps"}}),
            )
            .await
    );
    assert_eq!(state["id"], "apps/empty");
    assert_eq!(state["spec"]["controller"], Value::Null);
    assert_eq!(state["spec"]["data"], Value::Null);
}

#[tokio::test]
async fn renders_external_secret_manifest() {
    let tester = ProviderTester::new(assert_ok!(CrdProvider::new()));
    let config = json!({
        "metadata": {"name": "db", "namespace": "apps", "labels": {"team": "data"}},
        "spec": {
            "secret_store_ref": {"name": "vault", "kind": "ClusterSecretStore"},
            "refresh_interval": "1h",
            "data": [{
                "secret_key": "password",
                "remote_ref": {"key": "db/prod", "property": "password"}
            }]
        }
    });

    let state = assert_ok!(tester.validate_and_read(EXTERNAL_SECRET_MANIFEST, config).await);
    assert_eq!(state["id"], "apps/db");

    let yaml = state["yaml"].as_str().unwrap();
    let doc: Value = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(doc["apiVersion"], "external-secrets.io/v1beta1");
    assert_eq!(doc["kind"], "ExternalSecret");
    assert_eq!(doc["metadata"]["labels"]["team"], "data");
    assert_eq!(doc["spec"]["secretStoreRef"]["kind"], "ClusterSecretStore");
    assert_eq!(doc["spec"]["refreshInterval"], "1h");
    assert_eq!(doc["spec"]["data"][0]["remoteRef"]["key"], "db/prod");
    assert!(!yaml.contains("null"));
    assert!(!yaml.contains("dataFrom"));
}

#[tokio::test]
async fn manifests_render_while_offline() {
    let tester = ProviderTester::new(assert_ok!(CrdProvider::new()));
    assert_ok!(tester.configure(json!({"offline": true})).await);

    let state = assert_ok!(
        tester
            .read_data_source(
                CLUSTER_STORE_MANIFEST,
                json!({
                    "metadata": {"name": "fake"},
                    "spec": {
                        "provider": {
                            "fake": {"data": [{"key": "/foo", "value": "bar"}]}
                        }
                    }
                }),
            )
            .await
    );
    let yaml = state["yaml"].as_str().unwrap();
    assert!(yaml.contains("kind: ClusterSecretStore"));
    assert!(!yaml.contains("namespace"));

    let err = assert_err!(
        tester
            .read_data_source(CLUSTER_STORE, json!({"metadata": {"name": "fake"}}))
            .await
    );
    assert!(matches!(err, ProviderError::Configuration(_)));
}

#[tokio::test]
async fn store_requires_exactly_one_provider() {
    let tester = ProviderTester::new(assert_ok!(CrdProvider::new()));
    let config = json!({
        "metadata": {"name": "two"},
        "spec": {
            "provider": {
                "fake": {"data": [{"key": "/foo", "value": "bar"}]},
                "kubernetes": {"auth": {"token": {"bearer_token": {"name": "t", "key": "token"}}}}
            }
        }
    });

    let diagnostics = assert_ok!(
        tester
            .data_source_diagnostics(CLUSTER_STORE_MANIFEST, config.clone())
            .await
    );
    assert_error_at(&diagnostics, "spec.provider");

    match tester.validate_and_read(CLUSTER_STORE_MANIFEST, config).await {
        Err(TestError::Diagnostics(errors)) => assert_eq!(errors.len(), 1),
        other => panic!("expected diagnostics, got {other:?}"),
    }

    let err = assert_err!(
        tester
            .read_data_source(
                CLUSTER_STORE_MANIFEST,
                json!({"metadata": {"name": "none"}, "spec": {"provider": {}}}),
            )
            .await
    );
    assert!(matches!(err, ProviderError::Validation(_)));
}

#[tokio::test]
async fn data_from_entries_are_exclusive() {
    let tester = ProviderTester::new(assert_ok!(CrdProvider::new()));
    let diagnostics = assert_ok!(
        tester
            .data_source_diagnostics(
                EXTERNAL_SECRET_MANIFEST,
                json!({
                    "metadata": {"name": "db", "namespace": "apps"},
                    "spec": {
                        "data_from": [{
                            "extract": {"key": "db"},
                            "find": {"path": "db/"}
                        }]
                    }
                }),
            )
            .await
    );
    assert_error_at(&diagnostics, "spec.data_from.0");
}

#[tokio::test]
async fn cluster_external_secret_warns_without_namespaces() {
    let tester = ProviderTester::new(assert_ok!(CrdProvider::new()));
    let diagnostics = assert_ok!(
        tester
            .data_source_diagnostics(
                CLUSTER_EXTERNAL_SECRET_MANIFEST,
                json!({
                    "metadata": {"name": "shared"},
                    "spec": {
                        "external_secret_spec": {
                            "secret_store_ref": {"name": "vault"}
                        }
                    }
                }),
            )
            .await
    );
    assert_no_errors(&diagnostics);
    assert_warning_contains(&diagnostics, "No namespaces selected");
}

#[tokio::test]
async fn schema_rejects_unknown_and_mistyped_attributes() {
    let tester = ProviderTester::new(assert_ok!(CrdProvider::new()));
    let diagnostics = assert_ok!(
        tester
            .data_source_diagnostics(
                PASSWORD_MANIFEST,
                json!({
                    "metadata": {"name": "pw", "namespace": "apps"},
                    "spec": {"length": "long", "colour": "red"}
                }),
            )
            .await
    );
    assert_has_errors(&diagnostics);
    assert_error_at(&diagnostics, "spec.length");
    assert_error_at(&diagnostics, "spec.colour");
}

#[tokio::test]
async fn unknown_data_source_is_rejected() {
    let tester = ProviderTester::new(assert_ok!(CrdProvider::new()));
    let err = assert_err!(
        tester
            .read_data_source("k8s_external_secrets_io_widget_v1", json!({}))
            .await
    );
    assert!(matches!(err, ProviderError::UnknownDataSource(_)));
}

#[tokio::test]
async fn invalid_provider_config_is_reported() {
    let tester = ProviderTester::new(assert_ok!(CrdProvider::new()));
    match tester
        .configure(json!({"request_timeout_seconds": 0}))
        .await
    {
        Err(TestError::Diagnostics(errors)) => {
            assert_eq!(errors[0].attribute.as_deref(), Some("request_timeout_seconds"));
        },
        other => panic!("expected diagnostics, got {other:?}"),
    }
}

#[tokio::test]
async fn password_manifest_accepts_any_counts() {
    let tester = ProviderTester::new(assert_ok!(CrdProvider::new()));
    let config = json!({
        "metadata": {"name": "pw", "namespace": "apps"},
        "spec": {"length": 0, "digits": i64::MAX, "symbols": 1}
    });

    let diagnostics = assert_ok!(tester.data_source_diagnostics(PASSWORD_MANIFEST, config.clone()).await);
    assert_no_errors(&diagnostics);

    let state = assert_ok!(tester.validate_and_read(PASSWORD_MANIFEST, config).await);
    let doc: Value = serde_yaml::from_str(state["yaml"].as_str().unwrap()).unwrap();
    assert_eq!(doc["kind"], "Password");
    assert_eq!(doc["spec"]["length"], 0);
    assert_eq!(doc["spec"]["digits"], i64::MAX);
}
