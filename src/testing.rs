//! Testing utilities.
//!
//! [`ProviderTester`] drives a `ProviderService` without a gRPC server and
//! [`FakeCluster`] stands in for the Kubernetes API.
//!
//! # Example
//!
//! ```ignore
//! use k8s_crd_provider::testing::{FakeCluster, ProviderTester};
//! use k8s_crd_provider::CrdProvider;
//! use serde_json::json;
//!
//! #[tokio::test]
//! async fn reads_external_secret() {
//!     let cluster = FakeCluster::new().with_object(json!({
//!         "apiVersion": "external-secrets.io/v1beta1",
//!         "kind": "ExternalSecret",
//!         "metadata": {"name": "db", "namespace": "apps"},
//!         "spec": {"secretStoreRef": {"name": "vault"}}
//!     }));
//!     let tester = ProviderTester::new(CrdProvider::with_reader(cluster.into_reader()).unwrap());
//!
//!     let state = tester
//!         .read_data_source(
//!             "k8s_external_secrets_io_external_secret_v1beta1",
//!             json!({"metadata": {"name": "db", "namespace": "apps"}}),
//!         )
//!         .await
//!         .unwrap();
//!     assert_eq!(state["spec"]["secret_store_ref"]["name"], "vault");
//! }
//! ```

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::Value;

use crate::client::ObjectReader;
use crate::crd::ObjectRef;
use crate::error::ProviderError;
use crate::schema::{Diagnostic, DiagnosticSeverity, ProviderSchema};
use crate::server::ProviderService;

/// A test harness wrapping a `ProviderService`.
pub struct ProviderTester<P: ProviderService> {
    provider: P,
}

impl<P: ProviderService> ProviderTester<P> {
    /// Create a new tester for the given provider.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Get a reference to the underlying provider.
    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Get the provider's schema.
    pub fn schema(&self) -> ProviderSchema {
        self.provider.schema()
    }

    /// Get the list of data source type names.
    pub fn data_source_types(&self) -> Vec<String> {
        self.provider.metadata().data_sources
    }

    /// Validate provider configuration, failing on error diagnostics.
    pub async fn validate_provider_config(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.validate_provider_config(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Configure the provider, failing on error diagnostics.
    pub async fn configure(&self, config: Value) -> Result<(), TestError> {
        let diagnostics = self.provider.configure(config).await?;
        check_diagnostics(diagnostics)
    }

    /// Stop the provider.
    pub async fn stop(&self) -> Result<(), ProviderError> {
        self.provider.stop().await
    }

    /// Validate a data source configuration, failing on error diagnostics.
    pub async fn validate_data_source_config(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<(), TestError> {
        let diagnostics = self
            .provider
            .validate_data_source_config(data_source_type, config)
            .await?;
        check_diagnostics(diagnostics)
    }

    /// Validate a data source configuration, returning every diagnostic.
    pub async fn data_source_diagnostics(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Vec<Diagnostic>, ProviderError> {
        self.provider
            .validate_data_source_config(data_source_type, config)
            .await
    }

    /// Read a data source.
    pub async fn read_data_source(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, ProviderError> {
        self.provider
            .read_data_source(data_source_type, config)
            .await
    }

    /// Validate then read, the way a plan evaluates a data source.
    pub async fn validate_and_read(
        &self,
        data_source_type: &str,
        config: Value,
    ) -> Result<Value, TestError> {
        self.validate_data_source_config(data_source_type, config.clone())
            .await?;
        Ok(self.read_data_source(data_source_type, config).await?)
    }
}

/// Error type for test operations.
#[derive(Debug)]
pub enum TestError {
    /// The operation returned error diagnostics.
    Diagnostics(Vec<Diagnostic>),
    /// The provider returned an error.
    Provider(ProviderError),
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestError::Diagnostics(diags) => {
                writeln!(f, "Operation failed with {} diagnostic(s):", diags.len())?;
                for diag in diags {
                    write!(f, "  [{:?}] {}", diag.severity, diag.summary)?;
                    if let Some(detail) = &diag.detail {
                        write!(f, ": {}", detail)?;
                    }
                    if let Some(attr) = &diag.attribute {
                        write!(f, " (at {})", attr)?;
                    }
                    writeln!(f)?;
                }
                Ok(())
            },
            TestError::Provider(e) => write!(f, "Provider error: {}", e),
        }
    }
}

impl std::error::Error for TestError {}

impl From<ProviderError> for TestError {
    fn from(e: ProviderError) -> Self {
        TestError::Provider(e)
    }
}

fn check_diagnostics(diagnostics: Vec<Diagnostic>) -> Result<(), TestError> {
    let errors: Vec<_> = diagnostics.into_iter().filter(Diagnostic::is_error).collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(TestError::Diagnostics(errors))
    }
}

// =========================================================================
// Fake cluster
// =========================================================================

type ObjectKey = (String, String, Option<String>, String);

#[derive(Default)]
struct ClusterState {
    objects: BTreeMap<ObjectKey, Value>,
    requests: Vec<ObjectRef>,
    unreachable: bool,
}

/// In-memory stand-in for the Kubernetes API.
///
/// Objects are keyed by `apiVersion`, `kind`, namespace and name. Clones share
/// the same store, so a test can keep a handle while the provider owns another.
#[derive(Clone, Default)]
pub struct FakeCluster {
    state: Arc<Mutex<ClusterState>>,
}

impl FakeCluster {
    /// An empty cluster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object and return the cluster.
    pub fn with_object(self, object: Value) -> Self {
        self.insert(object);
        self
    }

    /// Add or replace an object.
    ///
    /// # Panics
    ///
    /// Panics if the object has no `apiVersion`, `kind` or `metadata.name`.
    pub fn insert(&self, object: Value) {
        let field = |path: &[&str]| -> Option<String> {
            let mut cursor = &object;
            for key in path {
                cursor = cursor.get(*key)?;
            }
            cursor.as_str().map(str::to_string)
        };
        let key = (
            field(&["apiVersion"]).expect("object needs apiVersion"),
            field(&["kind"]).expect("object needs kind"),
            field(&["metadata", "namespace"]),
            field(&["metadata", "name"]).expect("object needs metadata.name"),
        );
        self.lock().objects.insert(key, object);
    }

    /// Make every subsequent read fail as if the API server were down.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.lock().unreachable = unreachable;
    }

    /// Objects requested so far, in order.
    pub fn requests(&self) -> Vec<ObjectRef> {
        self.lock().requests.clone()
    }

    /// Share this cluster as a reader.
    pub fn into_reader(self) -> Arc<dyn ObjectReader> {
        Arc::new(self)
    }

    fn lock(&self) -> MutexGuard<'_, ClusterState> {
        // A panicking test must not hide the store from the others.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ObjectReader for FakeCluster {
    async fn get(&self, target: &ObjectRef) -> Result<Value, ProviderError> {
        let mut state = self.lock();
        state.requests.push(target.clone());

        if state.unreachable {
            return Err(ProviderError::Unavailable(format!(
                "{}: connection refused",
                target
            )));
        }

        let key = (
            target.api_version(),
            target.kind.clone(),
            target.namespace.clone(),
            target.name.clone(),
        );
        state.objects.get(&key).cloned().ok_or_else(|| {
            ProviderError::from_api_status(
                404,
                &format!("{} \"{}\" not found", target.plural, target.name),
                &target.to_string(),
            )
        })
    }
}

// =========================================================================
// Assertion Helpers
// =========================================================================

/// Assert that diagnostics contain no errors.
pub fn assert_no_errors(diagnostics: &[Diagnostic]) {
    let errors: Vec<_> = diagnostics.iter().filter(|d| d.is_error()).collect();

    assert!(
        errors.is_empty(),
        "Expected no errors, but got {} error(s): {:?}",
        errors.len(),
        errors.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}

/// Assert that diagnostics contain at least one error.
pub fn assert_has_errors(diagnostics: &[Diagnostic]) {
    assert!(
        diagnostics.iter().any(Diagnostic::is_error),
        "Expected at least one error, but got none"
    );
}

/// Assert that an error diagnostic is reported at the given attribute path.
pub fn assert_error_at(diagnostics: &[Diagnostic], attribute: &str) {
    assert!(
        diagnostics
            .iter()
            .any(|d| d.is_error() && d.attribute.as_deref() == Some(attribute)),
        "Expected an error at '{}', got errors at {:?}",
        attribute,
        diagnostics
            .iter()
            .filter(|d| d.is_error())
            .map(|d| &d.attribute)
            .collect::<Vec<_>>()
    );
}

/// Assert that a warning diagnostic contains a substring in its summary.
pub fn assert_warning_contains(diagnostics: &[Diagnostic], substring: &str) {
    assert!(
        diagnostics.iter().any(|d| {
            d.severity == DiagnosticSeverity::Warning && d.summary.contains(substring)
        }),
        "Expected a warning containing '{}', got {:?}",
        substring,
        diagnostics.iter().map(|d| &d.summary).collect::<Vec<_>>()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store_ref(name: &str) -> ObjectRef {
        ObjectRef {
            group: "external-secrets.io".to_string(),
            version: "v1beta1".to_string(),
            kind: "SecretStore".to_string(),
            plural: "secretstores".to_string(),
            namespace: Some("apps".to_string()),
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_fake_cluster_get() {
        let cluster = FakeCluster::new().with_object(json!({
            "apiVersion": "external-secrets.io/v1beta1",
            "kind": "SecretStore",
            "metadata": {"name": "vault", "namespace": "apps"},
            "spec": {}
        }));

        let object = cluster.get(&store_ref("vault")).await.unwrap();
        assert_eq!(object["metadata"]["name"], "vault");
        assert_eq!(cluster.requests(), vec![store_ref("vault")]);
    }

    #[tokio::test]
    async fn test_fake_cluster_not_found() {
        let cluster = FakeCluster::new();
        let err = cluster.get(&store_ref("missing")).await.unwrap_err();
        assert!(matches!(err, ProviderError::NotFound(_)));
        assert!(err.to_string().contains("secretstores \"missing\" not found"));
    }

    #[tokio::test]
    async fn test_fake_cluster_unreachable() {
        let cluster = FakeCluster::new();
        let handle = cluster.clone();
        handle.set_unreachable(true);

        let err = cluster.get(&store_ref("vault")).await.unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable(_)));
        assert_eq!(handle.requests().len(), 1);
    }

    #[test]
    fn test_check_diagnostics() {
        assert!(check_diagnostics(vec![Diagnostic::warning("w")]).is_ok());

        let err = check_diagnostics(vec![
            Diagnostic::error("bad").with_attribute("spec"),
            Diagnostic::warning("w"),
        ])
        .unwrap_err();
        match &err {
            TestError::Diagnostics(diags) => assert_eq!(diags.len(), 1),
            TestError::Provider(_) => panic!("expected diagnostics"),
        }
        assert!(err.to_string().contains("(at spec)"));
    }

    #[test]
    fn test_assertion_helpers() {
        let diagnostics = vec![
            Diagnostic::error("Missing").with_attribute("metadata.name"),
            Diagnostic::warning("No namespaces selected"),
        ];
        assert_has_errors(&diagnostics);
        assert_error_at(&diagnostics, "metadata.name");
        assert_warning_contains(&diagnostics, "namespaces");
        assert_no_errors(&[Diagnostic::warning("only a warning")]);
    }

    #[test]
    #[should_panic(expected = "Expected no errors")]
    fn test_assert_no_errors_panics() {
        assert_no_errors(&[Diagnostic::error("boom")]);
    }
}
