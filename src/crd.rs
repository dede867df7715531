//! Custom resource kinds.
//!
//! Every supported CRD version is a type implementing [`CrdKind`]. The kind
//! carries its API coordinates and a typed `Spec` model; the data sources in
//! [`crate::datasource`] are generic over it.

use kube::core::GroupVersionResource;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use std::collections::BTreeMap;
use std::fmt;

use crate::naming;
use crate::schema::Diagnostic;

/// Whether objects of a kind live in a namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Objects are addressed by namespace and name.
    Namespaced,
    /// Objects are addressed by name only.
    Cluster,
}

/// A custom resource kind at one API version.
pub trait CrdKind: Send + Sync + 'static {
    /// API group, e.g. `external-secrets.io`.
    const GROUP: &'static str;
    /// API version, e.g. `v1beta1`.
    const VERSION: &'static str;
    /// Kind, e.g. `ExternalSecret`.
    const KIND: &'static str;
    /// Plural resource name used in API paths, e.g. `externalsecrets`.
    const PLURAL: &'static str;
    /// Object scope.
    const SCOPE: Scope;

    /// The typed `spec` of the resource.
    type Spec: Serialize + DeserializeOwned + JsonSchema + Send + Sync;

    /// One-line description used for the data source schemas.
    fn description() -> &'static str;

    /// Check constraints the CRD describes but the type system does not
    /// (one-of groups). Attribute paths are relative to the data source root.
    fn validate_spec(spec: &Self::Spec) -> Vec<Diagnostic> {
        let _ = spec;
        Vec::new()
    }

    /// `group/version`.
    fn api_version() -> String {
        format!("{}/{}", Self::GROUP, Self::VERSION)
    }

    /// Group/version/resource triple addressing the kind.
    fn gvr() -> GroupVersionResource {
        GroupVersionResource::gvr(Self::GROUP, Self::VERSION, Self::PLURAL)
    }

    /// Name of the data source reading live objects.
    fn object_data_source_name() -> String {
        naming::object_data_source_name(Self::GROUP, Self::KIND, Self::VERSION)
    }

    /// Name of the data source rendering manifests.
    fn manifest_data_source_name() -> String {
        naming::manifest_data_source_name(Self::GROUP, Self::KIND, Self::VERSION)
    }

    /// Address of one object of this kind.
    fn object_ref(namespace: Option<String>, name: impl Into<String>) -> ObjectRef {
        ObjectRef {
            group: Self::GROUP.to_string(),
            version: Self::VERSION.to_string(),
            kind: Self::KIND.to_string(),
            plural: Self::PLURAL.to_string(),
            namespace: match Self::SCOPE {
                Scope::Namespaced => namespace,
                Scope::Cluster => None,
            },
            name: name.into(),
        }
    }
}

/// Group/version/resource address of a single object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef {
    /// API group.
    pub group: String,
    /// API version.
    pub version: String,
    /// Kind.
    pub kind: String,
    /// Plural resource name.
    pub plural: String,
    /// Namespace, `None` for cluster-scoped objects.
    pub namespace: Option<String>,
    /// Object name.
    pub name: String,
}

impl ObjectRef {
    /// `group/version`, or just `version` for the core group.
    pub fn api_version(&self) -> String {
        if self.group.is_empty() {
            self.version.clone()
        } else {
            format!("{}/{}", self.group, self.version)
        }
    }

    /// The state `id`: `namespace/name`, or `name` when cluster-scoped.
    pub fn id(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{}/{}", ns, self.name),
            None => self.name.clone(),
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}/{} {}", self.plural, self.group, self.version, self.id())
    }
}

/// Metadata of a rendered manifest.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ManifestMetadata {
    /// Object name.
    pub name: String,
    /// Namespace for namespaced kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    /// Labels.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    /// Annotations.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
}

/// A complete manifest ready for YAML rendering.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest<S> {
    /// `group/version`.
    pub api_version: String,
    /// Kind.
    pub kind: String,
    /// Object metadata.
    pub metadata: ManifestMetadata,
    /// Typed spec.
    pub spec: S,
}

// =============================================================================
// One-of helpers
// =============================================================================

/// Require exactly one member of a group to be set.
///
/// `members` pairs an attribute name with whether it is set.
pub fn exactly_one_of(path: &str, members: &[(&str, bool)]) -> Option<Diagnostic> {
    let set = set_members(members);
    match set.len() {
        1 => None,
        0 => Some(
            Diagnostic::error(format!("Missing required argument in '{}'", path))
                .with_detail(format!("Exactly one of {} must be set", member_list(members)))
                .with_attribute(path),
        ),
        _ => Some(conflict(path, &set, "Exactly one")),
    }
}

/// Allow at most one member of a group to be set.
pub fn at_most_one_of(path: &str, members: &[(&str, bool)]) -> Option<Diagnostic> {
    let set = set_members(members);
    if set.len() > 1 {
        Some(conflict(path, &set, "At most one"))
    } else {
        None
    }
}

/// Join an attribute path.
pub fn attr_path(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", base, name)
    }
}

fn set_members<'a>(members: &[(&'a str, bool)]) -> Vec<&'a str> {
    members
        .iter()
        .filter(|(_, is_set)| *is_set)
        .map(|(name, _)| *name)
        .collect()
}

fn member_list(members: &[(&str, bool)]) -> String {
    members
        .iter()
        .map(|(name, _)| format!("'{}'", name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn conflict(path: &str, set: &[&str], quantifier: &str) -> Diagnostic {
    let names: Vec<String> = set.iter().map(|name| format!("'{}'", name)).collect();
    Diagnostic::error(format!("Conflicting configuration arguments in '{}'", path))
        .with_detail(format!(
            "{} may be set, got {}",
            quantifier,
            names.join(", ")
        ))
        .with_attribute(path)
}
