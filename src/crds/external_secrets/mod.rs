//! Kinds of the `external-secrets.io` API group.

pub mod common;
pub mod providers;

mod cluster_external_secret;
mod external_secret;
mod push_secret;
mod secret_store;

pub use cluster_external_secret::{ClusterExternalSecret, ClusterExternalSecretSpec, ExternalSecretMetadata};
pub use external_secret::{
    ExternalSecret, ExternalSecretData, ExternalSecretDataFrom, ExternalSecretSpec, ExternalSecretTarget,
};
pub use push_secret::{
    PushSecret, PushSecretData, PushSecretMatch, PushSecretRemoteRef, PushSecretSecret, PushSecretSelector,
    PushSecretSpec, PushSecretStoreRef,
};
pub use secret_store::{
    ClusterSecretStore, ClusterSecretStoreCondition, SecretStore, SecretStoreRetrySettings, SecretStoreSpec,
};

/// API group of the core External Secrets kinds.
pub const GROUP: &str = "external-secrets.io";
