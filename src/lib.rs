//! Kubernetes CRD Provider
//!
//! A Hemmer provider exposing the External Secrets Operator custom resources
//! as data sources. Every supported kind gets two of them:
//!
//! - **object** (`k8s_external_secrets_io_external_secret_v1beta1`): GETs a
//!   live object by namespace and name and maps its `spec` into state.
//! - **manifest** (`..._manifest`): renders the configured object to YAML
//!   without contacting a cluster.
//!
//! The attribute schema of each data source is compiled from the typed spec
//! model (see [`shape`]), so the schema, the JSON decoding and the YAML
//! rendering can't drift apart.
//!
//! # Quick Start
//!
//! ```ignore
//! use k8s_crd_provider::{serve, CrdProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     k8s_crd_provider::init_logging();
//!     serve(CrdProvider::new()?).await
//! }
//! ```
//!
//! # Handshake Protocol
//!
//! When the provider starts via [`serve`], it outputs a handshake string to stdout:
//!
//! ```text
//! HEMMER_PROVIDER|1|127.0.0.1:50051
//! ```
//!
//! Format: `HEMMER_PROVIDER|<protocol_version>|<address>`. Logs go to stderr.
//!
//! # Provider Protocol
//!
//! - **GetMetadata**: data source names
//! - **GetSchema**: provider configuration and data source schemas
//! - **ValidateProviderConfig** / **Configure**: cluster access
//! - **Stop**: graceful shutdown
//! - **ValidateDataSourceConfig**: schema and one-of checks
//! - **ReadDataSource**: object GET or manifest rendering

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod crd;
pub mod crds;
pub mod datasource;
pub mod error;
pub mod logging;
pub mod naming;
pub mod provider;
pub mod schema;
pub mod server;
pub mod shape;
pub mod testing;
pub mod types;
pub mod validation;

#[allow(missing_docs)]
#[allow(clippy::all)]
pub mod generated;

// Re-export main types at crate root
pub use crd::{CrdKind, ObjectRef, Scope};
pub use error::ProviderError;
pub use logging::{init_logging, init_logging_with_default, try_init_logging};
pub use provider::CrdProvider;
pub use schema::ProviderSchema;
pub use server::{
    serve, serve_on, serve_on_with_options, serve_with_options, ProviderService, ServeOptions,
};
pub use types::{ProviderMetadata, HANDSHAKE_PREFIX, PROTOCOL_VERSION};
pub use validation::{is_valid, validate, validate_result};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

// Re-export commonly used external types
pub use serde_json;
pub use tonic;
pub use tracing;
