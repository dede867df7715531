//! Kinds of the `generators.external-secrets.io` API group.
//!
//! Generators produce values (passwords, short-lived registry tokens)
//! that ExternalSecrets and PushSecrets reference through `generatorRef`.

mod ecr;
mod fake;
mod gcr;
mod password;

pub use ecr::{EcrAuthorizationToken, EcrAuthorizationTokenSpec};
pub use fake::{Fake, FakeSpec};
pub use gcr::{GcrAccessToken, GcrAccessTokenSpec};
pub use password::{Password, PasswordSpec};

/// API group of the generator kinds.
pub const GROUP: &str = "generators.external-secrets.io";

/// Version served for every generator kind.
pub const VERSION: &str = "v1alpha1";
