//! Error types for the provider.

use thiserror::Error;

/// Errors that can occur while serving the provider or reading data sources.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The requested Kubernetes object was not found.
    #[error("Object not found: {0}")]
    NotFound(String),

    /// A validation error occurred.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The provider configuration is invalid or incomplete.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The requested data source type is unknown.
    #[error("Unknown data source type: {0}")]
    UnknownDataSource(String),

    /// The cluster rejected the credentials or denied access.
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// The cluster could not be reached or answered with a server error.
    #[error("Cluster unavailable: {0}")]
    Unavailable(String),

    /// A CRD model could not be turned into a provider schema.
    #[error("Schema error: {0}")]
    Schema(String),

    /// Invalid request from the host.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// JSON encoding or decoding failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Rendering a manifest to YAML failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A gRPC transport error occurred.
    #[error("Transport error: {0}")]
    Transport(#[from] tonic::transport::Error),
}

impl ProviderError {
    /// Get the error message as a string.
    ///
    /// Returns a reference to the error message for any variant.
    pub fn message(&self) -> &str {
        match self {
            Self::NotFound(msg) => msg,
            Self::Validation(msg) => msg,
            Self::Configuration(msg) => msg,
            Self::UnknownDataSource(msg) => msg,
            Self::PermissionDenied(msg) => msg,
            Self::Unavailable(msg) => msg,
            Self::Schema(msg) => msg,
            Self::InvalidRequest(msg) => msg,
            Self::Serialization(_err) => "serialization error (see Debug output)",
            Self::Yaml(_err) => "yaml error (see Debug output)",
            Self::Transport(_err) => "transport error (see Debug output)",
        }
    }

    /// Short, user-facing summary used for diagnostics.
    ///
    /// The full error (`Display`) becomes the diagnostic detail.
    pub fn summary(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "Unable to find resource",
            Self::Validation(_) => "Invalid configuration",
            Self::Configuration(_) => "Provider configuration error",
            Self::UnknownDataSource(_) => "Unknown data source",
            Self::PermissionDenied(_) => "Unable to GET resource",
            Self::Unavailable(_) => "Unable to GET resource",
            Self::Schema(_) => "Invalid provider schema",
            Self::InvalidRequest(_) => "Invalid request",
            Self::Serialization(_) => "Unable to unmarshal resource",
            Self::Yaml(_) => "Unable to marshal manifest",
            Self::Transport(_) => "Transport failure",
        }
    }

    /// Translate a Kubernetes client error for the object being read.
    pub fn from_kube(err: kube::Error, object: &str) -> Self {
        match err {
            kube::Error::Api(response) => {
                Self::from_api_status(response.code, &response.message, object)
            },
            kube::Error::SerdeError(err) => Self::Serialization(err),
            other => Self::Unavailable(format!("{}: {}", object, other)),
        }
    }

    /// Classify an API server status code.
    pub fn from_api_status(code: u16, message: &str, object: &str) -> Self {
        match code {
            404 => Self::NotFound(format!("{}: {}", object, message)),
            401 | 403 => Self::PermissionDenied(format!("{}: {}", object, message)),
            _ => Self::Unavailable(format!("{}: {} ({})", object, message, code)),
        }
    }
}

impl From<ProviderError> for tonic::Status {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotFound(msg) => tonic::Status::not_found(msg),
            ProviderError::Validation(msg) => tonic::Status::invalid_argument(msg),
            ProviderError::Configuration(msg) => tonic::Status::failed_precondition(msg),
            ProviderError::UnknownDataSource(msg) => tonic::Status::not_found(msg),
            ProviderError::PermissionDenied(msg) => tonic::Status::permission_denied(msg),
            ProviderError::Unavailable(msg) => tonic::Status::unavailable(msg),
            ProviderError::Schema(msg) => tonic::Status::internal(msg),
            ProviderError::InvalidRequest(msg) => tonic::Status::invalid_argument(msg),
            ProviderError::Serialization(err) => {
                tonic::Status::invalid_argument(format!("Serialization error: {}", err))
            },
            ProviderError::Yaml(err) => tonic::Status::internal(format!("YAML error: {}", err)),
            ProviderError::Transport(err) => {
                tonic::Status::unavailable(format!("Transport error: {}", err))
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProviderError::NotFound("default/db".to_string());
        assert_eq!(format!("{}", err), "Object not found: default/db");

        let err = ProviderError::UnknownDataSource("k8s_nope".to_string());
        assert_eq!(format!("{}", err), "Unknown data source type: k8s_nope");

        let err = ProviderError::Unavailable("connection refused".to_string());
        assert_eq!(format!("{}", err), "Cluster unavailable: connection refused");
    }

    #[test]
    fn test_error_to_status() {
        let status: tonic::Status = ProviderError::NotFound("x".to_string()).into();
        assert_eq!(status.code(), tonic::Code::NotFound);

        let status: tonic::Status = ProviderError::Validation("x".to_string()).into();
        assert_eq!(status.code(), tonic::Code::InvalidArgument);

        let status: tonic::Status = ProviderError::Configuration("x".to_string()).into();
        assert_eq!(status.code(), tonic::Code::FailedPrecondition);

        let status: tonic::Status = ProviderError::PermissionDenied("x".to_string()).into();
        assert_eq!(status.code(), tonic::Code::PermissionDenied);

        let status: tonic::Status = ProviderError::Unavailable("x".to_string()).into();
        assert_eq!(status.code(), tonic::Code::Unavailable);

        let status: tonic::Status = ProviderError::Schema("x".to_string()).into();
        assert_eq!(status.code(), tonic::Code::Internal);
    }

    #[test]
    fn test_api_status_classification() {
        let err = ProviderError::from_api_status(404, "boom", "default/db");
        assert!(matches!(err, ProviderError::NotFound(_)));
        assert_eq!(err.message(), "default/db: boom");

        let err = ProviderError::from_api_status(403, "boom", "default/db");
        assert!(matches!(err, ProviderError::PermissionDenied(_)));

        let err = ProviderError::from_api_status(401, "boom", "default/db");
        assert!(matches!(err, ProviderError::PermissionDenied(_)));

        let err = ProviderError::from_api_status(500, "boom", "default/db");
        assert!(matches!(err, ProviderError::Unavailable(_)));
        assert!(err.message().contains("500"));
    }

    #[test]
    fn test_summary_for_marshal_failures() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(
            ProviderError::from(json_err).summary(),
            "Unable to unmarshal resource"
        );
        assert_eq!(
            ProviderError::NotFound("x".to_string()).summary(),
            "Unable to find resource"
        );
    }

    #[test]
    fn test_message_method() {
        let err = ProviderError::Configuration("offline".to_string());
        assert_eq!(err.message(), "offline");

        let err = ProviderError::InvalidRequest("bad request".to_string());
        assert_eq!(err.message(), "bad request");
    }
}
