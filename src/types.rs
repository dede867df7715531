//! Convenience types shared by the server and provider implementation.
//!
//! These types provide a more ergonomic API over the raw protobuf types.

use serde::{Deserialize, Serialize};

use crate::schema::{Diagnostic, DiagnosticSeverity};

/// Provider metadata returned by GetMetadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProviderMetadata {
    /// List of data source type names.
    pub data_sources: Vec<String>,
}

impl ProviderMetadata {
    /// Create metadata listing the given data sources.
    pub fn new(data_sources: impl IntoIterator<Item = String>) -> Self {
        Self {
            data_sources: data_sources.into_iter().collect(),
        }
    }
}

impl From<Diagnostic> for crate::generated::Diagnostic {
    fn from(diag: Diagnostic) -> Self {
        let severity = match diag.severity {
            DiagnosticSeverity::Error => crate::generated::diagnostic::Severity::Error,
            DiagnosticSeverity::Warning => crate::generated::diagnostic::Severity::Warning,
        };
        Self {
            severity: severity as i32,
            summary: diag.summary,
            detail: diag.detail.unwrap_or_default(),
            attribute: diag.attribute.unwrap_or_default(),
        }
    }
}

impl From<crate::generated::Diagnostic> for Diagnostic {
    fn from(proto: crate::generated::Diagnostic) -> Self {
        let severity = if proto.severity == crate::generated::diagnostic::Severity::Warning as i32
        {
            DiagnosticSeverity::Warning
        } else {
            DiagnosticSeverity::Error
        };
        Self {
            severity,
            summary: proto.summary,
            detail: (!proto.detail.is_empty()).then_some(proto.detail),
            attribute: (!proto.attribute.is_empty()).then_some(proto.attribute),
        }
    }
}

/// The protocol version for the handshake.
pub const PROTOCOL_VERSION: u32 = 1;

/// The handshake prefix output by providers.
pub const HANDSHAKE_PREFIX: &str = "HEMMER_PROVIDER";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_conversion() {
        let diag = Diagnostic::warning("No namespaces selected")
            .with_attribute("spec.namespace_selectors");

        let proto: crate::generated::Diagnostic = diag.clone().into();
        assert_eq!(
            proto.severity,
            crate::generated::diagnostic::Severity::Warning as i32
        );
        assert_eq!(proto.detail, "");

        let back: Diagnostic = proto.into();
        assert_eq!(back, diag);
    }

    #[test]
    fn test_metadata() {
        let metadata = ProviderMetadata::new(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(metadata.data_sources.len(), 2);
    }

    #[test]
    fn test_protocol_constants() {
        assert_eq!(PROTOCOL_VERSION, 1);
        assert_eq!(HANDSHAKE_PREFIX, "HEMMER_PROVIDER");
    }
}
