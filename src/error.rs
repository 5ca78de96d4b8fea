//! Error types for the fsd provider.

use thiserror::Error;

use crate::client::ClientError;
use crate::config::ConfigAttribute;
use crate::schema::Diagnostic;

/// Errors that can occur while serving a provider operation.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// A validation error occurred.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The requested resource or data source type is unknown.
    #[error("Unknown resource type: {0}")]
    UnknownResource(String),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Reasons the provider configuration could not produce a client.
///
/// Each variant maps onto one user-facing [`Diagnostic`]; see
/// [`ConfigError::to_diagnostic`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The attribute's value is deferred and cannot be used yet.
    #[error("Unknown fsd API {}", .0.label())]
    Unknown(ConfigAttribute),

    /// Neither the attribute nor its environment variable holds a value.
    #[error("Missing fsd API {}", .0.label())]
    Missing(ConfigAttribute),

    /// The client rejected the resolved settings.
    #[error("Unable to Create fsd API Client")]
    ClientConstruction(#[from] ClientError),
}

impl ConfigError {
    /// The attribute this error is tied to, if any.
    pub fn attribute(&self) -> Option<ConfigAttribute> {
        match self {
            Self::Unknown(attr) | Self::Missing(attr) => Some(*attr),
            Self::ClientConstruction(_) => None,
        }
    }

    /// Longer guidance shown alongside the summary.
    pub fn detail(&self) -> String {
        match self {
            Self::Unknown(attr) => format!(
                "The provider cannot create the fsd API client as there is an unknown \
                 configuration value for the fsd API {name}. Either target apply the source \
                 of the value first, set the value statically in the configuration, or use \
                 the {env} environment variable.",
                name = attr.name(),
                env = attr.env_var(),
            ),
            Self::Missing(attr) => format!(
                "The provider cannot create the fsd API client as there is a missing or empty \
                 value for the fsd API {name}. Set the {name} value in the configuration or \
                 use the {env} environment variable. If either is already set, ensure the \
                 value is not empty.",
                name = attr.name(),
                env = attr.env_var(),
            ),
            Self::ClientConstruction(err) => format!(
                "An unexpected error occurred when creating the fsd API client. If the error \
                 is not clear, please contact the provider developers.\n\nfsd Client Error: {}",
                err
            ),
        }
    }

    /// Convert into an error diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diagnostic = Diagnostic::error(self.to_string()).with_detail(self.detail());
        match self.attribute() {
            Some(attr) => diagnostic.with_attribute(attr.name()),
            None => diagnostic,
        }
    }
}

impl From<ConfigError> for Diagnostic {
    fn from(err: ConfigError) -> Self {
        err.to_diagnostic()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ProviderError::UnknownResource("fsd_cart".to_string());
        assert_eq!(format!("{}", err), "Unknown resource type: fsd_cart");

        let err = ProviderError::Validation("invalid input".to_string());
        assert_eq!(format!("{}", err), "Validation error: invalid input");
    }

    #[test]
    fn test_serialization_error_converts() {
        let err: ProviderError = serde_json::from_str::<i64>("nope").unwrap_err().into();
        assert!(matches!(err, ProviderError::Serialization(_)));
        assert!(err.to_string().starts_with("Serialization error: "));
    }

    #[test]
    fn test_unknown_config_diagnostic() {
        let diag = ConfigError::Unknown(ConfigAttribute::Username).to_diagnostic();
        assert_eq!(diag.summary, "Unknown fsd API Username");
        assert_eq!(diag.attribute, Some("username".to_string()));
        let detail = diag.detail.unwrap();
        assert!(detail.contains("fsd_USERNAME"));
        assert!(detail.contains("target apply"));
    }

    #[test]
    fn test_missing_config_diagnostic() {
        let diag: Diagnostic = ConfigError::Missing(ConfigAttribute::Password).into();
        assert_eq!(diag.summary, "Missing fsd API Password");
        assert_eq!(diag.attribute, Some("password".to_string()));
        let detail = diag.detail.unwrap();
        assert!(detail.contains("Set the password value in the configuration"));
        assert!(detail.contains("fsd_PASSWORD"));
    }

    #[test]
    fn test_client_construction_diagnostic() {
        let cause = crate::client::Client::new("ftp://api.example.com", "a", "b").unwrap_err();
        let diag = ConfigError::from(cause).to_diagnostic();
        assert_eq!(diag.summary, "Unable to Create fsd API Client");
        assert!(diag.attribute.is_none());
        assert!(diag.detail.unwrap().contains("fsd Client Error: host must use"));
    }
}
