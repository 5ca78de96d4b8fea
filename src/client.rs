//! Handle to the fsd backend.

use std::fmt;

use thiserror::Error;
use url::Url;

use crate::value::Sensitive;

/// Errors raised while constructing a [`Client`].
#[derive(Debug, Error)]
pub enum ClientError {
    /// The host is not a valid absolute URL.
    #[error("invalid host {host:?}: {source}")]
    InvalidHost {
        /// The rejected host value.
        host: String,
        /// Parser error.
        #[source]
        source: url::ParseError,
    },

    /// The host URL uses a scheme other than http or https.
    #[error("host must use http:// or https:// scheme, got: {0}")]
    UnsupportedScheme(String),
}

/// Client for the fsd API.
///
/// Built once per successful configure pass and shared read-only by every
/// resource and data source.
#[derive(Clone)]
pub struct Client {
    base_url: Url,
    username: String,
    password: Sensitive<String>,
}

impl Client {
    /// Create a client from resolved connection settings.
    pub fn new(
        host: impl AsRef<str>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<Self, ClientError> {
        let host = host.as_ref();
        let base_url = Url::parse(host).map_err(|source| ClientError::InvalidHost {
            host: host.to_string(),
            source,
        })?;

        match base_url.scheme() {
            "http" | "https" => {},
            scheme => return Err(ClientError::UnsupportedScheme(scheme.to_string())),
        }

        Ok(Self {
            base_url,
            username: username.into(),
            password: Sensitive::new(password.into()),
        })
    }

    /// The API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The API username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The API password, redacted when formatted.
    pub fn password(&self) -> &Sensitive<String> {
        &self.password
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .field("username", &self.username)
            .field("password", &self.password)
            .finish()
    }
}
