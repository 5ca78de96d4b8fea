//! Provider configuration and client construction.
//!
//! Every connection setting can come from the provider configuration or from
//! an environment variable. An explicit configuration value wins over the
//! environment. Resolution runs in three phases. A phase reports all of its
//! problems at once, and a failed phase stops resolution:
//!
//! 1. deferred (unknown) values are rejected, one error per attribute
//! 2. the effective values are merged and empty ones are rejected
//! 3. the [`Client`] is built from the effective values
//!
//! ```
//! use std::collections::HashMap;
//! use fsd_provider::config::{configure_client, ProviderConfig};
//! use fsd_provider::value::ConfigValue;
//!
//! let config = ProviderConfig {
//!     host: ConfigValue::present("https://api.example.com"),
//!     username: ConfigValue::Absent,
//!     password: ConfigValue::present("secret"),
//! };
//! let env = HashMap::from([("fsd_USERNAME".to_string(), "alice".to_string())]);
//!
//! let client = configure_client(&config, &env).unwrap();
//! assert_eq!(client.username(), "alice");
//! ```

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;
use tracing::{debug, info};

use crate::client::Client;
use crate::error::{ConfigError, ProviderError};
use crate::schema::{Attribute, Diagnostic, Schema};
use crate::value::{ConfigValue, Sensitive};

/// Environment variable holding the API host.
pub const HOST_ENV: &str = "fsd_HOST";
/// Environment variable holding the API username.
pub const USERNAME_ENV: &str = "fsd_USERNAME";
/// Environment variable holding the API password.
pub const PASSWORD_ENV: &str = "fsd_PASSWORD";

/// One of the provider's connection attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigAttribute {
    /// `host`
    Host,
    /// `username`
    Username,
    /// `password`
    Password,
}

impl ConfigAttribute {
    /// All attributes in schema order.
    pub const ALL: [ConfigAttribute; 3] = [Self::Host, Self::Username, Self::Password];

    /// Attribute name in the provider schema.
    pub fn name(self) -> &'static str {
        match self {
            Self::Host => "host",
            Self::Username => "username",
            Self::Password => "password",
        }
    }

    /// Capitalised name used in diagnostic summaries.
    pub fn label(self) -> &'static str {
        match self {
            Self::Host => "Host",
            Self::Username => "Username",
            Self::Password => "Password",
        }
    }

    /// Environment variable used as fallback.
    pub fn env_var(self) -> &'static str {
        match self {
            Self::Host => HOST_ENV,
            Self::Username => USERNAME_ENV,
            Self::Password => PASSWORD_ENV,
        }
    }
}

impl fmt::Display for ConfigAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Source of environment variables.
pub trait EnvSource: Send + Sync {
    /// Look up a variable. Unset variables return `None`.
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Provider-level configuration as supplied by the practitioner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderConfig {
    /// URI of the fsd API.
    pub host: ConfigValue,
    /// API username.
    pub username: ConfigValue,
    /// API password.
    pub password: ConfigValue,
}

impl ProviderConfig {
    /// The schema describing the provider configuration.
    pub fn schema() -> Schema {
        Schema::v0()
            .with_description("Interact with fsd.")
            .with_attribute(
                "host",
                Attribute::optional_string().with_description(
                    "URI for fsd API. May also be provided via fsd_HOST environment variable.",
                ),
            )
            .with_attribute(
                "username",
                Attribute::optional_string().with_description(
                    "Username for fsd API. May also be provided via fsd_USERNAME environment \
                     variable.",
                ),
            )
            .with_attribute(
                "password",
                Attribute::optional_string()
                    .with_description(
                        "Password for fsd API. May also be provided via fsd_PASSWORD \
                         environment variable.",
                    )
                    .sensitive(),
            )
    }

    /// Decode the configuration from the host's JSON object.
    ///
    /// `null` config is treated as an empty object. Callers should run schema
    /// validation first; any non-string value is rejected here as well.
    pub fn from_json(config: &Value) -> Result<Self, ProviderError> {
        let obj = match config {
            Value::Object(map) => Some(map),
            Value::Null => None,
            other => {
                return Err(ProviderError::Validation(format!(
                    "provider configuration must be an object, got {}",
                    other
                )))
            },
        };

        let field = |attr: ConfigAttribute| {
            let raw = obj.and_then(|map| map.get(attr.name()));
            ConfigValue::from_json(raw).ok_or_else(|| {
                ProviderError::Validation(format!("attribute '{}' must be a string", attr))
            })
        };

        Ok(Self {
            host: field(ConfigAttribute::Host)?,
            username: field(ConfigAttribute::Username)?,
            password: field(ConfigAttribute::Password)?,
        })
    }

    /// The configured value for an attribute.
    pub fn get(&self, attr: ConfigAttribute) -> &ConfigValue {
        match attr {
            ConfigAttribute::Host => &self.host,
            ConfigAttribute::Username => &self.username,
            ConfigAttribute::Password => &self.password,
        }
    }
}

/// Fully resolved connection settings.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    /// URI of the fsd API.
    pub host: String,
    /// API username.
    pub username: String,
    /// API password.
    pub password: Sensitive<String>,
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &self.password)
            .finish()
    }
}

/// Merge configuration and environment into effective settings.
///
/// Runs the unknown-value phase and the missing-value phase. Each phase
/// collects one error per offending attribute.
pub fn resolve(
    config: &ProviderConfig,
    env: &dyn EnvSource,
) -> Result<ResolvedConfig, Vec<ConfigError>> {
    let unknown: Vec<ConfigError> = ConfigAttribute::ALL
        .into_iter()
        .filter(|attr| config.get(*attr).is_unknown())
        .map(ConfigError::Unknown)
        .collect();
    if !unknown.is_empty() {
        return Err(unknown);
    }

    let effective = |attr: ConfigAttribute| match config.get(attr) {
        ConfigValue::Present(value) => value.clone(),
        _ => env.var(attr.env_var()).unwrap_or_default(),
    };
    let host = effective(ConfigAttribute::Host);
    let username = effective(ConfigAttribute::Username);
    let password = effective(ConfigAttribute::Password);

    let missing: Vec<ConfigError> = [
        (ConfigAttribute::Host, &host),
        (ConfigAttribute::Username, &username),
        (ConfigAttribute::Password, &password),
    ]
    .into_iter()
    .filter(|(_, value)| value.is_empty())
    .map(|(attr, _)| ConfigError::Missing(attr))
    .collect();
    if !missing.is_empty() {
        return Err(missing);
    }

    Ok(ResolvedConfig {
        host,
        username,
        password: Sensitive::new(password),
    })
}

/// Resolve the configuration and build the client.
///
/// Returns error diagnostics instead of a client when any phase fails.
pub fn configure_client(
    config: &ProviderConfig,
    env: &dyn EnvSource,
) -> Result<Client, Vec<Diagnostic>> {
    info!("Configuring fsd client");

    let resolved = resolve(config, env)
        .map_err(|errors| errors.iter().map(ConfigError::to_diagnostic).collect::<Vec<_>>())?;

    debug!(
        fsd_host = %resolved.host,
        fsd_username = %resolved.username,
        fsd_password = %resolved.password,
        "Creating fsd client"
    );

    let client = Client::new(
        &resolved.host,
        resolved.username.as_str(),
        resolved.password.expose().as_str(),
    )
    .map_err(|err| vec![ConfigError::from(err).to_diagnostic()])?;

    info!(
        fsd_host = %resolved.host,
        fsd_username = %resolved.username,
        fsd_password = %resolved.password,
        success = true,
        "Configured fsd client"
    );
    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::LogCapture;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn full_config() -> ProviderConfig {
        ProviderConfig {
            host: ConfigValue::present("https://api.example.com"),
            username: ConfigValue::present("alice"),
            password: ConfigValue::present("secret"),
        }
    }

    fn attributes(errors: &[ConfigError]) -> Vec<ConfigAttribute> {
        errors.iter().filter_map(ConfigError::attribute).collect()
    }

    #[test]
    fn test_unknown_value_names_only_that_attribute() {
        for attr in ConfigAttribute::ALL {
            let mut config = full_config();
            match attr {
                ConfigAttribute::Host => config.host = ConfigValue::Unknown,
                ConfigAttribute::Username => config.username = ConfigValue::Unknown,
                ConfigAttribute::Password => config.password = ConfigValue::Unknown,
            }

            let errors = resolve(&config, &env(&[])).unwrap_err();
            assert_eq!(errors.len(), 1);
            assert!(matches!(errors[0], ConfigError::Unknown(a) if a == attr));
        }
    }

    #[test]
    fn test_all_unknown_values_reported_before_missing() {
        let config = ProviderConfig {
            host: ConfigValue::Unknown,
            username: ConfigValue::Absent,
            password: ConfigValue::Unknown,
        };

        let errors = resolve(&config, &env(&[])).unwrap_err();
        assert_eq!(
            attributes(&errors),
            vec![ConfigAttribute::Host, ConfigAttribute::Password]
        );
        assert!(errors.iter().all(|e| matches!(e, ConfigError::Unknown(_))));
    }

    #[test]
    fn test_missing_values() {
        let errors = resolve(&ProviderConfig::default(), &env(&[])).unwrap_err();
        assert_eq!(attributes(&errors), ConfigAttribute::ALL.to_vec());
        assert!(errors.iter().all(|e| matches!(e, ConfigError::Missing(_))));
    }

    #[test]
    fn test_missing_single_value() {
        for attr in ConfigAttribute::ALL {
            let mut config = full_config();
            match attr {
                ConfigAttribute::Host => config.host = ConfigValue::Absent,
                ConfigAttribute::Username => config.username = ConfigValue::Absent,
                ConfigAttribute::Password => config.password = ConfigValue::Absent,
            }

            let errors = resolve(&config, &env(&[(attr.env_var(), "")])).unwrap_err();
            assert_eq!(attributes(&errors), vec![attr]);
        }
    }

    #[test]
    fn test_env_fallback() {
        let config = ProviderConfig {
            host: ConfigValue::present("https://api.example.com"),
            username: ConfigValue::Absent,
            password: ConfigValue::present("secret"),
        };

        let resolved = resolve(&config, &env(&[(USERNAME_ENV, "alice")])).unwrap();
        assert_eq!(resolved.host, "https://api.example.com");
        assert_eq!(resolved.username, "alice");
        assert_eq!(resolved.password.expose(), "secret");
    }

    #[test]
    fn test_config_overrides_env() {
        let resolved = resolve(
            &full_config(),
            &env(&[
                (HOST_ENV, "https://env.example.com"),
                (USERNAME_ENV, "bob"),
                (PASSWORD_ENV, "env-secret"),
            ]),
        )
        .unwrap();

        assert_eq!(resolved.host, "https://api.example.com");
        assert_eq!(resolved.username, "alice");
        assert_eq!(resolved.password.expose(), "secret");
    }

    #[test]
    fn test_explicit_empty_value_overrides_env() {
        let mut config = full_config();
        config.username = ConfigValue::present("");

        let errors = resolve(&config, &env(&[(USERNAME_ENV, "bob")])).unwrap_err();
        assert_eq!(attributes(&errors), vec![ConfigAttribute::Username]);
    }

    #[test]
    fn test_configure_client_success() {
        let client = configure_client(&full_config(), &env(&[])).unwrap();
        assert_eq!(client.base_url().as_str(), "https://api.example.com/");
        assert_eq!(client.username(), "alice");
    }

    #[test]
    fn test_configure_client_empty_config_and_env() {
        let diagnostics = configure_client(&ProviderConfig::default(), &env(&[])).unwrap_err();
        assert_eq!(diagnostics.len(), 3);
        let summaries: Vec<_> = diagnostics.iter().map(|d| d.summary.as_str()).collect();
        assert_eq!(
            summaries,
            vec![
                "Missing fsd API Host",
                "Missing fsd API Username",
                "Missing fsd API Password"
            ]
        );
    }

    #[test]
    fn test_configure_client_malformed_host() {
        let mut config = full_config();
        config.host = ConfigValue::present("api.example.com:19090");

        let diagnostics = configure_client(&config, &env(&[])).unwrap_err();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].summary, "Unable to Create fsd API Client");
        assert!(diagnostics[0].attribute.is_none());
    }

    #[test]
    fn test_configured_event_carries_context() {
        let capture = LogCapture::new();
        capture.run(|| configure_client(&full_config(), &env(&[])).unwrap());

        let output = capture.contents();
        let configured = output
            .lines()
            .find(|line| line.contains("Configured fsd client"))
            .unwrap();
        assert!(configured.contains("fsd_host=https://api.example.com"));
        assert!(configured.contains("fsd_username=alice"));
        assert!(configured.contains("fsd_password=***"));
        assert!(configured.contains("success=true"));
    }

    #[test]
    fn test_password_never_logged() {
        let capture = LogCapture::new();
        capture.run(|| {
            configure_client(&full_config(), &env(&[])).unwrap();

            let mut bad_host = full_config();
            bad_host.host = ConfigValue::present("ftp://api.example.com");
            configure_client(&bad_host, &env(&[])).unwrap_err();
        });

        let output = capture.contents();
        assert!(output.contains("Creating fsd client"));
        assert!(output.contains("Configured fsd client"));
        assert!(output.contains("fsd_username=alice"));
        assert!(output.contains("fsd_password=***"));
        assert!(!output.contains("secret"));
    }

    #[test]
    fn test_password_from_env_never_logged() {
        let config = ProviderConfig {
            host: ConfigValue::present("https://api.example.com"),
            username: ConfigValue::present("alice"),
            password: ConfigValue::Absent,
        };
        let capture = LogCapture::new();
        capture.run(|| {
            configure_client(&config, &env(&[(PASSWORD_ENV, "from-the-env")])).unwrap();
        });
        assert!(!capture.contents().contains("from-the-env"));
    }

    #[test]
    fn test_from_json() {
        let config = ProviderConfig::from_json(&json!({
            "host": "https://api.example.com",
            "username": null,
            "password": {"unknown": true}
        }))
        .unwrap();

        assert_eq!(config.host, ConfigValue::present("https://api.example.com"));
        assert_eq!(config.username, ConfigValue::Absent);
        assert_eq!(config.password, ConfigValue::Unknown);

        assert_eq!(
            ProviderConfig::from_json(&Value::Null).unwrap(),
            ProviderConfig::default()
        );
        assert!(ProviderConfig::from_json(&json!({"host": 1})).is_err());
        assert!(ProviderConfig::from_json(&json!("host")).is_err());
    }

    #[test]
    fn test_schema_marks_password_sensitive() {
        let schema = ProviderConfig::schema();
        for attr in ConfigAttribute::ALL {
            let attribute = &schema.block.attributes[attr.name()];
            assert!(attribute.flags.optional);
            assert!(attribute
                .description
                .as_deref()
                .unwrap()
                .contains(attr.env_var()));
        }
        assert!(schema.block.attributes["password"].flags.sensitive);
        assert!(!schema.block.attributes["host"].flags.sensitive);
    }
}
