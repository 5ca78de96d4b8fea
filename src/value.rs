//! Configuration values as seen by the provider.
//!
//! The host may hand the provider a value that is not known yet (for example
//! one derived from another resource's computed output). [`ConfigValue`]
//! keeps that state explicit instead of folding it into `null` or an empty
//! string.

use std::fmt;

use serde_json::Value;

/// Key of the JSON object the host uses to mark a deferred value.
///
/// A deferred value is encoded as `{"unknown": true}`.
pub const UNKNOWN_MARKER: &str = "unknown";

/// A single configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConfigValue {
    /// The value will only be known after other resources are applied.
    Unknown,
    /// The attribute was omitted or set to `null`.
    #[default]
    Absent,
    /// The attribute was set explicitly.
    Present(String),
}

impl ConfigValue {
    /// Create a present value.
    pub fn present(value: impl Into<String>) -> Self {
        Self::Present(value.into())
    }

    /// Returns `true` if the value is deferred.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Decode a string attribute from its JSON form.
    ///
    /// Returns `None` when the JSON value is neither `null`, a string, nor
    /// the unknown marker.
    pub fn from_json(value: Option<&Value>) -> Option<Self> {
        match value {
            None | Some(Value::Null) => Some(Self::Absent),
            Some(Value::String(s)) => Some(Self::Present(s.clone())),
            Some(v) if is_unknown_marker(v) => Some(Self::Unknown),
            Some(_) => None,
        }
    }
}

/// Returns `true` if `value` is the host's marker for a deferred value.
pub fn is_unknown_marker(value: &Value) -> bool {
    match value {
        Value::Object(map) => {
            map.len() == 1 && map.get(UNKNOWN_MARKER) == Some(&Value::Bool(true))
        },
        _ => false,
    }
}

/// The JSON encoding of a deferred value.
pub fn unknown_marker() -> Value {
    serde_json::json!({ UNKNOWN_MARKER: true })
}

/// Wraps a secret so it never shows up in logs or debug output.
///
/// Both `Debug` and `Display` print `***`. Use [`Sensitive::expose`] to read
/// the inner value.
#[derive(Clone, PartialEq, Eq)]
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    /// Wrap a secret value.
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Borrow the secret value.
    pub fn expose(&self) -> &T {
        &self.0
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_states() {
        assert_eq!(ConfigValue::from_json(None), Some(ConfigValue::Absent));
        assert_eq!(
            ConfigValue::from_json(Some(&Value::Null)),
            Some(ConfigValue::Absent)
        );
        assert_eq!(
            ConfigValue::from_json(Some(&json!("https://api.example.com"))),
            Some(ConfigValue::present("https://api.example.com"))
        );
        assert_eq!(
            ConfigValue::from_json(Some(&unknown_marker())),
            Some(ConfigValue::Unknown)
        );
    }

    #[test]
    fn test_from_json_rejects_other_types() {
        assert_eq!(ConfigValue::from_json(Some(&json!(42))), None);
        assert_eq!(ConfigValue::from_json(Some(&json!({"unknown": false}))), None);
        assert_eq!(
            ConfigValue::from_json(Some(&json!({"unknown": true, "extra": 1}))),
            None
        );
    }

    #[test]
    fn test_empty_string_is_present() {
        let value = ConfigValue::from_json(Some(&json!(""))).unwrap();
        assert_eq!(value, ConfigValue::present(""));
    }

    #[test]
    fn test_sensitive_redacts() {
        let secret = Sensitive::new("hunter2".to_string());
        assert_eq!(format!("{}", secret), "***");
        assert_eq!(format!("{:?}", secret), "***");
        assert_eq!(secret.expose(), "hunter2");
    }
}
