//! Configuration source and the immutable snapshot the resolver reads from.
//!
//! Absent keys and keys set to the empty string are both "not provided".
//! The snapshot drops empty values when it is captured, so every lookup
//! downstream only has to deal with `Option<&str>`.

use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Canonical configuration key names (the environment variables).
pub mod keys {
    pub const BASE_URL: &str = "SIMPLESAMLPHP_IDP_BASE_URL";
    pub const ENTITY_ID: &str = "SIMPLESAMLPHP_IDP_ENTITYID";
    pub const DEFAULT_BINDING: &str = "SIMPLESAMLPHP_IDP_DEFAULT_BINDING";

    pub const SSO_HTTP_POST: &str = "SIMPLESAMLPHP_IDP_HTTP_POST_BINDING";
    pub const SSO_HTTP_REDIRECT: &str = "SIMPLESAMLPHP_IDP_HTTP_REDIRECT_BINDING";
    pub const SSO_SOAP: &str = "SIMPLESAMLPHP_IDP_SOAP_BINDING";
    pub const SSO_HTTP_ARTIFACT: &str = "SIMPLESAMLPHP_IDP_HTTP_ARTIFACT";

    pub const SLO_HTTP_POST: &str = "SIMPLESAMLPHP_IDP_LOGOUT_HTTP_POST_BINDING";
    pub const SLO_HTTP_REDIRECT: &str = "SIMPLESAMLPHP_IDP_LOGOUT_HTTP_REDIRECT_BINDING";
    pub const SLO_SOAP: &str = "SIMPLESAMLPHP_IDP_LOGOUT_SOAP_BINDING";
    pub const SLO_HTTP_ARTIFACT: &str = "SIMPLESAMLPHP_IDP_LOGOUT_HTTP_ARTIFACT";

    pub const SIGN_AUTH: &str = "SIMPLESAMLPHP_IDP_SIGN_AUTH";
    pub const SIGNATURE_ALGORITHM: &str = "SIMPLESAMLPHP_IDP_SIGNATURE_ALGORITHM";
    pub const CERT_ENCRYPT: &str = "SIMPLESAMLPHP_IDP_CERT_ENCRYPT";
    pub const CERT_SIGNING: &str = "SIMPLESAMLPHP_IDP_CERT_SIGNING";
    pub const CERT_TYPE: &str = "SIMPLESAMLPHP_IDP_CERT_TYPE";
    pub const CERT: &str = "SIMPLESAMLPHP_IDP_CERT";

    /// Every key the resolver reads, in a stable order.
    pub const ALL: [&str; 17] = [
        BASE_URL,
        ENTITY_ID,
        DEFAULT_BINDING,
        SSO_HTTP_POST,
        SSO_HTTP_REDIRECT,
        SSO_SOAP,
        SSO_HTTP_ARTIFACT,
        SLO_HTTP_POST,
        SLO_HTTP_REDIRECT,
        SLO_SOAP,
        SLO_HTTP_ARTIFACT,
        SIGN_AUTH,
        SIGNATURE_ALGORITHM,
        CERT_ENCRYPT,
        CERT_SIGNING,
        CERT_TYPE,
        CERT,
    ];
}

/// Anything that can answer "what is the value of this key".
pub trait ConfigSource {
    fn get(&self, key: &str) -> Option<String>;
}

impl ConfigSource for HashMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        HashMap::get(self, key).cloned()
    }
}

impl ConfigSource for BTreeMap<String, String> {
    fn get(&self, key: &str) -> Option<String> {
        BTreeMap::get(self, key).cloned()
    }
}

/// The process environment. Only read through [`ConfigSnapshot::from_env`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Environment;

impl ConfigSource for Environment {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

/// Immutable key/value view captured once per resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSnapshot {
    values: BTreeMap<String, String>,
}

impl ConfigSnapshot {
    /// Capture every known key from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_source(&Environment)
    }

    /// Capture every known key from `source`, dropping empty values.
    pub fn from_source<S: ConfigSource + ?Sized>(source: &S) -> Self {
        let snapshot: Self = keys::ALL
            .iter()
            .filter_map(|&key| source.get(key).map(|value| (key, value)))
            .collect();

        debug!(keys = snapshot.values.len(), "captured configuration snapshot");

        snapshot
    }

    /// Return a copy with `key` set. An empty value unsets the key.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        if value.is_empty() {
            self.values.remove(&key);
        } else {
            self.values.insert(key, value);
        }
        self
    }

    /// Non-empty value for `key`.
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Value for `key`, or `default` when not provided.
    #[must_use]
    pub fn value_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.value(key).unwrap_or(default)
    }

    /// Tri-state boolean: explicit true/false, else `default`.
    ///
    /// An unparseable value is logged and treated as unset.
    #[must_use]
    pub fn flag(&self, key: &str, default: bool) -> bool {
        let Some(raw) = self.value(key) else {
            return default;
        };

        parse_bool(raw).unwrap_or_else(|| {
            warn!(key, value = raw, default, "unrecognised boolean, using default");
            default
        })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl ConfigSource for ConfigSnapshot {
    fn get(&self, key: &str) -> Option<String> {
        self.value(key).map(ToString::to_string)
    }
}

impl<K, V> FromIterator<(K, V)> for ConfigSnapshot
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::default(), |snapshot, (k, v)| snapshot.with(k, v))
    }
}

/// Parse a boolean the way operators write them in env files.
///
/// `1 true on yes` and `0 false off no` (any case, surrounding whitespace
/// ignored). Returns `None` for anything else, including the empty string.
#[must_use]
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}
