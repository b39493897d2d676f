//! Binding resolver.
//!
//! Eight endpoint slots, `{SingleSignOn, SingleLogout} x {POST, Redirect, SOAP,
//! Artifact}`, each resolved through the same chain, first non-empty wins:
//!
//! 1. the slot's own key,
//! 2. for logout slots, the single sign-on key of the same binding,
//! 3. the default binding, subject to the [`FallbackPolicy`].
//!
//! The resolved raw value is then qualified against the IdP base URL.

use crate::saml::config::{keys, ConfigSnapshot};
use serde::Serialize;
use std::fmt;
use tracing::{debug, trace};

/// SAML protocol binding (transport).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Binding {
    #[serde(rename = "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST")]
    HttpPost,
    #[serde(rename = "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect")]
    HttpRedirect,
    #[serde(rename = "urn:oasis:names:tc:SAML:2.0:bindings:SOAP")]
    Soap,
    #[serde(rename = "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Artifact")]
    HttpArtifact,
}

impl Binding {
    /// Output order for endpoint lists.
    pub const ALL: [Binding; 4] = [
        Binding::HttpPost,
        Binding::HttpRedirect,
        Binding::Soap,
        Binding::HttpArtifact,
    ];

    #[must_use]
    pub const fn uri(self) -> &'static str {
        match self {
            Self::HttpPost => "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST",
            Self::HttpRedirect => "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect",
            Self::Soap => "urn:oasis:names:tc:SAML:2.0:bindings:SOAP",
            Self::HttpArtifact => "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Artifact",
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.uri())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    SingleSignOn,
    SingleLogout,
}

/// One resolvable endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BindingSlot {
    pub service: Service,
    pub binding: Binding,
}

impl BindingSlot {
    #[must_use]
    pub const fn new(service: Service, binding: Binding) -> Self {
        Self { service, binding }
    }

    /// All eight slots: single sign-on first, then logout, each in
    /// [`Binding::ALL`] order.
    pub fn all() -> impl Iterator<Item = BindingSlot> {
        [Service::SingleSignOn, Service::SingleLogout]
            .into_iter()
            .flat_map(|service| {
                Binding::ALL
                    .into_iter()
                    .map(move |binding| Self::new(service, binding))
            })
    }

    #[must_use]
    pub const fn primary_key(self) -> &'static str {
        match (self.service, self.binding) {
            (Service::SingleSignOn, Binding::HttpPost) => keys::SSO_HTTP_POST,
            (Service::SingleSignOn, Binding::HttpRedirect) => keys::SSO_HTTP_REDIRECT,
            (Service::SingleSignOn, Binding::Soap) => keys::SSO_SOAP,
            (Service::SingleSignOn, Binding::HttpArtifact) => keys::SSO_HTTP_ARTIFACT,
            (Service::SingleLogout, Binding::HttpPost) => keys::SLO_HTTP_POST,
            (Service::SingleLogout, Binding::HttpRedirect) => keys::SLO_HTTP_REDIRECT,
            (Service::SingleLogout, Binding::Soap) => keys::SLO_SOAP,
            (Service::SingleLogout, Binding::HttpArtifact) => keys::SLO_HTTP_ARTIFACT,
        }
    }

    /// For logout slots, the key of the single sign-on slot with the same
    /// binding.
    #[must_use]
    pub const fn sibling_key(self) -> Option<&'static str> {
        match self.service {
            Service::SingleSignOn => None,
            Service::SingleLogout => {
                Some(Self::new(Service::SingleSignOn, self.binding).primary_key())
            }
        }
    }
}

/// Which slots the default binding (step 3) applies to.
///
/// Steps 1 and 2 are the same under every policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackPolicy {
    /// Every slot still unresolved after steps 1 and 2.
    #[default]
    Uniform,
    /// Only HTTP-Redirect slots.
    RedirectOnly,
    /// Only single sign-on slots; logout slots never use the default.
    SingleSignOnOnly,
    /// Never.
    Disabled,
}

impl FallbackPolicy {
    #[must_use]
    pub const fn applies_to(self, slot: BindingSlot) -> bool {
        match self {
            Self::Uniform => true,
            Self::RedirectOnly => matches!(slot.binding, Binding::HttpRedirect),
            Self::SingleSignOnOnly => matches!(slot.service, Service::SingleSignOn),
            Self::Disabled => false,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Uniform => "uniform",
            Self::RedirectOnly => "redirect-only",
            Self::SingleSignOnOnly => "sso-only",
            Self::Disabled => "disabled",
        }
    }
}

impl std::str::FromStr for FallbackPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uniform" | "all" => Ok(Self::Uniform),
            "redirect-only" | "redirect" => Ok(Self::RedirectOnly),
            "sso-only" | "sso" => Ok(Self::SingleSignOnOnly),
            "disabled" | "none" => Ok(Self::Disabled),
            other => Err(format!("invalid default binding scope: {other}")),
        }
    }
}

/// Where a slot's raw value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Primary,
    Sibling,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSlot {
    pub slot: BindingSlot,
    pub origin: Option<Origin>,
    pub raw: Option<String>,
    pub location: Option<String>,
}

/// Prefix `raw` with the base URL unless it already starts with `http`.
///
/// No parsing or validation; without a base URL the value is returned as-is.
#[must_use]
pub fn qualify(raw: &str, base_url: Option<&str>) -> String {
    if raw.starts_with("http") {
        raw.to_string()
    } else {
        format!("{}{raw}", base_url.unwrap_or_default())
    }
}

/// Resolves binding slots against one configuration snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    config: &'a ConfigSnapshot,
    policy: FallbackPolicy,
}

impl<'a> Resolver<'a> {
    #[must_use]
    pub fn new(config: &'a ConfigSnapshot) -> Self {
        Self::with_policy(config, FallbackPolicy::default())
    }

    #[must_use]
    pub fn with_policy(config: &'a ConfigSnapshot, policy: FallbackPolicy) -> Self {
        Self { config, policy }
    }

    #[must_use]
    pub fn policy(&self) -> FallbackPolicy {
        self.policy
    }

    fn raw_value(&self, slot: BindingSlot) -> Option<(Origin, &'a str)> {
        if let Some(value) = self.config.value(slot.primary_key()) {
            return Some((Origin::Primary, value));
        }

        if let Some(value) = slot.sibling_key().and_then(|key| self.config.value(key)) {
            return Some((Origin::Sibling, value));
        }

        if self.policy.applies_to(slot) {
            return self
                .config
                .value(keys::DEFAULT_BINDING)
                .map(|value| (Origin::Default, value));
        }

        None
    }

    #[must_use]
    pub fn resolve_slot(&self, slot: BindingSlot) -> ResolvedSlot {
        let base_url = self.config.value(keys::BASE_URL);

        match self.raw_value(slot) {
            Some((origin, raw)) => {
                let location = qualify(raw, base_url);
                trace!(key = slot.primary_key(), ?origin, %location, "binding resolved");
                ResolvedSlot {
                    slot,
                    origin: Some(origin),
                    raw: Some(raw.to_string()),
                    location: Some(location),
                }
            }
            None => {
                debug!(key = slot.primary_key(), "binding not configured, omitted");
                ResolvedSlot {
                    slot,
                    origin: None,
                    raw: None,
                    location: None,
                }
            }
        }
    }

    /// Resolve every slot in [`BindingSlot::all`] order.
    #[must_use]
    pub fn resolve_all(&self) -> Vec<ResolvedSlot> {
        BindingSlot::all()
            .map(|slot| self.resolve_slot(slot))
            .collect()
    }
}
