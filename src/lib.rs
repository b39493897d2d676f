//! # idp-metadata
//!
//! Resolves the SAML2 metadata of a *remote* Identity Provider from a flat set
//! of configuration values (usually environment variables) and renders it in
//! the shape a SAML metadata store loads (`saml20-idp-remote`).
//!
//! The interesting part is the binding resolution: eight endpoint slots
//! (four SSO bindings, four SLO bindings) each walk the same fallback chain:
//!
//! 1. the slot's own key,
//! 2. for logout slots, the matching single sign-on key,
//! 3. the global default binding.
//!
//! Relative values are appended to the IdP base URL; values starting with
//! `http` are kept as-is. Slots that resolve to nothing are left out of the
//! output instead of being emitted with an empty `Location`.
//!
//! ```
//! use idp_metadata::saml::{ConfigSnapshot, RemoteIdpMetadata, keys};
//!
//! let config = ConfigSnapshot::default()
//!     .with(keys::BASE_URL, "https://idp.example/saml")
//!     .with(keys::SSO_HTTP_REDIRECT, "/sso/redirect");
//!
//! let metadata = RemoteIdpMetadata::resolve(&config).unwrap();
//! assert_eq!(metadata.entity_id(), "https://idp.example/saml");
//! assert_eq!(
//!     metadata.single_sign_on_services()[0].location,
//!     "https://idp.example/saml/sso/redirect"
//! );
//! ```

pub mod cli;
pub mod saml;

pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

/// Short git commit of the build, or `unknown` outside a git checkout.
#[must_use]
pub fn git_commit_hash() -> &'static str {
    built_info::GIT_COMMIT_HASH_SHORT.unwrap_or("unknown")
}
