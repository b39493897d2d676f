//! One argument per configuration key, each backed by its environment
//! variable.

use crate::saml::{keys, ConfigSnapshot, FallbackPolicy};
use clap::{Arg, ArgMatches, Command};

pub const ARG_DEFAULT_BINDING_SCOPE: &str = "default-binding-scope";

/// `(argument id, environment variable, help)`
pub const CONFIG_ARGS: [(&str, &str, &str); 17] = [
    ("base-url", keys::BASE_URL, "IdP base URL, prefixed onto relative binding paths"),
    ("entity-id", keys::ENTITY_ID, "IdP entity id (defaults to the base URL)"),
    ("default-binding", keys::DEFAULT_BINDING, "Fallback path or URL for unconfigured bindings"),
    ("sso-post", keys::SSO_HTTP_POST, "SingleSignOnService HTTP-POST path or URL"),
    ("sso-redirect", keys::SSO_HTTP_REDIRECT, "SingleSignOnService HTTP-Redirect path or URL"),
    ("sso-soap", keys::SSO_SOAP, "SingleSignOnService SOAP path or URL (also ArtifactResolutionService)"),
    ("sso-artifact", keys::SSO_HTTP_ARTIFACT, "SingleSignOnService HTTP-Artifact path or URL"),
    ("slo-post", keys::SLO_HTTP_POST, "SingleLogoutService HTTP-POST path or URL"),
    ("slo-redirect", keys::SLO_HTTP_REDIRECT, "SingleLogoutService HTTP-Redirect path or URL"),
    ("slo-soap", keys::SLO_SOAP, "SingleLogoutService SOAP path or URL"),
    ("slo-artifact", keys::SLO_HTTP_ARTIFACT, "SingleLogoutService HTTP-Artifact path or URL"),
    ("sign-auth", keys::SIGN_AUTH, "Require signed AuthnRequests: true/false (default: true)"),
    ("signature-algorithm", keys::SIGNATURE_ALGORITHM, "Signature algorithm URI (default: rsa-sha256)"),
    ("cert-encrypt", keys::CERT_ENCRYPT, "Certificate is used for encryption: true/false (default: false)"),
    ("cert-signing", keys::CERT_SIGNING, "Certificate is used for signing: true/false (default: false)"),
    ("cert-type", keys::CERT_TYPE, "Key type (default: X509Certificate)"),
    ("cert", keys::CERT, "Certificate material, copied verbatim"),
];

#[must_use]
pub fn with_args(command: Command) -> Command {
    let command = CONFIG_ARGS
        .iter()
        .fold(command, |command, &(id, env, help)| {
            command.arg(Arg::new(id).long(id).help(help).env(env))
        });

    command.arg(
        Arg::new(ARG_DEFAULT_BINDING_SCOPE)
            .long(ARG_DEFAULT_BINDING_SCOPE)
            .help("Slots the default binding applies to: uniform, redirect-only, sso-only, disabled")
            .env("SIMPLESAMLPHP_IDP_DEFAULT_BINDING_SCOPE")
            .default_value(FallbackPolicy::default().name())
            .value_parser(|s: &str| s.parse::<FallbackPolicy>()),
    )
}

/// Build the configuration snapshot from parsed arguments.
#[must_use]
pub fn snapshot(matches: &ArgMatches) -> ConfigSnapshot {
    CONFIG_ARGS
        .iter()
        .filter_map(|&(id, key, _)| matches.get_one::<String>(id).map(|value| (key, value.clone())))
        .collect()
}

#[must_use]
pub fn policy(matches: &ArgMatches) -> FallbackPolicy {
    matches
        .get_one::<FallbackPolicy>(ARG_DEFAULT_BINDING_SCOPE)
        .copied()
        .unwrap_or_default()
}
