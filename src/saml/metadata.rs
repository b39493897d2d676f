//! Remote IdP metadata record.
//!
//! Serialized field names follow the `saml20-idp-remote` metadata set
//! (`entityid`, `SingleSignOnService`, `sign.authnrequest`, ...), so the JSON
//! (or PHP) output can be loaded by a SAML metadata store without remapping.

use crate::saml::{
    binding::{Binding, FallbackPolicy, ResolvedSlot, Resolver, Service},
    config::{keys, ConfigSnapshot},
    error::Error,
};
use serde::{ser::SerializeMap, Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::{debug, info};

pub const METADATA_SET: &str = "saml20-idp-remote";

pub const DEFAULT_SIGNATURE_ALGORITHM: &str = "http://www.w3.org/2001/04/xmldsig-more#rsa-sha256";

pub const DEFAULT_CERT_TYPE: &str = "X509Certificate";

pub const NAME_ID_FORMATS: [&str; 4] = [
    "urn:oasis:names:tc:SAML:2.0:nameid-format:persistent",
    "urn:oasis:names:tc:SAML:2.0:nameid-format:transient",
    "urn:oasis:names:tc:SAML:1.1:nameid-format:unspecified",
    "urn:oasis:names:tc:SAML:1.1:nameid-format:emailAddress",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoint {
    #[serde(rename = "Binding")]
    pub binding: Binding,
    #[serde(rename = "Location")]
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexedEndpoint {
    #[serde(rename = "Binding")]
    pub binding: Binding,
    #[serde(rename = "Location")]
    pub location: String,
    pub index: u32,
}

/// Signing/encryption key descriptor, copied verbatim from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyDescriptor {
    pub encryption: bool,
    pub signing: bool,
    #[serde(rename = "type")]
    pub key_type: String,
    #[serde(rename = "X509Certificate")]
    pub certificate: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteIdpMetadata {
    #[serde(rename = "entityid")]
    entity_id: String,
    // always empty, the key is kept for store compatibility
    contacts: Vec<Map<String, Value>>,
    #[serde(rename = "metadata-set")]
    metadata_set: &'static str,
    #[serde(rename = "sign.authnrequest")]
    sign_authn_request: bool,
    #[serde(rename = "SingleSignOnService")]
    single_sign_on_services: Vec<Endpoint>,
    #[serde(rename = "SingleLogoutService")]
    single_logout_services: Vec<Endpoint>,
    #[serde(rename = "ArtifactResolutionService")]
    artifact_resolution_services: Vec<IndexedEndpoint>,
    #[serde(rename = "NameIDFormats")]
    name_id_formats: Vec<&'static str>,
    #[serde(rename = "signature.algorithm")]
    signature_algorithm: String,
    keys: Vec<KeyDescriptor>,
}

/// Ordered endpoint list builder: pushes a slot only when it resolved.
#[derive(Debug, Default)]
struct EndpointList {
    endpoints: Vec<Endpoint>,
}

impl EndpointList {
    fn push(&mut self, resolved: &ResolvedSlot) {
        if let Some(location) = &resolved.location {
            self.endpoints.push(Endpoint {
                binding: resolved.slot.binding,
                location: location.clone(),
            });
        }
    }

    fn build(self) -> Vec<Endpoint> {
        self.endpoints
    }
}

/// Explicit entity id, otherwise the base URL.
///
/// # Errors
/// Returns [`Error::MissingEntityId`] if neither is configured.
pub fn entity_id(config: &ConfigSnapshot) -> Result<&str, Error> {
    config
        .value(keys::ENTITY_ID)
        .or_else(|| config.value(keys::BASE_URL))
        .ok_or(Error::MissingEntityId)
}

impl RemoteIdpMetadata {
    /// Resolve with the default (uniform) fallback policy.
    ///
    /// # Errors
    /// Returns [`Error::MissingEntityId`] if neither the entity id nor the base
    /// URL is configured.
    pub fn resolve(config: &ConfigSnapshot) -> Result<Self, Error> {
        Self::resolve_with(config, FallbackPolicy::default())
    }

    /// # Errors
    /// Returns [`Error::MissingEntityId`] if neither the entity id nor the base
    /// URL is configured.
    pub fn resolve_with(config: &ConfigSnapshot, policy: FallbackPolicy) -> Result<Self, Error> {
        let entity_id = entity_id(config)?.to_string();

        let mut sso = EndpointList::default();
        let mut slo = EndpointList::default();
        let mut artifact_resolution = Vec::new();

        for resolved in Resolver::with_policy(config, policy).resolve_all() {
            match resolved.slot.service {
                Service::SingleSignOn => {
                    // Artifact resolution shares the SOAP single sign-on location.
                    if let (Binding::Soap, Some(location)) =
                        (resolved.slot.binding, &resolved.location)
                    {
                        artifact_resolution.push(IndexedEndpoint {
                            binding: Binding::Soap,
                            location: location.clone(),
                            index: 0,
                        });
                    }
                    sso.push(&resolved);
                }
                Service::SingleLogout => slo.push(&resolved),
            }
        }

        let metadata = Self {
            entity_id,
            contacts: Vec::new(),
            metadata_set: METADATA_SET,
            sign_authn_request: config.flag(keys::SIGN_AUTH, true),
            single_sign_on_services: sso.build(),
            single_logout_services: slo.build(),
            artifact_resolution_services: artifact_resolution,
            name_id_formats: NAME_ID_FORMATS.to_vec(),
            signature_algorithm: config
                .value_or(keys::SIGNATURE_ALGORITHM, DEFAULT_SIGNATURE_ALGORITHM)
                .to_string(),
            keys: vec![KeyDescriptor {
                encryption: config.flag(keys::CERT_ENCRYPT, false),
                signing: config.flag(keys::CERT_SIGNING, false),
                key_type: config.value_or(keys::CERT_TYPE, DEFAULT_CERT_TYPE).to_string(),
                certificate: config.value_or(keys::CERT, "").to_string(),
            }],
        };

        debug!(?metadata, "assembled remote idp metadata");
        info!(
            entity_id = %metadata.entity_id,
            policy = policy.name(),
            sso = metadata.single_sign_on_services.len(),
            slo = metadata.single_logout_services.len(),
            "resolved remote idp metadata"
        );

        Ok(metadata)
    }

    #[must_use]
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    #[must_use]
    pub fn single_sign_on_services(&self) -> &[Endpoint] {
        &self.single_sign_on_services
    }

    #[must_use]
    pub fn single_logout_services(&self) -> &[Endpoint] {
        &self.single_logout_services
    }

    #[must_use]
    pub fn artifact_resolution_services(&self) -> &[IndexedEndpoint] {
        &self.artifact_resolution_services
    }

    #[must_use]
    pub fn name_id_formats(&self) -> &[&'static str] {
        &self.name_id_formats
    }

    #[must_use]
    pub fn sign_authn_request(&self) -> bool {
        self.sign_authn_request
    }

    #[must_use]
    pub fn signature_algorithm(&self) -> &str {
        &self.signature_algorithm
    }

    #[must_use]
    pub fn keys(&self) -> &[KeyDescriptor] {
        &self.keys
    }

    /// True if no SSO, SLO or artifact resolution endpoint resolved.
    #[must_use]
    pub fn has_no_endpoints(&self) -> bool {
        self.single_sign_on_services.is_empty()
            && self.single_logout_services.is_empty()
            && self.artifact_resolution_services.is_empty()
    }

    /// The record keyed by its entity id, as a metadata store expects it.
    #[must_use]
    pub fn metadata_set(&self) -> MetadataSet<'_> {
        MetadataSet(self)
    }
}

/// `{ "<entityid>": { ...record... } }`
#[derive(Debug, Clone, Copy)]
pub struct MetadataSet<'a>(pub &'a RemoteIdpMetadata);

impl Serialize for MetadataSet<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(self.0.entity_id(), self.0)?;
        map.end()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    const BASE: &str = "https://idp.example/saml";

    fn locations(endpoints: &[Endpoint]) -> Vec<(Binding, &str)> {
        endpoints
            .iter()
            .map(|e| (e.binding, e.location.as_str()))
            .collect()
    }

    #[test]
    fn test_entity_id_precedence() {
        let config = ConfigSnapshot::default()
            .with(keys::BASE_URL, BASE)
            .with(keys::ENTITY_ID, "urn:idp:example");
        assert_eq!(entity_id(&config).unwrap(), "urn:idp:example");

        let config = ConfigSnapshot::default().with(keys::BASE_URL, BASE);
        assert_eq!(entity_id(&config).unwrap(), BASE);

        let config = ConfigSnapshot::default().with(keys::SSO_HTTP_POST, "https://idp/post");
        assert!(matches!(entity_id(&config), Err(Error::MissingEntityId)));
    }

    #[test]
    fn test_missing_entity_id() {
        let result = RemoteIdpMetadata::resolve(&ConfigSnapshot::default());
        assert!(matches!(result, Err(Error::MissingEntityId)));
    }

    #[test]
    fn test_fixed_binding_order() {
        let config = ConfigSnapshot::default()
            .with(keys::BASE_URL, BASE)
            .with(keys::SSO_HTTP_ARTIFACT, "/artifact")
            .with(keys::SSO_SOAP, "/soap")
            .with(keys::SSO_HTTP_REDIRECT, "/redirect")
            .with(keys::SSO_HTTP_POST, "/post");

        let metadata = RemoteIdpMetadata::resolve(&config).unwrap();
        let expected = vec![
            (Binding::HttpPost, "https://idp.example/saml/post"),
            (Binding::HttpRedirect, "https://idp.example/saml/redirect"),
            (Binding::Soap, "https://idp.example/saml/soap"),
            (Binding::HttpArtifact, "https://idp.example/saml/artifact"),
        ];
        assert_eq!(locations(metadata.single_sign_on_services()), expected);
        // every logout slot falls back to its sso sibling
        assert_eq!(locations(metadata.single_logout_services()), expected);
    }

    #[test]
    fn test_no_bindings_is_not_an_error() {
        let config = ConfigSnapshot::default().with(keys::BASE_URL, BASE);
        let metadata = RemoteIdpMetadata::resolve(&config).unwrap();
        assert!(metadata.has_no_endpoints());
        assert_eq!(metadata.entity_id(), BASE);
    }

    #[test]
    fn test_artifact_resolution_follows_sso_soap() {
        let config = ConfigSnapshot::default()
            .with(keys::BASE_URL, BASE)
            .with(keys::SLO_SOAP, "/slo/soap");
        let metadata = RemoteIdpMetadata::resolve(&config).unwrap();
        assert_eq!(
            locations(metadata.single_logout_services()),
            vec![(Binding::Soap, "https://idp.example/saml/slo/soap")]
        );
        assert!(metadata.artifact_resolution_services().is_empty());

        let config = config.with(keys::SSO_SOAP, "/soap");
        let metadata = RemoteIdpMetadata::resolve(&config).unwrap();
        assert_eq!(
            metadata.artifact_resolution_services(),
            &[IndexedEndpoint {
                binding: Binding::Soap,
                location: "https://idp.example/saml/soap".to_string(),
                index: 0,
            }]
        );
    }

    #[test]
    fn test_artifact_resolution_from_default_binding() {
        let config = ConfigSnapshot::default()
            .with(keys::BASE_URL, BASE)
            .with(keys::DEFAULT_BINDING, "/idp");

        let metadata = RemoteIdpMetadata::resolve(&config).unwrap();
        assert_eq!(metadata.artifact_resolution_services().len(), 1);

        let metadata =
            RemoteIdpMetadata::resolve_with(&config, FallbackPolicy::RedirectOnly).unwrap();
        assert!(metadata.artifact_resolution_services().is_empty());
        assert_eq!(
            locations(metadata.single_sign_on_services()),
            vec![(Binding::HttpRedirect, "https://idp.example/saml/idp")]
        );
    }

    #[test]
    fn test_signing_defaults() {
        let config = ConfigSnapshot::default().with(keys::BASE_URL, BASE);
        let metadata = RemoteIdpMetadata::resolve(&config).unwrap();

        assert!(metadata.sign_authn_request());
        assert_eq!(metadata.signature_algorithm(), DEFAULT_SIGNATURE_ALGORITHM);
        assert_eq!(
            metadata.keys(),
            &[KeyDescriptor {
                encryption: false,
                signing: false,
                key_type: DEFAULT_CERT_TYPE.to_string(),
                certificate: String::new(),
            }]
        );
        assert_eq!(metadata.name_id_formats(), &NAME_ID_FORMATS);
    }

    #[test]
    fn test_signing_from_config() {
        let config = ConfigSnapshot::default()
            .with(keys::BASE_URL, BASE)
            .with(keys::SIGN_AUTH, "off")
            .with(
                keys::SIGNATURE_ALGORITHM,
                "http://www.w3.org/2001/04/xmldsig-more#rsa-sha512",
            )
            .with(keys::CERT_ENCRYPT, "yes")
            .with(keys::CERT_SIGNING, "1")
            .with(keys::CERT_TYPE, "X509")
            .with(keys::CERT, "MIIC...AB");
        let metadata = RemoteIdpMetadata::resolve(&config).unwrap();

        assert!(!metadata.sign_authn_request());
        assert_eq!(
            metadata.signature_algorithm(),
            "http://www.w3.org/2001/04/xmldsig-more#rsa-sha512"
        );
        assert_eq!(
            metadata.keys(),
            &[KeyDescriptor {
                encryption: true,
                signing: true,
                key_type: "X509".to_string(),
                certificate: "MIIC...AB".to_string(),
            }]
        );
    }

    #[test]
    fn test_unparseable_sign_auth_uses_default() {
        let config = ConfigSnapshot::default()
            .with(keys::BASE_URL, BASE)
            .with(keys::SIGN_AUTH, "sometimes");
        let metadata = RemoteIdpMetadata::resolve(&config).unwrap();
        assert!(metadata.sign_authn_request());
    }

    #[test]
    fn test_serialized_shape() {
        let config = ConfigSnapshot::default()
            .with(keys::BASE_URL, BASE)
            .with(keys::SSO_SOAP, "https://idp.example/soap")
            .with(keys::CERT, "MIIC");
        let metadata = RemoteIdpMetadata::resolve(&config).unwrap();

        let value = serde_json::to_value(metadata.metadata_set()).unwrap();
        let expected = json!({
            BASE: {
                "entityid": BASE,
                "contacts": [],
                "metadata-set": "saml20-idp-remote",
                "sign.authnrequest": true,
                "SingleSignOnService": [
                    {
                        "Binding": "urn:oasis:names:tc:SAML:2.0:bindings:SOAP",
                        "Location": "https://idp.example/soap",
                    },
                ],
                "SingleLogoutService": [
                    {
                        "Binding": "urn:oasis:names:tc:SAML:2.0:bindings:SOAP",
                        "Location": "https://idp.example/soap",
                    },
                ],
                "ArtifactResolutionService": [
                    {
                        "Binding": "urn:oasis:names:tc:SAML:2.0:bindings:SOAP",
                        "Location": "https://idp.example/soap",
                        "index": 0,
                    },
                ],
                "NameIDFormats": NAME_ID_FORMATS,
                "signature.algorithm": DEFAULT_SIGNATURE_ALGORITHM,
                "keys": [
                    {
                        "encryption": false,
                        "signing": false,
                        "type": "X509Certificate",
                        "X509Certificate": "MIIC",
                    },
                ],
            }
        });
        assert_eq!(value, expected);

        let record = serde_json::to_value(&metadata).unwrap();
        let Value::Object(fields) = record else {
            panic!("record must serialize to an object");
        };
        for name in [
            "entityid",
            "SingleSignOnService",
            "SingleLogoutService",
            "ArtifactResolutionService",
            "NameIDFormats",
            "sign.authnrequest",
            "signature.algorithm",
            "keys",
        ] {
            assert!(fields.contains_key(name), "{name}");
        }
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let config = ConfigSnapshot::default()
            .with(keys::BASE_URL, BASE)
            .with(keys::DEFAULT_BINDING, "/idp")
            .with(keys::SLO_HTTP_POST, "https://logout.example/post");

        let first = serde_json::to_string(&RemoteIdpMetadata::resolve(&config).unwrap()).unwrap();
        let second = serde_json::to_string(&RemoteIdpMetadata::resolve(&config).unwrap()).unwrap();
        assert_eq!(first, second);
    }
}
