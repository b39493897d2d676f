use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("missing IdP entity id: set SIMPLESAMLPHP_IDP_ENTITYID or SIMPLESAMLPHP_IDP_BASE_URL")]
    MissingEntityId,
    #[error("could not serialize metadata")]
    Serialize(#[from] serde_json::Error),
}
