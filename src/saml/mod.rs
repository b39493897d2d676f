//! Remote IdP metadata resolution.

pub mod binding;
pub mod config;
pub mod error;
pub mod metadata;
pub mod render;

pub use binding::{qualify, Binding, BindingSlot, FallbackPolicy, ResolvedSlot, Resolver, Service};
pub use config::{keys, parse_bool, ConfigSnapshot, ConfigSource};
pub use error::Error;
pub use metadata::{Endpoint, IndexedEndpoint, KeyDescriptor, MetadataSet, RemoteIdpMetadata};
pub use render::{render, Format};
