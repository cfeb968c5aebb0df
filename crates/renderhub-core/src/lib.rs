//! RenderHub Core - Domain types and traits
//!
//! This crate provides the foundational types shared by the RenderHub
//! configuration store and its caching layer:
//!
//! - [`StoreError`] - the error type every storage operation returns
//! - [`codec`] - JSON encoding of persisted records
//! - [`entity`] - the persisted entity types (environments, asset repositories, packages)
//! - [`secrets`] - statically declared secret-bearing fields

pub mod codec;
pub mod entity;
pub mod error;
pub mod names;
pub mod secrets;

pub use entity::{
    AssetRepository, AssetRepositoryKind, ConfigEntity, EnvironmentState, InstallationPackage,
    InstallationPackageType, RenderManagerType, RenderingEnvironment,
};
pub use error::{Result, StoreError};
pub use secrets::{SecretBearing, SecretVisitor};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
