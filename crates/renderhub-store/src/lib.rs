//! # RenderHub Store
//!
//! Durable storage for RenderHub configuration records.
//!
//! Records are JSON documents kept in a blob store, one container per entity
//! type, one blob per record name. This crate provides:
//!
//! - [`BlobStore`] - the async key/value contract, with an in-memory
//!   ([`MemoryBlobStore`]) and a filesystem ([`FsBlobStore`]) implementation
//! - [`ConfigRepository`] - typed record access on top of a store, implemented
//!   by [`BlobConfigRepository`]
//! - [`SecretsRepository`] - a decorator moving credentials into a [`SecretVault`],
//!   in memory ([`MemorySecretVault`]) or persisted in a store ([`BlobSecretVault`])
//!
//! A missing record is always reported as `Ok(None)` / `Ok(false)`, never as
//! an error.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use renderhub_core::InstallationPackage;
//! use renderhub_store::{BlobConfigRepository, ConfigRepository, MemoryBlobStore};
//!
//! let store = Arc::new(MemoryBlobStore::new());
//! let packages = BlobConfigRepository::<InstallationPackage>::new(store, "packages");
//!
//! let names = packages.list().await?;
//! ```

pub mod blob;
pub mod fs;
pub mod memory;
pub mod repository;
pub mod secrets;

// Re-exports
pub use blob::BlobStore;
pub use fs::FsBlobStore;
pub use memory::MemoryBlobStore;
pub use repository::{BlobConfigRepository, ConfigRepository};
pub use secrets::{BlobSecretVault, MemorySecretVault, SecretVault, SecretsRepository};

// Re-export renderhub_core for consumers
pub use renderhub_core;
