//! # RenderHub Portal
//!
//! Configuration services of the RenderHub portal: environments, asset
//! repositories and installation packages, each behind a two-level cache.
//!
//! [`Portal::build`] wires the store selected in [`Settings`] through the
//! record repositories and caches into one coordinator per entity type.

pub mod coordinators;
pub mod portal;
pub mod settings;
pub mod telemetry;

// Re-exports
pub use coordinators::{AssetRepoCoordinator, EnvironmentCoordinator, PackageCoordinator};
pub use portal::Portal;
pub use settings::{ContainerSettings, Settings, SettingsError, StoreKind, StoreSettings};
