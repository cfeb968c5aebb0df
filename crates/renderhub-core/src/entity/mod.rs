//! Persisted configuration entities.
//!
//! Each entity is stored as one JSON record in its own container and is
//! identified by its name.

mod asset_repo;
mod environment;
mod package;

pub use asset_repo::{AssetRepository, AssetRepositoryKind, NfsFileServer, NfsFileShare};
pub use environment::{
    ApplicationInsightsAccount, AutoScaleConfiguration, AutoScalePolicy, AzureResource,
    BatchAccount, Certificate, DeadlineConfig, DeletionSettings, DomainConfig, EnvironmentState,
    KeyVault, LicenseMode, QubeConfig, RenderManagerConfig, RenderManagerType,
    RenderingEnvironment, ServicePrincipal, Subnet,
};
pub use package::{InstallationPackage, InstallationPackageType};

use serde::Serialize;
use serde::de::DeserializeOwned;

/// A named configuration record that can be persisted and cached.
pub trait ConfigEntity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Namespace scoping cache keys for this entity type.
    const MONIKER: &'static str;

    /// Returns the name identifying this record.
    fn name(&self) -> &str;
}
