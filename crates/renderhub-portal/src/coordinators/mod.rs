//! Per-entity-type façades over the caching repositories.
//!
//! Each coordinator owns one [`CachingRepository`](renderhub_cache::CachingRepository)
//! and names its operations after the entity it manages.

mod asset_repo;
mod environment;
mod package;

pub use asset_repo::AssetRepoCoordinator;
pub use environment::EnvironmentCoordinator;
pub use package::PackageCoordinator;
