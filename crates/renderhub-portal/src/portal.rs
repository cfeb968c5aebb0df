//! Wiring of stores, repositories, caches and coordinators.

use std::sync::Arc;

use renderhub_cache::{CacheConfig, CacheHandles, CachingRepository};
use renderhub_core::{
    AssetRepository, ConfigEntity, InstallationPackage, RenderingEnvironment, Result,
};
use renderhub_store::{
    BlobConfigRepository, BlobSecretVault, BlobStore, ConfigRepository, FsBlobStore,
    MemoryBlobStore, SecretVault, SecretsRepository,
};
use tracing::info;

use crate::coordinators::{AssetRepoCoordinator, EnvironmentCoordinator, PackageCoordinator};
use crate::settings::{Settings, StoreKind};

/// The portal's configuration services.
pub struct Portal {
    pub environments: EnvironmentCoordinator,
    pub asset_repos: AssetRepoCoordinator,
    pub packages: PackageCoordinator,
    store: Arc<dyn BlobStore>,
}

impl Portal {
    /// Builds the portal from settings.
    ///
    /// Credentials go to the `containers.secrets` container of the same
    /// store, so they persist exactly as long as the records do.
    pub async fn build(settings: &Settings) -> Result<Self> {
        let store = open_store(settings)?;
        let vault: Arc<dyn SecretVault> = Arc::new(BlobSecretVault::new(
            Arc::clone(&store),
            settings.containers.secrets.as_str(),
        ));
        Self::build_with(settings, store, vault).await
    }

    /// Builds the portal over an existing store and vault.
    pub async fn build_with(
        settings: &Settings,
        store: Arc<dyn BlobStore>,
        vault: Arc<dyn SecretVault>,
    ) -> Result<Self> {
        store.health_check().await?;

        let containers = &settings.containers;
        let cache = &settings.cache;

        // Caching sits outside the secrets so vault reads are cached too.
        let environments: Arc<dyn ConfigRepository<RenderingEnvironment>> =
            Arc::new(SecretsRepository::<RenderingEnvironment>::new(
                Arc::new(BlobConfigRepository::<RenderingEnvironment>::new(
                    Arc::clone(&store),
                    containers.environments.as_str(),
                )),
                vault,
            ));
        let asset_repos: Arc<dyn ConfigRepository<AssetRepository>> =
            Arc::new(BlobConfigRepository::<AssetRepository>::new(
                Arc::clone(&store),
                containers.storage.as_str(),
            ));
        let packages: Arc<dyn ConfigRepository<InstallationPackage>> =
            Arc::new(BlobConfigRepository::<InstallationPackage>::new(
                Arc::clone(&store),
                containers.packages.as_str(),
            ));

        info!(store = store.name(), "portal configuration services ready");

        Ok(Self {
            environments: EnvironmentCoordinator::new(caching(environments, cache)),
            asset_repos: AssetRepoCoordinator::new(caching(asset_repos, cache)),
            packages: PackageCoordinator::new(caching(packages, cache)),
            store,
        })
    }

    pub fn store(&self) -> &Arc<dyn BlobStore> {
        &self.store
    }

    /// Flushes every cache. Returns the number of entry records dropped.
    pub async fn invalidate_all(&self) -> usize {
        self.environments.repository().invalidate().await
            + self.asset_repos.repository().invalidate().await
            + self.packages.repository().invalidate().await
    }
}

fn caching<T: ConfigEntity>(
    inner: Arc<dyn ConfigRepository<T>>,
    config: &CacheConfig,
) -> CachingRepository<T> {
    CachingRepository::for_entity(inner, CacheHandles::new(config), config)
}

fn open_store(settings: &Settings) -> Result<Arc<dyn BlobStore>> {
    match settings.store.kind {
        StoreKind::Memory => Ok(Arc::new(MemoryBlobStore::new())),
        StoreKind::Fs => match &settings.store.root {
            Some(root) => Ok(Arc::new(FsBlobStore::new(root))),
            None => Err(renderhub_core::StoreError::unavailable(
                "filesystem store has no root directory",
            )),
        },
    }
}
