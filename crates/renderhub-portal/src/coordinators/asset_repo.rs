use std::sync::Arc;

use renderhub_cache::CachingRepository;
use renderhub_core::{AssetRepository, Result};

/// Access to asset (storage) repositories.
pub struct AssetRepoCoordinator {
    repository: CachingRepository<AssetRepository>,
}

impl AssetRepoCoordinator {
    pub fn new(repository: CachingRepository<AssetRepository>) -> Self {
        Self { repository }
    }

    pub async fn get_repository(&self, name: &str) -> Result<Option<Arc<AssetRepository>>> {
        self.repository.get(name).await
    }

    pub async fn list_repositories(&self) -> Result<Vec<String>> {
        self.repository.list().await
    }

    pub async fn update_repository(
        &self,
        repository: AssetRepository,
        original_name: Option<&str>,
    ) -> Result<()> {
        self.repository.save(repository, original_name).await
    }

    pub async fn remove_repository(&self, repository: &AssetRepository) -> Result<bool> {
        self.repository.remove(&repository.name).await
    }

    pub fn repository(&self) -> &CachingRepository<AssetRepository> {
        &self.repository
    }
}
