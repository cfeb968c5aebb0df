use std::sync::Arc;

use renderhub_cache::CachingRepository;
use renderhub_core::{RenderingEnvironment, Result};

/// Access to rendering environments.
///
/// Credentials are kept in the environment's key vault; the cache sits in
/// front of the vault lookups so cached environments carry them already.
pub struct EnvironmentCoordinator {
    repository: CachingRepository<RenderingEnvironment>,
}

impl EnvironmentCoordinator {
    pub fn new(repository: CachingRepository<RenderingEnvironment>) -> Self {
        Self { repository }
    }

    pub async fn get_environment(&self, name: &str) -> Result<Option<Arc<RenderingEnvironment>>> {
        self.repository.get(name).await
    }

    pub async fn list_environments(&self) -> Result<Vec<String>> {
        self.repository.list().await
    }

    /// Saves `environment` under its name. Pass the name it was loaded under
    /// as `original_name` to rename it.
    pub async fn update_environment(
        &self,
        environment: RenderingEnvironment,
        original_name: Option<&str>,
    ) -> Result<()> {
        self.repository.save(environment, original_name).await
    }

    pub async fn remove_environment(&self, environment: &RenderingEnvironment) -> Result<bool> {
        self.repository.remove(environment.name()).await
    }

    pub fn repository(&self) -> &CachingRepository<RenderingEnvironment> {
        &self.repository
    }
}
