use std::sync::Arc;

use renderhub_cache::CachingRepository;
use renderhub_core::{InstallationPackage, Result};

/// Access to installation packages.
pub struct PackageCoordinator {
    repository: CachingRepository<InstallationPackage>,
}

impl PackageCoordinator {
    pub fn new(repository: CachingRepository<InstallationPackage>) -> Self {
        Self { repository }
    }

    pub async fn get_package(&self, name: &str) -> Result<Option<Arc<InstallationPackage>>> {
        self.repository.get(name).await
    }

    pub async fn list_packages(&self) -> Result<Vec<String>> {
        self.repository.list().await
    }

    pub async fn update_package(
        &self,
        package: InstallationPackage,
        original_name: Option<&str>,
    ) -> Result<()> {
        self.repository.save(package, original_name).await
    }

    pub async fn remove_package(&self, package: &InstallationPackage) -> Result<bool> {
        self.repository.remove(&package.package_name).await
    }

    pub fn repository(&self) -> &CachingRepository<InstallationPackage> {
        &self.repository
    }
}
