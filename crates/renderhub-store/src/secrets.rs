//! Secret vault integration.
//!
//! Credentials never reach the blob store. [`SecretsRepository`] wraps another
//! repository: on write it copies every secret field into the entity's vault
//! and stores a stripped copy, on read it fills the fields back in from the
//! vault. Vault failures are logged and do not fail the record operation.
//!
//! Two vaults are provided: [`MemorySecretVault`] for tests and throwaway
//! portals, and [`BlobSecretVault`], which keeps each secret as a blob in a
//! dedicated container of a [`BlobStore`] so credentials outlive the process
//! whenever the records do.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use renderhub_core::names::validate_name;
use renderhub_core::{Result, SecretBearing, StoreError};
use sha2::{Digest, Sha256};
use tracing::{debug, error, instrument};

use crate::blob::BlobStore;
use crate::repository::ConfigRepository;

/// An external store of named secrets, partitioned by vault.
#[async_trait]
pub trait SecretVault: Send + Sync {
    /// Reads a secret. A missing secret is `Ok(None)`.
    async fn get_secret(&self, vault: &str, name: &str) -> Result<Option<String>>;

    /// Creates or overwrites a secret.
    async fn set_secret(&self, vault: &str, name: &str, value: &str) -> Result<()>;

    /// Deletes a secret. Deleting a missing secret succeeds.
    async fn delete_secret(&self, vault: &str, name: &str) -> Result<()>;
}

/// A process-local [`SecretVault`].
#[derive(Debug, Default)]
pub struct MemorySecretVault {
    secrets: RwLock<HashMap<(String, String), String>>,
}

impl MemorySecretVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of secrets held across all vaults.
    pub fn len(&self) -> usize {
        self.secrets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.read().is_empty()
    }
}

#[async_trait]
impl SecretVault for MemorySecretVault {
    async fn get_secret(&self, vault: &str, name: &str) -> Result<Option<String>> {
        Ok(self
            .secrets
            .read()
            .get(&(vault.to_string(), name.to_string()))
            .cloned())
    }

    async fn set_secret(&self, vault: &str, name: &str, value: &str) -> Result<()> {
        self.secrets
            .write()
            .insert((vault.to_string(), name.to_string()), value.to_string());
        Ok(())
    }

    async fn delete_secret(&self, vault: &str, name: &str) -> Result<()> {
        self.secrets
            .write()
            .remove(&(vault.to_string(), name.to_string()));
        Ok(())
    }
}

/// A [`SecretVault`] persisted in a [`BlobStore`] container.
///
/// Each secret is one blob named `<sha256(vault)>-<secret>`. Values are stored
/// as plain UTF-8, so the container should be as protected as the store root.
pub struct BlobSecretVault {
    store: Arc<dyn BlobStore>,
    container: String,
}

impl BlobSecretVault {
    pub fn new(store: Arc<dyn BlobStore>, container: impl Into<String>) -> Self {
        Self {
            store,
            container: container.into(),
        }
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    fn blob_name(vault: &str, name: &str) -> Result<String> {
        validate_name(name)?;
        let mut hasher = Sha256::new();
        hasher.update(vault.as_bytes());
        Ok(format!("{}-{}", hex::encode(hasher.finalize()), name))
    }
}

impl std::fmt::Debug for BlobSecretVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlobSecretVault")
            .field("store", &self.store.name())
            .field("container", &self.container)
            .finish()
    }
}

#[async_trait]
impl SecretVault for BlobSecretVault {
    async fn get_secret(&self, vault: &str, name: &str) -> Result<Option<String>> {
        let blob = Self::blob_name(vault, name)?;
        match self.store.get(&self.container, &blob).await? {
            Some(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|e| StoreError::serialization(name, e.to_string())),
            None => Ok(None),
        }
    }

    async fn set_secret(&self, vault: &str, name: &str, value: &str) -> Result<()> {
        let blob = Self::blob_name(vault, name)?;
        self.store
            .put(&self.container, &blob, value.as_bytes().to_vec())
            .await
    }

    async fn delete_secret(&self, vault: &str, name: &str) -> Result<()> {
        let blob = Self::blob_name(vault, name)?;
        self.store.delete_if_exists(&self.container, &blob).await?;
        Ok(())
    }
}

/// A [`ConfigRepository`] decorator keeping credentials in a [`SecretVault`].
pub struct SecretsRepository<T> {
    inner: Arc<dyn ConfigRepository<T>>,
    vault: Arc<dyn SecretVault>,
}

impl<T> SecretsRepository<T>
where
    T: SecretBearing + Clone + Send + Sync + 'static,
{
    pub fn new(inner: Arc<dyn ConfigRepository<T>>, vault: Arc<dyn SecretVault>) -> Self {
        Self { inner, vault }
    }

    async fn save_secrets(&self, vault_id: &str, secrets: Vec<(&'static str, Option<String>)>) -> Result<()> {
        for (name, value) in secrets {
            match value.as_deref() {
                Some(value) if !value.is_empty() => {
                    self.vault.set_secret(vault_id, name, value).await?;
                }
                _ => self.vault.delete_secret(vault_id, name).await?,
            }
        }
        Ok(())
    }

    async fn load_secrets(&self, entity: &mut T) -> Result<()> {
        let Some(vault_id) = entity.vault_id().map(str::to_owned) else {
            return Ok(());
        };

        let mut loaded = HashMap::new();
        for (name, _) in entity.collect_secrets() {
            let value = self.vault.get_secret(&vault_id, name).await?;
            loaded.insert(name, value);
        }

        entity.visit_secrets(&mut |name, value| {
            if let Some(secret) = loaded.remove(name) {
                *value = secret;
            }
        });
        Ok(())
    }
}

#[async_trait]
impl<T> ConfigRepository<T> for SecretsRepository<T>
where
    T: SecretBearing + Clone + Send + Sync + 'static,
{
    async fn get(&self, name: &str) -> Result<Option<T>> {
        let mut entity = self.inner.get(name).await?;
        if let Some(entity) = entity.as_mut() {
            if let Err(e) = self.load_secrets(entity).await {
                error!(name = %name, error = %e, "failed to load credentials from vault");
            }
        }
        Ok(entity)
    }

    #[instrument(skip(self, entity))]
    async fn write(&self, name: &str, entity: &T) -> Result<()> {
        let mut stripped = entity.clone();
        let secrets = stripped.collect_secrets();
        stripped.clear_secrets();

        self.inner.write(name, &stripped).await?;

        match entity.vault_id() {
            Some(vault_id) => {
                if let Err(e) = self.save_secrets(vault_id, secrets).await {
                    error!(error = %e, "failed to save credentials to vault");
                }
            }
            None => debug!("no vault configured, credentials dropped"),
        }
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<bool> {
        self.inner.remove(name).await
    }

    async fn list(&self) -> Result<Vec<String>> {
        self.inner.list().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBlobStore;
    use crate::repository::BlobConfigRepository;
    use renderhub_core::entity::{KeyVault, ServicePrincipal};
    use renderhub_core::{RenderingEnvironment, StoreError};

    const VAULT: &str = "https://farm-kv.vault.azure.net/";

    struct BrokenVault;

    #[async_trait]
    impl SecretVault for BrokenVault {
        async fn get_secret(&self, _: &str, _: &str) -> Result<Option<String>> {
            Err(StoreError::unavailable("vault down"))
        }
        async fn set_secret(&self, _: &str, _: &str, _: &str) -> Result<()> {
            Err(StoreError::unavailable("vault down"))
        }
        async fn delete_secret(&self, _: &str, _: &str) -> Result<()> {
            Err(StoreError::unavailable("vault down"))
        }
    }

    fn env(password: Option<&str>) -> RenderingEnvironment {
        let mut env = RenderingEnvironment::new("farm");
        env.key_vault = Some(KeyVault {
            uri: VAULT.to_string(),
            ..Default::default()
        });
        env.key_vault_service_principal = Some(ServicePrincipal {
            name: "sp".to_string(),
            password: password.map(str::to_string),
            ..Default::default()
        });
        env
    }

    fn repos(
        vault: Arc<dyn SecretVault>,
    ) -> (
        Arc<BlobConfigRepository<RenderingEnvironment>>,
        SecretsRepository<RenderingEnvironment>,
    ) {
        let store = Arc::new(MemoryBlobStore::new());
        let plain = Arc::new(BlobConfigRepository::<RenderingEnvironment>::new(store, "environments"));
        let secure = SecretsRepository::<RenderingEnvironment>::new(plain.clone(), vault);
        (plain, secure)
    }

    #[tokio::test]
    async fn test_write_moves_secret_to_vault() {
        let vault = Arc::new(MemorySecretVault::new());
        let (plain, secure) = repos(vault.clone());

        secure.write("farm", &env(Some("hunter2"))).await.unwrap();

        let stored = plain.get("farm").await.unwrap().unwrap();
        assert_eq!(stored.key_vault_service_principal.unwrap().password, None);
        assert_eq!(
            vault.get_secret(VAULT, "ServicePrincipalPassword").await.unwrap(),
            Some("hunter2".to_string())
        );
    }

    #[tokio::test]
    async fn test_get_restores_secret() {
        let vault = Arc::new(MemorySecretVault::new());
        let (_plain, secure) = repos(vault);

        secure.write("farm", &env(Some("hunter2"))).await.unwrap();
        let loaded = secure.get("farm").await.unwrap().unwrap();

        assert_eq!(
            loaded.key_vault_service_principal.unwrap().password.as_deref(),
            Some("hunter2")
        );
    }

    #[tokio::test]
    async fn test_empty_secret_deletes_from_vault() {
        let vault = Arc::new(MemorySecretVault::new());
        let (_plain, secure) = repos(vault.clone());

        secure.write("farm", &env(Some("hunter2"))).await.unwrap();
        secure.write("farm", &env(Some(""))).await.unwrap();

        assert!(vault.is_empty());
    }

    #[tokio::test]
    async fn test_blob_vault_scopes_secrets_by_vault() {
        let store = Arc::new(MemoryBlobStore::new());
        let vault = BlobSecretVault::new(store.clone(), "secrets");

        vault.set_secret(VAULT, "ServicePrincipalPassword", "hunter2").await.unwrap();
        vault
            .set_secret("https://other-kv.vault.azure.net/", "ServicePrincipalPassword", "other")
            .await
            .unwrap();

        assert_eq!(store.len("secrets"), 2);
        assert_eq!(
            vault.get_secret(VAULT, "ServicePrincipalPassword").await.unwrap().as_deref(),
            Some("hunter2")
        );
        assert_eq!(vault.get_secret(VAULT, "DomainJoinUserPassword").await.unwrap(), None);

        vault.delete_secret(VAULT, "ServicePrincipalPassword").await.unwrap();
        vault.delete_secret(VAULT, "ServicePrincipalPassword").await.unwrap();
        assert_eq!(vault.get_secret(VAULT, "ServicePrincipalPassword").await.unwrap(), None);
        assert_eq!(store.len("secrets"), 1);
    }

    #[tokio::test]
    async fn test_vault_failure_does_not_fail_record() {
        let (plain, secure) = repos(Arc::new(BrokenVault));

        secure.write("farm", &env(Some("hunter2"))).await.unwrap();

        assert!(plain.get("farm").await.unwrap().is_some());
        let loaded = secure.get("farm").await.unwrap().unwrap();
        assert_eq!(loaded.key_vault_service_principal.unwrap().password, None);
    }

    #[tokio::test]
    async fn test_no_vault_configured() {
        let vault = Arc::new(MemorySecretVault::new());
        let (_plain, secure) = repos(vault.clone());

        let mut env = env(Some("hunter2"));
        env.key_vault = None;
        secure.write("farm", &env).await.unwrap();

        assert!(vault.is_empty());
        assert_eq!(secure.list().await.unwrap(), vec!["farm"]);
    }
}
