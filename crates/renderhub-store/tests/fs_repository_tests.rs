//! Repositories backed by the filesystem store.

use std::sync::Arc;

use renderhub_core::entity::{KeyVault, ServicePrincipal};
use renderhub_core::{
    AssetRepository, AssetRepositoryKind, ConfigEntity, InstallationPackage,
    InstallationPackageType, RenderingEnvironment,
};
use renderhub_store::{
    BlobConfigRepository, BlobStore, ConfigRepository, FsBlobStore, MemorySecretVault,
    SecretVault, SecretsRepository,
};
use tempfile::TempDir;

#[tokio::test]
async fn test_records_survive_a_new_store_instance() {
    let dir = TempDir::new().unwrap();

    {
        let store: Arc<dyn BlobStore> = Arc::new(FsBlobStore::new(dir.path()));
        let repo = BlobConfigRepository::<InstallationPackage>::new(store, "packages");
        let pkg = InstallationPackage::new("blender", InstallationPackageType::General);
        repo.write(pkg.name(), &pkg).await.unwrap();
    }

    let store: Arc<dyn BlobStore> = Arc::new(FsBlobStore::new(dir.path()));
    let repo = BlobConfigRepository::<InstallationPackage>::new(store, "packages");

    assert_eq!(repo.list().await.unwrap(), vec!["blender"]);
    let pkg = repo.get("blender").await.unwrap().unwrap();
    assert_eq!(pkg.r#type, InstallationPackageType::General);
}

#[tokio::test]
async fn test_entity_types_use_separate_containers() {
    let dir = TempDir::new().unwrap();
    let store: Arc<dyn BlobStore> = Arc::new(FsBlobStore::new(dir.path()));

    let repos = BlobConfigRepository::<AssetRepository>::new(store.clone(), "storage");
    let envs = BlobConfigRepository::<RenderingEnvironment>::new(store, "environments");

    repos
        .write("shared", &AssetRepository::new("shared", AssetRepositoryKind::AvereCluster))
        .await
        .unwrap();
    envs.write("shared", &RenderingEnvironment::new("shared"))
        .await
        .unwrap();

    assert!(envs.remove("shared").await.unwrap());
    assert_eq!(repos.list().await.unwrap(), vec!["shared"]);
}

#[tokio::test]
async fn test_rename_with_secrets_on_disk() {
    let dir = TempDir::new().unwrap();
    let store: Arc<dyn BlobStore> = Arc::new(FsBlobStore::new(dir.path()));
    let vault = Arc::new(MemorySecretVault::new());
    let plain = Arc::new(BlobConfigRepository::<RenderingEnvironment>::new(
        store,
        "environments",
    ));
    let repo = SecretsRepository::<RenderingEnvironment>::new(plain, vault.clone());

    let mut env = RenderingEnvironment::new("farm-a");
    env.key_vault = Some(KeyVault {
        uri: "https://farm-kv.vault.azure.net/".to_string(),
        ..Default::default()
    });
    env.key_vault_service_principal = Some(ServicePrincipal {
        name: "sp".to_string(),
        password: Some("s3cret".to_string()),
        ..Default::default()
    });
    repo.write("farm-a", &env).await.unwrap();

    env.set_name("farm-b");
    repo.write("farm-b", &env).await.unwrap();
    repo.delete_if_renamed("farm-b", Some("farm-a")).await.unwrap();

    assert_eq!(repo.list().await.unwrap(), vec!["farm-b"]);
    let on_disk =
        std::fs::read_to_string(dir.path().join("environments").join("farm-b")).unwrap();
    assert!(!on_disk.contains("s3cret"));
    assert_eq!(
        vault
            .get_secret("https://farm-kv.vault.azure.net/", "ServicePrincipalPassword")
            .await
            .unwrap()
            .as_deref(),
        Some("s3cret")
    );
}
