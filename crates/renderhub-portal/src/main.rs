//! RenderHub portal configuration service binary.

use std::path::PathBuf;

use anyhow::Context;
use renderhub_portal::telemetry::{init_metrics, init_tracing};
use renderhub_portal::{Portal, Settings};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_file = std::env::var_os("RENDERHUB_CONFIG_FILE").map(PathBuf::from);
    let settings =
        Settings::load(config_file.as_deref()).context("failed to load RenderHub settings")?;

    init_tracing(&settings.log_level);
    let metrics = init_metrics().context("failed to install metrics recorder")?;

    info!(
        "Starting RenderHub portal v{}",
        env!("CARGO_PKG_VERSION")
    );
    info!(
        store = ?settings.store.kind,
        entry_ttl = ?settings.cache.entry_ttl,
        index_ttl = ?settings.cache.index_ttl,
        "settings loaded"
    );

    let portal = Portal::build(&settings)
        .await
        .context("failed to open the configuration store")?;

    let environments = portal.environments.list_environments().await?;
    for name in &environments {
        portal.environments.get_environment(name).await?;
    }
    let repositories = portal.asset_repos.list_repositories().await?;
    for name in &repositories {
        portal.asset_repos.get_repository(name).await?;
    }
    let packages = portal.packages.list_packages().await?;
    for name in &packages {
        portal.packages.get_package(name).await?;
    }

    info!(
        environments = environments.len(),
        repositories = repositories.len(),
        packages = packages.len(),
        "configuration loaded"
    );

    info!("metrics snapshot:\n{}", metrics.render());
    Ok(())
}
