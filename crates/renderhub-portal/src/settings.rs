//! Configuration layer: typed settings with layered precedence (file → env).

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use renderhub_cache::CacheConfig;
use renderhub_core::names::validate_name;
use serde::Deserialize;
use thiserror::Error;

const LOCAL_CONFIG_BASENAME: &str = "renderhub";
const ENV_PREFIX: &str = "RENDERHUB";
const DEFAULT_TTL_SECS: u64 = 15 * 60;
const DEFAULT_MAX_CAPACITY: u64 = 10_000;
const DEFAULT_ENVIRONMENTS_CONTAINER: &str = "environments";
const DEFAULT_STORAGE_CONTAINER: &str = "storage";
const DEFAULT_PACKAGES_CONTAINER: &str = "packages";
const DEFAULT_SECRETS_CONTAINER: &str = "secrets";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl SettingsError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Where configuration records are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    #[default]
    Memory,
    Fs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSettings {
    pub kind: StoreKind,
    /// Root directory of the filesystem store. Always set when `kind` is `Fs`.
    pub root: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerSettings {
    pub environments: String,
    pub storage: String,
    pub packages: String,
    /// Holds environment credentials when the portal builds its own vault.
    pub secrets: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub store: StoreSettings,
    pub cache: CacheConfig,
    pub containers: ContainerSettings,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            store: StoreSettings {
                kind: StoreKind::Memory,
                root: None,
            },
            cache: CacheConfig::default(),
            containers: ContainerSettings {
                environments: DEFAULT_ENVIRONMENTS_CONTAINER.to_string(),
                storage: DEFAULT_STORAGE_CONTAINER.to_string(),
                packages: DEFAULT_PACKAGES_CONTAINER.to_string(),
                secrets: DEFAULT_SECRETS_CONTAINER.to_string(),
            },
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl Settings {
    /// Load settings using the configured precedence (file → environment).
    ///
    /// `renderhub.toml` in the working directory is read when present. An
    /// explicit `config_file` must exist.
    pub fn load(config_file: Option<&Path>) -> Result<Self, SettingsError> {
        let mut builder =
            Config::builder().add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

        if let Some(path) = config_file {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

        let raw: RawSettings = builder.build()?.try_deserialize()?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawSettings) -> Result<Self, SettingsError> {
        let kind = raw.store.kind.unwrap_or_default();
        let root = raw.store.root;
        if kind == StoreKind::Fs && root.is_none() {
            return Err(SettingsError::invalid(
                "store.root",
                "required when store.kind is `fs`",
            ));
        }

        let entry_ttl = ttl("cache.entry_ttl_seconds", raw.cache.entry_ttl_seconds)?;
        let index_ttl = ttl("cache.index_ttl_seconds", raw.cache.index_ttl_seconds)?;
        let max_capacity = raw.cache.max_capacity.unwrap_or(DEFAULT_MAX_CAPACITY);
        if max_capacity == 0 {
            return Err(SettingsError::invalid(
                "cache.max_capacity",
                "must be greater than zero",
            ));
        }

        let containers = ContainerSettings {
            environments: container(
                "containers.environments",
                raw.containers.environments,
                DEFAULT_ENVIRONMENTS_CONTAINER,
            )?,
            storage: container(
                "containers.storage",
                raw.containers.storage,
                DEFAULT_STORAGE_CONTAINER,
            )?,
            packages: container(
                "containers.packages",
                raw.containers.packages,
                DEFAULT_PACKAGES_CONTAINER,
            )?,
            secrets: container(
                "containers.secrets",
                raw.containers.secrets,
                DEFAULT_SECRETS_CONTAINER,
            )?,
        };
        let distinct: HashSet<&str> = [
            containers.environments.as_str(),
            containers.storage.as_str(),
            containers.packages.as_str(),
            containers.secrets.as_str(),
        ]
        .into_iter()
        .collect();
        if distinct.len() != 4 {
            return Err(SettingsError::invalid(
                "containers",
                "entity types and secrets each need their own container",
            ));
        }

        let log_level = raw
            .logging
            .level
            .map(|level| level.trim().to_string())
            .filter(|level| !level.is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());

        Ok(Self {
            store: StoreSettings { kind, root },
            cache: CacheConfig::default()
                .with_entry_ttl(entry_ttl)
                .with_index_ttl(index_ttl)
                .with_max_capacity(max_capacity),
            containers,
            log_level,
        })
    }
}

fn ttl(key: &'static str, seconds: Option<u64>) -> Result<Duration, SettingsError> {
    match seconds.unwrap_or(DEFAULT_TTL_SECS) {
        0 => Err(SettingsError::invalid(key, "must be greater than zero")),
        secs => Ok(Duration::from_secs(secs)),
    }
}

fn container(
    key: &'static str,
    value: Option<String>,
    default: &str,
) -> Result<String, SettingsError> {
    let name = value.unwrap_or_else(|| default.to_string());
    validate_name(&name).map_err(|e| SettingsError::invalid(key, e.to_string()))?;
    Ok(name)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    store: RawStoreSettings,
    cache: RawCacheSettings,
    containers: RawContainerSettings,
    logging: RawLoggingSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawStoreSettings {
    kind: Option<StoreKind>,
    root: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawCacheSettings {
    entry_ttl_seconds: Option<u64>,
    index_ttl_seconds: Option<u64>,
    max_capacity: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawContainerSettings {
    environments: Option<String>,
    storage: Option<String>,
    packages: Option<String>,
    secrets: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
}
