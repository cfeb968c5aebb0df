//! Asset (storage) repository records.

use serde::{Deserialize, Serialize};

use super::ConfigEntity;
use super::environment::Subnet;

/// An NFS share exported by a file server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NfsFileShare {
    pub name: String,
    #[serde(default)]
    pub r#type: Option<String>,
}

/// Settings specific to a single-VM NFS file server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NfsFileServer {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub vm_name: Option<String>,
    #[serde(default)]
    pub public_ip: Option<String>,
    #[serde(default)]
    pub private_ip: Option<String>,
    #[serde(default)]
    pub vm_size: Option<String>,
    #[serde(default)]
    pub file_shares: Vec<NfsFileShare>,
    /// CIDR ranges allowed to mount the shares, e.g. `10.2.0.0/24`.
    #[serde(default)]
    pub allowed_networks: Vec<String>,
}

/// The kind of storage behind a repository.
///
/// Serialized inline with the repository record and discriminated by its
/// `RepositoryType` field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "RepositoryType")]
pub enum AssetRepositoryKind {
    NfsFileServer(NfsFileServer),
    AvereCluster,
}

/// A storage repository render nodes read assets from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AssetRepository {
    pub name: String,
    #[serde(flatten)]
    pub kind: AssetRepositoryKind,
    #[serde(default)]
    pub subscription_id: Option<String>,
    #[serde(default)]
    pub subnet: Option<Subnet>,
    #[serde(default)]
    pub provisioning_state: Option<String>,
    #[serde(default)]
    pub resource_group_name: Option<String>,
    #[serde(default)]
    pub deployment_name: Option<String>,
    #[serde(default)]
    pub in_progress: bool,
}

impl AssetRepository {
    /// Creates a repository record of the given kind.
    pub fn new(name: impl Into<String>, kind: AssetRepositoryKind) -> Self {
        Self {
            name: name.into(),
            kind,
            subscription_id: None,
            subnet: None,
            provisioning_state: None,
            resource_group_name: None,
            deployment_name: None,
            in_progress: false,
        }
    }

    /// Full resource id of the repository's resource group.
    pub fn resource_group_resource_id(&self) -> Option<String> {
        match (&self.subscription_id, &self.resource_group_name) {
            (Some(sub), Some(rg)) => Some(format!("/subscriptions/{}/resourceGroups/{}", sub, rg)),
            _ => None,
        }
    }

    /// Repositories being provisioned cannot be selected.
    pub fn enabled(&self) -> bool {
        !self.in_progress
    }
}

impl ConfigEntity for AssetRepository {
    const MONIKER: &'static str = "ASSETREPOSITORY";

    fn name(&self) -> &str {
        &self.name
    }
}
