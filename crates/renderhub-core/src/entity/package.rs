//! Installation package records.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ConfigEntity;

/// What an installation package installs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstallationPackageType {
    Qube610,
    Qube70,
    Deadline10,
    Tractor2,
    OpenCue,
    Gpu,
    General,
}

/// A package of files installed onto pool nodes at start-up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct InstallationPackage {
    pub package_name: String,
    pub r#type: InstallationPackageType,
    #[serde(default)]
    pub package_install_command: Option<String>,
    /// Blob container holding the package files.
    pub container: String,
    #[serde(default)]
    pub files: Vec<String>,
}

impl InstallationPackage {
    /// Creates a package with a freshly generated container name.
    pub fn new(package_name: impl Into<String>, r#type: InstallationPackageType) -> Self {
        Self {
            package_name: package_name.into(),
            r#type,
            package_install_command: None,
            container: Uuid::now_v7().to_string(),
            files: Vec::new(),
        }
    }
}

impl ConfigEntity for InstallationPackage {
    const MONIKER: &'static str = "INSTALLATIONPACKAGE";

    fn name(&self) -> &str {
        &self.package_name
    }
}
