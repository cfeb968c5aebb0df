//! Rendering environment records.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ConfigEntity;
use crate::secrets::{SecretBearing, SecretVisitor};

/// Lifecycle state of an environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnvironmentState {
    #[default]
    Creating,
    Steady,
    Deleting,
    DeleteFailed,
}

/// Render manager deployed into an environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderManagerType {
    #[default]
    Deadline,
    Qube610,
    Qube70,
    Tractor2,
    OpenCue,
}

/// A cloud resource referenced by its full resource id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AzureResource {
    #[serde(default)]
    pub resource_id: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub existing_resource: bool,
}

impl AzureResource {
    /// Creates a resource reference.
    pub fn new(resource_id: impl Into<String>) -> Self {
        Self {
            resource_id: resource_id.into(),
            ..Default::default()
        }
    }

    /// Resource group segment of the resource id.
    ///
    /// ```
    /// use renderhub_core::entity::AzureResource;
    ///
    /// let res = AzureResource::new("/subscriptions/s/resourceGroups/rg1/providers/x/y/name");
    /// assert_eq!(res.resource_group_name(), Some("rg1"));
    /// assert_eq!(res.name(), Some("name"));
    /// ```
    pub fn resource_group_name(&self) -> Option<&str> {
        self.resource_id.split('/').nth(4).filter(|s| !s.is_empty())
    }

    /// Last segment of the resource id.
    pub fn name(&self) -> Option<&str> {
        if self.resource_id.is_empty() {
            return None;
        }
        self.resource_id.rsplit('/').next()
    }
}

/// Key vault holding an environment's secrets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeyVault {
    #[serde(flatten)]
    pub resource: AzureResource,
    pub uri: String,
}

/// Subnet the environment's nodes are attached to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Subnet {
    #[serde(flatten)]
    pub resource: AzureResource,
    #[serde(default)]
    pub address_prefix: Option<String>,
}

impl Subnet {
    /// Resource id of the parent virtual network.
    pub fn vnet_resource_id(&self) -> Option<&str> {
        let mut parts = self.resource.resource_id.split("/subnets/");
        match (parts.next(), parts.next(), parts.next()) {
            (Some(vnet), Some(_), None) if !vnet.is_empty() => Some(vnet),
            _ => None,
        }
    }
}

/// Batch account running the environment's pools.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BatchAccount {
    #[serde(flatten)]
    pub resource: AzureResource,
    #[serde(default)]
    pub url: Option<String>,
}

/// Application Insights account used for node telemetry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ApplicationInsightsAccount {
    #[serde(flatten)]
    pub resource: AzureResource,
    #[serde(default)]
    pub application_id: Option<String>,
    #[serde(default)]
    pub instrumentation_key: Option<String>,
    #[serde(skip)]
    pub api_key: Option<String>,
}

/// Service principal the environment uses to reach its key vault.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ServicePrincipal {
    pub name: String,
    #[serde(default)]
    pub tenant_id: Uuid,
    #[serde(default)]
    pub application_id: Uuid,
    #[serde(default)]
    pub object_id: Uuid,
    #[serde(skip)]
    pub password: Option<String>,
    #[serde(default)]
    pub thumbprint: Option<String>,
    #[serde(default)]
    pub certificate_key_vault_name: Option<String>,
}

/// Active Directory domain join settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DomainConfig {
    #[serde(default)]
    pub join_domain: bool,
    #[serde(default)]
    pub domain_name: Option<String>,
    #[serde(default)]
    pub domain_worker_ou_path: Option<String>,
    #[serde(default)]
    pub domain_join_username: Option<String>,
    #[serde(skip)]
    pub domain_join_password: Option<String>,
}

/// When idle pool nodes are considered for scale-down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutoScalePolicy {
    #[default]
    Disabled,
    Resources,
    SpecificProcesses,
    ResourcesAndSpecificProcesses,
}

/// Autoscale settings of an environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AutoScaleConfiguration {
    #[serde(default)]
    pub policy: AutoScalePolicy,
    /// Max average CPU percent to consider a node idle.
    #[serde(default = "default_idle_percent")]
    pub max_idle_cpu_percent: u32,
    #[serde(default)]
    pub max_idle_gpu_percent: u32,
    /// Processes that indicate a node is busy.
    #[serde(default)]
    pub specific_processes: Vec<String>,
    #[serde(default)]
    pub scale_endpoint_enabled: bool,
    #[serde(default)]
    pub primary_api_key: Option<String>,
    #[serde(default)]
    pub secondary_api_key: Option<String>,
}

fn default_idle_percent() -> u32 {
    5
}

impl Default for AutoScaleConfiguration {
    fn default() -> Self {
        Self {
            policy: AutoScalePolicy::Disabled,
            max_idle_cpu_percent: default_idle_percent(),
            max_idle_gpu_percent: 0,
            specific_processes: Vec::new(),
            scale_endpoint_enabled: false,
            primary_api_key: None,
            secondary_api_key: None,
        }
    }
}

/// Which cloud resources to tear down when the environment is deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeletionSettings {
    #[serde(default)]
    pub delete_resource_group: bool,
    #[serde(default)]
    pub delete_batch_account: bool,
    #[serde(default)]
    pub delete_storage_account: bool,
    #[serde(default)]
    pub delete_app_insights: bool,
    #[serde(default)]
    pub delete_key_vault: bool,
    #[serde(default, rename = "DeleteVNet")]
    pub delete_vnet: bool,
    #[serde(default)]
    pub delete_errors: Option<String>,
}

/// Client certificate for the Deadline database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Certificate {
    #[serde(default)]
    pub certificate_data: Option<Vec<u8>>,
    #[serde(skip)]
    pub password: Option<String>,
}

/// Deadline licensing mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LicenseMode {
    #[default]
    Standard,
    LicenseFree,
}

/// Deadline render manager settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeadlineConfig {
    #[serde(default)]
    pub windows_repository_path: Option<String>,
    #[serde(default)]
    pub linux_repository_path: Option<String>,
    #[serde(default)]
    pub repository_user: Option<String>,
    #[serde(skip)]
    pub repository_password: Option<String>,
    #[serde(default)]
    pub license_server: Option<String>,
    #[serde(default)]
    pub license_mode: LicenseMode,
    #[serde(default)]
    pub deadline_region: Option<String>,
    #[serde(default)]
    pub exclude_from_limit_groups: Option<String>,
    #[serde(default)]
    pub run_as_service: bool,
    #[serde(default)]
    pub service_user: Option<String>,
    #[serde(skip)]
    pub service_password: Option<String>,
    #[serde(default)]
    pub deadline_database_certificate: Option<Certificate>,
}

/// Qube render manager settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QubeConfig {
    #[serde(default)]
    pub supervisor_ip: Option<String>,
    #[serde(default)]
    pub group_and_cluster: Option<String>,
}

/// Render manager specific settings; only the section matching the
/// environment's [`RenderManagerType`] is normally present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RenderManagerConfig {
    #[serde(default)]
    pub deadline: Option<DeadlineConfig>,
    #[serde(default)]
    pub qube: Option<QubeConfig>,
}

/// A rendering environment: the set of cloud resources a render farm runs in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RenderingEnvironment {
    name: String,
    #[serde(default)]
    pub state: EnvironmentState,
    #[serde(default)]
    pub resource_group_name: String,
    /// Full location name, like "West US".
    #[serde(default)]
    pub location_name: Option<String>,
    #[serde(default)]
    pub subscription_id: Option<Uuid>,
    #[serde(default)]
    pub key_vault: Option<KeyVault>,
    #[serde(default)]
    pub render_manager: RenderManagerType,
    #[serde(default)]
    pub key_vault_service_principal: Option<ServicePrincipal>,
    #[serde(default)]
    pub subnet: Option<Subnet>,
    #[serde(default)]
    pub batch_account: Option<BatchAccount>,
    #[serde(default)]
    pub storage_account: Option<AzureResource>,
    #[serde(default)]
    pub application_insights_account: Option<ApplicationInsightsAccount>,
    #[serde(default)]
    pub render_manager_config: Option<RenderManagerConfig>,
    #[serde(default)]
    pub in_progress: bool,
    #[serde(default)]
    pub domain: Option<DomainConfig>,
    #[serde(default)]
    pub auto_scale_configuration: AutoScaleConfiguration,
    #[serde(default)]
    pub deletion_settings: Option<DeletionSettings>,
    #[serde(default)]
    pub windows_bootstrap_script: Option<String>,
    #[serde(default)]
    pub linux_bootstrap_script: Option<String>,
}

impl RenderingEnvironment {
    /// Creates a new environment in the `Creating` state.
    ///
    /// ```
    /// use renderhub_core::{EnvironmentState, RenderingEnvironment};
    ///
    /// let env = RenderingEnvironment::new("farm1");
    /// assert_eq!(env.resource_group_name, "farm1-rg");
    /// assert_eq!(env.state, EnvironmentState::Creating);
    /// ```
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            resource_group_name: format!("{}-rg", name),
            name,
            state: EnvironmentState::Creating,
            location_name: None,
            subscription_id: None,
            key_vault: None,
            render_manager: RenderManagerType::default(),
            key_vault_service_principal: None,
            subnet: None,
            batch_account: None,
            storage_account: None,
            application_insights_account: None,
            render_manager_config: None,
            in_progress: false,
            domain: None,
            auto_scale_configuration: AutoScaleConfiguration::default(),
            deletion_settings: None,
            windows_bootstrap_script: None,
            linux_bootstrap_script: None,
        }
    }

    /// Returns the environment name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the environment; the resource group follows the name.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.resource_group_name = format!("{}-rg", self.name);
    }

    /// Full resource id of the environment's resource group.
    pub fn resource_group_resource_id(&self) -> Option<String> {
        self.subscription_id.map(|sub| {
            format!(
                "/subscriptions/{}/resourceGroups/{}",
                sub, self.resource_group_name
            )
        })
    }

    /// Environments being provisioned cannot be selected.
    pub fn enabled(&self) -> bool {
        !self.in_progress
    }
}

impl ConfigEntity for RenderingEnvironment {
    const MONIKER: &'static str = "ENVIRONMENT";

    fn name(&self) -> &str {
        &self.name
    }
}

impl SecretBearing for RenderingEnvironment {
    fn vault_id(&self) -> Option<&str> {
        self.key_vault
            .as_ref()
            .map(|kv| kv.uri.as_str())
            .filter(|uri| !uri.is_empty())
    }

    fn visit_secrets(&mut self, visit: &mut SecretVisitor<'_>) {
        if let Some(sp) = &mut self.key_vault_service_principal {
            visit("ServicePrincipalPassword", &mut sp.password);
        }
        if let Some(domain) = &mut self.domain {
            visit("DomainJoinUserPassword", &mut domain.domain_join_password);
        }
        if let Some(insights) = &mut self.application_insights_account {
            visit("ApplicationInsightsApiKey", &mut insights.api_key);
        }
        if let Some(deadline) = self
            .render_manager_config
            .as_mut()
            .and_then(|rm| rm.deadline.as_mut())
        {
            visit("DeadlineShareUserPassword", &mut deadline.repository_password);
            visit("DeadlineServiceUserPassword", &mut deadline.service_password);
            if let Some(cert) = &mut deadline.deadline_database_certificate {
                visit("DeadlineDbClientCertificatePassword", &mut cert.password);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_with_secrets() -> RenderingEnvironment {
        let mut env = RenderingEnvironment::new("farm1");
        env.key_vault = Some(KeyVault {
            uri: "https://farm1-kv.vault.azure.net/".to_string(),
            ..Default::default()
        });
        env.key_vault_service_principal = Some(ServicePrincipal {
            name: "farm1-sp".to_string(),
            password: Some("sp-secret".to_string()),
            ..Default::default()
        });
        env.render_manager_config = Some(RenderManagerConfig {
            deadline: Some(DeadlineConfig {
                service_password: Some("svc-secret".to_string()),
                ..Default::default()
            }),
            qube: None,
        });
        env
    }

    #[test]
    fn test_set_name_moves_resource_group() {
        let mut env = RenderingEnvironment::new("a");
        env.set_name("b");
        assert_eq!(env.name(), "b");
        assert_eq!(env.resource_group_name, "b-rg");
    }

    #[test]
    fn test_secrets_are_not_serialized() {
        let env = env_with_secrets();
        let json = serde_json::to_string(&env).unwrap();

        assert!(!json.contains("sp-secret"));
        assert!(!json.contains("svc-secret"));
        assert!(json.contains("\"Name\":\"farm1\""));
    }

    #[test]
    fn test_visit_secrets_only_present_sections() {
        let mut env = env_with_secrets();
        let secrets = env.collect_secrets();
        let names: Vec<_> = secrets.iter().map(|(n, _)| *n).collect();

        assert_eq!(
            names,
            vec![
                "ServicePrincipalPassword",
                "DeadlineShareUserPassword",
                "DeadlineServiceUserPassword"
            ]
        );
        assert_eq!(secrets[0].1.as_deref(), Some("sp-secret"));
        assert_eq!(secrets[1].1, None);
    }

    #[test]
    fn test_clear_secrets() {
        let mut env = env_with_secrets();
        env.clear_secrets();

        assert!(env.collect_secrets().iter().all(|(_, v)| v.is_none()));
        assert_eq!(env.vault_id(), Some("https://farm1-kv.vault.azure.net/"));
    }

    #[test]
    fn test_subnet_vnet_id() {
        let subnet = Subnet {
            resource: AzureResource::new(
                "/subscriptions/s/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/vnet/subnets/default",
            ),
            address_prefix: Some("10.2.0.0/24".to_string()),
        };
        assert_eq!(
            subnet.vnet_resource_id(),
            Some("/subscriptions/s/resourceGroups/rg/providers/Microsoft.Network/virtualNetworks/vnet")
        );
        assert_eq!(Subnet::default().vnet_resource_id(), None);
    }
}
