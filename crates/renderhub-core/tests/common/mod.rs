#![allow(dead_code)]
use renderhub_core::entity::{DeadlineConfig, KeyVault, RenderManagerConfig, ServicePrincipal};
use renderhub_core::RenderingEnvironment;

/// Returns a record as the portal writes it to blob storage.
pub fn stored_environment_json() -> &'static str {
    r#"{
        "Name": "west-farm",
        "State": "Steady",
        "ResourceGroupName": "west-farm-rg",
        "LocationName": "West US",
        "SubscriptionId": "6a3a2b43-3b55-4c4e-9e5b-0d6c7d1b2a10",
        "KeyVault": {
            "ResourceId": "/subscriptions/6a3a2b43-3b55-4c4e-9e5b-0d6c7d1b2a10/resourceGroups/west-farm-rg/providers/Microsoft.KeyVault/vaults/westkv",
            "Location": "westus",
            "Uri": "https://westkv.vault.azure.net/"
        },
        "RenderManager": "Deadline",
        "RenderManagerConfig": {
            "Deadline": {
                "WindowsRepositoryPath": "\\\\10.2.0.4\\DeadlineRepository10",
                "LicenseMode": "LicenseFree",
                "RunAsService": true
            }
        },
        "AutoScaleConfiguration": {
            "Policy": "Resources",
            "MaxIdleCpuPercent": 10
        },
        "InProgress": false
    }"#
}

/// Environment fixture carrying credentials in every secret-bearing field.
pub fn environment_with_credentials(name: &str) -> RenderingEnvironment {
    let mut env = RenderingEnvironment::new(name);
    env.key_vault = Some(KeyVault {
        uri: format!("https://{}-kv.vault.azure.net/", name),
        ..Default::default()
    });
    env.key_vault_service_principal = Some(ServicePrincipal {
        name: format!("{}-sp", name),
        password: Some("sp-password".to_string()),
        ..Default::default()
    });
    env.render_manager_config = Some(RenderManagerConfig {
        deadline: Some(DeadlineConfig {
            repository_password: Some("share-password".to_string()),
            service_password: Some("service-password".to_string()),
            ..Default::default()
        }),
        qube: None,
    });
    env
}
