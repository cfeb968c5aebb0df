mod common;

use renderhub_core::entity::{AutoScalePolicy, LicenseMode};
use renderhub_core::{
    ConfigEntity, EnvironmentState, RenderManagerType, RenderingEnvironment, SecretBearing, codec,
};

#[test]
fn test_decode_stored_environment() {
    let env: RenderingEnvironment =
        codec::decode("west-farm", common::stored_environment_json().as_bytes()).unwrap();

    assert_eq!(env.name(), "west-farm");
    assert_eq!(env.state, EnvironmentState::Steady);
    assert_eq!(env.render_manager, RenderManagerType::Deadline);
    assert_eq!(env.auto_scale_configuration.policy, AutoScalePolicy::Resources);
    assert_eq!(env.auto_scale_configuration.max_idle_cpu_percent, 10);
    assert_eq!(env.vault_id(), Some("https://westkv.vault.azure.net/"));

    let deadline = env
        .render_manager_config
        .as_ref()
        .and_then(|rm| rm.deadline.as_ref())
        .unwrap();
    assert_eq!(deadline.license_mode, LicenseMode::LicenseFree);
    assert!(deadline.run_as_service);
    assert_eq!(
        env.resource_group_resource_id().as_deref(),
        Some("/subscriptions/6a3a2b43-3b55-4c4e-9e5b-0d6c7d1b2a10/resourceGroups/west-farm-rg")
    );
}

#[test]
fn test_missing_sections_take_defaults() {
    let env: RenderingEnvironment = codec::decode("bare", br#"{ "Name": "bare" }"#).unwrap();

    assert_eq!(env.state, EnvironmentState::Creating);
    assert_eq!(env.auto_scale_configuration.max_idle_cpu_percent, 5);
    assert!(env.enabled());
    assert_eq!(env.vault_id(), None);
}

#[test]
fn test_encoded_record_drops_credentials() {
    let env = common::environment_with_credentials("east");
    let bytes = codec::encode(env.name(), &env).unwrap();
    let text = String::from_utf8(bytes.clone()).unwrap();

    assert!(!text.contains("password"));

    let mut decoded: RenderingEnvironment = codec::decode("east", &bytes).unwrap();
    assert!(decoded.collect_secrets().iter().all(|(_, v)| v.is_none()));

    let mut expected = env.clone();
    expected.clear_secrets();
    assert_eq!(decoded, expected);
}

#[test]
fn test_monikers_are_distinct() {
    use renderhub_core::{AssetRepository, InstallationPackage};

    let monikers = [
        RenderingEnvironment::MONIKER,
        AssetRepository::MONIKER,
        InstallationPackage::MONIKER,
    ];
    for (i, a) in monikers.iter().enumerate() {
        for b in &monikers[i + 1..] {
            assert_ne!(a, b);
        }
    }
}
