//! API-level lifecycle tests driving the resources against a mocked service.

use std::sync::Arc;
use std::time::Duration;

use efs::api::{Client, WaitConfig};
use efs::resources::{BackupPolicyResource, FileSystemResource};
use efs::EfsProviderData;
use mockito::{Server, ServerGuard};
use tfcore::context::Context;
use tfcore::resource::{
    ConfigureResourceRequest, CreateResourceRequest, DeleteResourceRequest,
    ImportResourceStateRequest, ReadResourceRequest, Resource, ResourceWithConfigure,
    ResourceWithImportState, UpdateResourceRequest,
};
use tfcore::types::{has_errors, AttributePath, Dynamic, DynamicValue};

const FS_ID: &str = "fs-12345678";
const POLICY_PATH: &str = "/2015-02-01/file-systems/fs-12345678/backup-policy";

fn fast_wait() -> WaitConfig {
    WaitConfig {
        initial_delay: Duration::from_millis(5),
        max_delay: Duration::from_millis(20),
        timeout: Duration::from_millis(200),
    }
}

fn provider_data(server: &ServerGuard) -> Arc<EfsProviderData> {
    let client = Client::new(&server.url(), "test-token", true).unwrap();
    Arc::new(EfsProviderData::new(client))
}

async fn configured_policy_resource(server: &ServerGuard) -> BackupPolicyResource {
    let mut resource = BackupPolicyResource::with_wait_config(fast_wait());
    let response = resource
        .configure(
            Context::new(),
            ConfigureResourceRequest {
                provider_data: Some(provider_data(server)),
            },
        )
        .await;
    assert!(response.diagnostics.is_empty());
    resource
}

async fn configured_file_system_resource(server: &ServerGuard) -> FileSystemResource {
    let mut resource = FileSystemResource::new();
    let response = resource
        .configure(
            Context::new(),
            ConfigureResourceRequest {
                provider_data: Some(provider_data(server)),
            },
        )
        .await;
    assert!(response.diagnostics.is_empty());
    resource
}

fn policy_config(status: &str) -> DynamicValue {
    let mut value = DynamicValue::new(Dynamic::Map(Default::default()));
    value
        .set_string(&AttributePath::new("file_system_id"), FS_ID.to_string())
        .unwrap();
    value
        .set_list(
            &AttributePath::new("backup_policy"),
            vec![Dynamic::Map(
                [("status".to_string(), Dynamic::String(status.to_string()))]
                    .into_iter()
                    .collect(),
            )],
        )
        .unwrap();
    value
}

fn status_path() -> AttributePath {
    AttributePath::new("backup_policy").index(0).attribute("status")
}

fn policy_body(status: &str) -> String {
    format!(r#"{{"BackupPolicy":{{"Status":"{}"}}}}"#, status)
}

#[tokio::test]
async fn backup_policy_full_lifecycle() {
    let mut server = Server::new_async().await;
    let resource = configured_policy_resource(&server).await;

    // Create: PUT returns a transitional status, polling observes ENABLED.
    let put_enable = server
        .mock("PUT", POLICY_PATH)
        .match_body(policy_body("ENABLED").as_str())
        .with_body(policy_body("ENABLING"))
        .create_async()
        .await;
    let get_enabled = server
        .mock("GET", POLICY_PATH)
        .with_body(policy_body("ENABLED"))
        .create_async()
        .await;

    let create = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: "efs_file_system_backup_policy".to_string(),
                planned_state: policy_config("ENABLED"),
                config: policy_config("ENABLED"),
            },
        )
        .await;

    assert!(!has_errors(&create.diagnostics), "{:?}", create.diagnostics);
    let state = create.new_state;
    assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), FS_ID);
    assert_eq!(state.get_string(&status_path()).unwrap(), "ENABLED");
    put_enable.assert_async().await;

    // Read reflects the remote status.
    let read = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: "efs_file_system_backup_policy".to_string(),
                current_state: state.clone(),
            },
        )
        .await;
    assert!(read.diagnostics.is_empty());
    let read_state = read.new_state.unwrap();
    assert_eq!(read_state.get_string(&status_path()).unwrap(), "ENABLED");

    // Update to DISABLED, converging through DISABLING.
    get_enabled.remove_async().await;
    let put_disable = server
        .mock("PUT", POLICY_PATH)
        .match_body(policy_body("DISABLED").as_str())
        .with_body(policy_body("DISABLING"))
        .create_async()
        .await;
    let get_disabled = server
        .mock("GET", POLICY_PATH)
        .with_body(policy_body("DISABLED"))
        .create_async()
        .await;

    let update = resource
        .update(
            Context::new(),
            UpdateResourceRequest {
                type_name: "efs_file_system_backup_policy".to_string(),
                prior_state: read_state,
                planned_state: policy_config("DISABLED"),
                config: policy_config("DISABLED"),
            },
        )
        .await;

    assert!(!has_errors(&update.diagnostics), "{:?}", update.diagnostics);
    assert_eq!(update.new_state.get_string(&status_path()).unwrap(), "DISABLED");
    put_disable.assert_async().await;

    // Destroy drives the policy to DISABLED again; the service already
    // reports DISABLED so the wait converges immediately.
    let delete = resource
        .delete(
            Context::new(),
            DeleteResourceRequest {
                type_name: "efs_file_system_backup_policy".to_string(),
                prior_state: update.new_state,
            },
        )
        .await;
    assert!(delete.diagnostics.is_empty(), "{:?}", delete.diagnostics);

    drop(get_disabled);
}

#[tokio::test]
async fn backup_policy_disappears_out_of_band() {
    let mut server = Server::new_async().await;
    let resource = configured_policy_resource(&server).await;

    let _get = server
        .mock("GET", POLICY_PATH)
        .with_status(404)
        .with_body(r#"{"ErrorCode":"FileSystemNotFound","Message":"fs-12345678 does not exist"}"#)
        .create_async()
        .await;

    // Read signals absence instead of failing.
    let read = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: "efs_file_system_backup_policy".to_string(),
                current_state: policy_config("ENABLED"),
            },
        )
        .await;
    assert!(read.diagnostics.is_empty());
    assert!(read.new_state.is_none());

    // Destroy against the vanished file system still succeeds.
    let _put = server
        .mock("PUT", POLICY_PATH)
        .with_status(404)
        .with_body(r#"{"ErrorCode":"FileSystemNotFound","Message":"fs-12345678 does not exist"}"#)
        .create_async()
        .await;

    let delete = resource
        .delete(
            Context::new(),
            DeleteResourceRequest {
                type_name: "efs_file_system_backup_policy".to_string(),
                prior_state: policy_config("ENABLED"),
            },
        )
        .await;
    assert!(delete.diagnostics.is_empty());
}

#[tokio::test]
async fn backup_policy_import_reads_live_state() {
    let mut server = Server::new_async().await;
    let resource = configured_policy_resource(&server).await;

    let _get = server
        .mock("GET", POLICY_PATH)
        .with_body(policy_body("ENABLED"))
        .create_async()
        .await;

    let import = resource
        .import_state(
            Context::new(),
            ImportResourceStateRequest {
                type_name: "efs_file_system_backup_policy".to_string(),
                id: FS_ID.to_string(),
            },
        )
        .await;

    assert!(import.diagnostics.is_empty());
    assert_eq!(import.imported_resources.len(), 1);

    let state = &import.imported_resources[0].state;
    assert_eq!(
        state.get_string(&AttributePath::new("file_system_id")).unwrap(),
        FS_ID
    );
    assert_eq!(state.get_string(&status_path()).unwrap(), "ENABLED");
}

#[tokio::test]
async fn backup_policy_import_fails_when_missing() {
    let mut server = Server::new_async().await;
    let resource = configured_policy_resource(&server).await;

    let _get = server
        .mock("GET", POLICY_PATH)
        .with_status(404)
        .with_body(r#"{"ErrorCode":"PolicyNotFound","Message":"no policy"}"#)
        .create_async()
        .await;

    let import = resource
        .import_state(
            Context::new(),
            ImportResourceStateRequest {
                type_name: "efs_file_system_backup_policy".to_string(),
                id: FS_ID.to_string(),
            },
        )
        .await;

    assert!(import.imported_resources.is_empty());
    assert_eq!(import.diagnostics.len(), 1);
}

#[tokio::test]
async fn backup_policy_surfaces_auth_failure() {
    let mut server = Server::new_async().await;
    let resource = configured_policy_resource(&server).await;

    let _put = server
        .mock("PUT", POLICY_PATH)
        .with_status(401)
        .with_body(r#"{"ErrorCode":"AccessDeniedException","Message":"denied"}"#)
        .create_async()
        .await;

    let create = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: "efs_file_system_backup_policy".to_string(),
                planned_state: policy_config("ENABLED"),
                config: policy_config("ENABLED"),
            },
        )
        .await;

    assert_eq!(create.diagnostics.len(), 1);
    assert!(create.diagnostics[0].detail.contains("Authentication failed"));
}

#[tokio::test]
async fn backup_policy_create_times_out_when_stuck() {
    let mut server = Server::new_async().await;
    let resource = configured_policy_resource(&server).await;

    let _put = server
        .mock("PUT", POLICY_PATH)
        .with_body(policy_body("ENABLING"))
        .create_async()
        .await;
    // The status never leaves ENABLING.
    let _get = server
        .mock("GET", POLICY_PATH)
        .with_body(policy_body("ENABLING"))
        .expect_at_least(1)
        .create_async()
        .await;

    let create = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: "efs_file_system_backup_policy".to_string(),
                planned_state: policy_config("ENABLED"),
                config: policy_config("ENABLED"),
            },
        )
        .await;

    assert_eq!(create.diagnostics.len(), 1);
    assert!(create.diagnostics[0].detail.contains("Timeout waiting"));
}

#[tokio::test]
async fn file_system_full_lifecycle() {
    let mut server = Server::new_async().await;
    let resource = configured_file_system_resource(&server).await;

    let _post = server
        .mock("POST", "/2015-02-01/file-systems")
        .with_status(201)
        .with_body(
            r#"{"FileSystemId":"fs-12345678","CreationToken":"tf-acc-test","LifeCycleState":"creating"}"#,
        )
        .create_async()
        .await;

    let mut config = DynamicValue::new(Dynamic::Map(Default::default()));
    config
        .set_string(
            &AttributePath::new("creation_token"),
            "tf-acc-test".to_string(),
        )
        .unwrap();

    let create = resource
        .create(
            Context::new(),
            CreateResourceRequest {
                type_name: "efs_file_system".to_string(),
                planned_state: config.clone(),
                config,
            },
        )
        .await;

    assert!(create.diagnostics.is_empty(), "{:?}", create.diagnostics);
    let state = create.new_state;
    assert_eq!(state.get_string(&AttributePath::new("id")).unwrap(), FS_ID);

    // Read picks up the lifecycle transition to available.
    let _get = server
        .mock("GET", "/2015-02-01/file-systems?FileSystemId=fs-12345678")
        .with_body(
            r#"{"FileSystems":[{"FileSystemId":"fs-12345678","CreationToken":"tf-acc-test","LifeCycleState":"available"}]}"#,
        )
        .create_async()
        .await;

    let read = resource
        .read(
            Context::new(),
            ReadResourceRequest {
                type_name: "efs_file_system".to_string(),
                current_state: state.clone(),
            },
        )
        .await;
    assert!(read.diagnostics.is_empty());
    assert_eq!(
        read.new_state
            .unwrap()
            .get_string(&AttributePath::new("life_cycle_state"))
            .unwrap(),
        "available"
    );

    let _delete_mock = server
        .mock("DELETE", "/2015-02-01/file-systems/fs-12345678")
        .with_status(204)
        .create_async()
        .await;

    let delete = resource
        .delete(
            Context::new(),
            DeleteResourceRequest {
                type_name: "efs_file_system".to_string(),
                prior_state: state,
            },
        )
        .await;
    assert!(delete.diagnostics.is_empty());
}
