//! Backup policy resource implementation

use async_trait::async_trait;
use std::collections::HashMap;
use tfcore::context::Context;
use tfcore::resource::{
    ConfigureResourceRequest, ConfigureResourceResponse, CreateResourceRequest,
    CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ImportResourceStateRequest, ImportResourceStateResponse, ImportedResource,
    ReadResourceRequest, ReadResourceResponse, Resource, ResourceSchemaRequest,
    ResourceSchemaResponse, ResourceWithConfigure, ResourceWithImportState,
    UpdateResourceRequest, UpdateResourceResponse, ValidateResourceConfigRequest,
    ValidateResourceConfigResponse,
};
use tfcore::schema::{AttributeBuilder, AttributeType, NestedBlockBuilder, NestingMode, SchemaBuilder};
use tfcore::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

use crate::api::{BackupStatus, WaitConfig};

#[derive(Default)]
pub struct BackupPolicyResource {
    provider_data: Option<crate::EfsProviderData>,
    wait_config: WaitConfig,
}

impl BackupPolicyResource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the convergence polling parameters. Tests use this to keep
    /// polling intervals short.
    pub fn with_wait_config(wait_config: WaitConfig) -> Self {
        Self {
            provider_data: None,
            wait_config,
        }
    }

    fn status_path() -> AttributePath {
        AttributePath::new("backup_policy").index(0).attribute("status")
    }

    /// Builds a full resource state from the file system id and status.
    ///
    /// The id attribute mirrors file_system_id: a file system has at most one
    /// backup policy, so the policy borrows its identity.
    fn build_state(file_system_id: &str, status: BackupStatus) -> DynamicValue {
        let mut policy = HashMap::new();
        policy.insert(
            "status".to_string(),
            Dynamic::String(status.as_str().to_string()),
        );

        let mut root = HashMap::new();
        root.insert(
            "id".to_string(),
            Dynamic::String(file_system_id.to_string()),
        );
        root.insert(
            "file_system_id".to_string(),
            Dynamic::String(file_system_id.to_string()),
        );
        root.insert(
            "backup_policy".to_string(),
            Dynamic::List(vec![Dynamic::Map(policy)]),
        );

        DynamicValue::new(Dynamic::Map(root))
    }

    fn desired_status(config: &DynamicValue) -> Result<BackupStatus, Diagnostic> {
        let status = config.get_string(&Self::status_path()).map_err(|_| {
            Diagnostic::error(
                "Missing backup policy status",
                "The 'status' attribute is required inside the backup_policy block",
            )
            .with_attribute(Self::status_path())
        })?;

        status.parse().map_err(|_| {
            Diagnostic::error(
                "Invalid backup policy status",
                format!("Status must be ENABLED or DISABLED, got {:?}", status),
            )
            .with_attribute(Self::status_path())
        })
    }

    fn provider_data(&self) -> Result<&crate::EfsProviderData, Diagnostic> {
        self.provider_data.as_ref().ok_or_else(|| {
            Diagnostic::error(
                "Provider not configured",
                "Provider data was not properly configured",
            )
        })
    }
}

#[async_trait]
impl Resource for BackupPolicyResource {
    fn type_name(&self) -> &str {
        "efs_file_system_backup_policy"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Manages the automatic backup policy of a file system")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("The ID of the file system the policy belongs to")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("file_system_id", AttributeType::String)
                    .description("The ID of the file system to manage the backup policy for")
                    .required()
                    .build(),
            )
            .block(
                NestedBlockBuilder::new("backup_policy", NestingMode::List)
                    .min_items(1)
                    .max_items(1)
                    .description("The backup policy to apply")
                    .attribute(
                        AttributeBuilder::new("status", AttributeType::String)
                            .description("Whether automatic backups are on (ENABLED or DISABLED)")
                            .required()
                            .build(),
                    )
                    .build(),
            )
            .build();

        ResourceSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn validate(
        &self,
        _ctx: Context,
        request: ValidateResourceConfigRequest,
    ) -> ValidateResourceConfigResponse {
        let mut diagnostics = vec![];

        // Only the terminal states are valid configuration; ENABLING and
        // DISABLING are observed, never requested.
        if let Ok(status) = request.config.get_string(&Self::status_path()) {
            if status != BackupStatus::Enabled.as_str()
                && status != BackupStatus::Disabled.as_str()
            {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid backup policy status",
                        format!("Status must be ENABLED or DISABLED, got {:?}", status),
                    )
                    .with_attribute(Self::status_path()),
                );
            }
        }

        ValidateResourceConfigResponse { diagnostics }
    }

    async fn create(&self, ctx: Context, request: CreateResourceRequest) -> CreateResourceResponse {
        let mut diagnostics = vec![];

        let provider_data = match self.provider_data() {
            Ok(data) => data,
            Err(diag) => {
                diagnostics.push(diag);
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        let file_system_id = match request
            .config
            .get_string(&AttributePath::new("file_system_id"))
        {
            Ok(id) => id,
            Err(_) => {
                diagnostics.push(Diagnostic::error(
                    "Missing file_system_id",
                    "The 'file_system_id' attribute is required",
                ));
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        let desired = match Self::desired_status(&request.config) {
            Ok(status) => status,
            Err(diag) => {
                diagnostics.push(diag);
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        tracing::info!(%file_system_id, status = %desired, "creating backup policy");

        if let Err(e) = provider_data
            .client
            .put_backup_policy(&file_system_id, desired)
            .await
        {
            diagnostics.push(Diagnostic::error(
                "Failed to create backup policy",
                format!("API error: {}", e),
            ));
            return CreateResourceResponse {
                new_state: request.planned_state,
                diagnostics,
            };
        }

        match provider_data
            .client
            .wait_for_backup_policy(&file_system_id, desired, &self.wait_config, Some(ctx.done()))
            .await
        {
            Ok(policy) => CreateResourceResponse {
                new_state: Self::build_state(&file_system_id, policy.status),
                diagnostics,
            },
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Backup policy did not converge",
                    format!("API error: {}", e),
                ));
                CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                }
            }
        }
    }

    async fn read(&self, _ctx: Context, request: ReadResourceRequest) -> ReadResourceResponse {
        let mut diagnostics = vec![];

        let provider_data = match self.provider_data() {
            Ok(data) => data,
            Err(diag) => {
                diagnostics.push(diag);
                return ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                };
            }
        };

        let file_system_id = match request
            .current_state
            .get_string(&AttributePath::new("file_system_id"))
        {
            Ok(id) => id,
            // State without an id cannot map to a remote object.
            Err(_) => {
                return ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                }
            }
        };

        match provider_data.client.get_backup_policy(&file_system_id).await {
            Ok(policy) => ReadResourceResponse {
                new_state: Some(Self::build_state(&file_system_id, policy.status)),
                diagnostics,
            },
            // Policy or file system is gone; signal recreation, not failure.
            Err(e) if e.is_not_found() => ReadResourceResponse {
                new_state: None,
                diagnostics,
            },
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to read backup policy",
                    format!("API error: {}", e),
                ));
                ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                }
            }
        }
    }

    async fn update(&self, ctx: Context, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let mut diagnostics = vec![];

        let provider_data = match self.provider_data() {
            Ok(data) => data,
            Err(diag) => {
                diagnostics.push(diag);
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        };

        let file_system_id = match request
            .prior_state
            .get_string(&AttributePath::new("file_system_id"))
        {
            Ok(id) => id,
            Err(_) => {
                diagnostics.push(Diagnostic::error(
                    "Missing file_system_id",
                    "Prior state does not contain a file_system_id",
                ));
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        };

        let desired = match Self::desired_status(&request.config) {
            Ok(status) => status,
            Err(diag) => {
                diagnostics.push(diag);
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        };

        tracing::info!(%file_system_id, status = %desired, "updating backup policy");

        if let Err(e) = provider_data
            .client
            .put_backup_policy(&file_system_id, desired)
            .await
        {
            diagnostics.push(Diagnostic::error(
                "Failed to update backup policy",
                format!("API error: {}", e),
            ));
            return UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics,
            };
        }

        match provider_data
            .client
            .wait_for_backup_policy(&file_system_id, desired, &self.wait_config, Some(ctx.done()))
            .await
        {
            Ok(policy) => UpdateResourceResponse {
                new_state: Self::build_state(&file_system_id, policy.status),
                diagnostics,
            },
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Backup policy did not converge",
                    format!("API error: {}", e),
                ));
                UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                }
            }
        }
    }

    /// The API has no DELETE for backup policies: destroying the resource
    /// drives the policy to DISABLED and waits for it to settle.
    async fn delete(&self, ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let mut diagnostics = vec![];

        let provider_data = match self.provider_data() {
            Ok(data) => data,
            Err(diag) => {
                diagnostics.push(diag);
                return DeleteResourceResponse { diagnostics };
            }
        };

        let file_system_id = match request
            .prior_state
            .get_string(&AttributePath::new("file_system_id"))
        {
            Ok(id) => id,
            // Nothing to disable without an id.
            Err(_) => return DeleteResourceResponse { diagnostics },
        };

        tracing::info!(%file_system_id, "disabling backup policy on destroy");

        match provider_data
            .client
            .put_backup_policy(&file_system_id, BackupStatus::Disabled)
            .await
        {
            Ok(_) => {}
            // Already gone counts as deleted.
            Err(e) if e.is_not_found() => return DeleteResourceResponse { diagnostics },
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to disable backup policy",
                    format!("API error: {}", e),
                ));
                return DeleteResourceResponse { diagnostics };
            }
        }

        match provider_data
            .client
            .wait_for_backup_policy(
                &file_system_id,
                BackupStatus::Disabled,
                &self.wait_config,
                Some(ctx.done()),
            )
            .await
        {
            Ok(_) => {}
            Err(e) if e.is_not_found() => {}
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Backup policy did not converge",
                    format!("API error: {}", e),
                ));
            }
        }

        DeleteResourceResponse { diagnostics }
    }
}

#[async_trait]
impl ResourceWithConfigure for BackupPolicyResource {
    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureResourceRequest,
    ) -> ConfigureResourceResponse {
        let mut diagnostics = vec![];

        if let Some(data) = request.provider_data {
            if let Some(provider_data) = data.downcast_ref::<crate::EfsProviderData>() {
                self.provider_data = Some(provider_data.clone());
            } else {
                diagnostics.push(Diagnostic::error(
                    "Invalid provider data",
                    "Failed to extract EfsProviderData from provider data",
                ));
            }
        } else {
            diagnostics.push(Diagnostic::error(
                "No provider data",
                "No provider data was provided to the resource",
            ));
        }

        ConfigureResourceResponse { diagnostics }
    }
}

#[async_trait]
impl ResourceWithImportState for BackupPolicyResource {
    /// Import takes the file system id and rebuilds the full state from a
    /// live read, so a missing remote policy fails the import.
    async fn import_state(
        &self,
        _ctx: Context,
        request: ImportResourceStateRequest,
    ) -> ImportResourceStateResponse {
        let mut diagnostics = vec![];

        let provider_data = match self.provider_data() {
            Ok(data) => data,
            Err(diag) => {
                diagnostics.push(diag);
                return ImportResourceStateResponse {
                    imported_resources: vec![],
                    diagnostics,
                };
            }
        };

        match provider_data.client.get_backup_policy(&request.id).await {
            Ok(policy) => ImportResourceStateResponse {
                imported_resources: vec![ImportedResource {
                    type_name: request.type_name,
                    state: Self::build_state(&request.id, policy.status),
                }],
                diagnostics,
            },
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to import backup policy",
                    format!("Cannot read backup policy for {}: {}", request.id, e),
                ));
                ImportResourceStateResponse {
                    imported_resources: vec![],
                    diagnostics,
                }
            }
        }
    }
}
