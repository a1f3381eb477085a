//! File system resource implementation

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
use tfcore::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfcore::types::{AttributePath, Diagnostic, Dynamic, DynamicValue};

use crate::api::{CreateFileSystemRequest, FileSystemDescription};

#[derive(Default)]
pub struct FileSystemResource {
    provider_data: Option<crate::EfsProviderData>,
}

impl FileSystemResource {
    pub fn new() -> Self {
        Self::default()
    }

    fn build_state(description: &FileSystemDescription) -> DynamicValue {
        let mut root = HashMap::new();
        root.insert(
            "id".to_string(),
            Dynamic::String(description.file_system_id.clone()),
        );
        root.insert(
            "creation_token".to_string(),
            Dynamic::String(description.creation_token.clone()),
        );
        root.insert(
            "life_cycle_state".to_string(),
            Dynamic::String(description.life_cycle_state.as_str().to_string()),
        );
        if let Some(name) = &description.name {
            root.insert("name".to_string(), Dynamic::String(name.clone()));
        }

        DynamicValue::new(Dynamic::Map(root))
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
impl Resource for FileSystemResource {
    fn type_name(&self) -> &str {
        "efs_file_system"
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ResourceSchemaRequest,
    ) -> ResourceSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Manages an elastic file system")
            .attribute(
                AttributeBuilder::new("id", AttributeType::String)
                    .description("The ID of the file system")
                    .computed()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("creation_token", AttributeType::String)
                    .description("Opaque token used to make creation idempotent")
                    .required()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("name", AttributeType::String)
                    .description("Friendly name of the file system")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("life_cycle_state", AttributeType::String)
                    .description("Current lifecycle phase reported by the service")
                    .computed()
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

        if let Ok(token) = request
            .config
            .get_string(&AttributePath::new("creation_token"))
        {
            if token.is_empty() {
                diagnostics.push(
                    Diagnostic::error(
                        "Invalid creation token",
                        "creation_token must not be empty",
                    )
                    .with_attribute(AttributePath::new("creation_token")),
                );
            }
        }

        ValidateResourceConfigResponse { diagnostics }
    }

    async fn create(
        &self,
        _ctx: Context,
        request: CreateResourceRequest,
    ) -> CreateResourceResponse {
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

        let creation_token = match request
            .config
            .get_string(&AttributePath::new("creation_token"))
        {
            Ok(token) => token,
            Err(_) => {
                diagnostics.push(Diagnostic::error(
                    "Missing creation_token",
                    "The 'creation_token' attribute is required",
                ));
                return CreateResourceResponse {
                    new_state: request.planned_state,
                    diagnostics,
                };
            }
        };

        tracing::info!(%creation_token, "creating file system");

        match provider_data
            .client
            .create_file_system(&CreateFileSystemRequest { creation_token })
            .await
        {
            Ok(description) => CreateResourceResponse {
                new_state: Self::build_state(&description),
                diagnostics,
            },
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to create file system",
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

        let id = match request.current_state.get_string(&AttributePath::new("id")) {
            Ok(id) => id,
            Err(_) => {
                return ReadResourceResponse {
                    new_state: None,
                    diagnostics,
                }
            }
        };

        match provider_data.client.describe_file_system(&id).await {
            Ok(description) => ReadResourceResponse {
                new_state: Some(Self::build_state(&description)),
                diagnostics,
            },
            Err(e) if e.is_not_found() => ReadResourceResponse {
                new_state: None,
                diagnostics,
            },
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to read file system",
                    format!("API error: {}", e),
                ));
                ReadResourceResponse {
                    new_state: Some(request.current_state),
                    diagnostics,
                }
            }
        }
    }

    /// Every configurable attribute forces replacement, so update only
    /// refreshes computed attributes from the service.
    async fn update(
        &self,
        _ctx: Context,
        request: UpdateResourceRequest,
    ) -> UpdateResourceResponse {
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

        let id = match request.prior_state.get_string(&AttributePath::new("id")) {
            Ok(id) => id,
            Err(_) => {
                diagnostics.push(Diagnostic::error(
                    "Missing id",
                    "Prior state does not contain an id",
                ));
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                };
            }
        };

        match provider_data.client.describe_file_system(&id).await {
            Ok(description) => UpdateResourceResponse {
                new_state: Self::build_state(&description),
                diagnostics,
            },
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to refresh file system",
                    format!("API error: {}", e),
                ));
                UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics,
                }
            }
        }
    }

    async fn delete(&self, _ctx: Context, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let mut diagnostics = vec![];

        let provider_data = match self.provider_data() {
            Ok(data) => data,
            Err(diag) => {
                diagnostics.push(diag);
                return DeleteResourceResponse { diagnostics };
            }
        };

        let id = match request.prior_state.get_string(&AttributePath::new("id")) {
            Ok(id) => id,
            Err(_) => return DeleteResourceResponse { diagnostics },
        };

        tracing::info!(file_system_id = %id, "deleting file system");

        match provider_data.client.delete_file_system(&id).await {
            Ok(()) => DeleteResourceResponse { diagnostics },
            // Already gone counts as deleted.
            Err(e) if e.is_not_found() => DeleteResourceResponse { diagnostics },
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to delete file system",
                    format!("API error: {}", e),
                ));
                DeleteResourceResponse { diagnostics }
            }
        }
    }
}

#[async_trait]
impl ResourceWithConfigure for FileSystemResource {
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
impl ResourceWithImportState for FileSystemResource {
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

        match provider_data.client.describe_file_system(&request.id).await {
            Ok(description) => ImportResourceStateResponse {
                imported_resources: vec![ImportedResource {
                    type_name: request.type_name,
                    state: Self::build_state(&description),
                }],
                diagnostics,
            },
            Err(e) => {
                diagnostics.push(Diagnostic::error(
                    "Failed to import file system",
                    format!("Cannot read file system {}: {}", request.id, e),
                ));
                ImportResourceStateResponse {
                    imported_resources: vec![],
                    diagnostics,
                }
            }
        }
    }
}
