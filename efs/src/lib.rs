pub mod api;
pub mod provider_data;
pub mod resources;

pub use provider_data::EfsProviderData;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tfcore::context::Context;
use tfcore::provider::{
    ConfigureProviderRequest, ConfigureProviderResponse, Provider, ProviderSchemaRequest,
    ProviderSchemaResponse, ResourceFactory,
};
use tfcore::schema::{AttributeBuilder, AttributeType, SchemaBuilder};
use tfcore::types::{AttributePath, Diagnostic};

pub struct EfsProvider {
    provider_data: Option<EfsProviderData>,
}

impl Default for EfsProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl EfsProvider {
    pub fn new() -> Self {
        Self {
            provider_data: None,
        }
    }
}

#[async_trait]
impl Provider for EfsProvider {
    fn type_name(&self) -> &str {
        names::EFS
    }

    async fn schema(
        &self,
        _ctx: Context,
        _request: ProviderSchemaRequest,
    ) -> ProviderSchemaResponse {
        let schema = SchemaBuilder::new()
            .version(0)
            .description("Provider for an EFS-style elastic file system service")
            .attribute(
                AttributeBuilder::new("endpoint", AttributeType::String)
                    .description("API endpoint URL (falls back to EFS_ENDPOINT)")
                    .optional()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("api_token", AttributeType::String)
                    .description("Bearer token for API authentication (falls back to EFS_API_TOKEN)")
                    .optional()
                    .sensitive()
                    .build(),
            )
            .attribute(
                AttributeBuilder::new("insecure", AttributeType::Bool)
                    .description("Skip TLS certificate verification (falls back to EFS_INSECURE)")
                    .optional()
                    .build(),
            )
            .build();

        ProviderSchemaResponse {
            schema,
            diagnostics: vec![],
        }
    }

    async fn configure(
        &mut self,
        _ctx: Context,
        request: ConfigureProviderRequest,
    ) -> ConfigureProviderResponse {
        let endpoint = request
            .config
            .get_string(&AttributePath::new("endpoint"))
            .ok()
            .or_else(|| std::env::var("EFS_ENDPOINT").ok());

        let api_token = request
            .config
            .get_string(&AttributePath::new("api_token"))
            .ok()
            .or_else(|| std::env::var("EFS_API_TOKEN").ok());

        let insecure = request
            .config
            .get_bool(&AttributePath::new("insecure"))
            .ok()
            .or_else(|| {
                std::env::var("EFS_INSECURE")
                    .ok()
                    .and_then(|v| v.parse::<bool>().ok())
            })
            .unwrap_or(false);

        let mut diagnostics = vec![];

        match (endpoint, api_token) {
            (Some(endpoint), Some(api_token)) => {
                match api::Client::new(&endpoint, &api_token, insecure) {
                    Ok(client) => {
                        let data = EfsProviderData::new(client);
                        self.provider_data = Some(data.clone());
                        return ConfigureProviderResponse {
                            provider_data: Some(Arc::new(data)),
                            diagnostics,
                        };
                    }
                    Err(e) => {
                        diagnostics.push(Diagnostic::error(
                            "Failed to create API client",
                            format!("{}", e),
                        ));
                    }
                }
            }
            (None, _) => {
                diagnostics.push(Diagnostic::error(
                    "endpoint is required (set in provider config or EFS_ENDPOINT env var)",
                    "The provider cannot reach the API without an endpoint",
                ));
            }
            (_, None) => {
                diagnostics.push(Diagnostic::error(
                    "api_token is required (set in provider config or EFS_API_TOKEN env var)",
                    "The provider cannot authenticate without a token",
                ));
            }
        }

        ConfigureProviderResponse {
            provider_data: None,
            diagnostics,
        }
    }

    fn resources(&self) -> HashMap<String, ResourceFactory> {
        let mut factories: HashMap<String, ResourceFactory> = HashMap::new();
        factories.insert(
            "efs_file_system".to_string(),
            Box::new(|| Box::new(resources::FileSystemResource::new())),
        );
        factories.insert(
            "efs_file_system_backup_policy".to_string(),
            Box::new(|| Box::new(resources::BackupPolicyResource::new())),
        );
        factories
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tfcore::resource::Resource;
    use tfcore::types::DynamicValue;

    fn empty_request() -> ConfigureProviderRequest {
        ConfigureProviderRequest {
            config: DynamicValue::empty_object(),
        }
    }

    #[tokio::test]
    #[serial]
    async fn provider_configures_successfully_with_env_vars() {
        std::env::set_var("EFS_ENDPOINT", "https://localhost:9000");
        std::env::set_var("EFS_API_TOKEN", "test-token");
        std::env::set_var("EFS_INSECURE", "true");

        let mut provider = EfsProvider::new();
        let response = provider.configure(Context::new(), empty_request()).await;

        assert!(response.diagnostics.is_empty());
        assert!(response.provider_data.is_some());
        assert!(provider.provider_data.is_some());

        std::env::remove_var("EFS_ENDPOINT");
        std::env::remove_var("EFS_API_TOKEN");
        std::env::remove_var("EFS_INSECURE");
    }

    #[tokio::test]
    #[serial]
    async fn provider_configure_requires_endpoint() {
        std::env::remove_var("EFS_ENDPOINT");
        std::env::set_var("EFS_API_TOKEN", "test-token");

        let mut provider = EfsProvider::new();
        let response = provider.configure(Context::new(), empty_request()).await;

        assert_eq!(response.diagnostics.len(), 1);
        assert!(response.diagnostics[0]
            .summary
            .contains("endpoint is required"));

        std::env::remove_var("EFS_API_TOKEN");
    }

    #[tokio::test]
    #[serial]
    async fn provider_configure_requires_api_token() {
        std::env::set_var("EFS_ENDPOINT", "https://localhost:9000");
        std::env::remove_var("EFS_API_TOKEN");

        let mut provider = EfsProvider::new();
        let response = provider.configure(Context::new(), empty_request()).await;

        assert_eq!(response.diagnostics.len(), 1);
        assert!(response.diagnostics[0]
            .summary
            .contains("api_token is required"));

        std::env::remove_var("EFS_ENDPOINT");
    }

    #[tokio::test]
    #[serial]
    async fn provider_config_attributes_win_over_env_vars() {
        std::env::set_var("EFS_ENDPOINT", "https://env.example.com");
        std::env::set_var("EFS_API_TOKEN", "env-token");

        let mut config = DynamicValue::empty_object();
        config
            .set_string(
                &AttributePath::new("endpoint"),
                "https://config.example.com".to_string(),
            )
            .unwrap();
        config
            .set_string(&AttributePath::new("api_token"), "config-token".to_string())
            .unwrap();

        let mut provider = EfsProvider::new();
        let response = provider
            .configure(Context::new(), ConfigureProviderRequest { config })
            .await;

        assert!(response.diagnostics.is_empty());
        assert!(response.provider_data.is_some());

        std::env::remove_var("EFS_ENDPOINT");
        std::env::remove_var("EFS_API_TOKEN");
    }

    #[tokio::test]
    async fn provider_schema_marks_api_token_sensitive() {
        let provider = EfsProvider::new();
        let response = provider.schema(Context::new(), ProviderSchemaRequest).await;

        let schema = response.schema;
        assert!(schema.attribute("endpoint").unwrap().optional);
        assert!(schema.attribute("api_token").unwrap().sensitive);
        assert!(schema.attribute("insecure").unwrap().optional);
    }

    #[tokio::test]
    async fn provider_exposes_both_resource_factories() {
        let provider = EfsProvider::new();
        let factories = provider.resources();

        assert_eq!(factories.len(), 2);

        let resource = factories["efs_file_system"]();
        assert_eq!(resource.type_name(), "efs_file_system");

        let resource = factories["efs_file_system_backup_policy"]();
        assert_eq!(resource.type_name(), "efs_file_system_backup_policy");
    }
}
