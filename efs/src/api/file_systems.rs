//! File system API operations.

use serde::{Deserialize, Serialize};

use super::client::{Client, API_VERSION};
use super::error::ApiError;

/// Request body for CreateFileSystem.
#[derive(Debug, Clone, Serialize)]
pub struct CreateFileSystemRequest {
    #[serde(rename = "CreationToken")]
    pub creation_token: String,
}

/// A file system as described by the API.
#[derive(Debug, Clone, Deserialize)]
pub struct FileSystemDescription {
    #[serde(rename = "FileSystemId")]
    pub file_system_id: String,
    #[serde(rename = "CreationToken")]
    pub creation_token: String,
    #[serde(rename = "LifeCycleState")]
    pub life_cycle_state: LifeCycleState,
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub enum LifeCycleState {
    #[serde(rename = "creating")]
    Creating,
    #[serde(rename = "available")]
    Available,
    #[serde(rename = "updating")]
    Updating,
    #[serde(rename = "deleting")]
    Deleting,
    #[serde(rename = "deleted")]
    Deleted,
    #[serde(rename = "error")]
    Error,
}

impl LifeCycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifeCycleState::Creating => "creating",
            LifeCycleState::Available => "available",
            LifeCycleState::Updating => "updating",
            LifeCycleState::Deleting => "deleting",
            LifeCycleState::Deleted => "deleted",
            LifeCycleState::Error => "error",
        }
    }
}

/// Response from GET /{version}/file-systems
#[derive(Debug, Deserialize)]
struct DescribeFileSystemsResponse {
    #[serde(rename = "FileSystems")]
    file_systems: Vec<FileSystemDescription>,
}

impl Client {
    /// POST /{version}/file-systems
    pub async fn create_file_system(
        &self,
        request: &CreateFileSystemRequest,
    ) -> Result<FileSystemDescription, ApiError> {
        self.post(&format!("/{}/file-systems", API_VERSION), request)
            .await
    }

    /// GET /{version}/file-systems?FileSystemId={id}
    ///
    /// An empty result set maps to `NotFound`, matching the not-found error
    /// the service returns for unknown ids.
    pub async fn describe_file_system(
        &self,
        file_system_id: &str,
    ) -> Result<FileSystemDescription, ApiError> {
        let path = format!("/{}/file-systems?FileSystemId={}", API_VERSION, file_system_id);
        let response: DescribeFileSystemsResponse = self.get(&path).await?;

        response
            .file_systems
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::NotFound {
                code: "FileSystemNotFound".to_string(),
                message: format!("File system {} does not exist", file_system_id),
            })
    }

    /// DELETE /{version}/file-systems/{id}
    pub async fn delete_file_system(&self, file_system_id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/{}/file-systems/{}", API_VERSION, file_system_id))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn test_client(server_url: String) -> Client {
        Client::new(&server_url, "test-token", true).unwrap()
    }

    #[tokio::test]
    async fn create_file_system_parses_description() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/2015-02-01/file-systems")
            .with_status(201)
            .with_body(
                r#"{"FileSystemId":"fs-12345678","CreationToken":"tf-acc-test","LifeCycleState":"creating"}"#,
            )
            .create_async()
            .await;

        let client = test_client(server.url());
        let fs = client
            .create_file_system(&CreateFileSystemRequest {
                creation_token: "tf-acc-test".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(fs.file_system_id, "fs-12345678");
        assert_eq!(fs.life_cycle_state, LifeCycleState::Creating);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn describe_returns_first_matching_file_system() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/2015-02-01/file-systems?FileSystemId=fs-12345678")
            .with_body(
                r#"{"FileSystems":[{"FileSystemId":"fs-12345678","CreationToken":"tf-acc-test","LifeCycleState":"available"}]}"#,
            )
            .create_async()
            .await;

        let client = test_client(server.url());
        let fs = client.describe_file_system("fs-12345678").await.unwrap();

        assert_eq!(fs.life_cycle_state, LifeCycleState::Available);
    }

    #[tokio::test]
    async fn describe_with_empty_result_is_not_found() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/2015-02-01/file-systems?FileSystemId=fs-gone")
            .with_body(r#"{"FileSystems":[]}"#)
            .create_async()
            .await;

        let client = test_client(server.url());
        let err = client.describe_file_system("fs-gone").await.unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn delete_discards_empty_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("DELETE", "/2015-02-01/file-systems/fs-12345678")
            .with_status(204)
            .create_async()
            .await;

        let client = test_client(server.url());
        client.delete_file_system("fs-12345678").await.unwrap();

        mock.assert_async().await;
    }
}
