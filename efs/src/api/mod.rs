pub mod backup_policy;
pub mod client;
pub mod error;
pub mod file_systems;

pub use backup_policy::{BackupPolicy, BackupStatus, WaitConfig};
pub use client::{Client, RetryConfig};
pub use error::ApiError;
pub use file_systems::{CreateFileSystemRequest, FileSystemDescription, LifeCycleState};
