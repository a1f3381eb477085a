pub mod backup_policy;
pub mod file_system;

pub use backup_policy::BackupPolicyResource;
pub use file_system::FileSystemResource;
