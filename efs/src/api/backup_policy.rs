//! Backup policy API operations and convergence waiting.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tokio::sync::watch;

use super::client::{Client, API_VERSION};
use super::error::ApiError;

/// Backup policy status. ENABLING and DISABLING are transitional states the
/// service reports while an update converges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BackupStatus {
    #[serde(rename = "ENABLED")]
    Enabled,
    #[serde(rename = "ENABLING")]
    Enabling,
    #[serde(rename = "DISABLED")]
    Disabled,
    #[serde(rename = "DISABLING")]
    Disabling,
}

impl BackupStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackupStatus::Enabled => "ENABLED",
            BackupStatus::Enabling => "ENABLING",
            BackupStatus::Disabled => "DISABLED",
            BackupStatus::Disabling => "DISABLING",
        }
    }
}

impl fmt::Display for BackupStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackupStatus {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ENABLED" => Ok(BackupStatus::Enabled),
            "ENABLING" => Ok(BackupStatus::Enabling),
            "DISABLED" => Ok(BackupStatus::Disabled),
            "DISABLING" => Ok(BackupStatus::Disabling),
            other => Err(ApiError::Parse(format!(
                "unknown backup policy status: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupPolicy {
    #[serde(rename = "Status")]
    pub status: BackupStatus,
}

/// Wire envelope for both PUT and GET: {"BackupPolicy": {"Status": "..."}}
#[derive(Debug, Serialize, Deserialize)]
pub struct BackupPolicyDescription {
    #[serde(rename = "BackupPolicy")]
    pub backup_policy: BackupPolicy,
}

/// Polling parameters for waiting on a backup policy to converge.
#[derive(Debug, Clone)]
pub struct WaitConfig {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub timeout: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            timeout: Duration::from_secs(60),
        }
    }
}

impl Client {
    /// GET /{version}/file-systems/{id}/backup-policy
    pub async fn get_backup_policy(
        &self,
        file_system_id: &str,
    ) -> Result<BackupPolicy, ApiError> {
        let description: BackupPolicyDescription = self
            .get(&format!(
                "/{}/file-systems/{}/backup-policy",
                API_VERSION, file_system_id
            ))
            .await?;

        Ok(description.backup_policy)
    }

    /// PUT /{version}/file-systems/{id}/backup-policy
    pub async fn put_backup_policy(
        &self,
        file_system_id: &str,
        status: BackupStatus,
    ) -> Result<BackupPolicy, ApiError> {
        let body = BackupPolicyDescription {
            backup_policy: BackupPolicy { status },
        };

        let description: BackupPolicyDescription = self
            .put(
                &format!(
                    "/{}/file-systems/{}/backup-policy",
                    API_VERSION, file_system_id
                ),
                &body,
            )
            .await?;

        Ok(description.backup_policy)
    }

    /// Poll the backup policy until its status matches `desired`.
    ///
    /// Delay doubles between polls, capped at `max_delay`. Exceeding
    /// `timeout` is fatal; a `NotFound` from any poll propagates so callers
    /// can decide what absence means. `cancel` flipping to true aborts the
    /// wait between polls.
    pub async fn wait_for_backup_policy(
        &self,
        file_system_id: &str,
        desired: BackupStatus,
        config: &WaitConfig,
        mut cancel: Option<watch::Receiver<bool>>,
    ) -> Result<BackupPolicy, ApiError> {
        let deadline = tokio::time::Instant::now() + config.timeout;
        let mut delay = config.initial_delay;

        loop {
            if let Some(rx) = &cancel {
                if *rx.borrow() {
                    return Err(ApiError::Cancelled {
                        resource: format!("backup policy for {}", file_system_id),
                    });
                }
            }

            let policy = self.get_backup_policy(file_system_id).await?;
            if policy.status == desired {
                tracing::debug!(
                    file_system_id,
                    status = %policy.status,
                    "backup policy converged"
                );
                return Ok(policy);
            }

            tracing::debug!(
                file_system_id,
                current = %policy.status,
                desired = %desired,
                "backup policy still converging"
            );

            let now = tokio::time::Instant::now();
            if now + delay >= deadline {
                return Err(ApiError::WaitTimeout {
                    resource: format!("backup policy for {}", file_system_id),
                    seconds: config.timeout.as_secs(),
                });
            }

            match &mut cancel {
                Some(rx) => {
                    tokio::select! {
                        _ = tokio::time::sleep(delay) => {}
                        changed = rx.changed() => {
                            if changed.is_ok() && *rx.borrow() {
                                return Err(ApiError::Cancelled {
                                    resource: format!("backup policy for {}", file_system_id),
                                });
                            }
                        }
                    }
                }
                None => tokio::time::sleep(delay).await,
            }

            delay = std::cmp::min(delay * 2, config.max_delay);
        }
    }
}
