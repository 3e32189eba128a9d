use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::error::PollerError;

/// Parameters sent with every request of a task. Fixed for the lifetime of the task.
#[derive(Clone, PartialEq, Eq, Deserialize, Serialize, utoipa::ToSchema)]
pub struct RequestParameters {
    /// NORAD catalog id of the tracked platform.
    pub platform_id: String,
    pub caller_ip: String,
    /// Lookback window of the query.
    pub window_seconds: u32,
    pub license_key: String,
}

impl RequestParameters {
    pub fn new(platform_id: &str, caller_ip: &str, window_seconds: u32, license_key: &str) -> Self {
        Self {
            platform_id: platform_id.to_string(),
            caller_ip: caller_ip.to_string(),
            window_seconds,
            license_key: license_key.to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), PollerError> {
        if self.platform_id.trim().is_empty() {
            return Err(PollerError::InvalidParameters("platform_id is empty".into()));
        }
        if self.license_key.trim().is_empty() {
            return Err(PollerError::InvalidParameters("license_key is empty".into()));
        }
        Ok(())
    }
}

impl fmt::Debug for RequestParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestParameters")
            .field("platform_id", &self.platform_id)
            .field("caller_ip", &self.caller_ip)
            .field("window_seconds", &self.window_seconds)
            .field("license_key", &"<redacted>")
            .finish()
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display, utoipa::ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskState {
    Idle,
    Running,
    Stopped,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct TaskStatus {
    pub id: Uuid,
    pub state: TaskState,
    pub platform_id: String,
    pub started_at: DateTime<Utc>,
    pub stopped_at: Option<DateTime<Utc>>,
    pub last_update: Option<DateTime<Utc>>,
    /// Completed cycles, successful or not.
    pub cycles: u64,
    pub publications: u64,
    pub failures: u64,
    pub last_error: Option<String>,
}

impl TaskStatus {
    pub(crate) fn new(id: Uuid, platform_id: &str) -> Self {
        Self {
            id,
            state: TaskState::Idle,
            platform_id: platform_id.to_string(),
            started_at: Utc::now(),
            stopped_at: None,
            last_update: None,
            cycles: 0,
            publications: 0,
            failures: 0,
            last_error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_license_key() {
        let params = RequestParameters::new("27424", "10.0.0.5", 1, "SECRET-KEY");
        let printed = format!("{:?}", params);
        assert!(printed.contains("27424"));
        assert!(!printed.contains("SECRET-KEY"));
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        assert!(RequestParameters::new("27424", "10.0.0.5", 1, "ABC")
            .validate()
            .is_ok());
        assert!(matches!(
            RequestParameters::new(" ", "10.0.0.5", 1, "ABC").validate(),
            Err(PollerError::InvalidParameters(_))
        ));
        assert!(matches!(
            RequestParameters::new("27424", "10.0.0.5", 1, "").validate(),
            Err(PollerError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_parameters_deserialize_from_json() {
        let json = r#"{"platform_id":"27424","caller_ip":"10.0.0.5","window_seconds":1,"license_key":"ABC"}"#;
        let params: RequestParameters = serde_json::from_str(json).unwrap();
        assert_eq!(params, RequestParameters::new("27424", "10.0.0.5", 1, "ABC"));
    }

    #[test]
    fn test_task_state_display() {
        assert_eq!(TaskState::Running.to_string(), "running");
        assert_eq!(
            serde_json::to_string(&TaskState::Stopped).unwrap(),
            "\"stopped\""
        );
    }
}
