//! Admin API data-transfer types.
//!
//! Mirrors the backend's JSON 1:1 (camelCase on the wire). The admin
//! endpoints return entities directly, without a result envelope. Nothing here
//! validates content; absent fields fall back to empty/zero defaults.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Raw login payload. `success` and `token` decide whether a session exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoginResponse {
    pub success: bool,
    pub username: Option<String>,
    pub token: Option<String>,
}

/// A credential issued by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub username: String,
    pub token: String,
}

// ---------------------------------------------------------------------------
// Scheduled tasks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduledTaskItem {
    pub id: i64,
    pub task_key: String,
    pub cron_expression: Option<String>,
    /// 1 = enabled, 0 = disabled.
    pub enabled: i32,
    pub description: Option<String>,
    pub create_time: Option<String>,
    pub update_time: Option<String>,
}

impl ScheduledTaskItem {
    pub fn is_enabled(&self) -> bool {
        self.enabled != 0
    }
}

/// Partial update; absent fields are left untouched by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledTaskUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cron_expression: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// LLM configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmConfigAccountItem {
    pub name: String,
    pub account: String,
    pub api_key: String,
    pub status: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmConfigResponse {
    pub api_url: String,
    pub model_id: String,
    pub accounts: Vec<LlmConfigAccountItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LlmConfigRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accounts: Option<Vec<LlmConfigAccountItem>>,
}

// ---------------------------------------------------------------------------
// LLM call logs
// ---------------------------------------------------------------------------

/// One recorded LLM request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmRequestLogItem {
    pub id: Option<i64>,
    pub prompt: Option<String>,
    pub response: Option<String>,
    pub model_type: Option<String>,
    pub account_name: Option<String>,
    pub task_type: Option<String>,
    pub biz_key: Option<String>,
    pub create_time: Option<String>,
    pub request_duration_ms: Option<i64>,
    pub input_tokens: Option<i64>,
    pub output_tokens: Option<i64>,
    pub status: Option<String>,
}

/// One page of call logs. Each field defaults independently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmLogPageResult {
    pub list: Vec<LlmRequestLogItem>,
    pub total: u64,
    pub pages: u64,
}

/// Query for [`LlmLogPageResult`]. Absent fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LlmLogQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
    pub task_type: Option<String>,
}

// ---------------------------------------------------------------------------
// System configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SysConfigItem {
    pub id: i64,
    pub config_key: String,
    pub config_value: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SysConfigUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_value: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
