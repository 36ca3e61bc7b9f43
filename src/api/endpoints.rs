//! Typed endpoint functions, one per admin backend operation.
//!
//! Each method forwards to the shared [`HttpClient`] and normalizes the
//! response. Mutating calls return `()`: success means "did not fail".

use serde::Deserialize;
use serde::de::DeserializeOwned;

use super::client::{HttpClient, OutboundRequest};
use super::error::ApiError;
use super::types::{
    AdminCredentials, LlmConfigRequest, LlmConfigResponse, LlmLogPageResult, LlmLogQuery,
    LlmRequestLogItem, LoginRequest, LoginResponse, ScheduledTaskItem,
    ScheduledTaskUpdateRequest, SysConfigItem, SysConfigUpdateRequest,
};
use crate::constants::LOGIN_PATH;

const LOGOUT_PATH: &str = "/admin/auth/logout";
const SCHEDULED_TASK_PATH: &str = "/admin/scheduled-task";
const LLM_CONFIG_PATH: &str = "/admin/llm/config";
const LLM_LOGS_PATH: &str = "/admin/llm/logs";
const SYS_CONFIG_PATH: &str = "/admin/config";

/// Wire shape of a log page; every field may be missing or null.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LlmLogPageWire {
    list: Option<Vec<LlmRequestLogItem>>,
    total: Option<u64>,
    pages: Option<u64>,
}

/// The admin backend, seen through the process-wide client.
#[derive(Debug)]
pub struct AdminApi {
    client: HttpClient,
}

impl AdminApi {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    // -----------------------------------------------------------------------
    // Auth
    // -----------------------------------------------------------------------

    /// `POST /admin/auth/login`.
    ///
    /// Success is decided by the payload: a 200 whose `success` flag is false
    /// or whose token is missing fails with [`ApiError::LoginRejected`].
    pub fn admin_login(&self, req: &LoginRequest) -> Result<AdminCredentials, ApiError> {
        let request = OutboundRequest::post(LOGIN_PATH)
            .skip_global_error()
            .json(req)?;
        let resp: LoginResponse = self.fetch(request)?.unwrap_or_default();

        match resp {
            LoginResponse {
                success: true,
                token: Some(token),
                username,
            } if !token.is_empty() => Ok(AdminCredentials {
                username: username.unwrap_or_else(|| req.username.clone()),
                token,
            }),
            _ => Err(ApiError::LoginRejected),
        }
    }

    /// `POST /admin/auth/logout`.
    pub fn admin_logout(&self) -> Result<(), ApiError> {
        self.send(OutboundRequest::post(LOGOUT_PATH))
    }

    // -----------------------------------------------------------------------
    // Scheduled tasks
    // -----------------------------------------------------------------------

    /// `GET /admin/scheduled-task`.
    pub fn get_scheduled_task_list(&self) -> Result<Vec<ScheduledTaskItem>, ApiError> {
        Ok(self
            .fetch(OutboundRequest::get(SCHEDULED_TASK_PATH))?
            .unwrap_or_default())
    }

    /// `PATCH /admin/scheduled-task/{taskKey}`.
    pub fn update_scheduled_task(
        &self,
        task_key: &str,
        body: &ScheduledTaskUpdateRequest,
    ) -> Result<(), ApiError> {
        let path = format!("{SCHEDULED_TASK_PATH}/{}", encode_segment(task_key));
        self.send(OutboundRequest::patch(path).json(body)?)
    }

    /// `POST /admin/scheduled-task/refresh`: reload the scheduler.
    pub fn refresh_scheduled_tasks(&self) -> Result<(), ApiError> {
        self.send(OutboundRequest::post(format!("{SCHEDULED_TASK_PATH}/refresh")))
    }

    /// `DELETE /admin/scheduled-task/{taskKey}`.
    pub fn delete_scheduled_task(&self, task_key: &str) -> Result<(), ApiError> {
        let path = format!("{SCHEDULED_TASK_PATH}/{}", encode_segment(task_key));
        self.send(OutboundRequest::delete(path))
    }

    /// `POST /admin/scheduled-task/run?taskKey=`: run a task immediately.
    pub fn run_scheduled_task(&self, task_key: &str) -> Result<(), ApiError> {
        let request =
            OutboundRequest::post(format!("{SCHEDULED_TASK_PATH}/run")).query("taskKey", task_key);
        self.send(request)
    }

    // -----------------------------------------------------------------------
    // LLM configuration and logs
    // -----------------------------------------------------------------------

    /// `GET /admin/llm/config`. An absent body yields the empty config.
    pub fn get_llm_config(&self) -> Result<LlmConfigResponse, ApiError> {
        Ok(self
            .fetch(OutboundRequest::get(LLM_CONFIG_PATH))?
            .unwrap_or_default())
    }

    /// `PUT /admin/llm/config`.
    pub fn save_llm_config(&self, body: &LlmConfigRequest) -> Result<(), ApiError> {
        self.send(OutboundRequest::put(LLM_CONFIG_PATH).json(body)?)
    }

    /// `GET /admin/llm/logs?page&size&taskType`.
    pub fn get_llm_log_page(&self, query: &LlmLogQuery) -> Result<LlmLogPageResult, ApiError> {
        let request = OutboundRequest::get(LLM_LOGS_PATH)
            .query_opt("page", query.page)
            .query_opt("size", query.size)
            .query_opt("taskType", query.task_type.as_deref());

        let wire: LlmLogPageWire = self.fetch(request)?.unwrap_or_default();
        Ok(LlmLogPageResult {
            list: wire.list.unwrap_or_default(),
            total: wire.total.unwrap_or(0),
            pages: wire.pages.unwrap_or(0),
        })
    }

    /// `GET /admin/llm/logs/{id}`.
    pub fn get_llm_log_by_id(&self, id: i64) -> Result<LlmRequestLogItem, ApiError> {
        let path = format!("{LLM_LOGS_PATH}/{id}");
        self.fetch(OutboundRequest::get(path.clone()))?
            .ok_or_else(|| ApiError::Decode {
                path,
                message: "empty response body".to_string(),
                skip_global_error: false,
            })
    }

    // -----------------------------------------------------------------------
    // System configuration
    // -----------------------------------------------------------------------

    /// `GET /admin/config`.
    pub fn get_config_list(&self) -> Result<Vec<SysConfigItem>, ApiError> {
        Ok(self
            .fetch(OutboundRequest::get(SYS_CONFIG_PATH))?
            .unwrap_or_default())
    }

    /// `PATCH /admin/config/{configKey}`.
    pub fn update_config(
        &self,
        config_key: &str,
        body: &SysConfigUpdateRequest,
    ) -> Result<(), ApiError> {
        let path = format!("{SYS_CONFIG_PATH}/{}", encode_segment(config_key));
        self.send(OutboundRequest::patch(path).json(body)?)
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn fetch<T: DeserializeOwned>(&self, request: OutboundRequest) -> Result<Option<T>, ApiError> {
        let path = request.path.clone();
        let skip_global_error = request.skip_global_error;
        self.client.execute(request)?.json(&path, skip_global_error)
    }

    fn send(&self, request: OutboundRequest) -> Result<(), ApiError> {
        self.client.execute(request).map(|_| ())
    }
}

/// Percent-encode a user-supplied identifier for use as one path segment.
pub fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::api::client::{ApiResponse, Method, Transport};
    use crate::api::middleware::Pipeline;

    /// Replies with a fixed status/body and records requests.
    struct Canned {
        status: u16,
        body: &'static str,
        seen: Rc<RefCell<Vec<OutboundRequest>>>,
    }

    impl Transport for Canned {
        fn send(
            &self,
            _base_url: &str,
            request: &OutboundRequest,
        ) -> Result<ApiResponse, ApiError> {
            self.seen.borrow_mut().push(request.clone());
            if (200..300).contains(&self.status) {
                Ok(ApiResponse {
                    status: self.status,
                    body: self.body.to_string(),
                })
            } else {
                Err(ApiError::Status {
                    status: self.status,
                    path: request.path.clone(),
                    body: self.body.to_string(),
                    skip_global_error: request.skip_global_error,
                })
            }
        }
    }

    fn canned_api(status: u16, body: &'static str) -> (AdminApi, Rc<RefCell<Vec<OutboundRequest>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let transport = Canned {
            status,
            body,
            seen: seen.clone(),
        };
        let client = HttpClient::new("http://backend/api", Box::new(transport), Pipeline::new());
        (AdminApi::new(client), seen)
    }

    fn login_req() -> LoginRequest {
        LoginRequest {
            username: "a".to_string(),
            password: "b".to_string(),
        }
    }

    #[test]
    fn login_success_returns_credentials() {
        let (api, seen) = canned_api(200, r#"{"success":true,"username":"a","token":"T"}"#);
        let creds = api.admin_login(&login_req()).unwrap();
        assert_eq!(
            creds,
            AdminCredentials {
                username: "a".to_string(),
                token: "T".to_string(),
            }
        );

        let seen = seen.borrow();
        assert_eq!(seen[0].method, Method::Post);
        assert_eq!(seen[0].path, "/admin/auth/login");
        assert!(seen[0].skip_global_error);
        assert_eq!(seen[0].body.as_ref().unwrap()["password"], "b");
    }

    #[test]
    fn login_payload_failure_is_rejected() {
        for body in [
            r#"{"success":false}"#,
            r#"{"success":true,"username":"a"}"#,
            r#"{"success":true,"username":"a","token":""}"#,
            "",
        ] {
            let (api, _) = canned_api(200, body);
            let err = api.admin_login(&login_req()).unwrap_err();
            assert!(matches!(err, ApiError::LoginRejected), "body: {body:?}");
        }
    }

    #[test]
    fn login_http_error_is_not_a_rejection() {
        let (api, _) = canned_api(401, "");
        let err = api.admin_login(&login_req()).unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert!(err.skips_global_error());
    }

    #[test]
    fn malformed_login_body_skips_global_error() {
        let (api, _) = canned_api(200, "{not json");
        let err = api.admin_login(&login_req()).unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
        assert!(err.skips_global_error());
    }

    #[test]
    fn task_list_defaults_to_empty() {
        let (api, _) = canned_api(200, "");
        assert!(api.get_scheduled_task_list().unwrap().is_empty());

        let (api, _) = canned_api(200, "null");
        assert!(api.get_scheduled_task_list().unwrap().is_empty());
    }

    #[test]
    fn task_key_is_percent_encoded() {
        let (api, seen) = canned_api(200, "");
        api.update_scheduled_task("a/b c", &ScheduledTaskUpdateRequest::default())
            .unwrap();
        api.delete_scheduled_task("x?y").unwrap();

        let seen = seen.borrow();
        assert_eq!(seen[0].method, Method::Patch);
        assert_eq!(seen[0].path, "/admin/scheduled-task/a%2Fb%20c");
        assert_eq!(seen[1].method, Method::Delete);
        assert_eq!(seen[1].path, "/admin/scheduled-task/x%3Fy");
    }

    #[test]
    fn run_task_sends_key_as_query() {
        let (api, seen) = canned_api(200, "");
        api.run_scheduled_task("daily report").unwrap();

        let seen = seen.borrow();
        assert_eq!(seen[0].path, "/admin/scheduled-task/run");
        assert_eq!(
            seen[0].query,
            vec![("taskKey".to_string(), "daily report".to_string())]
        );
        assert!(seen[0].body.is_none());
    }

    #[test]
    fn llm_config_defaults_as_a_unit() {
        let (api, _) = canned_api(200, "");
        assert_eq!(api.get_llm_config().unwrap(), LlmConfigResponse::default());
    }

    #[test]
    fn log_page_defaults_each_field() {
        let (api, seen) = canned_api(200, r#"{"list":[{"id":1},{"id":2},{"id":3}]}"#);
        let page = api
            .get_llm_log_page(&LlmLogQuery {
                page: Some(1),
                size: Some(20),
                task_type: None,
            })
            .unwrap();

        assert_eq!(page.list.len(), 3);
        assert_eq!(page.total, 0);
        assert_eq!(page.pages, 0);
        assert_eq!(
            seen.borrow()[0].query,
            vec![
                ("page".to_string(), "1".to_string()),
                ("size".to_string(), "20".to_string()),
            ]
        );
    }

    #[test]
    fn log_page_tolerates_null_fields() {
        let (api, _) = canned_api(200, r#"{"list":null,"total":null,"pages":4}"#);
        let page = api.get_llm_log_page(&LlmLogQuery::default()).unwrap();
        assert!(page.list.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(page.pages, 4);
    }

    #[test]
    fn log_detail_requires_a_body() {
        let (api, _) = canned_api(200, "");
        assert!(matches!(
            api.get_llm_log_by_id(9).unwrap_err(),
            ApiError::Decode { .. }
        ));

        let (api, seen) = canned_api(200, r#"{"id":9,"status":"SUCCESS"}"#);
        let log = api.get_llm_log_by_id(9).unwrap();
        assert_eq!(log.status.as_deref(), Some("SUCCESS"));
        assert_eq!(seen.borrow()[0].path, "/admin/llm/logs/9");
    }

    #[test]
    fn config_key_is_percent_encoded() {
        let (api, seen) = canned_api(200, "");
        api.update_config(
            "feature.flag/x",
            &SysConfigUpdateRequest {
                config_value: Some("on".to_string()),
            },
        )
        .unwrap();

        let seen = seen.borrow();
        assert_eq!(seen[0].path, "/admin/config/feature.flag%2Fx");
        assert_eq!(seen[0].body.as_ref().unwrap()["configValue"], "on");
    }

    #[test]
    fn mutating_calls_propagate_http_errors() {
        let (api, _) = canned_api(500, "boom");
        let err = api.refresh_scheduled_tasks().unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(!err.skips_global_error());
    }
}
