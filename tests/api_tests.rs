/// End-to-end client tests against a mock backend over real HTTP.
///
/// Covers the credential header, the auth-failure funnel, login payload
/// handling and response normalization of the typed endpoints.
mod common;

use std::rc::Rc;

use admin_console::api::ApiError;
use admin_console::api::types::{
    LlmConfigRequest, LlmLogQuery, LoginRequest, ScheduledTaskUpdateRequest,
    SysConfigUpdateRequest,
};
use admin_console::constants::{ADMIN_TOKEN_KEY, ADMIN_USERNAME_KEY, LOGIN_ROUTE};
use admin_console::storage::{FileStorage, Storage};
use common::{MockBackend, empty, ok};

fn login_request() -> LoginRequest {
    LoginRequest {
        username: "a".to_string(),
        password: "b".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Authorization header
// ---------------------------------------------------------------------------

#[test]
fn stored_credential_is_sent_as_bearer() {
    let backend = MockBackend::start(|_| ok("[]"));
    let (console, _) = backend.console();
    console.session.set_auth("T", "a");

    console.api.get_config_list().unwrap();

    let req = backend.last_request();
    assert_eq!(req.path(), "/api/admin/config");
    assert_eq!(req.authorization.as_deref(), Some("Bearer T"));
}

#[test]
fn no_credential_means_no_authorization_header() {
    let backend = MockBackend::start(|_| ok("[]"));
    let (console, _) = backend.console();

    console.api.get_scheduled_task_list().unwrap();

    assert_eq!(backend.last_request().authorization, None);
}

#[test]
fn login_call_carries_no_bearer() {
    let backend = MockBackend::start(|_| ok(r#"{"success":true,"username":"a","token":"T2"}"#));
    let (console, _) = backend.console();
    console.session.set_auth("OLD", "a");

    console.session.login(&console.api, &login_request()).unwrap();

    let req = backend.last_request();
    assert_eq!(req.method, "POST");
    assert_eq!(req.path(), "/api/admin/auth/login");
    assert_eq!(req.authorization, None);
    assert_eq!(req.json()["username"], "a");
    assert_eq!(req.json()["password"], "b");
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[test]
fn successful_login_stores_credential_and_principal() {
    let backend = MockBackend::start(|_| ok(r#"{"success":true,"username":"a","token":"T"}"#));
    let (console, storage) = backend.console();

    let issued = console.session.login(&console.api, &login_request()).unwrap();

    assert_eq!(issued.token, "T");
    assert!(console.session.is_authenticated());
    assert_eq!(console.session.credential().as_deref(), Some("T"));
    assert_eq!(console.session.principal_name().as_deref(), Some("a"));
    assert_eq!(storage.get(ADMIN_TOKEN_KEY).as_deref(), Some("T"));
    assert_eq!(storage.get(ADMIN_USERNAME_KEY).as_deref(), Some("a"));
}

#[test]
fn rejected_login_payload_is_a_distinct_error() {
    let backend = MockBackend::start(|_| ok(r#"{"success":false}"#));
    let (console, storage) = backend.console();

    let err = console
        .session
        .login(&console.api, &login_request())
        .unwrap_err();

    assert!(matches!(err, ApiError::LoginRejected));
    assert!(err.skips_global_error());
    assert!(!console.session.is_authenticated());
    assert_eq!(storage.get(ADMIN_TOKEN_KEY), None);
}

#[test]
fn success_without_token_is_rejected() {
    let backend = MockBackend::start(|_| ok(r#"{"success":true,"username":"a"}"#));
    let (console, _) = backend.console();

    let err = console
        .session
        .login(&console.api, &login_request())
        .unwrap_err();

    assert!(matches!(err, ApiError::LoginRejected));
    assert!(!console.session.is_authenticated());
}

#[test]
fn denied_login_keeps_session_and_location() {
    let backend = MockBackend::start(|_| (401, r#"{"message":"bad credentials"}"#.to_string()));
    let (console, storage) = backend.console();
    console.session.set_auth("T", "a");
    console.open("/llm-config").unwrap();

    let err = console
        .session
        .login(&console.api, &login_request())
        .unwrap_err();

    assert_eq!(err.status(), Some(401));
    assert!(err.skips_global_error());
    assert!(console.session.is_authenticated());
    assert_eq!(storage.get(ADMIN_TOKEN_KEY).as_deref(), Some("T"));
    assert_eq!(console.router.current().name, Some("llm-config"));
}

#[test]
fn console_login_returns_to_from() {
    let backend = MockBackend::start(|_| ok(r#"{"success":true,"username":"a","token":"T"}"#));
    let (console, _) = backend.console();

    let loc = console.open("/llm-logs").unwrap();
    assert_eq!(loc.full_path, "/login?from=/llm-logs");

    console.login(&login_request()).unwrap();

    let current = console.router.current();
    assert_eq!(current.name, Some("llm-logs"));
    assert_eq!(console.router.title(), "LLM Call Logs · Admin Console");
}

#[test]
fn session_persists_across_process_starts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let backend = MockBackend::start(|_| ok(r#"{"success":true,"username":"a","token":"T"}"#));

    {
        let console = backend.console_with(Rc::new(FileStorage::open(&path).unwrap()));
        console.login(&login_request()).unwrap();
    }

    let console = backend.console_with(Rc::new(FileStorage::open(&path).unwrap()));
    assert!(console.session.is_authenticated());
    assert_eq!(console.session.principal_name().as_deref(), Some("a"));
    assert_eq!(console.open("/sys-config").unwrap().name, Some("sys-config"));
}

#[test]
fn logout_notifies_backend_and_clears_session() {
    let backend = MockBackend::start(|_| empty());
    let (console, storage) = backend.console();
    console.session.set_auth("T", "a");

    console.logout();

    let req = backend.last_request();
    assert_eq!(req.path(), "/api/admin/auth/logout");
    assert_eq!(req.authorization.as_deref(), Some("Bearer T"));
    assert!(!console.session.is_authenticated());
    assert_eq!(storage.get(ADMIN_USERNAME_KEY), None);
    assert_eq!(console.router.current().name, Some(LOGIN_ROUTE));
}

#[test]
fn logout_survives_backend_failure() {
    let backend = MockBackend::start(|_| (500, String::new()));
    let (console, _) = backend.console();
    console.session.set_auth("T", "a");

    console.logout();

    assert!(!console.session.is_authenticated());
}

// ---------------------------------------------------------------------------
// Auth-failure funnel
// ---------------------------------------------------------------------------

#[test]
fn denied_request_forces_logout_and_redirect() {
    for status in [401, 403] {
        let backend = MockBackend::start(move |_| (status, String::new()));
        let (console, storage) = backend.console();
        console.session.set_auth("T", "a");
        console.open("/sys-config").unwrap();

        let err = console.api.get_config_list().unwrap_err();

        assert_eq!(err.status(), Some(status));
        assert!(!console.session.is_authenticated());
        assert_eq!(storage.get(ADMIN_TOKEN_KEY), None);

        let current = console.router.current();
        assert_eq!(current.name, Some(LOGIN_ROUTE));
        assert_eq!(current.full_path, "/login?from=/sys-config");
    }
}

#[test]
fn redirect_keeps_the_full_path_with_query() {
    let backend = MockBackend::start(|_| (401, String::new()));
    let (console, _) = backend.console();
    console.session.set_auth("T", "a");
    console.open("/llm-logs?taskType=chat&page=3&tag=a&tag=b").unwrap();

    console
        .api
        .get_llm_log_page(&LlmLogQuery::default())
        .unwrap_err();

    assert_eq!(
        console.router.current().query_value("from"),
        Some("/llm-logs?taskType=chat&page=3&tag=a&tag=b")
    );
}

#[test]
fn other_failures_leave_the_session_alone() {
    let backend = MockBackend::start(|_| (500, r#"{"message":"boom"}"#.to_string()));
    let (console, _) = backend.console();
    console.session.set_auth("T", "a");
    console.open("/scheduled-task").unwrap();

    let err = console.api.refresh_scheduled_tasks().unwrap_err();

    match err {
        ApiError::Status { status, body, .. } => {
            assert_eq!(status, 500);
            assert!(body.contains("boom"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
    assert!(console.session.is_authenticated());
    assert_eq!(console.router.current().name, Some("scheduled-task"));
}

#[test]
fn unreachable_backend_is_a_transport_error() {
    let backend = MockBackend::start(|_| empty());
    let base_url = backend.base_url.clone();
    drop(backend);

    let storage = Rc::new(admin_console::storage::MemoryStorage::new());
    let mut config = admin_console::config::ConsoleConfig::default();
    config.api.base_url = base_url;
    let console = admin_console::app::Console::with_parts(
        config,
        storage,
        Box::new(admin_console::api::UreqTransport::new(
            std::time::Duration::from_secs(2),
        )),
    );
    console.session.set_auth("T", "a");

    let err = console.api.get_config_list().unwrap_err();
    assert!(matches!(err, ApiError::Transport { .. }));
    assert!(console.session.is_authenticated());
}

// ---------------------------------------------------------------------------
// Endpoint shapes and normalization
// ---------------------------------------------------------------------------

#[test]
fn empty_task_list_body_yields_empty_list() {
    let backend = MockBackend::start(|_| empty());
    let (console, _) = backend.console();

    assert!(console.api.get_scheduled_task_list().unwrap().is_empty());
}

#[test]
fn task_list_is_decoded() {
    let backend = MockBackend::start(|_| {
        ok(r#"[{"id":1,"taskKey":"daily","cronExpression":"0 0 1 * * ?","enabled":1},
               {"id":2,"taskKey":"weekly","enabled":0,"description":null}]"#)
    });
    let (console, _) = backend.console();

    let tasks = console.api.get_scheduled_task_list().unwrap();
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].task_key, "daily");
    assert!(tasks[0].is_enabled());
    assert!(!tasks[1].is_enabled());
}

#[test]
fn task_mutations_use_encoded_keys() {
    let backend = MockBackend::start(|_| empty());
    let (console, _) = backend.console();

    let update = ScheduledTaskUpdateRequest {
        enabled: Some(0),
        ..Default::default()
    };
    console.api.update_scheduled_task("report/daily", &update).unwrap();
    console.api.delete_scheduled_task("a b").unwrap();
    console.api.run_scheduled_task("a&b").unwrap();
    console.api.refresh_scheduled_tasks().unwrap();

    let seen = backend.requests();
    assert_eq!(seen[0].method, "PATCH");
    assert_eq!(seen[0].url, "/api/admin/scheduled-task/report%2Fdaily");
    assert_eq!(seen[0].body, r#"{"enabled":0}"#);

    assert_eq!(seen[1].method, "DELETE");
    assert_eq!(seen[1].url, "/api/admin/scheduled-task/a%20b");

    assert_eq!(seen[2].method, "POST");
    assert_eq!(seen[2].path(), "/api/admin/scheduled-task/run");
    assert_eq!(seen[2].url, "/api/admin/scheduled-task/run?taskKey=a%26b");

    assert_eq!(seen[3].url, "/api/admin/scheduled-task/refresh");
}

#[test]
fn log_page_tolerates_missing_totals() {
    let backend = MockBackend::start(|_| ok(r#"{"list":[{"id":1},{"id":2},{"id":3}]}"#));
    let (console, _) = backend.console();

    let page = console
        .api
        .get_llm_log_page(&LlmLogQuery {
            page: Some(1),
            size: Some(20),
            task_type: None,
        })
        .unwrap();

    assert_eq!(page.list.len(), 3);
    assert_eq!(page.total, 0);
    assert_eq!(page.pages, 0);

    let req = backend.last_request();
    assert_eq!(req.url, "/api/admin/llm/logs?page=1&size=20");
}

#[test]
fn log_page_accepts_null_list() {
    let backend = MockBackend::start(|_| ok(r#"{"list":null,"total":12,"pages":2}"#));
    let (console, _) = backend.console();

    let page = console.api.get_llm_log_page(&LlmLogQuery::default()).unwrap();
    assert!(page.list.is_empty());
    assert_eq!(page.total, 12);
    assert_eq!(page.pages, 2);
}

#[test]
fn log_detail_is_fetched_by_id() {
    let backend = MockBackend::start(|_| {
        ok(r#"{"id":42,"prompt":"hi","response":"hello","taskType":"chat","inputTokens":3}"#)
    });
    let (console, _) = backend.console();

    let log = console.api.get_llm_log_by_id(42).unwrap();
    assert_eq!(log.id, Some(42));
    assert_eq!(log.task_type.as_deref(), Some("chat"));
    assert_eq!(log.input_tokens, Some(3));
    assert_eq!(backend.last_request().url, "/api/admin/llm/logs/42");
}

#[test]
fn absent_llm_config_is_the_empty_config() {
    let backend = MockBackend::start(|_| empty());
    let (console, _) = backend.console();

    let cfg = console.api.get_llm_config().unwrap();
    assert_eq!(cfg.api_url, "");
    assert_eq!(cfg.model_id, "");
    assert!(cfg.accounts.is_empty());
}

#[test]
fn llm_config_save_sends_only_given_fields() {
    let backend = MockBackend::start(|_| empty());
    let (console, _) = backend.console();

    let request = LlmConfigRequest {
        model_id: Some("m2".to_string()),
        ..Default::default()
    };
    console.api.save_llm_config(&request).unwrap();

    let req = backend.last_request();
    assert_eq!(req.method, "PUT");
    assert_eq!(req.path(), "/api/admin/llm/config");
    assert_eq!(req.body, r#"{"modelId":"m2"}"#);
}

#[test]
fn sys_config_list_and_update() {
    let backend = MockBackend::start(|req| {
        if req.method == "GET" {
            ok(r#"[{"id":1,"configKey":"site.name","configValue":"demo","updatedAt":null}]"#)
        } else {
            empty()
        }
    });
    let (console, _) = backend.console();

    let items = console.api.get_config_list().unwrap();
    assert_eq!(items[0].config_key, "site.name");
    assert_eq!(items[0].config_value.as_deref(), Some("demo"));

    console
        .api
        .update_config(
            "site name",
            &SysConfigUpdateRequest {
                config_value: Some("x".to_string()),
            },
        )
        .unwrap();

    let req = backend.last_request();
    assert_eq!(req.method, "PATCH");
    assert_eq!(req.url, "/api/admin/config/site%20name");
    assert_eq!(req.json()["configValue"], "x");
}

#[test]
fn malformed_body_is_a_decode_error() {
    let backend = MockBackend::start(|_| ok("{not json"));
    let (console, _) = backend.console();

    let err = console.api.get_config_list().unwrap_err();
    assert!(matches!(err, ApiError::Decode { .. }));
}
