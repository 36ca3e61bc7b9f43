//! Console-wide constants: storage keys, API paths, titles.

/// Storage key for the operator's bearer credential.
///
/// Namespaced so it never collides with an end-user session kept in the same
/// storage.
pub const ADMIN_TOKEN_KEY: &str = "admin_console_admin_token";

/// Storage key for the operator's display name.
pub const ADMIN_USERNAME_KEY: &str = "admin_console_admin_username";

/// Default API root prefixed to every endpoint path.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080/api";

/// Fixed request timeout for every backend call.
pub const REQUEST_TIMEOUT_MS: u64 = 60_000;

/// Path fragment identifying the login endpoint.
pub const LOGIN_PATH: &str = "/admin/auth/login";

/// Name of the login route.
pub const LOGIN_ROUTE: &str = "login";

/// Query parameter carrying the originally requested location.
pub const FROM_QUERY_KEY: &str = "from";

/// Application label used for page titles.
pub const APP_TITLE: &str = "Admin Console";
