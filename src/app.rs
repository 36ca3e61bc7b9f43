//! Process-wide wiring of the console.
//!
//! [`Console`] is built once at start-up and owns the session, the router and
//! the API client. The session is shared by all three; the client reaches the
//! router only through the auth-failure funnel.

use std::rc::Rc;
use std::time::Duration;

use crate::api::middleware::{AuthFailureFunnel, BearerAuth, Pipeline};
use crate::api::types::{AdminCredentials, LoginRequest};
use crate::api::{AdminApi, ApiError, HttpClient, Transport, UreqTransport};
use crate::config::ConsoleConfig;
use crate::constants::{FROM_QUERY_KEY, REQUEST_TIMEOUT_MS};
use crate::router::{Location, NavigationError, Router};
use crate::session::SessionStore;
use crate::storage::{self, Storage};

#[derive(Debug)]
pub struct Console {
    pub config: ConsoleConfig,
    pub session: Rc<SessionStore>,
    pub router: Rc<Router>,
    pub api: AdminApi,
}

impl Console {
    /// Build from configuration, opening durable storage and the HTTP transport.
    pub fn from_config(config: ConsoleConfig) -> Self {
        let storage = storage::open_or_memory(config.storage.resolved_path());
        Self::with_parts(config, storage, Box::new(default_transport()))
    }

    /// Build from explicit storage and transport.
    pub fn with_parts(
        config: ConsoleConfig,
        storage: Rc<dyn Storage>,
        transport: Box<dyn Transport>,
    ) -> Self {
        let session = Rc::new(SessionStore::new(storage));
        let router = Rc::new(Router::new(session.clone()));

        let pipeline = Pipeline::new()
            .with_request_stage(BearerAuth::new(session.clone()))
            .with_response_stage(AuthFailureFunnel::new(session.clone(), router.clone()));
        let client = HttpClient::new(&config.api.base_url, transport, pipeline);

        Self {
            config,
            session,
            router,
            api: AdminApi::new(client),
        }
    }

    /// Navigate to a screen through the guard.
    pub fn open(&self, target: &str) -> Result<Location, NavigationError> {
        self.router.push(target)
    }

    /// Log in and continue to the location remembered in `from`, or `/`.
    pub fn login(&self, credentials: &LoginRequest) -> Result<AdminCredentials, ApiError> {
        let issued = self.session.login(&self.api, credentials)?;

        let from = self
            .router
            .current()
            .query_value(FROM_QUERY_KEY)
            .map(str::to_string);
        let target = from.as_deref().unwrap_or("/");
        if let Err(e) = self.router.replace(target) {
            tracing::warn!(to = target, error = %e, "post-login navigation failed");
        }

        Ok(issued)
    }

    /// End the session locally, telling the backend first when possible.
    ///
    /// A failed backend logout is logged and otherwise ignored.
    pub fn logout(&self) {
        if self.session.is_authenticated()
            && let Err(e) = self.api.admin_logout()
        {
            tracing::warn!(error = %e, "backend logout failed");
        }
        self.session.logout();
        if let Err(e) = self.router.replace("/login") {
            tracing::warn!(error = %e, "navigation to login failed");
        }
    }
}

/// The production transport: blocking `ureq` with the fixed request timeout.
fn default_transport() -> UreqTransport {
    UreqTransport::new(Duration::from_millis(REQUEST_TIMEOUT_MS))
}
