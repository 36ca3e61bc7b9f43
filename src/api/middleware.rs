//! Middleware chain wrapped around every backend call.
//!
//! Request stages run in registration order before the send. The first stage
//! that returns an error short-circuits the call: nothing is sent and no
//! response stage runs.
//!
//! Response stages run in registration order after every send. A stage sees
//! either the successful response or the error left by the previous stage,
//! and the error always reaches the caller.

use std::rc::Rc;

use super::client::{ApiResponse, OutboundRequest};
use super::error::ApiError;
use crate::constants::LOGIN_ROUTE;
use crate::router::Navigator;
use crate::session::SessionStore;

/// Transforms a request before it is sent.
pub trait RequestStage {
    fn name(&self) -> &'static str;
    fn apply(&self, request: &mut OutboundRequest) -> Result<(), ApiError>;
}

/// Observes the outcome of a request.
pub trait ResponseStage {
    fn name(&self) -> &'static str;

    fn on_success(
        &self,
        _request: &OutboundRequest,
        response: ApiResponse,
    ) -> Result<ApiResponse, ApiError> {
        Ok(response)
    }

    fn on_failure(&self, request: &OutboundRequest, error: ApiError) -> ApiError;
}

/// Ordered request and response stages.
#[derive(Default)]
pub struct Pipeline {
    request_stages: Vec<Box<dyn RequestStage>>,
    response_stages: Vec<Box<dyn ResponseStage>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_request_stage(mut self, stage: impl RequestStage + 'static) -> Self {
        self.request_stages.push(Box::new(stage));
        self
    }

    pub fn with_response_stage(mut self, stage: impl ResponseStage + 'static) -> Self {
        self.response_stages.push(Box::new(stage));
        self
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.request_stages
            .iter()
            .map(|s| s.name())
            .chain(self.response_stages.iter().map(|s| s.name()))
            .collect()
    }

    pub fn run_request_stages(&self, request: &mut OutboundRequest) -> Result<(), ApiError> {
        for stage in &self.request_stages {
            stage.apply(request)?;
        }
        Ok(())
    }

    pub fn run_response_stages(
        &self,
        request: &OutboundRequest,
        result: Result<ApiResponse, ApiError>,
    ) -> Result<ApiResponse, ApiError> {
        self.response_stages
            .iter()
            .fold(result, |result, stage| match result {
                Ok(response) => stage.on_success(request, response),
                Err(error) => Err(stage.on_failure(request, error)),
            })
    }
}

// ---------------------------------------------------------------------------
// Bearer credential
// ---------------------------------------------------------------------------

/// Source of the current bearer credential.
pub trait CredentialProvider {
    fn credential(&self) -> Option<String>;
}

impl<F> CredentialProvider for F
where
    F: Fn() -> Option<String>,
{
    fn credential(&self) -> Option<String> {
        self()
    }
}

/// Stamps `Authorization: Bearer <credential>` on every non-login request.
///
/// Requests go out unchanged when no credential is available.
pub struct BearerAuth {
    provider: Rc<dyn CredentialProvider>,
}

impl BearerAuth {
    pub fn new(provider: Rc<dyn CredentialProvider>) -> Self {
        Self { provider }
    }
}

impl RequestStage for BearerAuth {
    fn name(&self) -> &'static str {
        "bearer-auth"
    }

    fn apply(&self, request: &mut OutboundRequest) -> Result<(), ApiError> {
        if request.is_login() {
            return Ok(());
        }
        if let Some(token) = self.provider.credential() {
            request.set_header("Authorization", format!("Bearer {token}"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Auth-failure funnel
// ---------------------------------------------------------------------------

/// Ends the session when the backend rejects the credential.
///
/// A 401 or 403 on any request other than login clears the session and, unless
/// the operator is already on the login screen, sends them there with the
/// current location in `from`. The error is handed back unchanged either way.
pub struct AuthFailureFunnel {
    session: Rc<SessionStore>,
    navigator: Rc<dyn Navigator>,
}

impl AuthFailureFunnel {
    pub fn new(session: Rc<SessionStore>, navigator: Rc<dyn Navigator>) -> Self {
        Self { session, navigator }
    }
}

impl ResponseStage for AuthFailureFunnel {
    fn name(&self) -> &'static str {
        "auth-failure-funnel"
    }

    fn on_failure(&self, request: &OutboundRequest, error: ApiError) -> ApiError {
        if !error.is_auth_denied() || request.is_login() {
            return error;
        }

        tracing::warn!(
            path = %request.path,
            status = error.status().unwrap_or_default(),
            "credential rejected; ending session"
        );
        self.session.clear_auth();

        if self.navigator.current_route_name().as_deref() != Some(LOGIN_ROUTE) {
            let from = self.navigator.current_full_path();
            self.navigator.redirect_to_login(&from);
        }

        error
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
