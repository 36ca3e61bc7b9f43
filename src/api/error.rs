use thiserror::Error;

/// Failure of a backend call.
///
/// Every variant is terminal for the call that produced it: nothing in the
/// client layer retries.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced an HTTP response (DNS, connect, timeout).
    #[error("request to {path} failed: {message}")]
    Transport {
        path: String,
        message: String,
        skip_global_error: bool,
    },

    /// The backend answered with a non-2xx status.
    #[error("request to {path} returned HTTP {status}")]
    Status {
        status: u16,
        path: String,
        body: String,
        skip_global_error: bool,
    },

    /// The login call returned 200 but the payload did not grant a session.
    #[error("login failed: invalid username or password")]
    LoginRejected,

    /// The response body could not be parsed into the expected shape.
    #[error("unexpected response from {path}: {message}")]
    Decode {
        path: String,
        message: String,
        skip_global_error: bool,
    },

    /// A request stage refused to send the request.
    #[error("request to {path} blocked by {stage}: {message}")]
    Middleware {
        stage: &'static str,
        path: String,
        message: String,
    },
}

impl ApiError {
    /// HTTP status of the failed response, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for 401 and 403 responses.
    pub fn is_auth_denied(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    /// Whether the originating request opted out of generic error reporting.
    ///
    /// A rejected login always counts as opted out, since the login screen
    /// reports its own failures.
    pub fn skips_global_error(&self) -> bool {
        match self {
            Self::Transport {
                skip_global_error, ..
            }
            | Self::Status {
                skip_global_error, ..
            }
            | Self::Decode {
                skip_global_error, ..
            } => *skip_global_error,
            Self::LoginRejected => true,
            Self::Middleware { .. } => false,
        }
    }
}
