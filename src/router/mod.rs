//! Console navigation with an authentication guard.
//!
//! Every navigation re-reads the session from storage, then applies the
//! guard:
//!
//! - public route: proceed, except that an authenticated operator asking for
//!   the login screen is sent to `/`;
//! - protected route without a session: go to the login screen, carrying the
//!   requested location in `from` unless it was `/`;
//! - protected route with a session: proceed.
//!
//! After a navigation lands, the page title is taken from the route.

pub mod routes;

use std::cell::RefCell;
use std::rc::Rc;

use thiserror::Error;

use crate::constants::{APP_TITLE, FROM_QUERY_KEY, LOGIN_ROUTE};
use crate::session::SessionStore;
use routes::RouteMeta;

/// Redirects followed before a navigation is abandoned.
const MAX_REDIRECTS: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum NavigationError {
    #[error("no screen at {0}")]
    NotFound(String),
    #[error("navigation to {0} kept redirecting")]
    RedirectLoop(String),
}

/// Read access to the current location plus the one redirect the HTTP layer
/// needs.
pub trait Navigator {
    fn current_route_name(&self) -> Option<String>;
    fn current_full_path(&self) -> String;
    fn redirect_to_login(&self, from: &str);
}

/// A resolved location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub name: Option<&'static str>,
    pub path: String,
    pub full_path: String,
    /// Query pairs in the order written, repeated keys kept.
    pub query: Vec<(String, String)>,
    pub meta: RouteMeta,
}

impl Location {
    /// Where a fresh router sits before its first navigation.
    fn start() -> Self {
        Self {
            name: None,
            path: "/".to_string(),
            full_path: "/".to_string(),
            query: Vec::new(),
            meta: RouteMeta::default(),
        }
    }

    /// First value given for `key`.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Outcome of the guard for one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    Redirect(String),
}

/// The console router.
pub struct Router {
    session: Rc<SessionStore>,
    current: RefCell<Location>,
    history: RefCell<Vec<String>>,
    title: RefCell<String>,
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("current", &self.current.borrow().full_path)
            .field("title", &self.title.borrow())
            .finish_non_exhaustive()
    }
}

impl Router {
    pub fn new(session: Rc<SessionStore>) -> Self {
        Self {
            session,
            current: RefCell::new(Location::start()),
            history: RefCell::new(Vec::new()),
            title: RefCell::new(APP_TITLE.to_string()),
        }
    }

    pub fn current(&self) -> Location {
        self.current.borrow().clone()
    }

    /// Page title of the current screen.
    pub fn title(&self) -> String {
        self.title.borrow().clone()
    }

    /// Full paths of every landed navigation, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history.borrow().clone()
    }

    /// Resolve `target` (path plus optional query) against the route table.
    pub fn resolve(&self, target: &str) -> Result<Location, NavigationError> {
        let (path, query) = parse_target(target);
        let matched =
            routes::match_path(&path).ok_or_else(|| NavigationError::NotFound(path.clone()))?;

        Ok(Location {
            name: matched.name,
            full_path: full_path(&path, &query),
            path,
            query,
            meta: matched.meta,
        })
    }

    /// Navigate and record a new history entry.
    pub fn push(&self, target: &str) -> Result<Location, NavigationError> {
        let location = self.navigate(target)?;
        self.history.borrow_mut().push(location.full_path.clone());
        Ok(location)
    }

    /// Navigate, replacing the latest history entry.
    pub fn replace(&self, target: &str) -> Result<Location, NavigationError> {
        let location = self.navigate(target)?;
        let mut history = self.history.borrow_mut();
        history.pop();
        history.push(location.full_path.clone());
        Ok(location)
    }

    /// Guard applied before entering `to`.
    pub fn before_each(&self, to: &Location) -> GuardDecision {
        self.session.restore_from_storage();
        let authenticated = self.session.is_authenticated();

        if to.meta.public {
            if authenticated && to.name == Some(LOGIN_ROUTE) {
                return GuardDecision::Redirect("/".to_string());
            }
            return GuardDecision::Proceed;
        }

        if !authenticated {
            let from = (to.path != "/").then_some(to.full_path.as_str());
            return GuardDecision::Redirect(login_target(from));
        }

        GuardDecision::Proceed
    }

    fn navigate(&self, target: &str) -> Result<Location, NavigationError> {
        let mut next = target.to_string();

        for _ in 0..=MAX_REDIRECTS {
            let to = self.resolve(&next)?;
            match self.before_each(&to) {
                GuardDecision::Proceed => {
                    self.after_each(&to);
                    *self.current.borrow_mut() = to.clone();
                    return Ok(to);
                }
                GuardDecision::Redirect(redirect) => {
                    tracing::debug!(from = %to.full_path, to = %redirect, "navigation redirected");
                    next = redirect;
                }
            }
        }

        Err(NavigationError::RedirectLoop(target.to_string()))
    }

    fn after_each(&self, to: &Location) {
        *self.title.borrow_mut() = page_title(to.meta.title);
    }
}

impl Navigator for Router {
    fn current_route_name(&self) -> Option<String> {
        self.current.borrow().name.map(str::to_string)
    }

    fn current_full_path(&self) -> String {
        self.current.borrow().full_path.clone()
    }

    fn redirect_to_login(&self, from: &str) {
        if let Err(e) = self.replace(&login_target(Some(from))) {
            tracing::warn!(error = %e, "redirect to login failed");
        }
    }
}

/// Page title for a route title, falling back to the application label.
pub fn page_title(title: Option<&str>) -> String {
    match title {
        Some(title) if !title.is_empty() => format!("{title} · {APP_TITLE}"),
        _ => APP_TITLE.to_string(),
    }
}

/// Login location, optionally remembering where the operator was headed.
pub fn login_target(from: Option<&str>) -> String {
    match from {
        Some(from) => format!("/login?{FROM_QUERY_KEY}={}", encode_query_value(from)),
        None => "/login".to_string(),
    }
}

/// Split a target into a normalized path and decoded query pairs.
fn parse_target(target: &str) -> (String, Vec<(String, String)>) {
    let (path, query) = target.split_once('?').unwrap_or((target, ""));

    let trimmed = path.trim_end_matches('/');
    let path = if trimmed.is_empty() {
        "/".to_string()
    } else if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    };

    let query = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(k), decode(v))
        })
        .collect();

    (path, query)
}

fn full_path(path: &str, query: &[(String, String)]) -> String {
    if query.is_empty() {
        return path.to_string();
    }
    let query = query
        .iter()
        .map(|(k, v)| format!("{}={}", encode_query_value(k), encode_query_value(v)))
        .collect::<Vec<_>>()
        .join("&");
    format!("{path}?{query}")
}

/// Percent-encode a query component; slashes stay literal as in browser URLs.
fn encode_query_value(value: &str) -> String {
    urlencoding::encode(value).replace("%2F", "/")
}

fn decode(value: &str) -> String {
    urlencoding::decode(value)
        .map(|v| v.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
