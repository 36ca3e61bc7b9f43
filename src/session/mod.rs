//! Operator session: the bearer credential and display name.
//!
//! The in-memory pair mirrors two durable-storage entries. Every mutation
//! writes both sides in the same call, so [`SessionStore::is_authenticated`]
//! never disagrees with what the next process start will read back.

use std::cell::RefCell;
use std::rc::Rc;

use crate::api::middleware::CredentialProvider;
use crate::api::types::{AdminCredentials, LoginRequest};
use crate::api::{AdminApi, ApiError};
use crate::constants::{ADMIN_TOKEN_KEY, ADMIN_USERNAME_KEY};
use crate::storage::Storage;

/// Snapshot of the operator session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub credential: Option<String>,
    pub principal_name: Option<String>,
}

/// Session state shared by the HTTP layer, the router and the CLI.
pub struct SessionStore {
    storage: Rc<dyn Storage>,
    state: RefCell<Session>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .field("principal_name", &self.state.borrow().principal_name)
            .finish()
    }
}

impl SessionStore {
    /// Build a store and load whatever session the storage already holds.
    pub fn new(storage: Rc<dyn Storage>) -> Self {
        let store = Self {
            storage,
            state: RefCell::new(Session::default()),
        };
        store.restore_from_storage();
        store
    }

    /// Re-read the credential and display name from durable storage.
    ///
    /// A credential removed from storage by another process ends the
    /// in-memory session too.
    pub fn restore_from_storage(&self) {
        let credential = self.storage.get(ADMIN_TOKEN_KEY);
        let principal_name = self.storage.get(ADMIN_USERNAME_KEY);

        let mut state = self.state.borrow_mut();
        *state = match credential {
            Some(credential) => Session {
                credential: Some(credential),
                principal_name,
            },
            None => Session::default(),
        };
    }

    /// Authenticate against the backend and persist the issued credential.
    ///
    /// On failure nothing is written: the session stays as it was.
    pub fn login(
        &self,
        api: &AdminApi,
        credentials: &LoginRequest,
    ) -> Result<AdminCredentials, ApiError> {
        let issued = api.admin_login(credentials)?;
        self.set_auth(&issued.token, &issued.username);
        tracing::info!(username = %issued.username, "operator logged in");
        Ok(issued)
    }

    /// Store a credential pair in memory and in durable storage.
    pub fn set_auth(&self, token: &str, username: &str) {
        {
            let mut state = self.state.borrow_mut();
            state.credential = Some(token.to_string());
            state.principal_name = Some(username.to_string());
        }
        self.storage.set(ADMIN_TOKEN_KEY, token);
        self.storage.set(ADMIN_USERNAME_KEY, username);
    }

    /// Drop the session from memory and durable storage.
    pub fn clear_auth(&self) {
        *self.state.borrow_mut() = Session::default();
        self.storage.remove(ADMIN_TOKEN_KEY);
        self.storage.remove(ADMIN_USERNAME_KEY);
    }

    /// Alias of [`clear_auth`](Self::clear_auth) for explicit operator logout.
    pub fn logout(&self) {
        self.clear_auth();
        tracing::info!("operator logged out");
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().credential.is_some()
    }

    pub fn credential(&self) -> Option<String> {
        self.state.borrow().credential.clone()
    }

    pub fn principal_name(&self) -> Option<String> {
        self.state.borrow().principal_name.clone()
    }

    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }
}

impl CredentialProvider for SessionStore {
    fn credential(&self) -> Option<String> {
        SessionStore::credential(self)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
