/// Session lifecycle: login, signup, logout, restore, and forced teardown.
///
/// The [`SessionManager`] owns the only in-memory copy of the session and
/// is the only writer of the session keys in the [`LocalStore`]. Two paths
/// change the session:
///
/// - **establish** (successful login): writes both keys in one store call,
///   resets dependent resources, state becomes `Verified`.
/// - **teardown** (logout, `401` anywhere, torn store state): clears memory,
///   removes both keys, resets dependent resources.
///
/// No other code path clears the session, so the username and token can
/// never disagree.
use std::sync::{Arc, Mutex, MutexGuard};

use crate::api::{ApiError, Credentials, RiskApi};
use crate::error::ClientError;
use crate::logging;
use crate::models::Session;
use crate::state::Resources;
use crate::store::{LocalStore, TOKEN_KEY, USERNAME_KEY};

const COMPONENT: &str = "session";

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// Where the client stands with respect to authentication.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    LoggedOut,
    /// Restored from the store; the server has not confirmed it yet.
    Unverified(Session),
    /// Confirmed by login or by token validation.
    Verified(Session),
}

impl SessionState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            Self::LoggedOut => None,
            Self::Unverified(s) | Self::Verified(s) => Some(s),
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.session().is_some()
    }

    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified(_))
    }
}

// ---------------------------------------------------------------------------
// Manager
// ---------------------------------------------------------------------------

pub struct SessionManager {
    api: Arc<dyn RiskApi>,
    store: Arc<dyn LocalStore>,
    resources: Arc<Resources>,
    state: Mutex<SessionState>,
    validate_on_restore: bool,
}

impl SessionManager {
    pub fn new(
        api: Arc<dyn RiskApi>,
        store: Arc<dyn LocalStore>,
        resources: Arc<Resources>,
        validate_on_restore: bool,
    ) -> Self {
        Self {
            api,
            store,
            resources,
            state: Mutex::new(SessionState::LoggedOut),
            validate_on_restore,
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn state(&self) -> SessionState {
        self.lock().clone()
    }

    pub fn current_session(&self) -> Option<Session> {
        self.lock().session().cloned()
    }

    /// Token of the current session. Never fails.
    pub fn current_token(&self) -> Option<String> {
        self.lock().session().map(|s| s.token.clone())
    }

    // -- Operations --

    /// Authenticate and persist the new session, replacing any prior one.
    pub fn login(&self, username: &str, password: &str) -> Result<Session, ClientError> {
        let credentials = credentials(username, password)?;

        let response = self.api.login(&credentials).map_err(|err| {
            ClientError::from_transport(err)
                .unwrap_or_else(|err| ClientError::InvalidCredentials(detail_of(err)))
        })?;

        let session = Session::new(response.token, response.username);
        self.establish(session.clone())?;
        logging::info(COMPONENT, &format!("logged in as {}", session.username));
        Ok(session)
    }

    /// Create an account. Does not log in.
    pub fn signup(&self, username: &str, password: &str) -> Result<(), ClientError> {
        let credentials = credentials(username, password)?;

        self.api.signup(&credentials).map_err(|err| {
            ClientError::from_transport(err)
                .unwrap_or_else(|err| ClientError::Registration(detail_of(err)))
        })?;

        logging::info(COMPONENT, &format!("registered {}", credentials.username));
        Ok(())
    }

    /// Notify the server (best effort) and tear the session down.
    pub fn logout(&self) -> Result<(), ClientError> {
        if let Some(token) = self.current_token()
            && let Err(err) = self.api.logout(&token)
        {
            logging::warn(COMPONENT, &format!("server logout failed: {err}"));
        }
        self.teardown("logout")
    }

    /// Rebuild the session from the store at startup.
    ///
    /// Both keys present gives `Unverified`, upgraded to `Verified` when
    /// validation is enabled and the server confirms the token. A `401`
    /// from validation tears the session down and reports
    /// [`ClientError::SessionExpired`]. A missing validation endpoint or an
    /// unreachable server keeps the optimistic `Unverified` state.
    pub fn restore_session(&self) -> Result<SessionState, ClientError> {
        let token = self.store.get(TOKEN_KEY).filter(|t| !t.is_empty());
        let username = self.store.get(USERNAME_KEY).filter(|u| !u.is_empty());

        let session = match (token, username) {
            (Some(token), Some(username)) => Session::new(token, username),
            (None, None) => {
                *self.lock() = SessionState::LoggedOut;
                return Ok(SessionState::LoggedOut);
            }
            _ => {
                logging::warn(COMPONENT, "store held only one session key");
                self.teardown("incomplete stored session")?;
                return Ok(SessionState::LoggedOut);
            }
        };

        *self.lock() = SessionState::Unverified(session.clone());

        if !self.validate_on_restore {
            logging::info(COMPONENT, "restored session without validation");
            return Ok(self.state());
        }

        match self.api.validate_token(&session.token) {
            Ok(server_username) => {
                let verified = Session::new(session.token, server_username);
                if verified.username != session.username {
                    self.store
                        .put(USERNAME_KEY, &verified.username)
                        .map_err(ClientError::storage)?;
                }
                *self.lock() = SessionState::Verified(verified);
                logging::info(COMPONENT, "restored session verified");
            }
            Err(ApiError::Unauthorized(_)) => {
                return Err(self.expire(&session.token));
            }
            Err(ApiError::Status {
                status: 404 | 405, ..
            }) => {
                logging::info(COMPONENT, "token validation not supported by server");
            }
            Err(err) => {
                logging::warn(COMPONENT, &format!("token validation failed: {err}"));
            }
        }

        Ok(self.state())
    }

    /// React to a `401` received for `token`.
    ///
    /// Tears the session down if `token` is still the current token. A
    /// `401` for a token that has since been replaced is ignored. Always
    /// returns [`ClientError::SessionExpired`] for the caller to surface.
    pub fn expire(&self, token: &str) -> ClientError {
        if self.current_token().as_deref() == Some(token) {
            if let Err(err) = self.teardown("server rejected token") {
                logging::warn(COMPONENT, &format!("teardown incomplete: {err}"));
            }
        } else {
            logging::info(COMPONENT, "ignored 401 for a replaced token");
        }
        ClientError::SessionExpired
    }

    // -- Internal --

    fn establish(&self, session: Session) -> Result<(), ClientError> {
        self.store
            .put_all(&[
                (TOKEN_KEY, session.token.as_str()),
                (USERNAME_KEY, session.username.as_str()),
            ])
            .map_err(ClientError::storage)?;
        *self.lock() = SessionState::Verified(session);
        self.resources.reset();
        Ok(())
    }

    /// The single path that clears the session.
    ///
    /// Memory state and dependent resources are cleared even if the store
    /// write fails; the store error is still reported.
    fn teardown(&self, cause: &str) -> Result<(), ClientError> {
        *self.lock() = SessionState::LoggedOut;
        self.resources.reset();
        logging::info(COMPONENT, &format!("session cleared ({cause})"));
        self.store
            .remove_all(&[TOKEN_KEY, USERNAME_KEY])
            .map_err(ClientError::storage)
    }
}

fn credentials(username: &str, password: &str) -> Result<Credentials, ClientError> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(ClientError::Validation(
            "username and password are required".to_string(),
        ));
    }
    Ok(Credentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}

fn detail_of(err: ApiError) -> Option<String> {
    err.detail().map(str::to_string)
}
