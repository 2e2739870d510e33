//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Provides a thin wrapper around Actix sessions so handlers only load and
//! store the dashboard's [`SessionState`].

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, SessionState};

pub(crate) const SESSION_STATE_KEY: &str = "dashboard";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self(session)
    }

    /// Current state, or defaults for a first visit.
    ///
    /// A payload that no longer deserialises is dropped and replaced by the
    /// defaults.
    #[must_use]
    pub fn state(&self) -> SessionState {
        match self.0.get::<SessionState>(SESSION_STATE_KEY) {
            Ok(existing) => SessionState::initialize(existing),
            Err(error) => {
                warn!(error = %error, "discarding unreadable session state");
                self.0.remove(SESSION_STATE_KEY);
                SessionState::initialize(None)
            }
        }
    }

    /// Persist `state` in the session cookie.
    ///
    /// # Errors
    ///
    /// Returns an internal error when the state cannot be serialised.
    pub fn store(&self, state: &SessionState) -> Result<(), Error> {
        self.0
            .insert(SESSION_STATE_KEY, state)
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}
