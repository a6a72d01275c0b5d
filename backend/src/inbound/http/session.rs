//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! Provides a thin wrapper around Actix sessions so handlers only deal with
//! domain-friendly operations: remembering the signed-in profile, reading it
//! back, and forgetting it on sign-out.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, ProfileId};

pub(crate) const PROFILE_ID_KEY: &str = "profile_id";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    /// Persist the authenticated profile id in the session cookie.
    ///
    /// The session id is renewed first so a pre-login cookie cannot be
    /// replayed after sign-in.
    pub fn persist_profile(&self, profile_id: &ProfileId) -> Result<(), Error> {
        self.0.renew();
        self.0
            .insert(PROFILE_ID_KEY, profile_id.to_string())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// Fetch the current profile id from the session, if present.
    pub fn profile_id(&self) -> Result<Option<ProfileId>, Error> {
        let id = self
            .0
            .get::<String>(PROFILE_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        match id {
            Some(raw) => match ProfileId::new(raw) {
                Ok(id) => Ok(Some(id)),
                Err(error) => {
                    tracing::warn!("invalid profile id in session cookie: {error}");
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    /// Require an authenticated profile id or return `401 Unauthorized`.
    pub fn require_profile_id(&self) -> Result<ProfileId, Error> {
        self.profile_id()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Drop every session entry and expire the cookie.
    pub fn purge(&self) {
        self.0.purge();
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
