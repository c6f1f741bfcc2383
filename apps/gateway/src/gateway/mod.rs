//! ProfileDataGateway — the single façade between UI code and the backend.
//!
//! Flow for every operation: resolve the session (if needed) → one or more
//! sequential backend calls → normalize into `Result` (mutations) or an empty
//! value (reads). Nothing here is retried and nothing runs in parallel.

pub mod auth;
pub mod cv;
pub mod outcome;
pub mod portfolio;
pub mod profile;
pub mod records;

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::backend::{Backend, Query, Table};
use crate::errors::GatewayError;
use crate::models::Profile;
use crate::session::{Session, SessionStore};

pub use auth::LoginStatus;
pub use cv::GeneratedCv;
pub use portfolio::{slug_base, ShareLink};

pub const DEFAULT_PORTFOLIO_ORIGIN: &str = "http://localhost:3000";

#[derive(Debug, Clone)]
pub struct GatewayOptions {
    /// Origin the public portfolio page is served from.
    pub portfolio_origin: String,
    /// When set, update/delete only touch rows owned by the caller's profile.
    pub enforce_ownership: bool,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            portfolio_origin: DEFAULT_PORTFOLIO_ORIGIN.to_string(),
            enforce_ownership: true,
        }
    }
}

pub struct ProfileGateway {
    backend: Arc<dyn Backend>,
    sessions: Arc<dyn SessionStore>,
    options: GatewayOptions,
}

impl ProfileGateway {
    pub fn new(
        backend: Arc<dyn Backend>,
        sessions: Arc<dyn SessionStore>,
        options: GatewayOptions,
    ) -> Self {
        Self {
            backend,
            sessions,
            options,
        }
    }

    pub fn options(&self) -> &GatewayOptions {
        &self.options
    }

    /// Acquires the caller's session from the local cache and brings the
    /// backend's tokens in line with it.
    pub async fn session(&self) -> Result<Session, GatewayError> {
        let Some(mut session) = self.sessions.get().await.map_err(GatewayError::Session)? else {
            return Err(GatewayError::NotAuthenticated);
        };
        self.sync_tokens(&mut session).await;
        Ok(session)
    }

    /// A fresh backend resumes the persisted tokens; tokens rotated by a
    /// refresh are written back to the cache.
    async fn sync_tokens(&self, session: &mut Session) {
        match (self.backend.tokens().await, session.tokens.clone()) {
            (None, Some(stored)) => self.backend.restore(stored).await,
            (Some(live), stored) if stored.as_ref() != Some(&live) => {
                debug!("Persisting rotated tokens for {}", session.user_id);
                session.tokens = Some(live);
                self.remember(session).await;
            }
            _ => {}
        }
    }

    /// Caches the session locally. Write failures are not fatal.
    async fn remember(&self, session: &Session) {
        if let Err(e) = self.sessions.set(session).await {
            warn!("Could not cache session for {}: {e:#}", session.user_id);
        }
    }

    async fn forget(&self) {
        if let Err(e) = self.sessions.remove().await {
            warn!("Could not clear cached session: {e:#}");
        }
    }

    async fn find_profile(&self, session: &Session) -> Result<Option<Profile>, GatewayError> {
        let rows = self
            .backend
            .select(
                Table::Profiles,
                &Query::new().eq("user_id", session.user_id).limit(1),
            )
            .await?;
        Ok(parse_rows::<Profile>(rows)?.into_iter().next())
    }

    /// Every child-record write is anchored on this lookup.
    async fn require_profile(&self, session: &Session) -> Result<Profile, GatewayError> {
        self.find_profile(session)
            .await?
            .ok_or(GatewayError::ProfileNotFound)
    }
}

/// Runs a mutating operation, logging its failure before handing it back.
pub(crate) async fn guarded<T, F>(operation: &str, fut: F) -> Result<T, GatewayError>
where
    F: Future<Output = Result<T, GatewayError>>,
{
    match fut.await {
        Ok(value) => Ok(value),
        Err(e) => {
            match &e {
                GatewayError::Internal(_) | GatewayError::Session(_) => {
                    error!("{operation} failed: {e:#}")
                }
                _ => warn!("{operation} failed: {e}"),
            }
            Err(e)
        }
    }
}

/// Runs a read, collapsing any failure into the empty value.
pub(crate) async fn or_default<T, F>(operation: &str, fut: F) -> T
where
    T: Default,
    F: Future<Output = Result<T, GatewayError>>,
{
    match fut.await {
        Ok(value) => value,
        Err(GatewayError::NotAuthenticated) => {
            debug!("{operation}: no session");
            T::default()
        }
        Err(e) => {
            warn!("{operation} failed, returning empty result: {e}");
            T::default()
        }
    }
}

pub(crate) fn parse_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>, GatewayError> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(GatewayError::from))
        .collect()
}
