use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};

use super::{guarded, ProfileGateway};
use crate::backend::{AuthUser, Table};
use crate::errors::GatewayError;
use crate::models::NewProfile;
use crate::session::Session;

/// Result of a session check. Never an error: failures read as logged out.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginStatus {
    pub logged_in: bool,
    pub user: Option<AuthUser>,
}

impl LoginStatus {
    fn logged_out() -> Self {
        Self {
            logged_in: false,
            user: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SignedIn {
    pub user: AuthUser,
}

impl ProfileGateway {
    /// Creates the auth account, then its profile row. A failed profile insert
    /// leaves the account in place.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<SignedIn, GatewayError> {
        guarded("register", async {
            let user = self
                .backend
                .sign_up(email, password)
                .await
                .map_err(GatewayError::auth)?;

            let profile = NewProfile {
                user_id: user.id,
                email: email.to_string(),
                full_name: full_name.to_string(),
                skills: Vec::new(),
                interests: Vec::new(),
                created_at: Utc::now(),
            };
            self.backend
                .insert(Table::Profiles, serde_json::to_value(&profile)?)
                .await
                .map_err(|e| GatewayError::ProfileCreation(e.message()))?;

            info!("Registered user {}", user.id);
            Ok(SignedIn { user })
        })
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<SignedIn, GatewayError> {
        guarded("login", async {
            let user = self
                .backend
                .sign_in(email, password)
                .await
                .map_err(GatewayError::auth)?;
            let session = Session {
                user_id: user.id,
                tokens: self.backend.tokens().await,
            };
            self.remember(&session).await;
            info!("User {} logged in", user.id);
            Ok(SignedIn { user })
        })
        .await
    }

    /// Asks the backend who is signed in. A cached session the backend no
    /// longer honours is cleared; a failed check leaves the cache alone.
    pub async fn check_login(&self) -> LoginStatus {
        let cached = self.session().await.ok();
        match self.backend.current_user().await {
            Ok(Some(user)) => {
                let session = Session {
                    user_id: user.id,
                    tokens: self.backend.tokens().await,
                };
                if cached.as_ref() != Some(&session) {
                    self.remember(&session).await;
                }
                LoginStatus {
                    logged_in: true,
                    user: Some(user),
                }
            }
            Ok(None) => {
                if let Some(stale) = cached {
                    info!("Session for {} has ended; clearing cache", stale.user_id);
                    self.forget().await;
                }
                LoginStatus::logged_out()
            }
            Err(e) => {
                warn!("Session check failed: {e}");
                LoginStatus::logged_out()
            }
        }
    }

    /// Ends the backend session, then drops the cache. A failed sign-out keeps
    /// the cached session.
    pub async fn logout(&self) -> Result<(), GatewayError> {
        guarded("logout", async {
            // a restarted process has to resume the session before ending it
            self.session().await.ok();
            self.backend.sign_out().await?;
            self.sessions
                .remove()
                .await
                .map_err(GatewayError::Session)?;
            info!("Logged out");
            Ok(())
        })
        .await
    }
}
