//! Supabase client: auth (GoTrue) and table store (PostgREST) over plain HTTP.
//!
//! Holds the bearer tokens of the signed-in session. A request rejected with
//! 401 is retried once after exchanging the refresh token.

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::{AuthTokens, AuthUser, Backend, BackendError, Filter, Query, Table};

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Deserialize)]
struct SessionResponse {
    access_token: Option<String>,
    refresh_token: Option<String>,
    user: Option<AuthUser>,
}

pub struct SupabaseBackend {
    client: Client,
    base_url: String,
    anon_key: String,
    tokens: RwLock<Option<AuthTokens>>,
}

impl SupabaseBackend {
    pub fn new(base_url: &str, anon_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
            tokens: RwLock::new(None),
        })
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/rest/v1/{}", self.base_url, table.as_str())
    }

    /// Adds the project key and the bearer token (user token when signed in).
    async fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let tokens = self.tokens.read().await;
        let bearer = tokens
            .as_ref()
            .map_or(self.anon_key.as_str(), |t| t.access_token.as_str());
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, BackendError> {
        let retry = request.try_clone();
        let mut response = self.authorize(request).await.send().await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            if let Some(retry) = retry {
                if self.refresh().await {
                    response = self.authorize(retry).await.send().await?;
                }
            }
        }
        check_status(response).await
    }

    /// Exchanges the refresh token for a new session. Returns whether the
    /// request should be retried; a rejected refresh drops the session.
    async fn refresh(&self) -> bool {
        let Some(refresh_token) = self
            .tokens
            .read()
            .await
            .as_ref()
            .and_then(|t| t.refresh_token.clone())
        else {
            return false;
        };

        let request = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "refresh_token")])
            .header("apikey", &self.anon_key)
            .json(&json!({ "refresh_token": refresh_token }));
        let result: Result<SessionResponse, BackendError> = async {
            let response = check_status(request.send().await?).await?;
            Ok(response.json().await?)
        }
        .await;

        match result {
            Ok(SessionResponse {
                access_token: Some(access_token),
                refresh_token,
                ..
            }) => {
                debug!("Access token refreshed");
                *self.tokens.write().await = Some(AuthTokens {
                    access_token,
                    refresh_token,
                });
                true
            }
            Ok(_) => {
                warn!("Refresh response carried no access token; dropping session");
                *self.tokens.write().await = None;
                false
            }
            Err(BackendError::Api { status, message }) => {
                debug!("Refresh rejected ({status}): {message}; dropping session");
                *self.tokens.write().await = None;
                false
            }
            Err(e) => {
                warn!("Token refresh failed: {e}");
                false
            }
        }
    }

    /// Handles both sign-in and sign-up bodies. Sign-up without auto-confirm
    /// returns the bare user object and no session.
    async fn accept_session(&self, body: Value) -> Result<AuthUser, BackendError> {
        let session: SessionResponse = serde_json::from_value(body.clone())?;
        let user = match session.user {
            Some(user) => user,
            None => serde_json::from_value::<AuthUser>(body)?,
        };
        if let Some(access_token) = session.access_token {
            *self.tokens.write().await = Some(AuthTokens {
                access_token,
                refresh_token: session.refresh_token,
            });
        }
        Ok(user)
    }
}

#[async_trait]
impl Backend for SupabaseBackend {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, BackendError> {
        let request = self
            .client
            .post(self.auth_url("signup"))
            .json(&json!({ "email": email, "password": password }));
        let body: Value = self.send(request).await?.json().await?;
        self.accept_session(body).await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, BackendError> {
        let request = self
            .client
            .post(self.auth_url("token"))
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));
        let body: Value = self.send(request).await?.json().await?;
        self.accept_session(body).await
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        if self.tokens.read().await.is_none() {
            return Ok(());
        }
        self.send(self.client.post(self.auth_url("logout"))).await?;
        *self.tokens.write().await = None;
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<AuthUser>, BackendError> {
        if self.tokens.read().await.is_none() {
            return Ok(None);
        }
        match self.send(self.client.get(self.auth_url("user"))).await {
            Ok(response) => Ok(Some(response.json().await?)),
            Err(BackendError::Api { status, .. }) if status == 401 || status == 403 => {
                debug!("Access token rejected ({status}); dropping session");
                *self.tokens.write().await = None;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn tokens(&self) -> Option<AuthTokens> {
        self.tokens.read().await.clone()
    }

    async fn restore(&self, tokens: AuthTokens) {
        *self.tokens.write().await = Some(tokens);
    }

    async fn insert(&self, table: Table, row: Value) -> Result<Vec<Value>, BackendError> {
        let request = self
            .client
            .post(self.table_url(table))
            .header("Prefer", "return=representation")
            .json(&row);
        let rows: Vec<Value> = self.send(request).await?.json().await?;
        debug!("Inserted {} row(s) into {}", rows.len(), table.as_str());
        Ok(rows)
    }

    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Value>, BackendError> {
        let request = self
            .client
            .get(self.table_url(table))
            .query(&select_params(query));
        Ok(self.send(request).await?.json().await?)
    }

    async fn update(
        &self,
        table: Table,
        fields: Value,
        filters: &[Filter],
    ) -> Result<(), BackendError> {
        let request = self
            .client
            .patch(self.table_url(table))
            .query(&filter_params(filters))
            .header("Prefer", "return=minimal")
            .json(&fields);
        self.send(request).await?;
        Ok(())
    }

    async fn delete(&self, table: Table, filters: &[Filter]) -> Result<(), BackendError> {
        let request = self
            .client
            .delete(self.table_url(table))
            .query(&filter_params(filters));
        self.send(request).await?;
        Ok(())
    }
}

/// Maps a non-success response to `BackendError::Api` with the body's message.
async fn check_status(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(BackendError::Api {
        status: status.as_u16(),
        message: extract_error_message(&body),
    })
}

fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|f| (f.column.to_string(), format!("eq.{}", f.value)))
        .collect()
}

/// Renders a `Query` as PostgREST query parameters.
fn select_params(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];
    params.extend(filter_params(&query.filters));
    if let Some(order) = &query.order {
        let direction = if order.descending { "desc" } else { "asc" };
        params.push((
            "order".to_string(),
            format!("{}.{}.nullslast", order.column, direction),
        ));
    }
    if let Some(limit) = query.limit {
        params.push(("limit".to_string(), limit.to_string()));
    }
    params
}

/// Pulls a human-readable message out of a GoTrue or PostgREST error body.
fn extract_error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return body.to_string();
    };
    ["msg", "error_description", "message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}
