//! Backend-as-a-service boundary: an auth API plus a tabular record store.
//!
//! The gateway only ever talks to the backend through the `Backend` trait, so
//! the Supabase client and the in-memory test double are interchangeable.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

#[cfg(test)]
pub mod memory;
pub mod supabase;

pub use supabase::SupabaseBackend;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl BackendError {
    /// The message surfaced to callers. API errors keep the backend's text as-is.
    pub fn message(&self) -> String {
        match self {
            BackendError::Api { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// The collections the gateway reads and writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Profiles,
    Projects,
    Certificates,
    Assessments,
    PortfolioLinks,
    CvGeneratorLogs,
}

impl Table {
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::Profiles => "profiles",
            Table::Projects => "projects",
            Table::Certificates => "certificates",
            Table::Assessments => "assessments",
            Table::PortfolioLinks => "portfolio_links",
            Table::CvGeneratorLogs => "cv_generator_logs",
        }
    }
}

/// An equality filter on one column.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: &'static str,
    pub value: String,
}

impl Filter {
    pub fn eq(column: &'static str, value: impl ToString) -> Self {
        Self {
            column,
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub column: &'static str,
    pub descending: bool,
}

/// A select: equality filters, optional ordering (nulls last) and limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order: Option<Order>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: &'static str, value: impl ToString) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }

    pub fn order_desc(mut self, column: &'static str) -> Self {
        self.order = Some(Order {
            column,
            descending: true,
        });
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }
}

/// The authenticated account as reported by the auth API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Bearer credentials of a backend session. Persisted with the local session
/// so a restarted process resumes it instead of falling back to the anon key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

#[async_trait]
pub trait Backend: Send + Sync {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, BackendError>;

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, BackendError>;

    async fn sign_out(&self) -> Result<(), BackendError>;

    /// The user behind the current backend session, if any.
    async fn current_user(&self) -> Result<Option<AuthUser>, BackendError>;

    /// Tokens of the live session, including any issued by a refresh.
    async fn tokens(&self) -> Option<AuthTokens>;

    /// Resumes a session persisted by an earlier process.
    async fn restore(&self, tokens: AuthTokens);

    /// Inserts one row and returns the stored representation(s).
    async fn insert(&self, table: Table, row: Value) -> Result<Vec<Value>, BackendError>;

    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Value>, BackendError>;

    async fn update(
        &self,
        table: Table,
        fields: Value,
        filters: &[Filter],
    ) -> Result<(), BackendError>;

    async fn delete(&self, table: Table, filters: &[Filter]) -> Result<(), BackendError>;
}
