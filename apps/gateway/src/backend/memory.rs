//! In-memory backend for tests. Mirrors the Supabase semantics the gateway
//! relies on: generated ids, equality filters, descending order with nulls last.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{AuthTokens, AuthUser, Backend, BackendError, Filter, Query, Table};

struct Account {
    password: String,
    user: AuthUser,
}

#[derive(Default)]
pub struct MemoryBackend {
    accounts: Mutex<HashMap<String, Account>>,
    current: Mutex<Option<(AuthUser, AuthTokens)>>,
    /// Access tokens the auth side still honours.
    issued: Mutex<HashMap<String, AuthUser>>,
    auth_down: Mutex<bool>,
    tables: Mutex<HashMap<Table, Vec<Value>>>,
    failing: Mutex<Vec<Table>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every store operation on `table` fail with a backend error.
    pub async fn fail_table(&self, table: Table) {
        self.failing.lock().await.push(table);
    }

    /// Makes session queries and sign-out fail as if the auth API were down.
    pub async fn fail_auth(&self) {
        *self.auth_down.lock().await = true;
    }

    /// Revokes every issued token, like a server-side session expiry.
    pub async fn expire_sessions(&self) {
        self.issued.lock().await.clear();
        *self.current.lock().await = None;
    }

    /// Forgets the live session but keeps its tokens valid, the way a freshly
    /// started process knows nothing until a session is restored.
    pub async fn forget_client_session(&self) {
        *self.current.lock().await = None;
    }

    pub async fn rows(&self, table: Table) -> Vec<Value> {
        self.tables
            .lock()
            .await
            .get(&table)
            .cloned()
            .unwrap_or_default()
    }

    async fn check_auth(&self) -> Result<(), BackendError> {
        if *self.auth_down.lock().await {
            return Err(BackendError::Api {
                status: 503,
                message: "auth service unavailable".to_string(),
            });
        }
        Ok(())
    }

    async fn check(&self, table: Table) -> Result<(), BackendError> {
        if self.failing.lock().await.contains(&table) {
            return Err(BackendError::Api {
                status: 503,
                message: format!("relation \"{}\" is unavailable", table.as_str()),
            });
        }
        Ok(())
    }
}

fn row_matches(row: &Value, filters: &[Filter]) -> bool {
    filters.iter().all(|f| match row.get(f.column) {
        Some(Value::String(s)) => *s == f.value,
        Some(Value::Null) | None => false,
        Some(other) => other.to_string() == f.value,
    })
}

/// Orders two column values ascending, with nulls sorting after everything.
fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(x)), Some(Value::String(y))) => {
            match (x.parse::<DateTime<Utc>>(), y.parse::<DateTime<Utc>>()) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        (Some(x), Some(y)) => x.to_string().cmp(&y.to_string()),
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, BackendError> {
        let mut accounts = self.accounts.lock().await;
        if accounts.contains_key(email) {
            return Err(BackendError::Api {
                status: 422,
                message: "User already registered".to_string(),
            });
        }
        let user = AuthUser {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
        };
        accounts.insert(
            email.to_string(),
            Account {
                password: password.to_string(),
                user: user.clone(),
            },
        );
        Ok(user)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, BackendError> {
        let accounts = self.accounts.lock().await;
        let user = accounts
            .get(email)
            .filter(|a| a.password == password)
            .map(|a| a.user.clone())
            .ok_or_else(|| BackendError::Api {
                status: 400,
                message: "Invalid login credentials".to_string(),
            })?;
        let tokens = AuthTokens {
            access_token: format!("access-{}", Uuid::new_v4()),
            refresh_token: Some(format!("refresh-{}", Uuid::new_v4())),
        };
        self.issued
            .lock()
            .await
            .insert(tokens.access_token.clone(), user.clone());
        *self.current.lock().await = Some((user.clone(), tokens));
        Ok(user)
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.check_auth().await?;
        if let Some((_, tokens)) = self.current.lock().await.take() {
            self.issued.lock().await.remove(&tokens.access_token);
        }
        Ok(())
    }

    async fn current_user(&self) -> Result<Option<AuthUser>, BackendError> {
        self.check_auth().await?;
        Ok(self.current.lock().await.as_ref().map(|(user, _)| user.clone()))
    }

    async fn tokens(&self) -> Option<AuthTokens> {
        self.current
            .lock()
            .await
            .as_ref()
            .map(|(_, tokens)| tokens.clone())
    }

    async fn restore(&self, tokens: AuthTokens) {
        let user = self.issued.lock().await.get(&tokens.access_token).cloned();
        if let Some(user) = user {
            *self.current.lock().await = Some((user, tokens));
        }
    }

    async fn insert(&self, table: Table, mut row: Value) -> Result<Vec<Value>, BackendError> {
        self.check(table).await?;
        if let Some(obj) = row.as_object_mut() {
            obj.entry("id")
                .or_insert_with(|| Value::String(Uuid::new_v4().to_string()));
        }
        self.tables
            .lock()
            .await
            .entry(table)
            .or_default()
            .push(row.clone());
        Ok(vec![row])
    }

    async fn select(&self, table: Table, query: &Query) -> Result<Vec<Value>, BackendError> {
        self.check(table).await?;
        let tables = self.tables.lock().await;
        let mut rows: Vec<Value> = tables
            .get(&table)
            .map(|rows| {
                rows.iter()
                    .filter(|r| row_matches(r, &query.filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ord = compare(a.get(order.column), b.get(order.column));
                let both_present = !a.get(order.column).map_or(true, Value::is_null)
                    && !b.get(order.column).map_or(true, Value::is_null);
                if order.descending && both_present {
                    ord.reverse()
                } else {
                    ord
                }
            });
        }
        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }
        Ok(rows)
    }

    async fn update(
        &self,
        table: Table,
        fields: Value,
        filters: &[Filter],
    ) -> Result<(), BackendError> {
        self.check(table).await?;
        let mut tables = self.tables.lock().await;
        let Some(patch) = fields.as_object() else {
            return Err(BackendError::UnexpectedResponse(
                "update payload must be an object".to_string(),
            ));
        };
        for row in tables.entry(table).or_default().iter_mut() {
            if !row_matches(row, filters) {
                continue;
            }
            if let Some(obj) = row.as_object_mut() {
                for (k, v) in patch {
                    obj.insert(k.clone(), v.clone());
                }
            }
        }
        Ok(())
    }

    async fn delete(&self, table: Table, filters: &[Filter]) -> Result<(), BackendError> {
        self.check(table).await?;
        self.tables
            .lock()
            .await
            .entry(table)
            .or_default()
            .retain(|row| !row_matches(row, filters));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_descending_order_puts_nulls_last() {
        let backend = MemoryBackend::new();
        for date in [json!("2021-03-01"), Value::Null, json!("2023-07-15")] {
            backend
                .insert(Table::Certificates, json!({ "issued_date": date }))
                .await
                .unwrap();
        }
        let rows = backend
            .select(Table::Certificates, &Query::new().order_desc("issued_date"))
            .await
            .unwrap();
        let dates: Vec<_> = rows.iter().map(|r| r["issued_date"].clone()).collect();
        assert_eq!(
            dates,
            vec![json!("2023-07-15"), json!("2021-03-01"), Value::Null]
        );
    }

    #[tokio::test]
    async fn test_failing_table_reports_api_error() {
        let backend = MemoryBackend::new();
        backend.fail_table(Table::Projects).await;
        let err = backend
            .select(Table::Projects, &Query::new())
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::Api { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_restore_only_accepts_issued_tokens() {
        let backend = MemoryBackend::new();
        backend.sign_up("a@example.com", "pw").await.unwrap();
        let user = backend.sign_in("a@example.com", "pw").await.unwrap();
        let tokens = backend.tokens().await.unwrap();

        backend.forget_client_session().await;
        assert_eq!(backend.current_user().await.unwrap(), None);
        backend.restore(tokens.clone()).await;
        assert_eq!(backend.current_user().await.unwrap(), Some(user));

        backend.expire_sessions().await;
        backend.restore(tokens).await;
        assert_eq!(backend.current_user().await.unwrap(), None);
    }
}
