pub mod supabase;
#[cfg(test)]
pub mod fake;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("platform returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("no rows returned")]
    Empty,
}

impl BackendError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, BackendError::Status { status: 401 | 403, .. })
    }
}

/// User object of the hosted auth service.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AuthUser {
    pub id: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
}

impl AuthUser {
    /// Name shown in greetings; falls back to the mailbox part of the email.
    pub fn display_name(&self) -> String {
        if let Some(name) = self.full_name.as_deref().filter(|n| !n.trim().is_empty()) {
            return name.to_string();
        }
        self.email
            .as_deref()
            .and_then(|e| e.split('@').next())
            .filter(|s| !s.is_empty())
            .unwrap_or("User")
            .to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, String),
    In(String, Vec<String>),
}

impl Filter {
    pub fn column(&self) -> &str {
        match self {
            Filter::Eq(c, _) | Filter::In(c, _) => c,
        }
    }

    /// PostgREST operator syntax, e.g. `eq.active` or `in.("a","b")`.
    pub fn operand(&self) -> String {
        match self {
            Filter::Eq(_, v) => format!("eq.{}", v),
            Filter::In(_, vs) => {
                let quoted: Vec<String> = vs.iter().map(|v| format!("\"{}\"", v.replace('"', "\\\""))).collect();
                format!("in.({})", quoted.join(","))
            }
        }
    }
}

/// Table-scoped read: column list, filters, ordering and limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub columns: Option<String>,
    pub filters: Vec<Filter>,
    pub order: Option<(String, bool)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(mut self, columns: &str) -> Self {
        self.columns = Some(columns.to_string());
        self
    }

    pub fn eq(mut self, column: &str, value: impl Into<String>) -> Self {
        self.filters.push(Filter::Eq(column.to_string(), value.into()));
        self
    }

    pub fn is_in(mut self, column: &str, values: Vec<String>) -> Self {
        self.filters.push(Filter::In(column.to_string(), values));
        self
    }

    pub fn order(mut self, column: &str, ascending: bool) -> Self {
        self.order = Some((column.to_string(), ascending));
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = vec![("select".to_string(), self.columns.clone().unwrap_or_else(|| "*".to_string()))];
        for f in &self.filters {
            params.push((f.column().to_string(), f.operand()));
        }
        if let Some((column, ascending)) = &self.order {
            let dir = if *ascending { "asc" } else { "desc" };
            params.push(("order".to_string(), format!("{}.{}", column, dir)));
        }
        if let Some(n) = self.limit {
            params.push(("limit".to_string(), n.to_string()));
        }
        params
    }
}

/// Operations the app needs from the hosted data/auth/storage platform.
///
/// `token` is the signed-in user's access token; `None` means the anonymous key.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn select(&self, token: Option<&str>, table: &str, query: &Query) -> Result<Vec<Value>, BackendError>;
    /// Inserts one row and returns it as stored.
    async fn insert(&self, token: Option<&str>, table: &str, row: Value) -> Result<Value, BackendError>;
    async fn update(&self, token: Option<&str>, table: &str, filters: &[Filter], patch: Value) -> Result<(), BackendError>;
    async fn upsert(&self, token: Option<&str>, table: &str, row: Value) -> Result<(), BackendError>;
    async fn delete(&self, token: Option<&str>, table: &str, filters: &[Filter]) -> Result<(), BackendError>;

    async fn upload(
        &self,
        token: Option<&str>,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BackendError>;
    async fn remove_objects(&self, token: Option<&str>, bucket: &str, paths: &[String]) -> Result<(), BackendError>;
    fn public_url(&self, bucket: &str, path: &str) -> String;

    async fn get_user(&self, token: &str) -> Result<AuthUser, BackendError>;
    async fn sign_out(&self, token: &str) -> Result<(), BackendError>;
    fn oauth_url(&self, provider: &str, redirect_to: &str) -> String;
}

pub async fn fetch_all<T: DeserializeOwned>(
    backend: &dyn Backend,
    token: Option<&str>,
    table: &str,
    query: &Query,
) -> Result<Vec<T>, BackendError> {
    let rows = backend.select(token, table, query).await?;
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(BackendError::from))
        .collect()
}

pub async fn fetch_one<T: DeserializeOwned>(
    backend: &dyn Backend,
    token: Option<&str>,
    table: &str,
    query: Query,
) -> Result<Option<T>, BackendError> {
    let mut rows = fetch_all::<T>(backend, token, table, &query.limit(1)).await?;
    Ok(if rows.is_empty() { None } else { Some(rows.swap_remove(0)) })
}

pub async fn insert_as<T: DeserializeOwned, R: Serialize + Sync>(
    backend: &dyn Backend,
    token: Option<&str>,
    table: &str,
    row: &R,
) -> Result<T, BackendError> {
    let stored = backend.insert(token, table, serde_json::to_value(row)?).await?;
    Ok(serde_json::from_value(stored)?)
}

pub fn by_id(id: &str) -> Vec<Filter> {
    vec![Filter::Eq("id".to_string(), id.to_string())]
}
