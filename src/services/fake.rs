//! In-memory platform used by handler and onboarding tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::{AuthUser, Backend, BackendError, Filter, Query};

#[derive(Default)]
pub struct FakeBackend {
    tables: Mutex<HashMap<String, Vec<Value>>>,
    objects: Mutex<HashMap<String, Vec<u8>>>,
    sessions: Mutex<HashMap<String, AuthUser>>,
    /// Operations forced to fail, e.g. `insert:services` or `upload`.
    failing: Mutex<HashSet<String>>,
    /// Every call in order, e.g. `update:profiles`.
    calls: Mutex<Vec<String>>,
    /// Latency added to every data and storage call.
    delay: Mutex<Option<Duration>>,
}

fn cell_matches(cell: Option<&Value>, expected: &str) -> bool {
    match cell {
        Some(Value::String(s)) => s == expected,
        Some(Value::Null) | None => false,
        Some(other) => other.to_string() == expected,
    }
}

fn row_matches(row: &Value, filters: &[Filter]) -> bool {
    filters.iter().all(|f| match f {
        Filter::Eq(column, value) => cell_matches(row.get(column), value),
        Filter::In(column, values) => values.iter().any(|v| cell_matches(row.get(column), v)),
    })
}

fn project(row: &Value, columns: Option<&str>) -> Value {
    let columns = match columns {
        Some(c) if c.trim() != "*" => c,
        _ => return row.clone(),
    };
    let mut out = Map::new();
    for column in columns.split(',').map(str::trim) {
        if let Some(v) = row.get(column) {
            out.insert(column.to_string(), v.clone());
        }
    }
    Value::Object(out)
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(self, token: &str, user: AuthUser) -> Self {
        self.sessions.lock().unwrap().insert(token.to_string(), user);
        self
    }

    pub fn seed(&self, table: &str, row: Value) {
        self.tables.lock().unwrap().entry(table.to_string()).or_default().push(row);
    }

    pub fn rows(&self, table: &str) -> Vec<Value> {
        self.tables.lock().unwrap().get(table).cloned().unwrap_or_default()
    }

    pub fn object_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        paths.sort();
        paths
    }

    pub fn fail(&self, op: &str) {
        self.failing.lock().unwrap().insert(op.to_string());
    }

    pub fn slow(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    async fn pause(&self) {
        let delay = *self.delay.lock().unwrap();
        if let Some(d) = delay {
            actix_web::rt::time::sleep(d).await;
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, op: String) -> Result<(), BackendError> {
        let failing = {
            let set = self.failing.lock().unwrap();
            set.contains(&op) || set.contains(op.split(':').next().unwrap_or_default())
        };
        self.calls.lock().unwrap().push(op);
        if failing {
            return Err(BackendError::Status { status: 500, body: "forced failure".to_string() });
        }
        Ok(())
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn select(&self, _token: Option<&str>, table: &str, query: &Query) -> Result<Vec<Value>, BackendError> {
        self.pause().await;
        self.record(format!("select:{}", table))?;
        let mut rows: Vec<Value> = self
            .rows(table)
            .into_iter()
            .filter(|r| row_matches(r, &query.filters))
            .collect();
        if let Some((column, ascending)) = &query.order {
            rows.sort_by(|a, b| {
                let ka = a.get(column).map(|v| v.to_string()).unwrap_or_default();
                let kb = b.get(column).map(|v| v.to_string()).unwrap_or_default();
                if *ascending { ka.cmp(&kb) } else { kb.cmp(&ka) }
            });
        }
        if let Some(n) = query.limit {
            rows.truncate(n);
        }
        Ok(rows.iter().map(|r| project(r, query.columns.as_deref())).collect())
    }

    async fn insert(&self, _token: Option<&str>, table: &str, mut row: Value) -> Result<Value, BackendError> {
        self.pause().await;
        self.record(format!("insert:{}", table))?;
        if let Some(obj) = row.as_object_mut() {
            obj.entry("id").or_insert_with(|| json!(Uuid::new_v4().to_string()));
            obj.entry("created_at").or_insert_with(|| json!(chrono::Utc::now().to_rfc3339()));
        }
        self.seed(table, row.clone());
        Ok(row)
    }

    async fn update(&self, _token: Option<&str>, table: &str, filters: &[Filter], patch: Value) -> Result<(), BackendError> {
        self.pause().await;
        self.record(format!("update:{}", table))?;
        let mut tables = self.tables.lock().unwrap();
        for row in tables.entry(table.to_string()).or_default().iter_mut() {
            if !row_matches(row, filters) {
                continue;
            }
            if let (Some(target), Some(changes)) = (row.as_object_mut(), patch.as_object()) {
                for (k, v) in changes {
                    target.insert(k.clone(), v.clone());
                }
            }
        }
        Ok(())
    }

    async fn upsert(&self, _token: Option<&str>, table: &str, row: Value) -> Result<(), BackendError> {
        self.pause().await;
        self.record(format!("upsert:{}", table))?;
        let id = row.get("id").and_then(Value::as_str).unwrap_or_default().to_string();
        let mut tables = self.tables.lock().unwrap();
        let rows = tables.entry(table.to_string()).or_default();
        match rows.iter_mut().find(|r| cell_matches(r.get("id"), &id)) {
            Some(existing) => {
                if let (Some(target), Some(changes)) = (existing.as_object_mut(), row.as_object()) {
                    for (k, v) in changes {
                        target.insert(k.clone(), v.clone());
                    }
                }
            }
            None => rows.push(row),
        }
        Ok(())
    }

    async fn delete(&self, _token: Option<&str>, table: &str, filters: &[Filter]) -> Result<(), BackendError> {
        self.pause().await;
        self.record(format!("delete:{}", table))?;
        let mut tables = self.tables.lock().unwrap();
        tables.entry(table.to_string()).or_default().retain(|r| !row_matches(r, filters));
        Ok(())
    }

    async fn upload(
        &self,
        _token: Option<&str>,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), BackendError> {
        self.pause().await;
        self.record(format!("upload:{}", path))?;
        self.objects.lock().unwrap().insert(format!("{}/{}", bucket, path), bytes);
        Ok(())
    }

    async fn remove_objects(&self, _token: Option<&str>, bucket: &str, paths: &[String]) -> Result<(), BackendError> {
        self.record(format!("remove:{}", bucket))?;
        let mut objects = self.objects.lock().unwrap();
        for p in paths {
            objects.remove(&format!("{}/{}", bucket, p));
        }
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("https://fake.local/storage/v1/object/public/{}/{}", bucket, path)
    }

    async fn get_user(&self, token: &str) -> Result<AuthUser, BackendError> {
        self.sessions
            .lock()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or(BackendError::Status { status: 401, body: "invalid JWT".to_string() })
    }

    async fn sign_out(&self, token: &str) -> Result<(), BackendError> {
        self.record("sign_out".to_string())?;
        self.sessions.lock().unwrap().remove(token);
        Ok(())
    }

    fn oauth_url(&self, provider: &str, redirect_to: &str) -> String {
        format!("https://fake.local/auth/v1/authorize?provider={}&redirect_to={}", provider, redirect_to)
    }
}
