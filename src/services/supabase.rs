use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{AuthUser, Backend, BackendError, Filter, Query};
use crate::config::Config;

#[derive(Deserialize)]
struct UserResponse {
    id: String,
    email: Option<String>,
    #[serde(default)]
    user_metadata: Option<UserMetadata>,
}

#[derive(Deserialize, Default)]
struct UserMetadata {
    full_name: Option<String>,
    name: Option<String>,
}

/// REST client for the hosted platform: PostgREST tables, storage buckets and auth.
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &Config) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http_timeout_secs))
            .build()?;

        Ok(SupabaseClient {
            client,
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
        })
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn storage_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/{}/{}", self.base_url, bucket, path)
    }

    fn authorized(&self, req: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        req.header("apikey", &self.anon_key)
            .bearer_auth(token.unwrap_or(&self.anon_key))
    }

    async fn check(resp: Response) -> Result<Response, BackendError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        log::warn!("platform non-success status: {} body: {}", status, body);
        Err(BackendError::Status { status: status.as_u16(), body })
    }

    fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
        filters.iter().map(|f| (f.column().to_string(), f.operand())).collect()
    }
}

#[async_trait]
impl Backend for SupabaseClient {
    async fn select(&self, token: Option<&str>, table: &str, query: &Query) -> Result<Vec<Value>, BackendError> {
        let req = self.client.get(self.rest_url(table)).query(&query.to_params());
        let resp = Self::check(self.authorized(req, token).send().await?).await?;
        Ok(resp.json::<Vec<Value>>().await?)
    }

    async fn insert(&self, token: Option<&str>, table: &str, row: Value) -> Result<Value, BackendError> {
        let req = self
            .client
            .post(self.rest_url(table))
            .header("Prefer", "return=representation")
            .json(&row);
        let resp = Self::check(self.authorized(req, token).send().await?).await?;
        let rows: Vec<Value> = resp.json().await?;
        rows.into_iter().next().ok_or(BackendError::Empty)
    }

    async fn update(&self, token: Option<&str>, table: &str, filters: &[Filter], patch: Value) -> Result<(), BackendError> {
        let req = self
            .client
            .patch(self.rest_url(table))
            .query(&Self::filter_params(filters))
            .json(&patch);
        Self::check(self.authorized(req, token).send().await?).await?;
        Ok(())
    }

    async fn upsert(&self, token: Option<&str>, table: &str, row: Value) -> Result<(), BackendError> {
        let req = self
            .client
            .post(self.rest_url(table))
            .header("Prefer", "resolution=merge-duplicates")
            .json(&row);
        Self::check(self.authorized(req, token).send().await?).await?;
        Ok(())
    }

    async fn delete(&self, token: Option<&str>, table: &str, filters: &[Filter]) -> Result<(), BackendError> {
        let req = self
            .client
            .delete(self.rest_url(table))
            .query(&Self::filter_params(filters));
        Self::check(self.authorized(req, token).send().await?).await?;
        Ok(())
    }

    async fn upload(
        &self,
        token: Option<&str>,
        bucket: &str,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), BackendError> {
        let req = self
            .client
            .post(self.storage_url(bucket, path))
            .header("Content-Type", content_type)
            .header("cache-control", "max-age=3600")
            .header("x-upsert", "false")
            .body(bytes);
        Self::check(self.authorized(req, token).send().await?).await?;
        Ok(())
    }

    async fn remove_objects(&self, token: Option<&str>, bucket: &str, paths: &[String]) -> Result<(), BackendError> {
        if paths.is_empty() {
            return Ok(());
        }
        let req = self
            .client
            .delete(format!("{}/storage/v1/object/{}", self.base_url, bucket))
            .json(&json!({ "prefixes": paths }));
        Self::check(self.authorized(req, token).send().await?).await?;
        Ok(())
    }

    fn public_url(&self, bucket: &str, path: &str) -> String {
        format!("{}/storage/v1/object/public/{}/{}", self.base_url, bucket, path)
    }

    async fn get_user(&self, token: &str) -> Result<AuthUser, BackendError> {
        let req = self.client.get(format!("{}/auth/v1/user", self.base_url));
        let resp = Self::check(self.authorized(req, Some(token)).send().await?).await?;
        let user: UserResponse = resp.json().await?;
        let metadata = user.user_metadata.unwrap_or_default();

        Ok(AuthUser {
            id: user.id,
            email: user.email,
            full_name: metadata.full_name.or(metadata.name),
        })
    }

    async fn sign_out(&self, token: &str) -> Result<(), BackendError> {
        let req = self.client.post(format!("{}/auth/v1/logout", self.base_url));
        Self::check(self.authorized(req, Some(token)).send().await?).await?;
        Ok(())
    }

    fn oauth_url(&self, provider: &str, redirect_to: &str) -> String {
        let base = format!("{}/auth/v1/authorize", self.base_url);
        let params = [
            ("provider", provider),
            ("redirect_to", redirect_to),
            ("access_type", "offline"),
            ("prompt", "consent"),
        ];
        match Url::parse_with_params(&base, &params) {
            Ok(url) => url.to_string(),
            Err(e) => {
                log::error!("invalid auth url {}: {}", base, e);
                base
            }
        }
    }
}
