// REST client for the publication platform API
use crate::application::aggregate_fetcher::AggregateRequest;
use crate::application::platform_api::{FetchError, FetchResult, PlatformApi};
use crate::domain::activity::ActivityEntry;
use crate::domain::listing::{
    CursorPage, Message, Passcode, PasscodeRole, Publication, UserUpdate,
};
use crate::domain::stats::{StatsResponse, UserSummary};
use crate::infrastructure::stats_mapper::decode_stats;
use anyhow::Context;
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Where to reach the platform and which bearer token to present. Passed
/// explicitly to the client rather than read from ambient state.
#[derive(Clone)]
pub struct SessionContext {
    base_url: String,
    token: String,
}

impl SessionContext {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
    data: T,
}

/// List endpoints answer with a bare array or wrap it in `data` or `results`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListBody<T> {
    Bare(Vec<T>),
    Data { data: Vec<T> },
    Results { results: Vec<T> },
}

impl<T> ListBody<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            ListBody::Bare(items) | ListBody::Data { data: items } => items,
            ListBody::Results { results } => results,
        }
    }
}

#[derive(Debug, Serialize)]
struct NewPasscode {
    role: PasscodeRole,
}

#[derive(Debug, Clone)]
pub struct HttpPlatformClient {
    client: reqwest::Client,
    session: SessionContext,
}

impl HttpPlatformClient {
    pub fn new(session: SessionContext, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client, session })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.session.base_url, path)
    }

    async fn execute(&self, request: RequestBuilder) -> FetchResult<Response> {
        let response = request
            .bearer_auth(&self.session.token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(FetchError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::Network(format!(
                "platform responded with status {}: {}",
                status, body
            )));
        }

        Ok(response)
    }

    async fn body(&self, request: RequestBuilder) -> FetchResult<Vec<u8>> {
        let response = self.execute(request).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn get_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> FetchResult<T> {
        let body = self.body(request).await?;
        serde_json::from_slice(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }

    async fn get_page<T: DeserializeOwned>(
        &self,
        path: &str,
        page: u32,
    ) -> FetchResult<CursorPage<T>> {
        let request = self.client.get(self.url(path)).query(&[("page", page)]);
        self.get_json(request).await
    }
}

#[async_trait]
impl PlatformApi for HttpPlatformClient {
    async fn fetch_stats(&self, request: &AggregateRequest) -> FetchResult<StatsResponse> {
        let pairs = request.query_pairs();
        tracing::debug!("Fetching stats with {} parameters", pairs.len());

        let body = self
            .body(self.client.get(self.url("/publications/stats/")).query(&pairs))
            .await?;
        decode_stats(&body).map_err(FetchError::Decode)
    }

    async fn fetch_editor_activities(&self, page: u32) -> FetchResult<CursorPage<ActivityEntry>> {
        self.get_page("/editor-activities/", page).await
    }

    async fn fetch_messages(&self, page: u32) -> FetchResult<CursorPage<Message>> {
        self.get_page("/messages/", page).await
    }

    async fn fetch_publications(&self, page: u32) -> FetchResult<CursorPage<Publication>> {
        self.get_page("/publications/", page).await
    }

    async fn fetch_users(&self) -> FetchResult<Vec<UserSummary>> {
        let body: ListBody<UserSummary> =
            self.get_json(self.client.get(self.url("/register/"))).await?;
        Ok(body.into_vec())
    }

    async fn block_user(&self, user_id: u64) -> FetchResult<()> {
        let url = self.url(&format!("/admin/users/{user_id}/block/"));
        self.execute(self.client.patch(url)).await?;
        Ok(())
    }

    async fn unblock_user(&self, user_id: u64) -> FetchResult<()> {
        let url = self.url(&format!("/admin/users/{user_id}/unblock/"));
        self.execute(self.client.patch(url)).await?;
        Ok(())
    }

    async fn update_user(&self, user_id: u64, update: &UserUpdate) -> FetchResult<UserSummary> {
        let url = self.url(&format!("/user/{user_id}/"));
        let envelope: DataEnvelope<UserSummary> =
            self.get_json(self.client.put(url).json(update)).await?;
        Ok(envelope.data)
    }

    async fn delete_user(&self, user_id: u64) -> FetchResult<()> {
        let url = self.url(&format!("/user/{user_id}/"));
        self.execute(self.client.delete(url)).await?;
        Ok(())
    }

    async fn fetch_passcodes(&self) -> FetchResult<Vec<Passcode>> {
        let body: ListBody<Passcode> =
            self.get_json(self.client.get(self.url("/passcodes/"))).await?;
        Ok(body.into_vec())
    }

    async fn create_passcode(&self, role: PasscodeRole) -> FetchResult<Passcode> {
        let request = self
            .client
            .post(self.url("/passcodes/"))
            .json(&NewPasscode { role });
        self.get_json(request).await
    }
}
