//! REST client for the task API.
//!
//! Talks to any json-server compatible endpoint (including
//! `taskboard-server`). Status codes map onto [`ApiError`]: `404` is
//! [`ApiError::NotFound`], any other non-2xx is [`ApiError::Server`], and
//! connection failures are [`ApiError::Network`].

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use url::Url;

use taskboard_proto::routes;
use taskboard_proto::task::{NewTask, Task, TaskId, TaskPatch};

use super::{ApiError, BackendKind, TaskApi};

/// HTTP-backed [`TaskApi`].
pub struct HttpTaskApi {
    base_url: Url,
    client: Client,
}

impl HttpTaskApi {
    /// Creates a client for the API rooted at `base_url`.
    ///
    /// A missing trailing slash is added so relative paths join beneath it.
    /// `timeout` bounds each request; `None` waits indefinitely.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] if `base_url` is not a valid absolute
    /// URL or the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut normalized = base_url.trim().to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        let base_url = Url::parse(&normalized)
            .map_err(|e| ApiError::Network(format!("invalid api url {base_url}: {e}")))?;

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::Network(format!("http client setup failed: {e}")))?;

        Ok(Self { base_url, client })
    }

    /// The normalized base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn collection_url(&self) -> Result<Url, ApiError> {
        self.base_url
            .join(routes::TASKS)
            .map_err(|e| ApiError::Network(e.to_string()))
    }

    /// URL of a single task, with the id percent-encoded as one path segment.
    fn item_url(&self, id: &TaskId) -> Result<Url, ApiError> {
        let mut url = self.collection_url()?;
        url.path_segments_mut()
            .map_err(|()| ApiError::Network("api url cannot be a base".to_string()))?
            .push(id.as_str());
        Ok(url)
    }

    /// Turns non-2xx responses into errors, leaving successes untouched.
    async fn check(response: Response, id: Option<&TaskId>) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::NOT_FOUND
            && let Some(id) = id
        {
            return Err(ApiError::NotFound(id.clone()));
        }
        let message = response
            .text()
            .await
            .ok()
            .filter(|body| !body.is_empty())
            .unwrap_or_else(|| status.canonical_reason().unwrap_or_default().to_string());
        Err(ApiError::Server {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        response
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(err.to_string())
        }
    }
}

impl TaskApi for HttpTaskApi {
    async fn fetch_all(&self) -> Result<Vec<Task>, ApiError> {
        let response = self.client.get(self.collection_url()?).send().await?;
        let response = Self::check(response, None).await?;
        Self::decode(response).await
    }

    async fn create(&self, new_task: &NewTask) -> Result<Task, ApiError> {
        let response = self
            .client
            .post(self.collection_url()?)
            .json(new_task)
            .send()
            .await?;
        let response = Self::check(response, None).await?;
        Self::decode(response).await
    }

    async fn update(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, ApiError> {
        let response = self
            .client
            .patch(self.item_url(id)?)
            .json(patch)
            .send()
            .await?;
        let response = Self::check(response, Some(id)).await?;
        Self::decode(response).await
    }

    async fn delete(&self, id: &TaskId) -> Result<(), ApiError> {
        let response = self.client.delete(self.item_url(id)?).send().await?;
        Self::check(response, Some(id)).await?;
        Ok(())
    }

    fn backend_kind(&self) -> BackendKind {
        BackendKind::Http
    }
}
