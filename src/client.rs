//! HTTP client for the task backend.
//!
//! Speaks the small REST surface the backend exposes: read everything,
//! overwrite everything, and create / patch / delete a single task.

use reqwest::{Client, Response, Url};
use serde_json::json;
use tracing::debug;

use crate::error::SyncError;
use crate::models::{NewTask, Task, TaskId};

#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base: Url,
    base_url: String,
}

impl BackendClient {
    /// Builds a client rooted at `base_url` (e.g. `http://localhost:4000`).
    ///
    /// No request timeout is configured: a slow call is simply left outstanding.
    pub fn new(base_url: &str) -> Result<Self, SyncError> {
        let http = Client::builder()
            .user_agent(concat!("remindust/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let base_url = base_url.trim_end_matches('/').to_string();
        let base = Url::parse(&base_url).map_err(|_| SyncError::InvalidUrl(base_url.clone()))?;
        if base.cannot_be_a_base() {
            return Err(SyncError::InvalidUrl(base_url));
        }
        Ok(BackendClient {
            http,
            base,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `/todos/{id}` with the id escaped as a single path segment.
    fn item_url(&self, id: &TaskId) -> Result<Url, SyncError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| SyncError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .push("todos")
            .push(&id.to_string());
        Ok(url)
    }

    /// `GET /`: the whole collection.
    pub async fn fetch_all(&self) -> Result<Vec<Task>, SyncError> {
        let url = self.url("/");
        let resp = self.http.get(&url).send().await?;
        let body = ok_body(resp, &url).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// `PUT /todos`: overwrite the backend's copy with `tasks`.
    pub async fn replace_all(&self, tasks: &[Task]) -> Result<(), SyncError> {
        let url = self.url("/todos");
        debug!(count = tasks.len(), "pushing snapshot");
        let resp = self.http.put(&url).json(tasks).send().await?;
        ok_body(resp, &url).await.map(|_| ())
    }

    /// `POST /todos`: returns the task enriched with its backend id.
    pub async fn create(&self, task: &NewTask) -> Result<Task, SyncError> {
        let url = self.url("/todos");
        let resp = self.http.post(&url).json(task).send().await?;
        let body = ok_body(resp, &url).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// `PATCH /todos/{id}` with `{"complete": ..}`.
    pub async fn set_complete(&self, id: &TaskId, complete: bool) -> Result<(), SyncError> {
        let url = self.item_url(id)?;
        let resp = self
            .http
            .patch(url.clone())
            .json(&json!({ "complete": complete }))
            .send()
            .await?;
        ok_body(resp, url.as_str()).await.map(|_| ())
    }

    /// `DELETE /todos/{id}`.
    pub async fn delete(&self, id: &TaskId) -> Result<(), SyncError> {
        let url = self.item_url(id)?;
        let resp = self.http.delete(url.clone()).send().await?;
        ok_body(resp, url.as_str()).await.map(|_| ())
    }
}

async fn ok_body(resp: Response, url: &str) -> Result<String, SyncError> {
    let status = resp.status();
    if !status.is_success() {
        return Err(SyncError::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    Ok(resp.text().await?)
}
