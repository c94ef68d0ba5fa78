//! Reference task backend.
//!
//! A small REST service over a JSON file, exposing exactly what the client
//! expects: `GET /`, `GET|PUT|POST /todos`, `PATCH|DELETE /todos/{id}`.

pub mod storage;

use std::path::PathBuf;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tracing::{error, info};

use crate::models::{NewTask, Task, TaskId};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("task {0} not found")]
    NotFound(String),
    #[error("no numeric id left after {0}")]
    IdsExhausted(u64),
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::IdsExhausted(_) => StatusCode::CONFLICT,
            ApiError::Storage(ref e) => {
                error!(error = %e, "cannot persist tasks");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Shared state: the collection plus the file mirroring it.
#[derive(Clone)]
pub struct BackendState {
    tasks: Arc<Mutex<Vec<Task>>>,
    path: Arc<PathBuf>,
}

impl BackendState {
    /// Opens (or starts) the database at `path`.
    pub fn open(path: PathBuf) -> Self {
        let tasks = storage::load_tasks(&path);
        info!(path = %path.display(), count = tasks.len(), "opened task database");
        BackendState {
            tasks: Arc::new(Mutex::new(tasks)),
            path: Arc::new(path),
        }
    }

    fn persist(&self, tasks: &[Task]) -> Result<(), ApiError> {
        storage::save_tasks(&self.path, tasks)?;
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct TaskPatch {
    complete: Option<bool>,
}

pub fn router(state: BackendState) -> Router {
    Router::new()
        .route("/", get(list_tasks))
        .route(
            "/todos",
            get(list_tasks).put(replace_tasks).post(create_task),
        )
        .route("/todos/{id}", patch(update_task).delete(delete_task))
        .with_state(state)
}

/// Serves the backend on `listener` until the future is dropped.
pub async fn serve(listener: TcpListener, state: BackendState) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("task backend listening on http://{addr}");
    }
    axum::serve(listener, router(state)).await
}

fn next_id(tasks: &[Task]) -> Result<TaskId, ApiError> {
    let max = tasks
        .iter()
        .filter_map(|t| match t.id {
            TaskId::Number(n) => Some(n),
            TaskId::Text(ref s) => s.parse::<u64>().ok(),
        })
        .max()
        .unwrap_or(0);
    max.checked_add(1)
        .map(TaskId::Number)
        .ok_or(ApiError::IdsExhausted(max))
}

async fn list_tasks(State(state): State<BackendState>) -> Json<Vec<Task>> {
    Json(state.tasks.lock().await.clone())
}

async fn replace_tasks(
    State(state): State<BackendState>,
    Json(body): Json<Vec<Task>>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let mut tasks = state.tasks.lock().await;
    *tasks = body;
    state.persist(&tasks)?;
    info!(count = tasks.len(), "collection replaced");
    Ok(Json(tasks.clone()))
}

async fn create_task(
    State(state): State<BackendState>,
    Json(body): Json<NewTask>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    let mut tasks = state.tasks.lock().await;
    let task = body.with_id(next_id(&tasks)?);
    tasks.push(task.clone());
    state.persist(&tasks)?;
    info!(id = %task.id, "task created");
    Ok((StatusCode::CREATED, Json(task)))
}

async fn update_task(
    State(state): State<BackendState>,
    Path(id): Path<String>,
    Json(body): Json<TaskPatch>,
) -> Result<Json<Task>, ApiError> {
    let mut tasks = state.tasks.lock().await;
    let task = tasks
        .iter_mut()
        .find(|t| t.id.to_string() == id)
        .ok_or_else(|| ApiError::NotFound(id.clone()))?;
    if let Some(complete) = body.complete {
        task.complete = complete;
    }
    let updated = task.clone();
    state.persist(&tasks)?;
    Ok(Json(updated))
}

async fn delete_task(
    State(state): State<BackendState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut tasks = state.tasks.lock().await;
    let len_before = tasks.len();
    tasks.retain(|t| t.id.to_string() != id);
    if tasks.len() == len_before {
        return Err(ApiError::NotFound(id));
    }
    state.persist(&tasks)?;
    info!(%id, "task removed");
    Ok(Json(json!({})))
}
