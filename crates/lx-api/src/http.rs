use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use lx_model::{LaunchBatch, Task, TaskProvider};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{error::ApiError, handler::ApiHandler};

/// HTTP API service builder.
pub struct HttpApi<H> {
    handler: Arc<H>,
}

impl<H> HttpApi<H>
where
    H: ApiHandler,
{
    pub fn new(handler: Arc<H>) -> Self {
        Self { handler }
    }

    /// Build the axum router.
    ///
    /// Routes:
    /// - POST   /api/v1/providers - Register a task provider
    /// - GET    /api/v1/providers - List task providers
    /// - DELETE /api/v1/providers/{id} - Unregister a task provider
    /// - POST   /api/v1/providers/{id}/tasks - Submit a task to a provider
    /// - POST   /api/v1/launch - Place and launch a batch of tasks
    /// - GET    /api/v1/tasks - List pending tasks
    /// - GET    /api/v1/tasks/{id} - Get task status
    pub fn router(self) -> Router {
        Router::new()
            .route("/api/v1/providers", post(register_provider::<H>))
            .route("/api/v1/providers", get(list_providers::<H>))
            .route("/api/v1/providers/{id}", delete(unregister_provider::<H>))
            .route("/api/v1/providers/{id}/tasks", post(submit_task::<H>))
            .route("/api/v1/launch", post(launch_tasks::<H>))
            .route("/api/v1/tasks", get(pending_tasks::<H>))
            .route("/api/v1/tasks/{id}", get(task_status::<H>))
            .with_state(self.handler)
    }
}

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct RegisterProviderResponse {
    replaced: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct SubmitTaskRequest {
    task: Task,
}

#[derive(Debug, Serialize, Deserialize)]
struct SubmitTaskResponse {
    task_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct LaunchTasksResponse {
    launched: usize,
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /api/v1/providers
async fn register_provider<H>(
    State(handler): State<Arc<H>>,
    Json(provider): Json<TaskProvider>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    debug!(provider = %provider.id, "registering task provider");
    let replaced = handler.register_provider(provider).await?;
    Ok((StatusCode::CREATED, Json(RegisterProviderResponse { replaced })))
}

/// GET /api/v1/providers
async fn list_providers<H>(State(handler): State<Arc<H>>) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    Ok(Json(handler.list_providers().await?))
}

/// DELETE /api/v1/providers/{id}
async fn unregister_provider<H>(
    State(handler): State<Arc<H>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    handler.unregister_provider(&id).await?;
    debug!(provider = %id, "task provider unregistered");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/providers/{id}/tasks
async fn submit_task<H>(
    State(handler): State<Arc<H>>,
    Path(provider_id): Path<String>,
    Json(req): Json<SubmitTaskRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    debug!(provider = %provider_id, task = %req.task.id, "submitting task");
    let task_id = handler.submit_task(&provider_id, req.task).await?;

    let response = SubmitTaskResponse {
        task_id: task_id.to_string(),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/launch
async fn launch_tasks<H>(
    State(handler): State<Arc<H>>,
    Json(batch): Json<LaunchBatch>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    let launched = handler.launch_tasks(batch).await?;
    Ok((StatusCode::ACCEPTED, Json(LaunchTasksResponse { launched })))
}

/// GET /api/v1/tasks
async fn pending_tasks<H>(State(handler): State<Arc<H>>) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    Ok(Json(handler.pending_tasks().await?))
}

/// GET /api/v1/tasks/{id}
async fn task_status<H>(
    State(handler): State<Arc<H>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    H: ApiHandler,
{
    match handler.task_status(&id).await? {
        Some(info) => Ok(Json(info)),
        None => Err(ApiError::NotFound(format!("task {id}"))),
    }
}
