//! Task API endpoints
//!
//! RESTful API for task CRUD operations, guarded by the shared `x-api-key`.

use axum::{
    extract::{Path, Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use taskapp_core::task::{Priority, Status, Task, TaskFilter};

use crate::state::AppState;
use crate::store::{StoreError, StoredTask};

pub const API_KEY_HEADER: &str = "x-api-key";

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub due_date: String,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub status: Option<Status>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub due_date: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub status: Option<Status>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type RouteError = (StatusCode, Json<ErrorResponse>);

fn route_error(status: StatusCode, error: impl Into<String>) -> RouteError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

fn bad_request(error: impl Into<String>) -> RouteError {
    route_error(StatusCode::BAD_REQUEST, error)
}

fn not_found(id: &str) -> RouteError {
    route_error(StatusCode::NOT_FOUND, format!("Task {} not found", id))
}

fn store_error(error: StoreError) -> RouteError {
    match error {
        StoreError::TaskNotFound(id) => not_found(&id),
        other => route_error(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}

/// Only the known priority and status values are accepted
fn validate(priority: Option<&Priority>, status: Option<&Status>) -> Result<(), RouteError> {
    if let Some(Priority::Other(value)) = priority {
        return Err(bad_request(format!(
            "Invalid priority '{}': expected low, medium or high",
            value
        )));
    }
    if let Some(Status::Other(value)) = status {
        return Err(bad_request(format!(
            "Invalid status '{}': expected pending or completed",
            value
        )));
    }
    Ok(())
}

fn validate_title(title: &str) -> Result<(), RouteError> {
    if title.trim().is_empty() {
        return Err(bad_request("Title cannot be empty"));
    }
    Ok(())
}

// ============================================================================
// Middleware
// ============================================================================

async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, RouteError> {
    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if !state.accepts_key(presented) {
        warn!(path = %request.uri().path(), "Rejected request without a valid API key");
        return Err(route_error(
            StatusCode::UNAUTHORIZED,
            "Invalid or missing API key",
        ));
    }

    Ok(next.run(request).await)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /tasks - List tasks, optionally filtered by priority and status
async fn list_tasks(
    State(state): State<AppState>,
    Query(filter): Query<TaskFilter>,
) -> Json<Vec<StoredTask>> {
    Json(state.task_store().list(&filter).await)
}

/// POST /tasks - Create a new task
async fn create_task(
    State(state): State<AppState>,
    Json(req): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<StoredTask>), RouteError> {
    validate_title(&req.title)?;
    validate(req.priority.as_ref(), req.status.as_ref())?;

    let task = Task::new(req.title)
        .with_description(req.description)
        .with_due_date(req.due_date)
        .with_priority(req.priority.unwrap_or_default())
        .with_status(req.status.unwrap_or_default());

    let created = state.task_store().create(task).await.map_err(store_error)?;
    info!(id = ?created.task.id, "Task created");

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /tasks/{id} - Get a single task
async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoredTask>, RouteError> {
    state
        .task_store()
        .get(&id)
        .await
        .map(Json)
        .ok_or_else(|| not_found(&id))
}

/// PUT /tasks/{id} - Update a task
async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<StoredTask>, RouteError> {
    let mut task = state
        .task_store()
        .get(&id)
        .await
        .ok_or_else(|| not_found(&id))?
        .task;

    validate(req.priority.as_ref(), req.status.as_ref())?;

    if let Some(title) = req.title {
        validate_title(&title)?;
        task.title = title;
    }

    if let Some(description) = req.description {
        task.description = description;
    }

    if let Some(due_date) = req.due_date {
        task.due_date = due_date;
    }

    if let Some(priority) = req.priority {
        task.priority = priority;
    }

    if let Some(status) = req.status {
        task.status = status;
    }

    let updated = state.task_store().update(task).await.map_err(store_error)?;
    Ok(Json(updated))
}

/// DELETE /tasks/{id} - Delete a task
async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, RouteError> {
    let deleted = state.task_store().delete(&id).await.map_err(store_error)?;

    if deleted {
        info!(%id, "Task deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(&id))
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route(
            "/tasks/{id}",
            get(get_task).put(update_task).delete(delete_task),
        )
        .route_layer(middleware::from_fn_with_state(state, require_api_key))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use crate::state::AppState;

    const KEY: &str = "tasksecretkey123";

    async fn build_app() -> (Router, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let state = AppState::new(temp_dir.path().to_path_buf(), KEY)
            .await
            .unwrap();
        let app = super::router(state.clone()).with_state(state);
        (app, temp_dir)
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-api-key", KEY);
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    #[tokio::test]
    async fn rejects_missing_or_wrong_key() {
        let (app, _tmp) = build_app().await;

        let missing = app
            .clone()
            .oneshot(Request::builder().uri("/tasks").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);

        let wrong = app
            .oneshot(
                Request::builder()
                    .uri("/tasks")
                    .header("x-api-key", "guess")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn create_list_update_delete() {
        let (app, _tmp) = build_app().await;

        let (status, created) = send(
            &app,
            "POST",
            "/tasks",
            Some(json!({
                "title": "Buy milk",
                "description": "2%",
                "dueDate": "2025-03-10",
                "priority": "high",
                "status": "pending"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["_id"].as_str().unwrap().to_string();
        assert_eq!(created["dueDate"], "2025-03-10");
        assert!(created["createdAt"].is_string());

        let (status, listed) = send(&app, "GET", "/tasks", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().unwrap().len(), 1);

        let (status, updated) = send(
            &app,
            "PUT",
            &format!("/tasks/{}", id),
            Some(json!({
                "title": "Buy milk",
                "description": "2%",
                "dueDate": "2025-03-10",
                "priority": "high",
                "status": "completed"
            })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["_id"], id.as_str());
        assert_eq!(updated["status"], "completed");

        let (status, _) = send(&app, "DELETE", &format!("/tasks/{}", id), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = send(&app, "DELETE", &format!("/tasks/{}", id), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn list_applies_query_filters() {
        let (app, _tmp) = build_app().await;
        for (title, priority, status) in [
            ("a", "high", "pending"),
            ("b", "low", "pending"),
            ("c", "high", "completed"),
        ] {
            send(
                &app,
                "POST",
                "/tasks",
                Some(json!({ "title": title, "priority": priority, "status": status })),
            )
            .await;
        }

        let (_, high) = send(&app, "GET", "/tasks?priority=high", None).await;
        assert_eq!(high.as_array().unwrap().len(), 2);

        let (_, high_pending) = send(&app, "GET", "/tasks?priority=high&status=pending", None).await;
        let titles: Vec<_> = high_pending
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, vec!["a"]);
    }

    #[tokio::test]
    async fn rejects_invalid_input() {
        let (app, _tmp) = build_app().await;

        let (status, body) = send(&app, "POST", "/tasks", Some(json!({ "title": "  " }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Title cannot be empty");

        let (status, _) = send(
            &app,
            "POST",
            "/tasks",
            Some(json!({ "title": "x", "priority": "urgent" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn update_unknown_task_is_not_found() {
        let (app, _tmp) = build_app().await;

        let (status, _) = send(
            &app,
            "PUT",
            "/tasks/missing",
            Some(json!({ "title": "x" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
