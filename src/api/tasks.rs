//! Task CRUD handlers, nested under a project.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use super::{AppState, message_response, store_error};
use crate::store::{Task, TaskStatus};

/// `POST /projects/{projectId}/tasks` body.
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    /// Task title (required).
    pub title: Option<String>,
    /// Task description (required).
    pub description: Option<String>,
    /// Initial status (defaults to `todo`).
    pub status: Option<TaskStatus>,
}

/// `PUT .../tasks/{taskId}` body; absent fields keep their current value.
#[derive(Debug, Deserialize)]
pub struct UpdateTaskRequest {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New status.
    pub status: Option<TaskStatus>,
}

/// `POST /projects/{projectId}/tasks` — create a task under a project.
///
/// Inserts the task, then pushes its id onto the parent's reference list.
/// Two separate store operations; a crash in between leaves a task the
/// parent does not reference.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<String>,
    Json(body): Json<CreateTaskRequest>,
) -> Response {
    let (Some(title), Some(description)) = (body.title, body.description) else {
        return message_response(StatusCode::BAD_REQUEST, "Title and description are required");
    };

    match state.store.get_project(&project_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return message_response(StatusCode::NOT_FOUND, "Project not found"),
        Err(e) => return store_error("Failed to save task", &e),
    }

    let task = Task::new(
        title,
        description,
        body.status.unwrap_or_default(),
        project_id.clone(),
    );

    let result = async {
        state.store.insert_task(&task).await?;
        state.store.push_task_ref(&project_id, &task.id).await
    }
    .await;

    match result {
        Ok(()) => (StatusCode::CREATED, Json(task)).into_response(),
        Err(e) => store_error("Failed to save task", &e),
    }
}

/// `GET /projects/{projectId}/tasks` — all tasks for a project.
pub async fn list(
    State(state): State<Arc<AppState>>,
    Path(project_id): Path<String>,
) -> Response {
    match state.store.tasks_for_project(&project_id).await {
        Ok(tasks) => Json(tasks).into_response(),
        Err(e) => store_error("Failed to fetch tasks", &e),
    }
}

/// `PUT /projects/{projectId}/tasks/{taskId}` — partial update.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path((project_id, task_id)): Path<(String, String)>,
    Json(body): Json<UpdateTaskRequest>,
) -> Response {
    let mut task = match state.store.get_task(&task_id, &project_id).await {
        Ok(Some(task)) => task,
        Ok(None) => return message_response(StatusCode::NOT_FOUND, "Task not found"),
        Err(e) => return store_error("Failed to update task", &e),
    };

    if let Some(title) = body.title {
        task.title = title;
    }
    if let Some(description) = body.description {
        task.description = description;
    }
    if let Some(status) = body.status {
        task.status = status;
    }

    match state.store.update_task(&task).await {
        Ok(()) => Json(task).into_response(),
        Err(e) => store_error("Failed to update task", &e),
    }
}

/// `DELETE /projects/{projectId}/tasks/{taskId}` — delete a task, then pull
/// its id from the parent's reference list.
///
/// Two separate store operations; a crash in between leaves a dangling
/// reference on the parent, which reads skip.
pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path((project_id, task_id)): Path<(String, String)>,
) -> Response {
    let task = match state.store.delete_task(&task_id, &project_id).await {
        Ok(Some(task)) => task,
        Ok(None) => return message_response(StatusCode::NOT_FOUND, "Task not found"),
        Err(e) => return store_error("Failed to delete task", &e),
    };

    if let Err(e) = state.store.pull_task_ref(&project_id, &task_id).await {
        return store_error("Failed to delete task", &e);
    }

    Json(task).into_response()
}
