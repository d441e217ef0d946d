//! Project CRUD handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use super::{AppState, message_response, store_error};
use crate::store::{Project, ProjectWithTasks};

/// Pagination query parameters for `GET /projects`.
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// 1-based page number (default 1).
    pub page: Option<u32>,
    /// Items per page (default 10).
    pub limit: Option<u32>,
}

/// Pagination envelope returned alongside a project page.
#[derive(Debug, Serialize)]
pub struct Pagination {
    /// Total number of projects.
    pub total: u64,
    /// Current page.
    pub page: u32,
    /// Page size.
    pub limit: u32,
    /// Total number of pages.
    pub pages: u64,
}

/// `GET /projects` response body.
#[derive(Debug, Serialize)]
pub struct ProjectPage {
    /// One page of projects, tasks populated.
    pub projects: Vec<ProjectWithTasks>,
    /// Pagination metadata.
    pub pagination: Pagination,
}

/// `POST /projects` body.
#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    /// Project name (required).
    pub name: Option<String>,
    /// Project description (required).
    pub description: Option<String>,
}

/// `PUT /projects/{id}` body; absent fields keep their current value.
#[derive(Debug, Deserialize)]
pub struct UpdateProjectRequest {
    /// New name.
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
}

/// `GET /projects` — one page of projects with their tasks populated.
pub async fn list(State(state): State<Arc<AppState>>, Query(query): Query<ListQuery>) -> Response {
    let page = query.page.filter(|p| *p > 0).unwrap_or(1);
    let limit = query.limit.filter(|l| *l > 0).unwrap_or(10);

    let result = async {
        let projects = state.store.list_projects(page, limit).await?;
        let projects = state.store.populate_tasks(projects).await?;
        let total = state.store.count_projects().await?;
        Ok::<_, crate::Error>((projects, total))
    }
    .await;

    match result {
        Ok((projects, total)) => Json(ProjectPage {
            projects,
            pagination: Pagination {
                total,
                page,
                limit,
                pages: total.div_ceil(u64::from(limit)),
            },
        })
        .into_response(),
        Err(e) => store_error("Failed to fetch projects", &e),
    }
}

/// `POST /projects` — create a project.
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(body): Json<CreateProjectRequest>,
) -> Response {
    let (Some(name), Some(description)) = (body.name, body.description) else {
        return message_response(StatusCode::BAD_REQUEST, "Name and description are required");
    };

    let project = Project::new(name, description);
    match state.store.insert_project(&project).await {
        Ok(()) => (StatusCode::CREATED, Json(project)).into_response(),
        Err(e) => store_error("Failed to save project", &e),
    }
}

/// `PUT /projects/{id}` — partial update of name/description.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<UpdateProjectRequest>,
) -> Response {
    let mut project = match state.store.get_project(&id).await {
        Ok(Some(project)) => project,
        Ok(None) => return message_response(StatusCode::NOT_FOUND, "Project not found"),
        Err(e) => return store_error("Failed to update project", &e),
    };

    if let Some(name) = body.name {
        project.name = name;
    }
    if let Some(description) = body.description {
        project.description = description;
    }

    match state.store.update_project(&project).await {
        Ok(()) => Json(project).into_response(),
        Err(e) => store_error("Failed to update project", &e),
    }
}

/// `DELETE /projects/{id}` — delete a project, then its tasks.
///
/// Two separate store operations; a crash in between leaves orphaned task
/// documents behind, never a half-deleted project.
pub async fn remove(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    let project = match state.store.delete_project(&id).await {
        Ok(Some(project)) => project,
        Ok(None) => return message_response(StatusCode::NOT_FOUND, "Project not found"),
        Err(e) => return store_error("Failed to delete project", &e),
    };

    if let Err(e) = state.store.delete_tasks_for_project(&id).await {
        return store_error("Failed to delete project", &e);
    }

    Json(project).into_response()
}
