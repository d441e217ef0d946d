//! Document types for the project and task collections.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A project document. `tasks` holds the ids of the tasks created under it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    /// Document id.
    pub id: String,
    /// Project name.
    pub name: String,
    /// Project description.
    pub description: String,
    /// Ids of tasks belonging to this project.
    pub tasks: Vec<String>,
}

impl Project {
    /// Create a new project document with a fresh id and no tasks.
    #[must_use]
    pub fn new(name: String, description: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            description,
            tasks: Vec::new(),
        }
    }
}

/// A project with its task references resolved to full task documents.
///
/// Dangling references (a task id with no surviving task) are skipped, the
/// way a document database resolves a stale reference list.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectWithTasks {
    /// Document id.
    pub id: String,
    /// Project name.
    pub name: String,
    /// Project description.
    pub description: String,
    /// The project's tasks, in reference-list order.
    pub tasks: Vec<Task>,
}

/// A task document, nested under a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Document id.
    pub id: String,
    /// Task title.
    pub title: String,
    /// Task description.
    pub description: String,
    /// Workflow status.
    pub status: TaskStatus,
    /// Owning project id.
    #[serde(rename = "projectId")]
    pub project_id: String,
}

impl Task {
    /// Create a new task document with a fresh id.
    #[must_use]
    pub fn new(
        title: String,
        description: String,
        status: TaskStatus,
        project_id: String,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            description,
            status,
            project_id,
        }
    }
}

/// Task workflow status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Not started.
    #[default]
    Todo,
    /// Being worked on.
    InProgress,
    /// Finished.
    Done,
}

impl TaskStatus {
    /// Stable string form, matching the JSON representation.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(Self::Todo),
            "in-progress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            other => Err(format!("unknown task status: {other}")),
        }
    }
}
