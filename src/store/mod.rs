//! Document store — SQLite-backed project and task collections.
//!
//! Documents keep their document-database shape: a project carries a JSON
//! array of task ids, a task carries a `project_id` back-reference. The
//! cross-collection mutations (create task / delete task / delete project)
//! are deliberately two-step and non-transactional; a crash between steps
//! leaves a dangling reference, which reads tolerate by skipping it.

pub mod model;
mod projects;
mod tasks;

use std::str::FromStr;

use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
};
use tracing::info;

pub use model::{Project, ProjectWithTasks, Task, TaskStatus};

use crate::Result;

/// Handle to the document store. Cheap to clone; all clones share one pool.
#[derive(Clone)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Connect to the store at `url` and ensure the collections exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection string is invalid, the database
    /// cannot be opened, or the schema cannot be created.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.migrate().await?;

        info!(url = %url, "Connected to document store");
        Ok(store)
    }

    /// Create the collections if they do not exist yet.
    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS projects (
                id          TEXT PRIMARY KEY,
                name        TEXT NOT NULL,
                description TEXT NOT NULL,
                tasks       TEXT NOT NULL DEFAULT '[]'
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS tasks (
                id          TEXT PRIMARY KEY,
                title       TEXT NOT NULL,
                description TEXT NOT NULL,
                status      TEXT NOT NULL,
                project_id  TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_tasks_project ON tasks (project_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
pub(crate) async fn memory_store() -> Store {
    // A single connection keeps every query on the same in-memory database.
    Store::connect("sqlite::memory:", 1)
        .await
        .expect("in-memory store")
}
