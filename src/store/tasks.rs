//! Task collection operations.

use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use super::{Store, Task};
use crate::{Error, Result};

impl Store {
    /// Insert a new task document.
    pub async fn insert_task(&self, task: &Task) -> Result<()> {
        sqlx::query(
            "INSERT INTO tasks (id, title, description, status, project_id) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.status.as_str())
        .bind(&task.project_id)
        .execute(self.pool())
        .await?;

        Ok(())
    }

    /// All tasks belonging to a project, in insertion order.
    pub async fn tasks_for_project(&self, project_id: &str) -> Result<Vec<Task>> {
        let rows = sqlx::query(
            "SELECT id, title, description, status, project_id
             FROM tasks WHERE project_id = ? ORDER BY rowid",
        )
        .bind(project_id)
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(task_from_row).collect()
    }

    /// Fetch a task scoped to its project; both ids must match.
    pub async fn get_task(&self, task_id: &str, project_id: &str) -> Result<Option<Task>> {
        let row = sqlx::query(
            "SELECT id, title, description, status, project_id
             FROM tasks WHERE id = ? AND project_id = ?",
        )
        .bind(task_id)
        .bind(project_id)
        .fetch_optional(self.pool())
        .await?;

        row.as_ref().map(task_from_row).transpose()
    }

    /// Save a modified task document (all fields).
    pub async fn update_task(&self, task: &Task) -> Result<()> {
        sqlx::query("UPDATE tasks SET title = ?, description = ?, status = ? WHERE id = ?")
            .bind(&task.title)
            .bind(&task.description)
            .bind(task.status.as_str())
            .bind(&task.id)
            .execute(self.pool())
            .await?;

        Ok(())
    }

    /// Delete a task scoped to its project, returning the deleted document
    /// if it existed.
    ///
    /// Pulling the reference from the parent project is the caller's second,
    /// separate step.
    pub async fn delete_task(&self, task_id: &str, project_id: &str) -> Result<Option<Task>> {
        let Some(task) = self.get_task(task_id, project_id).await? else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM tasks WHERE id = ?")
            .bind(task_id)
            .execute(self.pool())
            .await?;

        Ok(Some(task))
    }

    /// Delete every task belonging to a project. Returns the number removed.
    pub async fn delete_tasks_for_project(&self, project_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM tasks WHERE project_id = ?")
            .bind(project_id)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected())
    }
}

fn task_from_row(row: &SqliteRow) -> Result<Task> {
    let status: String = row.try_get("status")?;

    Ok(Task {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        status: status.parse().map_err(Error::Internal)?,
        project_id: row.try_get("project_id")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Project, TaskStatus, memory_store};

    async fn seeded_project(store: &Store) -> Project {
        let project = Project::new("p".to_string(), "d".to_string());
        store.insert_project(&project).await.unwrap();
        project
    }

    fn make_task(project_id: &str, title: &str, status: TaskStatus) -> Task {
        Task::new(
            title.to_string(),
            "desc".to_string(),
            status,
            project_id.to_string(),
        )
    }

    #[tokio::test]
    async fn insert_and_list_tasks() {
        let store = memory_store().await;
        let project = seeded_project(&store).await;

        store
            .insert_task(&make_task(&project.id, "first", TaskStatus::Todo))
            .await
            .unwrap();
        store
            .insert_task(&make_task(&project.id, "second", TaskStatus::InProgress))
            .await
            .unwrap();

        let tasks = store.tasks_for_project(&project.id).await.unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].title, "first");
        assert_eq!(tasks[1].status, TaskStatus::InProgress);
    }

    #[tokio::test]
    async fn get_task_requires_matching_project() {
        let store = memory_store().await;
        let project = seeded_project(&store).await;
        let task = make_task(&project.id, "t", TaskStatus::Todo);
        store.insert_task(&task).await.unwrap();

        assert!(store.get_task(&task.id, &project.id).await.unwrap().is_some());
        assert!(store.get_task(&task.id, "other").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_task_persists_changes() {
        let store = memory_store().await;
        let project = seeded_project(&store).await;
        let mut task = make_task(&project.id, "t", TaskStatus::Todo);
        store.insert_task(&task).await.unwrap();

        task.status = TaskStatus::Done;
        task.title = "renamed".to_string();
        store.update_task(&task).await.unwrap();

        let found = store.get_task(&task.id, &project.id).await.unwrap().unwrap();
        assert_eq!(found.status, TaskStatus::Done);
        assert_eq!(found.title, "renamed");
    }

    #[tokio::test]
    async fn delete_task_returns_the_document() {
        let store = memory_store().await;
        let project = seeded_project(&store).await;
        let task = make_task(&project.id, "t", TaskStatus::Todo);
        store.insert_task(&task).await.unwrap();

        let deleted = store.delete_task(&task.id, &project.id).await.unwrap();
        assert_eq!(deleted.unwrap().id, task.id);
        assert!(store.get_task(&task.id, &project.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_tasks_for_project_removes_all() {
        let store = memory_store().await;
        let project = seeded_project(&store).await;
        for i in 0..3 {
            store
                .insert_task(&make_task(&project.id, &format!("t{i}"), TaskStatus::Todo))
                .await
                .unwrap();
        }

        let removed = store.delete_tasks_for_project(&project.id).await.unwrap();
        assert_eq!(removed, 3);
        assert!(store.tasks_for_project(&project.id).await.unwrap().is_empty());
    }
}
