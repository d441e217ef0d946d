//! Project collection operations.

use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use super::{Project, ProjectWithTasks, Store};
use crate::Result;

impl Store {
    /// Insert a new project document.
    pub async fn insert_project(&self, project: &Project) -> Result<()> {
        sqlx::query("INSERT INTO projects (id, name, description, tasks) VALUES (?, ?, ?, ?)")
            .bind(&project.id)
            .bind(&project.name)
            .bind(&project.description)
            .bind(serde_json::to_string(&project.tasks)?)
            .execute(self.pool())
            .await?;

        Ok(())
    }

    /// Total number of project documents.
    pub async fn count_projects(&self) -> Result<u64> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM projects")
            .fetch_one(self.pool())
            .await?;

        let n: i64 = row.try_get("n")?;
        Ok(n.unsigned_abs())
    }

    /// One page of projects in insertion order. `page` is 1-based.
    pub async fn list_projects(&self, page: u32, limit: u32) -> Result<Vec<Project>> {
        let offset = i64::from(page.saturating_sub(1)) * i64::from(limit);

        let rows = sqlx::query(
            "SELECT id, name, description, tasks FROM projects ORDER BY rowid LIMIT ? OFFSET ?",
        )
        .bind(i64::from(limit))
        .bind(offset)
        .fetch_all(self.pool())
        .await?;

        rows.iter().map(project_from_row).collect()
    }

    /// Fetch a project by id.
    pub async fn get_project(&self, id: &str) -> Result<Option<Project>> {
        let row = sqlx::query("SELECT id, name, description, tasks FROM projects WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;

        row.as_ref().map(project_from_row).transpose()
    }

    /// Save a modified project document (all fields).
    pub async fn update_project(&self, project: &Project) -> Result<()> {
        sqlx::query("UPDATE projects SET name = ?, description = ?, tasks = ? WHERE id = ?")
            .bind(&project.name)
            .bind(&project.description)
            .bind(serde_json::to_string(&project.tasks)?)
            .bind(&project.id)
            .execute(self.pool())
            .await?;

        Ok(())
    }

    /// Delete a project by id, returning the deleted document if it existed.
    ///
    /// Deleting the project's tasks is the caller's second, separate step.
    pub async fn delete_project(&self, id: &str) -> Result<Option<Project>> {
        let Some(project) = self.get_project(id).await? else {
            return Ok(None);
        };

        sqlx::query("DELETE FROM projects WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;

        Ok(Some(project))
    }

    /// Append a task id to a project's reference list.
    pub async fn push_task_ref(&self, project_id: &str, task_id: &str) -> Result<()> {
        if let Some(mut project) = self.get_project(project_id).await? {
            project.tasks.push(task_id.to_string());
            self.update_project(&project).await?;
        }
        Ok(())
    }

    /// Remove a task id from a project's reference list. No-op if the
    /// project or the reference is gone.
    pub async fn pull_task_ref(&self, project_id: &str, task_id: &str) -> Result<()> {
        if let Some(mut project) = self.get_project(project_id).await? {
            project.tasks.retain(|t| t != task_id);
            self.update_project(&project).await?;
        }
        Ok(())
    }

    /// Resolve each project's task references to full task documents,
    /// preserving reference-list order and skipping dangling ids.
    pub async fn populate_tasks(&self, projects: Vec<Project>) -> Result<Vec<ProjectWithTasks>> {
        let mut populated = Vec::with_capacity(projects.len());

        for project in projects {
            let tasks = self.tasks_for_project(&project.id).await?;
            let resolved = project
                .tasks
                .iter()
                .filter_map(|id| tasks.iter().find(|t| &t.id == id).cloned())
                .collect();

            populated.push(ProjectWithTasks {
                id: project.id,
                name: project.name,
                description: project.description,
                tasks: resolved,
            });
        }

        Ok(populated)
    }
}

fn project_from_row(row: &SqliteRow) -> Result<Project> {
    let tasks_json: String = row.try_get("tasks")?;

    Ok(Project {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        tasks: serde_json::from_str(&tasks_json)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory_store;

    #[tokio::test]
    async fn insert_and_get_project() {
        let store = memory_store().await;
        let project = Project::new("Website".to_string(), "Relaunch".to_string());

        store.insert_project(&project).await.unwrap();
        let found = store.get_project(&project.id).await.unwrap().unwrap();

        assert_eq!(found.name, "Website");
        assert_eq!(found.description, "Relaunch");
        assert!(found.tasks.is_empty());
    }

    #[tokio::test]
    async fn get_unknown_project_returns_none() {
        let store = memory_store().await;
        assert!(store.get_project("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_projects_paginates_in_insertion_order() {
        let store = memory_store().await;
        for i in 0..5 {
            let project = Project::new(format!("p{i}"), "d".to_string());
            store.insert_project(&project).await.unwrap();
        }

        let page1 = store.list_projects(1, 2).await.unwrap();
        let page3 = store.list_projects(3, 2).await.unwrap();

        assert_eq!(page1.len(), 2);
        assert_eq!(page1[0].name, "p0");
        assert_eq!(page3.len(), 1);
        assert_eq!(page3[0].name, "p4");
        assert_eq!(store.count_projects().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn update_project_persists_changes() {
        let store = memory_store().await;
        let mut project = Project::new("old".to_string(), "old".to_string());
        store.insert_project(&project).await.unwrap();

        project.name = "new".to_string();
        project.tasks.push("t1".to_string());
        store.update_project(&project).await.unwrap();

        let found = store.get_project(&project.id).await.unwrap().unwrap();
        assert_eq!(found.name, "new");
        assert_eq!(found.tasks, vec!["t1".to_string()]);
    }

    #[tokio::test]
    async fn delete_project_returns_the_document() {
        let store = memory_store().await;
        let project = Project::new("gone".to_string(), "d".to_string());
        store.insert_project(&project).await.unwrap();

        let deleted = store.delete_project(&project.id).await.unwrap().unwrap();
        assert_eq!(deleted.id, project.id);
        assert!(store.get_project(&project.id).await.unwrap().is_none());
        assert!(store.delete_project(&project.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn push_and_pull_task_refs() {
        let store = memory_store().await;
        let project = Project::new("p".to_string(), "d".to_string());
        store.insert_project(&project).await.unwrap();

        store.push_task_ref(&project.id, "t1").await.unwrap();
        store.push_task_ref(&project.id, "t2").await.unwrap();
        let found = store.get_project(&project.id).await.unwrap().unwrap();
        assert_eq!(found.tasks, vec!["t1".to_string(), "t2".to_string()]);

        store.pull_task_ref(&project.id, "t1").await.unwrap();
        let found = store.get_project(&project.id).await.unwrap().unwrap();
        assert_eq!(found.tasks, vec!["t2".to_string()]);
    }

    #[tokio::test]
    async fn populate_skips_dangling_refs() {
        let store = memory_store().await;
        let mut project = Project::new("p".to_string(), "d".to_string());
        store.insert_project(&project).await.unwrap();

        let task = crate::store::Task::new(
            "t".to_string(),
            "d".to_string(),
            crate::store::TaskStatus::Todo,
            project.id.clone(),
        );
        store.insert_task(&task).await.unwrap();

        // One live reference, one dangling.
        project.tasks = vec![task.id.clone(), "dangling".to_string()];
        store.update_project(&project).await.unwrap();

        let populated = store.populate_tasks(vec![project]).await.unwrap();
        assert_eq!(populated[0].tasks.len(), 1);
        assert_eq!(populated[0].tasks[0].id, task.id);
    }
}
