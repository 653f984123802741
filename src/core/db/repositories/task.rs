//! Task repository for database operations
//!
//! Provides CRUD for Kanban tasks. Every task belongs to exactly one owner,
//! set at creation and never reassigned. Lookups used by the ownership
//! guard are deliberately un-scoped so callers can distinguish a missing
//! task from someone else's task.

use sqlx::PgPool;
use uuid::Uuid;

use crate::core::db::models::{CreateTask, Task, TaskStatus, UpdateTask};

/// Task repository error types
#[derive(Debug, thiserror::Error)]
pub enum TaskRepositoryError {
    #[error("Task not found")]
    NotFound,

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Task repository for database operations
#[derive(Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    /// Create a new task repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new task
    pub async fn create(&self, dto: &CreateTask) -> Result<Task, TaskRepositoryError> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (owner_id, title, description, assignee, priority, status)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, owner_id, title, description, assignee, priority, status,
                      created_at, updated_at
            "#,
        )
        .bind(dto.owner_id)
        .bind(&dto.title)
        .bind(&dto.description)
        .bind(&dto.assignee)
        .bind(dto.priority)
        .bind(dto.status)
        .fetch_one(&self.pool)
        .await?;

        Ok(task)
    }

    /// Find a task by ID, regardless of owner
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<Task>, TaskRepositoryError> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, owner_id, title, description, assignee, priority, status,
                   created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(task)
    }

    /// List an owner's tasks, newest first, optionally filtered by status
    pub async fn list_by_owner(
        &self,
        owner_id: Uuid,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Task>, TaskRepositoryError> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, owner_id, title, description, assignee, priority, status,
                   created_at, updated_at
            FROM tasks
            WHERE owner_id = $1
              AND ($2::task_status IS NULL OR status = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(owner_id)
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(tasks)
    }

    /// Apply a partial update to a task. Absent fields keep their value;
    /// an explicit null clears the nullable ones.
    pub async fn update(
        &self,
        id: Uuid,
        updates: &UpdateTask,
    ) -> Result<Task, TaskRepositoryError> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET
                title = COALESCE($2, title),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                assignee = CASE WHEN $5 THEN $6 ELSE assignee END,
                priority = COALESCE($7, priority),
                status = COALESCE($8, status),
                updated_at = now()
            WHERE id = $1
            RETURNING id, owner_id, title, description, assignee, priority, status,
                      created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&updates.title)
        .bind(updates.description.is_some())
        .bind(updates.description.clone().flatten())
        .bind(updates.assignee.is_some())
        .bind(updates.assignee.clone().flatten())
        .bind(updates.priority)
        .bind(updates.status)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(TaskRepositoryError::NotFound)?;

        Ok(task)
    }

    /// Delete a task by ID
    pub async fn delete(&self, id: Uuid) -> Result<bool, TaskRepositoryError> {
        let result = sqlx::query(
            r#"
            DELETE FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
