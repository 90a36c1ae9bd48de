/// Task model and database operations
///
/// A task belongs to exactly one user; the owner reference is set at
/// creation and never changes. Status moves freely between the three
/// values, there is no transition graph.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('PENDING', 'IN_PROGRESS', 'COMPLETED');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title TEXT NOT NULL,
///     description TEXT,
///     status task_status NOT NULL DEFAULT 'PENDING',
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Task lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    /// Not started yet (the default on creation)
    Pending,

    /// Being worked on
    InProgress,

    /// Done
    Completed,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Completed => "COMPLETED",
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
            "PENDING" => Ok(TaskStatus::Pending),
            "IN_PROGRESS" => Ok(TaskStatus::InProgress),
            "COMPLETED" => Ok(TaskStatus::Completed),
            other => Err(format!("Unknown task status: {}", other)),
        }
    }
}

/// Task row
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Short title, 3-100 characters at the validation boundary
    pub title: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Current lifecycle status
    pub status: TaskStatus,

    /// Owning user; immutable after creation
    pub user_id: Uuid,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Denormalized owner summary embedded in single-task responses
#[derive(Debug, Clone, Serialize)]
pub struct TaskOwner {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Task joined with its owner summary
#[derive(Debug, Clone, Serialize)]
pub struct TaskWithOwner {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Owner summary, serialized under the `user` key
    #[serde(rename = "user")]
    pub owner: TaskOwner,
}

#[derive(Debug, sqlx::FromRow)]
struct TaskWithOwnerRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    status: TaskStatus,
    user_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    owner_name: String,
    owner_email: String,
}

impl From<TaskWithOwnerRow> for TaskWithOwner {
    fn from(row: TaskWithOwnerRow) -> Self {
        TaskWithOwner {
            id: row.id,
            title: row.title,
            description: row.description,
            status: row.status,
            user_id: row.user_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            owner: TaskOwner {
                id: row.user_id,
                name: row.owner_name,
                email: row.owner_email,
            },
        }
    }
}

/// Input for creating a new task
#[derive(Debug, Clone)]
pub struct CreateTask {
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,

    /// Defaults to `Pending` when the request omits it
    pub status: TaskStatus,
}

/// Partial update input
///
/// Only fields that survive [`UpdateTask::normalize`] are written; empty
/// strings count as "not supplied", so a client cannot clear a field to
/// the empty string through this path.
#[derive(Debug, Clone, Default)]
pub struct UpdateTask {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
}

impl UpdateTask {
    /// Drops empty-string fields, keeping the supplied-truthy-value-wins
    /// merge of the update endpoint
    pub fn normalize(self) -> Self {
        Self {
            title: self.title.filter(|t| !t.is_empty()),
            description: self.description.filter(|d| !d.is_empty()),
            status: self.status,
        }
    }

    /// True when nothing would be written besides `updated_at`
    pub fn is_noop(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.status.is_none()
    }
}

const TASK_WITH_OWNER_SELECT: &str = r#"
    SELECT t.id, t.title, t.description, t.status, t.user_id,
           t.created_at, t.updated_at,
           u.name AS owner_name, u.email AS owner_email
    FROM tasks t
    JOIN users u ON u.id = t.user_id
"#;

impl Task {
    /// Inserts a new task owned by `data.user_id`
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (title, description, status, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, title, description, status, user_id, created_at, updated_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.status)
        .bind(data.user_id)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, user_id, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task together with its owner summary
    pub async fn find_with_owner(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<TaskWithOwner>, sqlx::Error> {
        let query = format!("{} WHERE t.id = $1", TASK_WITH_OWNER_SELECT);

        let row = sqlx::query_as::<_, TaskWithOwnerRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(row.map(TaskWithOwner::from))
    }

    /// Lists tasks owned by `user_id`, newest first, with an optional
    /// exact status filter and LIMIT/OFFSET pagination
    pub async fn list_by_owner(
        pool: &PgPool,
        user_id: Uuid,
        status: Option<TaskStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = match status {
            Some(status) => {
                sqlx::query_as::<_, Task>(
                    r#"
                    SELECT id, title, description, status, user_id, created_at, updated_at
                    FROM tasks
                    WHERE user_id = $1 AND status = $2
                    ORDER BY created_at DESC
                    LIMIT $3 OFFSET $4
                    "#,
                )
                .bind(user_id)
                .bind(status)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Task>(
                    r#"
                    SELECT id, title, description, status, user_id, created_at, updated_at
                    FROM tasks
                    WHERE user_id = $1
                    ORDER BY created_at DESC
                    LIMIT $2 OFFSET $3
                    "#,
                )
                .bind(user_id)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await?
            }
        };

        Ok(tasks)
    }

    /// Counts tasks owned by `user_id`, honoring the same status filter
    /// as [`Task::list_by_owner`]
    pub async fn count_by_owner(
        pool: &PgPool,
        user_id: Uuid,
        status: Option<TaskStatus>,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = match status {
            Some(status) => {
                sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE user_id = $1 AND status = $2")
                    .bind(user_id)
                    .bind(status)
                    .fetch_one(pool)
                    .await?
            }
            None => {
                sqlx::query_as("SELECT COUNT(*) FROM tasks WHERE user_id = $1")
                    .bind(user_id)
                    .fetch_one(pool)
                    .await?
            }
        };

        Ok(count)
    }

    /// Lists every task owned by `user_id`, newest first
    ///
    /// Backs the admin user-detail endpoint, which embeds the full task
    /// list without pagination.
    pub async fn list_by_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, user_id, created_at, updated_at
            FROM tasks
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Applies a partial update and bumps `updated_at`
    ///
    /// The UPDATE statement is built dynamically from the fields present
    /// in `data`; callers are expected to pass it through
    /// [`UpdateTask::normalize`] first. Returns `None` when the task does
    /// not exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE tasks SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.title.is_some() {
            bind_count += 1;
            query.push_str(&format!(", title = ${}", bind_count));
        }
        if data.description.is_some() {
            bind_count += 1;
            query.push_str(&format!(", description = ${}", bind_count));
        }
        if data.status.is_some() {
            bind_count += 1;
            query.push_str(&format!(", status = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, title, description, status, user_id, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, Task>(&query).bind(id);

        if let Some(title) = data.title {
            q = q.bind(title);
        }
        if let Some(description) = data.description {
            q = q.bind(description);
        }
        if let Some(status) = data.status {
            q = q.bind(status);
        }

        let task = q.fetch_optional(pool).await?;

        Ok(task)
    }

    /// Deletes a task by ID, returning true if a row was removed
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for (text, status) in [
            ("PENDING", TaskStatus::Pending),
            ("IN_PROGRESS", TaskStatus::InProgress),
            ("COMPLETED", TaskStatus::Completed),
        ] {
            assert_eq!(text.parse::<TaskStatus>().unwrap(), status);
            assert_eq!(status.as_str(), text);
        }

        assert!("DONE".parse::<TaskStatus>().is_err());
        assert!("pending".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_status_serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&TaskStatus::InProgress).unwrap();
        assert_eq!(json, "\"IN_PROGRESS\"");

        let status: TaskStatus = serde_json::from_str("\"COMPLETED\"").unwrap();
        assert_eq!(status, TaskStatus::Completed);
    }

    #[test]
    fn test_normalize_drops_empty_strings() {
        let update = UpdateTask {
            title: Some(String::new()),
            description: Some(String::new()),
            status: None,
        }
        .normalize();

        assert!(update.title.is_none());
        assert!(update.description.is_none());
        assert!(update.is_noop());
    }

    #[test]
    fn test_normalize_keeps_supplied_values() {
        let update = UpdateTask {
            title: Some("Buy milk".to_string()),
            description: None,
            status: Some(TaskStatus::Completed),
        }
        .normalize();

        assert_eq!(update.title.as_deref(), Some("Buy milk"));
        assert!(update.description.is_none());
        assert_eq!(update.status, Some(TaskStatus::Completed));
        assert!(!update.is_noop());
    }

    #[test]
    fn test_owner_serialized_under_user_key() {
        let owner_id = Uuid::new_v4();
        let task = TaskWithOwner {
            id: Uuid::new_v4(),
            title: "Write report".to_string(),
            description: None,
            status: TaskStatus::Pending,
            user_id: owner_id,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            owner: TaskOwner {
                id: owner_id,
                name: "Jane".to_string(),
                email: "jane@example.com".to_string(),
            },
        };

        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["user"]["email"], "jane@example.com");
        assert_eq!(json["user"]["id"], owner_id.to_string());
        assert!(json.get("owner").is_none());
    }
}
