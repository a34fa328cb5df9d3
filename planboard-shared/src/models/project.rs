/// Project model and database operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE projects (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     name VARCHAR(255) NOT NULL,
///     description TEXT,
///     start_date DATE,
///     end_date DATE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT projects_dates_check CHECK (
///         start_date IS NULL OR end_date IS NULL OR end_date >= start_date
///     )
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use planboard_shared::models::project::{CreateProject, Project, UpdateProject};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let project = Project::create(&pool, CreateProject {
///     name: "Alpha".to_string(),
///     description: None,
///     start_date: None,
///     end_date: None,
/// }).await?;
///
/// let patch = UpdateProject {
///     name: Some("Alpha v2".to_string()),
///     ..Default::default()
/// };
/// assert_eq!(Project::update(&pool, project.id, patch).await?, 1);
/// # Ok(())
/// # }
/// ```

use super::user::User;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Check constraint keeping `end_date` on or after `start_date`
pub const DATES_CHECK_CONSTRAINT: &str = "projects_dates_check";

/// A project that owns tasks and has member users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    /// Unique project ID (UUID v4)
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Optional free-form description
    pub description: Option<String>,

    /// Planned start; the date-range filter matches on this column
    pub start_date: Option<NaiveDate>,

    /// Planned end
    pub end_date: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a project
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProject {
    pub name: String,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Partial update; `None` fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProject {
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// A project together with its member users
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectWithUsers {
    #[serde(flatten)]
    pub project: Project,

    /// Members in the order they were added
    pub users: Vec<User>,
}

impl Project {
    /// Inserts a new project with a freshly generated v4 id
    pub async fn create(pool: &PgPool, data: CreateProject) -> Result<Self, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects (id, name, description, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, description, start_date, end_date, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.name)
        .bind(data.description)
        .bind(data.start_date)
        .bind(data.end_date)
        .fetch_one(pool)
        .await?;

        Ok(project)
    }

    /// Finds a project by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let project = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, start_date, end_date, created_at, updated_at
            FROM projects
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(project)
    }

    /// Lists every project in insertion order
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, start_date, end_date, created_at, updated_at
            FROM projects
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Lists projects whose start date lies in `[start, end]` (inclusive)
    ///
    /// Projects without a start date never match.
    pub async fn list_by_start_date(
        pool: &PgPool,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let projects = sqlx::query_as::<_, Project>(
            r#"
            SELECT id, name, description, start_date, end_date, created_at, updated_at
            FROM projects
            WHERE start_date BETWEEN $1 AND $2
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(pool)
        .await?;

        Ok(projects)
    }

    /// Applies a partial update
    ///
    /// # Returns
    ///
    /// Number of rows updated: 0 when no project has this id, otherwise 1
    pub async fn update(pool: &PgPool, id: Uuid, data: UpdateProject) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE projects
            SET name = COALESCE($2, name),
                description = COALESCE($3, description),
                start_date = COALESCE($4, start_date),
                end_date = COALESCE($5, end_date),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(data.name)
        .bind(data.description)
        .bind(data.start_date)
        .bind(data.end_date)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Deletes a project; memberships cascade, tasks are detached
    ///
    /// # Returns
    ///
    /// Number of rows deleted
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Loads a project and its member users
    pub async fn find_with_users(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<ProjectWithUsers>, sqlx::Error> {
        let Some(project) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };

        let users = User::list_by_project(pool, project.id).await?;

        Ok(Some(ProjectWithUsers { project, users }))
    }
}
