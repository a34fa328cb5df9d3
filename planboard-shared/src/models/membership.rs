/// Membership model: the project-user join table
///
/// A membership row means "this user is part of this project". Rows are only
/// created by adding a user to a project and only removed by removing them
/// (or by the cascade when the project or user is deleted).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE project_users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     project_id UUID NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT project_users_project_id_user_id_key UNIQUE (project_id, user_id)
/// );
/// ```
///
/// The unique pair constraint is authoritative for duplicates: inserting an
/// existing pair fails with a unique violation instead of being checked
/// beforehand, so concurrent adds cannot both succeed.
///
/// # Example
///
/// ```no_run
/// use planboard_shared::models::membership::{CreateMembership, Membership};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, project_id: Uuid, user_id: Uuid) -> Result<(), sqlx::Error> {
/// Membership::create(&pool, CreateMembership { project_id, user_id }).await?;
/// assert!(Membership::exists(&pool, project_id, user_id).await?);
///
/// let removed = Membership::delete(&pool, project_id, user_id).await?;
/// assert_eq!(removed, 1);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Unique constraint on `(project_id, user_id)`
pub const UNIQUE_MEMBERSHIP_CONSTRAINT: &str = "project_users_project_id_user_id_key";

/// Foreign key from `project_users.project_id` to `projects.id`
pub const PROJECT_FOREIGN_KEY: &str = "project_users_project_id_fkey";

/// Foreign key from `project_users.user_id` to `users.id`
pub const USER_FOREIGN_KEY: &str = "project_users_user_id_fkey";

/// A user's membership in a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Membership {
    /// Membership ID (UUID v4)
    pub id: Uuid,

    pub project_id: Uuid,

    pub user_id: Uuid,

    /// When the user was added
    pub created_at: DateTime<Utc>,
}

/// Input for adding a user to a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMembership {
    pub project_id: Uuid,
    pub user_id: Uuid,
}

impl Membership {
    /// Adds a user to a project
    ///
    /// # Errors
    ///
    /// - unique violation on `UNIQUE_MEMBERSHIP_CONSTRAINT` if the pair exists
    /// - foreign key violation if the project or user does not exist
    pub async fn create(pool: &PgPool, data: CreateMembership) -> Result<Self, sqlx::Error> {
        let membership = sqlx::query_as::<_, Membership>(
            r#"
            INSERT INTO project_users (id, project_id, user_id)
            VALUES ($1, $2, $3)
            RETURNING id, project_id, user_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.project_id)
        .bind(data.user_id)
        .fetch_one(pool)
        .await?;

        Ok(membership)
    }

    /// Checks whether the user is a member of the project
    pub async fn exists(pool: &PgPool, project_id: Uuid, user_id: Uuid) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM project_users
                WHERE project_id = $1 AND user_id = $2
            )
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Removes the user from the project
    ///
    /// # Returns
    ///
    /// Number of memberships deleted (0 if the user was not a member)
    pub async fn delete(pool: &PgPool, project_id: Uuid, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM project_users WHERE project_id = $1 AND user_id = $2")
            .bind(project_id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}
