/// Project service
///
/// Query and mutation operations over projects and their memberships. The
/// HTTP layer depends on the `ProjectService` trait; `PgProjectService` is
/// the PostgreSQL implementation built on `crate::models`.
///
/// # Membership invariants
///
/// - A (project, user) pair has at most one membership. `add_user_to_project`
///   does not pre-check; a duplicate surfaces as `StoreError::UniqueViolation`
///   on `UNIQUE_MEMBERSHIP_CONSTRAINT`.
/// - Adding a membership for a missing project or user surfaces as
///   `StoreError::ForeignKeyViolation`.
/// - `remove_user_from_project` reports how many rows it deleted, so callers
///   can tell "removed" from "was not a member" without a separate lookup.

use crate::{
    db::pool,
    error::{StoreError, StoreResult},
    models::{
        membership::{CreateMembership, Membership},
        project::{CreateProject, Project, ProjectWithUsers, UpdateProject},
    },
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

/// Operations over projects and project memberships
#[async_trait]
pub trait ProjectService: Send + Sync {
    /// All projects in insertion order
    async fn find_all_projects(&self) -> StoreResult<Vec<Project>>;

    /// Projects whose start date falls in `[start_date, end_date]`
    ///
    /// # Errors
    ///
    /// `StoreError::InvalidDate` if either bound is not a date
    async fn find_projects_by_date_range(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> StoreResult<Vec<Project>>;

    async fn find_project_by_id(&self, id: Uuid) -> StoreResult<Option<Project>>;

    /// Persists a new project under a generated id
    async fn create_project(&self, data: CreateProject) -> StoreResult<Project>;

    /// Applies a partial update, returning the number of rows changed
    async fn update_project(&self, id: Uuid, patch: UpdateProject) -> StoreResult<u64>;

    /// Deletes a project, returning the number of rows removed
    async fn delete_project(&self, id: Uuid) -> StoreResult<u64>;

    /// The project with its member users loaded
    async fn find_project_users(&self, id: Uuid) -> StoreResult<Option<ProjectWithUsers>>;

    async fn is_user_in_project(&self, project_id: Uuid, user_id: Uuid) -> StoreResult<bool>;

    /// Creates a membership; duplicates are rejected by the store
    async fn add_user_to_project(&self, data: CreateMembership) -> StoreResult<Membership>;

    /// Deletes a membership, returning the number of rows removed
    async fn remove_user_from_project(&self, project_id: Uuid, user_id: Uuid) -> StoreResult<u64>;

    /// Verifies the backing store is reachable
    async fn ping(&self) -> StoreResult<()>;
}

/// Parses both bounds of a date filter
///
/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (its calendar date is used).
pub fn parse_date_range(start_date: &str, end_date: &str) -> StoreResult<(NaiveDate, NaiveDate)> {
    Ok((parse_date(start_date)?, parse_date(end_date)?))
}

fn parse_date(value: &str) -> StoreResult<NaiveDate> {
    let trimmed = value.trim();

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(trimmed).map(|dt| dt.date_naive()))
        .map_err(|_| StoreError::InvalidDate {
            value: value.to_string(),
        })
}

/// PostgreSQL-backed project service
#[derive(Clone)]
pub struct PgProjectService {
    pool: PgPool,
}

impl PgProjectService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectService for PgProjectService {
    async fn find_all_projects(&self) -> StoreResult<Vec<Project>> {
        Ok(Project::list_all(&self.pool).await?)
    }

    async fn find_projects_by_date_range(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> StoreResult<Vec<Project>> {
        let (start, end) = parse_date_range(start_date, end_date)?;
        debug!(%start, %end, "Filtering projects by start date");

        Ok(Project::list_by_start_date(&self.pool, start, end).await?)
    }

    async fn find_project_by_id(&self, id: Uuid) -> StoreResult<Option<Project>> {
        Ok(Project::find_by_id(&self.pool, id).await?)
    }

    async fn create_project(&self, data: CreateProject) -> StoreResult<Project> {
        Ok(Project::create(&self.pool, data).await?)
    }

    async fn update_project(&self, id: Uuid, patch: UpdateProject) -> StoreResult<u64> {
        Ok(Project::update(&self.pool, id, patch).await?)
    }

    async fn delete_project(&self, id: Uuid) -> StoreResult<u64> {
        Ok(Project::delete(&self.pool, id).await?)
    }

    async fn find_project_users(&self, id: Uuid) -> StoreResult<Option<ProjectWithUsers>> {
        Ok(Project::find_with_users(&self.pool, id).await?)
    }

    async fn is_user_in_project(&self, project_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        Ok(Membership::exists(&self.pool, project_id, user_id).await?)
    }

    async fn add_user_to_project(&self, data: CreateMembership) -> StoreResult<Membership> {
        Ok(Membership::create(&self.pool, data).await?)
    }

    async fn remove_user_from_project(&self, project_id: Uuid, user_id: Uuid) -> StoreResult<u64> {
        Ok(Membership::delete(&self.pool, project_id, user_id).await?)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(pool::health_check(&self.pool).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_range_plain_dates() {
        let (start, end) = parse_date_range("2025-01-01", "2025-12-31").unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    }

    #[test]
    fn test_parse_date_range_accepts_timestamps() {
        let (start, _) = parse_date_range("2025-06-15T08:30:00Z", "2025-07-01").unwrap();
        assert_eq!(start, NaiveDate::from_ymd_opt(2025, 6, 15).unwrap());
    }

    #[test]
    fn test_parse_date_range_rejects_garbage() {
        let err = parse_date_range("2025-01-01", "next tuesday").unwrap_err();
        match err {
            StoreError::InvalidDate { value } => assert_eq!(value, "next tuesday"),
            other => panic!("unexpected error: {other}"),
        }

        assert!(parse_date_range("2025-02-30", "2025-03-01").is_err());
    }
}
