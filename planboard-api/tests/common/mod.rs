//! Common test utilities for router tests
//!
//! `MemoryStore` implements the service traits over plain vectors, enforcing
//! the same constraints as the database schema: a (project, user) pair is
//! unique, memberships need an existing project and user, a project's end
//! date is not before its start date, and deleting a project drops its
//! memberships. Every service call is counted so tests can
//! assert that rejected requests never reached the store.

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{NaiveDate, Utc};
use planboard_api::app::{build_router, AppState};
use planboard_api::config::{ApiConfig, Config, DatabaseConfig};
use planboard_shared::error::{StoreError, StoreResult};
use planboard_shared::models::membership::{
    CreateMembership, Membership, PROJECT_FOREIGN_KEY, UNIQUE_MEMBERSHIP_CONSTRAINT,
    USER_FOREIGN_KEY,
};
use planboard_shared::models::project::{
    CreateProject, Project, ProjectWithUsers, UpdateProject, DATES_CHECK_CONSTRAINT,
};
use planboard_shared::models::user::User;
use planboard_shared::services::project::parse_date_range;
use planboard_shared::services::{ProjectService, UserService};
use serde_json::Value;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::Service as _;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    projects: Vec<Project>,
    users: Vec<User>,
    memberships: Vec<Membership>,
}

/// In-memory store backing both services
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl MemoryStore {
    /// Number of service calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Makes every subsequent call fail with a database error
    pub fn fail_all(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn insert_user(&self, full_name: &str) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            username: None,
            email: format!("{}@example.com", full_name.to_lowercase().replace(' ', ".")),
            full_name: full_name.to_string(),
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().unwrap().users.push(user.clone());
        user
    }

    pub fn insert_project(&self, name: &str, start_date: Option<NaiveDate>) -> Project {
        self.insert_dated_project(name, start_date, None)
    }

    pub fn insert_dated_project(
        &self,
        name: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Project {
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            start_date,
            end_date,
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().unwrap().projects.push(project.clone());
        project
    }

    pub fn insert_membership(&self, project_id: Uuid, user_id: Uuid) {
        self.tables.lock().unwrap().memberships.push(Membership {
            id: Uuid::new_v4(),
            project_id,
            user_id,
            created_at: Utc::now(),
        });
    }

    pub fn membership_count(&self, project_id: Uuid, user_id: Uuid) -> usize {
        self.tables
            .lock()
            .unwrap()
            .memberships
            .iter()
            .filter(|m| m.project_id == project_id && m.user_id == user_id)
            .count()
    }

    pub fn project(&self, id: Uuid) -> Option<Project> {
        self.tables
            .lock()
            .unwrap()
            .projects
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    fn enter(&self) -> StoreResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

fn check_dates(start: Option<NaiveDate>, end: Option<NaiveDate>) -> StoreResult<()> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => Err(StoreError::CheckViolation {
            constraint: DATES_CHECK_CONSTRAINT.to_string(),
        }),
        _ => Ok(()),
    }
}

#[async_trait]
impl ProjectService for MemoryStore {
    async fn find_all_projects(&self) -> StoreResult<Vec<Project>> {
        self.enter()?;
        Ok(self.tables.lock().unwrap().projects.clone())
    }

    async fn find_projects_by_date_range(
        &self,
        start_date: &str,
        end_date: &str,
    ) -> StoreResult<Vec<Project>> {
        self.enter()?;
        let (start, end) = parse_date_range(start_date, end_date)?;

        Ok(self
            .tables
            .lock()
            .unwrap()
            .projects
            .iter()
            .filter(|p| p.start_date.is_some_and(|d| d >= start && d <= end))
            .cloned()
            .collect())
    }

    async fn find_project_by_id(&self, id: Uuid) -> StoreResult<Option<Project>> {
        self.enter()?;
        Ok(self.project(id))
    }

    async fn create_project(&self, data: CreateProject) -> StoreResult<Project> {
        self.enter()?;
        check_dates(data.start_date, data.end_date)?;
        let now = Utc::now();
        let project = Project {
            id: Uuid::new_v4(),
            name: data.name,
            description: data.description,
            start_date: data.start_date,
            end_date: data.end_date,
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().unwrap().projects.push(project.clone());
        Ok(project)
    }

    async fn update_project(&self, id: Uuid, patch: UpdateProject) -> StoreResult<u64> {
        self.enter()?;
        let mut tables = self.tables.lock().unwrap();
        let Some(project) = tables.projects.iter_mut().find(|p| p.id == id) else {
            return Ok(0);
        };

        check_dates(
            patch.start_date.or(project.start_date),
            patch.end_date.or(project.end_date),
        )?;

        if let Some(name) = patch.name {
            project.name = name;
        }
        if let Some(description) = patch.description {
            project.description = Some(description);
        }
        if let Some(start_date) = patch.start_date {
            project.start_date = Some(start_date);
        }
        if let Some(end_date) = patch.end_date {
            project.end_date = Some(end_date);
        }
        project.updated_at = Utc::now();
        Ok(1)
    }

    async fn delete_project(&self, id: Uuid) -> StoreResult<u64> {
        self.enter()?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.projects.len();
        tables.projects.retain(|p| p.id != id);
        let removed = (before - tables.projects.len()) as u64;
        tables.memberships.retain(|m| m.project_id != id);
        Ok(removed)
    }

    async fn find_project_users(&self, id: Uuid) -> StoreResult<Option<ProjectWithUsers>> {
        self.enter()?;
        let tables = self.tables.lock().unwrap();
        let Some(project) = tables.projects.iter().find(|p| p.id == id).cloned() else {
            return Ok(None);
        };

        let users = tables
            .memberships
            .iter()
            .filter(|m| m.project_id == id)
            .filter_map(|m| tables.users.iter().find(|u| u.id == m.user_id).cloned())
            .collect();

        Ok(Some(ProjectWithUsers { project, users }))
    }

    async fn is_user_in_project(&self, project_id: Uuid, user_id: Uuid) -> StoreResult<bool> {
        self.enter()?;
        Ok(self.membership_count(project_id, user_id) > 0)
    }

    async fn add_user_to_project(&self, data: CreateMembership) -> StoreResult<Membership> {
        self.enter()?;
        let mut tables = self.tables.lock().unwrap();

        if !tables.projects.iter().any(|p| p.id == data.project_id) {
            return Err(StoreError::ForeignKeyViolation {
                constraint: PROJECT_FOREIGN_KEY.to_string(),
            });
        }
        if !tables.users.iter().any(|u| u.id == data.user_id) {
            return Err(StoreError::ForeignKeyViolation {
                constraint: USER_FOREIGN_KEY.to_string(),
            });
        }
        if tables
            .memberships
            .iter()
            .any(|m| m.project_id == data.project_id && m.user_id == data.user_id)
        {
            return Err(StoreError::UniqueViolation {
                constraint: UNIQUE_MEMBERSHIP_CONSTRAINT.to_string(),
            });
        }

        let membership = Membership {
            id: Uuid::new_v4(),
            project_id: data.project_id,
            user_id: data.user_id,
            created_at: Utc::now(),
        };
        tables.memberships.push(membership.clone());
        Ok(membership)
    }

    async fn remove_user_from_project(&self, project_id: Uuid, user_id: Uuid) -> StoreResult<u64> {
        self.enter()?;
        let mut tables = self.tables.lock().unwrap();
        let before = tables.memberships.len();
        tables
            .memberships
            .retain(|m| !(m.project_id == project_id && m.user_id == user_id));
        Ok((before - tables.memberships.len()) as u64)
    }

    async fn ping(&self) -> StoreResult<()> {
        self.enter()
    }
}

#[async_trait]
impl UserService for MemoryStore {
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        self.enter()?;
        Ok(self
            .tables
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }
}

pub fn test_config() -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
        },
        database: DatabaseConfig {
            url: "postgresql://unused/test".to_string(),
            max_connections: 1,
            min_connections: 0,
            connect_timeout_seconds: 1,
            run_migrations: false,
        },
    }
}

/// A router wired to a fresh `MemoryStore`
pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub app: axum::Router,
}

impl TestContext {
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::default());
        let state = AppState::new(store.clone(), store.clone(), test_config());

        Self {
            store,
            app: build_router(state),
        }
    }

    /// Sends a request, returning the status and decoded JSON body
    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send_request(request).await
    }

    /// Sends a raw body with a JSON content type
    pub async fn send_raw(&self, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();

        self.send_request(request).await
    }

    async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().call(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        (status, body)
    }
}

pub fn date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}
