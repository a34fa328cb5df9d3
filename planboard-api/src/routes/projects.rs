/// Project endpoints
///
/// # Endpoints
///
/// - `GET    /projects?startDate=&endDate=` - List projects, optionally filtered by start date
/// - `GET    /projects/:id` - Get a project
/// - `POST   /projects` - Create a project
/// - `PUT    /projects/:id` - Update a project
/// - `DELETE /projects/:id` - Delete a project
/// - `GET    /projects/:id/users` - Get a project with its users
/// - `POST   /projects/:id/users/:user_id` - Add a user to a project
/// - `DELETE /projects/:id/users/:user_id` - Remove a user from a project
///
/// Identifiers are taken as raw strings and validated before any lookup. A
/// malformed identifier gets the same 404 as a missing record.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult, ValidationErrorDetail},
    extract::{MemberParams, ProjectIdParam},
    response::ApiResponse,
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use planboard_shared::{
    error::StoreError,
    ids,
    models::{
        membership::{CreateMembership, Membership, UNIQUE_MEMBERSHIP_CONSTRAINT, USER_FOREIGN_KEY},
        project::{
            CreateProject, Project, ProjectWithUsers, UpdateProject, DATES_CHECK_CONSTRAINT,
        },
    },
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Query string for `GET /projects`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListProjectsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl ListProjectsQuery {
    /// Both bounds, if both were given and non-empty
    fn date_range(&self) -> Option<(&str, &str)> {
        let start = self.start_date.as_deref().filter(|s| !s.is_empty())?;
        let end = self.end_date.as_deref().filter(|s| !s.is_empty())?;
        Some((start, end))
    }
}

/// Create project request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_create_dates"))]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Update project request; omitted fields keep their value
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_update_dates"))]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,

    pub description: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

fn check_date_order(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), ValidationError> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => {
            let mut err = ValidationError::new("date_order");
            err.message = Some("endDate must not be before startDate".into());
            Err(err)
        }
        _ => Ok(()),
    }
}

fn validate_create_dates(req: &CreateProjectRequest) -> Result<(), ValidationError> {
    check_date_order(req.start_date, req.end_date)
}

fn validate_update_dates(req: &UpdateProjectRequest) -> Result<(), ValidationError> {
    check_date_order(req.start_date, req.end_date)
}

impl From<CreateProjectRequest> for CreateProject {
    fn from(req: CreateProjectRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            start_date: req.start_date,
            end_date: req.end_date,
        }
    }
}

impl From<UpdateProjectRequest> for UpdateProject {
    fn from(req: UpdateProjectRequest) -> Self {
        Self {
            name: req.name,
            description: req.description,
            start_date: req.start_date,
            end_date: req.end_date,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectsData {
    pub projects: Vec<Project>,
}

#[derive(Debug, Serialize)]
pub struct ProjectData {
    pub project: Project,
}

#[derive(Debug, Serialize)]
pub struct ProjectUsersData {
    pub project: ProjectWithUsers,
}

#[derive(Debug, Serialize)]
pub struct MembershipData {
    pub membership: Membership,
}

#[derive(Debug, Serialize)]
pub struct RemovedMemberData {
    pub project: Project,

    /// Memberships deleted by the request
    pub removed: u64,
}

fn project_not_found(raw: &str) -> ApiError {
    ApiError::NotFound(format!("Project with ID: {raw} not found"))
}

fn user_not_found(raw: &str) -> ApiError {
    ApiError::NotFound(format!("User with ID: {raw} not found"))
}

fn parse_project_id(raw: &str) -> ApiResult<Uuid> {
    ids::parse_uuid(raw).ok_or_else(|| project_not_found(raw))
}

fn parse_user_id(raw: &str) -> ApiResult<Uuid> {
    ids::parse_uuid(raw).ok_or_else(|| user_not_found(raw))
}

/// A patch carrying one date can still conflict with the stored other one
fn reject_date_order(err: StoreError) -> ApiError {
    if err.is_constraint(DATES_CHECK_CONSTRAINT) {
        return ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "endDate".to_string(),
            message: "endDate must not be before startDate".to_string(),
        }]);
    }
    err.into()
}

/// List projects
///
/// Filters by start date only when both `startDate` and `endDate` are present.
/// An empty result is a 404.
///
/// # Errors
///
/// - `400 Bad Request`: a date bound is not a date, or the query string is malformed
/// - `404 Not Found`: no projects matched
pub async fn list_projects(
    State(state): State<AppState>,
    query: Result<Query<ListProjectsQuery>, QueryRejection>,
) -> ApiResult<ApiResponse<ProjectsData>> {
    let Query(query) = query?;

    let (projects, message) = match query.date_range() {
        Some((start, end)) => (
            state.projects.find_projects_by_date_range(start, end).await?,
            "projects filter retrieved successfully",
        ),
        None => (
            state.projects.find_all_projects().await?,
            "All projects retrieved successfully",
        ),
    };

    if projects.is_empty() {
        return Err(ApiError::NotFound("No Project found".to_string()));
    }

    Ok(ApiResponse::ok(message, ProjectsData { projects }))
}

/// Get a project by ID
pub async fn get_project(
    State(state): State<AppState>,
    ProjectIdParam(raw_id): ProjectIdParam,
) -> ApiResult<ApiResponse<ProjectData>> {
    let id = parse_project_id(&raw_id)?;

    let project = state
        .projects
        .find_project_by_id(id)
        .await?
        .ok_or_else(|| project_not_found(&raw_id))?;

    Ok(ApiResponse::ok(
        format!("{} retrieved successfully", project.name),
        ProjectData { project },
    ))
}

/// Create a project
///
/// # Errors
///
/// - `400 Bad Request`: body is not valid JSON for this shape
/// - `422 Unprocessable Entity`: field validation failed
pub async fn create_project(
    State(state): State<AppState>,
    payload: Result<Json<CreateProjectRequest>, JsonRejection>,
) -> ApiResult<ApiResponse<ProjectData>> {
    let Json(req) = payload?;
    req.validate()?;

    let project = state
        .projects
        .create_project(req.into())
        .await
        .map_err(reject_date_order)?;
    info!(project_id = %project.id, name = %project.name, "Project created");

    Ok(ApiResponse::created(
        format!("{} created successfully", project.name),
        ProjectData { project },
    ))
}

/// Update a project
///
/// Responds with the reloaded project.
///
/// # Errors
///
/// - `404 Not Found`: malformed id or no such project
/// - `422 Unprocessable Entity`: field validation failed, or the new dates
///   would put `endDate` before `startDate`
pub async fn update_project(
    State(state): State<AppState>,
    ProjectIdParam(raw_id): ProjectIdParam,
    payload: Result<Json<UpdateProjectRequest>, JsonRejection>,
) -> ApiResult<ApiResponse<ProjectData>> {
    let id = parse_project_id(&raw_id)?;
    let Json(req) = payload?;
    req.validate()?;

    let updated = state
        .projects
        .update_project(id, req.into())
        .await
        .map_err(reject_date_order)?;
    if updated == 0 {
        return Err(project_not_found(&raw_id));
    }

    // Deleted between the update and the reload
    let project = state
        .projects
        .find_project_by_id(id)
        .await?
        .ok_or_else(|| project_not_found(&raw_id))?;

    info!(project_id = %id, "Project updated");

    Ok(ApiResponse::ok(
        format!("{} updated successfully", project.name),
        ProjectData { project },
    ))
}

/// Delete a project
pub async fn delete_project(
    State(state): State<AppState>,
    ProjectIdParam(raw_id): ProjectIdParam,
) -> ApiResult<ApiResponse> {
    let id = parse_project_id(&raw_id)?;

    let project = state
        .projects
        .find_project_by_id(id)
        .await?
        .ok_or_else(|| project_not_found(&raw_id))?;

    let deleted = state.projects.delete_project(id).await?;
    if deleted == 0 {
        return Err(project_not_found(&raw_id));
    }

    info!(project_id = %id, "Project deleted");

    Ok(ApiResponse::message(
        StatusCode::OK,
        format!("{} deleted successfully", project.name),
    ))
}

/// Get a project with its users
///
/// # Errors
///
/// - `404 Not Found`: malformed id, unknown project, or a project without users
pub async fn get_project_users(
    State(state): State<AppState>,
    ProjectIdParam(raw_id): ProjectIdParam,
) -> ApiResult<ApiResponse<ProjectUsersData>> {
    let id = parse_project_id(&raw_id)?;

    let project = state
        .projects
        .find_project_users(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Project with ID: {raw_id} was not found")))?;

    if project.users.is_empty() {
        return Err(ApiError::NotFound(format!(
            "No users found for {}",
            project.project.name
        )));
    }

    Ok(ApiResponse::ok(
        "Project retrieved successfully",
        ProjectUsersData { project },
    ))
}

/// Add a user to a project
///
/// The duplicate check is the store's unique constraint: a second add of the
/// same pair fails on insert and is reported as 400.
///
/// # Errors
///
/// - `400 Bad Request`: the user is already a member
/// - `404 Not Found`: malformed or unknown project or user
pub async fn add_user_to_project(
    State(state): State<AppState>,
    MemberParams {
        project_id: raw_project_id,
        user_id: raw_user_id,
    }: MemberParams,
) -> ApiResult<ApiResponse<MembershipData>> {
    let project_id = parse_project_id(&raw_project_id)?;
    let user_id = parse_user_id(&raw_user_id)?;

    let project_missing = || {
        ApiError::NotFound(format!(
            "Project with ID: {raw_project_id} not found or not created"
        ))
    };
    let user_missing = || {
        ApiError::NotFound(format!(
            "User with ID: {raw_user_id} not found or not registered"
        ))
    };

    state
        .projects
        .find_project_by_id(project_id)
        .await?
        .ok_or_else(project_missing)?;

    let user = state
        .users
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(user_missing)?;

    let data = CreateMembership {
        project_id,
        user_id,
    };

    match state.projects.add_user_to_project(data).await {
        Ok(membership) => {
            info!(%project_id, %user_id, "User added to project");
            Ok(ApiResponse::ok(
                "User added to project successfully",
                MembershipData { membership },
            ))
        }
        Err(e) if e.is_constraint(UNIQUE_MEMBERSHIP_CONSTRAINT) => {
            warn!(%project_id, %user_id, "User is already a member of the project");
            Err(ApiError::BadRequest(format!(
                "{} is already added to the project",
                user.full_name
            )))
        }
        // Either row was deleted after the lookups above
        Err(e @ StoreError::ForeignKeyViolation { .. }) => {
            if e.is_constraint(USER_FOREIGN_KEY) {
                Err(user_missing())
            } else {
                Err(project_missing())
            }
        }
        Err(e) => Err(e.into()),
    }
}

/// Remove a user from a project
///
/// # Errors
///
/// - `404 Not Found`: malformed ids, unknown user or project, or the user is
///   not a member
pub async fn remove_user_from_project(
    State(state): State<AppState>,
    MemberParams {
        project_id: raw_project_id,
        user_id: raw_user_id,
    }: MemberParams,
) -> ApiResult<ApiResponse<RemovedMemberData>> {
    let project_id = parse_project_id(&raw_project_id)?;
    let user_id = parse_user_id(&raw_user_id)?;

    let user = state
        .users
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| {
            ApiError::NotFound(format!(
                "User with ID: {raw_user_id} not found or not registered"
            ))
        })?;

    let project = state
        .projects
        .find_project_by_id(project_id)
        .await?
        .ok_or_else(|| project_not_found(&raw_project_id))?;

    let removed = state
        .projects
        .remove_user_from_project(project_id, user_id)
        .await?;

    if removed == 0 {
        return Err(ApiError::NotFound(format!(
            "{} not in this project",
            user.full_name
        )));
    }

    info!(%project_id, %user_id, "User removed from project");

    Ok(ApiResponse::ok(
        "User removed from project successfully",
        RemovedMemberData { project, removed },
    ))
}
