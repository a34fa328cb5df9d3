/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use planboard_api::{app::{build_router, AppState}, config::Config};
/// use planboard_shared::services::{project::PgProjectService, user::PgUserService};
/// use sqlx::PgPool;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(
///     Arc::new(PgProjectService::new(pool.clone())),
///     Arc::new(PgUserService::new(pool)),
///     config,
/// );
/// let app = build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, routes};
use axum::{
    http::{header, HeaderValue, Method, Uri},
    routing::{get, post},
    Router,
};
use planboard_shared::services::{ProjectService, UserService};
use std::{sync::Arc, time::Duration};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned into every handler through the `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub projects: Arc<dyn ProjectService>,
    pub users: Arc<dyn UserService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        projects: Arc<dyn ProjectService>,
        users: Arc<dyn UserService>,
        config: Config,
    ) -> Self {
        Self {
            projects,
            users,
            config: Arc::new(config),
        }
    }
}

/// Builds the router with all routes and middleware
///
/// ```text
/// /
/// ├── GET    /health
/// └── /projects
///     ├── GET    /                      list (optional startDate/endDate)
///     ├── POST   /                      create
///     ├── GET    /:id                   get
///     ├── PUT    /:id                   update
///     ├── DELETE /:id                   delete
///     ├── GET    /:id/users             project with its users
///     ├── POST   /:id/users/:user_id    add member
///     └── DELETE /:id/users/:user_id    remove member
/// ```
///
/// Unknown paths get a 404 envelope.
pub fn build_router(state: AppState) -> Router {
    use routes::projects;

    let project_routes = Router::new()
        .route(
            "/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/projects/:id",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route("/projects/:id/users", get(projects::get_project_users))
        .route(
            "/projects/:id/users/:user_id",
            post(projects::add_user_to_project).delete(projects::remove_user_from_project),
        );

    Router::new()
        .route("/health", get(routes::health::health_check))
        .merge(project_routes)
        .fallback(not_found)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors_layer(&state.config))
        .layer(CompressionLayer::new())
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.allows_any_origin() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .api
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600))
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound(format!("Route {} not found", uri.path()))
}
