/// Services used by the HTTP layer
///
/// Each service is a trait so handlers can be driven by any store; the
/// `Pg*` types are the production implementations.
///
/// # Example
///
/// ```no_run
/// use planboard_shared::services::{project::PgProjectService, user::PgUserService};
/// use planboard_shared::services::{ProjectService, UserService};
/// use sqlx::PgPool;
/// use std::sync::Arc;
///
/// # fn example(pool: PgPool) {
/// let projects: Arc<dyn ProjectService> = Arc::new(PgProjectService::new(pool.clone()));
/// let users: Arc<dyn UserService> = Arc::new(PgUserService::new(pool));
/// # }
/// ```

pub mod project;
pub mod user;

pub use project::ProjectService;
pub use user::UserService;
