/// Database models for Planboard
///
/// Each model owns its SQL. Services in `crate::services` compose these
/// into the operations the HTTP layer calls.
///
/// - `project`: projects and the project-with-members view
/// - `user`: user profiles
/// - `membership`: project-user join rows
/// - `task`: tasks attached to projects and users

pub mod membership;
pub mod project;
pub mod task;
pub mod user;
