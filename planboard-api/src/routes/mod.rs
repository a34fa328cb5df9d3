/// API route handlers
///
/// - `health`: Health check endpoint
/// - `projects`: Projects and project memberships

pub mod health;
pub mod projects;
