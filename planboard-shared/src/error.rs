/// Store error types
///
/// Every service operation returns `StoreResult<T>`. Database errors are
/// classified on conversion so callers can react to constraint violations
/// without inspecting driver-specific codes.
///
/// # Example
///
/// ```no_run
/// use planboard_shared::error::StoreError;
/// use planboard_shared::services::project::ProjectService;
/// use planboard_shared::models::membership::CreateMembership;
///
/// # async fn example(service: &dyn ProjectService, data: CreateMembership) {
/// match service.add_user_to_project(data).await {
///     Ok(membership) => println!("added {}", membership.id),
///     Err(StoreError::UniqueViolation { .. }) => println!("already a member"),
///     Err(e) => println!("failed: {}", e),
/// }
/// # }
/// ```

use sqlx::error::ErrorKind;

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by the persistence layer and the services built on it
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write (e.g. duplicate membership)
    #[error("Unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    /// A foreign key constraint rejected the write (referenced row missing)
    #[error("Foreign key constraint violated: {constraint}")]
    ForeignKeyViolation { constraint: String },

    /// A check constraint rejected the write (e.g. end date before start date)
    #[error("Check constraint violated: {constraint}")]
    CheckViolation { constraint: String },

    /// A date filter value could not be parsed
    #[error("Invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(sqlx::Error),
}

impl StoreError {
    /// True if this error came from the named constraint
    pub fn is_constraint(&self, name: &str) -> bool {
        match self {
            StoreError::UniqueViolation { constraint }
            | StoreError::ForeignKeyViolation { constraint }
            | StoreError::CheckViolation { constraint } => constraint == name,
            _ => false,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            let constraint = db_err.constraint().unwrap_or_default().to_string();
            match db_err.kind() {
                ErrorKind::UniqueViolation => return StoreError::UniqueViolation { constraint },
                ErrorKind::ForeignKeyViolation => {
                    return StoreError::ForeignKeyViolation { constraint }
                }
                ErrorKind::CheckViolation => return StoreError::CheckViolation { constraint },
                _ => {}
            }
        }

        StoreError::Database(err)
    }
}
