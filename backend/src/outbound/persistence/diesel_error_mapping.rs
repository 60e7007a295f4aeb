//! Shared Diesel error classification for the repositories.
//!
//! Each repository owns its port error type, so these helpers only sort a
//! Diesel failure into the shapes every port cares about and leave the final
//! constructor to the caller.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

/// A Diesel failure sorted into the categories ports distinguish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    /// The connection dropped or could not be used.
    Connection(&'static str),
    /// A unique constraint rejected the row.
    UniqueViolation { constraint: Option<String> },
    /// A foreign key constraint rejected the row.
    ForeignKeyViolation { constraint: Option<String> },
    /// No row matched a query expecting one.
    NotFound,
    /// Anything else.
    Query(&'static str),
}

/// Classify `error`, logging the database detail at debug level.
pub(crate) fn classify(error: DieselError) -> DieselFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => DieselFailure::NotFound,
        DieselError::QueryBuilderError(_) => DieselFailure::Query("database query error"),
        DieselError::DatabaseError(kind, info) => match kind {
            DatabaseErrorKind::UniqueViolation => DieselFailure::UniqueViolation {
                constraint: info.constraint_name().map(str::to_owned),
            },
            DatabaseErrorKind::ForeignKeyViolation => DieselFailure::ForeignKeyViolation {
                constraint: info.constraint_name().map(str::to_owned),
            },
            DatabaseErrorKind::ClosedConnection => {
                DieselFailure::Connection("database connection error")
            }
            _ => DieselFailure::Query("database error"),
        },
        _ => DieselFailure::Query("database error"),
    }
}
