//! Classification of SQLx errors raised by inserts.

/// Name of the unique constraint on `short_links.code`.
pub const SHORT_LINK_CODE_CONSTRAINT: &str = "short_links_code_key";

/// Name of the unique constraint on `users.user_id`.
pub const USER_ID_CONSTRAINT: &str = "users_user_id_key";

/// Returns true if `e` is a unique violation on the given constraint.
pub fn is_unique_violation_on(e: &sqlx::Error, constraint: &str) -> bool {
    let Some(db_err) = e.as_database_error() else {
        return false;
    };

    if !db_err.is_unique_violation() {
        return false;
    }

    db_err.constraint() == Some(constraint)
}

/// Returns true if `e` is a unique violation on the short code column.
pub fn is_unique_violation_on_code(e: &sqlx::Error) -> bool {
    is_unique_violation_on(e, SHORT_LINK_CODE_CONSTRAINT)
}
