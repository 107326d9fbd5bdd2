use crate::application::repos::RepoError;

/// Map driver errors that are not tied to a specific product id.
pub fn map_sqlx_error(err: sqlx::Error) -> RepoError {
    match err {
        sqlx::Error::PoolTimedOut => RepoError::Timeout,
        sqlx::Error::Database(db)
            if db
                .message()
                .contains("canceling statement due to user request") =>
        {
            RepoError::Timeout
        }
        other => RepoError::from_persistence(other),
    }
}

/// Like [`map_sqlx_error`], but a missing row becomes `NotFound` for `id`.
pub(super) fn map_row_error(id: i64) -> impl FnOnce(sqlx::Error) -> RepoError {
    move |err| match err {
        sqlx::Error::RowNotFound => RepoError::NotFound { id },
        other => map_sqlx_error(other),
    }
}
