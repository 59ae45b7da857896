// Repository module structure
pub mod errors;
mod owned;
pub(crate) mod record;
mod users;

// Re-export commonly used types
pub use errors::RepositoryError;
pub use owned::{RecordRepository, SqliteRecordRepository};
pub use record::{ListOrder, OwnedRecord};
pub use users::{SqliteUserRepository, UserRepository};

use crate::database::DatabasePool;
use rusqlite::Connection;

/// Run a closure against a pooled connection on the blocking thread pool
pub(crate) async fn with_connection<F, R>(pool: &DatabasePool, f: F) -> Result<R, RepositoryError>
where
    F: FnOnce(&Connection) -> Result<R, RepositoryError> + Send + 'static,
    R: Send + 'static,
{
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || {
        let conn = pool.get()?;
        f(&conn)
    })
    .await?
}
