mod postgres;
mod sqlite;
mod text_file_repository;

use std::sync::Arc;

use crate::core::database::Database;

pub use postgres::PgTextFileRepository;
pub use sqlite::SqliteTextFileRepository;
pub use text_file_repository::TextFileRepository;

/// Repository backed by whichever engine the database was opened with
pub fn repository_for(db: &Database) -> Arc<dyn TextFileRepository> {
    match db {
        Database::Postgres(pool) => Arc::new(PgTextFileRepository::new(pool.clone())),
        Database::Sqlite(pool) => Arc::new(SqliteTextFileRepository::new(pool.clone())),
    }
}
