use async_trait::async_trait;

use crate::core::error::Result;
use crate::features::text_files::models::{NewTextFile, TextFile, TextFileChanges};

/// Storage for text files.
///
/// Every operation is its own unit of work: it either commits completely or
/// leaves the table untouched.
#[async_trait]
pub trait TextFileRepository: Send + Sync {
    /// Insert a new row; both timestamps are set to now
    async fn create(&self, new_file: NewTextFile) -> Result<TextFile>;

    /// All rows, newest first
    async fn list_all_by_recency(&self) -> Result<Vec<TextFile>>;

    async fn get(&self, id: i64) -> Result<Option<TextFile>>;

    /// Apply `changes` through [`TextFile::update_content`] and persist the result.
    ///
    /// Fails with `NotFound` if the row was deleted in the meantime.
    async fn update(&self, file: TextFile, changes: TextFileChanges) -> Result<TextFile>;

    /// Fails with `NotFound` if no row has this id
    async fn delete(&self, id: i64) -> Result<()>;
}
