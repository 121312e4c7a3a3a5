use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::core::error::{AppError, Result};
use crate::features::text_files::models::{NewTextFile, TextFile, TextFileChanges};
use crate::features::text_files::repositories::TextFileRepository;

/// Local file-backed (or in-memory) store used when no server database is configured
#[derive(Clone)]
pub struct SqliteTextFileRepository {
    pool: SqlitePool,
}

impl SqliteTextFileRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TextFileRepository for SqliteTextFileRepository {
    async fn create(&self, new_file: NewTextFile) -> Result<TextFile> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO text_files (display_name, original_filename, content, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new_file.display_name)
        .bind(&new_file.original_filename)
        .bind(&new_file.content)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        let file = TextFile {
            id: result.last_insert_rowid(),
            display_name: new_file.display_name,
            original_filename: new_file.original_filename,
            content: new_file.content,
            created_at: now,
            updated_at: now,
        };

        info!(
            "Text file created: id={}, filename={}",
            file.id, file.original_filename
        );
        Ok(file)
    }

    async fn list_all_by_recency(&self) -> Result<Vec<TextFile>> {
        sqlx::query_as::<_, TextFile>(
            r#"
            SELECT id, display_name, original_filename, content, created_at, updated_at
            FROM text_files
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list text files: {:?}", e);
            AppError::Database(e)
        })
    }

    async fn get(&self, id: i64) -> Result<Option<TextFile>> {
        let file = sqlx::query_as::<_, TextFile>(
            r#"
            SELECT id, display_name, original_filename, content, created_at, updated_at
            FROM text_files
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(file)
    }

    async fn update(&self, mut file: TextFile, changes: TextFileChanges) -> Result<TextFile> {
        file.update_content(changes);

        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            r#"
            UPDATE text_files
            SET display_name = ?, original_filename = ?, content = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&file.display_name)
        .bind(&file.original_filename)
        .bind(&file.content)
        .bind(file.updated_at)
        .bind(file.id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Text file {} not found", file.id)));
        }
        tx.commit().await?;

        info!("Text file updated: id={}", file.id);
        Ok(file)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM text_files WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Text file {} not found", id)));
        }
        tx.commit().await?;

        info!("Text file deleted: id={}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::memory_database;
    use fake::faker::lorem::en::{Paragraph, Sentence};
    use fake::Fake;

    async fn repository() -> SqliteTextFileRepository {
        match memory_database().await {
            crate::core::database::Database::Sqlite(pool) => SqliteTextFileRepository::new(pool),
            other => panic!("expected sqlite, got {}", other.backend_name()),
        }
    }

    fn new_file(display_name: &str, content: &str) -> NewTextFile {
        NewTextFile {
            display_name: display_name.to_string(),
            original_filename: format!("{}.txt", display_name.to_lowercase()),
            content: content.to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let repo = repository().await;
        let display_name: String = Sentence(2..5).fake();
        let content: String = Paragraph(3..6).fake();

        let created = repo.create(new_file(&display_name, &content)).await.unwrap();
        assert_eq!(created.created_at, created.updated_at);

        let fetched = repo.get(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.display_name, display_name);
        assert_eq!(fetched.content, content);
    }

    #[tokio::test]
    async fn test_get_missing_returns_none() {
        let repo = repository().await;
        assert!(repo.get(4242).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let repo = repository().await;
        assert!(repo.list_all_by_recency().await.unwrap().is_empty());

        let first = repo.create(new_file("First", "1")).await.unwrap();
        let second = repo.create(new_file("Second", "2")).await.unwrap();
        let third = repo.create(new_file("Third", "3")).await.unwrap();

        let ids: Vec<i64> = repo
            .list_all_by_recency()
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(ids, vec![third.id, second.id, first.id]);
    }

    #[tokio::test]
    async fn test_update_persists_only_given_fields() {
        let repo = repository().await;
        let created = repo.create(new_file("Draft", "Old content")).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let updated = repo
            .update(
                created.clone(),
                TextFileChanges {
                    display_name: Some("Final".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let stored = repo.get(created.id).await.unwrap().unwrap();
        assert_eq!(stored, updated);
        assert_eq!(stored.display_name, "Final");
        assert_eq!(stored.content, "Old content");
        assert_eq!(stored.original_filename, created.original_filename);
        assert_eq!(stored.created_at, created.created_at);
        assert!(stored.updated_at > created.updated_at);
    }

    #[tokio::test]
    async fn test_update_deleted_row_is_not_found() {
        let repo = repository().await;
        let created = repo.create(new_file("Gone", "x")).await.unwrap();
        repo.delete(created.id).await.unwrap();

        let result = repo
            .update(
                created,
                TextFileChanges {
                    content: Some("y".to_string()),
                    ..Default::default()
                },
            )
            .await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = repository().await;
        let keep = repo.create(new_file("Keep", "k")).await.unwrap();
        let drop = repo.create(new_file("Drop", "d")).await.unwrap();

        repo.delete(drop.id).await.unwrap();

        assert!(repo.get(drop.id).await.unwrap().is_none());
        assert!(repo.get(keep.id).await.unwrap().is_some());
        assert!(matches!(
            repo.delete(drop.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
