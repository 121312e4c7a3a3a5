use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::info;

use crate::core::error::{AppError, Result};
use crate::features::text_files::models::{NewTextFile, TextFile, TextFileChanges};
use crate::features::text_files::repositories::TextFileRepository;

#[derive(Clone)]
pub struct PgTextFileRepository {
    pool: PgPool,
}

impl PgTextFileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TextFileRepository for PgTextFileRepository {
    async fn create(&self, new_file: NewTextFile) -> Result<TextFile> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let file = sqlx::query_as::<_, TextFile>(
            r#"
            INSERT INTO text_files (display_name, original_filename, content, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id, display_name, original_filename, content, created_at, updated_at
            "#,
        )
        .bind(&new_file.display_name)
        .bind(&new_file.original_filename)
        .bind(&new_file.content)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

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
            WHERE id = $1
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
        let updated = sqlx::query_as::<_, TextFile>(
            r#"
            UPDATE text_files
            SET display_name = $1, original_filename = $2, content = $3, updated_at = $4
            WHERE id = $5
            RETURNING id, display_name, original_filename, content, created_at, updated_at
            "#,
        )
        .bind(&file.display_name)
        .bind(&file.original_filename)
        .bind(&file.content)
        .bind(file.updated_at)
        .bind(file.id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Text file {} not found", file.id)))?;

        tx.commit().await?;

        info!("Text file updated: id={}", updated.id);
        Ok(updated)
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query("DELETE FROM text_files WHERE id = $1")
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
    use crate::core::config::DatabaseConfig;
    use crate::core::database::Database;

    /// Repository on the PostgreSQL server named by `DATABASE_URL`.
    ///
    /// Run with `DATABASE_URL=postgres://... cargo test -- --ignored`.
    async fn repository() -> PgTextFileRepository {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must point at PostgreSQL");
        let db = Database::connect(&DatabaseConfig::with_url(url)).await.unwrap();
        db.migrate().await.unwrap();
        match db {
            Database::Postgres(pool) => PgTextFileRepository::new(pool),
            other => panic!("expected postgres, got {}", other.backend_name()),
        }
    }

    fn new_file(display_name: &str, content: &str) -> NewTextFile {
        NewTextFile {
            display_name: display_name.to_string(),
            original_filename: format!("pg/{}.txt", display_name.to_lowercase()),
            content: content.to_string(),
        }
    }

    #[tokio::test]
    #[ignore = "needs a PostgreSQL DATABASE_URL"]
    async fn test_create_update_matches_stored_row() {
        let repo = repository().await;
        let created = repo.create(new_file("Draft", "Old content")).await.unwrap();
        assert_eq!(repo.get(created.id).await.unwrap().unwrap(), created);

        let updated = repo
            .update(
                created.clone(),
                TextFileChanges {
                    content: Some("New content".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let stored = repo.get(created.id).await.unwrap().unwrap();
        assert_eq!(stored, updated);
        assert_eq!(stored.content, "New content");
        assert_eq!(stored.display_name, "Draft");
        assert_eq!(stored.original_filename, "pg/draft.txt");
        assert!(stored.updated_at >= created.updated_at);

        repo.delete(created.id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "needs a PostgreSQL DATABASE_URL"]
    async fn test_list_puts_newer_rows_first() {
        let repo = repository().await;
        let older = repo.create(new_file("Older", "1")).await.unwrap();
        let newer = repo.create(new_file("Newer", "2")).await.unwrap();

        let ids: Vec<i64> = repo
            .list_all_by_recency()
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.id)
            .collect();
        let newer_at = ids.iter().position(|id| *id == newer.id).unwrap();
        let older_at = ids.iter().position(|id| *id == older.id).unwrap();
        assert!(newer_at < older_at);

        repo.delete(older.id).await.unwrap();
        repo.delete(newer.id).await.unwrap();
    }

    #[tokio::test]
    #[ignore = "needs a PostgreSQL DATABASE_URL"]
    async fn test_missing_rows_are_not_found() {
        let repo = repository().await;
        let created = repo.create(new_file("Gone", "x")).await.unwrap();
        repo.delete(created.id).await.unwrap();

        assert!(repo.get(created.id).await.unwrap().is_none());
        assert!(matches!(
            repo.delete(created.id).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            repo.update(created, TextFileChanges::default()).await,
            Err(AppError::NotFound(_))
        ));
    }
}
