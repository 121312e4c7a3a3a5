#[cfg(test)]
use std::sync::Arc;

#[cfg(test)]
use axum_test::TestServer;

#[cfg(test)]
use crate::app::{router, AppState};
#[cfg(test)]
use crate::core::config::{DatabaseConfig, UploadConfig};
#[cfg(test)]
use crate::core::database::Database;
#[cfg(test)]
use crate::features::text_files::models::{NewTextFile, TextFile};
#[cfg(test)]
use crate::features::text_files::{repository_for, TextFileRepository};
#[cfg(test)]
use crate::shared::flash::FlashKey;
#[cfg(test)]
use crate::shared::templates::Templates;

/// Fresh, migrated in-memory SQLite database
#[cfg(test)]
pub async fn memory_database() -> Database {
    let db = Database::connect(&DatabaseConfig::with_url("sqlite::memory:"))
        .await
        .unwrap();
    db.migrate().await.unwrap();
    db
}

#[cfg(test)]
pub async fn test_server() -> (TestServer, Arc<dyn TextFileRepository>) {
    test_server_with_limit(UploadConfig::default().max_content_length).await
}

/// Server over an empty database, keeping cookies between requests so
/// flash notices reach the next page
#[cfg(test)]
pub async fn test_server_with_limit(
    max_content_length: usize,
) -> (TestServer, Arc<dyn TextFileRepository>) {
    let db = memory_database().await;
    let text_files = repository_for(&db);

    let state = AppState {
        text_files: Arc::clone(&text_files),
        templates: Arc::new(Templates::new().unwrap()),
        upload: Arc::new(UploadConfig {
            max_content_length,
            ..UploadConfig::default()
        }),
        flash_key: FlashKey::new("test-secret"),
    };

    let server = TestServer::builder()
        .save_cookies()
        .build(router(state))
        .unwrap();

    (server, text_files)
}

#[cfg(test)]
pub async fn seed_text_file(
    repo: &Arc<dyn TextFileRepository>,
    display_name: &str,
    content: &str,
) -> TextFile {
    repo.create(NewTextFile {
        display_name: display_name.to_string(),
        original_filename: format!("{}.txt", display_name.to_lowercase().replace(' ', "_")),
        content: content.to_string(),
    })
    .await
    .unwrap()
}
