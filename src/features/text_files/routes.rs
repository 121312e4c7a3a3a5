use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::app::AppState;
use crate::features::text_files::handlers::{
    delete_file, edit_file_form, list_files, show_file, update_file, upload_file,
};

/// Create routes for the text files feature
pub fn routes(state: AppState) -> Router {
    let max_content_length = state.upload.max_content_length;

    Router::new()
        .route("/", get(list_files).post(upload_file))
        .route("/files/{id}", get(show_file))
        .route("/files/{id}/edit", get(edit_file_form).post(update_file))
        .route("/files/{id}/delete", post(delete_file))
        // Bodies over the limit are rejected with 413
        .layer(DefaultBodyLimit::max(max_content_length))
        .with_state(state)
}
