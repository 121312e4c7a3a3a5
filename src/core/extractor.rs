use std::collections::HashMap;

use axum::{
    body::{Body, Bytes},
    extract::{multipart::MultipartError, FromRequest, Multipart, Request},
    http::{header, StatusCode},
    Form,
};
use tracing::debug;

use crate::core::error::AppError;

/// A file part received in a multipart form
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Filename as sent by the client, possibly empty or path-like
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Form body extractor accepting both `multipart/form-data` and
/// `application/x-www-form-urlencoded`.
///
/// Text fields and file parts are kept apart so handlers can tell an absent
/// field from an empty one.
#[derive(Debug, Default)]
pub struct FormPayload {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl FormPayload {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn take_text(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name)
    }

    /// File part with a non-empty filename.
    ///
    /// Browsers submit an empty part with `filename=""` when no file was
    /// chosen; that counts as no file.
    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name).filter(|f| !f.file_name.is_empty())
    }
}

impl<S> FromRequest<S> for FormPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        // A bare POST carries no fields at all
        let Some(content_type) = content_type else {
            return Ok(Self::default());
        };

        // Media types are case-insensitive
        if !content_type
            .to_ascii_lowercase()
            .starts_with("multipart/form-data")
        {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|rejection| {
                    debug!("Failed to read form body: {}", rejection.body_text());
                    rejection_error(rejection.status(), rejection.body_text())
                })?;
            return Ok(Self {
                fields,
                files: HashMap::new(),
            });
        }

        let mut multipart = Multipart::from_request(req, state).await.map_err(|rejection| {
            debug!("Failed to read multipart body: {}", rejection.body_text());
            rejection_error(rejection.status(), rejection.body_text())
        })?;

        let mut payload = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
            let name = field.name().unwrap_or("").to_string();

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field.content_type().map(str::to_string);
                    let data = field.bytes().await.map_err(multipart_error)?;
                    payload.files.insert(
                        name,
                        UploadedFile {
                            file_name,
                            content_type,
                            data,
                        },
                    );
                }
                None => {
                    let text = field.text().await.map_err(multipart_error)?;
                    payload.fields.insert(name, text);
                }
            }
        }

        Ok(payload)
    }
}

fn multipart_error(err: MultipartError) -> AppError {
    debug!("Failed to read multipart field: {}", err);
    rejection_error(err.status(), err.body_text())
}

fn rejection_error(status: StatusCode, message: String) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(message)
    } else {
        AppError::BadRequest(format!("Failed to read form data: {}", message))
    }
}
