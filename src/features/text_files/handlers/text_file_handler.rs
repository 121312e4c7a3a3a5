use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
};
use minijinja::context;
use std::sync::Arc;
use tracing::{debug, info};
use validator::Validate;

use crate::core::config::UploadConfig;
use crate::core::error::{AppError, Result};
use crate::core::extractor::FormPayload;
use crate::features::text_files::dtos::{
    first_validation_message, CreateTextFileDto, TextFileView, UpdateTextFileDto,
};
use crate::features::text_files::models::TextFile;
use crate::features::text_files::repositories::TextFileRepository;
use crate::features::text_files::services::{
    base_name, decode, describe_extensions, is_allowed_extension,
};
use crate::shared::flash::{Flash, IncomingFlashes};
use crate::shared::templates::Templates;

/// List all files, newest first, with the upload form
pub async fn list_files(
    State(repo): State<Arc<dyn TextFileRepository>>,
    State(templates): State<Arc<Templates>>,
    State(upload): State<Arc<UploadConfig>>,
    flashes: IncomingFlashes,
) -> Result<(IncomingFlashes, Html<String>)> {
    let files: Vec<TextFileView> = repo
        .list_all_by_recency()
        .await?
        .into_iter()
        .map(TextFileView::from)
        .collect();

    let html = templates.render(
        "index.html",
        context! {
            files => files,
            allowed_extensions => &upload.allowed_extensions,
            flashes => flashes.messages(),
        },
    )?;

    Ok((flashes, Html(html)))
}

/// Upload a new text file
///
/// Accepts multipart/form-data with:
/// - `file`: the text file (required)
/// - `display_name`: optional, defaults to the uploaded filename
pub async fn upload_file(
    State(repo): State<Arc<dyn TextFileRepository>>,
    State(upload): State<Arc<UploadConfig>>,
    flash: Flash,
    mut form: FormPayload,
) -> Result<Response> {
    let Some(file) = form.take_file("file") else {
        debug!("Upload rejected: no file selected");
        return Ok(redirect(flash.warning("Please select a TXT file to upload."), "/"));
    };

    if !is_allowed_extension(&file.file_name, &upload.allowed_extensions) {
        debug!("Upload rejected: extension not allowed for {}", file.file_name);
        return Ok(redirect(
            flash.warning(unsupported_type_message(&upload)),
            "/",
        ));
    }

    let display_name = trimmed_text(&form, "display_name")
        .unwrap_or_else(|| base_name(&file.file_name).to_string());

    debug!(
        "Decoding upload: filename={}, content_type={:?}, size={} bytes",
        file.file_name,
        file.content_type,
        file.data.len()
    );

    let dto = CreateTextFileDto {
        display_name,
        content: decode(&file.data),
        original_filename: file.file_name,
    };
    if let Err(errors) = dto.validate() {
        debug!("Upload rejected: {}", errors);
        return Ok(redirect(flash.warning(first_validation_message(&errors)), "/"));
    }

    let text_file = repo.create(dto.into()).await?;
    info!(
        "Uploaded text file {} ({} chars)",
        text_file.id,
        text_file.content.chars().count()
    );

    Ok(redirect(flash.success("File uploaded successfully!"), "/"))
}

/// Show one file and its content
pub async fn show_file(
    State(repo): State<Arc<dyn TextFileRepository>>,
    State(templates): State<Arc<Templates>>,
    flashes: IncomingFlashes,
    Path(id): Path<String>,
) -> Result<(IncomingFlashes, Html<String>)> {
    let text_file = find_text_file(repo.as_ref(), &id).await?;

    let html = templates.render(
        "detail.html",
        context! {
            text_file => TextFileView::from(text_file),
            flashes => flashes.messages(),
        },
    )?;

    Ok((flashes, Html(html)))
}

/// Edit form pre-populated with the current values
pub async fn edit_file_form(
    State(repo): State<Arc<dyn TextFileRepository>>,
    State(templates): State<Arc<Templates>>,
    flashes: IncomingFlashes,
    Path(id): Path<String>,
) -> Result<(IncomingFlashes, Html<String>)> {
    let text_file = find_text_file(repo.as_ref(), &id).await?;

    let html = templates.render(
        "edit.html",
        context! {
            text_file => TextFileView::from(text_file),
            flashes => flashes.messages(),
        },
    )?;

    Ok((flashes, Html(html)))
}

/// Apply an edit
///
/// A replacement `file` takes precedence over the `content` field. An empty
/// `content` field is valid; only a missing one is rejected.
pub async fn update_file(
    State(repo): State<Arc<dyn TextFileRepository>>,
    State(upload): State<Arc<UploadConfig>>,
    flash: Flash,
    Path(id): Path<String>,
    mut form: FormPayload,
) -> Result<Response> {
    let text_file = find_text_file(repo.as_ref(), &id).await?;
    let edit_url = format!("/files/{}/edit", text_file.id);

    let display_name =
        trimmed_text(&form, "display_name").unwrap_or_else(|| text_file.display_name.clone());

    let (content, original_filename) = match form.take_file("file") {
        Some(file) => {
            if !is_allowed_extension(&file.file_name, &upload.allowed_extensions) {
                debug!(
                    "Edit of {} rejected: extension not allowed for {}",
                    text_file.id, file.file_name
                );
                return Ok(redirect(
                    flash.warning(unsupported_type_message(&upload)),
                    &edit_url,
                ));
            }
            (Some(decode(&file.data)), Some(file.file_name))
        }
        None => (form.take_text("content"), None),
    };

    let Some(content) = content else {
        debug!("Edit of {} rejected: no content", text_file.id);
        return Ok(redirect(flash.warning("Content cannot be empty."), &edit_url));
    };

    let dto = UpdateTextFileDto {
        display_name,
        original_filename,
        content,
    };
    if let Err(errors) = dto.validate() {
        debug!("Edit of {} rejected: {}", text_file.id, errors);
        return Ok(redirect(flash.warning(first_validation_message(&errors)), &edit_url));
    }

    let updated = repo.update(text_file, dto.into()).await?;
    info!("Edited text file {}", updated.id);

    Ok(redirect(
        flash.success("File updated successfully."),
        &format!("/files/{}", updated.id),
    ))
}

/// Delete a file
pub async fn delete_file(
    State(repo): State<Arc<dyn TextFileRepository>>,
    flash: Flash,
    Path(id): Path<String>,
) -> Result<Response> {
    let text_file = find_text_file(repo.as_ref(), &id).await?;

    repo.delete(text_file.id).await?;
    info!("Deleted text file {}", text_file.id);

    Ok(redirect(flash.info("File deleted."), "/"))
}

/// Look up a file by its path segment; ids that do not parse are simply not found
async fn find_text_file(repo: &dyn TextFileRepository, raw_id: &str) -> Result<TextFile> {
    let not_found = || AppError::NotFound(format!("Text file {} not found", raw_id));

    let id: i64 = raw_id.parse().map_err(|_| not_found())?;
    repo.get(id).await?.ok_or_else(not_found)
}

fn trimmed_text(form: &FormPayload, name: &str) -> Option<String> {
    form.text(name)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn unsupported_type_message(upload: &UploadConfig) -> String {
    format!(
        "Only {} files are supported.",
        describe_extensions(&upload.allowed_extensions)
    )
}

/// 302 redirect carrying the flash cookie
fn redirect(flash: Flash, location: &str) -> Response {
    (
        StatusCode::FOUND,
        flash,
        [(header::LOCATION, location.to_string())],
    )
        .into_response()
}
