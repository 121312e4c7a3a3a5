use chrono::{DateTime, Utc};
use serde::Serialize;
use validator::{Validate, ValidationErrors};

use crate::features::text_files::models::{NewTextFile, TextFile, TextFileChanges};

/// Text file as shown by the page templates
#[derive(Debug, Clone, Serialize)]
pub struct TextFileView {
    pub id: i64,
    pub display_name: String,
    pub original_filename: String,
    pub content: String,
    pub char_count: usize,
    pub created_at: String,
    pub updated_at: String,
}

impl From<TextFile> for TextFileView {
    fn from(f: TextFile) -> Self {
        Self {
            id: f.id,
            char_count: f.content.chars().count(),
            display_name: f.display_name,
            original_filename: f.original_filename,
            content: f.content,
            created_at: format_timestamp(&f.created_at),
            updated_at: format_timestamp(&f.updated_at),
        }
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Validated input for a new upload
#[derive(Debug, Clone, Validate)]
pub struct CreateTextFileDto {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Display name must be between 1 and 255 characters."
    ))]
    pub display_name: String,
    #[validate(length(
        min = 1,
        max = 255,
        message = "Filename must be between 1 and 255 characters."
    ))]
    pub original_filename: String,
    pub content: String,
}

impl From<CreateTextFileDto> for NewTextFile {
    fn from(dto: CreateTextFileDto) -> Self {
        Self {
            display_name: dto.display_name,
            original_filename: dto.original_filename,
            content: dto.content,
        }
    }
}

/// Validated input for an edit.
///
/// `original_filename` is only set when the content came from a replacement upload.
#[derive(Debug, Clone, Validate)]
pub struct UpdateTextFileDto {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Display name must be between 1 and 255 characters."
    ))]
    pub display_name: String,
    #[validate(length(
        min = 1,
        max = 255,
        message = "Filename must be between 1 and 255 characters."
    ))]
    pub original_filename: Option<String>,
    pub content: String,
}

impl From<UpdateTextFileDto> for TextFileChanges {
    fn from(dto: UpdateTextFileDto) -> Self {
        Self {
            display_name: Some(dto.display_name),
            original_filename: dto.original_filename,
            content: Some(dto.content),
        }
    }
}

/// First human-readable message out of a set of validation errors
pub fn first_validation_message(errors: &ValidationErrors) -> String {
    errors
        .field_errors()
        .values()
        .flat_map(|errs| errs.iter())
        .find_map(|e| e.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Invalid input.".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_formats_timestamps_and_counts_chars() {
        let ts = DateTime::parse_from_rfc3339("2025-03-04T05:06:07Z")
            .unwrap()
            .with_timezone(&Utc);
        let view = TextFileView::from(TextFile {
            id: 3,
            display_name: "Greek".to_string(),
            original_filename: "greek.txt".to_string(),
            content: "αβγ".to_string(),
            created_at: ts,
            updated_at: ts,
        });

        assert_eq!(view.created_at, "2025-03-04 05:06 UTC");
        assert_eq!(view.char_count, 3);
    }

    #[test]
    fn test_display_name_length_is_counted_in_chars() {
        let dto = CreateTextFileDto {
            display_name: "é".repeat(255),
            original_filename: "a.txt".to_string(),
            content: String::new(),
        };
        assert!(dto.validate().is_ok());

        let dto = CreateTextFileDto {
            display_name: "x".repeat(256),
            ..dto
        };
        let errors = dto.validate().unwrap_err();
        assert_eq!(
            first_validation_message(&errors),
            "Display name must be between 1 and 255 characters."
        );
    }

    #[test]
    fn test_update_without_replacement_keeps_filename() {
        let dto = UpdateTextFileDto {
            display_name: "Name".to_string(),
            original_filename: None,
            content: "body".to_string(),
        };
        assert!(dto.validate().is_ok());

        let changes = TextFileChanges::from(dto);
        assert!(changes.original_filename.is_none());
        assert_eq!(changes.content.as_deref(), Some("body"));
    }

    #[test]
    fn test_overlong_replacement_filename_is_rejected() {
        let dto = UpdateTextFileDto {
            display_name: "Name".to_string(),
            original_filename: Some(format!("{}.txt", "f".repeat(300))),
            content: String::new(),
        };
        let errors = dto.validate().unwrap_err();
        assert_eq!(
            first_validation_message(&errors),
            "Filename must be between 1 and 255 characters."
        );
    }
}
