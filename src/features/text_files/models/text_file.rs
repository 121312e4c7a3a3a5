use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for an uploaded text file
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct TextFile {
    pub id: i64,
    pub display_name: String,
    pub original_filename: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values for a row about to be inserted
#[derive(Debug, Clone)]
pub struct NewTextFile {
    pub display_name: String,
    pub original_filename: String,
    pub content: String,
}

/// Field changes for an existing row; `None` leaves the field as it is
#[derive(Debug, Clone, Default)]
pub struct TextFileChanges {
    pub display_name: Option<String>,
    pub original_filename: Option<String>,
    pub content: Option<String>,
}

impl TextFile {
    /// Apply the provided changes and refresh `updated_at`.
    ///
    /// This is the only place a stored record is mutated. `updated_at` never
    /// moves before `created_at`, even if the clock stepped backwards.
    pub fn update_content(&mut self, changes: TextFileChanges) {
        let TextFileChanges {
            display_name,
            original_filename,
            content,
        } = changes;

        if let Some(display_name) = display_name {
            self.display_name = display_name;
        }
        if let Some(original_filename) = original_filename {
            self.original_filename = original_filename;
        }
        if let Some(content) = content {
            self.content = content;
        }

        self.updated_at = Utc::now().max(self.created_at).max(self.updated_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample() -> TextFile {
        let created = Utc::now() - Duration::minutes(5);
        TextFile {
            id: 7,
            display_name: "Notes".to_string(),
            original_filename: "notes.txt".to_string(),
            content: "old".to_string(),
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_update_only_touches_provided_fields() {
        let mut file = sample();
        let before = file.clone();

        file.update_content(TextFileChanges {
            display_name: Some("Renamed".to_string()),
            ..Default::default()
        });

        assert_eq!(file.display_name, "Renamed");
        assert_eq!(file.content, before.content);
        assert_eq!(file.original_filename, before.original_filename);
        assert_eq!(file.created_at, before.created_at);
        assert!(file.updated_at > before.updated_at);
    }

    #[test]
    fn test_update_with_no_changes_still_refreshes_timestamp() {
        let mut file = sample();
        let before = file.updated_at;
        file.update_content(TextFileChanges::default());
        assert!(file.updated_at > before);
    }

    #[test]
    fn test_updated_at_never_precedes_created_at() {
        let mut file = sample();
        // Simulate a record written by a clock running ahead
        file.created_at = Utc::now() + Duration::hours(1);
        file.updated_at = file.created_at;

        file.update_content(TextFileChanges {
            content: Some("new".to_string()),
            ..Default::default()
        });

        assert_eq!(file.content, "new");
        assert!(file.created_at <= file.updated_at);
    }
}
