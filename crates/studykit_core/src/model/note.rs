//! Note model.

use crate::codec::iso8601;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub type NoteId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    EmptyTitle,
    InvalidTag(String),
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "note title cannot be empty"),
            Self::InvalidTag(value) => write!(f, "invalid tag: `{value}`"),
        }
    }
}

impl Error for NoteValidationError {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(with = "iso8601::utc")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso8601::utc")]
    pub updated_at: DateTime<Utc>,
}

impl Note {
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> Result<Self, NoteValidationError> {
        let now = iso8601::now_utc();
        let note = Self {
            id: Uuid::new_v4(),
            title: title.into().trim().to_string(),
            content: content.into(),
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        note.validate()?;
        Ok(note)
    }

    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if self.title.trim().is_empty() {
            return Err(NoteValidationError::EmptyTitle);
        }
        Ok(())
    }

    pub fn touch(&mut self) {
        self.updated_at = iso8601::now_utc();
    }
}

/// Trims and lowercases a tag; `None` for blank input.
pub fn normalize_tag(tag: &str) -> Option<String> {
    let trimmed = tag.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Normalizes, deduplicates and sorts tags. Blank tags are rejected.
pub fn normalize_tags(tags: &[String]) -> Result<Vec<String>, NoteValidationError> {
    let mut unique = BTreeSet::new();
    for tag in tags {
        let normalized =
            normalize_tag(tag).ok_or_else(|| NoteValidationError::InvalidTag(tag.clone()))?;
        unique.insert(normalized);
    }
    Ok(unique.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::{normalize_tags, NoteValidationError};

    #[test]
    fn tags_are_lowercased_and_deduplicated() {
        let tags = vec!["Exam".to_string(), " exam ".to_string(), "Lab".to_string()];
        assert_eq!(
            normalize_tags(&tags).unwrap(),
            vec!["exam".to_string(), "lab".to_string()]
        );
    }

    #[test]
    fn blank_tag_is_rejected() {
        let tags = vec!["ok".to_string(), "  ".to_string()];
        assert_eq!(
            normalize_tags(&tags).unwrap_err(),
            NoteValidationError::InvalidTag("  ".to_string())
        );
    }
}
