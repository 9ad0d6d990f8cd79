//! Note use-case service.
//!
//! # Responsibility
//! - Create, edit, tag and delete notes in the `notes` slice.
//!
//! # Invariants
//! - `update_note` replaces content fully.
//! - Tags are normalized to lowercase, deduplicated and sorted.
//! - `list_notes` is sorted by `updated_at DESC, id ASC`.

use super::collection::{Collection, Record};
use super::ServiceResult;
use crate::model::note::{normalize_tag, normalize_tags, Note, NoteId, NoteValidationError};
use crate::store::keys::NOTES_KEY;
use crate::store::{KeyedStore, StorageBackend};
use uuid::Uuid;

impl Record for Note {
    const KIND: &'static str = "note";
    type Invalid = NoteValidationError;

    fn id(&self) -> Uuid {
        self.id
    }

    fn check(&self) -> Result<(), Self::Invalid> {
        self.validate()
    }
}

/// Note facade over the `notes` slice.
pub struct NoteService<'s, B: StorageBackend> {
    notes: Collection<'s, Note, B>,
}

impl<'s, B: StorageBackend> NoteService<'s, B> {
    pub fn open(store: &'s KeyedStore<B>) -> ServiceResult<Self> {
        Ok(Self {
            notes: Collection::open(store, NOTES_KEY)?,
        })
    }

    pub fn create_note(
        &mut self,
        title: impl Into<String>,
        content: impl Into<String>,
    ) -> ServiceResult<Note> {
        let note = Note::new(title, content)?;
        self.notes.insert(note)
    }

    pub fn get_note(&self, id: NoteId) -> Option<&Note> {
        self.notes.get(id)
    }

    /// Replaces content, and the title when one is given.
    pub fn update_note(
        &mut self,
        id: NoteId,
        title: Option<String>,
        content: impl Into<String>,
    ) -> ServiceResult<Note> {
        let content = content.into();
        self.notes
            .modify(id, |note| -> Result<(), NoteValidationError> {
                if let Some(title) = title {
                    note.title = title.trim().to_string();
                }
                note.content = content;
                note.validate()?;
                note.touch();
                Ok(())
            })
    }

    /// Atomically replaces the tag set of one note.
    pub fn set_tags(&mut self, id: NoteId, tags: &[String]) -> ServiceResult<Note> {
        let normalized = normalize_tags(tags)?;
        self.notes
            .modify(id, |note| -> Result<(), NoteValidationError> {
                note.tags = normalized;
                note.touch();
                Ok(())
            })
    }

    pub fn delete_note(&mut self, id: NoteId) -> ServiceResult<()> {
        self.notes.remove(id)?;
        Ok(())
    }

    /// Most recently updated first.
    pub fn list_notes(&self) -> Vec<&Note> {
        let mut notes = self.notes.items().iter().collect::<Vec<_>>();
        notes.sort_by(|left, right| {
            right
                .updated_at
                .cmp(&left.updated_at)
                .then_with(|| left.id.cmp(&right.id))
        });
        notes
    }

    /// Notes carrying `tag` (matched after normalization).
    pub fn notes_with_tag(&self, tag: &str) -> Vec<&Note> {
        let Some(wanted) = normalize_tag(tag) else {
            return Vec::new();
        };
        self.list_notes()
            .into_iter()
            .filter(|note| note.tags.iter().any(|candidate| *candidate == wanted))
            .collect()
    }

    pub fn persistence_degraded(&self) -> bool {
        self.notes.persistence_degraded()
    }
}
