use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CrmError;

/// Free-text note attached to a contact. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Note {
    pub id: String,
    pub contact_id: String,
    pub user_id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NoteInput {
    pub contact_id: String,
    pub content: String,
}

impl Note {
    pub fn new(input: NoteInput, user_id: &str, now: DateTime<Utc>) -> Result<Self, CrmError> {
        let content = input.content.trim();
        if content.is_empty() {
            return Err(CrmError::InvalidInput("note content must not be empty".to_owned()));
        }
        Ok(Self {
            id: crate::new_id(),
            contact_id: input.contact_id,
            user_id: user_id.to_owned(),
            content: content.to_owned(),
            created_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_note_is_rejected() {
        let input = NoteInput { contact_id: "c1".to_owned(), content: " \n ".to_owned() };
        assert!(Note::new(input, "u1", Utc::now()).is_err());
    }

    #[test]
    fn content_is_trimmed() {
        let input = NoteInput { contact_id: "c1".to_owned(), content: "  call back  ".to_owned() };
        let note = Note::new(input, "u1", Utc::now()).unwrap();
        assert_eq!(note.content, "call back");
        assert_eq!(note.user_id, "u1");
    }
}
