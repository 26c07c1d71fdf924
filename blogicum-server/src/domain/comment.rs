use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Comment {
    pub(crate) id: i64,
    pub(crate) post_id: i64,
    pub(crate) author_id: i64,
    pub(crate) author_username: String,
    pub(crate) text: String,
    pub(crate) is_published: bool,
    pub(crate) created_at: DateTime<Utc>,
}

impl Comment {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        for (field, value) in [
            ("id", self.id),
            ("post_id", self.post_id),
            ("author_id", self.author_id),
        ] {
            if value <= 0 {
                return Err(DomainError::validation(field, "must be > 0"));
            }
        }
        Ok(Self {
            text: normalize_text(&self.text)?,
            ..self
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CommentRequest {
    pub(crate) text: String,
}

impl CommentRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        Ok(Self {
            text: normalize_text(&self.text)?,
        })
    }
}

fn normalize_text(text: &str) -> Result<String, DomainError> {
    let text = text.trim();
    if text.is_empty() || text.chars().count() > 4096 {
        return Err(DomainError::validation("text", "must be 1..4096 chars"));
    }
    Ok(text.to_string())
}
