use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CategoryRef {
    pub(crate) id: i64,
    pub(crate) slug: String,
    pub(crate) title: String,
    pub(crate) is_published: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Post {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) pub_date: DateTime<Utc>,
    pub(crate) author_id: i64,
    pub(crate) author_username: String,
    pub(crate) category: Option<CategoryRef>,
    pub(crate) is_published: bool,
    pub(crate) comment_count: i64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

impl Post {
    /// Проверяет инварианты записи, пришедшей из хранилища.
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        validate_positive_i64("id", self.id)?;
        validate_positive_i64("author_id", self.author_id)?;
        if self.comment_count < 0 {
            return Err(DomainError::validation("comment_count", "must be >= 0"));
        }
        if self.updated_at < self.created_at {
            return Err(DomainError::validation("updated_at", "must be >= created_at"));
        }

        Ok(Self {
            title: normalize_title(&self.title)?,
            text: normalize_text(&self.text)?,
            ..self
        })
    }

    /// Пост виден всем: опубликован сам, опубликована его категория и дата публикации наступила.
    pub(crate) fn is_public_at(&self, now: DateTime<Utc>) -> bool {
        self.is_published
            && self
                .category
                .as_ref()
                .is_some_and(|category| category.is_published)
            && self.pub_date <= now
    }

    pub(crate) fn is_visible_to(&self, viewer_id: Option<i64>, now: DateTime<Utc>) -> bool {
        viewer_id == Some(self.author_id) || self.is_public_at(now)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CreatePostRequest {
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) pub_date: Option<DateTime<Utc>>,
    pub(crate) category_id: Option<i64>,
    pub(crate) is_published: bool,
}

impl CreatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        if let Some(category_id) = self.category_id {
            validate_positive_i64("category_id", category_id)?;
        }
        Ok(Self {
            title: normalize_title(&self.title)?,
            text: normalize_text(&self.text)?,
            ..self
        })
    }
}

/// Полная замена редактируемых полей; `pub_date: None` оставляет прежнюю дату.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct UpdatePostRequest {
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) pub_date: Option<DateTime<Utc>>,
    pub(crate) category_id: Option<i64>,
    pub(crate) is_published: bool,
}

impl UpdatePostRequest {
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        if let Some(category_id) = self.category_id {
            validate_positive_i64("category_id", category_id)?;
        }
        Ok(Self {
            title: normalize_title(&self.title)?,
            text: normalize_text(&self.text)?,
            ..self
        })
    }
}

fn validate_positive_i64(field: &'static str, value: i64) -> Result<(), DomainError> {
    if value <= 0 {
        return Err(DomainError::validation(field, "must be > 0"));
    }
    Ok(())
}

fn normalize_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > 256 {
        return Err(DomainError::validation("title", "must be 1..256 chars"));
    }
    Ok(title.to_string())
}

fn normalize_text(text: &str) -> Result<String, DomainError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(DomainError::validation("text", "must not be empty"));
    }
    Ok(text.to_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::{DateTime, Duration, Utc};

    use super::{CategoryRef, CreatePostRequest, DomainError, Post, UpdatePostRequest};

    pub(crate) fn sample_post(id: i64, author_id: i64) -> Post {
        let now = Utc::now();
        Post {
            id,
            title: "Title".to_string(),
            text: "Text".to_string(),
            pub_date: now - Duration::hours(1),
            author_id,
            author_username: format!("user_{author_id}"),
            category: Some(CategoryRef {
                id: 1,
                slug: "travel".to_string(),
                title: "Travel".to_string(),
                is_published: true,
            }),
            is_published: true,
            comment_count: 0,
            created_at: now - Duration::hours(2),
            updated_at: now - Duration::hours(2),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn create_post_request_validate_rejects_empty_title() {
        let req = CreatePostRequest {
            title: "   ".to_string(),
            text: "valid text".to_string(),
            pub_date: None,
            category_id: None,
            is_published: true,
        };

        let err = req.validate().expect_err("title must be rejected");
        assert_validation_field(err, "title");
    }

    #[test]
    fn update_post_request_validate_rejects_empty_text() {
        let req = UpdatePostRequest {
            title: "valid title".to_string(),
            text: "   ".to_string(),
            pub_date: None,
            category_id: Some(1),
            is_published: true,
        };

        let err = req.validate().expect_err("text must be rejected");
        assert_validation_field(err, "text");
    }

    #[test]
    fn create_post_request_validate_rejects_non_positive_category() {
        let req = CreatePostRequest {
            title: "title".to_string(),
            text: "text".to_string(),
            pub_date: None,
            category_id: Some(0),
            is_published: true,
        };

        let err = req.validate().expect_err("category_id must be rejected");
        assert_validation_field(err, "category_id");
    }

    #[test]
    fn create_post_request_validate_normalizes_fields() {
        let req = CreatePostRequest {
            title: "  title  ".to_string(),
            text: "  text  ".to_string(),
            pub_date: None,
            category_id: Some(3),
            is_published: false,
        };

        let validated = req.validate().expect("must validate");
        assert_eq!(validated.title, "title");
        assert_eq!(validated.text, "text");
        assert_eq!(validated.category_id, Some(3));
        assert!(!validated.is_published);
    }

    #[test]
    fn post_validate_rejects_updated_before_created() {
        let mut post = sample_post(1, 10);
        post.updated_at = post.created_at - Duration::seconds(1);

        let err = post.validate().expect_err("updated_at < created_at must fail");
        assert_validation_field(err, "updated_at");
    }

    #[test]
    fn post_validate_rejects_non_positive_author_id() {
        let post = sample_post(1, 0);
        let err = post.validate().expect_err("author_id must be > 0");
        assert_validation_field(err, "author_id");
    }

    #[test]
    fn published_post_in_published_category_is_public() {
        assert!(sample_post(1, 10).is_public_at(now()));
    }

    #[test]
    fn unpublished_post_is_not_public() {
        let mut post = sample_post(1, 10);
        post.is_published = false;
        assert!(!post.is_public_at(now()));
    }

    #[test]
    fn post_in_hidden_category_is_not_public() {
        let mut post = sample_post(1, 10);
        if let Some(category) = post.category.as_mut() {
            category.is_published = false;
        }
        assert!(!post.is_public_at(now()));
    }

    #[test]
    fn post_without_category_is_not_public() {
        let mut post = sample_post(1, 10);
        post.category = None;
        assert!(!post.is_public_at(now()));
    }

    #[test]
    fn scheduled_post_is_not_public_yet() {
        let mut post = sample_post(1, 10);
        post.pub_date = now() + Duration::days(1);
        assert!(!post.is_public_at(now()));
    }

    #[test]
    fn author_sees_own_hidden_post() {
        let mut post = sample_post(1, 10);
        post.is_published = false;
        post.pub_date = now() + Duration::days(1);

        assert!(post.is_visible_to(Some(10), now()));
        assert!(!post.is_visible_to(Some(11), now()));
        assert!(!post.is_visible_to(None, now()));
    }

    fn assert_validation_field(err: DomainError, expected_field: &'static str) {
        match err {
            DomainError::Validation { field, .. } => assert_eq!(field, expected_field),
            _ => panic!("expected DomainError::Validation"),
        }
    }
}
