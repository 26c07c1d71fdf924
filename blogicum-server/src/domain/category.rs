use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Category {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) slug: String,
    pub(crate) is_published: bool,
    pub(crate) created_at: DateTime<Utc>,
}

impl Category {
    pub(crate) fn new(
        id: i64,
        title: impl Into<String>,
        description: impl Into<String>,
        slug: impl Into<String>,
        is_published: bool,
        created_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        if id <= 0 {
            return Err(DomainError::validation("id", "must be > 0"));
        }
        let slug = slug.into();
        if !is_valid_slug(&slug) {
            return Err(DomainError::validation(
                "slug",
                "must contain only latin letters, digits, '-' and '_'",
            ));
        }
        let title = title.into().trim().to_string();
        if title.is_empty() || title.chars().count() > 256 {
            return Err(DomainError::validation("title", "must be 1..256 chars"));
        }

        Ok(Self {
            id,
            title,
            description: description.into(),
            slug,
            is_published,
            created_at,
        })
    }
}

/// Нормализует slug из URL: пустые и некорректные значения отсекаются до похода в БД.
pub(crate) fn normalize_slug(raw: &str) -> Result<String, DomainError> {
    let slug = raw.trim();
    if !is_valid_slug(slug) {
        return Err(DomainError::not_found("category", raw));
    }
    Ok(slug.to_string())
}

fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= 64
        && slug
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::{Category, normalize_slug};
    use crate::domain::error::DomainError;

    #[test]
    fn category_new_rejects_bad_slug() {
        let err = Category::new(1, "Travel", "", "with space", true, Utc::now())
            .expect_err("slug must be rejected");
        assert!(matches!(err, DomainError::Validation { field: "slug", .. }));
    }

    #[test]
    fn category_new_trims_title() {
        let category = Category::new(1, "  Travel ", "about trips", "travel", true, Utc::now())
            .expect("category must be valid");
        assert_eq!(category.title, "Travel");
        assert_eq!(category.slug, "travel");
    }

    #[test]
    fn normalize_slug_maps_garbage_to_not_found() {
        assert!(matches!(
            normalize_slug("../etc"),
            Err(DomainError::NotFound(_))
        ));
        assert_eq!(normalize_slug(" travel ").expect("valid slug"), "travel");
    }
}
