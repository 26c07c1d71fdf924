use chrono::Utc;
use tracing::info;

use crate::application::blog_service::{ListPostsResult, load_page};
use crate::data::post_repository::{PostFilter, PostRepository, PostScope};
use crate::data::user_repository::{ProfilePatch, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::user::{UpdateProfileRequest, User};

#[derive(Debug, Clone)]
pub(crate) struct Profile {
    pub(crate) user: User,
    pub(crate) posts: ListPostsResult,
    pub(crate) comment_count: i64,
}

pub(crate) struct ProfileService<U: UserRepository, P: PostRepository> {
    users: U,
    posts: P,
    posts_per_page: u32,
}

impl<U: UserRepository, P: PostRepository> ProfileService<U, P> {
    pub(crate) fn new(users: U, posts: P, posts_per_page: u32) -> Self {
        Self {
            users,
            posts,
            posts_per_page,
        }
    }

    /// Владелец профиля видит все свои посты, остальные только опубликованные.
    pub(crate) async fn get_profile(
        &self,
        viewer_id: Option<i64>,
        username: &str,
        page: u32,
    ) -> Result<Profile, DomainError> {
        let user = self
            .users
            .find_profile(username.trim())
            .await?
            .ok_or_else(|| DomainError::not_found("user", username))?;

        let scope = PostScope::Author(user.id);
        let filter = if viewer_id == Some(user.id) {
            PostFilter::unfiltered(scope)
        } else {
            PostFilter::public(scope, Utc::now())
        };
        let posts = load_page(&self.posts, filter, page, self.posts_per_page).await?;
        let comment_count = self
            .posts
            .count_published_comments_for_author(user.id)
            .await?;

        Ok(Profile {
            user,
            posts,
            comment_count,
        })
    }

    pub(crate) async fn update_profile(
        &self,
        user_id: i64,
        req: UpdateProfileRequest,
    ) -> Result<User, DomainError> {
        let req = req.validate()?;
        let patch = ProfilePatch {
            username: req.username,
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
        };

        let user = self
            .users
            .update_profile(user_id, patch)
            .await?
            .ok_or_else(|| DomainError::not_found("user", user_id))?;
        info!(user_id, username = %user.username, "profile updated");
        Ok(user)
    }
}
