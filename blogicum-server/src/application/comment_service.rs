use chrono::Utc;
use tracing::info;

use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::post_repository::PostRepository;
use crate::domain::authorship::ensure_author;
use crate::domain::comment::{Comment, CommentRequest};
use crate::domain::error::DomainError;

pub(crate) struct CommentService<P: PostRepository, M: CommentRepository> {
    posts: P,
    comments: M,
}

impl<P: PostRepository, M: CommentRepository> CommentService<P, M> {
    pub(crate) fn new(posts: P, comments: M) -> Self {
        Self { posts, comments }
    }

    /// Комментировать можно только пост, который виден комментатору.
    pub(crate) async fn add_comment(
        &self,
        author_id: i64,
        post_id: i64,
        req: CommentRequest,
    ) -> Result<Comment, DomainError> {
        let req = req.validate()?;
        let post = self
            .posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))?;
        if !post.is_visible_to(Some(author_id), Utc::now()) {
            return Err(DomainError::not_found("post", post_id));
        }

        let comment = self
            .comments
            .create_comment(NewComment {
                post_id: post.id,
                author_id,
                text: req.text,
            })
            .await?;
        info!(comment_id = comment.id, post_id, author_id, "comment added");
        Ok(comment)
    }

    pub(crate) async fn update_comment(
        &self,
        actor_user_id: i64,
        post_id: i64,
        comment_id: i64,
        req: CommentRequest,
    ) -> Result<Comment, DomainError> {
        self.owned_comment(actor_user_id, post_id, comment_id).await?;
        let req = req.validate()?;

        let comment = self
            .comments
            .update_comment_owned(comment_id, actor_user_id, req.text)
            .await?
            .ok_or_else(|| DomainError::not_found("comment", comment_id))?;
        info!(comment_id, post_id, "comment updated");
        Ok(comment)
    }

    pub(crate) async fn delete_comment(
        &self,
        actor_user_id: i64,
        post_id: i64,
        comment_id: i64,
    ) -> Result<(), DomainError> {
        self.owned_comment(actor_user_id, post_id, comment_id).await?;

        if !self.comments.delete_comment(comment_id).await? {
            return Err(DomainError::not_found("comment", comment_id));
        }
        info!(comment_id, post_id, "comment deleted");
        Ok(())
    }

    async fn owned_comment(
        &self,
        actor_user_id: i64,
        post_id: i64,
        comment_id: i64,
    ) -> Result<Comment, DomainError> {
        let comment = self
            .comments
            .get_comment(post_id, comment_id)
            .await?
            .ok_or_else(|| DomainError::not_found("comment", comment_id))?;
        ensure_author(comment.author_id, actor_user_id)?;
        Ok(comment)
    }
}
