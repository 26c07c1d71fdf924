use chrono::Utc;
use tracing::info;

use crate::data::category_repository::CategoryRepository;
use crate::data::comment_repository::CommentRepository;
use crate::data::post_repository::{
    NewPost, Pagination, PostFilter, PostPatch, PostRepository, PostScope,
};
use crate::domain::authorship::ensure_author;
use crate::domain::category::{Category, normalize_slug};
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::post::{CreatePostRequest, Post, UpdatePostRequest};

#[derive(Debug, Clone)]
pub(crate) struct ListPostsResult {
    pub(crate) posts: Vec<Post>,
    pub(crate) page: u32,
    pub(crate) page_size: u32,
    pub(crate) total: i64,
}

#[derive(Debug, Clone)]
pub(crate) struct PostDetail {
    pub(crate) post: Post,
    pub(crate) comments: Vec<Comment>,
}

#[derive(Debug, Clone)]
pub(crate) struct CategoryPosts {
    pub(crate) category: Category,
    pub(crate) posts: ListPostsResult,
}

/// Страница постов по фильтру вместе с общим количеством.
pub(crate) async fn load_page<R: PostRepository>(
    repo: &R,
    filter: PostFilter,
    page: u32,
    page_size: u32,
) -> Result<ListPostsResult, DomainError> {
    let pagination = Pagination::new(page, page_size);
    let posts = repo.list_posts(filter, pagination).await?;
    let total = repo.count_posts(filter).await?;

    Ok(ListPostsResult {
        posts,
        page: pagination.page,
        page_size: pagination.page_size,
        total,
    })
}

pub(crate) struct BlogService<P: PostRepository, C: CategoryRepository, M: CommentRepository> {
    posts: P,
    categories: C,
    comments: M,
    posts_per_page: u32,
}

impl<P, C, M> BlogService<P, C, M>
where
    P: PostRepository,
    C: CategoryRepository,
    M: CommentRepository,
{
    pub(crate) fn new(posts: P, categories: C, comments: M, posts_per_page: u32) -> Self {
        Self {
            posts,
            categories,
            comments,
            posts_per_page,
        }
    }

    pub(crate) async fn list_posts(&self, page: u32) -> Result<ListPostsResult, DomainError> {
        let filter = PostFilter::public(PostScope::All, Utc::now());
        load_page(&self.posts, filter, page, self.posts_per_page).await
    }

    /// Автор видит свой пост всегда, остальные только опубликованный.
    pub(crate) async fn get_post(
        &self,
        viewer_id: Option<i64>,
        post_id: i64,
    ) -> Result<Post, DomainError> {
        let post = self
            .posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))?;

        if !post.is_visible_to(viewer_id, Utc::now()) {
            return Err(DomainError::not_found("post", post_id));
        }
        Ok(post)
    }

    pub(crate) async fn post_detail(
        &self,
        viewer_id: Option<i64>,
        post_id: i64,
    ) -> Result<PostDetail, DomainError> {
        let post = self.get_post(viewer_id, post_id).await?;
        let comments = self.comments.list_for_post(post.id, viewer_id).await?;
        Ok(PostDetail { post, comments })
    }

    pub(crate) async fn list_categories(&self) -> Result<Vec<Category>, DomainError> {
        self.categories.list_published().await
    }

    pub(crate) async fn category_posts(
        &self,
        slug: &str,
        page: u32,
    ) -> Result<CategoryPosts, DomainError> {
        let slug = normalize_slug(slug)?;
        let category = self
            .categories
            .find_published_by_slug(&slug)
            .await?
            .ok_or_else(|| DomainError::not_found("category", &slug))?;

        let filter = PostFilter::public(PostScope::Category(category.id), Utc::now());
        let posts = load_page(&self.posts, filter, page, self.posts_per_page).await?;

        Ok(CategoryPosts { category, posts })
    }

    pub(crate) async fn create_post(
        &self,
        author_id: i64,
        req: CreatePostRequest,
    ) -> Result<Post, DomainError> {
        let req = req.validate()?;

        let new_post = NewPost {
            title: req.title,
            text: req.text,
            pub_date: req.pub_date,
            author_id,
            category_id: req.category_id,
            is_published: req.is_published,
        };
        let post = self.posts.create_post(new_post).await?;
        info!(post_id = post.id, author_id, "post created");
        Ok(post)
    }

    pub(crate) async fn update_post(
        &self,
        actor_user_id: i64,
        post_id: i64,
        req: UpdatePostRequest,
    ) -> Result<Post, DomainError> {
        let original_post = self
            .posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))?;
        ensure_author(original_post.author_id, actor_user_id)?;
        let req = req.validate()?;

        let patch = PostPatch {
            title: req.title,
            text: req.text,
            pub_date: req.pub_date,
            category_id: req.category_id,
            is_published: req.is_published,
        };
        let post = self
            .posts
            .update_post_owned(post_id, actor_user_id, patch)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))?;
        info!(post_id, author_id = actor_user_id, "post updated");
        Ok(post)
    }

    pub(crate) async fn delete_post(
        &self,
        actor_user_id: i64,
        post_id: i64,
    ) -> Result<(), DomainError> {
        let original_post = self
            .posts
            .get_post(post_id)
            .await?
            .ok_or_else(|| DomainError::not_found("post", post_id))?;
        ensure_author(original_post.author_id, actor_user_id)?;

        let deleted = self.posts.delete_post(post_id).await?;
        if !deleted {
            return Err(DomainError::not_found("post", post_id));
        }
        info!(post_id, author_id = actor_user_id, "post deleted");
        Ok(())
    }
}
