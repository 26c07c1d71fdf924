use axum::{
    extract::State,
    http::{StatusCode, header},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::application::blog_service::{ListPostsResult, PostDetail};
use crate::domain::post::{CategoryRef, CreatePostRequest, Post, UpdatePostRequest};
use crate::presentation::AppState;
use crate::presentation::http::app_error::{AppError, AppResult};
use crate::presentation::http::extract::{Json, Path, Query};
use crate::presentation::http::handlers::comments::CommentDto;
use crate::presentation::http::middleware::auth::{AuthenticatedUser, Viewer};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct PostInputDto {
    #[validate(length(min = 1, max = 256))]
    pub(crate) title: String,
    #[validate(length(min = 1))]
    pub(crate) text: String,
    /// Дата публикации; по умолчанию текущий момент при создании и прежняя дата при редактировании.
    pub(crate) pub_date: Option<DateTime<Utc>>,
    #[validate(range(min = 1))]
    pub(crate) category_id: Option<i64>,
    pub(crate) is_published: Option<bool>,
}

impl PostInputDto {
    fn into_create(self) -> CreatePostRequest {
        CreatePostRequest {
            title: self.title,
            text: self.text,
            pub_date: self.pub_date,
            category_id: self.category_id,
            is_published: self.is_published.unwrap_or(true),
        }
    }

    fn into_update(self) -> UpdatePostRequest {
        UpdatePostRequest {
            title: self.title,
            text: self.text,
            pub_date: self.pub_date,
            category_id: self.category_id,
            is_published: self.is_published.unwrap_or(true),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub(crate) struct PageQuery {
    pub(crate) page: Option<u32>,
}

impl PageQuery {
    pub(crate) fn page(&self) -> u32 {
        self.page.unwrap_or(1)
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct CategoryRefDto {
    pub(crate) id: i64,
    pub(crate) slug: String,
    pub(crate) title: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDto {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) text: String,
    pub(crate) pub_date: DateTime<Utc>,
    pub(crate) author_id: i64,
    pub(crate) author_username: String,
    pub(crate) category: Option<CategoryRefDto>,
    pub(crate) is_published: bool,
    pub(crate) comment_count: i64,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostPageDto {
    pub(crate) posts: Vec<PostDto>,
    pub(crate) page: u32,
    pub(crate) page_size: u32,
    pub(crate) total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PostDetailDto {
    pub(crate) post: PostDto,
    pub(crate) comments: Vec<CommentDto>,
}

impl From<CategoryRef> for CategoryRefDto {
    fn from(category: CategoryRef) -> Self {
        Self {
            id: category.id,
            slug: category.slug,
            title: category.title,
        }
    }
}

impl From<Post> for PostDto {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            text: post.text,
            pub_date: post.pub_date,
            author_id: post.author_id,
            author_username: post.author_username,
            category: post.category.map(CategoryRefDto::from),
            is_published: post.is_published,
            comment_count: post.comment_count,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

impl From<ListPostsResult> for PostPageDto {
    fn from(result: ListPostsResult) -> Self {
        Self {
            posts: result.posts.into_iter().map(PostDto::from).collect(),
            page: result.page,
            page_size: result.page_size,
            total: result.total,
        }
    }
}

impl From<PostDetail> for PostDetailDto {
    fn from(detail: PostDetail) -> Self {
        Self {
            post: detail.post.into(),
            comments: detail.comments.into_iter().map(CommentDto::from).collect(),
        }
    }
}

pub(crate) fn post_location(post_id: i64) -> String {
    format!("/api/posts/{post_id}")
}

#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "posts",
    params(
        ("page" = Option<u32>, Query, description = "Page number, starting at 1")
    ),
    responses(
        (status = 200, description = "Published posts, newest first", body = PostPageDto),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<(StatusCode, Json<PostPageDto>)> {
    let result = state.blog_service.list_posts(query.page()).await?;

    Ok((StatusCode::OK, Json(PostPageDto::from(result))))
}

#[utoipa::path(
    get,
    path = "/api/posts/{post_id}",
    tag = "posts",
    params(
        ("post_id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 200, description = "Post with its comments", body = PostDetailDto),
        (status = 401, description = "Invalid token"),
        (status = 404, description = "Post not found or hidden"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_post(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(post_id): Path<i64>,
) -> AppResult<(StatusCode, Json<PostDetailDto>)> {
    let detail = state
        .blog_service
        .post_detail(viewer.user_id(), post_id)
        .await?;

    Ok((StatusCode::OK, Json(PostDetailDto::from(detail))))
}

#[utoipa::path(
    post,
    path = "/api/posts",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    request_body = PostInputDto,
    responses(
        (status = 201, description = "Post created", body = PostDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Category not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn create_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(dto): Json<PostInputDto>,
) -> AppResult<(StatusCode, [(header::HeaderName, String); 1], Json<PostDto>)> {
    dto.validate()?;

    let post = state
        .blog_service
        .create_post(auth.user_id, dto.into_create())
        .await?;
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, post_location(post.id))],
        Json(PostDto::from(post)),
    ))
}

#[utoipa::path(
    put,
    path = "/api/posts/{post_id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("post_id" = i64, Path, description = "Post id")
    ),
    request_body = PostInputDto,
    responses(
        (status = 200, description = "Post updated", body = PostDto),
        (status = 303, description = "Not the author; Location points to the post"),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(post_id): Path<i64>,
    Json(dto): Json<PostInputDto>,
) -> AppResult<(StatusCode, Json<PostDto>)> {
    // Тело проверяет сервис, уже после проверки авторства.
    let post = state
        .blog_service
        .update_post(auth.user_id, post_id, dto.into_update())
        .await
        .map_err(AppError::forbidden_redirects_to(post_location(post_id)))?;
    Ok((StatusCode::OK, Json(PostDto::from(post))))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{post_id}",
    tag = "posts",
    security(
        ("bearer_auth" = [])
    ),
    params(
        ("post_id" = i64, Path, description = "Post id")
    ),
    responses(
        (status = 204, description = "Post deleted"),
        (status = 303, description = "Not the author; Location points to the post"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Post not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn delete_post(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Path(post_id): Path<i64>,
) -> AppResult<StatusCode> {
    state
        .blog_service
        .delete_post(auth.user_id, post_id)
        .await
        .map_err(AppError::forbidden_redirects_to(post_location(post_id)))?;
    Ok(StatusCode::NO_CONTENT)
}
