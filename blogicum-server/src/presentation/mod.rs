use sqlx::PgPool;
use std::sync::Arc;

use crate::application::auth_service::AuthService;
use crate::application::blog_service::BlogService;
use crate::application::comment_service::CommentService;
use crate::application::profile_service::ProfileService;
use crate::data::repositories::postgres::category_repository::PostgresCategoryRepository;
use crate::data::repositories::postgres::comment_repository::PostgresCommentRepository;
use crate::data::repositories::postgres::post_repository::PostgresPostRepository;
use crate::data::repositories::postgres::user_repository::PostgresUserRepository;
use crate::infrastructure::jwt::JwtService;
use crate::infrastructure::password::PasswordService;
use crate::infrastructure::settings::Settings;

pub(crate) mod http;

pub(crate) type PgAuthService = AuthService<PostgresUserRepository>;
pub(crate) type PgBlogService =
    BlogService<PostgresPostRepository, PostgresCategoryRepository, PostgresCommentRepository>;
pub(crate) type PgCommentService = CommentService<PostgresPostRepository, PostgresCommentRepository>;
pub(crate) type PgProfileService = ProfileService<PostgresUserRepository, PostgresPostRepository>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) pool: PgPool,
    pub(crate) auth_service: Arc<PgAuthService>,
    pub(crate) blog_service: Arc<PgBlogService>,
    pub(crate) comment_service: Arc<PgCommentService>,
    pub(crate) profile_service: Arc<PgProfileService>,
    pub(crate) jwt: Arc<JwtService>,
}

impl AppState {
    pub(crate) fn new(pool: PgPool, settings: &Settings) -> anyhow::Result<Self> {
        let jwt = Arc::new(JwtService::new(
            &settings.jwt_secret,
            settings.jwt_ttl_seconds,
        ));
        let users = PostgresUserRepository::new(pool.clone());
        let posts = PostgresPostRepository::new(pool.clone());
        let categories = PostgresCategoryRepository::new(pool.clone());
        let comments = PostgresCommentRepository::new(pool.clone());

        let auth_service = AuthService::new(users.clone(), PasswordService::new()?, jwt.clone());
        let blog_service = BlogService::new(
            posts.clone(),
            categories,
            comments.clone(),
            settings.posts_per_page,
        );
        let comment_service = CommentService::new(posts.clone(), comments);
        let profile_service = ProfileService::new(users, posts, settings.posts_per_page);

        Ok(Self {
            pool,
            auth_service: Arc::new(auth_service),
            blog_service: Arc::new(blog_service),
            comment_service: Arc::new(comment_service),
            profile_service: Arc::new(profile_service),
            jwt,
        })
    }
}
