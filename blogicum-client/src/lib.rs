//! Клиентская библиотека для работы с blogicum-server по HTTP.
//!
//! `BlogicumClient` хранит JWT-токен после `register`/`login` и автоматически
//! использует его: в защищённых операциях обязательно, в публичных чтениях
//! если он есть, чтобы автор видел свои скрытые посты.
#![warn(missing_docs)]

mod error;
mod http_client;
mod models;

pub use error::{BlogicumClientError, BlogicumClientResult};
pub use http_client::HttpClient;
pub use models::{
    AuthResponse, Category, CategoryPage, CategoryRef, Comment, Post, PostDetail, PostInput,
    PostPage, Profile, ProfileInput, PublicUser, User,
};

#[derive(Debug, Clone)]
/// Клиент блога с сохранённым токеном.
pub struct BlogicumClient {
    http: HttpClient,
    token: Option<String>,
}

impl BlogicumClient {
    /// Создаёт клиент для сервера по базовому URL, например `http://127.0.0.1:8080`.
    pub fn new(base_url: impl Into<String>) -> BlogicumClientResult<Self> {
        Ok(Self {
            http: HttpClient::new(base_url)?,
            token: None,
        })
    }

    /// Устанавливает JWT-токен вручную.
    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    /// Возвращает текущий JWT-токен, если он установлен.
    pub fn get_token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Очищает сохранённый JWT-токен.
    pub fn clear_token(&mut self) {
        self.token = None;
    }

    /// Регистрирует пользователя и сохраняет полученный JWT-токен в клиенте.
    pub async fn register(
        &mut self,
        username: &str,
        email: &str,
        password: &str,
    ) -> BlogicumClientResult<AuthResponse> {
        let result = self.http.register(username, email, password).await?;
        self.token = Some(result.access_token.clone());
        Ok(result)
    }

    /// Выполняет вход пользователя и сохраняет полученный JWT-токен в клиенте.
    pub async fn login(&mut self, username: &str, password: &str) -> BlogicumClientResult<AuthResponse> {
        let result = self.http.login(username, password).await?;
        self.token = Some(result.access_token.clone());
        Ok(result)
    }

    /// Возвращает страницу главной ленты.
    pub async fn list_posts(&self, page: u32) -> BlogicumClientResult<PostPage> {
        self.http.list_posts(self.get_token(), page).await
    }

    /// Возвращает пост с комментариями.
    pub async fn get_post(&self, id: i64) -> BlogicumClientResult<PostDetail> {
        self.http.get_post(self.get_token(), id).await
    }

    /// Создаёт новый пост.
    ///
    /// Требует установленный JWT-токен.
    pub async fn create_post(&self, input: &PostInput) -> BlogicumClientResult<Post> {
        self.http.create_post(self.require_token()?, input).await
    }

    /// Редактирует пост.
    ///
    /// Для чужого поста возвращает [`BlogicumClientError::Forbidden`].
    pub async fn update_post(&self, id: i64, input: &PostInput) -> BlogicumClientResult<Post> {
        self.http.update_post(self.require_token()?, id, input).await
    }

    /// Удаляет пост.
    ///
    /// Для чужого поста возвращает [`BlogicumClientError::Forbidden`].
    pub async fn delete_post(&self, id: i64) -> BlogicumClientResult<()> {
        self.http.delete_post(self.require_token()?, id).await
    }

    /// Добавляет комментарий к посту.
    pub async fn add_comment(&self, post_id: i64, text: &str) -> BlogicumClientResult<Comment> {
        self.http
            .add_comment(self.require_token()?, post_id, text)
            .await
    }

    /// Редактирует комментарий.
    pub async fn update_comment(
        &self,
        post_id: i64,
        comment_id: i64,
        text: &str,
    ) -> BlogicumClientResult<Comment> {
        self.http
            .update_comment(self.require_token()?, post_id, comment_id, text)
            .await
    }

    /// Удаляет комментарий.
    pub async fn delete_comment(&self, post_id: i64, comment_id: i64) -> BlogicumClientResult<()> {
        self.http
            .delete_comment(self.require_token()?, post_id, comment_id)
            .await
    }

    /// Возвращает опубликованные категории.
    pub async fn list_categories(&self) -> BlogicumClientResult<Vec<Category>> {
        self.http.list_categories().await
    }

    /// Возвращает категорию и страницу её постов.
    pub async fn category_posts(&self, slug: &str, page: u32) -> BlogicumClientResult<CategoryPage> {
        self.http.category_posts(slug, page).await
    }

    /// Возвращает профиль пользователя.
    pub async fn get_profile(&self, username: &str, page: u32) -> BlogicumClientResult<Profile> {
        self.http.get_profile(self.get_token(), username, page).await
    }

    /// Обновляет профиль текущего пользователя.
    pub async fn update_profile(&self, input: &ProfileInput) -> BlogicumClientResult<User> {
        self.http.update_profile(self.require_token()?, input).await
    }

    fn require_token(&self) -> BlogicumClientResult<&str> {
        self.token.as_deref().ok_or(BlogicumClientError::Unauthorized)
    }
}
