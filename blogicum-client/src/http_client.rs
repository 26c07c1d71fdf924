use reqwest::{Client, Method, RequestBuilder, Response, header, redirect};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;

use crate::error::{BlogicumClientError, BlogicumClientResult};
use crate::models::{
    AuthResponse, Category, CategoryPage, Comment, PostDetail, Post, PostInput, PostPage,
    Profile, ProfileInput, User,
};

#[derive(Debug, Serialize)]
struct RegisterRequestDto<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct LoginRequestDto<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct CommentRequestDto<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorResponseDto {
    error: Option<String>,
    location: Option<String>,
}

#[derive(Serialize)]
struct PageQuery {
    page: u32,
}

#[derive(Debug, Clone)]
/// HTTP-клиент для работы с REST API `blogicum-server`.
pub struct HttpClient {
    base_url: String,
    client: Client,
}

impl HttpClient {
    /// Создаёт новый HTTP-клиент с базовым URL сервера.
    ///
    /// Редиректы не выполняются: ответ `303` на чужой пост превращается в
    /// [`BlogicumClientError::Forbidden`].
    pub fn new(base_url: impl Into<String>) -> BlogicumClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(15))
            .redirect(redirect::Policy::none())
            .build()?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let request = self.client.request(method, self.endpoint(path));
        match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn decode_error(response: Response) -> BlogicumClientError {
        let status = response.status();
        let header_location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let (message, body_location) = match response.json::<ErrorResponseDto>().await {
            Ok(body) => (body.error, body.location),
            Err(_) => (None, None),
        };
        BlogicumClientError::from_http_status(
            status,
            message,
            header_location.or(body_location),
        )
    }

    async fn send(request: RequestBuilder) -> BlogicumClientResult<Response> {
        let response = request
            .send()
            .await
            .map_err(BlogicumClientError::from_reqwest)?;
        if !response.status().is_success() {
            return Err(Self::decode_error(response).await);
        }
        Ok(response)
    }

    /// отправляет запрос и разбирает json-ответ
    async fn fetch<TRes: DeserializeOwned>(request: RequestBuilder) -> BlogicumClientResult<TRes> {
        Self::send(request)
            .await?
            .json::<TRes>()
            .await
            .map_err(BlogicumClientError::from_reqwest)
    }

    /// Регистрирует пользователя и возвращает JWT + данные пользователя.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> BlogicumClientResult<AuthResponse> {
        let payload = RegisterRequestDto {
            username,
            email,
            password,
        };
        Self::fetch(
            self.request(Method::POST, "/api/auth/register", None)
                .json(&payload),
        )
        .await
    }

    /// Выполняет вход пользователя и возвращает JWT + данные пользователя.
    pub async fn login(&self, username: &str, password: &str) -> BlogicumClientResult<AuthResponse> {
        let payload = LoginRequestDto { username, password };
        Self::fetch(self.request(Method::POST, "/api/auth/login", None).json(&payload)).await
    }

    /// Главная лента: опубликованные посты, новые первыми.
    pub async fn list_posts(&self, token: Option<&str>, page: u32) -> BlogicumClientResult<PostPage> {
        Self::fetch(
            self.request(Method::GET, "/api/posts", token)
                .query(&PageQuery { page }),
        )
        .await
    }

    /// Пост с комментариями; автор видит и свои скрытые посты.
    pub async fn get_post(&self, token: Option<&str>, id: i64) -> BlogicumClientResult<PostDetail> {
        Self::fetch(self.request(Method::GET, &format!("/api/posts/{id}"), token)).await
    }

    /// Создаёт пост. Требует валидный JWT-токен.
    pub async fn create_post(&self, token: &str, input: &PostInput) -> BlogicumClientResult<Post> {
        Self::fetch(
            self.request(Method::POST, "/api/posts", Some(token))
                .json(input),
        )
        .await
    }

    /// Редактирует пост. Только для автора.
    pub async fn update_post(
        &self,
        token: &str,
        id: i64,
        input: &PostInput,
    ) -> BlogicumClientResult<Post> {
        Self::fetch(
            self.request(Method::PUT, &format!("/api/posts/{id}"), Some(token))
                .json(input),
        )
        .await
    }

    /// Удаляет пост вместе с комментариями. Только для автора.
    pub async fn delete_post(&self, token: &str, id: i64) -> BlogicumClientResult<()> {
        Self::send(self.request(Method::DELETE, &format!("/api/posts/{id}"), Some(token))).await?;
        Ok(())
    }

    /// Добавляет комментарий к посту.
    pub async fn add_comment(
        &self,
        token: &str,
        post_id: i64,
        text: &str,
    ) -> BlogicumClientResult<Comment> {
        Self::fetch(
            self.request(
                Method::POST,
                &format!("/api/posts/{post_id}/comments"),
                Some(token),
            )
            .json(&CommentRequestDto { text }),
        )
        .await
    }

    /// Редактирует комментарий. Только для автора.
    pub async fn update_comment(
        &self,
        token: &str,
        post_id: i64,
        comment_id: i64,
        text: &str,
    ) -> BlogicumClientResult<Comment> {
        Self::fetch(
            self.request(
                Method::PUT,
                &format!("/api/posts/{post_id}/comments/{comment_id}"),
                Some(token),
            )
            .json(&CommentRequestDto { text }),
        )
        .await
    }

    /// Удаляет комментарий. Только для автора.
    pub async fn delete_comment(
        &self,
        token: &str,
        post_id: i64,
        comment_id: i64,
    ) -> BlogicumClientResult<()> {
        Self::send(self.request(
            Method::DELETE,
            &format!("/api/posts/{post_id}/comments/{comment_id}"),
            Some(token),
        ))
        .await?;
        Ok(())
    }

    /// Опубликованные категории.
    pub async fn list_categories(&self) -> BlogicumClientResult<Vec<Category>> {
        Self::fetch(self.request(Method::GET, "/api/categories", None)).await
    }

    /// Категория и страница её опубликованных постов.
    pub async fn category_posts(&self, slug: &str, page: u32) -> BlogicumClientResult<CategoryPage> {
        Self::fetch(
            self.request(Method::GET, &format!("/api/categories/{slug}"), None)
                .query(&PageQuery { page }),
        )
        .await
    }

    /// Профиль пользователя; владелец видит все свои посты.
    pub async fn get_profile(
        &self,
        token: Option<&str>,
        username: &str,
        page: u32,
    ) -> BlogicumClientResult<Profile> {
        Self::fetch(
            self.request(Method::GET, &format!("/api/profile/{username}"), token)
                .query(&PageQuery { page }),
        )
        .await
    }

    /// Обновляет профиль текущего пользователя.
    pub async fn update_profile(
        &self,
        token: &str,
        input: &ProfileInput,
    ) -> BlogicumClientResult<User> {
        Self::fetch(
            self.request(Method::PUT, "/api/profile", Some(token))
                .json(input),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_normalizes_slashes() {
        let client = HttpClient::new("http://localhost:8080/").expect("client must build");
        let full = client.endpoint("/api/posts");
        assert_eq!(full, "http://localhost:8080/api/posts");
    }

    #[test]
    fn request_carries_bearer_token() {
        let client = HttpClient::new("http://localhost:8080").expect("client must build");
        let request = client
            .request(Method::DELETE, "/api/posts/1", Some("abc"))
            .build()
            .expect("request must build");

        assert_eq!(request.url().as_str(), "http://localhost:8080/api/posts/1");
        assert_eq!(
            request
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok()),
            Some("Bearer abc")
        );
    }

    #[test]
    fn anonymous_request_has_no_authorization() {
        let client = HttpClient::new("http://localhost:8080").expect("client must build");
        let request = client
            .request(Method::GET, "/api/posts", None)
            .query(&PageQuery { page: 2 })
            .build()
            .expect("request must build");

        assert!(request.headers().get(header::AUTHORIZATION).is_none());
        assert_eq!(request.url().query(), Some("page=2"));
    }
}
