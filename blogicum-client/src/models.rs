use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Учётная запись текущего пользователя.
pub struct User {
    /// Идентификатор пользователя.
    pub id: i64,
    /// Логин.
    pub username: String,
    /// Email.
    pub email: String,
    /// Имя.
    pub first_name: String,
    /// Фамилия.
    pub last_name: String,
    /// Дата и время регистрации (UTC).
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Публичная часть профиля, без email.
pub struct PublicUser {
    /// Идентификатор пользователя.
    pub id: i64,
    /// Логин.
    pub username: String,
    /// Имя.
    pub first_name: String,
    /// Фамилия.
    pub last_name: String,
    /// Дата и время регистрации (UTC).
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Ответ после успешной регистрации или входа.
pub struct AuthResponse {
    /// JWT access token.
    pub access_token: String,
    /// Данные пользователя.
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Краткие сведения о категории внутри поста.
pub struct CategoryRef {
    /// Идентификатор категории.
    pub id: i64,
    /// Слаг категории.
    pub slug: String,
    /// Название категории.
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Пост блога.
pub struct Post {
    /// Идентификатор поста.
    pub id: i64,
    /// Заголовок.
    pub title: String,
    /// Текст поста.
    pub text: String,
    /// Дата публикации; пост в будущем виден только автору.
    pub pub_date: DateTime<Utc>,
    /// Идентификатор автора.
    pub author_id: i64,
    /// Логин автора.
    pub author_username: String,
    /// Категория, если задана.
    pub category: Option<CategoryRef>,
    /// Флаг публикации.
    pub is_published: bool,
    /// Количество опубликованных комментариев.
    pub comment_count: i64,
    /// Дата и время создания (UTC).
    pub created_at: DateTime<Utc>,
    /// Дата и время последнего изменения (UTC).
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Страница постов.
pub struct PostPage {
    /// Посты текущей страницы, новые первыми.
    pub posts: Vec<Post>,
    /// Номер страницы, начиная с 1.
    pub page: u32,
    /// Размер страницы.
    pub page_size: u32,
    /// Общее количество постов в выборке.
    pub total: i64,
}

impl PostPage {
    /// Количество страниц в выборке.
    pub fn page_count(&self) -> u32 {
        if self.page_size == 0 || self.total <= 0 {
            return 0;
        }
        let total = self.total as u64;
        total.div_ceil(u64::from(self.page_size)) as u32
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Комментарий к посту.
pub struct Comment {
    /// Идентификатор комментария.
    pub id: i64,
    /// Идентификатор поста.
    pub post_id: i64,
    /// Идентификатор автора.
    pub author_id: i64,
    /// Логин автора.
    pub author_username: String,
    /// Текст комментария.
    pub text: String,
    /// Флаг публикации.
    pub is_published: bool,
    /// Дата и время создания (UTC).
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Пост вместе с комментариями.
pub struct PostDetail {
    /// Пост.
    pub post: Post,
    /// Комментарии в порядке создания.
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Категория постов.
pub struct Category {
    /// Идентификатор категории.
    pub id: i64,
    /// Название.
    pub title: String,
    /// Описание.
    pub description: String,
    /// Слаг для адреса.
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Категория и страница её постов.
pub struct CategoryPage {
    /// Категория.
    pub category: Category,
    /// Страница постов категории.
    pub posts: PostPage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Профиль пользователя.
pub struct Profile {
    /// Публичные данные пользователя.
    pub user: PublicUser,
    /// Страница постов пользователя.
    pub posts: PostPage,
    /// Количество опубликованных комментариев к постам пользователя.
    pub comment_count: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// Данные для создания или редактирования поста.
pub struct PostInput {
    /// Заголовок.
    pub title: String,
    /// Текст поста.
    pub text: String,
    /// Дата публикации; `None` оставляет выбор серверу.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<DateTime<Utc>>,
    /// Идентификатор категории.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<i64>,
    /// Флаг публикации; по умолчанию сервер публикует пост.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
/// Новые данные профиля.
pub struct ProfileInput {
    /// Логин.
    pub username: String,
    /// Email.
    pub email: String,
    /// Имя.
    pub first_name: String,
    /// Фамилия.
    pub last_name: String,
}
