use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
/// Ошибки клиентской библиотеки `blogicum-client`.
pub enum BlogicumClientError {
    /// Ошибка HTTP-транспорта (`reqwest`).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Требуется авторизация (отсутствует/некорректен токен).
    #[error("unauthorized")]
    Unauthorized,

    /// Действие над чужим постом или комментарием; сервер отправляет на страницу поста.
    #[error("forbidden, see {location}")]
    Forbidden {
        /// Адрес страницы, куда сервер перенаправил запрос.
        location: String,
    },

    /// Запрошенный ресурс не найден или скрыт от текущего пользователя.
    #[error("not found")]
    NotFound,

    /// Имя пользователя или email уже заняты.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Некорректный запрос или ошибка валидации.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

/// Результат операций `blogicum-client`.
pub type BlogicumClientResult<T> = Result<T, BlogicumClientError>;

impl BlogicumClientError {
    pub(crate) fn from_http_status(
        status: StatusCode,
        message: Option<String>,
        location: Option<String>,
    ) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            StatusCode::SEE_OTHER | StatusCode::FORBIDDEN => Self::Forbidden {
                location: location.unwrap_or_default(),
            },
            StatusCode::NOT_FOUND => Self::NotFound,
            StatusCode::CONFLICT => {
                Self::Conflict(message.unwrap_or_else(|| format!("http status {status}")))
            }
            _ => {
                let message = message.unwrap_or_else(|| format!("http status {status}"));
                Self::InvalidRequest(message)
            }
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::from_http_status(status, None, None);
        }
        Self::Http(err)
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::BlogicumClientError;

    #[test]
    fn see_other_carries_location() {
        let err = BlogicumClientError::from_http_status(
            StatusCode::SEE_OTHER,
            Some("forbidden".to_string()),
            Some("/api/posts/3".to_string()),
        );
        assert!(matches!(
            err,
            BlogicumClientError::Forbidden { ref location } if location == "/api/posts/3"
        ));
    }

    #[test]
    fn statuses_map_to_variants() {
        assert!(matches!(
            BlogicumClientError::from_http_status(StatusCode::UNAUTHORIZED, None, None),
            BlogicumClientError::Unauthorized
        ));
        assert!(matches!(
            BlogicumClientError::from_http_status(StatusCode::NOT_FOUND, None, None),
            BlogicumClientError::NotFound
        ));
        assert!(matches!(
            BlogicumClientError::from_http_status(
                StatusCode::CONFLICT,
                Some("username already exists".to_string()),
                None
            ),
            BlogicumClientError::Conflict(ref msg) if msg == "username already exists"
        ));
    }

    #[test]
    fn unknown_status_keeps_server_message() {
        let err = BlogicumClientError::from_http_status(
            StatusCode::BAD_REQUEST,
            Some("title: must not be empty".to_string()),
            None,
        );
        assert_eq!(err.to_string(), "invalid request: title: must not be empty");
    }
}
