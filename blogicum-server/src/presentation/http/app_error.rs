use crate::domain::error::DomainError;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid json body: {0}")]
    JsonBody(#[from] JsonRejection),

    #[error("invalid query string: {0}")]
    QueryString(#[from] QueryRejection),

    #[error("invalid path: {0}")]
    PathParams(#[from] PathRejection),

    #[error("unauthorized")]
    Unauthorized,

    #[error("redirect to {0}")]
    RedirectTo(String),

    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

pub(crate) type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Чужая попытка изменить ресурс отправляет клиента на страницу ресурса.
    pub(crate) fn forbidden_redirects_to(
        location: impl Into<String>,
    ) -> impl FnOnce(DomainError) -> AppError {
        let location = location.into();
        move |err| match err {
            DomainError::Forbidden => AppError::RedirectTo(location),
            other => AppError::Domain(other),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, msg) = match self {
            AppError::RedirectTo(location) => return redirect_response(location),
            AppError::Domain(err) => match &err {
                DomainError::Validation { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
                DomainError::AlreadyExists(_) => (StatusCode::CONFLICT, err.to_string()),
                DomainError::InvalidCredentials => (StatusCode::UNAUTHORIZED, err.to_string()),
                DomainError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
                DomainError::Forbidden => (StatusCode::FORBIDDEN, err.to_string()),
                DomainError::Unexpected(details) => {
                    error!(%details, "unexpected domain error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "internal error".to_string(),
                    )
                }
            },
            AppError::Validation(err) => (StatusCode::BAD_REQUEST, err.to_string()),
            AppError::JsonBody(rejection) => (StatusCode::BAD_REQUEST, rejection.body_text()),
            AppError::QueryString(rejection) => (StatusCode::BAD_REQUEST, rejection.body_text()),
            AppError::PathParams(rejection) => (StatusCode::BAD_REQUEST, rejection.body_text()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "unauthorized".to_string()),
            AppError::Internal(err) => {
                error!(error = %err, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
        };

        (
            status,
            Json(ErrorBody {
                error: msg,
                location: None,
            }),
        )
            .into_response()
    }
}

fn redirect_response(location: String) -> Response {
    let body = ErrorBody {
        error: "forbidden".to_string(),
        location: Some(location.clone()),
    };
    (StatusCode::SEE_OTHER, [(header::LOCATION, location)], Json(body)).into_response()
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use axum::http::{StatusCode, header};
    use axum::response::IntoResponse;

    use super::AppError;
    use crate::domain::error::DomainError;

    #[tokio::test]
    async fn forbidden_becomes_redirect_to_detail() {
        let err = AppError::forbidden_redirects_to("/api/posts/7")(DomainError::Forbidden);
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response
                .headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok()),
            Some("/api/posts/7")
        );

        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body must be readable");
        let json: serde_json::Value = serde_json::from_slice(&body).expect("body must be json");
        assert_eq!(json["location"], "/api/posts/7");
    }

    #[test]
    fn other_errors_pass_through_redirect_mapper() {
        let err = AppError::forbidden_redirects_to("/api/posts/7")(DomainError::NotFound(
            "post 7".to_string(),
        ));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn domain_errors_map_to_status_codes() {
        let cases = [
            (
                DomainError::Validation {
                    field: "title",
                    message: "must not be empty",
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                DomainError::AlreadyExists("username".to_string()),
                StatusCode::CONFLICT,
            ),
            (DomainError::InvalidCredentials, StatusCode::UNAUTHORIZED),
            (DomainError::Forbidden, StatusCode::FORBIDDEN),
            (
                DomainError::Unexpected("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).into_response().status(), status);
        }
    }
}
