use axum::{extract::State, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::ToSchema;
use validator::Validate;

use crate::application::profile_service::Profile;
use crate::domain::user::{UpdateProfileRequest, User};
use crate::presentation::AppState;
use crate::presentation::http::app_error::AppResult;
use crate::presentation::http::extract::{Json, Path, Query};
use crate::presentation::http::handlers::auth::UserDto;
use crate::presentation::http::handlers::posts::{PageQuery, PostPageDto};
use crate::presentation::http::middleware::auth::{AuthenticatedUser, Viewer};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub(crate) struct UpdateProfileDto {
    #[validate(length(min = 3, max = 64))]
    pub(crate) username: String,
    #[validate(email)]
    pub(crate) email: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub(crate) first_name: String,
    #[serde(default)]
    #[validate(length(max = 150))]
    pub(crate) last_name: String,
}

/// Профиль без email: его видят все, включая анонимов.
#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct PublicUserDto {
    pub(crate) id: i64,
    pub(crate) username: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub(crate) struct ProfileDto {
    pub(crate) user: PublicUserDto,
    pub(crate) posts: PostPageDto,
    pub(crate) comment_count: i64,
}

impl From<User> for PublicUserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: user.created_at,
        }
    }
}

impl From<Profile> for ProfileDto {
    fn from(profile: Profile) -> Self {
        Self {
            user: profile.user.into(),
            posts: profile.posts.into(),
            comment_count: profile.comment_count,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/profile/{username}",
    tag = "profile",
    params(
        ("username" = String, Path, description = "Username"),
        ("page" = Option<u32>, Query, description = "Page number, starting at 1")
    ),
    responses(
        (status = 200, description = "Profile with the author's posts", body = ProfileDto),
        (status = 401, description = "Invalid token"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn get_profile(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> AppResult<(StatusCode, Json<ProfileDto>)> {
    let profile = state
        .profile_service
        .get_profile(viewer.user_id(), &username, query.page())
        .await?;

    Ok((StatusCode::OK, Json(ProfileDto::from(profile))))
}

#[utoipa::path(
    put,
    path = "/api/profile",
    tag = "profile",
    security(
        ("bearer_auth" = [])
    ),
    request_body = UpdateProfileDto,
    responses(
        (status = 200, description = "Profile updated", body = UserDto),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Username or email already taken"),
        (status = 500, description = "Internal error")
    )
)]
pub(crate) async fn update_profile(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    Json(dto): Json<UpdateProfileDto>,
) -> AppResult<(StatusCode, Json<UserDto>)> {
    dto.validate()?;
    debug!(user_id = auth.user_id, username = %auth.username, "updating profile");

    let req = UpdateProfileRequest {
        username: dto.username,
        email: dto.email,
        first_name: dto.first_name,
        last_name: dto.last_name,
    };
    let user = state.profile_service.update_profile(auth.user_id, req).await?;

    Ok((StatusCode::OK, Json(UserDto::from(user))))
}
