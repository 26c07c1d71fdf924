use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::presentation::http::handlers::auth::{AuthResponseDto, LoginDto, RegisterDto, UserDto};
use crate::presentation::http::handlers::categories::{CategoryDto, CategoryPageDto};
use crate::presentation::http::handlers::comments::{CommentDto, CommentInputDto};
use crate::presentation::http::handlers::posts::{
    CategoryRefDto, PageQuery, PostDetailDto, PostDto, PostInputDto, PostPageDto,
};
use crate::presentation::http::handlers::profiles::{ProfileDto, PublicUserDto, UpdateProfileDto};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::presentation::http::handlers::auth::register,
        crate::presentation::http::handlers::auth::login,
        crate::presentation::http::handlers::posts::list_posts,
        crate::presentation::http::handlers::posts::get_post,
        crate::presentation::http::handlers::posts::create_post,
        crate::presentation::http::handlers::posts::update_post,
        crate::presentation::http::handlers::posts::delete_post,
        crate::presentation::http::handlers::comments::add_comment,
        crate::presentation::http::handlers::comments::update_comment,
        crate::presentation::http::handlers::comments::delete_comment,
        crate::presentation::http::handlers::categories::list_categories,
        crate::presentation::http::handlers::categories::category_posts,
        crate::presentation::http::handlers::profiles::get_profile,
        crate::presentation::http::handlers::profiles::update_profile
    ),
    components(
        schemas(
            RegisterDto,
            LoginDto,
            AuthResponseDto,
            UserDto,
            PublicUserDto,
            UpdateProfileDto,
            ProfileDto,
            PostInputDto,
            PageQuery,
            CategoryRefDto,
            PostDto,
            PostPageDto,
            PostDetailDto,
            CommentInputDto,
            CommentDto,
            CategoryDto,
            CategoryPageDto
        )
    ),
    tags(
        (name = "auth", description = "Registration and login"),
        (name = "posts", description = "Posts and the public feed"),
        (name = "comments", description = "Comments under posts"),
        (name = "categories", description = "Published categories"),
        (name = "profile", description = "User profiles")
    ),
    modifiers(&SecurityAddon)
)]
pub(crate) struct ApiDoc;

pub(crate) struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut components = openapi.components.take().unwrap_or_default();
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
        openapi.components = Some(components);
    }
}

#[cfg(test)]
mod tests {
    use utoipa::OpenApi;

    use super::ApiDoc;

    #[test]
    fn document_lists_every_endpoint() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&str> = doc.paths.paths.keys().map(String::as_str).collect();

        for expected in [
            "/api/auth/register",
            "/api/auth/login",
            "/api/posts",
            "/api/posts/{post_id}",
            "/api/posts/{post_id}/comments",
            "/api/posts/{post_id}/comments/{comment_id}",
            "/api/categories",
            "/api/categories/{slug}",
            "/api/profile/{username}",
            "/api/profile",
        ] {
            assert!(paths.contains(&expected), "missing path {expected}");
        }
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components must exist");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
