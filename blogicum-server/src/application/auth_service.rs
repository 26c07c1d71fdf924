use std::sync::Arc;

use tracing::{info, warn};

use crate::data::user_repository::{NewUser, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::user::{LoginRequest, RegisterRequest, User};
use crate::infrastructure::jwt::JwtService;
use crate::infrastructure::password::{PasswordError, PasswordService};

#[derive(Debug, Clone)]
pub(crate) struct AuthResult {
    pub(crate) user: User,
    pub(crate) access_token: String,
}

pub(crate) struct AuthService<R: UserRepository> {
    users: R,
    passwords: PasswordService,
    jwt: Arc<JwtService>,
}

impl From<PasswordError> for DomainError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::Mismatch => DomainError::InvalidCredentials,
            other => DomainError::Unexpected(other.to_string()),
        }
    }
}

impl<R: UserRepository> AuthService<R> {
    pub(crate) fn new(users: R, passwords: PasswordService, jwt: Arc<JwtService>) -> Self {
        Self {
            users,
            passwords,
            jwt,
        }
    }

    pub(crate) async fn register(&self, req: RegisterRequest) -> Result<AuthResult, DomainError> {
        let RegisterRequest {
            username,
            email,
            password,
        } = req.validate()?;

        let password_hash = self.passwords.hash(&password)?;
        let user = self
            .users
            .create_user(NewUser {
                username,
                email,
                password_hash,
            })
            .await?;
        info!(user_id = user.id, username = %user.username, "user registered");

        self.issue(user)
    }

    pub(crate) async fn login(&self, req: LoginRequest) -> Result<AuthResult, DomainError> {
        let req = req.validate()?;

        let Some(creds) = self.users.find_by_username(&req.username).await? else {
            self.passwords.burn_verification(&req.password);
            return Err(DomainError::InvalidCredentials);
        };
        if let Err(err) = self.passwords.verify(&req.password, &creds.password_hash) {
            if matches!(err, PasswordError::Mismatch) {
                warn!(user_id = creds.user.id, "login with wrong password");
            }
            return Err(err.into());
        }

        self.issue(creds.user)
    }

    fn issue(&self, user: User) -> Result<AuthResult, DomainError> {
        let access_token = self
            .jwt
            .generate_token(user.id, &user.username)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(AuthResult { user, access_token })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::AuthService;
    use crate::application::test_support::FakeUserRepo;
    use crate::data::user_repository::UserCredentials;
    use crate::domain::error::DomainError;
    use crate::domain::user::tests::sample_user;
    use crate::domain::user::{LoginRequest, RegisterRequest};
    use crate::infrastructure::jwt::JwtService;
    use crate::infrastructure::password::PasswordService;

    fn jwt() -> Arc<JwtService> {
        Arc::new(JwtService::new("0123456789abcdef0123456789abcdef", 3600))
    }

    fn service(repo: FakeUserRepo) -> AuthService<FakeUserRepo> {
        AuthService::new(repo, PasswordService::new().expect("argon2 must init"), jwt())
    }

    fn repo_with_password(username: &str, password: &str) -> FakeUserRepo {
        let repo = FakeUserRepo::default();
        let hash = PasswordService::new()
            .expect("argon2 must init")
            .hash(password)
            .expect("hash must build");
        repo.set_login_credentials(Some(UserCredentials {
            user: sample_user(1, username),
            password_hash: hash,
        }));
        repo
    }

    fn login(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn register_stores_normalized_user_with_hashed_password() {
        let repo = FakeUserRepo::default();
        let result = service(repo.clone())
            .register(RegisterRequest {
                username: "  writer  ".to_string(),
                email: "  WRITER@EXAMPLE.COM ".to_string(),
                password: "very-secure-password".to_string(),
            })
            .await
            .expect("register must succeed");

        assert_eq!(result.user.username, "writer");
        let stored = repo.take_created_input().expect("create_user must be called");
        assert_eq!(stored.email, "writer@example.com");
        assert!(stored.password_hash.starts_with("$argon2id$"));
    }

    #[tokio::test]
    async fn register_issues_token_for_the_new_user() {
        let result = service(FakeUserRepo::default())
            .register(RegisterRequest {
                username: "reader".to_string(),
                email: "reader@example.com".to_string(),
                password: "very-secure-password".to_string(),
            })
            .await
            .expect("register must succeed");

        let claims = jwt()
            .verify_token(&result.access_token)
            .expect("token must verify");
        assert_eq!(claims.user_id, result.user.id);
        assert_eq!(claims.username, "reader");
    }

    #[tokio::test]
    async fn register_rejects_duplicate_username() {
        let repo = FakeUserRepo::with_users(vec![sample_user(1, "reader")]);
        let err = service(repo)
            .register(RegisterRequest {
                username: "reader".to_string(),
                email: "other@example.com".to_string(),
                password: "very-secure-password".to_string(),
            })
            .await
            .expect_err("duplicate must fail");

        assert!(matches!(err, DomainError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn unknown_user_and_wrong_password_look_the_same() {
        let unknown = service(FakeUserRepo::default())
            .login(login("ghost", "some-password"))
            .await
            .expect_err("unknown user must fail");
        let wrong = service(repo_with_password("writer", "correct-password"))
            .login(login("writer", "wrong-password"))
            .await
            .expect_err("wrong password must fail");

        assert!(matches!(unknown, DomainError::InvalidCredentials));
        assert!(matches!(wrong, DomainError::InvalidCredentials));
    }

    #[tokio::test]
    async fn login_with_correct_password_issues_token() {
        let result = service(repo_with_password("writer", "correct-password"))
            .login(login("writer", "correct-password"))
            .await
            .expect("login must succeed");

        assert_eq!(result.user.id, 1);
        let claims = jwt()
            .verify_token(&result.access_token)
            .expect("token must verify");
        assert_eq!(claims.username, "writer");
    }
}
