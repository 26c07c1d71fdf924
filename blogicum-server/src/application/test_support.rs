use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;

use crate::data::category_repository::CategoryRepository;
use crate::data::comment_repository::{CommentRepository, NewComment};
use crate::data::post_repository::{
    NewPost, Pagination, PostFilter, PostPatch, PostRepository, PostScope,
};
use crate::data::user_repository::{NewUser, ProfilePatch, UserCredentials, UserRepository};
use crate::domain::category::Category;
use crate::domain::comment::Comment;
use crate::domain::error::DomainError;
use crate::domain::post::{CategoryRef, Post};
use crate::domain::user::User;

/// In-memory аналог `push_filter` из Postgres-репозитория.
fn filter_matches(filter: &PostFilter, post: &Post) -> bool {
    let in_scope = match filter.scope {
        PostScope::All => true,
        PostScope::Category(id) => post.category.as_ref().is_some_and(|c| c.id == id),
        PostScope::Author(id) => post.author_id == id,
    };
    in_scope && filter.visible_at.is_none_or(|now| post.is_public_at(now))
}

#[derive(Clone, Default)]
pub(crate) struct FakePostRepo {
    pub(crate) posts: Arc<Mutex<Vec<Post>>>,
    pub(crate) created_input: Arc<Mutex<Option<NewPost>>>,
    pub(crate) update_owned_call: Arc<Mutex<Option<(i64, i64, PostPatch)>>>,
    pub(crate) deleted: Arc<Mutex<Vec<i64>>>,
    pub(crate) last_filter: Arc<Mutex<Option<PostFilter>>>,
    pub(crate) published_comments: Arc<Mutex<i64>>,
}

impl FakePostRepo {
    pub(crate) fn with_posts(posts: Vec<Post>) -> Self {
        let repo = Self::default();
        *repo.posts.lock().expect("posts mutex poisoned") = posts;
        repo
    }

    pub(crate) fn last_filter(&self) -> Option<PostFilter> {
        *self.last_filter.lock().expect("last_filter mutex poisoned")
    }
}

#[async_trait]
impl PostRepository for FakePostRepo {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        *self
            .created_input
            .lock()
            .expect("created_input mutex poisoned") = Some(input.clone());

        let mut posts = self.posts.lock().expect("posts mutex poisoned");
        let now = Utc::now();
        let post = Post {
            id: posts.len() as i64 + 1,
            title: input.title,
            text: input.text,
            pub_date: input.pub_date.unwrap_or(now),
            author_id: input.author_id,
            author_username: format!("user_{}", input.author_id),
            category: input.category_id.map(|id| CategoryRef {
                id,
                slug: format!("category-{id}"),
                title: format!("Category {id}"),
                is_published: true,
            }),
            is_published: input.is_published,
            comment_count: 0,
            created_at: now,
            updated_at: now,
        };
        posts.push(post.clone());
        Ok(post)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        Ok(self
            .posts
            .lock()
            .expect("posts mutex poisoned")
            .iter()
            .find(|post| post.id == id)
            .cloned())
    }

    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        *self
            .update_owned_call
            .lock()
            .expect("update_owned_call mutex poisoned") = Some((post_id, owner_id, patch.clone()));

        let mut posts = self.posts.lock().expect("posts mutex poisoned");
        let Some(post) = posts
            .iter_mut()
            .find(|post| post.id == post_id && post.author_id == owner_id)
        else {
            return Ok(None);
        };
        post.title = patch.title;
        post.text = patch.text;
        if let Some(pub_date) = patch.pub_date {
            post.pub_date = pub_date;
        }
        post.is_published = patch.is_published;
        post.updated_at = Utc::now();
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        let mut posts = self.posts.lock().expect("posts mutex poisoned");
        let before = posts.len();
        posts.retain(|post| post.id != id);
        self.deleted.lock().expect("deleted mutex poisoned").push(id);
        Ok(posts.len() < before)
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        pagination: Pagination,
    ) -> Result<Vec<Post>, DomainError> {
        *self.last_filter.lock().expect("last_filter mutex poisoned") = Some(filter);
        let mut matching: Vec<Post> = self
            .posts
            .lock()
            .expect("posts mutex poisoned")
            .iter()
            .filter(|post| filter_matches(&filter, post))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.pub_date.cmp(&a.pub_date).then(b.id.cmp(&a.id)));

        Ok(matching
            .into_iter()
            .skip(pagination.offset() as usize)
            .take(pagination.limit() as usize)
            .collect())
    }

    async fn count_posts(&self, filter: PostFilter) -> Result<i64, DomainError> {
        Ok(self
            .posts
            .lock()
            .expect("posts mutex poisoned")
            .iter()
            .filter(|post| filter_matches(&filter, post))
            .count() as i64)
    }

    async fn count_published_comments_for_author(
        &self,
        _author_id: i64,
    ) -> Result<i64, DomainError> {
        Ok(*self
            .published_comments
            .lock()
            .expect("published_comments mutex poisoned"))
    }
}

#[derive(Clone, Default)]
pub(crate) struct FakeCategoryRepo {
    pub(crate) categories: Arc<Mutex<Vec<Category>>>,
}

impl FakeCategoryRepo {
    pub(crate) fn with_categories(categories: Vec<Category>) -> Self {
        let repo = Self::default();
        *repo.categories.lock().expect("categories mutex poisoned") = categories;
        repo
    }
}

#[async_trait]
impl CategoryRepository for FakeCategoryRepo {
    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Category>, DomainError> {
        Ok(self
            .categories
            .lock()
            .expect("categories mutex poisoned")
            .iter()
            .find(|category| category.slug == slug && category.is_published)
            .cloned())
    }

    async fn list_published(&self) -> Result<Vec<Category>, DomainError> {
        Ok(self
            .categories
            .lock()
            .expect("categories mutex poisoned")
            .iter()
            .filter(|category| category.is_published)
            .cloned()
            .collect())
    }
}

#[derive(Clone, Default)]
pub(crate) struct FakeCommentRepo {
    pub(crate) comments: Arc<Mutex<Vec<Comment>>>,
}

impl FakeCommentRepo {
    pub(crate) fn with_comments(comments: Vec<Comment>) -> Self {
        let repo = Self::default();
        *repo.comments.lock().expect("comments mutex poisoned") = comments;
        repo
    }

    pub(crate) fn snapshot(&self) -> Vec<Comment> {
        self.comments
            .lock()
            .expect("comments mutex poisoned")
            .clone()
    }
}

#[async_trait]
impl CommentRepository for FakeCommentRepo {
    async fn create_comment(&self, input: NewComment) -> Result<Comment, DomainError> {
        let mut comments = self.comments.lock().expect("comments mutex poisoned");
        let comment = Comment {
            id: comments.iter().map(|c| c.id).max().unwrap_or(0) + 1,
            post_id: input.post_id,
            author_id: input.author_id,
            author_username: format!("user_{}", input.author_id),
            text: input.text,
            is_published: true,
            created_at: Utc::now(),
        };
        comments.push(comment.clone());
        Ok(comment)
    }

    async fn get_comment(
        &self,
        post_id: i64,
        comment_id: i64,
    ) -> Result<Option<Comment>, DomainError> {
        Ok(self
            .comments
            .lock()
            .expect("comments mutex poisoned")
            .iter()
            .find(|c| c.id == comment_id && c.post_id == post_id)
            .cloned())
    }

    async fn update_comment_owned(
        &self,
        comment_id: i64,
        owner_id: i64,
        text: String,
    ) -> Result<Option<Comment>, DomainError> {
        let mut comments = self.comments.lock().expect("comments mutex poisoned");
        let Some(comment) = comments
            .iter_mut()
            .find(|c| c.id == comment_id && c.author_id == owner_id)
        else {
            return Ok(None);
        };
        comment.text = text;
        Ok(Some(comment.clone()))
    }

    async fn delete_comment(&self, comment_id: i64) -> Result<bool, DomainError> {
        let mut comments = self.comments.lock().expect("comments mutex poisoned");
        let before = comments.len();
        comments.retain(|c| c.id != comment_id);
        Ok(comments.len() < before)
    }

    async fn list_for_post(
        &self,
        post_id: i64,
        viewer_id: Option<i64>,
    ) -> Result<Vec<Comment>, DomainError> {
        Ok(self
            .comments
            .lock()
            .expect("comments mutex poisoned")
            .iter()
            .filter(|c| c.post_id == post_id)
            .filter(|c| c.is_published || viewer_id == Some(c.author_id))
            .cloned()
            .collect())
    }
}

#[derive(Clone, Default)]
pub(crate) struct FakeUserRepo {
    pub(crate) users: Arc<Mutex<Vec<User>>>,
    pub(crate) created_input: Arc<Mutex<Option<NewUser>>>,
    pub(crate) login_credentials: Arc<Mutex<Option<UserCredentials>>>,
}

impl FakeUserRepo {
    pub(crate) fn with_users(users: Vec<User>) -> Self {
        let repo = Self::default();
        *repo.users.lock().expect("users mutex poisoned") = users;
        repo
    }

    pub(crate) fn set_login_credentials(&self, creds: Option<UserCredentials>) {
        *self
            .login_credentials
            .lock()
            .expect("login credentials mutex poisoned") = creds;
    }

    pub(crate) fn take_created_input(&self) -> Option<NewUser> {
        self.created_input
            .lock()
            .expect("created input mutex poisoned")
            .take()
    }
}

#[async_trait]
impl UserRepository for FakeUserRepo {
    async fn create_user(&self, input: NewUser) -> Result<User, DomainError> {
        let mut users = self.users.lock().expect("users mutex poisoned");
        if users.iter().any(|user| user.username == input.username) {
            return Err(DomainError::AlreadyExists("username".to_string()));
        }
        let user = User::new(
            users.len() as i64 + 1,
            input.username.clone(),
            input.email.clone(),
            "",
            "",
            Utc::now(),
        )?;
        users.push(user.clone());
        *self
            .created_input
            .lock()
            .expect("created input mutex poisoned") = Some(input);
        Ok(user)
    }

    async fn find_by_username(
        &self,
        _username: &str,
    ) -> Result<Option<UserCredentials>, DomainError> {
        Ok(self
            .login_credentials
            .lock()
            .expect("login credentials mutex poisoned")
            .clone())
    }

    async fn find_profile(&self, username: &str) -> Result<Option<User>, DomainError> {
        Ok(self
            .users
            .lock()
            .expect("users mutex poisoned")
            .iter()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn update_profile(
        &self,
        user_id: i64,
        patch: ProfilePatch,
    ) -> Result<Option<User>, DomainError> {
        let mut users = self.users.lock().expect("users mutex poisoned");
        if users
            .iter()
            .any(|user| user.id != user_id && user.username == patch.username)
        {
            return Err(DomainError::AlreadyExists("username".to_string()));
        }
        let Some(user) = users.iter_mut().find(|user| user.id == user_id) else {
            return Ok(None);
        };
        user.username = patch.username;
        user.email = patch.email;
        user.first_name = patch.first_name;
        user.last_name = patch.last_name;
        Ok(Some(user.clone()))
    }
}
