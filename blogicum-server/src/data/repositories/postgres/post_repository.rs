use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::data::post_repository::{
    NewPost, Pagination, PostFilter, PostPatch, PostRepository, PostScope,
};
use crate::domain::error::DomainError;
use crate::domain::post::{CategoryRef, Post};

#[derive(Debug, Clone)]
pub(crate) struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Общая проекция поста: автор, категория и число опубликованных комментариев.
/// Ожидает, что исходная таблица/CTE доступна под алиасом `p`.
const POST_PROJECTION: &str = r#"
    SELECT
        p.id,
        p.title,
        p.text,
        p.pub_date,
        p.author_id,
        u.username AS author_username,
        p.category_id,
        c.slug AS category_slug,
        c.title AS category_title,
        c.is_published AS category_is_published,
        p.is_published,
        (
            SELECT COUNT(*)
            FROM comments cm
            WHERE cm.post_id = p.id AND cm.is_published
        ) AS comment_count,
        p.created_at,
        p.updated_at
"#;

const POST_JOINS: &str = r#"
    JOIN users u ON u.id = p.author_id
    LEFT JOIN categories c ON c.id = p.category_id
"#;

#[derive(sqlx::FromRow)]
struct PostRow {
    id: i64,
    title: String,
    text: String,
    pub_date: DateTime<Utc>,
    author_id: i64,
    author_username: String,
    category_id: Option<i64>,
    category_slug: Option<String>,
    category_title: Option<String>,
    category_is_published: Option<bool>,
    is_published: bool,
    comment_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let sql = format!(
            r#"
            WITH p AS (
                INSERT INTO posts (title, text, pub_date, author_id, category_id, is_published)
                VALUES ($1, $2, COALESCE($3::timestamptz, NOW()), $4, $5, $6)
                RETURNING *
            )
            {POST_PROJECTION}
            FROM p
            {POST_JOINS}
            "#
        );

        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(&input.title)
            .bind(&input.text)
            .bind(input.pub_date)
            .bind(input.author_id)
            .bind(input.category_id)
            .bind(input.is_published)
            .fetch_one(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        map_row_to_post(row)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        let sql = format!(
            r#"
            {POST_PROJECTION}
            FROM posts p
            {POST_JOINS}
            WHERE p.id = $1
            "#
        );

        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn update_post_owned(
        &self,
        post_id: i64,
        owner_id: i64,
        patch: PostPatch,
    ) -> Result<Option<Post>, DomainError> {
        let sql = format!(
            r#"
            WITH p AS (
                UPDATE posts
                SET title = $3,
                    text = $4,
                    pub_date = COALESCE($5::timestamptz, pub_date),
                    category_id = $6,
                    is_published = $7,
                    updated_at = NOW()
                WHERE id = $1 AND author_id = $2
                RETURNING *
            )
            {POST_PROJECTION}
            FROM p
            {POST_JOINS}
            "#
        );

        let row = sqlx::query_as::<_, PostRow>(&sql)
            .bind(post_id)
            .bind(owner_id)
            .bind(&patch.title)
            .bind(&patch.text)
            .bind(patch.pub_date)
            .bind(patch.category_id)
            .bind(patch.is_published)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        row.map(map_row_to_post).transpose()
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            DELETE FROM posts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_post_db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_posts(
        &self,
        filter: PostFilter,
        pagination: Pagination,
    ) -> Result<Vec<Post>, DomainError> {
        let mut query = QueryBuilder::<Postgres>::new(POST_PROJECTION);
        query.push(" FROM posts p ").push(POST_JOINS);
        push_filter(&mut query, filter);
        query
            .push(" ORDER BY p.pub_date DESC, p.id DESC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let rows = query
            .build_query_as::<PostRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_post_db_error)?;

        rows.into_iter().map(map_row_to_post).collect()
    }

    async fn count_posts(&self, filter: PostFilter) -> Result<i64, DomainError> {
        let mut query = QueryBuilder::<Postgres>::new(
            "SELECT COUNT(*) FROM posts p LEFT JOIN categories c ON c.id = p.category_id",
        );
        push_filter(&mut query, filter);

        query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(map_post_db_error)
    }

    async fn count_published_comments_for_author(
        &self,
        author_id: i64,
    ) -> Result<i64, DomainError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(cm.id)
            FROM comments cm
            JOIN posts p ON p.id = cm.post_id
            WHERE p.author_id = $1 AND cm.is_published
            "#,
        )
        .bind(author_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_post_db_error)
    }
}

fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: PostFilter) {
    query.push(" WHERE TRUE");
    match filter.scope {
        PostScope::All => {}
        PostScope::Category(category_id) => {
            query.push(" AND p.category_id = ").push_bind(category_id);
        }
        PostScope::Author(author_id) => {
            query.push(" AND p.author_id = ").push_bind(author_id);
        }
    }
    // c.is_published IS NULL для постов без категории, такие посты отсекаются
    if let Some(now) = filter.visible_at {
        query
            .push(" AND p.is_published AND c.is_published AND p.pub_date <= ")
            .push_bind(now);
    }
}

fn map_row_to_post(row: PostRow) -> Result<Post, DomainError> {
    let category = match (
        row.category_id,
        row.category_slug,
        row.category_title,
        row.category_is_published,
    ) {
        (Some(id), Some(slug), Some(title), Some(is_published)) => Some(CategoryRef {
            id,
            slug,
            title,
            is_published,
        }),
        _ => None,
    };

    Post {
        id: row.id,
        title: row.title,
        text: row.text,
        pub_date: row.pub_date,
        author_id: row.author_id,
        author_username: row.author_username,
        category,
        is_published: row.is_published,
        comment_count: row.comment_count,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
    .validate()
    .map_err(|err| DomainError::Unexpected(err.to_string()))
}

fn map_post_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23503") {
            let resource = match db_err.constraint() {
                Some("posts_category_id_fkey") => "category",
                _ => "author",
            };
            return DomainError::NotFound(resource.to_string());
        }
    }
    DomainError::Unexpected(err.to_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::{DateTime, Duration, Utc};
    use sqlx::{PgPool, Postgres, QueryBuilder};

    use super::{PostgresPostRepository, push_filter};
    use crate::data::post_repository::{Pagination, PostFilter, PostRepository, PostScope};

    fn compiled(filter: PostFilter) -> String {
        let mut query = QueryBuilder::<Postgres>::new("SELECT 1 FROM posts p");
        push_filter(&mut query, filter);
        query.sql().to_string()
    }

    #[test]
    fn public_filter_requires_published_post_category_and_past_date() {
        let sql = compiled(PostFilter::public(PostScope::All, Utc::now()));
        assert!(sql.contains("AND p.is_published AND c.is_published AND p.pub_date <= $1"));
    }

    #[test]
    fn scope_is_bound_before_visibility() {
        let sql = compiled(PostFilter::public(PostScope::Category(3), Utc::now()));
        assert!(sql.contains("p.category_id = $1"));
        assert!(sql.contains("p.pub_date <= $2"));
    }

    #[test]
    fn unfiltered_author_scope_has_no_visibility_clause() {
        let sql = compiled(PostFilter::unfiltered(PostScope::Author(7)));
        assert!(sql.contains("p.author_id = $1"));
        assert!(!sql.contains("is_published"));
        assert!(!sql.contains("pub_date"));
    }

    pub(crate) async fn insert_user(pool: &PgPool, username: &str) -> i64 {
        sqlx::query_scalar(
            "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, 'hash') RETURNING id",
        )
        .bind(username)
        .bind(format!("{username}@example.com"))
        .fetch_one(pool)
        .await
        .expect("user insert must succeed")
    }

    pub(crate) async fn category_id(pool: &PgPool, slug: &str) -> i64 {
        sqlx::query_scalar("SELECT id FROM categories WHERE slug = $1")
            .bind(slug)
            .fetch_one(pool)
            .await
            .expect("seeded category must exist")
    }

    pub(crate) async fn insert_post(
        pool: &PgPool,
        author_id: i64,
        category_id: Option<i64>,
        is_published: bool,
        pub_date: DateTime<Utc>,
    ) -> i64 {
        sqlx::query_scalar(
            r#"
            INSERT INTO posts (title, text, pub_date, author_id, category_id, is_published)
            VALUES ('Title', 'Text', $1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(pub_date)
        .bind(author_id)
        .bind(category_id)
        .bind(is_published)
        .fetch_one(pool)
        .await
        .expect("post insert must succeed")
    }

    pub(crate) async fn insert_comment(
        pool: &PgPool,
        post_id: i64,
        author_id: i64,
        is_published: bool,
    ) -> i64 {
        sqlx::query_scalar(
            r#"
            INSERT INTO comments (text, post_id, author_id, is_published)
            VALUES ('Comment', $1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(post_id)
        .bind(author_id)
        .bind(is_published)
        .fetch_one(pool)
        .await
        .expect("comment insert must succeed")
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL pointing at Postgres"]
    async fn public_feed_returns_only_visible_posts(pool: PgPool) {
        let author = insert_user(&pool, "writer").await;
        let travel = category_id(&pool, "travel").await;
        let drafts = category_id(&pool, "drafts").await;
        let past = Utc::now() - Duration::hours(1);
        let future = Utc::now() + Duration::days(1);

        let visible = insert_post(&pool, author, Some(travel), true, past).await;
        insert_post(&pool, author, Some(travel), false, past).await;
        insert_post(&pool, author, Some(travel), true, future).await;
        insert_post(&pool, author, Some(drafts), true, past).await;
        insert_post(&pool, author, None, true, past).await;

        let repo = PostgresPostRepository::new(pool);
        let public = PostFilter::public(PostScope::All, Utc::now());
        let posts = repo
            .list_posts(public, Pagination::new(1, 10))
            .await
            .expect("list must succeed");
        let ids: Vec<i64> = posts.iter().map(|post| post.id).collect();

        assert_eq!(ids, vec![visible]);
        assert_eq!(repo.count_posts(public).await.expect("count must succeed"), 1);

        let own = PostFilter::unfiltered(PostScope::Author(author));
        assert_eq!(repo.count_posts(own).await.expect("count must succeed"), 5);
    }

    #[sqlx::test]
    #[ignore = "requires DATABASE_URL pointing at Postgres"]
    async fn comment_counts_skip_unpublished_comments(pool: PgPool) {
        let author = insert_user(&pool, "writer").await;
        let reader = insert_user(&pool, "reader").await;
        let travel = category_id(&pool, "travel").await;
        let past = Utc::now() - Duration::hours(1);

        let post = insert_post(&pool, author, Some(travel), true, past).await;
        insert_comment(&pool, post, reader, true).await;
        insert_comment(&pool, post, reader, false).await;
        let foreign = insert_post(&pool, reader, Some(travel), true, past).await;
        insert_comment(&pool, foreign, author, true).await;

        let repo = PostgresPostRepository::new(pool);
        let loaded = repo
            .get_post(post)
            .await
            .expect("get must succeed")
            .expect("post must exist");

        assert_eq!(loaded.comment_count, 1);
        assert_eq!(
            repo.count_published_comments_for_author(author)
                .await
                .expect("count must succeed"),
            1
        );
    }
}
