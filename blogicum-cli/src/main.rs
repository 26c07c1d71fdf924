use std::fs;
use std::io;
use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use blogicum_client::{
    AuthResponse, BlogicumClient, BlogicumClientError, Category, CategoryPage, Comment, Post,
    PostDetail, PostInput, PostPage, Profile, ProfileInput, User,
};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use serde::Serialize;

const TOKEN_FILE: &str = ".blogicum_token";
const DEFAULT_SERVER: &str = "http://127.0.0.1:8080";
const SERVER_ENV: &str = "BLOGICUM_SERVER";

#[derive(Debug, Parser)]
#[command(name = "blogicum-cli", version, about = "CLI клиент для blogicum-server")]
struct Cli {
    /// Адрес сервера; по умолчанию берётся из BLOGICUM_SERVER.
    #[arg(long, global = true)]
    server: Option<String>,

    /// Печатать ответ сервера как JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Регистрация пользователя.
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Вход пользователя.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Выход: удаляет сохранённый токен.
    Logout,
    /// Главная лента.
    List {
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Пост с комментариями.
    Get {
        #[arg(long)]
        id: i64,
    },
    /// Создание поста (требует токен).
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        text: String,
        /// Дата публикации в RFC 3339, например 2030-01-01T00:00:00Z.
        #[arg(long)]
        pub_date: Option<DateTime<Utc>>,
        #[arg(long)]
        category_id: Option<i64>,
        /// Сохранить как черновик, не публикуя.
        #[arg(long)]
        draft: bool,
    },
    /// Редактирование поста (требует токен).
    ///
    /// Не указанные поля берутся из текущей версии поста.
    Update {
        #[arg(long)]
        id: i64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        pub_date: Option<DateTime<Utc>>,
        #[arg(long)]
        category_id: Option<i64>,
        #[arg(long)]
        draft: bool,
    },
    /// Удаление поста (требует токен).
    Delete {
        #[arg(long)]
        id: i64,
    },
    /// Комментарий к посту (требует токен).
    Comment {
        #[arg(long)]
        post_id: i64,
        #[arg(long)]
        text: String,
    },
    /// Редактирование комментария (требует токен).
    EditComment {
        #[arg(long)]
        post_id: i64,
        #[arg(long)]
        id: i64,
        #[arg(long)]
        text: String,
    },
    /// Удаление комментария (требует токен).
    DeleteComment {
        #[arg(long)]
        post_id: i64,
        #[arg(long)]
        id: i64,
    },
    /// Список категорий.
    Categories,
    /// Посты категории.
    Category {
        #[arg(long)]
        slug: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Профиль пользователя.
    Profile {
        #[arg(long)]
        username: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Редактирование своего профиля (требует токен).
    EditProfile {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
    },
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Ошибка: {err}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let server = resolve_server(cli.server, std::env::var(SERVER_ENV).ok());
    let mut client = BlogicumClient::new(server).map_err(map_client_error)?;

    if let Some(token) = load_token().context("не удалось прочитать .blogicum_token")? {
        client.set_token(token);
    }
    let out = Output { json: cli.json };

    match cli.command {
        Command::Register {
            username,
            email,
            password,
        } => {
            let auth = client
                .register(&username, &email, &password)
                .await
                .map_err(map_client_error)?;
            persist_token(&client).context("не удалось сохранить токен")?;
            out.show(&auth, || print_auth("Регистрация успешна", &auth))?;
        }
        Command::Login { username, password } => {
            let auth = client
                .login(&username, &password)
                .await
                .map_err(map_client_error)?;
            persist_token(&client).context("не удалось сохранить токен")?;
            out.show(&auth, || print_auth("Вход выполнен", &auth))?;
        }
        Command::Logout => {
            remove_token().context("не удалось удалить токен")?;
            println!("Токен удалён");
        }
        Command::List { page } => {
            let list = client.list_posts(page).await.map_err(map_client_error)?;
            out.show(&list, || print_page("Лента", &list))?;
        }
        Command::Get { id } => {
            let detail = client.get_post(id).await.map_err(map_client_error)?;
            out.show(&detail, || print_detail(&detail))?;
        }
        Command::Create {
            title,
            text,
            pub_date,
            category_id,
            draft,
        } => {
            let input = PostInput {
                title,
                text,
                pub_date,
                category_id,
                is_published: Some(!draft),
            };
            let post = client.create_post(&input).await.map_err(map_client_error)?;
            out.show(&post, || print_post("Пост создан", &post))?;
        }
        Command::Update {
            id,
            title,
            text,
            pub_date,
            category_id,
            draft,
        } => {
            let current = client.get_post(id).await.map_err(map_client_error)?.post;
            let input = merge_update(&current, title, text, pub_date, category_id, draft);
            let post = client
                .update_post(id, &input)
                .await
                .map_err(map_client_error)?;
            out.show(&post, || print_post("Пост обновлён", &post))?;
        }
        Command::Delete { id } => {
            client.delete_post(id).await.map_err(map_client_error)?;
            println!("Пост удалён: id={id}");
        }
        Command::Comment { post_id, text } => {
            let comment = client
                .add_comment(post_id, &text)
                .await
                .map_err(map_client_error)?;
            out.show(&comment, || print_comment("Комментарий добавлен", &comment))?;
        }
        Command::EditComment { post_id, id, text } => {
            let comment = client
                .update_comment(post_id, id, &text)
                .await
                .map_err(map_client_error)?;
            out.show(&comment, || print_comment("Комментарий обновлён", &comment))?;
        }
        Command::DeleteComment { post_id, id } => {
            client
                .delete_comment(post_id, id)
                .await
                .map_err(map_client_error)?;
            println!("Комментарий удалён: id={id}");
        }
        Command::Categories => {
            let categories = client.list_categories().await.map_err(map_client_error)?;
            out.show(&categories, || print_categories(&categories))?;
        }
        Command::Category { slug, page } => {
            let result = client
                .category_posts(&slug, page)
                .await
                .map_err(map_client_error)?;
            out.show(&result, || print_category_page(&result))?;
        }
        Command::Profile { username, page } => {
            let profile = client
                .get_profile(&username, page)
                .await
                .map_err(map_client_error)?;
            out.show(&profile, || print_profile(&profile))?;
        }
        Command::EditProfile {
            username,
            email,
            first_name,
            last_name,
        } => {
            let input = ProfileInput {
                username,
                email,
                first_name,
                last_name,
            };
            let user = client
                .update_profile(&input)
                .await
                .map_err(map_client_error)?;
            out.show(&user, || print_user("Профиль обновлён", &user))?;
        }
    }

    Ok(())
}

struct Output {
    json: bool,
}

impl Output {
    fn show<T: Serialize>(&self, value: &T, human: impl FnOnce()) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            human();
        }
        Ok(())
    }
}

fn resolve_server(flag: Option<String>, env: Option<String>) -> String {
    let raw = flag
        .or(env)
        .unwrap_or_else(|| DEFAULT_SERVER.to_string());
    normalize_server(raw)
}

fn normalize_server(server: String) -> String {
    if server.starts_with("http://") || server.starts_with("https://") {
        return server;
    }

    format!("http://{server}")
}

fn merge_update(
    current: &Post,
    title: Option<String>,
    text: Option<String>,
    pub_date: Option<DateTime<Utc>>,
    category_id: Option<i64>,
    draft: bool,
) -> PostInput {
    PostInput {
        title: title.unwrap_or_else(|| current.title.clone()),
        text: text.unwrap_or_else(|| current.text.clone()),
        pub_date: pub_date.or(Some(current.pub_date)),
        category_id: category_id.or(current.category.as_ref().map(|c| c.id)),
        is_published: Some(!draft),
    }
}

fn parse_token_content(raw: &str) -> Option<String> {
    let token = raw.trim().to_string();
    if token.is_empty() {
        return None;
    }
    Some(token)
}

fn load_token() -> io::Result<Option<String>> {
    if !Path::new(TOKEN_FILE).exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(TOKEN_FILE)?;
    Ok(parse_token_content(&raw))
}

fn persist_token(client: &BlogicumClient) -> io::Result<()> {
    if let Some(token) = client.get_token() {
        fs::write(TOKEN_FILE, token)?;
    }
    Ok(())
}

fn remove_token() -> io::Result<()> {
    if Path::new(TOKEN_FILE).exists() {
        fs::remove_file(TOKEN_FILE)?;
    }
    Ok(())
}

fn map_client_error(err: BlogicumClientError) -> anyhow::Error {
    let message = match err {
        BlogicumClientError::Unauthorized => {
            "требуется авторизация: выполните `blogicum-cli login ...` или `blogicum-cli register ...`"
                .to_string()
        }
        BlogicumClientError::Forbidden { location } => {
            format!("изменять можно только свои записи, см. {location}")
        }
        BlogicumClientError::NotFound => "ресурс не найден".to_string(),
        BlogicumClientError::Conflict(message) => format!("уже занято: {message}"),
        BlogicumClientError::InvalidRequest(message) => format!("некорректный запрос: {message}"),
        BlogicumClientError::Http(err) => format!("ошибка HTTP: {err}"),
    };
    anyhow::anyhow!(message)
}

fn print_auth(title: &str, auth: &AuthResponse) {
    print_user(title, &auth.user);
    println!("token: {}", auth.access_token);
}

fn print_user(title: &str, user: &User) {
    println!("{title}");
    println!("  id: {}", user.id);
    println!("  username: {}", user.username);
    println!("  email: {}", user.email);
    println!("  name: {} {}", user.first_name, user.last_name);
    println!("  created_at: {}", user.created_at);
}

fn print_post(title: &str, post: &Post) {
    println!("{title}");
    println!("id: {}", post.id);
    println!("title: {}", post.title);
    println!("text: {}", post.text);
    println!("author: {}", post.author_username);
    println!(
        "category: {}",
        post.category
            .as_ref()
            .map(|c| c.slug.as_str())
            .unwrap_or("-")
    );
    println!("pub_date: {}", post.pub_date);
    println!("published: {}", post.is_published);
    println!("comments: {}", post.comment_count);
}

fn print_comment(title: &str, comment: &Comment) {
    println!("{title}");
    println!(
        "- [{}] {}: {}",
        comment.id, comment.author_username, comment.text
    );
}

fn print_detail(detail: &PostDetail) {
    print_post("Пост", &detail.post);
    println!("Комментарии ({}):", detail.comments.len());
    for comment in &detail.comments {
        println!(
            "- [{}] {} ({}): {}",
            comment.id, comment.author_username, comment.created_at, comment.text
        );
    }
}

fn print_page(title: &str, page: &PostPage) {
    println!(
        "{title}: страница {} из {} (всего постов {})",
        page.page,
        page.page_count(),
        page.total
    );

    for post in &page.posts {
        println!(
            "- [{}] {} ({}, комментариев: {})",
            post.id, post.title, post.author_username, post.comment_count
        );
    }
}

fn print_categories(categories: &[Category]) {
    println!("Категорий: {}", categories.len());
    for category in categories {
        println!("- {} ({})", category.title, category.slug);
    }
}

fn print_category_page(result: &CategoryPage) {
    println!("{}: {}", result.category.title, result.category.description);
    print_page("Посты категории", &result.posts);
}

fn print_profile(profile: &Profile) {
    println!(
        "Профиль {} ({} {}), комментариев к постам: {}",
        profile.user.username, profile.user.first_name, profile.user.last_name, profile.comment_count
    );
    print_page("Посты", &profile.posts);
}
