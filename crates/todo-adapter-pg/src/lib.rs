//! PostgreSQL storage for todos and users.
//!
//! Schema lives in `migrations/` and is embedded with `sqlx::migrate!`.
//! Queries are checked at runtime, so building this crate doesn't need a
//! live database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use todo_core::{NewTodo, NewUser, Todo, TodoId, TodoPatch, TodoRepository, User, UserRepository};

const TODO_COLUMNS: &str = "id, title, completed, owner_id, created_at";
const USER_COLUMNS: &str = "id, name, email, created_at, updated_at";

#[derive(Debug, Clone, Copy)]
pub struct PostgresStoreOptions {
    pub max_connections: u32,
}

impl Default for PostgresStoreOptions {
    fn default() -> Self {
        Self { max_connections: 5 }
    }
}

#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn connect(database_url: &str, options: PostgresStoreOptions) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(options.max_connections)
            .connect(database_url)
            .await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply embedded migrations (creates `users` and `todos`).
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        tracing::info!("database migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(Debug, FromRow)]
struct TodoRow {
    id: i64,
    title: String,
    completed: bool,
    owner_id: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Todo {
            id: row.id,
            title: row.title,
            completed: row.completed,
            owner_id: row.owner_id,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: String,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl TodoRepository for PostgresStore {
    async fn list(&self, owner: Option<&str>) -> anyhow::Result<Vec<Todo>> {
        let rows: Vec<TodoRow> = match owner {
            Some(owner) => {
                sqlx::query_as(&format!(
                    "SELECT {TODO_COLUMNS} FROM todos WHERE owner_id = $1 ORDER BY id"
                ))
                .bind(owner)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as(&format!("SELECT {TODO_COLUMNS} FROM todos ORDER BY id"))
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(rows.into_iter().map(Todo::from).collect())
    }

    async fn insert(&self, owner: Option<&str>, input: &NewTodo) -> anyhow::Result<Todo> {
        let row: TodoRow = sqlx::query_as(&format!(
            "INSERT INTO todos (title, completed, owner_id) VALUES ($1, $2, $3) RETURNING {TODO_COLUMNS}"
        ))
        .bind(&input.title)
        .bind(input.completed)
        .bind(owner)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn find(&self, id: TodoId) -> anyhow::Result<Option<Todo>> {
        let row: Option<TodoRow> =
            sqlx::query_as(&format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Todo::from))
    }

    async fn update(&self, id: TodoId, patch: &TodoPatch) -> anyhow::Result<Option<Todo>> {
        let row: Option<TodoRow> = sqlx::query_as(&format!(
            "UPDATE todos SET title = COALESCE($2, title), completed = COALESCE($3, completed) \
             WHERE id = $1 RETURNING {TODO_COLUMNS}"
        ))
        .bind(id)
        .bind(patch.title.as_deref())
        .bind(patch.completed)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Todo::from))
    }

    async fn delete(&self, id: TodoId) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserRepository for PostgresStore {
    async fn find_user(&self, id: &str) -> anyhow::Result<Option<User>> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(User::from))
    }

    async fn upsert_user(&self, profile: &NewUser) -> anyhow::Result<User> {
        let row: UserRow = sqlx::query_as(&format!(
            "INSERT INTO users (id, name, email) VALUES ($1, $2, $3) \
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name, email = EXCLUDED.email, updated_at = now() \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&profile.id)
        .bind(&profile.name)
        .bind(&profile.email)
        .fetch_one(&self.pool)
        .await?;
        Ok(row.into())
    }

    async fn refresh_profile(&self, profile: &NewUser) -> anyhow::Result<User> {
        let row: Option<UserRow> = sqlx::query_as(&format!(
            "UPDATE users SET name = $2, email = $3, updated_at = now() WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(&profile.id)
        .bind(&profile.name)
        .bind(&profile.email)
        .fetch_optional(&self.pool)
        .await?;
        row.map(User::from)
            .ok_or_else(|| anyhow::anyhow!("user '{}' does not exist", profile.id))
    }
}
