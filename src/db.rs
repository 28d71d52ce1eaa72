//! SQL for users and tasks. Every task statement is scoped by owner.

use sqlx::{query, query_as, sqlite::SqlitePoolOptions, Pool, Sqlite};

use crate::{
    model::{Task, User},
    schema::{SortKey, TaskForm},
};

const TASK_COLUMNS: &str = "id, title, description, category, contact, status, due, user_id";

/// Opens the pool. `max_connections` of 1 gives one shared connection.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<Pool<Sqlite>, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect(database_url)
        .await
}

/// Creates the `users` and `tasks` tables if they don't exist.
pub async fn init_schema(db: &Pool<Sqlite>) -> Result<(), sqlx::Error> {
    query(
        r#"CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT NOT NULL UNIQUE
    );"#,
    )
    .execute(db)
    .await?;

    query(
        r#"CREATE TABLE IF NOT EXISTS tasks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        category TEXT NOT NULL DEFAULT '',
        contact TEXT NOT NULL DEFAULT '',
        status TEXT NOT NULL DEFAULT '',
        due TEXT,
        user_id INTEGER NOT NULL REFERENCES users(id)
    );"#,
    )
    .execute(db)
    .await?;

    query("CREATE INDEX IF NOT EXISTS tasks_user_id ON tasks(user_id)")
        .execute(db)
        .await?;

    Ok(())
}

pub async fn create_user(db: &Pool<Sqlite>, username: &str) -> Result<User, sqlx::Error> {
    query_as::<_, User>("INSERT INTO users (username) VALUES (?) RETURNING id, username")
        .bind(username)
        .fetch_one(db)
        .await
}

pub async fn find_user_by_username(
    db: &Pool<Sqlite>,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    query_as::<_, User>("SELECT id, username FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(db)
        .await
}

pub async fn list_tasks(
    db: &Pool<Sqlite>,
    user_id: i64,
    sort: SortKey,
) -> Result<Vec<Task>, sqlx::Error> {
    // `sort.column()` is one of a fixed set of literals.
    let sql = format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ? ORDER BY {} ASC NULLS LAST, id ASC",
        sort.column()
    );
    query_as::<_, Task>(&sql).bind(user_id).fetch_all(db).await
}

pub async fn find_task(
    db: &Pool<Sqlite>,
    id: i64,
    user_id: i64,
) -> Result<Option<Task>, sqlx::Error> {
    let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ? AND user_id = ?");
    query_as::<_, Task>(&sql)
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await
}

pub async fn create_task(
    db: &Pool<Sqlite>,
    user_id: i64,
    form: &TaskForm,
) -> Result<Task, sqlx::Error> {
    let sql = format!(
        "INSERT INTO tasks (title, description, category, contact, status, due, user_id) \
         VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING {TASK_COLUMNS}"
    );
    query_as::<_, Task>(&sql)
        .bind(&form.title)
        .bind(&form.description)
        .bind(&form.category)
        .bind(&form.contact)
        .bind(&form.status)
        .bind(&form.due)
        .bind(user_id)
        .fetch_one(db)
        .await
}

/// Returns `None` when no row matched both id and owner.
pub async fn update_task(
    db: &Pool<Sqlite>,
    id: i64,
    user_id: i64,
    form: &TaskForm,
) -> Result<Option<Task>, sqlx::Error> {
    let sql = format!(
        "UPDATE tasks SET title = ?, description = ?, category = ?, contact = ?, status = ?, due = ? \
         WHERE id = ? AND user_id = ? RETURNING {TASK_COLUMNS}"
    );
    query_as::<_, Task>(&sql)
        .bind(&form.title)
        .bind(&form.description)
        .bind(&form.category)
        .bind(&form.contact)
        .bind(&form.status)
        .bind(&form.due)
        .bind(id)
        .bind(user_id)
        .fetch_optional(db)
        .await
}

/// Returns whether a row was deleted.
pub async fn delete_task(db: &Pool<Sqlite>, id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
    let rows_affected = query("DELETE FROM tasks WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?
        .rows_affected();
    Ok(rows_affected > 0)
}
