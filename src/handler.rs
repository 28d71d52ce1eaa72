use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Extension, Form, Json,
};
use axum_extra::extract::{
    cookie::{Cookie, CookieJar, SameSite},
    WithRejection,
};
use serde_json::json;

use crate::{
    db,
    error::{AppError, AppResult},
    identity::IDENTITY_COOKIE,
    model::{Identity, Task, User},
    schema::{ListQuery, TaskForm, UserForm},
    view::View,
    AppState,
};

// Handler for the health checker route
pub async fn health_checker_handler() -> impl IntoResponse {
    Json(json!({
        "status": "success",
        "message": "Task tracker is running"
    }))
}

// Catch-all for unmatched routes
pub async fn not_found_handler() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}

// GET / : the requester's tasks, ordered by `?sort=`
pub async fn list_tasks(
    State(data): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    WithRejection(Query(query), _): WithRejection<Query<ListQuery>, AppError>,
) -> AppResult<View> {
    let sort = query.sort_key()?;

    let tasks = match identity.user_id() {
        Some(user_id) => db::list_tasks(&data.db, user_id, sort).await?,
        None => Vec::new(),
    };

    Ok(View::new("tasks/index", &identity)
        .with("sort", sort.column())
        .with("tasks", tasks))
}

// GET /add
pub async fn new_task_form(Extension(identity): Extension<Identity>) -> View {
    View::new("tasks/new", &identity)
}

// POST /add
pub async fn create_task(
    State(data): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    WithRejection(Form(body), _): WithRejection<Form<TaskForm>, AppError>,
) -> AppResult<Redirect> {
    let user_id = identity.user_id().ok_or(AppError::AuthenticationRequired)?;

    let task = db::create_task(&data.db, user_id, &body).await?;
    tracing::info!(task_id = task.id, user_id, "task created");

    Ok(Redirect::to(&format!("/tasks/{}", task.id)))
}

// GET /tasks/:id
pub async fn get_task(
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    State(data): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> AppResult<View> {
    let task = owned_task(&data, &identity, id).await?;
    Ok(View::new("tasks/show", &identity).with("task", task))
}

// GET /tasks/:id/edit
pub async fn edit_task_form(
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    State(data): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> AppResult<View> {
    let task = owned_task(&data, &identity, id).await?;
    Ok(View::new("tasks/edit", &identity).with("task", task))
}

// PUT /tasks/:id
pub async fn update_task(
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    State(data): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    WithRejection(Form(body), _): WithRejection<Form<TaskForm>, AppError>,
) -> AppResult<Redirect> {
    let user_id = identity.user_id().ok_or_else(|| task_not_found(id))?;

    let task = db::update_task(&data.db, id, user_id, &body)
        .await?
        .ok_or_else(|| task_not_found(id))?;
    tracing::info!(task_id = task.id, user_id, "task updated");

    Ok(Redirect::to(&format!("/tasks/{}", task.id)))
}

// DELETE /tasks/:id
pub async fn delete_task(
    WithRejection(Path(id), _): WithRejection<Path<i64>, AppError>,
    State(data): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> AppResult<Redirect> {
    let user_id = identity.user_id().ok_or_else(|| task_not_found(id))?;

    if !db::delete_task(&data.db, id, user_id).await? {
        return Err(task_not_found(id));
    }
    tracing::info!(task_id = id, user_id, "task deleted");

    Ok(Redirect::to("/"))
}

// GET /register
pub async fn register_form(Extension(identity): Extension<Identity>) -> View {
    View::new("users/register", &identity)
}

// POST /register
pub async fn register(
    State(data): State<Arc<AppState>>,
    jar: CookieJar,
    WithRejection(Form(body), _): WithRejection<Form<UserForm>, AppError>,
) -> AppResult<impl IntoResponse> {
    let username = body.username.trim();
    if username.is_empty() {
        return Err(AppError::Validation("username is required".to_string()));
    }

    let user = db::create_user(&data.db, username).await.map_err(|err| {
        match AppError::from(err) {
            AppError::Conflict(_) => AppError::Conflict(format!("username `{username}` is taken")),
            other => other,
        }
    })?;
    tracing::info!(user_id = user.id, username = %user.username, "user registered");

    let jar = jar.add(identity_cookie(&data, &user)?);
    Ok((jar, Redirect::to("/")))
}

// GET /login
pub async fn login_form(Extension(identity): Extension<Identity>) -> View {
    View::new("users/login", &identity)
}

// POST /login
pub async fn login(
    State(data): State<Arc<AppState>>,
    jar: CookieJar,
    WithRejection(Form(body), _): WithRejection<Form<UserForm>, AppError>,
) -> AppResult<impl IntoResponse> {
    let user = db::find_user_by_username(&data.db, body.username.trim())
        .await?
        .ok_or_else(|| AppError::Validation("unknown username".to_string()))?;
    tracing::info!(user_id = user.id, username = %user.username, "user logged in");

    let jar = jar.add(identity_cookie(&data, &user)?);
    Ok((jar, Redirect::to("/")))
}

// POST /logout
pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(Cookie::build(IDENTITY_COOKIE, "").path("/").finish());
    (jar, Redirect::to("/"))
}

async fn owned_task(data: &AppState, identity: &Identity, id: i64) -> AppResult<Task> {
    let user_id = identity.user_id().ok_or_else(|| task_not_found(id))?;
    db::find_task(&data.db, id, user_id)
        .await?
        .ok_or_else(|| task_not_found(id))
}

fn task_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Task {id}"))
}

fn identity_cookie(data: &AppState, user: &User) -> AppResult<Cookie<'static>> {
    let value = data
        .identity
        .encode(user)
        .map_err(|err| AppError::Internal(err.to_string()))?;

    Ok(Cookie::build(IDENTITY_COOKIE, value)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish())
}
