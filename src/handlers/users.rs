//! User handlers: create, list, read, update, delete, and the users-with-addresses aggregate.

use crate::error::{AppError, ErrorBody};
use crate::model::{NewUser, UserPatch};
use crate::response::{Deleted, UserCreated, UserList, UserOne, UserUpdated, UsersWithAddresses};
use crate::service::RequestValidator;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

const ID_LABEL: &str = "User ID";

fn not_found() -> AppError {
    AppError::NotFound("User not found".into())
}

#[utoipa::path(
    post,
    path = "/api/users",
    request_body = NewUser,
    responses(
        (status = 201, description = "User created", body = UserCreated),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 409, description = "Email already in use", body = ErrorBody),
    ),
    tag = "Users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<UserCreated>), AppError> {
    let body = RequestValidator::json_body(body)?;
    let input = RequestValidator::create_user(&body)?;
    let user = state.repo.create_user(input).await?;
    tracing::info!(user_id = user.id, "user created");
    Ok((
        StatusCode::CREATED,
        Json(UserCreated {
            message: "User created successfully".into(),
            user,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/users",
    responses((status = 200, description = "All users", body = UserList)),
    tag = "Users"
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<UserList>, AppError> {
    let users = state.repo.list_users().await?;
    Ok(Json(UserList::new(users)))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = UserOne),
        (status = 400, description = "Invalid id", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
    ),
    tag = "Users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UserOne>, AppError> {
    let id = RequestValidator::id_param(&id, ID_LABEL)?;
    let user = state.repo.find_user(id).await?.ok_or_else(not_found)?;
    Ok(Json(UserOne { user }))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    request_body = UserPatch,
    responses(
        (status = 200, description = "User updated", body = UserUpdated),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
        (status = 409, description = "Email already in use", body = ErrorBody),
    ),
    tag = "Users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<UserUpdated>, AppError> {
    let id = RequestValidator::id_param(&id, ID_LABEL)?;
    let body = RequestValidator::json_body(body)?;
    let patch = RequestValidator::update_user(&body)?;
    let user = state.repo.update_user(id, patch).await?.ok_or_else(not_found)?;
    tracing::info!(user_id = user.id, "user updated");
    Ok(Json(UserUpdated {
        message: "User updated successfully".into(),
        user,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User and its addresses deleted", body = Deleted),
        (status = 404, description = "User not found", body = ErrorBody),
    ),
    tag = "Users"
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>, AppError> {
    let id = RequestValidator::id_param(&id, ID_LABEL)?;
    if !state.repo.delete_user(id).await? {
        return Err(not_found());
    }
    tracing::info!(user_id = id, "user deleted");
    Ok(Json(Deleted::new("User deleted successfully")))
}

#[utoipa::path(
    get,
    path = "/api/users/aggregate",
    responses((status = 200, description = "Users with nested addresses", body = UsersWithAddresses)),
    tag = "Users"
)]
pub async fn list_users_with_addresses(
    State(state): State<AppState>,
) -> Result<Json<UsersWithAddresses>, AppError> {
    let data = state.repo.list_users_with_addresses().await?;
    Ok(Json(UsersWithAddresses {
        success: true,
        message: "Users with addresses fetched successfully".into(),
        data,
    }))
}
