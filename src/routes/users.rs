use crate::handlers::users::{create_user, delete_user, get_user, list_users, list_users_with_addresses, update_user};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn user_routes(state: AppState) -> Router {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/aggregate", get(list_users_with_addresses))
        .route("/users/:id", get(get_user).put(update_user).delete(delete_user))
        .with_state(state)
}
