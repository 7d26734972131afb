//! OpenAPI document for the users and addresses API, served at `/docs/openapi.json`.

use axum::{routing::get, Json, Router};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "User Address API",
        description = "CRUD for users and their addresses, with nested aggregation endpoints.",
    ),
    paths(
        crate::handlers::users::create_user,
        crate::handlers::users::list_users,
        crate::handlers::users::get_user,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user,
        crate::handlers::users::list_users_with_addresses,
        crate::handlers::addresses::create_address,
        crate::handlers::addresses::list_addresses,
        crate::handlers::addresses::get_address,
        crate::handlers::addresses::update_address,
        crate::handlers::addresses::delete_address,
        crate::handlers::addresses::list_addresses_with_pincode,
    ),
    components(schemas(crate::error::ErrorBody, crate::error::FieldError)),
    tags(
        (name = "Users", description = "User records"),
        (name = "Addresses", description = "Addresses owned by users"),
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn openapi_routes() -> Router {
    Router::new().route("/docs/openapi.json", get(openapi_json))
}
