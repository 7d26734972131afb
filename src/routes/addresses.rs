use crate::handlers::addresses::{
    create_address, delete_address, get_address, list_addresses, list_addresses_with_pincode, update_address,
};
use crate::state::AppState;
use axum::{routing::get, Router};

pub fn address_routes(state: AppState) -> Router {
    Router::new()
        .route("/addresses", get(list_addresses).post(create_address))
        .route("/addresses/aggregate", get(list_addresses_with_pincode))
        .route(
            "/addresses/:id",
            get(get_address).put(update_address).delete(delete_address),
        )
        .with_state(state)
}
