//! Address handlers: create, list (optionally by pincode), read, update, delete, and the pincode aggregate.

use crate::error::{AppError, ErrorBody};
use crate::model::{Address, AddressPatch, NewAddress};
use crate::response::{AddressCreated, AddressList, AddressOne, AddressUpdated, Deleted};
use crate::service::RequestValidator;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use std::collections::HashMap;

const ID_LABEL: &str = "Address ID";

fn not_found() -> AppError {
    AppError::NotFound("Address not found".into())
}

/// A supplied pincode that matches nothing is a 404, even though the query itself succeeded.
fn require_pincode_match(pincode: Option<&str>, addresses: &[Address]) -> Result<(), AppError> {
    if pincode.is_some() && addresses.is_empty() {
        return Err(AppError::NotFound("No addresses found for this pincode".into()));
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/api/addresses",
    request_body = NewAddress,
    responses(
        (status = 201, description = "Address created", body = AddressCreated),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 409, description = "Owning user does not exist", body = ErrorBody),
    ),
    tag = "Addresses"
)]
pub async fn create_address(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<AddressCreated>), AppError> {
    let body = RequestValidator::json_body(body)?;
    let input = RequestValidator::create_address(&body)?;
    let address = state.repo.create_address(input).await?;
    tracing::info!(address_id = address.id, user_id = address.user_id, "address created");
    Ok((
        StatusCode::CREATED,
        Json(AddressCreated {
            message: "Address created successfully".into(),
            address,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/addresses",
    params(
        ("pincode" = Option<String>, Query, description = "Exact 6-digit pincode"),
        ("page" = Option<String>, Query, description = "1-based page, used with limit"),
        ("limit" = Option<String>, Query, description = "Page size (max 1000)"),
    ),
    responses(
        (status = 200, description = "Matching addresses", body = AddressList),
        (status = 400, description = "Invalid filter", body = ErrorBody),
        (status = 404, description = "No addresses for this pincode", body = ErrorBody),
    ),
    tag = "Addresses"
)]
pub async fn list_addresses(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<AddressList>, AppError> {
    let query = RequestValidator::address_query(&params)?;
    let addresses = state.repo.list_addresses(&query).await?;
    // A later page can be empty while the pincode still matches rows on earlier ones.
    if query.window().map_or(true, |w| w.offset == 0) {
        require_pincode_match(query.pincode.as_deref(), &addresses)?;
    }
    Ok(Json(AddressList { addresses }))
}

#[utoipa::path(
    get,
    path = "/api/addresses/{id}",
    params(("id" = i64, Path, description = "Address ID")),
    responses(
        (status = 200, description = "Address found", body = AddressOne),
        (status = 400, description = "Invalid id", body = ErrorBody),
        (status = 404, description = "Address not found", body = ErrorBody),
    ),
    tag = "Addresses"
)]
pub async fn get_address(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AddressOne>, AppError> {
    let id = RequestValidator::id_param(&id, ID_LABEL)?;
    let address = state.repo.find_address(id).await?.ok_or_else(not_found)?;
    Ok(Json(AddressOne { address }))
}

#[utoipa::path(
    put,
    path = "/api/addresses/{id}",
    params(("id" = i64, Path, description = "Address ID")),
    request_body = AddressPatch,
    responses(
        (status = 200, description = "Address updated", body = AddressUpdated),
        (status = 400, description = "Invalid input", body = ErrorBody),
        (status = 404, description = "Address not found", body = ErrorBody),
        (status = 409, description = "Owning user does not exist", body = ErrorBody),
    ),
    tag = "Addresses"
)]
pub async fn update_address(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<AddressUpdated>, AppError> {
    let id = RequestValidator::id_param(&id, ID_LABEL)?;
    let body = RequestValidator::json_body(body)?;
    let patch = RequestValidator::update_address(&body)?;
    let address = state.repo.update_address(id, patch).await?.ok_or_else(not_found)?;
    tracing::info!(address_id = address.id, "address updated");
    Ok(Json(AddressUpdated {
        message: "Address updated successfully".into(),
        address,
    }))
}

#[utoipa::path(
    delete,
    path = "/api/addresses/{id}",
    params(("id" = i64, Path, description = "Address ID")),
    responses(
        (status = 200, description = "Address deleted", body = Deleted),
        (status = 404, description = "Address not found", body = ErrorBody),
    ),
    tag = "Addresses"
)]
pub async fn delete_address(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Deleted>, AppError> {
    let id = RequestValidator::id_param(&id, ID_LABEL)?;
    if !state.repo.delete_address(id).await? {
        return Err(not_found());
    }
    tracing::info!(address_id = id, "address deleted");
    Ok(Json(Deleted::new("Address deleted successfully")))
}

/// Without a pincode this lists everything (an empty store is an empty 200).
#[utoipa::path(
    get,
    path = "/api/addresses/aggregate",
    params(("pincode" = Option<String>, Query, description = "Exact 6-digit pincode")),
    responses(
        (status = 200, description = "Addresses, optionally narrowed by pincode", body = AddressList),
        (status = 400, description = "Invalid filter", body = ErrorBody),
        (status = 404, description = "No addresses for this pincode", body = ErrorBody),
    ),
    tag = "Addresses"
)]
pub async fn list_addresses_with_pincode(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<AddressList>, AppError> {
    let query = RequestValidator::address_query(&params)?;
    let pincode = query.pincode.as_deref();
    let addresses = state.repo.list_addresses_with_pincode(pincode).await?;
    require_pincode_match(pincode, &addresses)?;
    Ok(Json(AddressList { addresses }))
}
