//! Builds parameterized UPDATE and filtered SELECT statements. Column names only come from
//! the constants in this module; every value is bound.

use crate::model::{AddressPatch, AddressQuery, UserPatch};
use sqlx::{Postgres, QueryBuilder};

pub const USERS_TABLE: &str = "users";
pub const ADDRESSES_TABLE: &str = "addresses";

pub const USER_COLUMNS: &str = "id, first_name, last_name, email, created_at, updated_at";
pub const ADDRESS_COLUMNS: &str = "id, user_id, street, city, state, pincode, created_at, updated_at";

/// A single bound value in a SET list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SqlValue {
    Int(i64),
    Text(String),
}

/// Column assignments carried by a user patch, in column order.
pub fn user_assignments(patch: &UserPatch) -> Vec<(&'static str, SqlValue)> {
    let mut sets = Vec::new();
    if let Some(v) = &patch.first_name {
        sets.push(("first_name", SqlValue::Text(v.clone())));
    }
    if let Some(v) = &patch.last_name {
        sets.push(("last_name", SqlValue::Text(v.clone())));
    }
    if let Some(v) = &patch.email {
        sets.push(("email", SqlValue::Text(v.clone())));
    }
    sets
}

/// Column assignments carried by an address patch, in column order.
pub fn address_assignments(patch: &AddressPatch) -> Vec<(&'static str, SqlValue)> {
    let mut sets = Vec::new();
    if let Some(v) = patch.user_id {
        sets.push(("user_id", SqlValue::Int(v)));
    }
    for (col, val) in [
        ("street", &patch.street),
        ("city", &patch.city),
        ("state", &patch.state),
        ("pincode", &patch.pincode),
    ] {
        if let Some(v) = val {
            sets.push((col, SqlValue::Text(v.clone())));
        }
    }
    sets
}

/// UPDATE by id: SET only the given columns, always refresh updated_at, RETURNING `returning`.
pub fn update_by_id(
    table: &str,
    id: i64,
    sets: Vec<(&'static str, SqlValue)>,
    returning: &str,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("UPDATE {} SET ", table));
    {
        let mut list = qb.separated(", ");
        for (col, val) in sets {
            list.push(format!("{} = ", col));
            match val {
                SqlValue::Int(n) => list.push_bind_unseparated(n),
                SqlValue::Text(s) => list.push_bind_unseparated(s),
            };
        }
        list.push("updated_at = NOW()");
    }
    qb.push(" WHERE id = ");
    qb.push_bind(id);
    qb.push(" RETURNING ");
    qb.push(returning);
    qb
}

/// SELECT addresses with optional exact pincode match, ORDER BY id, optional LIMIT/OFFSET.
pub fn select_addresses(query: &AddressQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {} FROM {}", ADDRESS_COLUMNS, ADDRESSES_TABLE));
    if let Some(pincode) = &query.pincode {
        qb.push(" WHERE pincode = ");
        qb.push_bind(pincode.clone());
    }
    qb.push(" ORDER BY id");
    if let Some(window) = query.window() {
        qb.push(" LIMIT ");
        qb.push_bind(window.limit);
        qb.push(" OFFSET ");
        qb.push_bind(window.offset);
    }
    qb
}

/// Every user with its addresses as a JSON array (`[]` when none), in one round trip.
pub fn select_users_with_addresses() -> String {
    format!(
        "SELECT {user_cols}, \
         (SELECT COALESCE(json_agg(row_to_json(sub) ORDER BY sub.id), '[]'::json) \
          FROM (SELECT {addr_cols} FROM {addresses} a WHERE a.user_id = u.id) sub) AS addresses \
         FROM {users} u ORDER BY u.id",
        user_cols = qualified_columns("u", USER_COLUMNS),
        addr_cols = qualified_columns("a", ADDRESS_COLUMNS),
        addresses = ADDRESSES_TABLE,
        users = USERS_TABLE,
    )
}

fn qualified_columns(alias: &str, columns: &str) -> String {
    columns
        .split(", ")
        .map(|c| format!("{}.{}", alias, c))
        .collect::<Vec<_>>()
        .join(", ")
}
