//! Resource records and the typed inputs the validator produces.

use crate::response::Timestamp;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: Timestamp,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: Timestamp,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Address {
    pub id: i64,
    pub user_id: i64,
    pub street: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: Timestamp,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: Timestamp,
}

/// A user together with every address it owns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UserWithAddresses {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: Timestamp,
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: Timestamp,
    pub addresses: Vec<Address>,
}

impl UserWithAddresses {
    pub fn new(user: User, addresses: Vec<Address>) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
            addresses,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, ToSchema)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Partial user update. `None` leaves the stored value untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, ToSchema)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, ToSchema)]
pub struct NewAddress {
    pub user_id: i64,
    pub street: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
}

/// Partial address update. `None` leaves the stored value untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, ToSchema)]
pub struct AddressPatch {
    pub user_id: Option<i64>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
}

/// Page size cap for address listings.
pub const MAX_LIMIT: u32 = 1000;

/// Validated address listing filter.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AddressQuery {
    pub pincode: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Resolved LIMIT/OFFSET window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Window {
    pub limit: i64,
    pub offset: i64,
}

impl AddressQuery {
    pub fn by_pincode(pincode: impl Into<String>) -> Self {
        Self {
            pincode: Some(pincode.into()),
            ..Self::default()
        }
    }

    /// Pagination only applies when a limit is given; pages are 1-based.
    pub fn window(&self) -> Option<Window> {
        let limit = i64::from(self.limit?.clamp(1, MAX_LIMIT));
        let page = i64::from(self.page.unwrap_or(1).max(1));
        Some(Window {
            limit,
            offset: (page - 1) * limit,
        })
    }
}
