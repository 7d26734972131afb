//! Response envelopes and timestamp rendering for the wire format.

use crate::model::{Address, User, UserWithAddresses};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use utoipa::ToSchema;

/// A stored timestamp, either as the store's native type or already rendered as text
/// (JSON aggregates hand timestamps back as strings).
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Native(DateTime<Utc>),
    Text(String),
}

impl Timestamp {
    pub fn now() -> Self {
        Timestamp::Native(Utc::now())
    }

    /// ISO-8601 with millisecond precision and a `Z` suffix. Text is returned as-is.
    pub fn to_iso8601(&self) -> String {
        match self {
            Timestamp::Native(dt) => dt.to_rfc3339_opts(SecondsFormat::Millis, true),
            Timestamp::Text(s) => s.clone(),
        }
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Timestamp::Native(dt)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_iso8601())
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserCreated {
    pub message: String,
    pub user: User,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserUpdated {
    pub message: String,
    pub user: User,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserOne {
    pub user: User,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserList {
    pub users: Vec<User>,
    pub total: u64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UsersWithAddresses {
    pub success: bool,
    pub message: String,
    pub data: Vec<UserWithAddresses>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddressCreated {
    pub message: String,
    pub address: Address,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddressUpdated {
    pub message: String,
    pub address: Address,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddressOne {
    pub address: Address,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AddressList {
    pub addresses: Vec<Address>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Deleted {
    pub message: String,
    pub success: bool,
}

impl UserList {
    pub fn new(users: Vec<User>) -> Self {
        let total = users.len() as u64;
        Self { users, total }
    }
}

impl Deleted {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.into(),
            success: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn native_timestamps_render_as_iso8601() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).single().unwrap();
        assert_eq!(Timestamp::from(dt).to_iso8601(), "2024-03-09T14:05:07.000Z");
    }

    #[test]
    fn text_timestamps_pass_through() {
        let ts = Timestamp::Text("2024-03-09T14:05:07.000Z".into());
        let once = ts.to_iso8601();
        let twice = Timestamp::Text(once.clone()).to_iso8601();
        assert_eq!(once, "2024-03-09T14:05:07.000Z");
        assert_eq!(once, twice);
    }

    #[test]
    fn deserializes_rfc3339_as_native() {
        let ts: Timestamp = serde_json::from_str("\"2024-03-09T14:05:07.123456+00:00\"").unwrap();
        assert!(matches!(ts, Timestamp::Native(_)));
        assert_eq!(ts.to_iso8601(), "2024-03-09T14:05:07.123Z");
    }

    #[test]
    fn unparseable_strings_are_kept_as_text() {
        let ts: Timestamp = serde_json::from_str("\"yesterday\"").unwrap();
        assert_eq!(ts, Timestamp::Text("yesterday".into()));
    }

    #[test]
    fn serializes_as_plain_string() {
        let dt = Utc.with_ymd_and_hms(2023, 12, 31, 23, 59, 59).single().unwrap();
        let json = serde_json::to_value(Timestamp::from(dt)).unwrap();
        assert_eq!(json, serde_json::json!("2023-12-31T23:59:59.000Z"));
    }

    #[test]
    fn user_list_counts_total() {
        assert_eq!(UserList::new(Vec::new()).total, 0);
    }
}
