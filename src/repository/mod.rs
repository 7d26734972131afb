//! Data access for users and addresses. The HTTP layer only sees the traits; the backend
//! (PostgreSQL or in-memory) is chosen once at startup and injected through `AppState`.

mod memory;
mod postgres;
mod schema;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;
pub use schema::{ensure_database_exists, ensure_tables};

use crate::error::AppError;
use crate::model::{Address, AddressPatch, AddressQuery, NewAddress, NewUser, User, UserPatch, UserWithAddresses};
use async_trait::async_trait;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, input: NewUser) -> Result<User, AppError>;

    async fn list_users(&self) -> Result<Vec<User>, AppError>;

    /// `None` when no user has this id.
    async fn find_user(&self, id: i64) -> Result<Option<User>, AppError>;

    /// Applies only the supplied fields. `None` when no user has this id.
    async fn update_user(&self, id: i64, patch: UserPatch) -> Result<Option<User>, AppError>;

    /// Returns whether a user was removed. Owned addresses go with it.
    async fn delete_user(&self, id: i64) -> Result<bool, AppError>;

    /// Every user with its addresses ordered by id; users without addresses get an empty list.
    async fn list_users_with_addresses(&self) -> Result<Vec<UserWithAddresses>, AppError>;
}

#[async_trait]
pub trait AddressRepository: Send + Sync {
    async fn create_address(&self, input: NewAddress) -> Result<Address, AppError>;

    async fn list_addresses(&self, query: &AddressQuery) -> Result<Vec<Address>, AppError>;

    async fn find_address(&self, id: i64) -> Result<Option<Address>, AppError>;

    async fn update_address(&self, id: i64, patch: AddressPatch) -> Result<Option<Address>, AppError>;

    async fn delete_address(&self, id: i64) -> Result<bool, AppError>;

    /// Without a pincode this is `list_addresses`; with one, exact matches only.
    async fn list_addresses_with_pincode(&self, pincode: Option<&str>) -> Result<Vec<Address>, AppError> {
        let query = match pincode {
            Some(p) => AddressQuery::by_pincode(p),
            None => AddressQuery::default(),
        };
        self.list_addresses(&query).await
    }
}

#[async_trait]
pub trait Repository: UserRepository + AddressRepository {
    /// Short backend name reported by readiness checks.
    fn backend(&self) -> &'static str;

    /// Cheap liveness check against the backing store.
    async fn ping(&self) -> Result<(), AppError>;
}
