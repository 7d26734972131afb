//! In-memory repository with the same constraints as the PostgreSQL tables: unique email,
//! address → user foreign key, cascade on user delete. Used with `STORAGE_BACKEND=memory` and in tests.

use super::{AddressRepository, Repository, UserRepository};
use crate::error::AppError;
use crate::model::{Address, AddressPatch, AddressQuery, NewAddress, NewUser, User, UserPatch, UserWithAddresses};
use crate::response::Timestamp;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

const EMAIL_CONSTRAINT: &str = "users_email_key";
const USER_FK_CONSTRAINT: &str = "addresses_user_id_fkey";

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    addresses: BTreeMap<i64, Address>,
    last_user_id: i64,
    last_address_id: i64,
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

#[derive(Clone, Default)]
pub struct MemoryRepository {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, AppError> {
        self.tables
            .read()
            .map_err(|_| AppError::Persistence("in-memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, AppError> {
        self.tables
            .write()
            .map_err(|_| AppError::Persistence("in-memory store lock poisoned".into()))
    }
}

#[async_trait]
impl UserRepository for MemoryRepository {
    async fn create_user(&self, input: NewUser) -> Result<User, AppError> {
        let mut t = self.write()?;
        if t.email_taken(&input.email, None) {
            return Err(AppError::unique_violation(Some(EMAIL_CONSTRAINT)));
        }
        t.last_user_id += 1;
        let now = Timestamp::now();
        let user = User {
            id: t.last_user_id,
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            created_at: now.clone(),
            updated_at: now,
        };
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        Ok(self.read()?.users.values().cloned().collect())
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn update_user(&self, id: i64, patch: UserPatch) -> Result<Option<User>, AppError> {
        let mut t = self.write()?;
        if !t.users.contains_key(&id) {
            return Ok(None);
        }
        if let Some(email) = &patch.email {
            if t.email_taken(email, Some(id)) {
                return Err(AppError::unique_violation(Some(EMAIL_CONSTRAINT)));
            }
        }
        let Some(user) = t.users.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = patch.first_name {
            user.first_name = v;
        }
        if let Some(v) = patch.last_name {
            user.last_name = v;
        }
        if let Some(v) = patch.email {
            user.email = v;
        }
        user.updated_at = Timestamp::now();
        Ok(Some(user.clone()))
    }

    async fn delete_user(&self, id: i64) -> Result<bool, AppError> {
        let mut t = self.write()?;
        if t.users.remove(&id).is_none() {
            return Ok(false);
        }
        t.addresses.retain(|_, a| a.user_id != id);
        Ok(true)
    }

    async fn list_users_with_addresses(&self) -> Result<Vec<UserWithAddresses>, AppError> {
        let t = self.read()?;
        Ok(t.users
            .values()
            .map(|user| {
                let owned = t
                    .addresses
                    .values()
                    .filter(|a| a.user_id == user.id)
                    .cloned()
                    .collect();
                UserWithAddresses::new(user.clone(), owned)
            })
            .collect())
    }
}

#[async_trait]
impl AddressRepository for MemoryRepository {
    async fn create_address(&self, input: NewAddress) -> Result<Address, AppError> {
        let mut t = self.write()?;
        if !t.users.contains_key(&input.user_id) {
            return Err(AppError::foreign_key_violation(Some(USER_FK_CONSTRAINT)));
        }
        t.last_address_id += 1;
        let now = Timestamp::now();
        let address = Address {
            id: t.last_address_id,
            user_id: input.user_id,
            street: input.street,
            city: input.city,
            state: input.state,
            pincode: input.pincode,
            created_at: now.clone(),
            updated_at: now,
        };
        t.addresses.insert(address.id, address.clone());
        Ok(address)
    }

    async fn list_addresses(&self, query: &AddressQuery) -> Result<Vec<Address>, AppError> {
        let t = self.read()?;
        let matching = t
            .addresses
            .values()
            .filter(|a| query.pincode.as_ref().map_or(true, |p| &a.pincode == p));
        let rows = match query.window() {
            Some(w) => matching
                .skip(usize::try_from(w.offset).unwrap_or(usize::MAX))
                .take(usize::try_from(w.limit).unwrap_or(usize::MAX))
                .cloned()
                .collect(),
            None => matching.cloned().collect(),
        };
        Ok(rows)
    }

    async fn find_address(&self, id: i64) -> Result<Option<Address>, AppError> {
        Ok(self.read()?.addresses.get(&id).cloned())
    }

    async fn update_address(&self, id: i64, patch: AddressPatch) -> Result<Option<Address>, AppError> {
        let mut t = self.write()?;
        if let Some(user_id) = patch.user_id {
            if t.addresses.contains_key(&id) && !t.users.contains_key(&user_id) {
                return Err(AppError::foreign_key_violation(Some(USER_FK_CONSTRAINT)));
            }
        }
        let Some(address) = t.addresses.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = patch.user_id {
            address.user_id = v;
        }
        if let Some(v) = patch.street {
            address.street = v;
        }
        if let Some(v) = patch.city {
            address.city = v;
        }
        if let Some(v) = patch.state {
            address.state = v;
        }
        if let Some(v) = patch.pincode {
            address.pincode = v;
        }
        address.updated_at = Timestamp::now();
        Ok(Some(address.clone()))
    }

    async fn delete_address(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.write()?.addresses.remove(&id).is_some())
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.read().map(|_| ())
    }
}
