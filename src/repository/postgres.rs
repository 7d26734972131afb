//! PostgreSQL-backed repository.

use super::{AddressRepository, Repository, UserRepository};
use crate::error::AppError;
use crate::model::{Address, AddressPatch, AddressQuery, NewAddress, NewUser, User, UserPatch, UserWithAddresses};
use crate::sql::{
    address_assignments, select_addresses, select_users_with_addresses, update_by_id, user_assignments,
    ADDRESSES_TABLE, ADDRESS_COLUMNS, USERS_TABLE, USER_COLUMNS,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;

#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    first_name: String,
    last_name: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            created_at: row.created_at.into(),
            updated_at: row.updated_at.into(),
        }
    }
}

#[derive(sqlx::FromRow)]
struct AddressRow {
    id: i64,
    user_id: i64,
    street: String,
    city: String,
    state: String,
    pincode: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<AddressRow> for Address {
    fn from(row: AddressRow) -> Self {
        Address {
            id: row.id,
            user_id: row.user_id,
            street: row.street,
            city: row.city,
            state: row.state,
            pincode: row.pincode,
            created_at: row.created_at.into(),
            updated_at: row.updated_at.into(),
        }
    }
}

/// Addresses arrive as a JSON aggregate, so their timestamps are text until deserialized.
#[derive(sqlx::FromRow)]
struct UserWithAddressesRow {
    #[sqlx(flatten)]
    user: UserRow,
    addresses: Json<Vec<Address>>,
}

#[async_trait]
impl UserRepository for PgRepository {
    async fn create_user(&self, input: NewUser) -> Result<User, AppError> {
        let sql = format!(
            "INSERT INTO {} (first_name, last_name, email) VALUES ($1, $2, $3) RETURNING {}",
            USERS_TABLE, USER_COLUMNS
        );
        tracing::debug!(sql = %sql, "query");
        let row: UserRow = sqlx::query_as(&sql)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.email)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let sql = format!("SELECT {} FROM {} ORDER BY id", USER_COLUMNS, USERS_TABLE);
        tracing::debug!(sql = %sql, "query");
        let rows: Vec<UserRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn find_user(&self, id: i64) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM {} WHERE id = $1", USER_COLUMNS, USERS_TABLE);
        tracing::debug!(sql = %sql, id, "query");
        let row: Option<UserRow> = sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row.map(User::from))
    }

    async fn update_user(&self, id: i64, patch: UserPatch) -> Result<Option<User>, AppError> {
        let mut qb = update_by_id(USERS_TABLE, id, user_assignments(&patch), USER_COLUMNS);
        tracing::debug!(sql = %qb.sql(), id, "query");
        let row = qb.build_query_as::<UserRow>().fetch_optional(&self.pool).await?;
        Ok(row.map(User::from))
    }

    async fn delete_user(&self, id: i64) -> Result<bool, AppError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", USERS_TABLE);
        tracing::debug!(sql = %sql, id, "query");
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_users_with_addresses(&self) -> Result<Vec<UserWithAddresses>, AppError> {
        let sql = select_users_with_addresses();
        tracing::debug!(sql = %sql, "query");
        let rows: Vec<UserWithAddressesRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        Ok(rows
            .into_iter()
            .map(|row| UserWithAddresses::new(row.user.into(), row.addresses.0))
            .collect())
    }
}

#[async_trait]
impl AddressRepository for PgRepository {
    async fn create_address(&self, input: NewAddress) -> Result<Address, AppError> {
        let sql = format!(
            "INSERT INTO {} (user_id, street, city, state, pincode) VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            ADDRESSES_TABLE, ADDRESS_COLUMNS
        );
        tracing::debug!(sql = %sql, "query");
        let row: AddressRow = sqlx::query_as(&sql)
            .bind(input.user_id)
            .bind(&input.street)
            .bind(&input.city)
            .bind(&input.state)
            .bind(&input.pincode)
            .fetch_one(&self.pool)
            .await?;
        Ok(row.into())
    }

    async fn list_addresses(&self, query: &AddressQuery) -> Result<Vec<Address>, AppError> {
        let mut qb = select_addresses(query);
        tracing::debug!(sql = %qb.sql(), "query");
        let rows = qb.build_query_as::<AddressRow>().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(Address::from).collect())
    }

    async fn find_address(&self, id: i64) -> Result<Option<Address>, AppError> {
        let sql = format!("SELECT {} FROM {} WHERE id = $1", ADDRESS_COLUMNS, ADDRESSES_TABLE);
        tracing::debug!(sql = %sql, id, "query");
        let row: Option<AddressRow> = sqlx::query_as(&sql).bind(id).fetch_optional(&self.pool).await?;
        Ok(row.map(Address::from))
    }

    async fn update_address(&self, id: i64, patch: AddressPatch) -> Result<Option<Address>, AppError> {
        let mut qb = update_by_id(ADDRESSES_TABLE, id, address_assignments(&patch), ADDRESS_COLUMNS);
        tracing::debug!(sql = %qb.sql(), id, "query");
        let row = qb.build_query_as::<AddressRow>().fetch_optional(&self.pool).await?;
        Ok(row.map(Address::from))
    }

    async fn delete_address(&self, id: i64) -> Result<bool, AppError> {
        let sql = format!("DELETE FROM {} WHERE id = $1", ADDRESSES_TABLE);
        tracing::debug!(sql = %sql, id, "query");
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl Repository for PgRepository {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
