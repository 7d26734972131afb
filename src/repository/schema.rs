//! Database bootstrap: create the database if missing, then the users / addresses tables.
//! Every statement is idempotent so startup can run it unconditionally.

use crate::error::AppError;
use crate::sql::{ADDRESSES_TABLE, USERS_TABLE};
use sqlx::postgres::PgConnectOptions;
use sqlx::ConnectOptions;
use sqlx::PgPool;
use std::str::FromStr;

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE. Call before creating the main pool.
pub async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let Some((admin, db_name)) = admin_target(database_url)? else {
        return Ok(());
    };
    let mut conn: sqlx::PgConnection = admin.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
        tracing::info!(database = %db_name, "database created");
    }
    Ok(())
}

/// Create tables and indexes if they do not exist. Deleting a user cascades to its addresses.
pub async fn ensure_tables(pool: &PgPool) -> Result<(), AppError> {
    for ddl in table_ddl() {
        sqlx::query(&ddl).execute(pool).await?;
    }
    tracing::info!("database schema ready");
    Ok(())
}

fn table_ddl() -> Vec<String> {
    vec![
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {users} (
                id BIGSERIAL PRIMARY KEY,
                first_name TEXT NOT NULL CHECK (first_name <> ''),
                last_name TEXT NOT NULL CHECK (last_name <> ''),
                email TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                CONSTRAINT users_email_key UNIQUE (email)
            )
            "#,
            users = USERS_TABLE
        ),
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {addresses} (
                id BIGSERIAL PRIMARY KEY,
                user_id BIGINT NOT NULL,
                street TEXT NOT NULL CHECK (street <> ''),
                city TEXT NOT NULL CHECK (city <> ''),
                state TEXT NOT NULL CHECK (state <> ''),
                pincode TEXT NOT NULL CHECK (pincode ~ '^[0-9]{{6}}$'),
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                CONSTRAINT addresses_user_id_fkey FOREIGN KEY (user_id)
                    REFERENCES {users} (id) ON DELETE CASCADE
            )
            "#,
            addresses = ADDRESSES_TABLE,
            users = USERS_TABLE
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS addresses_user_id_idx ON {} (user_id)",
            ADDRESSES_TABLE
        ),
        format!(
            "CREATE INDEX IF NOT EXISTS addresses_pincode_idx ON {} (pincode)",
            ADDRESSES_TABLE
        ),
    ]
}

/// Options for the `postgres` maintenance database on the same server, plus the database the
/// URL names. `None` when the URL names no database (libpq then uses the user name) or `postgres`.
fn admin_target(database_url: &str) -> Result<Option<(PgConnectOptions, String)>, AppError> {
    let opts = PgConnectOptions::from_str(database_url)?;
    let db_name = match opts.get_database() {
        Some(name) if !name.is_empty() && name != "postgres" => name.to_string(),
        _ => return Ok(None),
    };
    Ok(Some((opts.database("postgres"), db_name)))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
