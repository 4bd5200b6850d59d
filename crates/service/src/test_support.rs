#![cfg(test)]
use configs::DatabaseConfig;
use migration::MigratorTrait;
use models::db::connect_with_config;
use sea_orm::DatabaseConnection;

use crate::user::password::Hasher;

/// Fresh, migrated in-memory SQLite database; every call is isolated.
pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    let cfg = DatabaseConfig { url: "sqlite::memory:".into(), ..DatabaseConfig::default() };
    let db = connect_with_config(&cfg).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

/// Low-cost Argon2 parameters so hashing does not dominate test time.
pub fn fast_hasher() -> Hasher {
    Hasher::with_params(1024, 1, 1).expect("valid argon2 params")
}
