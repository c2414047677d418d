use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{sync::Arc, time::Duration};

use crate::{
    config::AppConfig,
    repositories::{employees::PgEmployeeDirectory, shifts::PgShiftStore},
    services::roster::SaveGuard,
};

#[derive(Clone)]
pub struct AppState {
    pool: PgPool,
    config: Arc<AppConfig>,
    saves: Arc<SaveGuard>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        Ok(Self::with_pool(pool, config))
    }

    pub fn with_pool(pool: PgPool, config: AppConfig) -> Self {
        Self {
            pool,
            config: Arc::new(config),
            saves: Arc::new(SaveGuard::default()),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn saves(&self) -> &SaveGuard {
        &self.saves
    }

    pub fn shift_store(&self) -> PgShiftStore {
        PgShiftStore::new(self.pool.clone())
    }

    pub fn directory(&self) -> PgEmployeeDirectory {
        PgEmployeeDirectory::new(self.pool.clone())
    }
}
