//! Service wiring: picks the storage backend and builds the domain services.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use sweetshop_auth::{AuthConfig, AuthService, PasswordError, UserStore};
use sweetshop_catalog::{CatalogService, SweetStore};
use sweetshop_infra::{
    InMemorySweetStore, InMemoryUserStore, PostgresSweetStore, PostgresUserStore, db,
};

use crate::config::AppConfig;

/// Everything a handler needs, shared behind an `Arc`.
#[derive(Clone)]
pub struct AppServices {
    pub auth: AuthService,
    pub catalog: CatalogService,
    pub app_name: String,
}

impl AppServices {
    pub fn from_stores(
        users: Arc<dyn UserStore>,
        sweets: Arc<dyn SweetStore>,
        auth_config: &AuthConfig,
        app_name: impl Into<String>,
    ) -> Result<Self, PasswordError> {
        Ok(Self {
            auth: AuthService::new(users, auth_config)?,
            catalog: CatalogService::new(sweets),
            app_name: app_name.into(),
        })
    }

    /// Process-local stores; state is lost on exit.
    pub fn in_memory(
        auth_config: &AuthConfig,
        app_name: impl Into<String>,
    ) -> Result<Self, PasswordError> {
        Self::from_stores(
            Arc::new(InMemoryUserStore::new()),
            Arc::new(InMemorySweetStore::new()),
            auth_config,
            app_name,
        )
    }
}

/// Build services for the configured backend (Postgres when `DATABASE_URL` is set).
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let services = match &config.database {
        None => {
            info!(backend = "memory", "storage selected");
            AppServices::in_memory(&config.auth, &config.app_name)?
        }
        Some(database) => {
            let pool = Arc::new(
                db::connect_and_migrate(&database.url, database.max_connections)
                    .await
                    .context("failed to connect to database")?,
            );
            info!(backend = "postgres", "storage selected");
            AppServices::from_stores(
                Arc::new(PostgresUserStore::new(pool.clone())),
                Arc::new(PostgresSweetStore::new(pool)),
                &config.auth,
                &config.app_name,
            )?
        }
    };

    Ok(services)
}
