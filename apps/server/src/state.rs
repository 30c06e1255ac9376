//! Shared application state

use crate::{
    api::LinkBuilder,
    config::{Config, StoreBackend},
    db::{InMemoryStore, ModuleRepository, PostgresStore, UniversityRepository},
    services::{ModuleService, UniversityService},
    Result,
};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct AppStateOptions {
    pub run_migrations: bool,
}

impl Default for AppStateOptions {
    fn default() -> Self {
        Self {
            run_migrations: true,
        }
    }
}

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// `None` for the in-memory backend.
    pub db_pool: Option<PgPool>,
    pub university_service: Arc<UniversityService>,
    pub module_service: Arc<ModuleService>,
    pub links: LinkBuilder,
}

impl AppState {
    /// Initialize the application state
    pub async fn new(config: Config) -> Result<Self> {
        let options = AppStateOptions {
            run_migrations: config.database.run_migrations,
        };
        Self::new_with_options(config, options).await
    }

    pub async fn new_with_options(config: Config, options: AppStateOptions) -> Result<Self> {
        tracing::info!(
            backend = config.database.backend.as_str(),
            "Initializing application state..."
        );

        let config_arc = Arc::new(config);

        let (db_pool, universities, modules): (
            Option<PgPool>,
            Arc<dyn UniversityRepository>,
            Arc<dyn ModuleRepository>,
        ) = match config_arc.database.backend {
            StoreBackend::Postgres => {
                let pool = create_db_pool(config_arc.as_ref()).await?;

                if options.run_migrations {
                    tracing::info!("Running database migrations...");
                    sqlx::migrate!("./migrations").run(&pool).await?;
                }

                let store = Arc::new(PostgresStore::new(pool.clone()));
                let universities: Arc<dyn UniversityRepository> = store.clone();
                let modules: Arc<dyn ModuleRepository> = store;
                (Some(pool), universities, modules)
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory store; data is lost on restart");
                let store = Arc::new(InMemoryStore::new());
                let universities: Arc<dyn UniversityRepository> = store.clone();
                let modules: Arc<dyn ModuleRepository> = store;
                (None, universities, modules)
            }
        };

        Ok(Self::from_repositories(config_arc, db_pool, universities, modules))
    }

    /// Wire services over already constructed repositories.
    pub fn from_repositories(
        config: Arc<Config>,
        db_pool: Option<PgPool>,
        universities: Arc<dyn UniversityRepository>,
        modules: Arc<dyn ModuleRepository>,
    ) -> Self {
        let allow_update_create = config.api.allow_update_create;

        let module_service = Arc::new(ModuleService::new_with_policy(
            modules,
            universities.clone(),
            allow_update_create,
        ));
        let university_service = Arc::new(UniversityService::new_with_policy(
            universities,
            module_service.clone(),
            allow_update_create,
        ));
        let links = LinkBuilder::new(&config.server.public_base_url);

        tracing::info!("Application state initialized successfully");

        Self {
            config,
            db_pool,
            university_service,
            module_service,
            links,
        }
    }
}

async fn create_db_pool(config: &Config) -> Result<PgPool> {
    tracing::info!("Creating database connection pool...");

    let statement_timeout = config.database.statement_timeout_seconds;
    let lock_timeout = config.database.lock_timeout_seconds;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .min_connections(config.database.pool_min_size)
        .max_connections(config.database.pool_max_size)
        .acquire_timeout(std::time::Duration::from_secs(
            config.database.pool_timeout_seconds,
        ))
        .after_connect(move |conn, _meta| {
            Box::pin(async move {
                sqlx::query(&format!("SET statement_timeout = '{}s'", statement_timeout))
                    .execute(&mut *conn)
                    .await?;
                sqlx::query(&format!("SET lock_timeout = '{}s'", lock_timeout))
                    .execute(&mut *conn)
                    .await?;
                Ok(())
            })
        })
        .connect(&config.database.url)
        .await?;

    tracing::info!(
        min = config.database.pool_min_size,
        max = config.database.pool_max_size,
        "Database pool created"
    );

    Ok(pool)
}
