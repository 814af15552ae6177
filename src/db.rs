use backoff::backoff::Backoff;
use backoff::future::retry_notify;
use sea_orm::sea_query::{Index, IndexCreateStatement};
use sea_orm::{ConnectOptions, ConnectionTrait, DatabaseConnection, DbErr, Schema};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

use crate::config::DbSettings;
use crate::entities;
use crate::error::AppError;

/// Constant-delay policy that stops after `max_retries` retries.
#[derive(Debug, Clone)]
pub struct FixedRetry {
    delay: Duration,
    max_retries: u32,
    remaining: u32,
}

impl FixedRetry {
    pub fn new(delay: Duration, max_retries: u32) -> Self {
        Self {
            delay,
            max_retries,
            remaining: max_retries,
        }
    }
}

impl Backoff for FixedRetry {
    fn reset(&mut self) {
        self.remaining = self.max_retries;
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.delay)
    }
}

/// Lazily established, shared database handle.
///
/// The first successful `connect()` caches the connection; every later call
/// reuses it. A failed attempt leaves the cell empty, so the next caller
/// starts a fresh round of retries.
#[derive(Clone)]
pub struct Database {
    inner: Arc<Inner>,
}

struct Inner {
    settings: DbSettings,
    conn: OnceCell<DatabaseConnection>,
}

impl Database {
    pub fn new(settings: DbSettings) -> Self {
        Self {
            inner: Arc::new(Inner {
                settings,
                conn: OnceCell::new(),
            }),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.inner.conn.initialized()
    }

    #[tracing::instrument(skip(self))]
    pub async fn connect(&self) -> Result<&DatabaseConnection, AppError> {
        self.inner.conn.get_or_try_init(|| self.establish()).await
    }

    async fn establish(&self) -> Result<DatabaseConnection, AppError> {
        let settings = &self.inner.settings;
        let policy = FixedRetry::new(settings.retry_delay, settings.max_retries);

        let conn = retry_notify(
            policy,
            || {
                let options = connect_options(settings);
                async move {
                    sea_orm::Database::connect(options)
                        .await
                        .map_err(backoff::Error::transient)
                }
            },
            |err: DbErr, wait: Duration| {
                tracing::warn!(
                    "Database connection failed: {}. Retrying in {:.1}s...",
                    err,
                    wait.as_secs_f32()
                );
            },
        )
        .await
        .map_err(|err| {
            tracing::error!(
                "Giving up on database after {} attempt(s): {}",
                settings.max_retries + 1,
                err
            );
            AppError::DatabaseUnavailable(err.to_string())
        })?;

        if settings.sync_schema {
            sync_schema(&conn).await?;
        }

        tracing::info!("Database connection established");
        Ok(conn)
    }
}

fn connect_options(settings: &DbSettings) -> ConnectOptions {
    let mut options = ConnectOptions::new(settings.url.clone());
    options
        .max_connections(settings.max_connections)
        .connect_timeout(settings.connect_timeout)
        .acquire_timeout(settings.connect_timeout)
        .sqlx_logging(false);
    options
}

/// Creates any missing tables from the entity definitions.
pub async fn sync_schema(conn: &DatabaseConnection) -> Result<(), DbErr> {
    let backend = conn.get_database_backend();
    let schema = Schema::new(backend);

    // Parents before children so foreign keys resolve.
    let mut statements = vec![
        schema.create_table_from_entity(entities::OnboardingRecord),
        schema.create_table_from_entity(entities::Proposal),
        schema.create_table_from_entity(entities::MarketplaceItem),
        schema.create_table_from_entity(entities::BlockchainConnection),
        schema.create_table_from_entity(entities::BlockchainTransaction),
    ];

    for statement in statements.iter_mut() {
        statement.if_not_exists();
        conn.execute(backend.build(&*statement)).await?;
    }

    // Single-column indexes declared with `#[sea_orm(indexed)]`
    let indexes = [
        schema.create_index_from_entity(entities::OnboardingRecord),
        schema.create_index_from_entity(entities::Proposal),
        schema.create_index_from_entity(entities::MarketplaceItem),
        schema.create_index_from_entity(entities::BlockchainConnection),
        schema.create_index_from_entity(entities::BlockchainTransaction),
    ];
    for mut index in indexes.into_iter().flatten() {
        index.if_not_exists();
        conn.execute(backend.build(&index)).await?;
    }

    conn.execute(backend.build(&onboarding_once_per_role())).await?;

    tracing::debug!("Schema sync complete");
    Ok(())
}

/// A user holds at most one onboarding record per role.
fn onboarding_once_per_role() -> IndexCreateStatement {
    Index::create()
        .name("idx-onboarding_records-user_id-role")
        .table(entities::OnboardingRecord)
        .col(entities::onboarding_record::Column::UserId)
        .col(entities::onboarding_record::Column::Role)
        .unique()
        .if_not_exists()
        .to_owned()
}
