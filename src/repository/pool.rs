//! Database connection pool.
//!
//! One pool is built per process at startup and shared by every request.
//! Connections are verified with a test query when checked out of the pool,
//! so a dropped server connection is replaced before a query runs on it.

#[cfg(feature = "postgres")]
use diesel_async::pooled_connection::deadpool::Pool as DeadPool;
#[cfg(feature = "postgres")]
use diesel_async::pooled_connection::{
    AsyncDieselConnectionManager, ManagerConfig, RecyclingMethod,
};
#[cfg(feature = "postgres")]
use diesel_async::AsyncPgConnection;

#[cfg(feature = "postgres")]
use super::util::to_diesel_error;

/// Diesel error type alias.
pub type DieselError = diesel::result::Error;

/// Pooled async PostgreSQL connection.
#[cfg(feature = "postgres")]
pub type PgConn = deadpool::managed::Object<AsyncDieselConnectionManager<AsyncPgConnection>>;

/// Pool sizing and connection options.
#[derive(Debug, Clone)]
pub struct PoolOptions {
    pub max_size: usize,
    /// Applied to both waiting for a free slot and creating a new connection.
    pub timeout: Option<std::time::Duration>,
    pub no_tls: bool,
}

impl Default for PoolOptions {
    fn default() -> Self {
        Self {
            max_size: 10,
            timeout: Some(std::time::Duration::from_secs(30)),
            no_tls: false,
        }
    }
}

/// PostgreSQL connection pool.
#[cfg(feature = "postgres")]
#[derive(Clone)]
pub struct PgPool {
    pool: DeadPool<AsyncPgConnection>,
}

#[cfg(feature = "postgres")]
impl PgPool {
    /// Create a new PostgreSQL pool. No connection is opened until first use.
    pub fn new(database_url: &str, options: &PoolOptions) -> Result<Self, DieselError> {
        let mut manager_config = ManagerConfig::default();
        manager_config.recycling_method = RecyclingMethod::Verified;
        if !options.no_tls && !super::util::url_disables_tls(database_url) {
            manager_config.custom_setup = Box::new(super::pg_tls::establish_tls_connection);
        }

        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new_with_config(
            database_url,
            manager_config,
        );

        let mut builder = DeadPool::builder(manager).max_size(options.max_size);
        if let Some(timeout) = options.timeout {
            builder = builder
                .runtime(deadpool::Runtime::Tokio1)
                .wait_timeout(Some(timeout))
                .create_timeout(Some(timeout));
        }

        let pool = builder.build().map_err(to_diesel_error)?;
        Ok(Self { pool })
    }

    /// Check out a verified connection.
    pub async fn get(&self) -> Result<PgConn, DieselError> {
        self.pool.get().await.map_err(to_diesel_error)
    }
}
