mod from_row;
mod schema;
pub mod queries;

pub use schema::init_db;

use std::sync::Arc;
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;

use crate::clock::Clock;
use crate::engine::ActivationEngine;
use crate::registry::LicenseRegistry;
use crate::store::SqliteStore;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Application state shared by all request handlers
#[derive(Clone)]
pub struct AppState {
    /// Connection pool for read-only listing queries
    pub db: DbPool,
    pub engine: Arc<ActivationEngine<SqliteStore>>,
    pub registry: Arc<LicenseRegistry<SqliteStore>>,
    /// Bearer token for `/admin/*` routes (None = admin API locked)
    pub admin_api_key: Option<String>,
}

impl AppState {
    pub fn new(db: DbPool, clock: Arc<dyn Clock>, admin_api_key: Option<String>) -> Self {
        let store = SqliteStore::new(db.clone());
        Self {
            engine: Arc::new(ActivationEngine::new(store.clone(), clock.clone())),
            registry: Arc::new(LicenseRegistry::new(store, clock)),
            db,
            admin_api_key,
        }
    }
}

fn configure_connection(conn: &mut Connection) -> rusqlite::Result<()> {
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.busy_timeout(Duration::from_secs(5))
}

pub fn create_pool(database_path: &str) -> Result<DbPool, r2d2::Error> {
    let manager = SqliteConnectionManager::file(database_path).with_init(configure_connection);
    Pool::builder().max_size(10).build(manager)
}
