pub mod mem;
pub mod mysql;

use crate::config::Config;

use modbot::store::{self, Store};

use std::sync::Arc;

/// Connects to the store configured in `config`. Without a database
/// section an in-memory store is used.
pub async fn connect(config: &Config) -> store::Result<Arc<dyn Store>> {
    match &config.database {
        Some(database) => {
            log::info!("[STORE] Connecting to {} database", database.driver);

            let store = mysql::MysqlStore::connect(&database.connect_string()).await?;
            store.migrate().await?;

            Ok(Arc::new(store))
        }
        None => {
            log::warn!("[STORE] No database configured, data will not be persisted");

            Ok(Arc::new(mem::MemStore::new()))
        }
    }
}
