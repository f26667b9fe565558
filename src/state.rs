use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::session::SessionKeys;

/// Process-wide immutable state: configuration, the database pool facade,
/// and the session signing keys. Everything request-scoped lives on the
/// request itself.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub sessions: SessionKeys,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let sessions = SessionKeys::new(&config.auth.jwt_secret, config.auth.token_ttl_minutes);

        Ok(Self {
            config: Arc::new(config),
            store,
            sessions,
        })
    }
}
