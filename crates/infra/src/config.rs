//! Store configuration (built once at startup by the binary and passed in).

/// Which backing stores to use and how to reach them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Postgres connection string; `None` selects the in-memory stores.
    pub database_url: Option<String>,
    pub max_connections: u32,
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        Self {
            database_url: None,
            max_connections: 1,
        }
    }

    pub fn is_persistent(&self) -> bool {
        self.database_url.is_some()
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::in_memory()
    }
}
