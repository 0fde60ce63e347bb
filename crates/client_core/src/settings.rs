//! Durable settings slot backed by the sqlite storage crate.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use storage::Storage;

use crate::SettingsStore;

pub struct DurableSettingsStore {
    store: Storage,
}

impl DurableSettingsStore {
    pub async fn initialize(database_url: &str) -> Result<Arc<Self>> {
        let store = Storage::new(database_url)
            .await
            .with_context(|| format!("failed to initialize settings storage at '{database_url}'"))?;
        Ok(Arc::new(Self { store }))
    }
}

#[async_trait]
impl SettingsStore for DurableSettingsStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        self.store.load_setting(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.store.save_setting(key, value).await
    }
}
