//! [`PluginStore`] over the PostgreSQL plugin repository.

use async_trait::async_trait;

use plugreg_core::result::AppResult;
use plugreg_database::repositories::plugin::PluginRepository;
use plugreg_entity::plugin::model::PluginRecord;

use super::PluginStore;

#[async_trait]
impl PluginStore for PluginRepository {
    async fn install(&self) -> AppResult<bool> {
        PluginRepository::install(self).await
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<PluginRecord>> {
        PluginRepository::find_by_name(self, name).await
    }

    async fn insert(&self, name: &str, version: &str) -> AppResult<PluginRecord> {
        self.create(name, version).await
    }

    async fn delete(&self, name: &str) -> AppResult<bool> {
        self.delete_by_name(name).await
    }

    async fn list(&self) -> AppResult<Vec<PluginRecord>> {
        self.find_all().await
    }

    fn table(&self) -> &str {
        PluginRepository::table(self)
    }
}
