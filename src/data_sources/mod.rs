//! Read-only data sources.

mod coffees;

pub use coffees::CoffeesDataSource;

use serde_json::Value;

use crate::error::ProviderError;
use crate::provider::ProviderData;
use crate::schema::Schema;

/// Constructs an unconfigured data source handler.
pub type DataSourceFactory = fn() -> Box<dyn DataSource>;

/// A data source exposed by the provider.
#[async_trait::async_trait]
pub trait DataSource: Send + Sync {
    /// Suffix appended to the provider type name (`coffees` → `fsd_coffees`).
    fn type_suffix(&self) -> &'static str;

    /// Schema of the data source.
    fn schema(&self) -> Schema;

    /// Receive the configured client.
    fn configure(&mut self, data: &ProviderData);

    /// Read the data source and return its state.
    async fn read(&self, config: Value) -> Result<Value, ProviderError>;
}
