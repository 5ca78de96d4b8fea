use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use super::DataSource;
use crate::client::Client;
use crate::error::ProviderError;
use crate::models::{encode, CoffeeModel};
use crate::provider::ProviderData;
use crate::schema::{Attribute, Block, NestedBlock, Schema};

/// Identifier reported by list data sources.
pub const PLACEHOLDER_ID: &str = "placeholder";

/// Lists coffees.
///
/// Backs `fsd_coffees` (list under `coffees`) and `fsd_try` (list under
/// `try`). The list is empty until the backend listing is wired in.
#[derive(Debug)]
pub struct CoffeesDataSource {
    suffix: &'static str,
    list_attribute: &'static str,
    client: Option<Arc<Client>>,
}

impl CoffeesDataSource {
    /// The `fsd_coffees` data source.
    pub fn coffees() -> Box<dyn DataSource> {
        Box::new(Self {
            suffix: "coffees",
            list_attribute: "coffees",
            client: None,
        })
    }

    /// The `fsd_try` data source.
    pub fn try_list() -> Box<dyn DataSource> {
        Box::new(Self {
            suffix: "try",
            list_attribute: "try",
            client: None,
        })
    }

    /// The client received from the provider, if configured.
    pub fn client(&self) -> Option<&Arc<Client>> {
        self.client.as_ref()
    }
}

#[async_trait::async_trait]
impl DataSource for CoffeesDataSource {
    fn type_suffix(&self) -> &'static str {
        self.suffix
    }

    fn schema(&self) -> Schema {
        let ingredient = Block::new().with_attribute(
            "id",
            Attribute::computed_int64()
                .with_description("Numeric identifier of the coffee ingredient."),
        );

        let coffee = Block::new()
            .with_attribute(
                "id",
                Attribute::computed_int64().with_description("Numeric identifier of the coffee."),
            )
            .with_attribute(
                "name",
                Attribute::computed_string().with_description("Product name of the coffee."),
            )
            .with_attribute(
                "teaser",
                Attribute::computed_string().with_description("Fun tagline for the coffee."),
            )
            .with_attribute(
                "description",
                Attribute::computed_string().with_description("Product description of the coffee."),
            )
            .with_attribute(
                "price",
                Attribute::computed_float64().with_description("Suggested cost of the coffee."),
            )
            .with_attribute(
                "image",
                Attribute::computed_string().with_description("URI for an image of the coffee."),
            )
            .with_block(
                "ingredients",
                NestedBlock::list(
                    ingredient.with_description("List of ingredients in the coffee."),
                )
                .computed(),
            );

        Schema::v0()
            .with_description(format!("Fetches the list of {}.", self.list_attribute))
            .with_attribute(
                "id",
                Attribute::computed_string().with_description("Placeholder identifier attribute."),
            )
            .with_block(
                self.list_attribute,
                NestedBlock::list(
                    coffee.with_description(format!("List of {}.", self.list_attribute)),
                )
                .computed(),
            )
    }

    fn configure(&mut self, data: &ProviderData) {
        self.client = Some(Arc::clone(&data.client));
    }

    async fn read(&self, _config: Value) -> Result<Value, ProviderError> {
        let coffees: Vec<CoffeeModel> = Vec::new();
        debug!(data_source = self.suffix, count = coffees.len(), "Read coffee list");

        let mut state = Map::new();
        state.insert("id".to_string(), Value::String(PLACEHOLDER_ID.to_string()));
        state.insert(self.list_attribute.to_string(), encode(&coffees)?);
        Ok(Value::Object(state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_read_placeholder_state() {
        let state = CoffeesDataSource::coffees().read(json!({})).await.unwrap();
        assert_eq!(state, json!({"id": "placeholder", "coffees": []}));

        let state = CoffeesDataSource::try_list().read(Value::Null).await.unwrap();
        assert_eq!(state, json!({"id": "placeholder", "try": []}));
    }

    #[test]
    fn test_schema_is_computed() {
        let schema = CoffeesDataSource::try_list().schema();
        assert!(schema.block.attributes["id"].flags.computed);

        let list = &schema.block.blocks["try"];
        assert!(list.computed);
        assert!(list.block.blocks.contains_key("ingredients"));
        assert_eq!(
            schema.block.description.as_deref(),
            Some("Fetches the list of try.")
        );
    }

    #[test]
    fn test_configure_receives_client() {
        let mut data_source = CoffeesDataSource {
            suffix: "coffees",
            list_attribute: "coffees",
            client: None,
        };
        assert!(data_source.client().is_none());

        let client = Client::new("https://api.example.com", "alice", "secret").unwrap();
        data_source.configure(&ProviderData::new(client));
        assert!(data_source.client().is_some());
    }
}
