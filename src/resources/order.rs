use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::Resource;
use crate::client::Client;
use crate::error::ProviderError;
use crate::models::{decode, OrderModel};
use crate::provider::ProviderData;
use crate::schema::{Attribute, Block, NestedBlock, Schema};

/// An order of coffees.
///
/// Backs both `fsd_order` and `fsd_try`, which share one schema. Plans and
/// states are checked against [`OrderModel`] and then returned exactly as
/// given; no backend calls are made yet.
#[derive(Debug)]
pub struct OrderResource {
    suffix: &'static str,
    noun: &'static str,
    client: Option<Arc<Client>>,
}

impl OrderResource {
    /// The `fsd_order` resource.
    pub fn order() -> Box<dyn Resource> {
        Box::new(Self {
            suffix: "order",
            noun: "order",
            client: None,
        })
    }

    /// The `fsd_try` resource.
    pub fn try_order() -> Box<dyn Resource> {
        Box::new(Self {
            suffix: "try",
            noun: "try",
            client: None,
        })
    }

    /// The client received from the provider, if configured.
    pub fn client(&self) -> Option<&Arc<Client>> {
        self.client.as_ref()
    }
}

#[async_trait::async_trait]
impl Resource for OrderResource {
    fn type_suffix(&self) -> &'static str {
        self.suffix
    }

    fn schema(&self) -> Schema {
        let noun = self.noun;
        let coffee = Block::new()
            .with_description(format!("Coffee item in the {}.", noun))
            .with_attribute(
                "id",
                Attribute::required_int64().with_description("Numeric identifier of the coffee."),
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
            );

        let item = Block::new()
            .with_description(format!("List of items in the {}.", noun))
            .with_attribute(
                "quantity",
                Attribute::required_int64()
                    .with_description(format!("Count of this item in the {}.", noun)),
            )
            .with_block("coffee", NestedBlock::single(coffee).required());

        Schema::v0()
            .with_description(format!("Manages an {}.", noun))
            .with_attribute(
                "id",
                Attribute::computed_string()
                    .with_description(format!("Numeric identifier of the {}.", noun))
                    .with_use_state_for_unknown(),
            )
            .with_attribute(
                "last_updated",
                Attribute::computed_string().with_description(format!(
                    "Timestamp of the last update of the {}.",
                    noun
                )),
            )
            .with_block("items", NestedBlock::list(item).required())
    }

    fn configure(&mut self, data: &ProviderData) {
        self.client = Some(Arc::clone(&data.client));
    }

    async fn create(&self, planned_state: Value) -> Result<Value, ProviderError> {
        let plan: OrderModel = decode(&planned_state)?;
        debug!(resource = self.suffix, items = plan.items.len(), "Creating {}", self.noun);
        Ok(planned_state)
    }

    async fn read(&self, current_state: Value) -> Result<Value, ProviderError> {
        let state: OrderModel = decode(&current_state)?;
        debug!(resource = self.suffix, id = ?state.id, "Reading {}", self.noun);
        Ok(current_state)
    }

    async fn update(
        &self,
        _prior_state: Value,
        planned_state: Value,
    ) -> Result<Value, ProviderError> {
        let plan: OrderModel = decode(&planned_state)?;
        debug!(resource = self.suffix, id = ?plan.id, "Updating {}", self.noun);
        Ok(planned_state)
    }

    async fn delete(&self, current_state: Value) -> Result<(), ProviderError> {
        let state: OrderModel = decode(&current_state)?;
        debug!(resource = self.suffix, id = ?state.id, "Deleting {}", self.noun);
        Ok(())
    }
}
