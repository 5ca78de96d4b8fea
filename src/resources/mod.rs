//! Managed resources.

mod order;

pub use order::OrderResource;

use serde_json::Value;

use crate::error::ProviderError;
use crate::provider::ProviderData;
use crate::schema::Schema;
use crate::types::{AttributeChange, PlanResult};
use crate::value::is_unknown_marker;

/// Constructs an unconfigured resource handler.
pub type ResourceFactory = fn() -> Box<dyn Resource>;

/// A resource type managed by the provider.
///
/// Handlers are created through a [`ResourceFactory`] and then receive the
/// shared [`ProviderData`] through [`Resource::configure`].
#[async_trait::async_trait]
pub trait Resource: Send + Sync {
    /// Suffix appended to the provider type name (`order` → `fsd_order`).
    fn type_suffix(&self) -> &'static str;

    /// Schema of the resource.
    fn schema(&self) -> Schema;

    /// Receive the configured client.
    fn configure(&mut self, data: &ProviderData);

    /// Plan changes. The default carries prior values forward for attributes
    /// marked `use_state_for_unknown` and diffs top-level attributes.
    async fn plan(
        &self,
        prior_state: Option<Value>,
        proposed_state: Value,
    ) -> Result<PlanResult, ProviderError> {
        Ok(plan_with_schema(
            &self.schema(),
            prior_state.as_ref(),
            proposed_state,
        ))
    }

    /// Create a new resource from the planned state.
    async fn create(&self, planned_state: Value) -> Result<Value, ProviderError>;

    /// Refresh the resource state.
    async fn read(&self, current_state: Value) -> Result<Value, ProviderError>;

    /// Apply the planned state to an existing resource.
    async fn update(&self, prior_state: Value, planned_state: Value)
        -> Result<Value, ProviderError>;

    /// Delete the resource.
    async fn delete(&self, current_state: Value) -> Result<(), ProviderError>;

    /// Import by identifier. The default stores the id in the `id` attribute.
    async fn import_state(&self, id: &str) -> Result<Value, ProviderError> {
        Ok(serde_json::json!({ "id": id }))
    }
}

/// Build a plan from the schema and the prior/proposed states.
pub fn plan_with_schema(schema: &Schema, prior: Option<&Value>, proposed: Value) -> PlanResult {
    if proposed.is_null() {
        let changes = AttributeChange::diff(prior, &Value::Null);
        return PlanResult::with_changes(Value::Null, changes, false);
    }

    let mut planned = proposed;
    if let (Some(Value::Object(prior)), Value::Object(planned)) = (prior, &mut planned) {
        for (name, attr) in &schema.block.attributes {
            if !attr.use_state_for_unknown {
                continue;
            }
            let unset = planned
                .get(name)
                .map_or(true, |v| v.is_null() || is_unknown_marker(v));
            if let (true, Some(prior_value)) = (unset, prior.get(name)) {
                planned.insert(name.clone(), prior_value.clone());
            }
        }
    }

    let changes = AttributeChange::diff(prior, &planned);
    if changes.is_empty() {
        PlanResult::no_change(planned)
    } else {
        PlanResult::with_changes(planned, changes, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Attribute;
    use crate::value::unknown_marker;
    use serde_json::json;

    fn schema() -> Schema {
        Schema::v0()
            .with_attribute(
                "id",
                Attribute::computed_string().with_use_state_for_unknown(),
            )
            .with_attribute("last_updated", Attribute::computed_string())
    }

    #[test]
    fn test_plan_keeps_prior_id() {
        let plan = plan_with_schema(
            &schema(),
            Some(&json!({"id": "7", "items": [1]})),
            json!({"id": null, "items": [2]}),
        );

        assert_eq!(plan.planned_state["id"], "7");
        assert_eq!(plan.changes.len(), 1);
        assert_eq!(plan.changes[0].path, "items");
        assert!(!plan.requires_replace);
    }

    #[test]
    fn test_plan_keeps_prior_id_over_deferred_value() {
        let plan = plan_with_schema(
            &schema(),
            Some(&json!({"id": "7", "last_updated": "then"})),
            json!({"id": unknown_marker(), "last_updated": unknown_marker()}),
        );

        assert_eq!(plan.planned_state["id"], "7");
        assert_eq!(plan.planned_state["last_updated"], unknown_marker());
        assert_eq!(plan.changes.len(), 1);
        assert_eq!(plan.changes[0].path, "last_updated");
    }

    #[test]
    fn test_plan_does_not_keep_unmarked_attributes() {
        let plan = plan_with_schema(
            &schema(),
            Some(&json!({"id": "7", "last_updated": "then"})),
            json!({"id": null, "last_updated": null}),
        );
        assert_eq!(plan.planned_state["last_updated"], Value::Null);
        assert_eq!(plan.changes.len(), 1);
        assert_eq!(plan.changes[0].path, "last_updated");
    }

    #[test]
    fn test_plan_delete() {
        let plan = plan_with_schema(&schema(), Some(&json!({"id": "7"})), Value::Null);
        assert!(plan.planned_state.is_null());
        assert_eq!(plan.changes, vec![AttributeChange::removed("id", json!("7"))]);
    }

    #[test]
    fn test_plan_no_change() {
        let state = json!({"id": "7", "items": [1]});
        let plan = plan_with_schema(&schema(), Some(&state), state.clone());
        assert!(plan.changes.is_empty());
        assert_eq!(plan.planned_state, state);
    }
}
