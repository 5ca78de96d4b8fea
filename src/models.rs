//! Typed state models for resources and data sources.
//!
//! Computed attributes are `Option`s: they stay `null` until the backend
//! fills them in. A deferred value decodes the same way as `null`.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::error::ProviderError;
use crate::value::is_unknown_marker;

/// State of an order-shaped resource (`fsd_order`, `fsd_try`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderModel {
    /// Identifier assigned by the backend.
    #[serde(default)]
    pub id: Option<String>,
    /// Items in the order.
    #[serde(default)]
    pub items: Vec<OrderItemModel>,
    /// Timestamp of the last update made by the provider.
    #[serde(default)]
    pub last_updated: Option<String>,
}

/// A single line of an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItemModel {
    /// The coffee being ordered.
    pub coffee: OrderItemCoffeeModel,
    /// How many of it.
    pub quantity: i64,
}

/// The coffee referenced by an order item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItemCoffeeModel {
    /// Numeric identifier of the coffee.
    pub id: i64,
    /// Product name.
    #[serde(default)]
    pub name: Option<String>,
    /// Fun tagline.
    #[serde(default)]
    pub teaser: Option<String>,
    /// Product description.
    #[serde(default)]
    pub description: Option<String>,
    /// Suggested cost.
    #[serde(default)]
    pub price: Option<f64>,
    /// URI for an image of the coffee.
    #[serde(default)]
    pub image: Option<String>,
}

/// A coffee as listed by the data sources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoffeeModel {
    /// Numeric identifier of the coffee.
    pub id: Option<i64>,
    /// Product name.
    pub name: Option<String>,
    /// Fun tagline.
    pub teaser: Option<String>,
    /// Product description.
    pub description: Option<String>,
    /// Suggested cost.
    pub price: Option<f64>,
    /// URI for an image of the coffee.
    pub image: Option<String>,
    /// Ingredients in the coffee.
    #[serde(default)]
    pub ingredients: Vec<IngredientModel>,
}

/// Reference to a coffee ingredient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientModel {
    /// Numeric identifier of the ingredient.
    pub id: Option<i64>,
}

/// Decode a JSON state or plan into a model.
///
/// Deferred values anywhere in `value` decode as `null`; `value` itself is
/// left as it is.
pub fn decode<T: DeserializeOwned>(value: &Value) -> Result<T, ProviderError> {
    Ok(serde_json::from_value(known_only(value))?)
}

/// Copy of `value` with every deferred value replaced by `null`.
fn known_only(value: &Value) -> Value {
    match value {
        v if is_unknown_marker(v) => Value::Null,
        Value::Array(items) => Value::Array(items.iter().map(known_only).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), known_only(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Encode a model back into JSON state.
pub fn encode<T: Serialize>(model: &T) -> Result<Value, ProviderError> {
    Ok(serde_json::to_value(model)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::unknown_marker;
    use serde_json::json;

    #[test]
    fn test_order_with_computed_nulls() {
        let order: OrderModel = decode(&json!({
            "id": null,
            "items": [{"quantity": 2, "coffee": {"id": 1}}]
        }))
        .unwrap();

        assert!(order.id.is_none());
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.items[0].coffee.id, 1);
        assert!(order.items[0].coffee.price.is_none());

        let state = encode(&order).unwrap();
        assert_eq!(state["items"][0]["coffee"]["name"], Value::Null);
        assert_eq!(state["last_updated"], Value::Null);
    }

    #[test]
    fn test_order_rejects_bad_shape() {
        let err = decode::<OrderModel>(&json!({"items": [{"quantity": "two"}]})).unwrap_err();
        assert!(matches!(err, ProviderError::Serialization(_)));
    }

    #[test]
    fn test_coffee_listing_decodes() {
        let coffee: CoffeeModel = decode(&json!({
            "id": 1,
            "name": "Packer Spiced Latte",
            "teaser": "Packed with goodness to spice up your images",
            "description": null,
            "price": 350,
            "image": "/packer.png",
            "ingredients": [{"id": 1}, {"id": 2}]
        }))
        .unwrap();

        assert_eq!(coffee.price, Some(350.0));
        assert!(coffee.description.is_none());
        assert_eq!(coffee.ingredients.len(), 2);
        assert_eq!(coffee.ingredients[1], IngredientModel { id: Some(2) });
    }

    #[test]
    fn test_deferred_values_decode_as_null() {
        let plan = json!({
            "id": unknown_marker(),
            "last_updated": unknown_marker(),
            "items": [{"quantity": 1, "coffee": {"id": 2, "price": unknown_marker()}}]
        });
        let order: OrderModel = decode(&plan).unwrap();

        assert!(order.id.is_none());
        assert!(order.last_updated.is_none());
        assert!(order.items[0].coffee.price.is_none());
        assert_eq!(plan["id"], unknown_marker());
    }
}
