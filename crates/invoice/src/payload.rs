//! Invoice payload types

use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A postal address with optional fields
///
/// Fields hold trimmed, non-empty strings only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_line1: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street_line2: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl Address {
    /// Build an address from a free-form JSON object
    ///
    /// Keeps string fields that are non-empty after trimming. Returns `None`
    /// for non-objects and for objects with no retained field.
    ///
    /// # Example
    /// ```ignore
    /// let address = Address::from_value(&json!({"city": " Austin ", "state": ""}));
    /// assert_eq!(address.unwrap().city.as_deref(), Some("Austin"));
    /// ```
    pub fn from_value(value: &Value) -> Option<Address> {
        let object = value.as_object()?;
        let field = |key: &str| {
            object
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let address = Address {
            full_name: field("fullName"),
            street_line1: field("streetLine1"),
            street_line2: field("streetLine2"),
            city: field("city"),
            state: field("state"),
            postal_code: field("postalCode"),
            country: field("country"),
            phone_number: field("phoneNumber"),
        };

        (!address.is_empty()).then_some(address)
    }

    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self == &Address::default()
    }
}

/// One line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceItem {
    pub id: String,
    pub product_name: String,
    #[serde(default)]
    pub product_sku: Option<String>,
    pub quantity: u32,
    pub unit_price: f64,
    pub line_total: f64,
    #[serde(default)]
    pub selected_size: Option<String>,
    #[serde(default)]
    pub selected_color: Option<String>,
}

/// Everything needed to render one invoice
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoicePayload {
    pub order_id: String,
    pub order_number: String,
    pub currency: String,
    pub subtotal: f64,
    #[serde(default)]
    pub shipping_fee: Option<f64>,
    #[serde(default)]
    pub tax: Option<f64>,
    pub total: f64,
    pub placed_at: DateTime<Utc>,
    #[serde(default)]
    pub fulfilled_at: Option<DateTime<Utc>>,
    pub customer_id: String,
    #[serde(default)]
    pub customer_name: Option<String>,
    pub customer_email: String,
    #[serde(default, deserialize_with = "deserialize_address")]
    pub shipping_address: Option<Address>,
    #[serde(default, deserialize_with = "deserialize_address")]
    pub billing_address: Option<Address>,
    #[serde(default)]
    pub items: Vec<InvoiceItem>,
}

impl InvoicePayload {
    /// Parse a payload from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Address for the "Bill to" block (billing, else shipping)
    pub fn bill_to(&self) -> Option<&Address> {
        present(&self.billing_address).or_else(|| present(&self.shipping_address))
    }

    /// Address for the "Ship to" block (shipping, else billing)
    pub fn ship_to(&self) -> Option<&Address> {
        present(&self.shipping_address).or_else(|| present(&self.billing_address))
    }
}

fn present(address: &Option<Address>) -> Option<&Address> {
    address.as_ref().filter(|a| !a.is_empty())
}

/// Normalise free-form address objects on the way in
fn deserialize_address<'de, D>(deserializer: D) -> std::result::Result<Option<Address>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Address::from_value))
}
