//! Mapping persisted orders to invoice payloads

use crate::payload::{Address, InvoiceItem, InvoicePayload};
use crate::Result;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Customer who placed an order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCustomer {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// A persisted order line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredOrderItem {
    pub id: String,
    pub product_name: String,
    #[serde(default)]
    pub product_sku: Option<String>,
    pub quantity: u32,
    pub unit_price: Decimal,
    #[serde(default)]
    pub selected_size: Option<String>,
    #[serde(default)]
    pub selected_color: Option<String>,
}

/// A persisted order with its customer and lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredOrder {
    pub id: String,
    pub order_number: String,
    pub currency: String,
    pub subtotal: Decimal,
    #[serde(default)]
    pub shipping_fee: Option<Decimal>,
    #[serde(default)]
    pub tax: Option<Decimal>,
    pub total: Decimal,
    pub placed_at: DateTime<Utc>,
    #[serde(default)]
    pub fulfilled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub customer: Option<StoredCustomer>,
    /// Free-form address object as stored
    #[serde(default)]
    pub shipping_address: Option<Value>,
    /// Free-form address object as stored
    #[serde(default)]
    pub billing_address: Option<Value>,
    #[serde(default)]
    pub items: Vec<StoredOrderItem>,
}

/// Source of persisted orders
pub trait OrderLookup {
    /// Find an order with its customer and items
    fn find_order(&self, order_id: &str) -> Result<Option<StoredOrder>>;
}

/// Orders held in memory, keyed by id
#[derive(Debug, Default)]
pub struct InMemoryOrders {
    orders: HashMap<String, StoredOrder>,
}

impl InMemoryOrders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an order
    pub fn insert(&mut self, order: StoredOrder) {
        self.orders.insert(order.id.clone(), order);
    }
}

impl OrderLookup for InMemoryOrders {
    fn find_order(&self, order_id: &str) -> Result<Option<StoredOrder>> {
        Ok(self.orders.get(order_id).cloned())
    }
}

/// Build the invoice payload for an order
///
/// Returns `None` when the order does not exist or its customer has no
/// e-mail address.
pub fn get_invoice_payload<L>(lookup: &L, order_id: &str) -> Result<Option<InvoicePayload>>
where
    L: OrderLookup + ?Sized,
{
    Ok(lookup.find_order(order_id)?.and_then(to_payload))
}

fn to_payload(order: StoredOrder) -> Option<InvoicePayload> {
    let customer = order.customer?;
    let customer_email = customer
        .email
        .map(|email| email.trim().to_string())
        .filter(|email| !email.is_empty())?;

    let items = order
        .items
        .into_iter()
        .map(|item| InvoiceItem {
            line_total: amount(item.unit_price * Decimal::from(item.quantity)),
            unit_price: amount(item.unit_price),
            id: item.id,
            product_name: item.product_name,
            product_sku: item.product_sku,
            quantity: item.quantity,
            selected_size: item.selected_size,
            selected_color: item.selected_color,
        })
        .collect();

    Some(InvoicePayload {
        order_id: order.id,
        order_number: order.order_number,
        currency: order.currency,
        subtotal: amount(order.subtotal),
        shipping_fee: order.shipping_fee.map(amount),
        tax: order.tax.map(amount),
        total: amount(order.total),
        placed_at: order.placed_at,
        fulfilled_at: order.fulfilled_at,
        customer_id: customer.id,
        customer_name: customer.name,
        customer_email,
        shipping_address: order.shipping_address.as_ref().and_then(Address::from_value),
        billing_address: order.billing_address.as_ref().and_then(Address::from_value),
        items,
    })
}

fn amount(value: Decimal) -> f64 {
    value.to_f64().unwrap_or_default()
}
