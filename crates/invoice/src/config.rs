//! Invoice rendering configuration

use crate::Result;
use pdf_core::page_size::{LETTER_HEIGHT, LETTER_WIDTH};
use serde::{Deserialize, Serialize};

/// Rendering options
///
/// Every field has a default, so `{}` is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InvoiceConfig {
    /// Title printed at the top of the first page
    pub brand_name: String,
    /// Width of every page in points
    pub page_width: f64,
    /// Height of every page in points
    pub page_height: f64,
    /// Flate-compress content and font streams
    pub compress: bool,
    /// Closing sentence; defaults to a thank-you naming the brand
    pub thank_you_message: Option<String>,
}

impl Default for InvoiceConfig {
    fn default() -> Self {
        Self {
            brand_name: "Storefront".to_string(),
            page_width: LETTER_WIDTH,
            page_height: LETTER_HEIGHT,
            compress: true,
            thank_you_message: None,
        }
    }
}

impl InvoiceConfig {
    /// Parse configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// The closing sentence printed under the summary
    pub fn closing_message(&self) -> String {
        match &self.thank_you_message {
            Some(message) => message.clone(),
            None => format!(
                "Thank you for shopping with {}. If you have any questions about this invoice, \
                 reply to your order confirmation email and we will be happy to help.",
                self.brand_name
            ),
        }
    }
}
