//! Invoice - paginated order invoice rendering
//!
//! This crate provides:
//! - Invoice payload types (serde, camelCase JSON)
//! - Address block formatting with billing/shipping fallback
//! - A paginated line-item table with repeating headers
//! - The document composer producing PDF bytes
//! - A process-wide font byte cache
//! - Order-to-payload mapping and invoice e-mail composition
//!
//! # Example
//!
//! ```ignore
//! use invoice::{render_invoice_pdf, InvoicePayload};
//!
//! let payload = InvoicePayload::from_json(payload_json)?;
//! let pdf_bytes = render_invoice_pdf(&payload)?;
//! ```

mod address;
mod composer;
mod config;
pub mod email;
mod fonts;
mod layout;
pub mod orders;
mod payload;
mod table;

pub use address::{address_block_height, address_lines, draw_address_block, NOT_PROVIDED};
pub use composer::{render_invoice_pdf, InvoiceRenderer, FONT_FAMILY, MARGIN};
pub use config::InvoiceConfig;
pub use email::{send_invoice_email, DeliveryReport, EmailDelivery, EmailMessage};
pub use fonts::{FontCache, FontVariant, FONT_DIR_ENV};
pub use layout::PageLayout;
pub use orders::{get_invoice_payload, InMemoryOrders, OrderLookup};
pub use payload::{Address, InvoiceItem, InvoicePayload};
pub use table::{draw_items, draw_table_header, item_details, Columns};

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while producing or sending an invoice
#[derive(Debug, Error)]
pub enum InvoiceError {
    #[error("Failed to read font asset {}: {source}", path.display())]
    FontAsset {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("PDF error: {0}")]
    PdfError(#[from] pdf_core::PdfError),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Order lookup failed: {0}")]
    LookupError(String),

    #[error("Email delivery failed: {0}")]
    Delivery(String),
}

/// Result type for invoice operations
pub type Result<T> = std::result::Result<T, InvoiceError>;
