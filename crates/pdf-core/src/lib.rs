//! PDF Core - Low-level PDF writing
//!
//! This crate provides functionality for:
//! - Creating blank PDF documents with pages of any size
//! - Embedding subsetted TrueType font families (regular/bold)
//! - Inserting text at specific coordinates
//! - Drawing straight stroked lines
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{Align, FontFamilyBuilder, PdfDocument};
//!
//! let mut doc = PdfDocument::new();
//! let page = doc.add_page(612.0, 792.0)?;
//! doc.register_font_family("sans", FontFamilyBuilder::new().regular(regular_bytes))?;
//! doc.set_font("sans", 12.0)?;
//! doc.insert_text("Hello, World!", page, 50.0, 742.0, Align::Left)?;
//! let bytes = doc.to_bytes()?;
//! ```

mod document;
mod font;
mod text;

pub use document::{Color, PdfDocument, TextRun};
pub use font::{FontData, FontFamily, FontFamilyBuilder, FontWeight};
pub use text::{
    generate_line_operators, generate_text_operators, wrap_to_width, TextRenderContext,
};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Font not found: {0}")]
    FontNotFound(String),

    #[error("Font already exists: {0}")]
    FontAlreadyExists(String),

    #[error("Failed to parse font: {0}")]
    FontParseError(String),

    #[error("Font subset error: {0}")]
    FontSubsetError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Invalid page size: {0} x {1}")]
    InvalidPageSize(f64, f64),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Text alignment options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Common page sizes in points
pub mod page_size {
    /// US Letter width
    pub const LETTER_WIDTH: f64 = 612.0;
    /// US Letter height
    pub const LETTER_HEIGHT: f64 = 792.0;
    /// A4 width
    pub const A4_WIDTH: f64 = 595.28;
    /// A4 height
    pub const A4_HEIGHT: f64 = 841.89;
}
