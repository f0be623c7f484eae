//! Line-item table with page-break-aware rows

use crate::layout::PageLayout;
use crate::payload::InvoiceItem;
use crate::Result;
use invoice_format::format_currency_or_fallback;
use pdf_core::{Color, FontWeight};

const HEADER_SIZE: f32 = 10.0;
const ROW_SIZE: f32 = 10.0;
const SEPARATOR_OFFSET: f64 = 6.0;
const HEADER_ADVANCE: f64 = 20.0;
const ROW_SPACE: f64 = 22.0;
const ROW_ADVANCE: f64 = 18.0;
const COLUMN_GAP: f64 = 8.0;

/// Placeholder for items without SKU, size or color
pub const NO_DETAILS: &str = "—";

/// X coordinates of the five table columns
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Columns {
    pub item: f64,
    pub details: f64,
    pub qty: f64,
    pub price: f64,
    pub total: f64,
}

impl Columns {
    /// Column positions for a page of `width` with equal side margins
    pub fn for_page(width: f64, margin: f64) -> Self {
        let right = width - margin;
        Self {
            item: margin,
            details: margin + 160.0,
            qty: right - 170.0,
            price: right - 110.0,
            total: right - 50.0,
        }
    }

    fn item_width(&self) -> f64 {
        self.details - self.item - COLUMN_GAP
    }

    fn details_width(&self) -> f64 {
        self.qty - self.details - COLUMN_GAP
    }
}

/// Draw the column captions and separator at the cursor
///
/// Leaves the cursor below the separator. Runs on every page that holds
/// item rows.
pub fn draw_table_header(layout: &mut PageLayout<'_>) -> Result<Columns> {
    let columns = Columns::for_page(layout.width(), layout.margin());
    let y = layout.cursor();

    let captions = [
        ("Item", columns.item),
        ("Details", columns.details),
        ("Qty", columns.qty),
        ("Price", columns.price),
        ("Total", columns.total),
    ];
    for (caption, x) in captions {
        layout.text(caption, x, y, FontWeight::Bold, HEADER_SIZE)?;
    }

    let right = layout.width() - layout.margin();
    layout.rule(
        layout.margin(),
        right,
        y - SEPARATOR_OFFSET,
        0.5,
        Color::gray(0.6),
    )?;
    layout.advance(HEADER_ADVANCE);

    Ok(columns)
}

/// The "Details" cell: SKU, size and color joined with " • "
///
/// # Example
/// ```ignore
/// // sku "SKU-1", size "M", no color
/// assert_eq!(item_details(&item), "SKU SKU-1 • Size M");
/// ```
pub fn item_details(item: &InvoiceItem) -> String {
    let parts: Vec<String> = [
        item.product_sku.as_ref().map(|sku| format!("SKU {sku}")),
        item.selected_size.as_ref().map(|size| format!("Size {size}")),
        item.selected_color.as_ref().map(|color| format!("Color {color}")),
    ]
    .into_iter()
    .flatten()
    .collect();

    if parts.is_empty() {
        NO_DETAILS.to_string()
    } else {
        parts.join(" • ")
    }
}

/// Draw the header and every item row, breaking pages as needed
///
/// Items keep their given order. The header starts a new page when it would
/// not leave room for a first row, and each continuation page gets its own
/// header.
pub fn draw_items(
    layout: &mut PageLayout<'_>,
    items: &[InvoiceItem],
    currency: &str,
) -> Result<()> {
    layout.ensure_space(HEADER_ADVANCE + ROW_SPACE, |_| Ok(()))?;
    let mut columns = draw_table_header(layout)?;

    for item in items {
        let mut redrawn = None;
        layout.ensure_space(ROW_SPACE, |layout| {
            redrawn = Some(draw_table_header(layout)?);
            Ok(())
        })?;
        if let Some(new_columns) = redrawn {
            columns = new_columns;
        }

        draw_item_row(layout, &columns, item, currency)?;
    }

    Ok(())
}

fn draw_item_row(
    layout: &mut PageLayout<'_>,
    columns: &Columns,
    item: &InvoiceItem,
    currency: &str,
) -> Result<()> {
    let y = layout.cursor();

    let name = layout.fit_text(
        &item.product_name,
        columns.item_width(),
        FontWeight::Regular,
        ROW_SIZE,
    )?;
    let details = layout.fit_text(
        &item_details(item),
        columns.details_width(),
        FontWeight::Regular,
        ROW_SIZE,
    )?;

    let cells = [
        (name, columns.item),
        (details, columns.details),
        (item.quantity.to_string(), columns.qty),
        (format_currency_or_fallback(item.unit_price, currency), columns.price),
        (format_currency_or_fallback(item.line_total, currency), columns.total),
    ];
    for (text, x) in &cells {
        layout.text(text, *x, y, FontWeight::Regular, ROW_SIZE)?;
    }

    layout.advance(ROW_ADVANCE);
    Ok(())
}
