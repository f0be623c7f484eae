//! Invoice document composition

use crate::address::{address_block_height, draw_address_block};
use crate::config::InvoiceConfig;
use crate::fonts::{FontCache, FontVariant};
use crate::layout::PageLayout;
use crate::payload::InvoicePayload;
use crate::table::draw_items;
use crate::Result;
use chrono::{DateTime, Utc};
use invoice_format::{format_calendar_date, format_currency_or_fallback};
use pdf_core::{wrap_to_width, Color, FontFamilyBuilder, FontWeight, PdfDocument};
use tracing::{info, instrument};

/// Font family name registered on every invoice document
pub const FONT_FAMILY: &str = "invoice";

/// Page margin on all four sides
pub const MARGIN: f64 = 50.0;

const BRAND_SIZE: f32 = 20.0;
const BRAND_ADVANCE: f64 = 28.0;
const SUBTITLE_SIZE: f32 = 14.0;
const SUBTITLE_ADVANCE: f64 = 24.0;
const BODY_SIZE: f32 = 10.0;
const META_ADVANCE: f64 = 14.0;
const META_GAP: f64 = 6.0;
const META_GRAY: f32 = 0.35;
const SHIP_TO_OFFSET: f64 = 250.0;
const ADDRESS_GAP: f64 = 20.0;
const SUMMARY_GAP: f64 = 12.0;
const SUMMARY_SPACE: f64 = 120.0;
const SUMMARY_WIDTH: f64 = 200.0;
const SUMMARY_VALUE_OFFSET: f64 = 110.0;
const SUMMARY_ROW_ADVANCE: f64 = 16.0;
const CLOSING_GAP: f64 = 14.0;
const CLOSING_SPACE: f64 = 60.0;
const CLOSING_LINE_HEIGHT: f64 = 14.0;

/// Renders invoice payloads to PDF
pub struct InvoiceRenderer<'a> {
    /// Rendering options
    config: InvoiceConfig,
    /// Where font bytes come from
    fonts: &'a FontCache,
}

impl InvoiceRenderer<'static> {
    /// Create a renderer using the process-wide font cache
    pub fn new(config: &InvoiceConfig) -> Self {
        Self {
            config: config.clone(),
            fonts: FontCache::global(),
        }
    }
}

impl<'a> InvoiceRenderer<'a> {
    /// Use a specific font cache instead of the global one
    pub fn with_font_cache<'b>(self, fonts: &'b FontCache) -> InvoiceRenderer<'b> {
        InvoiceRenderer {
            config: self.config,
            fonts,
        }
    }

    pub fn config(&self) -> &InvoiceConfig {
        &self.config
    }

    /// Render an invoice to PDF bytes
    #[instrument(skip_all, fields(order_number = %payload.order_number))]
    pub fn render(&self, payload: &InvoicePayload) -> Result<Vec<u8>> {
        let doc = self.compose(payload)?;
        let pages = doc.page_count();
        let bytes = doc.to_bytes()?;

        info!(
            order_number = %payload.order_number,
            pages,
            bytes = bytes.len(),
            "rendered invoice"
        );
        Ok(bytes)
    }

    /// Lay out an invoice without serializing it
    pub fn compose(&self, payload: &InvoicePayload) -> Result<PdfDocument> {
        self.compose_at(payload, Utc::now())
    }

    /// Lay out an invoice, using `now` as the issue date when the order has
    /// not been fulfilled
    pub fn compose_at(&self, payload: &InvoicePayload, now: DateTime<Utc>) -> Result<PdfDocument> {
        let mut doc = self.new_document(payload)?;

        {
            let mut layout = PageLayout::new(
                &mut doc,
                self.config.page_width,
                self.config.page_height,
                MARGIN,
            )?;

            self.draw_heading(&mut layout)?;
            draw_metadata(&mut layout, payload, now)?;
            draw_addresses(&mut layout, payload)?;
            draw_items(&mut layout, &payload.items, &payload.currency)?;
            draw_summary(&mut layout, payload)?;
            self.draw_closing(&mut layout)?;
        }

        Ok(doc)
    }

    /// Blank document with both invoice faces registered
    fn new_document(&self, payload: &InvoicePayload) -> Result<PdfDocument> {
        let regular = self.fonts.get_font_bytes(FontVariant::Regular)?;
        let bold = self.fonts.get_font_bytes(FontVariant::Bold)?;

        let mut doc = PdfDocument::new();
        doc.set_compression(self.config.compress);
        doc.set_title(&format!("Invoice {}", payload.order_number));
        doc.register_font_family(
            FONT_FAMILY,
            FontFamilyBuilder::new().regular(regular).bold(bold),
        )?;

        Ok(doc)
    }

    fn draw_heading(&self, layout: &mut PageLayout<'_>) -> Result<()> {
        let x = layout.margin();

        layout.text(
            &self.config.brand_name,
            x,
            layout.cursor(),
            FontWeight::Bold,
            BRAND_SIZE,
        )?;
        layout.advance(BRAND_ADVANCE);

        layout.text("Invoice", x, layout.cursor(), FontWeight::Bold, SUBTITLE_SIZE)?;
        layout.advance(SUBTITLE_ADVANCE);

        Ok(())
    }

    /// Closing sentence wrapped to the content width
    fn draw_closing(&self, layout: &mut PageLayout<'_>) -> Result<()> {
        layout.advance(CLOSING_GAP);
        layout.ensure_space(CLOSING_SPACE, |_| Ok(()))?;

        let message = self.config.closing_message();
        let max_width = layout.content_width();
        let lines = {
            let measure = layout.measure_fn(FontWeight::Regular, BODY_SIZE)?;
            wrap_to_width(&message, max_width, measure)
        };

        for line in &lines {
            layout.ensure_space(CLOSING_LINE_HEIGHT, |_| Ok(()))?;
            let y = layout.cursor();
            layout.text(line, layout.margin(), y, FontWeight::Regular, BODY_SIZE)?;
            layout.advance(CLOSING_LINE_HEIGHT);
        }

        Ok(())
    }
}

/// Order number, issue date and placed date
fn draw_metadata(
    layout: &mut PageLayout<'_>,
    payload: &InvoicePayload,
    now: DateTime<Utc>,
) -> Result<()> {
    let issued = payload.fulfilled_at.unwrap_or(now);
    let lines = [
        format!("Order number: {}", payload.order_number),
        format!("Issued: {}", format_calendar_date(issued)),
        format!("Placed: {}", format_calendar_date(payload.placed_at)),
    ];

    layout.set_text_color(Color::gray(META_GRAY));
    for line in &lines {
        let y = layout.cursor();
        layout.text(line, layout.margin(), y, FontWeight::Regular, BODY_SIZE)?;
        layout.advance(META_ADVANCE);
    }
    layout.set_text_color(Color::black());
    layout.advance(META_GAP);

    Ok(())
}

/// "Bill to" and "Ship to" side by side, each falling back to the other
fn draw_addresses(layout: &mut PageLayout<'_>, payload: &InvoicePayload) -> Result<()> {
    let needed =
        address_block_height(payload.bill_to()).max(address_block_height(payload.ship_to()));
    layout.ensure_space(needed, |_| Ok(()))?;

    let top = layout.cursor();
    let left = layout.margin();

    let left_bottom = draw_address_block(layout, "Bill to", payload.bill_to(), left, top)?;
    let right_bottom = draw_address_block(
        layout,
        "Ship to",
        payload.ship_to(),
        left + SHIP_TO_OFFSET,
        top,
    )?;

    layout.set_cursor(left_bottom.min(right_bottom) - ADDRESS_GAP);
    Ok(())
}

/// Summary rows anchored right of center; Total in bold
///
/// A page break here does not repeat the table header.
fn draw_summary(layout: &mut PageLayout<'_>, payload: &InvoicePayload) -> Result<()> {
    layout.advance(SUMMARY_GAP);
    layout.ensure_space(SUMMARY_SPACE, |_| Ok(()))?;

    let money = |amount: f64| format_currency_or_fallback(amount, &payload.currency);
    let mut rows = vec![("Subtotal", money(payload.subtotal), FontWeight::Regular)];
    if let Some(shipping) = payload.shipping_fee {
        rows.push(("Shipping", money(shipping), FontWeight::Regular));
    }
    if let Some(tax) = payload.tax {
        rows.push(("Tax", money(tax), FontWeight::Regular));
    }
    rows.push(("Total", money(payload.total), FontWeight::Bold));

    let x = layout.width() - layout.margin() - SUMMARY_WIDTH;
    for (label, value, weight) in &rows {
        let y = layout.cursor();
        layout.text(label, x, y, *weight, BODY_SIZE)?;
        layout.text(value, x + SUMMARY_VALUE_OFFSET, y, *weight, BODY_SIZE)?;
        layout.advance(SUMMARY_ROW_ADVANCE);
    }

    Ok(())
}

/// Render an invoice with the default configuration and global font cache
pub fn render_invoice_pdf(payload: &InvoicePayload) -> Result<Vec<u8>> {
    InvoiceRenderer::new(&InvoiceConfig::default()).render(payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payload::InvoiceItem;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use std::path::Path;

    fn fonts() -> FontCache {
        FontCache::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets/fonts"))
    }

    fn payload() -> InvoicePayload {
        InvoicePayload {
            order_id: "o1".to_string(),
            order_number: "ORD-1".to_string(),
            currency: "USD".to_string(),
            subtotal: 20.0,
            shipping_fee: None,
            tax: None,
            total: 20.0,
            placed_at: Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap(),
            fulfilled_at: None,
            customer_id: "c1".to_string(),
            customer_name: None,
            customer_email: "ada@example.com".to_string(),
            shipping_address: None,
            billing_address: None,
            items: vec![InvoiceItem {
                id: "i1".to_string(),
                product_name: "Scarf".to_string(),
                product_sku: None,
                quantity: 2,
                unit_price: 10.0,
                line_total: 20.0,
                selected_size: None,
                selected_color: None,
            }],
        }
    }

    #[test]
    fn test_heading_and_metadata() {
        let cache = fonts();
        let renderer = InvoiceRenderer::new(&InvoiceConfig::default()).with_font_cache(&cache);
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 12, 0, 0).unwrap();

        let doc = renderer.compose_at(&payload(), now).unwrap();
        let text = doc.page_text(1);

        assert_eq!(
            &text[..5],
            &[
                "Storefront",
                "Invoice",
                "Order number: ORD-1",
                "Issued: February 1, 2024",
                "Placed: January 10, 2024",
            ]
        );
    }

    #[test]
    fn test_metadata_is_gray() {
        let cache = fonts();
        let renderer = InvoiceRenderer::new(&InvoiceConfig::default()).with_font_cache(&cache);

        let doc = renderer.compose(&payload()).unwrap();
        let colors: Vec<Color> = doc.text_runs(1).take(4).map(|run| run.color).collect();
        assert_eq!(
            colors,
            vec![
                Color::black(),
                Color::gray(META_GRAY),
                Color::gray(META_GRAY),
                Color::gray(META_GRAY),
            ]
        );
        assert!(doc
            .text_runs(1)
            .filter(|run| run.text == "Bill to" || run.text == "Scarf")
            .all(|run| run.color == Color::black()));
    }

    #[test]
    fn test_issued_date_prefers_fulfilled_at() {
        let cache = fonts();
        let renderer = InvoiceRenderer::new(&InvoiceConfig::default()).with_font_cache(&cache);
        let mut payload = payload();
        payload.fulfilled_at = Some(Utc.with_ymd_and_hms(2024, 1, 12, 0, 0, 0).unwrap());

        let doc = renderer.compose(&payload).unwrap();
        assert!(doc.page_text(1).contains(&"Issued: January 12, 2024"));
    }

    #[test]
    fn test_missing_addresses_print_placeholder() {
        let cache = fonts();
        let renderer = InvoiceRenderer::new(&InvoiceConfig::default()).with_font_cache(&cache);

        let doc = renderer.compose(&payload()).unwrap();
        let placeholders = doc
            .page_text(1)
            .into_iter()
            .filter(|text| *text == "Not provided")
            .count();
        assert_eq!(placeholders, 2);
    }

    #[test]
    fn test_brand_name_from_config() {
        let cache = fonts();
        let config = InvoiceConfig {
            brand_name: "Maison Lumière".to_string(),
            ..InvoiceConfig::default()
        };
        let renderer = InvoiceRenderer::new(&config).with_font_cache(&cache);

        let doc = renderer.compose(&payload()).unwrap();
        assert_eq!(doc.page_text(1)[0], "Maison Lumière");
    }
}
