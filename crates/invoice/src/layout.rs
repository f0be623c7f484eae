//! Page and cursor bookkeeping

use crate::composer::FONT_FAMILY;
use crate::Result;
use pdf_core::{Align, Color, FontWeight, PdfDocument};
use tracing::debug;

const ELLIPSIS: &str = "…";

/// Drawing context for one document: current page, page size, margin and a
/// vertical cursor
///
/// The cursor is a PDF y coordinate (from the bottom edge). It starts at
/// `height - margin` and moves down as content is written.
pub struct PageLayout<'a> {
    doc: &'a mut PdfDocument,
    page: usize,
    width: f64,
    height: f64,
    margin: f64,
    cursor_y: f64,
}

impl<'a> PageLayout<'a> {
    /// Start the first page
    ///
    /// The invoice font family must already be registered on `doc`.
    pub fn new(doc: &'a mut PdfDocument, width: f64, height: f64, margin: f64) -> Result<Self> {
        let page = doc.add_page(width, height)?;
        doc.set_font(FONT_FAMILY, 10.0)?;

        Ok(Self {
            doc,
            page,
            width,
            height,
            margin,
            cursor_y: height - margin,
        })
    }

    /// Current page number (1-indexed)
    pub fn page(&self) -> usize {
        self.page
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn margin(&self) -> f64 {
        self.margin
    }

    /// Horizontal space between the margins
    pub fn content_width(&self) -> f64 {
        self.width - 2.0 * self.margin
    }

    pub fn cursor(&self) -> f64 {
        self.cursor_y
    }

    pub fn set_cursor(&mut self, y: f64) {
        self.cursor_y = y;
    }

    /// Move the cursor down by `dy`
    pub fn advance(&mut self, dy: f64) {
        self.cursor_y -= dy;
    }

    /// Finish the current page and continue at the top of a new one
    pub fn new_page(&mut self) -> Result<()> {
        self.page = self.doc.add_page(self.width, self.height)?;
        self.cursor_y = self.height - self.margin;
        debug!(page = self.page, "started page");
        Ok(())
    }

    /// Make sure `needed` units fit above the bottom margin
    ///
    /// Otherwise starts a new page and runs `on_page_break` on it before
    /// returning. Returns whether a break happened.
    pub fn ensure_space<F>(&mut self, needed: f64, on_page_break: F) -> Result<bool>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        if self.cursor_y - needed >= self.margin {
            return Ok(false);
        }

        self.new_page()?;
        on_page_break(self)?;
        Ok(true)
    }

    /// Draw text on the current page
    pub fn text(
        &mut self,
        text: &str,
        x: f64,
        y: f64,
        weight: FontWeight,
        size: f32,
    ) -> Result<()> {
        self.doc.set_font_weight(weight)?;
        self.doc.set_font_size(size)?;
        self.doc.insert_text(text, self.page, x, y, Align::Left)?;
        Ok(())
    }

    /// Color for text drawn from now on
    pub fn set_text_color(&mut self, color: Color) {
        self.doc.set_text_color(color);
    }

    /// Draw a horizontal rule on the current page
    pub fn rule(&mut self, x1: f64, x2: f64, y: f64, line_width: f64, color: Color) -> Result<()> {
        self.doc
            .draw_line(self.page, (x1, y), (x2, y), line_width, color)?;
        Ok(())
    }

    /// Width of `text` in points
    pub fn measure(&mut self, text: &str, weight: FontWeight, size: f32) -> Result<f64> {
        self.doc.set_font_weight(weight)?;
        self.doc.set_font_size(size)?;
        Ok(self.doc.get_text_width(text)?)
    }

    /// Shorten `text` with a trailing ellipsis until it fits `max_width`
    ///
    /// Glyph advances are summed once from the front, so the cost is linear
    /// in the length of `text`.
    pub fn fit_text(
        &mut self,
        text: &str,
        max_width: f64,
        weight: FontWeight,
        size: f32,
    ) -> Result<String> {
        let measure = self.measure_fn(weight, size)?;
        if measure(text) <= max_width {
            return Ok(text.to_string());
        }

        let budget = max_width - measure(ELLIPSIS);
        let mut buf = [0u8; 4];
        let mut width = 0.0;
        let mut end = 0;
        for (index, c) in text.char_indices() {
            width += measure(c.encode_utf8(&mut buf));
            if width > budget {
                break;
            }
            end = index + c.len_utf8();
        }

        // per-glyph sums can round differently from a whole-string measure
        let mut prefix = text[..end].trim_end();
        loop {
            let candidate = format!("{prefix}{ELLIPSIS}");
            if prefix.is_empty() || measure(&candidate) <= max_width {
                return Ok(candidate);
            }
            let mut chars = prefix.chars();
            chars.next_back();
            prefix = chars.as_str().trim_end();
        }
    }

    /// A width measure bound to one face and size, for `wrap_to_width`
    pub fn measure_fn(
        &mut self,
        weight: FontWeight,
        size: f32,
    ) -> Result<impl Fn(&str) -> f64 + '_> {
        self.doc.set_font_weight(weight)?;
        self.doc.set_font_size(size)?;
        let doc = &*self.doc;
        Ok(move |text: &str| doc.get_text_width(text).unwrap_or(0.0))
    }
}
