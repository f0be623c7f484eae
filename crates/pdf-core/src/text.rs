//! Text and path operator generation

use crate::document::Color;
use crate::Align;

/// Context for rendering text
pub struct TextRenderContext {
    /// PDF font resource name (e.g., "F1")
    pub font_name: String,
    /// Font size in points
    pub font_size: f32,
    /// Text width in points (for alignment)
    pub text_width: f64,
    /// Text color (RGB)
    pub color: Color,
}

/// Generate PDF operators for text insertion
///
/// Creates the PDF text operators (BT, rg, Tf, Td, Tj, ET) to render text
/// at a specific position. `x` is the anchor point: the left edge for
/// `Align::Left`, the middle for `Align::Center`, the right edge for
/// `Align::Right`.
///
/// # Arguments
/// * `text_hex` - Hex-encoded text (e.g., "<0041004200>")
/// * `x` - X coordinate in points (PDF coordinates, from left)
/// * `y` - Y coordinate in points (PDF coordinates, from bottom)
/// * `align` - Text alignment
/// * `ctx` - Text rendering context
pub fn generate_text_operators(
    text_hex: &str,
    x: f64,
    y: f64,
    align: Align,
    ctx: &TextRenderContext,
) -> Vec<u8> {
    let x_offset = match align {
        Align::Left => 0.0,
        Align::Center => -ctx.text_width / 2.0,
        Align::Right => -ctx.text_width,
    };
    let final_x = x + x_offset;

    let mut ops = String::new();
    ops.push_str("BT\n");
    ops.push_str(&format!(
        "{} {} {} rg\n",
        ctx.color.r, ctx.color.g, ctx.color.b
    ));
    ops.push_str(&format!("/{} {} Tf\n", ctx.font_name, ctx.font_size));
    ops.push_str(&format!("{final_x} {y} Td\n"));
    ops.push_str(&format!("{text_hex} Tj\n"));
    ops.push_str("ET\n");

    ops.into_bytes()
}

/// Generate PDF operators for a stroked straight line
///
/// Wrapped in q/Q so the stroke color and width do not leak into
/// later content.
pub fn generate_line_operators(
    from: (f64, f64),
    to: (f64, f64),
    line_width: f64,
    color: Color,
) -> Vec<u8> {
    let mut ops = String::new();
    ops.push_str("q\n");
    ops.push_str(&format!("{} {} {} RG\n", color.r, color.g, color.b));
    ops.push_str(&format!("{line_width} w\n"));
    ops.push_str(&format!("{} {} m\n", from.0, from.1));
    ops.push_str(&format!("{} {} l\n", to.0, to.1));
    ops.push_str("S\n");
    ops.push_str("Q\n");

    ops.into_bytes()
}

/// Split text into lines that fit `max_width`
///
/// Breaks on whitespace only. A single word wider than `max_width` is kept
/// on its own line rather than split.
///
/// # Arguments
/// * `text` - Text to split
/// * `max_width` - Maximum line width in points
/// * `measure` - Width in points of a candidate line
pub fn wrap_to_width<F>(text: &str, max_width: f64, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f64,
{
    if max_width <= 0.0 {
        return vec![text.to_string()];
    }

    let mut lines = Vec::new();
    let mut current_line = String::new();

    for word in text.split_whitespace() {
        if current_line.is_empty() {
            current_line = word.to_string();
            continue;
        }

        let candidate = format!("{current_line} {word}");
        if measure(&candidate) <= max_width {
            current_line = candidate;
        } else {
            lines.push(std::mem::replace(&mut current_line, word.to_string()));
        }
    }

    if !current_line.is_empty() {
        lines.push(current_line);
    }

    if lines.is_empty() {
        lines.push(String::new());
    }

    lines
}
