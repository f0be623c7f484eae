//! Address blocks

use crate::layout::PageLayout;
use crate::payload::Address;
use crate::Result;
use pdf_core::FontWeight;

/// Printed when neither billing nor shipping address is known
pub const NOT_PROVIDED: &str = "Not provided";

const TITLE_SIZE: f32 = 11.0;
const LINE_SIZE: f32 = 10.0;
const FIRST_LINE_OFFSET: f64 = 14.0;
const LINE_SPACING: f64 = 12.0;

/// Printable lines of an address, in display order
///
/// Name, street lines, "city, state, postal code" (present parts only),
/// country, then "Phone: ...". Absent fields produce no line.
///
/// # Example
/// ```ignore
/// let lines = address_lines(Some(&address));
/// // ["Ada Lovelace", "12 St James's Square", "London, SW1Y 4JH", "United Kingdom"]
/// ```
pub fn address_lines(address: Option<&Address>) -> Vec<String> {
    let Some(address) = address else {
        return Vec::new();
    };

    let mut lines = Vec::new();
    lines.extend(address.full_name.clone());
    lines.extend(address.street_line1.clone());
    lines.extend(address.street_line2.clone());

    let locality: Vec<&str> = [&address.city, &address.state, &address.postal_code]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .collect();
    if !locality.is_empty() {
        lines.push(locality.join(", "));
    }

    lines.extend(address.country.clone());
    if let Some(phone) = &address.phone_number {
        lines.push(format!("Phone: {phone}"));
    }

    lines
}

/// Vertical space taken by a titled address block
pub fn address_block_height(address: Option<&Address>) -> f64 {
    let lines = address_lines(address).len().max(1);
    FIRST_LINE_OFFSET + lines as f64 * LINE_SPACING
}

/// Draw a titled address block with its top-left at (x, y)
///
/// Returns the y coordinate of the next free line below the block.
pub fn draw_address_block(
    layout: &mut PageLayout<'_>,
    title: &str,
    address: Option<&Address>,
    x: f64,
    y: f64,
) -> Result<f64> {
    layout.text(title, x, y, FontWeight::Bold, TITLE_SIZE)?;

    let mut lines = address_lines(address);
    if lines.is_empty() {
        lines.push(NOT_PROVIDED.to_string());
    }

    let mut line_y = y - FIRST_LINE_OFFSET;
    for line in &lines {
        layout.text(line, x, line_y, FontWeight::Regular, LINE_SIZE)?;
        line_y -= LINE_SPACING;
    }

    Ok(line_y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn full() -> Address {
        Address {
            full_name: Some("Ada Lovelace".to_string()),
            street_line1: Some("12 St James's Square".to_string()),
            street_line2: Some("Flat 2".to_string()),
            city: Some("London".to_string()),
            state: None,
            postal_code: Some("SW1Y 4JH".to_string()),
            country: Some("United Kingdom".to_string()),
            phone_number: Some("+44 20 7946 0000".to_string()),
        }
    }

    #[test]
    fn test_full_address_order() {
        assert_eq!(
            address_lines(Some(&full())),
            vec![
                "Ada Lovelace",
                "12 St James's Square",
                "Flat 2",
                "London, SW1Y 4JH",
                "United Kingdom",
                "Phone: +44 20 7946 0000",
            ]
        );
    }

    #[test]
    fn test_locality_without_artifacts() {
        let address = Address {
            state: Some("TX".to_string()),
            ..Address::default()
        };
        assert_eq!(address_lines(Some(&address)), vec!["TX"]);
    }

    #[test]
    fn test_missing_address_has_no_lines() {
        assert!(address_lines(None).is_empty());
        assert!(address_lines(Some(&Address::default())).is_empty());
    }

    #[test]
    fn test_block_height() {
        assert_eq!(address_block_height(Some(&full())), 14.0 + 6.0 * 12.0);
        // "Not provided" still takes one line
        assert_eq!(address_block_height(None), 26.0);
    }
}
