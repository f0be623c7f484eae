//! Currency and grouped number formatting

use crate::{FormatError, Result};

/// Symbols printed in place of the code (en-US conventions)
const CURRENCY_SYMBOLS: [(&str, &str); 11] = [
    ("USD", "$"),
    ("EUR", "€"),
    ("GBP", "£"),
    ("JPY", "¥"),
    ("CAD", "CA$"),
    ("AUD", "A$"),
    ("INR", "₹"),
    ("CNY", "CN¥"),
    ("KRW", "₩"),
    ("MXN", "MX$"),
    ("BRL", "R$"),
];

/// Currencies without minor units
const ZERO_DECIMAL: [&str; 6] = ["JPY", "KRW", "VND", "CLP", "ISK", "UGX"];

/// Currencies with three minor-unit digits
const THREE_DECIMAL: [&str; 7] = ["BHD", "KWD", "JOD", "OMR", "TND", "IQD", "LYD"];

/// Number of minor-unit digits printed for a currency code
///
/// # Examples
/// ```
/// use invoice_format::minor_units;
/// assert_eq!(minor_units("USD"), 2);
/// assert_eq!(minor_units("jpy"), 0);
/// assert_eq!(minor_units("KWD"), 3);
/// ```
pub fn minor_units(code: &str) -> u8 {
    let code = code.to_ascii_uppercase();
    if ZERO_DECIMAL.contains(&code.as_str()) {
        0
    } else if THREE_DECIMAL.contains(&code.as_str()) {
        3
    } else {
        2
    }
}

/// Format an amount as currency
///
/// The code must be three ASCII letters (case-insensitive). Known codes print
/// their symbol; other well-formed codes print the code followed by a space.
///
/// # Examples
/// ```
/// use invoice_format::format_currency;
/// assert_eq!(format_currency(1234.5, "USD").unwrap(), "$1,234.50");
/// assert_eq!(format_currency(-3.0, "eur").unwrap(), "-€3.00");
/// assert_eq!(format_currency(12.0, "CHF").unwrap(), "CHF 12.00");
/// assert!(format_currency(1.0, "XXX-INVALID").is_err());
/// ```
pub fn format_currency(amount: f64, code: &str) -> Result<String> {
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(FormatError::InvalidCurrency(code.to_string()));
    }
    if !amount.is_finite() {
        return Err(FormatError::NonFiniteAmount(amount));
    }

    let code = code.to_ascii_uppercase();
    let pattern = match minor_units(&code) {
        0 => "#,###",
        3 => "#,###.###",
        _ => "#,###.##",
    };

    let digits = render_float(pattern, amount.abs());
    // "-0.00" is printed unsigned
    let negative = amount < 0.0 && digits.chars().any(|c| matches!(c, '1'..='9'));
    let sign = if negative { "-" } else { "" };

    let symbol = CURRENCY_SYMBOLS
        .iter()
        .find(|(known, _)| *known == code)
        .map(|(_, symbol)| *symbol);

    Ok(match symbol {
        Some(symbol) => format!("{sign}{symbol}{digits}"),
        None => format!("{sign}{code} {digits}"),
    })
}

/// Format an amount as currency, falling back to `"{code} {amount:.2}"`
///
/// The code is printed exactly as given in the fallback.
///
/// # Examples
/// ```
/// use invoice_format::format_currency_or_fallback;
/// assert_eq!(format_currency_or_fallback(10.0, "USD"), "$10.00");
/// assert_eq!(format_currency_or_fallback(7.5, "XXX-INVALID"), "XXX-INVALID 7.50");
/// ```
pub fn format_currency_or_fallback(amount: f64, code: &str) -> String {
    format_currency(amount, code).unwrap_or_else(|_| format!("{code} {amount:.2}"))
}

/// Render a float with formatting pattern
///
/// Supports patterns like "#,###.##" for thousand separators and decimal places.
///
/// # Arguments
/// * `format` - Format pattern
/// * `n` - Number to format
pub fn render_float(format: &str, n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let (precision, thousand_sep) = parse_format(format);

    let abs_n = n.abs();
    let multiplier = 10_f64.powi(precision as i32);
    let scaled = (abs_n * multiplier).round();

    // Beyond i64 the integer split saturates; use the exact decimal expansion
    let (int_digits, frac_digits) = if scaled < i64::MAX as f64 {
        let scaled = scaled as i64;
        let multiplier = multiplier as i64;
        (
            (scaled / multiplier).to_string(),
            format!("{:0>width$}", scaled % multiplier, width = precision as usize),
        )
    } else {
        let digits = format!("{abs_n:.prec$}", prec = precision as usize);
        match digits.split_once('.') {
            Some((int_digits, frac_digits)) => (int_digits.to_string(), frac_digits.to_string()),
            None => (digits, String::new()),
        }
    };

    let int_str = format_with_thousands(&int_digits, thousand_sep);
    let sign = if n < 0.0 && scaled > 0.0 { "-" } else { "" };

    if precision > 0 {
        format!("{sign}{int_str}.{frac_digits}")
    } else {
        format!("{sign}{int_str}")
    }
}

/// Parse format pattern into (precision, thousands separator)
fn parse_format(format: &str) -> (u8, Option<char>) {
    if format.is_empty() {
        return (2, Some(','));
    }

    let precision = match format.rfind('.') {
        Some(pos) => format[pos + 1..]
            .chars()
            .filter(|c| *c == '#' || *c == '0')
            .count() as u8,
        None => 0,
    };
    let thousand_sep = format.contains(',').then_some(',');

    (precision, thousand_sep)
}

/// Group a string of integer digits with thousand separators
fn format_with_thousands(digits: &str, sep: Option<char>) -> String {
    let Some(sep) = sep else {
        return digits.to_string();
    };

    let mut result = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(sep);
        }
        result.push(c);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_render_float() {
        assert_eq!(render_float("#,###.##", 1234.56), "1,234.56");
        assert_eq!(render_float("#,###.##", 1000000.0), "1,000,000.00");
        assert_eq!(render_float("#,###.##", -100.5), "-100.50");
        assert_eq!(render_float("#,###", 1234.5), "1,235");
        assert_eq!(render_float("####.###", 1234.5), "1234.500");
    }

    #[test]
    fn test_render_float_rounding_carries() {
        assert_eq!(render_float("#,###.##", 999.999), "1,000.00");
        assert_eq!(render_float("#,###.##", -0.001), "0.00");
    }

    #[test]
    fn test_render_float_beyond_i64() {
        assert_eq!(render_float("#,###.##", 1e17), "100,000,000,000,000,000.00");
        assert_eq!(
            render_float("#,###.##", -1e20),
            "-100,000,000,000,000,000,000.00"
        );
        assert_eq!(render_float("####", 1e19), "10000000000000000000");
    }

    #[test]
    fn test_render_float_special() {
        assert_eq!(render_float("", f64::NAN), "NaN");
        assert_eq!(render_float("", f64::INFINITY), "Infinity");
        assert_eq!(render_float("", f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn test_format_with_thousands() {
        assert_eq!(format_with_thousands("0", Some(',')), "0");
        assert_eq!(format_with_thousands("100", Some(',')), "100");
        assert_eq!(format_with_thousands("1000", Some(',')), "1,000");
        assert_eq!(format_with_thousands("1000000", Some(',')), "1,000,000");
        assert_eq!(format_with_thousands("1000000", None), "1000000");
    }

    #[test]
    fn test_format_currency_symbols() {
        assert_eq!(format_currency(100.0, "USD").unwrap(), "$100.00");
        assert_eq!(format_currency(100.0, "usd").unwrap(), "$100.00");
        assert_eq!(format_currency(9.99, "GBP").unwrap(), "£9.99");
        assert_eq!(format_currency(20.0, "CAD").unwrap(), "CA$20.00");
    }

    #[test]
    fn test_format_currency_minor_units() {
        assert_eq!(format_currency(1500.4, "JPY").unwrap(), "¥1,500");
        assert_eq!(format_currency(1.5, "KWD").unwrap(), "KWD 1.500");
    }

    #[test]
    fn test_format_currency_unknown_symbol_uses_code() {
        assert_eq!(format_currency(1234.5, "chf").unwrap(), "CHF 1,234.50");
    }

    #[test]
    fn test_format_currency_large_amount() {
        assert_eq!(
            format_currency(1e20, "USD").unwrap(),
            "$100,000,000,000,000,000,000.00"
        );
        assert_eq!(format_currency(-1e18, "JPY").unwrap(), "-¥1,000,000,000,000,000,000");
    }

    #[test]
    fn test_format_currency_negative() {
        assert_eq!(format_currency(-5.0, "USD").unwrap(), "-$5.00");
        assert_eq!(format_currency(-0.001, "USD").unwrap(), "$0.00");
    }

    #[test]
    fn test_format_currency_rejects_malformed_codes() {
        for code in ["", "US", "USDX", "U$D", "XXX-INVALID", "12A"] {
            assert_eq!(
                format_currency(1.0, code),
                Err(FormatError::InvalidCurrency(code.to_string()))
            );
        }
    }

    #[test]
    fn test_format_currency_rejects_non_finite() {
        assert!(matches!(
            format_currency(f64::NAN, "USD"),
            Err(FormatError::NonFiniteAmount(_))
        ));
    }

    #[test]
    fn test_fallback_keeps_code_as_given() {
        assert_eq!(format_currency_or_fallback(5.0, "XXX-INVALID"), "XXX-INVALID 5.00");
        assert_eq!(format_currency_or_fallback(1234.5, "US"), "US 1234.50");
        assert_eq!(format_currency_or_fallback(5.0, "USD"), "$5.00");
    }
}
