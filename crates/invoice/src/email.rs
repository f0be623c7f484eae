//! Invoice e-mail composition

use crate::composer::InvoiceRenderer;
use crate::orders::{get_invoice_payload, OrderLookup};
use crate::payload::InvoicePayload;
use crate::{InvoiceError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use tracing::{debug, instrument, warn};

/// A file attached to an e-mail
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailAttachment {
    pub filename: String,
    /// Base64-encoded file content
    pub content: String,
    pub mime_type: String,
}

/// A message handed to the delivery provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailMessage {
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
    pub text: String,
    pub attachments: Vec<EmailAttachment>,
}

/// Outcome reported by a delivery provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DeliveryReport {
    pub ok: bool,
    /// Nothing was sent because the provider is not configured
    pub skipped: bool,
}

impl DeliveryReport {
    pub fn sent() -> Self {
        Self {
            ok: true,
            skipped: false,
        }
    }

    pub fn skipped() -> Self {
        Self {
            ok: false,
            skipped: true,
        }
    }
}

/// An e-mail provider
///
/// Implementations return `Err` for delivery failures and a skipped report
/// when they are not configured.
pub trait EmailDelivery {
    fn deliver(&self, message: &EmailMessage) -> Result<DeliveryReport>;
}

/// Provider used when no e-mail service is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct UnconfiguredDelivery;

impl EmailDelivery for UnconfiguredDelivery {
    fn deliver(&self, message: &EmailMessage) -> Result<DeliveryReport> {
        debug!(subject = %message.subject, "no e-mail provider configured");
        Ok(DeliveryReport::skipped())
    }
}

/// Build the invoice e-mail for a payload and its rendered PDF
pub fn compose_invoice_email(payload: &InvoicePayload, brand_name: &str, pdf: &[u8]) -> EmailMessage {
    let name = payload
        .customer_name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty());

    let text_greeting = match name {
        Some(name) => format!("Hi {name},"),
        None => "Hi,".to_string(),
    };
    let html_greeting = match name {
        Some(name) => format!("Hi {},", escape_html(name)),
        None => "Hi,".to_string(),
    };
    let order_number = &payload.order_number;

    let text = format!(
        "{text_greeting}\n\n\
         Thank you for your order {order_number}. Your invoice is attached as a PDF.\n\n\
         {brand_name}\n"
    );
    let html = format!(
        "<p>{html_greeting}</p>\
         <p>Thank you for your order <strong>{}</strong>. Your invoice is attached as a PDF.</p>\
         <p>{}</p>",
        escape_html(order_number),
        escape_html(brand_name),
    );

    EmailMessage {
        to: vec![payload.customer_email.clone()],
        subject: format!("Your invoice for order {order_number}"),
        html,
        text,
        attachments: vec![EmailAttachment {
            filename: format!("{order_number}.pdf"),
            content: STANDARD.encode(pdf),
            mime_type: "application/pdf".to_string(),
        }],
    }
}

/// Render and e-mail the invoice for an order
///
/// Returns `false` when no payload exists for the order, `true` once delivery
/// was attempted (including a skip by an unconfigured provider).
#[instrument(skip(lookup, delivery, renderer))]
pub fn send_invoice_email<L, D>(
    lookup: &L,
    delivery: &D,
    renderer: &InvoiceRenderer<'_>,
    order_id: &str,
) -> Result<bool>
where
    L: OrderLookup + ?Sized,
    D: EmailDelivery + ?Sized,
{
    let Some(payload) = get_invoice_payload(lookup, order_id)? else {
        return Ok(false);
    };

    let pdf = renderer.render(&payload)?;
    let message = compose_invoice_email(&payload, &renderer.config().brand_name, &pdf);
    let report = delivery.deliver(&message)?;

    if report.skipped {
        warn!(order_number = %payload.order_number, "invoice e-mail skipped");
    } else if !report.ok {
        return Err(InvoiceError::Delivery(format!(
            "provider rejected invoice for order {}",
            payload.order_number
        )));
    }

    Ok(true)
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn payload(name: Option<&str>) -> InvoicePayload {
        InvoicePayload {
            order_id: "o1".to_string(),
            order_number: "ORD-7".to_string(),
            currency: "USD".to_string(),
            subtotal: 1.0,
            shipping_fee: None,
            tax: None,
            total: 1.0,
            placed_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            fulfilled_at: None,
            customer_id: "c1".to_string(),
            customer_name: name.map(str::to_string),
            customer_email: "buyer@example.com".to_string(),
            shipping_address: None,
            billing_address: None,
            items: Vec::new(),
        }
    }

    #[test]
    fn test_compose_invoice_email() {
        let message = compose_invoice_email(&payload(Some("Ada")), "Storefront", b"%PDF");

        assert_eq!(message.to, vec!["buyer@example.com"]);
        assert_eq!(message.subject, "Your invoice for order ORD-7");
        assert!(message.text.starts_with("Hi Ada,"));
        assert!(message.html.starts_with("<p>Hi Ada,</p>"));
        assert_eq!(
            message.attachments,
            vec![EmailAttachment {
                filename: "ORD-7.pdf".to_string(),
                content: "JVBERg==".to_string(),
                mime_type: "application/pdf".to_string(),
            }]
        );
    }

    #[test]
    fn test_greeting_escapes_html() {
        let message = compose_invoice_email(&payload(Some("<b>Eve</b>")), "Shop", b"");
        assert!(message.html.contains("Hi &lt;b&gt;Eve&lt;/b&gt;,"));
        assert!(message.text.contains("Hi <b>Eve</b>,"));
    }

    #[test]
    fn test_greeting_without_name() {
        let message = compose_invoice_email(&payload(Some("  ")), "Shop", b"");
        assert!(message.text.starts_with("Hi,"));
    }

    #[test]
    fn test_unconfigured_delivery_skips() {
        let message = compose_invoice_email(&payload(None), "Shop", b"");
        let report = UnconfiguredDelivery.deliver(&message).unwrap();
        assert_eq!(report, DeliveryReport::skipped());
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"a&b "c" 'd'"#), "a&amp;b &quot;c&quot; &#39;d&#39;");
    }
}
