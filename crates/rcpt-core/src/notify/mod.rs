//! Notification collaborator: emails a summary of each processed receipt.

mod outbox;

pub use outbox::OutboxTransport;

use std::fmt::Write as _;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::error::NotifyError;
use crate::models::receipt::{ReceiptItem, ReceiptRecord};

/// Price shown when none was detected.
pub const NOTIFY_DEFAULT_PRICE: &str = "N/A";
/// Quantity shown when none was detected.
pub const NOTIFY_DEFAULT_QUANTITY: &str = "1";

/// An outgoing email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html_body: String,
}

/// Trait for mail transports.
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError>;
}

/// Sends receipt summaries through a [`MailTransport`].
#[derive(Clone)]
pub struct EmailNotifier {
    transport: Arc<dyn MailTransport>,
    sender: String,
    recipient: String,
}

impl EmailNotifier {
    pub fn new(
        transport: Arc<dyn MailTransport>,
        sender: impl Into<String>,
        recipient: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            sender: sender.into(),
            recipient: recipient.into(),
        }
    }

    /// Build the notification for `record`.
    pub fn render(&self, record: &ReceiptRecord) -> EmailMessage {
        EmailMessage {
            from: self.sender.clone(),
            to: vec![self.recipient.clone()],
            subject: format!("Receipt Processed: {} - ${}", record.vendor, record.total),
            html_body: render_html_body(record),
        }
    }

    /// Send the notification for `record`.
    ///
    /// Delivery failures are logged and swallowed; the return value only
    /// reports whether the message went out.
    pub async fn send_notification(&self, record: &ReceiptRecord) -> bool {
        let message = self.render(record);
        match self.transport.send(&message).await {
            Ok(()) => {
                info!("Email notification sent to {}", self.recipient);
                true
            }
            Err(e) => {
                error!("Error sending email notification: {}", e);
                info!("Continuing execution despite email error");
                false
            }
        }
    }
}

fn render_html_body(record: &ReceiptRecord) -> String {
    format!(
        r#"<html>
<head>
    <style>
        body {{ font-family: Arial, sans-serif; line-height: 1.6; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; }}
        .header {{ background-color: #f4f4f4; padding: 10px; border-radius: 5px; }}
        .detail {{ margin: 10px 0; }}
        .items-list {{ background-color: #f9f9f9; padding: 15px; border-radius: 5px; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h2>Receipt Processing Notification</h2>
        </div>
        <div class="detail">
            <p><strong>Receipt ID:</strong> {id}</p>
            <p><strong>Vendor:</strong> {vendor}</p>
            <p><strong>Date:</strong> {date}</p>
            <p><strong>Total Amount:</strong> ${total}</p>
            <p><strong>S3 Location:</strong> {s3_path}</p>
        </div>
        <div class="items-list">
            <h3>Items:</h3>
            <ul>
{items}
            </ul>
        </div>
        <p>The receipt has been successfully processed and stored.</p>
    </div>
</body>
</html>
"#,
        id = escape_html(&record.receipt_id),
        vendor = escape_html(&record.vendor),
        date = escape_html(&record.date),
        total = escape_html(&record.total),
        s3_path = escape_html(&record.s3_path),
        items = format_items_html(&record.items),
    )
}

/// Render items as `<li>` rows, with `"N/A"` for a missing price and `"1"`
/// for a missing quantity.
pub fn format_items_html(items: &[ReceiptItem]) -> String {
    if items.is_empty() {
        return "                <li>No items detected</li>".to_string();
    }

    let mut html = String::new();
    for item in items {
        let price = item.price.as_deref().unwrap_or(NOTIFY_DEFAULT_PRICE);
        let quantity = item.quantity.as_deref().unwrap_or(NOTIFY_DEFAULT_QUANTITY);
        if !html.is_empty() {
            html.push('\n');
        }
        let _ = write!(
            html,
            "                <li>{} - ${} x {}</li>",
            escape_html(&item.name),
            escape_html(price),
            escape_html(quantity)
        );
    }
    html
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
    use crate::models::receipt::ObjectLocation;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<EmailMessage>>,
    }

    #[async_trait]
    impl MailTransport for RecordingTransport {
        async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    struct FailingTransport;

    #[async_trait]
    impl MailTransport for FailingTransport {
        async fn send(&self, _message: &EmailMessage) -> Result<(), NotifyError> {
            Err(NotifyError::Transport("mailbox unavailable".to_string()))
        }
    }

    fn record() -> ReceiptRecord {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let mut record = ReceiptRecord::new("id-1", date, &ObjectLocation::new("b", "k.jpg"));
        record.vendor = "Test Store".to_string();
        record.total = "125.50".to_string();
        record
    }

    #[test]
    fn test_items_html_defaults() {
        let items = vec![
            ReceiptItem::new("Bread"),
            ReceiptItem::new("Milk").with_price("1.20").with_quantity("3"),
        ];

        let html = format_items_html(&items);
        assert!(html.contains("<li>Bread - $N/A x 1</li>"));
        assert!(html.contains("<li>Milk - $1.20 x 3</li>"));
    }

    #[test]
    fn test_items_html_empty() {
        assert!(format_items_html(&[]).contains("<li>No items detected</li>"));
    }

    #[test]
    fn test_item_text_is_escaped() {
        let html = format_items_html(&[ReceiptItem::new("<b>Fish & Chips</b>")]);
        assert!(html.contains("&lt;b&gt;Fish &amp; Chips&lt;/b&gt;"));
    }

    #[test]
    fn test_render_message() {
        let notifier = EmailNotifier::new(
            Arc::new(RecordingTransport::default()),
            "from@example.com",
            "to@example.com",
        );

        let message = notifier.render(&record());
        assert_eq!(message.subject, "Receipt Processed: Test Store - $125.50");
        assert_eq!(message.to, vec!["to@example.com".to_string()]);
        assert!(message.html_body.contains("<strong>S3 Location:</strong> s3://b/k.jpg"));
        assert!(message.html_body.contains("No items detected"));
    }

    #[tokio::test]
    async fn test_send_notification_delivers() {
        let transport = Arc::new(RecordingTransport::default());
        let notifier = EmailNotifier::new(transport.clone(), "from@example.com", "to@example.com");

        assert!(notifier.send_notification(&record()).await);
        assert_eq!(transport.sent.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_send_notification_swallows_errors() {
        let notifier =
            EmailNotifier::new(Arc::new(FailingTransport), "from@example.com", "to@example.com");

        assert!(!notifier.send_notification(&record()).await);
    }
}
