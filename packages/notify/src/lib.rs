// ABOUTME: Fire-and-forget notification dispatch keyed to lifecycle transitions
// ABOUTME: Queue worker over a channel; transport failures are logged, never propagated

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Email templates the backend can send. Each maps to a template id on the
/// delivery side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Template {
    /// New RFQ invitation sent to each invited supplier
    RfqInvitation,
    /// A supplier responded; alert the owning buyer
    QuoteReceived,
    /// Reminder to suppliers who have not responded yet
    QuoteReminder,
    /// Purchase order confirmation for the winning supplier
    PurchaseOrder,
    /// CSV export of a buyer's RFQ data, mailed to the buyer
    RfqDataExport,
    /// Welcome mail after signup
    Welcome,
}

impl Template {
    pub fn template_id(&self) -> &'static str {
        match self {
            Template::RfqInvitation => "rfq_invitation",
            Template::QuoteReceived => "quote_received",
            Template::QuoteReminder => "quote_reminder",
            Template::PurchaseOrder => "purchase_order",
            Template::RfqDataExport => "rfq_data_export",
            Template::Welcome => "welcome",
        }
    }
}

/// One notification to enqueue: template, recipients, template context
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub template: Template,
    pub recipients: Vec<String>,
    pub context: Value,
}

impl Notification {
    pub fn new(template: Template, recipients: Vec<String>, context: Value) -> Self {
        Self {
            template,
            recipients,
            context,
        }
    }
}

/// Delivery backend. The default transport only logs; a real SMTP or HTTP
/// mail provider plugs in behind this trait.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, notification: &Notification) -> anyhow::Result<()>;
}

/// Transport that logs every send. Used in development and tests.
pub struct LogTransport;

#[async_trait]
impl Transport for LogTransport {
    async fn send(&self, notification: &Notification) -> anyhow::Result<()> {
        info!(
            template = notification.template.template_id(),
            recipients = notification.recipients.len(),
            "Dispatching notification"
        );
        Ok(())
    }
}

/// Handle for enqueueing notifications. Cheap to clone; the worker task owns
/// the receiving end and drains it until every sender is dropped.
#[derive(Clone)]
pub struct Dispatcher {
    tx: mpsc::UnboundedSender<Notification>,
}

impl Dispatcher {
    /// Spawn the dispatch worker on the current tokio runtime
    pub fn spawn(transport: Arc<dyn Transport>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Notification>();

        tokio::spawn(async move {
            while let Some(notification) = rx.recv().await {
                debug!(
                    template = notification.template.template_id(),
                    "Processing queued notification"
                );
                if let Err(e) = transport.send(&notification).await {
                    // Delivery failure never reaches the caller
                    warn!(
                        template = notification.template.template_id(),
                        error = %e,
                        "Notification delivery failed"
                    );
                }
            }
        });

        Self { tx }
    }

    /// Enqueue a notification. Best-effort: a closed queue is logged and
    /// swallowed so lifecycle transitions never fail on notification issues.
    pub fn enqueue(&self, notification: Notification) {
        if notification.recipients.is_empty() {
            debug!(
                template = notification.template.template_id(),
                "Skipping notification without recipients"
            );
            return;
        }
        if let Err(e) = self.tx.send(notification) {
            warn!(error = %e, "Notification queue is closed, dropping notification");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    struct CountingTransport {
        sent: AtomicUsize,
        fail: bool,
        signal: Notify,
    }

    #[async_trait]
    impl Transport for CountingTransport {
        async fn send(&self, _notification: &Notification) -> anyhow::Result<()> {
            self.sent.fetch_add(1, Ordering::SeqCst);
            self.signal.notify_one();
            if self.fail {
                anyhow::bail!("smtp unavailable");
            }
            Ok(())
        }
    }

    fn notification() -> Notification {
        Notification::new(
            Template::QuoteReceived,
            vec!["buyer@example.com".to_string()],
            serde_json::json!({"rfq": "Electronics Batch"}),
        )
    }

    #[tokio::test]
    async fn test_enqueue_delivers_to_transport() {
        let transport = Arc::new(CountingTransport {
            sent: AtomicUsize::new(0),
            fail: false,
            signal: Notify::new(),
        });
        let dispatcher = Dispatcher::spawn(transport.clone());

        dispatcher.enqueue(notification());
        transport.signal.notified().await;

        assert_eq!(transport.sent.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transport_failure_is_swallowed() {
        let transport = Arc::new(CountingTransport {
            sent: AtomicUsize::new(0),
            fail: true,
            signal: Notify::new(),
        });
        let dispatcher = Dispatcher::spawn(transport.clone());

        // Both sends reach the transport even though the first one fails
        dispatcher.enqueue(notification());
        transport.signal.notified().await;
        dispatcher.enqueue(notification());
        transport.signal.notified().await;

        assert_eq!(transport.sent.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_recipients_are_skipped() {
        let transport = Arc::new(CountingTransport {
            sent: AtomicUsize::new(0),
            fail: false,
            signal: Notify::new(),
        });
        let dispatcher = Dispatcher::spawn(transport.clone());

        dispatcher.enqueue(Notification::new(
            Template::Welcome,
            vec![],
            Value::Null,
        ));
        // Give the worker a chance to (incorrectly) pick it up
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        assert_eq!(transport.sent.load(Ordering::SeqCst), 0);
    }
}
