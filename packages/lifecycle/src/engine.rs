// ABOUTME: Quotation lifecycle engine: submit_quote, place_order, reminders
// ABOUTME: Enforces the single-winner PLACED invariant inside one transaction

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

use procura_core::types::{
    AuditAction, ItemStatus, OrderStatus, Quote, QuoteSubmission, RfqItem, Supplier,
};
use procura_core::validation::validate_quote_submission;
use procura_notify::{Dispatcher, Notification, Template};
use procura_storage::quotes::row_to_quote;
use procura_storage::{AuditStorage, QuoteStorage, RfqStorage};

use crate::error::{LifecycleError, LifecycleResult};

/// Result of a quote submission. `created` is false when the supplier had
/// already responded and the call was a no-op.
#[derive(Debug, Clone)]
pub struct SubmitOutcome {
    pub quote: Quote,
    pub created: bool,
}

/// Result of a successful order placement
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub quote: Quote,
    pub item: RfqItem,
}

/// The state machine governing RFQ items and their quotes.
///
/// Items move open -> closed exactly once, driven by `place_order`; quotes
/// move pending -> placed with at most one winner per item.
pub struct LifecycleEngine {
    pool: SqlitePool,
    rfqs: RfqStorage,
    quotes: QuoteStorage,
    audit: AuditStorage,
    dispatcher: Dispatcher,
}

impl LifecycleEngine {
    pub fn new(pool: SqlitePool, dispatcher: Dispatcher) -> Self {
        Self {
            rfqs: RfqStorage::new(pool.clone()),
            quotes: QuoteStorage::new(pool.clone()),
            audit: AuditStorage::new(pool.clone()),
            pool,
            dispatcher,
        }
    }

    /// Record a supplier's response to an RFQ item.
    ///
    /// A second submission by the same supplier for the same item is a silent
    /// no-op returning success: the original quote stands, nothing merges.
    pub async fn submit_quote(&self, submission: &QuoteSubmission) -> LifecycleResult<SubmitOutcome> {
        validate_quote_submission(submission)?;

        let item = self
            .rfqs
            .get_item_unscoped(&submission.rfq_item_id)
            .await?
            .ok_or(LifecycleError::NotFound)?;

        // The supplier must have been invited to this item's RFQ
        if !self
            .rfqs
            .is_supplier_invited(&item.rfq_id, &submission.supplier_id)
            .await?
        {
            return Err(LifecycleError::NotFound);
        }

        if let Some(existing) = self
            .quotes
            .find_by_item_and_supplier(&submission.rfq_item_id, &submission.supplier_id)
            .await?
        {
            debug!(
                item_id = %submission.rfq_item_id,
                supplier_id = %submission.supplier_id,
                "Duplicate quote submission, keeping the original"
            );
            return Ok(SubmitOutcome {
                quote: existing,
                created: false,
            });
        }

        let quote = match self.quotes.insert_quote(submission).await {
            Ok(quote) => quote,
            // A concurrent submission won the unique index race; treat it
            // exactly like the sequential duplicate above.
            Err(e) if e.is_unique_violation() => {
                let existing = self
                    .quotes
                    .find_by_item_and_supplier(&submission.rfq_item_id, &submission.supplier_id)
                    .await?
                    .ok_or(LifecycleError::NotFound)?;
                return Ok(SubmitOutcome {
                    quote: existing,
                    created: false,
                });
            }
            Err(e) => return Err(e.into()),
        };

        info!(quote_id = %quote.id, item_id = %item.id, "Quote submitted");

        if let Some((buyer_id, buyer_email)) = self.buyer_contact_for_rfq(&item.rfq_id).await? {
            self.audit
                .record_best_effort(
                    &buyer_id,
                    AuditAction::QuoteSubmitted,
                    "quote",
                    &quote.id,
                    None,
                )
                .await;
            self.dispatcher.enqueue(Notification::new(
                Template::QuoteReceived,
                vec![buyer_email],
                serde_json::json!({
                    "rfq_item_id": item.id,
                    "product_name": item.product_name,
                    "price": quote.price,
                }),
            ));
        }

        Ok(SubmitOutcome {
            quote,
            created: true,
        })
    }

    /// Place the order for one quote and close its item.
    ///
    /// Fails with Conflict if any quote on the item is already placed,
    /// including the target quote itself on replay. The check and both
    /// writes commit in a single transaction.
    pub async fn place_order(
        &self,
        buyer_id: &str,
        item_id: &str,
        quote_id: &str,
    ) -> LifecycleResult<PlacedOrder> {
        // Tenant scoping happens before any write
        let item = self
            .rfqs
            .get_item(buyer_id, item_id)
            .await?
            .ok_or(LifecycleError::NotFound)?;

        let mut tx = self.pool.begin().await.map_err(procura_storage::StorageError::Sqlx)?;

        let quote_row = sqlx::query("SELECT * FROM quotes WHERE id = ? AND rfq_item_id = ?")
            .bind(quote_id)
            .bind(item_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(procura_storage::StorageError::Sqlx)?;
        let quote = quote_row
            .as_ref()
            .map(row_to_quote)
            .transpose()?
            .ok_or(LifecycleError::NotFound)?;

        let placed_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM quotes WHERE rfq_item_id = ? AND order_status = 'placed'",
        )
        .bind(item_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(procura_storage::StorageError::Sqlx)?;

        if placed_count > 0 {
            return Err(LifecycleError::Conflict(
                "An order has already been placed for this item".to_string(),
            ));
        }

        let now = Utc::now();
        sqlx::query("UPDATE quotes SET order_status = 'placed', updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(quote_id)
            .execute(&mut *tx)
            .await
            .map_err(procura_storage::StorageError::Sqlx)?;

        sqlx::query("UPDATE rfq_items SET status = 'closed', updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(item_id)
            .execute(&mut *tx)
            .await
            .map_err(procura_storage::StorageError::Sqlx)?;

        tx.commit().await.map_err(procura_storage::StorageError::Sqlx)?;

        info!(quote_id = %quote_id, item_id = %item_id, "Order placed, item closed");

        self.audit
            .record_best_effort(buyer_id, AuditAction::OrderPlaced, "quote", quote_id, None)
            .await;

        if let Some(email) = self.supplier_email(&quote.supplier_id).await? {
            self.dispatcher.enqueue(Notification::new(
                Template::PurchaseOrder,
                vec![email],
                serde_json::json!({
                    "product_name": item.product_name,
                    "quantity": quote.quantity,
                    "price": quote.price,
                }),
            ));
        }

        Ok(PlacedOrder {
            quote: Quote {
                order_status: OrderStatus::Placed,
                updated_at: now,
                ..quote
            },
            item: RfqItem {
                status: ItemStatus::Closed,
                updated_at: now,
                ..item
            },
        })
    }

    /// Suppliers invited to the item's RFQ who have not submitted a quote
    pub async fn list_unresponded_suppliers(
        &self,
        buyer_id: &str,
        item_id: &str,
    ) -> LifecycleResult<Vec<Supplier>> {
        let item = self
            .rfqs
            .get_item(buyer_id, item_id)
            .await?
            .ok_or(LifecycleError::NotFound)?;

        let invited = self.rfqs.invited_suppliers(&item.rfq_id).await?;
        let responded = self.quotes.responded_supplier_ids(item_id).await?;

        Ok(invited
            .into_iter()
            .filter(|s| !responded.contains(&s.id))
            .collect())
    }

    /// Enqueue a reminder to every supplier still owing a response on any
    /// open item of the RFQ. Returns the number of reminded suppliers.
    pub async fn send_reminders(&self, buyer_id: &str, rfq_id: &str) -> LifecycleResult<usize> {
        let rfq = self
            .rfqs
            .get_rfq(buyer_id, rfq_id)
            .await?
            .ok_or(LifecycleError::NotFound)?;

        let items = self
            .rfqs
            .list_items(buyer_id, rfq_id, None)
            .await?
            .ok_or(LifecycleError::NotFound)?;

        let mut reminded: Vec<String> = Vec::new();
        for item in items.iter().filter(|i| i.status == ItemStatus::Open) {
            for supplier in self.list_unresponded_suppliers(buyer_id, &item.id).await? {
                if reminded.contains(&supplier.id) {
                    continue;
                }
                self.dispatcher.enqueue(Notification::new(
                    Template::QuoteReminder,
                    vec![supplier.email.clone()],
                    serde_json::json!({
                        "rfq_title": rfq.title,
                        "supplier": supplier.company_name,
                    }),
                ));
                reminded.push(supplier.id);
            }
        }

        Ok(reminded.len())
    }

    async fn buyer_contact_for_rfq(
        &self,
        rfq_id: &str,
    ) -> LifecycleResult<Option<(String, String)>> {
        let row = sqlx::query(
            r#"
            SELECT b.id AS buyer_id, a.email
            FROM rfqs r
            JOIN buyers b ON b.id = r.buyer_id
            JOIN accounts a ON a.id = b.account_id
            WHERE r.id = ?
            "#,
        )
        .bind(rfq_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(procura_storage::StorageError::Sqlx)?;

        row.map(|row| {
            Ok((
                row.try_get("buyer_id").map_err(procura_storage::StorageError::Sqlx)?,
                row.try_get("email").map_err(procura_storage::StorageError::Sqlx)?,
            ))
        })
        .transpose()
    }

    async fn supplier_email(&self, supplier_id: &str) -> LifecycleResult<Option<String>> {
        let email: Option<String> =
            sqlx::query_scalar("SELECT email FROM suppliers WHERE id = ?")
                .bind(supplier_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(procura_storage::StorageError::Sqlx)?;

        Ok(email)
    }
}
