// ABOUTME: Quotation lifecycle for Procura: quote submission and order placement
// ABOUTME: Wraps storage in the open/closed item state machine with notifications

pub mod engine;
pub mod error;

pub use engine::{LifecycleEngine, PlacedOrder, SubmitOutcome};
pub use error::{LifecycleError, LifecycleResult};

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use pretty_assertions::assert_eq;
    use sqlx::SqlitePool;

    use procura_core::types::{
        ItemStatus, OrderStatus, QuoteSubmission, RfqCreateInput, RfqItemInput,
        SupplierCreateInput,
    };
    use procura_notify::{Dispatcher, LogTransport};
    use procura_storage::test_utils::{memory_pool, seed_buyer};
    use procura_storage::{QuoteStorage, RfqStorage, SupplierStorage};

    struct Fixture {
        pool: SqlitePool,
        engine: LifecycleEngine,
        buyer_id: String,
        rfq_id: String,
        item_id: String,
        supplier_ids: Vec<String>,
    }

    async fn fixture(supplier_count: usize) -> Fixture {
        let pool = memory_pool().await;
        let buyer_id = seed_buyer(&pool, "buyer@example.com").await;

        let suppliers = SupplierStorage::new(pool.clone());
        let mut supplier_ids = Vec::new();
        for n in 0..supplier_count {
            let supplier = suppliers
                .create_supplier(
                    &buyer_id,
                    &SupplierCreateInput {
                        company_name: format!("Supplier {n}"),
                        person_of_contact: format!("Contact {n}"),
                        phone_no: "+1-555-0100".to_string(),
                        email: format!("supplier{n}@example.com"),
                        remark: None,
                        categories: vec![],
                    },
                )
                .await
                .unwrap();
            supplier_ids.push(supplier.id);
        }

        let rfqs = RfqStorage::new(pool.clone());
        let (rfq, items) = rfqs
            .create_rfq(
                &buyer_id,
                &RfqCreateInput {
                    title: "Fasteners Q3".to_string(),
                    items: vec![RfqItemInput {
                        product_name: "M4 screws".to_string(),
                        quantity: 1000.0,
                        uom: "pcs".to_string(),
                        specifications: None,
                        expected_delivery_date: None,
                    }],
                    supplier_ids: supplier_ids.clone(),
                    metadata: None,
                },
            )
            .await
            .unwrap();

        let engine = LifecycleEngine::new(pool.clone(), Dispatcher::spawn(Arc::new(LogTransport)));

        Fixture {
            pool,
            engine,
            buyer_id,
            rfq_id: rfq.id,
            item_id: items[0].id.clone(),
            supplier_ids,
        }
    }

    fn submission(item_id: &str, supplier_id: &str, price: f64) -> QuoteSubmission {
        QuoteSubmission {
            rfq_item_id: item_id.to_string(),
            supplier_id: supplier_id.to_string(),
            quantity: 1000.0,
            price,
            lead_time: Some(14),
            remarks: None,
        }
    }

    #[tokio::test]
    async fn test_submit_quote_creates_pending_quote() {
        let f = fixture(1).await;

        let outcome = f
            .engine
            .submit_quote(&submission(&f.item_id, &f.supplier_ids[0], 0.05))
            .await
            .unwrap();

        assert!(outcome.created);
        assert_eq!(outcome.quote.order_status, OrderStatus::Pending);
        assert_eq!(outcome.quote.price, 0.05);
    }

    #[tokio::test]
    async fn test_duplicate_submission_keeps_original() {
        let f = fixture(1).await;

        let first = f
            .engine
            .submit_quote(&submission(&f.item_id, &f.supplier_ids[0], 0.05))
            .await
            .unwrap();
        let second = f
            .engine
            .submit_quote(&submission(&f.item_id, &f.supplier_ids[0], 0.09))
            .await
            .unwrap();

        // Both calls succeed but only the first wrote anything
        assert!(first.created);
        assert!(!second.created);
        assert_eq!(second.quote.id, first.quote.id);
        assert_eq!(second.quote.price, 0.05);

        let quotes = QuoteStorage::new(f.pool.clone())
            .list_by_item(&f.item_id)
            .await
            .unwrap();
        assert_eq!(quotes.len(), 1);
    }

    #[tokio::test]
    async fn test_uninvited_supplier_cannot_quote() {
        let f = fixture(1).await;

        let suppliers = SupplierStorage::new(f.pool.clone());
        let outsider = suppliers
            .create_supplier(
                &f.buyer_id,
                &SupplierCreateInput {
                    company_name: "Uninvited Co".to_string(),
                    person_of_contact: "Nobody".to_string(),
                    phone_no: "+1-555-0199".to_string(),
                    email: "uninvited@example.com".to_string(),
                    remark: None,
                    categories: vec![],
                },
            )
            .await
            .unwrap();

        let err = f
            .engine
            .submit_quote(&submission(&f.item_id, &outsider.id, 0.05))
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound));
    }

    #[tokio::test]
    async fn test_place_order_closes_item_and_marks_quote() {
        let f = fixture(2).await;

        let s1 = f
            .engine
            .submit_quote(&submission(&f.item_id, &f.supplier_ids[0], 0.05))
            .await
            .unwrap();
        f.engine
            .submit_quote(&submission(&f.item_id, &f.supplier_ids[1], 0.06))
            .await
            .unwrap();

        let placed = f
            .engine
            .place_order(&f.buyer_id, &f.item_id, &s1.quote.id)
            .await
            .unwrap();

        assert_eq!(placed.quote.order_status, OrderStatus::Placed);
        assert_eq!(placed.item.status, ItemStatus::Closed);

        let item = RfqStorage::new(f.pool.clone())
            .get_item(&f.buyer_id, &f.item_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(item.status, ItemStatus::Closed);
    }

    #[tokio::test]
    async fn test_second_order_on_same_item_conflicts() {
        let f = fixture(2).await;

        let s1 = f
            .engine
            .submit_quote(&submission(&f.item_id, &f.supplier_ids[0], 0.05))
            .await
            .unwrap();
        let s2 = f
            .engine
            .submit_quote(&submission(&f.item_id, &f.supplier_ids[1], 0.06))
            .await
            .unwrap();

        f.engine
            .place_order(&f.buyer_id, &f.item_id, &s1.quote.id)
            .await
            .unwrap();

        let err = f
            .engine
            .place_order(&f.buyer_id, &f.item_id, &s2.quote.id)
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Conflict(_)));

        // The losing quote stays pending; exactly one winner exists
        let quotes = QuoteStorage::new(f.pool.clone())
            .list_by_item(&f.item_id)
            .await
            .unwrap();
        let placed: Vec<_> = quotes
            .iter()
            .filter(|q| q.order_status == OrderStatus::Placed)
            .collect();
        assert_eq!(placed.len(), 1);
        assert_eq!(placed[0].id, s1.quote.id);
    }

    #[tokio::test]
    async fn test_place_order_replay_conflicts() {
        let f = fixture(1).await;

        let s1 = f
            .engine
            .submit_quote(&submission(&f.item_id, &f.supplier_ids[0], 0.05))
            .await
            .unwrap();

        f.engine
            .place_order(&f.buyer_id, &f.item_id, &s1.quote.id)
            .await
            .unwrap();
        let err = f
            .engine
            .place_order(&f.buyer_id, &f.item_id, &s1.quote.id)
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_place_order_scoped_to_buyer() {
        let f = fixture(1).await;

        let s1 = f
            .engine
            .submit_quote(&submission(&f.item_id, &f.supplier_ids[0], 0.05))
            .await
            .unwrap();

        let other_buyer = seed_buyer(&f.pool, "other@example.com").await;
        let err = f
            .engine
            .place_order(&other_buyer, &f.item_id, &s1.quote.id)
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound));

        // Nothing changed for the real owner
        let item = RfqStorage::new(f.pool.clone())
            .get_item(&f.buyer_id, &f.item_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(item.status, ItemStatus::Open);
    }

    #[tokio::test]
    async fn test_place_order_rejects_quote_from_other_item() {
        let f = fixture(1).await;

        let rfqs = RfqStorage::new(f.pool.clone());
        let (_, other_items) = rfqs
            .create_rfq(
                &f.buyer_id,
                &RfqCreateInput {
                    title: "Second RFQ".to_string(),
                    items: vec![RfqItemInput {
                        product_name: "M6 bolts".to_string(),
                        quantity: 200.0,
                        uom: "pcs".to_string(),
                        specifications: None,
                        expected_delivery_date: None,
                    }],
                    supplier_ids: f.supplier_ids.clone(),
                    metadata: None,
                },
            )
            .await
            .unwrap();

        let other_quote = f
            .engine
            .submit_quote(&submission(&other_items[0].id, &f.supplier_ids[0], 1.2))
            .await
            .unwrap();

        let err = f
            .engine
            .place_order(&f.buyer_id, &f.item_id, &other_quote.quote.id)
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound));
    }

    #[tokio::test]
    async fn test_unresponded_suppliers_shrinks_as_quotes_arrive() {
        let f = fixture(3).await;

        let before = f
            .engine
            .list_unresponded_suppliers(&f.buyer_id, &f.item_id)
            .await
            .unwrap();
        assert_eq!(before.len(), 3);

        f.engine
            .submit_quote(&submission(&f.item_id, &f.supplier_ids[1], 0.07))
            .await
            .unwrap();

        let after = f
            .engine
            .list_unresponded_suppliers(&f.buyer_id, &f.item_id)
            .await
            .unwrap();
        assert_eq!(after.len(), 2);
        assert!(after.iter().all(|s| s.id != f.supplier_ids[1]));
    }

    #[tokio::test]
    async fn test_send_reminders_counts_distinct_suppliers() {
        let f = fixture(3).await;

        f.engine
            .submit_quote(&submission(&f.item_id, &f.supplier_ids[0], 0.05))
            .await
            .unwrap();

        let reminded = f
            .engine
            .send_reminders(&f.buyer_id, &f.rfq_id)
            .await
            .unwrap();
        assert_eq!(reminded, 2);
    }

    #[tokio::test]
    async fn test_send_reminders_skips_closed_items() {
        let f = fixture(2).await;

        let s1 = f
            .engine
            .submit_quote(&submission(&f.item_id, &f.supplier_ids[0], 0.05))
            .await
            .unwrap();
        f.engine
            .place_order(&f.buyer_id, &f.item_id, &s1.quote.id)
            .await
            .unwrap();

        let reminded = f
            .engine
            .send_reminders(&f.buyer_id, &f.rfq_id)
            .await
            .unwrap();
        assert_eq!(reminded, 0);
    }

    #[tokio::test]
    async fn test_submit_quote_rejects_invalid_values() {
        let f = fixture(1).await;

        let mut bad = submission(&f.item_id, &f.supplier_ids[0], 0.05);
        bad.quantity = 0.0;
        let err = f.engine.submit_quote(&bad).await.unwrap_err();
        assert!(matches!(err, LifecycleError::Validation(_)));

        let mut negative = submission(&f.item_id, &f.supplier_ids[0], -1.0);
        negative.price = -1.0;
        let err = f.engine.submit_quote(&negative).await.unwrap_err();
        assert!(matches!(err, LifecycleError::Validation(_)));
    }
}
