//! Shared test utilities for rew-db tests.

pub(crate) mod helpers {
    use rew_core::snapshot::{FieldValue, ValueSnapshot};

    use crate::RewindDb;
    use crate::service::RewindService;

    /// In-memory service with the default retention window.
    pub async fn test_service() -> RewindService {
        test_service_with_retention(50).await
    }

    /// In-memory service with a specific retention window.
    pub async fn test_service_with_retention(max_entries: u32) -> RewindService {
        let db = RewindDb::open_local(":memory:").await.unwrap();
        RewindService::from_db(db, max_entries)
    }

    /// A complete transaction field set.
    pub fn txn_values(
        merchant: &str,
        amount_cents: i64,
        category: &str,
        reviewed: bool,
    ) -> ValueSnapshot {
        ValueSnapshot::from_fields([
            ("occurred_on", FieldValue::from("2026-03-14")),
            ("merchant", FieldValue::from(merchant)),
            ("amount_cents", FieldValue::from(amount_cents)),
            ("category", FieldValue::from(category)),
            ("reviewed", FieldValue::from(reviewed)),
            ("notes", FieldValue::Null),
        ])
    }
}
