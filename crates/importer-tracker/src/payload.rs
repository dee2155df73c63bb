//! Synthetic event payloads for webhook tests.
//!
//! The payload shape depends on the event type being tested. Product events
//! carry a fixed fake product, `import.completed` a fixed import summary, and
//! anything else a generic message naming the event.

use chrono::{DateTime, SecondsFormat, Utc};
use importer_client::WebhookTestRequest;
use importer_core::EventType;
use serde::Serialize;

/// Fixed product fixture sent with `product.*` test events.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductFixture {
    pub id: i64,
    pub sku: &'static str,
    pub name: &'static str,
    pub timestamp: String,
}

/// Fixed import summary sent with `import.completed` test events.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportSummaryFixture {
    pub import_job_id: i64,
    pub total_processed: u64,
    pub successful_imports: u64,
    pub failed_imports: u64,
    pub processing_time_seconds: f64,
}

/// Payload for event types without a dedicated fixture.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenericFixture {
    pub id: i64,
    pub timestamp: String,
    pub message: String,
}

/// Test data keyed by event type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TestPayload {
    Product(ProductFixture),
    ImportCompleted(ImportSummaryFixture),
    Generic(GenericFixture),
}

impl TestPayload {
    /// Build the test data for `event`, stamped with `now`.
    pub fn for_event(event: &EventType, now: DateTime<Utc>) -> Self {
        let timestamp = iso_timestamp(now);
        let product = |id, sku, name| {
            TestPayload::Product(ProductFixture {
                id,
                sku,
                name,
                timestamp: timestamp.clone(),
            })
        };

        match event {
            EventType::ProductCreated => product(123, "TEST-SKU-CREATED", "Test Product Created"),
            EventType::ProductUpdated => product(456, "TEST-SKU-UPDATED", "Test Product Updated"),
            EventType::ProductDeleted => product(789, "TEST-SKU-DELETED", "Test Product Deleted"),
            EventType::ImportCompleted => TestPayload::ImportCompleted(ImportSummaryFixture {
                import_job_id: 999,
                total_processed: 100,
                successful_imports: 95,
                failed_imports: 5,
                processing_time_seconds: 45.2,
            }),
            EventType::Other(name) => TestPayload::Generic(GenericFixture {
                id: 123,
                timestamp,
                message: format!("Test data for {}", name),
            }),
        }
    }

    /// Wrap the payload into the body of the test endpoint.
    pub fn into_request(self, event: EventType) -> WebhookTestRequest {
        let test_data = serde_json::to_value(&self).unwrap_or(serde_json::Value::Null);
        WebhookTestRequest {
            event_type: event,
            test_data,
        }
    }
}

/// Build the test request for the first event type of a webhook.
pub fn build_test_request(event: &EventType, now: DateTime<Utc>) -> WebhookTestRequest {
    TestPayload::for_event(event, now).into_request(event.clone())
}

/// ISO-8601 UTC timestamp with millisecond precision, e.g. `2024-05-01T10:00:00.000Z`.
fn iso_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap()
    }

    #[test]
    fn test_product_created_payload() {
        let request = build_test_request(&EventType::ProductCreated, now());
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "event_type": "product.created",
                "test_data": {
                    "id": 123,
                    "sku": "TEST-SKU-CREATED",
                    "name": "Test Product Created",
                    "timestamp": "2024-05-01T10:30:00.000Z"
                }
            })
        );
    }

    #[test]
    fn test_product_updated_and_deleted_fixtures() {
        let updated = build_test_request(&EventType::ProductUpdated, now());
        assert_eq!(updated.test_data["id"], 456);
        assert_eq!(updated.test_data["sku"], "TEST-SKU-UPDATED");

        let deleted = build_test_request(&EventType::ProductDeleted, now());
        assert_eq!(deleted.test_data["id"], 789);
        assert_eq!(deleted.test_data["name"], "Test Product Deleted");
    }

    #[test]
    fn test_import_completed_has_no_timestamp() {
        let request = build_test_request(&EventType::ImportCompleted, now());
        assert_eq!(
            request.test_data,
            json!({
                "import_job_id": 999,
                "total_processed": 100,
                "successful_imports": 95,
                "failed_imports": 5,
                "processing_time_seconds": 45.2
            })
        );
    }

    #[test]
    fn test_unknown_event_uses_generic_fixture() {
        let event = EventType::from("inventory.low");
        let request = build_test_request(&event, now());
        assert_eq!(request.event_type, event);
        assert_eq!(
            request.test_data,
            json!({
                "id": 123,
                "timestamp": "2024-05-01T10:30:00.000Z",
                "message": "Test data for inventory.low"
            })
        );
    }
}
