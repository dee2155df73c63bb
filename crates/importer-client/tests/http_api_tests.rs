//! HTTP client tests against a wiremock server.
//!
//! These check the paths, query strings and bodies sent for each operation
//! and how error bodies come back as [`ClientError`].

use std::time::Duration;

use importer_client::{ClientError, HttpImportApi, ImportApi, JobQuery, UploadFile, WebhookTestRequest};
use importer_core::{EventType, ImportStatus, ProductDraft, ProductFilter, TaskId, WebhookDraft};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> HttpImportApi {
    HttpImportApi::new(&server.uri(), Duration::from_secs(5)).unwrap()
}

fn webhook_json(id: i64) -> serde_json::Value {
    json!({
        "id": id,
        "name": "crm",
        "url": "https://example.com/hook",
        "event_types": ["product.created", "import.completed"],
        "is_active": true,
        "secret_key": null,
        "headers": null,
        "retry_count": 3,
        "timeout_seconds": 30,
        "last_triggered_at": null,
        "last_response_code": null,
        "last_response_time_ms": null,
        "created_at": "2024-05-01T10:00:00Z",
        "updated_at": "2024-05-01T10:00:00Z"
    })
}

fn product_json(id: i64, sku: &str) -> serde_json::Value {
    json!({
        "id": id,
        "sku": sku,
        "name": "Desk Lamp",
        "description": null,
        "price": 19.99,
        "category": "lighting",
        "brand": null,
        "inventory_count": 4,
        "is_active": true,
        "created_at": "2024-05-01T10:00:00Z",
        "updated_at": "2024-05-01T10:00:00Z"
    })
}

#[cfg(test)]
mod import_endpoints {
    use super::*;

    #[tokio::test]
    async fn test_upload_sends_multipart_file_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/import/upload"))
            .and(header_exists("content-type"))
            .and(body_string_contains("name=\"file\""))
            .and(body_string_contains("filename=\"products.csv\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 7,
                "task_id": "abc-123",
                "filename": "products.csv",
                "status": "pending"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let receipt = api_for(&server)
            .upload_csv(UploadFile::new("products.csv", "sku,name\nA-1,Lamp\n"))
            .await
            .unwrap();

        assert_eq!(receipt.task_id, TaskId::new("abc-123"));
        assert_eq!(receipt.id, Some(7));
        assert_eq!(receipt.status, Some(ImportStatus::Pending));
    }

    #[tokio::test]
    async fn test_upload_rejection_carries_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/import/upload"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"detail": "Only CSV files are allowed"})),
            )
            .mount(&server)
            .await;

        let err = api_for(&server)
            .upload_csv(UploadFile::new("products.csv", "x"))
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::Api { status: 400, .. }));
        assert_eq!(err.detail_or("Upload failed"), "Only CSV files are allowed");
    }

    #[tokio::test]
    async fn test_progress_decodes_task() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/import/progress/abc-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "task_id": "abc-123",
                "status": "processing",
                "progress_percentage": 45,
                "processed_records": 90,
                "total_records": 200,
                "successful_records": 88,
                "failed_records": 2,
                "error_message": null,
                "estimated_time_remaining": 30
            })))
            .mount(&server)
            .await;

        let task = api_for(&server)
            .import_progress(&TaskId::new("abc-123"))
            .await
            .unwrap();

        assert_eq!(task.status, ImportStatus::Processing);
        assert_eq!(task.progress_percentage, 45);
        assert_eq!(task.failed_records, 2);
    }

    #[tokio::test]
    async fn test_progress_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/import/progress/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Task not found"})))
            .mount(&server)
            .await;

        let err = api_for(&server)
            .import_progress(&TaskId::new("missing"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert!(!err.is_network_error());
    }

    #[tokio::test]
    async fn test_jobs_query_includes_status_filter() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/import/jobs"))
            .and(query_param("skip", "0"))
            .and(query_param("limit", "25"))
            .and(query_param("status_filter", "failed"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": 3,
                "task_id": "t-3",
                "filename": "bad.csv",
                "total_records": 10,
                "processed_records": 10,
                "successful_records": 0,
                "failed_records": 10,
                "status": "failed",
                "progress_percentage": 100,
                "error_message": "Missing required column: sku",
                "result_summary": null,
                "started_at": "2024-05-01T10:00:00Z",
                "completed_at": "2024-05-01T10:00:03Z",
                "created_at": "2024-05-01T10:00:00Z"
            }])))
            .expect(1)
            .mount(&server)
            .await;

        let jobs = api_for(&server)
            .list_import_jobs(&JobQuery {
                skip: 0,
                limit: 25,
                status: Some(ImportStatus::Failed),
            })
            .await
            .unwrap();

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].duration_secs(), Some(3));
    }
}

#[cfg(test)]
mod product_endpoints {
    use super::*;

    #[tokio::test]
    async fn test_list_products_sends_page_and_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/products"))
            .and(query_param("page", "2"))
            .and(query_param("size", "50"))
            .and(query_param("sku", "LAMP"))
            .and(query_param("is_active", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [product_json(51, "LAMP-51")],
                "total": 51,
                "page": 2,
                "size": 50,
                "pages": 2
            })))
            .expect(1)
            .mount(&server)
            .await;

        let filter = ProductFilter {
            sku: Some(" LAMP ".into()),
            is_active: Some(true),
            ..Default::default()
        };
        let page = api_for(&server).list_products(2, 50, &filter).await.unwrap();

        assert_eq!(page.pages, 2);
        assert_eq!(page.items[0].sku, "LAMP-51");
    }

    #[tokio::test]
    async fn test_create_product_posts_to_collection() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/products/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(product_json(9, "NEW-1")))
            .expect(1)
            .mount(&server)
            .await;

        let product = api_for(&server)
            .create_product(&ProductDraft::new("NEW-1", "Desk Lamp"))
            .await
            .unwrap();
        assert_eq!(product.id, 9);
    }

    #[tokio::test]
    async fn test_delete_all_requires_confirm_param() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/v1/products/"))
            .and(query_param("confirm", "true"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "message": "Successfully deleted 12 products",
                "deleted_count": 12
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = api_for(&server).delete_all_products().await.unwrap();
        assert_eq!(response.message, "Successfully deleted 12 products");
        assert_eq!(response.deleted_count, Some(12));
    }

    #[tokio::test]
    async fn test_delete_product_ignores_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/api/v1/products/4"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Product deleted successfully"})))
            .expect(1)
            .mount(&server)
            .await;

        api_for(&server).delete_product(4).await.unwrap();
    }
}

#[cfg(test)]
mod webhook_endpoints {
    use super::*;

    #[tokio::test]
    async fn test_list_webhooks_uses_trailing_slash() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/webhooks/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([webhook_json(1), webhook_json(2)])))
            .expect(1)
            .mount(&server)
            .await;

        let hooks = api_for(&server).list_webhooks().await.unwrap();
        assert_eq!(hooks.len(), 2);
        assert_eq!(hooks[0].event_types[0], EventType::ProductCreated);
    }

    #[tokio::test]
    async fn test_test_webhook_posts_event_and_data() {
        let server = MockServer::start().await;
        let test_data = json!({"id": 123, "sku": "TEST-SKU-CREATED"});
        Mock::given(method("POST"))
            .and(path("/api/v1/webhooks/1/test"))
            .and(body_json(json!({"event_type": "product.created", "test_data": test_data})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "response_code": 200,
                "response_time_ms": 87,
                "response_body": "ok",
                "error_message": null
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = WebhookTestRequest {
            event_type: EventType::ProductCreated,
            test_data: json!({"id": 123, "sku": "TEST-SKU-CREATED"}),
        };
        let result = api_for(&server).test_webhook(1, &request).await.unwrap();

        assert!(result.success);
        assert_eq!(result.response_code, Some(200));
        assert_eq!(result.response_time_ms, Some(87));
    }

    #[tokio::test]
    async fn test_update_webhook_puts_draft() {
        let server = MockServer::start().await;
        let draft = WebhookDraft::new("crm", "https://example.com/hook").with_event(EventType::ProductCreated);
        Mock::given(method("PUT"))
            .and(path("/api/v1/webhooks/1"))
            .and(body_json(serde_json::to_value(&draft).unwrap()))
            .respond_with(ResponseTemplate::new(200).set_body_json(webhook_json(1)))
            .expect(1)
            .mount(&server)
            .await;

        let hook = api_for(&server).update_webhook(1, &draft).await.unwrap();
        assert_eq!(hook.id, 1);
    }

    #[tokio::test]
    async fn test_webhook_logs_paging() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/webhooks/1/logs"))
            .and(query_param("skip", "10"))
            .and(query_param("limit", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": 77,
                "webhook_id": 1,
                "event_type": "import.completed",
                "payload": {"import_job_id": 999},
                "response_code": 500,
                "response_body": "boom",
                "response_time_ms": 120,
                "error_message": "HTTP 500",
                "retry_attempt": 2,
                "success": false,
                "created_at": "2024-05-01T10:00:00Z"
            }])))
            .expect(1)
            .mount(&server)
            .await;

        let logs = api_for(&server).webhook_logs(1, 10, 5).await.unwrap();
        assert_eq!(logs[0].event_type, EventType::ImportCompleted);
        assert_eq!(logs[0].retry_attempt, 2);
    }
}

#[cfg(test)]
mod transport_failures {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        // Port 9 (discard) is closed on test machines.
        let api = HttpImportApi::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = api.list_webhooks().await.unwrap_err();
        assert!(err.is_network_error(), "unexpected error: {err:?}");
        assert_eq!(err.detail(), None);
    }

    #[tokio::test]
    async fn test_slow_server_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/import/jobs"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)).set_body_json(json!([])))
            .mount(&server)
            .await;

        let api = HttpImportApi::new(&server.uri(), Duration::from_millis(100)).unwrap();
        let err = api.list_import_jobs(&JobQuery::default()).await.unwrap_err();
        assert!(matches!(err, ClientError::Timeout(_)), "unexpected error: {err:?}");
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/webhooks/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"unexpected": true})))
            .mount(&server)
            .await;

        let err = api_for(&server).list_webhooks().await.unwrap_err();
        assert!(matches!(err, ClientError::Decode(_)), "unexpected error: {err:?}");
        assert_eq!(err.friendly_message(), "Server sent an unexpected response.");
    }
}
