use std::collections::HashMap;

use axum::Json;
use axum::Router;
use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::routing::get;
use serde_json::{Value, json};

use super::*;
use crate::storage::session_store::SessionStore;
use crate::test_support::{ok_envelope, spawn_stub, test_client, unreachable_base_url};

async fn service(router: Router) -> DashboardService {
    DashboardService::new(test_client(&spawn_stub(router).await, SessionStore::in_memory()))
}

fn live_payload() -> Value {
    json!({
        "stats": {
            "totalUsers": 10, "totalSales": 99.5, "totalProducts": 3, "conversionRate": 1.0,
            "salesGrowth": 0.0, "usersGrowth": 0.0, "productsGrowth": 0.0, "conversionGrowth": 0.0
        },
        "recentSales": [{
            "id": "s1", "customerName": "C", "customerEmail": "c@example.test",
            "amount": 12.0, "currency": "USD", "date": "2024-02-02", "status": "cancelled"
        }],
        "systemActivities": [{
            "id": "a1", "action": "login", "description": "d", "timestamp": "t", "user": "u", "type": "system"
        }],
        "salesChart": [{ "label": "Jan", "value": 4.0 }],
        "usersChart": []
    })
}

// =============================================================================
// TOKENS
// =============================================================================

#[test]
fn tokens_parse_and_display() {
    assert_eq!("year".parse::<ChartPeriod>(), Ok(ChartPeriod::Year));
    assert_eq!(ChartPeriod::default().to_string(), "month");
    assert_eq!(" xlsx ".parse::<ExportFormat>(), Ok(ExportFormat::Xlsx));
    assert_eq!(ExportKind::Products.as_str(), "products");

    let err = "daily".parse::<ChartPeriod>().unwrap_err();
    assert_eq!(err.expected, "week month year");
    assert_eq!(err.value, "daily");
}

// =============================================================================
// PASS-THROUGH
// =============================================================================

#[tokio::test]
async fn dashboard_data_decodes_camel_case() {
    let svc = service(Router::new().route("/api/dashboard", get(|| async { ok_envelope(live_payload()) }))).await;

    let data = svc.get_dashboard_data().await.unwrap().into_success().unwrap();
    assert_eq!(data.stats.total_users, 10);
    assert_eq!(data.recent_sales[0].status, SaleStatus::Cancelled);
    assert_eq!(data.system_activities[0].kind, ActivityKind::System);
    assert_eq!(data.sales_chart[0].date, None);
}

#[tokio::test]
async fn list_endpoints_send_limit_and_period() {
    let router = Router::new()
        .route(
            "/api/dashboard/recent-sales",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                assert_eq!(q.get("limit").map(String::as_str), Some("5"));
                ok_envelope(json!([]))
            }),
        )
        .route(
            "/api/dashboard/users-chart",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                ok_envelope(json!([{ "label": q.get("period").cloned().unwrap_or_default(), "value": 1 }]))
            }),
        );
    let svc = service(router).await;

    assert!(svc.get_recent_sales(5).await.unwrap().success);
    let chart = svc.get_users_chart(ChartPeriod::Week).await.unwrap().into_success().unwrap();
    assert_eq!(chart[0].label, "week");
}

#[tokio::test]
async fn export_builds_kind_path_and_format_query() {
    let router = Router::new().route(
        "/api/dashboard/export/{kind}",
        get(|Path(kind): Path<String>, Query(q): Query<HashMap<String, String>>| async move {
            let format = q.get("format").cloned().unwrap_or_default();
            ok_envelope(json!({ "downloadUrl": format!("/files/{kind}.{format}") }))
        }),
    );
    let svc = service(router).await;

    let link = svc.export_data(ExportKind::Users, ExportFormat::Xlsx).await.unwrap().into_success().unwrap();
    assert_eq!(link.download_url, "/files/users.xlsx");
}

// =============================================================================
// load_dashboard
// =============================================================================

#[tokio::test]
async fn load_dashboard_prefers_live_data() {
    let svc = service(Router::new().route("/api/dashboard", get(|| async { ok_envelope(live_payload()) }))).await;

    let view = svc.load_dashboard().await;
    assert_eq!(view.source, DataSource::Live);
    assert_eq!(view.data.stats.total_products, 3);
}

#[tokio::test]
async fn load_dashboard_labels_example_data_when_offline() {
    let api = test_client(&unreachable_base_url().await, SessionStore::in_memory());
    let view = DashboardService::new(api).load_dashboard().await;

    assert!(view.is_example());
    assert_eq!(view.data, example_dashboard());
    let out = serde_json::to_value(&view).unwrap();
    assert_eq!(out["source"], "example");
    assert!(out["reason"].as_str().unwrap().contains("cannot reach the API"));
}

#[tokio::test]
async fn load_dashboard_uses_server_message_on_envelope_failure() {
    let router = Router::new().route(
        "/api/dashboard",
        get(|| async { Json(json!({ "data": null, "message": "maintenance", "success": false })) }),
    );
    let view = service(router).await.load_dashboard().await;
    assert_eq!(view.source, DataSource::Example { reason: "maintenance".to_owned() });
}

#[tokio::test]
async fn load_dashboard_falls_back_on_status_errors() {
    let router = Router::new().route("/api/dashboard", get(|| async { StatusCode::SERVICE_UNAVAILABLE }));
    let view = service(router).await.load_dashboard().await;
    assert!(view.is_example());
}

#[test]
fn example_dataset_matches_published_figures() {
    let data = example_dashboard();
    assert_eq!(data.stats.total_users, 1234);
    assert_eq!(data.recent_sales.len(), 4);
    assert_eq!(data.system_activities.len(), 4);
    assert!(data.sales_chart.is_empty());
}
