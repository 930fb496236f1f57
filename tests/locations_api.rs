//! Location, stats, exclusivity, and health route tests against a seeded
//! in-memory snapshot.

#[path = "helpers/snapshot.rs"]
mod snapshot;

use axum::http::StatusCode;
use trade_atlas::api::{create_location_router, AppState};

use snapshot::{get, seeded_store};

async fn app() -> axum::Router {
    create_location_router(AppState::new(seeded_store().await))
}

#[tokio::test]
async fn supplier_listing_is_unlimited_and_revenue_desc() {
    let (status, body) = get(app().await, "/api/locations?type=supplier&limit=1").await;
    assert_eq!(status, StatusCode::OK);
    // Suppliers ignore the limit parameter.
    assert_eq!(body["count"], 2);
    let locations = body["locations"].as_array().unwrap();
    assert_eq!(locations[0]["name"], "Fabrikam, Inc.");
    assert_eq!(locations[0]["type"], "supplier");
    assert!(
        locations[0]["metrics"]["revenue"].as_f64().unwrap()
            >= locations[1]["metrics"]["revenue"].as_f64().unwrap()
    );
}

#[tokio::test]
async fn supplier_listing_filters_by_state() {
    let (status, body) = get(app().await, "/api/locations?type=supplier&state=WA").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["locations"][0]["name"], "Litware, Inc.");
}

#[tokio::test]
async fn customer_listing_honors_limit() {
    let (status, body) = get(app().await, "/api/locations?type=customer&limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(body["locations"][0]["type"], "customer");
    assert_eq!(body["locations"][0]["metrics"]["customerCount"], 1);
}

#[tokio::test]
async fn mixed_listing_returns_suppliers_then_customers() {
    let (status, body) = get(app().await, "/api/locations").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 5);
    let locations = body["locations"].as_array().unwrap();
    assert_eq!(locations[0]["type"], "supplier");
    assert_eq!(locations[1]["type"], "supplier");
    assert_eq!(locations[2]["type"], "customer");
}

#[tokio::test]
async fn supplier_detail_attaches_outgoing_connections() {
    let (status, body) = get(app().await, "/api/locations/1").await;
    assert_eq!(status, StatusCode::OK);
    let location = &body["location"];
    assert_eq!(location["type"], "supplier");
    // Supplier profit is not tracked in the snapshot.
    assert_eq!(location["metrics"]["profit"], 0.0);
    let connections = location["connections"].as_array().unwrap();
    assert_eq!(connections.len(), 1);
    assert_eq!(connections[0]["targetId"], 101);
    assert_eq!(connections[0]["volume"], 1500.0);
    assert_eq!(connections[0]["products"], 3);
    assert_eq!(connections[0]["invoices"], 8);
}

#[tokio::test]
async fn customer_detail_attaches_incoming_connections() {
    let (status, body) = get(app().await, "/api/locations/101").await;
    assert_eq!(status, StatusCode::OK);
    let location = &body["location"];
    assert_eq!(location["type"], "customer");
    let connections = location["connections"].as_array().unwrap();
    assert_eq!(connections.len(), 1);
    // Incoming summaries point back at the supplier side.
    assert_eq!(connections[0]["targetId"], 1);
}

#[tokio::test]
async fn unknown_location_is_404() {
    let (status, body) = get(app().await, "/api/locations/99999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Location not found");
}

#[tokio::test]
async fn stats_shape_and_totals() {
    let (status, body) = get(app().await, "/api/stats").await;
    assert_eq!(status, StatusCode::OK);
    let stats = &body["stats"];
    assert_eq!(stats["totalSuppliers"], 2);
    assert_eq!(stats["totalCustomers"], 3);
    assert_eq!(stats["totalLocations"], 5);
    assert_eq!(stats["supplierRevenue"], 2_000_000.0);
    assert_eq!(stats["customerRevenue"], 600_000.0);
    assert_eq!(stats["totalTradeVolume"], 2500.0);
}

#[tokio::test]
async fn exclusivity_sorts_most_concentrated_first() {
    let (status, body) = get(app().await, "/api/supplier-exclusivity").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    let customers = body["customers"].as_array().unwrap();
    for row in customers {
        assert_eq!(row["supplierCount"], 1);
        assert!(row["maxSupplierVolume"].as_f64().unwrap() > 0.0);
    }
}

#[tokio::test]
async fn health_reports_disabled_backends() {
    let (status, body) = get(app().await, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["llm_enabled"], false);
    assert_eq!(body["warehouse_connected"], false);
}
