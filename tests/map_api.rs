//! Map route tests: city listing, search, state rollups, and stats.

#[path = "helpers/snapshot.rs"]
mod snapshot;

use axum::http::StatusCode;
use trade_atlas::api::{create_map_router, AppState};
use trade_atlas::database::warehouse::CityRollupRow;
use trade_atlas::sync::extract::build_records;
use trade_atlas::sync::load;
use trade_atlas::LocalStore;

use snapshot::{get, memory_pool, seeded_store};

async fn app() -> axum::Router {
    create_map_router(AppState::new(seeded_store().await))
}

fn rollup_city(id: i64, name: &str, revenue: f64, profit: f64) -> CityRollupRow {
    CityRollupRow {
        city_id: id,
        city_name: name.to_string(),
        state_code: Some("TX".to_string()),
        state_name: Some("Texas".to_string()),
        country_name: Some("United States".to_string()),
        latitude: Some(31.0),
        longitude: Some(-100.0),
        population: Some(5_000),
        revenue,
        profit,
        customer_count: 3,
    }
}

async fn app_with_cities(cities: Vec<CityRollupRow>) -> axum::Router {
    let pool = memory_pool().await;
    let extracted = build_records(vec![], vec![], vec![], vec![], cities);
    load::create_schema(&pool).await.unwrap();
    load::load_snapshot(&pool, &extracted).await.unwrap();
    load::create_indexes(&pool).await.unwrap();
    create_map_router(AppState::new(LocalStore::new(pool)))
}

#[tokio::test]
async fn cities_exclude_rows_without_customers() {
    let (status, body) = get(app().await, "/api/map/cities").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    // Emptyville has no customers and is filtered out.
    assert_eq!(body["count"], 1);
    let city = &body["data"][0];
    assert_eq!(city["name"], "Gasport");
    assert_eq!(city["state"], "NY");
    assert_eq!(city["metrics"]["customerCount"], 2);
    assert_eq!(city["metrics"]["profitMargin"], 45.0);
    assert_eq!(city["visualization"]["markerSize"], "large");
    assert_eq!(city["visualization"]["markerColor"], "#ffcc00");
    assert_eq!(city["visualization"]["opacity"], 0.8);
}

#[tokio::test]
async fn cities_honor_revenue_bounds() {
    let (_, body) = get(app().await, "/api/map/cities?minRevenue=700000").await;
    assert_eq!(body["count"], 0);
    let (_, body) = get(app().await, "/api/map/cities?maxRevenue=700000").await;
    assert_eq!(body["count"], 1);
}

#[tokio::test]
async fn sort_by_profit_reorders_cities() {
    // Revenue order and profit order disagree on purpose.
    let app = app_with_cities(vec![
        rollup_city(1, "Hightown", 500_000.0, 50_000.0),
        rollup_city(2, "Lowtown", 300_000.0, 200_000.0),
    ])
    .await;

    let (_, body) = get(app.clone(), "/api/map/cities?sortBy=profit").await;
    assert_eq!(body["data"][0]["name"], "Lowtown");
    assert_eq!(body["data"][1]["name"], "Hightown");

    // Unrecognized sort fields fall back to revenue.
    let (_, body) = get(app, "/api/map/cities?sortBy=city_name").await;
    assert_eq!(body["data"][0]["name"], "Hightown");
    assert_eq!(body["data"][1]["name"], "Lowtown");
}

#[tokio::test]
async fn search_requires_a_query() {
    let (status, body) = get(app().await, "/api/map/search").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Query parameter required");
    assert!(body.get("results").is_none());
}

#[tokio::test]
async fn search_matches_city_substrings() {
    let (status, body) = get(app().await, "/api/map/search?q=gas").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["type"], "city");
    assert_eq!(results[0]["name"], "Gasport, NY");
    assert_eq!(results[0]["metrics"]["revenue"], 600_000.0);
}

#[tokio::test]
async fn search_matches_literal_underscores() {
    let app = app_with_cities(vec![
        rollup_city(1, "Fort_Knox", 100_000.0, 10_000.0),
        rollup_city(2, "Fortress", 90_000.0, 9_000.0),
    ])
    .await;

    // The underscore matches itself, not any single character.
    let (status, body) = get(app, "/api/map/search?q=Fort_").await;
    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["name"], "Fort_Knox, TX");
}

#[tokio::test]
async fn state_details_aggregate_member_cities() {
    let (status, body) = get(app().await, "/api/map/states/NY").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"]["code"], "NY");
    assert_eq!(body["state"]["name"], "NY State");
    assert_eq!(body["citiesCount"], 1);
    assert_eq!(body["metrics"]["totalRevenue"], 600_000.0);
    assert_eq!(body["metrics"]["totalCustomers"], 2);
}

#[tokio::test]
async fn state_with_no_cities_echoes_the_code() {
    let (status, body) = get(app().await, "/api/map/states/ZZ").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["citiesCount"], 0);
    assert_eq!(body["state"]["name"], "ZZ");
    assert_eq!(body["metrics"]["totalRevenue"], 0.0);
}

#[tokio::test]
async fn stats_cover_the_whole_rollup() {
    let (status, body) = get(app().await, "/api/map/stats").await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    // Stats cover all rows, including customerless cities.
    assert_eq!(data["totalCities"], 2);
    assert_eq!(data["citiesWithCustomers"], 1);
    assert_eq!(data["totalRevenue"], 600_000.0);
    assert_eq!(data["totalProfit"], 270_000.0);
    assert_eq!(data["averageRevenue"], 300_000.0);
    assert_eq!(data["maxRevenue"], 600_000.0);
    assert_eq!(data["averageProfitMargin"], 22.5);
    assert_eq!(data["topState"]["code"], "NY");
    assert_eq!(data["topState"]["revenue"], 600_000.0);
    assert_eq!(data["topCity"]["name"], "Gasport");
}
