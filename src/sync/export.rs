//! File exports written alongside the snapshot database.
//!
//! Four pretty-printed JSON files hold the entity extracts; the city rollup
//! additionally goes out as CSV for spreadsheet users. The CSV keeps the
//! column order downstream notebooks already expect.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use super::extract::{Extracted, MapCityRecord};

pub const SUPPLIERS_FILE: &str = "suppliers.json";
pub const CUSTOMERS_FILE: &str = "customers.json";
pub const CONNECTIONS_FILE: &str = "connections.json";
pub const TRADE_ROUTES_FILE: &str = "trade-routes.json";
pub const MAP_CSV_FILE: &str = "map-data-export.csv";

const CSV_HEADER: &str = "CityID,CityName,StateProvinceCode,StateProvinceName,CountryName,\
Latitude,Longitude,Population,Revenue,Profit,CustomerCount";

pub fn export_all(extracted: &Extracted, dir: &Path) -> Result<()> {
    write_json(&dir.join(SUPPLIERS_FILE), &extracted.suppliers)?;
    write_json(&dir.join(CUSTOMERS_FILE), &extracted.customers)?;
    write_json(&dir.join(CONNECTIONS_FILE), &extracted.connections)?;
    write_json(&dir.join(TRADE_ROUTES_FILE), &extracted.trade_routes)?;

    let csv_path = dir.join(MAP_CSV_FILE);
    fs::write(&csv_path, map_data_csv(&extracted.map_cities))
        .with_context(|| format!("Failed to write {}", csv_path.display()))?;
    tracing::info!(path = %csv_path.display(), rows = extracted.map_cities.len(), "Wrote CSV export");
    Ok(())
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let body = serde_json::to_vec_pretty(value).context("Failed to serialize export")?;
    fs::write(path, body).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "Wrote JSON export");
    Ok(())
}

pub fn map_data_csv(cities: &[MapCityRecord]) -> String {
    let mut out = String::with_capacity(cities.len() * 96 + CSV_HEADER.len() + 1);
    out.push_str(CSV_HEADER);
    out.push('\n');
    for city in cities {
        // Only the name columns can contain commas; the rest are numeric
        // or short codes.
        let _ = writeln!(
            out,
            "{},\"{}\",{},\"{}\",\"{}\",{},{},{},{:.2},{:.2},{}",
            city.city_id,
            city.city_name,
            city.state_code,
            city.state_name,
            city.country_name,
            city.latitude,
            city.longitude,
            city.population,
            city.revenue,
            city.profit,
            city.customer_count,
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city(id: i64, name: &str, revenue: f64) -> MapCityRecord {
        MapCityRecord {
            city_id: id,
            city_name: name.to_string(),
            state_code: "NY".to_string(),
            state_name: "New York".to_string(),
            country_name: "United States".to_string(),
            latitude: 43.19,
            longitude: -78.57,
            population: 1248,
            revenue,
            profit: revenue / 2.0,
            profit_margin: 50.0,
            customer_count: 1,
        }
    }

    #[test]
    fn csv_has_header_and_quoted_names() {
        let csv = map_data_csv(&[city(38171, "Gasport", 100.5)]);
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("CityID,CityName,"));
        assert_eq!(
            lines.next().unwrap(),
            "38171,\"Gasport\",NY,\"New York\",\"United States\",43.19,-78.57,1248,100.50,50.25,1"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn csv_empty_input_is_header_only() {
        let csv = map_data_csv(&[]);
        assert_eq!(csv, format!("{CSV_HEADER}\n"));
    }
}
