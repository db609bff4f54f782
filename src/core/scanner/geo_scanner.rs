// src/core/scanner/geo_scanner.rs

use std::collections::{BTreeMap, BTreeSet};
use std::net::IpAddr;
use std::path::Path;

use maxminddb::{geoip2, MaxMindDBError, Reader};
use tokio::task::spawn_blocking;
use tracing::{debug, error, info, warn};

use crate::config::ReconConfig;
use crate::core::models::{AnalysisFinding, GeoLocation, GeoResults, ScanResult, Severity};

/// Locates each resolved address in a GeoLite2/GeoIP2 City database.
///
/// The database is opened per scan from `geolite_db_path`. Without a configured
/// path the scan records nothing and raises `GEO_DATABASE_UNAVAILABLE`.
///
/// # Arguments
/// * `addresses` - The A/AAAA addresses found by the DNS scan.
/// * `config` - Supplies the database path.
pub async fn run_geo_scan(addresses: &[String], config: &ReconConfig) -> GeoResults {
    info!(addresses = %addresses.len(), "Starting geolocation scan.");

    let locations = match config.geolite_db_path.clone() {
        None => {
            debug!("No GeoLite database configured.");
            Ok(None)
        }
        Some(path) => {
            let addresses = addresses.to_vec();
            spawn_blocking(move || locate_all(&path, &addresses))
                .await
                .unwrap_or_else(|e| {
                    error!(panic = %e, "Blocking geolocation task panicked!");
                    Err(format!("Task panicked: {}", e))
                })
        }
    };

    let mut results = GeoResults {
        database: config.geolite_db_path.as_ref().map(|path| path.display().to_string()),
        locations,
        analysis: Vec::new(),
    };
    results.analysis = analyze_geo_results(&results);
    info!(findings = %results.analysis.len(), "Geolocation scan finished.");
    results
}

fn locate_all(path: &Path, addresses: &[String]) -> ScanResult<Vec<GeoLocation>> {
    let reader = open_database(path)?;
    let locations: Vec<GeoLocation> = addresses.iter().filter_map(|address| locate(&reader, address)).collect();
    debug!(located = %locations.len(), of = %addresses.len(), "Addresses located.");
    Ok(if locations.is_empty() { None } else { Some(locations) })
}

fn open_database(path: &Path) -> Result<Reader<Vec<u8>>, String> {
    Reader::open_readfile(path).map_err(|e| {
        error!(path = %path.display(), error = %e, "Failed to open GeoLite database");
        format!("could not open GeoLite database {}: {}", path.display(), e)
    })
}

fn locate(reader: &Reader<Vec<u8>>, address: &str) -> Option<GeoLocation> {
    let ip: IpAddr = match address.parse() {
        Ok(ip) => ip,
        Err(_) => {
            warn!(address, "Not an IP address, skipping.");
            return None;
        }
    };
    match reader.lookup::<geoip2::City>(ip) {
        Ok(city) => Some(location_from_city(ip, &city)),
        Err(MaxMindDBError::AddressNotFoundError(_)) => {
            debug!(%ip, "Address not in database.");
            None
        }
        Err(e) => {
            warn!(%ip, error = %e, "GeoLite lookup failed.");
            None
        }
    }
}

fn english(names: &Option<BTreeMap<&str, &str>>) -> Option<String> {
    names.as_ref()?.get("en").map(|name| name.to_string())
}

fn location_from_city(ip: IpAddr, city: &geoip2::City<'_>) -> GeoLocation {
    let country = city.country.as_ref();
    let location = city.location.as_ref();
    GeoLocation {
        ip: ip.to_string(),
        country_code: country.and_then(|c| c.iso_code).map(str::to_string),
        country: country.and_then(|c| english(&c.names)),
        region: city
            .subdivisions
            .as_ref()
            .and_then(|subdivisions| subdivisions.first())
            .and_then(|subdivision| english(&subdivision.names)),
        city: city.city.as_ref().and_then(|c| english(&c.names)),
        latitude: location.and_then(|l| l.latitude),
        longitude: location.and_then(|l| l.longitude),
        timezone: location.and_then(|l| l.time_zone).map(str::to_string),
        postal_code: city.postal.as_ref().and_then(|p| p.code).map(str::to_string),
    }
}

fn analyze_geo_results(results: &GeoResults) -> Vec<AnalysisFinding> {
    debug!("Analyzing geolocation results.");
    let mut analyses = Vec::new();

    if results.database.is_none() {
        debug!("No database, adding GEO_DATABASE_UNAVAILABLE finding.");
        analyses.push(AnalysisFinding::new(Severity::Info, "GEO_DATABASE_UNAVAILABLE"));
        return analyses;
    }

    match &results.locations {
        Err(_) => {
            debug!("Lookup failed, adding GEO_LOOKUP_FAILED finding.");
            analyses.push(AnalysisFinding::new(Severity::Info, "GEO_LOOKUP_FAILED"));
        }
        Ok(Some(locations)) => {
            let countries: BTreeSet<&str> = locations.iter().filter_map(|l| l.country_code.as_deref()).collect();
            if countries.len() > 1 {
                debug!(countries = ?countries, "Addresses span countries, adding GEO_MULTIPLE_COUNTRIES finding.");
                analyses.push(AnalysisFinding::new(Severity::Info, "GEO_MULTIPLE_COUNTRIES"));
            }
        }
        Ok(None) => {}
    }

    analyses
}
