/// HTTP endpoint for the flood risk dashboard
///
/// Serves the current assessment as JSON so the map UI (or anything else)
/// can poll it. Assessments are memoised in a `DisplayCache` keyed by
/// location and policy, so a burst of dashboard refreshes inside the TTL
/// hits the sensor source once.
///
/// Endpoints:
/// - GET /health - Service health check
/// - GET /assessment - Assessment at the configured station
/// - GET /assessment?lon={lon}&lat={lat}[&policy={policy}] - Assessment at a point
/// - GET /zone?lon={lon}&lat={lat} - Hazard zone lookup only
///
/// A malformed or non-finite coordinate is a 400 with the geometry error.

use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::io::Cursor;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};
use threadpool::ThreadPool;

use crate::alert::risk::RiskPolicy;
use crate::assessment::{Assessor, RiskReport};
use crate::ingest::ReadingSource;
use crate::model::{GeoPoint, GeometryError};
use crate::monitor::DisplayCache;
use crate::zones::{ZoneBand, zone_label};

/// Worker threads handling requests.
pub const DEFAULT_WORKERS: usize = 4;

type JsonResponse = tiny_http::Response<Cursor<Vec<u8>>>;

/// Location bits plus policy name.
type CacheKey = (u64, u64, &'static str);

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Everything a request handler needs, shared across the worker pool.
pub struct EndpointState {
    assessor: Assessor,
    station_name: String,
    station: GeoPoint,
    source: Mutex<Box<dyn ReadingSource>>,
    cache: Mutex<DisplayCache<CacheKey, RiskReport>>,
}

impl EndpointState {
    pub fn new(
        assessor: Assessor,
        station_name: impl Into<String>,
        station: GeoPoint,
        source: Box<dyn ReadingSource>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            assessor,
            station_name: station_name.into(),
            station,
            source: Mutex::new(source),
            cache: Mutex::new(DisplayCache::new(cache_ttl)),
        }
    }

    /// Cached assessment at `point`, recomputed once the entry is stale.
    pub fn assessment(
        &self,
        point: GeoPoint,
        policy: RiskPolicy,
    ) -> Result<RiskReport, GeometryError> {
        point.validate()?;
        let key = (point.longitude.to_bits(), point.latitude.to_bits(), policy.as_str());
        if let Some(report) = self.cached(&key) {
            return Ok(report);
        }

        // The cache lock is never held across the fetch, so hits keep being
        // served while the source is slow.
        let mut source = lock(&self.source);
        if let Some(report) = self.cached(&key) {
            // Another handler refreshed it while we waited for the source.
            return Ok(report);
        }
        let report = self.assessor.assess_with_policy(point, &mut **source, policy)?;
        drop(source);

        lock(&self.cache).insert(key, report.clone(), Utc::now());
        Ok(report)
    }

    fn cached(&self, key: &CacheKey) -> Option<RiskReport> {
        let now = Utc::now();
        let mut cache = lock(&self.cache);
        cache.evict_expired(now);
        cache.get_fresh(key, now).cloned()
    }
}

/// A poisoned lock only means another handler panicked; the data is still
/// usable.
fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Health,
    /// `None` means the configured station.
    Assessment {
        point: Option<GeoPoint>,
        policy: Option<RiskPolicy>,
    },
    Zone(GeoPoint),
    NotFound,
}

/// Parses a request URL into a route. `Err` carries a 400 message.
pub fn parse_route(url: &str) -> Result<Route, String> {
    let (path, query) = match url.split_once('?') {
        Some((path, query)) => (path, query),
        None => (url, ""),
    };
    let params = parse_query(query);

    match path.trim_end_matches('/') {
        "/health" => Ok(Route::Health),
        "/assessment" => {
            let point = optional_point(&params)?;
            let policy = params
                .get("policy")
                .map(|p| RiskPolicy::from_str(p))
                .transpose()?;
            Ok(Route::Assessment { point, policy })
        }
        "/zone" => match optional_point(&params)? {
            Some(point) => Ok(Route::Zone(point)),
            None => Err("lon and lat query parameters are required".to_string()),
        },
        _ => Ok(Route::NotFound),
    }
}

/// Decodes `a=1&b=2` into a map. Later duplicates win.
pub fn parse_query(query: &str) -> HashMap<String, String> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = urlencoding::decode(key).ok()?.into_owned();
            let value = urlencoding::decode(value).ok()?.into_owned();
            Some((key, value))
        })
        .collect()
}

/// Both coordinates or neither.
fn optional_point(params: &HashMap<String, String>) -> Result<Option<GeoPoint>, String> {
    match (params.get("lon"), params.get("lat")) {
        (None, None) => Ok(None),
        (Some(lon), Some(lat)) => Ok(Some(GeoPoint::new(
            parse_coordinate("lon", lon)?,
            parse_coordinate("lat", lat)?,
        ))),
        _ => Err("lon and lat must be given together".to_string()),
    }
}

fn parse_coordinate(name: &str, raw: &str) -> Result<f64, String> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| format!("{} is not a number: '{}'", name, raw))
}

// ---------------------------------------------------------------------------
// HTTP Server
// ---------------------------------------------------------------------------

/// Start HTTP endpoint server on the specified port
pub fn start_endpoint_server(port: u16, state: EndpointState) -> Result<(), String> {
    let server = tiny_http::Server::http(format!("0.0.0.0:{}", port))
        .map_err(|e| format!("Failed to start HTTP server: {}", e))?;

    println!("📡 HTTP endpoint listening on http://0.0.0.0:{}", port);
    println!("   GET /health - Service health check");
    println!("   GET /assessment[?lon=&lat=&policy=] - Flood risk assessment");
    println!("   GET /zone?lon=&lat= - Hazard zone lookup\n");

    let state = Arc::new(state);
    let pool = ThreadPool::new(DEFAULT_WORKERS);

    for request in server.incoming_requests() {
        let state = Arc::clone(&state);
        pool.execute(move || {
            log::debug!("{} {}", request.method(), request.url());
            let response = handle_request(&state, request.url());
            if let Err(e) = request.respond(response) {
                log::error!("Failed to send response: {}", e);
            }
        });
    }

    pool.join();
    Ok(())
}

/// Routes one request URL to a response.
pub fn handle_request(state: &EndpointState, url: &str) -> JsonResponse {
    let (status, body) = route_to_json(state, url);
    create_response(status, body)
}

/// Status code and JSON body for a URL.
pub fn route_to_json(state: &EndpointState, url: &str) -> (u16, serde_json::Value) {
    match parse_route(url) {
        Ok(Route::Health) => handle_health(state),
        Ok(Route::Assessment { point, policy }) => handle_assessment(
            state,
            point.unwrap_or(state.station),
            policy.unwrap_or_else(|| state.assessor.policy()),
        ),
        Ok(Route::Zone(point)) => handle_zone(state, point),
        Ok(Route::NotFound) => (
            404,
            serde_json::json!({
                "error": "Not found",
                "available_endpoints": ["/health", "/assessment", "/zone?lon=&lat="]
            }),
        ),
        Err(message) => (400, serde_json::json!({ "error": message })),
    }
}

/// Handle /health endpoint
fn handle_health(state: &EndpointState) -> (u16, serde_json::Value) {
    (
        200,
        serde_json::json!({
            "status": "ok",
            "service": "florisk_service",
            "version": env!("CARGO_PKG_VERSION"),
            "station": state.station_name,
            "hazard_zones": state.assessor.dataset().len(),
            "policy": state.assessor.policy().as_str(),
        }),
    )
}

fn handle_assessment(
    state: &EndpointState,
    point: GeoPoint,
    policy: RiskPolicy,
) -> (u16, serde_json::Value) {
    match state.assessment(point, policy) {
        Ok(report) => match serde_json::to_value(&report) {
            Ok(json) => (200, json),
            Err(e) => (500, serde_json::json!({ "error": e.to_string() })),
        },
        Err(e) => geometry_error(e),
    }
}

fn handle_zone(state: &EndpointState, point: GeoPoint) -> (u16, serde_json::Value) {
    match state.assessor.resolve(point) {
        Ok(var) => {
            let band = ZoneBand::from_var(var);
            (
                200,
                serde_json::json!({
                    "longitude": point.longitude,
                    "latitude": point.latitude,
                    "hazard_zone_id": var,
                    "zone_label": zone_label(var),
                    "zone_band": band.label(),
                    "zone_color": band.color(),
                }),
            )
        }
        Err(e) => geometry_error(e),
    }
}

fn geometry_error(e: GeometryError) -> (u16, serde_json::Value) {
    (400, serde_json::json!({ "error": e.to_string() }))
}

/// Create HTTP response with JSON body
fn create_response(status_code: u16, json: serde_json::Value) -> JsonResponse {
    let body = serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string());
    let mut response = tiny_http::Response::from_data(body.into_bytes())
        .with_status_code(tiny_http::StatusCode::from(status_code));

    if let Ok(header) = tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]) {
        response = response.with_header(header);
    }
    response
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
