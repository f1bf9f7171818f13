// ambient_exporter - Prometheus metrics exporter for Ambient Weather stations
//
// Copyright 2022 Nick Pillitteri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <http://www.gnu.org/licenses/>.
//

use crate::atmosphere::Elevation;
use crate::derived::DerivedMeasures;
use crate::metrics::{publish, MetricsSink};
use crate::report::{RawReading, WeatherReport};
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use percent_encoding::percent_decode_str;
use prometheus_client::encoding::text::encode;
use prometheus_client::registry::Registry;
use serde::Serialize;
use std::error;
use std::fmt;
use std::sync::Arc;

const TEXT_FORMAT: &str = "application/openmetrics-text; version=1.0.0; charset=utf-8";

#[derive(Debug, PartialEq, Eq)]
pub enum QueryError {
    InvalidEscape(String),
    InvalidUtf8(String),
    Semicolon,
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEscape(s) => write!(f, "invalid URL escape in {:?}", s),
            Self::InvalidUtf8(s) => write!(f, "invalid UTF-8 after decoding {:?}", s),
            Self::Semicolon => write!(f, "invalid semicolon separator in query"),
        }
    }
}

impl error::Error for QueryError {}

/// State shared by all HTTP handlers.
pub struct RequestContext {
    registry: Registry,
    sink: Arc<dyn MetricsSink>,
    elevation: Elevation,
}

impl RequestContext {
    pub fn new(registry: Registry, sink: Arc<dyn MetricsSink>, elevation: Elevation) -> Self {
        Self {
            registry,
            sink,
            elevation,
        }
    }
}

#[derive(Debug, Serialize)]
struct ReportStatus {
    status: &'static str,
}

/// Routes for scraping metrics and for stations to submit reports to.
///
/// Stations are configured with a "path" that the report parameters are
/// appended to, so anything under `/data/report/` is accepted.
pub fn router(context: Arc<RequestContext>) -> Router {
    Router::new()
        .route("/metrics", get(text_metrics_handler))
        .route("/data/report/", get(report_handler))
        .route("/data/report/*rest", get(report_handler))
        .with_state(context)
}

async fn text_metrics_handler(State(context): State<Arc<RequestContext>>) -> Response {
    let mut buf = String::new();

    match encode(&mut buf, &context.registry) {
        Ok(_) => {
            tracing::debug!(message = "encoded prometheus metrics to text format", num_bytes = buf.len());
            ([(CONTENT_TYPE, TEXT_FORMAT)], buf).into_response()
        }
        Err(e) => {
            tracing::error!(message = "error encoding metrics", error = %e);
            StatusCode::SERVICE_UNAVAILABLE.into_response()
        }
    }
}

async fn report_handler(State(context): State<Arc<RequestContext>>, method: Method, uri: Uri) -> Response {
    // Routing with `get` also accepts HEAD
    if method != Method::GET {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    }

    let raw = match parse_query(raw_query(&uri)) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::error!(message = "failed to parse query", error = %e);
            return bad_request();
        }
    };

    let report = match WeatherReport::from_raw(&raw) {
        Ok(report) => report,
        Err(e) => {
            tracing::error!(message = "failed to parse weather report", error = %e);
            return bad_request();
        }
    };

    let derived = DerivedMeasures::compute(&report, context.elevation);
    publish(context.sink.as_ref(), &report, &derived);

    tracing::debug!(
        message = "received weather report",
        station_type = %report.station_type,
        num_params = raw.len(),
        derived = ?derived,
    );

    (StatusCode::OK, Json(ReportStatus { status: "received" })).into_response()
}

fn bad_request() -> Response {
    (StatusCode::BAD_REQUEST, "Bad request").into_response()
}

/// Query string of a report request.
///
/// Some firmware starts the parameters with '&' instead of '?' so they end up
/// in the path. In that case everything after the first '&' is the query.
fn raw_query(uri: &Uri) -> &str {
    match uri.query() {
        Some(q) if !q.is_empty() => q,
        _ => uri.path().split_once('&').map(|(_, q)| q).unwrap_or(""),
    }
}

/// Parse a URL encoded query string into raw station parameters.
pub fn parse_query(query: &str) -> Result<RawReading, QueryError> {
    let mut pairs = Vec::new();

    for part in query.split('&').filter(|p| !p.is_empty()) {
        if part.contains(';') {
            return Err(QueryError::Semicolon);
        }

        let (key, value) = part.split_once('=').unwrap_or((part, ""));
        pairs.push((unescape(key)?, unescape(value)?));
    }

    Ok(pairs.into_iter().collect())
}

fn unescape(s: &str) -> Result<String, QueryError> {
    let bytes = s.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'%' {
            let valid = bytes.len() > i + 2 && bytes[i + 1].is_ascii_hexdigit() && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                return Err(QueryError::InvalidEscape(s.to_owned()));
            }
        }
    }

    let plus_as_space = s.replace('+', " ");
    percent_decode_str(&plus_as_space)
        .decode_utf8()
        .map(|v| v.into_owned())
        .map_err(|_| QueryError::InvalidUtf8(s.to_owned()))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::metrics::test_tools::RecordingSink;
    use crate::metrics::{PrometheusSink, OUTDOOR_TEMPERATURE, WIND_RUN};
    use crate::units::test_tools::approx_equal;
    use axum::body::{Body, HttpBody};
    use axum::http::Request;
    use tower::ServiceExt;

    fn recording_context() -> (Arc<RecordingSink>, Arc<RequestContext>) {
        let sink = Arc::new(RecordingSink::default());
        let context = Arc::new(RequestContext::new(
            Registry::default(),
            sink.clone(),
            Elevation::from_feet(0.0),
        ));
        (sink, context)
    }

    async fn send(context: Arc<RequestContext>, method: Method, uri: &str) -> Response {
        let req = Request::builder().method(method).uri(uri).body(Body::empty()).unwrap();
        router(context).oneshot(req).await.unwrap()
    }

    async fn body_string(res: Response) -> String {
        let mut body = res.into_body();
        let mut buf = Vec::new();
        while let Some(chunk) = body.data().await {
            buf.extend_from_slice(&chunk.unwrap());
        }

        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_parse_query() {
        let raw = parse_query("PASSKEY=AB%3ACD&dateutc=2024-01-02+03:04:05&tempf=68&tempf=70&flag&&empty=").unwrap();
        assert_eq!(Some("AB:CD"), raw.get("PASSKEY"));
        assert_eq!(Some("2024-01-02 03:04:05"), raw.get("dateutc"));
        assert_eq!(Some("68"), raw.get("tempf"));
        assert_eq!(Some(""), raw.get("flag"));
        assert_eq!(Some(""), raw.get("empty"));
        assert_eq!(5, raw.len());
    }

    #[test]
    fn test_parse_query_empty() {
        assert!(parse_query("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_query_errors() {
        assert_eq!(
            Err(QueryError::InvalidEscape("50%".to_owned())),
            parse_query("humidity=50%").map(|_| ())
        );
        assert_eq!(
            Err(QueryError::InvalidEscape("%zz".to_owned())),
            parse_query("tempf=%zz").map(|_| ())
        );
        assert_eq!(
            Err(QueryError::InvalidUtf8("%ff".to_owned())),
            parse_query("tempf=%ff").map(|_| ())
        );
        assert_eq!(Err(QueryError::Semicolon), parse_query("tempf=68;uv=1").map(|_| ()));
    }

    #[test]
    fn test_raw_query() {
        let uri: Uri = "/data/report/?tempf=68&uv=1".parse().unwrap();
        assert_eq!("tempf=68&uv=1", raw_query(&uri));

        let uri: Uri = "/data/report/&tempf=68&uv=1".parse().unwrap();
        assert_eq!("tempf=68&uv=1", raw_query(&uri));

        let uri: Uri = "/data/report/".parse().unwrap();
        assert_eq!("", raw_query(&uri));
    }

    #[tokio::test]
    async fn test_report_accepted() {
        let (sink, context) = recording_context();
        let res = send(
            context,
            Method::GET,
            "/data/report/?stationtype=AMBWeatherV4.2.9&tempf=68&humidity=50&windspeedmph=5",
        )
        .await;

        assert_eq!(StatusCode::OK, res.status());
        assert_eq!("{\"status\":\"received\"}", body_string(res).await);
        assert_eq!(Some(120.0), sink.value(WIND_RUN));
        assert!(approx_equal(20.0, sink.value(OUTDOOR_TEMPERATURE).unwrap(), 1.0e-10));
    }

    #[tokio::test]
    async fn test_report_query_in_path() {
        let (sink, context) = recording_context();
        let res = send(
            context,
            Method::GET,
            "/data/report/&PASSKEY=ABC&tempf=68&windspeedmph=10&dateutc=2024-06-01+14:30:05",
        )
        .await;

        assert_eq!(StatusCode::OK, res.status());
        assert_eq!(Some(240.0), sink.value(WIND_RUN));
    }

    #[tokio::test]
    async fn test_report_malformed_timestamp() {
        let (sink, context) = recording_context();
        let res = send(context, Method::GET, "/data/report/?tempf=68&dateutc=not-a-date").await;

        assert_eq!(StatusCode::BAD_REQUEST, res.status());
        assert!(sink.is_untouched());
    }

    #[tokio::test]
    async fn test_report_malformed_query() {
        let (sink, context) = recording_context();
        let res = send(context, Method::GET, "/data/report/?tempf=%zz").await;

        assert_eq!(StatusCode::BAD_REQUEST, res.status());
        assert!(sink.is_untouched());
    }

    #[tokio::test]
    async fn test_report_wrong_method() {
        let (sink, context) = recording_context();
        let res = send(context, Method::POST, "/data/report/?tempf=68").await;

        assert_eq!(StatusCode::METHOD_NOT_ALLOWED, res.status());
        assert!(sink.is_untouched());
    }

    #[tokio::test]
    async fn test_report_head_method() {
        let (sink, context) = recording_context();
        let res = send(context, Method::HEAD, "/data/report/?tempf=68&windspeedmph=5").await;

        assert_eq!(StatusCode::METHOD_NOT_ALLOWED, res.status());
        assert!(sink.is_untouched());
    }

    #[tokio::test]
    async fn test_unknown_path() {
        let (_, context) = recording_context();
        let res = send(context, Method::GET, "/data/other").await;
        assert_eq!(StatusCode::NOT_FOUND, res.status());
    }

    #[tokio::test]
    async fn test_metrics_after_report() {
        let mut registry = Registry::with_prefix("ambient_weather");
        let sink = Arc::new(PrometheusSink::new(&mut registry));
        let context = Arc::new(RequestContext::new(registry, sink, Elevation::from_feet(1200.0)));

        let res = send(
            context.clone(),
            Method::GET,
            "/data/report/?stationtype=WS-2902&tempf=50&humidity=70",
        )
        .await;
        assert_eq!(StatusCode::OK, res.status());

        let res = send(context, Method::GET, "/metrics").await;
        assert_eq!(StatusCode::OK, res.status());
        assert_eq!(TEXT_FORMAT, res.headers()[CONTENT_TYPE]);

        let body = body_string(res).await;
        assert!(body.contains("ambient_weather_station_info{station_type=\"WS-2902\"}"));
        assert!(body.contains("ambient_weather_atmospheric_pressure_hpa"));
        assert!(body.contains("ambient_weather_dew_point_celsius"));
    }
}
