//! Impact-analysis backend client.
//!
//! Provides blocking HTTP access to the backend's two routes.
//! Uses reqwest with rustls for TLS.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::{debug, instrument, warn};

use crate::errors::GeoimpactError;
use crate::fallback::{self, FallbackPolicy, DEMO_NOTICE};
use crate::models::{AnalyzeRequest, Event, ImpactReport};

/// Default request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// User agent string for API requests.
const USER_AGENT: &str = concat!("geoimpact/", env!("CARGO_PKG_VERSION"));

/// Default backend base URL; override per invocation with `--api-base`.
pub const DEFAULT_API_BASE: &str = "https://gia-protocol-production-4b69.up.railway.app";

/// Client for the impact-analysis backend API.
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    /// Create a new client for the given base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(base_url: impl Into<String>) -> Result<Self, GeoimpactError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Fetch the event collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the response status is not
    /// in the success range, or the body cannot be parsed.
    #[instrument(skip(self))]
    pub fn fetch_events(&self) -> Result<Vec<Event>, GeoimpactError> {
        let url = format!("{}/api/events", self.base_url);

        debug!("fetching events from {}", url);

        let response = self.client.get(&url).send()?;

        // Check status before parsing
        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GeoimpactError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text()?;
        let events: Vec<Event> = serde_json::from_str(&body)?;

        debug!("fetched {} events", events.len());
        Ok(events)
    }

    /// Request an impact analysis for one event and location.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the response status is not
    /// in the success range, or the body cannot be parsed or validated.
    #[instrument(skip(self, request), fields(location = %request.location))]
    pub fn analyze(&self, request: &AnalyzeRequest) -> Result<ImpactReport, GeoimpactError> {
        let url = format!("{}/api/analyze", self.base_url);

        debug!("requesting analysis from {}", url);

        let response = self.client.post(&url).json(request).send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(GeoimpactError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text()?;
        let report: ImpactReport = serde_json::from_str(&body)?;

        // Reject malformed entries rather than rendering them
        report.validate()?;

        debug!("analysis complete, overall severity {:.1}", report.overall_severity);
        Ok(report)
    }
}

/// Outcome of loading the event list.
#[derive(Debug, Clone)]
pub struct EventLoad {
    /// Events to display: the fetched list, or the demo list on failure
    pub events: Vec<Event>,
    /// Notice to surface when a visible-policy fallback occurred
    pub notice: Option<&'static str>,
}

/// Load the event list, applying the fallback policy on failure.
///
/// Exactly one outbound request; no retry. A `Silent` fallback is only
/// visible as the demo content appearing, a `Visible` one also carries
/// the fixed notice.
pub fn load_events(client: &BackendClient, policy: FallbackPolicy) -> EventLoad {
    match client.fetch_events() {
        Ok(events) => EventLoad {
            events,
            notice: None,
        },
        Err(e) => {
            warn!("event fetch failed, substituting demo list: {e}");
            EventLoad {
                events: fallback::demo_events(),
                notice: policy.is_visible().then_some(DEMO_NOTICE),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Location;

    #[test]
    fn test_fetch_events_preserves_order() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/api/events")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(include_str!("../tools/sample_events.json"))
            .create();

        let client = BackendClient::new(server.url()).expect("client");
        let events = client.fetch_events().expect("fetch");

        assert_eq!(events.len(), 3);
        assert_eq!(events[0].id, 1);
        assert_eq!(events[1].id, 2);
        assert_eq!(events[2].title, "US-China Tech Tariffs");
    }

    #[test]
    fn test_fetch_events_http_error() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/api/events")
            .with_status(500)
            .with_body("boom")
            .create();

        let client = BackendClient::new(server.url()).expect("client");
        match client.fetch_events() {
            Err(GeoimpactError::Api { status, .. }) => assert_eq!(status, 500),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_fetch_events_malformed_body() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("GET", "/api/events")
            .with_status(200)
            .with_body("<html>definitely not json</html>")
            .create();

        let client = BackendClient::new(server.url()).expect("client");
        assert!(matches!(
            client.fetch_events(),
            Err(GeoimpactError::Parse(_))
        ));
    }

    #[test]
    fn test_analyze_posts_selected_location() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/api/analyze")
            .match_header("content-type", "application/json")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"location":"USA"}"#.to_string(),
            ))
            .with_status(200)
            .with_body(include_str!("../tools/sample_analysis.json"))
            .create();

        let client = BackendClient::new(server.url()).expect("client");
        let events = fallback::demo_events();
        let request = AnalyzeRequest::for_event(&events[0], Location::Usa);
        let report = client.analyze(&request).expect("analyze");

        mock.assert();
        assert_eq!(report.impacts.len(), 5);
        assert!((report.overall_severity - 7.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_analyze_http_error() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", "/api/analyze")
            .with_status(503)
            .with_body("overloaded")
            .create();

        let client = BackendClient::new(server.url()).expect("client");
        let events = fallback::demo_events();
        let request = AnalyzeRequest::for_event(&events[0], Location::India);
        match client.analyze(&request) {
            Err(GeoimpactError::Api { status, message }) => {
                assert_eq!(status, 503);
                assert_eq!(message, "overloaded");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_load_events_fallback_policies() {
        // Nothing listens here, so the fetch fails fast
        let client = BackendClient::new("http://127.0.0.1:1").expect("client");

        let silent = load_events(&client, FallbackPolicy::Silent);
        assert_eq!(silent.events.len(), 2);
        assert!(silent.notice.is_none());

        let visible = load_events(&client, FallbackPolicy::Visible);
        assert_eq!(visible.events.len(), 2);
        assert_eq!(visible.notice, Some(DEMO_NOTICE));
    }
}
