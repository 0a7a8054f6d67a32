//! Data models for the impact-analysis backend API.
//!
//! These structures match the JSON bodies exchanged with the backend's
//! `/api/events` and `/api/analyze` routes.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::GeoimpactError;

/// A geopolitical event available for analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique event ID
    pub id: i64,

    /// Short headline
    pub title: String,

    /// One-line description of what happened
    pub description: String,

    /// Severity keyword ("high", "medium", "low"); not validated
    pub severity: String,

    /// Display date string, rendered as-is
    pub date: String,

    /// Affected regions, in feed order
    pub regions: Vec<String>,
}

impl Event {
    /// The free-text form sent to the analyzer: title and description
    /// joined as `"{title}: {description}"`.
    #[must_use]
    pub fn analysis_text(&self) -> String {
        format!("{}: {}", self.title, self.description)
    }
}

/// Target location for an analysis.
///
/// A fixed enumerated set; the backend receives the display string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Location {
    #[default]
    India,
    Usa,
    Europe,
    Global,
}

impl Location {
    /// All selectable locations, in display order.
    pub const ALL: [Self; 4] = [Self::India, Self::Usa, Self::Europe, Self::Global];

    /// Get the display string for this location.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::India => "India",
            Self::Usa => "USA",
            Self::Europe => "Europe",
            Self::Global => "Global",
        }
    }
}

impl std::str::FromStr for Location {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "india" => Ok(Self::India),
            "usa" => Ok(Self::Usa),
            "europe" => Ok(Self::Europe),
            "global" => Ok(Self::Global),
            _ => Err(format!(
                "unknown location: {s} (expected: India, USA, Europe, Global)"
            )),
        }
    }
}

/// Request body for `POST /api/analyze`.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeRequest {
    /// Free-text event description (`"{title}: {description}"`)
    pub event: String,

    /// Location display string
    pub location: String,
}

impl AnalyzeRequest {
    /// Build the request for one event and the currently selected location.
    #[must_use]
    pub fn for_event(event: &Event, location: Location) -> Self {
        Self {
            event: event.analysis_text(),
            location: location.as_str().to_string(),
        }
    }
}

/// Structured analysis returned by `POST /api/analyze`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImpactReport {
    /// Event text the backend analyzed
    pub event: String,

    /// Location the analysis applies to
    pub location: String,

    /// Aggregate severity on the 0-10 scale
    pub overall_severity: f64,

    /// Per-category breakdown, keyed by category name
    pub impacts: BTreeMap<String, ImpactDetail>,
}

impl ImpactReport {
    /// Validate the report structure.
    ///
    /// Severities must be finite numbers. Range clamping is deliberately
    /// not performed here or anywhere in rendering.
    ///
    /// # Errors
    ///
    /// Returns `GeoimpactError::Validation` for non-finite severities.
    pub fn validate(&self) -> Result<(), GeoimpactError> {
        if !self.overall_severity.is_finite() {
            return Err(GeoimpactError::Validation(format!(
                "overall_severity is not a finite number: {}",
                self.overall_severity
            )));
        }
        for (category, detail) in &self.impacts {
            if !detail.severity.is_finite() {
                return Err(GeoimpactError::Validation(format!(
                    "severity for '{category}' is not a finite number: {}",
                    detail.severity
                )));
            }
        }
        Ok(())
    }
}

/// One impact category's detail within a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImpactDetail {
    /// Severity on the 0-10 scale
    pub severity: f64,

    /// When the impact is expected ("immediate", "2 weeks", ...)
    pub timeframe: String,

    /// Concrete everyday example ("Petrol +₹5")
    pub example: String,

    /// Short explanation of the impact
    pub impact_description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sample_events() {
        let json = include_str!("../tools/sample_events.json");
        let events: Vec<Event> =
            serde_json::from_str(json).expect("failed to parse sample events");

        assert_eq!(events.len(), 3);
        assert_eq!(events[0].id, 1);
        assert_eq!(events[0].title, "Middle East Oil Crisis");
        assert_eq!(events[2].severity, "medium");
        assert_eq!(events[1].regions, vec!["Europe", "Global"]);
    }

    #[test]
    fn test_parse_sample_analysis() {
        let json = include_str!("../tools/sample_analysis.json");
        let report: ImpactReport =
            serde_json::from_str(json).expect("failed to parse sample analysis");

        report.validate().expect("invalid report");
        assert!((report.overall_severity - 7.2).abs() < f64::EPSILON);
        assert_eq!(report.impacts.len(), 5);

        let energy = report.impacts.get("energy").expect("missing energy");
        assert!((energy.severity - 8.0).abs() < f64::EPSILON);
        assert_eq!(energy.timeframe, "immediate");
    }

    #[test]
    fn test_location_round_trip() {
        for location in Location::ALL {
            let s = location.as_str();
            let parsed: Location = s.parse().expect("failed to parse");
            assert_eq!(parsed, location);
        }
        assert!("Mars".parse::<Location>().is_err());
    }

    #[test]
    fn test_analyze_request_body() {
        let event = Event {
            id: 7,
            title: "Middle East Oil Crisis".to_string(),
            description: "15% global supply disruption".to_string(),
            severity: "high".to_string(),
            date: "2026-01-05".to_string(),
            regions: vec!["Middle East".to_string()],
        };
        let request = AnalyzeRequest::for_event(&event, Location::Usa);

        assert_eq!(
            request.event,
            "Middle East Oil Crisis: 15% global supply disruption"
        );
        let body = serde_json::to_string(&request).expect("serialize");
        assert!(body.contains(r#""location":"USA""#));
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        let mut impacts = BTreeMap::new();
        impacts.insert(
            "energy".to_string(),
            ImpactDetail {
                severity: f64::NAN,
                timeframe: "immediate".to_string(),
                example: "n/a".to_string(),
                impact_description: "n/a".to_string(),
            },
        );
        let report = ImpactReport {
            event: "x".to_string(),
            location: "India".to_string(),
            overall_severity: 5.0,
            impacts,
        };
        assert!(report.validate().is_err());
    }
}
