//! Built-in demo data used when the backend is unreachable.
//!
//! Two fixed sources: a two-event list substituted for a failed event
//! fetch, and a canned impact report substituted for a failed analysis.

use std::collections::BTreeMap;

use crate::models::{Event, ImpactDetail, ImpactReport, Location};

/// Delay before the demo report is applied on the visible-fallback path,
/// in milliseconds.
pub const DEMO_DELAY_MS: u64 = 1500;

/// Fixed error banner shown when an analysis falls back to demo data.
pub const DEMO_NOTICE: &str = "Using demo data (backend temporarily unavailable)";

/// What the user sees when a data source falls back to demo content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Substitute demo data without surfacing any message
    Silent,
    /// Surface the fixed notice alongside the demo data
    Visible,
}

impl FallbackPolicy {
    /// Get the policy name used on the command line.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Silent => "silent",
            Self::Visible => "visible",
        }
    }

    /// Check whether this policy surfaces a user-visible notice.
    #[must_use]
    pub const fn is_visible(self) -> bool {
        matches!(self, Self::Visible)
    }
}

impl std::str::FromStr for FallbackPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" => Ok(Self::Silent),
            "visible" => Ok(Self::Visible),
            _ => Err(format!(
                "unknown fallback policy: {s} (expected: silent, visible)"
            )),
        }
    }
}

/// The fixed two-event list substituted when the event fetch fails.
#[must_use]
pub fn demo_events() -> Vec<Event> {
    vec![
        Event {
            id: 1,
            title: "Middle East Oil Crisis".to_string(),
            description: "15% global supply disruption".to_string(),
            severity: "high".to_string(),
            date: "2026-01-05".to_string(),
            regions: vec!["Middle East".to_string()],
        },
        Event {
            id: 2,
            title: "Ukraine Grain Blockade".to_string(),
            description: "Black Sea exports halted".to_string(),
            severity: "high".to_string(),
            date: "2026-01-04".to_string(),
            regions: vec!["Europe".to_string()],
        },
    ]
}

/// The canned impact report substituted when an analysis fails.
///
/// Keyed to the selected event's title (not the analysis text) and the
/// currently selected location.
#[must_use]
pub fn demo_report(event_title: &str, location: Location) -> ImpactReport {
    let mut impacts = BTreeMap::new();
    impacts.insert(
        "energy".to_string(),
        ImpactDetail {
            severity: 8.0,
            timeframe: "immediate".to_string(),
            example: "Petrol +₹5".to_string(),
            impact_description: "Oil crisis".to_string(),
        },
    );
    impacts.insert(
        "food".to_string(),
        ImpactDetail {
            severity: 6.0,
            timeframe: "2 weeks".to_string(),
            example: "Rice +15%".to_string(),
            impact_description: "Supply chain".to_string(),
        },
    );
    impacts.insert(
        "travel".to_string(),
        ImpactDetail {
            severity: 7.0,
            timeframe: "immediate".to_string(),
            example: "Flights +20%".to_string(),
            impact_description: "Fuel costs".to_string(),
        },
    );
    impacts.insert(
        "jobs".to_string(),
        ImpactDetail {
            severity: 4.0,
            timeframe: "1 month".to_string(),
            example: "Exports delayed".to_string(),
            impact_description: "Trade risk".to_string(),
        },
    );
    impacts.insert(
        "currency".to_string(),
        ImpactDetail {
            severity: 5.0,
            timeframe: "2 weeks".to_string(),
            example: "₹84/$".to_string(),
            impact_description: "Import pressure".to_string(),
        },
    );

    ImpactReport {
        event: event_title.to_string(),
        location: location.as_str().to_string(),
        overall_severity: 7.2,
        impacts,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_events_fixed() {
        let events = demo_events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].title, "Middle East Oil Crisis");
        assert_eq!(events[1].title, "Ukraine Grain Blockade");
        assert!(events.iter().all(|e| e.severity == "high"));
    }

    #[test]
    fn test_demo_report_keyed_to_selection() {
        for event in demo_events() {
            let report = demo_report(&event.title, Location::Usa);
            assert_eq!(report.event, event.title);
            assert_eq!(report.location, "USA");
            assert!((report.overall_severity - 7.2).abs() < f64::EPSILON);
            assert_eq!(report.impacts.len(), 5);
        }
    }

    #[test]
    fn test_demo_report_categories() {
        let report = demo_report("anything", Location::India);
        report.validate().expect("demo report must be valid");

        let energy = report.impacts.get("energy").expect("missing energy");
        assert!((energy.severity - 8.0).abs() < f64::EPSILON);
        let jobs = report.impacts.get("jobs").expect("missing jobs");
        assert_eq!(jobs.timeframe, "1 month");
    }

    #[test]
    fn test_policy_parse() {
        assert_eq!("silent".parse::<FallbackPolicy>().unwrap(), FallbackPolicy::Silent);
        assert_eq!("Visible".parse::<FallbackPolicy>().unwrap(), FallbackPolicy::Visible);
        assert!("never".parse::<FallbackPolicy>().is_err());
        assert!(FallbackPolicy::Visible.is_visible());
        assert!(!FallbackPolicy::Silent.is_visible());
    }
}
