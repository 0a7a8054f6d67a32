//! Output formatters for events and impact reports.
//!
//! Supports human-readable (with colors), JSON, and NDJSON formats, and
//! holds the severity-to-color mapping shared with the web UI.

use std::io::{self, Write};

use crate::models::{Event, ImpactReport};

// ANSI color codes
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const RED: &str = "\x1b[91m";
const ORANGE: &str = "\x1b[38;5;208m";
const GREEN: &str = "\x1b[92m";

/// Meter width in cells for the terminal severity bar.
const METER_WIDTH: usize = 20;

/// Loading message shown while an analysis is in flight.
pub const LOADING_MESSAGE: &str = "🤖 Analyzing impacts...";

/// Placeholder instruction shown before any analysis has run.
pub const PLACEHOLDER: &str = "Click an event to analyze its impact on daily life";

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Human-readable terminal output (default)
    #[default]
    Human,
    /// JSON
    Json,
    /// Newline-delimited JSON (one object per line)
    Ndjson,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            "ndjson" => Ok(Self::Ndjson),
            _ => Err(format!("unknown format: {s} (expected: human, json, ndjson)")),
        }
    }
}

/// Color bucket for a numeric severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeverityColor {
    Red,
    Orange,
    Green,
}

impl SeverityColor {
    /// Terminal escape code for this color.
    #[must_use]
    pub const fn ansi(self) -> &'static str {
        match self {
            Self::Red => RED,
            Self::Orange => ORANGE,
            Self::Green => GREEN,
        }
    }

    /// Hex value used by the web UI.
    #[must_use]
    pub const fn hex(self) -> &'static str {
        match self {
            Self::Red => "#ff4444",
            Self::Orange => "#ff9900",
            Self::Green => "#44aa44",
        }
    }
}

/// Map a 0-10 severity to its color bucket.
///
/// Total and deterministic: >= 7 is red, >= 4 is orange, everything else
/// (including NaN and out-of-domain values) is green.
#[must_use]
pub fn severity_color(severity: f64) -> SeverityColor {
    if severity >= 7.0 {
        SeverityColor::Red
    } else if severity >= 4.0 {
        SeverityColor::Orange
    } else {
        SeverityColor::Green
    }
}

/// Map an event's severity keyword to a color bucket.
///
/// Keywords are unvalidated; anything unrecognized stays uncolored.
#[must_use]
pub fn keyword_color(keyword: &str) -> Option<SeverityColor> {
    match keyword {
        "high" => Some(SeverityColor::Red),
        "medium" => Some(SeverityColor::Orange),
        "low" => Some(SeverityColor::Green),
        _ => None,
    }
}

/// Meter fill as a percentage of the 0-10 scale.
///
/// Deliberately unclamped: out-of-domain severities produce out-of-range
/// widths.
#[must_use]
pub fn meter_percent(overall_severity: f64) -> f64 {
    overall_severity * 10.0
}

/// Render the severity meter as a block bar.
fn meter_bar(overall_severity: f64) -> String {
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    let filled = (meter_percent(overall_severity) / 100.0 * METER_WIDTH as f64).round() as usize;
    let empty = METER_WIDTH.saturating_sub(filled);
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Write events in human-readable format with severity coloring.
///
/// One line per event, in feed order, with the ID callers pass to
/// `analyze --event`.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_events_human<W: Write>(writer: &mut W, events: &[Event]) -> io::Result<()> {
    for event in events {
        let (color, color_end) = match keyword_color(&event.severity) {
            Some(c) => (c.ansi(), RESET),
            None => ("", ""),
        };
        let regions = event.regions.join(", ");

        writeln!(
            writer,
            "#{id:<3} {color}{severity:^6}{color_end} │ {DIM}{date}{RESET} │ \
             {BOLD}{title}{RESET}: {description} {DIM}[{regions}]{RESET}",
            id = event.id,
            severity = event.severity,
            date = event.date,
            title = event.title,
            description = event.description,
        )?;
    }
    Ok(())
}

/// Write events as a JSON array.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_events_json<W: Write>(writer: &mut W, events: &[Event]) -> io::Result<()> {
    let json = serde_json::to_string_pretty(events)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{json}")
}

/// Write events as newline-delimited JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_events_ndjson<W: Write>(writer: &mut W, events: &[Event]) -> io::Result<()> {
    for event in events {
        let json = serde_json::to_string(event)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        writeln!(writer, "{json}")?;
    }
    Ok(())
}

/// Write events in the specified format.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_events<W: Write>(writer: &mut W, events: &[Event], format: Format) -> io::Result<()> {
    match format {
        Format::Human => write_events_human(writer, events),
        Format::Json => write_events_json(writer, events),
        Format::Ndjson => write_events_ndjson(writer, events),
    }
}

/// Write an impact report in human-readable format.
///
/// Overall severity meter first, then one card per category with the
/// accent color from the severity bucket.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_report_human<W: Write>(writer: &mut W, report: &ImpactReport) -> io::Result<()> {
    let overall = report.overall_severity;
    let color = severity_color(overall).ansi();

    writeln!(writer, "{BOLD}Impact Analysis: {}{RESET}", report.location)?;
    writeln!(
        writer,
        "Overall Severity  {color}{bar}{RESET}  {BOLD}{overall:.1}/10{RESET}",
        bar = meter_bar(overall),
    )?;
    writeln!(writer)?;

    for (category, detail) in &report.impacts {
        let accent = severity_color(detail.severity).ansi();
        writeln!(
            writer,
            "{accent}┃{RESET} {BOLD}{name}{RESET}  severity {severity}/10  {DIM}{timeframe}{RESET}",
            name = category.to_uppercase(),
            severity = detail.severity,
            timeframe = detail.timeframe,
        )?;
        writeln!(writer, "{accent}┃{RESET}   {BOLD}{}{RESET}", detail.example)?;
        writeln!(writer, "{accent}┃{RESET}   {DIM}{}{RESET}", detail.impact_description)?;
    }
    Ok(())
}

/// Write an impact report in the specified format.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_report<W: Write>(
    writer: &mut W,
    report: &ImpactReport,
    format: Format,
) -> io::Result<()> {
    match format {
        Format::Human => write_report_human(writer, report),
        Format::Json => {
            let json = serde_json::to_string_pretty(report)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            writeln!(writer, "{json}")
        }
        Format::Ndjson => {
            let json = serde_json::to_string(report)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
            writeln!(writer, "{json}")
        }
    }
}

/// Write the visible-fallback notice banner.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_notice<W: Write>(writer: &mut W, text: &str) -> io::Result<()> {
    writeln!(writer, "{ORANGE}{BOLD}⚠ {text}{RESET}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::demo_report;
    use crate::models::Location;

    #[test]
    fn test_format_parse() {
        assert_eq!("human".parse::<Format>().unwrap(), Format::Human);
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("ndjson".parse::<Format>().unwrap(), Format::Ndjson);
        assert!("invalid".parse::<Format>().is_err());
    }

    #[test]
    fn test_severity_color_thresholds() {
        assert_eq!(severity_color(10.0), SeverityColor::Red);
        assert_eq!(severity_color(7.0), SeverityColor::Red);
        assert_eq!(severity_color(6.99), SeverityColor::Orange);
        assert_eq!(severity_color(4.0), SeverityColor::Orange);
        assert_eq!(severity_color(3.99), SeverityColor::Green);
        assert_eq!(severity_color(0.0), SeverityColor::Green);
        // Total over the whole input domain
        assert_eq!(severity_color(f64::NAN), SeverityColor::Green);
        assert_eq!(severity_color(-1.0), SeverityColor::Green);
        assert_eq!(severity_color(42.0), SeverityColor::Red);
    }

    #[test]
    fn test_keyword_color() {
        assert_eq!(keyword_color("high"), Some(SeverityColor::Red));
        assert_eq!(keyword_color("medium"), Some(SeverityColor::Orange));
        assert_eq!(keyword_color("low"), Some(SeverityColor::Green));
        assert_eq!(keyword_color("catastrophic"), None);
    }

    #[test]
    fn test_meter_percent_unclamped() {
        assert!((meter_percent(5.5) - 55.0).abs() < 1e-9);
        assert!((meter_percent(0.0)).abs() < 1e-9);
        assert!((meter_percent(10.0) - 100.0).abs() < 1e-9);
        // Out-of-domain input yields out-of-range width
        assert!((meter_percent(12.0) - 120.0).abs() < 1e-9);
    }

    #[test]
    fn test_meter_bar_fill() {
        let bar = meter_bar(5.5);
        assert_eq!(bar.chars().filter(|&c| c == '█').count(), 11);
        assert_eq!(bar.chars().count(), METER_WIDTH);
    }

    #[test]
    fn test_human_events_one_line_each_in_order() {
        let events = crate::fallback::demo_events();
        let mut buf = Vec::new();
        write_events_human(&mut buf, &events).expect("write");
        let text = String::from_utf8(buf).expect("utf8");

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("Middle East Oil Crisis"));
        assert!(lines[0].contains("#1"));
        assert!(lines[1].contains("Ukraine Grain Blockade"));
    }

    #[test]
    fn test_report_card_accent() {
        let mut report = demo_report("Middle East Oil Crisis", Location::India);
        if let Some(energy) = report.impacts.get_mut("energy") {
            energy.severity = 9.0;
        }

        let mut buf = Vec::new();
        write_report_human(&mut buf, &report).expect("write");
        let text = String::from_utf8(buf).expect("utf8");

        // The energy card carries the red accent; severity 9 is >= 7
        assert_eq!(severity_color(9.0), SeverityColor::Red);
        assert!(text.contains("ENERGY"));
        assert!(text.contains(SeverityColor::Red.ansi()));
        assert!(text.contains("9/10"));
    }

    #[test]
    fn test_ndjson_events() {
        let events = crate::fallback::demo_events();
        let mut buf = Vec::new();
        write_events_ndjson(&mut buf, &events).expect("write");
        let text = String::from_utf8(buf).expect("utf8");

        for line in text.lines() {
            let parsed: crate::models::Event =
                serde_json::from_str(line).expect("each line parses");
            assert!(!parsed.title.is_empty());
        }
    }
}
