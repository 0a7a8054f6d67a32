//! View state for the interactive UI.
//!
//! One container per session: the loaded event list, the current
//! location, and the analysis panel contents. Analyze invocations are
//! sequenced with monotonically increasing tickets so that concurrent
//! requests resolve last-write-wins by start order, never mixing two
//! requests' data.

use crate::models::{Event, ImpactReport, Location};

/// Ticket identifying one analyze invocation.
///
/// Issued by `begin_analysis`. A completion carrying a superseded ticket
/// is discarded, which also covers the stale demo-delay timer firing
/// after a newer request has started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisTicket(u64);

/// The interactive session's view state.
#[derive(Debug, Default)]
pub struct ViewState {
    /// Loaded event list, in feed order
    events: Vec<Event>,
    /// Result of the most recent completed analysis
    impacts: Option<ImpactReport>,
    /// Whether an analysis is in flight (or awaiting its demo fallback)
    loading: bool,
    /// Currently selected location
    location: Location,
    /// User-visible error banner text; empty when clear
    error: String,
    /// Most recently issued ticket number
    latest: u64,
}

impl ViewState {
    /// Create a fresh session state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the event list entirely, preserving the given order.
    pub fn set_events(&mut self, events: Vec<Event>) {
        self.events = events;
    }

    /// The current event list.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Look up an event by its ID.
    #[must_use]
    pub fn event_by_id(&self, id: i64) -> Option<&Event> {
        self.events.iter().find(|e| e.id == id)
    }

    /// Record a direct user selection of the location.
    pub fn set_location(&mut self, location: Location) {
        self.location = location;
    }

    /// The currently selected location.
    #[must_use]
    pub fn location(&self) -> Location {
        self.location
    }

    /// Start a new analysis: clear any previous report and error, set
    /// loading, and issue the ticket that guards this invocation's
    /// completions.
    pub fn begin_analysis(&mut self) -> AnalysisTicket {
        self.impacts = None;
        self.loading = true;
        self.error.clear();
        self.latest += 1;
        AnalysisTicket(self.latest)
    }

    /// Check whether a ticket is still the most recently issued.
    #[must_use]
    pub fn is_current(&self, ticket: AnalysisTicket) -> bool {
        ticket.0 == self.latest
    }

    /// Apply a completed report (real or demo) and clear loading.
    ///
    /// Returns `false` and leaves the state untouched if the ticket has
    /// been superseded.
    pub fn apply_report(&mut self, ticket: AnalysisTicket, report: ImpactReport) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.impacts = Some(report);
        self.loading = false;
        true
    }

    /// Record an analysis failure: set the error banner.
    ///
    /// Loading stays set; the visible-fallback path clears it when the
    /// delayed demo report is applied via `apply_report`.
    ///
    /// Returns `false` if the ticket has been superseded.
    pub fn apply_failure(&mut self, ticket: AnalysisTicket, message: &str) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.error = message.to_string();
        true
    }

    /// The current analysis result, if any.
    #[must_use]
    pub fn impacts(&self) -> Option<&ImpactReport> {
        self.impacts.as_ref()
    }

    /// Whether an analysis is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The error banner text; empty when clear.
    #[must_use]
    pub fn error(&self) -> &str {
        &self.error
    }

    /// Whether the main panel should show the placeholder instruction
    /// (no loading, no error, no result).
    #[must_use]
    pub fn show_placeholder(&self) -> bool {
        !self.loading && self.error.is_empty() && self.impacts.is_none()
    }
}
