//! Web server for the GeoImpact UI.
//!
//! Provides a single-page impact dashboard using:
//! - Axum for HTTP server
//! - HTMX for dynamic UI without heavy JavaScript
//! - Severity-colored impact cards driven by one shared view state

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::{
    extract::State,
    response::Html,
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;

use crate::client::{load_events, BackendClient, EventLoad, DEFAULT_API_BASE};
use crate::fallback::{self, FallbackPolicy, DEMO_DELAY_MS, DEMO_NOTICE};
use crate::models::{AnalyzeRequest, Event, ImpactDetail, ImpactReport, Location};
use crate::output::{meter_percent, severity_color, LOADING_MESSAGE, PLACEHOLDER};
use crate::state::{AnalysisTicket, ViewState};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub api_base: String,
    pub demo_delay: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            demo_delay: Duration::from_millis(DEMO_DELAY_MS),
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Single view shared by every HTMX response
    view: Arc<Mutex<ViewState>>,
    /// Server configuration
    config: ServerConfig,
}

impl AppState {
    fn new(config: ServerConfig) -> Self {
        Self {
            view: Arc::new(Mutex::new(ViewState::new())),
            config,
        }
    }

    /// Lock the shared view, recovering from a poisoned lock.
    fn lock_view(&self) -> MutexGuard<'_, ViewState> {
        self.view.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/events/list", get(events_list_handler))
        .route("/analyze", post(analyze_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Start the web server.
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let state = AppState::new(config.clone());
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("⚡ GeoImpact UI starting at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Route Handlers
// ============================================================================

/// Main page handler - serves the HTML UI.
async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Event list handler - one backend fetch per page load, demo list on failure.
async fn events_list_handler(State(state): State<AppState>) -> Html<String> {
    let api_base = state.config.api_base.clone();
    let load = tokio::task::spawn_blocking(move || match BackendClient::new(api_base) {
        Ok(client) => load_events(&client, FallbackPolicy::Silent),
        Err(e) => {
            tracing::warn!("backend client setup failed: {}", e);
            EventLoad {
                events: fallback::demo_events(),
                notice: None,
            }
        }
    })
    .await;

    let load = match load {
        Ok(load) => load,
        Err(e) => {
            tracing::error!("event load task failed: {}", e);
            EventLoad {
                events: fallback::demo_events(),
                notice: None,
            }
        }
    };

    let mut view = state.lock_view();
    view.set_events(load.events);
    Html(render_event_cards(view.events()))
}

/// Form payload posted by each event card.
#[derive(Debug, Deserialize)]
struct AnalyzeForm {
    event_id: i64,
    #[serde(default)]
    location: String,
}

/// Analyze handler - runs one backend analysis and re-renders the panel.
///
/// On failure the demo report is applied after the standard delay, with the
/// fallback notice left in place next to it. Responses always render from
/// the shared view, so a click that was superseded by a newer one comes
/// back with the newer request's panel.
async fn analyze_handler(
    State(state): State<AppState>,
    Form(form): Form<AnalyzeForm>,
) -> Html<String> {
    let location = form.location.parse::<Location>().unwrap_or_default();

    let (ticket, event) = {
        let mut view = state.lock_view();
        view.set_location(location);
        let Some(event) = view.event_by_id(form.event_id).cloned() else {
            tracing::warn!("analysis requested for unknown event #{}", form.event_id);
            return Html(format!(
                r#"<div class="error-banner">Unknown event #{}</div>"#,
                form.event_id
            ));
        };
        (view.begin_analysis(), event)
    };

    let request = AnalyzeRequest::for_event(&event, location);
    let api_base = state.config.api_base.clone();
    let analysis = tokio::task::spawn_blocking(move || {
        let client = BackendClient::new(api_base)?;
        client.analyze(&request)
    })
    .await;

    match analysis {
        Ok(Ok(report)) => {
            let mut view = state.lock_view();
            view.apply_report(ticket, report);
            Html(render_panel(&view))
        }
        Ok(Err(e)) => {
            tracing::warn!("analysis failed, serving demo report: {}", e);
            demo_fallback(&state, ticket, &event.title, location).await
        }
        Err(e) => {
            tracing::error!("analysis task failed: {}", e);
            demo_fallback(&state, ticket, &event.title, location).await
        }
    }
}

/// Demo fallback: surface the notice, hold the delay, then apply the report.
async fn demo_fallback(
    state: &AppState,
    ticket: AnalysisTicket,
    event_title: &str,
    location: Location,
) -> Html<String> {
    {
        let mut view = state.lock_view();
        view.apply_failure(ticket, DEMO_NOTICE);
    }

    tokio::time::sleep(state.config.demo_delay).await;

    let mut view = state.lock_view();
    view.apply_report(ticket, fallback::demo_report(event_title, location));
    Html(render_panel(&view))
}

/// Health check endpoint.
async fn health_handler() -> &'static str {
    "OK"
}

// ============================================================================
// HTML Fragments
// ============================================================================

/// Format the event list as clickable cards, in backend order.
fn render_event_cards(events: &[Event]) -> String {
    let mut html = String::new();
    for event in events {
        html.push_str(&render_event_card(event));
    }
    html
}

/// Format a single event as a card that posts an analysis request.
fn render_event_card(event: &Event) -> String {
    format!(
        r##"<div class="event-card" hx-post="/analyze" hx-vals='{{"event_id": {id}}}' hx-include="#location" hx-target="#panel" hx-indicator="#analyzing">
  <div class="event-title-row">
    <span class="event-title">{title}</span>
    <span class="severity {severity}">{severity}</span>
  </div>
  <p class="event-desc">{description}</p>
  <div class="event-meta">
    <span>{date}</span>
    <span>{regions}</span>
  </div>
</div>
"##,
        id = event.id,
        title = event.title,
        severity = event.severity,
        description = event.description,
        date = event.date,
        regions = event.regions.join(", "),
    )
}

/// Render the analysis panel from the current view state.
fn render_panel(view: &ViewState) -> String {
    let mut html = String::new();

    if view.is_loading() {
        html.push_str(&format!("<div class=\"loading\">{LOADING_MESSAGE}</div>\n"));
    }

    if !view.error().is_empty() {
        html.push_str(&format!(
            "<div class=\"error-banner\">{}</div>\n",
            view.error()
        ));
    }

    if let Some(report) = view.impacts() {
        html.push_str(&render_report(report));
    }

    if view.show_placeholder() {
        html.push_str(&format!("<div class=\"placeholder\">{PLACEHOLDER}</div>\n"));
    }

    html
}

/// Format an impact report: severity meter plus per-category cards.
fn render_report(report: &ImpactReport) -> String {
    let width = meter_percent(report.overall_severity);
    let color = severity_color(report.overall_severity);

    let mut cards = String::new();
    for (category, detail) in &report.impacts {
        cards.push_str(&render_impact_card(category, detail));
    }

    format!(
        r#"<div class="analysis">
  <h2>Impact Analysis: {location}</h2>
  <div class="overall">
    <span class="overall-label">Overall Severity</span>
    <div class="meter"><div class="meter-fill" style="width:{width}%;background:{hex}"></div></div>
    <span class="overall-score">{score}/10</span>
  </div>
  <div class="impact-grid">
{cards}  </div>
</div>
"#,
        location = report.location,
        width = width,
        hex = color.hex(),
        score = report.overall_severity,
        cards = cards,
    )
}

/// Format one impact category card with its severity accent.
fn render_impact_card(category: &str, detail: &ImpactDetail) -> String {
    let color = severity_color(detail.severity);
    format!(
        r#"    <div class="impact-card" style="border-left-color:{hex}">
      <h4>{category}</h4>
      <div class="impact-score">Severity: <strong>{severity}/10</strong></div>
      <div class="impact-when">{timeframe}</div>
      <div class="impact-example">{example}</div>
      <p class="impact-desc">{description}</p>
    </div>
"#,
        hex = color.hex(),
        category = category.to_uppercase(),
        severity = detail.severity,
        timeframe = detail.timeframe,
        example = detail.example,
        description = detail.impact_description,
    )
}

// ============================================================================
// HTML Template (embedded for single-binary deployment)
// ============================================================================

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en" data-theme="dark">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>GeoImpact — Geopolitical Impact Analyzer</title>

    <!-- Modern Font -->
    <link rel="preconnect" href="https://fonts.googleapis.com">
    <link rel="preconnect" href="https://fonts.gstatic.com" crossorigin>
    <link href="https://fonts.googleapis.com/css2?family=Inter:wght@400;500;600;700&display=swap" rel="stylesheet">

    <!-- HTMX -->
    <script src="https://unpkg.com/htmx.org@1.9.10"></script>

    <style>
        :root {
            --font: 'Inter', -apple-system, BlinkMacSystemFont, sans-serif;

            --bg-primary: #09090b;
            --bg-secondary: #0f0f12;
            --bg-tertiary: #18181b;
            --bg-elevated: #1c1c1f;
            --bg-hover: #27272a;

            --text-primary: #fafafa;
            --text-secondary: #a1a1aa;
            --text-tertiary: #52525b;

            --border: #27272a;
            --border-hover: #3f3f46;

            --accent: #818cf8;
            --accent-soft: rgba(129, 140, 248, 0.1);

            --sev-high: #ff4444;
            --sev-medium: #ff9900;
            --sev-low: #44aa44;

            --shadow-md: 0 4px 6px -1px rgba(0,0,0,0.4);

            --radius-sm: 6px;
            --radius-md: 10px;
            --radius-lg: 16px;
            --radius-full: 9999px;
        }

        * { margin: 0; padding: 0; box-sizing: border-box; }

        body {
            font-family: var(--font);
            background: var(--bg-primary);
            color: var(--text-primary);
            line-height: 1.6;
            min-height: 100vh;
            -webkit-font-smoothing: antialiased;
        }

        /* Subtle gradient wash behind the header */
        body::before {
            content: '';
            position: fixed;
            top: 0;
            left: 0;
            right: 0;
            height: 400px;
            background: radial-gradient(ellipse 80% 50% at 50% -20%, var(--accent-soft), transparent);
            pointer-events: none;
            z-index: -1;
        }

        /* ===== HEADER ===== */
        .header {
            position: sticky;
            top: 0;
            z-index: 1000;
            backdrop-filter: blur(12px);
            -webkit-backdrop-filter: blur(12px);
            background: rgba(9, 9, 11, 0.8);
            border-bottom: 1px solid var(--border);
        }

        .header-inner {
            max-width: 1200px;
            margin: 0 auto;
            padding: 0.875rem 1.5rem;
            display: flex;
            justify-content: space-between;
            align-items: center;
        }

        .logo {
            display: flex;
            align-items: center;
            gap: 0.625rem;
            font-weight: 600;
            font-size: 1.125rem;
            letter-spacing: -0.02em;
        }

        .logo-mark {
            width: 32px;
            height: 32px;
            border-radius: var(--radius-md);
            background: var(--accent-soft);
            border: 1px solid var(--border);
            display: flex;
            align-items: center;
            justify-content: center;
            font-size: 1rem;
        }

        .tagline {
            font-size: 0.8125rem;
            color: var(--text-tertiary);
        }

        /* ===== MAIN LAYOUT ===== */
        .main {
            max-width: 1200px;
            margin: 0 auto;
            padding: 2rem 1.5rem;
        }

        .layout {
            display: grid;
            grid-template-columns: 380px 1fr;
            gap: 1.5rem;
            align-items: start;
        }

        .pane-header {
            display: flex;
            justify-content: space-between;
            align-items: center;
            margin-bottom: 1rem;
        }

        .pane-title {
            font-size: 1.125rem;
            font-weight: 600;
            letter-spacing: -0.02em;
        }

        select {
            font-family: var(--font);
            font-size: 0.8125rem;
            color: var(--text-primary);
            background: var(--bg-tertiary);
            border: 1px solid var(--border);
            border-radius: var(--radius-md);
            padding: 0.375rem 0.625rem;
            cursor: pointer;
        }

        select:hover { border-color: var(--border-hover); }

        /* ===== EVENT CARDS ===== */
        .event-feed {
            display: grid;
            gap: 0.75rem;
        }

        .event-card {
            background: var(--bg-elevated);
            border: 1px solid var(--border);
            border-radius: var(--radius-lg);
            padding: 1rem 1.125rem;
            cursor: pointer;
            transition: all 0.2s ease;
        }

        .event-card:hover {
            border-color: var(--border-hover);
            box-shadow: var(--shadow-md);
            transform: translateY(-2px);
        }

        .event-title-row {
            display: flex;
            justify-content: space-between;
            align-items: center;
            gap: 0.5rem;
            margin-bottom: 0.25rem;
        }

        .event-title {
            font-weight: 500;
            font-size: 0.9375rem;
        }

        .severity {
            padding: 0.125rem 0.5rem;
            border-radius: var(--radius-full);
            font-size: 0.6875rem;
            font-weight: 600;
            text-transform: uppercase;
            letter-spacing: 0.025em;
            background: var(--bg-tertiary);
            color: var(--text-secondary);
        }

        .severity.high { background: rgba(255, 68, 68, 0.12); color: var(--sev-high); }
        .severity.medium { background: rgba(255, 153, 0, 0.12); color: var(--sev-medium); }
        .severity.low { background: rgba(68, 170, 68, 0.12); color: var(--sev-low); }

        .event-desc {
            font-size: 0.8125rem;
            color: var(--text-secondary);
        }

        .event-meta {
            display: flex;
            gap: 1rem;
            margin-top: 0.5rem;
            font-size: 0.75rem;
            color: var(--text-tertiary);
        }

        /* ===== ANALYSIS PANEL ===== */
        .panel-pane {
            background: var(--bg-secondary);
            border: 1px solid var(--border);
            border-radius: var(--radius-lg);
            padding: 1.5rem;
            min-height: 360px;
        }

        .placeholder {
            display: flex;
            align-items: center;
            justify-content: center;
            min-height: 300px;
            color: var(--text-tertiary);
            font-size: 0.9375rem;
            text-align: center;
        }

        .loading {
            padding: 0.75rem 1rem;
            border-radius: var(--radius-md);
            background: var(--accent-soft);
            color: var(--accent);
            font-size: 0.875rem;
            margin-bottom: 1rem;
        }

        .htmx-indicator { display: none; }
        .htmx-request.htmx-indicator { display: block; }

        .error-banner {
            padding: 0.75rem 1rem;
            border-radius: var(--radius-md);
            background: rgba(255, 153, 0, 0.12);
            border: 1px solid rgba(255, 153, 0, 0.3);
            color: var(--sev-medium);
            font-size: 0.875rem;
            margin-bottom: 1rem;
        }

        .analysis h2 {
            font-size: 1.25rem;
            font-weight: 600;
            letter-spacing: -0.02em;
            margin-bottom: 1rem;
        }

        .overall {
            display: flex;
            align-items: center;
            gap: 1rem;
            padding: 1rem;
            background: var(--bg-elevated);
            border: 1px solid var(--border);
            border-radius: var(--radius-md);
            margin-bottom: 1.25rem;
        }

        .overall-label {
            font-size: 0.8125rem;
            color: var(--text-secondary);
            white-space: nowrap;
        }

        .meter {
            flex: 1;
            height: 10px;
            border-radius: var(--radius-full);
            background: var(--bg-tertiary);
            overflow: hidden;
        }

        .meter-fill {
            height: 100%;
            border-radius: var(--radius-full);
            transition: width 0.4s ease;
        }

        .overall-score {
            font-weight: 700;
            font-size: 1.125rem;
            letter-spacing: -0.02em;
            white-space: nowrap;
        }

        .impact-grid {
            display: grid;
            grid-template-columns: repeat(auto-fill, minmax(220px, 1fr));
            gap: 0.75rem;
        }

        .impact-card {
            background: var(--bg-elevated);
            border: 1px solid var(--border);
            border-left: 3px solid var(--border);
            border-radius: var(--radius-md);
            padding: 0.875rem 1rem;
        }

        .impact-card h4 {
            font-size: 0.75rem;
            font-weight: 600;
            letter-spacing: 0.05em;
            color: var(--text-secondary);
            margin-bottom: 0.375rem;
        }

        .impact-score { font-size: 0.8125rem; }

        .impact-when {
            font-size: 0.75rem;
            color: var(--text-tertiary);
        }

        .impact-example {
            font-size: 0.875rem;
            font-weight: 500;
            margin-top: 0.375rem;
        }

        .impact-desc {
            font-size: 0.75rem;
            color: var(--text-secondary);
            margin-top: 0.25rem;
        }

        /* ===== EMPTY STATE ===== */
        .empty-state {
            padding: 2rem 1rem;
            text-align: center;
            color: var(--text-tertiary);
            font-size: 0.875rem;
        }

        /* ===== FOOTER ===== */
        .footer {
            border-top: 1px solid var(--border);
            padding: 1.5rem;
            text-align: center;
            font-size: 0.8125rem;
            color: var(--text-tertiary);
        }

        /* ===== RESPONSIVE ===== */
        @media (max-width: 860px) {
            .layout { grid-template-columns: 1fr; }
            .main { padding: 1.25rem 1rem; }
        }
    </style>
</head>
<body>
    <header class="header">
        <div class="header-inner">
            <div class="logo">
                <div class="logo-mark">⚡</div>
                <span>GeoImpact</span>
            </div>
            <span class="tagline">Geopolitical Impact Analyzer</span>
        </div>
    </header>

    <main class="main">
        <div class="layout">
            <section class="events-pane">
                <div class="pane-header">
                    <h2 class="pane-title">Recent Events</h2>
                    <select id="location" name="location" title="Analysis location">
                        <option value="India" selected>India</option>
                        <option value="USA">USA</option>
                        <option value="Europe">Europe</option>
                        <option value="Global">Global</option>
                    </select>
                </div>

                <div class="event-feed"
                     id="events"
                     hx-get="/events/list"
                     hx-trigger="load"
                     hx-swap="innerHTML">
                    <div class="empty-state">Loading events...</div>
                </div>
            </section>

            <section class="panel-pane">
                <div id="analyzing" class="htmx-indicator loading">🤖 Analyzing impacts...</div>
                <div id="panel">
                    <div class="placeholder">Click an event to analyze its impact on daily life</div>
                </div>
            </section>
        </div>
    </main>

    <footer class="footer">
        <p>Impact analysis by the GIA backend · GeoImpact v0.1.0</p>
    </footer>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn report_with_overall(overall_severity: f64) -> ImpactReport {
        ImpactReport {
            event: "Middle East Oil Crisis".to_string(),
            location: "India".to_string(),
            overall_severity,
            impacts: BTreeMap::new(),
        }
    }

    #[test]
    fn test_event_cards_render_in_backend_order() {
        let events = fallback::demo_events();
        let html = render_event_cards(&events);

        assert_eq!(html.matches("class=\"event-card\"").count(), 2);
        let first = html.find("Middle East Oil Crisis").unwrap();
        let second = html.find("Ukraine Grain Blockade").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_event_card_posts_analysis_request() {
        let events = fallback::demo_events();
        let html = render_event_card(&events[0]);

        assert!(html.contains(r#"hx-post="/analyze""#));
        assert!(html.contains(r#"hx-vals='{"event_id": 1}'"#));
        assert!(html.contains(r##"hx-include="#location""##));
        assert!(html.contains(r#"class="severity high""#));
    }

    #[test]
    fn test_meter_width_tracks_overall_severity() {
        let html = render_report(&report_with_overall(5.5));
        assert!(html.contains("width:55%"));
        assert!(html.contains("5.5/10"));
    }

    #[test]
    fn test_meter_width_is_unclamped() {
        let html = render_report(&report_with_overall(12.0));
        assert!(html.contains("width:120%"));
    }

    #[test]
    fn test_severe_category_gets_red_accent() {
        let report = fallback::demo_report("Middle East Oil Crisis", Location::India);
        let html = render_report(&report);

        // energy sits at 8.0, currency at 5.0, jobs at 4.0
        assert!(html.contains("ENERGY"));
        assert!(html.contains("border-left-color:#ff4444"));
        assert!(html.contains("border-left-color:#ff9900"));
        assert!(html.contains("width:72%"));
    }

    #[test]
    fn test_panel_shows_placeholder_when_idle() {
        let view = ViewState::new();
        let html = render_panel(&view);

        assert!(html.contains("Click an event to analyze its impact on daily life"));
        assert!(!html.contains("error-banner"));
        assert!(!html.contains("class=\"analysis\""));
    }

    #[test]
    fn test_panel_keeps_notice_next_to_demo_report() {
        let mut view = ViewState::new();
        view.set_events(fallback::demo_events());
        view.set_location(Location::Europe);
        let ticket = view.begin_analysis();
        view.apply_failure(ticket, DEMO_NOTICE);
        view.apply_report(
            ticket,
            fallback::demo_report("Ukraine Grain Blockade", Location::Europe),
        );

        let html = render_panel(&view);
        assert!(html.contains(DEMO_NOTICE));
        assert!(html.contains("Impact Analysis: Europe"));
        assert!(!html.contains("class=\"loading\""));
    }

    #[test]
    fn test_panel_shows_loading_while_analysis_pending() {
        let mut view = ViewState::new();
        view.set_events(fallback::demo_events());
        let _ticket = view.begin_analysis();

        let html = render_panel(&view);
        assert!(html.contains("Analyzing impacts"));
        assert!(!html.contains("placeholder"));
    }
}
