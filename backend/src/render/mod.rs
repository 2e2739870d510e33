//! Server-side HTML rendering.
//!
//! Every page is recomputed per request from the shared tables and the
//! caller's session. Charts go through the injected [`Visuals`] renderer so
//! the same page can be drawn as inline SVG or as plain tables.

pub mod html;
mod layout;
mod pages;
pub mod visuals;

use std::fmt;

use chrono::Month;

pub use visuals::{Chart, Datum, MapPoint, PlainVisuals, SvgVisuals, Unit, Visuals, select_visuals};

use crate::domain::{DataState, Page, SessionState};

/// Everything a page needs to render.
#[derive(Clone, Copy)]
pub struct PageContext<'a> {
    /// Page being rendered.
    pub page: Page,
    /// Shared marketplace tables.
    pub data: &'a DataState,
    /// Caller's session.
    pub session: &'a SessionState,
    /// Month used for in-season checks.
    pub month: Month,
    /// Chart renderer.
    pub visuals: &'a dyn Visuals,
}

/// Renders a complete page.
///
/// # Errors
///
/// Returns [`fmt::Error`] if writing into the buffer fails.
///
/// # Examples
/// ```
/// use chrono::Month;
/// use dashboard::domain::{DataState, Page, SessionState};
/// use dashboard::render::{PageContext, PlainVisuals, render_page};
///
/// let data = DataState::new();
/// let session = SessionState::default();
/// let html = render_page(&PageContext {
///     page: Page::Dashboard,
///     data: &data,
///     session: &session,
///     month: Month::July,
///     visuals: &PlainVisuals,
/// })
/// .expect("render");
/// assert!(html.contains("No data available"));
/// ```
pub fn render_page(ctx: &PageContext<'_>) -> Result<String, fmt::Error> {
    let mut out = String::with_capacity(32 * 1024);
    layout::document(&mut out, ctx, |body| pages::render(body, ctx))?;
    Ok(out)
}

/// Renders a standalone error page.
///
/// # Errors
///
/// Returns [`fmt::Error`] if writing into the buffer fails.
pub fn render_error_page(
    status: u16,
    heading: &str,
    message: &str,
    trace_id: Option<&str>,
) -> Result<String, fmt::Error> {
    let mut out = String::with_capacity(8 * 1024);
    layout::error_document(&mut out, status, heading, message, trace_id)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::sync::OnceLock;

    use farm_data::{DataSource, GenerationOptions, LoadOutcome, generate_dataset};
    use rstest::rstest;

    use super::*;
    use crate::domain::DataStatus;

    fn loaded() -> &'static DataState {
        static DATA: OnceLock<DataState> = OnceLock::new();
        DATA.get_or_init(|| {
            let state = DataState::new();
            let status = state.initialize(|| {
                Ok(LoadOutcome {
                    dataset: generate_dataset(&GenerationOptions::new(42))?,
                    source: DataSource::Generated,
                    seed: 42,
                    warnings: Vec::new(),
                })
            });
            assert!(matches!(status, DataStatus::Ready { .. }), "{status:?}");
            state
        })
    }

    fn render(page: Page, session: &SessionState, visuals: &dyn Visuals) -> String {
        render_page(&PageContext {
            page,
            data: loaded(),
            session,
            month: Month::July,
            visuals,
        })
        .expect("render")
    }

    #[rstest]
    fn every_page_renders_with_navigation() {
        let session = SessionState::default();
        for page in Page::ALL {
            let html = render(page, &session, &SvgVisuals);
            assert!(html.starts_with("<!DOCTYPE html>"), "{page:?}");
            assert!(html.ends_with("</html>"), "{page:?}");
            assert!(html.contains(r#"aria-current="page""#), "{page:?}");
            assert!(!html.contains("No data available"), "{page:?}");
        }
    }

    #[rstest]
    #[case(Page::Dashboard, false, false)]
    #[case(Page::Producers, true, false)]
    #[case(Page::Products, true, true)]
    #[case(Page::MarketAnalysis, true, true)]
    #[case(Page::Sustainability, false, false)]
    #[case(Page::Community, false, false)]
    fn sidebar_controls_follow_the_page(
        #[case] page: Page,
        #[case] filters: bool,
        #[case] season: bool,
    ) {
        let html = render(page, &SessionState::default(), &PlainVisuals);
        assert_eq!(html.contains(r#"action="/filters""#), filters);
        assert_eq!(html.contains(r#"name="in_season_only""#), season);
    }

    #[rstest]
    fn plain_visuals_render_tables_only() {
        let html = render(Page::MarketAnalysis, &SessionState::default(), &PlainVisuals);
        assert!(!html.contains("<svg"));
        assert!(html.contains("Revenue by Month"));
    }

    #[rstest]
    fn error_page_shows_the_trace_id() {
        let html = render_error_page(404, "Not Found", "page not found", Some("abc-123"))
            .expect("render");
        assert!(html.contains("404 Not Found"));
        assert!(html.contains("page not found"));
        assert!(html.contains("<code>abc-123</code>"));
    }
}
