//! Page shell: document head, sidebar and footer.

use std::fmt::{self, Write};

use farm_data::filter::{DISTANCE_STEP_MILES, MAX_DISTANCE_MILES, MIN_DISTANCE_MILES};

use super::PageContext;
use super::html::escape;
use crate::domain::Page;
use crate::domain::session::{NotificationLevel, SessionState};

const APP_TITLE: &str = "Farm-to-Table Ecosystem";

const ABOUT: &str = "The Farm-to-Table Ecosystem application connects local farmers with \
consumers and businesses, promoting sustainable food systems and supporting local economies.";

const STYLES: &str = r"
body { margin: 0; font-family: system-ui, sans-serif; background-color: #f8f9fa; color: #212121; }
.app { display: flex; min-height: 100vh; }
.sidebar { width: 260px; padding: 1.5rem; background-color: #ffffff; border-right: 1px solid #e0e0e0; }
.sidebar nav ul { list-style: none; padding: 0; }
.sidebar nav a { display: block; padding: 0.4rem 0.6rem; border-radius: 6px; color: #2e7d32; text-decoration: none; }
.sidebar nav a.active { background-color: #e8f5e9; font-weight: bold; }
.filters label { display: block; margin: 0.5rem 0; }
main { flex: 1; padding: 1.5rem 2rem; }
.card { border-radius: 10px; box-shadow: 0 4px 6px rgba(0, 0, 0, 0.1); padding: 1.5rem; margin-bottom: 1rem; background-color: white; }
.metrics { display: grid; grid-template-columns: repeat(auto-fit, minmax(180px, 1fr)); gap: 1rem; }
.metric-container { text-align: center; padding: 1rem; background-color: #f1f8e9; border-radius: 8px; border-left: 5px solid #7cb342; }
.metric-value { font-size: 2rem; font-weight: bold; color: #2e7d32; }
.metric-label { font-size: 1rem; color: #616161; }
.delta-up { color: green; font-size: 0.9rem; }
.delta-down { color: red; font-size: 0.9rem; }
.dataframe { width: 100%; border-collapse: collapse; }
.dataframe th { background-color: #e8f5e9; color: #2e7d32; font-weight: bold; text-align: left; padding: 12px; }
.dataframe td { padding: 10px; border-bottom: 1px solid #e0e0e0; }
.dataframe tr:hover { background-color: #f5f5f5; }
.chart svg { width: 100%; max-width: 640px; height: auto; background-color: white; }
.notifications li.success { color: #2e7d32; }
.note { color: #757575; }
.footer { text-align: center; margin-top: 20px; padding-top: 10px; border-top: 1px solid #e0e0e0; }
.footer-text { color: #757575; font-size: 0.8em; }
.footer-highlight { font-weight: bold; color: #2e7d32; }
";

fn head(out: &mut String, title: &str) -> fmt::Result {
    write!(
        out,
        r#"<!DOCTYPE html><html lang="en"><head><meta charset="utf-8"><meta name="viewport" content="width=device-width, initial-scale=1"><title>{} | {APP_TITLE}</title><style>{STYLES}</style></head><body><div class="app">"#,
        escape(title)
    )
}

fn navigation(out: &mut String, current: Option<Page>) -> fmt::Result {
    write!(out, r#"<aside class="sidebar"><h1>{APP_TITLE}</h1><nav><h2>Navigation</h2><ul>"#)?;
    for page in Page::ALL {
        if Some(page) == current {
            write!(
                out,
                r#"<li><a class="active" aria-current="page" href="{}">{}</a></li>"#,
                page.path(),
                page.title()
            )?;
        } else {
            write!(out, r#"<li><a href="{}">{}</a></li>"#, page.path(), page.title())?;
        }
    }
    out.write_str("</ul></nav><hr>")
}

fn checkbox(out: &mut String, name: &str, label: &str, checked: bool) -> fmt::Result {
    write!(
        out,
        r#"<label><input type="checkbox" name="{name}" value="true"{}> {label}</label>"#,
        if checked { " checked" } else { "" }
    )
}

fn filter_form(out: &mut String, page: Page, session: &SessionState) -> fmt::Result {
    let filters = session.filters;
    out.write_str(r#"<form class="filters" method="post" action="/filters"><h2>Filters</h2>"#)?;
    checkbox(
        out,
        "sustainable_only",
        "Sustainable producers only",
        filters.sustainable_only,
    )?;
    if page.shows_season_filter() {
        checkbox(
            out,
            "in_season_only",
            "In-season products only",
            filters.in_season_only,
        )?;
    } else if filters.in_season_only {
        // Keep the stored value when the control is not shown.
        out.write_str(r#"<input type="hidden" name="in_season_only" value="true">"#)?;
    }
    write!(
        out,
        r#"<label for="max_distance">Maximum distance (miles): {miles}</label><input type="range" id="max_distance" name="max_distance" min="{MIN_DISTANCE_MILES}" max="{MAX_DISTANCE_MILES}" step="{DISTANCE_STEP_MILES}" value="{miles}"><input type="hidden" name="return_to" value="{path}"><button type="submit">Apply Filters</button></form><hr>"#,
        miles = filters.max_distance.miles(),
        path = page.path(),
    )
}

fn notifications(out: &mut String, session: &SessionState) -> fmt::Result {
    if session.notifications.is_empty() {
        return Ok(());
    }
    out.write_str(r#"<section class="notifications"><h2>Notifications</h2><ul>"#)?;
    for notification in &session.notifications {
        let class = match notification.level {
            NotificationLevel::Info => "info",
            NotificationLevel::Success => "success",
        };
        write!(
            out,
            r#"<li class="{class}">{}</li>"#,
            escape(&notification.message)
        )?;
    }
    out.write_str("</ul></section>")
}

fn about(out: &mut String) -> fmt::Result {
    write!(
        out,
        r#"<details class="about"><summary>About</summary><p>{ABOUT}</p></details></aside>"#
    )
}

fn footer(out: &mut String) -> fmt::Result {
    write!(
        out,
        r#"<footer class="footer"><p class="footer-text">Sample data generated for the <span class="footer-highlight">{APP_TITLE}</span> demo.</p></footer></main></div></body></html>"#
    )
}

/// Writes a full page around `body`.
pub(super) fn document<F>(out: &mut String, ctx: &PageContext<'_>, body: F) -> fmt::Result
where
    F: FnOnce(&mut String) -> fmt::Result,
{
    head(out, ctx.page.title())?;
    navigation(out, Some(ctx.page))?;
    if ctx.page.shows_filters() {
        filter_form(out, ctx.page, ctx.session)?;
    }
    notifications(out, ctx.session)?;
    out.write_str(r#"<form class="reset" method="post" action="/session/reset"><button type="submit">Reset session</button></form><hr>"#)?;
    about(out)?;
    write!(out, r#"<main><h1 class="page-title">{}</h1>"#, ctx.page.title())?;
    body(out)?;
    footer(out)
}

/// Writes a standalone error page.
pub(super) fn error_document(
    out: &mut String,
    status: u16,
    heading: &str,
    message: &str,
    trace_id: Option<&str>,
) -> fmt::Result {
    head(out, heading)?;
    navigation(out, None)?;
    about(out)?;
    write!(
        out,
        r#"<main><h1 class="page-title">{status} {}</h1><section class="card error"><p>{}</p>"#,
        escape(heading),
        escape(message)
    )?;
    if let Some(id) = trace_id {
        write!(
            out,
            r#"<p class="note">Trace ID: <code>{}</code></p>"#,
            escape(id)
        )?;
    }
    out.write_str(r#"<p><a href="/">Back to the dashboard</a></p></section>"#)?;
    footer(out)
}
