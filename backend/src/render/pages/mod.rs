//! Page bodies, one module per [`Page`] variant.

mod community;
mod dashboard;
mod market;
mod producers;
mod products;
mod sustainability;

use std::fmt::{self, Write};

use farm_data::Dataset;

use super::PageContext;
use super::html::{escape, note};
use crate::domain::Page;

/// Writes the body of `ctx.page`.
pub(super) fn render(out: &mut String, ctx: &PageContext<'_>) -> fmt::Result {
    let Some(dataset) = ctx.data.dataset() else {
        return no_data(out, ctx.data.unavailable_reason().unwrap_or("unknown"));
    };
    match ctx.page {
        Page::Dashboard => dashboard::render(out, ctx, dataset),
        Page::Producers => producers::render(out, ctx, dataset),
        Page::Products => products::render(out, ctx, dataset),
        Page::MarketAnalysis => market::render(out, ctx, dataset),
        Page::Sustainability => sustainability::render(out, ctx, dataset),
        Page::Community => community::render(out, ctx, dataset),
    }
}

fn no_data(out: &mut String, reason: &str) -> fmt::Result {
    out.write_str(r#"<section class="card"><h2>No data available</h2>"#)?;
    note(out, reason)?;
    out.write_str("</section>")
}

/// Opens a grid of metric cards.
fn metrics_start(out: &mut String) -> fmt::Result {
    out.write_str(r#"<div class="metrics">"#)
}

fn metrics_end(out: &mut String) -> fmt::Result {
    out.write_str("</div>")
}

/// Converts a tally to a chart value.
#[expect(
    clippy::cast_precision_loss,
    reason = "tallies stay far below 2^53"
)]
const fn chart_value(tally: u64) -> f64 {
    tally as f64
}

/// Producer name for display, falling back to the id.
fn producer_name(dataset: &Dataset, producer_id: u32) -> String {
    dataset
        .producer(producer_id)
        .map_or_else(|| format!("Producer {producer_id}"), |p| p.name.clone())
}

/// Link that selects a row on `page`.
fn selection_link(
    out: &mut String,
    page: Page,
    key: &str,
    id: u32,
    label: &str,
) -> fmt::Result {
    write!(
        out,
        r#"<a href="{}?{key}={id}">{}</a>"#,
        page.path(),
        escape(label)
    )
}
