//! Sales trends and customer demographics.

use std::fmt;

use farm_data::analytics::{
    customers_by_month, customers_by_type, revenue_by_month, revenue_by_product, total_revenue,
    year_over_year,
};
use farm_data::{Dataset, filter_market};

use super::{chart_value, metrics_end, metrics_start};
use crate::render::html::{count, metric_card, money, note, section_end, section_start, short_month};
use crate::render::{Chart, Datum, PageContext, Unit};

const TOP_PRODUCTS: usize = 10;

pub(super) fn render(out: &mut String, ctx: &PageContext<'_>, dataset: &Dataset) -> fmt::Result {
    let filtered = filter_market(dataset, &ctx.session.filters, ctx.month);
    let records = filtered.as_slice();

    metrics_start(out)?;
    metric_card(
        out,
        "Revenue",
        &money(total_revenue(records.iter().copied())),
        None,
    )?;
    let volume: u64 = records.iter().map(|record| u64::from(record.volume())).sum();
    metric_card(out, "Units Sold", &count(chart_value(volume)), None)?;
    if let Some(yoy) = year_over_year(records.iter().copied()) {
        let description = format!("vs {}", yoy.previous_year);
        metric_card(
            out,
            &format!("{} Revenue", yoy.latest_year),
            &money(yoy.latest_revenue),
            yoy.percent_change().map(|change| (change, description.as_str())),
        )?;
    }
    metrics_end(out)?;

    section_start(out, "Sales Trends")?;
    if records.is_empty() {
        note(out, "No sales match the current filters.")?;
    }
    let monthly: Vec<Datum> = revenue_by_month(records.iter().copied())
        .into_iter()
        .map(|row| Datum::new(short_month(row.month), row.revenue))
        .collect();
    ctx.visuals.bar_chart(
        out,
        &Chart {
            title: "Revenue by Month",
            value_label: "Revenue",
            unit: Unit::Dollars,
            data: &monthly,
        },
    )?;
    let top: Vec<Datum> = revenue_by_product(dataset, records.iter().copied())
        .into_iter()
        .take(TOP_PRODUCTS)
        .map(|row| Datum::new(row.name, row.revenue))
        .collect();
    ctx.visuals.bar_chart(
        out,
        &Chart {
            title: "Top Products by Revenue",
            value_label: "Revenue",
            unit: Unit::Dollars,
            data: &top,
        },
    )?;
    section_end(out)?;

    customers(out, ctx, dataset)
}

fn customers(out: &mut String, ctx: &PageContext<'_>, dataset: &Dataset) -> fmt::Result {
    section_start(out, "Customer Demographics")?;
    let monthly: Vec<Datum> = customers_by_month(&dataset.customers)
        .into_iter()
        .map(|(month, customers)| {
            Datum::new(month.format("%b %Y").to_string(), chart_value(customers))
        })
        .collect();
    ctx.visuals.line_chart(
        out,
        &Chart {
            title: "Customers by Month",
            value_label: "Customers",
            unit: Unit::Count,
            data: &monthly,
        },
    )?;
    let segments: Vec<Datum> = customers_by_type(&dataset.customers)
        .into_iter()
        .map(|segment| Datum::new(segment.customer_type.label(), chart_value(segment.customers)))
        .collect();
    ctx.visuals.share_chart(
        out,
        &Chart {
            title: "Customers by Type",
            value_label: "Customers",
            unit: Unit::Count,
            data: &segments,
        },
    )?;
    section_end(out)
}
