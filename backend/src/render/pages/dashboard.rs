//! Landing page: headline metrics and overview charts.

use std::fmt::{self, Write};

use farm_data::Dataset;
use farm_data::analytics::{
    customers_by_type, revenue_by_month, revenue_by_product, sustainable_share, total_revenue,
    year_over_year,
};

use super::{metrics_end, metrics_start};
use crate::render::html::{
    escape, metric_card, money, note, percent, section_end, section_start, short_month, table_end,
    table_row, table_start,
};
use crate::render::{Chart, Datum, PageContext, Unit};

const TOP_PRODUCTS: usize = 5;

pub(super) fn render(out: &mut String, ctx: &PageContext<'_>, dataset: &Dataset) -> fmt::Result {
    headline(out, dataset)?;

    section_start(out, "Market Overview")?;
    let monthly: Vec<Datum> = revenue_by_month(&dataset.market)
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
    let segments: Vec<Datum> = customers_by_type(&dataset.customers)
        .into_iter()
        .map(|segment| Datum::new(segment.customer_type.label(), segment.revenue))
        .collect();
    ctx.visuals.share_chart(
        out,
        &Chart {
            title: "Revenue by Customer Type",
            value_label: "Revenue",
            unit: Unit::Dollars,
            data: &segments,
        },
    )?;
    section_end(out)?;

    section_start(out, "Top Products")?;
    table_start(out, None, &["Product", "Revenue"])?;
    for row in revenue_by_product(dataset, &dataset.market)
        .into_iter()
        .take(TOP_PRODUCTS)
    {
        table_row(out, &[row.name, money(row.revenue)])?;
    }
    table_end(out)?;
    section_end(out)?;

    in_season(out, ctx, dataset)
}

fn headline(out: &mut String, dataset: &Dataset) -> fmt::Result {
    metrics_start(out)?;
    metric_card(
        out,
        "Local Producers",
        &dataset.producers.len().to_string(),
        None,
    )?;
    metric_card(
        out,
        "Sustainable Producers",
        &percent(sustainable_share(&dataset.producers)),
        None,
    )?;
    metric_card(
        out,
        "Products Listed",
        &dataset.products.len().to_string(),
        None,
    )?;
    match year_over_year(&dataset.market) {
        Some(yoy) => {
            let label = format!("{} Revenue", yoy.latest_year);
            let description = format!("vs {}", yoy.previous_year);
            let delta = yoy.percent_change().map(|change| (change, description.as_str()));
            metric_card(out, &label, &money(yoy.latest_revenue), delta)?;
        }
        None => {
            let total = total_revenue(&dataset.market);
            metric_card(out, "Total Revenue", &money(total), None)?;
        }
    }
    metrics_end(out)
}

fn in_season(out: &mut String, ctx: &PageContext<'_>, dataset: &Dataset) -> fmt::Result {
    section_start(out, "In Season Now")?;
    let names: Vec<&str> = dataset
        .products
        .iter()
        .filter(|product| product.is_in_season(ctx.month))
        .map(|product| product.name.as_str())
        .collect();
    if names.is_empty() {
        note(out, "Nothing is in season this month.")?;
    } else {
        out.write_str(r#"<ul class="in-season">"#)?;
        for name in names {
            write!(out, "<li>{}</li>", escape(name))?;
        }
        out.write_str("</ul>")?;
    }
    section_end(out)
}
