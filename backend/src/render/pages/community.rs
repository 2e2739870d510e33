//! Events, favourites and where customers come from.

use std::fmt::{self, Write};

use farm_data::analytics::MONTHS;
use farm_data::{Dataset, DistanceBracket};

use super::{chart_value, producer_name, selection_link};
use crate::domain::Page;
use crate::render::html::{
    escape, note, section_end, section_start, short_month, table_end, table_row, table_start,
};
use crate::render::{Chart, Datum, PageContext, Unit};

pub(super) fn render(out: &mut String, ctx: &PageContext<'_>, dataset: &Dataset) -> fmt::Result {
    let location = &ctx.session.location;
    section_start(out, "Your Community")?;
    write!(
        out,
        "<p>Showing activity around <strong>{}</strong> ({:.4}, {:.4}).</p>",
        escape(&location.label),
        location.latitude,
        location.longitude
    )?;
    section_end(out)?;

    section_start(out, "Upcoming Events")?;
    if ctx.session.events.is_empty() {
        note(out, "No events scheduled.")?;
    } else {
        table_start(out, None, &["Date", "Event", "Location", "Details"])?;
        for event in &ctx.session.events {
            table_row(
                out,
                &[
                    event.date.format("%B %-d, %Y").to_string(),
                    event.title.clone(),
                    event.location.clone(),
                    event.description.clone(),
                ],
            )?;
        }
        table_end(out)?;
    }
    section_end(out)?;

    favourites(out, ctx, dataset)?;

    section_start(out, "Customer Reach")?;
    let reach: Vec<Datum> = DistanceBracket::ALL
        .iter()
        .map(|bracket| {
            let customers: u64 = dataset
                .customers
                .iter()
                .filter(|record| record.distance_bracket == *bracket)
                .map(|record| u64::from(record.customer_count))
                .sum();
            Datum::new(bracket.label(), chart_value(customers))
        })
        .collect();
    ctx.visuals.share_chart(
        out,
        &Chart {
            title: "Customers by Distance",
            value_label: "Customers",
            unit: Unit::Count,
            data: &reach,
        },
    )?;
    section_end(out)
}

fn favourites(out: &mut String, ctx: &PageContext<'_>, dataset: &Dataset) -> fmt::Result {
    section_start(out, "Your Favourites")?;
    let saved: Vec<_> = ctx
        .session
        .favorites
        .iter()
        .filter_map(|id| dataset.product(*id))
        .collect();
    if saved.is_empty() {
        note(out, "Save products from the Products page to see them here.")?;
        return section_end(out);
    }
    table_start(out, None, &["Product", "Producer", "In Season"])?;
    for product in saved {
        out.write_str("<tr><td>")?;
        selection_link(out, Page::Products, "product", product.id, &product.name)?;
        let seasons: Vec<&str> = MONTHS
            .iter()
            .filter(|month| product.is_in_season(**month))
            .map(|month| short_month(*month))
            .collect();
        write!(
            out,
            "</td><td>{}</td><td>{}</td></tr>",
            escape(&producer_name(dataset, product.producer_id)),
            if product.is_in_season(ctx.month) {
                "Now".to_owned()
            } else {
                seasons.join(", ")
            }
        )?;
    }
    table_end(out)?;
    section_end(out)
}
