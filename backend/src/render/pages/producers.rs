//! Producer directory with map and detail panel.

use std::fmt::{self, Write};

use farm_data::{Dataset, Producer, filter_producers};

use super::{metrics_end, metrics_start, selection_link};
use crate::domain::Page;
use crate::render::html::{
    decimal, escape, metric_card, money, note, section_end, section_start, table_end, table_row,
    table_start,
};
use crate::render::{MapPoint, PageContext};

pub(super) fn render(out: &mut String, ctx: &PageContext<'_>, dataset: &Dataset) -> fmt::Result {
    let producers = filter_producers(dataset, &ctx.session.filters, ctx.month);

    section_start(out, "Local Producers")?;
    note(
        out,
        &format!(
            "Showing {} of {} producers.",
            producers.len(),
            dataset.producers.len()
        ),
    )?;
    if producers.is_empty() {
        note(out, "No producers match the current filters.")?;
    } else {
        directory(out, &producers)?;
    }
    section_end(out)?;

    section_start(out, "Producer Locations")?;
    let points = map_points(ctx, &producers);
    ctx.visuals.location_map(out, "Producers near you", &points)?;
    section_end(out)?;

    let selected = ctx
        .session
        .selected_producer
        .and_then(|id| dataset.producer(id));
    if let Some(producer) = selected {
        detail(out, dataset, producer)?;
    }
    Ok(())
}

fn directory(out: &mut String, producers: &[&Producer]) -> fmt::Result {
    table_start(
        out,
        None,
        &["Name", "Location", "Categories", "Certification", "Distance (mi)"],
    )?;
    for producer in producers {
        out.write_str("<tr><td>")?;
        selection_link(out, Page::Producers, "producer", producer.id, &producer.name)?;
        let categories: Vec<&str> = producer
            .categories
            .as_slice()
            .iter()
            .map(|category| category.label())
            .collect();
        write!(
            out,
            "</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&producer.location),
            escape(&categories.join(", ")),
            producer.certification.label(),
            decimal(producer.distance_miles)
        )?;
    }
    table_end(out)
}

fn map_points(ctx: &PageContext<'_>, producers: &[&Producer]) -> Vec<MapPoint> {
    let location = &ctx.session.location;
    let mut points = vec![MapPoint {
        label: format!("You: {}", location.label),
        latitude: location.latitude,
        longitude: location.longitude,
        highlight: true,
    }];
    points.extend(producers.iter().filter_map(|producer| {
        let (latitude, longitude) = producer.coordinates()?;
        Some(MapPoint {
            label: producer.name.clone(),
            latitude,
            longitude,
            highlight: ctx.session.selected_producer == Some(producer.id),
        })
    }));
    points
}

fn detail(out: &mut String, dataset: &Dataset, producer: &Producer) -> fmt::Result {
    section_start(out, &producer.name)?;
    write!(
        out,
        "<p>{}</p><p class=\"note\">{} · {} region · founded {} · {} employees</p>",
        escape(&producer.description),
        escape(&producer.location),
        escape(&producer.region),
        producer.founded_year,
        producer.employees
    )?;

    if let Some(carbon) = dataset.carbon_for(producer.id) {
        metrics_start(out)?;
        metric_card(
            out,
            "Total Emissions (t)",
            &decimal(carbon.total_emissions()),
            None,
        )?;
        metric_card(
            out,
            "Sequestration (t)",
            &decimal(carbon.carbon_sequestration()),
            None,
        )?;
        metric_card(out, "Net Impact (t)", &decimal(carbon.net_impact()), None)?;
        metrics_end(out)?;
    }

    table_start(out, Some("Products"), &["Product", "Category", "Price", "Season"])?;
    for product in dataset.products_of(producer.id) {
        table_row(
            out,
            &[
                product.name.clone(),
                product.category.label().to_owned(),
                format!("{} / {}", money(product.unit_price), product.unit),
                product.season.to_string(),
            ],
        )?;
    }
    table_end(out)?;
    section_end(out)
}
