//! Certification mix and carbon footprint across all producers.

use std::fmt;

use farm_data::analytics::{carbon_totals, emissions_by_producer, sustainable_share};
use farm_data::{Certification, Dataset};

use super::{chart_value, metrics_end, metrics_start};
use crate::render::html::{
    decimal, metric_card, percent, section_end, section_start, table_end, table_row, table_start,
};
use crate::render::{Chart, Datum, PageContext, Unit};

pub(super) fn render(out: &mut String, ctx: &PageContext<'_>, dataset: &Dataset) -> fmt::Result {
    section_start(out, "Sustainable Practices")?;
    metrics_start(out)?;
    metric_card(
        out,
        "Sustainable Producers",
        &percent(sustainable_share(&dataset.producers)),
        None,
    )?;
    let regenerative = dataset
        .producers
        .iter()
        .filter(|producer| producer.certification == Certification::Regenerative)
        .count();
    metric_card(out, "Regenerative Farms", &regenerative.to_string(), None)?;
    metrics_end(out)?;
    let mix: Vec<Datum> = Certification::ALL
        .iter()
        .map(|certification| {
            let producers = dataset
                .producers
                .iter()
                .filter(|producer| producer.certification == *certification)
                .count();
            Datum::new(
                certification.label(),
                chart_value(u64::try_from(producers).unwrap_or(u64::MAX)),
            )
        })
        .collect();
    ctx.visuals.share_chart(
        out,
        &Chart {
            title: "Producers by Certification",
            value_label: "Producers",
            unit: Unit::Count,
            data: &mix,
        },
    )?;
    section_end(out)?;

    section_start(out, "Carbon Footprint")?;
    let totals = carbon_totals(&dataset.carbon);
    metrics_start(out)?;
    metric_card(out, "Transport (t CO2e)", &decimal(totals.transport), None)?;
    metric_card(out, "Farming (t CO2e)", &decimal(totals.farming), None)?;
    metric_card(
        out,
        "Sequestration (t CO2e)",
        &decimal(totals.sequestration),
        None,
    )?;
    metric_card(out, "Net Impact (t CO2e)", &decimal(totals.net), None)?;
    metrics_end(out)?;

    let emissions = emissions_by_producer(dataset, &dataset.producers);
    let bars: Vec<Datum> = emissions
        .iter()
        .map(|row| Datum::new(row.name.clone(), row.total))
        .collect();
    ctx.visuals.bar_chart(
        out,
        &Chart {
            title: "Emissions by Producer",
            value_label: "Total emissions",
            unit: Unit::Tonnes,
            data: &bars,
        },
    )?;
    table_start(
        out,
        Some("Per-producer footprint"),
        &["Producer", "Transport", "Farming", "Sequestration", "Net"],
    )?;
    for row in &emissions {
        let Some(record) = dataset.carbon_for(row.producer_id) else {
            continue;
        };
        table_row(
            out,
            &[
                row.name.clone(),
                decimal(record.transport_emissions()),
                decimal(record.farming_emissions()),
                decimal(record.carbon_sequestration()),
                decimal(record.net_impact()),
            ],
        )?;
    }
    table_end(out)?;
    section_end(out)
}
