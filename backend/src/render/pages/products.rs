//! Product listings with favourites and price trends.

use std::fmt::{self, Write};

use chrono::Datelike;
use farm_data::analytics::{MONTHS, average_price_by_category};
use farm_data::{Dataset, Product, ProductListing, filter_listings};

use super::selection_link;
use crate::domain::Page;
use crate::render::html::{
    decimal, escape, money, note, section_end, section_start, short_month, table_end, table_start,
};
use crate::render::{Chart, Datum, PageContext, Unit};

pub(super) fn render(out: &mut String, ctx: &PageContext<'_>, dataset: &Dataset) -> fmt::Result {
    let listings = filter_listings(dataset, &ctx.session.filters, ctx.month);

    section_start(out, "Product Listings")?;
    note(
        out,
        &format!(
            "Showing {} of {} products.",
            listings.len(),
            dataset.products.len()
        ),
    )?;
    if listings.is_empty() {
        note(out, "No products match the current filters.")?;
    } else {
        listing_table(out, ctx, &listings)?;
    }
    section_end(out)?;

    section_start(out, "Average Price by Category")?;
    let prices: Vec<Datum> = average_price_by_category(listings.iter().map(|l| l.product))
        .into_iter()
        .map(|row| Datum::new(row.category.label(), row.average_price))
        .collect();
    ctx.visuals.bar_chart(
        out,
        &Chart {
            title: "Average Unit Price",
            value_label: "Price",
            unit: Unit::Dollars,
            data: &prices,
        },
    )?;
    section_end(out)?;

    let selected = ctx
        .session
        .selected_product
        .and_then(|id| dataset.product(id));
    if let Some(product) = selected {
        price_trend(out, ctx, dataset, product)?;
    }
    Ok(())
}

fn listing_table(
    out: &mut String,
    ctx: &PageContext<'_>,
    listings: &[ProductListing<'_>],
) -> fmt::Result {
    table_start(
        out,
        None,
        &[
            "Product",
            "Category",
            "Price",
            "Season",
            "In Season",
            "Producer",
            "Distance (mi)",
            "Favourite",
        ],
    )?;
    for listing in listings {
        let row = listing.row(ctx.month);
        out.write_str("<tr><td>")?;
        selection_link(out, Page::Products, "product", row.product_id, &row.name)?;
        write!(
            out,
            "</td><td>{}</td><td>{} / {}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>",
            escape(&row.category),
            money(row.unit_price),
            escape(&row.unit),
            escape(&row.season),
            if row.in_season { "Yes" } else { "No" },
            escape(&row.producer),
            decimal(row.distance_miles)
        )?;
        favourite_form(out, row.product_id, ctx.session.is_favorite(row.product_id))?;
        out.write_str("</td></tr>")?;
    }
    table_end(out)
}

fn favourite_form(out: &mut String, product_id: u32, favourite: bool) -> fmt::Result {
    write!(
        out,
        r#"<form method="post" action="/favorites/{product_id}"><input type="hidden" name="return_to" value="{}"><button type="submit">{}</button></form>"#,
        Page::Products.path(),
        if favourite { "★ Remove" } else { "☆ Save" }
    )
}

/// Mean weekly price per calendar month for one product.
fn monthly_prices(dataset: &Dataset, product_id: u32) -> Vec<Datum> {
    let mut sums = [(0.0_f64, 0_u32); 12];
    for record in dataset
        .market
        .iter()
        .filter(|record| record.product_id() == product_id)
    {
        if let Some(slot) = usize::try_from(record.date().month0())
            .ok()
            .and_then(|index| sums.get_mut(index))
        {
            slot.0 += record.price();
            slot.1 += 1;
        }
    }
    MONTHS
        .iter()
        .zip(sums)
        .filter(|(_, (_, weeks))| *weeks > 0)
        .map(|(month, (total, weeks))| Datum::new(short_month(*month), total / f64::from(weeks)))
        .collect()
}

fn price_trend(
    out: &mut String,
    ctx: &PageContext<'_>,
    dataset: &Dataset,
    product: &Product,
) -> fmt::Result {
    section_start(out, &product.name)?;
    write!(
        out,
        "<p>{} · {} / {} · season {}</p>",
        product.category.label(),
        money(product.unit_price),
        escape(&product.unit),
        product.season
    )?;
    if let Some(score) = product.nutrition_score {
        note(out, &format!("Nutrition score: {score}/100"))?;
    }
    let prices = monthly_prices(dataset, product.id);
    let title = format!("{} Price Trend", product.name);
    ctx.visuals.line_chart(
        out,
        &Chart {
            title: &title,
            value_label: "Average price",
            unit: Unit::Dollars,
            data: &prices,
        },
    )?;
    section_end(out)
}

#[cfg(test)]
mod tests {
    use farm_data::{GenerationOptions, generate_dataset};
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn monthly_prices_cover_months_with_sales() {
        let dataset = generate_dataset(&GenerationOptions::new(7)).expect("generation");
        let product = dataset.products.first().expect("catalogue has products");
        let prices = monthly_prices(&dataset, product.id);
        assert!(!prices.is_empty());
        assert!(prices.len() <= 12);
        assert!(prices.iter().all(|datum| datum.value > 0.0));
    }

    #[rstest]
    fn unknown_products_have_no_prices() {
        let dataset = generate_dataset(&GenerationOptions::new(7)).expect("generation");
        assert!(monthly_prices(&dataset, u32::MAX).is_empty());
    }
}
