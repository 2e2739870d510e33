//! Group-and-aggregate helpers feeding the dashboard pages.
//!
//! All helpers take borrowed rows, usually the output of the
//! [`crate::filter`] functions, and return small owned summaries.

use std::collections::{BTreeMap, HashMap};

use chrono::{Datelike, Month, NaiveDate};
use serde::Serialize;

use crate::dataset::Dataset;
use crate::model::{
    CarbonRecord, CustomerRecord, CustomerType, MarketRecord, Producer, Product, ProductCategory,
    round_cents,
};

/// Calendar months in display order.
pub const MONTHS: [Month; 12] = [
    Month::January,
    Month::February,
    Month::March,
    Month::April,
    Month::May,
    Month::June,
    Month::July,
    Month::August,
    Month::September,
    Month::October,
    Month::November,
    Month::December,
];

/// Revenue for one calendar month, summed across years.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MonthlyRevenue {
    /// Calendar month.
    #[serde(serialize_with = "serialize_month")]
    pub month: Month,
    /// Summed revenue.
    pub revenue: f64,
}

/// Revenue for one product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRevenue {
    /// Product identifier.
    pub product_id: u32,
    /// Product name, or the id when the product is unknown.
    pub name: String,
    /// Summed revenue.
    pub revenue: f64,
}

/// Revenue of the two most recent years in the records.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearOverYear {
    /// Earlier of the two years.
    pub previous_year: i32,
    /// Revenue in the earlier year.
    pub previous_revenue: f64,
    /// Most recent year.
    pub latest_year: i32,
    /// Revenue in the most recent year.
    pub latest_revenue: f64,
}

impl YearOverYear {
    /// Percentage change from the previous to the latest year.
    ///
    /// Returns `None` when the previous year had no revenue.
    #[must_use]
    pub fn percent_change(&self) -> Option<f64> {
        (self.previous_revenue > 0.0).then(|| {
            (self.latest_revenue - self.previous_revenue) / self.previous_revenue * 100.0
        })
    }
}

/// Average unit price of one category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CategoryPrice {
    /// Category.
    pub category: ProductCategory,
    /// Mean unit price.
    pub average_price: f64,
    /// Number of products averaged.
    pub products: usize,
}

/// Customer totals for one customer type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CustomerSegment {
    /// Customer type.
    pub customer_type: CustomerType,
    /// Summed customer count.
    pub customers: u64,
    /// Summed revenue.
    pub revenue: f64,
}

/// Carbon sums across producers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CarbonTotals {
    /// Transport emissions.
    pub transport: f64,
    /// Farming emissions.
    pub farming: f64,
    /// Transport plus farming.
    pub total: f64,
    /// Sequestered carbon.
    pub sequestration: f64,
    /// Total minus sequestration.
    pub net: f64,
}

/// Emissions of one producer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProducerEmissions {
    /// Producer identifier.
    pub producer_id: u32,
    /// Producer name.
    pub name: String,
    /// Total emissions.
    pub total: f64,
    /// Net impact.
    pub net: f64,
}

fn serialize_month<S: serde::Serializer>(month: &Month, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(month.name())
}

/// Sums revenue per calendar month, January first.
///
/// Months without records appear with zero revenue.
#[must_use]
pub fn revenue_by_month<'a>(
    records: impl IntoIterator<Item = &'a MarketRecord>,
) -> Vec<MonthlyRevenue> {
    let mut sums = [0.0_f64; 12];
    for record in records {
        if let Some(slot) = usize::try_from(record.date().month0())
            .ok()
            .and_then(|index| sums.get_mut(index))
        {
            *slot += record.revenue();
        }
    }
    MONTHS
        .iter()
        .zip(sums)
        .map(|(month, revenue)| MonthlyRevenue {
            month: *month,
            revenue: round_cents(revenue),
        })
        .collect()
}

/// Sums revenue per product, highest first.
///
/// Ties are broken by product id so the order is stable.
#[must_use]
pub fn revenue_by_product<'a>(
    dataset: &Dataset,
    records: impl IntoIterator<Item = &'a MarketRecord>,
) -> Vec<ProductRevenue> {
    let mut sums: BTreeMap<u32, f64> = BTreeMap::new();
    for record in records {
        *sums.entry(record.product_id()).or_default() += record.revenue();
    }
    let mut rows: Vec<ProductRevenue> = sums
        .into_iter()
        .map(|(product_id, revenue)| ProductRevenue {
            product_id,
            name: dataset
                .product(product_id)
                .map_or_else(|| format!("Product {product_id}"), |p| p.name.clone()),
            revenue: round_cents(revenue),
        })
        .collect();
    rows.sort_by(|a, b| {
        b.revenue
            .total_cmp(&a.revenue)
            .then(a.product_id.cmp(&b.product_id))
    });
    rows
}

/// Compares the revenue of the two most recent years present.
///
/// Returns `None` when the records span fewer than two years.
#[must_use]
pub fn year_over_year<'a>(
    records: impl IntoIterator<Item = &'a MarketRecord>,
) -> Option<YearOverYear> {
    let mut by_year: BTreeMap<i32, f64> = BTreeMap::new();
    for record in records {
        *by_year.entry(record.date().year()).or_default() += record.revenue();
    }
    let mut recent = by_year.into_iter().rev();
    let (latest_year, latest_revenue) = recent.next()?;
    let (previous_year, previous_revenue) = recent.next()?;
    Some(YearOverYear {
        previous_year,
        previous_revenue: round_cents(previous_revenue),
        latest_year,
        latest_revenue: round_cents(latest_revenue),
    })
}

/// Total revenue of the records.
#[must_use]
pub fn total_revenue<'a>(records: impl IntoIterator<Item = &'a MarketRecord>) -> f64 {
    round_cents(records.into_iter().map(MarketRecord::revenue).sum())
}

/// Mean unit price per category, in category order.
///
/// Categories without products are omitted.
#[must_use]
pub fn average_price_by_category<'a>(
    products: impl IntoIterator<Item = &'a Product>,
) -> Vec<CategoryPrice> {
    let mut sums: HashMap<ProductCategory, (f64, usize)> = HashMap::new();
    for product in products {
        let entry = sums.entry(product.category).or_default();
        entry.0 += product.unit_price;
        entry.1 += 1;
    }
    ProductCategory::ALL
        .iter()
        .filter_map(|category| {
            let (sum, count) = sums.get(category)?;
            let divisor = f64::from(u32::try_from(*count).ok()?);
            Some(CategoryPrice {
                category: *category,
                average_price: round_cents(sum / divisor),
                products: *count,
            })
        })
        .collect()
}

/// Customer and revenue totals per customer type, in type order.
#[must_use]
pub fn customers_by_type<'a>(
    records: impl IntoIterator<Item = &'a CustomerRecord>,
) -> Vec<CustomerSegment> {
    let mut sums: HashMap<CustomerType, (u64, f64)> = HashMap::new();
    for record in records {
        let entry = sums.entry(record.customer_type).or_default();
        entry.0 += u64::from(record.customer_count);
        entry.1 += record.revenue;
    }
    CustomerType::ALL
        .iter()
        .map(|customer_type| {
            let (customers, revenue) = sums.get(customer_type).copied().unwrap_or_default();
            CustomerSegment {
                customer_type: *customer_type,
                customers,
                revenue: round_cents(revenue),
            }
        })
        .collect()
}

/// Active customers per month, oldest first.
#[must_use]
pub fn customers_by_month<'a>(
    records: impl IntoIterator<Item = &'a CustomerRecord>,
) -> Vec<(NaiveDate, u64)> {
    let mut sums: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for record in records {
        *sums.entry(record.month).or_default() += u64::from(record.customer_count);
    }
    sums.into_iter().collect()
}

/// Fraction of producers that are organic or regenerative.
///
/// Returns `0.0` for an empty slice.
#[must_use]
pub fn sustainable_share<'a>(producers: impl IntoIterator<Item = &'a Producer>) -> f64 {
    let (sustainable, total) = producers
        .into_iter()
        .fold((0_u32, 0_u32), |(sustainable, total), producer| {
            (
                sustainable + u32::from(producer.is_sustainable()),
                total + 1,
            )
        });
    if total == 0 {
        return 0.0;
    }
    f64::from(sustainable) / f64::from(total)
}

/// Sums every carbon column.
#[must_use]
pub fn carbon_totals<'a>(records: impl IntoIterator<Item = &'a CarbonRecord>) -> CarbonTotals {
    let sums = records
        .into_iter()
        .fold(CarbonTotals::default(), |acc, record| CarbonTotals {
            transport: acc.transport + record.transport_emissions(),
            farming: acc.farming + record.farming_emissions(),
            total: acc.total + record.total_emissions(),
            sequestration: acc.sequestration + record.carbon_sequestration(),
            net: acc.net + record.net_impact(),
        });
    CarbonTotals {
        transport: round_cents(sums.transport),
        farming: round_cents(sums.farming),
        total: round_cents(sums.total),
        sequestration: round_cents(sums.sequestration),
        net: round_cents(sums.net),
    }
}

/// Emissions of each listed producer, highest total first.
///
/// Producers without a carbon record are skipped.
#[must_use]
pub fn emissions_by_producer<'a>(
    dataset: &Dataset,
    producers: impl IntoIterator<Item = &'a Producer>,
) -> Vec<ProducerEmissions> {
    let mut rows: Vec<ProducerEmissions> = producers
        .into_iter()
        .filter_map(|producer| {
            let record = dataset.carbon_for(producer.id)?;
            Some(ProducerEmissions {
                producer_id: producer.id,
                name: producer.name.clone(),
                total: round_cents(record.total_emissions()),
                net: round_cents(record.net_impact()),
            })
        })
        .collect();
    rows.sort_by(|a, b| {
        b.total
            .total_cmp(&a.total)
            .then(a.producer_id.cmp(&b.producer_id))
    });
    rows
}
