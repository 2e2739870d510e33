//! Fixed producer and product catalogue.
//!
//! The catalogue tables are not random: every run starts from the same
//! producers and products so foreign keys stay stable across regenerations.

use crate::error::FieldParseError;
use crate::model::{CategoryList, Certification, Producer, Product, ProductCategory};

struct ProducerEntry {
    id: u32,
    name: &'static str,
    location: &'static str,
    region: &'static str,
    categories: &'static [ProductCategory],
    certification: Certification,
    distance_miles: f64,
    coordinates: Option<(f64, f64)>,
    founded_year: u16,
    employees: u32,
    description: &'static str,
}

struct ProductEntry {
    id: u32,
    name: &'static str,
    category: ProductCategory,
    unit_price: f64,
    unit: &'static str,
    season: &'static str,
    producer_id: u32,
    nutrition_score: Option<u8>,
}

const PRODUCERS: &[ProducerEntry] = &[
    ProducerEntry {
        id: 1,
        name: "Green Valley Farm",
        location: "Petaluma, CA",
        region: "Sonoma County",
        categories: &[ProductCategory::Vegetables, ProductCategory::Eggs],
        certification: Certification::Organic,
        distance_miles: 38.0,
        coordinates: Some((38.2324, -122.6367)),
        founded_year: 1998,
        employees: 12,
        description: "Family-run mixed vegetable farm with a small laying flock.",
    },
    ProducerEntry {
        id: 2,
        name: "Sunrise Orchards",
        location: "Sebastopol, CA",
        region: "Sonoma County",
        categories: &[ProductCategory::Fruits],
        certification: Certification::Regenerative,
        distance_miles: 52.0,
        coordinates: Some((38.4021, -122.8239)),
        founded_year: 1985,
        employees: 18,
        description: "Dry-farmed heritage apple and pear orchards under cover crops.",
    },
    ProducerEntry {
        id: 3,
        name: "Happy Hen Ranch",
        location: "Half Moon Bay, CA",
        region: "San Mateo Coast",
        categories: &[ProductCategory::Eggs, ProductCategory::Meat],
        certification: Certification::Regenerative,
        distance_miles: 28.0,
        coordinates: Some((37.4636, -122.4286)),
        founded_year: 2009,
        employees: 6,
        description: "Rotationally grazed poultry on coastal pasture.",
    },
    ProducerEntry {
        id: 4,
        name: "Bayside Creamery",
        location: "Point Reyes Station, CA",
        region: "Marin County",
        categories: &[ProductCategory::Dairy],
        certification: Certification::Organic,
        distance_miles: 36.0,
        coordinates: Some((38.0690, -122.8069)),
        founded_year: 1972,
        employees: 22,
        description: "Grass-fed Jersey herd producing milk and farmhouse cheese.",
    },
    ProducerEntry {
        id: 5,
        name: "Golden Grain Co-op",
        location: "Davis, CA",
        region: "Sacramento Valley",
        categories: &[ProductCategory::Grains],
        certification: Certification::Conventional,
        distance_miles: 72.0,
        coordinates: Some((38.5449, -121.7405)),
        founded_year: 1990,
        employees: 30,
        description: "Grower cooperative milling wheat and heirloom corn.",
    },
    ProducerEntry {
        id: 6,
        name: "Mission Street Greens",
        location: "San Francisco, CA",
        region: "San Francisco",
        categories: &[ProductCategory::Vegetables],
        certification: Certification::Organic,
        distance_miles: 3.5,
        coordinates: Some((37.7599, -122.4148)),
        founded_year: 2015,
        employees: 4,
        description: "Urban rooftop and lot farm growing salad greens and squash.",
    },
    ProducerEntry {
        id: 7,
        name: "Valley Ridge Beef",
        location: "Dixon, CA",
        region: "Solano County",
        categories: &[ProductCategory::Meat],
        certification: Certification::Conventional,
        distance_miles: 64.0,
        coordinates: Some((38.4455, -121.8233)),
        founded_year: 1964,
        employees: 15,
        description: "Cow-calf operation finishing cattle on irrigated pasture.",
    },
    ProducerEntry {
        id: 8,
        name: "Blossom Apiary",
        location: "Napa, CA",
        region: "Napa Valley",
        categories: &[ProductCategory::Honey, ProductCategory::Fruits],
        certification: Certification::Regenerative,
        distance_miles: 48.0,
        coordinates: Some((38.2975, -122.2869)),
        founded_year: 2003,
        employees: 5,
        description: "Hives placed across vineyard cover crops, plus a citrus grove.",
    },
    ProducerEntry {
        id: 9,
        name: "Coastal Berry Farm",
        location: "Watsonville, CA",
        region: "Pajaro Valley",
        categories: &[ProductCategory::Fruits, ProductCategory::Vegetables],
        certification: Certification::Conventional,
        distance_miles: 92.0,
        coordinates: None,
        founded_year: 1979,
        employees: 40,
        description: "Large berry and brassica grower supplying regional retailers.",
    },
    ProducerEntry {
        id: 10,
        name: "Hillside Goat Dairy",
        location: "Pescadero, CA",
        region: "San Mateo Coast",
        categories: &[ProductCategory::Dairy, ProductCategory::Meat],
        certification: Certification::Organic,
        distance_miles: 45.0,
        coordinates: Some((37.2552, -122.3830)),
        founded_year: 2011,
        employees: 9,
        description: "Small goat dairy making fresh chevre.",
    },
];

const PRODUCTS: &[ProductEntry] = &[
    ProductEntry {
        id: 1,
        name: "Heirloom Tomatoes",
        category: ProductCategory::Vegetables,
        unit_price: 4.50,
        unit: "lb",
        season: "Summer",
        producer_id: 1,
        nutrition_score: Some(85),
    },
    ProductEntry {
        id: 2,
        name: "Rainbow Chard",
        category: ProductCategory::Vegetables,
        unit_price: 3.25,
        unit: "bunch",
        season: "Spring/Fall",
        producer_id: 1,
        nutrition_score: Some(92),
    },
    ProductEntry {
        id: 3,
        name: "Farm Fresh Eggs",
        category: ProductCategory::Eggs,
        unit_price: 6.50,
        unit: "dozen",
        season: "Year-round",
        producer_id: 1,
        nutrition_score: Some(78),
    },
    ProductEntry {
        id: 4,
        name: "Gravenstein Apples",
        category: ProductCategory::Fruits,
        unit_price: 2.75,
        unit: "lb",
        season: "Summer/Fall",
        producer_id: 2,
        nutrition_score: Some(80),
    },
    ProductEntry {
        id: 5,
        name: "Bartlett Pears",
        category: ProductCategory::Fruits,
        unit_price: 3.00,
        unit: "lb",
        season: "Fall",
        producer_id: 2,
        nutrition_score: Some(79),
    },
    ProductEntry {
        id: 6,
        name: "Pasture-Raised Eggs",
        category: ProductCategory::Eggs,
        unit_price: 8.00,
        unit: "dozen",
        season: "Year-round",
        producer_id: 3,
        nutrition_score: Some(82),
    },
    ProductEntry {
        id: 7,
        name: "Heritage Chicken",
        category: ProductCategory::Meat,
        unit_price: 6.75,
        unit: "lb",
        season: "Year-round",
        producer_id: 3,
        nutrition_score: Some(70),
    },
    ProductEntry {
        id: 8,
        name: "Whole Milk",
        category: ProductCategory::Dairy,
        unit_price: 5.50,
        unit: "half gallon",
        season: "Year-round",
        producer_id: 4,
        nutrition_score: Some(72),
    },
    ProductEntry {
        id: 9,
        name: "Aged Farmhouse Cheddar",
        category: ProductCategory::Dairy,
        unit_price: 12.00,
        unit: "lb",
        season: "Year-round",
        producer_id: 4,
        nutrition_score: Some(60),
    },
    ProductEntry {
        id: 10,
        name: "Whole Wheat Flour",
        category: ProductCategory::Grains,
        unit_price: 2.25,
        unit: "lb",
        season: "Year-round",
        producer_id: 5,
        nutrition_score: Some(75),
    },
    ProductEntry {
        id: 11,
        name: "Heirloom Polenta",
        category: ProductCategory::Grains,
        unit_price: 3.50,
        unit: "lb",
        season: "Fall/Winter",
        producer_id: 5,
        nutrition_score: None,
    },
    ProductEntry {
        id: 12,
        name: "Spring Salad Mix",
        category: ProductCategory::Vegetables,
        unit_price: 5.00,
        unit: "bag",
        season: "Spring",
        producer_id: 6,
        nutrition_score: Some(95),
    },
    ProductEntry {
        id: 13,
        name: "Winter Squash",
        category: ProductCategory::Vegetables,
        unit_price: 2.50,
        unit: "lb",
        season: "Fall/Winter",
        producer_id: 6,
        nutrition_score: Some(86),
    },
    ProductEntry {
        id: 14,
        name: "Grass-Fed Ground Beef",
        category: ProductCategory::Meat,
        unit_price: 9.50,
        unit: "lb",
        season: "Year-round",
        producer_id: 7,
        nutrition_score: Some(68),
    },
    ProductEntry {
        id: 15,
        name: "Ribeye Steak",
        category: ProductCategory::Meat,
        unit_price: 22.00,
        unit: "lb",
        season: "Year-round",
        producer_id: 7,
        nutrition_score: Some(65),
    },
    ProductEntry {
        id: 16,
        name: "Wildflower Honey",
        category: ProductCategory::Honey,
        unit_price: 11.00,
        unit: "jar",
        season: "Year-round",
        producer_id: 8,
        nutrition_score: None,
    },
    ProductEntry {
        id: 17,
        name: "Meyer Lemons",
        category: ProductCategory::Fruits,
        unit_price: 3.75,
        unit: "lb",
        season: "Winter",
        producer_id: 8,
        nutrition_score: Some(84),
    },
    ProductEntry {
        id: 18,
        name: "Strawberries",
        category: ProductCategory::Fruits,
        unit_price: 5.50,
        unit: "basket",
        season: "Spring/Summer",
        producer_id: 9,
        nutrition_score: Some(90),
    },
    ProductEntry {
        id: 19,
        name: "Brussels Sprouts",
        category: ProductCategory::Vegetables,
        unit_price: 3.80,
        unit: "lb",
        season: "Winter",
        producer_id: 9,
        nutrition_score: Some(91),
    },
    ProductEntry {
        id: 20,
        name: "Chevre",
        category: ProductCategory::Dairy,
        unit_price: 8.50,
        unit: "tub",
        season: "Year-round",
        producer_id: 10,
        nutrition_score: Some(66),
    },
];

/// Builds the producer table.
///
/// # Errors
///
/// Returns [`FieldParseError`] if an entry has no categories.
pub fn producers() -> Result<Vec<Producer>, FieldParseError> {
    PRODUCERS
        .iter()
        .map(|entry| {
            Ok(Producer {
                id: entry.id,
                name: entry.name.to_owned(),
                location: entry.location.to_owned(),
                region: entry.region.to_owned(),
                categories: CategoryList::new(entry.categories.to_vec())?,
                certification: entry.certification,
                distance_miles: entry.distance_miles,
                latitude: entry.coordinates.map(|(lat, _)| lat),
                longitude: entry.coordinates.map(|(_, lon)| lon),
                founded_year: entry.founded_year,
                employees: entry.employees,
                description: entry.description.to_owned(),
            })
        })
        .collect()
}

/// Builds the product table.
///
/// # Errors
///
/// Returns [`FieldParseError`] if an entry's season tag does not parse.
pub fn products() -> Result<Vec<Product>, FieldParseError> {
    PRODUCTS
        .iter()
        .map(|entry| {
            Ok(Product {
                id: entry.id,
                name: entry.name.to_owned(),
                category: entry.category,
                unit_price: entry.unit_price,
                unit: entry.unit.to_owned(),
                season: entry.season.parse()?,
                producer_id: entry.producer_id,
                nutrition_score: entry.nutrition_score,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn every_product_references_a_catalogue_producer() {
        let producer_ids: HashSet<u32> = producers()
            .expect("catalogue producers")
            .iter()
            .map(|p| p.id)
            .collect();
        for product in products().expect("catalogue products") {
            assert!(
                producer_ids.contains(&product.producer_id),
                "product {} has dangling producer {}",
                product.id,
                product.producer_id
            );
        }
    }

    #[test]
    fn catalogue_covers_every_certification() {
        let producers = producers().expect("catalogue producers");
        for cert in Certification::ALL {
            assert!(producers.iter().any(|p| p.certification == cert));
        }
    }

    #[test]
    fn products_are_positively_priced() {
        assert!(
            products()
                .expect("catalogue products")
                .iter()
                .all(|p| p.unit_price > 0.0)
        );
    }
}
