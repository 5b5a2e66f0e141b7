//! Product catalog and the seed inventory.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Category value that disables category filtering.
pub const ALL_CATEGORIES: &str = "All";

const PLACEHOLDER_IMAGE: &str = "https://placehold.co/400x400.png";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub category: String,
    pub stock: u32,
    pub description: String,
    pub image: String,
}

/// Catalog filter. Both fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductQuery {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
}

impl ProductQuery {
    pub fn matches(&self, product: &Product) -> bool {
        let category_ok = match self.category.as_deref().map(str::trim) {
            None | Some("") | Some(ALL_CATEGORIES) => true,
            Some(category) => product.category == category,
        };
        let search_ok = match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                product.name.to_lowercase().contains(&term)
                    || product.description.to_lowercase().contains(&term)
            }
        };
        category_ok && search_ok
    }
}

fn product(id: &str, name: &str, cents: i64, category: &str, stock: u32, description: &str) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        price: Decimal::new(cents, 2),
        category: category.to_string(),
        stock,
        description: description.to_string(),
        image: PLACEHOLDER_IMAGE.to_string(),
    }
}

/// The eight products every fresh store starts with.
pub fn seed_products() -> Vec<Product> {
    vec![
        product(
            "1",
            "Pain Reliever (Ibuprofen)",
            899,
            "Pain Relief",
            50,
            "Fast-acting pain relief for headaches, muscle pain, and inflammation.",
        ),
        product(
            "2",
            "Allergy Relief (Loratadine)",
            1250,
            "Allergy",
            30,
            "24-hour non-drowsy allergy relief for seasonal allergies.",
        ),
        product(
            "3",
            "Cold & Flu Syrup",
            1025,
            "Cold & Flu",
            25,
            "Multi-symptom relief for cold and flu symptoms.",
        ),
        product(
            "4",
            "Digital Thermometer",
            1500,
            "Medical Devices",
            20,
            "Accurate digital thermometer for quick temperature readings.",
        ),
        product(
            "5",
            "Adhesive Bandages (Assorted)",
            549,
            "First Aid",
            100,
            "Sterile adhesive bandages in various sizes for minor cuts.",
        ),
        product(
            "6",
            "Vitamin C Gummies",
            999,
            "Vitamins",
            40,
            "Delicious vitamin C gummies to support immune health.",
        ),
        product(
            "7",
            "Antiseptic Wipes",
            475,
            "First Aid",
            60,
            "Sterile antiseptic wipes for wound cleaning and disinfection.",
        ),
        product(
            "8",
            "Hand Sanitizer",
            399,
            "Personal Care",
            80,
            "Alcohol-based hand sanitizer for effective hand hygiene.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(category: Option<&str>, search: Option<&str>) -> ProductQuery {
        ProductQuery {
            category: category.map(str::to_string),
            search: search.map(str::to_string),
        }
    }

    fn ids(q: &ProductQuery) -> Vec<String> {
        seed_products()
            .into_iter()
            .filter(|p| q.matches(p))
            .map(|p| p.id)
            .collect()
    }

    #[test]
    fn seed_has_unique_ids_and_prices() {
        let products = seed_products();
        assert_eq!(products.len(), 8);
        assert_eq!(products[0].price.to_string(), "8.99");
        assert_eq!(products[3].price.to_string(), "15.00");

        let mut seen: Vec<&str> = products.iter().map(|p| p.id.as_str()).collect();
        seen.dedup();
        assert_eq!(seen.len(), 8);
    }

    #[test]
    fn all_and_absent_category_do_not_filter() {
        assert_eq!(ids(&query(None, None)).len(), 8);
        assert_eq!(ids(&query(Some("All"), None)).len(), 8);
    }

    #[test]
    fn category_filter_is_exact() {
        assert_eq!(ids(&query(Some("First Aid"), None)), vec!["5", "7"]);
        assert!(ids(&query(Some("first aid"), None)).is_empty());
    }

    #[test]
    fn search_covers_name_and_description() {
        assert_eq!(ids(&query(None, Some("IBUPROFEN"))), vec!["1"]);
        // Only in descriptions.
        assert_eq!(ids(&query(None, Some("sterile"))), vec!["5", "7"]);
        assert_eq!(ids(&query(Some("First Aid"), Some("wipes"))), vec!["7"]);
    }

    #[test]
    fn price_serializes_as_string() {
        let json = serde_json::to_value(&seed_products()[2]).unwrap();
        assert_eq!(json["price"], "10.25");
    }
}
