//! Catalogue helpers: in-memory search, availability filtering, price sort.
//!
//! These operate on product lists already fetched from the repository. The
//! linear scan is deliberate; the catalogue for this store is small enough
//! that a search index would be overhead without benefit.

use crate::models::Product;

/// Sort direction for [`sort_by_price`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceOrder {
    #[default]
    LowToHigh,
    HighToLow,
}

/// Case-insensitive substring search over name, description, and tags.
///
/// An empty search term matches everything.
#[must_use]
pub fn search(products: Vec<Product>, term: &str) -> Vec<Product> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return products;
    }

    products
        .into_iter()
        .filter(|p| {
            p.name.to_lowercase().contains(&term)
                || p.description.to_lowercase().contains(&term)
                || p.tags.iter().any(|t| t.to_lowercase().contains(&term))
        })
        .collect()
}

/// Keep only products that can currently be sold.
#[must_use]
pub fn filter_available(products: Vec<Product>) -> Vec<Product> {
    products.into_iter().filter(Product::is_sellable).collect()
}

/// Sort products by price. The sort is stable, so equal-priced products
/// keep their id order.
#[must_use]
pub fn sort_by_price(mut products: Vec<Product>, order: PriceOrder) -> Vec<Product> {
    match order {
        PriceOrder::LowToHigh => products.sort_by(|a, b| a.price.cmp(&b.price)),
        PriceOrder::HighToLow => products.sort_by(|a, b| b.price.cmp(&a.price)),
    }
    products
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;
    use rust_decimal::Decimal;

    use awe_electronics_core::ProductId;

    use super::*;

    fn product(id: i32, name: &str, price: i64, available: i32, tags: &[&str]) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_owned(),
            description: format!("{name} description"),
            price: Decimal::new(price, 2),
            stock: available,
            available,
            discontinued: false,
            created_at: Utc::now(),
            tags: tags.iter().map(|&t| t.to_owned()).collect(),
            images: Vec::new(),
        }
    }

    fn names(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_search_matches_name_description_tags() {
        let products = vec![
            product(1, "USB Cable", 999, 5, &["accessories"]),
            product(2, "Laptop", 129_900, 2, &["computers"]),
            product(3, "Mouse", 2500, 8, &["accessories", "computers"]),
        ];

        assert_eq!(names(&search(products.clone(), "usb")), ["USB Cable"]);
        assert_eq!(
            names(&search(products.clone(), "laptop description")),
            ["Laptop"]
        );
        assert_eq!(
            names(&search(products.clone(), "ACCESSORIES")),
            ["USB Cable", "Mouse"]
        );
        assert!(search(products, "projector").is_empty());
    }

    #[test]
    fn test_search_empty_term_returns_all() {
        let products = vec![product(1, "A", 100, 1, &[]), product(2, "B", 200, 1, &[])];
        assert_eq!(search(products, "  ").len(), 2);
    }

    #[test]
    fn test_filter_available() {
        let mut sold_out = product(2, "Sold Out", 500, 0, &[]);
        sold_out.stock = 3;
        let mut discontinued = product(3, "Old Model", 500, 9, &[]);
        discontinued.discontinued = true;

        let products = vec![product(1, "In Stock", 500, 1, &[]), sold_out, discontinued];
        assert_eq!(names(&filter_available(products)), ["In Stock"]);
    }

    #[test]
    fn test_sort_by_price() {
        let products = vec![
            product(1, "Mid", 2000, 1, &[]),
            product(2, "Cheap", 500, 1, &[]),
            product(3, "Dear", 9000, 1, &[]),
        ];

        assert_eq!(
            names(&sort_by_price(products.clone(), PriceOrder::LowToHigh)),
            ["Cheap", "Mid", "Dear"]
        );
        assert_eq!(
            names(&sort_by_price(products, PriceOrder::HighToLow)),
            ["Dear", "Mid", "Cheap"]
        );
    }

    #[test]
    fn test_sort_by_price_is_stable() {
        let products = vec![
            product(1, "First", 1000, 1, &[]),
            product(2, "Second", 1000, 1, &[]),
        ];
        assert_eq!(
            names(&sort_by_price(products, PriceOrder::LowToHigh)),
            ["First", "Second"]
        );
    }
}
