use vt_types::Product;

/// Search term plus inclusive price bounds over the active products.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub search: String,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
}

impl ProductFilter {
    pub fn is_empty(&self) -> bool {
        self.search.trim().is_empty() && self.price_min.is_none() && self.price_max.is_none()
    }

    pub fn matches(&self, product: &Product) -> bool {
        let term = self.search.trim().to_lowercase();
        let matches_search = term.is_empty()
            || [&product.title, &product.brand, &product.category]
                .iter()
                .any(|field| field.to_lowercase().contains(&term));

        let min = self.price_min.unwrap_or(0.0);
        let max = self.price_max.unwrap_or(f64::INFINITY);
        let matches_price = product
            .price
            .as_decimal()
            .is_some_and(|price| price >= min && price <= max);

        matches_search && matches_price
    }

    /// Matching products with their index in `products`.
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<(usize, &'a Product)> {
        products
            .iter()
            .enumerate()
            .filter(|(_, product)| self.matches(product))
            .collect()
    }
}
