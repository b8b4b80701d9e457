//! Catalog filter engine.
//!
//! Pure derivation of a filtered product list from the raw catalog and a
//! set of criteria. Stateless - recomputed on any criteria change or
//! catalog reload - and stable: output preserves the input catalog's
//! order.

use booklane_gateway::Product;

/// Category criterion: everything, or one exact category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    /// Match every category
    #[default]
    All,
    /// Match one category exactly
    Only(String),
}

impl CategoryFilter {
    fn matches(&self, category: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == category,
        }
    }
}

/// Filter criteria; all predicates are ANDed.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    /// Category to match
    pub category: CategoryFilter,
    /// Inclusive `[min, max]` range on the current price
    pub price_range: (u64, u64),
    /// Minimum rating; 0 disables the predicate
    pub min_rating: f32,
    /// Case-insensitive substring matched against title, description, and
    /// category; empty matches all
    pub search_query: String,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            category: CategoryFilter::All,
            price_range: (0, 5000),
            min_rating: 0.0,
            search_query: String::new(),
        }
    }
}

impl FilterCriteria {
    fn matches(&self, product: &Product) -> bool {
        let (min_price, max_price) = self.price_range;
        if !self.category.matches(&product.category) {
            return false;
        }
        if product.price.current < min_price || product.price.current > max_price {
            return false;
        }
        if self.min_rating > 0.0 && product.rating < self.min_rating {
            return false;
        }
        if self.search_query.is_empty() {
            return true;
        }
        let query = self.search_query.to_lowercase();
        product.title.to_lowercase().contains(&query)
            || product.description.to_lowercase().contains(&query)
            || product.category.to_lowercase().contains(&query)
    }
}

/// Derive the filtered product list.
#[must_use]
pub fn filter(products: &[Product], criteria: &FilterCriteria) -> Vec<Product> {
    products
        .iter()
        .filter(|product| criteria.matches(product))
        .cloned()
        .collect()
}
