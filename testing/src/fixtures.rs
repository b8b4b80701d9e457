//! Fixture builders for test data.

use booklane_gateway::{BillingDetails, CardDetails, Price, Product, ProductId, UserProfile};

/// Build a catalog product.
#[must_use]
pub fn product(id: &str, category: &str, price: u64, rating: f32) -> Product {
    Product {
        id: ProductId::from(id),
        title: format!("Book {id}"),
        description: format!("Description of book {id}"),
        category: category.to_owned(),
        price: Price {
            current: price,
            original: price,
            discount: 0,
        },
        rating,
        stock: 10,
        cover_image: String::new(),
    }
}

/// Build a user profile.
#[must_use]
pub fn user(email: &str) -> UserProfile {
    UserProfile {
        id: "u-test".to_owned(),
        name: "Test User".to_owned(),
        email: email.to_owned(),
        created_at: None,
    }
}

/// A test card that mock providers accept.
#[must_use]
pub fn card() -> CardDetails {
    CardDetails {
        number: "4242424242424242".to_owned(),
        exp_month: 12,
        exp_year: 2030,
        cvc: "123".to_owned(),
    }
}

/// Billing details matching [`user`].
#[must_use]
pub fn billing(email: &str) -> BillingDetails {
    BillingDetails {
        name: "Test User".to_owned(),
        email: email.to_owned(),
        line1: "1 Test Street".to_owned(),
        city: "Testville".to_owned(),
        postal_code: "00001".to_owned(),
        country: "IN".to_owned(),
    }
}
