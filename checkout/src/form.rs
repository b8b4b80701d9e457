//! Shipping and billing form.

use booklane_gateway::{BillingDetails, ShippingAddress};
use std::collections::BTreeMap;

/// Required checkout form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FormField {
    /// First name
    FirstName,
    /// Last name
    LastName,
    /// Email address
    Email,
    /// Street address
    Address,
    /// City
    City,
    /// Postal code
    ZipCode,
    /// Country
    Country,
}

impl FormField {
    /// Field key as the form renders it.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FirstName => "firstName",
            Self::LastName => "lastName",
            Self::Email => "email",
            Self::Address => "address",
            Self::City => "city",
            Self::ZipCode => "zipCode",
            Self::Country => "country",
        }
    }
}

impl std::fmt::Display for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const REQUIRED_MESSAGE: &str = "Please fill in this field.";

/// Checkout form state. Fields persist across failed submissions so the
/// user only ever corrects what is wrong.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckoutForm {
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Email address
    pub email: String,
    /// Street address
    pub address: String,
    /// City
    pub city: String,
    /// Postal code
    pub zip_code: String,
    /// Country
    pub country: String,
}

impl CheckoutForm {
    /// Presence check across all required fields.
    ///
    /// Returns one message per blank field; an empty map means the form
    /// may proceed.
    #[must_use]
    pub fn validate(&self) -> BTreeMap<FormField, String> {
        let fields = [
            (FormField::FirstName, &self.first_name),
            (FormField::LastName, &self.last_name),
            (FormField::Email, &self.email),
            (FormField::Address, &self.address),
            (FormField::City, &self.city),
            (FormField::ZipCode, &self.zip_code),
            (FormField::Country, &self.country),
        ];

        fields
            .into_iter()
            .filter(|(_, value)| value.trim().is_empty())
            .map(|(field, _)| (field, REQUIRED_MESSAGE.to_owned()))
            .collect()
    }

    /// Billing details for payment-method creation.
    #[must_use]
    pub fn billing_details(&self) -> BillingDetails {
        BillingDetails {
            name: format!("{} {}", self.first_name, self.last_name),
            email: self.email.clone(),
            line1: self.address.clone(),
            city: self.city.clone(),
            postal_code: self.zip_code.clone(),
            country: self.country.clone(),
        }
    }

    /// Shipping address for order placement.
    #[must_use]
    pub fn shipping_address(&self) -> ShippingAddress {
        ShippingAddress {
            address: self.address.clone(),
            city: self.city.clone(),
            state: String::new(),
            zip_code: self.zip_code.clone(),
            country: self.country.clone(),
        }
    }
}
