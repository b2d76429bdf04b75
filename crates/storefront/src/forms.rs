//! Submitted forms and their validation.
//!
//! Every form keeps the raw strings it was posted with so a failed
//! submission can re-render with the visitor's input intact.

use serde::Deserialize;

use afrah_core::{Email, PaymentMethod, Phone, Stars, UserId, ValidationErrors};
use afrah_store::models::{NewContactMessage, NewOrder};

use crate::services::auth::MIN_PASSWORD_LENGTH;

/// Checkout details, used by "buy now" and by cart checkout.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub payment_method: String,
    /// Only the product page sends a quantity.
    pub quantity: Option<i32>,
}

impl OrderForm {
    /// Form state for a fresh page: cash on delivery preselected.
    #[must_use]
    pub fn blank() -> Self {
        Self {
            payment_method: PaymentMethod::Cod.as_str().to_owned(),
            ..Self::default()
        }
    }

    /// # Errors
    ///
    /// Returns every field that failed.
    pub fn validate(&self, user_id: Option<UserId>) -> Result<NewOrder, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.min_chars("name", &self.name, 2, "Name must be at least 2 characters.");
        errors.min_chars(
            "address",
            &self.address,
            10,
            "Address must be at least 10 characters.",
        );
        let phone = errors.check("phone", Phone::parse(&self.phone));
        let payment_method = errors.check("payment_method", self.payment_method.parse::<PaymentMethod>());

        match (phone, payment_method) {
            (Some(phone), Some(payment_method)) if errors.is_empty() => Ok(NewOrder {
                user_id,
                customer_name: self.name.trim().to_owned(),
                address: self.address.trim().to_owned(),
                phone,
                payment_method,
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub message: String,
}

impl ContactForm {
    /// The phone is optional, but a filled-in phone must be valid.
    ///
    /// # Errors
    ///
    /// Returns every field that failed.
    pub fn validate(&self) -> Result<NewContactMessage, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.min_chars("name", &self.name, 2, "Name must be at least 2 characters.");
        let email = errors.check("email", Email::parse(&self.email));
        let phone = if self.phone.trim().is_empty() {
            None
        } else {
            errors.check("phone", Phone::parse(&self.phone))
        };
        errors.min_chars("subject", &self.subject, 5, "Subject must be at least 5 characters.");
        errors.min_chars(
            "message",
            &self.message,
            10,
            "Message must be at least 10 characters.",
        );

        match email {
            Some(email) if errors.is_empty() => Ok(NewContactMessage {
                name: self.name.trim().to_owned(),
                email,
                phone,
                subject: self.subject.trim().to_owned(),
                message: self.message.trim().to_owned(),
            }),
            _ => Err(errors),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    /// # Errors
    ///
    /// Returns every field that failed.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check("email", Email::parse(&self.email));
        if self.password.is_empty() {
            errors.add("password", "Please enter your password.");
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl SignupForm {
    /// # Errors
    ///
    /// Returns every field that failed.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.min_chars(
            "display_name",
            &self.display_name,
            2,
            "Name must be at least 2 characters.",
        );
        errors.check("email", Email::parse(&self.email));
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.add(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LENGTH} characters."),
            );
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RateForm {
    pub stars: i32,
}

impl RateForm {
    /// # Errors
    ///
    /// Returns an error on the `stars` field outside 1 to 5.
    pub fn validate(&self) -> Result<Stars, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.check("stars", Stars::new(self.stars)).ok_or(errors)
    }
}
