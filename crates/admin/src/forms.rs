//! Back-office forms.

use serde::Deserialize;

use afrah_core::{CATEGORIES, Category, Email, OrderStatus, Taka, ValidationErrors};
use afrah_store::models::{Product, ProductInput};

const MIN_PASSWORD_LENGTH: usize = 6;

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
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.add(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LENGTH} characters."),
            );
        }
        errors.into_result()
    }
}

/// The add/edit product form. Numbers stay strings so bad input
/// re-renders as typed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub original_price: String,
    #[serde(default)]
    pub stock: String,
    #[serde(default)]
    pub category: String,
    /// One image URL per line.
    #[serde(default)]
    pub images: String,
    /// Checkbox: present when ticked.
    pub is_new: Option<String>,
}

impl ProductForm {
    /// Pre-filled form for editing `product`.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price.plain(),
            original_price: product
                .original_price
                .map(|p| p.plain())
                .unwrap_or_default(),
            stock: product.stock.to_string(),
            category: product.category.clone(),
            images: product.images.join("\n"),
            is_new: product.is_new.then(|| "on".to_owned()),
        }
    }

    #[must_use]
    pub const fn is_new(&self) -> bool {
        self.is_new.is_some()
    }

    /// Image URLs, one per non-blank line.
    #[must_use]
    pub fn image_urls(&self) -> Vec<String> {
        self.images
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_owned)
            .collect()
    }

    /// # Errors
    ///
    /// Returns every field that failed.
    pub fn validate(&self) -> Result<ProductInput, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.min_chars("name", &self.name, 3, "Product name must be at least 3 characters.");
        errors.min_chars(
            "description",
            &self.description,
            10,
            "Description must be at least 10 characters.",
        );

        let price = errors.check(
            "price",
            Taka::parse_non_negative(&self.price).map_err(|_| "Price must be a positive number."),
        );
        let original_price = if self.original_price.trim().is_empty() {
            None
        } else {
            errors.check(
                "original_price",
                Taka::parse_non_negative(&self.original_price)
                    .map_err(|_| "Original price must be a positive number."),
            )
        };
        let stock = errors.check(
            "stock",
            self.stock
                .trim()
                .parse::<i32>()
                .ok()
                .filter(|n| *n >= 0)
                .ok_or("Stock must be a positive number."),
        );
        let category = errors.check(
            "category",
            Category::by_name(self.category.trim()).ok_or("Please select a category."),
        );
        errors.min_chars(
            "images",
            &self.images,
            10,
            "Please provide at least one valid image URL.",
        );

        match (price, stock, category) {
            (Some(price), Some(stock), Some(category)) if errors.is_empty() => Ok(ProductInput {
                name: self.name.trim().to_owned(),
                description: self.description.trim().to_owned(),
                category: category.name.to_owned(),
                images: self.image_urls(),
                price,
                original_price,
                stock,
                is_new: self.is_new(),
            }),
            _ => Err(errors),
        }
    }

    /// Category choices for the select.
    #[must_use]
    pub fn categories(&self) -> &'static [Category] {
        &CATEGORIES
    }
}

/// `POST /orders/{id}/status`
#[derive(Debug, Clone, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

impl StatusForm {
    /// # Errors
    ///
    /// Returns an error on `status` for an unknown status.
    pub fn validate(&self) -> Result<OrderStatus, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors
            .check("status", self.status.parse::<OrderStatus>())
            .ok_or(errors)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product_form() -> ProductForm {
        ProductForm {
            name: "Premium Ajwa Dates".into(),
            description: "Soft, dark dates from Madinah. 500g box.".into(),
            price: "1450".into(),
            original_price: String::new(),
            stock: "25".into(),
            category: "Dates".into(),
            images: "https://cdn.afrah.com/ajwa-1.jpg\n\n  https://cdn.afrah.com/ajwa-2.jpg  \n".into(),
            is_new: Some("on".into()),
        }
    }

    #[test]
    fn test_valid_product() {
        let input = product_form().validate().unwrap();
        assert_eq!(input.name, "Premium Ajwa Dates");
        assert_eq!(input.price, Taka::from_whole(1450));
        assert_eq!(input.original_price, None);
        assert_eq!(input.stock, 25);
        assert_eq!(
            input.images,
            vec![
                "https://cdn.afrah.com/ajwa-1.jpg".to_owned(),
                "https://cdn.afrah.com/ajwa-2.jpg".to_owned(),
            ]
        );
        assert!(input.is_new);
    }

    #[test]
    fn test_product_messages() {
        let form = ProductForm {
            name: "Ba".into(),
            description: "short".into(),
            price: "-5".into(),
            original_price: "abc".into(),
            stock: "-1".into(),
            category: "Electronics".into(),
            images: "x.jpg".into(),
            is_new: None,
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("name"), Some("Product name must be at least 3 characters."));
        assert_eq!(errors.get("description"), Some("Description must be at least 10 characters."));
        assert_eq!(errors.get("price"), Some("Price must be a positive number."));
        assert_eq!(
            errors.get("original_price"),
            Some("Original price must be a positive number.")
        );
        assert_eq!(errors.get("stock"), Some("Stock must be a positive number."));
        assert_eq!(errors.get("category"), Some("Please select a category."));
        assert_eq!(errors.get("images"), Some("Please provide at least one valid image URL."));
    }

    #[test]
    fn test_zero_price_and_stock_allowed() {
        let form = ProductForm {
            price: "0".into(),
            stock: "0".into(),
            original_price: "1600.50".into(),
            ..product_form()
        };
        let input = form.validate().unwrap();
        assert_eq!(input.price, Taka::ZERO);
        assert_eq!(input.stock, 0);
        assert_eq!(input.original_price.unwrap().plain(), "1600.5");
    }

    #[test]
    fn test_login_form() {
        let form = LoginForm {
            email: "not-an-email".into(),
            password: "12345".into(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("email"), Some("Please enter a valid email address."));
        assert_eq!(errors.get("password"), Some("Password must be at least 6 characters."));
    }

    #[test]
    fn test_status_form() {
        let form = StatusForm {
            status: "Shipped".into(),
        };
        assert_eq!(form.validate().unwrap(), OrderStatus::Shipped);
        assert!(StatusForm { status: "Lost".into() }.validate().is_err());
    }
}
