//! Demo catalog.
//!
//! Seeding is keyed on the product slug: products that already exist are
//! left alone, so the command can be re-run after editing the list.

use sqlx::PgPool;

use afrah_core::{Taka, create_slug};
use afrah_store::models::ProductInput;
use afrah_store::{ProductRepository, RepositoryError};

struct DemoProduct {
    name: &'static str,
    category: &'static str,
    description: &'static str,
    price: i64,
    original_price: Option<i64>,
    stock: i32,
    is_new: bool,
}

const DEMO_PRODUCTS: &[DemoProduct] = &[
    DemoProduct {
        name: "Premium Ajwa Dates",
        category: "Dates",
        description: "Soft, dark Ajwa dates from Madinah. 500g box.",
        price: 1450,
        original_price: Some(1600),
        stock: 40,
        is_new: true,
    },
    DemoProduct {
        name: "Medjool Dates",
        category: "Dates",
        description: "Large, caramel-sweet Medjool dates. 1kg pack.",
        price: 2200,
        original_price: None,
        stock: 25,
        is_new: false,
    },
    DemoProduct {
        name: "Khejur Patali Gur",
        category: "Pure Gur",
        description: "Date palm jaggery from Jessore, made fresh each winter.",
        price: 650,
        original_price: Some(720),
        stock: 60,
        is_new: true,
    },
    DemoProduct {
        name: "Akher Gur Block",
        category: "Pure Gur",
        description: "Sugarcane jaggery with no added colour or chemicals. 1kg.",
        price: 280,
        original_price: None,
        stock: 80,
        is_new: false,
    },
    DemoProduct {
        name: "Organic Black Chia Seeds",
        category: "Chia Seeds",
        description: "Cleaned and packed black chia seeds. 250g pouch.",
        price: 450,
        original_price: None,
        stock: 100,
        is_new: false,
    },
    DemoProduct {
        name: "Loitta Shutki",
        category: "Shutki",
        description: "Sun-dried Bombay duck from Cox's Bazar. 250g.",
        price: 520,
        original_price: None,
        stock: 30,
        is_new: false,
    },
    DemoProduct {
        name: "Chingri Shutki",
        category: "Shutki",
        description: "Sun-dried prawns, sorted and cleaned. 250g.",
        price: 780,
        original_price: Some(850),
        stock: 20,
        is_new: true,
    },
    DemoProduct {
        name: "Mango Pickle",
        category: "Pickles",
        description: "Homemade green mango pickle in mustard oil. 400g jar.",
        price: 350,
        original_price: None,
        stock: 45,
        is_new: false,
    },
    DemoProduct {
        name: "Olive Pickle",
        category: "Pickles",
        description: "Sweet and sour Bangladeshi olive pickle. 400g jar.",
        price: 380,
        original_price: None,
        stock: 35,
        is_new: false,
    },
    DemoProduct {
        name: "Roasted Cashew Nuts",
        category: "Nuts",
        description: "Lightly roasted whole cashews, unsalted. 500g.",
        price: 950,
        original_price: Some(1050),
        stock: 50,
        is_new: false,
    },
    DemoProduct {
        name: "California Almonds",
        category: "Nuts",
        description: "Raw California almonds, packed in small batches. 500g.",
        price: 880,
        original_price: None,
        stock: 0,
        is_new: false,
    },
];

impl DemoProduct {
    fn input(&self) -> ProductInput {
        let slug = create_slug(self.name);
        ProductInput {
            name: self.name.to_owned(),
            description: self.description.to_owned(),
            category: self.category.to_owned(),
            images: vec![format!("https://placehold.co/600x600?text={slug}")],
            price: Taka::from_whole(self.price),
            original_price: self.original_price.map(Taka::from_whole),
            stock: self.stock,
            is_new: self.is_new,
        }
    }
}

/// Counts from one seeding run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub inserted: usize,
    pub skipped: usize,
}

/// # Errors
///
/// Returns `RepositoryError` if a lookup or insert fails.
pub async fn run(pool: &PgPool) -> Result<SeedSummary, RepositoryError> {
    let products = ProductRepository::new(pool);
    let mut summary = SeedSummary::default();

    for demo in DEMO_PRODUCTS {
        let slug = create_slug(demo.name);
        if products.get_by_slug(&slug).await?.is_some() {
            tracing::debug!(%slug, "already exists, skipping");
            summary.skipped += 1;
            continue;
        }
        let product = products.create(&demo.input()).await?;
        tracing::info!(product_id = %product.id, %slug, "inserted");
        summary.inserted += 1;
    }

    tracing::info!("Seeding complete!");
    tracing::info!("  Inserted: {}", summary.inserted);
    tracing::info!("  Skipped (already exist): {}", summary.skipped);
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use afrah_core::{CATEGORIES, Category};

    use super::*;

    #[test]
    fn test_every_category_has_products() {
        for category in &CATEGORIES {
            assert!(
                DEMO_PRODUCTS.iter().any(|p| p.category == category.name),
                "no demo product for {}",
                category.name
            );
        }
    }

    #[test]
    fn test_demo_products_are_valid() {
        for demo in DEMO_PRODUCTS {
            assert!(Category::by_name(demo.category).is_some());
            assert!(demo.name.chars().count() >= 3);
            assert!(demo.description.chars().count() >= 10);
            assert!(demo.stock >= 0);
            if let Some(original) = demo.original_price {
                assert!(original > demo.price, "{} discount is inverted", demo.name);
            }
        }
    }

    #[test]
    fn test_slugs_are_unique() {
        let slugs: HashSet<String> = DEMO_PRODUCTS.iter().map(|p| create_slug(p.name)).collect();
        assert_eq!(slugs.len(), DEMO_PRODUCTS.len());
    }

    #[test]
    fn test_input_uses_placeholder_image() {
        let input = DEMO_PRODUCTS[0].input();
        assert_eq!(input.images, vec!["https://placehold.co/600x600?text=premium-ajwa-dates"]);
        assert_eq!(input.price, Taka::from_whole(1450));
    }
}
