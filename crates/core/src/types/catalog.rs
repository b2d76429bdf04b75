//! Static product category catalog.
//!
//! Categories are owned by the code, not the database. Products store the
//! category *name*; URLs use the slug.

use serde::Serialize;

/// A product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    pub name: &'static str,
    pub slug: &'static str,
    /// Image key under `/static/images/`.
    pub image: &'static str,
}

impl Category {
    /// Look up a category by its URL slug.
    #[must_use]
    pub fn by_slug(slug: &str) -> Option<&'static Self> {
        CATEGORIES.iter().find(|c| c.slug == slug)
    }

    /// Look up a category by its display name, as stored on products.
    #[must_use]
    pub fn by_name(name: &str) -> Option<&'static Self> {
        CATEGORIES.iter().find(|c| c.name == name)
    }

    /// Path of the category image.
    #[must_use]
    pub fn image_path(&self) -> String {
        format!("/static/images/{}.jpg", self.image)
    }
}

/// Every category, in menu order.
pub const CATEGORIES: [Category; 6] = [
    Category {
        name: "Dates",
        slug: "dates",
        image: "category-dates",
    },
    Category {
        name: "Pure Gur",
        slug: "pure-gur",
        image: "category-gur",
    },
    Category {
        name: "Chia Seeds",
        slug: "chia-seeds",
        image: "category-chia",
    },
    Category {
        name: "Shutki",
        slug: "shutki",
        image: "category-shutki",
    },
    Category {
        name: "Pickles",
        slug: "pickles",
        image: "category-pickles",
    },
    Category {
        name: "Nuts",
        slug: "nuts",
        image: "category-nuts",
    },
];

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::create_slug;

    #[test]
    fn test_lookup() {
        assert_eq!(Category::by_slug("pure-gur").unwrap().name, "Pure Gur");
        assert_eq!(Category::by_name("Chia Seeds").unwrap().slug, "chia-seeds");
        assert!(Category::by_slug("spices").is_none());
        assert!(Category::by_name("dates").is_none());
    }

    #[test]
    fn test_slugs_match_names() {
        for category in &CATEGORIES {
            assert_eq!(create_slug(category.name), category.slug);
        }
    }

    #[test]
    fn test_image_path() {
        assert_eq!(
            CATEGORIES[0].image_path(),
            "/static/images/category-dates.jpg"
        );
    }
}
