//! Product star ratings and the aggregate kept on each product.
//!
//! A product stores the running sum of stars (`total`) and the number of
//! ratings (`count`). Each customer has at most one rating per product, so a
//! re-rate replaces the previous stars instead of adding a new review.

use serde::{Deserialize, Serialize};

/// Error for star values outside 1..=5.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Rating must be between 1 and 5 stars.")]
pub struct RatingError;

/// A star rating from 1 to 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Stars(u8);

impl Stars {
    pub const MAX: u8 = 5;

    /// # Errors
    ///
    /// Returns [`RatingError`] unless `value` is in 1..=5.
    pub fn new(value: i32) -> Result<Self, RatingError> {
        u8::try_from(value)
            .ok()
            .filter(|v| (1..=Self::MAX).contains(v))
            .map(Self)
            .ok_or(RatingError)
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i32> for Stars {
    type Error = RatingError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Stars> for i32 {
    fn from(stars: Stars) -> Self {
        Self::from(stars.0)
    }
}

/// Running sum and count of a product's ratings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RatingAggregate {
    pub total: i32,
    pub count: i32,
}

impl RatingAggregate {
    #[must_use]
    pub const fn new(total: i32, count: i32) -> Self {
        Self { total, count }
    }

    /// Fold one customer's rating into the aggregate.
    ///
    /// `previous` is that customer's earlier rating of the same product, if
    /// any. A first rating bumps the count; a re-rate only moves the sum.
    #[must_use]
    pub fn apply(self, previous: Option<Stars>, new: Stars) -> Self {
        let new = i32::from(new);
        match previous {
            Some(old) => Self {
                total: self.total - i32::from(old) + new,
                count: self.count,
            },
            None => Self {
                total: self.total + new,
                count: self.count + 1,
            },
        }
    }

    /// Mean stars, or `None` when nobody has rated yet.
    #[must_use]
    pub fn average(&self) -> Option<f64> {
        (self.count > 0).then(|| f64::from(self.total) / f64::from(self.count))
    }

    /// `"4.5"`, or `"New"` for an unrated product.
    #[must_use]
    pub fn display(&self) -> String {
        self.average()
            .map_or_else(|| "New".to_owned(), |avg| format!("{avg:.1}"))
    }

    /// Number of filled stars to draw (0..=5).
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn rounded_stars(&self) -> u8 {
        self.average()
            .map_or(0, |avg| avg.round().clamp(0.0, f64::from(Stars::MAX)) as u8)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn stars(n: i32) -> Stars {
        Stars::new(n).unwrap()
    }

    #[test]
    fn test_stars_bounds() {
        assert!(Stars::new(0).is_err());
        assert!(Stars::new(6).is_err());
        assert!(Stars::new(-3).is_err());
        assert_eq!(stars(5).get(), 5);
    }

    #[test]
    fn test_first_rating_increments_count() {
        let agg = RatingAggregate::default().apply(None, stars(4));
        assert_eq!(agg, RatingAggregate::new(4, 1));
        let agg = agg.apply(None, stars(5));
        assert_eq!(agg, RatingAggregate::new(9, 2));
    }

    #[test]
    fn test_rerate_adjusts_sum_only() {
        let agg = RatingAggregate::new(9, 2).apply(Some(stars(4)), stars(1));
        assert_eq!(agg, RatingAggregate::new(6, 2));
    }

    #[test]
    fn test_display() {
        assert_eq!(RatingAggregate::default().display(), "New");
        assert_eq!(RatingAggregate::new(9, 2).display(), "4.5");
        assert_eq!(RatingAggregate::new(14, 3).display(), "4.7");
    }

    #[test]
    fn test_rounded_stars() {
        assert_eq!(RatingAggregate::default().rounded_stars(), 0);
        assert_eq!(RatingAggregate::new(9, 2).rounded_stars(), 5);
        assert_eq!(RatingAggregate::new(13, 4).rounded_stars(), 3);
    }

    #[test]
    fn test_stars_deserialize_checks_range() {
        assert!(serde_json::from_str::<Stars>("3").is_ok());
        assert!(serde_json::from_str::<Stars>("9").is_err());
    }
}
