//! Stock bookkeeping rules shared by checkout and order management.

use crate::OrderStatus;

/// Clamp a requested quantity into `[1, stock]`.
///
/// Returns 0 when the product is out of stock, so callers can refuse the
/// order instead of selling an item that is not there.
#[must_use]
pub fn clamp_quantity(requested: i32, stock: i32) -> i32 {
    if stock < 1 { 0 } else { requested.clamp(1, stock) }
}

/// What an order status change does to product stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockEffect {
    /// Put the ordered quantities back on the shelf.
    Release,
    /// Take the ordered quantities off the shelf again.
    Reserve,
    None,
}

impl StockEffect {
    /// Stock is held by every status except `Cancelled`.
    #[must_use]
    pub fn between(from: OrderStatus, to: OrderStatus) -> Self {
        match (from == OrderStatus::Cancelled, to == OrderStatus::Cancelled) {
            (false, true) => Self::Release,
            (true, false) => Self::Reserve,
            _ => Self::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_quantity() {
        assert_eq!(clamp_quantity(0, 10), 1);
        assert_eq!(clamp_quantity(-4, 10), 1);
        assert_eq!(clamp_quantity(4, 10), 4);
        assert_eq!(clamp_quantity(25, 10), 10);
        assert_eq!(clamp_quantity(3, 0), 0);
    }

    #[test]
    fn test_stock_effects() {
        use OrderStatus::{Cancelled, Delivered, Pending, Shipped};
        assert_eq!(StockEffect::between(Pending, Cancelled), StockEffect::Release);
        assert_eq!(StockEffect::between(Shipped, Cancelled), StockEffect::Release);
        assert_eq!(StockEffect::between(Cancelled, Pending), StockEffect::Reserve);
        assert_eq!(StockEffect::between(Pending, Delivered), StockEffect::None);
        assert_eq!(StockEffect::between(Cancelled, Cancelled), StockEffect::None);
    }
}
