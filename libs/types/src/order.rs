//! Order lifecycle types

use crate::ids::{OrderId, UserId};
use crate::numeric::{Price, Quantity};
use serde::{Deserialize, Serialize};

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order (bid)
    Buy,
    /// Sell order (ask)
    Sell,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Side of the book a price level belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LevelType {
    Bid,
    Ask,
}

impl From<Side> for LevelType {
    fn from(side: Side) -> Self {
        match side {
            Side::Buy => LevelType::Bid,
            Side::Sell => LevelType::Ask,
        }
    }
}

/// Order execution policy
///
/// `GoodForDay` behaves exactly as `Limit` inside the core; the end-of-day
/// purge belongs to the surrounding system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Execute at the best available prices; never rests
    Market,
    /// Rest at the limit price until filled or canceled
    Limit,
    /// Match what is immediately possible, cancel the residual
    FillAndKill,
    /// All-or-none: fill completely or record nothing
    FillOrKill,
    /// Limit order scheduled for an end-of-day purge
    GoodForDay,
}

/// One outstanding instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_type: OrderType,
    pub order_id: OrderId,
    pub user_id: UserId,
    pub side: Side,
    pub price: Price,
    pub initial_quantity: Quantity,
    pub remaining_quantity: Quantity,
}

impl Order {
    /// Decrement the remaining quantity by a fill.
    ///
    /// # Panics
    /// Panics if the fill exceeds the remaining quantity.
    pub fn fill(&mut self, quantity: Quantity) {
        assert!(
            quantity <= self.remaining_quantity,
            "fill would exceed remaining quantity"
        );
        self.remaining_quantity -= quantity;
    }

    /// Whether the order has been completely consumed
    pub fn is_filled(&self) -> bool {
        self.remaining_quantity.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::Symbol;

    fn sample_order() -> Order {
        Order {
            order_type: OrderType::Limit,
            order_id: OrderId::new(Symbol::new("MSFT").unwrap(), 1),
            user_id: "trader".to_string(),
            side: Side::Buy,
            price: Price::new(100),
            initial_quantity: Quantity::new(50),
            remaining_quantity: Quantity::new(50),
        }
    }

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }

    #[test]
    fn test_level_type_from_side() {
        assert_eq!(LevelType::from(Side::Buy), LevelType::Bid);
        assert_eq!(LevelType::from(Side::Sell), LevelType::Ask);
    }

    #[test]
    fn test_order_fill() {
        let mut order = sample_order();

        order.fill(Quantity::new(20));
        assert_eq!(order.remaining_quantity, Quantity::new(30));
        assert!(!order.is_filled());

        order.fill(Quantity::new(30));
        assert!(order.is_filled());
    }

    #[test]
    #[should_panic(expected = "fill would exceed remaining quantity")]
    fn test_overfill_panics() {
        let mut order = sample_order();
        order.fill(Quantity::new(51));
    }

    #[test]
    fn test_order_serialization() {
        let order = sample_order();
        let json = serde_json::to_string(&order).unwrap();
        let deserialized: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order, deserialized);
    }
}
