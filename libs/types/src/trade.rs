//! Trade execution types
//!
//! Each crossing event pairs two fills: the executing order, whose entire
//! remaining quantity is consumed by the event, and the reducing order, whose
//! remaining quantity is decremented but not necessarily zeroed.

use crate::ids::{OrderId, UserId};
use crate::numeric::{Price, Quantity};
use serde::{Deserialize, Serialize};

/// Whether a fill consumed the order's entire initial quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FillType {
    Full,
    Partial,
}

/// One side of an execution
///
/// `price` is the carried order's own limit price, not the crossing price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeInfo {
    pub fill_type: FillType,
    pub user_id: UserId,
    pub order_id: OrderId,
    pub price: Price,
    pub quantity: Quantity,
}

/// One crossing event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub executing_order: TradeInfo,
    pub reducing_order: TradeInfo,
}

/// The ordered report stream produced by one mutating call
pub type Trades = Vec<Trade>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::Symbol;

    #[test]
    fn test_trade_quantities_balance() {
        let msft = Symbol::new("MSFT").unwrap();
        let trade = Trade {
            executing_order: TradeInfo {
                fill_type: FillType::Full,
                user_id: "buyer".to_string(),
                order_id: OrderId::new(msft, 1),
                price: Price::new(100),
                quantity: Quantity::new(50),
            },
            reducing_order: TradeInfo {
                fill_type: FillType::Partial,
                user_id: "seller".to_string(),
                order_id: OrderId::new(msft, 2),
                price: Price::new(100),
                quantity: Quantity::new(50),
            },
        };

        assert_eq!(
            trade.executing_order.quantity,
            trade.reducing_order.quantity
        );
    }

    #[test]
    fn test_trade_serialization() {
        let msft = Symbol::new("MSFT").unwrap();
        let trade = Trade {
            executing_order: TradeInfo {
                fill_type: FillType::Full,
                user_id: "b".to_string(),
                order_id: OrderId::new(msft, 1),
                price: Price::new(105),
                quantity: Quantity::new(25),
            },
            reducing_order: TradeInfo {
                fill_type: FillType::Partial,
                user_id: "s".to_string(),
                order_id: OrderId::new(msft, 2),
                price: Price::new(105),
                quantity: Quantity::new(25),
            },
        };

        let json = serde_json::to_string(&trade).unwrap();
        let deserialized: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(trade, deserialized);
    }
}
