//! Request and report records
//!
//! The procedural surface expressed as data, so an ingestion thread can hand
//! requests to the matching thread over a ring buffer and collect reports on
//! the way back. Each request runs to completion before the next; matching
//! never suspends mid-request.

use serde::{Deserialize, Serialize};

use types::errors::BookError;
use types::ids::{OrderId, Symbol, UserId};
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderType, Side};

use crate::book::Submission;
use crate::manager::MarketDataManager;

/// One request to the matching core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Request {
    AddOrder {
        order_type: OrderType,
        user_id: UserId,
        side: Side,
        symbol: Symbol,
        price: Price,
        quantity: Quantity,
    },
    ModifyOrder {
        order_id: OrderId,
        new_price: Price,
        new_quantity: Quantity,
    },
    CancelOrder {
        order_id: OrderId,
    },
    GetOrder {
        order_id: OrderId,
    },
}

/// Outcome of one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Report {
    /// AddOrder or ModifyOrder completed; carries the id and trade stream.
    Submitted(Submission),
    /// CancelOrder completed; cancels emit no trades.
    Canceled(OrderId),
    /// GetOrder snapshot.
    Order(Order),
    /// Operational failure, surfaced as-is.
    Rejected(BookError),
}

impl MarketDataManager {
    /// Apply one request to completion and report the outcome.
    pub fn apply(&mut self, request: Request) -> Report {
        match request {
            Request::AddOrder {
                order_type,
                user_id,
                side,
                symbol,
                price,
                quantity,
            } => Report::Submitted(
                self.add_order(order_type, user_id, side, symbol, price, quantity),
            ),
            Request::ModifyOrder {
                order_id,
                new_price,
                new_quantity,
            } => match self.modify_order(order_id, new_price, new_quantity) {
                Ok(submission) => Report::Submitted(submission),
                Err(err) => Report::Rejected(err),
            },
            Request::CancelOrder { order_id } => match self.cancel_order(order_id) {
                Ok(()) => Report::Canceled(order_id),
                Err(err) => Report::Rejected(err),
            },
            Request::GetOrder { order_id } => match self.get_order(order_id) {
                Ok(order) => Report::Order(order.clone()),
                Err(err) => Report::Rejected(err),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msft() -> Symbol {
        Symbol::new("MSFT").unwrap()
    }

    fn add(user: &str, side: Side, price: u64, quantity: u64) -> Request {
        Request::AddOrder {
            order_type: OrderType::Limit,
            user_id: user.to_string(),
            side,
            symbol: msft(),
            price: Price::new(price),
            quantity: Quantity::new(quantity),
        }
    }

    #[test]
    fn test_apply_add_and_match() {
        let mut manager = MarketDataManager::new();

        let Report::Submitted(first) = manager.apply(add("buyer", Side::Buy, 100, 50))
        else {
            panic!("expected Submitted");
        };
        assert!(first.trades.is_empty());

        let Report::Submitted(second) = manager.apply(add("seller", Side::Sell, 100, 50))
        else {
            panic!("expected Submitted");
        };
        assert_eq!(second.trades.len(), 1);
    }

    #[test]
    fn test_apply_cancel_and_get() {
        let mut manager = MarketDataManager::new();
        let Report::Submitted(submission) = manager.apply(add("b", Side::Buy, 100, 10))
        else {
            panic!("expected Submitted");
        };
        let order_id = submission.order_id.unwrap();

        let Report::Order(order) = manager.apply(Request::GetOrder { order_id }) else {
            panic!("expected Order");
        };
        assert_eq!(order.user_id, "b");

        assert_eq!(
            manager.apply(Request::CancelOrder { order_id }),
            Report::Canceled(order_id)
        );
        assert_eq!(
            manager.apply(Request::CancelOrder { order_id }),
            Report::Rejected(BookError::UnknownOrder { order_id })
        );
    }

    #[test]
    fn test_apply_rejects_unknown_book() {
        let mut manager = MarketDataManager::new();
        let order_id = OrderId::new(msft(), 1);

        assert_eq!(
            manager.apply(Request::CancelOrder { order_id }),
            Report::Rejected(BookError::UnknownBook { symbol: msft() })
        );
    }

    #[test]
    fn test_request_serialization() {
        let request = add("b", Side::Buy, 100, 10);
        let json = serde_json::to_string(&request).unwrap();
        let deserialized: Request = serde_json::from_str(&json).unwrap();
        assert_eq!(request, deserialized);
    }
}
