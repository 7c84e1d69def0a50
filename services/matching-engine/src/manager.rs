//! Symbol-keyed dispatch over order books
//!
//! The manager routes requests to the book for their symbol, creating books
//! lazily on the first order for a new symbol. It holds no matching logic of
//! its own: every mutation happens inside the owning book, one request at a
//! time.

use std::collections::HashMap;

use tracing::debug;

use types::errors::BookError;
use types::ids::{OrderId, Symbol, UserId};
use types::numeric::{Price, Quantity};
use types::order::{Order, OrderType, Side};

use crate::book::{BookConfig, OrderBook, Submission};

/// Dispatcher from symbol to order book.
#[derive(Debug, Default)]
pub struct MarketDataManager {
    books: HashMap<Symbol, OrderBook>,
    config: BookConfig,
}

impl MarketDataManager {
    pub fn new() -> Self {
        Self::with_config(BookConfig::default())
    }

    pub fn with_config(config: BookConfig) -> Self {
        Self {
            books: HashMap::new(),
            config,
        }
    }

    /// Submit an order, creating the symbol's book if it does not exist yet.
    pub fn add_order(
        &mut self,
        order_type: OrderType,
        user_id: UserId,
        side: Side,
        symbol: Symbol,
        price: Price,
        quantity: Quantity,
    ) -> Submission {
        let config = &self.config;
        let book = self.books.entry(symbol).or_insert_with(|| {
            debug!(%symbol, "order book created");
            OrderBook::with_config(symbol, config)
        });
        book.add_order(order_type, user_id, side, price, quantity)
    }

    /// Reprice or resize an order; the book is derived from the id.
    pub fn modify_order(
        &mut self,
        order_id: OrderId,
        new_price: Price,
        new_quantity: Quantity,
    ) -> Result<Submission, BookError> {
        self.book_for_mut(order_id)?
            .modify_order(order_id, new_price, new_quantity)
    }

    /// Cancel an order; the book is derived from the id.
    pub fn cancel_order(&mut self, order_id: OrderId) -> Result<(), BookError> {
        self.book_for_mut(order_id)?.cancel_order(order_id)
    }

    /// Snapshot of a live order.
    pub fn get_order(&self, order_id: OrderId) -> Result<&Order, BookError> {
        self.book_for(order_id)?.get_order(order_id)
    }

    /// The book for a symbol, if one has been created.
    pub fn book(&self, symbol: Symbol) -> Option<&OrderBook> {
        self.books.get(&symbol)
    }

    /// Number of books created so far.
    pub fn book_count(&self) -> usize {
        self.books.len()
    }

    fn book_for(&self, order_id: OrderId) -> Result<&OrderBook, BookError> {
        self.books.get(&order_id.symbol).ok_or(BookError::UnknownBook {
            symbol: order_id.symbol,
        })
    }

    fn book_for_mut(&mut self, order_id: OrderId) -> Result<&mut OrderBook, BookError> {
        self.books
            .get_mut(&order_id.symbol)
            .ok_or(BookError::UnknownBook {
                symbol: order_id.symbol,
            })
    }
}
