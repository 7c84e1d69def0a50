//! Order book infrastructure module
//!
//! Contains the intrusive price level and the per-symbol order book.

pub mod order_book;
pub mod price_level;

pub use order_book::{BookConfig, OrderBook, Submission};
pub use price_level::PriceLevel;
