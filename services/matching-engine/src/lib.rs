//! Order-book matching core
//!
//! In-memory limit-order-book engine implementing price-time priority
//! matching over a pooled storage layout.
//!
//! **Key invariants:**
//! - Price-time priority strictly enforced: best price first across the
//!   book, FIFO by arrival within a price
//! - The book is uncrossed after every mutating call
//! - Deterministic matching (same inputs produce the same trade stream)
//! - Every live order lies on exactly one price level's chain

pub mod book;
pub mod manager;
pub mod pool;
pub mod request;

pub use book::{BookConfig, OrderBook, PriceLevel, Submission};
pub use manager::MarketDataManager;
pub use pool::OrderPool;
pub use request::{Report, Request};
