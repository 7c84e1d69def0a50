//! Per-symbol order book and matching engine
//!
//! Both sides are contiguous price-sorted sequences of price levels with the
//! best quote at the back: bids ascend so `last()` is the highest bid, asks
//! descend so `last()` is the lowest ask. Best-quote access is O(1) and the
//! matching loop walks the tails; inserting or removing a level is O(#levels)
//! with cache-friendly traversal.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use types::errors::BookError;
use types::ids::{OrderId, SeqNum, Symbol, UserId};
use types::numeric::{Price, Quantity};
use types::order::{LevelType, Order, OrderType, Side};
use types::trade::{FillType, Trade, TradeInfo, Trades};

use crate::pool::OrderPool;

use super::price_level::PriceLevel;

/// Order book tuning knobs.
#[derive(Debug, Clone)]
pub struct BookConfig {
    /// Pool reservation hint; the slab grows past it but is never shrunk.
    pub pool_capacity: usize,
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            pool_capacity: 10_000,
        }
    }
}

/// Outcome of submitting an order.
///
/// `order_id` is `None` when the order was discarded before placement: a
/// MARKET order against an empty opposite side, or a FillAndKill/FillOrKill
/// order whose gate failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub order_id: Option<OrderId>,
    pub trades: Trades,
}

impl Submission {
    fn discarded() -> Self {
        Self {
            order_id: None,
            trades: Trades::new(),
        }
    }
}

/// Per-symbol order book: two price-sorted sides, the order pool, and the
/// matching engine.
#[derive(Debug)]
pub struct OrderBook {
    symbol: Symbol,
    /// Ascending by price; the back is the best (highest) bid.
    bids: Vec<PriceLevel>,
    /// Descending by price; the back is the best (lowest) ask.
    asks: Vec<PriceLevel>,
    pool: OrderPool,
}

impl OrderBook {
    pub fn new(symbol: Symbol) -> Self {
        Self::with_config(symbol, &BookConfig::default())
    }

    pub fn with_config(symbol: Symbol, config: &BookConfig) -> Self {
        Self {
            symbol,
            bids: Vec::new(),
            asks: Vec::new(),
            pool: OrderPool::with_capacity(config.pool_capacity),
        }
    }

    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    /// Submit an order; runs the matching engine to fixed point.
    ///
    /// # Panics
    /// Panics if `quantity` is zero.
    pub fn add_order(
        &mut self,
        order_type: OrderType,
        user_id: UserId,
        side: Side,
        price: Price,
        quantity: Quantity,
    ) -> Submission {
        assert!(!quantity.is_zero(), "quantity must be positive");

        // MARKET orders never rest: rewrite to a marketable limit at the
        // price extreme, or discard against an empty opposite side.
        let (order_type, price) = match self.translate_market(order_type, side, price) {
            Some(rewritten) => rewritten,
            None => return Submission::discarded(),
        };

        if order_type == OrderType::FillAndKill && !self.is_match_possible(side, price) {
            return Submission::discarded();
        }
        if order_type == OrderType::FillOrKill
            && !self.can_fill_completely(side, price, quantity)
        {
            return Submission::discarded();
        }

        let seq = self.pool.acquire();
        let order_id = OrderId::new(self.symbol, seq);
        self.pool.put(
            seq,
            Order {
                order_type,
                order_id,
                user_id,
                side,
                price,
                initial_quantity: quantity,
                remaining_quantity: quantity,
            },
        );

        let level_type = LevelType::from(side);
        let Self {
            bids, asks, pool, ..
        } = self;
        let levels = match level_type {
            LevelType::Bid => bids,
            LevelType::Ask => asks,
        };
        let idx = ensure_level(levels, level_type, price);
        levels[idx].push_back(pool, seq);
        trace!(%order_id, ?side, %price, %quantity, "order placed");

        let trades = self.match_book();

        // FillAndKill rests nothing: cancel whatever matching left behind.
        if order_type == OrderType::FillAndKill && self.pool.contains(seq) {
            self.cancel_seq(seq);
        }

        Submission {
            order_id: Some(order_id),
            trades,
        }
    }

    /// Cancel a resting order, dropping its level if it becomes empty.
    pub fn cancel_order(&mut self, order_id: OrderId) -> Result<(), BookError> {
        self.get_order(order_id)?;
        self.cancel_seq(order_id.seq_num);
        trace!(%order_id, "order canceled");
        Ok(())
    }

    /// Reprice or resize a resting order.
    ///
    /// At the same price the quantities are overwritten in place and the
    /// order keeps its queue position. A price change cancels and re-adds,
    /// losing time priority; the re-queue may cross and emit trades.
    pub fn modify_order(
        &mut self,
        order_id: OrderId,
        new_price: Price,
        new_quantity: Quantity,
    ) -> Result<Submission, BookError> {
        assert!(!new_quantity.is_zero(), "quantity must be positive");
        let old = self.get_order(order_id)?.clone();

        if old.price == new_price {
            let level_type = LevelType::from(old.side);
            let Self {
                bids, asks, pool, ..
            } = self;
            let levels = match level_type {
                LevelType::Bid => bids,
                LevelType::Ask => asks,
            };
            let idx = find_level(levels, level_type, new_price)
                .expect("live order must lie on a price level");
            levels[idx].set_quantity(pool, order_id.seq_num, new_quantity);
            return Ok(Submission {
                order_id: Some(order_id),
                trades: Trades::new(),
            });
        }

        self.cancel_seq(order_id.seq_num);
        Ok(self.add_order(old.order_type, old.user_id, old.side, new_price, new_quantity))
    }

    /// Snapshot of a live order.
    pub fn get_order(&self, order_id: OrderId) -> Result<&Order, BookError> {
        self.pool
            .order(order_id.seq_num)
            .filter(|order| order.order_id == order_id)
            .ok_or(BookError::UnknownOrder { order_id })
    }

    /// Whether an order at `price` could cross the opposite best level.
    pub fn is_match_possible(&self, side: Side, price: Price) -> bool {
        match side {
            Side::Buy => self
                .asks
                .last()
                .is_some_and(|best| price >= best.price() && !best.is_empty()),
            Side::Sell => self
                .bids
                .last()
                .is_some_and(|best| price <= best.price() && !best.is_empty()),
        }
    }

    /// The best (highest) bid level.
    pub fn best_bid(&self) -> Option<&PriceLevel> {
        self.bids.last()
    }

    /// The best (lowest) ask level.
    pub fn best_ask(&self) -> Option<&PriceLevel> {
        self.asks.last()
    }

    /// Top `depth` levels of one side as `(price, volume)`, best first.
    pub fn depth(&self, side: Side, depth: usize) -> Vec<(Price, Quantity)> {
        self.side_levels(side.into())
            .iter()
            .rev()
            .take(depth)
            .map(|level| (level.price(), level.total_volume()))
            .collect()
    }

    /// Resting orders at one price in FIFO order; empty if the level does
    /// not exist.
    pub fn orders_at(&self, side: Side, price: Price) -> impl Iterator<Item = &Order> + '_ {
        let level_type = LevelType::from(side);
        let levels = self.side_levels(level_type);
        find_level(levels, level_type, price)
            .map(|idx| &levels[idx])
            .into_iter()
            .flat_map(|level| level.iter(&self.pool))
    }

    /// Number of live orders in the book.
    pub fn order_count(&self) -> usize {
        self.pool.live_count()
    }

    pub fn bids(&self) -> &[PriceLevel] {
        &self.bids
    }

    pub fn asks(&self) -> &[PriceLevel] {
        &self.asks
    }

    fn side_levels(&self, level_type: LevelType) -> &[PriceLevel] {
        match level_type {
            LevelType::Bid => &self.bids,
            LevelType::Ask => &self.asks,
        }
    }

    /// Rewrite a MARKET order to a marketable limit, or `None` to discard.
    fn translate_market(
        &self,
        order_type: OrderType,
        side: Side,
        price: Price,
    ) -> Option<(OrderType, Price)> {
        if order_type != OrderType::Market {
            return Some((order_type, price));
        }
        match side {
            Side::Buy if !self.asks.is_empty() => Some((OrderType::Limit, Price::MAX)),
            Side::Sell if !self.bids.is_empty() => Some((OrderType::Limit, Price::MIN)),
            _ => None,
        }
    }

    /// Whether the opposite side holds enough crossing volume to fill
    /// `quantity` completely (the all-or-none gate).
    fn can_fill_completely(&self, side: Side, price: Price, quantity: Quantity) -> bool {
        let opposite = match side {
            Side::Buy => &self.asks,
            Side::Sell => &self.bids,
        };
        let mut available = Quantity::ZERO;
        for level in opposite.iter().rev() {
            let crosses = match side {
                Side::Buy => level.price() <= price,
                Side::Sell => level.price() >= price,
            };
            if !crosses {
                break;
            }
            available += level.total_volume();
            if available >= quantity {
                return true;
            }
        }
        false
    }

    /// Run the matching state machine to fixed point.
    ///
    /// Each crossing consumes `min` of the two head quantities. The order
    /// with the smaller remaining quantity is the executing order (the bid
    /// on a tie) and always reports a Full fill; the reducing order reports
    /// Full only when the crossing consumes its entire initial quantity.
    fn match_book(&mut self) -> Trades {
        let Self {
            symbol,
            bids,
            asks,
            pool,
        } = self;
        let mut trades = Trades::new();

        loop {
            let (Some(bid_level), Some(ask_level)) = (bids.last_mut(), asks.last_mut())
            else {
                break;
            };
            if bid_level.price() < ask_level.price() {
                break;
            }

            while !bid_level.is_empty() && !ask_level.is_empty() {
                let bid_head = bid_level.front(pool).clone();
                let ask_head = ask_level.front(pool).clone();
                let quantity = bid_head
                    .remaining_quantity
                    .min(ask_head.remaining_quantity);

                let (executing, reducing) =
                    if bid_head.remaining_quantity <= ask_head.remaining_quantity {
                        (&bid_head, &ask_head)
                    } else {
                        (&ask_head, &bid_head)
                    };
                let reducing_fill_type = if quantity == reducing.initial_quantity {
                    FillType::Full
                } else {
                    FillType::Partial
                };

                trades.push(Trade {
                    executing_order: TradeInfo {
                        fill_type: FillType::Full,
                        user_id: executing.user_id.clone(),
                        order_id: executing.order_id,
                        price: executing.price,
                        quantity,
                    },
                    reducing_order: TradeInfo {
                        fill_type: reducing_fill_type,
                        user_id: reducing.user_id.clone(),
                        order_id: reducing.order_id,
                        price: reducing.price,
                        quantity,
                    },
                });

                bid_level.fill_front(pool, quantity);
                ask_level.fill_front(pool, quantity);
            }

            let bid_emptied = bid_level.is_empty();
            let ask_emptied = ask_level.is_empty();
            if bid_emptied {
                bids.pop();
            }
            if ask_emptied {
                asks.pop();
            }
        }

        if let (Some(best_bid), Some(best_ask)) = (bids.last(), asks.last()) {
            assert!(
                best_bid.price() < best_ask.price(),
                "book crossed after matching: best bid {} >= best ask {}",
                best_bid.price(),
                best_ask.price(),
            );
        }

        if !trades.is_empty() {
            debug!(symbol = %symbol, count = trades.len(), "trades executed");
        }
        trades
    }

    /// Unlink a live order from its level and release the slot.
    fn cancel_seq(&mut self, seq: SeqNum) {
        let Self {
            bids, asks, pool, ..
        } = self;
        let (side, price) = {
            let order = pool.order(seq).expect("cancel of a live order");
            (order.side, order.price)
        };
        let level_type = LevelType::from(side);
        let levels = match level_type {
            LevelType::Bid => bids,
            LevelType::Ask => asks,
        };
        let idx = find_level(levels, level_type, price)
            .expect("live order must lie on a price level");
        levels[idx].unlink(pool, seq);
        if levels[idx].is_empty() {
            levels.remove(idx);
        }
    }
}

/// Sorted position for `price` on one side: bids ascend, asks descend.
fn insertion_point(levels: &[PriceLevel], level_type: LevelType, price: Price) -> usize {
    match level_type {
        LevelType::Bid => levels.partition_point(|level| level.price() < price),
        LevelType::Ask => levels.partition_point(|level| level.price() > price),
    }
}

/// Binary search for the level holding `price`.
fn find_level(levels: &[PriceLevel], level_type: LevelType, price: Price) -> Option<usize> {
    let idx = insertion_point(levels, level_type, price);
    (idx < levels.len() && levels[idx].price() == price).then_some(idx)
}

fn ensure_level(
    levels: &mut Vec<PriceLevel>,
    level_type: LevelType,
    price: Price,
) -> usize {
    match find_level(levels, level_type, price) {
        Some(idx) => idx,
        None => {
            let idx = insertion_point(levels, level_type, price);
            levels.insert(idx, PriceLevel::new(level_type, price));
            idx
        }
    }
}
