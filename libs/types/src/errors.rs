//! Error taxonomy for the order-book core
//!
//! Operational failures are surfaced to the caller as typed results and are
//! not logged at the core. Invariant violations (empty-level access, a
//! crossed book after matching) are fatal and assert instead of appearing
//! here.

use crate::ids::{OrderId, Symbol};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Operational failures of the book surface
///
/// Serializable so rejections can travel on the report stream.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookError {
    /// The request references a symbol with no book and the operation is not
    /// book-creating.
    #[error("no order book exists for symbol {symbol}")]
    UnknownBook { symbol: Symbol },

    /// The order id does not address a live pool slot.
    #[error("order {order_id} does not address a live order")]
    UnknownOrder { order_id: OrderId },
}

/// Failures of the optional fixed-bucket backing allocator
///
/// The default heap-backed order pool never raises these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AllocError {
    /// No bucket holds enough contiguous free blocks for the request.
    #[error("bucket pool cannot satisfy an allocation of {bytes} bytes")]
    CapacityExceeded { bytes: usize },
}
