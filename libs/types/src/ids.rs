//! Unique identifier types for engine entities
//!
//! An order is addressed by a fixed-width symbol tag plus a dense 32-bit
//! sequence number into its book's order pool. Sequence 0 is reserved as the
//! pool sentinel and never addresses a live order.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Dense index into one book's order pool.
///
/// Sequence numbers are reused after release, so an id is only meaningful
/// while its order is live.
pub type SeqNum = u32;

/// Identifier of the submitting user.
pub type UserId = String;

/// Fixed-width ticker symbol, up to 4 ASCII bytes, NUL-padded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol([u8; 4]);

impl Symbol {
    /// Create a symbol from a ticker string.
    ///
    /// Fails on empty, over-long (more than 4 bytes) or non-ASCII input.
    pub fn new(name: &str) -> Result<Self, SymbolError> {
        if name.is_empty() || name.len() > 4 {
            return Err(SymbolError::InvalidLength(name.len()));
        }
        if !name.is_ascii() {
            return Err(SymbolError::NotAscii);
        }
        let mut tag = [0u8; 4];
        tag[..name.len()].copy_from_slice(name.as_bytes());
        Ok(Self(tag))
    }

    /// The symbol as a string slice, without NUL padding.
    pub fn as_str(&self) -> &str {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(4);
        // Construction guarantees ASCII
        std::str::from_utf8(&self.0[..end]).expect("symbol bytes are ASCII")
    }

    /// The raw 4-byte tag, NUL-padded.
    pub fn as_bytes(&self) -> [u8; 4] {
        self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<String> for Symbol {
    type Error = SymbolError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Symbol::new(&s)
    }
}

impl From<Symbol> for String {
    fn from(s: Symbol) -> Self {
        s.as_str().to_string()
    }
}

/// Symbol construction errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SymbolError {
    #[error("symbol must be 1 to 4 bytes, got {0}")]
    InvalidLength(usize),

    #[error("symbol must be ASCII")]
    NotAscii,
}

/// Globally unique address of an order: symbol tag plus pool sequence.
///
/// Ordering is lexicographic on `(symbol, seq_num)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderId {
    pub symbol: Symbol,
    pub seq_num: SeqNum,
}

impl OrderId {
    pub fn new(symbol: Symbol, seq_num: SeqNum) -> Self {
        Self { symbol, seq_num }
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.symbol, self.seq_num)
    }
}
