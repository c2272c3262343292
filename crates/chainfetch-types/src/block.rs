use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A block-number word as reported by a ledger's point lookup.
///
/// Ledgers report block numbers as 256-bit unsigned words (big-endian here).
/// A word only becomes a [`RegistrationBlock`] through the checked
/// [`RawBlockNumber::to_u64`] narrowing; it is never truncated.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RawBlockNumber([u8; 32]);

impl RawBlockNumber {
    pub const ZERO: Self = Self([0u8; 32]);

    /// Wrap a big-endian 256-bit word.
    pub const fn from_be_bytes(word: [u8; 32]) -> Self {
        Self(word)
    }

    pub fn from_u64(value: u64) -> Self {
        let mut word = [0u8; 32];
        word[24..].copy_from_slice(&value.to_be_bytes());
        Self(word)
    }

    pub fn to_be_bytes(&self) -> [u8; 32] {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Narrow to `u64`, or `None` if any of the high 192 bits are set.
    pub fn to_u64(&self) -> Option<u64> {
        if self.0[..24].iter().any(|b| *b != 0) {
            return None;
        }
        let mut low = [0u8; 8];
        low.copy_from_slice(&self.0[24..]);
        Some(u64::from_be_bytes(low))
    }
}

impl From<u64> for RawBlockNumber {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl fmt::Debug for RawBlockNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawBlockNumber({self})")
    }
}

impl fmt::Display for RawBlockNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_u64() {
            Some(n) => write!(f, "{n}"),
            None => write!(f, "0x{}", hex::encode(self.0)),
        }
    }
}

/// The ledger block at which a keyset hash was registered.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct RegistrationBlock(pub u64);

impl RegistrationBlock {
    pub fn number(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RegistrationBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Inclusive range of ledger blocks, `start <= end`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct BlockRange {
    start: u64,
    end: u64,
}

impl BlockRange {
    pub fn new(start: u64, end: u64) -> Result<Self, TypeError> {
        if start > end {
            return Err(TypeError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// The range containing exactly one block.
    pub fn single(block: RegistrationBlock) -> Self {
        Self {
            start: block.0,
            end: block.0,
        }
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn contains(&self, block: u64) -> bool {
        self.start <= block && block <= self.end
    }
}

impl fmt::Display for BlockRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}
