use anchor_lang::prelude::*;

use crate::math::{normalize_price, PriceQuote};

/// Publisher status of a price record
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FeedStatus {
    #[default]
    Unknown,
    Trading,
    Halted,
}

/// Raw oracle record for one mint, written by the feed authority.
///
/// Stored in the publisher's encoding (`price * 10^expo`); `quote` is the only
/// way the engine reads it.
#[account]
#[derive(Debug, Default, PartialEq)]
pub struct PriceFeed {
    pub authority: Pubkey,
    pub mint: Pubkey,
    pub decimals: u8,
    pub price: i64,
    pub expo: i32,
    pub publish_time: i64,
    pub status: FeedStatus,
    pub bump: u8,
}

impl PriceFeed {
    pub const LEN: usize = 8 + 32 + 32 + 1 + 8 + 4 + 8 + 1 + 1 + 32;

    /// Normalize to a SCALE price; stale, halted or malformed records are invalid
    pub fn quote(&self, now: i64, max_age: i64) -> PriceQuote {
        if self.status != FeedStatus::Trading {
            return PriceQuote::invalid();
        }
        let age = now.saturating_sub(self.publish_time);
        if age < 0 || age > max_age {
            return PriceQuote::invalid();
        }
        match normalize_price(self.price, self.expo) {
            Ok(value) => PriceQuote::valid(value),
            Err(_) => PriceQuote::invalid(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SCALE;

    fn feed(price: i64, publish_time: i64, status: FeedStatus) -> PriceFeed {
        PriceFeed {
            price,
            expo: -8,
            publish_time,
            status,
            ..Default::default()
        }
    }

    #[test]
    fn test_quote_valid() {
        let quote = feed(100_000_000, 100, FeedStatus::Trading).quote(110, 60);
        assert!(quote.is_valid);
        assert_eq!(quote.value, SCALE);
    }

    #[test]
    fn test_quote_fails_closed() {
        assert!(!feed(100_000_000, 100, FeedStatus::Trading).quote(200, 60).is_valid);
        assert!(!feed(100_000_000, 100, FeedStatus::Halted).quote(110, 60).is_valid);
        assert!(!feed(100_000_000, 100, FeedStatus::Unknown).quote(110, 60).is_valid);
        assert!(!feed(-1, 100, FeedStatus::Trading).quote(110, 60).is_valid);
        // Publish time in the future
        assert!(!feed(100_000_000, 300, FeedStatus::Trading).quote(110, 60).is_valid);
    }
}
