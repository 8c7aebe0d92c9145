/*
    ALICE-Lottery
    Copyright (C) 2026 Moroya Sakamoto
*/

//! # ALICE-Lottery
//!
//! Ticket allocation and tiered prize-distribution engine for the ALICE
//! financial system.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`ticket`] | Immutable `Ticket` record |
//! | [`random`] | Deterministic pseudo-random code source |
//! | [`registry`] | Collision-free ticket allocation with a bounded retry budget |
//! | [`bracket`] | Trailing-digit bracket classification and prize table |
//! | [`payout`] | Two-pass pooled prize distribution |
//! | [`lottery`] | Single-shot lottery lifecycle orchestration |
//! | [`custody`] | Prize fund custody and withdrawable balances |
//! | [`journal`] | Append-only audit journal |
//!
//! # Quick Start
//!
//! ```rust
//! use alice_lottery::lottery::{Lottery, LotteryConfig};
//! use alice_lottery::random::CodeSource;
//!
//! let config = LotteryConfig {
//!     price_per_ticket: 100,
//!     fee_per_ticket: 10,
//!     digit_width: 2,
//!     max_retries: 1_000,
//!     brackets: vec![60, 40], // jackpot first
//!     operator_id: 7,
//! };
//! let mut lottery = Lottery::new(config, CodeSource::new(0xFEED)).unwrap();
//!
//! let codes = lottery.purchase_tickets(100, 2, 200).unwrap();
//! assert_eq!(codes.len(), 2);
//! assert_eq!(lottery.pool(), 180); // 2 * (100 - 10)
//!
//! let report = lottery.reveal(7, codes[0]).unwrap();
//! assert_eq!(report.winner_counts[2], 1); // codes are unique: one exact match
//! assert!(report.total_distributed <= 180);
//! ```

/// Trailing-digit bracket classification and prize table.
pub mod bracket;
pub mod custody;
pub mod journal;
pub mod lottery;
/// Two-pass pooled prize distribution.
pub mod payout;
pub mod random;
pub mod registry;
pub mod ticket;

pub use bracket::{bracket_for, BracketTableError, PrizeBracketTable, MAX_DIGIT_WIDTH};
pub use custody::{CustodyError, PrizeVault};
pub use journal::{JournalEntry, LotteryEvent, LotteryJournal};
pub use lottery::{ConfigError, Lottery, LotteryConfig, LotteryError};
pub use payout::{PayoutEngine, PayoutReport};
pub use random::CodeSource;
pub use registry::{AllocationError, TicketRegistry};
pub use ticket::Ticket;

/// FNV-1a hash (crate-internal shared utility).
#[inline(always)]
pub(crate) fn fnv1a(data: &[u8]) -> u64 {
    let mut h: u64 = 0xcbf29ce484222325;
    for &b in data {
        h ^= b as u64;
        h = h.wrapping_mul(0x100000001b3);
    }
    h
}
