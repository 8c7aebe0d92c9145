// ALICE-Lottery — Single-shot lottery lifecycle orchestration
// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Moroya Sakamoto

use crate::bracket::{BracketTableError, PrizeBracketTable, MAX_DIGIT_WIDTH};
use crate::journal::{LotteryEvent, LotteryJournal};
use crate::payout::{PayoutEngine, PayoutReport};
use crate::random::CodeSource;
use crate::registry::{AllocationError, TicketRegistry};

// ── Configuration ──────────────────────────────────────────────────────

/// Configuration for a lottery. Immutable after construction.
#[derive(Debug, Clone)]
pub struct LotteryConfig {
    /// Gross price of one ticket, in pool units.
    pub price_per_ticket: u64,
    /// Operator fee withheld from each ticket; the remainder feeds the
    /// pool. Must satisfy `price_per_ticket > fee_per_ticket > 0`.
    pub fee_per_ticket: u64,
    /// Decimal digit width of every code, `1..=`[`MAX_DIGIT_WIDTH`].
    pub digit_width: u32,
    /// Shared collision-retry budget of a single allocation call.
    pub max_retries: u32,
    /// Jackpot-first pool percentages, one per code digit.
    pub brackets: Vec<u64>,
    /// The only identity allowed to reveal the drawn code.
    pub operator_id: u64,
}

impl Default for LotteryConfig {
    fn default() -> Self {
        Self {
            price_per_ticket: 100,
            fee_per_ticket: 10,
            digit_width: 4,
            max_retries: 1_000,
            brackets: vec![40, 25, 20, 15],
            operator_id: 0,
        }
    }
}

/// Error returned when lottery construction fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// `price_per_ticket > fee_per_ticket > 0` is violated.
    InvalidPricing {
        price_per_ticket: u64,
        fee_per_ticket: u64,
    },
    /// Digit width outside `1..=`[`MAX_DIGIT_WIDTH`].
    InvalidDigitWidth { digit_width: u32 },
    /// Zero retry budget.
    InvalidMaxRetries,
    /// The bracket table length does not equal the digit width.
    BracketCountMismatch { expected: u32, actual: usize },
    /// The bracket percentages themselves are invalid.
    InvalidBrackets(BracketTableError),
}

/// Error returned by lottery operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LotteryError {
    /// Zero-quantity purchase, or payment not matching the exact
    /// required total.
    InvalidAmount {
        count: u64,
        payment: u64,
        required: u64,
    },
    /// Allocation attempted after the drawn code was revealed.
    LotteryClosed,
    /// The allocation call's shared retry budget was exhausted; nothing
    /// from the call was retained.
    MaxRetriesExceeded { attempts: u32 },
    /// Reveal attempted on an already-closed lottery.
    AlreadyClosed,
    /// Privileged action attempted by the wrong identity.
    Unauthorized { caller_id: u64 },
    /// The drawn code does not fit the configured digit width.
    CodeOutOfRange { code: u64, modulus: u64 },
}

// ── Lottery ────────────────────────────────────────────────────────────

/// Lifecycle phase. Closing and distributing are one transition, so the
/// payout table exists exactly when the lottery is closed.
enum Phase {
    Open,
    Closed { report: PayoutReport },
}

/// Single-shot lottery.
///
/// While open, exact-payment purchases allocate collision-free tickets
/// and feed the prize pool (credit-only; the pool never shrinks before
/// the draw). The operator's reveal classifies every ticket against the
/// drawn code and distributes the pool in one synchronous step: the
/// caller observes either a completed distribution and a closed lottery,
/// or an error and an unchanged open one. There is no way back from
/// closed.
///
/// All mutating operations take `&mut self` — the engine relies on its
/// host to serialize state-changing calls and does no internal locking.
pub struct Lottery {
    config: LotteryConfig,
    registry: TicketRegistry,
    engine: PayoutEngine,
    journal: LotteryJournal,
    phase: Phase,
    pool: u64,
    fees_accrued: u64,
}

impl Lottery {
    /// Validate the configuration and open a lottery drawing codes from
    /// `source`.
    pub fn new(config: LotteryConfig, source: CodeSource) -> Result<Self, ConfigError> {
        if config.fee_per_ticket == 0 || config.price_per_ticket <= config.fee_per_ticket {
            return Err(ConfigError::InvalidPricing {
                price_per_ticket: config.price_per_ticket,
                fee_per_ticket: config.fee_per_ticket,
            });
        }
        if config.digit_width == 0 || config.digit_width > MAX_DIGIT_WIDTH {
            return Err(ConfigError::InvalidDigitWidth {
                digit_width: config.digit_width,
            });
        }
        if config.max_retries == 0 {
            return Err(ConfigError::InvalidMaxRetries);
        }
        if config.brackets.len() != config.digit_width as usize {
            return Err(ConfigError::BracketCountMismatch {
                expected: config.digit_width,
                actual: config.brackets.len(),
            });
        }
        let table =
            PrizeBracketTable::new(config.brackets.clone()).map_err(ConfigError::InvalidBrackets)?;

        let registry = TicketRegistry::new(config.digit_width, config.max_retries, source);

        Ok(Self {
            config,
            registry,
            engine: PayoutEngine::new(table),
            journal: LotteryJournal::new(),
            phase: Phase::Open,
            pool: 0,
            fees_accrued: 0,
        })
    }

    /// Purchase `count` tickets for `owner_id` against an exact payment.
    ///
    /// Fails without any state change on a closed lottery, a zero count,
    /// a payment differing from `count * price_per_ticket`, or an
    /// exhausted retry budget. On success the net of fees is credited to
    /// the pool and the newly issued codes are returned in issue order.
    pub fn purchase_tickets(
        &mut self,
        owner_id: u64,
        count: u64,
        payment: u64,
    ) -> Result<Vec<u64>, LotteryError> {
        if self.is_closed() {
            return Err(LotteryError::LotteryClosed);
        }
        if count == 0 {
            return Err(LotteryError::InvalidAmount {
                count,
                payment,
                required: 0,
            });
        }

        let required = (count as u128) * (self.config.price_per_ticket as u128);
        if (payment as u128) != required {
            return Err(LotteryError::InvalidAmount {
                count,
                payment,
                required: saturating_u128_to_u64(required),
            });
        }

        let tickets = match self.registry.allocate(owner_id, count) {
            Ok(tickets) => tickets,
            Err(AllocationError::MaxRetriesExceeded { attempts }) => {
                return Err(LotteryError::MaxRetriesExceeded { attempts });
            }
            // count > 0 was checked above; kept total for the compiler.
            Err(AllocationError::InvalidAmount) => {
                return Err(LotteryError::InvalidAmount {
                    count,
                    payment,
                    required: 0,
                });
            }
        };

        let net = count as u128
            * (self.config.price_per_ticket - self.config.fee_per_ticket) as u128;
        let net = saturating_u128_to_u64(net);
        self.pool = self.pool.saturating_add(net);
        self.fees_accrued = self
            .fees_accrued
            .saturating_add(saturating_u128_to_u64(
                count as u128 * self.config.fee_per_ticket as u128,
            ));

        self.journal
            .record(LotteryEvent::TicketsAllocated { owner_id, count });
        self.journal.record(LotteryEvent::PoolCredited { amount: net });

        Ok(tickets.into_iter().map(|t| t.code).collect())
    }

    /// Reveal the drawn code, distribute the pool, and close the lottery.
    ///
    /// Restricted to the configured operator. Classification and payout
    /// run synchronously inside the transition; only a fully computed
    /// distribution closes the lottery, and a closed lottery can never be
    /// reopened or redistributed.
    pub fn reveal(
        &mut self,
        caller_id: u64,
        drawn_code: u64,
    ) -> Result<&PayoutReport, LotteryError> {
        if self.is_closed() {
            return Err(LotteryError::AlreadyClosed);
        }
        if caller_id != self.config.operator_id {
            return Err(LotteryError::Unauthorized { caller_id });
        }
        let modulus = self.registry.modulus();
        if drawn_code >= modulus {
            return Err(LotteryError::CodeOutOfRange {
                code: drawn_code,
                modulus,
            });
        }

        let report = self
            .engine
            .compute(self.registry.tickets(), drawn_code, self.pool);

        let winning_tickets: u64 = report.winner_counts[1..].iter().sum();
        self.journal
            .record(LotteryEvent::CodeRevealed { drawn_code });
        self.journal.record(LotteryEvent::PayoutComputed {
            winning_tickets,
            total_distributed: report.total_distributed,
        });

        self.phase = Phase::Closed { report };
        match &self.phase {
            Phase::Closed { report } => Ok(report),
            // The phase was assigned just above.
            Phase::Open => Err(LotteryError::AlreadyClosed),
        }
    }

    /// Codes held by `owner_id` in purchase order.
    #[inline(always)]
    pub fn tickets_owned_by(&self, owner_id: u64) -> &[u64] {
        self.registry.tickets_of(owner_id)
    }

    /// Amount owed to `owner_id`: zero while the lottery is open and for
    /// owners without a winning share.
    pub fn payout_owed(&self, owner_id: u64) -> u64 {
        match &self.phase {
            Phase::Open => 0,
            Phase::Closed { report } => {
                report.entitlements.get(&owner_id).copied().unwrap_or(0)
            }
        }
    }

    /// The distribution report, available once closed.
    pub fn payout_report(&self) -> Option<&PayoutReport> {
        match &self.phase {
            Phase::Open => None,
            Phase::Closed { report } => Some(report),
        }
    }

    /// The revealed code, once closed.
    pub fn drawn_code(&self) -> Option<u64> {
        self.payout_report().map(|report| report.drawn_code)
    }

    /// True once the drawn code has been revealed.
    #[inline(always)]
    pub fn is_closed(&self) -> bool {
        matches!(self.phase, Phase::Closed { .. })
    }

    /// True while tickets are still on sale.
    #[inline(always)]
    pub fn is_open(&self) -> bool {
        !self.is_closed()
    }

    /// Current prize pool.
    #[inline(always)]
    pub fn pool(&self) -> u64 {
        self.pool
    }

    /// Operator fees withheld from sales so far.
    #[inline(always)]
    pub fn fees_accrued(&self) -> u64 {
        self.fees_accrued
    }

    /// Number of tickets issued.
    #[inline(always)]
    pub fn ticket_count(&self) -> usize {
        self.registry.len()
    }

    /// Read-only view of the ticket registry.
    #[inline(always)]
    pub fn registry(&self) -> &TicketRegistry {
        &self.registry
    }

    /// The immutable configuration.
    #[inline(always)]
    pub fn config(&self) -> &LotteryConfig {
        &self.config
    }

    /// The audit journal.
    #[inline(always)]
    pub fn journal(&self) -> &LotteryJournal {
        &self.journal
    }
}

/// Clamp a u128 value into u64 range.
#[inline(always)]
fn saturating_u128_to_u64(v: u128) -> u64 {
    v.min(u64::MAX as u128) as u64
}

// ── Tests ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn two_digit_config() -> LotteryConfig {
        LotteryConfig {
            price_per_ticket: 100,
            fee_per_ticket: 10,
            digit_width: 2,
            max_retries: 1_000,
            brackets: vec![60, 40],
            operator_id: 777,
        }
    }

    fn open_lottery() -> Lottery {
        Lottery::new(two_digit_config(), CodeSource::new(0xA11CE)).unwrap()
    }

    #[test]
    fn default_config_is_valid() {
        let lottery = Lottery::new(LotteryConfig::default(), CodeSource::new(1));
        assert!(lottery.is_ok());
    }

    #[test]
    fn construction_rejects_bad_pricing() {
        let mut config = two_digit_config();
        config.fee_per_ticket = 100; // equal to price
        assert_eq!(
            Lottery::new(config, CodeSource::new(1)).err(),
            Some(ConfigError::InvalidPricing {
                price_per_ticket: 100,
                fee_per_ticket: 100,
            })
        );

        let mut config = two_digit_config();
        config.fee_per_ticket = 0;
        assert!(matches!(
            Lottery::new(config, CodeSource::new(1)),
            Err(ConfigError::InvalidPricing { .. })
        ));
    }

    #[test]
    fn construction_rejects_bad_digit_width() {
        let mut config = two_digit_config();
        config.digit_width = 0;
        assert!(matches!(
            Lottery::new(config, CodeSource::new(1)),
            Err(ConfigError::InvalidDigitWidth { digit_width: 0 })
        ));

        let mut config = two_digit_config();
        config.digit_width = MAX_DIGIT_WIDTH + 1;
        config.brackets = vec![0; (MAX_DIGIT_WIDTH + 1) as usize];
        assert!(matches!(
            Lottery::new(config, CodeSource::new(1)),
            Err(ConfigError::InvalidDigitWidth { .. })
        ));
    }

    #[test]
    fn construction_rejects_zero_retries() {
        let mut config = two_digit_config();
        config.max_retries = 0;
        assert_eq!(
            Lottery::new(config, CodeSource::new(1)).err(),
            Some(ConfigError::InvalidMaxRetries)
        );
    }

    #[test]
    fn construction_rejects_bracket_count_mismatch() {
        let mut config = two_digit_config();
        config.brackets = vec![60, 30, 10];
        assert_eq!(
            Lottery::new(config, CodeSource::new(1)).err(),
            Some(ConfigError::BracketCountMismatch {
                expected: 2,
                actual: 3,
            })
        );
    }

    #[test]
    fn construction_rejects_overallocated_brackets() {
        let mut config = two_digit_config();
        config.brackets = vec![60, 50];
        assert_eq!(
            Lottery::new(config, CodeSource::new(1)).err(),
            Some(ConfigError::InvalidBrackets(
                BracketTableError::SumExceedsWhole { sum: 110 }
            ))
        );
    }

    #[test]
    fn purchase_credits_pool_net_of_fees() {
        let mut lottery = open_lottery();
        let codes = lottery.purchase_tickets(1, 3, 300).unwrap();

        assert_eq!(codes.len(), 3);
        assert_eq!(lottery.tickets_owned_by(1), codes.as_slice());
        assert_eq!(lottery.ticket_count(), 3);
        assert_eq!(lottery.pool(), 270); // 3 * (100 - 10)
        assert_eq!(lottery.fees_accrued(), 30);
        assert!(lottery.is_open());
    }

    #[test]
    fn purchase_rejects_zero_count() {
        let mut lottery = open_lottery();
        assert_eq!(
            lottery.purchase_tickets(1, 0, 0),
            Err(LotteryError::InvalidAmount {
                count: 0,
                payment: 0,
                required: 0,
            })
        );
        assert_eq!(lottery.ticket_count(), 0);
    }

    #[test]
    fn purchase_rejects_wrong_payment() {
        let mut lottery = open_lottery();

        // Underpayment and overpayment both fail; the exact total is due.
        for payment in [0u64, 199, 201, 1_000] {
            assert_eq!(
                lottery.purchase_tickets(1, 2, payment),
                Err(LotteryError::InvalidAmount {
                    count: 2,
                    payment,
                    required: 200,
                })
            );
        }
        assert_eq!(lottery.ticket_count(), 0);
        assert_eq!(lottery.pool(), 0);
        assert_eq!(lottery.fees_accrued(), 0);
        assert!(lottery.journal().is_empty());
    }

    #[test]
    fn exhausted_purchase_rolls_back_everything() {
        let config = LotteryConfig {
            price_per_ticket: 2,
            fee_per_ticket: 1,
            digit_width: 1,
            max_retries: 200,
            brackets: vec![100],
            operator_id: 9,
        };
        let mut lottery = Lottery::new(config, CodeSource::new(0xA11CE)).unwrap();

        lottery.purchase_tickets(1, 9, 18).unwrap();
        assert_eq!(lottery.pool(), 9);
        let journal_len = lottery.journal().len();

        // Two more tickets cannot fit in the one remaining code.
        let err = lottery.purchase_tickets(2, 2, 4).unwrap_err();
        assert!(matches!(err, LotteryError::MaxRetriesExceeded { .. }));

        assert_eq!(lottery.ticket_count(), 9);
        assert!(lottery.tickets_owned_by(2).is_empty());
        assert_eq!(lottery.pool(), 9);
        assert_eq!(lottery.fees_accrued(), 9);
        assert_eq!(lottery.journal().len(), journal_len);
    }

    #[test]
    fn reveal_requires_the_operator() {
        let mut lottery = open_lottery();
        lottery.purchase_tickets(1, 2, 200).unwrap();

        assert_eq!(
            lottery.reveal(1, 42).err(),
            Some(LotteryError::Unauthorized { caller_id: 1 })
        );
        assert!(lottery.is_open());

        assert!(lottery.reveal(777, 42).is_ok());
        assert!(lottery.is_closed());
    }

    #[test]
    fn reveal_rejects_out_of_range_code() {
        let mut lottery = open_lottery();
        assert_eq!(
            lottery.reveal(777, 100).err(),
            Some(LotteryError::CodeOutOfRange {
                code: 100,
                modulus: 100,
            })
        );
        assert!(lottery.is_open());

        // Boundary: 99 is the largest two-digit code.
        assert!(lottery.reveal(777, 99).is_ok());
    }

    #[test]
    fn reveal_closes_and_publishes_the_report() {
        let mut lottery = open_lottery();
        lottery.purchase_tickets(1, 2, 200).unwrap();
        lottery.purchase_tickets(2, 2, 200).unwrap();

        assert_eq!(lottery.payout_owed(1), 0); // nothing owed pre-closure
        assert!(lottery.payout_report().is_none());
        assert_eq!(lottery.drawn_code(), None);

        // Draw one of owner 1's actual codes: a guaranteed jackpot.
        let jackpot_code = lottery.tickets_owned_by(1)[0];
        let report = lottery.reveal(777, jackpot_code).unwrap();

        assert_eq!(report.drawn_code, jackpot_code);
        assert_eq!(report.winner_counts[2], 1); // unique codes: one exact match
        let total = report.total_distributed;

        assert!(lottery.is_closed());
        assert_eq!(lottery.drawn_code(), Some(jackpot_code));
        // The jackpot share alone is floor(60% of pool).
        assert!(lottery.payout_owed(1) >= lottery.pool() * 60 / 100);
        assert!(total <= lottery.pool());

        // Every owed amount is accounted for in the report total.
        let owed_sum: u64 = [1u64, 2].iter().map(|&o| lottery.payout_owed(o)).sum();
        assert_eq!(owed_sum, total);
    }

    #[test]
    fn second_reveal_fails_and_changes_nothing() {
        let mut lottery = open_lottery();
        lottery.purchase_tickets(1, 2, 200).unwrap();

        let first = lottery.reveal(777, 42).unwrap().clone();

        // Neither the operator nor anyone else can reveal again.
        assert_eq!(lottery.reveal(777, 43).err(), Some(LotteryError::AlreadyClosed));
        assert_eq!(lottery.reveal(1, 42).err(), Some(LotteryError::AlreadyClosed));

        let report = lottery.payout_report().unwrap();
        assert_eq!(report.drawn_code, first.drawn_code);
        assert_eq!(report.content_hash, first.content_hash);
        assert_eq!(report.entitlements, first.entitlements);
        assert_eq!(report.total_distributed, first.total_distributed);
    }

    #[test]
    fn no_purchases_after_closure() {
        let mut lottery = open_lottery();
        lottery.purchase_tickets(1, 1, 100).unwrap();
        lottery.reveal(777, 5).unwrap();

        assert_eq!(
            lottery.purchase_tickets(2, 1, 100),
            Err(LotteryError::LotteryClosed)
        );
        assert_eq!(lottery.ticket_count(), 1);
    }

    #[test]
    fn reveal_on_empty_registry_distributes_nothing() {
        let mut lottery = open_lottery();
        let report = lottery.reveal(777, 0).unwrap();
        assert_eq!(report.total_distributed, 0);
        assert_eq!(report.pool, 0);
        // Zero is a legal drawn code, not an absence marker.
        assert_eq!(lottery.drawn_code(), Some(0));
    }

    #[test]
    fn journal_records_the_lifecycle_in_order() {
        let mut lottery = open_lottery();
        lottery.purchase_tickets(5, 2, 200).unwrap();
        lottery.reveal(777, 17).unwrap();

        let entries = lottery.journal().entries();
        assert_eq!(entries.len(), 4);
        assert!(matches!(
            entries[0].event,
            LotteryEvent::TicketsAllocated {
                owner_id: 5,
                count: 2,
            }
        ));
        assert!(matches!(
            entries[1].event,
            LotteryEvent::PoolCredited { amount: 180 }
        ));
        assert!(matches!(
            entries[2].event,
            LotteryEvent::CodeRevealed { drawn_code: 17 }
        ));
        assert!(matches!(entries[3].event, LotteryEvent::PayoutComputed { .. }));
    }

    #[test]
    fn seven_buyers_distribution_stays_within_pool() {
        let mut lottery = open_lottery();
        for owner in 1..=7u64 {
            lottery.purchase_tickets(owner, 2, 200).unwrap();
        }
        assert_eq!(lottery.ticket_count(), 14);
        assert_eq!(lottery.pool(), 14 * 90);

        let jackpot_code = lottery.tickets_owned_by(3)[1];
        let report = lottery.reveal(777, jackpot_code).unwrap().clone();

        assert_eq!(report.winner_counts[2], 1);
        assert!(report.total_distributed <= report.pool);
        assert_eq!(report.retained, report.pool - report.total_distributed);

        let owed_sum: u64 = (1..=7u64).map(|o| lottery.payout_owed(o)).sum();
        assert_eq!(owed_sum, report.total_distributed);
        assert!(lottery.payout_owed(3) >= report.pool * 60 / 100);
    }
}
