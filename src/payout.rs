// ALICE-Lottery — Two-pass pooled prize distribution
// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2026 Moroya Sakamoto

use std::collections::HashMap;

use crate::bracket::{bracket_for, PrizeBracketTable};
use crate::fnv1a;
use crate::ticket::Ticket;

// ── Types ──────────────────────────────────────────────────────────────

/// Result of distributing a prize pool across the issued tickets.
#[derive(Debug, Clone)]
pub struct PayoutReport {
    /// The drawn code every ticket was classified against.
    pub drawn_code: u64,
    /// Pool presented for distribution.
    pub pool: u64,
    /// Ticket count per bracket; index is the bracket, index 0 counts the
    /// non-winning tickets.
    pub winner_counts: Vec<u64>,
    /// Owner → total entitlement, summed over every winning ticket the
    /// owner holds, across brackets. Owners without a winning share do
    /// not appear.
    pub entitlements: HashMap<u64, u64>,
    /// Sum of all entitlements, never above `pool`.
    pub total_distributed: u64,
    /// Undistributed remainder of the pool (percentage rounding, division
    /// remainders among co-tied winners, and any unallocated percentage).
    pub retained: u64,
    /// Deterministic content hash.
    pub content_hash: u64,
}

// ── Payout Engine ──────────────────────────────────────────────────────

/// Pooled prize distribution over a snapshot of issued tickets.
///
/// Two explicit passes: the first classifies every ticket against the
/// drawn code and counts winners per bracket; the second sizes each
/// winner's share as
/// `floor(floor(percentage * pool / 100) / winners_in_bracket)` and
/// accumulates it onto the owner. The passes are not fused — winner
/// counts must be complete before any share can be sized. Both floors
/// truncate; remainders are never redistributed and are reported as
/// `retained`.
///
/// The engine is a pure function of its inputs; running it at most once
/// per lottery is the orchestrator's lifecycle.
pub struct PayoutEngine {
    table: PrizeBracketTable,
}

impl PayoutEngine {
    /// Create an engine distributing per the given bracket table.
    #[inline(always)]
    pub fn new(table: PrizeBracketTable) -> Self {
        Self { table }
    }

    /// Access the bracket table.
    #[inline(always)]
    pub fn table(&self) -> &PrizeBracketTable {
        &self.table
    }

    /// Distribute `pool` across `tickets` against `drawn_code`.
    pub fn compute(&self, tickets: &[Ticket], drawn_code: u64, pool: u64) -> PayoutReport {
        let width = self.table.digit_width();

        // Pass 1: classify every ticket, counting winners per bracket.
        let mut assignments = Vec::with_capacity(tickets.len());
        let mut winner_counts = vec![0u64; width as usize + 1];
        for ticket in tickets {
            let bracket = bracket_for(ticket.code, drawn_code, width);
            winner_counts[bracket as usize] += 1;
            assignments.push(bracket);
        }

        // Pass 2: size and accumulate each winning ticket's share.
        let mut entitlements: HashMap<u64, u64> = HashMap::new();
        let mut total_distributed: u64 = 0;
        for (ticket, &bracket) in tickets.iter().zip(&assignments) {
            if bracket == 0 {
                continue;
            }
            // bracket > 0 was counted in pass 1, so winners >= 1.
            let winners = winner_counts[bracket as usize];
            let allocation =
                (self.table.percentage_for(bracket) as u128 * pool as u128) / 100;
            let share = (allocation / winners as u128) as u64;
            if share == 0 {
                continue;
            }
            *entitlements.entry(ticket.owner_id).or_insert(0) += share;
            total_distributed += share;
        }

        PayoutReport {
            drawn_code,
            pool,
            winner_counts,
            entitlements,
            total_distributed,
            retained: pool - total_distributed,
            content_hash: Self::report_hash(drawn_code, pool, total_distributed),
        }
    }

    fn report_hash(drawn_code: u64, pool: u64, total_distributed: u64) -> u64 {
        let mut data = [0u8; 24];
        data[0..8].copy_from_slice(&drawn_code.to_le_bytes());
        data[8..16].copy_from_slice(&pool.to_le_bytes());
        data[16..24].copy_from_slice(&total_distributed.to_le_bytes());
        fnv1a(&data)
    }
}

// ── Tests ──────────────────────────────────────────────────────────────
