/*
    ALICE-Lottery
    Copyright (C) 2026 Moroya Sakamoto
*/

use std::collections::HashMap;

use crate::bracket::{pow10, MAX_DIGIT_WIDTH};
use crate::random::CodeSource;
use crate::ticket::Ticket;

/// Error returned when a ticket allocation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    /// Zero-quantity purchase.
    InvalidAmount,
    /// The shared per-call retry budget was exhausted before every unit
    /// found a free code. Nothing was committed.
    MaxRetriesExceeded { attempts: u32 },
}

/// Registry of issued tickets.
///
/// Owns the injected [`CodeSource`] and the code ↔ owner bijection.
/// Allocation draws candidate codes and redraws on collision, with one
/// retry counter shared across the whole call: the counter bounds the
/// total randomness cost of a single purchase rather than of each unit.
/// A failed call commits nothing — codes are staged locally and merged
/// only after every unit has found a free code.
///
/// The registry is append-only; it never forgets a ticket. Phase policy
/// (no allocation after the draw) is the orchestrator's concern.
pub struct TicketRegistry {
    source: CodeSource,
    modulus: u64,
    max_retries: u32,
    /// code → owning account.
    code_owner: HashMap<u64, u64>,
    /// owner → codes in purchase order.
    owner_codes: HashMap<u64, Vec<u64>>,
    /// Every issued ticket in global purchase order.
    tickets: Vec<Ticket>,
}

impl TicketRegistry {
    /// Create an empty registry issuing `digit_width`-digit codes.
    ///
    /// `digit_width` must be in `1..=`[`MAX_DIGIT_WIDTH`] and
    /// `max_retries` non-zero; the orchestrator validates both before
    /// construction.
    pub fn new(digit_width: u32, max_retries: u32, source: CodeSource) -> Self {
        assert!(
            (1..=MAX_DIGIT_WIDTH).contains(&digit_width),
            "digit width out of range"
        );
        assert!(max_retries > 0, "retry budget must be non-zero");

        Self {
            source,
            modulus: pow10(digit_width),
            max_retries,
            code_owner: HashMap::new(),
            owner_codes: HashMap::new(),
            tickets: Vec::new(),
        }
    }

    /// Allocate `count` tickets to `owner_id`, all-or-nothing.
    ///
    /// Every candidate that collides with an issued or staged code costs
    /// one unit of the call's shared retry budget; once the budget is
    /// exceeded the whole call fails and the registry is left exactly as
    /// it was. On success the new tickets are returned in draw order with
    /// consecutive global issuance indices.
    pub fn allocate(&mut self, owner_id: u64, count: u64) -> Result<Vec<Ticket>, AllocationError> {
        if count == 0 {
            return Err(AllocationError::InvalidAmount);
        }

        let mut staged: Vec<u64> = Vec::with_capacity(count as usize);
        let mut attempts: u32 = 0;

        for _ in 0..count {
            loop {
                let candidate = self.source.next(self.modulus);
                if !self.code_owner.contains_key(&candidate) && !staged.contains(&candidate) {
                    staged.push(candidate);
                    break;
                }
                attempts += 1;
                if attempts > self.max_retries {
                    return Err(AllocationError::MaxRetriesExceeded { attempts });
                }
            }
        }

        // Every unit found a free code; commit the whole batch.
        let mut issued = Vec::with_capacity(staged.len());
        for code in staged {
            let ticket = Ticket {
                code,
                owner_id,
                issued_order: self.tickets.len() as u64,
            };
            self.code_owner.insert(code, owner_id);
            self.owner_codes.entry(owner_id).or_default().push(code);
            self.tickets.push(ticket.clone());
            issued.push(ticket);
        }

        Ok(issued)
    }

    /// True if `code` has been issued.
    #[inline(always)]
    pub fn exists(&self, code: u64) -> bool {
        self.code_owner.contains_key(&code)
    }

    /// Owner of `code`, if issued.
    #[inline(always)]
    pub fn owner_of(&self, code: u64) -> Option<u64> {
        self.code_owner.get(&code).copied()
    }

    /// Codes held by `owner_id` in purchase order (empty for strangers).
    #[inline(always)]
    pub fn tickets_of(&self, owner_id: u64) -> &[u64] {
        self.owner_codes
            .get(&owner_id)
            .map(|codes| codes.as_slice())
            .unwrap_or(&[])
    }

    /// Every issued ticket in global purchase order.
    #[inline(always)]
    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    /// Every issued code in global purchase order.
    pub fn all_codes(&self) -> Vec<u64> {
        self.tickets.iter().map(|t| t.code).collect()
    }

    /// Number of issued tickets.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    /// True when no ticket has been issued yet.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    /// Exclusive upper bound of the code space (`10^digit_width`).
    #[inline(always)]
    pub fn modulus(&self) -> u64 {
        self.modulus
    }
}
