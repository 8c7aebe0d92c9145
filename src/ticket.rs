/*
    ALICE-Lottery
    Copyright (C) 2026 Moroya Sakamoto
*/

/// A ticket issued to a participant, identified by its fixed-width code.
///
/// Tickets are immutable once issued and are retained for the lifetime of
/// the lottery so that every one of them can be classified against the
/// drawn code at closure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    /// Fixed-digit-width code, unique across the registry: `code < 10^D`.
    pub code: u64,
    /// Owning participant's account identifier.
    pub owner_id: u64,
    /// Global issuance index (0-based purchase order).
    pub issued_order: u64,
}
