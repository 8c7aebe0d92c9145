/*
    ALICE-Lottery
    Copyright (C) 2026 Moroya Sakamoto
*/

/// An audit journal entry.
#[derive(Debug, Clone)]
pub struct JournalEntry {
    /// Sequential entry number, 1-based.
    pub sequence: u64,
    /// Recorded event.
    pub event: LotteryEvent,
}

/// Events recorded in the lottery audit journal.
///
/// The engine is clockless, so entries carry no timestamp; hosts that
/// need wall-clock attribution stamp it at their own boundary.
#[derive(Debug, Clone)]
pub enum LotteryEvent {
    TicketsAllocated {
        owner_id: u64,
        count: u64,
    },
    PoolCredited {
        amount: u64,
    },
    CodeRevealed {
        drawn_code: u64,
    },
    PayoutComputed {
        winning_tickets: u64,
        total_distributed: u64,
    },
    PrizeWithdrawn {
        owner_id: u64,
        amount: u64,
    },
}

/// Append-only audit journal.
///
/// Sequence numbers start at 1 and increment monotonically with each
/// recorded event. The journal never removes entries.
pub struct LotteryJournal {
    entries: Vec<JournalEntry>,
    next_seq: u64,
}

impl LotteryJournal {
    /// Create a new, empty journal. The first recorded entry will have
    /// sequence 1.
    #[inline(always)]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 1,
        }
    }

    /// Append an event to the journal.
    pub fn record(&mut self, event: LotteryEvent) {
        let sequence = self.next_seq;
        self.next_seq += 1;
        self.entries.push(JournalEntry { sequence, event });
    }

    /// Return a slice of all journal entries in order.
    #[inline(always)]
    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    /// Return the number of entries in the journal.
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return true when the journal contains no entries.
    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Return a reference to the most recent entry, or `None` if the
    /// journal is empty.
    #[inline(always)]
    pub fn last_entry(&self) -> Option<&JournalEntry> {
        self.entries.last()
    }
}

impl Default for LotteryJournal {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}
