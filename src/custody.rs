/*
    ALICE-Lottery
    Copyright (C) 2026 Moroya Sakamoto
*/

use std::collections::HashMap;

use crate::payout::PayoutReport;

/// Error returned when a custody operation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustodyError {
    /// The account cannot cover the requested debit.
    InsufficientBalance {
        owner_id: u64,
        required: u64,
        available: u64,
    },
    /// Withdrawal attempted with a zero entitlement.
    NothingOwed { owner_id: u64 },
}

/// Prize fund custody.
///
/// Holds withdrawable balances per participant. Balances are unsigned and
/// every debit is checked first, so an account can never go negative.
/// Applying a payout report turns the engine's entitlement table into
/// withdrawable balances; the at-most-once consumption of a report is the
/// lottery lifecycle's guarantee (a lottery closes, and therefore
/// distributes, exactly once).
pub struct PrizeVault {
    balances: HashMap<u64, u64>,
}

impl PrizeVault {
    /// Create an empty vault.
    #[inline(always)]
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
        }
    }

    /// Credit `amount` to `owner_id`, creating the account if needed.
    #[inline(always)]
    pub fn credit(&mut self, owner_id: u64, amount: u64) {
        *self.balances.entry(owner_id).or_insert(0) += amount;
    }

    /// Debit `amount` from `owner_id`.
    ///
    /// Checks the balance before mutating anything; a failed debit leaves
    /// the vault unchanged.
    pub fn debit(&mut self, owner_id: u64, amount: u64) -> Result<(), CustodyError> {
        let available = self.balance_of(owner_id);
        if available < amount {
            return Err(CustodyError::InsufficientBalance {
                owner_id,
                required: amount,
                available,
            });
        }
        if let Some(balance) = self.balances.get_mut(&owner_id) {
            *balance -= amount;
        }
        Ok(())
    }

    /// Credit every entitlement from a payout report.
    pub fn apply_report(&mut self, report: &PayoutReport) {
        for (&owner_id, &amount) in &report.entitlements {
            self.credit(owner_id, amount);
        }
    }

    /// Withdraw the full balance of `owner_id`, returning the amount paid
    /// out. A zero balance fails with `NothingOwed`.
    pub fn withdraw_all(&mut self, owner_id: u64) -> Result<u64, CustodyError> {
        let amount = self.balance_of(owner_id);
        if amount == 0 {
            return Err(CustodyError::NothingOwed { owner_id });
        }
        self.balances.insert(owner_id, 0);
        Ok(amount)
    }

    /// Current balance of `owner_id` (zero for unknown accounts — never
    /// negative, never undefined).
    #[inline(always)]
    pub fn balance_of(&self, owner_id: u64) -> u64 {
        self.balances.get(&owner_id).copied().unwrap_or(0)
    }

    /// Sum of all balances held.
    pub fn total_held(&self) -> u64 {
        self.balances.values().sum()
    }
}

impl Default for PrizeVault {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}
