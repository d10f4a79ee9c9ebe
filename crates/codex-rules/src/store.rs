//! The resource store: visible symbol counts on a player's board.
//!
//! All mutation is checked. Adding past `u32::MAX` or removing more than is
//! held returns an error and leaves the store untouched.

use std::collections::BTreeMap;

use codex_types::Symbol;

use crate::error::RulesError;

/// Symbol counts for one board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceStore {
    counts: BTreeMap<Symbol, u32>,
}

impl ResourceStore {
    /// An empty store.
    pub const fn new() -> Self {
        Self {
            counts: BTreeMap::new(),
        }
    }

    /// How many of `symbol` are visible.
    pub fn count(&self, symbol: Symbol) -> u32 {
        self.counts.get(&symbol).copied().unwrap_or(0)
    }

    /// Add `quantity` of `symbol`.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::ArithmeticOverflow`] if the count would exceed
    /// `u32::MAX`.
    pub fn add(&mut self, symbol: Symbol, quantity: u32) -> Result<(), RulesError> {
        if quantity == 0 {
            return Ok(());
        }
        let current = self.count(symbol);
        let updated = current
            .checked_add(quantity)
            .ok_or_else(|| RulesError::ArithmeticOverflow {
                context: format!("adding {quantity} {symbol:?} to {current}"),
            })?;
        self.counts.insert(symbol, updated);
        Ok(())
    }

    /// Remove `quantity` of `symbol`.
    ///
    /// # Errors
    ///
    /// Returns [`RulesError::ResourceUnderflow`] if fewer are held.
    pub fn remove(&mut self, symbol: Symbol, quantity: u32) -> Result<(), RulesError> {
        if quantity == 0 {
            return Ok(());
        }
        let available = self.count(symbol);
        let remaining =
            available
                .checked_sub(quantity)
                .ok_or(RulesError::ResourceUnderflow {
                    symbol,
                    requested: quantity,
                    available,
                })?;
        if remaining == 0 {
            self.counts.remove(&symbol);
        } else {
            self.counts.insert(symbol, remaining);
        }
        Ok(())
    }

    /// Whether every count in `requirement` is met.
    pub fn satisfies(&self, requirement: &BTreeMap<Symbol, u32>) -> bool {
        requirement
            .iter()
            .all(|(&symbol, &needed)| self.count(symbol) >= needed)
    }

    /// The lowest count among `kinds`, or zero when `kinds` is empty.
    pub fn min_of(&self, kinds: &[Symbol]) -> u32 {
        kinds.iter().map(|&k| self.count(k)).min().unwrap_or(0)
    }

    /// How many complete copies of `per_set` the store holds.
    ///
    /// Entries asking for zero of a symbol are ignored; an empty set (or one
    /// made only of zeros) is never complete.
    pub fn complete_sets(&self, per_set: &BTreeMap<Symbol, u32>) -> u32 {
        per_set
            .iter()
            .filter_map(|(&symbol, &needed)| self.count(symbol).checked_div(needed))
            .min()
            .unwrap_or(0)
    }

    /// Non-zero counts in symbol order.
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, u32)> + '_ {
        self.counts.iter().map(|(&s, &n)| (s, n))
    }

    /// A copy of the non-zero counts.
    pub fn to_map(&self) -> BTreeMap<Symbol, u32> {
        self.counts.clone()
    }
}
