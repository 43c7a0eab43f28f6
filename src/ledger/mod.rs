use serde::{Deserialize, Serialize};

use crate::errors::LedgerError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub item: String,
    pub amount: f64,
}

/// Running list of trip expenses. Amounts are plain numbers in one currency.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpenseLedger {
    entries: Vec<Expense>,
}

impl ExpenseLedger {
    pub fn add(&mut self, item: &str, amount: f64) -> Result<(), LedgerError> {
        let item = item.trim();
        if item.is_empty() {
            return Err(LedgerError::EmptyItem);
        }
        if !(amount.is_finite() && amount > 0.0) {
            return Err(LedgerError::NonPositiveAmount);
        }
        self.entries.push(Expense { item: item.to_string(), amount });
        Ok(())
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|e| e.amount).sum()
    }

    /// Equal share per traveller; `None` for zero travellers.
    pub fn split(&self, travelers: u32) -> Option<f64> {
        (travelers > 0).then(|| self.total() / f64::from(travelers))
    }

    /// Most recent first.
    pub fn recent(&self) -> impl Iterator<Item = &Expense> {
        self.entries.iter().rev()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn totals_and_splits() {
        let mut l = ExpenseLedger::default();
        l.add("Cab", 450.0).unwrap();
        l.add(" Fish thali ", 350.5).unwrap();
        assert_eq!(l.total(), 800.5);
        assert_eq!(l.split(2), Some(400.25));
        assert_eq!(l.split(0), None);
        assert_eq!(l.recent().next().unwrap().item, "Fish thali");
    }

    #[test]
    fn rejects_bad_entries() {
        let mut l = ExpenseLedger::default();
        assert_eq!(l.add("  ", 10.0), Err(LedgerError::EmptyItem));
        assert_eq!(l.add("Cab", 0.0), Err(LedgerError::NonPositiveAmount));
        assert_eq!(l.add("Cab", -5.0), Err(LedgerError::NonPositiveAmount));
        assert_eq!(l.add("Cab", f64::NAN), Err(LedgerError::NonPositiveAmount));
        assert!(l.is_empty());
    }

    #[test]
    fn clear_empties() {
        let mut l = ExpenseLedger::default();
        l.add("Cab", 1.0).unwrap();
        l.clear();
        assert_eq!(l.len(), 0);
        assert_eq!(l.total(), 0.0);
    }
}
