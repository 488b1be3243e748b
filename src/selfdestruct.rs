//! SELFDESTRUCT deferral and EIP-6780 scoping.
//!
//! Balances and accounts are not torn down the instant SELFDESTRUCT runs;
//! the destruction is recorded here and applied once the enclosing
//! transaction finishes, matching the real protocol's end-of-transaction
//! sweep. Post-Cancun (EIP-6780) only contracts created earlier in the same
//! transaction are actually removed; everyone else just has their balance
//! swept to the beneficiary.

use ethereum_types::Address;
use std::collections::HashSet;

#[derive(Clone, Debug, Default)]
pub struct SelfDestructTracker {
    /// Contracts marked for destruction, each with its chosen beneficiary.
    marked: Vec<(Address, Address)>,
    /// Contracts created within the current transaction, consulted for
    /// EIP-6780 scoping.
    created_in_tx: HashSet<Address>,
}

impl SelfDestructTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&mut self, address: Address, beneficiary: Address) {
        self.marked.push((address, beneficiary));
    }

    pub fn record_created(&mut self, address: Address) {
        self.created_in_tx.insert(address);
    }

    /// Returns the accounts that should be fully removed at the end of the
    /// transaction: pre-Cancun, everything marked; from Cancun on, only
    /// accounts created within the same transaction (EIP-6780).
    pub fn accounts_to_destroy(&self, restrict_to_same_tx: bool) -> Vec<(Address, Address)> {
        self.marked
            .iter()
            .copied()
            .filter(|(addr, _)| !restrict_to_same_tx || self.created_in_tx.contains(addr))
            .collect()
    }

    /// Every marked account, regardless of scoping: even when EIP-6780
    /// prevents account removal, the beneficiary still receives the balance.
    pub fn all_marked(&self) -> &[(Address, Address)] {
        &self.marked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pre_cancun_destroys_everything_marked() {
        let mut t = SelfDestructTracker::new();
        let addr = Address::repeat_byte(1);
        let beneficiary = Address::repeat_byte(2);
        t.mark(addr, beneficiary);
        assert_eq!(t.accounts_to_destroy(false), vec![(addr, beneficiary)]);
    }

    #[test]
    fn cancun_only_destroys_same_tx_creations() {
        let mut t = SelfDestructTracker::new();
        let created = Address::repeat_byte(1);
        let preexisting = Address::repeat_byte(2);
        let beneficiary = Address::repeat_byte(3);
        t.record_created(created);
        t.mark(created, beneficiary);
        t.mark(preexisting, beneficiary);

        let destroyed = t.accounts_to_destroy(true);
        assert_eq!(destroyed, vec![(created, beneficiary)]);
        assert_eq!(t.all_marked().len(), 2);
    }
}
