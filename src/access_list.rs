//! EIP-2929 warm/cold access tracking.

use ethereum_types::{Address, H256};
use std::collections::HashSet;

/// Tracks which addresses and storage slots have been touched during the
/// current transaction. Pre-Berlin callers simply never consult this and
/// every access is priced as warm.
#[derive(Clone, Debug, Default)]
pub struct AccessList {
    addresses: HashSet<Address>,
    storage_slots: HashSet<(Address, H256)>,
}

impl AccessList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `address` as accessed, returning whether it was cold (i.e. this
    /// is the first access this transaction).
    pub fn access_address(&mut self, address: Address) -> bool {
        self.addresses.insert(address)
    }

    pub fn is_warm(&self, address: Address) -> bool {
        self.addresses.contains(&address)
    }

    /// Marks `(address, key)` as accessed, returning whether it was cold.
    pub fn access_storage_slot(&mut self, address: Address, key: H256) -> bool {
        self.storage_slots.insert((address, key))
    }

    pub fn is_warm_slot(&self, address: Address, key: H256) -> bool {
        self.storage_slots.contains(&(address, key))
    }

    /// EIP-2930 / EIP-3651: pre-warm the entries a transaction specifies
    /// up front (sender, destination, coinbase, access-list entries) before
    /// execution starts.
    pub fn pre_warm_address(&mut self, address: Address) {
        self.addresses.insert(address);
    }

    pub fn pre_warm_storage_slot(&mut self, address: Address, key: H256) {
        self.storage_slots.insert((address, key));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_access_is_cold() {
        let mut al = AccessList::new();
        let addr = Address::repeat_byte(3);
        assert!(!al.is_warm(addr));
        assert!(al.access_address(addr));
        assert!(al.is_warm(addr));
        assert!(!al.access_address(addr));
    }

    #[test]
    fn pre_warming_counts_as_accessed() {
        let mut al = AccessList::new();
        let addr = Address::repeat_byte(4);
        al.pre_warm_address(addr);
        assert!(al.is_warm(addr));
        assert!(!al.access_address(addr));
    }
}
