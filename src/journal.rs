//! Reversible world-state journal.
//!
//! Every state mutation made while executing a call is recorded as a journal
//! entry carrying enough information to undo it. Snapshots are just journal
//! lengths: taking one costs nothing, and reverting to one truncates the
//! journal and replays the truncated entries backwards against the database.

use crate::db::{Account, Database};
use ethereum_types::{Address, H256, U256};

pub type SnapshotId = usize;

#[derive(Clone, Debug)]
pub(crate) enum JournalEntry {
    AccountCreated {
        address: Address,
    },
    AccountDestroyed {
        address: Address,
        prior: Option<Account>,
    },
    BalanceChanged {
        address: Address,
        prior: U256,
    },
    NonceBumped {
        address: Address,
    },
    CodeChanged {
        address: Address,
        prior_code: bytes::Bytes,
    },
    StorageChanged {
        address: Address,
        key: H256,
        prior: H256,
    },
    TransientStorageChanged {
        address: Address,
        key: H256,
        prior: H256,
    },
}

/// Tracks every mutation made since the start of a top-level call so it can
/// be undone on revert without re-deriving the prior state.
#[derive(Clone, Debug, Default)]
pub struct Journal {
    entries: Vec<JournalEntry>,
    /// First-seen ("original", pre-transaction) storage values, used by
    /// SSTORE gas accounting. Populated lazily on first touch.
    original_storage: std::collections::HashMap<(Address, H256), H256>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_snapshot(&self) -> SnapshotId {
        self.entries.len()
    }

    pub fn revert_to_snapshot(&mut self, id: SnapshotId, db: &mut impl Database) {
        while self.entries.len() > id {
            let entry = self.entries.pop().expect("checked non-empty above");
            match entry {
                JournalEntry::AccountCreated { address } => {
                    let _ = db.delete_account(address);
                }
                JournalEntry::AccountDestroyed { address, prior } => {
                    if let Some(account) = prior {
                        db.set_account(address, account);
                    }
                }
                JournalEntry::BalanceChanged { address, prior } => {
                    let mut account = db.get_account(address).unwrap_or_default();
                    account.balance = prior;
                    db.set_account(address, account);
                }
                JournalEntry::NonceBumped { address } => {
                    let mut account = db.get_account(address).unwrap_or_default();
                    account.nonce = account.nonce.saturating_sub(1);
                    db.set_account(address, account);
                }
                JournalEntry::CodeChanged {
                    address,
                    prior_code,
                } => {
                    let mut account = db.get_account(address).unwrap_or_default();
                    account.code = prior_code;
                    db.set_account(address, account);
                }
                JournalEntry::StorageChanged { address, key, prior } => {
                    let _ = db.set_storage(address, key, prior);
                }
                JournalEntry::TransientStorageChanged { address, key, prior } => {
                    db.set_transient_storage(address, key, prior);
                }
            }
        }
    }

    pub fn record_account_created(&mut self, address: Address) {
        self.entries.push(JournalEntry::AccountCreated { address });
    }

    pub fn record_account_destroyed(&mut self, address: Address, prior: Option<Account>) {
        self.entries
            .push(JournalEntry::AccountDestroyed { address, prior });
    }

    pub fn record_balance_change(&mut self, address: Address, prior: U256) {
        self.entries.push(JournalEntry::BalanceChanged { address, prior });
    }

    pub fn record_nonce_bump(&mut self, address: Address) {
        self.entries.push(JournalEntry::NonceBumped { address });
    }

    pub fn record_code_change(&mut self, address: Address, prior_code: bytes::Bytes) {
        self.entries
            .push(JournalEntry::CodeChanged { address, prior_code });
    }

    pub fn record_storage_change(&mut self, address: Address, key: H256, prior: H256) {
        self.original_storage
            .entry((address, key))
            .or_insert(prior);
        self.entries
            .push(JournalEntry::StorageChanged { address, key, prior });
    }

    pub fn record_transient_storage_change(&mut self, address: Address, key: H256, prior: H256) {
        self.entries.push(JournalEntry::TransientStorageChanged {
            address,
            key,
            prior,
        });
    }

    /// The value a storage slot held before this transaction touched it,
    /// used by EIP-2200/3529 SSTORE gas accounting.
    pub fn get_original_storage(&self, address: Address, key: H256, current: H256) -> H256 {
        self.original_storage
            .get(&(address, key))
            .copied()
            .unwrap_or(current)
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Account;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemDb(HashMap<Address, Account>);

    impl Database for MemDb {
        fn get_account(&self, address: Address) -> Option<Account> {
            self.0.get(&address).cloned()
        }
        fn set_account(&mut self, address: Address, account: Account) {
            self.0.insert(address, account);
        }
        fn delete_account(&mut self, address: Address) -> Result<(), crate::common::StatusCode> {
            self.0.remove(&address);
            Ok(())
        }
        fn get_storage(&self, _address: Address, _key: H256) -> H256 {
            H256::zero()
        }
        fn set_storage(
            &mut self,
            _address: Address,
            _key: H256,
            _value: H256,
        ) -> Result<(), crate::common::StatusCode> {
            Ok(())
        }
        fn get_transient_storage(&self, _address: Address, _key: H256) -> H256 {
            H256::zero()
        }
        fn set_transient_storage(&mut self, _address: Address, _key: H256, _value: H256) {}
    }

    #[test]
    fn revert_restores_prior_balance() {
        let mut db = MemDb::default();
        let addr = Address::repeat_byte(1);
        db.set_account(
            addr,
            Account {
                nonce: 0,
                balance: 100.into(),
                code: Default::default(),
            },
        );

        let mut journal = Journal::new();
        let snap = journal.create_snapshot();

        journal.record_balance_change(addr, 100.into());
        let mut account = db.get_account(addr).unwrap();
        account.balance = 50.into();
        db.set_account(addr, account);

        journal.revert_to_snapshot(snap, &mut db);

        assert_eq!(db.get_account(addr).unwrap().balance, 100.into());
    }
}
