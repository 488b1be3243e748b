//! External world-state backend.
//!
//! `Database` is the capability surface a host implementation uses to read
//! and write account state. It knows nothing about gas, call depth, or
//! journaling: those live in `Host`/`Journal`/`AccessList`, which sit above
//! it. A `Database` implementation is free to back onto an in-memory map, a
//! trie, or a remote RPC endpoint.

use crate::common::StatusCode;
use bytes::Bytes;
use ethereum_types::{Address, H256, U256};

/// An account's nonce/balance/code, as seen by the database layer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Account {
    pub nonce: u64,
    pub balance: U256,
    pub code: Bytes,
}

pub trait Database {
    fn get_account(&self, address: Address) -> Option<Account>;
    fn set_account(&mut self, address: Address, account: Account);
    fn delete_account(&mut self, address: Address) -> Result<(), StatusCode>;

    fn get_storage(&self, address: Address, key: H256) -> H256;
    fn set_storage(&mut self, address: Address, key: H256, value: H256) -> Result<(), StatusCode>;

    fn get_transient_storage(&self, address: Address, key: H256) -> H256;
    fn set_transient_storage(&mut self, address: Address, key: H256, value: H256);

    fn get_code_by_address(&self, address: Address) -> Bytes {
        self.get_account(address)
            .map(|a| a.code)
            .unwrap_or_default()
    }

    /// Database-level checkpointing, independent of `Journal`'s in-memory
    /// undo log: used at outer-transaction boundaries by callers that want
    /// to batch several transactions and commit or discard them together.
    /// The default implementation is a no-op pass-through, appropriate for
    /// a `Database` backed by storage that is itself transactional (or
    /// simply discarded wholesale on failure by its owner).
    fn create_snapshot(&mut self) -> usize {
        0
    }

    fn revert_to_snapshot(&mut self, _id: usize) {}

    fn commit_snapshot(&mut self, _id: usize) {}
}

/// A wrapper that rejects every mutation. Used to drive static-context calls
/// through a `Database` without duplicating the read path.
pub struct StaticDatabase<'a, D: Database>(pub &'a mut D);

impl<'a, D: Database> Database for StaticDatabase<'a, D> {
    fn get_account(&self, address: Address) -> Option<Account> {
        self.0.get_account(address)
    }

    fn set_account(&mut self, _address: Address, _account: Account) {
        // no-op: writes through a static wrapper are a programming error,
        // the static-mode check happens earlier in the instruction handler.
    }

    fn delete_account(&mut self, _address: Address) -> Result<(), StatusCode> {
        Err(StatusCode::StaticModeViolation)
    }

    fn get_storage(&self, address: Address, key: H256) -> H256 {
        self.0.get_storage(address, key)
    }

    fn set_storage(
        &mut self,
        _address: Address,
        _key: H256,
        _value: H256,
    ) -> Result<(), StatusCode> {
        Err(StatusCode::StaticModeViolation)
    }

    fn get_transient_storage(&self, address: Address, key: H256) -> H256 {
        self.0.get_transient_storage(address, key)
    }

    fn set_transient_storage(&mut self, _address: Address, _key: H256, _value: H256) {}
}
