//! A `Host` implementation for unit-testing instruction handlers in
//! isolation. Storage and balances are backed by a plain map; `call` and
//! `selfdestruct` never recurse into the interpreter, they just record the
//! `Message` they were given and hand back a canned `call_result` set up by
//! the test. This lets a test assert on exactly what message an instruction
//! built (gas forwarded, value, input slice, `is_static`) without having to
//! run a second frame.

use crate::{
    common::{Message, Output, Revision, StatusCode},
    host::{AccessStatus, Host, StorageStatus, TxContext},
};
use bytes::Bytes;
use ethereum_types::{Address, H256, U256};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

/// A single storage slot, tracking the value present at the start of the
/// (mocked) transaction alongside the current value, mirroring the
/// bookkeeping `Journal` does for real execution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StorageEntry {
    pub original: H256,
    pub value: H256,
    pub is_cold: bool,
}

impl From<H256> for StorageEntry {
    fn from(value: H256) -> Self {
        Self {
            original: value,
            value,
            is_cold: true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MockedAccount {
    pub nonce: u64,
    pub balance: U256,
    pub code: Bytes,
    pub storage: HashMap<H256, StorageEntry>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RecordedData {
    /// Every message passed to `Host::call`, in order.
    pub calls: Vec<Message>,
    /// Every address passed to `Host::access_account`, in order (including
    /// repeats, so tests can check warm/cold transitions).
    pub account_accesses: Vec<Address>,
    pub logs: Vec<(Address, Bytes, Vec<H256>)>,
    pub selfdestructs: Vec<(Address, Address)>,
    pub blockhashes: Vec<u64>,
}

/// Mocked `Host`. `Default` gives an empty world with `Revision::latest()`
/// and a zeroed `TxContext`; tests override what they need via
/// `EvmTester::apply_host_fn`.
#[derive(Debug)]
pub struct MockedHost {
    pub accounts: HashMap<Address, MockedAccount>,
    /// Canned result returned by every `Host::call` invocation.
    pub call_result: Output,
    pub recorded: Mutex<RecordedData>,
    pub tx_context: TxContext,
    pub block_hash: H256,
    pub revision: Revision,
    accessed_accounts: HashSet<Address>,
    accessed_storage_keys: HashSet<(Address, H256)>,
}

impl Default for MockedHost {
    fn default() -> Self {
        Self {
            accounts: HashMap::new(),
            call_result: Output {
                status_code: StatusCode::Success,
                gas_left: 0,
                output_data: Bytes::new(),
                create_address: None,
            },
            recorded: Mutex::new(RecordedData::default()),
            tx_context: TxContext {
                tx_gas_price: U256::zero(),
                tx_origin: Address::zero(),
                block_coinbase: Address::zero(),
                block_number: 0,
                block_timestamp: 0,
                block_gas_limit: i64::MAX as u64,
                block_difficulty: U256::zero(),
                block_prev_randao: U256::zero(),
                chain_id: U256::zero(),
                block_base_fee: U256::zero(),
                blob_base_fee: U256::zero(),
                blob_hashes: Vec::new(),
                beacon_root: H256::zero(),
            },
            block_hash: H256::zero(),
            revision: Revision::latest(),
            accessed_accounts: HashSet::new(),
            accessed_storage_keys: HashSet::new(),
        }
    }
}

impl Host for MockedHost {
    fn account_exists(&self, address: Address) -> bool {
        self.accounts.contains_key(&address)
    }

    fn get_storage(&self, address: Address, key: H256) -> H256 {
        self.accounts
            .get(&address)
            .and_then(|a| a.storage.get(&key))
            .map(|e| e.value)
            .unwrap_or_default()
    }

    fn get_original_storage(&self, address: Address, key: H256) -> H256 {
        self.accounts
            .get(&address)
            .and_then(|a| a.storage.get(&key))
            .map(|e| e.original)
            .unwrap_or_default()
    }

    fn set_storage(
        &mut self,
        address: Address,
        key: H256,
        value: H256,
    ) -> Result<StorageStatus, StatusCode> {
        let account = self.accounts.entry(address).or_default();
        let entry = account.storage.entry(key).or_default();
        let current = entry.value;
        let status = if current == value {
            StorageStatus::Unchanged
        } else if entry.original == current {
            if entry.original.is_zero() {
                StorageStatus::Added
            } else if value.is_zero() {
                StorageStatus::Deleted
            } else {
                StorageStatus::Modified
            }
        } else {
            StorageStatus::ModifiedAgain
        };
        entry.value = value;
        Ok(status)
    }

    fn get_transient_storage(&self, _address: Address, _key: H256) -> H256 {
        H256::zero()
    }

    fn set_transient_storage(
        &mut self,
        _address: Address,
        _key: H256,
        _value: H256,
    ) -> Result<(), StatusCode> {
        Ok(())
    }

    fn get_balance(&self, address: Address) -> U256 {
        self.accounts
            .get(&address)
            .map(|a| a.balance)
            .unwrap_or_default()
    }

    fn get_code_size(&self, address: Address) -> U256 {
        self.accounts
            .get(&address)
            .map(|a| a.code.len().into())
            .unwrap_or_default()
    }

    fn get_code_hash(&self, address: Address) -> H256 {
        use sha3::{Digest, Keccak256};
        self.accounts
            .get(&address)
            .map(|a| H256::from_slice(&Keccak256::digest(&a.code)))
            .unwrap_or_default()
    }

    fn copy_code(&self, address: Address, offset: usize, buffer: &mut [u8]) -> usize {
        let code = self
            .accounts
            .get(&address)
            .map(|a| a.code.clone())
            .unwrap_or_default();
        if offset >= code.len() {
            return 0;
        }
        let n = buffer.len().min(code.len() - offset);
        buffer[..n].copy_from_slice(&code[offset..offset + n]);
        n
    }

    fn selfdestruct(&mut self, address: Address, beneficiary: Address) -> Result<(), StatusCode> {
        self.recorded
            .lock()
            .selfdestructs
            .push((address, beneficiary));
        Ok(())
    }

    fn call(&mut self, msg: &Message) -> Result<Output, StatusCode> {
        self.recorded.lock().calls.push(msg.clone());
        Ok(self.call_result.clone())
    }

    fn get_tx_context(&self) -> TxContext {
        self.tx_context.clone()
    }

    fn get_block_hash(&self, number: u64) -> H256 {
        self.recorded.lock().blockhashes.push(number);
        self.block_hash
    }

    fn emit_log(&mut self, address: Address, data: &[u8], topics: &[H256]) {
        self.recorded
            .lock()
            .logs
            .push((address, Bytes::copy_from_slice(data), topics.to_vec()));
    }

    fn access_account(&mut self, address: Address) -> AccessStatus {
        self.recorded.lock().account_accesses.push(address);
        if self.accessed_accounts.insert(address) {
            AccessStatus::Cold
        } else {
            AccessStatus::Warm
        }
    }

    fn access_storage(&mut self, address: Address, key: H256) -> AccessStatus {
        if self.accessed_storage_keys.insert((address, key)) {
            AccessStatus::Cold
        } else {
            AccessStatus::Warm
        }
    }

    fn revision(&self) -> Revision {
        self.revision
    }
}
