//! Top-level orchestration.
//!
//! `Evm` is the concrete `Host`: it wires a `Database` together with the
//! journal, access list and selfdestruct tracker, and drives the recursive
//! CALL/CREATE machinery that the instruction handlers call back into.
//! Static-context write protection is enforced at the instruction-handler
//! level (see `external::sstore`/`tstore`/`do_log`/`selfdestruct` and
//! `call::do_create`), matching EIP-214; `db::StaticDatabase` remains
//! available as a belt-and-braces wrapper for callers who want to enforce
//! the same rule at the `Database` boundary too.

use crate::{
    common::{CallKind, Message, Output, Revision, StatusCode},
    db::{Account, Database},
    host::{AccessStatus, Host, StorageStatus, TxContext},
    interpreter::AnalyzedCode,
    journal::Journal,
    precompiles,
    selfdestruct::SelfDestructTracker,
    access_list::AccessList,
};
use bytes::Bytes;
use ethereum_types::{Address, H256, U256};
use sha3::{Digest, Keccak256};
use std::collections::HashMap;
use tracing::{debug, instrument, trace, warn};

/// Cost of persisting one byte of freshly deployed contract code.
const GAS_CODE_DEPOSIT: i64 = 200;
/// Max deployed contract code size (EIP-170), Spurious Dragon onward.
const MAX_CODE_SIZE: usize = crate::MAX_CODE_SIZE;
/// Max call/create depth.
const MAX_CALL_DEPTH: i32 = 1024;

/// EIP-4788 beacon-roots contract address.
fn beacon_roots_address() -> Address {
    Address::from([
        0x00, 0x0F, 0x3d, 0xf6, 0xD7, 0x32, 0x80, 0x7E, 0xf1, 0x31, 0x9f, 0xB7, 0xB8, 0xbB, 0x85,
        0x22, 0xd0, 0xBe, 0xac, 0x02,
    ])
}

/// System address allowed to write the beacon-roots ring buffer.
fn system_address() -> Address {
    let mut bytes = [0xff_u8; 20];
    bytes[19] = 0xfe;
    Address::from(bytes)
}

const BEACON_ROOTS_RING_BUFFER_LEN: u64 = 8191;

/// A single emitted log. Truncated alongside journal entries on revert.
#[derive(Clone, Debug, PartialEq)]
pub struct Log {
    pub address: Address,
    pub topics: Vec<H256>,
    pub data: Bytes,
}

fn failed(status_code: StatusCode, gas_left: i64) -> Output {
    Output {
        status_code,
        gas_left,
        output_data: Bytes::new(),
        create_address: None,
    }
}

/// RLP-encodes a single byte string, for the narrow two-element
/// `[sender, nonce]` list CREATE's address formula needs. Neither operand
/// this crate ever RLP-encodes is long enough to need RLP's long-form
/// length prefix, so only the short-string/short-list encodings are
/// implemented.
fn rlp_encode_short_string(b: &[u8]) -> Vec<u8> {
    if b.len() == 1 && b[0] < 0x80 {
        vec![b[0]]
    } else {
        let mut out = Vec::with_capacity(1 + b.len());
        out.push(0x80 + b.len() as u8);
        out.extend_from_slice(b);
        out
    }
}

fn rlp_encode_short_list(items: &[Vec<u8>]) -> Vec<u8> {
    let payload: Vec<u8> = items.iter().flatten().copied().collect();
    let mut out = Vec::with_capacity(1 + payload.len());
    out.push(0xc0 + payload.len() as u8);
    out.extend_from_slice(&payload);
    out
}

fn create_address(sender: Address, nonce: u64) -> Address {
    let mut nonce_bytes = nonce.to_be_bytes().to_vec();
    while nonce_bytes.len() > 1 && nonce_bytes[0] == 0 {
        nonce_bytes.remove(0);
    }
    if nonce == 0 {
        nonce_bytes.clear();
    }

    let encoded = rlp_encode_short_list(&[
        rlp_encode_short_string(sender.as_bytes()),
        rlp_encode_short_string(&nonce_bytes),
    ]);
    let hash = Keccak256::digest(&encoded);
    Address::from_slice(&hash[12..])
}

fn create2_address(sender: Address, salt: H256, init_code: &[u8]) -> Address {
    let init_code_hash = Keccak256::digest(init_code);
    let mut buf = Vec::with_capacity(1 + 20 + 32 + 32);
    buf.push(0xff);
    buf.extend_from_slice(sender.as_bytes());
    buf.extend_from_slice(salt.as_bytes());
    buf.extend_from_slice(&init_code_hash);
    let hash = Keccak256::digest(&buf);
    Address::from_slice(&hash[12..])
}

/// Wraps a `Database` with the journal, access list, selfdestruct tracker
/// and transaction context needed to serve as a `Host`, and drives the
/// recursive CALL/CREATE orchestration.
pub struct Evm<'d, D: Database> {
    db: &'d mut D,
    journal: Journal,
    access_list: AccessList,
    selfdestructs: SelfDestructTracker,
    logs: Vec<Log>,
    tx_context: TxContext,
    revision: Revision,
    block_hashes: HashMap<u64, H256>,
}

impl<'d, D: Database> Evm<'d, D> {
    pub fn new(db: &'d mut D, tx_context: TxContext, revision: Revision) -> Self {
        let mut access_list = AccessList::new();
        access_list.pre_warm_address(tx_context.tx_origin);
        if revision >= Revision::Shanghai {
            access_list.pre_warm_address(tx_context.block_coinbase);
        }

        Self {
            db,
            journal: Journal::new(),
            access_list,
            selfdestructs: SelfDestructTracker::new(),
            logs: Vec::new(),
            tx_context,
            revision,
            block_hashes: HashMap::new(),
        }
    }

    /// Seeds a historical block hash so `BLOCKHASH` can resolve it. Only the
    /// most recent 256 blocks are meaningful; older entries are simply never
    /// looked up.
    pub fn set_block_hash(&mut self, number: u64, hash: H256) {
        self.block_hashes.insert(number, hash);
    }

    /// Pre-warms an EIP-2930 access list entry before the transaction runs.
    pub fn pre_warm(&mut self, address: Address, keys: &[H256]) {
        self.access_list.pre_warm_address(address);
        for &key in keys {
            self.access_list.pre_warm_storage_slot(address, key);
        }
    }

    pub fn logs(&self) -> &[Log] {
        &self.logs
    }

    /// Top-level transaction entry point. Pre-warms `msg`'s destination,
    /// runs it to completion, then sweeps any SELFDESTRUCTs recorded during
    /// execution (EIP-6780 scoping applies from Cancun onward).
    #[instrument(skip(self, msg), fields(depth = msg.depth))]
    pub fn transact(&mut self, msg: Message) -> Result<Output, StatusCode> {
        self.access_list.pre_warm_address(msg.destination);
        let output = Host::call(self, &msg)?;
        self.finalize_selfdestructs();
        Ok(output)
    }

    fn finalize_selfdestructs(&mut self) {
        for &(address, beneficiary) in self.selfdestructs.all_marked() {
            let Some(account) = self.db.get_account(address) else {
                continue;
            };

            if !account.balance.is_zero() {
                let mut beneficiary_account = self.db.get_account(beneficiary).unwrap_or_default();
                self.journal
                    .record_balance_change(beneficiary, beneficiary_account.balance);
                beneficiary_account.balance += account.balance;
                self.db.set_account(beneficiary, beneficiary_account);

                self.journal.record_balance_change(address, account.balance);
                let mut zeroed = account;
                zeroed.balance = U256::zero();
                self.db.set_account(address, zeroed);
            }
        }

        let restrict_to_same_tx = self.revision >= Revision::Cancun;
        for (address, _) in self.selfdestructs.accounts_to_destroy(restrict_to_same_tx) {
            debug!(?address, "selfdestruct sweep removing account");
            self.journal
                .record_account_destroyed(address, self.db.get_account(address));
            let _ = self.db.delete_account(address);
        }
    }

    fn transfer_balance(&mut self, from: Address, to: Address, value: U256) -> Result<(), StatusCode> {
        let mut from_account = self.db.get_account(from).unwrap_or_default();
        if from_account.balance < value {
            return Err(StatusCode::InsufficientBalance);
        }
        self.journal.record_balance_change(from, from_account.balance);
        from_account.balance -= value;
        self.db.set_account(from, from_account);

        let mut to_account = self.db.get_account(to).unwrap_or_default();
        self.journal.record_balance_change(to, to_account.balance);
        to_account.balance += value;
        self.db.set_account(to, to_account);
        Ok(())
    }

    /// EIP-7702: an EOA whose code is exactly a delegation designator
    /// (`0xef0100` followed by a 20-byte address) executes the delegate's
    /// code instead of its own.
    fn resolve_code(&self, address: Address) -> Bytes {
        let code = self.db.get_code_by_address(address);
        if code.len() == 23 && code[0] == 0xef && code[1] == 0x01 && code[2] == 0x00 {
            let delegate = Address::from_slice(&code[3..23]);
            self.db.get_code_by_address(delegate)
        } else {
            code
        }
    }

    /// Services both the regular-read (32-byte input) and the
    /// system-write (64-byte input from `system_address()`) shapes of the
    /// beacon-roots contract (EIP-4788).
    fn run_beacon_roots(&mut self, msg: &Message) -> Output {
        if msg.sender == system_address() && msg.input_data.len() == 64 {
            let timestamp = U256::from_big_endian(&msg.input_data[0..32]);
            let root = H256::from_slice(&msg.input_data[32..64]);
            let slot: U256 = (timestamp.low_u64() % BEACON_ROOTS_RING_BUFFER_LEN).into();
            let timestamp_slot: U256 = slot + U256::from(BEACON_ROOTS_RING_BUFFER_LEN);
            let address = beacon_roots_address();
            let _ = self.set_storage(address, H256(slot.into()), root);
            let _ = self.set_storage(address, H256(timestamp_slot.into()), H256(timestamp.into()));
            return Output {
                status_code: StatusCode::Success,
                gas_left: msg.gas,
                output_data: Bytes::new(),
                create_address: None,
            };
        }

        if msg.input_data.len() == 32 {
            let requested = U256::from_big_endian(&msg.input_data);
            let address = beacon_roots_address();
            let slot: U256 = (requested.low_u64() % BEACON_ROOTS_RING_BUFFER_LEN).into();
            let timestamp_slot: U256 = slot + U256::from(BEACON_ROOTS_RING_BUFFER_LEN);
            let stored_timestamp = self.get_storage(address, H256(timestamp_slot.into()));
            if U256::from_big_endian(stored_timestamp.as_bytes()) == requested {
                let root = self.get_storage(address, H256(slot.into()));
                return Output {
                    status_code: StatusCode::Success,
                    gas_left: msg.gas,
                    output_data: Bytes::copy_from_slice(root.as_bytes()),
                    create_address: None,
                };
            }
        }

        failed(StatusCode::Failure, 0)
    }

    fn call_inner(&mut self, msg: &Message) -> Result<Output, StatusCode> {
        if !msg.value.is_zero() && !matches!(msg.kind, CallKind::DelegateCall) {
            if self.get_balance(msg.sender) < msg.value {
                return Ok(failed(StatusCode::InsufficientBalance, msg.gas));
            }
            let recipient = if matches!(msg.kind, CallKind::CallCode) {
                msg.sender
            } else {
                msg.destination
            };
            self.transfer_balance(msg.sender, recipient, msg.value)?;
        }

        if msg.destination == beacon_roots_address() {
            return Ok(self.run_beacon_roots(msg));
        }

        if precompiles::is_precompile(msg.destination, self.revision) {
            return Ok(match precompiles::run(msg.destination, &msg.input_data, msg.gas) {
                Ok((output_data, gas_left)) => Output {
                    status_code: StatusCode::Success,
                    gas_left,
                    output_data,
                    create_address: None,
                },
                Err(status_code) => failed(status_code, 0),
            });
        }

        let code = self.resolve_code(msg.destination);
        let analyzed = match AnalyzedCode::analyze(code) {
            Ok(a) => a,
            Err(status_code) => return Ok(failed(status_code, 0)),
        };
        Ok(analyzed.execute(self, msg.clone(), self.revision))
    }

    fn create_inner(&mut self, msg: &Message) -> Result<Output, StatusCode> {
        let sender = msg.sender;

        if !msg.value.is_zero() && self.get_balance(sender) < msg.value {
            return Ok(failed(StatusCode::InsufficientBalance, msg.gas));
        }

        let mut sender_account = self.db.get_account(sender).unwrap_or_default();
        if sender_account.nonce == u64::MAX {
            return Ok(failed(StatusCode::ArgumentOutOfRange, 0));
        }
        let nonce = sender_account.nonce;
        self.journal.record_nonce_bump(sender);
        sender_account.nonce += 1;
        self.db.set_account(sender, sender_account);

        let new_address = match msg.kind {
            CallKind::Create2 { salt } => create2_address(sender, salt, &msg.input_data),
            _ => create_address(sender, nonce),
        };

        if let Some(existing) = self.db.get_account(new_address) {
            if existing.nonce != 0 || !existing.code.is_empty() {
                warn!(address = ?new_address, "CREATE address collision");
                return Ok(failed(StatusCode::Failure, 0));
            }
        }

        self.journal.record_account_created(new_address);
        self.access_list.access_address(new_address);
        self.selfdestructs.record_created(new_address);

        if !msg.value.is_zero() {
            self.transfer_balance(sender, new_address, msg.value)?;
        }

        let init_frame = Message {
            kind: msg.kind,
            is_static: false,
            depth: msg.depth,
            gas: msg.gas,
            destination: new_address,
            sender,
            input_data: Bytes::new(),
            value: msg.value,
        };

        let analyzed = match AnalyzedCode::analyze(&msg.input_data) {
            Ok(a) => a,
            Err(status_code) => return Ok(failed(status_code, 0)),
        };
        let result = analyzed.execute(self, init_frame, self.revision);

        if result.status_code != StatusCode::Success {
            return Ok(Output {
                status_code: result.status_code,
                gas_left: result.gas_left,
                output_data: result.output_data,
                create_address: None,
            });
        }

        let deployed_code = result.output_data;
        if self.revision >= Revision::Spurious && deployed_code.len() > MAX_CODE_SIZE {
            return Ok(failed(StatusCode::ContractValidationFailure, 0));
        }
        if self.revision >= Revision::London && deployed_code.first() == Some(&0xef) {
            return Ok(failed(StatusCode::ContractValidationFailure, 0));
        }

        let deposit_cost = GAS_CODE_DEPOSIT * deployed_code.len() as i64;
        let gas_left = result.gas_left - deposit_cost;
        if gas_left < 0 {
            return Ok(failed(StatusCode::OutOfGas, 0));
        }

        self.journal.record_code_change(new_address, Bytes::new());
        let mut created_account = self.db.get_account(new_address).unwrap_or_default();
        created_account.code = deployed_code;
        created_account.nonce = 1;
        self.db.set_account(new_address, created_account);

        Ok(Output {
            status_code: StatusCode::Success,
            gas_left,
            output_data: Bytes::new(),
            create_address: Some(new_address),
        })
    }
}

impl<'d, D: Database> Host for Evm<'d, D> {
    fn account_exists(&self, address: Address) -> bool {
        match self.db.get_account(address) {
            Some(account) => !(account.nonce == 0 && account.balance.is_zero() && account.code.is_empty()),
            None => false,
        }
    }

    fn get_storage(&self, address: Address, key: H256) -> H256 {
        self.db.get_storage(address, key)
    }

    fn get_original_storage(&self, address: Address, key: H256) -> H256 {
        let current = self.db.get_storage(address, key);
        self.journal.get_original_storage(address, key, current)
    }

    fn set_storage(&mut self, address: Address, key: H256, value: H256) -> Result<StorageStatus, StatusCode> {
        let current = self.db.get_storage(address, key);
        let original = self.journal.get_original_storage(address, key, current);

        let status = if current == value {
            StorageStatus::Unchanged
        } else if original == current {
            if original.is_zero() {
                StorageStatus::Added
            } else if value.is_zero() {
                StorageStatus::Deleted
            } else {
                StorageStatus::Modified
            }
        } else {
            StorageStatus::ModifiedAgain
        };

        if status != StorageStatus::Unchanged {
            self.journal.record_storage_change(address, key, current);
            self.db.set_storage(address, key, value)?;
        }

        Ok(status)
    }

    fn get_transient_storage(&self, address: Address, key: H256) -> H256 {
        self.db.get_transient_storage(address, key)
    }

    fn set_transient_storage(&mut self, address: Address, key: H256, value: H256) -> Result<(), StatusCode> {
        let prior = self.db.get_transient_storage(address, key);
        if prior != value {
            self.journal.record_transient_storage_change(address, key, prior);
            self.db.set_transient_storage(address, key, value);
        }
        Ok(())
    }

    fn get_balance(&self, address: Address) -> U256 {
        self.db.get_account(address).map(|a| a.balance).unwrap_or_default()
    }

    fn get_code_size(&self, address: Address) -> U256 {
        self.db.get_code_by_address(address).len().into()
    }

    fn get_code_hash(&self, address: Address) -> H256 {
        match self.db.get_account(address) {
            Some(account) if !(account.nonce == 0 && account.balance.is_zero() && account.code.is_empty()) => {
                H256::from_slice(&Keccak256::digest(&account.code))
            }
            _ => H256::zero(),
        }
    }

    fn copy_code(&self, address: Address, offset: usize, buffer: &mut [u8]) -> usize {
        let code = self.db.get_code_by_address(address);
        if offset >= code.len() {
            return 0;
        }
        let n = std::cmp::min(buffer.len(), code.len() - offset);
        buffer[..n].copy_from_slice(&code[offset..offset + n]);
        n
    }

    fn selfdestruct(&mut self, address: Address, beneficiary: Address) -> Result<(), StatusCode> {
        trace!(?address, ?beneficiary, "selfdestruct marked");
        self.selfdestructs.mark(address, beneficiary);
        Ok(())
    }

    #[instrument(skip(self, msg), fields(depth = msg.depth, kind = ?msg.kind))]
    fn call(&mut self, msg: &Message) -> Result<Output, StatusCode> {
        if msg.depth > MAX_CALL_DEPTH {
            return Ok(failed(StatusCode::CallDepthExceeded, msg.gas));
        }

        let snapshot = self.journal.create_snapshot();
        let log_mark = self.logs.len();

        let result = match msg.kind {
            CallKind::Create | CallKind::Create2 { .. } => self.create_inner(msg),
            _ => self.call_inner(msg),
        };

        match &result {
            Ok(output) if output.status_code == StatusCode::Success => {}
            _ => {
                trace!(?snapshot, "reverting journal for failed/reverted call");
                self.journal.revert_to_snapshot(snapshot, self.db);
                self.logs.truncate(log_mark);
            }
        }

        result
    }

    fn get_tx_context(&self) -> TxContext {
        self.tx_context.clone()
    }

    fn get_block_hash(&self, block_number: u64) -> H256 {
        self.block_hashes.get(&block_number).copied().unwrap_or_default()
    }

    fn emit_log(&mut self, address: Address, data: &[u8], topics: &[H256]) {
        self.logs.push(Log {
            address,
            topics: topics.to_vec(),
            data: Bytes::copy_from_slice(data),
        });
    }

    fn access_account(&mut self, address: Address) -> AccessStatus {
        if self.access_list.access_address(address) {
            AccessStatus::Cold
        } else {
            AccessStatus::Warm
        }
    }

    fn access_storage(&mut self, address: Address, key: H256) -> AccessStatus {
        if self.access_list.access_storage_slot(address, key) {
            AccessStatus::Cold
        } else {
            AccessStatus::Warm
        }
    }

    fn revision(&self) -> Revision {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap as Map;

    #[derive(Default)]
    struct MemDb {
        accounts: Map<Address, Account>,
        storage: Map<(Address, H256), H256>,
        transient: Map<(Address, H256), H256>,
    }

    impl Database for MemDb {
        fn get_account(&self, address: Address) -> Option<Account> {
            self.accounts.get(&address).cloned()
        }
        fn set_account(&mut self, address: Address, account: Account) {
            self.accounts.insert(address, account);
        }
        fn delete_account(&mut self, address: Address) -> Result<(), StatusCode> {
            self.accounts.remove(&address);
            Ok(())
        }
        fn get_storage(&self, address: Address, key: H256) -> H256 {
            self.storage.get(&(address, key)).copied().unwrap_or_default()
        }
        fn set_storage(&mut self, address: Address, key: H256, value: H256) -> Result<(), StatusCode> {
            self.storage.insert((address, key), value);
            Ok(())
        }
        fn get_transient_storage(&self, address: Address, key: H256) -> H256 {
            self.transient.get(&(address, key)).copied().unwrap_or_default()
        }
        fn set_transient_storage(&mut self, address: Address, key: H256, value: H256) {
            self.transient.insert((address, key), value);
        }
    }

    fn tx_context() -> TxContext {
        TxContext {
            tx_gas_price: U256::zero(),
            tx_origin: Address::repeat_byte(0xaa),
            block_coinbase: Address::repeat_byte(0xcb),
            block_number: 1,
            block_timestamp: 0,
            block_gas_limit: 30_000_000,
            block_difficulty: U256::zero(),
            block_prev_randao: U256::zero(),
            chain_id: U256::one(),
            block_base_fee: U256::zero(),
            blob_base_fee: U256::zero(),
            blob_hashes: Vec::new(),
            beacon_root: H256::zero(),
        }
    }

    #[test]
    fn create_address_is_deterministic() {
        let sender = Address::repeat_byte(1);
        let a = create_address(sender, 0);
        let b = create_address(sender, 0);
        let c = create_address(sender, 1);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn simple_value_transfer_moves_balance() {
        let mut db = MemDb::default();
        let sender = Address::repeat_byte(1);
        let recipient = Address::repeat_byte(2);
        db.set_account(
            sender,
            Account {
                nonce: 0,
                balance: 1000.into(),
                code: Bytes::new(),
            },
        );

        let mut evm = Evm::new(&mut db, tx_context(), Revision::Cancun);
        let msg = Message {
            kind: CallKind::Call,
            is_static: false,
            depth: 0,
            gas: 100_000,
            destination: recipient,
            sender,
            input_data: Bytes::new(),
            value: 100.into(),
        };

        let output = evm.transact(msg).unwrap();
        assert_eq!(output.status_code, StatusCode::Success);
        assert_eq!(evm.get_balance(sender), 900.into());
        assert_eq!(evm.get_balance(recipient), 100.into());
    }

    #[test]
    fn insufficient_balance_reports_failure_without_reverting_preexisting_state() {
        let mut db = MemDb::default();
        let sender = Address::repeat_byte(1);
        let recipient = Address::repeat_byte(2);

        let mut evm = Evm::new(&mut db, tx_context(), Revision::Cancun);
        let msg = Message {
            kind: CallKind::Call,
            is_static: false,
            depth: 0,
            gas: 100_000,
            destination: recipient,
            sender,
            input_data: Bytes::new(),
            value: 100.into(),
        };

        let output = evm.transact(msg).unwrap();
        assert_eq!(output.status_code, StatusCode::InsufficientBalance);
        assert_eq!(output.gas_left, 100_000);
    }

    #[test]
    fn create_deploys_code_and_charges_deposit_cost() {
        let mut db = MemDb::default();
        let sender = Address::repeat_byte(1);
        db.set_account(
            sender,
            Account {
                nonce: 0,
                balance: 1_000_000.into(),
                code: Bytes::new(),
            },
        );

        // PUSH1 0 PUSH1 0 RETURN: returns zero bytes of code.
        let init_code: Bytes = vec![0x60, 0x00, 0x60, 0x00, 0xf3].into();

        let mut evm = Evm::new(&mut db, tx_context(), Revision::Cancun);
        let msg = Message {
            kind: CallKind::Create,
            is_static: false,
            depth: 0,
            gas: 1_000_000,
            destination: Address::zero(),
            sender,
            input_data: init_code,
            value: U256::zero(),
        };

        let output = evm.transact(msg).unwrap();
        assert_eq!(output.status_code, StatusCode::Success);
        assert!(output.create_address.is_some());
    }

    #[test]
    fn eip3541_rejects_ef_prefixed_deployed_code() {
        let mut db = MemDb::default();
        let sender = Address::repeat_byte(1);
        db.set_account(
            sender,
            Account {
                nonce: 0,
                balance: 1_000_000.into(),
                code: Bytes::new(),
            },
        );

        // PUSH1 0xEF PUSH1 0 MSTORE8 PUSH1 1 PUSH1 0 RETURN: returns a
        // single byte, 0xef.
        let init_code: Bytes = vec![0x60, 0xef, 0x60, 0x00, 0x53, 0x60, 0x01, 0x60, 0x00, 0xf3].into();

        let mut evm = Evm::new(&mut db, tx_context(), Revision::Cancun);
        let msg = Message {
            kind: CallKind::Create,
            is_static: false,
            depth: 0,
            gas: 1_000_000,
            destination: Address::zero(),
            sender,
            input_data: init_code,
            value: U256::zero(),
        };

        let output = evm.transact(msg).unwrap();
        assert_eq!(output.status_code, StatusCode::ContractValidationFailure);
    }

    #[test]
    fn precompile_routes_without_reaching_interpreter() {
        let mut db = MemDb::default();
        let sender = Address::repeat_byte(1);
        db.set_account(
            sender,
            Account {
                nonce: 0,
                balance: 1_000.into(),
                code: Bytes::new(),
            },
        );

        let identity = Address::from_low_u64_be(4);
        let mut evm = Evm::new(&mut db, tx_context(), Revision::Cancun);
        let msg = Message {
            kind: CallKind::Call,
            is_static: false,
            depth: 0,
            gas: 100_000,
            destination: identity,
            sender,
            input_data: Bytes::from_static(b"hi"),
            value: U256::zero(),
        };

        let output = evm.transact(msg).unwrap();
        assert_eq!(output.status_code, StatusCode::Success);
        assert_eq!(&output.output_data[..], b"hi");
    }
}
