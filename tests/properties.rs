//! Engine-wide testable properties (numbered per the design notes).
//!
//! Properties 5 (access-list monotonicity), 6 (JUMPDEST safety), 7 (static
//! protection) and 9 (memory quadratic rule) are opcode-level and exercised
//! through `EvmTester`/`Bytecode`, the same as the S1-S6 scenarios.
//! Properties 1-4 and 8 concern the journaled `Evm<D>`/`Database` layer
//! above the bare interpreter, so they drive `Evm` directly against a small
//! in-memory `Database`.

use bytes::Bytes;
use ethereum_types::{Address, H256, U256};
use revmicro::{
    host::{Host, TxContext},
    opcode::*,
    util::*,
    *,
};
use std::collections::HashMap as Map;

#[derive(Default, Clone)]
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

fn call_message(sender: Address, destination: Address, gas: i64) -> Message {
    Message {
        kind: CallKind::Call,
        is_static: false,
        depth: 0,
        gas,
        destination,
        sender,
        input_data: Bytes::new(),
        value: U256::zero(),
    }
}

/// Property 1 - Determinism: running the same transaction against two
/// independently-built but identical initial states produces identical
/// output and identical post-state.
#[test]
fn property1_determinism() {
    let sender = Address::repeat_byte(1);
    let contract = Address::repeat_byte(2);
    let code: Bytes = Bytecode::new().sstore(0, 0x2a).build().into();

    let run = || {
        let mut db = MemDb::default();
        db.set_account(
            contract,
            Account {
                nonce: 0,
                balance: U256::zero(),
                code: code.clone(),
            },
        );
        let mut evm = Evm::new(&mut db, tx_context(), Revision::Cancun);
        let output = evm.transact(call_message(sender, contract, 100_000)).unwrap();
        (output, db.get_storage(contract, H256::zero()))
    };

    let (output_a, storage_a) = run();
    let (output_b, storage_b) = run();

    assert_eq!(output_a, output_b);
    assert_eq!(storage_a, storage_b);
    assert_eq!(storage_a, H256::from_low_u64_be(0x2a));
}

/// Property 2 - Gas conservation: `initial_gas - gas_left` equals the exact
/// sum of per-opcode charges for a known, memory-free sequence.
#[test]
fn property2_gas_conservation() {
    let sender = Address::repeat_byte(1);
    let contract = Address::repeat_byte(2);
    let code: Bytes = Bytecode::new()
        .pushv(2u64)
        .pushv(3u64)
        .opcode(OpCode::ADD)
        .build()
        .into();

    let mut db = MemDb::default();
    db.set_account(
        contract,
        Account {
            nonce: 0,
            balance: U256::zero(),
            code,
        },
    );
    let mut evm = Evm::new(&mut db, tx_context(), Revision::Cancun);
    let msg = call_message(sender, contract, 100_000);
    let output = evm.transact(msg.clone()).unwrap();

    assert_eq!(output.status_code, StatusCode::Success);
    assert_eq!(msg.gas - output.gas_left, 3 + 3 + 3);
}

/// Property 3 - Snapshot idempotence: taking a snapshot and reverting to it
/// immediately, with no intervening operation, changes nothing.
#[test]
fn property3_snapshot_idempotence() {
    let addr = Address::repeat_byte(7);
    let mut db = MemDb::default();
    db.set_account(
        addr,
        Account {
            nonce: 3,
            balance: 500.into(),
            code: Bytes::new(),
        },
    );
    let before = db.get_account(addr);

    let mut journal = Journal::new();
    let snap = journal.create_snapshot();
    journal.revert_to_snapshot(snap, &mut db);

    assert_eq!(db.get_account(addr), before);
}

/// Property 4 - Revert atomicity: a frame that ends in REVERT leaves no
/// trace of its storage writes in the post-state, though the gas it spent
/// stays spent.
#[test]
fn property4_revert_atomicity() {
    let sender = Address::repeat_byte(1);
    let contract = Address::repeat_byte(2);
    let code: Bytes = Bytecode::new()
        .sstore(0, 0x2a)
        .pushv(0u64)
        .pushv(0u64)
        .opcode(OpCode::REVERT)
        .build()
        .into();

    let mut db = MemDb::default();
    db.set_account(
        contract,
        Account {
            nonce: 0,
            balance: U256::zero(),
            code,
        },
    );
    let mut evm = Evm::new(&mut db, tx_context(), Revision::Cancun);
    let msg = call_message(sender, contract, 100_000);
    let output = evm.transact(msg.clone()).unwrap();

    assert_eq!(output.status_code, StatusCode::Revert);
    assert!(output.gas_left < msg.gas);
    assert_eq!(db.get_storage(contract, H256::zero()), H256::zero());
}

/// Property 5 - Access-list monotonicity: once an address is warm within a
/// transaction it never goes back to cold.
#[test]
fn property5_access_list_monotonicity() {
    let addr = U256::from(9);
    EvmTester::new()
        .revision(Revision::Berlin)
        .code(
            Bytecode::new()
                .pushv(addr)
                .opcode(OpCode::EXTCODESIZE)
                .pushv(addr)
                .opcode(OpCode::EXTCODESIZE)
                .pushv(addr)
                .opcode(OpCode::EXTCODESIZE),
        )
        .status(StatusCode::Success)
        .gas_used(3 * 3 + 2600 + 100 + 100)
        .check();
}

/// Property 6 - JUMPDEST safety: a byte that happens to equal 0x5b but sits
/// inside a PUSH immediate is not a valid jump target; the real JUMPDEST
/// right after it is.
#[test]
fn property6_jumpdest_safety() {
    use hex_literal::hex;

    // PUSH1 0x04, JUMP, PUSH2 0x5b5b, JUMPDEST -- jumping to pc 4 lands on
    // push data that happens to equal 0x5b, not a real jumpdest.
    EvmTester::new()
        .code(hex!("600456615b5b5b").to_vec())
        .status(StatusCode::BadJumpDestination)
        .check();

    // Jumping to pc 6, the real JUMPDEST, succeeds.
    EvmTester::new()
        .code(hex!("600656615b5b5b").to_vec())
        .status(StatusCode::Success)
        .check();
}

/// Property 7 - Static protection: SSTORE, LOG, CREATE, SELFDESTRUCT and a
/// value-bearing CALL all fail with StaticModeViolation in a static frame.
#[test]
fn property7_static_protection() {
    let sstore = Bytecode::new().sstore(0, 1);
    let log0 = Bytecode::new().pushv(0u64).pushv(0u64).opcode(OpCode::LOG0);
    let create = Bytecode::new()
        .pushv(0u64)
        .pushv(0u64)
        .pushv(0u64)
        .opcode(OpCode::CREATE);
    let selfdestruct = Bytecode::new().pushv(0u64).opcode(OpCode::SELFDESTRUCT);
    let value_call: Bytecode = CallInstruction::call(0u64).value(1u64).gas(0u64).into();

    for code in [sstore, log0, create, selfdestruct, value_call] {
        EvmTester::new()
            .set_static(true)
            .code(code)
            .status(StatusCode::StaticModeViolation)
            .check();
    }
}

/// Property 8 - Depth bound: a call at depth 1024 proceeds normally; one at
/// depth 1025 is rejected with CallDepthExceeded and keeps its gas.
#[test]
fn property8_depth_bound() {
    let sender = Address::repeat_byte(1);
    let contract = Address::repeat_byte(2);
    let code: Bytes = Bytecode::new().opcode(OpCode::STOP).build().into();

    let mut db = MemDb::default();
    db.set_account(
        contract,
        Account {
            nonce: 0,
            balance: U256::zero(),
            code,
        },
    );
    let mut evm = Evm::new(&mut db, tx_context(), Revision::Cancun);

    let mut at_limit = call_message(sender, contract, 100_000);
    at_limit.depth = 1024;
    let result = Host::call(&mut evm, &at_limit).unwrap();
    assert_eq!(result.status_code, StatusCode::Success);

    let mut over_limit = call_message(sender, contract, 100_000);
    over_limit.depth = 1025;
    let result = Host::call(&mut evm, &over_limit).unwrap();
    assert_eq!(result.status_code, StatusCode::CallDepthExceeded);
    assert_eq!(result.gas_left, over_limit.gas);
}

/// Property 9 - Memory quadratic rule: the cost of expanding memory follows
/// `3w + floor(w^2/512)`, charged incrementally on top of the touching
/// opcode's flat cost.
#[test]
fn property9_memory_quadratic_rule() {
    // First MSTORE grows memory from empty to 1 word (cost 3). Second grows
    // it from 1 word to exactly 512 words, where the quadratic term lands
    // on a round number: 3*512 + 512^2/512 - 3*1 = 2045.
    EvmTester::new()
        .code(Bytecode::new().mstore_value(0u64, 1u64).mstore_value(16352u64, 1u64))
        .status(StatusCode::Success)
        .gas_used(2066)
        .check();
}
