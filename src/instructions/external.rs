use crate::{
    common::{address_to_u256, u256_to_address, Revision, StatusCode},
    host::{AccessStatus, Host, StorageStatus, TxContext},
    instructions::{memory, properties::*},
    state::ExecutionState,
};
use ethereum_types::{H256, U256};

pub(crate) fn address(state: &mut ExecutionState) {
    state.stack.push(address_to_u256(state.message.destination));
}

pub(crate) fn caller(state: &mut ExecutionState) {
    state.stack.push(address_to_u256(state.message.sender));
}

pub(crate) fn callvalue(state: &mut ExecutionState) {
    state.stack.push(state.message.value);
}

pub(crate) fn balance(state: &mut ExecutionState, host: &mut impl Host) -> Result<(), StatusCode> {
    let address = u256_to_address(state.stack.pop());

    if state.evm_revision >= Revision::Berlin && host.access_account(address) == AccessStatus::Cold
    {
        state.gas_left -= i64::from(ADDITIONAL_COLD_ACCOUNT_ACCESS_COST);
        if state.gas_left < 0 {
            return Err(StatusCode::OutOfGas);
        }
    }

    state.stack.push(host.get_balance(address));

    Ok(())
}

pub(crate) fn extcodesize(
    state: &mut ExecutionState,
    host: &mut impl Host,
) -> Result<(), StatusCode> {
    let address = u256_to_address(state.stack.pop());

    if state.evm_revision >= Revision::Berlin && host.access_account(address) == AccessStatus::Cold
    {
        state.gas_left -= i64::from(ADDITIONAL_COLD_ACCOUNT_ACCESS_COST);
        if state.gas_left < 0 {
            return Err(StatusCode::OutOfGas);
        }
    }

    state.stack.push(host.get_code_size(address));

    Ok(())
}

pub(crate) fn origin_accessor(tx_context: &TxContext) -> U256 {
    address_to_u256(tx_context.tx_origin)
}

pub(crate) fn coinbase_accessor(tx_context: &TxContext) -> U256 {
    address_to_u256(tx_context.block_coinbase)
}

pub(crate) fn gasprice_accessor(tx_context: &TxContext) -> U256 {
    tx_context.tx_gas_price
}

pub(crate) fn timestamp_accessor(tx_context: &TxContext) -> U256 {
    tx_context.block_timestamp.into()
}

pub(crate) fn number_accessor(tx_context: &TxContext) -> U256 {
    tx_context.block_number.into()
}

pub(crate) fn gaslimit_accessor(tx_context: &TxContext) -> U256 {
    tx_context.block_gas_limit.into()
}

/// Pre-Merge DIFFICULTY (0x44). Dispatched by `interpreter::run` for
/// revisions below `Shanghai`.
pub(crate) fn difficulty_accessor(tx_context: &TxContext) -> U256 {
    tx_context.block_difficulty
}

/// Post-Merge PREVRANDAO (EIP-4399), same opcode byte as DIFFICULTY.
/// Dispatched by `interpreter::run` from `Shanghai` onward.
pub(crate) fn prev_randao_accessor(tx_context: &TxContext) -> U256 {
    tx_context.block_prev_randao
}

pub(crate) fn chainid_accessor(tx_context: &TxContext) -> U256 {
    tx_context.chain_id
}

pub(crate) fn basefee_accessor(tx_context: &TxContext) -> U256 {
    tx_context.block_base_fee
}

pub(crate) fn blobbasefee_accessor(tx_context: &TxContext) -> U256 {
    tx_context.blob_base_fee
}

pub(crate) fn push_txcontext(
    state: &mut ExecutionState,
    host: &impl Host,
    accessor: impl Fn(&TxContext) -> U256,
) {
    let tx_context = host.get_tx_context();
    state.stack.push(accessor(&tx_context));
}

pub(crate) fn selfbalance(state: &mut ExecutionState, host: &impl Host) {
    let balance = host.get_balance(state.message.destination);
    state.stack.push(balance);
}

pub(crate) fn blockhash(state: &mut ExecutionState, host: &impl Host) {
    let number = state.stack.pop();

    let upper_bound = host.get_tx_context().block_number;
    let lower_bound = upper_bound.saturating_sub(256);

    let mut header = H256::zero();
    if number <= u64::MAX.into() {
        let n = number.as_u64();
        if (lower_bound..upper_bound).contains(&n) {
            header = host.get_block_hash(n);
        }
    }

    state.stack.push(U256::from_big_endian(&header.0));
}

pub(crate) fn blobhash(state: &mut ExecutionState, host: &impl Host) {
    let index = state.stack.pop();
    let tx_context = host.get_tx_context();

    let hash = if index < U256::from(tx_context.blob_hashes.len()) {
        tx_context.blob_hashes[index.as_usize()]
    } else {
        H256::zero()
    };

    state.stack.push(U256::from_big_endian(&hash.0));
}

pub(crate) fn do_log(
    state: &mut ExecutionState,
    host: &mut impl Host,
    num_topics: usize,
) -> Result<(), StatusCode> {
    if state.message.is_static {
        return Err(StatusCode::StaticModeViolation);
    }

    let offset = state.stack.pop();
    let size = state.stack.pop();

    let region = memory::verify_memory_region(state, offset, size).map_err(|_| StatusCode::OutOfGas)?;

    if let Some(region) = &region {
        let cost = region.size.get() as i64 * 8;
        state.gas_left -= cost;
        if state.gas_left < 0 {
            return Err(StatusCode::OutOfGas);
        }
    }

    let mut topics = arrayvec::ArrayVec::<H256, 4>::new();
    for _ in 0..num_topics {
        topics.push(H256(state.stack.pop().into()));
    }

    let data: &[u8] = if let Some(region) = &region {
        &state.memory[region.offset..region.offset + region.size.get()]
    } else {
        &[]
    };

    host.emit_log(state.message.destination, data, &topics);

    Ok(())
}

pub(crate) fn sload(state: &mut ExecutionState, host: &mut impl Host) -> Result<(), StatusCode> {
    let key = H256(state.stack.pop().into());

    if state.evm_revision >= Revision::Berlin
        && host.access_storage(state.message.destination, key) == AccessStatus::Cold
    {
        const ADDITIONAL_COLD_SLOAD_COST: u16 = COLD_SLOAD_COST - WARM_STORAGE_READ_COST;
        state.gas_left -= i64::from(ADDITIONAL_COLD_SLOAD_COST);
        if state.gas_left < 0 {
            return Err(StatusCode::OutOfGas);
        }
    }

    let storage = host.get_storage(state.message.destination, key);
    state.stack.push(U256::from_big_endian(storage.as_bytes()));

    Ok(())
}

const SSTORE_SET_GAS: i64 = 20000;

/// EIP-2200/3529 refund, computed from the original/current/new triple.
/// `sstore_clears_refund` is 15000 before EIP-3529 (London) and 4800 after.
fn sstore_refund(
    sstore_reset_gas: i64,
    sload_gas: i64,
    sstore_clears_refund: i64,
    original: H256,
    current: H256,
    new: H256,
) -> i64 {
    if current == new {
        return 0;
    }

    if original == current {
        if original.is_zero() {
            return 0;
        }
        if new.is_zero() {
            return sstore_clears_refund;
        }
        return 0;
    }

    let mut refund = 0;
    if !original.is_zero() {
        if current.is_zero() {
            refund -= sstore_clears_refund;
        }
        if new.is_zero() {
            refund += sstore_clears_refund;
        }
    }
    if original == new {
        if original.is_zero() {
            refund += SSTORE_SET_GAS - sload_gas;
        } else {
            refund += sstore_reset_gas - sload_gas;
        }
    }
    refund
}

pub(crate) fn sstore(state: &mut ExecutionState, host: &mut impl Host) -> Result<(), StatusCode> {
    if state.message.is_static {
        return Err(StatusCode::StaticModeViolation);
    }

    // EIP-1706: under the 2300 stipend, SSTORE is always out of gas.
    if state.evm_revision >= Revision::Istanbul && state.gas_left <= 2300 {
        return Err(StatusCode::OutOfGas);
    }

    let key = H256(state.stack.pop().into());
    let value = H256(state.stack.pop().into());

    let mut cost = 0;
    if state.evm_revision >= Revision::Berlin
        && host.access_storage(state.message.destination, key) == AccessStatus::Cold
    {
        cost = COLD_SLOAD_COST;
    }

    let original = host.get_original_storage(state.message.destination, key);
    let current = host.get_storage(state.message.destination, key);

    let status = host.set_storage(state.message.destination, key, value)?;

    cost = match status {
        StorageStatus::Unchanged | StorageStatus::ModifiedAgain => {
            if state.evm_revision >= Revision::Berlin {
                cost + WARM_STORAGE_READ_COST
            } else if state.evm_revision == Revision::Istanbul {
                800
            } else if state.evm_revision == Revision::Constantinople {
                200
            } else {
                5000
            }
        }
        StorageStatus::Modified | StorageStatus::Deleted => {
            if state.evm_revision >= Revision::Berlin {
                cost + 5000 - COLD_SLOAD_COST
            } else {
                5000
            }
        }
        StorageStatus::Added => cost + 20000,
    };
    state.gas_left -= i64::from(cost);
    if state.gas_left < 0 {
        return Err(StatusCode::OutOfGas);
    }

    if state.evm_revision >= Revision::Constantinople && state.evm_revision != Revision::Petersburg
    {
        let sstore_reset_gas = if state.evm_revision >= Revision::Berlin {
            5000 - i64::from(COLD_SLOAD_COST)
        } else {
            5000
        };
        let sload_gas = if state.evm_revision >= Revision::Berlin {
            i64::from(WARM_STORAGE_READ_COST)
        } else if state.evm_revision >= Revision::Istanbul {
            800
        } else {
            200
        };
        let sstore_clears_refund = if state.evm_revision >= Revision::London {
            4800
        } else {
            15000
        };

        state.gas_refund += sstore_refund(
            sstore_reset_gas,
            sload_gas,
            sstore_clears_refund,
            original,
            current,
            value,
        );
    } else if status == StorageStatus::Deleted {
        state.gas_refund += 15000;
    }

    Ok(())
}

pub(crate) fn tload(state: &mut ExecutionState, host: &impl Host) {
    let key = H256(state.stack.pop().into());
    let value = host.get_transient_storage(state.message.destination, key);
    state.stack.push(U256::from_big_endian(value.as_bytes()));
}

pub(crate) fn tstore(state: &mut ExecutionState, host: &mut impl Host) -> Result<(), StatusCode> {
    if state.message.is_static {
        return Err(StatusCode::StaticModeViolation);
    }

    let key = H256(state.stack.pop().into());
    let value = H256(state.stack.pop().into());
    host.set_transient_storage(state.message.destination, key, value)?;

    Ok(())
}

pub(crate) fn selfdestruct(
    state: &mut ExecutionState,
    host: &mut impl Host,
) -> Result<(), StatusCode> {
    if state.message.is_static {
        return Err(StatusCode::StaticModeViolation);
    }

    let beneficiary = u256_to_address(state.stack.pop());

    if state.evm_revision >= Revision::Berlin && host.access_account(beneficiary) == AccessStatus::Cold
    {
        state.gas_left -= i64::from(COLD_ACCOUNT_ACCESS_COST);
        if state.gas_left < 0 {
            return Err(StatusCode::OutOfGas);
        }
    }

    if state.evm_revision >= Revision::Tangerine
        && (state.evm_revision == Revision::Tangerine
            || !host.get_balance(state.message.destination).is_zero())
        && !host.account_exists(beneficiary)
    {
        state.gas_left -= 25000;
        if state.gas_left < 0 {
            return Err(StatusCode::OutOfGas);
        }
    }

    host.selfdestruct(state.message.destination, beneficiary)?;

    Ok(())
}
