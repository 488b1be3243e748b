use crate::common::{Message, Output, Revision, StatusCode};
use ethereum_types::{Address, H256, U256};

/// State access status (EIP-2929).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessStatus {
    Cold,
    Warm,
}

impl Default for AccessStatus {
    fn default() -> Self {
        Self::Cold
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StorageStatus {
    /// The value of a storage item has been left unchanged: 0 -> 0 and X -> X.
    Unchanged,
    /// The value of a storage item has been modified: X -> Y.
    Modified,
    /// A storage item has been modified after being modified before: X -> Y -> Z.
    ModifiedAgain,
    /// A new storage item has been added: 0 -> X.
    Added,
    /// A storage item has been deleted: X -> 0.
    Deleted,
}

/// The transaction and block data for execution.
#[derive(Clone, Debug)]
pub struct TxContext {
    /// The transaction gas price.
    pub tx_gas_price: U256,
    /// The transaction origin account.
    pub tx_origin: Address,
    /// The miner of the block.
    pub block_coinbase: Address,
    /// The block number.
    pub block_number: u64,
    /// The block timestamp.
    pub block_timestamp: u64,
    /// The block gas limit.
    pub block_gas_limit: u64,
    /// The block difficulty. Post-Merge this is repurposed as PREVRANDAO
    /// (EIP-4399); `block_prev_randao` is always populated with the same
    /// value so Merge-aware callers don't have to branch on revision here.
    pub block_difficulty: U256,
    /// The post-Merge randomness beacon output (EIP-4399).
    pub block_prev_randao: U256,
    /// The blockchain's ChainID.
    pub chain_id: U256,
    /// The block base fee per gas (EIP-1559, EIP-3198).
    pub block_base_fee: U256,
    /// The blob base fee for the block (EIP-4844, EIP-7516).
    pub blob_base_fee: U256,
    /// Versioned hashes of the blobs attached to the transaction (EIP-4844).
    pub blob_hashes: Vec<H256>,
    /// The beacon block root for the parent block (EIP-4788).
    pub beacon_root: H256,
}

/// Capability surface exposed to instruction handlers. A `Host` wraps a
/// `Database` together with the journal, access list and selfdestruct
/// bookkeeping needed to answer these queries; unlike the database itself,
/// every method here already accounts for gas-irrelevant bookkeeping like
/// warming and journaling. All calls are synchronous: the interpreter never
/// suspends mid-instruction.
pub trait Host {
    /// Check if an account exists and is not an empty, dead account.
    fn account_exists(&self, address: Address) -> bool;
    /// Get value of a storage key. Returns zero if the slot is unset.
    fn get_storage(&self, address: Address, key: H256) -> H256;
    /// The value a storage slot held before the current transaction touched
    /// it, used by EIP-2200/3529 SSTORE refund accounting.
    fn get_original_storage(&self, address: Address, key: H256) -> H256;
    /// Set value of a storage key, returning the EIP-2200/3529 transition
    /// classification used for gas accounting.
    fn set_storage(
        &mut self,
        address: Address,
        key: H256,
        value: H256,
    ) -> Result<StorageStatus, StatusCode>;
    /// Load a transient storage slot (EIP-1153). Cleared at the end of every
    /// transaction, never journaled across transactions.
    fn get_transient_storage(&self, address: Address, key: H256) -> H256;
    fn set_transient_storage(
        &mut self,
        address: Address,
        key: H256,
        value: H256,
    ) -> Result<(), StatusCode>;
    /// Get balance of an account. Returns zero if the account does not exist.
    fn get_balance(&self, address: Address) -> U256;
    /// Get code size of an account. Returns zero if the account does not exist.
    fn get_code_size(&self, address: Address) -> U256;
    /// Get code hash of an account. Returns zero if the account does not exist.
    fn get_code_hash(&self, address: Address) -> H256;
    /// Copy code of an account, returning the number of bytes actually copied.
    fn copy_code(&self, address: Address, offset: usize, buffer: &mut [u8]) -> usize;
    /// Mark an account for end-of-transaction destruction.
    fn selfdestruct(&mut self, address: Address, beneficiary: Address) -> Result<(), StatusCode>;
    /// Execute a sub-call or contract creation described by `msg`.
    fn call(&mut self, msg: &Message) -> Result<Output, StatusCode>;
    /// Retrieve transaction and block context.
    fn get_tx_context(&self) -> TxContext;
    /// Get a historical block hash. Returns zero if unavailable (only the
    /// most recent 256 blocks are queryable).
    fn get_block_hash(&self, block_number: u64) -> H256;
    /// Emit a log.
    fn emit_log(&mut self, address: Address, data: &[u8], topics: &[H256]);
    /// Mark an account as warm, returning its previous access status.
    fn access_account(&mut self, address: Address) -> AccessStatus;
    /// Mark a storage slot as warm, returning its previous access status.
    fn access_storage(&mut self, address: Address, key: H256) -> AccessStatus;
    /// The hardfork rules in effect for this execution.
    fn revision(&self) -> Revision;
}

/// Host that supports no operations; useful as a placeholder in tests that
/// never reach a state-accessing opcode.
pub struct DummyHost;

impl Host for DummyHost {
    fn account_exists(&self, _: Address) -> bool {
        false
    }

    fn get_storage(&self, _: Address, _: H256) -> H256 {
        H256::zero()
    }

    fn get_original_storage(&self, _: Address, _: H256) -> H256 {
        H256::zero()
    }

    fn set_storage(&mut self, _: Address, _: H256, _: H256) -> Result<StorageStatus, StatusCode> {
        Err(StatusCode::InternalError)
    }

    fn get_transient_storage(&self, _: Address, _: H256) -> H256 {
        H256::zero()
    }

    fn set_transient_storage(&mut self, _: Address, _: H256, _: H256) -> Result<(), StatusCode> {
        Err(StatusCode::InternalError)
    }

    fn get_balance(&self, _: Address) -> U256 {
        U256::zero()
    }

    fn get_code_size(&self, _: Address) -> U256 {
        U256::zero()
    }

    fn get_code_hash(&self, _: Address) -> H256 {
        H256::zero()
    }

    fn copy_code(&self, _: Address, _: usize, _: &mut [u8]) -> usize {
        0
    }

    fn selfdestruct(&mut self, _: Address, _: Address) -> Result<(), StatusCode> {
        Err(StatusCode::InternalError)
    }

    fn call(&mut self, _: &Message) -> Result<Output, StatusCode> {
        Err(StatusCode::InternalError)
    }

    fn get_tx_context(&self) -> TxContext {
        TxContext {
            tx_gas_price: U256::zero(),
            tx_origin: Address::zero(),
            block_coinbase: Address::zero(),
            block_number: 0,
            block_timestamp: 0,
            block_gas_limit: 0,
            block_difficulty: U256::zero(),
            block_prev_randao: U256::zero(),
            chain_id: U256::zero(),
            block_base_fee: U256::zero(),
            blob_base_fee: U256::zero(),
            blob_hashes: Vec::new(),
            beacon_root: H256::zero(),
        }
    }

    fn get_block_hash(&self, _: u64) -> H256 {
        H256::zero()
    }

    fn emit_log(&mut self, _: Address, _: &[u8], _: &[H256]) {}

    fn access_account(&mut self, _: Address) -> AccessStatus {
        AccessStatus::Cold
    }

    fn access_storage(&mut self, _: Address, _: H256) -> AccessStatus {
        AccessStatus::Cold
    }

    fn revision(&self) -> Revision {
        Revision::latest()
    }
}
