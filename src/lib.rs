//! EVM execution core: bytecode analysis, the dispatch loop, journaled
//! world state with snapshot/revert, and CALL/CREATE orchestration, covering
//! hardforks from Frontier through Cancun.

pub use access_list::AccessList;
pub use common::{CallKind, Message, Output, Revision, StatusCode};
pub use config::Config;
pub use db::{Account, Database};
pub use evm::{Evm, Log};
pub use host::Host;
pub use interpreter::AnalyzedCode;
pub use journal::Journal;
pub use opcode::OpCode;
pub use selfdestruct::SelfDestructTracker;
pub use state::{ExecutionState, Stack};

/// Maximum allowed deployed EVM bytecode size (EIP-170).
pub const MAX_CODE_SIZE: usize = 0x6000;

mod access_list;
mod common;
mod config;
mod db;
mod evm;
pub mod host;
#[doc(hidden)]
pub mod instructions;
mod interpreter;
mod journal;
pub mod opcode;
mod precompiles;
mod selfdestruct;
mod state;

#[cfg(feature = "util")]
pub mod util;
