//! Test-only tooling: a bytecode builder and a mocked `Host` for exercising
//! instruction handlers without a real `Database`/`Evm` behind them.

pub mod bytecode;
pub mod mocked_host;
mod tester;

pub use bytecode::{Bytecode, CallInstruction};
pub use mocked_host::MockedHost;
pub use tester::EvmTester;
