use bytes::Bytes;
use ethereum_types::{Address, H256, U256};
use thiserror::Error;

/// EVM revision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Revision {
    /// The Frontier revision.
    /// The one Ethereum launched with.
    Frontier = 0,

    /// [The Homestead revision.](https://eips.ethereum.org/EIPS/eip-606)
    Homestead = 1,

    /// [The Tangerine Whistle revision.](https://eips.ethereum.org/EIPS/eip-608)
    Tangerine = 2,

    /// [The Spurious Dragon revision.](https://eips.ethereum.org/EIPS/eip-607)
    Spurious = 3,

    /// [The Byzantium revision.](https://eips.ethereum.org/EIPS/eip-609)
    Byzantium = 4,

    /// [The Constantinople revision.](https://eips.ethereum.org/EIPS/eip-1013)
    Constantinople = 5,

    /// [The Petersburg revision.](https://eips.ethereum.org/EIPS/eip-1716)
    Petersburg = 6,

    /// [The Istanbul revision.](https://eips.ethereum.org/EIPS/eip-1679)
    Istanbul = 7,

    /// [The Berlin revision.](https://github.com/ethereum/eth1.0-specs/blob/master/network-upgrades/mainnet-upgrades/berlin.md)
    Berlin = 8,

    /// [The London revision.](https://github.com/ethereum/eth1.0-specs/blob/master/network-upgrades/mainnet-upgrades/london.md)
    London = 9,

    /// The Shanghai revision. Introduces PUSH0 (EIP-3855) and the initcode
    /// size cap (EIP-3860).
    Shanghai = 10,

    /// The Cancun revision. Introduces transient storage (EIP-1153), MCOPY
    /// (EIP-5656), blob-carrying transactions (EIP-4844) and restricts
    /// SELFDESTRUCT (EIP-6780).
    Cancun = 11,
}

impl Revision {
    pub fn iter() -> impl Iterator<Item = Self> {
        (&[
            Self::Frontier,
            Self::Homestead,
            Self::Tangerine,
            Self::Spurious,
            Self::Byzantium,
            Self::Constantinople,
            Self::Petersburg,
            Self::Istanbul,
            Self::Berlin,
            Self::London,
            Self::Shanghai,
            Self::Cancun,
        ])
            .iter()
            .copied()
    }

    pub const fn len() -> usize {
        Self::Cancun as usize + 1
    }

    pub const fn latest() -> Self {
        Self::Cancun
    }
}

impl core::fmt::Display for Revision {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::Frontier => "Frontier",
            Self::Homestead => "Homestead",
            Self::Tangerine => "Tangerine Whistle",
            Self::Spurious => "Spurious Dragon",
            Self::Byzantium => "Byzantium",
            Self::Constantinople => "Constantinople",
            Self::Petersburg => "Petersburg",
            Self::Istanbul => "Istanbul",
            Self::Berlin => "Berlin",
            Self::London => "London",
            Self::Shanghai => "Shanghai",
            Self::Cancun => "Cancun",
        };
        f.write_str(name)
    }
}

/// Message/frame status code. Covers both the taxonomy of recoverable EVM
/// failures and the handful of conditions that abort analysis before a frame
/// ever runs.
#[derive(Clone, Copy, Debug, Error, PartialEq)]
pub enum StatusCode {
    /// Execution finished with success.
    #[error("success")]
    Success = 0,

    /// Generic execution failure.
    #[error("failure")]
    Failure = 1,

    /// Execution terminated with REVERT opcode.
    ///
    /// In this case the amount of gas left MAY be non-zero and additional output
    /// data MAY be provided.
    #[error("revert")]
    Revert = 2,

    /// The execution has run out of gas.
    #[error("out of gas")]
    OutOfGas = 3,

    /// The designated INVALID instruction has been hit during execution.
    ///
    /// [EIP-141](https://github.com/ethereum/EIPs/blob/master/EIPS/eip-141.md)
    /// defines the instruction 0xfe as INVALID instruction to indicate execution
    /// abortion coming from high-level languages. This status code is also
    /// reported for opcode bytes unrecognized in the active revision.
    #[error("invalid instruction")]
    InvalidInstruction = 4,

    /// An undefined instruction has been encountered.
    #[error("undefined instruction")]
    UndefinedInstruction = 5,

    /// The execution has attempted to put more items on the EVM stack
    /// than the specified limit.
    #[error("stack overflow")]
    StackOverflow = 6,

    /// Execution of an opcode has required more items on the EVM stack.
    #[error("stack underflow")]
    StackUnderflow = 7,

    /// Execution has violated the jump destination restrictions.
    #[error("bad jump destination")]
    BadJumpDestination = 8,

    /// Tried to read outside memory bounds.
    ///
    /// An example is RETURNDATACOPY reading past the available buffer.
    #[error("invalid memory access")]
    InvalidMemoryAccess = 9,

    /// Call depth has exceeded the limit.
    #[error("call depth exceeded")]
    CallDepthExceeded = 10,

    /// Tried to execute an operation which is restricted in static mode.
    #[error("static mode violation")]
    StaticModeViolation = 11,

    /// A call to a precompiled contract has ended with a failure.
    #[error("precompile failure")]
    PrecompileFailure = 12,

    /// Contract validation has failed (e.g. code size / initcode size bounds,
    /// EIP-3541 code-prefix ban).
    #[error("contract validation failure")]
    ContractValidationFailure = 13,

    /// An argument to a state accessing method has a value outside of the
    /// accepted range of values.
    #[error("argument out of range")]
    ArgumentOutOfRange = 14,

    /// Code exceeds the length bound accepted by the bytecode analyzer.
    #[error("code too large")]
    CodeTooLarge = 15,

    /// The caller does not have enough funds for value transfer.
    #[error("insufficient balance")]
    InsufficientBalance = 17,

    /// EVM implementation generic internal error.
    #[error("internal error")]
    InternalError = -1,

    /// The VM failed to allocate the amount of memory needed for execution.
    #[error("out of memory")]
    OutOfMemory = -3,
}

/// The kind of call-like instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallKind {
    Call,
    DelegateCall,
    CallCode,
    Create,
    Create2 { salt: H256 },
}

/// The message describing an EVM call,
/// including a zero-depth calls from a transaction origin.
#[derive(Clone, Debug, PartialEq)]
pub struct Message {
    /// The kind of the call. For zero-depth calls `CallKind::Call` SHOULD be used.
    pub kind: CallKind,

    /// Static call mode.
    pub is_static: bool,

    /// The call depth.
    pub depth: i32,

    /// The amount of gas for message execution.
    pub gas: i64,

    /// The destination of the message.
    pub destination: Address,

    /// The sender of the message.
    pub sender: Address,

    /// Message input data.
    pub input_data: Bytes,

    /// The amount of Ether transferred with the message.
    pub value: U256,
}

/// Output of EVM execution.
#[derive(Clone, Debug, PartialEq)]
pub struct Output {
    /// EVM exited with this status code.
    pub status_code: StatusCode,
    /// How much gas was left after execution
    pub gas_left: i64,
    /// Output data returned.
    pub output_data: Bytes,
    /// Contract creation address.
    pub create_address: Option<Address>,
}

#[inline]
pub(crate) fn u256_to_address(v: U256) -> Address {
    H256(v.into()).into()
}

#[inline]
pub(crate) fn address_to_u256(v: Address) -> U256 {
    U256::from_big_endian(&v.0)
}
