//! Routing, gas-charging and I/O contract for the precompiled contracts at
//! addresses `0x01`..`0x0A`. The cryptographic bodies are stubs: each
//! returns a deterministically-shaped placeholder output of the correct
//! size, since the core's job is dispatching to the right formula and
//! charging the right gas, not performing the cryptography itself.

use crate::{common::StatusCode, Revision};
use bytes::Bytes;
use ethereum_types::Address;
use sha3::{Digest, Keccak256};

/// `ceil(len / 32)`.
fn words(len: usize) -> u64 {
    ((len + 31) / 32) as u64
}

fn address_of(byte: u8) -> Address {
    let mut buf = [0_u8; 20];
    buf[19] = byte;
    Address::from(buf)
}

/// Returns `Some(gas_cost)` if `address` names a precompile active under
/// `revision`, `None` otherwise.
pub fn is_precompile(address: Address, revision: Revision) -> bool {
    let last = address.0[19];
    let is_precompile_address = address.0[..19].iter().all(|&b| b == 0) && (1..=10).contains(&last);
    if !is_precompile_address {
        return false;
    }
    match last {
        1..=4 => true,
        5..=8 => revision >= Revision::Byzantium,
        9 => revision >= Revision::Istanbul,
        10 => revision >= Revision::Cancun,
        _ => false,
    }
}

/// Runs the precompile at `address` against `input`, charging against
/// `gas_limit`. Returns the output bytes and gas left, or `OutOfGas` if the
/// formula's charge exceeds what was supplied.
pub fn run(address: Address, input: &[u8], gas_limit: i64) -> Result<(Bytes, i64), StatusCode> {
    let (gas_cost, output): (i64, Bytes) = match address.0[19] {
        // ECRECOVER
        1 => (3000, placeholder(32, input)),
        // SHA256
        2 => (60 + 12 * words(input.len()) as i64, placeholder(32, input)),
        // RIPEMD160
        3 => (600 + 120 * words(input.len()) as i64, placeholder(32, input)),
        // IDENTITY
        4 => (15 + 3 * words(input.len()) as i64, Bytes::copy_from_slice(input)),
        // MODEXP (EIP-2565 floor; real length-dependent formula is out of
        // scope, only the floor and the header-derived output size matter).
        5 => {
            let mod_len = input
                .get(64..96)
                .map(|w| {
                    let mut be = [0_u8; 8];
                    be.copy_from_slice(&w[24..32]);
                    u64::from_be_bytes(be) as usize
                })
                .unwrap_or(0);
            (200, placeholder(mod_len, input))
        }
        // BN254 ADD
        6 => (150, placeholder(64, input)),
        // BN254 MUL
        7 => (6000, placeholder(64, input)),
        // BN254 PAIRING
        8 => {
            let k = (input.len() / 192) as i64;
            (45000 + 34000 * k, placeholder(32, input))
        }
        // BLAKE2F
        9 => {
            if input.len() != 213 {
                return Err(StatusCode::PrecompileFailure);
            }
            let mut rounds_be = [0_u8; 4];
            rounds_be.copy_from_slice(&input[0..4]);
            (u32::from_be_bytes(rounds_be) as i64, placeholder(64, input))
        }
        // KZG point evaluation
        10 => (50000, placeholder(64, input)),
        _ => return Err(StatusCode::PrecompileFailure),
    };

    if gas_cost > gas_limit {
        return Err(StatusCode::OutOfGas);
    }

    Ok((output, gas_limit - gas_cost))
}

/// Deterministic placeholder: `size` bytes derived from keccak256(input),
/// repeated/truncated to fill the expected output shape.
fn placeholder(size: usize, input: &[u8]) -> Bytes {
    if size == 0 {
        return Bytes::new();
    }
    let digest = Keccak256::digest(input);
    let mut out = vec![0_u8; size];
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = digest[i % digest.len()];
    }
    out.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_known_addresses_by_revision() {
        assert!(is_precompile(address_of(1), Revision::Frontier));
        assert!(!is_precompile(address_of(5), Revision::Homestead));
        assert!(is_precompile(address_of(5), Revision::Byzantium));
        assert!(!is_precompile(address_of(9), Revision::Byzantium));
        assert!(is_precompile(address_of(9), Revision::Istanbul));
        assert!(!is_precompile(address_of(10), Revision::Berlin));
        assert!(is_precompile(address_of(10), Revision::Cancun));
        assert!(!is_precompile(address_of(11), Revision::Cancun));
    }

    #[test]
    fn identity_echoes_input() {
        let (output, gas_left) = run(address_of(4), b"hello", 1000).unwrap();
        assert_eq!(&output[..], b"hello");
        assert_eq!(gas_left, 1000 - (15 + 3));
    }

    #[test]
    fn insufficient_gas_fails() {
        assert_eq!(run(address_of(1), &[], 100), Err(StatusCode::OutOfGas));
    }

    #[test]
    fn blake2f_rejects_malformed_input() {
        assert_eq!(
            run(address_of(9), &[0; 10], 1_000_000),
            Err(StatusCode::PrecompileFailure)
        );
    }
}
