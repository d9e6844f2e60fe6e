//! One-time code issuance.
//!
//! Codes are short numeric secrets binding a patient's out-of-band
//! confirmation to one pending request. They are drawn uniformly from
//! `[0, 10^length)` using the host PRNG.

use soroban_sdk::{Env, String};

use crate::errors::ContractError;

pub const DEFAULT_CODE_LENGTH: u32 = 6;

/// Longest code expressible without overflowing the `10^length` bound math.
const MAX_CODE_LENGTH: u32 = 9;

/// Generates a zero-padded numeric code of the given length.
///
/// Rejects lengths outside `1..=9` rather than clamping: a caller asking for
/// a degenerate code gets an error, not a weaker secret.
pub fn generate(env: &Env, length: u32) -> Result<String, ContractError> {
    if length == 0 || length > MAX_CODE_LENGTH {
        return Err(ContractError::InvalidInput);
    }

    let bound = 10u64.pow(length);
    let mut value: u64 = env.prng().gen_range(0..bound);

    let mut buf = [b'0'; MAX_CODE_LENGTH as usize];
    let mut i = length as usize;
    while value > 0 {
        i -= 1;
        buf[i] = b'0' + (value % 10) as u8;
        value /= 10;
    }

    Ok(String::from_bytes(env, &buf[..length as usize]))
}

/// Returns true if the submitted string has the shape of an issued code.
/// Used to short-circuit lookups for obviously malformed submissions; the
/// caller still reports a plain not-found so nothing about issued codes
/// leaks from the distinction.
pub fn is_well_formed(code: &String) -> bool {
    let len = code.len();
    if len == 0 || len > MAX_CODE_LENGTH {
        return false;
    }
    let mut buf = [0u8; MAX_CODE_LENGTH as usize];
    code.copy_into_slice(&mut buf[..len as usize]);
    buf[..len as usize].iter().all(|b| b.is_ascii_digit())
}
