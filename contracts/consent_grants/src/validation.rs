use soroban_sdk::String;

use crate::errors::ContractError;

const MIN_NAME_LEN: u32 = 2;
const MAX_NAME_LEN: u32 = 64;

pub const MIN_REASON_LEN: u32 = 20;
const MAX_REASON_LEN: u32 = 500;

const MAX_CLINICAL_LEN: u32 = 500;

const MIN_QUERY_LEN: u32 = 1;
const MAX_QUERY_LEN: u32 = 64;

/// Validate a display name (patient, staff or hospital).
/// Names must be between MIN_NAME_LEN and MAX_NAME_LEN bytes of printable ASCII.
pub fn validate_name(name: &String) -> Result<(), ContractError> {
    let len = name.len();
    if !(MIN_NAME_LEN..=MAX_NAME_LEN).contains(&len) {
        return Err(ContractError::InvalidInput);
    }

    let mut buf = [0u8; MAX_NAME_LEN as usize];
    name.copy_into_slice(&mut buf[..len as usize]);

    for &b in &buf[..len as usize] {
        // Printable ASCII only (space ' ' to tilde '~')
        if !(32..=126).contains(&b) {
            return Err(ContractError::InvalidInput);
        }
    }

    Ok(())
}

/// Validate an emergency override justification.
///
/// The written reason is the accountability anchor for the bypass path, so a
/// minimum length is enforced rather than mere non-emptiness. Tabs, newlines
/// and carriage returns are tolerated alongside printable ASCII.
pub fn validate_reason(reason: &String) -> Result<(), ContractError> {
    let len = reason.len();
    if !(MIN_REASON_LEN..=MAX_REASON_LEN).contains(&len) {
        return Err(ContractError::InvalidInput);
    }

    let mut buf = [0u8; MAX_REASON_LEN as usize];
    reason.copy_into_slice(&mut buf[..len as usize]);

    for &b in &buf[..len as usize] {
        let printable = (32..=126).contains(&b) || b == b'\t' || b == b'\n' || b == b'\r';
        if !printable {
            return Err(ContractError::InvalidInput);
        }
    }

    Ok(())
}

/// Validate a clinical free-text field (diagnosis, treatment, notes).
/// `allow_empty` distinguishes required fields from optional notes.
pub fn validate_clinical_text(text: &String, allow_empty: bool) -> Result<(), ContractError> {
    let len = text.len();
    if len == 0 {
        return if allow_empty {
            Ok(())
        } else {
            Err(ContractError::InvalidInput)
        };
    }
    if len > MAX_CLINICAL_LEN {
        return Err(ContractError::InvalidInput);
    }

    let mut buf = [0u8; MAX_CLINICAL_LEN as usize];
    text.copy_into_slice(&mut buf[..len as usize]);

    for &b in &buf[..len as usize] {
        let printable = (32..=126).contains(&b) || b == b'\t' || b == b'\n' || b == b'\r';
        if !printable {
            return Err(ContractError::InvalidInput);
        }
    }

    Ok(())
}

/// Validate a patient search query string.
pub fn validate_query(query: &String) -> Result<(), ContractError> {
    let len = query.len();
    if !(MIN_QUERY_LEN..=MAX_QUERY_LEN).contains(&len) {
        return Err(ContractError::InvalidInput);
    }

    let mut buf = [0u8; MAX_QUERY_LEN as usize];
    query.copy_into_slice(&mut buf[..len as usize]);

    for &b in &buf[..len as usize] {
        if !(32..=126).contains(&b) {
            return Err(ContractError::InvalidInput);
        }
    }

    Ok(())
}
