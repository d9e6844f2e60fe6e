//! Pending access requests.
//!
//! The hard invariant lives here: at most one pending request per
//! `(hospital, patient)` pair, enforced by keying storage on the pair itself
//! rather than by a check in application code. The code index maps an issued
//! code back to its pair so verification is a single lookup; both entries are
//! written and removed inside the same invocation, which is atomic.

use soroban_sdk::{contracttype, symbol_short, Address, Env, String, Symbol, Vec};

use crate::errors::ContractError;
use crate::otp;

const PENDING: Symbol = symbol_short!("PENDING");
const CODE_IDX: Symbol = symbol_short!("CODE_IDX");
const PAT_PND: Symbol = symbol_short!("PAT_PND");
const REQ_CTR: Symbol = symbol_short!("REQ_CTR");

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

const MAX_CODE_DRAWS: u32 = 32;

/// An unredeemed access request awaiting code confirmation.
///
/// Deleted exclusively by a successful verification. The emergency path
/// never creates or touches one of these.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PendingRequest {
    pub id: u64,
    pub patient: Address,
    pub hospital: Address,
    pub staff: Address,
    pub code: String,
    pub created_at: u64,
}

/// Reverse mapping from an issued code to the pair that owns it.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CodeRef {
    pub hospital: Address,
    pub patient: Address,
}

fn pending_key(hospital: &Address, patient: &Address) -> (Symbol, Address, Address) {
    (PENDING, hospital.clone(), patient.clone())
}

fn code_key(code: &String) -> (Symbol, String) {
    (CODE_IDX, code.clone())
}

fn patient_pending_key(patient: &Address) -> (Symbol, Address) {
    (PAT_PND, patient.clone())
}

pub fn next_request_id(env: &Env) -> u64 {
    let id: u64 = env
        .storage()
        .instance()
        .get(&REQ_CTR)
        .unwrap_or(0u64)
        .saturating_add(1);
    env.storage().instance().set(&REQ_CTR, &id);
    id
}

/// Whether a code is already bound to an outstanding pending request.
pub fn code_in_use(env: &Env, code: &String) -> bool {
    env.storage().persistent().has(&code_key(code))
}

/// Draws codes until one is free in the code index.
///
/// The index maps each outstanding code to exactly one pending request, so a
/// freshly drawn code that collides with an outstanding one must be redrawn
/// rather than overwrite the earlier binding. Redraws are bounded; a full
/// code space reports `CodeExhausted`.
pub fn issue_code(env: &Env, length: u32) -> Result<String, ContractError> {
    for _ in 0..MAX_CODE_DRAWS {
        let code = otp::generate(env, length)?;
        if !code_in_use(env, &code) {
            return Ok(code);
        }
    }
    Err(ContractError::CodeExhausted)
}

pub fn has_pending(env: &Env, hospital: &Address, patient: &Address) -> bool {
    env.storage()
        .persistent()
        .has(&pending_key(hospital, patient))
}

pub fn get_pending(env: &Env, hospital: &Address, patient: &Address) -> Option<PendingRequest> {
    env.storage()
        .persistent()
        .get(&pending_key(hospital, patient))
}

/// Persists a pending request together with its code index and the
/// patient-side inbox entry.
pub fn insert_pending(env: &Env, request: &PendingRequest) {
    let key = pending_key(&request.hospital, &request.patient);
    env.storage().persistent().set(&key, request);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);

    let ck = code_key(&request.code);
    let code_ref = CodeRef {
        hospital: request.hospital.clone(),
        patient: request.patient.clone(),
    };
    env.storage().persistent().set(&ck, &code_ref);
    env.storage()
        .persistent()
        .extend_ttl(&ck, TTL_THRESHOLD, TTL_EXTEND_TO);

    let pk = patient_pending_key(&request.patient);
    let mut hospitals: Vec<Address> = env.storage().persistent().get(&pk).unwrap_or(Vec::new(env));
    if !hospitals.contains(&request.hospital) {
        hospitals.push_back(request.hospital.clone());
        env.storage().persistent().set(&pk, &hospitals);
        env.storage()
            .persistent()
            .extend_ttl(&pk, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
}

/// Removes a pending request and all of its index entries.
pub fn remove_pending(env: &Env, request: &PendingRequest) {
    env.storage()
        .persistent()
        .remove(&pending_key(&request.hospital, &request.patient));
    env.storage().persistent().remove(&code_key(&request.code));

    let pk = patient_pending_key(&request.patient);
    let hospitals: Vec<Address> = env.storage().persistent().get(&pk).unwrap_or(Vec::new(env));
    let mut remaining = Vec::new(env);
    for hospital in hospitals.iter() {
        if hospital != request.hospital {
            remaining.push_back(hospital);
        }
    }
    if remaining.is_empty() {
        env.storage().persistent().remove(&pk);
    } else {
        env.storage().persistent().set(&pk, &remaining);
    }
}

/// Resolves a submitted code to its pending request.
///
/// An index entry without a backing request means a prior removal half
/// completed, which this protocol never tolerates silently.
pub fn find_by_code(env: &Env, code: &String) -> Result<Option<PendingRequest>, ContractError> {
    let code_ref: Option<CodeRef> = env.storage().persistent().get(&code_key(code));
    match code_ref {
        None => Ok(None),
        Some(code_ref) => match get_pending(env, &code_ref.hospital, &code_ref.patient) {
            Some(request) if request.code == *code => Ok(Some(request)),
            // The pair has a pending request but under a different code:
            // this index entry is stale. Same integrity failure as a
            // missing request.
            Some(_) | None => Err(ContractError::IntegrityError),
        },
    }
}

/// All pending requests addressed to a patient, the patient's "inbox".
pub fn pending_for_patient(env: &Env, patient: &Address) -> Vec<PendingRequest> {
    let hospitals: Vec<Address> = env
        .storage()
        .persistent()
        .get(&patient_pending_key(patient))
        .unwrap_or(Vec::new(env));

    let mut requests = Vec::new(env);
    for hospital in hospitals.iter() {
        if let Some(request) = get_pending(env, &hospital, patient) {
            requests.push_back(request);
        }
    }
    requests
}
