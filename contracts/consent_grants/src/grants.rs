//! Durable access grants.
//!
//! A grant is permanent within this protocol: once inserted it is never
//! updated or deleted, and no revoke operation exists. Multiple independent
//! grants may accumulate for the same `(hospital, patient)` pair, e.g. one
//! consent-backed and one emergency, so grants are stored by id with a
//! per-pair index backing the access query.

use soroban_sdk::{contracttype, symbol_short, Address, Env, Symbol, Vec};

const GRANT: Symbol = symbol_short!("GRANT");
const ACC_IDX: Symbol = symbol_short!("ACC_IDX");
const GRANT_CTR: Symbol = symbol_short!("GRANT_CTR");

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

/// A permanent record that a hospital holds patient-authorized (or
/// emergency-authorized) access. `emergency` marks grants created through
/// the bypass path so they stay distinguishable for review.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Grant {
    pub id: u64,
    pub patient: Address,
    pub hospital: Address,
    pub staff: Address,
    pub emergency: bool,
    pub created_at: u64,
}

fn grant_key(id: u64) -> (Symbol, u64) {
    (GRANT, id)
}

fn access_key(hospital: &Address, patient: &Address) -> (Symbol, Address, Address) {
    (ACC_IDX, hospital.clone(), patient.clone())
}

pub fn next_grant_id(env: &Env) -> u64 {
    let id: u64 = env
        .storage()
        .instance()
        .get(&GRANT_CTR)
        .unwrap_or(0u64)
        .saturating_add(1);
    env.storage().instance().set(&GRANT_CTR, &id);
    id
}

/// Inserts a grant and records it in the pair index. Grants are never
/// updated or removed.
pub fn insert_grant(env: &Env, grant: &Grant) {
    let key = grant_key(grant.id);
    env.storage().persistent().set(&key, grant);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);

    let ak = access_key(&grant.hospital, &grant.patient);
    let mut ids: Vec<u64> = env.storage().persistent().get(&ak).unwrap_or(Vec::new(env));
    ids.push_back(grant.id);
    env.storage().persistent().set(&ak, &ids);
    env.storage()
        .persistent()
        .extend_ttl(&ak, TTL_THRESHOLD, TTL_EXTEND_TO);
}

pub fn get_grant(env: &Env, id: u64) -> Option<Grant> {
    env.storage().persistent().get(&grant_key(id))
}

/// Whether the hospital currently holds at least one grant for the patient.
/// Backs every record-CRUD authorization check.
pub fn has_access(env: &Env, hospital: &Address, patient: &Address) -> bool {
    let ids: Vec<u64> = env
        .storage()
        .persistent()
        .get(&access_key(hospital, patient))
        .unwrap_or(Vec::new(env));
    !ids.is_empty()
}

/// All grants a hospital holds for a patient, oldest first.
pub fn grants_for(env: &Env, hospital: &Address, patient: &Address) -> Vec<Grant> {
    let ids: Vec<u64> = env
        .storage()
        .persistent()
        .get(&access_key(hospital, patient))
        .unwrap_or(Vec::new(env));

    let mut grants = Vec::new(env);
    for id in ids.iter() {
        if let Some(grant) = get_grant(env, id) {
            grants.push_back(grant);
        }
    }
    grants
}
