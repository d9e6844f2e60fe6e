//! Medical record rows and their per-patient index.
//!
//! Authorization lives in the contract surface; this module only knows how
//! to store, look up and remove rows. `hospital` on a record is its
//! provenance (the hospital whose staff created it) and is what the
//! mutation gate compares against.

use soroban_sdk::{contracttype, symbol_short, Address, Env, String, Symbol, Vec};

const RECORD: Symbol = symbol_short!("RECORD");
const PAT_REC: Symbol = symbol_short!("PAT_REC");
const REC_CTR: Symbol = symbol_short!("REC_CTR");

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MedicalRecord {
    pub id: u64,
    pub patient: Address,
    pub hospital: Address,
    pub staff: Address,
    pub diagnosis: String,
    pub treatment: String,
    pub notes: String,
    pub created_at: u64,
    pub updated_at: u64,
}

fn record_key(id: u64) -> (Symbol, u64) {
    (RECORD, id)
}

fn patient_records_key(patient: &Address) -> (Symbol, Address) {
    (PAT_REC, patient.clone())
}

pub fn next_record_id(env: &Env) -> u64 {
    let id: u64 = env
        .storage()
        .instance()
        .get(&REC_CTR)
        .unwrap_or(0u64)
        .saturating_add(1);
    env.storage().instance().set(&REC_CTR, &id);
    id
}

pub fn get_record(env: &Env, id: u64) -> Option<MedicalRecord> {
    env.storage().persistent().get(&record_key(id))
}

pub fn set_record(env: &Env, record: &MedicalRecord) {
    let key = record_key(record.id);
    env.storage().persistent().set(&key, record);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Inserts a new record and appends it to the patient's index.
pub fn insert_record(env: &Env, record: &MedicalRecord) {
    set_record(env, record);

    let pk = patient_records_key(&record.patient);
    let mut ids: Vec<u64> = env.storage().persistent().get(&pk).unwrap_or(Vec::new(env));
    ids.push_back(record.id);
    env.storage().persistent().set(&pk, &ids);
    env.storage()
        .persistent()
        .extend_ttl(&pk, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Removes a record and its index entry.
pub fn remove_record(env: &Env, record: &MedicalRecord) {
    env.storage().persistent().remove(&record_key(record.id));

    let pk = patient_records_key(&record.patient);
    let ids: Vec<u64> = env.storage().persistent().get(&pk).unwrap_or(Vec::new(env));
    let mut remaining = Vec::new(env);
    for id in ids.iter() {
        if id != record.id {
            remaining.push_back(id);
        }
    }
    if remaining.is_empty() {
        env.storage().persistent().remove(&pk);
    } else {
        env.storage().persistent().set(&pk, &remaining);
    }
}

/// Record ids for a patient, oldest first.
pub fn records_for_patient(env: &Env, patient: &Address) -> Vec<u64> {
    env.storage()
        .persistent()
        .get(&patient_records_key(patient))
        .unwrap_or(Vec::new(env))
}
