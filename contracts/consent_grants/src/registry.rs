//! Identity rows the consent protocol resolves callers against.
//!
//! The identity provider hands the contract a stable opaque subject id (the
//! Soroban [`Address`]); these rows bind that id to a patient, staff member
//! or hospital. A caller whose address resolves to no row is treated as
//! unauthenticated regardless of signature validity.

use soroban_sdk::{contracttype, symbol_short, Address, Env, String, Symbol, Vec};

use crate::roles::RoleTier;

const PATIENT: Symbol = symbol_short!("PATIENT");
const STAFF: Symbol = symbol_short!("STAFF");
const HOSPITAL: Symbol = symbol_short!("HOSPITAL");
const PAT_IDX: Symbol = symbol_short!("PAT_IDX");

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

pub const MAX_SEARCH_RESULTS: u32 = 100;

const MAX_FIELD_LEN: usize = 64;

fn extend_ttl_address_key(env: &Env, key: &(Symbol, Address)) {
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Patient demographic row. Owned by the registry; the consent protocol
/// references patients, it never mutates them.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Patient {
    pub address: Address,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub contact: String,
    pub registered_at: u64,
}

/// Healthcare staff row with hospital affiliation and capability tier.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HealthcareStaff {
    pub address: Address,
    pub hospital: Address,
    pub role: RoleTier,
    pub name: String,
    pub registered_at: u64,
    pub is_active: bool,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Hospital {
    pub address: Address,
    pub name: String,
    pub registered_at: u64,
}

pub fn has_patient(env: &Env, address: &Address) -> bool {
    env.storage().persistent().has(&(PATIENT, address.clone()))
}

pub fn get_patient(env: &Env, address: &Address) -> Option<Patient> {
    env.storage().persistent().get(&(PATIENT, address.clone()))
}

/// Stores a patient row and adds it to the search index.
pub fn set_patient(env: &Env, patient: &Patient) {
    let key = (PATIENT, patient.address.clone());
    env.storage().persistent().set(&key, patient);
    extend_ttl_address_key(env, &key);

    let mut index: Vec<Address> = env.storage().persistent().get(&PAT_IDX).unwrap_or(Vec::new(env));
    if !index.contains(&patient.address) {
        index.push_back(patient.address.clone());
        env.storage().persistent().set(&PAT_IDX, &index);
        env.storage()
            .persistent()
            .extend_ttl(&PAT_IDX, TTL_THRESHOLD, TTL_EXTEND_TO);
    }
}

pub fn get_staff(env: &Env, address: &Address) -> Option<HealthcareStaff> {
    env.storage().persistent().get(&(STAFF, address.clone()))
}

pub fn set_staff(env: &Env, staff: &HealthcareStaff) {
    let key = (STAFF, staff.address.clone());
    env.storage().persistent().set(&key, staff);
    extend_ttl_address_key(env, &key);
}

pub fn has_hospital(env: &Env, address: &Address) -> bool {
    env.storage().persistent().has(&(HOSPITAL, address.clone()))
}

pub fn get_hospital(env: &Env, address: &Address) -> Option<Hospital> {
    env.storage().persistent().get(&(HOSPITAL, address.clone()))
}

pub fn set_hospital(env: &Env, hospital: &Hospital) {
    let key = (HOSPITAL, hospital.address.clone());
    env.storage().persistent().set(&key, hospital);
    extend_ttl_address_key(env, &key);
}

/// Case-insensitive substring match of `needle` against a stored field.
/// Fields are capped at 64 bytes by registration validation.
fn field_matches(field: &String, needle: &[u8]) -> bool {
    let len = field.len() as usize;
    if len == 0 || needle.is_empty() || needle.len() > len || len > MAX_FIELD_LEN {
        return false;
    }
    let mut buf = [0u8; MAX_FIELD_LEN];
    field.copy_into_slice(&mut buf[..len]);
    for b in buf[..len].iter_mut() {
        *b = b.to_ascii_lowercase();
    }
    buf[..len].windows(needle.len()).any(|w| w == needle)
}

/// Searches patients across name, email and contact fields.
/// Matching is a case-insensitive substring scan, capped at
/// [`MAX_SEARCH_RESULTS`] rows like the record store's own query limit.
pub fn search_patients(env: &Env, query: &String) -> Vec<Patient> {
    let qlen = query.len() as usize;
    let mut qbuf = [0u8; MAX_FIELD_LEN];
    query.copy_into_slice(&mut qbuf[..qlen]);
    for b in qbuf[..qlen].iter_mut() {
        *b = b.to_ascii_lowercase();
    }
    let needle = &qbuf[..qlen];

    let index: Vec<Address> = env.storage().persistent().get(&PAT_IDX).unwrap_or(Vec::new(env));
    let mut results = Vec::new(env);

    for address in index.iter() {
        if results.len() >= MAX_SEARCH_RESULTS {
            break;
        }
        if let Some(patient) = get_patient(env, &address) {
            if field_matches(&patient.first_name, needle)
                || field_matches(&patient.last_name, needle)
                || field_matches(&patient.email, needle)
                || field_matches(&patient.contact, needle)
            {
                results.push_back(patient);
            }
        }
    }

    results
}
