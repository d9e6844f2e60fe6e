//! Append-only audit trail.
//!
//! Every access-affecting action writes exactly one entry here, inside the
//! same invocation as the action itself: the trail cannot be missing an
//! entry for an operation that committed, and an operation cannot commit if
//! its audit write fails. Entries are never updated or deleted.
//!
//! Emergency overrides additionally land in a dedicated review index so the
//! bypass path stays independently visible instead of blending into the
//! normal trail.

use soroban_sdk::{contracttype, symbol_short, Address, Env, String, Symbol, Vec};

const AUDIT: Symbol = symbol_short!("AUDIT");
const HOSP_AUD: Symbol = symbol_short!("HOSP_AUD");
const PAT_AUD: Symbol = symbol_short!("PAT_AUD");
const AUD_CTR: Symbol = symbol_short!("AUD_CTR");
const REV_IDX: Symbol = symbol_short!("REV_IDX");

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

const SECONDS_PER_DAY: u64 = 86400;
const SECONDS_PER_WEEK: u64 = 7 * SECONDS_PER_DAY;

/// Typed audit actions. The emergency variant carries the written
/// justification so the trail itself holds the accountability record.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AuditAction {
    RequestedData,
    AcceptedRequest,
    EmergencyOverride(String),
    CreatedRecord,
    UpdatedRecord,
    DeletedRecord,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AuditLogEntry {
    pub id: u64,
    pub patient: Address,
    pub hospital: Address,
    pub staff: Address,
    pub action: AuditAction,
    pub created_at: u64,
}

/// Per-hospital activity counters derived from the audit trail.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DashboardStats {
    pub today_requests: u32,
    pub today_accepted: u32,
    pub week_records: u32,
    pub today_actions: u32,
}

fn entry_key(id: u64) -> (Symbol, u64) {
    (AUDIT, id)
}

fn hospital_index_key(hospital: &Address) -> (Symbol, Address) {
    (HOSP_AUD, hospital.clone())
}

fn patient_index_key(patient: &Address) -> (Symbol, Address) {
    (PAT_AUD, patient.clone())
}

fn push_index(env: &Env, key: &(Symbol, Address), id: u64) {
    let mut ids: Vec<u64> = env.storage().persistent().get(key).unwrap_or(Vec::new(env));
    ids.push_back(id);
    env.storage().persistent().set(key, &ids);
    env.storage()
        .persistent()
        .extend_ttl(key, TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Appends one entry and returns its id.
pub fn append(
    env: &Env,
    patient: &Address,
    hospital: &Address,
    staff: &Address,
    action: AuditAction,
) -> u64 {
    let id: u64 = env
        .storage()
        .instance()
        .get(&AUD_CTR)
        .unwrap_or(0u64)
        .saturating_add(1);
    env.storage().instance().set(&AUD_CTR, &id);

    let flagged = matches!(action, AuditAction::EmergencyOverride(_));

    let entry = AuditLogEntry {
        id,
        patient: patient.clone(),
        hospital: hospital.clone(),
        staff: staff.clone(),
        action,
        created_at: env.ledger().timestamp(),
    };

    let key = entry_key(id);
    env.storage().persistent().set(&key, &entry);
    env.storage()
        .persistent()
        .extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND_TO);

    push_index(env, &hospital_index_key(hospital), id);
    push_index(env, &patient_index_key(patient), id);

    if flagged {
        let mut review: Vec<u64> = env
            .storage()
            .persistent()
            .get(&REV_IDX)
            .unwrap_or(Vec::new(env));
        review.push_back(id);
        env.storage().persistent().set(&REV_IDX, &review);
        env.storage()
            .persistent()
            .extend_ttl(&REV_IDX, TTL_THRESHOLD, TTL_EXTEND_TO);
    }

    id
}

pub fn get_entry(env: &Env, id: u64) -> Option<AuditLogEntry> {
    env.storage().persistent().get(&entry_key(id))
}

/// Entries for a hospital, newest first, capped at `limit`.
pub fn entries_for_hospital(env: &Env, hospital: &Address, limit: u32) -> Vec<AuditLogEntry> {
    let ids: Vec<u64> = env
        .storage()
        .persistent()
        .get(&hospital_index_key(hospital))
        .unwrap_or(Vec::new(env));

    let mut entries = Vec::new(env);
    let mut i = ids.len();
    while i > 0 && entries.len() < limit {
        i -= 1;
        if let Some(id) = ids.get(i) {
            if let Some(entry) = get_entry(env, id) {
                entries.push_back(entry);
            }
        }
    }
    entries
}

/// Entries for a patient, newest first, capped at `limit`.
pub fn entries_for_patient(env: &Env, patient: &Address, limit: u32) -> Vec<AuditLogEntry> {
    let ids: Vec<u64> = env
        .storage()
        .persistent()
        .get(&patient_index_key(patient))
        .unwrap_or(Vec::new(env));

    let mut entries = Vec::new(env);
    let mut i = ids.len();
    while i > 0 && entries.len() < limit {
        i -= 1;
        if let Some(id) = ids.get(i) {
            if let Some(entry) = get_entry(env, id) {
                entries.push_back(entry);
            }
        }
    }
    entries
}

/// All emergency-override entries awaiting review, oldest first.
pub fn flagged_overrides(env: &Env) -> Vec<AuditLogEntry> {
    let ids: Vec<u64> = env
        .storage()
        .persistent()
        .get(&REV_IDX)
        .unwrap_or(Vec::new(env));

    let mut entries = Vec::new(env);
    for id in ids.iter() {
        if let Some(entry) = get_entry(env, id) {
            entries.push_back(entry);
        }
    }
    entries
}

/// Derives a hospital's dashboard counters from its audit entries.
///
/// "Today" is the current UTC ledger day; "week" is a rolling seven days.
/// Accepted counts include both consent-verified and emergency grants.
pub fn stats_for_hospital(env: &Env, hospital: &Address) -> DashboardStats {
    let now = env.ledger().timestamp();
    let today = now / SECONDS_PER_DAY;
    let week_start = now.saturating_sub(SECONDS_PER_WEEK);

    let ids: Vec<u64> = env
        .storage()
        .persistent()
        .get(&hospital_index_key(hospital))
        .unwrap_or(Vec::new(env));

    let mut stats = DashboardStats {
        today_requests: 0,
        today_accepted: 0,
        week_records: 0,
        today_actions: 0,
    };

    for id in ids.iter() {
        let entry = match get_entry(env, id) {
            Some(entry) => entry,
            None => continue,
        };
        let is_today = entry.created_at / SECONDS_PER_DAY == today;

        if is_today {
            stats.today_actions = stats.today_actions.saturating_add(1);
        }
        match entry.action {
            AuditAction::RequestedData => {
                if is_today {
                    stats.today_requests = stats.today_requests.saturating_add(1);
                }
            }
            AuditAction::AcceptedRequest | AuditAction::EmergencyOverride(_) => {
                if is_today {
                    stats.today_accepted = stats.today_accepted.saturating_add(1);
                }
            }
            AuditAction::CreatedRecord | AuditAction::UpdatedRecord => {
                if entry.created_at >= week_start {
                    stats.week_records = stats.week_records.saturating_add(1);
                }
            }
            AuditAction::DeletedRecord => {}
        }
    }

    stats
}
