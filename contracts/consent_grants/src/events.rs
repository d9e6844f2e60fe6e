use crate::errors::ErrorContext;
use crate::roles::RoleTier;
use soroban_sdk::{symbol_short, Address, Env, String};

/// Event published when the contract is initialized.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InitializedEvent {
    pub admin: Address,
    pub timestamp: u64,
}

/// Event published when a hospital is registered.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HospitalRegisteredEvent {
    pub hospital: Address,
    pub name: String,
    pub timestamp: u64,
}

/// Event published when a healthcare staff member is registered.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StaffRegisteredEvent {
    pub staff: Address,
    pub hospital: Address,
    pub role: RoleTier,
    pub name: String,
    pub timestamp: u64,
}

/// Event published when a patient is registered.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PatientRegisteredEvent {
    pub patient: Address,
    pub timestamp: u64,
}

/// Event published when a hospital requests access to a patient's data.
/// The code itself is never published.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AccessRequestedEvent {
    pub request_id: u64,
    pub patient: Address,
    pub hospital: Address,
    pub staff: Address,
    pub timestamp: u64,
}

/// Event published when a pending request is converted into a grant.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConsentVerifiedEvent {
    pub grant_id: u64,
    pub patient: Address,
    pub hospital: Address,
    pub staff: Address,
    pub timestamp: u64,
}

/// Event published when the emergency bypass path creates a grant.
/// Published under its own topic so indexers can watch the bypass path
/// separately from normal consent grants.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EmergencyOverrideEvent {
    pub grant_id: u64,
    pub audit_id: u64,
    pub patient: Address,
    pub hospital: Address,
    pub staff: Address,
    pub timestamp: u64,
}

/// Event published when a medical record is created.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordCreatedEvent {
    pub record_id: u64,
    pub patient: Address,
    pub hospital: Address,
    pub staff: Address,
    pub timestamp: u64,
}

/// Event published when a medical record is updated.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordUpdatedEvent {
    pub record_id: u64,
    pub patient: Address,
    pub hospital: Address,
    pub staff: Address,
    pub timestamp: u64,
}

/// Event published when a medical record is deleted.
#[soroban_sdk::contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RecordDeletedEvent {
    pub record_id: u64,
    pub patient: Address,
    pub hospital: Address,
    pub staff: Address,
    pub timestamp: u64,
}

pub fn publish_initialized(env: &Env, admin: Address) {
    let topics = (symbol_short!("INIT"),);
    let data = InitializedEvent {
        admin,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_hospital_registered(env: &Env, hospital: Address, name: String) {
    let topics = (symbol_short!("HOSP_REG"), hospital.clone());
    let data = HospitalRegisteredEvent {
        hospital,
        name,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_staff_registered(
    env: &Env,
    staff: Address,
    hospital: Address,
    role: RoleTier,
    name: String,
) {
    let topics = (symbol_short!("STF_REG"), staff.clone(), hospital.clone());
    let data = StaffRegisteredEvent {
        staff,
        hospital,
        role,
        name,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_patient_registered(env: &Env, patient: Address) {
    let topics = (symbol_short!("PAT_REG"), patient.clone());
    let data = PatientRegisteredEvent {
        patient,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

/// Publishes an event when a hospital requests access to a patient's data.
pub fn publish_access_requested(
    env: &Env,
    request_id: u64,
    patient: Address,
    hospital: Address,
    staff: Address,
) {
    let topics = (symbol_short!("ACC_REQ"), patient.clone(), hospital.clone());
    let data = AccessRequestedEvent {
        request_id,
        patient,
        hospital,
        staff,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

/// Publishes an event when a code redemption converts a request into a grant.
pub fn publish_consent_verified(
    env: &Env,
    grant_id: u64,
    patient: Address,
    hospital: Address,
    staff: Address,
) {
    let topics = (symbol_short!("CST_VER"), patient.clone(), hospital.clone());
    let data = ConsentVerifiedEvent {
        grant_id,
        patient,
        hospital,
        staff,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

/// Publishes an event when the emergency bypass path creates a grant.
pub fn publish_emergency_override(
    env: &Env,
    grant_id: u64,
    audit_id: u64,
    patient: Address,
    hospital: Address,
    staff: Address,
) {
    let topics = (symbol_short!("EMRG_OVR"), patient.clone(), hospital.clone());
    let data = EmergencyOverrideEvent {
        grant_id,
        audit_id,
        patient,
        hospital,
        staff,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_record_created(
    env: &Env,
    record_id: u64,
    patient: Address,
    hospital: Address,
    staff: Address,
) {
    let topics = (symbol_short!("REC_ADD"), patient.clone(), hospital.clone());
    let data = RecordCreatedEvent {
        record_id,
        patient,
        hospital,
        staff,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_record_updated(
    env: &Env,
    record_id: u64,
    patient: Address,
    hospital: Address,
    staff: Address,
) {
    let topics = (symbol_short!("REC_UPD"), patient.clone(), hospital.clone());
    let data = RecordUpdatedEvent {
        record_id,
        patient,
        hospital,
        staff,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

pub fn publish_record_deleted(
    env: &Env,
    record_id: u64,
    patient: Address,
    hospital: Address,
    staff: Address,
) {
    let topics = (symbol_short!("REC_DEL"), patient.clone(), hospital.clone());
    let data = RecordDeletedEvent {
        record_id,
        patient,
        hospital,
        staff,
        timestamp: env.ledger().timestamp(),
    };
    env.events().publish(topics, data);
}

/// Publishes an error event for monitoring and indexing.
pub fn publish_error(env: &Env, error_code: u32, context: ErrorContext) {
    let topics = (
        symbol_short!("ERROR"),
        context.category.clone(),
        context.severity.clone(),
    );
    let data = (
        error_code,
        context.category,
        context.severity,
        context.message,
        context.subject,
        context.resource_id,
        context.retryable,
        context.timestamp,
    );
    env.events().publish(topics, data);
}
