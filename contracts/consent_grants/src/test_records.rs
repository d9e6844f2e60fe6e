#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::arithmetic_side_effects
)]

use super::*;
use soroban_sdk::testutils::{Address as _, Events, Ledger};
use soroban_sdk::{symbol_short, vec, Env, IntoVal, Val};

struct Clinic {
    hospital: Address,
    staff: Address,
}

fn setup() -> (Env, ConsentGrantsContractClient<'static>, Address) {
    let env = Env::default();
    env.mock_all_auths();

    let contract_id = env.register(ConsentGrantsContract, ());
    let client = ConsentGrantsContractClient::new(&env, &contract_id);

    let admin = Address::generate(&env);
    client.initialize(&admin);

    (env, client, admin)
}

fn setup_clinic(
    env: &Env,
    client: &ConsentGrantsContractClient<'static>,
    admin: &Address,
    role: RoleTier,
) -> Clinic {
    let hospital = Address::generate(env);
    client.register_hospital(admin, &hospital, &String::from_str(env, "General"));

    let staff = Address::generate(env);
    client.register_staff(
        admin,
        &staff,
        &hospital,
        &role,
        &String::from_str(env, "Dr. Ada Obi"),
    );

    Clinic { hospital, staff }
}

fn setup_patient(
    env: &Env,
    client: &ConsentGrantsContractClient<'static>,
    admin: &Address,
) -> Address {
    let patient = Address::generate(env);
    client.register_patient(
        admin,
        &patient,
        &String::from_str(env, "Ngozi"),
        &String::from_str(env, "Eze"),
        &String::from_str(env, "ngozi@example.com"),
        &String::from_str(env, "08031112222"),
    );
    patient
}

fn grant_consent(
    client: &ConsentGrantsContractClient<'static>,
    clinic: &Clinic,
    patient: &Address,
) {
    let request = client.request_access(&clinic.staff, patient);
    client.verify_otp(patient, &request.code);
}

fn create_record(
    env: &Env,
    client: &ConsentGrantsContractClient<'static>,
    clinic: &Clinic,
    patient: &Address,
) -> u64 {
    client.create_record(
        &clinic.staff,
        patient,
        &String::from_str(env, "Hypertension, stage 1"),
        &String::from_str(env, "Amlodipine 5mg daily"),
        &String::from_str(env, "Review in four weeks"),
    )
}

#[test]
fn test_create_record_requires_grant() {
    let (env, client, admin) = setup();
    let clinic = setup_clinic(&env, &client, &admin, RoleTier::Edit);
    let patient = setup_patient(&env, &client, &admin);

    // No grant yet
    let res = client.try_create_record(
        &clinic.staff,
        &patient,
        &String::from_str(&env, "Hypertension"),
        &String::from_str(&env, "Amlodipine"),
        &String::from_str(&env, ""),
    );
    assert!(matches!(res.unwrap_err(), Ok(ContractError::AccessDenied)));

    grant_consent(&client, &clinic, &patient);
    let record_id = create_record(&env, &client, &clinic, &patient);
    let events = env.events().all();

    let record = client.get_record(&clinic.staff, &record_id);
    assert_eq!(record.patient, patient);
    assert_eq!(record.hospital, clinic.hospital);
    assert_eq!(record.diagnosis, String::from_str(&env, "Hypertension, stage 1"));
    assert_eq!(record.created_at, record.updated_at);

    let expected: Vec<(Address, Vec<Val>, Val)> = vec![
        &env,
        (
            client.address.clone(),
            (
                symbol_short!("REC_ADD"),
                patient.clone(),
                clinic.hospital.clone(),
            )
                .into_val(&env),
            events::RecordCreatedEvent {
                record_id,
                patient: patient.clone(),
                hospital: clinic.hospital.clone(),
                staff: clinic.staff.clone(),
                timestamp: env.ledger().timestamp(),
            }
            .into_val(&env),
        ),
    ];
    assert_eq!(events, expected);
}

#[test]
fn test_create_record_requires_edit_tier() {
    let (env, client, admin) = setup();
    let clinic = setup_clinic(&env, &client, &admin, RoleTier::ReadOnly);
    let patient = setup_patient(&env, &client, &admin);
    grant_consent(&client, &clinic, &patient);

    let res = client.try_create_record(
        &clinic.staff,
        &patient,
        &String::from_str(&env, "Hypertension"),
        &String::from_str(&env, "Amlodipine"),
        &String::from_str(&env, ""),
    );
    assert!(matches!(res.unwrap_err(), Ok(ContractError::Unauthorized)));
}

#[test]
fn test_create_record_validates_clinical_text() {
    let (env, client, admin) = setup();
    let clinic = setup_clinic(&env, &client, &admin, RoleTier::Edit);
    let patient = setup_patient(&env, &client, &admin);
    grant_consent(&client, &clinic, &patient);

    // Empty diagnosis is rejected, empty notes are fine
    let res = client.try_create_record(
        &clinic.staff,
        &patient,
        &String::from_str(&env, ""),
        &String::from_str(&env, "Amlodipine"),
        &String::from_str(&env, ""),
    );
    assert!(matches!(res.unwrap_err(), Ok(ContractError::InvalidInput)));

    let long = "x".repeat(501);
    let res = client.try_create_record(
        &clinic.staff,
        &patient,
        &String::from_str(&env, &long),
        &String::from_str(&env, "Amlodipine"),
        &String::from_str(&env, ""),
    );
    assert!(matches!(res.unwrap_err(), Ok(ContractError::InvalidInput)));
}

#[test]
fn test_get_record_visibility() {
    let (env, client, admin) = setup();
    let clinic = setup_clinic(&env, &client, &admin, RoleTier::Edit);
    let patient = setup_patient(&env, &client, &admin);
    grant_consent(&client, &clinic, &patient);
    let record_id = create_record(&env, &client, &clinic, &patient);

    // The patient can always read their own record
    let record = client.get_record(&patient, &record_id);
    assert_eq!(record.id, record_id);

    // Staff of a hospital without a grant cannot
    let other = setup_clinic(&env, &client, &admin, RoleTier::Edit);
    let res = client.try_get_record(&other.staff, &record_id);
    assert!(matches!(res.unwrap_err(), Ok(ContractError::AccessDenied)));

    // A granted hospital's reader-tier staff can
    let reader = Address::generate(&env);
    client.register_staff(
        &admin,
        &reader,
        &clinic.hospital,
        &RoleTier::ReadOnly,
        &String::from_str(&env, "Nurse Bell"),
    );
    let record = client.get_record(&reader, &record_id);
    assert_eq!(record.id, record_id);

    // A missing-record lookup fails and rolls back its error-log write
    let res = client.try_get_record(&patient, &9999u64);
    assert!(matches!(
        res.unwrap_err(),
        Ok(ContractError::RecordNotFound)
    ));
    assert_eq!(client.get_error_count(), 0);
}

#[test]
fn test_get_patient_records_listing() {
    let (env, client, admin) = setup();
    let clinic = setup_clinic(&env, &client, &admin, RoleTier::Edit);
    let patient = setup_patient(&env, &client, &admin);
    grant_consent(&client, &clinic, &patient);

    let first = create_record(&env, &client, &clinic, &patient);
    let second = create_record(&env, &client, &clinic, &patient);

    let ids = client.get_patient_records(&patient, &patient);
    assert_eq!(ids.len(), 2);
    assert_eq!(ids.get(0).unwrap(), first);
    assert_eq!(ids.get(1).unwrap(), second);

    let ids = client.get_patient_records(&clinic.staff, &patient);
    assert_eq!(ids.len(), 2);

    let other = setup_clinic(&env, &client, &admin, RoleTier::Edit);
    let res = client.try_get_patient_records(&other.staff, &patient);
    assert!(matches!(res.unwrap_err(), Ok(ContractError::AccessDenied)));
}

#[test]
fn test_update_record() {
    let (env, client, admin) = setup();
    let clinic = setup_clinic(&env, &client, &admin, RoleTier::Edit);
    let patient = setup_patient(&env, &client, &admin);
    grant_consent(&client, &clinic, &patient);
    let record_id = create_record(&env, &client, &clinic, &patient);

    env.ledger().set_timestamp(env.ledger().timestamp() + 3600);

    client.update_record(
        &clinic.staff,
        &record_id,
        &String::from_str(&env, "Hypertension, stage 2"),
        &String::from_str(&env, "Amlodipine 10mg daily"),
        &String::from_str(&env, ""),
    );
    let events = env.events().all();

    let record = client.get_record(&patient, &record_id);
    assert_eq!(
        record.diagnosis,
        String::from_str(&env, "Hypertension, stage 2")
    );
    assert!(record.updated_at > record.created_at);

    let expected: Vec<(Address, Vec<Val>, Val)> = vec![
        &env,
        (
            client.address.clone(),
            (
                symbol_short!("REC_UPD"),
                patient.clone(),
                clinic.hospital.clone(),
            )
                .into_val(&env),
            events::RecordUpdatedEvent {
                record_id,
                patient: patient.clone(),
                hospital: clinic.hospital.clone(),
                staff: clinic.staff.clone(),
                timestamp: env.ledger().timestamp(),
            }
            .into_val(&env),
        ),
    ];
    assert_eq!(events, expected);
}

#[test]
fn test_update_record_requires_provenance() {
    let (env, client, admin) = setup();
    let clinic = setup_clinic(&env, &client, &admin, RoleTier::Edit);
    let patient = setup_patient(&env, &client, &admin);
    grant_consent(&client, &clinic, &patient);
    let record_id = create_record(&env, &client, &clinic, &patient);

    // A second hospital with its own grant still cannot touch the first
    // hospital's record
    let other = setup_clinic(&env, &client, &admin, RoleTier::Edit);
    grant_consent(&client, &other, &patient);

    let res = client.try_update_record(
        &other.staff,
        &record_id,
        &String::from_str(&env, "Rewritten"),
        &String::from_str(&env, "Rewritten"),
        &String::from_str(&env, ""),
    );
    assert!(matches!(res.unwrap_err(), Ok(ContractError::Unauthorized)));

    let res = client.try_delete_record(&other.staff, &record_id);
    assert!(matches!(res.unwrap_err(), Ok(ContractError::Unauthorized)));
}

#[test]
fn test_delete_record() {
    let (env, client, admin) = setup();
    let clinic = setup_clinic(&env, &client, &admin, RoleTier::Edit);
    let patient = setup_patient(&env, &client, &admin);
    grant_consent(&client, &clinic, &patient);
    let record_id = create_record(&env, &client, &clinic, &patient);

    client.delete_record(&clinic.staff, &record_id);

    let res = client.try_get_record(&patient, &record_id);
    assert!(matches!(
        res.unwrap_err(),
        Ok(ContractError::RecordNotFound)
    ));
    assert_eq!(client.get_patient_records(&patient, &patient).len(), 0);

    // Deleting again reports the record gone
    let res = client.try_delete_record(&clinic.staff, &record_id);
    assert!(matches!(
        res.unwrap_err(),
        Ok(ContractError::RecordNotFound)
    ));
}

#[test]
fn test_audit_logs_scoped_to_hospital() {
    let (env, client, admin) = setup();
    let clinic = setup_clinic(&env, &client, &admin, RoleTier::Edit);
    let patient = setup_patient(&env, &client, &admin);
    grant_consent(&client, &clinic, &patient);
    create_record(&env, &client, &clinic, &patient);

    // Request, accept, create
    let logs = client.get_audit_logs(&clinic.staff, &clinic.hospital, &10);
    assert_eq!(logs.len(), 3);
    assert_eq!(logs.get(0).unwrap().action, AuditAction::CreatedRecord);
    assert_eq!(logs.get(1).unwrap().action, AuditAction::AcceptedRequest);
    assert_eq!(logs.get(2).unwrap().action, AuditAction::RequestedData);

    // The limit truncates from the newest end
    let logs = client.get_audit_logs(&admin, &clinic.hospital, &2);
    assert_eq!(logs.len(), 2);
    assert_eq!(logs.get(0).unwrap().action, AuditAction::CreatedRecord);

    // Staff of another hospital cannot read this hospital's trail
    let other = setup_clinic(&env, &client, &admin, RoleTier::ReadOnly);
    let res = client.try_get_audit_logs(&other.staff, &clinic.hospital, &10);
    assert!(matches!(res.unwrap_err(), Ok(ContractError::Unauthorized)));

    // A patient sees their own trail regardless of hospital
    let logs = client.get_patient_audit_logs(&patient, &10);
    assert_eq!(logs.len(), 3);
}

#[test]
fn test_dashboard_stats_day_and_week_windows() {
    let (env, client, admin) = setup();
    env.ledger().set_timestamp(1_000_000);

    let clinic = setup_clinic(&env, &client, &admin, RoleTier::Edit);
    let patient = setup_patient(&env, &client, &admin);

    // Day one: request, accept, create a record
    grant_consent(&client, &clinic, &patient);
    let record_id = create_record(&env, &client, &clinic, &patient);

    let stats = client.get_dashboard_stats(&clinic.staff, &clinic.hospital);
    assert_eq!(stats.today_requests, 1);
    assert_eq!(stats.today_accepted, 1);
    assert_eq!(stats.week_records, 1);
    assert_eq!(stats.today_actions, 3);

    // Next day: the daily counters reset, the weekly one does not
    env.ledger().set_timestamp(1_000_000 + 86_400);
    let stats = client.get_dashboard_stats(&clinic.staff, &clinic.hospital);
    assert_eq!(stats.today_requests, 0);
    assert_eq!(stats.today_accepted, 0);
    assert_eq!(stats.week_records, 1);
    assert_eq!(stats.today_actions, 0);

    // An update counts toward the weekly record tally
    client.update_record(
        &clinic.staff,
        &record_id,
        &String::from_str(&env, "Hypertension, stage 2"),
        &String::from_str(&env, "Amlodipine 10mg daily"),
        &String::from_str(&env, ""),
    );
    let stats = client.get_dashboard_stats(&clinic.staff, &clinic.hospital);
    assert_eq!(stats.week_records, 2);
    assert_eq!(stats.today_actions, 1);

    // Nine days later everything has aged out
    env.ledger().set_timestamp(1_000_000 + 9 * 86_400);
    let stats = client.get_dashboard_stats(&clinic.staff, &clinic.hospital);
    assert_eq!(stats.today_requests, 0);
    assert_eq!(stats.today_accepted, 0);
    assert_eq!(stats.week_records, 0);
    assert_eq!(stats.today_actions, 0);
}

#[test]
fn test_dashboard_counts_emergency_as_accepted() {
    let (env, client, admin) = setup();
    env.ledger().set_timestamp(1_000_000);

    let clinic = setup_clinic(&env, &client, &admin, RoleTier::EmergencyOverride);
    let patient = setup_patient(&env, &client, &admin);

    client.emergency_override(
        &clinic.staff,
        &patient,
        &String::from_str(&env, "Unconscious trauma patient in resus bay two"),
    );

    let stats = client.get_dashboard_stats(&admin, &clinic.hospital);
    assert_eq!(stats.today_requests, 0);
    assert_eq!(stats.today_accepted, 1);
    assert_eq!(stats.today_actions, 1);
}

#[test]
fn test_record_deleted_event() {
    let (env, client, admin) = setup();
    let clinic = setup_clinic(&env, &client, &admin, RoleTier::Edit);
    let patient = setup_patient(&env, &client, &admin);
    grant_consent(&client, &clinic, &patient);
    let record_id = create_record(&env, &client, &clinic, &patient);

    client.delete_record(&clinic.staff, &record_id);

    let expected: Vec<(Address, Vec<Val>, Val)> = vec![
        &env,
        (
            client.address.clone(),
            (
                symbol_short!("REC_DEL"),
                patient.clone(),
                clinic.hospital.clone(),
            )
                .into_val(&env),
            events::RecordDeletedEvent {
                record_id,
                patient: patient.clone(),
                hospital: clinic.hospital.clone(),
                staff: clinic.staff.clone(),
                timestamp: env.ledger().timestamp(),
            }
            .into_val(&env),
        ),
    ];
    assert_eq!(env.events().all(), expected);
}
