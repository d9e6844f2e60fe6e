#![no_std]

#[cfg(test)]
extern crate std;

pub mod audit;
pub mod errors;
pub mod events;
pub mod grants;
pub mod otp;
pub mod records;
pub mod registry;
pub mod requests;
pub mod roles;
pub mod validation;

use soroban_sdk::{contract, contractimpl, symbol_short, Address, Env, String, Symbol, Vec};

pub use audit::{AuditAction, AuditLogEntry, DashboardStats};
pub use errors::{
    create_error_context, log_error, ContractError, ErrorCategory, ErrorLogEntry, ErrorSeverity,
};
pub use grants::Grant;
pub use records::MedicalRecord;
pub use registry::{HealthcareStaff, Hospital, Patient};
pub use requests::PendingRequest;
pub use roles::RoleTier;

/// Storage keys for the contract
const ADMIN: Symbol = symbol_short!("ADMIN");
const INITIALIZED: Symbol = symbol_short!("INIT");

#[contract]
pub struct ConsentGrantsContract;

#[contractimpl]
impl ConsentGrantsContract {
    /// Resolves a caller address to an active staff row.
    ///
    /// The identity provider vouches for the signature; this protocol only
    /// trusts callers it can resolve to a registered, active row. Anyone
    /// else is unauthenticated, credentials notwithstanding.
    fn resolve_staff(env: &Env, staff: &Address) -> Result<HealthcareStaff, ContractError> {
        match registry::get_staff(env, staff) {
            Some(row) if row.is_active => Ok(row),
            _ => Err(ContractError::Unauthenticated),
        }
    }

    fn require_admin(env: &Env, caller: &Address) -> Result<(), ContractError> {
        let admin = Self::get_admin(env.clone())?;
        if *caller != admin {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    /// Initialize the contract with an admin address
    pub fn initialize(env: Env, admin: Address) -> Result<(), ContractError> {
        if env.storage().instance().has(&INITIALIZED) {
            return Err(ContractError::AlreadyInitialized);
        }

        env.storage().instance().set(&ADMIN, &admin);
        env.storage().instance().set(&INITIALIZED, &true);

        events::publish_initialized(&env, admin);

        Ok(())
    }

    /// Get the admin address
    pub fn get_admin(env: Env) -> Result<Address, ContractError> {
        env.storage()
            .instance()
            .get(&ADMIN)
            .ok_or(ContractError::NotInitialized)
    }

    /// Check if the contract is initialized
    pub fn is_initialized(env: Env) -> bool {
        env.storage().instance().has(&INITIALIZED)
    }

    // ======================== Registry ========================

    /// Register a hospital. Admin only.
    pub fn register_hospital(
        env: Env,
        caller: Address,
        hospital: Address,
        name: String,
    ) -> Result<(), ContractError> {
        caller.require_auth();
        Self::require_admin(&env, &caller)?;
        validation::validate_name(&name)?;

        if registry::has_hospital(&env, &hospital) {
            return Err(ContractError::DuplicateRegistration);
        }

        registry::set_hospital(
            &env,
            &Hospital {
                address: hospital.clone(),
                name: name.clone(),
                registered_at: env.ledger().timestamp(),
            },
        );

        events::publish_hospital_registered(&env, hospital, name);
        Ok(())
    }

    /// Register a healthcare staff member under a hospital. Admin only.
    pub fn register_staff(
        env: Env,
        caller: Address,
        staff: Address,
        hospital: Address,
        role: RoleTier,
        name: String,
    ) -> Result<(), ContractError> {
        caller.require_auth();
        Self::require_admin(&env, &caller)?;
        validation::validate_name(&name)?;

        if !registry::has_hospital(&env, &hospital) {
            return Err(ContractError::HospitalNotFound);
        }
        if registry::get_staff(&env, &staff).is_some() {
            return Err(ContractError::DuplicateRegistration);
        }

        registry::set_staff(
            &env,
            &HealthcareStaff {
                address: staff.clone(),
                hospital: hospital.clone(),
                role,
                name: name.clone(),
                registered_at: env.ledger().timestamp(),
                is_active: true,
            },
        );

        events::publish_staff_registered(&env, staff, hospital, role, name);
        Ok(())
    }

    /// Activate or deactivate a staff member. Admin only.
    /// Deactivated staff no longer resolve and cannot act.
    pub fn set_staff_status(
        env: Env,
        caller: Address,
        staff: Address,
        is_active: bool,
    ) -> Result<(), ContractError> {
        caller.require_auth();
        Self::require_admin(&env, &caller)?;

        let mut row = registry::get_staff(&env, &staff).ok_or(ContractError::StaffNotFound)?;
        row.is_active = is_active;
        registry::set_staff(&env, &row);
        Ok(())
    }

    /// Register a patient. Admin or any active staff member.
    pub fn register_patient(
        env: Env,
        caller: Address,
        patient: Address,
        first_name: String,
        last_name: String,
        email: String,
        contact: String,
    ) -> Result<(), ContractError> {
        caller.require_auth();

        let admin = Self::get_admin(env.clone())?;
        if caller != admin {
            Self::resolve_staff(&env, &caller)?;
        }

        validation::validate_name(&first_name)?;
        validation::validate_name(&last_name)?;
        validation::validate_name(&email)?;
        validation::validate_name(&contact)?;

        if registry::has_patient(&env, &patient) {
            return Err(ContractError::DuplicateRegistration);
        }

        registry::set_patient(
            &env,
            &Patient {
                address: patient.clone(),
                first_name,
                last_name,
                email,
                contact,
                registered_at: env.ledger().timestamp(),
            },
        );

        events::publish_patient_registered(&env, patient);
        Ok(())
    }

    pub fn get_patient(env: Env, patient: Address) -> Result<Patient, ContractError> {
        registry::get_patient(&env, &patient).ok_or(ContractError::PatientNotFound)
    }

    pub fn get_staff(env: Env, staff: Address) -> Result<HealthcareStaff, ContractError> {
        registry::get_staff(&env, &staff).ok_or(ContractError::StaffNotFound)
    }

    pub fn get_hospital(env: Env, hospital: Address) -> Result<Hospital, ContractError> {
        registry::get_hospital(&env, &hospital).ok_or(ContractError::HospitalNotFound)
    }

    /// Search patients across name, email and contact fields.
    /// Active staff only; results are capped at 100 rows.
    pub fn search_patients(
        env: Env,
        caller: Address,
        query: String,
    ) -> Result<Vec<Patient>, ContractError> {
        caller.require_auth();
        Self::resolve_staff(&env, &caller)?;
        validation::validate_query(&query)?;

        Ok(registry::search_patients(&env, &query))
    }

    // ======================== Access requests ========================

    /// Request access to a patient's data on behalf of the caller's hospital.
    ///
    /// Issues a one-time code for the patient to confirm out of band. At most
    /// one pending request may exist per (hospital, patient); a second
    /// request fails with `DuplicateRequest` until the first is redeemed.
    pub fn request_access(
        env: Env,
        staff: Address,
        patient: Address,
    ) -> Result<PendingRequest, ContractError> {
        staff.require_auth();
        let staff_row = Self::resolve_staff(&env, &staff)?;

        if !registry::has_patient(&env, &patient) {
            return Err(ContractError::PatientNotFound);
        }

        if requests::has_pending(&env, &staff_row.hospital, &patient) {
            let context = create_error_context(
                &env,
                ContractError::DuplicateRequest,
                Some(staff.clone()),
                None,
            );
            log_error(&env, ContractError::DuplicateRequest, Some(staff), None);
            events::publish_error(&env, ContractError::DuplicateRequest as u32, context);
            return Err(ContractError::DuplicateRequest);
        }

        let code = requests::issue_code(&env, otp::DEFAULT_CODE_LENGTH)?;
        let request = PendingRequest {
            id: requests::next_request_id(&env),
            patient: patient.clone(),
            hospital: staff_row.hospital.clone(),
            staff: staff.clone(),
            code,
            created_at: env.ledger().timestamp(),
        };

        requests::insert_pending(&env, &request);
        audit::append(
            &env,
            &patient,
            &staff_row.hospital,
            &staff,
            AuditAction::RequestedData,
        );
        events::publish_access_requested(&env, request.id, patient, staff_row.hospital, staff);

        Ok(request)
    }

    /// Look up one pending request. Only the patient it concerns, staff of
    /// the requesting hospital, or the admin may see it (it carries the code).
    pub fn get_pending_request(
        env: Env,
        caller: Address,
        hospital: Address,
        patient: Address,
    ) -> Result<PendingRequest, ContractError> {
        caller.require_auth();

        let admin = Self::get_admin(env.clone())?;
        let allowed = caller == patient
            || caller == admin
            || matches!(
                registry::get_staff(&env, &caller),
                Some(row) if row.is_active && row.hospital == hospital
            );
        if !allowed {
            return Err(ContractError::Unauthorized);
        }

        requests::get_pending(&env, &hospital, &patient).ok_or(ContractError::RequestNotFound)
    }

    /// A patient's inbox of pending requests awaiting their confirmation.
    pub fn get_patient_requests(
        env: Env,
        patient: Address,
    ) -> Result<Vec<PendingRequest>, ContractError> {
        patient.require_auth();
        if !registry::has_patient(&env, &patient) {
            return Err(ContractError::Unauthenticated);
        }
        Ok(requests::pending_for_patient(&env, &patient))
    }

    /// Redeem a one-time code, converting its pending request into a grant.
    ///
    /// Grant insertion, request deletion and the audit append happen in this
    /// one invocation, so partial completion is never observable. A consumed
    /// or unknown code is `CodeNotFound`; retrying a successful redemption
    /// therefore reports `CodeNotFound` rather than a second grant.
    pub fn verify_otp(env: Env, caller: Address, code: String) -> Result<u64, ContractError> {
        caller.require_auth();

        if !registry::has_patient(&env, &caller) {
            return Err(ContractError::Unauthenticated);
        }
        if code.is_empty() {
            return Err(ContractError::InvalidInput);
        }
        // A code the issuer could never have generated matches nothing by
        // definition; skip the lookup but report the same result.
        if !otp::is_well_formed(&code) {
            return Err(ContractError::CodeNotFound);
        }

        let request = match requests::find_by_code(&env, &code)? {
            Some(request) => request,
            None => {
                let context = create_error_context(
                    &env,
                    ContractError::CodeNotFound,
                    Some(caller.clone()),
                    None,
                );
                log_error(&env, ContractError::CodeNotFound, Some(caller), None);
                events::publish_error(&env, ContractError::CodeNotFound as u32, context);
                return Err(ContractError::CodeNotFound);
            }
        };

        // A matching code held by a different patient is indistinguishable
        // from an unknown one; nothing about other patients' requests leaks.
        if request.patient != caller {
            return Err(ContractError::CodeNotFound);
        }

        let grant = Grant {
            id: grants::next_grant_id(&env),
            patient: request.patient.clone(),
            hospital: request.hospital.clone(),
            staff: request.staff.clone(),
            emergency: false,
            created_at: env.ledger().timestamp(),
        };

        grants::insert_grant(&env, &grant);
        requests::remove_pending(&env, &request);
        audit::append(
            &env,
            &request.patient,
            &request.hospital,
            &request.staff,
            AuditAction::AcceptedRequest,
        );
        events::publish_consent_verified(
            &env,
            grant.id,
            request.patient,
            request.hospital,
            request.staff,
        );

        Ok(grant.id)
    }

    /// Privileged bypass: create a grant without patient confirmation.
    ///
    /// Gated on the `EmergencyOverride` tier and a written justification of
    /// at least 20 characters. Never consults or creates a pending request.
    /// The resulting grant and audit entry are flagged for review.
    pub fn emergency_override(
        env: Env,
        staff: Address,
        patient: Address,
        reason: String,
    ) -> Result<u64, ContractError> {
        staff.require_auth();
        let staff_row = Self::resolve_staff(&env, &staff)?;

        if !staff_row.role.can_emergency_override() {
            let context =
                create_error_context(&env, ContractError::Unauthorized, Some(staff.clone()), None);
            log_error(&env, ContractError::Unauthorized, Some(staff), None);
            events::publish_error(&env, ContractError::Unauthorized as u32, context);
            return Err(ContractError::Unauthorized);
        }

        validation::validate_reason(&reason)?;

        if !registry::has_patient(&env, &patient) {
            return Err(ContractError::PatientNotFound);
        }

        let grant = Grant {
            id: grants::next_grant_id(&env),
            patient: patient.clone(),
            hospital: staff_row.hospital.clone(),
            staff: staff.clone(),
            emergency: true,
            created_at: env.ledger().timestamp(),
        };

        grants::insert_grant(&env, &grant);
        let audit_id = audit::append(
            &env,
            &patient,
            &staff_row.hospital,
            &staff,
            AuditAction::EmergencyOverride(reason),
        );
        events::publish_emergency_override(
            &env,
            grant.id,
            audit_id,
            patient,
            staff_row.hospital,
            staff,
        );

        Ok(grant.id)
    }

    // ======================== Access queries ========================

    /// Whether the hospital currently holds a grant for the patient.
    pub fn has_access(env: Env, hospital: Address, patient: Address) -> bool {
        grants::has_access(&env, &hospital, &patient)
    }

    pub fn get_grant(env: Env, grant_id: u64) -> Result<Grant, ContractError> {
        grants::get_grant(&env, grant_id).ok_or(ContractError::RecordNotFound)
    }

    /// All grants a hospital holds for a patient, oldest first.
    pub fn get_access_grants(env: Env, hospital: Address, patient: Address) -> Vec<Grant> {
        grants::grants_for(&env, &hospital, &patient)
    }

    // ======================== Medical records ========================

    /// Create a medical record for a patient the caller's hospital holds a
    /// grant for. Requires the `Edit` tier.
    pub fn create_record(
        env: Env,
        staff: Address,
        patient: Address,
        diagnosis: String,
        treatment: String,
        notes: String,
    ) -> Result<u64, ContractError> {
        staff.require_auth();
        let staff_row = Self::resolve_staff(&env, &staff)?;

        if !staff_row.role.can_edit_records() {
            return Err(ContractError::Unauthorized);
        }
        if !registry::has_patient(&env, &patient) {
            return Err(ContractError::PatientNotFound);
        }
        if !grants::has_access(&env, &staff_row.hospital, &patient) {
            return Err(ContractError::AccessDenied);
        }

        validation::validate_clinical_text(&diagnosis, false)?;
        validation::validate_clinical_text(&treatment, false)?;
        validation::validate_clinical_text(&notes, true)?;

        let now = env.ledger().timestamp();
        let record = MedicalRecord {
            id: records::next_record_id(&env),
            patient: patient.clone(),
            hospital: staff_row.hospital.clone(),
            staff: staff.clone(),
            diagnosis,
            treatment,
            notes,
            created_at: now,
            updated_at: now,
        };

        records::insert_record(&env, &record);
        audit::append(
            &env,
            &patient,
            &staff_row.hospital,
            &staff,
            AuditAction::CreatedRecord,
        );
        events::publish_record_created(&env, record.id, patient, staff_row.hospital, staff);

        Ok(record.id)
    }

    /// Read a medical record. The patient may always read their own; staff
    /// need a grant held by their hospital for the record's patient.
    pub fn get_record(
        env: Env,
        caller: Address,
        record_id: u64,
    ) -> Result<MedicalRecord, ContractError> {
        caller.require_auth();

        let record = match records::get_record(&env, record_id) {
            Some(record) => record,
            None => {
                let resource_id = String::from_str(&env, "get_record");
                let context = create_error_context(
                    &env,
                    ContractError::RecordNotFound,
                    Some(caller.clone()),
                    Some(resource_id.clone()),
                );
                log_error(
                    &env,
                    ContractError::RecordNotFound,
                    Some(caller),
                    Some(resource_id),
                );
                events::publish_error(&env, ContractError::RecordNotFound as u32, context);
                return Err(ContractError::RecordNotFound);
            }
        };

        if caller == record.patient {
            return Ok(record);
        }

        let staff_row = Self::resolve_staff(&env, &caller)?;
        if !grants::has_access(&env, &staff_row.hospital, &record.patient) {
            return Err(ContractError::AccessDenied);
        }

        Ok(record)
    }

    /// Record ids for a patient, oldest first. Patient-or-granted-staff gated.
    pub fn get_patient_records(
        env: Env,
        caller: Address,
        patient: Address,
    ) -> Result<Vec<u64>, ContractError> {
        caller.require_auth();

        if caller != patient {
            let staff_row = Self::resolve_staff(&env, &caller)?;
            if !grants::has_access(&env, &staff_row.hospital, &patient) {
                return Err(ContractError::AccessDenied);
            }
        } else if !registry::has_patient(&env, &patient) {
            return Err(ContractError::Unauthenticated);
        }

        Ok(records::records_for_patient(&env, &patient))
    }

    /// Update a medical record. Mutation requires the `Edit` tier, a current
    /// grant, and provenance: the caller's hospital must be the hospital the
    /// record originated from.
    pub fn update_record(
        env: Env,
        staff: Address,
        record_id: u64,
        diagnosis: String,
        treatment: String,
        notes: String,
    ) -> Result<(), ContractError> {
        staff.require_auth();
        let staff_row = Self::resolve_staff(&env, &staff)?;
        let mut record =
            records::get_record(&env, record_id).ok_or(ContractError::RecordNotFound)?;

        if !staff_row.role.can_edit_records() || staff_row.hospital != record.hospital {
            return Err(ContractError::Unauthorized);
        }
        if !grants::has_access(&env, &staff_row.hospital, &record.patient) {
            return Err(ContractError::AccessDenied);
        }

        validation::validate_clinical_text(&diagnosis, false)?;
        validation::validate_clinical_text(&treatment, false)?;
        validation::validate_clinical_text(&notes, true)?;

        record.diagnosis = diagnosis;
        record.treatment = treatment;
        record.notes = notes;
        record.updated_at = env.ledger().timestamp();
        records::set_record(&env, &record);

        audit::append(
            &env,
            &record.patient,
            &staff_row.hospital,
            &staff,
            AuditAction::UpdatedRecord,
        );
        events::publish_record_updated(&env, record_id, record.patient, staff_row.hospital, staff);

        Ok(())
    }

    /// Delete a medical record, under the same gates as updates.
    pub fn delete_record(env: Env, staff: Address, record_id: u64) -> Result<(), ContractError> {
        staff.require_auth();
        let staff_row = Self::resolve_staff(&env, &staff)?;
        let record = records::get_record(&env, record_id).ok_or(ContractError::RecordNotFound)?;

        if !staff_row.role.can_edit_records() || staff_row.hospital != record.hospital {
            return Err(ContractError::Unauthorized);
        }
        if !grants::has_access(&env, &staff_row.hospital, &record.patient) {
            return Err(ContractError::AccessDenied);
        }

        records::remove_record(&env, &record);
        audit::append(
            &env,
            &record.patient,
            &staff_row.hospital,
            &staff,
            AuditAction::DeletedRecord,
        );
        events::publish_record_deleted(&env, record_id, record.patient, staff_row.hospital, staff);

        Ok(())
    }

    // ======================== Audit queries ========================

    /// Audit entries for a hospital, newest first. Gated to the hospital's
    /// own staff or the admin.
    pub fn get_audit_logs(
        env: Env,
        caller: Address,
        hospital: Address,
        limit: u32,
    ) -> Result<Vec<AuditLogEntry>, ContractError> {
        caller.require_auth();
        Self::require_hospital_scope(&env, &caller, &hospital)?;

        Ok(audit::entries_for_hospital(&env, &hospital, limit))
    }

    /// A patient's view of every action taken against their data.
    pub fn get_patient_audit_logs(
        env: Env,
        patient: Address,
        limit: u32,
    ) -> Result<Vec<AuditLogEntry>, ContractError> {
        patient.require_auth();
        if !registry::has_patient(&env, &patient) {
            return Err(ContractError::Unauthenticated);
        }
        Ok(audit::entries_for_patient(&env, &patient, limit))
    }

    /// Dashboard counters for a hospital, derived from its audit entries.
    pub fn get_dashboard_stats(
        env: Env,
        caller: Address,
        hospital: Address,
    ) -> Result<DashboardStats, ContractError> {
        caller.require_auth();
        Self::require_hospital_scope(&env, &caller, &hospital)?;

        Ok(audit::stats_for_hospital(&env, &hospital))
    }

    /// Every emergency override on file, oldest first. Admin only: this is
    /// the review surface that keeps the bypass path accountable.
    pub fn get_flagged_overrides(
        env: Env,
        caller: Address,
    ) -> Result<Vec<AuditLogEntry>, ContractError> {
        caller.require_auth();
        Self::require_admin(&env, &caller)?;

        Ok(audit::flagged_overrides(&env))
    }

    fn require_hospital_scope(
        env: &Env,
        caller: &Address,
        hospital: &Address,
    ) -> Result<(), ContractError> {
        let admin = Self::get_admin(env.clone())?;
        if *caller == admin {
            return Ok(());
        }
        let staff_row = Self::resolve_staff(env, caller)?;
        if staff_row.hospital != *hospital {
            return Err(ContractError::Unauthorized);
        }
        Ok(())
    }

    // ======================== Error observability ========================

    /// Recent contract errors, capped at the most recent 100.
    pub fn get_error_log(env: Env) -> Vec<ErrorLogEntry> {
        errors::get_error_log(&env)
    }

    /// Total number of errors logged since deployment.
    pub fn get_error_count(env: Env) -> u64 {
        errors::get_error_count(&env)
    }

    /// Contract version
    pub fn version() -> u32 {
        1
    }
}



#[cfg(test)]
mod test_records;
