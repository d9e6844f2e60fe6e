#![allow(clippy::arithmetic_side_effects)]
use soroban_sdk::{contracttype, symbol_short, Address, Env, String, Symbol, Vec};

pub const ERROR_LOG_KEY: Symbol = symbol_short!("ERR_LOG");
pub const ERROR_COUNT_KEY: Symbol = symbol_short!("ERR_CNT");
pub const MAX_ERROR_LOG_SIZE: u32 = 100;

const TTL_THRESHOLD: u32 = 5184000;
const TTL_EXTEND_TO: u32 = 10368000;

fn extend_ttl_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(TTL_THRESHOLD, TTL_EXTEND_TO);
}

/// Error categories for classifying different types of errors
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ErrorCategory {
    /// Validation errors: missing or malformed input
    Validation = 1,
    /// Authentication and authorization failures
    Authorization = 2,
    /// Not found errors: resource lookup failures
    NotFound = 3,
    /// State conflict errors: duplicate pending requests
    StateConflict = 4,
    /// Storage errors: transient storage operation failures
    Storage = 5,
    /// Integrity errors: a protocol invariant was violated
    Integrity = 6,
}

/// Error severity levels indicating the impact and urgency of errors
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ErrorSeverity {
    /// Low severity: non-critical errors, informational
    Low = 1,
    /// Medium severity: important but recoverable errors
    Medium = 2,
    /// High severity: significant errors requiring attention
    High = 3,
    /// Critical severity: compliance-affecting failures requiring immediate action
    Critical = 4,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct ErrorContext {
    pub category: ErrorCategory,
    pub severity: ErrorSeverity,
    pub message: String,
    pub subject: Option<Address>,
    pub resource_id: Option<String>,
    pub timestamp: u64,
    pub retryable: bool,
}

#[contracttype]
#[derive(Clone, Debug)]
pub struct ErrorLogEntry {
    pub error_code: u32,
    pub context: ErrorContext,
}

/// Contract errors.
///
/// # Code ranges
/// | Range   | Purpose                        |
/// |---------|--------------------------------|
/// | 1 – 9   | Lifecycle / initialisation     |
/// | 10 – 19 | Authentication & authorisation |
/// | 20 – 29 | Resource not found             |
/// | 30 – 39 | Validation / input             |
/// | 40 – 49 | State conflict                 |
/// | 50 – 59 | Storage & integrity            |
#[soroban_sdk::contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum ContractError {
    NotInitialized = 1,
    AlreadyInitialized = 2,
    /// Caller did not resolve to a registered, active identity row.
    Unauthenticated = 10,
    /// Role tier insufficient, or hospital provenance mismatch on mutation.
    Unauthorized = 11,
    /// No grant exists for the (hospital, patient) pair.
    AccessDenied = 12,
    PatientNotFound = 20,
    StaffNotFound = 21,
    HospitalNotFound = 22,
    RecordNotFound = 23,
    /// Submitted code matches no outstanding pending request.
    CodeNotFound = 24,
    RequestNotFound = 25,
    InvalidInput = 30,
    /// A pending request already exists for the (hospital, patient) pair.
    DuplicateRequest = 40,
    DuplicateRegistration = 41,
    /// Code issuance found no unused code after bounded redraws.
    CodeExhausted = 42,
    StorageError = 50,
    /// An invariant the protocol depends on was violated, e.g. a code index
    /// pointing at a pending request that no longer exists.
    IntegrityError = 51,
}

impl ContractError {
    /// Returns the error category for this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            ContractError::NotInitialized
            | ContractError::AlreadyInitialized
            | ContractError::InvalidInput => ErrorCategory::Validation,
            ContractError::Unauthenticated
            | ContractError::Unauthorized
            | ContractError::AccessDenied => ErrorCategory::Authorization,
            ContractError::PatientNotFound
            | ContractError::StaffNotFound
            | ContractError::HospitalNotFound
            | ContractError::RecordNotFound
            | ContractError::CodeNotFound
            | ContractError::RequestNotFound => ErrorCategory::NotFound,
            ContractError::DuplicateRequest
            | ContractError::DuplicateRegistration
            | ContractError::CodeExhausted => ErrorCategory::StateConflict,
            ContractError::StorageError => ErrorCategory::Storage,
            ContractError::IntegrityError => ErrorCategory::Integrity,
        }
    }

    /// Returns the severity level for this error.
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ContractError::NotInitialized
            | ContractError::AlreadyInitialized
            | ContractError::InvalidInput
            | ContractError::PatientNotFound
            | ContractError::StaffNotFound
            | ContractError::HospitalNotFound
            | ContractError::RecordNotFound
            | ContractError::CodeNotFound
            | ContractError::RequestNotFound => ErrorSeverity::Low,
            ContractError::Unauthenticated
            | ContractError::Unauthorized
            | ContractError::AccessDenied
            | ContractError::DuplicateRequest
            | ContractError::DuplicateRegistration
            | ContractError::CodeExhausted => ErrorSeverity::Medium,
            ContractError::StorageError => ErrorSeverity::High,
            ContractError::IntegrityError => ErrorSeverity::Critical,
        }
    }

    /// Returns whether this error is retryable by the caller.
    ///
    /// Only transient storage failures qualify. Validation, authorization,
    /// conflict and not-found errors must never be retried: a consumed code
    /// stays consumed and a duplicate request stays a duplicate.
    pub fn retryable(&self) -> bool {
        matches!(self, ContractError::StorageError)
    }

    /// Returns a human-readable error message for this error.
    pub fn message(&self) -> &'static str {
        match self {
            ContractError::NotInitialized => "Contract has not been initialized",
            ContractError::AlreadyInitialized => "Contract is already initialized",
            ContractError::Unauthenticated => "Caller does not resolve to a registered identity",
            ContractError::Unauthorized => "Caller is not authorized for this operation",
            ContractError::AccessDenied => "No access grant exists for this patient",
            ContractError::PatientNotFound => "Patient not found in the registry",
            ContractError::StaffNotFound => "Healthcare staff not found in the registry",
            ContractError::HospitalNotFound => "Hospital not found in the registry",
            ContractError::RecordNotFound => "Medical record not found",
            ContractError::CodeNotFound => "Code matches no outstanding access request",
            ContractError::RequestNotFound => "Pending access request not found",
            ContractError::InvalidInput => "Invalid input parameters provided",
            ContractError::DuplicateRequest => {
                "A pending request for this patient already exists from this hospital"
            }
            ContractError::DuplicateRegistration => "Identity is already registered",
            ContractError::CodeExhausted => "No unused confirmation code available",
            ContractError::StorageError => "Storage operation failed",
            ContractError::IntegrityError => "Protocol invariant violated",
        }
    }
}

/// Logs an error to the contract's error log.
/// The error log is limited to the most recent 100 entries.
pub fn log_error(
    env: &Env,
    error: ContractError,
    subject: Option<Address>,
    resource_id: Option<String>,
) {
    let log_entry = ErrorLogEntry {
        error_code: error as u32,
        context: create_error_context(env, error, subject, resource_id),
    };

    let mut error_log: Vec<ErrorLogEntry> = env
        .storage()
        .instance()
        .get(&ERROR_LOG_KEY)
        .unwrap_or(Vec::new(env));

    error_log.push_back(log_entry);

    if error_log.len() > MAX_ERROR_LOG_SIZE {
        let mut new_log = Vec::new(env);
        for i in 1..error_log.len() {
            if let Some(entry) = error_log.get(i) {
                new_log.push_back(entry);
            }
        }
        error_log = new_log;
    }

    env.storage().instance().set(&ERROR_LOG_KEY, &error_log);

    let error_count: u64 = env.storage().instance().get(&ERROR_COUNT_KEY).unwrap_or(0);
    env.storage()
        .instance()
        .set(&ERROR_COUNT_KEY, &(error_count + 1));

    extend_ttl_instance(env);
}

/// Retrieves the error log, newest entry last.
/// Returns an empty vector if no errors have been logged.
pub fn get_error_log(env: &Env) -> Vec<ErrorLogEntry> {
    env.storage()
        .instance()
        .get(&ERROR_LOG_KEY)
        .unwrap_or(Vec::new(env))
}

/// Returns the total count of errors that have been logged.
/// This count persists even when older entries rotate out of the log.
pub fn get_error_count(env: &Env) -> u64 {
    env.storage().instance().get(&ERROR_COUNT_KEY).unwrap_or(0)
}

/// Creates an ErrorContext from an error and optional subject/resource information.
pub fn create_error_context(
    env: &Env,
    error: ContractError,
    subject: Option<Address>,
    resource_id: Option<String>,
) -> ErrorContext {
    ErrorContext {
        category: error.category(),
        severity: error.severity(),
        message: String::from_str(env, error.message()),
        subject,
        resource_id,
        timestamp: env.ledger().timestamp(),
        retryable: error.retryable(),
    }
}
