use soroban_sdk::contracttype;

/// Staff capability tier.
///
/// Tiers are strictly ordered: each tier carries everything below it.
/// Call sites consult the capability methods instead of comparing numbers.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq, Copy)]
#[repr(u32)]
pub enum RoleTier {
    /// May view records the hospital holds a grant for.
    ReadOnly = 1,
    /// May additionally create, update and delete records.
    Edit = 2,
    /// May additionally invoke the emergency bypass path.
    EmergencyOverride = 3,
}

impl RoleTier {
    /// All tiers may read records their hospital holds a grant for.
    pub fn can_view_records(&self) -> bool {
        true
    }

    pub fn can_edit_records(&self) -> bool {
        matches!(self, RoleTier::Edit | RoleTier::EmergencyOverride)
    }

    pub fn can_emergency_override(&self) -> bool {
        matches!(self, RoleTier::EmergencyOverride)
    }
}
