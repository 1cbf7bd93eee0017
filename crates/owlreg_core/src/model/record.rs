//! Registration record and its four sections.
//!
//! # Responsibility
//! - Carry everything the intake workflow collected for one applicant.
//! - Give the wire boundary a stable JSON shape with the four named
//!   sections.
//!
//! # Invariants
//! - `reference_code` is optional on input; the engine assigns one during
//!   the first successful save and reports it back to the caller.
//! - A `skipped` parent section carries no data the engine will persist.

use serde::{Deserialize, Serialize};

/// Enrollment path for the applicant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentType {
    #[default]
    Freshmen,
    Transferee,
}

/// Class session the applicant prefers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferredSession {
    #[default]
    Morning,
    Afternoon,
}

/// Civil status as the backend schema enumerates it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CivilStatus {
    #[default]
    Single,
    Married,
    Other,
}

/// Personal section of the intake form.
///
/// Free-text fields arrive as the intake UI collected them; the storage
/// boundary substitutes documented defaults for blanks rather than
/// rejecting the record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonalInfo {
    /// Cross-backend correlation key. `None` until the engine assigns one.
    pub reference_code: Option<String>,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    /// Name suffix such as "Jr." or "III".
    pub extension: String,
    /// Learner reference number. Blank falls back to the reference code.
    pub lrn: String,
    pub enrollment_type: EnrollmentType,
    pub strand: String,
    pub session: PreferredSession,
    /// `YYYY-MM-DD`; unparseable input is coerced to a sentinel date.
    pub birth_date: String,
    pub civil_status: CivilStatus,
    pub religion: String,
    pub mobile: String,
    pub telephone: String,
    pub ethnicity: String,
    pub street_address: String,
    pub barangay: String,
    pub city: String,
    pub province: String,
}

/// One parent or guardian entry.
///
/// `skipped` marks the whole entry as not applicable; whatever else the
/// form carried for a skipped entry must not reach storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParentInfo {
    pub skipped: bool,
    pub first_name: String,
    pub last_name: String,
    /// Free text from the form; parsed defensively into a number.
    pub age: String,
    pub ethnicity: String,
    pub occupation: String,
    pub education: String,
    /// Persisted for the guardian entry only.
    pub contact: String,
}

impl Default for ParentInfo {
    fn default() -> Self {
        Self {
            // An absent section means "not applicable", not an empty parent.
            skipped: true,
            first_name: String::new(),
            last_name: String::new(),
            age: String::new(),
            ethnicity: String::new(),
            occupation: String::new(),
            education: String::new(),
            contact: String::new(),
        }
    }
}

/// Family section: father, mother and guardian entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FamilyBackground {
    pub father: ParentInfo,
    pub mother: ParentInfo,
    pub guardian: ParentInfo,
}

/// Academic history section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcademicProfile {
    pub elementary_school: String,
    /// Graduation year as free text; non-numeric input becomes NULL.
    pub elementary_year: String,
    pub elementary_honors: String,
    pub junior_high_school: String,
    pub junior_high_year: String,
    pub junior_high_honors: String,
}

/// Emergency contact section. Every column is required by the backend
/// schema, so blanks receive engine-supplied defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmergencyContact {
    pub contact_name: String,
    pub relationship: String,
    pub address: String,
    pub contact_no: String,
}

/// The full logical intake payload for one applicant.
///
/// Built once by the intake workflow, passed once to the coordinator's
/// save, and not reused afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrationRecord {
    pub personal: PersonalInfo,
    pub family: FamilyBackground,
    pub academic: AcademicProfile,
    pub emergency: EmergencyContact,
}
