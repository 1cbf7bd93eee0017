//! Column-value preparation shared by both backend adapters.
//!
//! # Responsibility
//! - Apply blank-field defaults and defensive parsing in one place, so
//!   both backends write the same logical row for one record.
//!
//! # Invariants
//! - A skipped parent contributes no identifying data to any of its
//!   columns, whatever the form carried for it.
//! - Prepared values satisfy every NOT NULL column without further checks
//!   inside the adapters; the engine prefers a defaulted row over a lost
//!   registration.

use crate::model::record::{
    AcademicProfile, CivilStatus, EmergencyContact, EnrollmentType, FamilyBackground, ParentInfo,
    PersonalInfo, PreferredSession,
};
use chrono::NaiveDate;

pub const DEFAULT_NAME: &str = "Unknown";
pub const DEFAULT_PHONE: &str = "00000000000";
pub const DEFAULT_STRAND: &str = "Undecided";
pub const DEFAULT_BIRTH_DATE: &str = "2000-01-01";
pub const NOT_SPECIFIED: &str = "Not specified";

/// Final column values for one `students` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentRow {
    pub reference_code: String,
    pub first_name: String,
    pub middle_name: String,
    pub last_name: String,
    pub extension: String,
    pub lrn: String,
    pub enrollment_type: &'static str,
    pub strand: String,
    pub preferred_session: &'static str,
    pub birthday: String,
    pub civil_status: &'static str,
    pub religion: String,
    pub mobile_no: String,
    pub telephone_no: String,
    pub ethnicity: String,
    pub home_address: String,
}

/// Final column values for one parent block inside `family_background`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParentRow {
    pub name: String,
    pub age: Option<i64>,
    pub ethnicity: String,
    pub occupation: String,
    pub education: String,
    pub contact: String,
}

/// Final column values for one `family_background` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyRow {
    pub father: ParentRow,
    pub mother: ParentRow,
    pub guardian: ParentRow,
}

/// Final column values for one `academic_profile` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcademicRow {
    pub elementary_school: String,
    pub elementary_year: Option<i64>,
    pub elementary_honors: String,
    pub junior_high_school: String,
    pub junior_high_year: Option<i64>,
    pub junior_high_honors: String,
}

/// Final column values for one `emergency_contacts` row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmergencyRow {
    pub contact_name: String,
    pub relationship: String,
    pub address: String,
    pub contact_no: String,
}

/// Prepares the `students` row under the given reference code.
pub fn student_row(personal: &PersonalInfo, reference_code: &str) -> StudentRow {
    let lrn = or_default(&personal.lrn, reference_code);
    StudentRow {
        reference_code: reference_code.to_string(),
        first_name: or_default(&personal.first_name, DEFAULT_NAME),
        middle_name: personal.middle_name.clone(),
        last_name: or_default(&personal.last_name, DEFAULT_NAME),
        extension: personal.extension.clone(),
        lrn,
        enrollment_type: enrollment_type_to_db(personal.enrollment_type),
        strand: or_default(&personal.strand, DEFAULT_STRAND),
        preferred_session: session_to_db(personal.session),
        birthday: birthday_or_default(&personal.birth_date),
        civil_status: civil_status_to_db(personal.civil_status),
        religion: personal.religion.clone(),
        mobile_no: or_default(&personal.mobile, DEFAULT_PHONE),
        telephone_no: personal.telephone.clone(),
        ethnicity: personal.ethnicity.clone(),
        home_address: home_address(personal),
    }
}

/// Prepares the `family_background` row. The guardian is the only entry
/// whose contact number is persisted.
pub fn family_row(family: &FamilyBackground) -> FamilyRow {
    FamilyRow {
        father: parent_row(&family.father, false),
        mother: parent_row(&family.mother, false),
        guardian: parent_row(&family.guardian, true),
    }
}

/// Prepares the `academic_profile` row.
pub fn academic_row(academic: &AcademicProfile) -> AcademicRow {
    AcademicRow {
        elementary_school: academic.elementary_school.clone(),
        elementary_year: parse_year(&academic.elementary_year),
        elementary_honors: academic.elementary_honors.clone(),
        junior_high_school: academic.junior_high_school.clone(),
        junior_high_year: parse_year(&academic.junior_high_year),
        junior_high_honors: academic.junior_high_honors.clone(),
    }
}

/// Prepares the `emergency_contacts` row. Every column is required by the
/// schema, so blanks become documented placeholders.
pub fn emergency_row(emergency: &EmergencyContact) -> EmergencyRow {
    EmergencyRow {
        contact_name: or_default(&emergency.contact_name, NOT_SPECIFIED),
        relationship: or_default(&emergency.relationship, NOT_SPECIFIED),
        address: or_default(&emergency.address, NOT_SPECIFIED),
        contact_no: or_default(&emergency.contact_no, DEFAULT_PHONE),
    }
}

/// Timestamp the embedded store writes into `created_at`.
pub fn registration_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

fn parent_row(parent: &ParentInfo, keep_contact: bool) -> ParentRow {
    if parent.skipped {
        return ParentRow::default();
    }
    ParentRow {
        name: join_name(&parent.first_name, &parent.last_name),
        age: Some(parse_age(&parent.age)),
        ethnicity: parent.ethnicity.clone(),
        occupation: parent.occupation.clone(),
        education: parent.education.clone(),
        contact: if keep_contact {
            parent.contact.clone()
        } else {
            String::new()
        },
    }
}

fn home_address(personal: &PersonalInfo) -> String {
    format!(
        "{}, {}, {}, {}",
        personal.street_address, personal.barangay, personal.city, personal.province
    )
}

fn join_name(first: &str, last: &str) -> String {
    format!("{} {}", first.trim(), last.trim())
        .trim()
        .to_string()
}

fn or_default(value: &str, fallback: &str) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

fn parse_age(value: &str) -> i64 {
    value.trim().parse::<u32>().map(i64::from).unwrap_or(0)
}

fn parse_year(value: &str) -> Option<i64> {
    value.trim().parse::<u32>().ok().map(i64::from)
}

fn birthday_or_default(value: &str) -> String {
    match NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d") {
        Ok(date) => date.format("%Y-%m-%d").to_string(),
        Err(_) => DEFAULT_BIRTH_DATE.to_string(),
    }
}

fn enrollment_type_to_db(value: EnrollmentType) -> &'static str {
    match value {
        EnrollmentType::Freshmen => "Freshmen",
        EnrollmentType::Transferee => "Transferee",
    }
}

fn session_to_db(value: PreferredSession) -> &'static str {
    match value {
        PreferredSession::Morning => "Morning",
        PreferredSession::Afternoon => "Afternoon",
    }
}

fn civil_status_to_db(value: CivilStatus) -> &'static str {
    match value {
        CivilStatus::Single => "Single",
        CivilStatus::Married => "Married",
        CivilStatus::Other => "Other",
    }
}
