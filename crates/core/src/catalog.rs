//! The entity catalog: one [`EntitySchema`] per form/table pair.
//!
//! Field names here are the backend's JSON keys. Schemas that share a
//! layout (the four grade-level forms, the four college forms) share one
//! field list and differ only in cache key, endpoint and title.

use crate::error::CoreError;
use crate::schema::{EntitySchema, FieldSchema, COLLEGE_IDENTITY, GRADE_IDENTITY};

// ---------------------------------------------------------------------------
// Option lists
// ---------------------------------------------------------------------------

pub const CONCERN_OPTIONS: &[&str] = &[
    "Academic",
    "Personal / Social",
    "Career",
    "Family",
    "Behavioral",
];

pub const REFERRAL_OPTIONS: &[&str] = &["Self", "Teacher", "Parent", "Peer", "Administrator"];

pub const CASE_STATUS_OPTIONS: &[&str] = &["Open", "Follow-up", "Closed"];

pub const TEST_OPTIONS: &[&str] = &[
    "IQ Test",
    "Personality Inventory",
    "Aptitude Test",
    "Interest Inventory",
];

pub const RATING_OPTIONS: &[&str] = &[
    "Very Satisfied",
    "Satisfied",
    "Neutral",
    "Dissatisfied",
    "Very Dissatisfied",
];

pub const TRACK_OPTIONS: &[&str] = &[
    "STEM",
    "ABM",
    "HUMSS",
    "GAS",
    "TVL",
    "Sports",
    "Arts and Design",
];

pub const PURPOSE_OPTIONS: &[&str] = &[
    "Counseling",
    "Consultation",
    "Follow-up",
    "Career Guidance",
];

pub const APPOINTMENT_STATUS_OPTIONS: &[&str] = &["Pending", "Approved", "Completed", "Cancelled"];

// ---------------------------------------------------------------------------
// Field lists
// ---------------------------------------------------------------------------

const GRADE_LEVEL_FIELDS: &[FieldSchema] = &[
    FieldSchema::text("sr_code", "SR Code"),
    FieldSchema::derived("name", "Name"),
    FieldSchema::derived("grade", "Grade"),
    FieldSchema::derived("section", "Section"),
    FieldSchema::date("date", "Date"),
    FieldSchema::choice("nature_of_concern", "Nature of Concern", CONCERN_OPTIONS),
    FieldSchema::text("concern_details", "Details"),
    FieldSchema::choice("referred_by", "Referred By", REFERRAL_OPTIONS),
    FieldSchema::text("intervention", "Intervention"),
    FieldSchema::choice("status", "Status", CASE_STATUS_OPTIONS).with_default("Open"),
    FieldSchema::text("remarks", "Remarks"),
];

const COLLEGE_FIELDS: &[FieldSchema] = &[
    FieldSchema::text("sr_code", "SR Code"),
    FieldSchema::derived("name", "Name"),
    FieldSchema::derived("year", "Year Level"),
    FieldSchema::derived("course", "Course"),
    FieldSchema::date("date", "Date"),
    FieldSchema::choice("nature_of_concern", "Nature of Concern", CONCERN_OPTIONS),
    FieldSchema::text("concern_details", "Details"),
    FieldSchema::choice("referred_by", "Referred By", REFERRAL_OPTIONS),
    FieldSchema::text("intervention", "Intervention"),
    FieldSchema::choice("status", "Status", CASE_STATUS_OPTIONS).with_default("Open"),
    FieldSchema::text("remarks", "Remarks"),
];

const PSYCH_ASSESSMENT_FIELDS: &[FieldSchema] = &[
    FieldSchema::text("sr_code", "SR Code"),
    FieldSchema::derived("name", "Name"),
    FieldSchema::derived("grade", "Grade"),
    FieldSchema::derived("section", "Section"),
    FieldSchema::date("date_administered", "Date Administered"),
    FieldSchema::choice("test_name", "Test", TEST_OPTIONS).on_page(2),
    FieldSchema::numeric("raw_score", "Raw Score").on_page(2),
    FieldSchema::numeric("percentile", "Percentile").on_page(2),
    FieldSchema::text("interpretation", "Interpretation").on_page(2),
    FieldSchema::text("administered_by", "Administered By").on_page(2),
];

const EVALUATION_FIELDS: &[FieldSchema] = &[
    FieldSchema::text("sr_code", "SR Code"),
    FieldSchema::derived("name", "Name"),
    FieldSchema::derived("grade", "Grade"),
    FieldSchema::derived("section", "Section"),
    FieldSchema::date("session_date", "Session Date"),
    FieldSchema::text("counselor", "Counselor"),
    FieldSchema::choice("rating", "Rating", RATING_OPTIONS),
    FieldSchema::text("comments", "Comments"),
];

const CAREER_TRACKING_FIELDS: &[FieldSchema] = &[
    FieldSchema::text("sr_code", "SR Code"),
    FieldSchema::derived("name", "Name"),
    FieldSchema::derived("grade", "Grade"),
    FieldSchema::derived("section", "Section"),
    FieldSchema::text("school_year", "School Year"),
    FieldSchema::choice("preferred_track", "Preferred Track", TRACK_OPTIONS).on_page(2),
    FieldSchema::text("preferred_course", "Preferred Course").on_page(2),
    FieldSchema::text("career_goal", "Career Goal").on_page(2),
    FieldSchema::text("assessment_result", "Assessment Result").on_page(3),
    FieldSchema::text("recommendation", "Recommendation").on_page(3),
    FieldSchema::date("date", "Date").on_page(3),
];

pub(crate) const APPOINTMENT_FIELDS: &[FieldSchema] = &[
    FieldSchema::text("sr_code", "SR Code"),
    FieldSchema::derived("name", "Name"),
    FieldSchema::derived("grade", "Grade"),
    FieldSchema::derived("section", "Section"),
    FieldSchema::date("date", "Date"),
    FieldSchema::text("time", "Time"),
    FieldSchema::choice("purpose", "Purpose", PURPOSE_OPTIONS),
    FieldSchema::choice("status", "Status", APPOINTMENT_STATUS_OPTIONS).with_default("Pending"),
    FieldSchema::text("notes", "Notes"),
];

// ---------------------------------------------------------------------------
// Schemas
// ---------------------------------------------------------------------------

const fn grade_level(key: &'static str, endpoint: &'static str, title: &'static str) -> EntitySchema {
    EntitySchema {
        key,
        endpoint,
        title,
        fields: GRADE_LEVEL_FIELDS,
        identity: Some(GRADE_IDENTITY),
        pages: 1,
    }
}

const fn college(key: &'static str, endpoint: &'static str, title: &'static str) -> EntitySchema {
    EntitySchema {
        key,
        endpoint,
        title,
        fields: COLLEGE_FIELDS,
        identity: Some(COLLEGE_IDENTITY),
        pages: 1,
    }
}

pub static GRADE_ONE: EntitySchema = grade_level("grade_one_records", "grade-one", "Grade 1 Form");
pub static GRADE_TWO: EntitySchema = grade_level("grade_two_records", "grade-two", "Grade 2 Form");
pub static GRADE_THREE: EntitySchema =
    grade_level("grade_three_records", "grade-three", "Grade 3 Form");
pub static GRADE_FOUR: EntitySchema =
    grade_level("grade_four_records", "grade-four", "Grade 4 Form");

pub static FIRST_YEAR: EntitySchema =
    college("first_year_records", "first-year", "1st Year College Form");
pub static SECOND_YEAR: EntitySchema =
    college("second_year_records", "second-year", "2nd Year College Form");
pub static THIRD_YEAR: EntitySchema =
    college("third_year_records", "third-year", "3rd Year College Form");
pub static FOURTH_YEAR: EntitySchema =
    college("fourth_year_records", "fourth-year", "4th Year College Form");

pub static PSYCHOLOGICAL_ASSESSMENTS: EntitySchema = EntitySchema {
    key: "psychological_assessments",
    endpoint: "psychological-assessments",
    title: "Psychological Assessment",
    fields: PSYCH_ASSESSMENT_FIELDS,
    identity: Some(GRADE_IDENTITY),
    pages: 2,
};

pub static EVALUATIONS: EntitySchema = EntitySchema {
    key: "evaluations",
    endpoint: "evaluations",
    title: "Counseling Evaluation",
    fields: EVALUATION_FIELDS,
    identity: Some(GRADE_IDENTITY),
    pages: 1,
};

pub static CAREER_TRACKING: EntitySchema = EntitySchema {
    key: "career_tracking",
    endpoint: "career-tracking",
    title: "Career Tracking",
    fields: CAREER_TRACKING_FIELDS,
    identity: Some(GRADE_IDENTITY),
    pages: 3,
};

pub static APPOINTMENTS: EntitySchema = EntitySchema {
    key: "appointments",
    endpoint: "appointments",
    title: "Appointment",
    fields: APPOINTMENT_FIELDS,
    identity: Some(GRADE_IDENTITY),
    pages: 1,
};

static CATALOG: [&EntitySchema; 12] = [
    &GRADE_ONE,
    &GRADE_TWO,
    &GRADE_THREE,
    &GRADE_FOUR,
    &FIRST_YEAR,
    &SECOND_YEAR,
    &THIRD_YEAR,
    &FOURTH_YEAR,
    &PSYCHOLOGICAL_ASSESSMENTS,
    &EVALUATIONS,
    &CAREER_TRACKING,
    &APPOINTMENTS,
];

/// Every known entity schema.
pub fn catalog() -> &'static [&'static EntitySchema] {
    &CATALOG
}

/// Find a schema by cache key.
pub fn find(key: &str) -> Result<&'static EntitySchema, CoreError> {
    CATALOG
        .iter()
        .copied()
        .find(|s| s.key == key)
        .ok_or_else(|| CoreError::UnknownEntity(key.to_string()))
}
