//! Student lookup results and the autofill rules applied to forms.
//!
//! A [`StudentCandidate`] comes back from the `search-student` endpoint
//! and is only ever used to populate the identity fields of a draft; it is
//! never persisted on its own.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::schema::IdentityBinding;

/// `Grade` glued directly to the level, e.g. `Grade7` or `GradeVII`.
static GLUED_GRADE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^Grade(\S)").expect("valid regex"));

/// One search result from the student lookup endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentCandidate {
    #[serde(default)]
    pub sr_code: String,
    #[serde(default)]
    pub firstname: String,
    #[serde(default)]
    pub lastname: String,
    #[serde(default)]
    pub year: String,
    #[serde(default, alias = "course")]
    pub section: String,
}

impl StudentCandidate {
    /// First and last name joined by a single space.
    pub fn full_name(&self) -> String {
        let first = self.firstname.trim();
        let last = self.lastname.trim();
        match (first.is_empty(), last.is_empty()) {
            (false, false) => format!("{first} {last}"),
            (false, true) => first.to_string(),
            (true, false) => last.to_string(),
            (true, true) => String::new(),
        }
    }

    /// Text shown in the lookup dropdown.
    pub fn display_label(&self) -> String {
        format!("{} - {}", self.sr_code, self.full_name())
    }
}

/// Insert the missing space in `Grade7`-style values.
///
/// Only a leading, case-exact `Grade` immediately followed by a non-space
/// character is rewritten. Already spaced or differently cased values are
/// returned unchanged, so applying this twice is the same as once.
pub fn normalize_grade(year: &str) -> String {
    GLUED_GRADE_RE.replace(year, "Grade $1").into_owned()
}

/// Overwrite the bound identity fields of a draft from a candidate.
///
/// Exactly four fields change: code, full name, normalized grade, and
/// section/course. Every other field is left untouched.
pub fn apply_candidate(
    binding: &IdentityBinding,
    fields: &mut Map<String, Value>,
    candidate: &StudentCandidate,
) {
    let updates = [
        (binding.code, candidate.sr_code.clone()),
        (binding.name, candidate.full_name()),
        (binding.grade, normalize_grade(&candidate.year)),
        (binding.section, candidate.section.clone()),
    ];
    for (name, value) in updates {
        fields.insert(name.to_string(), Value::String(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{COLLEGE_IDENTITY, GRADE_IDENTITY};
    use serde_json::json;

    fn jane() -> StudentCandidate {
        StudentCandidate {
            sr_code: "SR-001".into(),
            firstname: "Jane".into(),
            lastname: "Doe".into(),
            year: "Grade7".into(),
            section: "A".into(),
        }
    }

    #[test]
    fn candidate_without_sr_code_still_decodes() {
        let candidates: Vec<StudentCandidate> = serde_json::from_value(json!([
            { "firstname": "Ana", "lastname": "Cruz" },
            { "sr_code": "SR-001", "firstname": "Jane", "lastname": "Doe", "year": "Grade7" },
        ]))
        .unwrap();
        assert_eq!(candidates[0].sr_code, "");
        assert_eq!(candidates[0].full_name(), "Ana Cruz");
        assert_eq!(candidates[1].sr_code, "SR-001");
    }

    // -- normalize_grade ----------------------------------------------------

    #[test]
    fn glued_grade_gets_a_space() {
        assert_eq!(normalize_grade("Grade7"), "Grade 7");
        assert_eq!(normalize_grade("Grade12"), "Grade 12");
    }

    #[test]
    fn spaced_grade_is_unchanged() {
        assert_eq!(normalize_grade("Grade 7"), "Grade 7");
    }

    #[test]
    fn other_values_are_unchanged() {
        assert_eq!(normalize_grade("grade7"), "grade7");
        assert_eq!(normalize_grade("2nd Year"), "2nd Year");
        assert_eq!(normalize_grade("Grade"), "Grade");
        assert_eq!(normalize_grade(""), "");
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize_grade("Grade9");
        assert_eq!(normalize_grade(&once), once);
    }

    // -- full_name ----------------------------------------------------------

    #[test]
    fn full_name_single_space() {
        assert_eq!(jane().full_name(), "Jane Doe");
    }

    #[test]
    fn full_name_with_missing_part() {
        let c = StudentCandidate {
            lastname: String::new(),
            ..jane()
        };
        assert_eq!(c.full_name(), "Jane");
    }

    // -- apply_candidate ----------------------------------------------------

    #[test]
    fn candidate_overwrites_exactly_the_identity_fields() {
        let mut fields = json!({
            "sr_code": "SR-",
            "name": "",
            "grade": "",
            "section": "",
            "concern": "Attendance",
        })
        .as_object()
        .cloned()
        .unwrap();

        apply_candidate(&GRADE_IDENTITY, &mut fields, &jane());

        assert_eq!(fields["sr_code"], "SR-001");
        assert_eq!(fields["name"], "Jane Doe");
        assert_eq!(fields["grade"], "Grade 7");
        assert_eq!(fields["section"], "A");
        assert_eq!(fields["concern"], "Attendance");
        assert_eq!(fields.len(), 5);
    }

    #[test]
    fn college_binding_targets_year_and_course() {
        let mut fields = Map::new();
        let candidate = StudentCandidate {
            year: "3rd Year".into(),
            section: "BSIT".into(),
            ..jane()
        };

        apply_candidate(&COLLEGE_IDENTITY, &mut fields, &candidate);

        assert_eq!(fields["year"], "3rd Year");
        assert_eq!(fields["course"], "BSIT");
        assert!(!fields.contains_key("grade"));
    }

    #[test]
    fn course_alias_deserializes_into_section() {
        let c: StudentCandidate = serde_json::from_value(json!({
            "sr_code": "21-0001",
            "firstname": "Ana",
            "lastname": "Cruz",
            "year": "1st Year",
            "course": "BSN",
        }))
        .unwrap();
        assert_eq!(c.section, "BSN");
    }
}
