//! Dashboard filters, quick date ranges and analytics endpoint names.
//!
//! The backend pre-aggregates counts per problem category; the client
//! only chooses a grade filter and a date window and maps pie slices back
//! to categories.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

/// Pie summary endpoint (one slice per problem category).
pub const PIE_SUMMARY_ENDPOINT: &str = "problem-summary";

/// Wire format for dates in analytics query strings.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Grade filter values offered by the dashboard.
pub const GRADE_FILTER_OPTIONS: &[&str] = &[
    "All", "Grade 7", "Grade 8", "Grade 9", "Grade 10", "Grade 11", "Grade 12", "1st Year",
    "2nd Year", "3rd Year", "4th Year",
];

// ---------------------------------------------------------------------------
// Problem categories
// ---------------------------------------------------------------------------

/// The five problem categories with their own bar-chart endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemCategory {
    Academic,
    PersonalSocial,
    Career,
    Family,
    Behavioral,
}

impl ProblemCategory {
    pub const ALL: [ProblemCategory; 5] = [
        Self::Academic,
        Self::PersonalSocial,
        Self::Career,
        Self::Family,
        Self::Behavioral,
    ];

    /// Analytics endpoint path segment.
    pub fn endpoint(self) -> &'static str {
        match self {
            Self::Academic => "academic-problems",
            Self::PersonalSocial => "personal-social-problems",
            Self::Career => "career-problems",
            Self::Family => "family-problems",
            Self::Behavioral => "behavioral-problems",
        }
    }

    /// Key used by the pie summary endpoint.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Academic => "academic",
            Self::PersonalSocial => "personal_social",
            Self::Career => "career",
            Self::Family => "family",
            Self::Behavioral => "behavioral",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Academic => "Academic",
            Self::PersonalSocial => "Personal / Social",
            Self::Career => "Career",
            Self::Family => "Family",
            Self::Behavioral => "Behavioral",
        }
    }

    /// Resolve a pie slice label, accepting either the key or the
    /// display label (case-insensitive).
    pub fn from_slice(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|c| {
            c.as_str().eq_ignore_ascii_case(label) || c.label().eq_ignore_ascii_case(label)
        })
    }
}

// ---------------------------------------------------------------------------
// Aggregate payloads
// ---------------------------------------------------------------------------

/// One bar of a category chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountBucket {
    pub label: String,
    pub count: u64,
}

/// One slice of the pie summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PieSlice {
    pub category: String,
    pub count: u64,
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Grade/year filter applied to every analytics request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum GradeFilter {
    #[default]
    All,
    Grade(String),
}

impl GradeFilter {
    /// Parse a filter option; `All` (any case) or empty means no filter.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            Self::All
        } else {
            Self::Grade(value.to_string())
        }
    }

    pub fn as_query_value(&self) -> &str {
        match self {
            Self::All => "All",
            Self::Grade(label) => label,
        }
    }
}

/// Quick-range selector next to the custom date fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RangePreset {
    #[default]
    Custom,
    Quarterly,
    Yearly,
}

/// Inclusive date window. Either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// The window a preset selects relative to `today`.
    ///
    /// `Custom` clears both dates. Month arithmetic clamps to the end of
    /// shorter months (May 31 minus three months is Feb 28/29).
    pub fn for_preset(preset: RangePreset, today: NaiveDate) -> Self {
        let months = match preset {
            RangePreset::Custom => return Self::default(),
            RangePreset::Quarterly => 3,
            RangePreset::Yearly => 12,
        };
        Self {
            start: today.checked_sub_months(Months::new(months)),
            end: Some(today),
        }
    }
}

/// Build the `grade` / `start_date` / `end_date` query pairs.
///
/// Open bounds are sent as empty strings, which the backend treats as
/// "unbounded".
pub fn analytics_query(filter: &GradeFilter, range: &DateRange) -> Vec<(String, String)> {
    let fmt = |d: Option<NaiveDate>| {
        d.map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default()
    };
    vec![
        ("grade".to_string(), filter.as_query_value().to_string()),
        ("start_date".to_string(), fmt(range.start)),
        ("end_date".to_string(), fmt(range.end)),
    ]
}
