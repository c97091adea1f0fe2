//! Typed view of the appointment scheduler's records.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::dashboard::DATE_FORMAT;
use crate::record::Record;
use crate::types::RecordId;

/// One scheduled counseling appointment.
///
/// Field names match the `appointments` schema exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RecordId>,
    pub sr_code: String,
    pub name: String,
    pub grade: String,
    pub section: String,
    pub date: String,
    pub time: String,
    pub purpose: String,
    pub status: String,
    pub notes: String,
}

impl Appointment {
    /// Convert a generic record, filling absent fields with empty strings.
    pub fn from_record(record: &Record) -> Self {
        Self {
            id: record.id,
            sr_code: record.field_text("sr_code"),
            name: record.field_text("name"),
            grade: record.field_text("grade"),
            section: record.field_text("section"),
            date: record.field_text("date"),
            time: record.field_text("time"),
            purpose: record.field_text("purpose"),
            status: record.field_text("status"),
            notes: record.field_text("notes"),
        }
    }

    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT).ok()
    }

    /// Accepts `HH:MM` and `HH:MM:SS`.
    pub fn parsed_time(&self) -> Option<NaiveTime> {
        let t = self.time.trim();
        NaiveTime::parse_from_str(t, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(t, "%H:%M:%S"))
            .ok()
    }

    pub fn is_cancelled(&self) -> bool {
        self.status.eq_ignore_ascii_case("cancelled")
    }
}

/// Appointments on or after `today`, earliest first.
///
/// Records with an unparseable date and cancelled appointments are left
/// out. Within one day, appointments without a readable time sort last.
pub fn upcoming(records: &[Record], today: NaiveDate) -> Vec<Appointment> {
    let mut dated: Vec<(NaiveDate, Option<NaiveTime>, Appointment)> = records
        .iter()
        .map(Appointment::from_record)
        .filter(|a| !a.is_cancelled())
        .filter_map(|a| {
            let date = a.parsed_date()?;
            (date >= today).then(|| (date, a.parsed_time(), a))
        })
        .collect();

    dated.sort_by(|(da, ta, _), (db, tb, _)| {
        da.cmp(db).then_with(|| match (ta, tb) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        })
    });

    dated.into_iter().map(|(_, _, a)| a).collect()
}
