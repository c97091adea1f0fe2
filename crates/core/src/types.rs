/// Server-assigned record identifiers (Django auto-increment primary keys).
pub type RecordId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
