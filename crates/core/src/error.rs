#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unknown entity: {0}")]
    UnknownEntity(String),

    #[error("Unknown field '{field}' on {entity}")]
    UnknownField { entity: &'static str, field: String },

    #[error("Field '{0}' is read-only")]
    ReadOnlyField(String),

    #[error("'{value}' is not an option for field '{field}'")]
    InvalidChoice { field: String, value: String },

    #[error("Invalid schema {entity}: {reason}")]
    InvalidSchema { entity: &'static str, reason: String },
}
