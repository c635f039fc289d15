use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("unknown {kind} '{label}' (expected one of: {allowed})")]
    UnknownLabel {
        kind: &'static str,
        label: String,
        allowed: String,
    },
}

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("{field} must be a finite number")]
    NotFinite { field: &'static str },

    #[error("{field} must be {bound}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        bound: String,
    },

    #[error(transparent)]
    Encoding(#[from] EncodingError),
}
