//! Error types for chipcost-core.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    #[error("duplicate {kind}: {name}")]
    Duplicate { kind: &'static str, name: String },

    #[error("{0} name must not be empty")]
    EmptyName(&'static str),

    #[error("invalid {field} = {value} on {record}: {reason}")]
    InvalidParameter {
        record: String,
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("{kind} catalog is frozen, cannot insert {name}")]
    Frozen { kind: &'static str, name: String },

    #[error("invalid matrix dimensions for {io_type}: expected {expected}x{expected}, got {rows}x{cols}")]
    DimensionMismatch {
        io_type: String,
        expected: usize,
        rows: usize,
        cols: usize,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Check a record parameter, producing an [`Error::InvalidParameter`] on failure.
pub fn ensure(
    ok: bool,
    record: &str,
    field: &'static str,
    value: f64,
    reason: &'static str,
) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(Error::InvalidParameter {
            record: record.to_string(),
            field,
            value,
            reason,
        })
    }
}
