//! Error types for chipcost-model.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("chip name must not be empty")]
    EmptyChipName,

    #[error("chip {chip}: invalid stackup entry `{entry}`, expected `<count>:<layer>`")]
    InvalidStackup { chip: String, entry: String },

    #[error("chip {chip}: layer count {count} for {layer} is negative")]
    NegativeLayerCount {
        chip: String,
        layer: String,
        count: i64,
    },

    #[error("chip {chip}: interconnect reach {reach} leaves no pad band beyond die separation {die_separation}")]
    ReachBelowSeparation {
        chip: String,
        reach: f64,
        die_separation: f64,
    },

    #[error("chip {chip}: invalid {field} = {value}: {reason}")]
    InvalidChipParameter {
        chip: String,
        field: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error(transparent)]
    Core(#[from] chipcost_core::Error),

    #[error(transparent)]
    Process(#[from] chipcost_process::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
